/**
 * Error types shared across the crate
 */

use std::path::PathBuf;
use thiserror::Error;

/// Failure while reading embedded metadata from a media container.
///
/// Always recoverable: the resolver treats any of these as "no tag date"
/// and moves on to the next source.
#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("I/O error while reading metadata: {0}")]
    Io(#[from] std::io::Error),

    #[error("EXIF error: {0}")]
    Exif(#[from] exif::Error),

    #[error("MP4 error: {0}")]
    Mp4(#[from] mp4::Error),

    #[error("malformed container: {0}")]
    Malformed(&'static str),
}

/// Invalid root directory configuration. Fatal before any file is touched.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no root path given (pass a path or set PHOTOS_PATH)")]
    MissingRoot,

    #[error("root path does not exist: {0}")]
    RootNotFound(PathBuf),

    #[error("root path is not a directory: {0}")]
    RootNotDirectory(PathBuf),
}
