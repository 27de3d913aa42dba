/**
 * Media file model: one candidate file as seen on disk
 */

use anyhow::{Context, Result};
use chrono::{DateTime, Local, NaiveDateTime};
use std::fs;
use std::path::{Path, PathBuf};

/// Extensions (lowercase, no dot) classified as video.
pub const VIDEO_EXTENSIONS: &[&str] = &[
    "mp4", "mov", "m4v", "3gp", "avi", "mkv", "wmv", "mpg", "mpeg", "mts", "m2ts",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    pub fn from_extension(extension: &str) -> Self {
        if VIDEO_EXTENSIONS.contains(&extension.to_lowercase().as_str()) {
            MediaKind::Video
        } else {
            MediaKind::Image
        }
    }

    /// Fixed filename prefix for this kind.
    pub fn prefix(self) -> &'static str {
        match self {
            MediaKind::Image => "PHOTO_",
            MediaKind::Video => "VIDEO_",
        }
    }
}

#[derive(Debug, Clone)]
pub struct MediaFile {
    pub path: PathBuf,
    pub len: u64,
    pub modified: NaiveDateTime,
    /// Lowercase extension without the dot; empty when the file has none.
    pub extension: String,
    pub kind: MediaKind,
}

impl MediaFile {
    /// Snapshots length and last-write time of the file at `path`.
    pub fn from_path(path: &Path) -> Result<Self> {
        let metadata = fs::metadata(path)
            .with_context(|| format!("Failed to read file metadata: {}", path.display()))?;
        let modified = metadata
            .modified()
            .with_context(|| format!("Failed to get file modification time: {}", path.display()))?;

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|s| s.to_lowercase())
            .unwrap_or_default();

        Ok(Self {
            path: path.to_path_buf(),
            len: metadata.len(),
            modified: DateTime::<Local>::from(modified).naive_local(),
            kind: MediaKind::from_extension(&extension),
            extension,
        })
    }

    pub fn parent(&self) -> Option<&Path> {
        self.path.parent()
    }

    pub fn file_name(&self) -> Option<&str> {
        self.path.file_name().and_then(|n| n.to_str())
    }
}
