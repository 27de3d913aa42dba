/**
 * Container metadata readers
 *
 * One reader per container family, selected by file extension:
 * 1. Image (EXIF, then PNG text chunks)
 * 2. QuickTime / ISO-BMFF (mvhd / tkhd creation time)
 * 3. AVI (RIFF IDIT chunk)
 */

pub mod avi;
pub mod image;
pub mod png;
pub mod quicktime;

use chrono::NaiveDateTime;
use std::path::Path;

use crate::error::MetadataError;
use crate::media::MediaKind;

pub type TagResult = Result<Option<NaiveDateTime>, MetadataError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerFormat {
    Image,
    QuickTime,
    Avi,
}

impl ContainerFormat {
    /// Picks the reader for a lowercase extension. Videos in containers we
    /// have no reader for get `None`.
    pub fn for_extension(extension: &str) -> Option<Self> {
        match extension {
            "mp4" | "mov" | "m4v" | "3gp" => Some(ContainerFormat::QuickTime),
            "avi" => Some(ContainerFormat::Avi),
            ext if MediaKind::from_extension(ext) == MediaKind::Video => None,
            _ => Some(ContainerFormat::Image),
        }
    }

    pub fn read_date(self, path: &Path) -> TagResult {
        match self {
            ContainerFormat::Image => image::read_date(path),
            ContainerFormat::QuickTime => quicktime::read_date(path),
            ContainerFormat::Avi => avi::read_date(path),
        }
    }
}

/// Reads the embedded creation date of `path`, dispatching on `extension`.
pub fn read_tag_date(path: &Path, extension: &str) -> TagResult {
    match ContainerFormat::for_extension(extension) {
        Some(format) => format.read_date(path),
        None => Ok(None),
    }
}

/// Drops the 4-character leading type hint ("Thu ", "Fri ") that video
/// date descriptions carry.
pub fn strip_type_hint(description: &str) -> Option<&str> {
    let (idx, _) = description.char_indices().nth(4)?;
    Some(&description[idx..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_dispatch() {
        assert_eq!(ContainerFormat::for_extension("jpg"), Some(ContainerFormat::Image));
        assert_eq!(ContainerFormat::for_extension("png"), Some(ContainerFormat::Image));
        assert_eq!(ContainerFormat::for_extension("mov"), Some(ContainerFormat::QuickTime));
        assert_eq!(ContainerFormat::for_extension("mp4"), Some(ContainerFormat::QuickTime));
        assert_eq!(ContainerFormat::for_extension("avi"), Some(ContainerFormat::Avi));
        assert_eq!(ContainerFormat::for_extension("mkv"), None);
    }

    #[test]
    fn test_strip_type_hint() {
        assert_eq!(strip_type_hint("Thu Oct 22 13:57:19 2009"), Some("Oct 22 13:57:19 2009"));
        assert_eq!(strip_type_hint("Thu"), None);
        assert_eq!(strip_type_hint("Thu "), None);
        assert_eq!(strip_type_hint("Thu X"), Some("X"));
    }

    #[test]
    fn test_unknown_video_container_reports_not_found() {
        let result = read_tag_date(Path::new("/does/not/exist.mkv"), "mkv").unwrap();
        assert!(result.is_none());
    }
}
