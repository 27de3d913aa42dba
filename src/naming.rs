/**
 * Canonical file naming
 *
 * Format: <PHOTO_|VIDEO_><yyyyMMdd_HHmmss>_<byte length>[_copy_N].<ext>
 * Dates before 1986 are treated as bad metadata and written as zeros.
 */

use chrono::{Datelike, NaiveDateTime};

use crate::media::{MediaFile, MediaKind};

/// Earliest year rendered literally in a canonical name.
pub const MIN_PLAUSIBLE_YEAR: i32 = 1986;

pub const ZERO_DATE_COMPONENT: &str = "00000000_000000";

/// Date part of a canonical name.
pub fn date_component(dt: NaiveDateTime) -> String {
    if dt.year() < MIN_PLAUSIBLE_YEAR {
        return ZERO_DATE_COMPONENT.to_string();
    }
    dt.format("%Y%m%d_%H%M%S").to_string()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenamePlan {
    pub kind: MediaKind,
    pub date_component: String,
    pub byte_length: u64,
    /// Lowercase extension without the dot; may be empty.
    pub extension: String,
    pub copy_index: Option<u32>,
}

impl RenamePlan {
    pub fn new(file: &MediaFile, date: NaiveDateTime) -> Self {
        Self {
            kind: file.kind,
            date_component: date_component(date),
            byte_length: file.len,
            extension: file.extension.clone(),
            copy_index: None,
        }
    }

    /// The same plan with a `_copy_N` disambiguation suffix.
    pub fn with_copy_index(&self, index: u32) -> Self {
        Self {
            copy_index: Some(index),
            ..self.clone()
        }
    }

    pub fn file_name(&self) -> String {
        let mut name = format!("{}{}_{}", self.kind.prefix(), self.date_component, self.byte_length);
        if let Some(index) = self.copy_index {
            name.push_str(&format!("_copy_{}", index));
        }
        if !self.extension.is_empty() {
            name.push('.');
            name.push_str(&self.extension);
        }
        name
    }
}

/// True when `name` already starts with a canonical prefix.
pub fn has_canonical_prefix(name: &str) -> bool {
    name.starts_with(MediaKind::Image.prefix()) || name.starts_with(MediaKind::Video.prefix())
}
