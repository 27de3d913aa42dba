/**
 * Image tag reader: EXIF date fields, then PNG "Creation Time" text
 */

use exif::{In, Reader as ExifReader, Tag, Value};
use log::debug;
use std::fs::File;
use std::io::{BufReader, Seek, SeekFrom};
use std::path::Path;

use super::{png, TagResult};
use crate::date_format::parse_date_text;
use crate::error::MetadataError;

/// EXIF fields consulted, most trusted first.
const DATE_TAGS: [Tag; 3] = [Tag::DateTimeOriginal, Tag::DateTime, Tag::DateTimeDigitized];

const CREATION_TIME_MARKER: &str = "Creation Time: ";

pub fn read_date(path: &Path) -> TagResult {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);

    let exif_error = match ExifReader::new().read_from_container(&mut reader) {
        Ok(exif) => {
            for tag in DATE_TAGS {
                let Some(field) = exif.get_field(tag, In::PRIMARY) else {
                    continue;
                };
                if let Some(date) = ascii_value(&field.value).as_deref().and_then(parse_date_text) {
                    debug!("{} found in {}", tag, path.display());
                    return Ok(Some(date));
                }
            }
            None
        }
        Err(e) => Some(MetadataError::from(e)),
    };

    if is_png(path) {
        reader.seek(SeekFrom::Start(0))?;
        for description in png::text_descriptions(&mut reader)? {
            if let Some(idx) = description.find(CREATION_TIME_MARKER) {
                let text = &description[idx + CREATION_TIME_MARKER.len()..];
                if let Some(date) = parse_date_text(text) {
                    return Ok(Some(date));
                }
            }
        }
        return Ok(None);
    }

    match exif_error {
        Some(e) => Err(e),
        None => Ok(None),
    }
}

fn is_png(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("png"))
}

fn ascii_value(value: &Value) -> Option<String> {
    match value {
        Value::Ascii(parts) => parts
            .first()
            .map(|bytes| String::from_utf8_lossy(bytes).trim_end_matches('\0').to_string()),
        _ => None,
    }
}
