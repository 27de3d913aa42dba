/**
 * QuickTime / ISO-BMFF reader (mp4, mov, m4v, 3gp)
 *
 * Reads the movie creation time from moov/mvhd. When the movie header
 * carries no time, the first track header (trak/tkhd) that does is used.
 */

use chrono::{DateTime, Utc};
use log::debug;
use mp4::{MoovBox, Mp4Reader};
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use super::{strip_type_hint, TagResult};
use crate::date_format::parse_date_text;

/// Seconds between 1904-01-01 (QuickTime epoch) and 1970-01-01.
const QT_TO_UNIX_OFFSET: i64 = 2_082_844_800;

pub fn read_date(path: &Path) -> TagResult {
    let file = File::open(path)?;
    let len = file.metadata()?.len();
    read_date_from(BufReader::new(file), len)
}

fn read_date_from<R: Read + Seek>(reader: R, len: u64) -> TagResult {
    let movie = Mp4Reader::read_header(reader, len)?;

    // Zero is "not set" in the container, not 1904-01-01.
    let seconds = creation_seconds(&movie.moov);
    if seconds == 0 {
        return Ok(None);
    }

    let Some(description) = creation_description(seconds) else {
        return Ok(None);
    };
    debug!("QuickTime creation description: {}", description);

    Ok(strip_type_hint(&description).and_then(parse_date_text))
}

fn creation_seconds(moov: &MoovBox) -> u64 {
    if moov.mvhd.creation_time != 0 {
        return moov.mvhd.creation_time;
    }
    moov.traks
        .iter()
        .map(|trak| trak.tkhd.creation_time)
        .find(|&seconds| seconds != 0)
        .unwrap_or(0)
}

/// Renders a QuickTime timestamp as "Www Mmm dd HH:MM:SS yyyy" (UTC).
fn creation_description(seconds: u64) -> Option<String> {
    let unix = i64::try_from(seconds).ok()?.checked_sub(QT_TO_UNIX_OFFSET)?;
    let utc = DateTime::<Utc>::from_timestamp(unix, 0)?;
    Some(utc.format("%a %b %d %H:%M:%S %Y").to_string())
}
