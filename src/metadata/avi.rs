/**
 * AVI (RIFF) reader
 *
 * The capture date lives in the IDIT chunk, usually inside LIST hdrl, as
 * text such as "THU OCT 22 13:57:19 2009". Files without IDIT sometimes
 * carry an INFO/ICRD creation date instead.
 */

use log::debug;
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use super::{strip_type_hint, TagResult};
use crate::date_format::parse_date_text;
use crate::error::MetadataError;

/// Date chunks longer than this are ignored.
const MAX_DATE_CHUNK: u32 = 256;

/// Real files nest LIST chunks about four deep (hdrl/strl/...).
const MAX_LIST_DEPTH: usize = 8;

#[derive(Debug, Default)]
struct AviDates {
    idit: Option<String>,
    icrd: Option<String>,
}

pub fn read_date(path: &Path) -> TagResult {
    let file = File::open(path)?;
    let len = file.metadata()?.len();
    let mut reader = BufReader::new(file);
    read_date_from(&mut reader, len)
}

fn read_date_from<R: Read + Seek>(reader: &mut R, len: u64) -> TagResult {
    let mut header = [0u8; 12];
    reader.read_exact(&mut header)?;
    if &header[0..4] != b"RIFF" || &header[8..12] != b"AVI " {
        return Err(MetadataError::Malformed("not a RIFF AVI file"));
    }
    let riff_size = u64::from(u32::from_le_bytes([header[4], header[5], header[6], header[7]]));
    let end = (8 + riff_size).min(len);

    let mut dates = AviDates::default();
    walk_chunks(reader, 12, end, 0, &mut dates)?;

    let from_idit = dates.idit.as_deref().and_then(|description| {
        debug!("AVI IDIT description: {}", description);
        strip_type_hint(description).and_then(parse_date_text)
    });
    Ok(from_idit.or_else(|| dates.icrd.as_deref().and_then(parse_date_text)))
}

fn walk_chunks<R: Read + Seek>(
    reader: &mut R,
    start: u64,
    end: u64,
    depth: usize,
    dates: &mut AviDates,
) -> Result<(), MetadataError> {
    if depth > MAX_LIST_DEPTH {
        return Err(MetadataError::Malformed("LIST chunks nested too deep"));
    }

    let mut offset = start;
    while offset + 8 <= end {
        reader.seek(SeekFrom::Start(offset))?;
        let mut header = [0u8; 8];
        reader.read_exact(&mut header)?;
        let id = [header[0], header[1], header[2], header[3]];
        let size = u32::from_le_bytes([header[4], header[5], header[6], header[7]]);
        let data_start = offset + 8;
        let data_end = data_start.saturating_add(u64::from(size)).min(end);

        match &id {
            b"LIST" if size >= 4 => {
                let mut list_type = [0u8; 4];
                reader.read_exact(&mut list_type)?;
                if &list_type != b"movi" {
                    walk_chunks(reader, data_start + 4, data_end, depth + 1, dates)?;
                }
            }
            b"IDIT" if size <= MAX_DATE_CHUNK && dates.idit.is_none() => {
                dates.idit = Some(read_text(reader, size)?);
            }
            b"ICRD" if size <= MAX_DATE_CHUNK && dates.icrd.is_none() => {
                dates.icrd = Some(read_text(reader, size)?);
            }
            _ => {}
        }

        // chunks are word aligned
        offset = data_start + u64::from(size) + u64::from(size & 1);
    }
    Ok(())
}

fn read_text<R: Read>(reader: &mut R, size: u32) -> Result<String, MetadataError> {
    let mut data = vec![0u8; size as usize];
    reader.read_exact(&mut data)?;
    let text: String = data.iter().map(|&b| b as char).collect();
    Ok(text.trim_matches(|c: char| c == '\0' || c.is_whitespace()).to_string())
}
