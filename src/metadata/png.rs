/**
 * PNG textual chunk scanning (tEXt / iTXt)
 */

use std::io::{Read, Seek, SeekFrom};

use crate::error::MetadataError;

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// Text chunks larger than this are skipped rather than read.
const MAX_TEXT_CHUNK: u32 = 1 << 20;

/// Collects `"<keyword>: <text>"` descriptions for every uncompressed text
/// chunk before the image data ends.
pub fn text_descriptions<R: Read + Seek>(reader: &mut R) -> Result<Vec<String>, MetadataError> {
    let mut signature = [0u8; 8];
    reader.read_exact(&mut signature)?;
    if signature != PNG_SIGNATURE {
        return Err(MetadataError::Malformed("missing PNG signature"));
    }

    let mut descriptions = Vec::new();
    loop {
        let mut header = [0u8; 8];
        match reader.read_exact(&mut header) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => break,
            Err(e) => return Err(e.into()),
        }
        let length = u32::from_be_bytes([header[0], header[1], header[2], header[3]]);
        let kind = [header[4], header[5], header[6], header[7]];

        if &kind == b"IEND" {
            break;
        }

        if (&kind == b"tEXt" || &kind == b"iTXt") && length <= MAX_TEXT_CHUNK {
            let mut data = vec![0u8; length as usize];
            reader.read_exact(&mut data)?;
            reader.seek(SeekFrom::Current(4))?; // CRC
            let decoded = if &kind == b"tEXt" {
                decode_text(&data)
            } else {
                decode_itxt(&data)
            };
            if let Some((keyword, text)) = decoded {
                descriptions.push(format!("{}: {}", keyword, text));
            }
        } else {
            reader.seek(SeekFrom::Current(i64::from(length) + 4))?;
        }
    }

    Ok(descriptions)
}

fn latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

fn decode_text(data: &[u8]) -> Option<(String, String)> {
    let nul = data.iter().position(|&b| b == 0)?;
    Some((latin1(&data[..nul]), latin1(&data[nul + 1..])))
}

fn decode_itxt(data: &[u8]) -> Option<(String, String)> {
    let nul = data.iter().position(|&b| b == 0)?;
    let keyword = latin1(&data[..nul]);
    let rest = data.get(nul + 1..)?;
    let (&compressed, rest) = rest.split_first()?;
    if compressed != 0 {
        return None;
    }
    // compression method, then language tag and translated keyword
    let rest = rest.get(1..)?;
    let lang_end = rest.iter().position(|&b| b == 0)?;
    let rest = &rest[lang_end + 1..];
    let translated_end = rest.iter().position(|&b| b == 0)?;
    let text = String::from_utf8_lossy(&rest[translated_end + 1..]).into_owned();
    Some((keyword, text))
}
