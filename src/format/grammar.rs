//! Header block grammar
//!
//! Extraction validates the markers on raw bytes without looking at entries.
//! Parsing is a single pass over lines with two states: outside and inside
//! the block. Only `@` lines seen while inside become entries, so markers or
//! entry-like lines in the payload are never picked up.

use std::path::Path;

use super::header::{Entry, Header};
use super::{END_MARKER, ENTRY_MARKER, ENVELOPE_FLAG_KEY, START_MARKER};
use crate::error::{KpfError, KpfResult};
use crate::storage::file_io::read_bytes;

/// Whitespace stripped in front of the payload
const PAYLOAD_WHITESPACE: &[u8] = b" \t\n\r\0\x0B";

/// Locate the header block, returning the offset just past the end marker
fn header_end(doc: &[u8]) -> KpfResult<usize> {
    if !doc.starts_with(START_MARKER.as_bytes()) {
        return Err(KpfError::start_marker_not_found("start of document"));
    }

    let search_from = START_MARKER.len();
    let end_marker = END_MARKER.as_bytes();
    doc[search_from..]
        .windows(end_marker.len())
        .position(|window| window == end_marker)
        .map(|pos| search_from + pos + end_marker.len())
        .ok_or_else(|| {
            KpfError::MalformedHeader(format!(
                "end marker '{}' missing after start marker",
                END_MARKER
            ))
        })
}

/// Return the header block, start marker through end marker inclusive
pub fn extract_header(doc: &[u8]) -> KpfResult<&str> {
    let end = header_end(doc)?;
    std::str::from_utf8(&doc[..end])
        .map_err(|e| KpfError::MalformedHeader(format!("header is not valid UTF-8: {}", e)))
}

/// Return the payload after the end marker, leading whitespace trimmed
pub fn extract_content(doc: &[u8]) -> KpfResult<&[u8]> {
    let end = header_end(doc)?;
    let payload = &doc[end..];
    let skip = payload
        .iter()
        .take_while(|b| PAYLOAD_WHITESPACE.contains(b))
        .count();
    Ok(&payload[skip..])
}

/// Read a file and return its header block
pub fn read_header(path: impl AsRef<Path>) -> KpfResult<String> {
    let path = path.as_ref();
    let doc = read_bytes(path)?;
    let header = extract_header(&doc).map_err(|e| with_location(e, path))?;
    Ok(header.to_string())
}

/// Read a file and return its payload
pub fn read_content(path: impl AsRef<Path>) -> KpfResult<Vec<u8>> {
    let path = path.as_ref();
    let doc = read_bytes(path)?;
    let content = extract_content(&doc).map_err(|e| with_location(e, path))?;
    Ok(content.to_vec())
}

/// Attach the file path to grammar errors raised on its content
fn with_location(err: KpfError, path: &Path) -> KpfError {
    match err {
        KpfError::NotFound { what, .. } => KpfError::NotFound {
            what,
            location: format!("start of {}", path.display()),
        },
        KpfError::MalformedHeader(reason) => {
            KpfError::MalformedHeader(format!("{}: {}", path.display(), reason))
        }
        other => other,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Outside,
    Inside,
}

/// Parse header text into its entries
///
/// The text must itself be a valid header. Anything after the first end
/// marker is payload and is never scanned for entries.
pub fn parse_header(text: &str) -> KpfResult<Header> {
    let end = header_end(text.as_bytes())?;

    let mut header = Header::new();
    let mut state = ScanState::Outside;

    for line in text[..end].lines().map(str::trim).filter(|l| !l.is_empty()) {
        if line == START_MARKER {
            state = ScanState::Inside;
            continue;
        }
        if line == END_MARKER {
            state = ScanState::Outside;
            continue;
        }
        if state == ScanState::Inside {
            if let Some(body) = line.strip_prefix(ENTRY_MARKER) {
                if let Some((key, raw)) = body.split_once(' ') {
                    header.set(key.trim().to_string(), Entry::from_raw(raw.trim()));
                }
            }
        }
    }

    Ok(header)
}

/// Serialize a header back into its block form
pub fn serialize_header(header: &Header) -> String {
    let mut out = String::new();
    out.push_str(START_MARKER);
    out.push('\n');
    for (key, entry) in header.iter() {
        out.push_str("    ");
        out.push(ENTRY_MARKER);
        out.push_str(key);
        out.push(' ');
        out.push_str(&entry.to_string());
        out.push('\n');
    }
    out.push_str(END_MARKER);
    out.push('\n');
    out
}

/// Check whether a document carries the encryption marker entry
///
/// Documents without a valid header are never flagged.
pub fn has_envelope_flag(doc: &[u8]) -> bool {
    extract_header(doc)
        .and_then(parse_header)
        .map(|header| header.contains_key(ENVELOPE_FLAG_KEY))
        .unwrap_or(false)
}
