//! Path lookup over parsed headers
//!
//! A path is a `#~>`-separated list of segments. The first segment picks a
//! top-level entry, every further segment descends into a mapping-shaped
//! entry. Anything that does not resolve is `None`; only an invalid header
//! is an error.

use super::grammar::parse_header;
use super::header::{Entry, Header};
use super::SEPARATOR;
use crate::error::KpfResult;

impl Header {
    /// Resolve a path such as `level` or `level#~>enable`
    pub fn lookup(&self, path: &str) -> Option<Entry> {
        let mut segments = path.split(SEPARATOR);
        let first = self.get(segments.next()?)?;
        descend(first, segments)
    }
}

fn descend<'a>(entry: &Entry, mut rest: impl Iterator<Item = &'a str>) -> Option<Entry> {
    match rest.next() {
        None => Some(entry.clone()),
        Some(segment) => descend(&entry.field(segment)?, rest),
    }
}

/// Parse a header and resolve a path in it
pub fn lookup(header_text: &str, path: &str) -> KpfResult<Option<Entry>> {
    Ok(parse_header(header_text)?.lookup(path))
}
