//! KPF header format
//!
//! A KPF document is a header block followed by a payload:
//!
//! ```text
//! #!!
//!     @<key> <value>[#~><type>]
//! ~!!#
//! <payload>
//! ```
//!
//! The module is split the same way the data flows:
//!
//! - `value`: coercion of raw tokens into typed values and back
//! - `header`: the ordered entry map produced by parsing
//! - `grammar`: extraction, parsing and serialization of the header block
//! - `lookup`: `#~>`-separated path resolution over a parsed header

pub mod grammar;
pub mod header;
pub mod lookup;
pub mod value;

pub use grammar::{
    extract_content, extract_header, has_envelope_flag, parse_header, read_content, read_header,
    serialize_header,
};
pub use header::{Entry, Header};
pub use lookup::lookup;
pub use value::{coerce, Value};

/// Literal that must open every document
pub const START_MARKER: &str = "#!!";

/// Literal that closes the header block
pub const END_MARKER: &str = "~!!#";

/// Prefix of an entry line inside the header block
pub const ENTRY_MARKER: char = '@';

/// Splits `enable#~>type` values and lookup path segments
pub const SEPARATOR: &str = "#~>";

/// Reserved key whose presence marks a document as encrypted
pub const ENVELOPE_FLAG_KEY: &str = "kpfenc";
