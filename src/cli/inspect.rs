//! Header inspection commands
//!
//! Read-only views over a KPF document: the raw header block, the payload,
//! the parsed entry map and single-path lookups.

use std::io::Write;
use std::path::Path;

use crate::error::{KpfError, KpfResult};
use crate::format::{parse_header, read_content, read_header};

/// Print the raw header block
pub fn show_header(file: &Path) -> KpfResult<()> {
    let header = read_header(file)?;
    println!("{}", header);
    Ok(())
}

/// Write the payload bytes unchanged to stdout
pub fn show_content(file: &Path) -> KpfResult<()> {
    let content = read_content(file)?;
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(&content)?;
    stdout.flush()?;
    Ok(())
}

/// Print the parsed header as pretty JSON
pub fn show_parsed(file: &Path) -> KpfResult<()> {
    let header = parse_header(&read_header(file)?)?;
    println!("{}", serde_json::to_string_pretty(&header)?);
    Ok(())
}

/// Print the entry at a `#~>`-separated path
pub fn show_entry(file: &Path, key_path: &str, json: bool) -> KpfResult<()> {
    let header = parse_header(&read_header(file)?)?;
    let entry = header.lookup(key_path).ok_or_else(|| KpfError::NotFound {
        what: "Entry",
        location: format!("{} in {}", key_path, file.display()),
    })?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entry)?);
    } else {
        println!("{}", entry);
    }
    Ok(())
}
