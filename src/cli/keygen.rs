//! Key generation command

use crate::crypto::{generate_key, KeyPreset};
use crate::error::KpfResult;

/// Print a freshly generated key, or the preset table
pub fn handle_keygen(preset: u8, length: usize, list: bool) -> KpfResult<()> {
    if list {
        println!("Presets");
        println!("=======");
        for preset in KeyPreset::all() {
            let marker = if preset == KeyPreset::default() { "*" } else { " " };
            println!("{}{}  {}", marker, preset.number(), preset.charset());
        }
        return Ok(());
    }

    let key = generate_key(KeyPreset::new(preset)?, length)?;
    println!("{}", key.as_str());
    Ok(())
}
