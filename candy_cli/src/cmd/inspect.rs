use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use candy_core::Hash;
use candy_core::value::decode;

pub fn run_inspect(file: &Path, json: bool) -> Result<()> {
    let bytes = fs::read(file).with_context(|| format!("failed to read {}", file.display()))?;
    let value =
        decode(&bytes).with_context(|| format!("{} is not an encoded value", file.display()))?;

    if json {
        println!("{}", value.to_json());
        return Ok(());
    }
    println!("variant: {}", value.variant_name());
    println!("encoded: {} bytes, blake3 {}", bytes.len(), Hash::new(&bytes));
    println!("{value}");
    Ok(())
}
