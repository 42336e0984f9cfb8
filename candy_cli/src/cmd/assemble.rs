use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::helpers::{read_chunk_dir, write_atomic};

pub fn run_assemble(dir: &Path, json: bool, out: Option<&Path>) -> Result<()> {
    let workspace = read_chunk_dir(dir)?;
    let values = workspace
        .to_values()
        .with_context(|| format!("failed to reassemble {}", dir.display()))?;
    info!(zones = values.len(), chunks = workspace.len(), "reassembled workspace");

    for (zone_id, value) in values.iter().enumerate() {
        if json {
            println!("{}", value.to_json());
        } else {
            println!("zone {zone_id}\t{}\t{value}", value.variant_name());
        }
    }

    if let Some(out) = out {
        fs::create_dir_all(out)
            .with_context(|| format!("failed to create directory {}", out.display()))?;
        for (zone_id, value) in values.iter().enumerate() {
            match value.to_blob() {
                Ok(bytes) => write_atomic(&out.join(format!("z{zone_id}.bin")), &bytes)?,
                Err(err) => warn!(zone_id, "not written: {err}"),
            }
        }
    }
    Ok(())
}
