use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use candy_core::ShareableValue;
use candy_core::workspace::chunked;
use tracing::info;

use crate::helpers::{chunk_file_name, has_chunk_files, write_atomic};

pub fn run_chunk(files: &[PathBuf], out: &Path, max_chunk_size: usize) -> Result<()> {
    if has_chunk_files(out)? {
        bail!("{} already contains chunk files", out.display());
    }

    let mut values = Vec::with_capacity(files.len());
    for path in files {
        let data = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
        values.push(ShareableValue::bytes(data));
    }

    let workspace = chunked(&values, max_chunk_size)?;
    fs::create_dir_all(out)
        .with_context(|| format!("failed to create directory {}", out.display()))?;
    for (address, payload) in workspace.iter() {
        write_atomic(&out.join(chunk_file_name(address)), &payload.to_bytes()?)?;
    }
    info!(
        zones = values.len(),
        chunks = workspace.len(),
        max_chunk_size,
        "wrote chunks to {out:?}"
    );

    for (summary, path) in workspace.summaries(max_chunk_size)?.iter().zip(files) {
        println!(
            "zone {}\t{}\t{} bytes\t{} chunks\t{}",
            summary.id,
            path.display(),
            summary.len,
            summary.chunk_count,
            summary.hash
        );
    }
    Ok(())
}
