use std::path::Path;

use anyhow::{Context, Result};
use candy_core::ChunkingOutcome;
use candy_core::workspace::Cursor;

use crate::helpers::read_chunk_dir;

pub fn run_page(
    dir: &Path,
    max_chunk_size: usize,
    zone_id: u64,
    chunk_id: u64,
    show_hex: bool,
) -> Result<()> {
    let workspace = read_chunk_dir(dir)?;
    let cursor = Cursor::new(zone_id, chunk_id);
    let page = workspace
        .page(max_chunk_size, cursor)
        .with_context(|| format!("failed to page {} at {cursor}", dir.display()))?;

    let outcome = match page.outcome {
        ChunkingOutcome::Complete => "complete",
        ChunkingOutcome::More => "more",
    };
    println!("outcome: {outcome}");
    for (address, payload) in page.chunks.iter() {
        println!("chunk: {address} ({} bytes)", payload.len());
        if show_hex {
            println!("{}", hex::encode(payload.to_bytes()?));
        }
    }
    match page.next {
        Some(next) => println!("next: {next}"),
        None => println!("next: end"),
    }
    Ok(())
}
