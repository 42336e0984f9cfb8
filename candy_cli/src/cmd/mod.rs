use std::path::PathBuf;

use anyhow::Result;

use crate::config::CandyConfig;

mod assemble;
mod chunk;
mod inspect;
mod page;

pub use assemble::run_assemble;
pub use chunk::run_chunk;
pub use inspect::run_inspect;
pub use page::run_page;

pub fn run_command(
    config_file: PathBuf,
    max_chunk_size: Option<usize>,
    cmd: crate::Commands,
) -> Result<()> {
    if let crate::Commands::Config { cmd } = cmd {
        return cmd.run(&config_file, max_chunk_size);
    }

    let config = CandyConfig::load(&config_file)?;
    let max_chunk_size = config.max_chunk_size(max_chunk_size);

    match cmd {
        crate::Commands::Chunk { files, out } => run_chunk(&files, &out, max_chunk_size),
        crate::Commands::Assemble { dir, json, out } => run_assemble(&dir, json, out.as_deref()),
        crate::Commands::Page {
            dir,
            zone,
            chunk,
            hex,
        } => run_page(&dir, max_chunk_size, zone, chunk, hex),
        crate::Commands::Inspect { file, json } => run_inspect(&file, json),
        crate::Commands::Config { .. } => unreachable!("handled above"),
    }
}
