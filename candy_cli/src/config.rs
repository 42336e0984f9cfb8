use std::fs;
use std::path::Path;

use anyhow::Context;
use candy_core::ChunkingConfig;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CandyConfig {
    pub chunking: ChunkingConfig,
}

impl CandyConfig {
    /// Reads the config file, falling back to defaults when it is absent.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            debug!("no config file at {path:?}, using defaults");
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("could not parse config file {}", path.display()))
    }

    /// Chunk budget after applying a command line override.
    pub fn max_chunk_size(&self, cli_override: Option<usize>) -> usize {
        cli_override.unwrap_or(self.chunking.max_chunk_size)
    }
}
