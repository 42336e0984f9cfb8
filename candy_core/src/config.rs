//! Chunking policy loaded by callers.
//!
//! The core never reads this on its own: every chunking operation takes
//! its budget as an explicit argument. The type exists so front ends can
//! load the transport's message ceiling from a config file.

use serde::{Deserialize, Serialize};

/// Default per-message budget: a 2 MB transport ceiling leaves room for
/// the request envelope.
pub const DEFAULT_MAX_CHUNK_SIZE: usize = 2_000_000;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Largest chunk payload in bytes. Zero means "one chunk per zone".
    pub max_chunk_size: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_chunk_size: DEFAULT_MAX_CHUNK_SIZE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_use_defaults() {
        let config: ChunkingConfig = toml::from_str("").unwrap();
        assert_eq!(config, ChunkingConfig::default());
    }

    #[test]
    fn test_parse_budget() {
        let config: ChunkingConfig = toml::from_str("max_chunk_size = 1024").unwrap();
        assert_eq!(config.max_chunk_size, 1024);
    }
}
