use std::{fs, path::Path};

use anyhow::Context;
use candy_core::config::DEFAULT_MAX_CHUNK_SIZE;
use clap::Subcommand;
use toml_edit::{DocumentMut, Item, Table, value};
use tracing::info;

use crate::helpers::write_atomic;

#[derive(Subcommand)]
pub enum CmdConfig {
    /// Creates the config file if it doesn't exist and fills in missing defaults
    Init,
}

impl CmdConfig {
    /// `max_chunk_size` is the command line override, if any. It replaces
    /// a configured budget; without it an existing budget is kept.
    pub fn run(self, config_file: &Path, max_chunk_size: Option<usize>) -> anyhow::Result<()> {
        let mut doc = if config_file.exists() {
            fs::read_to_string(config_file)?
        } else {
            if let Some(parent) = config_file.parent() {
                fs::create_dir_all(parent)?;
            }
            "".to_owned()
        }
        .parse::<DocumentMut>()
        .context("could not parse config file")?;

        match self {
            Self::Init => {
                let chunking = doc
                    .entry("chunking")
                    .or_insert(Item::Table(Table::new()))
                    .as_table_mut()
                    .context("`chunking` in config file is not a table")?;
                match max_chunk_size {
                    Some(size) => {
                        chunking.insert("max_chunk_size", value(size as i64));
                    }
                    None => {
                        if !chunking.contains_key("max_chunk_size") {
                            chunking
                                .insert("max_chunk_size", value(DEFAULT_MAX_CHUNK_SIZE as i64));
                        }
                    }
                }
            }
        }

        info!("writing to config file {config_file:?}");

        write_atomic(config_file, doc.to_string().as_bytes())
    }
}
