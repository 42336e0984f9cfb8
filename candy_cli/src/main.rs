use crate::init_config::CmdConfig;
use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use clap_verbosity_flag::InfoLevel;
use directories::ProjectDirs;
use std::path::PathBuf;

mod cmd;
mod config;
mod helpers;
mod init_config;

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// config file to use instead of the default location
    #[arg(short, long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    /// override the configured chunk budget in bytes (0 = one chunk per zone)
    #[arg(long, value_name = "BYTES", global = true)]
    max_chunk_size: Option<usize>,

    #[command(flatten)]
    verbosity: clap_verbosity_flag::Verbosity<InfoLevel>,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Modify the candy config file
    Config {
        #[command(subcommand)]
        cmd: CmdConfig,
    },
    /// Encode files as byte values, one zone per file, and write their chunks
    Chunk {
        /// Input files, in zone order
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Directory that receives one `z<zone>-c<chunk>.chunk` file per chunk
        #[arg(short, long, value_name = "DIR")]
        out: PathBuf,
    },
    /// Reassemble a directory of chunk files and print the decoded values
    Assemble {
        /// Directory holding `.chunk` files
        dir: PathBuf,
        /// Print values as JSON, one line per zone
        #[arg(long, action = ArgAction::SetTrue)]
        json: bool,
        /// Also write each value's byte view to `<DIR>/z<zone>.bin`
        #[arg(long, value_name = "DIR")]
        out: Option<PathBuf>,
    },
    /// Re-chunk a directory of chunk files and serve the page at a cursor
    Page {
        /// Directory holding `.chunk` files
        dir: PathBuf,
        #[arg(long, value_name = "ID", default_value_t = 0)]
        zone: u64,
        #[arg(long, value_name = "ID", default_value_t = 0)]
        chunk: u64,
        /// Print the page payload as hex
        #[arg(long, action = ArgAction::SetTrue)]
        hex: bool,
    },
    /// Decode a single encoded value file
    Inspect {
        file: PathBuf,
        #[arg(long, action = ArgAction::SetTrue)]
        json: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // stdout carries command output only
    tracing_subscriber::fmt()
        .with_max_level(cli.verbosity)
        .with_writer(std::io::stderr)
        .init();

    // Config file: ~/.config/candy/config.toml unless --config is given
    let config_file = match cli.config {
        Some(path) => path,
        None => ProjectDirs::from("", "", "candy")
            .context("failed to determine config directory path")?
            .config_dir()
            .join("config.toml"),
    };

    cmd::run_command(config_file, cli.max_chunk_size, cli.cmd)
}
