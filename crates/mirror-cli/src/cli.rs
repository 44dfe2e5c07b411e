//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::Parser;
use mirror_core::PartialConfig;

/// Folder Mirror - Keep a replica directory identical to a source directory
#[derive(Parser, Debug)]
#[command(name = "mirror")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory to mirror from (never modified)
    #[arg(short, long, env = "MIRROR_SOURCE", value_name = "PATH")]
    pub source: Option<PathBuf>,

    /// Directory kept identical to the source
    #[arg(short, long, env = "MIRROR_REPLICA", value_name = "PATH")]
    pub replica: Option<PathBuf>,

    /// File that receives one line per change
    #[arg(short, long, env = "MIRROR_LOG", value_name = "PATH")]
    pub log: Option<PathBuf>,

    /// Seconds to wait between the end of one cycle and the start of the next
    #[arg(
        short,
        long,
        env = "MIRROR_TIME",
        value_name = "SECONDS",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub time: Option<u64>,

    /// Read settings from a .toml or .json file
    ///
    /// Flags and environment variables take precedence over the file.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Run a single cycle and exit
    #[arg(long)]
    pub once: bool,

    /// Print what one cycle would change without touching the replica or the log
    #[arg(long, conflicts_with = "once")]
    pub dry_run: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Settings given on the command line or through the environment.
    pub fn to_partial(&self) -> PartialConfig {
        PartialConfig {
            source: self.source.clone(),
            replica: self.replica.clone(),
            log: self.log.clone(),
            interval_secs: self.time,
        }
    }
}
