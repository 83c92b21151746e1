//! CLI for tradearc.

mod commands;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tradearc_core::checksum::HashAlgorithm;

use commands::{run_checksum, run_fetch, run_verify};

/// Top-level CLI for tradearc.
#[derive(Debug, Parser)]
#[command(name = "tradearc")]
#[command(about = "tradearc: fetch and verify historical trade archives", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

/// Overrides applied on top of the config file for `tradearc fetch`.
#[derive(Debug, Clone, Default, Args)]
pub struct FetchArgs {
    /// Config file to use instead of ~/.config/tradearc/config.toml.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
    /// Trading symbol (e.g. BTCUSDT).
    #[arg(long)]
    pub symbol: Option<String>,
    /// Remote archive base URL; `{symbol}` is substituted.
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,
    /// File name to fetch (repeatable). Replaces the configured list.
    #[arg(long = "file", value_name = "NAME")]
    pub files: Vec<String>,
    /// Month to fetch as YYYY-MM (repeatable). Replaces the configured list.
    #[arg(long = "month", value_name = "YYYY-MM")]
    pub months: Vec<String>,
    /// Maximum fetch+verify attempts per file on checksum mismatch.
    #[arg(long, value_name = "N")]
    pub max_retries: Option<u32>,
    /// Per-request timeout in seconds.
    #[arg(long, value_name = "SECS")]
    pub timeout_secs: Option<u64>,
    /// Output directory; files land in <DIR>/<SYMBOL>/.
    #[arg(long, value_name = "DIR")]
    pub output: Option<PathBuf>,
    /// Fetch up to N files concurrently (default 1).
    #[arg(long, value_name = "N")]
    pub jobs: Option<usize>,
    /// Digest used to check sidecars: md5 or sha256.
    #[arg(long, value_name = "ALGO")]
    pub hash: Option<HashAlgorithm>,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Download the configured files for a symbol and verify their checksums.
    Fetch(FetchArgs),

    /// Verify a local file against a .CHECKSUM sidecar.
    Verify {
        /// Path to the file.
        path: PathBuf,
        /// Sidecar path (default: <path>.CHECKSUM).
        #[arg(long, value_name = "PATH")]
        checksum: Option<PathBuf>,
        /// Digest algorithm: md5 or sha256.
        #[arg(long, default_value = "md5", value_name = "ALGO")]
        hash: HashAlgorithm,
    },

    /// Print the digest of a file.
    Checksum {
        /// Path to the file.
        path: PathBuf,
        /// Digest algorithm: md5 or sha256.
        #[arg(long, default_value = "sha256", value_name = "ALGO")]
        hash: HashAlgorithm,
    },
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();

        match cli.command {
            CliCommand::Fetch(args) => run_fetch(&args).await?,
            CliCommand::Verify {
                path,
                checksum,
                hash,
            } => run_verify(&path, checksum.as_deref(), hash).await?,
            CliCommand::Checksum { path, hash } => run_checksum(&path, hash).await?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
