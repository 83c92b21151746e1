//! `tradearc fetch` – download and verify the configured files for a symbol.

use anyhow::{Context, Result};
use tradearc_core::config::{self, FetchConfig};

use crate::cli::FetchArgs;

/// Apply CLI overrides on top of a loaded config. Repeatable flags replace lists.
pub fn apply_overrides(mut cfg: FetchConfig, args: &FetchArgs) -> FetchConfig {
    if let Some(symbol) = &args.symbol {
        cfg.symbol = symbol.clone();
    }
    if let Some(base_url) = &args.base_url {
        cfg.base_url = base_url.clone();
    }
    if !args.files.is_empty() || !args.months.is_empty() {
        cfg.files = args.files.clone();
        cfg.months = args.months.clone();
    }
    if let Some(n) = args.max_retries {
        cfg.retry.get_or_insert_with(Default::default).max_attempts = n;
    }
    if let Some(secs) = args.timeout_secs {
        cfg.timeout_secs = secs;
    }
    if let Some(dir) = &args.output {
        cfg.output_dir = dir.clone();
    }
    if let Some(jobs) = args.jobs {
        cfg.jobs = jobs;
    }
    if let Some(hash) = args.hash {
        cfg.hash = hash;
    }
    cfg
}

pub async fn run_fetch(args: &FetchArgs) -> Result<()> {
    let base = match &args.config {
        Some(path) => config::load_from_path(path)?,
        None => config::load_or_init()?,
    };
    let cfg = apply_overrides(base, args);
    tracing::debug!("effective config: {:?}", cfg);

    let report = tokio::task::spawn_blocking(move || tradearc_core::runner::run(&cfg))
        .await
        .context("fetch worker")??;

    let summary = &report.summary;
    for f in &summary.files {
        match &f.error_detail {
            Some(detail) => println!(
                "{:<16} {:>12}  {}  ({}; attempts={})",
                f.status, f.bytes_transferred, f.filename, detail, f.attempts
            ),
            None => println!(
                "{:<16} {:>12}  {}",
                f.status, f.bytes_transferred, f.filename
            ),
        }
    }
    println!(
        "{} verified, {} no checksum, {} checksum failed, {} download failed, {} error; {} bytes",
        summary.counts.verified,
        summary.counts.no_checksum,
        summary.counts.checksum_failed,
        summary.counts.download_failed,
        summary.counts.error,
        summary.total_bytes
    );
    println!("Summary written to {}", report.summary_path.display());

    if !summary.success {
        anyhow::bail!("no file was verified for {}", summary.symbol);
    }
    Ok(())
}
