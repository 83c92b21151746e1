//! Run every configured file through the Fetch-Verify Unit and write the summary.
//!
//! Sequential by default. With `jobs > 1`, a fixed set of worker threads pops
//! tasks from a shared queue; outcomes are put back in task order.

use anyhow::{Context, Result};
use std::collections::{HashSet, VecDeque};
use std::path::PathBuf;
use std::sync::mpsc;
use std::sync::{Arc, Mutex};

use crate::config::FetchConfig;
use crate::fetch_verify::FetchVerifyUnit;
use crate::outcome::{DownloadOutcome, DownloadStatus};
use crate::sink::OutputSink;
use crate::summary::RunSummary;
use crate::task::{is_valid_month, monthly_trades_filename, FileTask};

/// Result of a full run: the summary and where it was written.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub summary: RunSummary,
    pub summary_path: PathBuf,
}

/// Explicit `files` first, then one archive per `months` entry. Order kept, duplicates dropped.
pub fn build_tasks(cfg: &FetchConfig) -> Result<Vec<FileTask>> {
    let base = cfg.resolved_base_url();
    let mut seen = HashSet::new();
    let mut tasks = Vec::new();

    let mut push = |name: String| {
        if seen.insert(name.clone()) {
            tasks.push(FileTask::new(base.clone(), name));
        }
    };

    for f in &cfg.files {
        let f = f.trim();
        if f.is_empty() {
            continue;
        }
        if OutputSink::is_reserved_name(f) {
            anyhow::bail!("file name {:?} is reserved for the run output", f);
        }
        push(f.to_string());
    }
    for m in &cfg.months {
        let m = m.trim();
        if !is_valid_month(m) {
            anyhow::bail!("invalid month {:?} (expected YYYY-MM)", m);
        }
        push(monthly_trades_filename(&cfg.symbol, m));
    }

    if tasks.is_empty() {
        anyhow::bail!("no files to fetch: set `files` or `months`");
    }
    Ok(tasks)
}

/// Run all tasks with `jobs` workers; one outcome per task, in task order.
pub fn run_tasks(
    unit: &Arc<FetchVerifyUnit>,
    tasks: &[FileTask],
    jobs: usize,
) -> Vec<DownloadOutcome> {
    if jobs <= 1 || tasks.len() <= 1 {
        return tasks
            .iter()
            .map(|t| unit.download_with_verification(t))
            .collect();
    }

    let count = tasks.len();
    let work: Arc<Mutex<VecDeque<(usize, FileTask)>>> =
        Arc::new(Mutex::new(tasks.iter().cloned().enumerate().collect()));
    let (tx, rx) = mpsc::channel();
    let num_workers = jobs.min(count);
    let mut handles = Vec::with_capacity(num_workers);
    for _ in 0..num_workers {
        let work = Arc::clone(&work);
        let tx = tx.clone();
        let unit = Arc::clone(unit);
        handles.push(std::thread::spawn(move || loop {
            let next = match work.lock() {
                Ok(mut q) => q.pop_front(),
                Err(_) => None,
            };
            let Some((index, task)) = next else { break };
            let outcome = unit.download_with_verification(&task);
            if tx.send((index, outcome)).is_err() {
                break;
            }
        }));
    }
    drop(tx);

    let mut slots: Vec<Option<DownloadOutcome>> = vec![None; count];
    for (index, outcome) in rx {
        slots[index] = Some(outcome);
    }
    for h in handles {
        if h.join().is_err() {
            tracing::error!("fetch worker panicked");
        }
    }

    slots
        .into_iter()
        .zip(tasks)
        .map(|(slot, task)| {
            slot.unwrap_or_else(|| DownloadOutcome {
                filename: task.filename.clone(),
                status: DownloadStatus::Error,
                bytes_transferred: 0,
                attempts: 0,
                error_detail: Some("worker exited before finishing this file".to_string()),
            })
        })
        .collect()
}

/// Validate config, fetch every file, write `<output>/<symbol>/summary.json`.
pub fn run(cfg: &FetchConfig) -> Result<RunReport> {
    let cfg = &cfg.clone().normalized();
    cfg.validate()?;
    let tasks = build_tasks(cfg)?;
    let sink = OutputSink::new(&cfg.output_dir, &cfg.symbol)?;
    let base_url = cfg.resolved_base_url();

    tracing::info!(
        symbol = %cfg.symbol,
        base_url = %base_url,
        files = tasks.len(),
        jobs = cfg.jobs,
        "starting fetch run"
    );

    let unit = Arc::new(FetchVerifyUnit::new(cfg.unit_config(), sink.clone()));
    let outcomes = run_tasks(&unit, &tasks, cfg.jobs);

    let summary = RunSummary::new(&cfg.symbol, &base_url, outcomes);
    let summary_path = sink
        .write_summary(&summary)
        .context("write run summary")?;

    tracing::info!(
        verified = summary.counts.verified,
        no_checksum = summary.counts.no_checksum,
        checksum_failed = summary.counts.checksum_failed,
        download_failed = summary.counts.download_failed,
        error = summary.counts.error,
        total_bytes = summary.total_bytes,
        success = summary.success,
        "fetch run finished"
    );

    Ok(RunReport {
        summary,
        summary_path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> FetchConfig {
        FetchConfig {
            base_url: "https://example.com/{symbol}".to_string(),
            ..FetchConfig::default()
        }
    }

    #[test]
    fn build_tasks_files_then_months_dedup() {
        let mut c = cfg();
        c.files = vec![
            "BTCUSDT-trades-2024-01.zip".to_string(),
            "extra.zip".to_string(),
            "  ".to_string(),
        ];
        c.months = vec!["2024-01".to_string(), "2024-02".to_string()];
        let tasks = build_tasks(&c).unwrap();
        let names: Vec<_> = tasks.iter().map(|t| t.filename.as_str()).collect();
        assert_eq!(
            names,
            [
                "BTCUSDT-trades-2024-01.zip",
                "extra.zip",
                "BTCUSDT-trades-2024-02.zip"
            ]
        );
        assert!(tasks
            .iter()
            .all(|t| t.remote_base_url == "https://example.com/BTCUSDT"));
    }

    #[test]
    fn build_tasks_rejects_empty_and_bad_month() {
        assert!(build_tasks(&cfg()).is_err());
        let mut c = cfg();
        c.months = vec!["2024-13".to_string()];
        assert!(build_tasks(&c).is_err());
    }

    #[test]
    fn build_tasks_rejects_reserved_names() {
        for bad in ["summary.json", "BTCUSDT-trades-2024-01.zip.part"] {
            let mut c = cfg();
            c.files = vec!["a.zip".to_string(), bad.to_string()];
            let err = build_tasks(&c).unwrap_err();
            assert!(err.to_string().contains("reserved"), "{}", err);
        }
    }

    #[test]
    fn run_uses_trimmed_symbol_for_urls_and_output_dir() {
        let out = tempfile::tempdir().unwrap();
        let mut c = cfg();
        c.symbol = " BTCUSDT ".to_string();
        // Nothing listens on port 9; every file ends as download_failed.
        c.base_url = "http://127.0.0.1:9/{symbol}".to_string();
        c.months = vec!["2024-01".to_string()];
        c.output_dir = out.path().to_path_buf();
        c.timeout_secs = 2;

        let report = run(&c).unwrap();
        assert_eq!(report.summary.symbol, "BTCUSDT");
        assert_eq!(report.summary.base_url, "http://127.0.0.1:9/BTCUSDT");
        assert_eq!(report.summary.files[0].filename, "BTCUSDT-trades-2024-01.zip");
        assert_eq!(
            report.summary_path,
            out.path().join("BTCUSDT").join("summary.json")
        );
    }

    #[test]
    fn run_fails_fast_on_invalid_config() {
        let out = tempfile::tempdir().unwrap();
        let mut c = cfg();
        c.output_dir = out.path().to_path_buf();
        c.files = vec!["a.zip".to_string()];
        c.timeout_secs = 0;
        assert!(run(&c).is_err());
    }
}
