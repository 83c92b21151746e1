//! Per-run summary: one outcome per file, counts per status, total bytes.

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::outcome::{DownloadOutcome, DownloadStatus};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub verified: usize,
    pub no_checksum: usize,
    pub checksum_failed: usize,
    pub download_failed: usize,
    pub error: usize,
}

impl StatusCounts {
    pub fn record(&mut self, status: DownloadStatus) {
        match status {
            DownloadStatus::Verified => self.verified += 1,
            DownloadStatus::NoChecksum => self.no_checksum += 1,
            DownloadStatus::ChecksumFailed => self.checksum_failed += 1,
            DownloadStatus::DownloadFailed => self.download_failed += 1,
            DownloadStatus::Error => self.error += 1,
        }
    }

    pub fn get(&self, status: DownloadStatus) -> usize {
        match status {
            DownloadStatus::Verified => self.verified,
            DownloadStatus::NoChecksum => self.no_checksum,
            DownloadStatus::ChecksumFailed => self.checksum_failed,
            DownloadStatus::DownloadFailed => self.download_failed,
            DownloadStatus::Error => self.error,
        }
    }

    pub fn total(&self) -> usize {
        self.verified + self.no_checksum + self.checksum_failed + self.download_failed + self.error
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub symbol: String,
    pub base_url: String,
    /// Seconds since the Unix epoch when the summary was built.
    pub generated_at_unix: u64,
    pub files: Vec<DownloadOutcome>,
    pub counts: StatusCounts,
    pub total_bytes: u64,
    /// At least one file reached `verified`.
    pub success: bool,
}

impl RunSummary {
    pub fn new(symbol: &str, base_url: &str, files: Vec<DownloadOutcome>) -> Self {
        let mut counts = StatusCounts::default();
        let mut total_bytes = 0u64;
        for f in &files {
            counts.record(f.status);
            total_bytes += f.bytes_transferred;
        }
        let generated_at_unix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Self {
            symbol: symbol.to_string(),
            base_url: base_url.to_string(),
            generated_at_unix,
            files,
            counts,
            total_bytes,
            success: counts.verified > 0,
        }
    }
}
