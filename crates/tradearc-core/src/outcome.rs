//! Classified result of one fetch+verify attempt.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::fetch::FetchError;
use crate::task::FileTask;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DownloadStatus {
    /// Content and sidecar fetched, digest matched.
    Verified,
    /// Content fetched, sidecar unavailable. Accepted as terminal.
    NoChecksum,
    /// Sidecar fetched but digest did not match (after all attempts).
    ChecksumFailed,
    /// Content could not be fetched.
    DownloadFailed,
    /// Local failure (e.g. write to the output directory).
    Error,
}

impl DownloadStatus {
    pub const ALL: [DownloadStatus; 5] = [
        DownloadStatus::Verified,
        DownloadStatus::NoChecksum,
        DownloadStatus::ChecksumFailed,
        DownloadStatus::DownloadFailed,
        DownloadStatus::Error,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DownloadStatus::Verified => "verified",
            DownloadStatus::NoChecksum => "no_checksum",
            DownloadStatus::ChecksumFailed => "checksum_failed",
            DownloadStatus::DownloadFailed => "download_failed",
            DownloadStatus::Error => "error",
        }
    }

    /// Only a digest mismatch is worth re-running the whole sequence for.
    pub fn is_retryable(&self) -> bool {
        matches!(self, DownloadStatus::ChecksumFailed)
    }
}

impl fmt::Display for DownloadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Anything that stops an attempt short of `verified`.
#[derive(Debug, Error)]
pub enum VerifyError {
    /// Content GET failed (network, timeout, non-2xx).
    #[error("download: {0}")]
    Download(#[source] FetchError),
    /// Sidecar GET failed; content is kept.
    #[error("checksum unavailable: {0}")]
    ChecksumMissing(#[source] FetchError),
    #[error("checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch { expected: String, actual: String },
    /// Writing to the output directory failed.
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

impl VerifyError {
    pub fn status(&self) -> DownloadStatus {
        match self {
            VerifyError::Download(_) => DownloadStatus::DownloadFailed,
            VerifyError::ChecksumMissing(_) => DownloadStatus::NoChecksum,
            VerifyError::ChecksumMismatch { .. } => DownloadStatus::ChecksumFailed,
            VerifyError::Io(_) => DownloadStatus::Error,
        }
    }
}

/// Result of one attempt for one file. Immutable once returned; a retry
/// produces a fresh outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadOutcome {
    pub filename: String,
    pub status: DownloadStatus,
    /// Bytes written to the output directory by this attempt.
    pub bytes_transferred: u64,
    /// 1-based attempt number that produced this outcome.
    pub attempts: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<String>,
}

impl DownloadOutcome {
    pub fn verified(task: &FileTask, bytes: u64) -> Self {
        Self {
            filename: task.filename.clone(),
            status: DownloadStatus::Verified,
            bytes_transferred: bytes,
            attempts: 1,
            error_detail: None,
        }
    }

    pub fn from_error(task: &FileTask, bytes: u64, err: &VerifyError) -> Self {
        Self {
            filename: task.filename.clone(),
            status: err.status(),
            bytes_transferred: bytes,
            attempts: 1,
            error_detail: Some(err.to_string()),
        }
    }

    pub fn with_attempt(mut self, attempt: u32) -> Self {
        self.attempts = attempt;
        self
    }
}
