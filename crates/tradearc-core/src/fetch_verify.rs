//! Fetch-Verify Unit: download one archive file and its `.CHECKSUM` sidecar,
//! check the digest, and classify the result.
//!
//! Every path ends in a [`DownloadOutcome`]; network errors, non-2xx
//! responses, missing sidecars and digest mismatches are statuses, not faults.
//! A mismatch re-runs the whole sequence per the [`RetryPolicy`]; any other
//! status ends the task on the first attempt.

use crate::checksum::{self, ChecksumRecord, HashAlgorithm};
use crate::fetch::{self, FetchError, HttpOptions};
use crate::outcome::{DownloadOutcome, DownloadStatus, VerifyError};
use crate::retry::{run_attempts, RetryPolicy};
use crate::sink::OutputSink;
use crate::task::FileTask;

/// Static input to the unit; built from `FetchConfig::unit_config`.
#[derive(Debug, Clone, Default)]
pub struct UnitConfig {
    pub http: HttpOptions,
    pub retry: RetryPolicy,
    pub hash: HashAlgorithm,
}

#[derive(Debug, Clone)]
pub struct FetchVerifyUnit {
    config: UnitConfig,
    sink: OutputSink,
}

impl FetchVerifyUnit {
    pub fn new(config: UnitConfig, sink: OutputSink) -> Self {
        Self { config, sink }
    }

    pub fn config(&self) -> &UnitConfig {
        &self.config
    }

    pub fn sink(&self) -> &OutputSink {
        &self.sink
    }

    /// GET the archive file.
    pub fn fetch(&self, task: &FileTask) -> Result<Vec<u8>, FetchError> {
        let url = task.content_url()?;
        fetch::get(&url, &self.config.http)
    }

    /// GET the `.CHECKSUM` sidecar.
    pub fn fetch_checksum(&self, task: &FileTask) -> Result<Vec<u8>, FetchError> {
        let url = task.checksum_url()?;
        fetch::get(&url, &self.config.http)
    }

    /// Digest of `content` equals the sidecar's first token (case-insensitive).
    pub fn verify(&self, content: &[u8], sidecar: &[u8]) -> bool {
        checksum::verify(self.config.hash, content, sidecar)
    }

    /// Fetch, store, and verify `task`, retrying the whole sequence on mismatch.
    /// Returns the last attempt's outcome.
    pub fn download_with_verification(&self, task: &FileTask) -> DownloadOutcome {
        let outcome = run_attempts(&self.config.retry, |attempt| {
            tracing::debug!(file = %task.filename, attempt, "fetch attempt");
            self.attempt(task)
        });
        match outcome.status {
            DownloadStatus::Verified | DownloadStatus::NoChecksum => tracing::info!(
                file = %outcome.filename,
                status = %outcome.status,
                bytes = outcome.bytes_transferred,
                attempts = outcome.attempts,
                "file done"
            ),
            _ => tracing::warn!(
                file = %outcome.filename,
                status = %outcome.status,
                bytes = outcome.bytes_transferred,
                attempts = outcome.attempts,
                detail = outcome.error_detail.as_deref().unwrap_or(""),
                "file failed"
            ),
        }
        outcome
    }

    /// One full attempt. The byte counter starts at zero every time.
    fn attempt(&self, task: &FileTask) -> DownloadOutcome {
        let mut written = 0u64;
        match self.try_attempt(task, &mut written) {
            Ok(()) => DownloadOutcome::verified(task, written),
            Err(e) => DownloadOutcome::from_error(task, written, &e),
        }
    }

    fn try_attempt(&self, task: &FileTask, written: &mut u64) -> Result<(), VerifyError> {
        let content = self.fetch(task).map_err(VerifyError::Download)?;
        *written = self.sink.write_file(&task.filename, &content)?;

        let sidecar = self
            .fetch_checksum(task)
            .map_err(VerifyError::ChecksumMissing)?;

        let actual = checksum::digest_hex(self.config.hash, &content);
        match ChecksumRecord::parse(&sidecar) {
            Some(record) if record.matches(&actual) => Ok(()),
            Some(record) => Err(VerifyError::ChecksumMismatch {
                expected: record.expected,
                actual,
            }),
            None => Err(VerifyError::ChecksumMismatch {
                expected: "<blank sidecar>".to_string(),
                actual,
            }),
        }
    }
}
