//! Attempt loop: re-run the sequence until a terminal status or the policy says stop.

use super::policy::{RetryDecision, RetryPolicy};
use crate::outcome::DownloadOutcome;

/// Runs `attempt_fn` with a 1-based attempt counter until the policy stops it.
/// Returns the last outcome, whatever its status.
pub fn run_attempts<F>(policy: &RetryPolicy, mut attempt_fn: F) -> DownloadOutcome
where
    F: FnMut(u32) -> DownloadOutcome,
{
    let mut attempt = 1u32;
    loop {
        let outcome = attempt_fn(attempt).with_attempt(attempt);
        match policy.decide(attempt, outcome.status) {
            RetryDecision::NoRetry => return outcome,
            RetryDecision::RetryAfter(d) => {
                tracing::warn!(
                    file = %outcome.filename,
                    attempt,
                    max_attempts = policy.max_attempts,
                    "checksum mismatch, retrying in {:?}",
                    d
                );
                if !d.is_zero() {
                    std::thread::sleep(d);
                }
                attempt += 1;
            }
        }
    }
}
