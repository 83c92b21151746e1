//! Checksum-mismatch retry policy.
//!
//! A mismatched digest re-runs the whole fetch+verify sequence up to a bounded
//! number of attempts. Every other status is terminal on the first attempt.

mod policy;
mod run;

pub use policy::{RetryDecision, RetryPolicy};
pub use run::run_attempts;
