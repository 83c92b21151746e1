pub mod config;
pub mod logging;

pub mod checksum;
pub mod fetch;
pub mod fetch_verify;
pub mod outcome;
pub mod retry;
pub mod runner;
pub mod sink;
pub mod summary;
pub mod task;
