//! `tradearc checksum <path>` – print a file digest.

use anyhow::Result;
use std::path::Path;
use tradearc_core::checksum::{self, HashAlgorithm};

/// Compute and print the digest of the given file.
pub async fn run_checksum(path: &Path, hash: HashAlgorithm) -> Result<()> {
    let digest = checksum::digest_path(hash, path)?;
    println!("{}  {}", digest, path.display());
    Ok(())
}
