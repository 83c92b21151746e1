//! `tradearc verify <path>` – check a local file against its sidecar.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tradearc_core::checksum::{self, ChecksumRecord, HashAlgorithm};
use tradearc_core::task::CHECKSUM_SUFFIX;

/// Default sidecar location: `<path>.CHECKSUM`.
pub(crate) fn sidecar_path(path: &Path) -> PathBuf {
    let mut s = path.as_os_str().to_os_string();
    s.push(CHECKSUM_SUFFIX);
    PathBuf::from(s)
}

pub async fn run_verify(path: &Path, sidecar: Option<&Path>, hash: HashAlgorithm) -> Result<()> {
    let sidecar = sidecar.map(Path::to_path_buf).unwrap_or_else(|| sidecar_path(path));
    let raw = std::fs::read(&sidecar)
        .with_context(|| format!("read checksum {}", sidecar.display()))?;
    let record = ChecksumRecord::parse(&raw)
        .with_context(|| format!("checksum file {} is empty", sidecar.display()))?;
    let actual = checksum::digest_path(hash, path)?;

    if record.matches(&actual) {
        println!("OK  {}", path.display());
        Ok(())
    } else {
        println!("MISMATCH  {}", path.display());
        anyhow::bail!(
            "{} digest {} does not match expected {}",
            hash,
            actual,
            record.expected
        )
    }
}
