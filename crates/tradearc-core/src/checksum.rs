//! Content digests and `.CHECKSUM` sidecar records.
//!
//! Archive sidecars carry the expected digest as the first whitespace-delimited
//! token (`<hex>  <filename>`). Comparison is case-insensitive.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

const BUF_SIZE: usize = 64 * 1024;

/// Digest used to check downloaded content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    /// 128-bit MD5, as published by the trade archive.
    #[default]
    Md5,
    Sha256,
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HashAlgorithm::Md5 => write!(f, "md5"),
            HashAlgorithm::Sha256 => write!(f, "sha256"),
        }
    }
}

impl FromStr for HashAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "md5" => Ok(HashAlgorithm::Md5),
            "sha256" | "sha-256" => Ok(HashAlgorithm::Sha256),
            other => Err(format!("unknown hash algorithm: {}", other)),
        }
    }
}

/// Streaming hasher over either algorithm.
enum Hasher {
    Md5(md5::Context),
    Sha256(Sha256),
}

impl Hasher {
    fn new(algo: HashAlgorithm) -> Self {
        match algo {
            HashAlgorithm::Md5 => Hasher::Md5(md5::Context::new()),
            HashAlgorithm::Sha256 => Hasher::Sha256(Sha256::new()),
        }
    }

    fn update(&mut self, data: &[u8]) {
        match self {
            Hasher::Md5(ctx) => ctx.consume(data),
            Hasher::Sha256(h) => h.update(data),
        }
    }

    fn finish_hex(self) -> String {
        match self {
            Hasher::Md5(ctx) => format!("{:x}", ctx.compute()),
            Hasher::Sha256(h) => hex::encode(h.finalize()),
        }
    }
}

/// Digest of `data` as lowercase hex.
pub fn digest_hex(algo: HashAlgorithm, data: &[u8]) -> String {
    let mut hasher = Hasher::new(algo);
    hasher.update(data);
    hasher.finish_hex()
}

/// Digest of a file as lowercase hex.
/// Reads in chunks to keep memory use bounded; suitable for large archives.
pub fn digest_path(algo: HashAlgorithm, path: &Path) -> Result<String> {
    let mut f = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let mut hasher = Hasher::new(algo);
    let mut buf = vec![0u8; BUF_SIZE];
    loop {
        let n = f
            .read(&mut buf)
            .with_context(|| format!("read {}", path.display()))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hasher.finish_hex())
}

/// Compute SHA-256 of a file and return the digest as lowercase hex.
pub fn sha256_path(path: &Path) -> Result<String> {
    digest_path(HashAlgorithm::Sha256, path)
}

/// Expected digest taken from a `.CHECKSUM` sidecar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChecksumRecord {
    pub expected: String,
}

impl ChecksumRecord {
    /// First whitespace-delimited token of the sidecar. `None` if the sidecar is blank.
    pub fn parse(sidecar: &[u8]) -> Option<Self> {
        let text = String::from_utf8_lossy(sidecar);
        text.split_whitespace().next().map(|tok| ChecksumRecord {
            expected: tok.to_string(),
        })
    }

    pub fn matches(&self, actual_hex: &str) -> bool {
        self.expected.eq_ignore_ascii_case(actual_hex)
    }
}

/// True when the digest of `content` equals the sidecar's expected value.
pub fn verify(algo: HashAlgorithm, content: &[u8], sidecar: &[u8]) -> bool {
    match ChecksumRecord::parse(sidecar) {
        Some(record) => record.matches(&digest_hex(algo, content)),
        None => false,
    }
}
