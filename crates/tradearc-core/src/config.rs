use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::checksum::HashAlgorithm;
use crate::fetch::HttpOptions;
use crate::fetch_verify::UnitConfig;
use crate::retry::RetryPolicy;

/// Placeholder in `base_url` replaced by the configured symbol.
pub const SYMBOL_PLACEHOLDER: &str = "{symbol}";

/// Checksum-mismatch retry parameters (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of fetch+verify attempts per file (including the first).
    pub max_attempts: u32,
    /// Base delay in seconds between mismatched attempts (e.g. 0.25 = 250ms).
    pub base_delay_secs: f64,
    /// Maximum delay in seconds.
    pub max_delay_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_secs: 0.25,
            max_delay_secs: 30,
        }
    }
}

impl RetryConfig {
    pub fn to_policy(&self) -> RetryPolicy {
        // Negative, NaN or overflowing values mean "no delay".
        let base = Duration::try_from_secs_f64(self.base_delay_secs).unwrap_or(Duration::ZERO);
        RetryPolicy {
            max_attempts: self.max_attempts,
            base_delay: base,
            max_delay: Duration::from_secs(self.max_delay_secs),
        }
    }
}

/// Run configuration loaded from `~/.config/tradearc/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Trading symbol; also the output subdirectory name.
    pub symbol: String,
    /// Remote archive base URL. `{symbol}` is substituted.
    pub base_url: String,
    /// Explicit file names to fetch.
    #[serde(default)]
    pub files: Vec<String>,
    /// Months (`YYYY-MM`) expanded to `<SYMBOL>-trades-<YYYY-MM>.zip`.
    #[serde(default)]
    pub months: Vec<String>,
    /// Local directory that receives `<symbol>/<file>` and `<symbol>/summary.json`.
    pub output_dir: PathBuf,
    /// Per-request timeout in seconds (connect and total).
    pub timeout_secs: u64,
    /// Digest used to check sidecars.
    #[serde(default)]
    pub hash: HashAlgorithm,
    /// Number of files fetched concurrently (1 = sequential).
    #[serde(default = "default_jobs")]
    pub jobs: usize,
    /// Optional retry policy; if missing, built-in defaults are used.
    #[serde(default)]
    pub retry: Option<RetryConfig>,
}

fn default_jobs() -> usize {
    1
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            symbol: "BTCUSDT".to_string(),
            base_url: "https://data.binance.vision/data/spot/monthly/trades/{symbol}/"
                .to_string(),
            files: Vec::new(),
            months: Vec::new(),
            output_dir: PathBuf::from("data"),
            timeout_secs: 30,
            hash: HashAlgorithm::default(),
            jobs: default_jobs(),
            retry: None,
        }
    }
}

impl FetchConfig {
    /// Trim surrounding whitespace from the symbol, base URL and list entries
    /// so URLs, file names and the output dir all see the same values.
    pub fn normalized(mut self) -> Self {
        self.symbol = self.symbol.trim().to_string();
        self.base_url = self.base_url.trim().to_string();
        for f in self.files.iter_mut().chain(self.months.iter_mut()) {
            *f = f.trim().to_string();
        }
        self.files.retain(|f| !f.is_empty());
        self.months.retain(|m| !m.is_empty());
        self
    }

    /// Base URL with the symbol placeholder filled in.
    pub fn resolved_base_url(&self) -> String {
        self.base_url.replace(SYMBOL_PLACEHOLDER, &self.symbol)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry.clone().unwrap_or_default().to_policy()
    }

    pub fn http_options(&self) -> HttpOptions {
        HttpOptions {
            timeout: Duration::from_secs(self.timeout_secs),
            ..HttpOptions::default()
        }
    }

    pub fn unit_config(&self) -> UnitConfig {
        UnitConfig {
            http: self.http_options(),
            retry: self.retry_policy(),
            hash: self.hash,
        }
    }

    /// Reject values that would make every fetch fail or escape the output dir.
    pub fn validate(&self) -> Result<()> {
        let symbol = self.symbol.as_str();
        if symbol.is_empty() {
            anyhow::bail!("symbol must not be empty");
        }
        if symbol.trim() != symbol {
            anyhow::bail!("symbol {:?} has surrounding whitespace", self.symbol);
        }
        if symbol.contains(['/', '\\']) || symbol == "." || symbol == ".." {
            anyhow::bail!("symbol {:?} is not a valid directory name", self.symbol);
        }
        if self.timeout_secs == 0 {
            anyhow::bail!("timeout_secs must be greater than zero");
        }
        let base = self.resolved_base_url();
        url::Url::parse(&base).with_context(|| format!("invalid base_url {}", base))?;
        Ok(())
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("tradearc")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from an explicit path. The file must exist.
pub fn load_from_path(path: &Path) -> Result<FetchConfig> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("read config {}", path.display()))?;
    let cfg: FetchConfig =
        toml::from_str(&data).with_context(|| format!("parse config {}", path.display()))?;
    Ok(cfg.normalized())
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<FetchConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = FetchConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    load_from_path(&path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = FetchConfig::default();
        assert_eq!(cfg.symbol, "BTCUSDT");
        assert_eq!(cfg.timeout_secs, 30);
        assert_eq!(cfg.jobs, 1);
        assert_eq!(cfg.hash, HashAlgorithm::Md5);
        assert!(cfg.files.is_empty());
        assert!(cfg.retry.is_none());
        cfg.validate().unwrap();
    }

    #[test]
    fn resolved_base_url_substitutes_symbol() {
        let mut cfg = FetchConfig::default();
        cfg.symbol = "ETHUSDT".to_string();
        assert_eq!(
            cfg.resolved_base_url(),
            "https://data.binance.vision/data/spot/monthly/trades/ETHUSDT/"
        );
        cfg.base_url = "http://mirror.local/archive".to_string();
        assert_eq!(cfg.resolved_base_url(), "http://mirror.local/archive");
    }

    #[test]
    fn config_toml_roundtrip() {
        let mut cfg = FetchConfig::default();
        cfg.files = vec!["BTCUSDT-trades-2024-01.zip".to_string()];
        cfg.retry = Some(RetryConfig::default());
        let toml = toml::to_string_pretty(&cfg).unwrap();
        let parsed: FetchConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.symbol, cfg.symbol);
        assert_eq!(parsed.base_url, cfg.base_url);
        assert_eq!(parsed.files, cfg.files);
        assert_eq!(parsed.output_dir, cfg.output_dir);
        assert_eq!(parsed.retry.unwrap().max_attempts, 3);
    }

    #[test]
    fn config_toml_custom_values() {
        let toml = r#"
            symbol = "SOLUSDT"
            base_url = "http://127.0.0.1:9000/{symbol}/"
            months = ["2024-01", "2024-02"]
            output_dir = "/tmp/trades"
            timeout_secs = 5
            hash = "sha256"
            jobs = 4

            [retry]
            max_attempts = 2
            base_delay_secs = 0.0
            max_delay_secs = 1
        "#;
        let cfg: FetchConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.resolved_base_url(), "http://127.0.0.1:9000/SOLUSDT/");
        assert_eq!(cfg.months.len(), 2);
        assert_eq!(cfg.hash, HashAlgorithm::Sha256);
        assert_eq!(cfg.jobs, 4);
        let unit = cfg.unit_config();
        assert_eq!(unit.http.timeout, Duration::from_secs(5));
        assert_eq!(unit.retry.max_attempts, 2);
        assert_eq!(unit.retry.base_delay, Duration::ZERO);
    }

    #[test]
    fn config_toml_optional_fields_default() {
        let toml = r#"
            symbol = "BTCUSDT"
            base_url = "https://example.com/"
            output_dir = "out"
            timeout_secs = 30
        "#;
        let cfg: FetchConfig = toml::from_str(toml).unwrap();
        assert!(cfg.files.is_empty());
        assert!(cfg.months.is_empty());
        assert_eq!(cfg.jobs, 1);
        assert_eq!(cfg.hash, HashAlgorithm::Md5);
        assert_eq!(cfg.retry_policy().max_attempts, 3);
    }

    #[test]
    fn validate_rejects_bad_values() {
        let mut cfg = FetchConfig::default();
        cfg.symbol = "../etc".to_string();
        assert!(cfg.validate().is_err());

        let mut cfg = FetchConfig::default();
        cfg.timeout_secs = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = FetchConfig::default();
        cfg.base_url = "not a url".to_string();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn normalized_trims_symbol_base_and_lists() {
        let mut cfg = FetchConfig::default();
        cfg.symbol = " BTCUSDT\t".to_string();
        cfg.base_url = "  https://example.com/{symbol}/ ".to_string();
        cfg.files = vec![" a.zip ".to_string(), "   ".to_string()];
        cfg.months = vec![" 2024-01".to_string()];
        assert!(cfg.validate().is_err());

        let cfg = cfg.normalized();
        assert_eq!(cfg.symbol, "BTCUSDT");
        assert_eq!(cfg.resolved_base_url(), "https://example.com/BTCUSDT/");
        assert_eq!(cfg.files, ["a.zip"]);
        assert_eq!(cfg.months, ["2024-01"]);
        cfg.validate().unwrap();
    }

    #[test]
    fn load_from_path_trims_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "symbol = \" ETHUSDT \"\nbase_url = \"https://example.com/{symbol}/\"\noutput_dir = \"o\"\ntimeout_secs = 10\n",
        )
        .unwrap();
        let cfg = load_from_path(&path).unwrap();
        assert_eq!(cfg.symbol, "ETHUSDT");
        assert_eq!(cfg.resolved_base_url(), "https://example.com/ETHUSDT/");
    }

    #[test]
    fn load_from_path_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "symbol = \"BNBUSDT\"\nbase_url = \"https://example.com/\"\noutput_dir = \"o\"\ntimeout_secs = 10\n",
        )
        .unwrap();
        let cfg = load_from_path(&path).unwrap();
        assert_eq!(cfg.symbol, "BNBUSDT");
        assert_eq!(cfg.timeout_secs, 10);
        assert!(load_from_path(&dir.path().join("missing.toml")).is_err());
    }
}
