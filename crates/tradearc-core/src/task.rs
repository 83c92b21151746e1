//! One downloadable unit: a file name under a remote base URL.

use serde::{Deserialize, Serialize};
use url::Url;

/// Suffix of the checksum sidecar published next to each archive file.
pub const CHECKSUM_SUFFIX: &str = ".CHECKSUM";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileTask {
    pub filename: String,
    pub remote_base_url: String,
}

impl FileTask {
    pub fn new(remote_base_url: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            remote_base_url: remote_base_url.into(),
        }
    }

    /// `<base>/<filename>`; a trailing `/` is added to the base when missing.
    pub fn content_url(&self) -> Result<String, url::ParseError> {
        join(&self.remote_base_url, &self.filename)
    }

    /// `<base>/<filename>.CHECKSUM`.
    pub fn checksum_url(&self) -> Result<String, url::ParseError> {
        join(
            &self.remote_base_url,
            &format!("{}{}", self.filename, CHECKSUM_SUFFIX),
        )
    }
}

/// Append `name` as one path segment. The base query (e.g. a signed mirror URL)
/// is kept; `name` is never resolved as a relative reference.
fn join(base: &str, name: &str) -> Result<String, url::ParseError> {
    let mut url = Url::parse(base.trim())?;
    url.path_segments_mut()
        .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
        .pop_if_empty()
        .push(name.trim_start_matches('/'));
    Ok(url.to_string())
}

/// Archive file name for one month of trades, e.g. `BTCUSDT-trades-2024-01.zip`.
pub fn monthly_trades_filename(symbol: &str, month: &str) -> String {
    format!("{}-trades-{}.zip", symbol, month)
}

/// True for `YYYY-MM` with a month in 01..=12.
pub fn is_valid_month(month: &str) -> bool {
    let Some((y, m)) = month.split_once('-') else {
        return false;
    };
    if y.len() != 4 || m.len() != 2 {
        return false;
    }
    if !y.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    matches!(m.parse::<u8>(), Ok(1..=12))
}
