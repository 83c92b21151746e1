//! Blocking HTTP GET with a bounded timeout.
//!
//! Uses the curl crate (libcurl). Runs in the current thread; call from
//! `spawn_blocking` if used from async code.

mod error;

pub use error::FetchError;

use std::time::Duration;

/// Per-request HTTP settings.
#[derive(Debug, Clone)]
pub struct HttpOptions {
    /// Upper bound on the whole request (connect + transfer).
    pub timeout: Duration,
    /// Upper bound on connection setup; clamped to `timeout`.
    pub connect_timeout: Duration,
    pub user_agent: String,
}

impl Default for HttpOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(30),
            user_agent: concat!("tradearc/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// GET `url` and return the full body. Follows redirects.
/// Non-2xx responses and curl failures are returned as `FetchError`.
/// A zero timeout is rejected: libcurl would read it as "never time out".
pub fn get(url: &str, opts: &HttpOptions) -> Result<Vec<u8>, FetchError> {
    if opts.timeout.is_zero() {
        return Err(FetchError::UnboundedTimeout);
    }
    let mut body: Vec<u8> = Vec::new();

    let mut easy = curl::easy::Easy::new();
    easy.url(url)?;
    easy.get(true)?;
    easy.follow_location(true)?;
    easy.max_redirections(10)?;
    easy.useragent(&opts.user_agent)?;
    easy.connect_timeout(opts.connect_timeout.min(opts.timeout))?;
    easy.timeout(opts.timeout)?;

    {
        let mut transfer = easy.transfer();
        transfer.write_function(|data| {
            body.extend_from_slice(data);
            Ok(data.len())
        })?;
        transfer.perform()?;
    }

    let code = easy.response_code()?;
    if !(200..300).contains(&code) {
        return Err(FetchError::HttpStatus(code));
    }
    tracing::debug!(url, bytes = body.len(), "GET ok");
    Ok(body)
}
