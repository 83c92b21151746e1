//! Failure of a single HTTP GET.

use thiserror::Error;

/// Why a GET did not yield a body. Expected conditions (404, timeout) are
/// values of this type, never panics.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Curl reported an error (timeout, connection refused, DNS, etc.).
    #[error("network: {0}")]
    Network(#[source] curl::Error),
    /// HTTP response had a non-2xx status.
    #[error("HTTP {0}")]
    HttpStatus(u32),
    /// Request timeout was zero, which libcurl treats as unbounded.
    #[error("request timeout must be greater than zero")]
    UnboundedTimeout,
    /// Base URL and filename did not form a valid URL.
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl FetchError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, FetchError::Network(e) if e.is_operation_timedout())
    }

    /// True for refused/reset/DNS failures (not timeouts).
    pub fn is_connection(&self) -> bool {
        match self {
            FetchError::Network(e) => {
                e.is_couldnt_connect()
                    || e.is_couldnt_resolve_host()
                    || e.is_couldnt_resolve_proxy()
                    || e.is_read_error()
                    || e.is_recv_error()
                    || e.is_send_error()
                    || e.is_got_nothing()
            }
            _ => false,
        }
    }

    pub fn http_status(&self) -> Option<u32> {
        match self {
            FetchError::HttpStatus(code) => Some(*code),
            _ => None,
        }
    }
}

impl From<curl::Error> for FetchError {
    fn from(e: curl::Error) -> Self {
        FetchError::Network(e)
    }
}
