//! Error types for the fetch module.
//!
//! A `FetchError` describes why one candidate URL did not yield a PDF. The
//! engine never surfaces these to callers: a failed candidate only means
//! "try the next mirror". They exist so every rejected attempt is logged
//! with a precise reason.

use thiserror::Error;

/// Reasons a single candidate fetch was rejected.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level error (DNS resolution, connection refused, TLS errors, etc.)
    #[error("network error fetching {url}: {source}")]
    Network {
        /// The URL that failed.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// Request did not finish within the per-request timeout.
    #[error("timeout fetching {url}")]
    Timeout {
        /// The URL that timed out.
        url: String,
    },

    /// Mirror answered with something other than 200 OK.
    #[error("HTTP {status} fetching {url}")]
    HttpStatus {
        /// The URL that returned the status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// Mirror answered 200 but the body is not a PDF (typically an HTML error page).
    #[error("response from {url} is not a PDF (content-type: {content_type})")]
    NotPdf {
        /// The URL that returned the body.
        url: String,
        /// Declared content type, or `unknown` when absent.
        content_type: String,
    },
}

impl FetchError {
    /// Classifies a reqwest error into a timeout or a network error.
    pub fn from_reqwest(url: impl Into<String>, source: reqwest::Error) -> Self {
        let url = url.into();
        if source.is_timeout() {
            Self::Timeout { url }
        } else {
            Self::Network { url, source }
        }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates a content validation error.
    pub fn not_pdf(url: impl Into<String>, content_type: Option<&str>) -> Self {
        Self::NotPdf {
            url: url.into(),
            content_type: content_type.unwrap_or("unknown").to_string(),
        }
    }

    /// Creates a timeout error.
    pub fn timeout(url: impl Into<String>) -> Self {
        Self::Timeout { url: url.into() }
    }

    /// Short machine-friendly label used in log fields.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Network { .. } => "network",
            Self::Timeout { .. } => "timeout",
            Self::HttpStatus { .. } => "http_status",
            Self::NotPdf { .. } => "not_pdf",
        }
    }
}
