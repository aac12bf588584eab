//! HTTP client wrapper for fetching PDFs from mirror hosts.
//!
//! [`MirrorClient`] owns one pooled `reqwest::Client` and applies the
//! per-mirror [`HeaderProfile`] and a per-request timeout to every call.

use std::time::Duration;

use bytes::Bytes;
use reqwest::header::{ACCEPT, CONTENT_TYPE, REFERER, USER_AGENT};
use reqwest::{Client, RequestBuilder, StatusCode, redirect};
use tracing::{debug, instrument};

use super::constants::{CONNECT_TIMEOUT, MAX_REDIRECTS, PDF_MAGIC};
use super::error::FetchError;
use super::mirror::HeaderProfile;

/// HTTP client for mirror requests.
///
/// Create once and share; clones reuse the same connection pool.
#[derive(Debug, Clone)]
pub struct MirrorClient {
    client: Client,
}

impl MirrorClient {
    /// Creates a client with the default connect timeout.
    ///
    /// # Errors
    ///
    /// Returns the reqwest error if the TLS backend cannot be initialised.
    pub fn new() -> Result<Self, reqwest::Error> {
        Self::with_connect_timeout(CONNECT_TIMEOUT)
    }

    /// Creates a client with an explicit connect timeout.
    ///
    /// # Errors
    ///
    /// Returns the reqwest error if the TLS backend cannot be initialised.
    pub fn with_connect_timeout(connect_timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .redirect(redirect::Policy::limited(MAX_REDIRECTS))
            .gzip(true)
            .build()?;
        Ok(Self { client })
    }

    /// Fetches `url` and returns the body only if it is a valid PDF.
    ///
    /// Never fails: transport errors, non-200 statuses and non-PDF bodies
    /// all collapse to `None` so the caller can move on to the next mirror.
    pub async fn fetch_from_url(
        &self,
        url: &str,
        profile: HeaderProfile,
        timeout: Duration,
    ) -> Option<Bytes> {
        match self.get_pdf(url, profile, timeout).await {
            Ok(bytes) => Some(bytes),
            Err(error) => {
                debug!(url, kind = error.kind(), error = %error, "candidate rejected");
                None
            }
        }
    }

    /// Fetches `url` and validates the body as a PDF.
    ///
    /// # Errors
    ///
    /// Returns a [`FetchError`] describing why the candidate was rejected.
    #[instrument(level = "trace", skip(self, profile))]
    pub async fn get_pdf(
        &self,
        url: &str,
        profile: HeaderProfile,
        timeout: Duration,
    ) -> Result<Bytes, FetchError> {
        let response = with_profile(self.client.get(url), profile)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(FetchError::http_status(url, status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        if !looks_like_pdf(&body, content_type.as_deref()) {
            return Err(FetchError::not_pdf(url, content_type.as_deref()));
        }

        debug!(url, bytes = body.len(), "candidate accepted");
        Ok(body)
    }

    /// Issues a HEAD request and returns the final status code.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Timeout`] or [`FetchError::Network`] when no
    /// response was received.
    #[instrument(level = "trace", skip(self, profile))]
    pub async fn head_status(
        &self,
        url: &str,
        profile: HeaderProfile,
        timeout: Duration,
    ) -> Result<u16, FetchError> {
        let response = with_profile(self.client.head(url), profile)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;
        Ok(response.status().as_u16())
    }
}

fn with_profile(request: RequestBuilder, profile: HeaderProfile) -> RequestBuilder {
    request
        .header(USER_AGENT, profile.user_agent)
        .header(ACCEPT, profile.accept)
        .header(REFERER, profile.referer)
}

/// Accepts a body that starts with `%PDF` or is declared as PDF.
///
/// The declared type alone is enough: some mirrors prepend whitespace or a
/// BOM before the magic bytes.
#[must_use]
pub fn looks_like_pdf(body: &[u8], content_type: Option<&str>) -> bool {
    body.starts_with(PDF_MAGIC)
        || content_type.is_some_and(|ct| ct.to_ascii_lowercase().contains("pdf"))
}
