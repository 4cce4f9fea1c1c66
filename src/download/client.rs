//! HTTP client wrapper for fetching a page and its resources.
//!
//! This module provides the `HttpClient` struct which performs one GET per
//! resource, classifies the outcome, and returns the body in memory. It never
//! touches the filesystem.

use std::time::Duration;

use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use tracing::{debug, instrument};
use url::Url;

use super::constants::{CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS};
use super::filename::derive_filename;
use super::record::{DownloadRecord, Payload};
use crate::error::PageError;
use crate::user_agent;

/// HTTP client for fetching resources into memory.
///
/// This client is designed to be created once per run and shared by every
/// concurrent fetch, taking advantage of connection pooling.
///
/// # Example
///
/// ```no_run
/// use page_loader_core::download::HttpClient;
/// use url::Url;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = HttpClient::new();
/// let url = Url::parse("https://example.com/")?;
/// let record = client.fetch_resource(&url, true).await?;
/// println!("{} -> {}", record.source_url, record.filename);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClient {
    /// Creates a new HTTP client with default timeouts.
    ///
    /// Default configuration:
    /// - Connect timeout: 30 seconds
    /// - Read timeout: 5 minutes
    /// - Gzip decompression: enabled
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails to build with the static
    /// configuration. This should never happen in practice.
    #[must_use]
    pub fn new() -> Self {
        Self::new_with_timeouts(CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS)
    }

    /// Creates a new HTTP client with explicit timeout values.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails to build with the supplied
    /// timeout configuration.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn new_with_timeouts(connect_timeout_secs: u64, read_timeout_secs: u64) -> Self {
        let client = build_client(connect_timeout_secs, read_timeout_secs)
            .expect("failed to build HTTP client with static configuration");
        Self { client }
    }

    /// Fetches `url` with a single GET and keeps the body in memory.
    ///
    /// With `as_text` the body is decoded as text (used for the main page),
    /// otherwise the raw bytes are kept. The record's filename is derived
    /// from the URL and the response `Content-Type`.
    ///
    /// # Errors
    ///
    /// Returns [`PageError::HttpStatus`] for any non-2xx response and
    /// [`PageError::Unreachable`] for DNS, connection, timeout or body read
    /// failures. No retries are attempted.
    #[instrument(skip(self), fields(url = %url))]
    pub async fn fetch_resource(&self, url: &Url, as_text: bool) -> Result<DownloadRecord, PageError> {
        debug!("sending request");

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| PageError::unreachable(url.as_str(), e))?;

        let status = response.status();
        if !status.is_success() {
            debug!(status = status.as_u16(), "server returned error status");
            return Err(PageError::http_status(url.as_str(), status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(std::string::ToString::to_string);
        let filename = derive_filename(url, content_type.as_deref());

        let payload = if as_text {
            Payload::Text(
                response
                    .text()
                    .await
                    .map_err(|e| PageError::unreachable(url.as_str(), e))?,
            )
        } else {
            Payload::Binary(
                response
                    .bytes()
                    .await
                    .map_err(|e| PageError::unreachable(url.as_str(), e))?
                    .to_vec(),
            )
        };

        debug!(
            bytes = payload.len(),
            content_type = content_type.as_deref().unwrap_or("-"),
            filename = %filename,
            "fetch complete"
        );

        Ok(DownloadRecord {
            source_url: url.clone(),
            payload,
            filename,
        })
    }
}

fn build_client(connect_timeout_secs: u64, read_timeout_secs: u64) -> Result<Client, reqwest::Error> {
    Client::builder()
        .connect_timeout(Duration::from_secs(connect_timeout_secs))
        .timeout(Duration::from_secs(read_timeout_secs))
        .gzip(true)
        .user_agent(user_agent::default_user_agent())
        .build()
}
