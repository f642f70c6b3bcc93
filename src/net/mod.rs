//! Network Module
//!
//! HTTP client for the remote image-retrieval endpoint.

use std::time::Duration;

use crate::error::{Error, Result};

/// Per-request timeout; a stalled request counts as a network fault.
const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

// == Image Fetcher ==
/// Client for `GET <base>/getFileAsBase64?fileName=..&folderName=..`.
///
/// The response body is the payload to cache verbatim. Any non-success
/// status or transport error is a failure; there is no retry.
#[derive(Debug, Clone)]
pub struct ImageFetcher {
    client: reqwest::Client,
    base_url: String,
}

impl ImageFetcher {
    /// Creates a fetcher for the endpoint at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            client: reqwest::Client::new(),
            base_url,
        }
    }

    /// Base address this fetcher talks to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Retrieves the base64 payload for one (resource, partition) pair.
    pub async fn fetch_base64(&self, file_name: &str, folder: &str) -> Result<String> {
        let url = format!("{}/getFileAsBase64", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("fileName", file_name), ("folderName", folder)])
            .timeout(FETCH_TIMEOUT)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::UnexpectedStatus(status.as_u16()));
        }
        Ok(response.text().await?)
    }
}
