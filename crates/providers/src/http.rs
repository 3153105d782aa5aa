use std::time::Duration;

use reqwest::header::CONTENT_DISPOSITION;
use tracing::debug;

use crate::{Payload, ProviderError};

/// Shared HTTP helper for providers and alias feeds. Every request is bounded
/// by the client-level timeout.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    pub fn new(timeout: Duration) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("tvarr/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ProviderError::Network(e.to_string()))?;
        Ok(Self { client })
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response, ProviderError> {
        debug!(url, "GET");
        let resp = self.client.get(url).send().await?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(ProviderError::NotFound);
        }
        if !resp.status().is_success() {
            return Err(ProviderError::Status(resp.status().as_u16()));
        }
        Ok(resp)
    }

    pub async fn get_text(&self, url: &str) -> Result<String, ProviderError> {
        Ok(self.get(url).await?.text().await?)
    }

    /// Download a payload, taking its file name from `Content-Disposition`.
    pub async fn get_payload(&self, url: &str) -> Result<Payload, ProviderError> {
        let resp = self.get(url).await?;
        let filename = resp
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .and_then(filename_from_content_disposition);
        let bytes = resp.bytes().await?.to_vec();
        Ok(Payload { filename, bytes })
    }
}

/// Extract `filename=` from a `Content-Disposition` header value.
pub fn filename_from_content_disposition(header: &str) -> Option<String> {
    header
        .split(';')
        .map(str::trim)
        .find_map(|part| part.strip_prefix("filename="))
        .map(|name| name.trim_matches('"').to_string())
        .filter(|name| !name.is_empty())
}
