//! 4byte.directory signature lookup.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use txlens_core::domain::format_selector;
use txlens_core::{PortError, SignatureDirectoryPort};

use crate::http::CachedHttpClient;

#[derive(Debug, Deserialize)]
struct FourByteResponse {
    #[serde(default)]
    results: Vec<FourByteEntry>,
}

#[derive(Debug, Deserialize)]
struct FourByteEntry {
    text_signature: String,
}

#[derive(Debug, Clone)]
pub struct FourByteDirectory {
    http: CachedHttpClient,
    base_url: String,
}

impl FourByteDirectory {
    pub fn new(http: CachedHttpClient, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl SignatureDirectoryPort for FourByteDirectory {
    /// Candidates in API order.
    async fn lookup(&self, selector: [u8; 4]) -> Result<Vec<String>, PortError> {
        let selector = format_selector(selector);
        let url = format!("{}?hex_signature={}", self.base_url, selector);
        let body = self.http.get_json(&url).await?;
        if body.is_null() {
            return Ok(Vec::new());
        }

        let response: FourByteResponse =
            serde_json::from_value(body).map_err(|e| PortError::Malformed(e.to_string()))?;
        debug!(selector = %selector, count = response.results.len(), "4byte signatures");
        Ok(response
            .results
            .into_iter()
            .map(|entry| entry.text_signature)
            .collect())
    }
}
