//! Sourcify verified-contract files
//!
//! `GET <base>/<decimal chain id>/<address>` returns every file of a full or
//! partial match; the solc `metadata.json` among them carries the ABI and
//! NatSpec docs.

use alloy::primitives::Address;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use txlens_core::{ContractMetadata, MetadataPort, PortError};

use crate::http::CachedHttpClient;

#[derive(Debug, Deserialize)]
struct FilesResponse {
    #[serde(default)]
    files: Vec<SourceFile>,
}

#[derive(Debug, Deserialize)]
struct SourceFile {
    name: String,
    content: String,
}

#[derive(Debug, Clone)]
pub struct SourcifyMetadataClient {
    http: CachedHttpClient,
    base_url: String,
}

impl SourcifyMetadataClient {
    pub fn new(http: CachedHttpClient, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    pub fn files_url(&self, chain_id: u64, address: Address) -> String {
        format!("{}/{}/{}", self.base_url.trim_end_matches('/'), chain_id, address)
    }
}

#[async_trait]
impl MetadataPort for SourcifyMetadataClient {
    async fn fetch_metadata(
        &self,
        chain_id: u64,
        address: Address,
    ) -> Result<Option<ContractMetadata>, PortError> {
        let url = self.files_url(chain_id, address);
        let body = match self.http.get_json(&url).await {
            Ok(body) => body,
            Err(PortError::Status(404)) => {
                debug!(%address, chain_id, "contract not verified on sourcify");
                return Ok(None);
            }
            Err(e) => return Err(e),
        };
        if body.is_null() {
            return Ok(None);
        }

        let response: FilesResponse =
            serde_json::from_value(body).map_err(|e| PortError::Malformed(e.to_string()))?;
        let Some(file) = response
            .files
            .into_iter()
            .find(|file| file.name.contains("metadata.json"))
        else {
            debug!(%address, chain_id, "no metadata.json among sourcify files");
            return Ok(None);
        };

        serde_json::from_str(&file.content)
            .map(Some)
            .map_err(|e| PortError::Malformed(format!("{}: {e}", file.name)))
    }
}
