use std::sync::Arc;

use alloy::primitives::Address;
use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::metadata::ContractMetadata;

#[derive(Debug, Error)]
pub enum PortError {
    #[error("port not implemented: {0}")]
    NotImplemented(&'static str),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("unexpected status: {0}")]
    Status(u16),
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("rpc error {code}: {message}")]
    Rpc { code: i64, message: String },
}

/// Selector to candidate text signatures, in directory order.
#[async_trait]
pub trait SignatureDirectoryPort: Send + Sync {
    async fn lookup(&self, selector: [u8; 4]) -> Result<Vec<String>, PortError>;
}

/// Published build metadata for a deployed contract. `Ok(None)` means the
/// contract is simply not verified.
#[async_trait]
pub trait MetadataPort: Send + Sync {
    async fn fetch_metadata(
        &self,
        chain_id: u64,
        address: Address,
    ) -> Result<Option<ContractMetadata>, PortError>;
}

/// EIP-1193 style read-only chain access.
#[async_trait]
pub trait ChainProviderPort: Send + Sync {
    async fn request(&self, method: &str, params: Value) -> Result<Value, PortError>;
}

#[async_trait]
impl<T: SignatureDirectoryPort + ?Sized> SignatureDirectoryPort for Arc<T> {
    async fn lookup(&self, selector: [u8; 4]) -> Result<Vec<String>, PortError> {
        (**self).lookup(selector).await
    }
}

#[async_trait]
impl<T: MetadataPort + ?Sized> MetadataPort for Arc<T> {
    async fn fetch_metadata(
        &self,
        chain_id: u64,
        address: Address,
    ) -> Result<Option<ContractMetadata>, PortError> {
        (**self).fetch_metadata(chain_id, address).await
    }
}

#[async_trait]
impl<T: ChainProviderPort + ?Sized> ChainProviderPort for Arc<T> {
    async fn request(&self, method: &str, params: Value) -> Result<Value, PortError> {
        (**self).request(method, params).await
    }
}
