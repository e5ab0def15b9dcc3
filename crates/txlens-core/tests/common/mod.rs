#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use alloy::primitives::{Address, Bytes, B256, U256};
use async_trait::async_trait;
use serde_json::{json, Value};

use txlens_core::codec;
use txlens_core::signature::FunctionSignature;
use txlens_core::{
    BigInteger, CallData, ChainProviderPort, ContractMetadata, MetadataPort, ParamValue,
    PortError, Scalar, SignatureDirectoryPort, TransactionDecoder,
};

#[derive(Debug, Default)]
pub struct MockDirectory {
    signatures: HashMap<[u8; 4], Vec<String>>,
    fail: bool,
    pub calls: AtomicUsize,
}

impl MockDirectory {
    pub fn with(mut self, signature: &str) -> Self {
        let selector = FunctionSignature::parse(signature)
            .expect("valid test signature")
            .selector();
        self.signatures
            .entry(selector)
            .or_default()
            .push(signature.to_owned());
        self
    }

    /// Registers `text` under the selector of `selector_of`, for collisions.
    pub fn with_alias(mut self, selector_of: &str, text: &str) -> Self {
        let selector = FunctionSignature::parse(selector_of)
            .expect("valid test signature")
            .selector();
        self.signatures.entry(selector).or_default().push(text.to_owned());
        self
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SignatureDirectoryPort for MockDirectory {
    async fn lookup(&self, selector: [u8; 4]) -> Result<Vec<String>, PortError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(PortError::Transport("directory offline".to_owned()));
        }
        Ok(self.signatures.get(&selector).cloned().unwrap_or_default())
    }
}

#[derive(Debug, Default)]
pub struct MockMetadata {
    contracts: HashMap<Address, ContractMetadata>,
    pub calls: AtomicUsize,
    pub requested: Mutex<Vec<(u64, Address)>>,
}

impl MockMetadata {
    pub fn with(mut self, address: Address, metadata: Value) -> Self {
        let metadata = serde_json::from_value(metadata).expect("valid test metadata");
        self.contracts.insert(address, metadata);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requested(&self) -> Vec<(u64, Address)> {
        self.requested.lock().expect("requested lock").clone()
    }
}

#[async_trait]
impl MetadataPort for MockMetadata {
    async fn fetch_metadata(
        &self,
        chain_id: u64,
        address: Address,
    ) -> Result<Option<ContractMetadata>, PortError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requested
            .lock()
            .expect("requested lock")
            .push((chain_id, address));
        Ok(self.contracts.get(&address).cloned())
    }
}

/// Source that never answers.
#[derive(Debug, Default)]
pub struct StalledSource;

#[async_trait]
impl SignatureDirectoryPort for StalledSource {
    async fn lookup(&self, _selector: [u8; 4]) -> Result<Vec<String>, PortError> {
        futures::future::pending().await
    }
}

#[async_trait]
impl MetadataPort for StalledSource {
    async fn fetch_metadata(
        &self,
        _chain_id: u64,
        _address: Address,
    ) -> Result<Option<ContractMetadata>, PortError> {
        futures::future::pending().await
    }
}

/// Chain provider backed by a storage map. Unknown slots read as zero and
/// every account has empty code.
#[derive(Debug, Default)]
pub struct StorageProvider {
    storage: HashMap<(Address, B256), B256>,
    pub calls: AtomicUsize,
}

impl StorageProvider {
    pub fn with_slot(mut self, address: Address, slot: B256, value: Address) -> Self {
        self.storage.insert((address, slot), value.into_word());
        self
    }
}

#[async_trait]
impl ChainProviderPort for StorageProvider {
    async fn request(&self, method: &str, params: Value) -> Result<Value, PortError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match method {
            "eth_getStorageAt" => {
                let address: Address = serde_json::from_value(params[0].clone())
                    .map_err(|e| PortError::Malformed(e.to_string()))?;
                let slot: B256 = serde_json::from_value(params[1].clone())
                    .map_err(|e| PortError::Malformed(e.to_string()))?;
                let word = self
                    .storage
                    .get(&(address, slot))
                    .copied()
                    .unwrap_or_default();
                Ok(json!(word))
            }
            "eth_getCode" => Ok(json!("0x")),
            "eth_call" => Ok(json!("0x")),
            _ => Err(PortError::NotImplemented("unsupported test rpc method")),
        }
    }
}

pub type TestDecoder =
    TransactionDecoder<Arc<dyn SignatureDirectoryPort>, Arc<dyn MetadataPort>, StorageProvider>;

pub fn decoder(
    directory: Arc<dyn SignatureDirectoryPort>,
    metadata: Arc<dyn MetadataPort>,
) -> TestDecoder {
    TransactionDecoder::new(directory, metadata, None)
}

/// Encodes a full call (selector plus arguments) for a text signature.
pub fn encode_call(signature: &str, values: &[ParamValue]) -> Bytes {
    let signature = FunctionSignature::parse(signature).expect("valid test signature");
    let mut data = signature.selector().to_vec();
    data.extend(codec::encode(&signature.types(), values).expect("encodable test values"));
    Bytes::from(data)
}

pub fn call_data(signature: &str, values: &[ParamValue]) -> CallData {
    CallData::new(encode_call(signature, values)).expect("call-data with selector")
}

pub fn uint(value: u64) -> ParamValue {
    ParamValue::BigInteger(BigInteger::Unsigned(U256::from(value)))
}

pub fn address(value: Address) -> ParamValue {
    ParamValue::Scalar(Scalar::Address(value))
}

pub fn bytes(value: impl Into<Bytes>) -> ParamValue {
    ParamValue::ByteString(value.into())
}

pub fn decimal(value: &str) -> ParamValue {
    ParamValue::Scalar(Scalar::Decimal(value.to_owned()))
}

pub fn contract() -> Address {
    "0x000000000000000000000000000000000000C0DE"
        .parse()
        .expect("valid contract address")
}

pub fn implementation() -> Address {
    "0x00000000000000000000000000000000000011A1"
        .parse()
        .expect("valid implementation address")
}

pub fn transfer_metadata() -> Value {
    json!({
        "output": {
            "abi": [{
                "type": "function",
                "name": "transfer",
                "inputs": [
                    { "name": "to", "type": "address" },
                    { "name": "amount", "type": "uint256" }
                ]
            }]
        }
    })
}
