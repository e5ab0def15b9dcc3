//! Transaction decoder
//!
//! Strategies in priority order, first success wins:
//!
//! 1. Universal Router commands (allow-listed address, no I/O)
//! 2. Verified metadata, after proxy resolution
//! 3. Signature directory
//!
//! 2 and 3 run concurrently under their own timeouts and the whole decode is
//! bounded by [`DecoderConfig::decode_timeout_ms`].

use std::future::Future;
use std::time::Duration;

use alloy::primitives::Address;
use tracing::{debug, info, warn};

use crate::config::DecoderConfig;
use crate::directory::decode_with_directory;
use crate::domain::{parse_chain_id, CallData, DecodedResult, Source};
use crate::metadata::decode_with_verified_source;
use crate::ports::{ChainProviderPort, MetadataPort, SignatureDirectoryPort};
use crate::router::decode_router_call;

pub struct TransactionDecoder<S, M, P> {
    directory: S,
    metadata: M,
    /// Without a provider proxy resolution is skipped.
    provider: Option<P>,
    config: DecoderConfig,
}

impl<S, M, P> TransactionDecoder<S, M, P>
where
    S: SignatureDirectoryPort,
    M: MetadataPort,
    P: ChainProviderPort,
{
    pub fn new(directory: S, metadata: M, provider: Option<P>) -> Self {
        Self {
            directory,
            metadata,
            provider,
            config: DecoderConfig::default(),
        }
    }

    pub fn with_config(mut self, config: DecoderConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Decodes one call. Never fails: anything undecodable, including a
    /// timeout, is `None`.
    pub async fn decode(
        &self,
        call: &CallData,
        address: Address,
        chain_id: u64,
    ) -> Option<DecodedResult> {
        match tokio::time::timeout(
            self.config.decode_timeout(),
            self.run_strategies(call, address, chain_id),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    selector = %call.selector_hex(),
                    chain_id,
                    timeout_ms = self.config.decode_timeout_ms,
                    "decode timed out"
                );
                None
            }
        }
    }

    async fn run_strategies(
        &self,
        call: &CallData,
        address: Address,
        chain_id: u64,
    ) -> Option<DecodedResult> {
        if let Some(commands) = decode_router_call(call, address, chain_id) {
            info!(%address, chain_id, commands = commands.len(), "decoded router commands");
            return Some(DecodedResult::new(commands, Source::RouterProtocol).normalized());
        }

        let timeout = self.config.source_timeout();
        let (verified, directory) = tokio::join!(
            bounded(
                timeout,
                Source::VerifiedMetadata,
                decode_with_verified_source(
                    &self.metadata,
                    self.provider.as_ref(),
                    call,
                    address,
                    chain_id,
                ),
            ),
            bounded(
                timeout,
                Source::SignatureDirectory,
                decode_with_directory(&self.directory, call),
            ),
        );

        if let Some(method) = verified {
            return Some(DecodedResult::new(vec![method], Source::VerifiedMetadata).normalized());
        }
        if let Some(method) = directory {
            return Some(DecodedResult::new(vec![method], Source::SignatureDirectory).normalized());
        }

        debug!(selector = %call.selector_hex(), chain_id, "no strategy decoded call");
        None
    }

    /// Hex entry point. `to` may be empty (no contract context); `chain_id`
    /// is `0x`-hex or decimal. Malformed input is `None`.
    pub async fn decode_hex(&self, data: &str, to: &str, chain_id: &str) -> Option<DecodedResult> {
        let (call, address, chain_id) = parse_hex_request(data, to, chain_id)?;
        self.decode(&call, address, chain_id).await
    }

    /// Decodes and then expands nested byte payloads up to
    /// [`DecoderConfig::max_depth`] levels.
    pub async fn decode_recursive(
        &self,
        call: &CallData,
        address: Address,
        chain_id: u64,
    ) -> Option<DecodedResult> {
        let result = self.decode(call, address, chain_id).await?;
        Some(self.expand_result(result, chain_id, self.config.max_depth).await)
    }

    pub async fn decode_hex_recursive(
        &self,
        data: &str,
        to: &str,
        chain_id: &str,
    ) -> Option<DecodedResult> {
        let (call, address, chain_id) = parse_hex_request(data, to, chain_id)?;
        self.decode_recursive(&call, address, chain_id).await
    }
}

fn parse_hex_request(data: &str, to: &str, chain_id: &str) -> Option<(CallData, Address, u64)> {
    let call = CallData::from_hex(data)
        .map_err(|e| debug!(error = %e, "rejecting call-data"))
        .ok()?;
    let to = to.trim();
    let address = if to.is_empty() {
        Address::ZERO
    } else {
        to.parse::<Address>()
            .map_err(|e| debug!(to, error = %e, "rejecting contract address"))
            .ok()?
    };
    let chain_id = parse_chain_id(chain_id).or_else(|| {
        debug!(chain_id, "rejecting chain id");
        None
    })?;
    Some((call, address, chain_id))
}

async fn bounded<T, F>(timeout: Duration, source: Source, fut: F) -> Option<T>
where
    F: Future<Output = Option<T>>,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(result) => result,
        Err(_) => {
            warn!(?source, timeout_ms = timeout.as_millis() as u64, "source timed out");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_request_parsing() {
        let (call, address, chain_id) = parse_hex_request("0x8456cb59", "", "0x89").unwrap();
        assert_eq!(call.selector_hex(), "0x8456cb59");
        assert_eq!(address, Address::ZERO);
        assert_eq!(chain_id, 137);

        assert!(parse_hex_request("0x8456", "", "1").is_none());
        assert!(parse_hex_request("0x8456cb59", "0x1234", "1").is_none());
        assert!(parse_hex_request("0x8456cb59", "", "mainnet").is_none());
    }
}
