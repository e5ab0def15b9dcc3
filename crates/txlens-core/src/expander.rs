//! Recursive expansion of `bytes` parameters that carry nested call-data
//! (multicall, batch and router patterns).

use alloy::primitives::Address;
use futures::future::{join_all, BoxFuture};
use futures::FutureExt;
use tracing::debug;

use crate::decoder::TransactionDecoder;
use crate::domain::{CallData, DecodedMethod, DecodedParam, DecodedResult};
use crate::ports::{ChainProviderPort, MetadataPort, SignatureDirectoryPort};

/// A parameter is worth re-decoding when it is declared as some `bytes`
/// type and holds more than a bare selector.
pub fn is_expansion_candidate(param: &DecodedParam) -> bool {
    param.ty.contains("bytes")
        && param
            .value
            .as_byte_string()
            .is_some_and(|bytes| bytes.len() > 4)
}

impl<S, M, P> TransactionDecoder<S, M, P>
where
    S: SignatureDirectoryPort,
    M: MetadataPort,
    P: ChainProviderPort,
{
    /// Returns `param` with nested call-data decoded into `decoded_bytes`,
    /// descending at most `max_depth` levels. The raw value is kept, and a
    /// payload that does not decode leaves the parameter unchanged.
    pub fn expand_param(
        &self,
        mut param: DecodedParam,
        chain_id: u64,
        max_depth: usize,
    ) -> BoxFuture<'_, DecodedParam> {
        async move {
            if max_depth == 0 {
                return param;
            }

            if is_expansion_candidate(&param) {
                if let Some(nested) = self.decode_nested(&param, chain_id, max_depth).await {
                    param.decoded_bytes = Some(Box::new(nested));
                }
            }

            if let Some(children) = param.children.take() {
                param.children = Some(self.expand_params(children, chain_id, max_depth - 1).await);
            }

            param
        }
        .boxed()
    }

    async fn decode_nested(
        &self,
        param: &DecodedParam,
        chain_id: u64,
        max_depth: usize,
    ) -> Option<DecodedResult> {
        let bytes = param.value.as_byte_string()?.clone();
        let call = CallData::new(bytes).ok()?;
        // Nested payloads have no known target contract.
        let nested = self.decode(&call, Address::ZERO, chain_id).await?;
        if nested.data.is_empty() {
            return None;
        }
        debug!(
            param = param.name.as_deref().unwrap_or_default(),
            source = ?nested.source,
            max_depth,
            "expanded nested call-data"
        );
        Some(self.expand_result(nested, chain_id, max_depth - 1).await)
    }

    pub fn expand_params(
        &self,
        params: Vec<DecodedParam>,
        chain_id: u64,
        max_depth: usize,
    ) -> BoxFuture<'_, Vec<DecodedParam>> {
        join_all(
            params
                .into_iter()
                .map(|param| self.expand_param(param, chain_id, max_depth)),
        )
        .boxed()
    }

    pub async fn expand_method(
        &self,
        method: DecodedMethod,
        chain_id: u64,
        max_depth: usize,
    ) -> DecodedMethod {
        DecodedMethod {
            params: self.expand_params(method.params, chain_id, max_depth).await,
            ..method
        }
    }

    /// Expands every top-level parameter of every method in `result`.
    pub async fn expand_result(
        &self,
        result: DecodedResult,
        chain_id: u64,
        max_depth: usize,
    ) -> DecodedResult {
        let data = join_all(
            result
                .data
                .into_iter()
                .map(|method| self.expand_method(method, chain_id, max_depth)),
        )
        .await;
        DecodedResult::new(data, result.source)
    }
}
