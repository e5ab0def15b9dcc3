//! Verified-source metadata strategy
//!
//! Works on solc build metadata as published by verification services: the
//! ABI locates the called function, and the NatSpec `userdoc`/`devdoc` maps
//! (keyed by canonical signature) supply descriptions.

use std::collections::HashMap;

use alloy::primitives::Address;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::codec::{self, apply_suffix, CodecError, TupleMember, TypeDescriptor};
use crate::domain::{CallData, DecodedMethod, DecodedParam};
use crate::params::build_param;
use crate::ports::{ChainProviderPort, MetadataPort};
use crate::proxy::resolve_proxy;
use crate::signature::selector_of;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ContractMetadata {
    pub output: MetadataOutput,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MetadataOutput {
    #[serde(default)]
    pub abi: Vec<AbiItem>,
    #[serde(default)]
    pub devdoc: Option<NatSpec>,
    #[serde(default)]
    pub userdoc: Option<NatSpec>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AbiItem {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub inputs: Vec<AbiInput>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AbiInput {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub ty: String,
    #[serde(default)]
    pub components: Option<Vec<AbiInput>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct NatSpec {
    #[serde(default)]
    pub methods: HashMap<String, MethodDoc>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MethodDoc {
    #[serde(default)]
    pub notice: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub params: HashMap<String, String>,
}

impl AbiItem {
    fn is_function(&self) -> bool {
        // solc omits `type` for functions in some legacy outputs
        matches!(self.kind.as_deref(), None | Some("function"))
    }
}

impl AbiInput {
    fn tuple_components(&self) -> Option<&[AbiInput]> {
        self.components
            .as_deref()
            .filter(|components| !components.is_empty())
    }

    /// Converts a JSON ABI input (`type` plus nested `components`) into a
    /// validated descriptor.
    pub fn descriptor(&self) -> Result<TypeDescriptor, CodecError> {
        let Some(suffix) = self.ty.strip_prefix("tuple") else {
            return TypeDescriptor::parse(&self.ty);
        };
        let components = self
            .tuple_components()
            .ok_or_else(|| CodecError::InvalidType(self.ty.clone()))?;
        let members = components
            .iter()
            .map(|component| {
                Ok(TupleMember {
                    name: non_empty(&component.name),
                    ty: component.descriptor()?,
                })
            })
            .collect::<Result<Vec<_>, CodecError>>()?;
        apply_suffix(TypeDescriptor::Tuple(members), suffix)
    }
}

/// Signature string used both for the selector and as NatSpec key:
/// tuples rendered as `(type,type)` followed by their array suffix.
pub fn build_signature(name: &str, inputs: &[AbiInput]) -> String {
    let types = inputs
        .iter()
        .map(|input| match input.tuple_components() {
            Some(components) => {
                let suffix = input.ty.strip_prefix("tuple").unwrap_or_default();
                format!("{}{suffix}", build_signature("", components))
            }
            None => input.ty.clone(),
        })
        .collect::<Vec<_>>();
    format!("{name}({})", types.join(","))
}

fn non_empty(name: &str) -> Option<String> {
    (!name.is_empty()).then(|| name.to_owned())
}

/// Decodes a call against verified metadata. `None` when the ABI has no
/// function for the selector or the arguments do not decode.
pub fn decode_with_metadata(metadata: &ContractMetadata, call: &CallData) -> Option<DecodedMethod> {
    let selector = call.selector();
    let output = &metadata.output;

    let (name, inputs, signature) = output
        .abi
        .iter()
        .filter(|item| item.is_function())
        .find_map(|item| {
            let name = item.name.as_deref()?;
            let signature = build_signature(name, &item.inputs);
            (selector_of(&signature) == selector).then_some((name, &item.inputs, signature))
        })
        .or_else(|| {
            debug!(selector = %call.selector_hex(), "selector not present in verified ABI");
            None
        })?;

    let userdoc = output.userdoc.as_ref().and_then(|d| d.methods.get(&signature));
    let devdoc = output.devdoc.as_ref().and_then(|d| d.methods.get(&signature));

    let descriptors: Vec<Result<TypeDescriptor, CodecError>> =
        inputs.iter().map(AbiInput::descriptor).collect();
    // An unparseable type occupies one head word so later parameters stay aligned.
    let layout: Vec<TypeDescriptor> = descriptors
        .iter()
        .map(|d| d.clone().unwrap_or(TypeDescriptor::Uint(256)))
        .collect();

    let values = match codec::decode(&layout, call.args()) {
        Ok(values) => values,
        Err(e) => {
            debug!(signature = %signature, error = %e, "verified ABI did not decode call");
            return None;
        }
    };

    let params = inputs
        .iter()
        .zip(descriptors)
        .zip(values)
        .map(|((input, descriptor), value)| {
            let name = non_empty(&input.name);
            let param = match descriptor {
                Ok(ty) => build_param(name, &ty, value),
                Err(e) => {
                    debug!(param = %input.name, error = %e, "placeholder for malformed parameter type");
                    DecodedParam::failed(name, input.ty.clone())
                }
            };
            let description = userdoc
                .and_then(|doc| doc.params.get(&input.name))
                .or_else(|| devdoc.and_then(|doc| doc.params.get(&input.name)))
                .cloned();
            param.with_description(description)
        })
        .collect();

    let description = userdoc
        .and_then(|doc| doc.notice.clone())
        .or_else(|| devdoc.and_then(|doc| doc.details.clone()));

    Some(DecodedMethod {
        name: name.to_owned(),
        description,
        params,
    })
}

/// Metadata strategy: resolves proxies when a provider is available, then
/// decodes against the implementation's metadata. The zero address has no
/// contract context and is never looked up.
pub async fn decode_with_verified_source<M, P>(
    metadata: &M,
    provider: Option<&P>,
    call: &CallData,
    address: Address,
    chain_id: u64,
) -> Option<DecodedMethod>
where
    M: MetadataPort + ?Sized,
    P: ChainProviderPort + ?Sized,
{
    if address.is_zero() {
        return None;
    }

    let target = match provider {
        Some(provider) => match resolve_proxy(provider, address).await {
            Some(implementation) => {
                info!(proxy = %address, implementation = %implementation, "resolved proxy implementation");
                implementation
            }
            None => address,
        },
        None => address,
    };

    let contract = match metadata.fetch_metadata(chain_id, target).await {
        Ok(Some(contract)) => contract,
        Ok(None) => {
            debug!(address = %target, chain_id, "no verified metadata");
            return None;
        }
        Err(e) => {
            warn!(address = %target, chain_id, error = %e, "verified metadata lookup failed");
            return None;
        }
    };

    let method = decode_with_metadata(&contract, call);
    if let Some(m) = &method {
        info!(address = %target, method = %m.name, "decoded with verified metadata");
    }
    method
}
