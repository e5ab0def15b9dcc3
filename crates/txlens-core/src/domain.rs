use alloy::primitives::{hex, Address, Bytes, I256, U256};
use serde::ser::{SerializeSeq, Serializer};
use serde::Serialize;
use thiserror::Error;

/// Placeholder rendered for a parameter that could not be decoded.
pub const FAILED_TO_DECODE: &str = "failed to decode";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CallDataError {
    #[error("invalid hex call-data: {0}")]
    InvalidHex(String),
    #[error("call-data too short: {0} bytes (need at least 4 for selector)")]
    TooShort(usize),
}

/// Raw call-data sent to a contract: 4-byte selector followed by ABI-encoded
/// arguments. Construction rejects anything shorter than a selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallData(Bytes);

impl CallData {
    pub fn new(bytes: impl Into<Bytes>) -> Result<Self, CallDataError> {
        let bytes = bytes.into();
        if bytes.len() < 4 {
            return Err(CallDataError::TooShort(bytes.len()));
        }
        Ok(Self(bytes))
    }

    pub fn from_hex(data: &str) -> Result<Self, CallDataError> {
        let data = data.trim();
        let stripped = data.strip_prefix("0x").unwrap_or(data);
        if stripped.len() % 2 != 0 {
            return Err(CallDataError::InvalidHex(format!(
                "odd number of hex digits ({})",
                stripped.len()
            )));
        }
        let bytes = hex::decode(stripped).map_err(|e| CallDataError::InvalidHex(e.to_string()))?;
        Self::new(bytes)
    }

    pub fn selector(&self) -> [u8; 4] {
        let mut selector = [0u8; 4];
        selector.copy_from_slice(&self.0[..4]);
        selector
    }

    /// `0x`-prefixed lowercase selector, the key used by signature directories.
    pub fn selector_hex(&self) -> String {
        format_selector(self.selector())
    }

    /// Encoded arguments, i.e. everything after the selector.
    pub fn args(&self) -> &[u8] {
        &self.0[4..]
    }
}

pub fn format_selector(selector: [u8; 4]) -> String {
    format!("0x{}", hex::encode(selector))
}

/// Which strategy produced a [`DecodedResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Source {
    RouterProtocol,
    VerifiedMetadata,
    SignatureDirectory,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecodedResult {
    pub data: Vec<DecodedMethod>,
    pub source: Source,
}

impl DecodedResult {
    pub fn new(data: Vec<DecodedMethod>, source: Source) -> Self {
        Self { data, source }
    }

    /// Rewrites every codec-tagged integer into its decimal string form.
    pub fn normalized(self) -> Self {
        Self {
            data: self.data.into_iter().map(DecodedMethod::normalized).collect(),
            source: self.source,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecodedMethod {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub params: Vec<DecodedParam>,
}

impl DecodedMethod {
    pub fn normalized(self) -> Self {
        Self {
            params: self.params.into_iter().map(DecodedParam::normalized).collect(),
            ..self
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecodedParam {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub ty: String,
    pub value: ParamValue,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<DecodedParam>>,
    /// Nested call decoded out of a `bytes` value. The raw value stays in `value`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decoded_bytes: Option<Box<DecodedResult>>,
}

impl DecodedParam {
    pub fn new(name: Option<String>, ty: impl Into<String>, value: ParamValue) -> Self {
        Self {
            name,
            ty: ty.into(),
            value,
            description: None,
            children: None,
            decoded_bytes: None,
        }
    }

    pub fn failed(name: Option<String>, ty: impl Into<String>) -> Self {
        Self::new(name, ty, ParamValue::Failed)
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    pub fn normalized(self) -> Self {
        Self {
            value: self.value.normalized(),
            children: self
                .children
                .map(|children| children.into_iter().map(DecodedParam::normalized).collect()),
            ..self
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scalar {
    Bool(bool),
    Address(Address),
    Text(String),
    /// Canonical decimal rendering of an integer.
    Decimal(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BigInteger {
    Unsigned(U256),
    Signed(I256),
}

impl std::fmt::Display for BigInteger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BigInteger::Unsigned(v) => write!(f, "{v}"),
            BigInteger::Signed(v) => write!(f, "{v}"),
        }
    }
}

/// One pool hop of a packed router swap path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolHop {
    #[serde(serialize_with = "checksummed")]
    pub first_address: Address,
    pub tick_spacing: u32,
    #[serde(serialize_with = "checksummed")]
    pub second_address: Address,
}

fn checksummed<S: Serializer>(address: &Address, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(address)
}

/// Decoded value of a parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    Scalar(Scalar),
    /// Integer as produced by the codec, before normalization.
    BigInteger(BigInteger),
    ByteString(Bytes),
    /// Tuple members or array items.
    List(Vec<ParamValue>),
    Pools(Vec<PoolHop>),
    Failed,
}

impl ParamValue {
    pub fn normalized(self) -> Self {
        match self {
            ParamValue::BigInteger(v) => ParamValue::Scalar(Scalar::Decimal(v.to_string())),
            ParamValue::List(items) => {
                ParamValue::List(items.into_iter().map(ParamValue::normalized).collect())
            }
            other => other,
        }
    }

    pub fn as_byte_string(&self) -> Option<&Bytes> {
        match self {
            ParamValue::ByteString(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[ParamValue]> {
        match self {
            ParamValue::List(items) => Some(items),
            _ => None,
        }
    }
}

impl Serialize for ParamValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ParamValue::Scalar(Scalar::Bool(b)) => serializer.serialize_bool(*b),
            ParamValue::Scalar(Scalar::Address(a)) => serializer.collect_str(a),
            ParamValue::Scalar(Scalar::Text(s)) | ParamValue::Scalar(Scalar::Decimal(s)) => {
                serializer.serialize_str(s)
            }
            ParamValue::BigInteger(v) => serializer.collect_str(v),
            ParamValue::ByteString(b) => {
                serializer.serialize_str(&format!("0x{}", hex::encode(b)))
            }
            ParamValue::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            ParamValue::Pools(pools) => pools.serialize(serializer),
            ParamValue::Failed => serializer.serialize_str(FAILED_TO_DECODE),
        }
    }
}

/// Parses a chain id given as `0x`-hex (wallet style) or decimal.
pub fn parse_chain_id(chain_id: &str) -> Option<u64> {
    let chain_id = chain_id.trim();
    match chain_id.strip_prefix("0x").or_else(|| chain_id.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16).ok(),
        None => chain_id.parse().ok(),
    }
}
