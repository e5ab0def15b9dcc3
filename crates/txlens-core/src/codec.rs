//! ABI type codec
//!
//! Type descriptors are parsed and validated here, then lowered to
//! `alloy::dyn_abi::DynSolType` which performs the head/tail layout work.
//! Decoded values come back as [`ParamValue`], with every integer carrying an
//! explicit [`BigInteger`] tag.

use std::fmt;
use std::str::FromStr;

use alloy::dyn_abi::{DynSolType, DynSolValue};
use alloy::primitives::{Bytes, B256, I256, U256};
use thiserror::Error;

use crate::domain::{BigInteger, ParamValue, Scalar};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("invalid type '{0}'")]
    InvalidType(String),
    #[error("value does not match type '{0}'")]
    ValueMismatch(String),
    #[error("expected {expected} values, got {actual}")]
    Arity { expected: usize, actual: usize },
    #[error("abi decode failed: {0}")]
    Decode(String),
    #[error("layout of '{0}' is larger than the data it decodes")]
    Oversized(String),
}

/// Decode templates may hold this many tokens even when the data is shorter,
/// so empty dynamic arrays of moderately sized elements still decode.
const TEMPLATE_TOKEN_FLOOR: usize = 4096;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TupleMember {
    pub name: Option<String>,
    pub ty: TypeDescriptor,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeDescriptor {
    Uint(usize),
    Int(usize),
    Address,
    Bool,
    FixedBytes(usize),
    Bytes,
    String,
    Array(Box<TypeDescriptor>),
    FixedArray(Box<TypeDescriptor>, usize),
    Tuple(Vec<TupleMember>),
}

impl TypeDescriptor {
    /// Parses a type string such as `uint256`, `bytes32[]` or
    /// `(address token,uint160 amount)[]`.
    pub fn parse(input: &str) -> Result<Self, CodecError> {
        let s = input.trim();
        let invalid = || CodecError::InvalidType(input.trim().to_owned());

        if s.ends_with(']') {
            let open = s.rfind('[').ok_or_else(invalid)?;
            let inner = Self::parse(&s[..open]).map_err(|_| invalid())?;
            return apply_dimension(inner, &s[open + 1..s.len() - 1]).ok_or_else(invalid);
        }

        let tuple_body = s
            .strip_prefix("tuple")
            .filter(|rest| rest.starts_with('('))
            .unwrap_or(s);
        if tuple_body.starts_with('(') {
            if !tuple_body.ends_with(')') {
                return Err(invalid());
            }
            let body = &tuple_body[1..tuple_body.len() - 1];
            let members = split_top_level(body)
                .ok_or_else(invalid)?
                .into_iter()
                .map(parse_member)
                .collect::<Result<Vec<_>, _>>()
                .map_err(|_| invalid())?;
            return Ok(TypeDescriptor::Tuple(members));
        }

        parse_elementary(s).ok_or_else(invalid)
    }

    pub fn is_dynamic(&self) -> bool {
        match self {
            TypeDescriptor::Bytes | TypeDescriptor::String | TypeDescriptor::Array(_) => true,
            TypeDescriptor::FixedArray(inner, _) => inner.is_dynamic(),
            TypeDescriptor::Tuple(members) => members.iter().any(|m| m.ty.is_dynamic()),
            _ => false,
        }
    }

    pub fn to_sol_type(&self) -> DynSolType {
        match self {
            TypeDescriptor::Uint(bits) => DynSolType::Uint(*bits),
            TypeDescriptor::Int(bits) => DynSolType::Int(*bits),
            TypeDescriptor::Address => DynSolType::Address,
            TypeDescriptor::Bool => DynSolType::Bool,
            TypeDescriptor::FixedBytes(size) => DynSolType::FixedBytes(*size),
            TypeDescriptor::Bytes => DynSolType::Bytes,
            TypeDescriptor::String => DynSolType::String,
            TypeDescriptor::Array(inner) => DynSolType::Array(Box::new(inner.to_sol_type())),
            TypeDescriptor::FixedArray(inner, len) => {
                DynSolType::FixedArray(Box::new(inner.to_sol_type()), *len)
            }
            TypeDescriptor::Tuple(members) => {
                DynSolType::Tuple(members.iter().map(|m| m.ty.to_sol_type()).collect())
            }
        }
    }
}

impl fmt::Display for TypeDescriptor {
    /// Canonical form used in selectors: no member names, tuples in parens.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeDescriptor::Uint(bits) => write!(f, "uint{bits}"),
            TypeDescriptor::Int(bits) => write!(f, "int{bits}"),
            TypeDescriptor::Address => f.write_str("address"),
            TypeDescriptor::Bool => f.write_str("bool"),
            TypeDescriptor::FixedBytes(size) => write!(f, "bytes{size}"),
            TypeDescriptor::Bytes => f.write_str("bytes"),
            TypeDescriptor::String => f.write_str("string"),
            TypeDescriptor::Array(inner) => write!(f, "{inner}[]"),
            TypeDescriptor::FixedArray(inner, len) => write!(f, "{inner}[{len}]"),
            TypeDescriptor::Tuple(members) => {
                f.write_str("(")?;
                for (idx, member) in members.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{}", member.ty)?;
                }
                f.write_str(")")
            }
        }
    }
}

impl FromStr for TypeDescriptor {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn parse_elementary(s: &str) -> Option<TypeDescriptor> {
    match s {
        "address" => return Some(TypeDescriptor::Address),
        "bool" => return Some(TypeDescriptor::Bool),
        "string" => return Some(TypeDescriptor::String),
        "bytes" => return Some(TypeDescriptor::Bytes),
        "uint" => return Some(TypeDescriptor::Uint(256)),
        "int" => return Some(TypeDescriptor::Int(256)),
        _ => {}
    }

    if let Some(size) = s.strip_prefix("bytes") {
        let size = parse_decimal(size)?;
        return (1..=32).contains(&size).then_some(TypeDescriptor::FixedBytes(size));
    }
    if let Some(bits) = s.strip_prefix("uint") {
        return integer_bits(bits).map(TypeDescriptor::Uint);
    }
    if let Some(bits) = s.strip_prefix("int") {
        return integer_bits(bits).map(TypeDescriptor::Int);
    }
    None
}

fn integer_bits(bits: &str) -> Option<usize> {
    let bits = parse_decimal(bits)?;
    (bits >= 8 && bits <= 256 && bits % 8 == 0).then_some(bits)
}

fn parse_decimal(s: &str) -> Option<usize> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) || s.starts_with('0') {
        return None;
    }
    s.parse().ok()
}

/// Applies one `[]` / `[N]` dimension to an element type.
fn apply_dimension(inner: TypeDescriptor, dim: &str) -> Option<TypeDescriptor> {
    if dim.is_empty() {
        return Some(TypeDescriptor::Array(Box::new(inner)));
    }
    let len = parse_decimal(dim)?;
    Some(TypeDescriptor::FixedArray(Box::new(inner), len))
}

/// Applies a sequence of dimensions such as `[2][]` to an element type.
pub(crate) fn apply_suffix(
    mut ty: TypeDescriptor,
    suffix: &str,
) -> Result<TypeDescriptor, CodecError> {
    let invalid = || CodecError::InvalidType(format!("tuple{suffix}"));
    let mut rest = suffix.trim();
    while !rest.is_empty() {
        let body = rest.strip_prefix('[').ok_or_else(invalid)?;
        let close = body.find(']').ok_or_else(invalid)?;
        ty = apply_dimension(ty, &body[..close]).ok_or_else(invalid)?;
        rest = &body[close + 1..];
    }
    Ok(ty)
}

/// Splits on commas that are not nested inside parentheses. An empty body
/// yields no parts; an empty part is an error.
pub(crate) fn split_top_level(body: &str) -> Option<Vec<&str>> {
    if body.trim().is_empty() {
        return Some(Vec::new());
    }
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (idx, ch) in body.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => depth = depth.checked_sub(1)?,
            ',' if depth == 0 => {
                parts.push(&body[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return None;
    }
    parts.push(&body[start..]);
    if parts.iter().any(|p| p.trim().is_empty()) {
        return None;
    }
    Some(parts)
}

/// Parses `type [name]`, where the optional name follows the last top-level
/// whitespace.
pub(crate) fn parse_member(member: &str) -> Result<TupleMember, CodecError> {
    let member = member.trim();
    let mut depth = 0usize;
    let mut split_at = None;
    for (idx, ch) in member.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            c if c.is_whitespace() && depth == 0 => split_at = Some(idx),
            _ => {}
        }
    }

    match split_at {
        Some(idx) => {
            let (ty, name) = member.split_at(idx);
            let ty = ty.trim();
            let name = name.trim();
            // Solidity data-location keywords can appear in hand-written signatures.
            let ty = ty
                .strip_suffix(" memory")
                .or_else(|| ty.strip_suffix(" calldata"))
                .unwrap_or(ty);
            match name {
                "memory" | "calldata" | "indexed" => Ok(TupleMember {
                    name: None,
                    ty: TypeDescriptor::parse(ty)?,
                }),
                _ => Ok(TupleMember {
                    name: Some(name.to_owned()),
                    ty: TypeDescriptor::parse(ty)?,
                }),
            }
        }
        None => Ok(TupleMember {
            name: None,
            ty: TypeDescriptor::parse(member)?,
        }),
    }
}

/// Decodes ABI-encoded parameters against an ordered type list.
pub fn decode(types: &[TypeDescriptor], data: &[u8]) -> Result<Vec<ParamValue>, CodecError> {
    if types.is_empty() {
        return Ok(Vec::new());
    }
    check_layout(types, data.len())?;
    let tuple = DynSolType::Tuple(types.iter().map(TypeDescriptor::to_sol_type).collect());
    let decoded = tuple
        .abi_decode_params(data)
        .map_err(|e| CodecError::Decode(e.to_string()))?;

    match decoded {
        DynSolValue::Tuple(values) if values.len() == types.len() => {
            Ok(values.into_iter().map(from_sol_value).collect())
        }
        DynSolValue::Tuple(values) => Err(CodecError::Arity {
            expected: types.len(),
            actual: values.len(),
        }),
        other => Ok(vec![from_sol_value(other)]),
    }
}

/// Rejects type lists whose layout cannot fit in `data_len` bytes before
/// they are lowered to alloy, which materialises a token per fixed-array
/// element up front.
fn check_layout(types: &[TypeDescriptor], data_len: usize) -> Result<(), CodecError> {
    let words = data_len / 32;
    let oversized = || {
        CodecError::Oversized(
            types
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(","),
        )
    };

    let head = types
        .iter()
        .try_fold(0usize, |acc, ty| acc.checked_add(min_words(ty)?))
        .ok_or_else(oversized)?;
    if head > words {
        return Err(oversized());
    }

    let tokens = types
        .iter()
        .try_fold(0usize, |acc, ty| acc.checked_add(template_tokens(ty)?))
        .ok_or_else(oversized)?;
    if tokens > words.max(TEMPLATE_TOKEN_FLOOR) {
        return Err(oversized());
    }
    Ok(())
}

/// Lower bound on the encoded size of a value, in words. Dynamic values
/// count their offset word only.
fn min_words(ty: &TypeDescriptor) -> Option<usize> {
    match ty {
        TypeDescriptor::FixedArray(inner, len) => len.checked_mul(min_words(inner)?),
        TypeDescriptor::Tuple(members) => members
            .iter()
            .try_fold(0usize, |acc, m| acc.checked_add(min_words(&m.ty)?)),
        _ => Some(1),
    }
}

/// Tokens alloy allocates for the empty decode template of `ty`.
fn template_tokens(ty: &TypeDescriptor) -> Option<usize> {
    match ty {
        TypeDescriptor::Array(inner) => template_tokens(inner)?.checked_add(1),
        TypeDescriptor::FixedArray(inner, len) => len.checked_mul(template_tokens(inner)?),
        TypeDescriptor::Tuple(members) => members
            .iter()
            .try_fold(1usize, |acc, m| acc.checked_add(template_tokens(&m.ty)?)),
        _ => Some(1),
    }
}

/// Encodes values as ABI parameters. Inverse of [`decode`].
pub fn encode(types: &[TypeDescriptor], values: &[ParamValue]) -> Result<Vec<u8>, CodecError> {
    if types.len() != values.len() {
        return Err(CodecError::Arity {
            expected: types.len(),
            actual: values.len(),
        });
    }
    let values = types
        .iter()
        .zip(values)
        .map(|(ty, value)| to_sol_value(ty, value))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(DynSolValue::Tuple(values).abi_encode_params())
}

fn from_sol_value(value: DynSolValue) -> ParamValue {
    match value {
        DynSolValue::Bool(b) => ParamValue::Scalar(Scalar::Bool(b)),
        DynSolValue::Address(a) => ParamValue::Scalar(Scalar::Address(a)),
        DynSolValue::Uint(v, _) => ParamValue::BigInteger(BigInteger::Unsigned(v)),
        DynSolValue::Int(v, _) => ParamValue::BigInteger(BigInteger::Signed(v)),
        // bytesN is right-padded inside a full word
        DynSolValue::FixedBytes(word, size) => {
            ParamValue::ByteString(Bytes::copy_from_slice(&word[..size]))
        }
        DynSolValue::Bytes(b) => ParamValue::ByteString(Bytes::from(b)),
        DynSolValue::String(s) => ParamValue::Scalar(Scalar::Text(s)),
        DynSolValue::Function(f) => ParamValue::ByteString(Bytes::copy_from_slice(f.as_slice())),
        DynSolValue::Array(items) | DynSolValue::FixedArray(items) | DynSolValue::Tuple(items) => {
            ParamValue::List(items.into_iter().map(from_sol_value).collect())
        }
        #[allow(unreachable_patterns)]
        _ => ParamValue::Failed,
    }
}

fn to_sol_value(ty: &TypeDescriptor, value: &ParamValue) -> Result<DynSolValue, CodecError> {
    let mismatch = || CodecError::ValueMismatch(ty.to_string());

    match (ty, value) {
        (TypeDescriptor::Uint(bits), ParamValue::BigInteger(BigInteger::Unsigned(v))) => {
            Ok(DynSolValue::Uint(*v, *bits))
        }
        (TypeDescriptor::Uint(bits), ParamValue::Scalar(Scalar::Decimal(s))) => U256::from_str(s)
            .map(|v| DynSolValue::Uint(v, *bits))
            .map_err(|_| mismatch()),
        (TypeDescriptor::Int(bits), ParamValue::BigInteger(BigInteger::Signed(v))) => {
            Ok(DynSolValue::Int(*v, *bits))
        }
        (TypeDescriptor::Int(bits), ParamValue::Scalar(Scalar::Decimal(s))) => I256::from_str(s)
            .map(|v| DynSolValue::Int(v, *bits))
            .map_err(|_| mismatch()),
        (TypeDescriptor::Address, ParamValue::Scalar(Scalar::Address(a))) => {
            Ok(DynSolValue::Address(*a))
        }
        (TypeDescriptor::Bool, ParamValue::Scalar(Scalar::Bool(b))) => Ok(DynSolValue::Bool(*b)),
        (TypeDescriptor::FixedBytes(size), ParamValue::ByteString(b)) if b.len() == *size => {
            let mut word = B256::ZERO;
            word.0[..*size].copy_from_slice(b);
            Ok(DynSolValue::FixedBytes(word, *size))
        }
        (TypeDescriptor::Bytes, ParamValue::ByteString(b)) => Ok(DynSolValue::Bytes(b.to_vec())),
        (TypeDescriptor::String, ParamValue::Scalar(Scalar::Text(s))) => {
            Ok(DynSolValue::String(s.clone()))
        }
        (TypeDescriptor::Array(inner), ParamValue::List(items)) => items
            .iter()
            .map(|item| to_sol_value(inner, item))
            .collect::<Result<Vec<_>, _>>()
            .map(DynSolValue::Array),
        (TypeDescriptor::FixedArray(inner, len), ParamValue::List(items)) if items.len() == *len => {
            items
                .iter()
                .map(|item| to_sol_value(inner, item))
                .collect::<Result<Vec<_>, _>>()
                .map(DynSolValue::FixedArray)
        }
        (TypeDescriptor::Tuple(members), ParamValue::List(items)) if items.len() == members.len() => {
            members
                .iter()
                .zip(items)
                .map(|(member, item)| to_sol_value(&member.ty, item))
                .collect::<Result<Vec<_>, _>>()
                .map(DynSolValue::Tuple)
        }
        _ => Err(mismatch()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_elementary_types() {
        assert_eq!(TypeDescriptor::parse("uint256").unwrap(), TypeDescriptor::Uint(256));
        assert_eq!(TypeDescriptor::parse("uint").unwrap(), TypeDescriptor::Uint(256));
        assert_eq!(TypeDescriptor::parse("int24").unwrap(), TypeDescriptor::Int(24));
        assert_eq!(TypeDescriptor::parse(" bytes4 ").unwrap(), TypeDescriptor::FixedBytes(4));
        assert_eq!(TypeDescriptor::parse("bytes").unwrap(), TypeDescriptor::Bytes);
    }

    #[test]
    fn rejects_malformed_types() {
        for bad in [
            "uint7", "uint264", "bytes0", "bytes33", "int08", "uint256[0]", "(address",
            "(,uint8)", "function", "tuple", "foo",
        ] {
            assert!(TypeDescriptor::parse(bad).is_err(), "{bad} should not parse");
        }
    }

    #[test]
    fn parses_nested_tuple_arrays() {
        let ty = TypeDescriptor::parse("(address token,uint160 amount,(uint48,uint48)[2])[]").unwrap();
        let TypeDescriptor::Array(inner) = &ty else {
            panic!("expected dynamic array, got {ty:?}");
        };
        let TypeDescriptor::Tuple(members) = inner.as_ref() else {
            panic!("expected tuple element");
        };
        assert_eq!(members.len(), 3);
        assert_eq!(members[0].name.as_deref(), Some("token"));
        assert_eq!(members[2].name, None);
        assert_eq!(ty.to_string(), "(address,uint160,(uint48,uint48)[2])[]");
        assert!(ty.is_dynamic());
    }

    #[test]
    fn tuple_keyword_prefix_is_accepted() {
        let ty = TypeDescriptor::parse("tuple(uint256,bool)").unwrap();
        assert_eq!(ty.to_string(), "(uint256,bool)");
        assert!(!ty.is_dynamic());
    }

    #[test]
    fn suffix_applies_left_to_right() {
        let ty = apply_suffix(TypeDescriptor::Bool, "[2][]").unwrap();
        assert_eq!(ty.to_string(), "bool[2][]");
        assert!(apply_suffix(TypeDescriptor::Bool, "[x]").is_err());
    }

    #[test]
    fn decode_fails_on_short_data() {
        let types = [TypeDescriptor::Address, TypeDescriptor::Uint(256)];
        assert!(decode(&types, &[0u8; 32]).is_err());
    }

    #[test]
    fn huge_fixed_arrays_are_rejected_before_decoding() {
        let data = [0u8; 64];
        for ty in [
            "uint8[90000000][]",
            "uint8[90000000]",
            "(bool,uint8[4096][4096])[]",
            "uint8[18446744073709551615][2]",
        ] {
            let types = [TypeDescriptor::parse(ty).unwrap()];
            assert!(
                matches!(decode(&types, &data), Err(CodecError::Oversized(_))),
                "{ty} should be rejected"
            );
        }
    }

    #[test]
    fn empty_array_of_small_fixed_arrays_still_decodes() {
        let types = [TypeDescriptor::parse("uint256[3][]").unwrap()];
        let encoded = encode(&types, &[ParamValue::List(Vec::new())]).unwrap();
        assert_eq!(encoded.len(), 64);
        assert_eq!(decode(&types, &encoded).unwrap(), vec![ParamValue::List(Vec::new())]);
    }

    #[test]
    fn encode_rejects_mismatched_values() {
        let types = [TypeDescriptor::FixedBytes(4)];
        let err = encode(&types, &[ParamValue::ByteString(Bytes::from(vec![1u8, 2]))]).unwrap_err();
        assert_eq!(err, CodecError::ValueMismatch("bytes4".to_owned()));
    }
}
