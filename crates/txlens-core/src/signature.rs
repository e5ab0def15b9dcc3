//! Text function signatures (`name(type,type,...)`) and their selectors.

use std::fmt;

use alloy::primitives::keccak256;

use crate::codec::{parse_member, split_top_level, CodecError, TupleMember, TypeDescriptor};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSignature {
    pub name: String,
    pub inputs: Vec<TupleMember>,
}

impl FunctionSignature {
    pub fn new(name: impl Into<String>, inputs: Vec<TupleMember>) -> Self {
        Self {
            name: name.into(),
            inputs,
        }
    }

    /// Parses a text signature as published by signature directories, e.g.
    /// `transfer(address,uint256)` or `swap((address,uint24)[] route,bytes)`.
    pub fn parse(signature: &str) -> Result<Self, CodecError> {
        let signature = signature.trim();
        let invalid = || CodecError::InvalidType(signature.to_owned());

        let open = signature.find('(').ok_or_else(invalid)?;
        if !signature.ends_with(')') {
            return Err(invalid());
        }
        let name = &signature[..open];
        let valid_name = name
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$');
        if !valid_name {
            return Err(invalid());
        }

        let body = &signature[open + 1..signature.len() - 1];
        let inputs = split_top_level(body)
            .ok_or_else(invalid)?
            .into_iter()
            .map(parse_member)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::new(name, inputs))
    }

    pub fn types(&self) -> Vec<TypeDescriptor> {
        self.inputs.iter().map(|input| input.ty.clone()).collect()
    }

    pub fn selector(&self) -> [u8; 4] {
        selector_of(&self.to_string())
    }
}

impl fmt::Display for FunctionSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (idx, input) in self.inputs.iter().enumerate() {
            if idx > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", input.ty)?;
        }
        f.write_str(")")
    }
}

/// First four bytes of `keccak256(signature)`.
pub fn selector_of(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    let mut selector = [0u8; 4];
    selector.copy_from_slice(&hash.as_slice()[0..4]);
    selector
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::hex;

    #[test]
    fn parses_directory_signature() {
        let sig = FunctionSignature::parse("transfer(address,uint256)").unwrap();
        assert_eq!(sig.name, "transfer");
        assert_eq!(sig.inputs.len(), 2);
        assert_eq!(hex::encode(sig.selector()), "a9059cbb");
    }

    #[test]
    fn parses_empty_and_named_inputs() {
        let sig = FunctionSignature::parse("pause()").unwrap();
        assert!(sig.inputs.is_empty());
        assert_eq!(hex::encode(sig.selector()), "8456cb59");

        let sig = FunctionSignature::parse("multicall(uint256 deadline, bytes[] data)").unwrap();
        assert_eq!(sig.inputs[1].name.as_deref(), Some("data"));
        assert_eq!(sig.to_string(), "multicall(uint256,bytes[])");
        assert_eq!(hex::encode(sig.selector()), "5ae401dc");
    }

    #[test]
    fn canonicalizes_tuple_inputs() {
        let sig = FunctionSignature::parse("exactInput((bytes,address,uint256,uint256,uint256))").unwrap();
        assert_eq!(sig.to_string(), "exactInput((bytes,address,uint256,uint256,uint256))");
        assert_eq!(hex::encode(sig.selector()), "c04b8d59");
    }

    #[test]
    fn rejects_garbage() {
        assert!(FunctionSignature::parse("transfer").is_err());
        assert!(FunctionSignature::parse("1abc()").is_err());
        assert!(FunctionSignature::parse("f(uint256").is_err());
        assert!(FunctionSignature::parse("f(uint9)").is_err());
    }
}
