use alloy::primitives::{Address, Bytes, I256};

use txlens_core::codec::{decode, encode};
use txlens_core::{BigInteger, ParamValue, Scalar, TypeDescriptor};

mod common;
use common::{address, bytes, uint};

fn types(list: &[&str]) -> Vec<TypeDescriptor> {
    list.iter()
        .map(|ty| TypeDescriptor::parse(ty).expect("valid type"))
        .collect()
}

#[test]
fn static_and_dynamic_parameters_roundtrip() {
    let types = types(&["address", "int24", "bytes", "string", "bool", "bytes4"]);
    let values = vec![
        address(Address::repeat_byte(0x11)),
        ParamValue::BigInteger(BigInteger::Signed(I256::try_from(-887_272i64).unwrap())),
        bytes(vec![0xde, 0xad, 0xbe, 0xef, 0x01]),
        ParamValue::Scalar(Scalar::Text("hello".to_owned())),
        ParamValue::Scalar(Scalar::Bool(true)),
        bytes(vec![0xa9, 0x05, 0x9c, 0xbb]),
    ];

    let encoded = encode(&types, &values).unwrap();
    assert_eq!(decode(&types, &encoded).unwrap(), values);
}

#[test]
fn dynamic_array_of_tuples_roundtrips() {
    let types = types(&[
        "(address token,uint160 amount,uint48 expiration,uint48 nonce)[]",
        "(bytes data,uint256[2] pair)",
    ]);
    let detail = |seed: u8, amount: u64| {
        ParamValue::List(vec![address(Address::repeat_byte(seed)), uint(amount), uint(0), uint(7)])
    };
    let values = vec![
        ParamValue::List(vec![detail(0x01, 100), detail(0x02, 200)]),
        ParamValue::List(vec![
            bytes(Bytes::from_static(b"nested")),
            ParamValue::List(vec![uint(1), uint(2)]),
        ]),
    ];

    let encoded = encode(&types, &values).unwrap();
    assert_eq!(decode(&types, &encoded).unwrap(), values);
}

#[test]
fn empty_type_list_decodes_nothing() {
    assert!(decode(&[], &[]).unwrap().is_empty());
    assert!(encode(&[], &[]).unwrap().is_empty());
}

#[test]
fn truncated_tail_is_a_structural_failure() {
    let types = types(&["bytes"]);
    let mut encoded = encode(&types, &[bytes(vec![0x42; 40])]).unwrap();
    encoded.truncate(encoded.len() - 32);
    assert!(decode(&types, &encoded).is_err());
}

#[test]
fn decimal_strings_encode_like_integers() {
    let types = types(&["uint256", "int8"]);
    let from_decimal = encode(
        &types,
        &[
            ParamValue::Scalar(Scalar::Decimal("1000000000000000000".to_owned())),
            ParamValue::Scalar(Scalar::Decimal("-1".to_owned())),
        ],
    )
    .unwrap();
    let from_tagged = encode(
        &types,
        &[
            uint(1_000_000_000_000_000_000),
            ParamValue::BigInteger(BigInteger::Signed(I256::MINUS_ONE)),
        ],
    )
    .unwrap();
    assert_eq!(from_decimal, from_tagged);
}
