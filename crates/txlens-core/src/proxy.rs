//! Delegating-proxy resolution
//!
//! | Pattern | Detection |
//! |---------|-----------|
//! | ZeppelinOS | `org.zeppelinos.proxy.implementation` slot |
//! | EIP-1967 logic | implementation slot |
//! | EIP-1967 beacon | beacon slot, then `implementation()` on the beacon |
//! | EIP-1167 clone | runtime bytecode layout |

use alloy::primitives::{b256, hex, Address, B256};
use serde_json::{json, Value};
use tracing::debug;

use crate::ports::{ChainProviderPort, PortError};

/// `keccak256("org.zeppelinos.proxy.implementation")`
pub const ZEPPELINOS_IMPL_SLOT: B256 =
    b256!("7050c9e0f4ca769c69bd3a8ef740bc37934f8e2c036e5a723fd8ee048ed3f8c3");

/// `keccak256("eip1967.proxy.implementation") - 1`
pub const EIP1967_IMPL_SLOT: B256 =
    b256!("360894a13ba1a3210667c828492db98dca3e2076cc3735a920a3ca505d382bbc");

/// `keccak256("eip1967.proxy.beacon") - 1`
pub const EIP1967_BEACON_SLOT: B256 =
    b256!("a3f0ad74e5423aebfd80d3ef4346578335a9a72aeaee59ff6cb3582b35133d50");

/// `implementation()`
pub const BEACON_IMPLEMENTATION_SELECTOR: [u8; 4] = [0x5c, 0x60, 0xda, 0x1b];

const EIP1167_PREFIX: &[u8] = &[0x36, 0x3d, 0x3d, 0x37, 0x3d, 0x3d, 0x3d, 0x36, 0x3d, 0x73];
const EIP1167_SUFFIX: &[u8] = &[
    0x5a, 0xf4, 0x3d, 0x82, 0x80, 0x3e, 0x90, 0x3d, 0x91, 0x60, 0x2b, 0x57, 0xfd, 0x5b, 0xf3,
];

/// Returns the implementation behind `address`, or `None` when it is not a
/// recognised proxy or the provider fails.
pub async fn resolve_proxy<P>(provider: &P, address: Address) -> Option<Address>
where
    P: ChainProviderPort + ?Sized,
{
    if address.is_zero() {
        return None;
    }

    match try_resolve(provider, address).await {
        Ok(implementation) => implementation,
        Err(e) => {
            debug!(address = %address, error = %e, "proxy resolution failed");
            None
        }
    }
}

async fn try_resolve<P>(provider: &P, address: Address) -> Result<Option<Address>, PortError>
where
    P: ChainProviderPort + ?Sized,
{
    let (zeppelin, eip1967) = futures::future::join(
        read_slot(provider, address, ZEPPELINOS_IMPL_SLOT),
        read_slot(provider, address, EIP1967_IMPL_SLOT),
    )
    .await;
    for word in [zeppelin?, eip1967?] {
        if let Some(implementation) = storage_to_address(&word) {
            return Ok(Some(implementation));
        }
    }

    let beacon = read_slot(provider, address, EIP1967_BEACON_SLOT).await?;
    if let Some(beacon) = storage_to_address(&beacon) {
        let result = provider
            .request(
                "eth_call",
                json!([
                    { "to": beacon, "data": hex::encode_prefixed(BEACON_IMPLEMENTATION_SELECTOR) },
                    "latest"
                ]),
            )
            .await?;
        let returned = parse_hex_result(&result)?;
        if returned.len() >= 32 {
            if let Some(implementation) = storage_to_address(&returned[..32]) {
                return Ok(Some(implementation));
            }
        }
    }

    let code = provider
        .request("eth_getCode", json!([address, "latest"]))
        .await?;
    Ok(detect_eip1167_clone(&parse_hex_result(&code)?))
}

async fn read_slot<P>(provider: &P, address: Address, slot: B256) -> Result<Vec<u8>, PortError>
where
    P: ChainProviderPort + ?Sized,
{
    let value = provider
        .request("eth_getStorageAt", json!([address, slot, "latest"]))
        .await?;
    parse_hex_result(&value)
}

fn parse_hex_result(value: &Value) -> Result<Vec<u8>, PortError> {
    let text = value
        .as_str()
        .ok_or_else(|| PortError::Malformed(format!("expected hex string, got {value}")))?;
    let digits = text.strip_prefix("0x").unwrap_or(text);
    // Some nodes return unpadded quantities such as `0x0`.
    let padded;
    let digits = if digits.len() % 2 == 1 {
        padded = format!("0{digits}");
        padded.as_str()
    } else {
        digits
    };
    hex::decode(digits).map_err(|e| PortError::Malformed(e.to_string()))
}

/// Low 20 bytes of a (possibly unpadded) storage word, when non-zero.
pub fn storage_to_address(word: &[u8]) -> Option<Address> {
    if word.len() > 32 {
        return None;
    }
    let mut padded = [0u8; 32];
    padded[32 - word.len()..].copy_from_slice(word);
    let address = Address::from_slice(&padded[12..]);
    (!address.is_zero()).then_some(address)
}

/// Extracts the target of an EIP-1167 minimal proxy from its runtime code.
pub fn detect_eip1167_clone(bytecode: &[u8]) -> Option<Address> {
    // [10 prefix bytes] [20 address bytes] [15 suffix bytes]
    if bytecode.len() != 45 || !bytecode.starts_with(EIP1167_PREFIX) || !bytecode.ends_with(EIP1167_SUFFIX)
    {
        return None;
    }
    Some(Address::from_slice(&bytecode[10..30]))
}
