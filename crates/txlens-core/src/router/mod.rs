//! Uniswap Universal Router decoding
//!
//! Calls to a known router deployment are unpacked into their command list:
//! `execute(bytes commands, bytes[] inputs[, uint256 deadline])`, where each
//! command byte selects an entry of [`commands`] and decodes the input at the
//! same position.

pub mod commands;

use std::sync::LazyLock;

use alloy::primitives::{address, Address};
use tracing::debug;

use crate::codec::{self, TypeDescriptor};
use crate::domain::{CallData, DecodedMethod, DecodedParam, ParamValue, PoolHop};
use crate::params::build_param;
use crate::signature::selector_of;

use commands::CommandSpec;

/// Low five bits of a command byte index the table; the rest are flags.
const COMMAND_INDEX_MASK: u8 = 0x1f;

const PATH_ADDRESS_LEN: usize = 20;
const PATH_SPACING_LEN: usize = 3;

static EXECUTE_WITH_DEADLINE: LazyLock<[u8; 4]> =
    LazyLock::new(|| selector_of("execute(bytes,bytes[],uint256)"));
static EXECUTE: LazyLock<[u8; 4]> = LazyLock::new(|| selector_of("execute(bytes,bytes[])"));

/// Universal Router deployments per chain id.
static ROUTER_DEPLOYMENTS: &[(u64, &[Address])] = &[
    (
        1,
        &[
            address!("Ef1c6E67703c7BD7107eed8303Fbe6EC2554BF6B"),
            address!("3fC91A3afd70395Cd496C647d5a6CC9D4B2b7FAD"),
        ],
    ),
    (
        10,
        &[
            address!("b555edF5dcF85f42cEeF1f3630a52A108E55A654"),
            address!("eC8B0F7Ffe3ae75d7FfAb09429e3675bb63503e4"),
            address!("Cb1355ff08Ab38bBCE60111F1bb2B784bE25D7e8"),
        ],
    ),
    (
        56,
        &[
            address!("5Dc88340E1c5c6366864Ee415d6034cadd1A9897"),
            address!("eC8B0F7Ffe3ae75d7FfAb09429e3675bb63503e4"),
            address!("4Dae2f939ACf50408e13d58534Ff8c2776d45265"),
        ],
    ),
    (
        137,
        &[
            address!("4C60051384bd2d3C01bfc845Cf5F4b44bcbE9de5"),
            address!("643770E279d5D0733F21d6DC03A8efbABf3255B4"),
            address!("ec7BE89e9d109e7e3Fec59c222CF297125FEFda2"),
        ],
    ),
    (
        8453,
        &[
            address!("eC8B0F7Ffe3ae75d7FfAb09429e3675bb63503e4"),
            address!("3fC91A3afd70395Cd496C647d5a6CC9D4B2b7FAD"),
        ],
    ),
    (
        42161,
        &[
            address!("4C60051384bd2d3C01bfc845Cf5F4b44bcbE9de5"),
            address!("eC8B0F7Ffe3ae75d7FfAb09429e3675bb63503e4"),
            address!("5E325eDA8064b456f4781070C0738d849c824258"),
        ],
    ),
    (
        43114,
        &[
            address!("82635AF6146972cD6601161c4472ffe97237D292"),
            address!("4Dae2f939ACf50408e13d58534Ff8c2776d45265"),
        ],
    ),
    (
        11155111,
        &[address!("3fC91A3afd70395Cd496C647d5a6CC9D4B2b7FAD")],
    ),
];

pub fn is_router_address(chain_id: u64, address: Address) -> bool {
    ROUTER_DEPLOYMENTS
        .iter()
        .find(|(chain, _)| *chain == chain_id)
        .is_some_and(|(_, routers)| routers.contains(&address))
}

/// Decodes a Universal Router `execute` call. Returns `None` when the target
/// is not a known router or the outer call does not parse; individual
/// commands that cannot be decoded are dropped.
pub fn decode_router_call(
    call: &CallData,
    address: Address,
    chain_id: u64,
) -> Option<Vec<DecodedMethod>> {
    if !is_router_address(chain_id, address) {
        return None;
    }

    let selector = call.selector();
    let outer_types = if selector == *EXECUTE_WITH_DEADLINE {
        vec![
            TypeDescriptor::Bytes,
            TypeDescriptor::Array(Box::new(TypeDescriptor::Bytes)),
            TypeDescriptor::Uint(256),
        ]
    } else if selector == *EXECUTE {
        vec![
            TypeDescriptor::Bytes,
            TypeDescriptor::Array(Box::new(TypeDescriptor::Bytes)),
        ]
    } else {
        debug!(selector = %call.selector_hex(), "router call is not execute");
        return None;
    };

    let values = match codec::decode(&outer_types, call.args()) {
        Ok(values) => values,
        Err(e) => {
            debug!(error = %e, "router execute arguments did not decode");
            return None;
        }
    };
    let command_bytes = values.first()?.as_byte_string()?.clone();
    let inputs = values.get(1)?.as_list()?;

    let methods = command_bytes
        .iter()
        .enumerate()
        .filter_map(|(idx, byte)| {
            let spec = commands::command(byte & COMMAND_INDEX_MASK)?;
            let input = inputs.get(idx)?.as_byte_string()?;
            decode_command(spec, input)
        })
        .collect();

    Some(methods)
}

fn decode_command(spec: &CommandSpec, input: &[u8]) -> Option<DecodedMethod> {
    let types = spec
        .params
        .iter()
        .map(|p| TypeDescriptor::parse(p.ty))
        .collect::<Result<Vec<_>, _>>()
        .ok()?;
    let values = match codec::decode(&types, input) {
        Ok(values) => values,
        Err(e) => {
            debug!(command = spec.name, error = %e, "dropping undecodable router command");
            return None;
        }
    };

    let params = spec
        .params
        .iter()
        .zip(types.iter().zip(values))
        .map(|(p, (ty, value))| {
            let param = match value {
                ParamValue::ByteString(path) if p.name == "path" => DecodedParam::new(
                    Some(p.name.to_owned()),
                    ty.to_string(),
                    ParamValue::Pools(decode_path(&path)),
                ),
                value => build_param(Some(p.name.to_owned()), ty, value),
            };
            param.with_description(Some(p.description.to_owned()))
        })
        .collect();

    Some(DecodedMethod {
        name: spec.name.to_owned(),
        description: Some(spec.description.to_owned()),
        params,
    })
}

/// Splits a packed v3 path (`address | spacing(3) | address | ...`) into
/// pool hops. Consecutive hops share their boundary address; a trailing
/// partial hop is ignored.
pub fn decode_path(path: &[u8]) -> Vec<PoolHop> {
    let hop_len = PATH_ADDRESS_LEN + PATH_SPACING_LEN;
    let mut pools = Vec::new();
    let mut offset = 0;

    while offset + hop_len + PATH_ADDRESS_LEN <= path.len() {
        let spacing = &path[offset + PATH_ADDRESS_LEN..offset + hop_len];
        pools.push(PoolHop {
            first_address: Address::from_slice(&path[offset..offset + PATH_ADDRESS_LEN]),
            tick_spacing: u32::from_be_bytes([0, spacing[0], spacing[1], spacing[2]]),
            second_address: Address::from_slice(
                &path[offset + hop_len..offset + hop_len + PATH_ADDRESS_LEN],
            ),
        });
        offset += hop_len;
    }

    pools
}
