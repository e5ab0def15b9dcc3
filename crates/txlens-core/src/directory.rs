//! Decoding against candidate signatures from a signature directory.

use tracing::{debug, info, warn};

use crate::codec;
use crate::domain::{CallData, DecodedMethod};
use crate::params::build_param;
use crate::ports::SignatureDirectoryPort;
use crate::signature::FunctionSignature;

/// Returns the first candidate, in directory order, whose parameter list
/// decodes the call's arguments. Colliding selectors resolve to whichever
/// candidate the directory lists first.
pub fn first_decodable(candidates: &[String], call: &CallData) -> Option<DecodedMethod> {
    let args = call.args();

    for candidate in candidates {
        let signature = match FunctionSignature::parse(candidate) {
            Ok(signature) => signature,
            Err(e) => {
                debug!(candidate = %candidate, error = %e, "skipping unparseable signature");
                continue;
            }
        };

        // Parameter count must agree with whether there are argument bytes.
        if signature.inputs.is_empty() != args.is_empty() {
            debug!(candidate = %candidate, "skipping candidate with inconsistent arity");
            continue;
        }

        let values = match codec::decode(&signature.types(), args) {
            Ok(values) => values,
            Err(e) => {
                debug!(candidate = %candidate, error = %e, "candidate did not decode");
                continue;
            }
        };

        let params = signature
            .inputs
            .iter()
            .zip(values)
            .map(|(input, value)| build_param(input.name.clone(), &input.ty, value))
            .collect();

        return Some(DecodedMethod {
            name: signature.name,
            description: None,
            params,
        });
    }

    None
}

/// Directory strategy. Lookup failures are logged and yield `None`.
pub async fn decode_with_directory<S>(directory: &S, call: &CallData) -> Option<DecodedMethod>
where
    S: SignatureDirectoryPort + ?Sized,
{
    let selector = call.selector_hex();
    let candidates = match directory.lookup(call.selector()).await {
        Ok(candidates) => candidates,
        Err(e) => {
            warn!(selector = %selector, error = %e, "signature directory lookup failed");
            return None;
        }
    };

    let method = first_decodable(&candidates, call);
    match &method {
        Some(m) => info!(selector = %selector, method = %m.name, "decoded with signature directory"),
        None => debug!(
            selector = %selector,
            candidates = candidates.len(),
            "no directory candidate decoded"
        ),
    }
    method
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ParamValue, Scalar};
    use alloy::primitives::Address;

    // transfer(0x11..11, 1)
    const TRANSFER: &str = "0xa9059cbb\
        0000000000000000000000001111111111111111111111111111111111111111\
        0000000000000000000000000000000000000000000000000000000000000001";

    fn candidates(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn skips_zero_param_candidate_when_args_present() {
        let call = CallData::from_hex(TRANSFER).unwrap();
        let method = first_decodable(
            &candidates(&["many_msg_babbage(bytes1)x", "collide()", "transfer(address,uint256)"]),
            &call,
        )
        .unwrap();
        assert_eq!(method.name, "transfer");
        assert_eq!(method.params.len(), 2);
        assert!(method.description.is_none());
    }

    #[test]
    fn first_decodable_wins_over_later_matches() {
        let call = CallData::from_hex(TRANSFER).unwrap();
        let method = first_decodable(
            &candidates(&["first(address,uint256)", "second(address,uint256)"]),
            &call,
        )
        .unwrap();
        assert_eq!(method.name, "first");
    }

    #[test]
    fn structural_failure_moves_to_next_candidate() {
        let call = CallData::from_hex(TRANSFER).unwrap();
        let method = first_decodable(
            &candidates(&["wide(address,uint256,uint256,bytes)", "transfer(address,uint256)"]),
            &call,
        )
        .unwrap();
        assert_eq!(method.name, "transfer");
        assert_eq!(
            method.params[0].value,
            ParamValue::Scalar(Scalar::Address(Address::repeat_byte(0x11)))
        );
    }

    #[test]
    fn selector_only_call_matches_empty_signature() {
        let call = CallData::from_hex("0x8456cb59").unwrap();
        assert!(first_decodable(&candidates(&["transfer(address,uint256)"]), &call).is_none());
        let method = first_decodable(&candidates(&["pause()"]), &call).unwrap();
        assert!(method.params.is_empty());
    }
}
