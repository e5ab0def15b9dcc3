use crate::codec::TypeDescriptor;
use crate::domain::{DecodedParam, ParamValue};

/// Wraps a decoded value into a [`DecodedParam`], exposing tuple members and
/// array items as children. Array items are named `Item 1`, `Item 2`, ...
pub fn build_param(name: Option<String>, ty: &TypeDescriptor, value: ParamValue) -> DecodedParam {
    let children = match (ty, &value) {
        (TypeDescriptor::Tuple(members), ParamValue::List(items)) if members.len() == items.len() => {
            Some(
                members
                    .iter()
                    .zip(items)
                    .map(|(member, item)| build_param(member.name.clone(), &member.ty, item.clone()))
                    .collect(),
            )
        }
        (TypeDescriptor::Array(inner), ParamValue::List(items))
        | (TypeDescriptor::FixedArray(inner, _), ParamValue::List(items)) => Some(
            items
                .iter()
                .enumerate()
                .map(|(idx, item)| build_param(Some(format!("Item {}", idx + 1)), inner, item.clone()))
                .collect(),
        ),
        _ => None,
    };

    DecodedParam {
        children,
        ..DecodedParam::new(name, ty.to_string(), value)
    }
}
