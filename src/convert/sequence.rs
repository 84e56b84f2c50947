//! Sequence and frozen-array coercion, plus the single-pass iteration
//! view that record and dictionary conversion share.
//!
//! Any value iterates: arrays and records yield their entries, objects
//! their fields, iterators one pass under the rewind contract, null
//! nothing, and every other value yields itself as a one-element view at
//! key 0.

use crate::convert;
use crate::error::{expected_bare, CoercionError};
use crate::registry::Registry;
use crate::ty::Ty;
use crate::value::Value;

pub(crate) fn iterate(value: &Value) -> Vec<(Value, Value)> {
    match value {
        Value::Array(entries) => entries
            .iter()
            .map(|(key, item)| (key.to_value(), item.clone()))
            .collect(),
        Value::Iterator(iterator) => iterator.take_pass(),
        Value::Object(object) => object
            .fields
            .iter()
            .map(|(name, item)| (Value::from(name.as_str()), item.clone()))
            .collect(),
        Value::Record(record) => record
            .iter()
            .map(|(key, item)| (key.to_value(), item.clone()))
            .collect(),
        Value::Callable(_) | Value::Null => Vec::new(),
        other => vec![(Value::Int(0), other.clone())],
    }
}

/// Element-wise conversion into a zero-based array. Any element failure,
/// whatever its category, reports the whole value as outside the sequence
/// domain, with the element failure as cause.
pub(crate) fn to_sequence(
    value: &Value,
    element: &Ty,
    registry: &Registry,
    frozen: bool,
) -> Result<Value, CoercionError> {
    let wrapper = if frozen { "FrozenArray" } else { "sequence" };
    let mut converted = Vec::new();
    for (_, item) in iterate(value) {
        match convert::convert_ty(element, &item, registry) {
            Ok(item) => converted.push(item),
            Err(cause) => {
                let label =
                    format!("{wrapper}<{element}> (an array including only {element})");
                return Err(CoercionError::domain(expected_bare(&label), Some(cause)));
            }
        }
    }
    Ok(Value::list(converted))
}
