//! Dictionary coercion against a declared member table.
//!
//! The input first materializes as a keyed view under host array-offset
//! rules: entries with keys that cannot be offsets are dropped, resource
//! keys fold to their id, and a later duplicate offset overwrites an
//! earlier one. Members then convert in declaration order. A member whose
//! value is null counts as absent, so defaults apply to it.

use indexmap::IndexMap;

use crate::convert;
use crate::error::CoercionError;
use crate::registry::{DictionaryMember, Registry};
use crate::value::{ArrayKey, Value};

fn keyed_view(value: &Value) -> IndexMap<ArrayKey, Value> {
    match value {
        Value::Array(entries) => entries.clone(),
        Value::Iterator(iterator) => {
            let mut view = IndexMap::new();
            for (key, item) in iterator.take_pass() {
                if let Some(offset) = ArrayKey::from_value(&key) {
                    view.insert(offset, item);
                }
            }
            view
        }
        Value::Object(object) => object
            .fields
            .iter()
            .map(|(name, item)| (ArrayKey::canonical(name), item.clone()))
            .collect(),
        Value::Record(record) => record
            .iter()
            .filter_map(|(key, item)| {
                ArrayKey::from_value(&key.to_value()).map(|offset| (offset, item.clone()))
            })
            .collect(),
        Value::Callable(_) | Value::Null => IndexMap::new(),
        other => IndexMap::from_iter([(ArrayKey::Int(0), other.clone())]),
    }
}

pub(crate) fn to_dictionary(
    value: &Value,
    identifier: &str,
    members: &IndexMap<String, DictionaryMember>,
    registry: &Registry,
) -> Result<Value, CoercionError> {
    let view = keyed_view(value);
    let mut dictionary = IndexMap::new();
    for (name, member) in members {
        let present = match view.get(&ArrayKey::canonical(name)) {
            Some(Value::Null) | None => None,
            Some(item) => Some(item),
        };
        if let Some(item) = present {
            let converted = convert::convert_ty(&member.ty, item, registry).map_err(|cause| {
                CoercionError::domain(
                    format!("In \"{name}\" member of {identifier}, expected {}", member.ty),
                    Some(cause),
                )
            })?;
            dictionary.insert(ArrayKey::canonical(name), converted);
        } else if let Some(default) = &member.default {
            dictionary.insert(ArrayKey::canonical(name), Value::from_json(default));
        } else if member.required {
            return Err(CoercionError::domain(
                format!("In \"{name}\" member of {identifier}, expected {}, got none", member.ty),
                None,
            ));
        }
    }
    Ok(Value::Array(dictionary))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::PseudoType;
    use crate::value::{HostIterator, HostObject, Resource};

    fn registry() -> Registry {
        Registry::new().define(
            "MouseEventInit",
            PseudoType::dictionary([
                ("bubbles", DictionaryMember::new("boolean").with_default(serde_json::json!(false))),
                ("button", DictionaryMember::new("short").with_default(serde_json::json!(0))),
                ("origin", DictionaryMember::new("DOMString").required()),
                ("related", DictionaryMember::new("DOMString?")),
            ]),
        )
    }

    fn convert_dictionary(value: Value) -> Result<Value, CoercionError> {
        let registry = registry();
        let Some(PseudoType::Dictionary { members }) = registry.get("MouseEventInit") else {
            unreachable!();
        };
        to_dictionary(&value, "MouseEventInit", members, &registry)
    }

    #[test]
    fn members_convert_in_declaration_order() {
        let input = Value::array([
            (ArrayKey::from("origin"), Value::Int(5)),
            (ArrayKey::from("bubbles"), Value::from("yes")),
            (ArrayKey::from("ignored"), Value::from("dropped")),
        ]);
        let result = convert_dictionary(input).unwrap();
        assert_eq!(
            result,
            Value::array([
                (ArrayKey::from("bubbles"), Value::Bool(true)),
                (ArrayKey::from("button"), Value::Int(0)),
                (ArrayKey::from("origin"), Value::from("5")),
            ])
        );
    }

    #[test]
    fn null_members_count_as_absent() {
        let input = Value::array([
            (ArrayKey::from("origin"), Value::from("here")),
            (ArrayKey::from("bubbles"), Value::Null),
        ]);
        let result = convert_dictionary(input).unwrap();
        // the default applies, not a conversion of null
        assert_eq!(
            result,
            Value::array([
                (ArrayKey::from("bubbles"), Value::Bool(false)),
                (ArrayKey::from("button"), Value::Int(0)),
                (ArrayKey::from("origin"), Value::from("here")),
            ])
        );
    }

    #[test]
    fn defaults_apply_raw_without_conversion() {
        let registry = Registry::new().define(
            "Options",
            PseudoType::dictionary([(
                "label",
                DictionaryMember::new("DOMString").with_default(serde_json::json!(5)),
            )]),
        );
        let Some(PseudoType::Dictionary { members }) = registry.get("Options") else {
            unreachable!();
        };
        let result = to_dictionary(&Value::Null, "Options", members, &registry).unwrap();
        assert_eq!(result, Value::array([(ArrayKey::from("label"), Value::Int(5))]));
    }

    #[test]
    fn missing_required_member_is_a_domain_error() {
        let error = convert_dictionary(Value::list([])).unwrap_err();
        assert!(error.is_domain());
        assert_eq!(
            error.message(),
            "In \"origin\" member of MouseEventInit, expected DOMString, got none"
        );
        assert!(error.cause().is_none());
    }

    #[test]
    fn member_failures_name_the_member() {
        let input = Value::array([
            (ArrayKey::from("origin"), Value::list([])),
        ]);
        let error = convert_dictionary(input).unwrap_err();
        assert!(error.is_domain());
        assert_eq!(
            error.message(),
            "In \"origin\" member of MouseEventInit, expected DOMString"
        );
        let cause = error.cause().expect("member failure should chain");
        assert_eq!(cause.message(), "Expected DOMString (a utf-8 string), got array");
    }

    #[test]
    fn offset_rules_shape_the_view() {
        let input = HostIterator::rewindable([
            (Value::list([]), Value::from("dropped")),
            (HostObject::new("stdClass").into_value(), Value::from("dropped too")),
            (Value::Resource(Resource::new(7, "stream")), Value::from("at seven")),
            (Value::from("origin"), Value::from("first")),
            (Value::Bytes(b"origin".to_vec()), Value::from("second")),
        ])
        .into_value();
        let view = keyed_view(&input);
        assert_eq!(view.len(), 2);
        assert_eq!(view[&ArrayKey::Int(7)], Value::from("at seven"));
        // later duplicates overwrite in a keyed view
        assert_eq!(view[&ArrayKey::from("origin")], Value::from("second"));
    }

    #[test]
    fn scalar_input_views_at_offset_zero() {
        let result = convert_dictionary(Value::from("lone")).unwrap_err();
        // no members match offset 0, so the required member is missing
        assert!(result.is_domain());
    }

    #[test]
    fn optional_members_without_defaults_are_omitted() {
        let input = Value::array([(ArrayKey::from("origin"), Value::from("here"))]);
        let result = convert_dictionary(input).unwrap();
        let Value::Array(entries) = &result else { panic!("expected array") };
        assert!(!entries.contains_key(&ArrayKey::from("related")));
    }
}
