//! Record coercion: every key converts through the declared string kind,
//! every value through the declared value type, and the result keeps the
//! first occurrence of each key.

use crate::convert;
use crate::convert::string;
use crate::error::{expected_bare, CoercionError};
use crate::registry::Registry;
use crate::ty::{StringKind, Ty};
use crate::value::{Record, Value};

pub(crate) fn to_record(
    value: &Value,
    key_kind: StringKind,
    value_ty: &Ty,
    registry: &Registry,
) -> Result<Value, CoercionError> {
    let mut entries = Vec::new();
    for (key, item) in convert::sequence::iterate(value) {
        let outside = |cause| {
            let label = format!(
                "record<{}, {value_ty}> (an associative array including only {value_ty})",
                key_kind.keyword()
            );
            CoercionError::domain(expected_bare(&label), Some(cause))
        };
        let record_key = string::to_record_key(&key, key_kind).map_err(outside)?;
        let converted = convert::convert_ty(value_ty, &item, registry).map_err(outside)?;
        entries.push((record_key, converted));
    }
    Ok(Record::from_entries(entries).into_value())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{ArrayKey, HostIterator, RecordKey};

    fn record_of(descriptor: &str, value: Value) -> Result<Value, CoercionError> {
        let Ty::Record(key_kind, value_ty) = Ty::parse(descriptor) else {
            panic!("not a record descriptor: {descriptor}");
        };
        to_record(&value, key_kind, &value_ty, &Registry::new())
    }

    #[test]
    fn keys_and_values_convert() {
        let input = Value::array([
            (ArrayKey::from("a"), Value::Int(1)),
            (ArrayKey::Int(5), Value::Double(2.0)),
        ]);
        let Value::Record(record) = record_of("record<DOMString, DOMString>", input).unwrap()
        else {
            panic!("expected record");
        };
        let pairs: Vec<_> = record
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                (RecordKey::from("a"), Value::from("1")),
                (RecordKey::from("5"), Value::from("2")),
            ]
        );
    }

    #[test]
    fn duplicate_keys_keep_the_first_value() {
        // distinct iterator keys can collide after key conversion
        let input = HostIterator::rewindable([
            (Value::from("k"), Value::from("first")),
            (Value::Bytes(b"k".to_vec()), Value::from("second")),
        ])
        .into_value();
        let Value::Record(record) = record_of("record<USVString, DOMString>", input).unwrap()
        else {
            panic!("expected record");
        };
        assert_eq!(record.len(), 1);
        assert_eq!(record.get(&RecordKey::from("k")), Some(&Value::from("first")));
    }

    #[test]
    fn byte_string_keys_stay_raw() {
        let input = Value::array([(ArrayKey::Bytes(vec![0xc3, 0x28]), Value::Int(1))]);
        let Value::Record(record) = record_of("record<ByteString, octet>", input).unwrap() else {
            panic!("expected record");
        };
        assert_eq!(
            record.get(&RecordKey::Bytes(vec![0xc3, 0x28])),
            Some(&Value::Int(1))
        );
    }

    #[test]
    fn key_failures_are_domain_errors() {
        let input = Value::array([(ArrayKey::Bytes(vec![0xc3, 0x28]), Value::Int(1))]);
        let error = record_of("record<DOMString, octet>", input).unwrap_err();
        assert!(error.is_domain());
        assert_eq!(
            error.message(),
            "Expected record<DOMString, octet> (an associative array including only octet)"
        );
        let cause = error.cause().expect("key failure should chain");
        assert_eq!(cause.message(), "Expected DOMString (a utf-8 string), got non utf-8 string");
    }

    #[test]
    fn value_failures_are_domain_errors() {
        let input = Value::array([(ArrayKey::from("size"), Value::Null)]);
        let error = record_of("record<DOMString, long>", input).unwrap_err();
        assert!(error.is_domain());
        let cause = error.cause().expect("value failure should chain");
        assert!(cause.is_invalid_argument());
    }

    #[test]
    fn null_produces_an_empty_record() {
        let Value::Record(record) = record_of("record<DOMString, long>", Value::Null).unwrap()
        else {
            panic!("expected record");
        };
        assert!(record.is_empty());
    }
}
