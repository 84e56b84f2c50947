//! String coercion: `ByteString` passes the rendered bytes through,
//! `DOMString` and `USVString` additionally demand valid UTF-8, and
//! enumeration conversion checks the rendered text against the allowed
//! value list.

use crate::error::{expected, CoercionError};
use crate::ty::StringKind;
use crate::value::{RecordKey, Value};

pub(crate) fn label(kind: StringKind) -> &'static str {
    match kind {
        StringKind::ByteString => "ByteString (a string)",
        StringKind::DomString => "DOMString (a utf-8 string)",
        StringKind::UsvString => "USVString (a utf-8 string)",
    }
}

pub(crate) fn to_string(value: &Value, kind: StringKind) -> Result<Value, CoercionError> {
    match kind {
        StringKind::ByteString => match value.render_text() {
            Some(bytes) => Ok(Value::Bytes(bytes)),
            None => Err(CoercionError::invalid_argument(
                expected(label(kind), &value.repr()),
                None,
            )),
        },
        StringKind::DomString | StringKind::UsvString => {
            to_utf8_text(value, label(kind)).map(Value::Str)
        }
    }
}

/// Record keys convert through the same casts as the value-level string
/// kinds.
pub(crate) fn to_record_key(value: &Value, kind: StringKind) -> Result<RecordKey, CoercionError> {
    match kind {
        StringKind::ByteString => match value.render_text() {
            Some(bytes) => Ok(RecordKey::Bytes(bytes)),
            None => Err(CoercionError::invalid_argument(
                expected(label(kind), &value.repr()),
                None,
            )),
        },
        StringKind::DomString | StringKind::UsvString => {
            to_utf8_text(value, label(kind)).map(RecordKey::Text)
        }
    }
}

fn to_utf8_text(value: &Value, label: &str) -> Result<String, CoercionError> {
    let invalid =
        || CoercionError::invalid_argument(expected(label, &value.repr()), None);
    let bytes = value.render_text().ok_or_else(invalid)?;
    String::from_utf8(bytes).map_err(|_| invalid())
}

/// Enumeration conversion: text conversion first, then membership in the
/// allowed list. A value that cannot become text fails as an invalid
/// argument with the text failure as cause; text outside the list is a
/// domain error.
pub(crate) fn to_enumeration(
    value: &Value,
    identifier: &str,
    allowed: &[String],
) -> Result<Value, CoercionError> {
    let enum_label = format!("DOMString (a utf-8 string) and valid {identifier} value");
    let text = to_utf8_text(value, label(StringKind::DomString)).map_err(|cause| {
        CoercionError::invalid_argument(expected(&enum_label, &value.repr()), Some(cause))
    })?;
    if allowed.iter().any(|candidate| *candidate == text) {
        Ok(Value::Str(text))
    } else {
        Err(CoercionError::domain(expected(&enum_label, &value.repr()), None))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{HostObject, Resource};

    #[test]
    fn scalars_render_to_text() {
        assert_eq!(
            to_string(&Value::Int(128), StringKind::DomString).unwrap(),
            Value::from("128")
        );
        assert_eq!(
            to_string(&Value::Bool(true), StringKind::UsvString).unwrap(),
            Value::from("1")
        );
        assert_eq!(
            to_string(&Value::Bool(false), StringKind::DomString).unwrap(),
            Value::from("")
        );
        assert_eq!(to_string(&Value::Null, StringKind::DomString).unwrap(), Value::from(""));
        assert_eq!(
            to_string(&Value::Double(4.0), StringKind::DomString).unwrap(),
            Value::from("4")
        );
        assert_eq!(
            to_string(&HostObject::new("SplString").renders_as("wrapped").into_value(), StringKind::DomString)
                .unwrap(),
            Value::from("wrapped")
        );
    }

    #[test]
    fn byte_string_passes_raw_bytes() {
        let raw = Value::Bytes(vec![0xc3, 0x28]);
        assert_eq!(to_string(&raw, StringKind::ByteString).unwrap(), raw);
        assert_eq!(
            to_string(&Value::Int(7), StringKind::ByteString).unwrap(),
            Value::Bytes(b"7".to_vec())
        );
    }

    #[test]
    fn utf8_kinds_reject_invalid_bytes() {
        let raw = Value::Bytes(vec![0xc3, 0x28]);
        let error = to_string(&raw, StringKind::UsvString).unwrap_err();
        assert!(error.is_invalid_argument());
        assert_eq!(
            error.message(),
            "Expected USVString (a utf-8 string), got non utf-8 string"
        );
        let error = to_string(&raw, StringKind::DomString).unwrap_err();
        assert_eq!(
            error.message(),
            "Expected DOMString (a utf-8 string), got non utf-8 string"
        );
    }

    #[test]
    fn non_renderable_shapes_fail() {
        for value in [
            Value::list([Value::Int(1)]),
            HostObject::new("stdClass").into_value(),
            Value::Resource(Resource::new(2, "stream")),
        ] {
            let error = to_string(&value, StringKind::DomString).unwrap_err();
            assert!(error.is_invalid_argument());
        }
        let error = to_string(&Value::list([]), StringKind::ByteString).unwrap_err();
        assert_eq!(error.message(), "Expected ByteString (a string), got array");
    }

    #[test]
    fn enumeration_checks_membership() {
        let allowed = vec!["open".to_owned(), "closed".to_owned()];
        assert_eq!(
            to_enumeration(&Value::from("open"), "ShadowRootMode", &allowed).unwrap(),
            Value::from("open")
        );
        let error = to_enumeration(&Value::from("ajar"), "ShadowRootMode", &allowed).unwrap_err();
        assert!(error.is_domain());
        assert_eq!(
            error.message(),
            "Expected DOMString (a utf-8 string) and valid ShadowRootMode value, got 'ajar'"
        );
        assert!(error.cause().is_none());
    }

    #[test]
    fn enumeration_chains_the_text_failure() {
        let allowed = vec!["open".to_owned()];
        let error = to_enumeration(&Value::list([]), "ShadowRootMode", &allowed).unwrap_err();
        assert!(error.is_invalid_argument());
        assert_eq!(
            error.message(),
            "Expected DOMString (a utf-8 string) and valid ShadowRootMode value, got array"
        );
        let cause = error.cause().expect("text failure should chain");
        assert_eq!(cause.message(), "Expected DOMString (a utf-8 string), got array");
    }
}
