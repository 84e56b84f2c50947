//! Well-known platform error names and their legacy numeric codes, plus
//! constructors for host error objects.
//!
//! The table is the fixed name-to-code mapping of the platform exception
//! catalog. Names introduced after the legacy-code scheme was frozen carry
//! no code and report 0.

use indexmap::IndexMap;
use once_cell::sync::Lazy;

use crate::ty::Ty;
use crate::value::{HostObject, Value};

/// The error capability name: error objects implement this, and the
/// descriptor `Error` accepts anything that does.
pub const ERROR_CAPABILITY: &str = "Error";

pub const DOM_EXCEPTION: &str = "DOMException";

static ERROR_NAMES_TO_CODES: Lazy<IndexMap<&'static str, Option<u16>>> = Lazy::new(|| {
    IndexMap::from_iter([
        ("IndexSizeError", Some(1)),
        ("HierarchyRequestError", Some(3)),
        ("WrongDocumentError", Some(4)),
        ("InvalidCharacterError", Some(5)),
        ("NoModificationAllowedError", Some(7)),
        ("NotFoundError", Some(8)),
        ("NotSupportedError", Some(9)),
        ("InUseAttributeError", Some(10)),
        ("InvalidStateError", Some(11)),
        ("SyntaxError", Some(12)),
        ("InvalidModificationError", Some(13)),
        ("NamespaceError", Some(14)),
        ("InvalidAccessError", Some(15)),
        ("SecurityError", Some(18)),
        ("NetworkError", Some(19)),
        ("AbortError", Some(20)),
        ("URLMismatchError", Some(21)),
        ("QuotaExceededError", Some(22)),
        ("TimeoutError", Some(23)),
        ("InvalidNodeTypeError", Some(24)),
        ("DataCloneError", Some(25)),
        ("EncodingError", None),
        ("NotReadableError", None),
        ("UnknownError", None),
        ("ConstraintError", None),
        ("DataError", None),
        ("TransactionInactiveError", None),
        ("ReadOnlyError", None),
        ("VersionError", None),
        ("OperationError", None),
    ])
});

pub fn is_error_name(name: &str) -> bool {
    ERROR_NAMES_TO_CODES.contains_key(name)
}

/// Capability names are implemented rather than instantiated; interface
/// failures mention them with "a class implementing" wording.
pub(crate) fn is_capability(name: &str) -> bool {
    name == ERROR_CAPABILITY
}

/// Legacy numeric code for an error name; 0 for names without one and for
/// unknown names.
pub fn legacy_code(name: &str) -> u16 {
    ERROR_NAMES_TO_CODES.get(name).copied().flatten().unwrap_or(0)
}

pub fn error_names() -> impl Iterator<Item = &'static str> {
    ERROR_NAMES_TO_CODES.keys().copied()
}

/// A platform exception object: class `DOMException`, implementing the
/// error capability, carrying `name`, `message` and the legacy `code`.
pub fn dom_exception(message: &str, name: &str) -> Value {
    HostObject::new(DOM_EXCEPTION)
        .implementing(ERROR_CAPABILITY)
        .field("name", name)
        .field("message", message)
        .field("code", i64::from(legacy_code(name)))
        .renders_as(format!("{name}: {message}"))
        .into_value()
}

/// A plain host error object implementing the error capability.
pub fn platform_error(message: &str) -> Value {
    HostObject::new(ERROR_CAPABILITY)
        .field("message", message)
        .renders_as(format!("Error: {message}"))
        .into_value()
}

/// The descriptor `Error` accepts the error capability or a platform
/// exception, tried in that order.
pub(crate) fn error_union() -> Ty {
    Ty::Union(vec![Ty::identifier(ERROR_CAPABILITY), Ty::identifier(DOM_EXCEPTION)])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_codes() {
        assert_eq!(legacy_code("IndexSizeError"), 1);
        assert_eq!(legacy_code("SyntaxError"), 12);
        assert_eq!(legacy_code("TimeoutError"), 23);
        assert_eq!(legacy_code("EncodingError"), 0);
        assert_eq!(legacy_code("NoSuchError"), 0);
        assert!(is_error_name("OperationError"));
        assert!(!is_error_name("NotAllowedError"));
        assert_eq!(error_names().count(), 30);
    }

    #[test]
    fn error_objects_carry_the_capability() {
        let exception = dom_exception("The index is not in the allowed range.", "IndexSizeError");
        assert!(exception.instance_of(DOM_EXCEPTION));
        assert!(exception.instance_of(ERROR_CAPABILITY));
        let Value::Object(object) = &exception else { panic!("expected object") };
        assert_eq!(object.fields["code"], Value::Int(1));

        let error = platform_error("boom");
        assert!(error.instance_of(ERROR_CAPABILITY));
        assert!(!error.instance_of(DOM_EXCEPTION));
    }
}
