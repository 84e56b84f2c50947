//! Object-family converters: opaque object wrapping, interface instance
//! checks, callback interfaces and callback functions.

use indexmap::IndexMap;

use crate::error::{expected, CoercionError};
use crate::exceptions;
use crate::value::{ArrayKey, HostObject, Value};

/// The host object cast, total over every kind. Object-like values pass
/// through; arrays become plain objects with their entries as fields;
/// anything else becomes a plain object holding the value in a `scalar`
/// field, except null, which becomes an empty plain object.
pub(crate) fn to_object(value: &Value) -> Value {
    match value {
        Value::Object(_) | Value::Callable(_) | Value::Iterator(_) | Value::Record(_) => {
            value.clone()
        }
        Value::Array(entries) => {
            let mut fields = IndexMap::new();
            for (key, field) in entries {
                let name = match key {
                    ArrayKey::Int(i) => i.to_string(),
                    ArrayKey::Str(s) => s.clone(),
                    ArrayKey::Bytes(bytes) => String::from_utf8_lossy(bytes).into_owned(),
                };
                fields.insert(name, field.clone());
            }
            let mut object = HostObject::new("stdClass");
            object.fields = fields;
            object.into_value()
        }
        Value::Null => HostObject::new("stdClass").into_value(),
        scalar => HostObject::new("stdClass").field("scalar", scalar.clone()).into_value(),
    }
}

pub(crate) fn to_interface(value: &Value, name: &str) -> Result<Value, CoercionError> {
    if value.instance_of(name) {
        Ok(value.clone())
    } else {
        let label = if exceptions::is_capability(name) {
            format!("an instance of a class implementing {name}")
        } else {
            format!("an instance of {name}")
        };
        Err(CoercionError::invalid_argument(expected(&label, &value.repr()), None))
    }
}

/// Callback interfaces accept any non-scalar, non-null, non-resource
/// value, boxed through the object cast. In single-operation mode a
/// callable passes through unwrapped instead.
pub(crate) fn to_callback_interface(
    value: &Value,
    single_operation: bool,
) -> Result<Value, CoercionError> {
    if single_operation && value.is_callable() {
        return Ok(value.clone());
    }
    if !value.is_scalar() && !value.is_null() && !matches!(value, Value::Resource(_)) {
        return Ok(to_object(value));
    }
    let label = if single_operation {
        "a single operation callback interface (a object, array or callable)"
    } else {
        "a callback interface (a object or array)"
    };
    Err(CoercionError::invalid_argument(expected(label, &value.repr()), None))
}

pub(crate) fn to_callback_function(value: &Value) -> Result<Value, CoercionError> {
    if value.is_callable() {
        Ok(value.clone())
    } else {
        Err(CoercionError::invalid_argument(
            expected("a callback function (a callable)", &value.repr()),
            None,
        ))
    }
}
