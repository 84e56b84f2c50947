//! Boolean coercion: the host truth cast, total over every value kind.

use crate::value::Value;

pub(crate) fn to_boolean(value: &Value) -> Value {
    Value::Bool(value.truthy())
}
