//! The conversion entry points. A descriptor parses into a [`Ty`] and
//! dispatches to the converter for its shape; identifiers consult the
//! registry and fall back to an interface instance check when nothing is
//! registered under the name.

pub(crate) mod boolean;
pub(crate) mod dictionary;
pub(crate) mod float;
pub(crate) mod int;
pub(crate) mod num;
pub(crate) mod object;
pub(crate) mod record;
pub(crate) mod regexp;
pub(crate) mod sequence;
pub(crate) mod string;
pub(crate) mod union;

use crate::error::{expected_bare, CoercionError};
use crate::exceptions;
use crate::registry::{PseudoType, Registry};
use crate::ty::Ty;
use crate::value::Value;

/// Convert `value` to the type named by `descriptor`.
///
/// The descriptor accepts the full grammar: scalar keywords with their
/// `[EnforceRange]` and `[Clamp]` prefixes, `?` for nullable, `sequence<>`,
/// `FrozenArray<>`, `record<>`, parenthesized unions, and identifiers
/// resolved against `registry`.
pub fn convert(
    descriptor: &str,
    value: &Value,
    registry: &Registry,
) -> Result<Value, CoercionError> {
    let ty = Ty::parse(descriptor);
    log::trace!("coercing {} to {ty}", value.repr());
    convert_ty(&ty, value, registry)
}

pub(crate) fn convert_ty(
    ty: &Ty,
    value: &Value,
    registry: &Registry,
) -> Result<Value, CoercionError> {
    match ty {
        Ty::Any => Ok(value.clone()),
        Ty::Boolean => Ok(boolean::to_boolean(value)),
        Ty::Integer(kind, policy) => int::to_integer(value, *kind, *policy),
        Ty::Float { kind: _, restricted } => float::to_float(value, *restricted),
        Ty::String(kind) => string::to_string(value, *kind),
        Ty::Object => Ok(object::to_object(value)),
        Ty::RegExp => regexp::to_regexp(value),
        Ty::PlatformError => convert_ty(&exceptions::error_union(), value, registry),
        Ty::Nullable(inner) => to_nullable(value, inner, registry),
        Ty::Sequence(element) => sequence::to_sequence(value, element, registry, false),
        Ty::FrozenArray(element) => sequence::to_sequence(value, element, registry, true),
        Ty::Record(key_kind, value_ty) => record::to_record(value, *key_kind, value_ty, registry),
        Ty::Union(members) => union::to_union(value, members, &ty.to_string(), registry),
        Ty::Identifier(name) => match registry.get(name) {
            None => object::to_interface(value, name),
            Some(PseudoType::Dictionary { members }) => {
                dictionary::to_dictionary(value, name, members, registry)
            }
            Some(PseudoType::Enum { values }) => string::to_enumeration(value, name, values),
            Some(PseudoType::CallbackInterface) => object::to_callback_interface(value, false),
            Some(PseudoType::SingleOperationCallbackInterface) => {
                object::to_callback_interface(value, true)
            }
            Some(PseudoType::CallbackFunction) => object::to_callback_function(value),
        },
    }
}

/// Null passes through; any inner failure re-reports under the nullable's
/// own label, in the failure's category, with the failure as cause.
fn to_nullable(value: &Value, inner: &Ty, registry: &Registry) -> Result<Value, CoercionError> {
    if value.is_null() {
        return Ok(Value::Null);
    }
    convert_ty(inner, value, registry).map_err(|cause| {
        CoercionError::same_category(expected_bare(&format!("{inner}? ({inner} or null)")), cause)
    })
}
