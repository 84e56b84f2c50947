//! Double coercion. `float` and `unrestricted float` convert identically
//! to their double counterparts; the restricted forms refuse non-finite
//! results. Stream resources are double-castable (their id), unlike in
//! the integer conversions.

use crate::convert::num;
use crate::error::{expected, CoercionError};
use crate::value::Value;

const RESTRICTED: &str = "double (a float not NAN or INF)";
const UNRESTRICTED: &str = "double (a float)";

pub(crate) fn to_float(value: &Value, restricted: bool) -> Result<Value, CoercionError> {
    if let Value::Resource(resource) = value {
        return Ok(Value::Double(resource.id as f64));
    }
    let label = if restricted { RESTRICTED } else { UNRESTRICTED };
    let Some(number) = num::interpret(value) else {
        return Err(CoercionError::invalid_argument(expected(label, &value.repr()), None));
    };
    let double = number.to_f64();
    if restricted && !double.is_finite() {
        return Err(CoercionError::domain(expected(RESTRICTED, &value.repr()), None));
    }
    Ok(Value::Double(double))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bigint::BigInt;

    #[test]
    fn doubles_from_scalars() {
        assert_eq!(to_float(&Value::Bool(true), true).unwrap(), Value::Double(1.0));
        assert_eq!(to_float(&Value::Int(-3), true).unwrap(), Value::Double(-3.0));
        assert_eq!(to_float(&Value::from("  16.5text"), true).unwrap(), Value::Double(16.5));
        assert_eq!(to_float(&Value::from("0x10"), true).unwrap(), Value::Double(0.0));
        assert_eq!(
            to_float(&Value::BigInt(BigInt::from(u64::MAX)), false).unwrap(),
            Value::Double(1.8446744073709552e19)
        );
    }

    #[test]
    fn restricted_refuses_non_finite() {
        let error = to_float(&Value::Double(f64::INFINITY), true).unwrap_err();
        assert!(error.is_domain());
        assert_eq!(error.message(), "Expected double (a float not NAN or INF), got INF");
        assert!(to_float(&Value::Double(f64::NAN), true).unwrap_err().is_domain());
    }

    #[test]
    fn unrestricted_passes_non_finite_through() {
        let Value::Double(nan) = to_float(&Value::Double(f64::NAN), false).unwrap() else {
            panic!("expected double");
        };
        assert!(nan.is_nan());
        assert_eq!(
            to_float(&Value::from("-0.0"), false).unwrap(),
            Value::Double(-0.0)
        );
    }

    #[test]
    fn resources_cast_to_their_id() {
        let stream = Value::Resource(crate::value::Resource::new(3, "stream"));
        assert_eq!(to_float(&stream, true).unwrap(), Value::Double(3.0));
    }

    #[test]
    fn never_numeric_shapes_are_invalid_arguments() {
        let error = to_float(&Value::Null, true).unwrap_err();
        assert!(error.is_invalid_argument());
        assert_eq!(error.message(), "Expected double (a float not NAN or INF), got NULL");
        let error = to_float(&Value::list([]), false).unwrap_err();
        assert_eq!(error.message(), "Expected double (a float), got array");
    }
}
