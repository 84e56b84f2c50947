//! Regular-expression pattern acceptance: UTF-8 text whose content
//! compiles as a pattern. Unlike the general string kinds, numbers,
//! booleans and null are not acceptable here.

use regex::Regex;

use crate::error::{expected, expected_note, CoercionError};
use crate::value::Value;

const LABEL: &str = "RegExp (a utf-8 string and valid regular expression pattern)";

pub(crate) fn to_regexp(value: &Value) -> Result<Value, CoercionError> {
    let invalid = || CoercionError::invalid_argument(expected(LABEL, &value.repr()), None);
    let pattern = match value {
        Value::Str(text) => text.clone(),
        Value::Bytes(bytes) => match std::str::from_utf8(bytes) {
            Ok(text) => text.to_owned(),
            Err(_) => return Err(invalid()),
        },
        Value::Object(object) => match &object.text {
            Some(text) => text.clone(),
            None => return Err(invalid()),
        },
        _ => return Err(invalid()),
    };
    match Regex::new(&pattern) {
        Ok(_) => Ok(Value::Str(pattern)),
        Err(error) => Err(CoercionError::domain(
            expected_note(LABEL, &compile_error_detail(&error)),
            None,
        )),
    }
}

/// The compiler's closing summary line, without its `error: ` prefix.
fn compile_error_detail(error: &regex::Error) -> String {
    let rendered = error.to_string();
    let last = rendered.lines().last().unwrap_or("invalid pattern");
    last.strip_prefix("error: ").unwrap_or(last).to_owned()
}
