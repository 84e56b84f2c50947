//! The untyped host value model the converters operate on.
//!
//! Conversions take and produce `Value`s: the enum covers the dynamic kinds
//! of the host environment this engine emulates, including its ordered
//! int-or-string-keyed arrays, opaque objects with an optional render-as-text
//! capability, stateful external iterators, and arbitrary-precision integers.
//! Casting behavior (truthiness, text rendering, message representation)
//! follows that host's rules, so the same input value always coerces the
//! same way regardless of where it came from.

use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::bigint::BigInt;

// ————————————————————————————————————————————————————————————————————————————
// KEYS
// ————————————————————————————————————————————————————————————————————————————

/// Array offsets: integers, UTF-8 strings, or raw byte strings.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ArrayKey {
    Int(i64),
    Str(String),
    Bytes(Vec<u8>),
}

impl ArrayKey {
    /// Canonical key for string input: a canonical decimal integer string
    /// (`"0"`, `"-7"`, no leading zeros, in i64 range) folds to an integer
    /// key; anything else stays a string key.
    pub fn canonical(text: &str) -> ArrayKey {
        if Self::is_canonical_int(text) {
            if let Ok(int) = text.parse::<i64>() {
                return ArrayKey::Int(int);
            }
        }
        ArrayKey::Str(text.to_owned())
    }

    fn is_canonical_int(text: &str) -> bool {
        let body = text.strip_prefix('-').unwrap_or(text);
        match body.as_bytes() {
            [] => false,
            [b'0'] => text.as_bytes() != b"-0",
            [first, ..] => *first != b'0' && body.bytes().all(|b| b.is_ascii_digit()),
        }
    }

    /// Offset coercion used when materializing iterators into a keyed map.
    /// Mirrors host array-offset rules: null becomes the empty string key,
    /// booleans and floats become integers, resources their id; arrays,
    /// objects and the like are not usable as offsets.
    pub(crate) fn from_value(value: &Value) -> Option<ArrayKey> {
        match value {
            Value::Null => Some(ArrayKey::Str(String::new())),
            Value::Bool(b) => Some(ArrayKey::Int(i64::from(*b))),
            Value::Int(i) => Some(ArrayKey::Int(*i)),
            Value::BigInt(big) => big.to_i128().and_then(|i| i64::try_from(i).ok()).map(ArrayKey::Int),
            Value::Double(f) if f.is_finite() => Some(ArrayKey::Int(f.trunc() as i64)),
            Value::Double(_) => Some(ArrayKey::Int(0)),
            Value::Str(s) => Some(ArrayKey::canonical(s)),
            Value::Bytes(bytes) => match std::str::from_utf8(bytes) {
                Ok(text) => Some(ArrayKey::canonical(text)),
                Err(_) => Some(ArrayKey::Bytes(bytes.clone())),
            },
            Value::Resource(resource) => Some(ArrayKey::Int(resource.id)),
            _ => None,
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            ArrayKey::Int(i) => Value::Int(*i),
            ArrayKey::Str(s) => Value::Str(s.clone()),
            ArrayKey::Bytes(b) => Value::Bytes(b.clone()),
        }
    }
}

impl From<i64> for ArrayKey {
    fn from(key: i64) -> Self {
        ArrayKey::Int(key)
    }
}

impl From<&str> for ArrayKey {
    fn from(key: &str) -> Self {
        ArrayKey::Str(key.to_owned())
    }
}

// ————————————————————————————————————————————————————————————————————————————
// COMPOSITE HOST KINDS
// ————————————————————————————————————————————————————————————————————————————

/// Opaque host object: class name, implemented capability names, named
/// fields, and an optional render-as-text capability.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct HostObject {
    pub class: String,
    pub implements: Vec<String>,
    pub fields: IndexMap<String, Value>,
    pub text: Option<String>,
}

impl HostObject {
    pub fn new(class: impl Into<String>) -> Self {
        HostObject { class: class.into(), ..Default::default() }
    }

    pub fn implementing(mut self, capability: impl Into<String>) -> Self {
        self.implements.push(capability.into());
        self
    }

    pub fn field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Grants the render-as-text capability.
    pub fn renders_as(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn into_value(self) -> Value {
        Value::Object(Rc::new(self))
    }
}

/// Opaque callable handle. Callables are objects of class `Closure` for
/// instance-of purposes and carry no render-as-text capability.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Callable {
    pub name: String,
}

impl Callable {
    pub fn new(name: impl Into<String>) -> Self {
        Callable { name: name.into() }
    }
}

/// Stream-like resource with a numeric id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Resource {
    pub id: i64,
    pub kind: String,
}

impl Resource {
    pub fn new(id: i64, kind: impl Into<String>) -> Self {
        Resource { id, kind: kind.into() }
    }
}

#[derive(Debug, PartialEq)]
struct IteratorState {
    items: Vec<(Value, Value)>,
    position: usize,
}

/// External iterator yielding key/value pairs. Cloning shares state, like a
/// host-language iterator handle. Rewindable iterators restart on each
/// pass; one-shot iterators (generators) error on rewind and therefore
/// continue from wherever they stopped, or yield nothing once exhausted.
#[derive(Clone, Debug)]
pub struct HostIterator {
    pub class: String,
    rewindable: bool,
    state: Rc<RefCell<IteratorState>>,
}

impl HostIterator {
    pub fn rewindable(pairs: impl IntoIterator<Item = (Value, Value)>) -> Self {
        Self::build("Iterator", true, pairs)
    }

    pub fn one_shot(pairs: impl IntoIterator<Item = (Value, Value)>) -> Self {
        Self::build("Generator", false, pairs)
    }

    fn build(class: &str, rewindable: bool, pairs: impl IntoIterator<Item = (Value, Value)>) -> Self {
        HostIterator {
            class: class.to_owned(),
            rewindable,
            state: Rc::new(RefCell::new(IteratorState {
                items: pairs.into_iter().collect(),
                position: 0,
            })),
        }
    }

    /// Consumes `count` pairs, as if the caller had already iterated them.
    pub fn advanced_by(self, count: usize) -> Self {
        {
            let mut state = self.state.borrow_mut();
            state.position = (state.position + count).min(state.items.len());
        }
        self
    }

    /// One full iteration pass under the rewind contract: rewindable
    /// iterators restart from the beginning; one-shot iterators continue
    /// from their current position (empty once exhausted). The pass leaves
    /// the iterator exhausted.
    pub(crate) fn take_pass(&self) -> Vec<(Value, Value)> {
        let mut state = self.state.borrow_mut();
        if self.rewindable {
            state.position = 0;
        }
        if state.position >= state.items.len() {
            return Vec::new();
        }
        let pass = state.items[state.position..].to_vec();
        state.position = state.items.len();
        pass
    }

    pub fn into_value(self) -> Value {
        Value::Iterator(self)
    }
}

impl PartialEq for HostIterator {
    fn eq(&self, other: &Self) -> bool {
        self.class == other.class
            && self.rewindable == other.rewindable
            && *self.state.borrow() == *other.state.borrow()
    }
}

// ————————————————————————————————————————————————————————————————————————————
// RECORD
// ————————————————————————————————————————————————————————————————————————————

/// Key of a converted record entry: records are keyed by one of the string
/// kinds, so a key is UTF-8 text or raw bytes.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum RecordKey {
    Text(String),
    Bytes(Vec<u8>),
}

impl RecordKey {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            RecordKey::Text(text) => Some(text),
            RecordKey::Bytes(bytes) => std::str::from_utf8(bytes).ok(),
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            RecordKey::Text(text) => Value::Str(text.clone()),
            RecordKey::Bytes(bytes) => Value::Bytes(bytes.clone()),
        }
    }
}

impl From<&str> for RecordKey {
    fn from(key: &str) -> Self {
        RecordKey::Text(key.to_owned())
    }
}

/// Ordered, immutable key/value container produced by record conversion.
/// Duplicate keys keep the first occurrence; later ones are dropped, not
/// overwritten. There is no mutation API after construction.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Record {
    entries: IndexMap<RecordKey, Value>,
}

impl Record {
    pub fn from_entries(pairs: impl IntoIterator<Item = (RecordKey, Value)>) -> Self {
        let mut entries = IndexMap::new();
        for (key, value) in pairs {
            entries.entry(key).or_insert(value);
        }
        Record { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &RecordKey) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&RecordKey, &Value)> {
        self.entries.iter()
    }

    pub fn into_value(self) -> Value {
        Value::Record(self)
    }
}

// ————————————————————————————————————————————————————————————————————————————
// VALUE
// ————————————————————————————————————————————————————————————————————————————

#[derive(Clone, Debug, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    /// Arbitrary-precision integer (the big-number-extension analog).
    BigInt(BigInt),
    Double(f64),
    /// UTF-8 text.
    Str(String),
    /// Raw byte string, not necessarily UTF-8.
    Bytes(Vec<u8>),
    /// Ordered int-or-string-keyed map (the host's one array kind).
    Array(IndexMap<ArrayKey, Value>),
    Object(Rc<HostObject>),
    Callable(Callable),
    Iterator(HostIterator),
    Resource(Resource),
    Record(Record),
}

impl Value {
    /// Array with integer keys `0..n`.
    pub fn list(values: impl IntoIterator<Item = Value>) -> Value {
        Value::Array(
            values
                .into_iter()
                .enumerate()
                .map(|(index, value)| (ArrayKey::Int(index as i64), value))
                .collect(),
        )
    }

    /// Array from explicit key/value pairs.
    pub fn array(pairs: impl IntoIterator<Item = (ArrayKey, Value)>) -> Value {
        Value::Array(pairs.into_iter().collect())
    }

    pub fn bigint(text: &str) -> Option<Value> {
        BigInt::parse(text).map(Value::BigInt)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Scalar kinds: booleans, numbers and strings.
    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            Value::Bool(_)
                | Value::Int(_)
                | Value::BigInt(_)
                | Value::Double(_)
                | Value::Str(_)
                | Value::Bytes(_)
        )
    }

    pub fn is_callable(&self) -> bool {
        matches!(self, Value::Callable(_))
    }

    /// Object kinds: plain objects, callables, iterators and records are
    /// all objects to the host.
    pub(crate) fn is_object_like(&self) -> bool {
        matches!(
            self,
            Value::Object(_) | Value::Callable(_) | Value::Iterator(_) | Value::Record(_)
        )
    }

    /// Instance-of over class and capability names.
    pub(crate) fn instance_of(&self, name: &str) -> bool {
        match self {
            Value::Object(object) => {
                object.class == name || object.implements.iter().any(|i| i == name)
            }
            Value::Callable(_) => name == "Closure",
            Value::Iterator(iterator) => iterator.class == name || name == "Iterator",
            Value::Record(_) => name == "Record",
            _ => false,
        }
    }

    /// Host truthiness: `false`, `0`, `0.0`, `""`, `"0"`, the empty array
    /// and null are falsy; everything else, NaN included, is truthy.
    pub fn truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::BigInt(big) => !big.is_zero(),
            Value::Double(f) => *f != 0.0,
            Value::Str(s) => !(s.is_empty() || s == "0"),
            Value::Bytes(bytes) => !(bytes.is_empty() || bytes == b"0"),
            Value::Array(entries) => !entries.is_empty(),
            Value::Object(_)
            | Value::Callable(_)
            | Value::Iterator(_)
            | Value::Resource(_)
            | Value::Record(_) => true,
        }
    }

    /// Render-as-text cast. Null renders empty; `None` for kinds without
    /// the capability (arrays, resources, callables, objects without it).
    pub fn render_text(&self) -> Option<Vec<u8>> {
        match self {
            Value::Null => Some(Vec::new()),
            Value::Bool(true) => Some(b"1".to_vec()),
            Value::Bool(false) => Some(Vec::new()),
            Value::Int(i) => Some(i.to_string().into_bytes()),
            Value::BigInt(big) => Some(big.to_string().into_bytes()),
            Value::Double(f) => Some(double_text(*f).into_bytes()),
            Value::Str(s) => Some(s.clone().into_bytes()),
            Value::Bytes(bytes) => Some(bytes.clone()),
            Value::Object(object) => object.text.as_ref().map(|t| t.clone().into_bytes()),
            _ => None,
        }
    }

    /// Representation used inside error messages.
    pub fn repr(&self) -> String {
        match self {
            Value::Null => "NULL".to_owned(),
            Value::Bool(true) => "true".to_owned(),
            Value::Bool(false) => "false".to_owned(),
            Value::Int(i) => i.to_string(),
            Value::BigInt(big) => big.to_string(),
            Value::Double(f) => double_repr(*f),
            Value::Str(s) => quoted(s),
            Value::Bytes(bytes) => match std::str::from_utf8(bytes) {
                Ok(text) => quoted(text),
                Err(_) => "non utf-8 string".to_owned(),
            },
            Value::Array(_) => "array".to_owned(),
            Value::Object(object) => format!("instance of {}", object.class),
            Value::Callable(_) => "instance of Closure".to_owned(),
            Value::Iterator(iterator) => format!("instance of {}", iterator.class),
            Value::Resource(resource) => format!("resource of type ({})", resource.kind),
            Value::Record(_) => "instance of Record".to_owned(),
        }
    }

    // ---- JSON interop ---- //

    /// Untyped JSON into a host value. Integer-valued numbers stay exact
    /// (u64 beyond i64 becomes a big integer); object keys fold to integer
    /// keys when they are canonical decimal integers, matching how the
    /// host decodes JSON maps into its arrays.
    pub fn from_json(json: &serde_json::Value) -> Value {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(number) => {
                if let Some(int) = number.as_i64() {
                    Value::Int(int)
                } else if let Some(unsigned) = number.as_u64() {
                    Value::BigInt(BigInt::from(unsigned))
                } else {
                    Value::Double(number.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_json::Value::String(s) => Value::Str(s.clone()),
            serde_json::Value::Array(items) => Value::list(items.iter().map(Value::from_json)),
            serde_json::Value::Object(fields) => Value::Array(
                fields
                    .iter()
                    .map(|(key, value)| (ArrayKey::canonical(key), Value::from_json(value)))
                    .collect(),
            ),
        }
    }

    /// Host value back to JSON for display. Non-JSON kinds come out as
    /// tagged objects; byte strings degrade lossily to text.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::{json, Map, Value as Json};
        match self {
            Value::Null => Json::Null,
            Value::Bool(b) => Json::Bool(*b),
            Value::Int(i) => json!(i),
            Value::BigInt(big) => match big.to_i128() {
                Some(i) if i >= 0 && i <= u64::MAX as i128 => json!(i as u64),
                Some(i) if i64::try_from(i).is_ok() => json!(i as i64),
                _ => Json::String(big.to_string()),
            },
            Value::Double(f) => json!(f),
            Value::Str(s) => Json::String(s.clone()),
            Value::Bytes(bytes) => Json::String(String::from_utf8_lossy(bytes).into_owned()),
            Value::Array(entries) => {
                if is_zero_based(entries) {
                    Json::Array(entries.values().map(Value::to_json).collect())
                } else {
                    let mut map = Map::new();
                    for (key, value) in entries {
                        let key = match key {
                            ArrayKey::Int(i) => i.to_string(),
                            ArrayKey::Str(s) => s.clone(),
                            ArrayKey::Bytes(b) => String::from_utf8_lossy(b).into_owned(),
                        };
                        map.insert(key, value.to_json());
                    }
                    Json::Object(map)
                }
            }
            Value::Object(object) => {
                let mut map = Map::new();
                map.insert("$class".to_owned(), Json::String(object.class.clone()));
                for (name, value) in &object.fields {
                    map.insert(name.clone(), value.to_json());
                }
                Json::Object(map)
            }
            Value::Callable(callable) => json!({ "$callable": callable.name }),
            Value::Iterator(iterator) => json!({ "$iterator": iterator.class }),
            Value::Resource(resource) => json!({ "$resource": resource.id, "kind": resource.kind }),
            Value::Record(record) => {
                let mut map = Map::new();
                for (key, value) in record.iter() {
                    let key = match key {
                        RecordKey::Text(text) => text.clone(),
                        RecordKey::Bytes(bytes) => String::from_utf8_lossy(bytes).into_owned(),
                    };
                    map.insert(key, value.to_json());
                }
                Json::Object(map)
            }
        }
    }
}

/// Contiguous integer keys `0..n`?
pub(crate) fn is_zero_based(entries: &IndexMap<ArrayKey, Value>) -> bool {
    entries
        .keys()
        .enumerate()
        .all(|(index, key)| *key == ArrayKey::Int(index as i64))
}

fn quoted(text: &str) -> String {
    format!("'{}'", text.replace('\\', "\\\\").replace('\'', "\\'"))
}

/// Text cast of a double: integral values print whole (`4.0` renders as
/// `"4"`, negative zero as `"-0"`), non-finite as NAN/INF tokens.
fn double_text(value: f64) -> String {
    if value.is_nan() {
        return "NAN".to_owned();
    }
    if value.is_infinite() {
        return if value > 0.0 { "INF".to_owned() } else { "-INF".to_owned() };
    }
    if value == 0.0 {
        return if value.is_sign_negative() { "-0".to_owned() } else { "0".to_owned() };
    }
    if value.fract() == 0.0 {
        return format!("{value:.0}");
    }
    format!("{value}")
}

/// Message representation of a double keeps a trailing `.0` on integral
/// values, the way the host's export form does.
fn double_repr(value: f64) -> String {
    if value.is_nan() {
        return "NAN".to_owned();
    }
    if value.is_infinite() {
        return if value > 0.0 { "INF".to_owned() } else { "-INF".to_owned() };
    }
    if value.fract() == 0.0 {
        return format!("{value:.1}");
    }
    format!("{value}")
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Double(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl From<BigInt> for Value {
    fn from(value: BigInt) -> Self {
        Value::BigInt(value)
    }
}

impl From<Record> for Value {
    fn from(value: Record) -> Self {
        Value::Record(value)
    }
}
