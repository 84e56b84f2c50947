//! Type descriptors: the parsed form of strings like `"unsigned long"`,
//! `"sequence<DOMString>"` or `"(Node or DOMString)?"`.
//!
//! Descriptors parse with a small recursive-descent parser rather than
//! pattern-matching on the raw string, so nesting (`sequence<sequence<long>>`,
//! unions inside unions) resolves unambiguously. Parsing is total: text that
//! is not structural syntax and not a keyword becomes an [`Ty::Identifier`],
//! whose meaning (interface, callback, enum, dictionary) is decided later
//! against the registry. `Display` prints the canonical descriptor back, so
//! `parse` and `to_string` round-trip.

use std::fmt;

// ————————————————————————————————————————————————————————————————————————————
// SCALAR KINDS
// ————————————————————————————————————————————————————————————————————————————

/// The eight integer kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IntKind {
    Byte,
    Octet,
    Short,
    UnsignedShort,
    Long,
    UnsignedLong,
    LongLong,
    UnsignedLongLong,
}

impl IntKind {
    pub fn keyword(self) -> &'static str {
        match self {
            IntKind::Byte => "byte",
            IntKind::Octet => "octet",
            IntKind::Short => "short",
            IntKind::UnsignedShort => "unsigned short",
            IntKind::Long => "long",
            IntKind::UnsignedLong => "unsigned long",
            IntKind::LongLong => "long long",
            IntKind::UnsignedLongLong => "unsigned long long",
        }
    }

    pub fn bits(self) -> u32 {
        match self {
            IntKind::Byte | IntKind::Octet => 8,
            IntKind::Short | IntKind::UnsignedShort => 16,
            IntKind::Long | IntKind::UnsignedLong => 32,
            IntKind::LongLong | IntKind::UnsignedLongLong => 64,
        }
    }

    pub fn is_signed(self) -> bool {
        matches!(
            self,
            IntKind::Byte | IntKind::Short | IntKind::Long | IntKind::LongLong
        )
    }

    /// Inclusive range. `i128` holds both ends of every kind, the full
    /// `unsigned long long` span included.
    pub fn range(self) -> (i128, i128) {
        if self.is_signed() {
            let max = (1i128 << (self.bits() - 1)) - 1;
            (-max - 1, max)
        } else {
            (0, (1i128 << self.bits()) - 1)
        }
    }
}

/// How out-of-range numbers are treated: wrapped modulo 2^bits (the
/// default), rejected, or clamped to the nearest bound.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum IntPolicy {
    #[default]
    Wrap,
    EnforceRange,
    Clamp,
}

/// `float` and `double` share one representation here; the kind is kept
/// for printing the descriptor back.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FloatKind {
    Float,
    Double,
}

impl FloatKind {
    pub fn keyword(self) -> &'static str {
        match self {
            FloatKind::Float => "float",
            FloatKind::Double => "double",
        }
    }
}

/// The three string kinds. `ByteString` passes raw bytes through;
/// `DOMString` and `USVString` demand UTF-8 text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StringKind {
    ByteString,
    DomString,
    UsvString,
}

impl StringKind {
    pub fn keyword(self) -> &'static str {
        match self {
            StringKind::ByteString => "ByteString",
            StringKind::DomString => "DOMString",
            StringKind::UsvString => "USVString",
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// DESCRIPTOR
// ————————————————————————————————————————————————————————————————————————————

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Ty {
    /// Accepts every value unchanged.
    Any,
    Boolean,
    Integer(IntKind, IntPolicy),
    Float { kind: FloatKind, restricted: bool },
    String(StringKind),
    Object,
    RegExp,
    /// The `Error` capability type. Converts as the union of the host
    /// error capability and `DOMException`.
    PlatformError,
    Nullable(Box<Ty>),
    Sequence(Box<Ty>),
    FrozenArray(Box<Ty>),
    Record(StringKind, Box<Ty>),
    Union(Vec<Ty>),
    /// A name resolved against the registry at conversion time.
    Identifier(String),
}

impl Ty {
    pub fn parse(descriptor: &str) -> Ty {
        parse_type(descriptor.trim())
    }

    pub fn nullable(inner: Ty) -> Ty {
        Ty::Nullable(Box::new(inner))
    }

    pub fn sequence(element: Ty) -> Ty {
        Ty::Sequence(Box::new(element))
    }

    pub fn frozen_array(element: Ty) -> Ty {
        Ty::FrozenArray(Box::new(element))
    }

    pub fn record(key: StringKind, value: Ty) -> Ty {
        Ty::Record(key, Box::new(value))
    }

    pub fn identifier(name: impl Into<String>) -> Ty {
        Ty::Identifier(name.into())
    }
}

fn parse_type(text: &str) -> Ty {
    if let Some(stripped) = text.strip_suffix('?') {
        let inner = stripped.trim_end();
        if !inner.is_empty() {
            return Ty::nullable(parse_type(inner));
        }
    }
    if let Some(members) = parse_union(text) {
        return Ty::Union(members);
    }
    if let Some(inner) = unwrap_generic(text, "sequence<") {
        return Ty::sequence(parse_type(inner));
    }
    if let Some(inner) = unwrap_generic(text, "FrozenArray<") {
        return Ty::frozen_array(parse_type(inner));
    }
    if let Some(body) = unwrap_generic(text, "record<") {
        if let Some(record) = parse_record(body) {
            return record;
        }
    }
    keyword_type(text).unwrap_or_else(|| Ty::Identifier(text.to_owned()))
}

/// `(A or B or ...)` where the outer parentheses enclose the whole text.
/// Members split on ` or ` at nesting depth zero.
fn parse_union(text: &str) -> Option<Vec<Ty>> {
    let body = text.strip_prefix('(')?.strip_suffix(')')?;
    let mut members = Vec::new();
    let mut parens = 0i32;
    let mut angles = 0i32;
    let mut start = 0usize;
    let bytes = body.as_bytes();
    let mut index = 0usize;
    while index < bytes.len() {
        match bytes[index] {
            b'(' => parens += 1,
            b')' => {
                parens -= 1;
                // a close beyond depth zero belongs to the outer text,
                // so these are not enclosing parentheses
                if parens < 0 {
                    return None;
                }
            }
            b'<' => angles += 1,
            b'>' => angles -= 1,
            b' ' if parens == 0 && angles == 0 && bytes[index..].starts_with(b" or ") => {
                members.push(parse_type(body[start..index].trim()));
                index += 4;
                start = index;
                continue;
            }
            _ => {}
        }
        index += 1;
    }
    if parens != 0 {
        return None;
    }
    members.push(parse_type(body[start..].trim()));
    Some(members)
}

/// Strips `prefix` and the final `>`, verifying the remainder never closes
/// the opening bracket early.
fn unwrap_generic<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let inner = text.strip_prefix(prefix)?.strip_suffix('>')?;
    let mut depth = 0i32;
    for byte in inner.bytes() {
        match byte {
            b'<' => depth += 1,
            b'>' => {
                depth -= 1;
                if depth < 0 {
                    return None;
                }
            }
            _ => {}
        }
    }
    if depth != 0 {
        return None;
    }
    Some(inner.trim())
}

/// Record bodies are `K, V` with `K` one of the string kinds.
fn parse_record(body: &str) -> Option<Ty> {
    let mut parens = 0i32;
    let mut angles = 0i32;
    for (index, byte) in body.bytes().enumerate() {
        match byte {
            b'(' => parens += 1,
            b')' => parens -= 1,
            b'<' => angles += 1,
            b'>' => angles -= 1,
            b',' if parens == 0 && angles == 0 => {
                let key = match parse_type(body[..index].trim()) {
                    Ty::String(kind) => kind,
                    _ => return None,
                };
                return Some(Ty::record(key, parse_type(body[index + 1..].trim())));
            }
            _ => {}
        }
    }
    None
}

fn keyword_type(text: &str) -> Option<Ty> {
    if let Some(rest) = text.strip_prefix("[EnforceRange] ") {
        return int_kind(rest).map(|kind| Ty::Integer(kind, IntPolicy::EnforceRange));
    }
    if let Some(rest) = text.strip_prefix("[Clamp] ") {
        return int_kind(rest).map(|kind| Ty::Integer(kind, IntPolicy::Clamp));
    }
    if let Some(kind) = int_kind(text) {
        return Some(Ty::Integer(kind, IntPolicy::Wrap));
    }
    match text {
        "any" => Some(Ty::Any),
        "boolean" => Some(Ty::Boolean),
        "float" => Some(Ty::Float { kind: FloatKind::Float, restricted: true }),
        "unrestricted float" => Some(Ty::Float { kind: FloatKind::Float, restricted: false }),
        "double" => Some(Ty::Float { kind: FloatKind::Double, restricted: true }),
        "unrestricted double" => Some(Ty::Float { kind: FloatKind::Double, restricted: false }),
        "ByteString" => Some(Ty::String(StringKind::ByteString)),
        "DOMString" => Some(Ty::String(StringKind::DomString)),
        "USVString" => Some(Ty::String(StringKind::UsvString)),
        "object" => Some(Ty::Object),
        "RegExp" => Some(Ty::RegExp),
        "Error" => Some(Ty::PlatformError),
        _ => None,
    }
}

fn int_kind(text: &str) -> Option<IntKind> {
    match text {
        "byte" => Some(IntKind::Byte),
        "octet" => Some(IntKind::Octet),
        "short" => Some(IntKind::Short),
        "unsigned short" => Some(IntKind::UnsignedShort),
        "long" => Some(IntKind::Long),
        "unsigned long" => Some(IntKind::UnsignedLong),
        "long long" => Some(IntKind::LongLong),
        "unsigned long long" => Some(IntKind::UnsignedLongLong),
        _ => None,
    }
}

impl serde::Serialize for Ty {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for Ty {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let descriptor = <String as serde::Deserialize>::deserialize(deserializer)?;
        Ok(Ty::parse(&descriptor))
    }
}

impl fmt::Display for Ty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ty::Any => f.write_str("any"),
            Ty::Boolean => f.write_str("boolean"),
            Ty::Integer(kind, policy) => match policy {
                IntPolicy::Wrap => f.write_str(kind.keyword()),
                IntPolicy::EnforceRange => write!(f, "[EnforceRange] {}", kind.keyword()),
                IntPolicy::Clamp => write!(f, "[Clamp] {}", kind.keyword()),
            },
            Ty::Float { kind, restricted } => {
                if !restricted {
                    f.write_str("unrestricted ")?;
                }
                f.write_str(kind.keyword())
            }
            Ty::String(kind) => f.write_str(kind.keyword()),
            Ty::Object => f.write_str("object"),
            Ty::RegExp => f.write_str("RegExp"),
            Ty::PlatformError => f.write_str("Error"),
            Ty::Nullable(inner) => write!(f, "{inner}?"),
            Ty::Sequence(element) => write!(f, "sequence<{element}>"),
            Ty::FrozenArray(element) => write!(f, "FrozenArray<{element}>"),
            Ty::Record(key, value) => write!(f, "record<{}, {}>", key.keyword(), value),
            Ty::Union(members) => {
                f.write_str("(")?;
                for (index, member) in members.iter().enumerate() {
                    if index > 0 {
                        f.write_str(" or ")?;
                    }
                    write!(f, "{member}")?;
                }
                f.write_str(")")
            }
            Ty::Identifier(name) => f.write_str(name),
        }
    }
}
