//! Union resolution: pick the one member a value converts through.
//!
//! Members flatten first: nested unions inline, and each member's own
//! trailing `?` counts toward a nullable total instead of staying on the
//! member. The flattened members then classify into coarse buckets, and
//! resolution walks the value's kind: objects try interface members in
//! order, structural values choose between a sequence-like and a
//! dictionary-like member by inspecting their keys, scalars prefer a
//! string member over a numeric one, and a boolean member is the
//! fallback that never fails. Once a member is chosen its failure is
//! final: the union reports its own `Expected` message with the best
//! recorded attempt as cause, preferring a domain cause over an
//! invalid-argument one.

use crate::convert::{self, boolean, sequence};
use crate::error::{expected, CoercionError};
use crate::registry::{IdentifierKind, Registry};
use crate::ty::Ty;
use crate::value::Value;

/// Inline nested unions and count members that carried a trailing `?`.
/// Only the member's own marker counts; a nullable inside `sequence<>`
/// or `record<>` stays where it is.
pub(crate) fn flatten(members: &[Ty]) -> (Vec<Ty>, usize) {
    let mut flattened = Vec::new();
    let mut nullable = 0usize;
    for member in members {
        let mut member = member;
        if let Ty::Nullable(inner) = member {
            nullable += 1;
            member = inner;
        }
        if let Ty::Union(inner) = member {
            let (more, more_nullable) = flatten(inner);
            flattened.extend(more);
            nullable += more_nullable;
        } else {
            flattened.push(member.clone());
        }
    }
    (flattened, nullable)
}

/// Coarse member classification driving selection. Registered names
/// resolve through the registry; unregistered names count as interfaces.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Bucket {
    Any,
    Boolean,
    Numeric,
    String,
    Object,
    Interface,
    Dictionary,
    CallbackInterface,
    CallbackFunction,
    Nullable,
    Sequence,
    FrozenArray,
    Record,
}

fn bucket(ty: &Ty, registry: &Registry) -> Bucket {
    match ty {
        Ty::Any => Bucket::Any,
        Ty::Boolean => Bucket::Boolean,
        Ty::Integer(..) | Ty::Float { .. } => Bucket::Numeric,
        // regular expressions convert from strings, so they compete in
        // the string slot
        Ty::String(_) | Ty::RegExp => Bucket::String,
        Ty::Object => Bucket::Object,
        Ty::PlatformError => Bucket::Interface,
        Ty::Nullable(_) => Bucket::Nullable,
        Ty::Sequence(_) => Bucket::Sequence,
        Ty::FrozenArray(_) => Bucket::FrozenArray,
        Ty::Record(..) => Bucket::Record,
        // flatten() inlined any union member already
        Ty::Union(_) => Bucket::Nullable,
        Ty::Identifier(name) => match registry.classify(name) {
            IdentifierKind::Interface => Bucket::Interface,
            IdentifierKind::Dictionary => Bucket::Dictionary,
            IdentifierKind::Enum => Bucket::String,
            IdentifierKind::CallbackInterface { .. } => Bucket::CallbackInterface,
            IdentifierKind::CallbackFunction => Bucket::CallbackFunction,
        },
    }
}

fn first_member<'a>(flattened: &'a [Ty], buckets: &[Bucket], wanted: Bucket) -> Option<&'a Ty> {
    buckets.iter().position(|b| *b == wanted).map(|index| &flattened[index])
}

/// What resolution decided for a value that got past the object and
/// callable shortcuts.
enum Selection<'a> {
    /// A member was chosen; its conversion decides the whole union.
    Convert(&'a Ty),
    /// The value already has the member's shape and passes unchanged.
    Keep,
    /// Boolean coercion, which never fails.
    Booleanize,
    NoMatch,
}

fn select<'a>(value: &Value, flattened: &'a [Ty], buckets: &[Bucket]) -> Selection<'a> {
    // arrays, objects and null can satisfy a structural member
    if matches!(value, Value::Array(_)) || value.is_object_like() || value.is_null() {
        let dictionary_like = first_member(flattened, buckets, Bucket::Record)
            .or_else(|| first_member(flattened, buckets, Bucket::Dictionary));
        let sequence_like = first_member(flattened, buckets, Bucket::Sequence)
            .or_else(|| first_member(flattened, buckets, Bucket::FrozenArray));
        match (sequence_like, dictionary_like) {
            (Some(sequence_like), Some(dictionary_like)) => {
                let member =
                    if zero_based_keys(value) { sequence_like } else { dictionary_like };
                return Selection::Convert(member);
            }
            (Some(member), None) | (None, Some(member)) => return Selection::Convert(member),
            (None, None) => {}
        }
        if let Some(member) = first_member(flattened, buckets, Bucket::CallbackInterface) {
            return Selection::Convert(member);
        }
    }
    if matches!(value, Value::Bool(_)) && buckets.contains(&Bucket::Boolean) {
        return Selection::Keep;
    }
    if matches!(value, Value::Int(_) | Value::BigInt(_) | Value::Double(_)) {
        if let Some(member) = first_member(flattened, buckets, Bucket::Numeric) {
            return Selection::Convert(member);
        }
    }
    if let Some(member) = first_member(flattened, buckets, Bucket::String)
        .or_else(|| first_member(flattened, buckets, Bucket::Numeric))
    {
        return Selection::Convert(member);
    }
    if buckets.contains(&Bucket::Boolean) {
        return Selection::Booleanize;
    }
    Selection::NoMatch
}

/// Keys decide between a sequence-like and a dictionary-like member: the
/// view must be keyed 0, 1, 2, ... without gaps. The inspection spends
/// one pass of a one-shot iterator.
fn zero_based_keys(value: &Value) -> bool {
    sequence::iterate(value)
        .into_iter()
        .enumerate()
        .all(|(index, (key, _))| matches!(key, Value::Int(offset) if offset == index as i64))
}

fn record_attempt(
    error: CoercionError,
    last_domain: &mut Option<CoercionError>,
    last_invalid: &mut Option<CoercionError>,
) {
    if error.is_domain() {
        *last_domain = Some(error);
    } else {
        *last_invalid = Some(error);
    }
}

pub(crate) fn to_union(
    value: &Value,
    members: &[Ty],
    descriptor: &str,
    registry: &Registry,
) -> Result<Value, CoercionError> {
    let (flattened, nullable) = flatten(members);
    if nullable == 1 && value.is_null() {
        return Ok(Value::Null);
    }
    let buckets: Vec<Bucket> = flattened.iter().map(|member| bucket(member, registry)).collect();

    let mut last_domain = None;
    let mut last_invalid = None;

    if value.is_object_like() {
        for (member, kind) in flattened.iter().zip(&buckets) {
            if *kind != Bucket::Interface {
                continue;
            }
            match convert::convert_ty(member, value, registry) {
                Ok(converted) => return Ok(converted),
                Err(error) => record_attempt(error, &mut last_domain, &mut last_invalid),
            }
        }
        if buckets.contains(&Bucket::Object) {
            return Ok(value.clone());
        }
    }

    if value.is_callable() && buckets.contains(&Bucket::CallbackFunction) {
        return Ok(value.clone());
    }

    match select(value, &flattened, &buckets) {
        Selection::Convert(member) => match convert::convert_ty(member, value, registry) {
            Ok(converted) => return Ok(converted),
            Err(error) => record_attempt(error, &mut last_domain, &mut last_invalid),
        },
        Selection::Keep => return Ok(value.clone()),
        Selection::Booleanize => return Ok(boolean::to_boolean(value)),
        Selection::NoMatch => {}
    }

    let message = expected(descriptor, &value.repr());
    Err(match last_domain {
        Some(cause) => CoercionError::domain(message, Some(cause)),
        None => CoercionError::invalid_argument(message, last_invalid),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{DictionaryMember, PseudoType};
    use crate::value::{ArrayKey, Callable, HostObject, RecordKey};

    fn registry() -> Registry {
        Registry::new()
            .define("EventListener", PseudoType::SingleOperationCallbackInterface)
            .define("Function", PseudoType::CallbackFunction)
    }

    fn union_of(
        descriptor: &str,
        value: Value,
        registry: &Registry,
    ) -> Result<Value, CoercionError> {
        let Ty::Union(members) = Ty::parse(descriptor) else {
            panic!("not a union descriptor: {descriptor}");
        };
        to_union(&value, &members, descriptor, registry)
    }

    #[test]
    fn flattening_inlines_nested_unions_and_counts_nullables() {
        let Ty::Union(members) = Ty::parse("((long or DOMString)? or boolean?)") else {
            panic!("expected a union");
        };
        let (flattened, nullable) = flatten(&members);
        assert_eq!(
            flattened,
            vec![Ty::parse("long"), Ty::parse("DOMString"), Ty::parse("boolean")]
        );
        assert_eq!(nullable, 2);
    }

    #[test]
    fn inner_nullables_do_not_count() {
        let Ty::Union(members) = Ty::parse("(sequence<long?> or DOMString)") else {
            panic!("expected a union");
        };
        let (flattened, nullable) = flatten(&members);
        assert_eq!(nullable, 0);
        assert_eq!(flattened, vec![Ty::parse("sequence<long?>"), Ty::parse("DOMString")]);
    }

    #[test]
    fn null_needs_exactly_one_nullable_member() {
        let registry = Registry::new();
        assert_eq!(
            union_of("(long or DOMString?)", Value::Null, &registry).unwrap(),
            Value::Null
        );
        // two nullable members: the shortcut does not apply, and null then
        // falls through to the stripped string member, rendering empty
        assert_eq!(
            union_of("(long? or DOMString?)", Value::Null, &registry).unwrap(),
            Value::from("")
        );
    }

    #[test]
    fn objects_try_interface_members_in_order() {
        let registry = Registry::new();
        let node = HostObject::new("DivElement").implementing("Node").into_value();
        let result = union_of("(Node or DOMString)", node.clone(), &registry).unwrap();
        assert_eq!(result, node);
    }

    #[test]
    fn plain_object_member_takes_any_object_unchanged() {
        let registry = Registry::new();
        let blob = HostObject::new("Blob").into_value();
        let result = union_of("(Node or object)", blob.clone(), &registry).unwrap();
        assert_eq!(result, blob);
    }

    #[test]
    fn callables_pass_through_a_callback_function_member() {
        let handler = Value::Callable(Callable::new("handler"));
        let result = union_of("(Function or long)", handler.clone(), &registry()).unwrap();
        assert_eq!(result, handler);
    }

    #[test]
    fn zero_based_keys_pick_the_sequence_member() {
        let registry = Registry::new();
        let input = Value::array([
            (ArrayKey::Int(0), Value::from("a")),
            (ArrayKey::Int(1), Value::from("b")),
        ]);
        let result =
            union_of("(record<DOMString, DOMString> or sequence<DOMString>)", input, &registry)
                .unwrap();
        assert_eq!(result, Value::list([Value::from("a"), Value::from("b")]));
    }

    #[test]
    fn empty_views_pick_the_sequence_member() {
        let registry = Registry::new();
        let result = union_of(
            "(record<DOMString, DOMString> or sequence<DOMString>)",
            Value::list([]),
            &registry,
        )
        .unwrap();
        assert_eq!(result, Value::list([]));
    }

    #[test]
    fn offset_gaps_pick_the_record_member() {
        let registry = Registry::new();
        let input = Value::array([
            (ArrayKey::Int(0), Value::from("a")),
            (ArrayKey::Int(2), Value::from("b")),
        ]);
        let result =
            union_of("(record<DOMString, DOMString> or sequence<DOMString>)", input, &registry)
                .unwrap();
        let Value::Record(record) = result else {
            panic!("expected a record");
        };
        assert_eq!(record.get(&RecordKey::from("0")), Some(&Value::from("a")));
        assert_eq!(record.get(&RecordKey::from("2")), Some(&Value::from("b")));
    }

    #[test]
    fn frozen_array_members_serve_as_the_sequence_side() {
        let registry = Registry::new();
        let result = union_of(
            "(record<DOMString, DOMString> or FrozenArray<long>)",
            Value::list([Value::from("1"), Value::from("2")]),
            &registry,
        )
        .unwrap();
        assert_eq!(result, Value::list([Value::Int(1), Value::Int(2)]));
    }

    #[test]
    fn dictionary_members_serve_as_the_dictionary_side() {
        let registry = Registry::new().define(
            "EventInit",
            PseudoType::dictionary([(
                "bubbles",
                DictionaryMember::new("boolean").with_default(serde_json::json!(false)),
            )]),
        );
        let input = Value::array([(ArrayKey::from("bubbles"), Value::Int(1))]);
        let result = union_of("(EventInit or sequence<DOMString>)", input, &registry).unwrap();
        assert_eq!(result, Value::array([(ArrayKey::from("bubbles"), Value::Bool(true))]));
    }

    #[test]
    fn chosen_member_failure_decides_the_union() {
        let registry = Registry::new();
        let input = Value::list([Value::Null]);
        let error = union_of("(sequence<long> or boolean)", input, &registry).unwrap_err();
        // the boolean fallback is not consulted once the sequence member
        // was chosen
        assert!(error.is_domain());
        assert_eq!(error.message(), "Expected (sequence<long> or boolean), got array");
        let cause = error.cause().expect("the sequence failure should chain");
        assert_eq!(
            cause.message(),
            "Expected sequence<long> (an array including only long)"
        );
    }

    #[test]
    fn callback_interface_members_accept_plain_arrays() {
        let input = Value::array([(ArrayKey::from("handleEvent"), Value::from("x"))]);
        let result = union_of("(EventListener or boolean)", input, &registry()).unwrap();
        let Value::Object(object) = result else {
            panic!("expected an object");
        };
        assert_eq!(object.fields.get("handleEvent"), Some(&Value::from("x")));
    }

    #[test]
    fn booleans_survive_with_a_boolean_member() {
        let result = union_of("(EventListener or boolean)", Value::Bool(false), &registry());
        assert_eq!(result.unwrap(), Value::Bool(false));
    }

    #[test]
    fn numbers_prefer_the_numeric_member() {
        let registry = Registry::new();
        assert_eq!(
            union_of("(DOMString or long)", Value::Int(7), &registry).unwrap(),
            Value::Int(7)
        );
        assert_eq!(
            union_of("(DOMString or long)", Value::Double(2.0), &registry).unwrap(),
            Value::Int(2)
        );
    }

    #[test]
    fn strings_prefer_the_string_member() {
        let registry = Registry::new();
        assert_eq!(
            union_of("(long or DOMString)", Value::from("7.5"), &registry).unwrap(),
            Value::from("7.5")
        );
    }

    #[test]
    fn strings_fall_back_to_the_numeric_member() {
        let registry = Registry::new();
        assert_eq!(
            union_of("(long or boolean)", Value::from("29"), &registry).unwrap(),
            Value::Int(29)
        );
    }

    #[test]
    fn enumerations_bucket_as_strings() {
        let registry = Registry::new().define("Mode", PseudoType::enumeration(["open", "closed"]));
        assert_eq!(
            union_of("(Mode or long)", Value::from("open"), &registry).unwrap(),
            Value::from("open")
        );
        let error = union_of("(Mode or long)", Value::from("ajar"), &registry).unwrap_err();
        assert!(error.is_domain());
        assert_eq!(error.message(), "Expected (Mode or long), got 'ajar'");
    }

    #[test]
    fn boolean_member_is_the_last_resort() {
        let registry = Registry::new();
        assert_eq!(
            union_of("(Node or boolean)", Value::from("0"), &registry).unwrap(),
            Value::Bool(false)
        );
        assert_eq!(
            union_of("(Node or boolean)", Value::from("yes"), &registry).unwrap(),
            Value::Bool(true)
        );
    }

    #[test]
    fn unmatched_unions_report_the_whole_descriptor() {
        let error = union_of("(Node or Function)", Value::Int(5), &registry()).unwrap_err();
        assert!(error.is_invalid_argument());
        assert_eq!(error.message(), "Expected (Node or Function), got 5");
        assert!(error.cause().is_none());
    }
}
