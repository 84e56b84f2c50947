//! The pseudo-type registry: caller-supplied definitions for identifiers
//! that appear in descriptors but are not grammar primitives.
//!
//! An identifier resolves to a dictionary member table, an enumeration
//! value list, one of the callback-interface markers, or the
//! callback-function marker. Identifiers absent from the registry are
//! treated as plain interface names and convert by instance checking.
//!
//! The registry (de)serializes as a JSON map:
//!
//! ```json
//! {
//!   "EventInit": {
//!     "kind": "dictionary",
//!     "members": {
//!       "bubbles": { "type": "boolean", "default": false },
//!       "cancelable": { "type": "boolean", "default": false }
//!     }
//!   },
//!   "ShadowRootMode": { "kind": "enum", "values": ["open", "closed"] },
//!   "EventListener": { "kind": "callback-interface" },
//!   "NodeFilter": { "kind": "single-operation-callback-interface" },
//!   "Function": { "kind": "callback-function" }
//! }
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::ty::Ty;

// ————————————————————————————————————————————————————————————————————————————
// ENTRIES
// ————————————————————————————————————————————————————————————————————————————

/// One declared dictionary member: target type, optional default (applied
/// when the member is absent), optional required flag.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DictionaryMember {
    #[serde(rename = "type")]
    pub ty: Ty,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,
}

impl DictionaryMember {
    pub fn new(descriptor: &str) -> Self {
        DictionaryMember { ty: Ty::parse(descriptor), default: None, required: false }
    }

    pub fn with_default(mut self, default: serde_json::Value) -> Self {
        self.default = Some(default);
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum PseudoType {
    Dictionary { members: IndexMap<String, DictionaryMember> },
    Enum { values: Vec<String> },
    CallbackInterface,
    SingleOperationCallbackInterface,
    CallbackFunction,
}

impl PseudoType {
    pub fn dictionary(
        members: impl IntoIterator<Item = (&'static str, DictionaryMember)>,
    ) -> PseudoType {
        PseudoType::Dictionary {
            members: members
                .into_iter()
                .map(|(name, member)| (name.to_owned(), member))
                .collect(),
        }
    }

    pub fn enumeration(values: impl IntoIterator<Item = &'static str>) -> PseudoType {
        PseudoType::Enum { values: values.into_iter().map(str::to_owned).collect() }
    }
}

/// How an identifier converts, after consulting the registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IdentifierKind {
    /// Not registered: instance check against the name.
    Interface,
    Dictionary,
    Enum,
    CallbackInterface { single_operation: bool },
    CallbackFunction,
}

// ————————————————————————————————————————————————————————————————————————————
// REGISTRY
// ————————————————————————————————————————————————————————————————————————————

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Registry {
    entries: IndexMap<String, PseudoType>,
}

impl Registry {
    pub fn new() -> Registry {
        Registry::default()
    }

    pub fn define(mut self, name: impl Into<String>, pseudo_type: PseudoType) -> Registry {
        self.entries.insert(name.into(), pseudo_type);
        self
    }

    pub fn get(&self, name: &str) -> Option<&PseudoType> {
        self.entries.get(name)
    }

    pub fn classify(&self, name: &str) -> IdentifierKind {
        match self.get(name) {
            None => IdentifierKind::Interface,
            Some(PseudoType::Dictionary { .. }) => IdentifierKind::Dictionary,
            Some(PseudoType::Enum { .. }) => IdentifierKind::Enum,
            Some(PseudoType::CallbackInterface) => {
                IdentifierKind::CallbackInterface { single_operation: false }
            }
            Some(PseudoType::SingleOperationCallbackInterface) => {
                IdentifierKind::CallbackInterface { single_operation: true }
            }
            Some(PseudoType::CallbackFunction) => IdentifierKind::CallbackFunction,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PseudoType)> {
        self.entries.iter().map(|(name, pseudo_type)| (name.as_str(), pseudo_type))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ty::StringKind;

    fn sample() -> Registry {
        Registry::new()
            .define(
                "EventInit",
                PseudoType::dictionary([
                    ("bubbles", DictionaryMember::new("boolean").with_default(serde_json::json!(false))),
                    ("detail", DictionaryMember::new("DOMString").required()),
                ]),
            )
            .define("ShadowRootMode", PseudoType::enumeration(["open", "closed"]))
            .define("EventListener", PseudoType::CallbackInterface)
            .define("NodeFilter", PseudoType::SingleOperationCallbackInterface)
            .define("Function", PseudoType::CallbackFunction)
    }

    #[test]
    fn classification() {
        let registry = sample();
        assert_eq!(registry.classify("EventInit"), IdentifierKind::Dictionary);
        assert_eq!(registry.classify("ShadowRootMode"), IdentifierKind::Enum);
        assert_eq!(
            registry.classify("EventListener"),
            IdentifierKind::CallbackInterface { single_operation: false }
        );
        assert_eq!(
            registry.classify("NodeFilter"),
            IdentifierKind::CallbackInterface { single_operation: true }
        );
        assert_eq!(registry.classify("Function"), IdentifierKind::CallbackFunction);
        assert_eq!(registry.classify("Node"), IdentifierKind::Interface);
    }

    #[test]
    fn deserializes_external_shape() {
        let json = r#"{
            "EventInit": {
                "kind": "dictionary",
                "members": {
                    "bubbles": { "type": "boolean", "default": false },
                    "detail": { "type": "DOMString", "required": true }
                }
            },
            "ShadowRootMode": { "kind": "enum", "values": ["open", "closed"] }
        }"#;
        let registry: Registry = serde_json::from_str(json).unwrap();
        let Some(PseudoType::Dictionary { members }) = registry.get("EventInit") else {
            panic!("expected dictionary entry");
        };
        // member order is declaration order
        let names: Vec<_> = members.keys().collect();
        assert_eq!(names, vec!["bubbles", "detail"]);
        assert_eq!(members["bubbles"].ty, Ty::Boolean);
        assert_eq!(members["bubbles"].default, Some(serde_json::json!(false)));
        assert!(members["detail"].required);
        assert_eq!(members["detail"].ty, Ty::String(StringKind::DomString));
    }

    #[test]
    fn serializes_back_to_external_shape() {
        let registry = sample();
        let json = serde_json::to_value(&registry).unwrap();
        assert_eq!(json["ShadowRootMode"]["kind"], "enum");
        assert_eq!(json["EventListener"]["kind"], "callback-interface");
        assert_eq!(json["NodeFilter"]["kind"], "single-operation-callback-interface");
        assert_eq!(json["EventInit"]["members"]["bubbles"]["type"], "boolean");
        // absent default and required=false stay absent
        assert!(json["EventInit"]["members"]["bubbles"].get("required").is_none());
        assert!(json["EventInit"]["members"]["detail"].get("default").is_none());
        let round_tripped: Registry = serde_json::from_value(json).unwrap();
        assert_eq!(round_tripped, registry);
    }
}
