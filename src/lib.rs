//! WebIDL-flavored type coercion for loosely-typed host values.
//!
//! A type descriptor (`"[EnforceRange] long"`, `"sequence<DOMString>"`,
//! `"(Node or DOMString)?"`) parses into a [`ty::Ty`] and drives the
//! conversion of a [`value::Value`] into its canonical form. Dictionary,
//! enumeration and callback identifiers resolve through a
//! [`registry::Registry`].

pub mod value;
pub mod bigint;
pub mod ty;
pub mod error;
pub mod exceptions;
pub mod registry;
pub mod convert;
pub mod cli;
pub mod jq_exec;
pub mod path_de;
