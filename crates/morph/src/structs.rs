//! Typed struct-text notation
//!
//! Parses Go-style `type Name struct { Field Type }` declarations into field
//! lists, prints the canonical form back, and converts between struct text
//! and a sample value tree.

pub mod infer;
pub mod names;
pub mod parse;
pub mod print;

pub use infer::{definitions_from_value, sample_value};
pub use parse::parse;
pub use print::to_string;

/// One field of a struct declaration
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StructField {
    /// Declared field name
    pub name: String,
    /// JSON-facing name; empty when a `json:"-"` tag suppresses the field
    pub external_name: String,
    /// Declared type expression, verbatim
    pub type_expr: String,
    /// Doc comment, preceding block or trailing line comment
    pub doc: String,
    /// Raw tag content without backticks
    pub raw_tag: String,
}

/// A named struct declaration
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StructDefinition {
    pub name: String,
    pub fields: Vec<StructField>,
}
