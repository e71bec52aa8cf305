//! morph: a multi-format data transcoder
//!
//! This crate provides functionality to:
//! - Parse JSON, YAML, TOML, XML, TOON, MsgPack, Go struct text,
//!   JSON Schema, GraphQL and Protobuf schemas into one value model
//! - Convert any supported format into any other
//! - Re-format documents in place, with optional minification
//! - Handle errors with positional context
//!
//! # Examples
//! ```
//! use morph::{convert, Format, Result};
//!
//! fn example() -> Result<()> {
//!     let toon = convert(Format::Json, Format::Toon, r#"{"name":"Alice","age":30}"#)?;
//!     assert_eq!(toon, "age: 30\nname: Alice");
//!     Ok(())
//! }
//! ```

pub mod codec;
pub mod convert;
pub mod error;
pub mod extras;
pub mod graphql;
pub mod ident;
pub mod json;
pub mod msgpack;
pub mod proto;
pub mod scan;
pub mod schema;
pub mod structs;
pub mod toml;
pub mod toon;
pub mod value;
pub mod xml;
pub mod yaml;

// Re-exports
pub use convert::{convert, format_content, Format};
pub use error::{Error, ErrorKind, Pos, Result, Span};
pub use value::{Array, Object, Value};
