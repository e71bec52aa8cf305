//! TOON, a compact indentation and header driven text notation
//!
//! Objects are `key: value` lines nested by 2-space indents. Arrays get a
//! tabular fast path (`key[N]{f1,f2}:` plus one delimited row per element)
//! when every element is a flat object over the same key set, an inline
//! form (`key[N]: v1,v2`) when every element is a scalar, and a `- ` list
//! fallback otherwise.

pub mod decode;
pub mod encode;

pub use decode::parse;
pub use encode::{needs_quote, to_string};
