//! JSON parsing and rendering

pub mod lexer;
pub mod parser;
pub mod writer;

pub use lexer::{Lexer, Token, TokenKind};
pub use parser::{Config, Parser};
pub use writer::{to_string, to_string_compact, to_string_pretty};
