//! Error types for morph

use std::fmt;
use thiserror::Error;

/// Position in source text
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Pos {
    pub offset: usize,
    pub line: u32,
    pub col: u32,
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

impl Pos {
    pub const fn new(offset: usize, line: u32, col: u32) -> Self {
        Self { offset, line, col }
    }
}

/// Span covering a range of source text
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Span {
    pub start: Pos,
    pub end: Pos,
}

impl Span {
    pub const fn new(start: Pos, end: Pos) -> Self {
        Self { start, end }
    }

    pub const fn at(pos: Pos) -> Self {
        Self {
            start: pos,
            end: pos,
        }
    }

    pub const fn empty() -> Self {
        Self {
            start: Pos::new(0, 0, 0),
            end: Pos::new(0, 0, 0),
        }
    }

    /// Span pointing at the start of a 1-based source line.
    pub const fn line(line: u32) -> Self {
        Self::at(Pos::new(0, line, 1))
    }
}

/// Error categories across parsing, conversion and codecs
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    // Lexical / syntactic
    InvalidEscapeSequence,
    InvalidUnicodeEscape,
    UnterminatedString,
    InvalidNumber,
    InvalidToken,
    Expected { expected: String, found: String },
    UnexpectedEof,
    MaxDepthExceeded { max: u16 },
    MaxSizeExceeded { max: usize },

    // TOON
    InvalidHeader,
    RowWidthMismatch { expected: usize, found: usize },
    UnexpectedIndent,

    // Struct text
    EmptyInput,
    NoStructDefinition,

    // Hub / semantic
    UnsupportedFormat { name: String },
    UnsupportedConversion { from: String, to: String },
    InvalidRoot { expected: &'static str },
    InvalidEncoding,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidEscapeSequence => write!(f, "invalid escape sequence"),
            Self::InvalidUnicodeEscape => write!(f, "invalid unicode escape"),
            Self::UnterminatedString => write!(f, "unterminated string"),
            Self::InvalidNumber => write!(f, "invalid number"),
            Self::InvalidToken => write!(f, "invalid token"),
            Self::Expected { expected, found } => {
                write!(f, "expected {expected}, found {found}")
            }
            Self::UnexpectedEof => write!(f, "unexpected end of input"),
            Self::MaxDepthExceeded { max } => write!(f, "max depth exceeded: {max}"),
            Self::MaxSizeExceeded { max } => write!(f, "max size exceeded: {max}"),
            Self::InvalidHeader => write!(f, "invalid array header"),
            Self::RowWidthMismatch { expected, found } => {
                write!(f, "row width mismatch: expected {expected} values, found {found}")
            }
            Self::UnexpectedIndent => write!(f, "unexpected indentation"),
            Self::EmptyInput => write!(f, "empty input"),
            Self::NoStructDefinition => write!(f, "no struct definition found"),
            Self::UnsupportedFormat { name } => write!(f, "unsupported format: {name}"),
            Self::UnsupportedConversion { from, to } => {
                write!(f, "unsupported conversion: {from} -> {to}")
            }
            Self::InvalidRoot { expected } => write!(f, "root value must be {expected}"),
            Self::InvalidEncoding => write!(f, "invalid encoding"),
        }
    }
}

/// Main error type for morph
#[derive(Error, Clone, Debug, PartialEq)]
pub struct Error {
    kind: ErrorKind,
    span: Span,
    message: String,
}

impl Error {
    pub fn new(kind: ErrorKind, span: Span) -> Self {
        let message = kind.to_string();
        Self {
            kind,
            span,
            message,
        }
    }

    pub fn with_message(kind: ErrorKind, span: Span, message: impl Into<String>) -> Self {
        Self {
            kind,
            span,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Create error at a specific position
    pub fn at(kind: ErrorKind, offset: usize, line: u32, col: u32) -> Self {
        Self::new(kind, Span::at(Pos::new(offset, line, col)))
    }

    /// Create error pointing at a 1-based source line
    pub fn on_line(kind: ErrorKind, line: u32) -> Self {
        Self::new(kind, Span::line(line))
    }

    /// Semantic error with no useful source location
    pub fn semantic(kind: ErrorKind) -> Self {
        Self::new(kind, Span::empty())
    }

    pub fn unsupported_format(name: impl Into<String>) -> Self {
        Self::semantic(ErrorKind::UnsupportedFormat { name: name.into() })
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.span == Span::empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "error at {}: {}", self.span.start, self.message)
        }
    }
}

/// Result type alias for morph
pub type Result<T> = std::result::Result<T, Error>;
