//! Recursive descent JSON parser

use crate::error::{Error, ErrorKind, Result};
use crate::json::lexer::{Lexer, Token, TokenKind};
use crate::value::{Array, Object, Value};

/// Parser limits
#[derive(Clone, Copy, Debug)]
pub struct Config {
    /// Maximum nesting depth before parsing aborts
    pub max_depth: u16,
    /// Maximum input size in bytes
    pub max_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_depth: 128,
            max_size: 10 * 1024 * 1024,
        }
    }
}

/// JSON parser producing a [`Value`] tree
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
    config: Config,
    depth: u16,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str) -> Result<Self> {
        Self::with_config(input, Config::default())
    }

    pub fn with_config(input: &'a str, config: Config) -> Result<Self> {
        if input.len() > config.max_size {
            return Err(Error::semantic(ErrorKind::MaxSizeExceeded {
                max: config.max_size,
            }));
        }
        let mut lexer = Lexer::new(input.as_bytes());
        let current = lexer.next_token()?;
        Ok(Self {
            lexer,
            current,
            config,
            depth: 0,
        })
    }

    /// Parse the input as a single JSON document
    pub fn parse(&mut self) -> Result<Value> {
        let value = self.parse_value()?;
        if self.current.kind != TokenKind::Eof {
            return Err(self.unexpected("end of input"));
        }
        Ok(value)
    }

    fn advance(&mut self) -> Result<()> {
        self.current = self.lexer.next_token()?;
        Ok(())
    }

    fn expect(&mut self, kind: &TokenKind) -> Result<()> {
        if std::mem::discriminant(&self.current.kind) == std::mem::discriminant(kind) {
            self.advance()
        } else {
            Err(self.unexpected(kind.name()))
        }
    }

    fn unexpected(&self, expected: &str) -> Error {
        if self.current.kind == TokenKind::Eof {
            Error::new(ErrorKind::UnexpectedEof, self.current.span)
        } else {
            Error::new(
                ErrorKind::Expected {
                    expected: expected.to_string(),
                    found: self.current.kind.name().to_string(),
                },
                self.current.span,
            )
        }
    }

    fn parse_value(&mut self) -> Result<Value> {
        match &self.current.kind {
            TokenKind::Null => {
                self.advance()?;
                Ok(Value::Null)
            }
            TokenKind::True => {
                self.advance()?;
                Ok(Value::Bool(true))
            }
            TokenKind::False => {
                self.advance()?;
                Ok(Value::Bool(false))
            }
            TokenKind::Int(n) => {
                let n = *n;
                self.advance()?;
                Ok(Value::Int(n))
            }
            TokenKind::Float(n) => {
                let n = *n;
                self.advance()?;
                Ok(Value::Float(n))
            }
            TokenKind::String(s) => {
                let s = s.clone();
                self.advance()?;
                Ok(Value::String(s))
            }
            TokenKind::LeftBrace => self.parse_object(),
            TokenKind::LeftBracket => self.parse_array(),
            _ => Err(self.unexpected("value")),
        }
    }

    fn enter(&mut self) -> Result<()> {
        self.depth += 1;
        if self.depth > self.config.max_depth {
            return Err(Error::new(
                ErrorKind::MaxDepthExceeded {
                    max: self.config.max_depth,
                },
                self.current.span,
            ));
        }
        Ok(())
    }

    fn parse_object(&mut self) -> Result<Value> {
        self.enter()?;
        self.advance()?; // '{'
        let mut object = Object::new();

        if self.current.kind == TokenKind::RightBrace {
            self.advance()?;
            self.depth -= 1;
            return Ok(Value::Object(object));
        }

        loop {
            let key = match &self.current.kind {
                TokenKind::String(s) => s.clone(),
                _ => return Err(self.unexpected("string key")),
            };
            self.advance()?;
            self.expect(&TokenKind::Colon)?;
            let value = self.parse_value()?;
            object.insert(key, value);

            match self.current.kind {
                TokenKind::Comma => self.advance()?,
                TokenKind::RightBrace => {
                    self.advance()?;
                    self.depth -= 1;
                    return Ok(Value::Object(object));
                }
                _ => return Err(self.unexpected("',' or '}'")),
            }
        }
    }

    fn parse_array(&mut self) -> Result<Value> {
        self.enter()?;
        self.advance()?; // '['
        let mut array = Array::new();

        if self.current.kind == TokenKind::RightBracket {
            self.advance()?;
            self.depth -= 1;
            return Ok(Value::Array(array));
        }

        loop {
            array.push(self.parse_value()?);
            match self.current.kind {
                TokenKind::Comma => self.advance()?,
                TokenKind::RightBracket => {
                    self.advance()?;
                    self.depth -= 1;
                    return Ok(Value::Array(array));
                }
                _ => return Err(self.unexpected("',' or ']'")),
            }
        }
    }
}

/// Parse a JSON document with default limits
pub fn parse(input: &str) -> Result<Value> {
    Parser::new(input)?.parse()
}
