//! JSON lexer over the shared byte cursor

use crate::error::{Error, ErrorKind, Result, Span};
use crate::scan::Cursor;

/// JSON token types
#[derive(Clone, Debug, PartialEq)]
pub enum TokenKind {
    LeftBrace,
    RightBrace,
    LeftBracket,
    RightBracket,
    Colon,
    Comma,
    Null,
    True,
    False,
    String(String),
    Int(i64),
    Float(f64),
    Eof,
}

impl TokenKind {
    /// Token name for error messages
    pub const fn name(&self) -> &'static str {
        match self {
            Self::LeftBrace => "'{'",
            Self::RightBrace => "'}'",
            Self::LeftBracket => "'['",
            Self::RightBracket => "']'",
            Self::Colon => "':'",
            Self::Comma => "','",
            Self::Null => "null",
            Self::True => "true",
            Self::False => "false",
            Self::String(_) => "string",
            Self::Int(_) | Self::Float(_) => "number",
            Self::Eof => "EOF",
        }
    }
}

/// Token with source location
#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub const fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// JSON lexer that tokenizes input bytes
#[derive(Clone, Debug)]
pub struct Lexer<'a> {
    cursor: Cursor<'a>,
}

impl<'a> Lexer<'a> {
    pub const fn new(input: &'a [u8]) -> Self {
        Self {
            cursor: Cursor::new(input),
        }
    }

    /// Next token from the input
    pub fn next_token(&mut self) -> Result<Token> {
        self.cursor.skip_whitespace();
        let start = self.cursor.position();

        let kind = match self.cursor.current() {
            None => TokenKind::Eof,
            Some(b'{') => {
                self.cursor.advance();
                TokenKind::LeftBrace
            }
            Some(b'}') => {
                self.cursor.advance();
                TokenKind::RightBrace
            }
            Some(b'[') => {
                self.cursor.advance();
                TokenKind::LeftBracket
            }
            Some(b']') => {
                self.cursor.advance();
                TokenKind::RightBracket
            }
            Some(b':') => {
                self.cursor.advance();
                TokenKind::Colon
            }
            Some(b',') => {
                self.cursor.advance();
                TokenKind::Comma
            }
            Some(b'"') => self.lex_string()?,
            Some(b'n') => self.lex_keyword("null", TokenKind::Null)?,
            Some(b't') => self.lex_keyword("true", TokenKind::True)?,
            Some(b'f') => self.lex_keyword("false", TokenKind::False)?,
            Some(b'-' | b'0'..=b'9') => self.lex_number()?,
            Some(_) => {
                return Err(Error::at(
                    ErrorKind::InvalidToken,
                    start.offset,
                    start.line,
                    start.col,
                ));
            }
        };

        let end = self.cursor.position();
        Ok(Token::new(kind, Span::new(start, end)))
    }

    fn lex_keyword(&mut self, word: &str, kind: TokenKind) -> Result<TokenKind> {
        let start = self.cursor.position();
        for expected in word.bytes() {
            if !self.cursor.consume(expected) {
                return Err(Error::at(
                    ErrorKind::InvalidToken,
                    start.offset,
                    start.line,
                    start.col,
                ));
            }
        }
        Ok(kind)
    }

    fn lex_string(&mut self) -> Result<TokenKind> {
        let start = self.cursor.position();
        self.cursor.advance(); // opening quote
        let mut out = String::new();

        loop {
            let pos = self.cursor.position();
            match self.cursor.current() {
                None => {
                    return Err(Error::at(
                        ErrorKind::UnterminatedString,
                        start.offset,
                        start.line,
                        start.col,
                    ));
                }
                Some(b'"') => {
                    self.cursor.advance();
                    return Ok(TokenKind::String(out));
                }
                Some(b'\\') => {
                    self.cursor.advance();
                    match self.cursor.current() {
                        Some(b'"') => out.push('"'),
                        Some(b'\\') => out.push('\\'),
                        Some(b'/') => out.push('/'),
                        Some(b'b') => out.push('\u{0008}'),
                        Some(b'f') => out.push('\u{000C}'),
                        Some(b'n') => out.push('\n'),
                        Some(b'r') => out.push('\r'),
                        Some(b't') => out.push('\t'),
                        Some(b'u') => {
                            self.cursor.advance();
                            let ch = self.lex_unicode_escape(pos)?;
                            out.push(ch);
                            continue;
                        }
                        _ => {
                            return Err(Error::at(
                                ErrorKind::InvalidEscapeSequence,
                                pos.offset,
                                pos.line,
                                pos.col,
                            ));
                        }
                    }
                    self.cursor.advance();
                }
                Some(b) if b < 0x20 => {
                    return Err(Error::at(
                        ErrorKind::InvalidToken,
                        pos.offset,
                        pos.line,
                        pos.col,
                    ));
                }
                Some(_) => {
                    // Collect a run of plain UTF-8 bytes in one go
                    let bytes = self
                        .cursor
                        .eat_while(|b| b != b'"' && b != b'\\' && b >= 0x20);
                    match std::str::from_utf8(bytes) {
                        Ok(s) => out.push_str(s),
                        Err(_) => {
                            return Err(Error::at(
                                ErrorKind::InvalidToken,
                                pos.offset,
                                pos.line,
                                pos.col,
                            ));
                        }
                    }
                }
            }
        }
    }

    fn lex_unicode_escape(&mut self, pos: crate::error::Pos) -> Result<char> {
        let first = self.lex_hex4(pos)?;
        // Surrogate pair handling
        if (0xD800..0xDC00).contains(&first) {
            if self.cursor.consume(b'\\') && self.cursor.consume(b'u') {
                let second = self.lex_hex4(pos)?;
                if (0xDC00..0xE000).contains(&second) {
                    let combined =
                        0x10000 + ((first - 0xD800) << 10) + (second - 0xDC00);
                    return char::from_u32(combined).ok_or_else(|| {
                        Error::at(ErrorKind::InvalidUnicodeEscape, pos.offset, pos.line, pos.col)
                    });
                }
            }
            return Err(Error::at(
                ErrorKind::InvalidUnicodeEscape,
                pos.offset,
                pos.line,
                pos.col,
            ));
        }
        char::from_u32(first).ok_or_else(|| {
            Error::at(ErrorKind::InvalidUnicodeEscape, pos.offset, pos.line, pos.col)
        })
    }

    fn lex_hex4(&mut self, pos: crate::error::Pos) -> Result<u32> {
        let mut value: u32 = 0;
        for _ in 0..4 {
            let digit = match self.cursor.current() {
                Some(b @ b'0'..=b'9') => u32::from(b - b'0'),
                Some(b @ b'a'..=b'f') => u32::from(b - b'a') + 10,
                Some(b @ b'A'..=b'F') => u32::from(b - b'A') + 10,
                _ => {
                    return Err(Error::at(
                        ErrorKind::InvalidUnicodeEscape,
                        pos.offset,
                        pos.line,
                        pos.col,
                    ));
                }
            };
            value = value * 16 + digit;
            self.cursor.advance();
        }
        Ok(value)
    }

    fn lex_number(&mut self) -> Result<TokenKind> {
        let start = self.cursor.position();
        let begin = self.cursor.pos();

        self.cursor.consume(b'-');
        if self.cursor.eat_while(|b| b.is_ascii_digit()).is_empty() {
            return Err(Error::at(
                ErrorKind::InvalidNumber,
                start.offset,
                start.line,
                start.col,
            ));
        }

        let mut is_float = false;
        if self.cursor.current() == Some(b'.') {
            is_float = true;
            self.cursor.advance();
            if self.cursor.eat_while(|b| b.is_ascii_digit()).is_empty() {
                return Err(Error::at(
                    ErrorKind::InvalidNumber,
                    start.offset,
                    start.line,
                    start.col,
                ));
            }
        }
        if matches!(self.cursor.current(), Some(b'e' | b'E')) {
            is_float = true;
            self.cursor.advance();
            if matches!(self.cursor.current(), Some(b'+' | b'-')) {
                self.cursor.advance();
            }
            if self.cursor.eat_while(|b| b.is_ascii_digit()).is_empty() {
                return Err(Error::at(
                    ErrorKind::InvalidNumber,
                    start.offset,
                    start.line,
                    start.col,
                ));
            }
        }

        let literal = std::str::from_utf8(self.cursor.slice_from(begin)).map_err(|_| {
            Error::at(ErrorKind::InvalidNumber, start.offset, start.line, start.col)
        })?;

        if !is_float {
            if let Ok(n) = literal.parse::<i64>() {
                return Ok(TokenKind::Int(n));
            }
        }
        literal
            .parse::<f64>()
            .map(TokenKind::Float)
            .map_err(|_| Error::at(ErrorKind::InvalidNumber, start.offset, start.line, start.col))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &[u8]) -> Result<Vec<TokenKind>> {
        let mut lexer = Lexer::new(input);
        let mut out = Vec::new();
        loop {
            let token = lexer.next_token()?;
            if token.kind == TokenKind::Eof {
                return Ok(out);
            }
            out.push(token.kind);
        }
    }

    #[test]
    fn test_structural_tokens() -> Result<()> {
        let tokens = kinds(b"{}[]:,")?;
        assert_eq!(
            tokens,
            vec![
                TokenKind::LeftBrace,
                TokenKind::RightBrace,
                TokenKind::LeftBracket,
                TokenKind::RightBracket,
                TokenKind::Colon,
                TokenKind::Comma,
            ]
        );
        Ok(())
    }

    #[test]
    fn test_keywords() -> Result<()> {
        assert_eq!(
            kinds(b"null true false")?,
            vec![TokenKind::Null, TokenKind::True, TokenKind::False]
        );
        Ok(())
    }

    #[test]
    fn test_int_and_float() -> Result<()> {
        assert_eq!(kinds(b"30")?, vec![TokenKind::Int(30)]);
        assert_eq!(kinds(b"-7")?, vec![TokenKind::Int(-7)]);
        assert_eq!(kinds(b"3.5")?, vec![TokenKind::Float(3.5)]);
        assert_eq!(kinds(b"1e2")?, vec![TokenKind::Float(100.0)]);
        Ok(())
    }

    #[test]
    fn test_string_escapes() -> Result<()> {
        assert_eq!(
            kinds(br#""a\nb\"c""#)?,
            vec![TokenKind::String("a\nb\"c".to_string())]
        );
        Ok(())
    }

    #[test]
    fn test_unicode_escape() -> Result<()> {
        assert_eq!(
            kinds(r#""é""#.as_bytes())?,
            vec![TokenKind::String("\u{e9}".to_string())]
        );
        Ok(())
    }

    #[test]
    fn test_surrogate_pair() -> Result<()> {
        assert_eq!(
            kinds(r#""😀""#.as_bytes())?,
            vec![TokenKind::String("\u{1F600}".to_string())]
        );
        Ok(())
    }

    #[test]
    fn test_unterminated_string() {
        let result = kinds(br#""abc"#);
        assert!(
            matches!(result, Err(err) if err.kind() == &ErrorKind::UnterminatedString)
        );
    }

    #[test]
    fn test_invalid_number() {
        assert!(kinds(b"-").is_err());
        assert!(kinds(b"1.").is_err());
        assert!(kinds(b"1e").is_err());
    }
}
