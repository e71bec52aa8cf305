//! Byte cursor with position tracking, shared by the hand-rolled lexers

use crate::error::Pos;

/// Cursor over byte input tracking offset, line and column
#[derive(Clone, Debug)]
pub struct Cursor<'a> {
    input: &'a [u8],
    pos: usize,
    line: u32,
    col: u32,
}

impl<'a> Cursor<'a> {
    pub const fn new(input: &'a [u8]) -> Self {
        Self {
            input,
            pos: 0,
            line: 1,
            col: 1,
        }
    }

    /// Current byte without consuming
    pub fn current(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    /// Byte `ahead` positions past the current one
    pub fn peek(&self, ahead: usize) -> Option<u8> {
        self.input.get(self.pos.saturating_add(ahead)).copied()
    }

    /// Advance by one byte
    pub fn advance(&mut self) {
        if let Some(b) = self.current() {
            self.pos += 1;
            if b == b'\n' {
                self.line += 1;
                self.col = 1;
            } else {
                self.col += 1;
            }
        }
    }

    /// Consume the byte if it matches
    pub fn consume(&mut self, expected: u8) -> bool {
        if self.current() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Skip spaces, tabs, newlines and carriage returns
    pub fn skip_whitespace(&mut self) {
        while let Some(b) = self.current() {
            if matches!(b, b' ' | b'\t' | b'\n' | b'\r') {
                self.advance();
            } else {
                break;
            }
        }
    }

    /// Skip spaces and tabs only, staying on the current line
    pub fn skip_inline_whitespace(&mut self) {
        while matches!(self.current(), Some(b' ' | b'\t')) {
            self.advance();
        }
    }

    /// Advance while `pred` holds, returning the consumed slice
    pub fn eat_while(&mut self, pred: impl Fn(u8) -> bool) -> &'a [u8] {
        let start = self.pos;
        while let Some(b) = self.current() {
            if pred(b) {
                self.advance();
            } else {
                break;
            }
        }
        &self.input[start..self.pos]
    }

    pub const fn position(&self) -> Pos {
        Pos::new(self.pos, self.line, self.col)
    }

    pub const fn is_eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    pub const fn pos(&self) -> usize {
        self.pos
    }

    /// Slice from `start` to the current position
    pub fn slice_from(&self, start: usize) -> &'a [u8] {
        &self.input[start..self.pos]
    }
}

/// Split one logical line of delimiter-separated values, honoring quotes
/// and backslash escapes inside quoted sections.
pub fn split_delimited(input: &str, delim: char) -> Vec<String> {
    let mut result = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut escaped = false;
    for ch in input.chars() {
        if escaped {
            current.push(ch);
            escaped = false;
        } else if ch == '\\' {
            current.push(ch);
            escaped = true;
        } else if ch == '"' {
            in_quotes = !in_quotes;
            current.push(ch);
        } else if ch == delim && !in_quotes {
            result.push(current.trim().to_string());
            current.clear();
        } else {
            current.push(ch);
        }
    }
    if !current.is_empty() {
        result.push(current.trim().to_string());
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_basic() {
        let mut cursor = Cursor::new(b"hello");
        assert_eq!(cursor.current(), Some(b'h'));
        assert_eq!(cursor.peek(1), Some(b'e'));
        cursor.advance();
        assert_eq!(cursor.current(), Some(b'e'));
    }

    #[test]
    fn test_cursor_line_tracking() {
        let mut cursor = Cursor::new(b"a\nb");
        cursor.advance();
        cursor.advance();
        let pos = cursor.position();
        assert_eq!(pos.line, 2);
        assert_eq!(pos.col, 1);
    }

    #[test]
    fn test_eat_while() {
        let mut cursor = Cursor::new(b"abc123");
        let word = cursor.eat_while(|b| b.is_ascii_alphabetic());
        assert_eq!(word, b"abc");
        assert_eq!(cursor.current(), Some(b'1'));
    }

    #[test]
    fn test_inline_whitespace() {
        let mut cursor = Cursor::new(b"  \t\nx");
        cursor.skip_inline_whitespace();
        assert_eq!(cursor.current(), Some(b'\n'));
    }

    #[test]
    fn test_split_delimited_plain() {
        assert_eq!(split_delimited("a,b,c", ','), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_split_delimited_quoted() {
        assert_eq!(
            split_delimited(r#""x,y",z"#, ','),
            vec![r#""x,y""#, "z"]
        );
    }

    #[test]
    fn test_split_delimited_trims() {
        assert_eq!(split_delimited(" a , b ", ','), vec!["a", "b"]);
    }
}
