//! YAML subset parser and writer
//!
//! Covers block mappings and sequences, flow collections, quoted and plain
//! scalars. Anchors, tags and multi-document streams are not supported; the
//! subset is what data conversion needs.

use crate::error::{Error, ErrorKind, Result};
use crate::value::{self, Array, Object, Value};

/// Parse a YAML document into a [`Value`]
pub fn parse(input: &str) -> Result<Value> {
    let lines = collect_lines(input);
    if lines.is_empty() {
        return Ok(Value::Null);
    }
    let mut parser = BlockParser { lines, idx: 0 };
    let value = parser.parse_node(0)?;
    if let Some(line) = parser.current() {
        return Err(Error::on_line(ErrorKind::UnexpectedIndent, line.number));
    }
    Ok(value)
}

/// Render a [`Value`] as YAML with 2-space indentation and sorted keys
pub fn to_string(value: &Value) -> String {
    let mut out = String::new();
    match value {
        Value::Object(object) if !object.is_empty() => {
            write_mapping(object, 0, &mut out);
        }
        Value::Array(array) if !array.is_empty() => {
            write_sequence(array, 0, &mut out);
        }
        _ => {
            out.push_str(&scalar_text(value));
            out.push('\n');
        }
    }
    out
}

#[derive(Clone, Copy)]
struct Line<'a> {
    indent: usize,
    text: &'a str,
    number: u32,
}

fn collect_lines(input: &str) -> Vec<Line<'_>> {
    let mut out = Vec::new();
    for (i, raw) in input.lines().enumerate() {
        let indent = raw.len() - raw.trim_start_matches(' ').len();
        let text = strip_comment(raw.get(indent..).unwrap_or("")).trim_end();
        if text.is_empty() || text == "---" {
            continue;
        }
        out.push(Line {
            indent,
            text,
            number: u32::try_from(i + 1).unwrap_or(u32::MAX),
        });
    }
    out
}

/// Drop a trailing ` #` comment, honoring quotes
fn strip_comment(text: &str) -> &str {
    let mut quote: Option<char> = None;
    let mut prev_space = true;
    for (i, c) in text.char_indices() {
        match quote {
            Some(q) => {
                if c == q {
                    quote = None;
                }
            }
            None => match c {
                '"' | '\'' => quote = Some(c),
                '#' if prev_space => return text.get(..i).unwrap_or(text),
                _ => {}
            },
        }
        prev_space = c == ' ' || c == '\t';
    }
    text
}

struct BlockParser<'a> {
    lines: Vec<Line<'a>>,
    idx: usize,
}

impl<'a> BlockParser<'a> {
    fn current(&self) -> Option<Line<'a>> {
        self.lines.get(self.idx).copied()
    }

    fn advance(&mut self) {
        self.idx += 1;
    }

    fn parse_node(&mut self, indent: usize) -> Result<Value> {
        let Some(line) = self.current() else {
            return Ok(Value::Null);
        };
        if is_sequence_entry(line.text) {
            self.parse_sequence(line.indent.max(indent))
        } else {
            self.parse_mapping(line.indent.max(indent))
        }
    }

    fn parse_mapping(&mut self, indent: usize) -> Result<Value> {
        let mut object = Object::new();
        while let Some(line) = self.current() {
            if line.indent < indent || is_sequence_entry(line.text) {
                break;
            }
            if line.indent > indent {
                return Err(Error::on_line(ErrorKind::UnexpectedIndent, line.number));
            }
            let (key, rest) = split_pair(line.text, line.number)?;
            self.advance();
            let value = if rest.is_empty() {
                self.parse_block_value(indent, line.number)?
            } else {
                parse_flow_or_scalar(rest, line.number)?
            };
            object.insert(key, value);
        }
        Ok(Value::Object(object))
    }

    /// Value of a `key:` line with nothing after the colon
    fn parse_block_value(&mut self, indent: usize, _line: u32) -> Result<Value> {
        match self.current() {
            Some(next) if next.indent > indent => self.parse_node(next.indent),
            Some(next) if next.indent == indent && is_sequence_entry(next.text) => {
                self.parse_sequence(indent)
            }
            _ => Ok(Value::Null),
        }
    }

    fn parse_sequence(&mut self, indent: usize) -> Result<Value> {
        let mut array = Array::new();
        while let Some(line) = self.current() {
            if line.indent != indent || !is_sequence_entry(line.text) {
                if line.indent > indent {
                    return Err(Error::on_line(ErrorKind::UnexpectedIndent, line.number));
                }
                break;
            }
            let entry = line.text.get(1..).unwrap_or("").trim_start();
            self.advance();
            if entry.is_empty() {
                array.push(self.parse_block_value(indent, line.number)?);
            } else if let Ok((key, rest)) = split_pair(entry, line.number) {
                // Inline first pair of a nested mapping
                let item_indent = indent + 2;
                let first = if rest.is_empty() {
                    self.parse_block_value(item_indent, line.number)?
                } else {
                    parse_flow_or_scalar(rest, line.number)?
                };
                let mut object = Object::new();
                object.insert(key, first);
                if let Value::Object(more) = self.parse_mapping(item_indent)? {
                    for (k, v) in more {
                        object.insert(k, v);
                    }
                }
                array.push(Value::Object(object));
            } else {
                array.push(parse_flow_or_scalar(entry, line.number)?);
            }
        }
        Ok(Value::Array(array))
    }
}

fn is_sequence_entry(text: &str) -> bool {
    text == "-" || text.starts_with("- ")
}

/// Split `key: rest` at the first unquoted colon followed by space or EOL
fn split_pair(text: &str, line: u32) -> Result<(String, &str)> {
    let mut quote: Option<char> = None;
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    for (pos, &(i, c)) in chars.iter().enumerate() {
        match quote {
            Some(q) => {
                if c == q {
                    quote = None;
                }
            }
            None => match c {
                '"' | '\'' => quote = Some(c),
                ':' => {
                    let next = chars.get(pos + 1).map(|&(_, c)| c);
                    if next.is_none() || next == Some(' ') {
                        let raw_key = text.get(..i).unwrap_or("").trim();
                        let rest = text.get(i + 1..).unwrap_or("").trim();
                        return Ok((unquote_key(raw_key), rest));
                    }
                }
                _ => {}
            },
        }
    }
    Err(Error::on_line(
        ErrorKind::Expected {
            expected: "key: value".to_string(),
            found: text.to_string(),
        },
        line,
    ))
}

fn unquote_key(raw: &str) -> String {
    match parse_scalar(raw) {
        Value::String(s) => s,
        _ => raw.to_string(),
    }
}

fn parse_flow_or_scalar(text: &str, line: u32) -> Result<Value> {
    if text.starts_with('[') || text.starts_with('{') {
        let mut flow = FlowParser {
            chars: text.chars().collect(),
            pos: 0,
            line,
        };
        let value = flow.parse_value()?;
        flow.skip_spaces();
        if flow.pos < flow.chars.len() {
            return Err(Error::on_line(ErrorKind::InvalidToken, line));
        }
        return Ok(value);
    }
    Ok(parse_scalar(text))
}

fn parse_scalar(text: &str) -> Value {
    if let Some(inner) = text.strip_prefix('"') {
        if let Some(body) = inner.strip_suffix('"') {
            return Value::String(unescape_double(body));
        }
    }
    if let Some(inner) = text.strip_prefix('\'') {
        if let Some(body) = inner.strip_suffix('\'') {
            return Value::String(body.replace("''", "'"));
        }
    }
    match text {
        "" | "~" | "null" | "Null" | "NULL" => Value::Null,
        "true" | "True" | "TRUE" => Value::Bool(true),
        "false" | "False" | "FALSE" => Value::Bool(false),
        _ => value::number_from_literal(text).unwrap_or_else(|| Value::String(text.to_string())),
    }
}

fn unescape_double(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

struct FlowParser {
    chars: Vec<char>,
    pos: usize,
    line: u32,
}

impl FlowParser {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn skip_spaces(&mut self) {
        while matches!(self.peek(), Some(' ' | '\t')) {
            self.pos += 1;
        }
    }

    fn parse_value(&mut self) -> Result<Value> {
        self.skip_spaces();
        match self.peek() {
            Some('[') => self.parse_flow_sequence(),
            Some('{') => self.parse_flow_mapping(),
            _ => {
                let token = self.take_until(&[',', ']', '}']);
                Ok(parse_scalar(token.trim()))
            }
        }
    }

    fn parse_flow_sequence(&mut self) -> Result<Value> {
        self.pos += 1; // '['
        let mut array = Array::new();
        loop {
            self.skip_spaces();
            match self.peek() {
                Some(']') => {
                    self.pos += 1;
                    return Ok(Value::Array(array));
                }
                None => return Err(Error::on_line(ErrorKind::UnexpectedEof, self.line)),
                _ => {}
            }
            array.push(self.parse_value()?);
            self.skip_spaces();
            if self.peek() == Some(',') {
                self.pos += 1;
            }
        }
    }

    fn parse_flow_mapping(&mut self) -> Result<Value> {
        self.pos += 1; // '{'
        let mut object = Object::new();
        loop {
            self.skip_spaces();
            match self.peek() {
                Some('}') => {
                    self.pos += 1;
                    return Ok(Value::Object(object));
                }
                None => return Err(Error::on_line(ErrorKind::UnexpectedEof, self.line)),
                _ => {}
            }
            let key = self.take_until(&[':', ',', '}']).trim().to_string();
            if self.peek() != Some(':') {
                return Err(Error::on_line(ErrorKind::InvalidToken, self.line));
            }
            self.pos += 1;
            let value = self.parse_value()?;
            object.insert(unquote_key(&key), value);
            self.skip_spaces();
            if self.peek() == Some(',') {
                self.pos += 1;
            }
        }
    }

    fn take_until(&mut self, stops: &[char]) -> String {
        let mut out = String::new();
        let mut quote: Option<char> = None;
        while let Some(c) = self.peek() {
            match quote {
                Some(q) => {
                    out.push(c);
                    self.pos += 1;
                    if c == q {
                        quote = None;
                    }
                }
                None => {
                    if stops.contains(&c) {
                        break;
                    }
                    if c == '"' || c == '\'' {
                        quote = Some(c);
                    }
                    out.push(c);
                    self.pos += 1;
                }
            }
        }
        out
    }
}

fn write_mapping(object: &Object, indent: usize, out: &mut String) {
    for key in object.sorted_keys() {
        push_indent(indent, out);
        out.push_str(&key_text(key));
        match &object[key] {
            Value::Object(inner) if !inner.is_empty() => {
                out.push_str(":\n");
                write_mapping(inner, indent + 1, out);
            }
            Value::Array(inner) if !inner.is_empty() => {
                out.push_str(":\n");
                write_sequence(inner, indent + 1, out);
            }
            other => {
                out.push_str(": ");
                out.push_str(&scalar_text(other));
                out.push('\n');
            }
        }
    }
}

fn write_sequence(array: &Array, indent: usize, out: &mut String) {
    for item in array.iter() {
        push_indent(indent, out);
        match item {
            Value::Object(inner) if !inner.is_empty() => {
                let keys = inner.sorted_keys();
                let mut first = true;
                for key in keys {
                    if first {
                        out.push_str("- ");
                        first = false;
                    } else {
                        push_indent(indent + 1, out);
                    }
                    out.push_str(&key_text(key));
                    match &inner[key] {
                        Value::Object(nested) if !nested.is_empty() => {
                            out.push_str(":\n");
                            write_mapping(nested, indent + 2, out);
                        }
                        Value::Array(nested) if !nested.is_empty() => {
                            out.push_str(":\n");
                            write_sequence(nested, indent + 2, out);
                        }
                        other => {
                            out.push_str(": ");
                            out.push_str(&scalar_text(other));
                            out.push('\n');
                        }
                    }
                }
            }
            Value::Array(inner) if !inner.is_empty() => {
                out.push_str("-\n");
                write_sequence(inner, indent + 1, out);
            }
            other => {
                out.push_str("- ");
                out.push_str(&scalar_text(other));
                out.push('\n');
            }
        }
    }
}

fn push_indent(indent: usize, out: &mut String) {
    for _ in 0..indent {
        out.push_str("  ");
    }
}

fn key_text(key: &str) -> String {
    if plain_safe(key) {
        key.to_string()
    } else {
        quote_double(key)
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Int(n) => n.to_string(),
        Value::Float(n) => {
            let s = n.to_string();
            if s.contains('.') || s.contains('e') || s.contains('E') {
                s
            } else {
                format!("{s}.0")
            }
        }
        Value::String(s) => {
            if plain_safe(s) {
                s.clone()
            } else {
                quote_double(s)
            }
        }
        Value::Object(_) => "{}".to_string(),
        Value::Array(_) => "[]".to_string(),
    }
}

/// Whether a string survives as an unquoted plain scalar
fn plain_safe(s: &str) -> bool {
    if s.is_empty()
        || s.trim() != s
        || matches!(
            s,
            "~" | "null" | "Null" | "NULL" | "true" | "True" | "TRUE" | "false" | "False" | "FALSE"
        )
        || value::number_from_literal(s).is_some()
    {
        return false;
    }
    if s.starts_with(['-', '?', '&', '*', '!', '|', '>', '%', '@', '`', '"', '\'', '#']) {
        return false;
    }
    !s.chars().any(|c| {
        matches!(c, ':' | '{' | '}' | '[' | ']' | ',' | '#' | '\n' | '\r' | '\t')
    })
}

fn quote_double(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mapping() -> Result<()> {
        let value = parse("name: Milo\nage: 30\n")?;
        let object = value.as_object().unwrap();
        assert_eq!(object["name"], Value::String("Milo".to_string()));
        assert_eq!(object["age"], Value::Int(30));
        Ok(())
    }

    #[test]
    fn test_parse_nested() -> Result<()> {
        let value = parse("outer:\n  inner: 1\n  other: true\n")?;
        let inner = value.as_object().unwrap()["outer"].as_object().unwrap();
        assert_eq!(inner["inner"], Value::Int(1));
        assert_eq!(inner["other"], Value::Bool(true));
        Ok(())
    }

    #[test]
    fn test_parse_sequences() -> Result<()> {
        let value = parse("items:\n  - 1\n  - 2\nsame:\n- a\n- b\n")?;
        let object = value.as_object().unwrap();
        assert_eq!(object["items"].as_array().unwrap().len(), 2);
        assert_eq!(
            object["same"].as_array().unwrap()[0],
            Value::String("a".to_string())
        );
        Ok(())
    }

    #[test]
    fn test_parse_sequence_of_mappings() -> Result<()> {
        let value = parse("users:\n  - name: a\n    age: 1\n  - name: b\n    age: 2\n")?;
        let users = value.as_object().unwrap()["users"].as_array().unwrap();
        assert_eq!(users.len(), 2);
        let second = users[1].as_object().unwrap();
        assert_eq!(second["name"], Value::String("b".to_string()));
        assert_eq!(second["age"], Value::Int(2));
        Ok(())
    }

    #[test]
    fn test_parse_flow() -> Result<()> {
        let value = parse("list: [1, two, true]\nmap: {a: 1, b: x}\n")?;
        let object = value.as_object().unwrap();
        let list = object["list"].as_array().unwrap();
        assert_eq!(list[0], Value::Int(1));
        assert_eq!(list[1], Value::String("two".to_string()));
        assert_eq!(list[2], Value::Bool(true));
        assert_eq!(object["map"].as_object().unwrap()["b"], Value::String("x".to_string()));
        Ok(())
    }

    #[test]
    fn test_scalar_typing() -> Result<()> {
        let value = parse("a: null\nb: 1.5\nc: \"30\"\nd: 'true'\n")?;
        let object = value.as_object().unwrap();
        assert_eq!(object["a"], Value::Null);
        assert_eq!(object["b"], Value::Float(1.5));
        assert_eq!(object["c"], Value::String("30".to_string()));
        assert_eq!(object["d"], Value::String("true".to_string()));
        Ok(())
    }

    #[test]
    fn test_comments_ignored() -> Result<()> {
        let value = parse("# header\nname: Milo # trailing\n")?;
        assert_eq!(
            value.as_object().unwrap()["name"],
            Value::String("Milo".to_string())
        );
        Ok(())
    }

    #[test]
    fn test_write_sorted_and_quoted() {
        let mut object = Object::new();
        object.insert("zeta", "true");
        object.insert("alpha", 1i64);
        assert_eq!(
            to_string(&Value::Object(object)),
            "alpha: 1\nzeta: \"true\"\n"
        );
    }

    #[test]
    fn test_round_trip() -> Result<()> {
        let mut object = Object::new();
        object.insert("name", "Milo");
        object.insert("age", 30i64);
        let mut tags = Array::new();
        tags.push("x");
        tags.push("y");
        object.insert("tags", tags);
        let original = Value::Object(object);
        let text = to_string(&original);
        assert_eq!(parse(&text)?, original);
        Ok(())
    }

    #[test]
    fn test_bad_indent() {
        assert!(parse("a: 1\n    b: 2\n").is_err());
    }
}
