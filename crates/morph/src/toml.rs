//! TOML parser and writer
//!
//! Key/value pairs with dotted and quoted keys, `[table]` and `[[array of
//! table]]` headers, inline arrays and tables, basic and literal strings.
//! Datetimes and multiline strings are outside the conversion subset.

use crate::error::{Error, ErrorKind, Result};
use crate::value::{self, Array, Object, Value};

/// Parse a TOML document, root is always an object
pub fn parse(input: &str) -> Result<Value> {
    let mut root = Object::new();
    let mut table_path: Vec<String> = Vec::new();

    let mut lines = LogicalLines::new(input);
    while let Some((line, number)) = lines.next_line() {
        let text = line.trim();
        if text.is_empty() || text.starts_with('#') {
            continue;
        }
        if let Some(header) = text.strip_prefix("[[") {
            let Some(inner) = header.strip_suffix("]]") else {
                return Err(Error::on_line(ErrorKind::InvalidHeader, number));
            };
            table_path = parse_key_path(inner, number)?;
            push_table_element(&mut root, &table_path, number)?;
        } else if let Some(header) = text.strip_prefix('[') {
            let Some(inner) = header.strip_suffix(']') else {
                return Err(Error::on_line(ErrorKind::InvalidHeader, number));
            };
            table_path = parse_key_path(inner, number)?;
            ensure_table(&mut root, &table_path, number)?;
        } else {
            let (key_part, value_part) = split_assignment(text, number)?;
            let mut path = table_path.clone();
            path.extend(parse_key_path(key_part, number)?);
            let value = parse_value_text(value_part, number)?;
            insert_at_path(&mut root, &path, value, number)?;
        }
    }
    Ok(Value::Object(root))
}

/// Render a [`Value`] as TOML; the root must be an object
pub fn to_string(value: &Value) -> Result<String> {
    let Value::Object(root) = value else {
        return Err(Error::semantic(ErrorKind::InvalidRoot { expected: "an object" }));
    };
    let mut out = String::new();
    write_table(root, &[], &mut out);
    Ok(out)
}

/// Joins physical lines while brackets are open, so arrays may span lines
struct LogicalLines<'a> {
    lines: std::str::Lines<'a>,
    number: u32,
}

impl<'a> LogicalLines<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            lines: input.lines(),
            number: 0,
        }
    }

    fn next_line(&mut self) -> Option<(String, u32)> {
        let mut joined = String::new();
        let start;
        loop {
            let raw = self.lines.next()?;
            self.number += 1;
            if joined.is_empty() {
                joined.push_str(raw);
            } else {
                joined.push(' ');
                joined.push_str(raw.trim());
            }
            if bracket_depth(&joined) == 0 {
                start = self.number;
                break;
            }
        }
        Some((joined, start))
    }
}

fn bracket_depth(text: &str) -> i32 {
    let mut depth = 0;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    for c in text.chars() {
        match quote {
            Some(q) => {
                if escaped {
                    escaped = false;
                } else if c == '\\' && q == '"' {
                    escaped = true;
                } else if c == q {
                    quote = None;
                }
            }
            None => match c {
                '"' | '\'' => quote = Some(c),
                '[' | '{' => depth += 1,
                ']' | '}' => depth -= 1,
                '#' => break,
                _ => {}
            },
        }
    }
    depth.max(0)
}

fn split_assignment(text: &str, number: u32) -> Result<(&str, &str)> {
    let mut quote: Option<char> = None;
    for (i, c) in text.char_indices() {
        match quote {
            Some(q) => {
                if c == q {
                    quote = None;
                }
            }
            None => match c {
                '"' | '\'' => quote = Some(c),
                '=' => {
                    let key = text.get(..i).unwrap_or("").trim();
                    let value = text.get(i + 1..).unwrap_or("").trim();
                    if key.is_empty() || value.is_empty() {
                        return Err(Error::on_line(ErrorKind::InvalidToken, number));
                    }
                    return Ok((key, value));
                }
                _ => {}
            },
        }
    }
    Err(Error::on_line(
        ErrorKind::Expected {
            expected: "key = value".to_string(),
            found: text.to_string(),
        },
        number,
    ))
}

/// Dotted key into segments, honoring quoted segments
fn parse_key_path(text: &str, number: u32) -> Result<Vec<String>> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    for c in text.trim().chars() {
        match quote {
            Some(q) => {
                if c == q {
                    quote = None;
                } else {
                    current.push(c);
                }
            }
            None => match c {
                '"' | '\'' => quote = Some(c),
                '.' => {
                    segments.push(std::mem::take(&mut current).trim().to_string());
                }
                c => current.push(c),
            },
        }
    }
    segments.push(current.trim().to_string());
    if segments.iter().any(String::is_empty) {
        return Err(Error::on_line(ErrorKind::InvalidToken, number));
    }
    Ok(segments)
}

fn descend<'v>(root: &'v mut Object, path: &[String], number: u32) -> Result<&'v mut Object> {
    let mut current = root;
    for segment in path {
        if !current.contains_key(segment) {
            current.insert(segment.clone(), Value::Object(Object::new()));
        }
        let next = current
            .get_mut(segment)
            .ok_or_else(|| Error::on_line(ErrorKind::InvalidToken, number))?;
        current = match next {
            Value::Object(object) => object,
            Value::Array(array) => match array.0.last_mut() {
                Some(Value::Object(object)) => object,
                _ => return Err(Error::on_line(ErrorKind::InvalidToken, number)),
            },
            _ => return Err(Error::on_line(ErrorKind::InvalidToken, number)),
        };
    }
    Ok(current)
}

fn ensure_table(root: &mut Object, path: &[String], number: u32) -> Result<()> {
    descend(root, path, number).map(|_| ())
}

fn push_table_element(root: &mut Object, path: &[String], number: u32) -> Result<()> {
    let (last, parents) = path
        .split_last()
        .ok_or_else(|| Error::on_line(ErrorKind::InvalidHeader, number))?;
    let parent = descend(root, parents, number)?;
    match parent.get_mut(last) {
        None => {
            let mut array = Array::new();
            array.push(Value::Object(Object::new()));
            parent.insert(last.clone(), Value::Array(array));
        }
        Some(Value::Array(array)) => array.push(Value::Object(Object::new())),
        Some(_) => return Err(Error::on_line(ErrorKind::InvalidToken, number)),
    }
    Ok(())
}

fn insert_at_path(root: &mut Object, path: &[String], value: Value, number: u32) -> Result<()> {
    let (last, parents) = path
        .split_last()
        .ok_or_else(|| Error::on_line(ErrorKind::InvalidToken, number))?;
    let parent = descend(root, parents, number)?;
    parent.insert(last.clone(), value);
    Ok(())
}

fn parse_value_text(text: &str, number: u32) -> Result<Value> {
    let mut parser = ValueParser {
        chars: text.chars().collect(),
        pos: 0,
        number,
    };
    let value = parser.parse_value()?;
    parser.skip_spaces();
    if parser.pos < parser.chars.len() && parser.peek() != Some('#') {
        return Err(Error::on_line(ErrorKind::InvalidToken, number));
    }
    Ok(value)
}

struct ValueParser {
    chars: Vec<char>,
    pos: usize,
    number: u32,
}

impl ValueParser {
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
            Some('[') => self.parse_array(),
            Some('{') => self.parse_inline_table(),
            Some('"') => self.parse_basic_string(),
            Some('\'') => self.parse_literal_string(),
            Some(_) => self.parse_bare(),
            None => Err(Error::on_line(ErrorKind::UnexpectedEof, self.number)),
        }
    }

    fn parse_array(&mut self) -> Result<Value> {
        self.pos += 1; // '['
        let mut array = Array::new();
        loop {
            self.skip_spaces();
            match self.peek() {
                Some(']') => {
                    self.pos += 1;
                    return Ok(Value::Array(array));
                }
                None => return Err(Error::on_line(ErrorKind::UnexpectedEof, self.number)),
                _ => {}
            }
            array.push(self.parse_value()?);
            self.skip_spaces();
            if self.peek() == Some(',') {
                self.pos += 1;
            }
        }
    }

    fn parse_inline_table(&mut self) -> Result<Value> {
        self.pos += 1; // '{'
        let mut object = Object::new();
        loop {
            self.skip_spaces();
            match self.peek() {
                Some('}') => {
                    self.pos += 1;
                    return Ok(Value::Object(object));
                }
                None => return Err(Error::on_line(ErrorKind::UnexpectedEof, self.number)),
                _ => {}
            }
            let mut key = String::new();
            while let Some(c) = self.peek() {
                if c == '=' {
                    break;
                }
                key.push(c);
                self.pos += 1;
            }
            if self.peek() != Some('=') {
                return Err(Error::on_line(ErrorKind::InvalidToken, self.number));
            }
            self.pos += 1;
            let key = key.trim().trim_matches('"').trim_matches('\'').to_string();
            let value = self.parse_value()?;
            object.insert(key, value);
            self.skip_spaces();
            if self.peek() == Some(',') {
                self.pos += 1;
            }
        }
    }

    fn parse_basic_string(&mut self) -> Result<Value> {
        self.pos += 1; // '"'
        let mut out = String::new();
        loop {
            match self.peek() {
                None => return Err(Error::on_line(ErrorKind::UnterminatedString, self.number)),
                Some('"') => {
                    self.pos += 1;
                    return Ok(Value::String(out));
                }
                Some('\\') => {
                    self.pos += 1;
                    match self.peek() {
                        Some('n') => out.push('\n'),
                        Some('r') => out.push('\r'),
                        Some('t') => out.push('\t'),
                        Some('"') => out.push('"'),
                        Some('\\') => out.push('\\'),
                        Some('u') => {
                            self.pos += 1;
                            let ch = self.parse_unicode(4)?;
                            out.push(ch);
                            continue;
                        }
                        Some('U') => {
                            self.pos += 1;
                            let ch = self.parse_unicode(8)?;
                            out.push(ch);
                            continue;
                        }
                        _ => {
                            return Err(Error::on_line(
                                ErrorKind::InvalidEscapeSequence,
                                self.number,
                            ));
                        }
                    }
                    self.pos += 1;
                }
                Some(c) => {
                    out.push(c);
                    self.pos += 1;
                }
            }
        }
    }

    fn parse_unicode(&mut self, digits: usize) -> Result<char> {
        let mut code: u32 = 0;
        for _ in 0..digits {
            let digit = self
                .peek()
                .and_then(|c| c.to_digit(16))
                .ok_or_else(|| Error::on_line(ErrorKind::InvalidUnicodeEscape, self.number))?;
            code = code * 16 + digit;
            self.pos += 1;
        }
        char::from_u32(code)
            .ok_or_else(|| Error::on_line(ErrorKind::InvalidUnicodeEscape, self.number))
    }

    fn parse_literal_string(&mut self) -> Result<Value> {
        self.pos += 1; // '\''
        let mut out = String::new();
        loop {
            match self.peek() {
                None => return Err(Error::on_line(ErrorKind::UnterminatedString, self.number)),
                Some('\'') => {
                    self.pos += 1;
                    return Ok(Value::String(out));
                }
                Some(c) => {
                    out.push(c);
                    self.pos += 1;
                }
            }
        }
    }

    fn parse_bare(&mut self) -> Result<Value> {
        let mut token = String::new();
        while let Some(c) = self.peek() {
            if matches!(c, ',' | ']' | '}' | ' ' | '\t' | '#') {
                break;
            }
            token.push(c);
            self.pos += 1;
        }
        match token.as_str() {
            "true" => return Ok(Value::Bool(true)),
            "false" => return Ok(Value::Bool(false)),
            _ => {}
        }
        let normalized: String = token
            .strip_prefix('+')
            .unwrap_or(&token)
            .chars()
            .filter(|&c| c != '_')
            .collect();
        value::number_from_literal(&normalized)
            .ok_or_else(|| Error::on_line(ErrorKind::InvalidNumber, self.number))
    }
}

fn write_table(object: &Object, path: &[String], out: &mut String) {
    let keys = object.sorted_keys();

    // Scalars and plain arrays first, then child tables
    for key in &keys {
        let value = &object[*key];
        if is_table(value) || is_table_array(value) {
            continue;
        }
        out.push_str(&key_text(key));
        out.push_str(" = ");
        out.push_str(&inline_text(value));
        out.push('\n');
    }

    for key in &keys {
        let value = &object[*key];
        let mut child_path = path.to_vec();
        child_path.push((*key).to_string());
        if let Value::Object(inner) = value {
            if !out.is_empty() {
                out.push('\n');
            }
            out.push_str(&format!("[{}]\n", path_text(&child_path)));
            write_table(inner, &child_path, out);
        } else if is_table_array(value) {
            if let Value::Array(array) = value {
                for item in array.iter() {
                    if let Value::Object(inner) = item {
                        if !out.is_empty() {
                            out.push('\n');
                        }
                        out.push_str(&format!("[[{}]]\n", path_text(&child_path)));
                        write_table(inner, &child_path, out);
                    }
                }
            }
        }
    }
}

fn is_table(value: &Value) -> bool {
    matches!(value, Value::Object(_))
}

fn is_table_array(value: &Value) -> bool {
    match value {
        Value::Array(array) if !array.is_empty() => {
            array.iter().all(|v| matches!(v, Value::Object(_)))
        }
        _ => false,
    }
}

fn inline_text(value: &Value) -> String {
    match value {
        Value::Null => "\"\"".to_string(), // TOML has no null
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
        Value::String(s) => quote_basic(s),
        Value::Array(array) => {
            let items: Vec<String> = array.iter().map(inline_text).collect();
            format!("[{}]", items.join(", "))
        }
        Value::Object(object) => {
            let pairs: Vec<String> = object
                .sorted_keys()
                .into_iter()
                .map(|k| format!("{} = {}", key_text(k), inline_text(&object[k])))
                .collect();
            format!("{{ {} }}", pairs.join(", "))
        }
    }
}

fn key_text(key: &str) -> String {
    let bare = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if bare {
        key.to_string()
    } else {
        quote_basic(key)
    }
}

fn path_text(path: &[String]) -> String {
    path.iter()
        .map(|s| key_text(s))
        .collect::<Vec<_>>()
        .join(".")
}

fn quote_basic(s: &str) -> String {
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
    fn test_parse_pairs() -> Result<()> {
        let value = parse("name = \"Milo\"\nage = 30\nratio = 1.5\nok = true\n")?;
        let object = value.as_object().unwrap();
        assert_eq!(object["name"], Value::String("Milo".to_string()));
        assert_eq!(object["age"], Value::Int(30));
        assert_eq!(object["ratio"], Value::Float(1.5));
        assert_eq!(object["ok"], Value::Bool(true));
        Ok(())
    }

    #[test]
    fn test_parse_tables() -> Result<()> {
        let value = parse("[server]\nhost = \"a\"\n\n[server.limits]\nmax = 10\n")?;
        let server = value.as_object().unwrap()["server"].as_object().unwrap();
        assert_eq!(server["host"], Value::String("a".to_string()));
        assert_eq!(
            server["limits"].as_object().unwrap()["max"],
            Value::Int(10)
        );
        Ok(())
    }

    #[test]
    fn test_parse_array_of_tables() -> Result<()> {
        let value = parse("[[bin]]\nname = \"a\"\n\n[[bin]]\nname = \"b\"\n")?;
        let bins = value.as_object().unwrap()["bin"].as_array().unwrap();
        assert_eq!(bins.len(), 2);
        assert_eq!(
            bins[1].as_object().unwrap()["name"],
            Value::String("b".to_string())
        );
        Ok(())
    }

    #[test]
    fn test_parse_inline_and_dotted() -> Result<()> {
        let value = parse("point = { x = 1, y = 2 }\na.b = \"c\"\n")?;
        let object = value.as_object().unwrap();
        assert_eq!(object["point"].as_object().unwrap()["y"], Value::Int(2));
        assert_eq!(
            object["a"].as_object().unwrap()["b"],
            Value::String("c".to_string())
        );
        Ok(())
    }

    #[test]
    fn test_parse_multiline_array() -> Result<()> {
        let value = parse("items = [\n  1,\n  2,\n]\n")?;
        assert_eq!(value.as_object().unwrap()["items"].as_array().unwrap().len(), 2);
        Ok(())
    }

    #[test]
    fn test_write_tables() -> Result<()> {
        let value = parse("title = \"t\"\n[owner]\nname = \"o\"\n")?;
        let text = to_string(&value)?;
        assert_eq!(text, "title = \"t\"\n\n[owner]\nname = \"o\"\n");
        Ok(())
    }

    #[test]
    fn test_write_rejects_non_object_root() {
        let result = to_string(&Value::Int(1));
        assert!(
            matches!(result, Err(err) if matches!(err.kind(), ErrorKind::InvalidRoot { .. }))
        );
    }

    #[test]
    fn test_round_trip() -> Result<()> {
        let input = "flag = true\nnums = [1, 2, 3]\n\n[nested]\nkey = \"v\"\n";
        let value = parse(input)?;
        assert_eq!(to_string(&value)?, input);
        Ok(())
    }

    #[test]
    fn test_bare_string_rejected() {
        assert!(parse("a = oops\n").is_err());
    }
}
