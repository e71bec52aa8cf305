//! Line-oriented recursive-descent TOON decoder

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Error, ErrorKind, Result};
use crate::scan::split_delimited;
use crate::toon::encode::NUMBER_PATTERN;
use crate::value::{Array, Object, Value};

/// Matches array header lines: `key[N]:`, `[N]{fields}:`, with optional
/// `|` or tab delimiter marker inside the brackets
#[allow(clippy::unwrap_used)]
static HEADER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^[A-Za-z0-9._"]*\[\d+[|\t]?\](?:\{.*\})?:"#).unwrap()
});

/// Decode TOON text into a [`Value`]
pub fn parse(input: &str) -> Result<Value> {
    let lines = collect_lines(input);
    if lines.is_empty() {
        return Ok(Value::Object(Object::new()));
    }
    let mut parser = Parser { lines, idx: 0 };
    if parser
        .lines
        .first()
        .is_some_and(|first| first.text.starts_with('['))
    {
        return parser.parse_header(0);
    }
    if parser.lines.len() == 1 {
        if let Some(first) = parser.lines.first() {
            if !first.text.contains(':') {
                return Ok(parse_primitive_token(&first.text));
            }
        }
    }
    parser.parse_object(0).map(Value::Object)
}

#[derive(Clone)]
struct Line {
    depth: usize,
    text: String,
    number: u32,
}

fn collect_lines(input: &str) -> Vec<Line> {
    let mut out = Vec::new();
    for (i, raw) in input.replace("\r\n", "\n").lines().enumerate() {
        if raw.trim().is_empty() {
            continue;
        }
        let mut depth = 0;
        let mut rest = raw;
        while let Some(stripped) = rest.strip_prefix("  ") {
            depth += 1;
            rest = stripped;
        }
        out.push(Line {
            depth,
            text: raw.trim().to_string(),
            number: u32::try_from(i + 1).unwrap_or(u32::MAX),
        });
    }
    out
}

struct Parser {
    lines: Vec<Line>,
    idx: usize,
}

impl Parser {
    fn current(&self) -> Option<&Line> {
        self.lines.get(self.idx)
    }

    fn parse_object(&mut self, depth: usize) -> Result<Object> {
        let mut result = Object::new();
        while let Some(line) = self.current().cloned() {
            if line.depth < depth || line.text.starts_with('[') {
                break;
            }
            if line.depth > depth {
                return Err(Error::on_line(ErrorKind::UnexpectedIndent, line.number));
            }
            if HEADER_PATTERN.is_match(&line.text) {
                let key = header_key(&line.text);
                let array = self.parse_header(depth)?;
                result.insert(key, array);
                continue;
            }
            let Some((raw_key, rest)) = line.text.split_once(':') else {
                return Err(Error::on_line(
                    ErrorKind::Expected {
                        expected: "key: value".to_string(),
                        found: line.text.clone(),
                    },
                    line.number,
                ));
            };
            let key = unquote_key(raw_key.trim());
            let rest = rest.trim().to_string();
            self.idx += 1;
            if rest.is_empty() {
                let nested = self.parse_object(depth + 1)?;
                result.insert(key, Value::Object(nested));
            } else {
                result.insert(key, parse_primitive_token(&rest));
            }
        }
        Ok(result)
    }

    fn parse_header(&mut self, depth: usize) -> Result<Value> {
        let line = self
            .current()
            .cloned()
            .ok_or_else(|| Error::semantic(ErrorKind::UnexpectedEof))?;
        self.idx += 1;
        self.parse_header_line(&line.text, line.number, depth)
    }

    fn parse_header_line(&mut self, text: &str, number: u32, depth: usize) -> Result<Value> {
        let (before_colon, inline) = text.split_once(':').unwrap_or((text, ""));
        let inline = inline.trim();

        let bracket_start = before_colon
            .find('[')
            .ok_or_else(|| Error::on_line(ErrorKind::InvalidHeader, number))?;
        let bracket_part = before_colon.get(bracket_start..).unwrap_or("");
        let (bracket, brace) = match bracket_part.find('{') {
            Some(i) => (
                bracket_part.get(..i).unwrap_or(""),
                bracket_part.get(i..).unwrap_or(""),
            ),
            None => (bracket_part, ""),
        };

        let length: usize = bracket
            .trim_matches(['[', ']', '|', '\t'])
            .parse()
            .map_err(|_| Error::on_line(ErrorKind::InvalidHeader, number))?;

        let delimiter = if before_colon.contains('\t') {
            '\t'
        } else if before_colon.contains('|') {
            '|'
        } else {
            ','
        };

        // Inline scalar array: key[N]: v1,v2
        if !inline.is_empty() {
            let array: Array = split_delimited(inline, delimiter)
                .iter()
                .map(|v| parse_primitive_token(v))
                .collect();
            return Ok(Value::Array(array));
        }

        // Tabular branch: one delimited row per element
        if !brace.is_empty() {
            let field_list = brace.trim_matches(['{', '}']);
            let fields: Vec<String> = split_delimited(field_list, delimiter)
                .iter()
                .map(|f| unquote_key(f))
                .collect();
            let mut array = Array::with_capacity(length);
            let mut row_index = 0;
            while row_index < length {
                let Some(row_line) = self.current().cloned() else {
                    break;
                };
                if row_line.depth != depth + 1 {
                    return Err(Error::on_line(ErrorKind::UnexpectedIndent, row_line.number));
                }
                let values = split_delimited(&row_line.text, delimiter);
                if values.len() != fields.len() {
                    return Err(Error::on_line(
                        ErrorKind::RowWidthMismatch {
                            expected: fields.len(),
                            found: values.len(),
                        },
                        row_line.number,
                    ));
                }
                let mut row = Object::with_capacity(fields.len());
                for (field, value) in fields.iter().zip(values.iter()) {
                    row.insert(field.clone(), parse_primitive_token(value));
                }
                array.push(Value::Object(row));
                self.idx += 1;
                row_index += 1;
            }
            return Ok(Value::Array(array));
        }

        // List fallback: `- ` entries one level deeper
        let mut items = Array::with_capacity(length);
        while let Some(line) = self.current().cloned() {
            if line.depth < depth + 1 || !line.text.starts_with('-') {
                break;
            }
            if line.depth > depth + 1 {
                return Err(Error::on_line(ErrorKind::UnexpectedIndent, line.number));
            }
            let content = line
                .text
                .strip_prefix('-')
                .unwrap_or(&line.text)
                .trim()
                .to_string();
            self.idx += 1;
            if content.is_empty() {
                items.push(Value::Object(Object::new()));
                continue;
            }
            if HEADER_PATTERN.is_match(&content) {
                let key = header_key(&content);
                let value = self.parse_header_line(&content, line.number, depth + 1)?;
                if key.is_empty() {
                    items.push(value);
                } else {
                    // Keyed header opens a list object; its remaining
                    // fields sit two levels below the array header
                    let mut object = Object::new();
                    object.insert(key, value);
                    if self.current().is_some_and(|next| next.depth == depth + 2) {
                        let more = self.parse_object(depth + 2)?;
                        for (k, v) in more {
                            object.insert(k, v);
                        }
                    }
                    items.push(Value::Object(object));
                }
                continue;
            }
            if let Some((raw_key, rest)) = content.split_once(':') {
                let key = unquote_key(raw_key.trim());
                let rest = rest.trim();
                let mut object = Object::new();
                if rest.is_empty() {
                    let nested = self.parse_object(depth + 2)?;
                    object.insert(key, Value::Object(nested));
                } else {
                    object.insert(key, parse_primitive_token(rest));
                    // Remaining fields of the same list object sit two
                    // levels below the array header
                    if self.current().is_some_and(|next| next.depth == depth + 2) {
                        let more = self.parse_object(depth + 2)?;
                        for (k, v) in more {
                            object.insert(k, v);
                        }
                    }
                }
                items.push(Value::Object(object));
                continue;
            }
            items.push(parse_primitive_token(&content));
        }
        Ok(Value::Array(items))
    }
}

fn header_key(text: &str) -> String {
    let end = text.find('[').unwrap_or(text.len());
    unquote_key(text.get(..end).unwrap_or("").trim())
}

fn unquote_key(raw: &str) -> String {
    match parse_primitive_token(raw) {
        Value::String(s) => s,
        _ => raw.to_string(),
    }
}

/// Scalar token grammar: quoted strings, `true`/`false`/`null`, numbers,
/// everything else is a literal string
pub(crate) fn parse_primitive_token(token: &str) -> Value {
    let token = token.trim();
    if token.is_empty() {
        return Value::String(String::new());
    }
    if token.len() >= 2 && token.starts_with('"') && token.ends_with('"') {
        let inner = token.get(1..token.len() - 1).unwrap_or("");
        return Value::String(unescape(inner));
    }
    match token {
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        "null" => return Value::Null,
        _ => {}
    }
    if NUMBER_PATTERN.is_match(token) {
        if token.contains(['.', 'e', 'E']) {
            if let Ok(f) = token.parse::<f64>() {
                return Value::Float(f);
            }
        } else if let Ok(n) = token.parse::<i64>() {
            return Value::Int(n);
        }
    }
    Value::String(token.to_string())
}

fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
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
            Some(other) => out.push(other),
            None => {}
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::toon::encode::to_string;

    fn json(input: &str) -> Value {
        crate::json::parser::parse(input).unwrap()
    }

    #[test]
    fn test_simple_object() -> Result<()> {
        let value = parse("age: 30\nname: Alice")?;
        assert_eq!(value, json(r#"{"age":30,"name":"Alice"}"#));
        Ok(())
    }

    #[test]
    fn test_nested_object() -> Result<()> {
        let value = parse("outer:\n  a: 1\n  b: true")?;
        assert_eq!(value, json(r#"{"outer":{"a":1,"b":true}}"#));
        Ok(())
    }

    #[test]
    fn test_tabular_array() -> Result<()> {
        let value = parse("users[2]{id,name}:\n  1,a\n  2,b")?;
        assert_eq!(
            value,
            json(r#"{"users":[{"id":1,"name":"a"},{"id":2,"name":"b"}]}"#)
        );
        Ok(())
    }

    #[test]
    fn test_flat_scalar_array() -> Result<()> {
        assert_eq!(parse("nums[3]: 1,2,3")?, json(r#"{"nums":[1,2,3]}"#));
        Ok(())
    }

    #[test]
    fn test_pipe_and_tab_delimiters() -> Result<()> {
        assert_eq!(parse("nums[2|]: 1|2")?, json(r#"{"nums":[1,2]}"#));
        assert_eq!(
            parse("rows[1\t]{a\tb}:\n  1\t2")?,
            json(r#"{"rows":[{"a":1,"b":2}]}"#)
        );
        Ok(())
    }

    #[test]
    fn test_quoted_tokens() -> Result<()> {
        let value = parse("v: \"true\"\nw: \"12\"\nx: \"a\\nb\"")?;
        assert_eq!(value, json(r#"{"v":"true","w":"12","x":"a\nb"}"#));
        Ok(())
    }

    #[test]
    fn test_list_fallback() -> Result<()> {
        let value = parse("items[2]:\n  - 1\n  - a: 2")?;
        assert_eq!(value, json(r#"{"items":[1,{"a":2}]}"#));
        Ok(())
    }

    #[test]
    fn test_multi_key_list_objects() -> Result<()> {
        let value = parse("items[2]:\n  - a: 1\n    b: 2\n  - a: 3\n    b:\n      c: 4")?;
        assert_eq!(value, json(r#"{"items":[{"a":1,"b":2},{"a":3,"b":{"c":4}}]}"#));
        Ok(())
    }

    #[test]
    fn test_list_object_with_array_field() -> Result<()> {
        let value = parse("items[1]:\n  - nums[2]: 1,2\n    name: x")?;
        assert_eq!(value, json(r#"{"items":[{"nums":[1,2],"name":"x"}]}"#));
        Ok(())
    }

    #[test]
    fn test_list_object_array_field_round_trip() -> Result<()> {
        let original = json(r#"{"items":[{"b":3,"nums":[1,2]}]}"#);
        assert_eq!(parse(&to_string(&original))?, original);
        Ok(())
    }

    #[test]
    fn test_top_level_forms() -> Result<()> {
        assert_eq!(parse("[2]: 1,2")?, json("[1,2]"));
        assert_eq!(parse("hello")?, Value::String("hello".to_string()));
        assert_eq!(parse("")?, Value::Object(Object::new()));
        Ok(())
    }

    #[test]
    fn test_row_width_mismatch() {
        let result = parse("users[2]{id,name}:\n  1,a\n  2,b,c");
        assert!(
            matches!(result, Err(err) if matches!(err.kind(), ErrorKind::RowWidthMismatch { expected: 2, found: 3 }))
        );
    }

    #[test]
    fn test_invalid_header_count() {
        assert!(parse("items[x]: 1,2").is_err());
    }

    #[test]
    fn test_indent_jump_is_error() {
        assert!(parse("a: 1\n    b: 2").is_err());
    }

    #[test]
    fn test_tabular_round_trip() -> Result<()> {
        let original = json(r#"{"users":[{"id":1,"name":"a"},{"id":2,"name":"b"}],"n":3}"#);
        assert_eq!(parse(&to_string(&original))?, original);
        Ok(())
    }

    #[test]
    fn test_list_round_trip() -> Result<()> {
        let original = json(r#"{"items":[{"a":1,"b":2},{"a":3,"b":{"c":4}},5]}"#);
        assert_eq!(parse(&to_string(&original))?, original);
        Ok(())
    }
}
