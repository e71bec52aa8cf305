//! Struct-text parser

use crate::error::{Error, ErrorKind, Result};
use crate::structs::names::lower_camel;
use crate::structs::{StructDefinition, StructField};

/// Parse struct declarations out of a source fragment
///
/// A `package` clause is optional, non-struct type declarations are skipped.
/// Zero declarations is an error, as is empty input.
pub fn parse(source: &str) -> Result<Vec<StructDefinition>> {
    if source.trim().is_empty() {
        return Err(Error::semantic(ErrorKind::EmptyInput));
    }

    let mut defs = Vec::new();
    let mut lines = LineReader::new(&normalize(source));
    let mut pending_doc: Vec<String> = Vec::new();

    while let Some((line, number)) = lines.next_line() {
        let text = line.trim();
        if text.is_empty() {
            pending_doc.clear();
            continue;
        }
        if let Some(comment) = text.strip_prefix("//") {
            pending_doc.push(comment.trim().to_string());
            continue;
        }
        if text.starts_with("package ") {
            pending_doc.clear();
            continue;
        }
        if let Some(rest) = text.strip_prefix("type ") {
            pending_doc.clear();
            let mut parts = rest.split_whitespace();
            let name = parts
                .next()
                .ok_or_else(|| Error::on_line(ErrorKind::InvalidToken, number))?;
            let tail: Vec<&str> = parts.collect();
            if tail.first() == Some(&"struct") && tail.get(1) == Some(&"{") {
                defs.push(parse_body(name, &mut lines)?);
            } else if tail.contains(&"{") {
                // interface or other braced declaration, skip its body
                skip_block(&mut lines, number)?;
            }
            // single-line alias declarations are skipped
            continue;
        }
        // stray content outside a declaration
        return Err(Error::on_line(ErrorKind::InvalidToken, number));
    }

    if defs.is_empty() {
        return Err(Error::semantic(ErrorKind::NoStructDefinition));
    }
    Ok(defs)
}

/// Break one-line declarations apart so the reader sees one item per line.
/// Backtick tags and string literals pass through untouched; `{}` stays
/// intact so `interface{}` and `struct{}` types survive.
fn normalize(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut chars = source.chars().peekable();
    let mut quote: Option<char> = None;
    while let Some(c) = chars.next() {
        match quote {
            Some(q) => {
                out.push(c);
                if c == q {
                    quote = None;
                }
            }
            None => match c {
                '`' | '"' => {
                    quote = Some(c);
                    out.push(c);
                }
                '{' => {
                    if chars.peek() == Some(&'}') {
                        chars.next();
                        out.push_str("{}");
                    } else {
                        out.push_str(" {\n");
                    }
                }
                '}' => out.push_str("\n}\n"),
                ';' => out.push('\n'),
                c => out.push(c),
            },
        }
    }
    out
}

struct LineReader {
    lines: Vec<String>,
    idx: usize,
}

impl LineReader {
    fn new(source: &str) -> Self {
        Self {
            lines: source.lines().map(str::to_string).collect(),
            idx: 0,
        }
    }

    fn next_line(&mut self) -> Option<(String, u32)> {
        let line = self.lines.get(self.idx)?.clone();
        self.idx += 1;
        Some((line, u32::try_from(self.idx).unwrap_or(u32::MAX)))
    }
}

fn skip_block(lines: &mut LineReader, start: u32) -> Result<()> {
    let mut depth = 1;
    while let Some((line, _)) = lines.next_line() {
        let text = line.trim();
        if text.ends_with('{') {
            depth += 1;
        } else if text == "}" {
            depth -= 1;
            if depth == 0 {
                return Ok(());
            }
        }
    }
    Err(Error::on_line(ErrorKind::UnexpectedEof, start))
}

fn parse_body(name: &str, lines: &mut LineReader) -> Result<StructDefinition> {
    let mut def = StructDefinition {
        name: name.to_string(),
        fields: Vec::new(),
    };
    let mut pending_doc: Vec<String> = Vec::new();

    while let Some((line, number)) = lines.next_line() {
        let text = line.trim();
        if text.is_empty() {
            pending_doc.clear();
            continue;
        }
        if text == "}" {
            return Ok(def);
        }
        if let Some(comment) = text.strip_prefix("//") {
            pending_doc.push(comment.trim().to_string());
            continue;
        }
        let fields = parse_field_line(text, &pending_doc, number)?;
        def.fields.extend(fields);
        pending_doc.clear();
    }
    Err(Error::semantic(ErrorKind::UnexpectedEof))
}

fn parse_field_line(text: &str, pending_doc: &[String], number: u32) -> Result<Vec<StructField>> {
    let (text, trailing) = split_trailing_comment(text);
    let (text, raw_tag) = split_tag(text, number)?;

    let doc = if pending_doc.is_empty() {
        trailing.unwrap_or_default()
    } else {
        pending_doc.join(" ")
    };

    let tokens: Vec<&str> = text.split_whitespace().collect();
    if tokens.is_empty() {
        return Err(Error::on_line(ErrorKind::InvalidToken, number));
    }

    // One token and no names list means an embedded field
    if tokens.len() == 1 {
        let type_expr = tokens[0];
        let name = embedded_name(type_expr);
        let external = external_name(&raw_tag, &name);
        return Ok(vec![StructField {
            name,
            external_name: external,
            type_expr: type_expr.to_string(),
            doc,
            raw_tag,
        }]);
    }

    // Leading comma-joined names, everything after is the type expression
    let mut names = Vec::new();
    let mut type_start = tokens.len();
    for (i, token) in tokens.iter().enumerate() {
        if let Some(stripped) = token.strip_suffix(',') {
            names.push(stripped);
        } else {
            names.push(token);
            type_start = i + 1;
            break;
        }
    }
    if type_start >= tokens.len() {
        return Err(Error::on_line(ErrorKind::InvalidToken, number));
    }
    let type_expr = tokens
        .get(type_start..)
        .unwrap_or(&[])
        .join(" ");

    Ok(names
        .into_iter()
        .map(|name| StructField {
            name: name.to_string(),
            external_name: external_name(&raw_tag, name),
            type_expr: type_expr.clone(),
            doc: doc.clone(),
            raw_tag: raw_tag.clone(),
        })
        .collect())
}

/// Resolve the JSON-facing name: explicit tag, `-` suppression, else lowerCamel
fn external_name(raw_tag: &str, field_name: &str) -> String {
    if let Some(tag_value) = json_tag_value(raw_tag) {
        if tag_value == "-" {
            return String::new();
        }
        if !tag_value.is_empty() {
            return tag_value;
        }
    }
    lower_camel(field_name)
}

fn json_tag_value(raw_tag: &str) -> Option<String> {
    for part in raw_tag.split(' ') {
        if let Some(rest) = part.strip_prefix("json:\"") {
            let value = rest.strip_suffix('"').unwrap_or(rest);
            let first = value.split(',').next().unwrap_or("");
            return Some(first.to_string());
        }
    }
    None
}

fn embedded_name(type_expr: &str) -> String {
    let base = type_expr.trim_start_matches('*');
    base.rsplit('.').next().unwrap_or(base).to_string()
}

fn split_trailing_comment(text: &str) -> (&str, Option<String>) {
    let mut in_tag = false;
    let bytes = text.as_bytes();
    for (i, &b) in bytes.iter().enumerate() {
        match b {
            b'`' => in_tag = !in_tag,
            b'/' if !in_tag && bytes.get(i + 1) == Some(&b'/') => {
                let before = text.get(..i).unwrap_or(text).trim_end();
                let comment = text.get(i + 2..).unwrap_or("").trim().to_string();
                return (before, Some(comment));
            }
            _ => {}
        }
    }
    (text, None)
}

fn split_tag(text: &str, number: u32) -> Result<(&str, String)> {
    let Some(open) = text.find('`') else {
        return Ok((text, String::new()));
    };
    let after = text.get(open + 1..).unwrap_or("");
    let Some(close) = after.find('`') else {
        return Err(Error::on_line(ErrorKind::UnterminatedString, number));
    };
    let tag = after.get(..close).unwrap_or("").to_string();
    Ok((text.get(..open).unwrap_or("").trim_end(), tag))
}
