//! GraphQL schema language projection
//!
//! Maps struct definitions to and from `type Name { field: Type }` text.
//! Routing between struct-text and GraphQL is direct, bypassing the JSON
//! hub, because field names and integer types would be lost in a value
//! round trip.

use crate::error::{Error, ErrorKind, Result};
use crate::structs::names::export_name;
use crate::structs::{StructDefinition, StructField};

/// Render definitions as GraphQL type declarations
pub fn to_string(defs: &[StructDefinition]) -> String {
    let mut out = String::new();
    for (i, def) in defs.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(&format!("type {} {{\n", def.name));
        for field in &def.fields {
            if field.external_name.is_empty() {
                continue;
            }
            out.push_str(&format!(
                "  {}: {}\n",
                field.external_name,
                graphql_type(&field.type_expr)
            ));
        }
        out.push_str("}\n");
    }
    out
}

/// Parse GraphQL type declarations into struct definitions
pub fn parse(input: &str) -> Result<Vec<StructDefinition>> {
    if input.trim().is_empty() {
        return Err(Error::semantic(ErrorKind::EmptyInput));
    }
    let mut defs = Vec::new();
    let mut tokens = Tokens::new(input);

    while let Some(token) = tokens.next_token() {
        if token != "type" {
            // interfaces, enums, comments already stripped; skip other
            // declarations up to their body
            if tokens.skip_to_body().is_err() {
                break;
            }
            tokens.skip_body()?;
            continue;
        }
        let name = tokens
            .next_token()
            .ok_or_else(|| Error::on_line(ErrorKind::UnexpectedEof, tokens.line))?;
        tokens.expect("{")?;
        let mut fields = Vec::new();
        loop {
            let token = tokens
                .next_token()
                .ok_or_else(|| Error::on_line(ErrorKind::UnexpectedEof, tokens.line))?;
            if token == "}" {
                break;
            }
            let field_name = token.trim_end_matches(':').to_string();
            let type_token = if token.ends_with(':') {
                tokens
                    .next_token()
                    .ok_or_else(|| Error::on_line(ErrorKind::UnexpectedEof, tokens.line))?
            } else {
                tokens.expect(":")?;
                tokens
                    .next_token()
                    .ok_or_else(|| Error::on_line(ErrorKind::UnexpectedEof, tokens.line))?
            };
            let internal = export_name(&field_name);
            fields.push(StructField {
                name: internal,
                external_name: field_name.clone(),
                type_expr: struct_type(&type_token),
                doc: String::new(),
                raw_tag: format!("json:\"{field_name}\""),
            });
        }
        defs.push(StructDefinition {
            name: name.to_string(),
            fields,
        });
    }

    if defs.is_empty() {
        return Err(Error::semantic(ErrorKind::NoStructDefinition));
    }
    Ok(defs)
}

fn graphql_type(type_expr: &str) -> String {
    let base = type_expr.trim_start_matches('*');
    if let Some(element) = base.strip_prefix("[]") {
        return format!("[{}]", graphql_type(element));
    }
    match base {
        "string" => "String".to_string(),
        "bool" => "Boolean".to_string(),
        "int" | "int8" | "int16" | "int32" | "int64" | "uint" | "uint8" | "uint16"
        | "uint32" | "uint64" => "Int".to_string(),
        "float32" | "float64" => "Float".to_string(),
        "interface{}" | "any" => "String".to_string(),
        other => {
            let name = other.rsplit('.').next().unwrap_or(other);
            if name.starts_with("map[") {
                "String".to_string()
            } else {
                name.to_string()
            }
        }
    }
}

fn struct_type(graphql: &str) -> String {
    let base = graphql.trim_end_matches('!');
    if let Some(inner) = base.strip_prefix('[') {
        let element = inner.trim_end_matches(']').trim_end_matches('!');
        return format!("[]{}", struct_type(element));
    }
    match base {
        "String" | "ID" => "string".to_string(),
        "Int" => "int".to_string(),
        "Float" => "float64".to_string(),
        "Boolean" => "bool".to_string(),
        other => other.to_string(),
    }
}

/// Whitespace and comma tokenizer that keeps `{`, `}` and `:` visible
struct Tokens<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    line: u32,
}

impl<'a> Tokens<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
            line: 1,
        }
    }

    fn next_token(&mut self) -> Option<String> {
        loop {
            match self.chars.peek() {
                Some('\n') => {
                    self.line += 1;
                    self.chars.next();
                }
                Some(c) if c.is_whitespace() || *c == ',' => {
                    self.chars.next();
                }
                Some('#') => {
                    while let Some(&c) = self.chars.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.chars.next();
                    }
                }
                _ => break,
            }
        }
        let first = *self.chars.peek()?;
        if matches!(first, '{' | '}') {
            self.chars.next();
            return Some(first.to_string());
        }
        let mut token = String::new();
        while let Some(&c) = self.chars.peek() {
            if c.is_whitespace() || matches!(c, ',' | '{' | '}') {
                break;
            }
            token.push(c);
            self.chars.next();
            // a trailing colon binds to the field name token
            if c == ':' {
                break;
            }
        }
        if token.is_empty() {
            None
        } else {
            Some(token)
        }
    }

    fn expect(&mut self, expected: &str) -> Result<String> {
        match self.next_token() {
            Some(token) if token == expected => Ok(token),
            Some(found) => Err(Error::on_line(
                ErrorKind::Expected {
                    expected: expected.to_string(),
                    found,
                },
                self.line,
            )),
            None => Err(Error::on_line(ErrorKind::UnexpectedEof, self.line)),
        }
    }

    fn skip_to_body(&mut self) -> Result<()> {
        loop {
            match self.next_token() {
                Some(token) if token == "{" => return Ok(()),
                Some(_) => {}
                None => return Err(Error::on_line(ErrorKind::UnexpectedEof, self.line)),
            }
        }
    }

    fn skip_body(&mut self) -> Result<()> {
        let mut depth = 1;
        loop {
            match self.next_token() {
                Some(token) if token == "{" => depth += 1,
                Some(token) if token == "}" => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(());
                    }
                }
                Some(_) => {}
                None => return Err(Error::on_line(ErrorKind::UnexpectedEof, self.line)),
            }
        }
    }
}
