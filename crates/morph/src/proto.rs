//! Protobuf schema text projection
//!
//! `message Name { type field = N; }` to and from struct definitions. Like
//! GraphQL, this routes directly to struct-text so integer widths and field
//! order survive.

use crate::error::{Error, ErrorKind, Result};
use crate::structs::names::export_name;
use crate::structs::{StructDefinition, StructField};

/// Render definitions as proto3 message declarations
pub fn to_string(defs: &[StructDefinition]) -> String {
    let mut out = String::from("syntax = \"proto3\";\n");
    for def in defs {
        out.push('\n');
        out.push_str(&format!("message {} {{\n", def.name));
        let mut number = 1;
        for field in &def.fields {
            if field.external_name.is_empty() {
                continue;
            }
            let (label, proto_type) = proto_type(&field.type_expr);
            out.push_str(&format!(
                "  {label}{proto_type} {} = {number};\n",
                field.external_name
            ));
            number += 1;
        }
        out.push_str("}\n");
    }
    out
}

/// Parse proto message declarations into struct definitions
pub fn parse(input: &str) -> Result<Vec<StructDefinition>> {
    if input.trim().is_empty() {
        return Err(Error::semantic(ErrorKind::EmptyInput));
    }
    let mut defs = Vec::new();

    for (i, raw) in input.lines().enumerate() {
        let number = u32::try_from(i + 1).unwrap_or(u32::MAX);
        let line = strip_line_comment(raw).trim();
        if line.is_empty()
            || line.starts_with("syntax")
            || line.starts_with("package")
            || line.starts_with("option")
            || line.starts_with("import")
        {
            continue;
        }
        if let Some(rest) = line.strip_prefix("message ") {
            let name = rest.trim_end_matches('{').trim();
            if name.is_empty() {
                return Err(Error::on_line(ErrorKind::InvalidToken, number));
            }
            defs.push(StructDefinition {
                name: name.to_string(),
                fields: Vec::new(),
            });
            continue;
        }
        if line == "}" {
            continue;
        }
        // field line: [repeated] type name = N;
        let Some(def) = defs.last_mut() else {
            return Err(Error::on_line(ErrorKind::InvalidToken, number));
        };
        let body = line.trim_end_matches(';');
        let assignment = body.split('=').next().unwrap_or(body).trim();
        let mut tokens = assignment.split_whitespace();
        let mut type_token = tokens
            .next()
            .ok_or_else(|| Error::on_line(ErrorKind::InvalidToken, number))?;
        let mut repeated = false;
        if type_token == "repeated" {
            repeated = true;
            type_token = tokens
                .next()
                .ok_or_else(|| Error::on_line(ErrorKind::InvalidToken, number))?;
        }
        let field_name = tokens
            .next()
            .ok_or_else(|| Error::on_line(ErrorKind::InvalidToken, number))?;

        let mut type_expr = struct_type(type_token);
        if repeated {
            type_expr = format!("[]{type_expr}");
        }
        def.fields.push(StructField {
            name: export_name(field_name),
            external_name: field_name.to_string(),
            type_expr,
            doc: String::new(),
            raw_tag: format!("json:\"{field_name}\""),
        });
    }

    if defs.is_empty() {
        return Err(Error::semantic(ErrorKind::NoStructDefinition));
    }
    Ok(defs)
}

fn proto_type(type_expr: &str) -> (&'static str, String) {
    let base = type_expr.trim_start_matches('*');
    if let Some(element) = base.strip_prefix("[]") {
        let (_, inner) = proto_type(element);
        return ("repeated ", inner);
    }
    let name = match base {
        "string" => "string".to_string(),
        "bool" => "bool".to_string(),
        "int" | "int64" => "int64".to_string(),
        "int8" | "int16" | "int32" => "int32".to_string(),
        "uint" | "uint64" => "uint64".to_string(),
        "uint8" | "uint16" | "uint32" => "uint32".to_string(),
        "float32" => "float".to_string(),
        "float64" => "double".to_string(),
        "interface{}" | "any" => "string".to_string(),
        other => {
            let name = other.rsplit('.').next().unwrap_or(other);
            if name.starts_with("map[") {
                "string".to_string()
            } else {
                name.to_string()
            }
        }
    };
    ("", name)
}

fn struct_type(proto: &str) -> String {
    match proto {
        "string" | "bytes" => "string".to_string(),
        "bool" => "bool".to_string(),
        "int32" | "sint32" | "sfixed32" => "int32".to_string(),
        "int64" | "sint64" | "sfixed64" => "int".to_string(),
        "uint32" | "fixed32" => "uint32".to_string(),
        "uint64" | "fixed64" => "uint64".to_string(),
        "float" => "float32".to_string(),
        "double" => "float64".to_string(),
        other => other.to_string(),
    }
}

fn strip_line_comment(line: &str) -> &str {
    match line.find("//") {
        Some(i) => line.get(..i).unwrap_or(line),
        None => line,
    }
}
