//! TOON encoder

use std::sync::LazyLock;

use regex::Regex;

use crate::value::{Array, Object, Value};

const INDENT: &str = "  ";
const DELIMITER: char = ',';

/// Matches unquoted numeric literals, the same shape JSON accepts
#[allow(clippy::unwrap_used)]
pub(crate) static NUMBER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^-?(?:0|[1-9]\d*)(?:\.\d+)?(?:[eE][+-]?\d+)?$").unwrap()
});

/// Encode a [`Value`] as TOON text
pub fn to_string(value: &Value) -> String {
    let mut out = String::new();
    write_value(&mut out, None, value, 0);
    out.trim_end_matches('\n').to_string()
}

fn write_value(out: &mut String, key: Option<&str>, value: &Value, depth: usize) {
    match value {
        Value::Object(object) => {
            let mut depth = depth;
            if let Some(key) = key {
                push_indent(out, depth);
                out.push_str(&format!("{key}:\n"));
                depth += 1;
            }
            write_object_entries(out, object, depth);
        }
        Value::Array(array) => write_array(out, key, array, depth),
        scalar => {
            push_indent(out, depth);
            match key {
                Some(key) => out.push_str(&format!(
                    "{key}: {}\n",
                    format_primitive(scalar, DELIMITER)
                )),
                None => out.push_str(&format!("{}\n", format_primitive(scalar, DELIMITER))),
            }
        }
    }
}

fn write_object_entries(out: &mut String, object: &Object, depth: usize) {
    for key in object.sorted_keys() {
        write_value(out, Some(key), &object[key], depth);
    }
}

fn write_array(out: &mut String, key: Option<&str>, array: &Array, depth: usize) {
    let length = array.len();
    let tabular = detect_tabular(array);
    let prefix = key.unwrap_or("");

    push_indent(out, depth);
    if let Some(fields) = &tabular {
        out.push_str(&format!("{prefix}[{length}]{{{}}}:\n", fields.join(",")));
        write_rows(out, array, fields, depth + 1);
        return;
    }
    if array.all_primitive() {
        out.push_str(&format!(
            "{prefix}[{length}]: {}\n",
            join_primitives(array)
        ));
        return;
    }
    out.push_str(&format!("{prefix}[{length}]:\n"));
    write_list_entries(out, array, depth);
}

fn write_rows(out: &mut String, array: &Array, fields: &[String], depth: usize) {
    for item in array.iter() {
        if let Value::Object(row) = item {
            push_indent(out, depth);
            let values: Vec<String> = fields
                .iter()
                .map(|field| {
                    format_primitive(row.get(field).unwrap_or(&Value::Null), DELIMITER)
                })
                .collect();
            out.push_str(&values.join(","));
            out.push('\n');
        }
    }
}

fn join_primitives(array: &Array) -> String {
    let parts: Vec<String> = array
        .iter()
        .map(|v| format_primitive(v, DELIMITER))
        .collect();
    parts.join(",")
}

fn write_list_entries(out: &mut String, items: &Array, depth: usize) {
    for item in items.iter() {
        push_indent(out, depth + 1);
        match item {
            Value::Object(object) => write_list_object(out, object, depth),
            Value::Array(array) => write_array_list_item(out, array, depth),
            scalar => {
                out.push_str(&format!("- {}\n", format_primitive(scalar, DELIMITER)));
            }
        }
    }
}

fn write_list_object(out: &mut String, object: &Object, depth: usize) {
    out.push('-');
    if object.is_empty() {
        out.push('\n');
        return;
    }
    let keys = object.sorted_keys();
    let mut first = true;
    for key in keys {
        if first {
            out.push(' ');
            write_inline_field(out, key, &object[key], depth);
            first = false;
            continue;
        }
        if !out.ends_with('\n') {
            out.push('\n');
        }
        write_value(out, Some(key), &object[key], depth + 2);
    }
    if !out.ends_with('\n') {
        out.push('\n');
    }
}

/// First field of a list object, printed right after the `- ` marker
fn write_inline_field(out: &mut String, key: &str, value: &Value, depth: usize) {
    match value {
        Value::Object(object) => {
            out.push_str(&format!("{key}:\n"));
            write_object_entries(out, object, depth + 2);
        }
        Value::Array(array) => write_inline_array_field(out, key, array, depth + 1),
        scalar => {
            out.push_str(&format!("{key}: {}", format_primitive(scalar, DELIMITER)));
        }
    }
}

fn write_inline_array_field(out: &mut String, key: &str, array: &Array, depth: usize) {
    let length = array.len();
    if let Some(fields) = detect_tabular(array) {
        out.push_str(&format!("{key}[{length}]{{{}}}:\n", fields.join(",")));
        write_rows(out, array, &fields, depth + 1);
        return;
    }
    if array.all_primitive() {
        out.push_str(&format!("{key}[{length}]: {}", join_primitives(array)));
        return;
    }
    out.push_str(&format!("{key}[{length}]:\n"));
    write_list_entries(out, array, depth);
}

fn write_array_list_item(out: &mut String, array: &Array, depth: usize) {
    let length = array.len();
    if let Some(fields) = detect_tabular(array) {
        out.push_str(&format!("- [{length}]{{{}}}:\n", fields.join(",")));
        write_rows(out, array, &fields, depth + 2);
        return;
    }
    if array.all_primitive() {
        out.push_str(&format!("- [{length}]: {}\n", join_primitives(array)));
        return;
    }
    out.push_str(&format!("- [{length}]:\n"));
    write_list_entries(out, array, depth + 1);
}

/// Tabular shape: every element a flat object over one shared key set
fn detect_tabular(array: &Array) -> Option<Vec<String>> {
    let first = array.get(0)?.as_object()?;
    let fields: Vec<String> = first.sorted_keys().iter().map(|k| (*k).to_string()).collect();
    for item in array.iter() {
        let object = item.as_object()?;
        if object.len() != fields.len() {
            return None;
        }
        for field in &fields {
            let value = object.get(field)?;
            if !value.is_primitive() {
                return None;
            }
        }
    }
    Some(fields)
}

pub(crate) fn format_primitive(value: &Value, delim: char) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(true) => "true".to_string(),
        Value::Bool(false) => "false".to_string(),
        Value::Int(n) => n.to_string(),
        Value::Float(n) => n.to_string(),
        Value::String(s) => {
            if needs_quote(s, delim) {
                quote(s)
            } else {
                s.clone()
            }
        }
        // containers never reach here
        _ => String::new(),
    }
}

/// Whether a string must be quoted to survive a round trip unambiguously
pub fn needs_quote(s: &str, delim: char) -> bool {
    if s.is_empty() || s.trim() != s {
        return true;
    }
    if matches!(s, "true" | "false" | "null") {
        return true;
    }
    if NUMBER_PATTERN.is_match(s) {
        return true;
    }
    if s.chars().any(|c| {
        matches!(c, ':' | '"' | '\\' | '[' | ']' | '{' | '}' | '\n' | '\r' | '\t') || c == delim
    }) {
        return true;
    }
    s.starts_with('-')
}

fn quote(s: &str) -> String {
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

fn push_indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::json;

    fn encode(input: &str) -> String {
        to_string(&json::parser::parse(input).unwrap())
    }

    #[test]
    fn test_simple_object() {
        assert_eq!(encode(r#"{"name":"Alice","age":30}"#), "age: 30\nname: Alice");
    }

    #[test]
    fn test_nested_object() {
        assert_eq!(
            encode(r#"{"outer":{"a":1,"b":true}}"#),
            "outer:\n  a: 1\n  b: true"
        );
    }

    #[test]
    fn test_tabular_array() {
        assert_eq!(
            encode(r#"{"users":[{"id":1,"name":"a"},{"id":2,"name":"b"}]}"#),
            "users[2]{id,name}:\n  1,a\n  2,b"
        );
    }

    #[test]
    fn test_flat_scalar_array() {
        assert_eq!(encode(r#"{"nums":[1,2,3]}"#), "nums[3]: 1,2,3");
    }

    #[test]
    fn test_mixed_array_falls_back_to_list() {
        assert_eq!(
            encode(r#"{"items":[1,{"a":2}]}"#),
            "items[2]:\n  - 1\n  - a: 2"
        );
    }

    #[test]
    fn test_nested_row_value_defeats_tabular() {
        let out = encode(r#"{"rows":[{"a":1},{"a":{"b":2}}]}"#);
        assert!(out.starts_with("rows[2]:\n"));
        assert!(out.contains("- a: 1"));
    }

    #[test]
    fn test_needs_quote_rules() {
        assert!(needs_quote("true", ','));
        assert!(needs_quote("123", ','));
        assert!(needs_quote("", ','));
        assert!(needs_quote(" padded", ','));
        assert!(needs_quote("a,b", ','));
        assert!(needs_quote("a:b", ','));
        assert!(needs_quote("-dash", ','));
        assert!(!needs_quote("hello", ','));
    }

    #[test]
    fn test_quoted_values_in_output() {
        assert_eq!(encode(r#"{"v":"true"}"#), "v: \"true\"");
        assert_eq!(encode(r#"{"v":"12"}"#), "v: \"12\"");
        assert_eq!(encode(r#"{"v":"a\nb"}"#), "v: \"a\\nb\"");
    }

    #[test]
    fn test_top_level_array_and_scalar() {
        assert_eq!(encode("[1,2]"), "[2]: 1,2");
        assert_eq!(encode("\"hi\""), "hi");
    }

    #[test]
    fn test_multi_key_list_objects() {
        assert_eq!(
            encode(r#"{"items":[{"a":1,"b":2},{"a":3,"b":{"c":4}}]}"#),
            "items[2]:\n  - a: 1\n    b: 2\n  - a: 3\n    b:\n      c: 4"
        );
    }
}
