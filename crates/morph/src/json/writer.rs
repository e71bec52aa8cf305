//! JSON serialization with deterministic key ordering

use crate::value::Value;

/// Serialize with 2-space indentation, the default output form
pub fn to_string(value: &Value) -> String {
    to_string_pretty(value)
}

/// Serialize on a single line without whitespace
pub fn to_string_compact(value: &Value) -> String {
    let mut out = String::new();
    write_compact(value, &mut out);
    out
}

/// Serialize with 2-space indentation and sorted object keys
pub fn to_string_pretty(value: &Value) -> String {
    let mut out = String::new();
    write_pretty(value, 0, &mut out);
    out
}

fn write_compact(value: &Value, out: &mut String) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Int(n) => out.push_str(&n.to_string()),
        Value::Float(n) => write_float(*n, out),
        Value::String(s) => write_string(s, out),
        Value::Array(array) => {
            out.push('[');
            for (i, item) in array.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_compact(item, out);
            }
            out.push(']');
        }
        Value::Object(object) => {
            out.push('{');
            for (i, key) in object.sorted_keys().iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_string(key, out);
                out.push(':');
                write_compact(&object[key], out);
            }
            out.push('}');
        }
    }
}

fn write_pretty(value: &Value, indent: usize, out: &mut String) {
    match value {
        Value::Array(array) if !array.is_empty() => {
            out.push_str("[\n");
            for (i, item) in array.iter().enumerate() {
                if i > 0 {
                    out.push_str(",\n");
                }
                push_indent(indent + 1, out);
                write_pretty(item, indent + 1, out);
            }
            out.push('\n');
            push_indent(indent, out);
            out.push(']');
        }
        Value::Array(_) => out.push_str("[]"),
        Value::Object(object) if !object.is_empty() => {
            out.push_str("{\n");
            for (i, key) in object.sorted_keys().iter().enumerate() {
                if i > 0 {
                    out.push_str(",\n");
                }
                push_indent(indent + 1, out);
                write_string(key, out);
                out.push_str(": ");
                write_pretty(&object[key], indent + 1, out);
            }
            out.push('\n');
            push_indent(indent, out);
            out.push('}');
        }
        Value::Object(_) => out.push_str("{}"),
        _ => write_compact(value, out),
    }
}

fn push_indent(indent: usize, out: &mut String) {
    for _ in 0..indent {
        out.push_str("  ");
    }
}

fn write_float(n: f64, out: &mut String) {
    if n.is_finite() {
        let s = n.to_string();
        out.push_str(&s);
        // Keep floats distinguishable from ints on round trips
        if !s.contains('.') && !s.contains('e') && !s.contains('E') {
            out.push_str(".0");
        }
    } else {
        out.push_str("null");
    }
}

pub(crate) fn write_string(s: &str, out: &mut String) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{0008}' => out.push_str("\\b"),
            '\u{000C}' => out.push_str("\\f"),
            c if (c as u32) < 0x20 => {
                out.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push('"');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::json::parser::parse;
    use crate::value::{Array, Object};

    #[test]
    fn test_compact_sorted_keys() {
        let mut object = Object::new();
        object.insert("zeta", 1i64);
        object.insert("alpha", 2i64);
        assert_eq!(
            to_string_compact(&Value::Object(object)),
            r#"{"alpha":2,"zeta":1}"#
        );
    }

    #[test]
    fn test_pretty_indentation() {
        let mut object = Object::new();
        object.insert("name", "Milo");
        let mut inner = Array::new();
        inner.push(1i64);
        inner.push(2i64);
        object.insert("ids", inner);
        assert_eq!(
            to_string_pretty(&Value::Object(object)),
            "{\n  \"ids\": [\n    1,\n    2\n  ],\n  \"name\": \"Milo\"\n}"
        );
    }

    #[test]
    fn test_empty_containers() {
        assert_eq!(to_string_pretty(&Value::Object(Object::new())), "{}");
        assert_eq!(to_string_pretty(&Value::Array(Array::new())), "[]");
    }

    #[test]
    fn test_int_float_distinction() {
        assert_eq!(to_string_compact(&Value::Int(3)), "3");
        assert_eq!(to_string_compact(&Value::Float(3.0)), "3.0");
        assert_eq!(to_string_compact(&Value::Float(3.5)), "3.5");
    }

    #[test]
    fn test_string_escapes() {
        assert_eq!(
            to_string_compact(&Value::String("a\"b\\c\nd".to_string())),
            r#""a\"b\\c\nd""#
        );
    }

    #[test]
    fn test_round_trip() -> crate::error::Result<()> {
        let input = r#"{"a":[1,2.5,null,true,"x"],"b":{"c":"d"}}"#;
        let value = parse(input)?;
        assert_eq!(to_string_compact(&value), input);
        Ok(())
    }
}
