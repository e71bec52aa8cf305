//! Struct-text to sample value and back

use std::collections::HashSet;

use crate::error::{Error, ErrorKind, Result};
use crate::structs::names::export_name;
use crate::structs::{StructDefinition, StructField};
use crate::value::{Array, Object, Value};

/// Build a sample value for the first definition, resolving nested
/// struct references against the full definition list
pub fn sample_value(defs: &[StructDefinition]) -> Result<Value> {
    let first = defs
        .first()
        .ok_or_else(|| Error::semantic(ErrorKind::NoStructDefinition))?;
    let mut visiting = HashSet::new();
    Ok(sample_struct(first, defs, &mut visiting))
}

fn sample_struct<'a>(
    def: &'a StructDefinition,
    defs: &'a [StructDefinition],
    visiting: &mut HashSet<&'a str>,
) -> Value {
    visiting.insert(def.name.as_str());
    let mut object = Object::new();
    for field in &def.fields {
        // A `json:"-"` tag removes the field from value projections
        if field.external_name.is_empty() {
            continue;
        }
        let value = sample_type(&field.type_expr, defs, visiting);
        object.insert(field.external_name.clone(), value);
    }
    visiting.remove(def.name.as_str());
    Value::Object(object)
}

fn sample_type<'a>(
    type_expr: &str,
    defs: &'a [StructDefinition],
    visiting: &mut HashSet<&'a str>,
) -> Value {
    let base = type_expr.trim_start_matches('*');
    if let Some(element) = base.strip_prefix("[]") {
        let mut array = Array::new();
        array.push(sample_type(element, defs, visiting));
        return Value::Array(array);
    }
    if base.starts_with("map[") {
        return Value::Object(Object::new());
    }
    match base {
        "string" => Value::String(String::new()),
        "bool" => Value::Bool(false),
        "int" | "int8" | "int16" | "int32" | "int64" | "uint" | "uint8" | "uint16"
        | "uint32" | "uint64" | "byte" | "rune" | "uintptr" => Value::Int(0),
        "float32" | "float64" => Value::Float(0.0),
        "interface{}" | "any" => Value::Null,
        other => {
            let name = other.rsplit('.').next().unwrap_or(other);
            match defs.iter().find(|d| d.name == name) {
                Some(def) if !visiting.contains(def.name.as_str()) => {
                    sample_struct(def, defs, visiting)
                }
                _ => Value::Null,
            }
        }
    }
}

/// Infer struct definitions from a value, one definition per nested object
///
/// The root must be an object. Field order follows the source key order.
pub fn definitions_from_value(value: &Value, root_name: &str) -> Result<Vec<StructDefinition>> {
    let Value::Object(object) = value else {
        return Err(Error::semantic(ErrorKind::InvalidRoot { expected: "an object" }));
    };
    let mut defs = Vec::new();
    collect_definition(root_name, object, &mut defs);
    Ok(defs)
}

fn collect_definition(name: &str, object: &Object, defs: &mut Vec<StructDefinition>) {
    let index = defs.len();
    defs.push(StructDefinition {
        name: name.to_string(),
        fields: Vec::new(),
    });
    let mut fields = Vec::new();
    for (key, item) in object.iter() {
        let field_name = safe_name(key);
        let type_expr = infer_type(&field_name, item, defs);
        fields.push(StructField {
            name: field_name,
            external_name: key.clone(),
            type_expr,
            doc: String::new(),
            raw_tag: format!("json:\"{key}\""),
        });
    }
    if let Some(def) = defs.get_mut(index) {
        def.fields = fields;
    }
}

fn infer_type(field_name: &str, value: &Value, defs: &mut Vec<StructDefinition>) -> String {
    match value {
        Value::Null => "any".to_string(),
        Value::Bool(_) => "bool".to_string(),
        Value::Int(_) => "int".to_string(),
        Value::Float(_) => "float64".to_string(),
        Value::String(_) => "string".to_string(),
        Value::Array(array) => match array.get(0) {
            Some(first) => format!("[]{}", infer_type(field_name, first, defs)),
            None => "[]any".to_string(),
        },
        Value::Object(object) => {
            let nested = unique_name(field_name, defs);
            collect_definition(&nested, object, defs);
            nested
        }
    }
}

fn unique_name(base: &str, defs: &[StructDefinition]) -> String {
    if !defs.iter().any(|d| d.name == base) {
        return base.to_string();
    }
    let mut n = 2;
    loop {
        let candidate = format!("{base}{n}");
        if !defs.iter().any(|d| d.name == candidate) {
            return candidate;
        }
        n += 1;
    }
}

fn safe_name(key: &str) -> String {
    let name = export_name(key);
    if name.is_empty() {
        "Field".to_string()
    } else {
        name
    }
}
