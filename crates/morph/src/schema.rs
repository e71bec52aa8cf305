//! JSON Schema inference and sampling
//!
//! `build_schema` derives a schema tree from a sample value; `sample_from_schema`
//! synthesizes a representative value from a schema. The pair is structural,
//! not value preserving: `sample_from_schema(build_schema(v))` keeps the key
//! shape of `v` at every level but replaces leaf values with defaults.

use crate::value::{Array, Object, Value};

/// Infer a schema tree from a sample value
pub fn build_schema(value: &Value) -> Value {
    let mut schema = Object::new();
    match value {
        Value::Object(object) => {
            schema.insert("type", "object");
            let mut properties = Object::new();
            for (key, item) in object.iter() {
                properties.insert(key.clone(), build_schema(item));
            }
            if !object.is_empty() {
                let required: Array = object
                    .sorted_keys()
                    .into_iter()
                    .map(|k| Value::String(k.to_string()))
                    .collect();
                schema.insert("required", required);
            }
            schema.insert("properties", properties);
        }
        Value::Array(array) => {
            schema.insert("type", "array");
            // First non-null element decides the item schema
            let sample = array
                .iter()
                .find(|v| !v.is_null())
                .or_else(|| array.get(0));
            let items = match sample {
                Some(item) => build_schema(item),
                None => {
                    let mut fallback = Object::new();
                    fallback.insert("type", "string");
                    Value::Object(fallback)
                }
            };
            schema.insert("items", items);
        }
        Value::String(_) => {
            schema.insert("type", "string");
        }
        Value::Int(_) | Value::Float(_) => {
            schema.insert("type", "number");
        }
        Value::Bool(_) => {
            schema.insert("type", "boolean");
        }
        Value::Null => {
            schema.insert("type", "null");
        }
    }
    Value::Object(schema)
}

/// Synthesize a sample value from a schema tree
pub fn sample_from_schema(schema: &Value) -> Value {
    let Value::Object(node) = schema else {
        return Value::Object(Object::new());
    };
    match resolved_type(node).as_str() {
        "array" => match node.get("items") {
            Some(items) => {
                let mut array = Array::new();
                array.push(sample_from_schema(items));
                Value::Array(array)
            }
            None => Value::Array(Array::new()),
        },
        "string" => {
            if let Some(default) = node.get("default") {
                return default.clone();
            }
            if let Some(first) = node
                .get("enum")
                .and_then(Value::as_array)
                .and_then(|a| a.get(0))
            {
                return first.clone();
            }
            Value::String(String::new())
        }
        "number" | "integer" => node.get("default").cloned().unwrap_or(Value::Int(0)),
        "boolean" => node.get("default").cloned().unwrap_or(Value::Bool(false)),
        "null" => Value::Null,
        "object" => {
            let mut object = Object::new();
            if let Some(properties) = node.get("properties").and_then(Value::as_object) {
                for key in properties.sorted_keys() {
                    object.insert(key.to_string(), sample_from_schema(&properties[key]));
                }
            }
            Value::Object(object)
        }
        _ => Value::Object(Object::new()),
    }
}

/// `type` may be a string or an array of strings; first non-"null" wins
fn resolved_type(node: &Object) -> String {
    match node.get("type") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Array(types)) => {
            let first_non_null = types
                .iter()
                .filter_map(Value::as_str)
                .find(|&t| t != "null");
            match first_non_null {
                Some(t) => t.to_string(),
                None => types
                    .get(0)
                    .and_then(Value::as_str)
                    .unwrap_or("object")
                    .to_string(),
            }
        }
        _ => "object".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::json;

    fn parse(input: &str) -> Value {
        json::parser::parse(input).unwrap()
    }

    #[test]
    fn test_build_object_schema() {
        let schema = build_schema(&parse(r#"{"id":1,"active":true,"name":"Test"}"#));
        let node = schema.as_object().unwrap();
        assert_eq!(node["type"], Value::String("object".to_string()));
        let required: Vec<&str> = node["required"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(Value::as_str)
            .collect();
        assert_eq!(required, vec!["active", "id", "name"]);
        let properties = node["properties"].as_object().unwrap();
        assert_eq!(
            properties["active"].as_object().unwrap()["type"],
            Value::String("boolean".to_string())
        );
        assert_eq!(
            properties["id"].as_object().unwrap()["type"],
            Value::String("number".to_string())
        );
    }

    #[test]
    fn test_empty_array_items_default_to_string() {
        let schema = build_schema(&parse("[]"));
        let items = schema.as_object().unwrap()["items"].as_object().unwrap();
        assert_eq!(items["type"], Value::String("string".to_string()));
    }

    #[test]
    fn test_array_items_from_first_non_null() {
        let schema = build_schema(&parse(r#"[null, 3, "x"]"#));
        let items = schema.as_object().unwrap()["items"].as_object().unwrap();
        assert_eq!(items["type"], Value::String("number".to_string()));
    }

    #[test]
    fn test_sample_defaults() {
        let schema = parse(
            r#"{"type":"object","properties":{
                "s":{"type":"string"},
                "n":{"type":"number"},
                "b":{"type":"boolean"},
                "e":{"type":"string","enum":["red","blue"]},
                "d":{"type":"string","default":"x"}}}"#,
        );
        let sample = sample_from_schema(&schema);
        let object = sample.as_object().unwrap();
        assert_eq!(object["s"], Value::String(String::new()));
        assert_eq!(object["n"], Value::Int(0));
        assert_eq!(object["b"], Value::Bool(false));
        assert_eq!(object["e"], Value::String("red".to_string()));
        assert_eq!(object["d"], Value::String("x".to_string()));
    }

    #[test]
    fn test_sample_type_array_first_non_null_wins() {
        let schema = parse(r#"{"type":["null","string"]}"#);
        assert_eq!(sample_from_schema(&schema), Value::String(String::new()));
    }

    #[test]
    fn test_sample_unknown_type_is_empty_object() {
        let schema = parse(r#"{"type":"widget"}"#);
        assert_eq!(sample_from_schema(&schema), Value::Object(Object::new()));
    }

    #[test]
    fn test_structural_round_trip_keeps_key_shape() {
        let value = parse(r#"{"a":{"b":[{"c":1}]},"d":"x"}"#);
        let sample = sample_from_schema(&build_schema(&value));
        let object = sample.as_object().unwrap();
        assert!(object.contains_key("a"));
        assert!(object.contains_key("d"));
        let inner = object["a"].as_object().unwrap()["b"].as_array().unwrap();
        assert!(inner[0].as_object().unwrap().contains_key("c"));
    }
}
