use morph::{convert, format_content, Format};

#[test]
fn test_json_to_toml() -> Result<(), Box<dyn std::error::Error>> {
    let input = r#"{"name":"test","value":42}"#;
    let output = convert(Format::Json, Format::Toml, input)?;
    assert!(output.contains("name = \"test\""));
    assert!(output.contains("value = 42"));
    Ok(())
}

#[test]
fn test_toml_to_json() -> Result<(), Box<dyn std::error::Error>> {
    let input = "name = \"test\"\nvalue = 42\n";
    let output = convert(Format::Toml, Format::Json, input)?;
    assert!(output.contains("\"name\""));
    assert!(output.contains("\"value\""));
    Ok(())
}

#[test]
fn test_yaml_to_json() -> Result<(), Box<dyn std::error::Error>> {
    let input = "name: test\nvalue: 42\n";
    let output = convert(Format::Yaml, Format::Json, input)?;
    assert!(output.contains("\"name\": \"test\""));
    assert!(output.contains("\"value\": 42"));
    Ok(())
}

#[test]
fn test_xml_to_json() -> Result<(), Box<dyn std::error::Error>> {
    let input = "<root><name>test</name><value>42</value></root>";
    let output = convert(Format::Xml, Format::Json, input)?;
    assert!(output.contains("\"name\""));
    assert!(output.contains("\"value\""));
    Ok(())
}

#[test]
fn test_json_to_toon_scenario() -> Result<(), Box<dyn std::error::Error>> {
    let output = convert(Format::Json, Format::Toon, r#"{"name":"Alice","age":30}"#)?;
    assert_eq!(output, "age: 30\nname: Alice");
    Ok(())
}

#[test]
fn test_toon_tabular_to_json_and_back() -> Result<(), Box<dyn std::error::Error>> {
    let json = r#"{"users":[{"id":1,"name":"a"},{"id":2,"name":"b"}]}"#;
    let toon = convert(Format::Json, Format::Toon, json)?;
    assert_eq!(toon, "users[2]{id,name}:\n  1,a\n  2,b");
    let back = convert(Format::Toon, Format::Json, &toon)?;
    let reparsed = convert(Format::Json, Format::Json, &back)?;
    assert!(reparsed.contains("\"id\": 1"));
    Ok(())
}

#[test]
fn test_json_to_gostruct() -> Result<(), Box<dyn std::error::Error>> {
    let output = convert(Format::Json, Format::GoStruct, r#"{"user_name":"x","age":3}"#)?;
    assert!(output.contains("type AutoGenerated struct {"));
    assert!(output.contains("UserName"));
    assert!(output.contains("`json:\"user_name\"`"));
    Ok(())
}

#[test]
fn test_gostruct_to_json_uses_zero_values() -> Result<(), Box<dyn std::error::Error>> {
    let source = "type User struct {\n\tName string `json:\"name\"`\n\tAge int `json:\"age\"`\n}\n";
    let output = convert(Format::GoStruct, Format::Json, source)?;
    assert!(output.contains("\"age\": 0"));
    assert!(output.contains("\"name\": \"\""));
    Ok(())
}

#[test]
fn test_suppressed_field_is_dropped() -> Result<(), Box<dyn std::error::Error>> {
    let source = "type T struct {\n\tSecret string `json:\"-\"`\n\tName string `json:\"name\"`\n}\n";
    let output = convert(Format::GoStruct, Format::Json, source)?;
    assert!(!output.contains("Secret"));
    assert!(!output.contains("secret"));
    assert!(output.contains("\"name\""));
    Ok(())
}

#[test]
fn test_gostruct_graphql_proto_direct_routes() -> Result<(), Box<dyn std::error::Error>> {
    let source = "type User struct {\n\tName string `json:\"name\"`\n\tTags []string `json:\"tags\"`\n}\n";
    let graphql = convert(Format::GoStruct, Format::Graphql, source)?;
    assert!(graphql.contains("type User {"));
    assert!(graphql.contains("tags: [String]"));
    let proto = convert(Format::GoStruct, Format::Proto, source)?;
    assert!(proto.contains("message User {"));
    assert!(proto.contains("repeated string tags = 2;"));
    let back = convert(Format::Graphql, Format::GoStruct, &graphql)?;
    assert!(back.contains("type User struct {"));
    Ok(())
}

#[test]
fn test_schema_inference_and_sampling() -> Result<(), Box<dyn std::error::Error>> {
    let schema = convert(Format::Json, Format::JsonSchema, r#"{"a":1,"b":"x","c":[true]}"#)?;
    assert!(schema.contains("\"type\": \"object\""));
    assert!(schema.contains("\"required\""));
    let sample = convert(Format::JsonSchema, Format::Json, &schema)?;
    for key in ["\"a\"", "\"b\"", "\"c\""] {
        assert!(sample.contains(key), "missing {key} in {sample}");
    }
    Ok(())
}

#[test]
fn test_schema_required_and_types() -> Result<(), Box<dyn std::error::Error>> {
    let schema = convert(
        Format::Json,
        Format::JsonSchema,
        r#"{"id":1,"active":true,"name":"Test"}"#,
    )?;
    let value = morph::json::parser::parse(&schema)?;
    let root = value.as_object().unwrap();
    let required: Vec<&str> = root["required"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|v| v.as_str())
        .collect();
    assert_eq!(required, vec!["active", "id", "name"]);
    let active = root["properties"].as_object().unwrap()["active"]
        .as_object()
        .unwrap();
    assert_eq!(active["type"].as_str(), Some("boolean"));
    Ok(())
}

#[test]
fn test_msgpack_both_ways() -> Result<(), Box<dyn std::error::Error>> {
    let input = r#"{"n":1,"s":"x","f":2.5,"l":[1,null]}"#;
    let packed = convert(Format::Json, Format::MsgPack, input)?;
    assert!(!packed.contains('{'));
    let back = convert(Format::MsgPack, Format::Json, &packed)?;
    assert!(back.contains("\"f\": 2.5"));
    assert!(back.contains("\"n\": 1"));
    Ok(())
}

#[test]
fn test_identity_conversion_is_verbatim() -> Result<(), Box<dyn std::error::Error>> {
    let input = "name= \"x\" \n";
    assert_eq!(convert(Format::Toml, Format::Toml, input)?, input);
    Ok(())
}

#[test]
fn test_format_struct_is_idempotent() -> Result<(), Box<dyn std::error::Error>> {
    let messy = "type User struct { Name string `json:\"name\"`; Age int `json:\"age\"` }";
    let once = format_content(Format::GoStruct, messy, false)?;
    let twice = format_content(Format::GoStruct, &once, false)?;
    assert_eq!(once, twice);
    assert!(once.contains("\tName string `json:\"name\"`"));
    Ok(())
}

#[test]
fn test_format_json_minify() -> Result<(), Box<dyn std::error::Error>> {
    let minified = format_content(Format::Json, "{\n  \"a\": [1, 2]\n}", true)?;
    assert_eq!(minified, r#"{"a":[1,2]}"#);
    Ok(())
}

#[test]
fn test_format_xml_minify() -> Result<(), Box<dyn std::error::Error>> {
    let minified = format_content(Format::Xml, "<root>\n  <a>1</a>\n</root>", true)?;
    assert!(!minified.contains('\n'));
    Ok(())
}

#[test]
fn test_errors_are_reported_not_partial() {
    assert!(convert(Format::Json, Format::Yaml, "{\"a\": ").is_err());
    assert!(convert(Format::Toon, Format::Json, "users[2]{id}:\n  1,2").is_err());
    assert!(convert(Format::Json, Format::Toml, "[1,2]").is_err());
    assert!(convert(Format::GoStruct, Format::Json, "package main\n").is_err());
}

#[test]
fn test_format_parsing() {
    for format in Format::ALL {
        assert_eq!(format.label().parse::<Format>().unwrap(), format);
        assert_eq!(format.id().parse::<Format>().unwrap(), format);
    }
    assert_eq!("Go Struct".parse::<Format>().unwrap(), Format::GoStruct);
    assert_eq!("yml".parse::<Format>().unwrap(), Format::Yaml);
    assert!("ini".parse::<Format>().is_err());
}
