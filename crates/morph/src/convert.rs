//! Conversion hub routing text between the supported formats
//!
//! Every conversion goes source text -> canonical [`Value`] -> target
//! text, except the schema-language pairs that would lose type names in
//! the middle. Those take a direct route.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::value::Value;
use crate::{graphql, json, msgpack, proto, schema, structs, toml, toon, xml, yaml};

/// The ten supported formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    Json,
    GoStruct,
    Yaml,
    Toml,
    Xml,
    JsonSchema,
    Graphql,
    Proto,
    Toon,
    MsgPack,
}

impl Format {
    pub const ALL: [Self; 10] = [
        Self::Json,
        Self::GoStruct,
        Self::Yaml,
        Self::Toml,
        Self::Xml,
        Self::JsonSchema,
        Self::Graphql,
        Self::Proto,
        Self::Toon,
        Self::MsgPack,
    ];

    /// Canonical display label
    pub fn label(self) -> &'static str {
        match self {
            Self::Json => "JSON",
            Self::GoStruct => "Go Struct",
            Self::Yaml => "YAML",
            Self::Toml => "TOML",
            Self::Xml => "XML",
            Self::JsonSchema => "JSON Schema",
            Self::Graphql => "GraphQL Schema",
            Self::Proto => "Protobuf",
            Self::Toon => "TOON",
            Self::MsgPack => "MsgPack",
        }
    }

    /// Short lowercase identifier, stable for CLI use
    pub fn id(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::GoStruct => "gostruct",
            Self::Yaml => "yaml",
            Self::Toml => "toml",
            Self::Xml => "xml",
            Self::JsonSchema => "jsonschema",
            Self::Graphql => "graphql",
            Self::Proto => "proto",
            Self::Toon => "toon",
            Self::MsgPack => "msgpack",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Format {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized: String = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
            .map(|c| c.to_ascii_lowercase())
            .collect();
        for format in Self::ALL {
            let label: String = format
                .label()
                .chars()
                .filter(|c| !c.is_whitespace())
                .map(|c| c.to_ascii_lowercase())
                .collect();
            if normalized == format.id() || normalized == label {
                return Ok(format);
            }
        }
        match normalized.as_str() {
            "go" | "golang" => Ok(Self::GoStruct),
            "yml" => Ok(Self::Yaml),
            "protobuf" => Ok(Self::Proto),
            "messagepack" => Ok(Self::MsgPack),
            _ => Err(Error::unsupported_format(s)),
        }
    }
}

/// Convert `input` from one format to another
///
/// Identity conversions return the input untouched. A handful of pairs
/// between schema languages route directly so declared type names
/// survive; everything else goes through the canonical value model.
pub fn convert(from: Format, to: Format, input: &str) -> Result<String> {
    if from == to {
        return Ok(input.to_string());
    }
    if let Some(output) = convert_direct(from, to, input)? {
        return Ok(output);
    }
    let value = decode(from, input)?;
    encode(to, &value)
}

/// Hub-bypass routes between type-bearing formats
fn convert_direct(from: Format, to: Format, input: &str) -> Result<Option<String>> {
    let output = match (from, to) {
        (Format::GoStruct, Format::Graphql) => graphql::to_string(&structs::parse(input)?),
        (Format::Graphql, Format::GoStruct) => structs::to_string(&graphql::parse(input)?),
        (Format::GoStruct, Format::Proto) => proto::to_string(&structs::parse(input)?),
        (Format::Proto, Format::GoStruct) => structs::to_string(&proto::parse(input)?),
        _ => return Ok(None),
    };
    Ok(Some(output))
}

/// Parse `input` in the given format into the canonical value model
pub fn decode(format: Format, input: &str) -> Result<Value> {
    match format {
        Format::Json => json::parser::parse(input),
        Format::GoStruct => structs::sample_value(&structs::parse(input)?),
        Format::Yaml => yaml::parse(input),
        Format::Toml => toml::parse(input),
        Format::Xml => xml::parse(input),
        Format::JsonSchema => Ok(schema::sample_from_schema(&json::parser::parse(input)?)),
        Format::Graphql => structs::sample_value(&graphql::parse(input)?),
        Format::Proto => structs::sample_value(&proto::parse(input)?),
        Format::Toon => toon::parse(input),
        Format::MsgPack => msgpack::parse(input),
    }
}

/// Render a canonical value as the given format
pub fn encode(format: Format, value: &Value) -> Result<String> {
    match format {
        Format::Json => Ok(json::writer::to_string(value)),
        Format::GoStruct => Ok(structs::to_string(&structs::definitions_from_value(
            value,
            "AutoGenerated",
        )?)),
        Format::Yaml => Ok(yaml::to_string(value)),
        Format::Toml => toml::to_string(value),
        Format::Xml => Ok(xml::to_string(value)),
        Format::JsonSchema => Ok(json::writer::to_string(&schema::build_schema(value))),
        Format::Graphql => Ok(graphql::to_string(&structs::definitions_from_value(
            value,
            "AutoGenerated",
        )?)),
        Format::Proto => Ok(proto::to_string(&structs::definitions_from_value(
            value,
            "AutoGenerated",
        )?)),
        Format::Toon => Ok(toon::to_string(value)),
        Format::MsgPack => Ok(msgpack::to_string(value)),
    }
}

/// Re-print `input` in its own format
///
/// Type-bearing formats go through their own parser and printer so
/// declared names are preserved. `minify` only has an effect where the
/// format has a compact form.
pub fn format_content(format: Format, input: &str, minify: bool) -> Result<String> {
    match format {
        Format::Json => {
            let value = json::parser::parse(input)?;
            Ok(if minify {
                json::writer::to_string_compact(&value)
            } else {
                json::writer::to_string_pretty(&value)
            })
        }
        Format::JsonSchema => {
            let value = json::parser::parse(input)?;
            Ok(if minify {
                json::writer::to_string_compact(&value)
            } else {
                json::writer::to_string_pretty(&value)
            })
        }
        Format::GoStruct => Ok(structs::to_string(&structs::parse(input)?)),
        Format::Graphql => Ok(graphql::to_string(&graphql::parse(input)?)),
        Format::Proto => Ok(proto::to_string(&proto::parse(input)?)),
        Format::Xml => {
            let value = xml::parse(input)?;
            Ok(if minify {
                xml::to_string_compact(&value)
            } else {
                xml::to_string(&value)
            })
        }
        Format::Yaml | Format::Toml | Format::Toon | Format::MsgPack => {
            encode(format, &decode(format, input)?)
        }
    }
}
