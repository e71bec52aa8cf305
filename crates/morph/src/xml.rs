//! XML parser and writer
//!
//! The element model is structural: name, children, text. Attributes are
//! accepted on ingest and ignored, since conversion only cares about element
//! shape. Leaf text maps to strings.

use crate::error::{Error, ErrorKind, Result};
use crate::value::{Array, Object, Value};

/// Minimal element tree
#[derive(Clone, Debug, PartialEq)]
pub struct Element {
    pub name: String,
    pub children: Vec<Element>,
    pub text: String,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
            text: String::new(),
        }
    }
}

/// Parse an XML document into a [`Value`]
///
/// The root element's own name is dropped; its content becomes the value.
pub fn parse(input: &str) -> Result<Value> {
    let root = parse_element_tree(input)?;
    Ok(element_to_value(&root))
}

/// Parse the document into its root [`Element`]
pub fn parse_element_tree(input: &str) -> Result<Element> {
    let mut parser = XmlParser {
        chars: input.chars().collect(),
        pos: 0,
        line: 1,
    };
    parser.skip_prolog();
    let root = parser.parse_element()?;
    parser.skip_misc();
    if parser.pos < parser.chars.len() {
        return Err(Error::on_line(ErrorKind::InvalidToken, parser.line));
    }
    Ok(root)
}

/// Render a [`Value`] as XML wrapped in `<root>`, 2-space indentation
pub fn to_string(value: &Value) -> String {
    let mut out = String::new();
    write_value("root", value, 0, true, &mut out);
    out
}

/// Render without any inter-tag whitespace
pub fn to_string_compact(value: &Value) -> String {
    let mut out = String::new();
    write_value("root", value, 0, false, &mut out);
    out
}

struct XmlParser {
    chars: Vec<char>,
    pos: usize,
    line: u32,
}

impl XmlParser {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, ahead: usize) -> Option<char> {
        self.chars.get(self.pos + ahead).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek();
        if c == Some('\n') {
            self.line += 1;
        }
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.bump();
        }
    }

    fn starts_with(&self, prefix: &str) -> bool {
        prefix
            .chars()
            .enumerate()
            .all(|(i, c)| self.peek_at(i) == Some(c))
    }

    fn skip_until(&mut self, marker: &str) {
        while self.pos < self.chars.len() && !self.starts_with(marker) {
            self.bump();
        }
        for _ in 0..marker.chars().count() {
            self.bump();
        }
    }

    fn skip_prolog(&mut self) {
        loop {
            self.skip_ws();
            if self.starts_with("<?") {
                self.skip_until("?>");
            } else if self.starts_with("<!--") {
                self.skip_until("-->");
            } else if self.starts_with("<!") {
                self.skip_until(">");
            } else {
                return;
            }
        }
    }

    fn skip_misc(&mut self) {
        loop {
            self.skip_ws();
            if self.starts_with("<!--") {
                self.skip_until("-->");
            } else {
                return;
            }
        }
    }

    fn parse_element(&mut self) -> Result<Element> {
        if self.bump() != Some('<') {
            return Err(Error::on_line(ErrorKind::InvalidToken, self.line));
        }
        let name = self.parse_name()?;
        let mut element = Element::new(name);

        // Attributes are skipped; only the tag close matters
        loop {
            self.skip_ws();
            match self.peek() {
                Some('/') if self.peek_at(1) == Some('>') => {
                    self.bump();
                    self.bump();
                    return Ok(element);
                }
                Some('>') => {
                    self.bump();
                    break;
                }
                Some(_) => {
                    self.bump();
                }
                None => return Err(Error::on_line(ErrorKind::UnexpectedEof, self.line)),
            }
        }

        // Content until the matching close tag
        loop {
            if self.starts_with("</") {
                self.bump();
                self.bump();
                let close = self.parse_name()?;
                if close != element.name {
                    return Err(Error::with_message(
                        ErrorKind::Expected {
                            expected: format!("</{}>", element.name),
                            found: format!("</{close}>"),
                        },
                        crate::error::Span::line(self.line),
                        format!("mismatched closing tag </{close}>"),
                    ));
                }
                self.skip_ws();
                if self.bump() != Some('>') {
                    return Err(Error::on_line(ErrorKind::InvalidToken, self.line));
                }
                return Ok(element);
            }
            if self.starts_with("<!--") {
                self.skip_until("-->");
                continue;
            }
            if self.starts_with("<![CDATA[") {
                for _ in 0.."<![CDATA[".len() {
                    self.bump();
                }
                let mut text = String::new();
                while self.pos < self.chars.len() && !self.starts_with("]]>") {
                    if let Some(c) = self.bump() {
                        text.push(c);
                    }
                }
                self.skip_until("]]>");
                element.text.push_str(&text);
                continue;
            }
            match self.peek() {
                Some('<') => element.children.push(self.parse_element()?),
                Some(_) => {
                    let mut text = String::new();
                    while let Some(c) = self.peek() {
                        if c == '<' {
                            break;
                        }
                        text.push(c);
                        self.bump();
                    }
                    let trimmed = text.trim();
                    if !trimmed.is_empty() {
                        element.text.push_str(&unescape(trimmed));
                    }
                }
                None => return Err(Error::on_line(ErrorKind::UnexpectedEof, self.line)),
            }
        }
    }

    fn parse_name(&mut self) -> Result<String> {
        let mut name = String::new();
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | ':') {
                name.push(c);
                self.bump();
            } else {
                break;
            }
        }
        if name.is_empty() {
            return Err(Error::on_line(ErrorKind::InvalidToken, self.line));
        }
        Ok(name)
    }
}

fn element_to_value(element: &Element) -> Value {
    if element.children.is_empty() {
        return Value::String(element.text.clone());
    }
    // Fold repeated sibling names into arrays, first-seen order
    let mut object = Object::new();
    for child in &element.children {
        let value = element_to_value(child);
        match object.get_mut(&child.name) {
            None => {
                object.insert(child.name.clone(), value);
            }
            Some(Value::Array(array)) => array.push(value),
            Some(existing) => {
                let first = std::mem::replace(existing, Value::Null);
                let mut array = Array::new();
                array.push(first);
                array.push(value);
                *existing = Value::Array(array);
            }
        }
    }
    Value::Object(object)
}

fn write_value(name: &str, value: &Value, indent: usize, pretty: bool, out: &mut String) {
    match value {
        Value::Array(array) => {
            // Repeated element per array entry, same name
            for (i, item) in array.iter().enumerate() {
                if pretty && i > 0 {
                    out.push('\n');
                }
                write_value(name, item, indent, pretty, out);
            }
            if array.is_empty() {
                push_indent(indent, pretty, out);
                out.push_str(&format!("<{name}/>"));
            }
        }
        Value::Object(object) if !object.is_empty() => {
            push_indent(indent, pretty, out);
            out.push_str(&format!("<{name}>"));
            for key in object.sorted_keys() {
                if pretty {
                    out.push('\n');
                }
                write_value(key, &object[key], indent + 1, pretty, out);
            }
            if pretty {
                out.push('\n');
                push_indent(indent, pretty, out);
            }
            out.push_str(&format!("</{name}>"));
        }
        Value::Object(_) => {
            push_indent(indent, pretty, out);
            out.push_str(&format!("<{name}/>"));
        }
        scalar => {
            push_indent(indent, pretty, out);
            let text = match scalar {
                Value::Null => String::new(),
                Value::Bool(b) => b.to_string(),
                Value::Int(n) => n.to_string(),
                Value::Float(n) => n.to_string(),
                Value::String(s) => escape(s),
                _ => String::new(),
            };
            if text.is_empty() {
                out.push_str(&format!("<{name}/>"));
            } else {
                out.push_str(&format!("<{name}>{text}</{name}>"));
            }
        }
    }
}

fn push_indent(indent: usize, pretty: bool, out: &mut String) {
    if pretty {
        for _ in 0..indent {
            out.push_str("  ");
        }
    }
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(i) = rest.find('&') {
        out.push_str(rest.get(..i).unwrap_or(""));
        let tail = rest.get(i..).unwrap_or("");
        let replaced = [
            ("&amp;", '&'),
            ("&lt;", '<'),
            ("&gt;", '>'),
            ("&quot;", '"'),
            ("&apos;", '\''),
        ]
        .iter()
        .find(|(entity, _)| tail.starts_with(entity));
        match replaced {
            Some((entity, c)) => {
                out.push(*c);
                rest = tail.get(entity.len()..).unwrap_or("");
            }
            None => {
                out.push('&');
                rest = tail.get(1..).unwrap_or("");
            }
        }
    }
    out.push_str(rest);
    out
}
