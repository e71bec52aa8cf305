//! Number-base, IPv4 and markdown utilities

use std::net::Ipv4Addr;
use std::str::FromStr;
use std::sync::LazyLock;

use indexmap::IndexMap;
use num_bigint::BigInt;
use regex::Regex;

use crate::error::{Error, ErrorKind, Result};
use crate::value::{Array, Object, Value};

/// Render an integer in all four common bases
///
/// `base` names the radix of `value` (`binary`/`octal`/`decimal`/`hex`
/// or the bare radix number); a `0b`/`0o`/`0x` prefix on the value takes
/// precedence. Underscore separators are accepted.
pub fn convert_number_base(base: &str, value: &str) -> Result<IndexMap<String, String>> {
    let cleaned: String = value.chars().filter(|c| *c != '_').collect();
    let (sign, digits) = match cleaned.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", cleaned.as_str()),
    };
    let (radix, digits) = if let Some(rest) = strip_prefix_ci(digits, "0b") {
        (2, rest)
    } else if let Some(rest) = strip_prefix_ci(digits, "0o") {
        (8, rest)
    } else if let Some(rest) = strip_prefix_ci(digits, "0x") {
        (16, rest)
    } else {
        (radix_of(base)?, digits)
    };
    let number = BigInt::parse_bytes(digits.as_bytes(), radix)
        .ok_or_else(|| Error::semantic(ErrorKind::InvalidNumber))?;
    let number = if sign.is_empty() { number } else { -number };
    let render = |radix: u32, prefix: &str| {
        let s = number.to_str_radix(radix);
        match s.strip_prefix('-') {
            Some(rest) => format!("-{prefix}{rest}"),
            None => format!("{prefix}{s}"),
        }
    };
    let mut out = IndexMap::new();
    out.insert("binary".to_string(), render(2, "0b"));
    out.insert("octal".to_string(), render(8, "0o"));
    out.insert("decimal".to_string(), number.to_str_radix(10));
    out.insert("hex".to_string(), render(16, "0x"));
    Ok(out)
}

fn strip_prefix_ci<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    if s.len() >= prefix.len() && s.get(..prefix.len())?.eq_ignore_ascii_case(prefix) {
        s.get(prefix.len()..)
    } else {
        None
    }
}

fn radix_of(base: &str) -> Result<u32> {
    match base.trim().to_ascii_lowercase().as_str() {
        "binary" | "bin" | "2" => Ok(2),
        "octal" | "oct" | "8" => Ok(8),
        "decimal" | "dec" | "10" | "" => Ok(10),
        "hex" | "hexadecimal" | "16" => Ok(16),
        other => Err(Error::unsupported_format(other)),
    }
}

/// Describe an IPv4 address, CIDR block, masked address or range
///
/// Accepted inputs: `a.b.c.d`, `a.b.c.d/24`, `a.b.c.d/255.255.255.0`
/// and `a.b.c.d-e.f.g.h`. A range reports the minimal covering CIDR
/// list.
pub fn ipv4_info(input: &str) -> Result<Value> {
    let input = input.trim();
    if let Some((start, end)) = input.split_once('-') {
        return range_info(parse_addr(start)?, parse_addr(end)?);
    }
    if let Some((addr, suffix)) = input.split_once('/') {
        let addr = parse_addr(addr)?;
        let prefix = if suffix.contains('.') {
            mask_to_prefix(parse_addr(suffix)?)?
        } else {
            let p: u32 = suffix
                .trim()
                .parse()
                .map_err(|_| Error::semantic(ErrorKind::InvalidNumber))?;
            if p > 32 {
                return Err(Error::semantic(ErrorKind::InvalidNumber));
            }
            p
        };
        return cidr_info(addr, prefix);
    }
    let addr = parse_addr(input)?;
    let mut out = Object::new();
    out.insert("address", addr.to_string());
    out.insert("integer", i64::from(u32::from(addr)));
    out.insert("hex", format!("0x{:08x}", u32::from(addr)));
    out.insert("binary", binary_dotted(addr));
    Ok(Value::Object(out))
}

fn parse_addr(s: &str) -> Result<Ipv4Addr> {
    Ipv4Addr::from_str(s.trim()).map_err(|_| Error::semantic(ErrorKind::InvalidToken))
}

fn mask_to_prefix(mask: Ipv4Addr) -> Result<u32> {
    let bits = u32::from(mask);
    let prefix = bits.leading_ones();
    // A valid mask is a run of ones followed by zeros
    if bits.checked_shl(prefix).unwrap_or(0) != 0 {
        return Err(Error::semantic(ErrorKind::InvalidToken));
    }
    Ok(prefix)
}

fn prefix_mask(prefix: u32) -> u32 {
    if prefix == 0 {
        0
    } else {
        u32::MAX << (32 - prefix)
    }
}

fn binary_dotted(addr: Ipv4Addr) -> String {
    addr.octets()
        .map(|o| format!("{o:08b}"))
        .join(".")
}

fn cidr_info(addr: Ipv4Addr, prefix: u32) -> Result<Value> {
    let mask = prefix_mask(prefix);
    let network = u32::from(addr) & mask;
    let broadcast = network | !mask;
    let host_count: u64 = if prefix >= 31 {
        u64::from(broadcast - network + 1)
    } else {
        u64::from(broadcast - network - 1)
    };
    let mut out = Object::new();
    out.insert("address", addr.to_string());
    out.insert("prefix", i64::from(prefix));
    out.insert("netmask", Ipv4Addr::from(mask).to_string());
    out.insert("network", Ipv4Addr::from(network).to_string());
    out.insert("broadcast", Ipv4Addr::from(broadcast).to_string());
    if prefix < 31 {
        out.insert("first_host", Ipv4Addr::from(network + 1).to_string());
        out.insert("last_host", Ipv4Addr::from(broadcast - 1).to_string());
    }
    out.insert(
        "host_count",
        i64::try_from(host_count).unwrap_or(i64::MAX),
    );
    Ok(Value::Object(out))
}

fn range_info(start: Ipv4Addr, end: Ipv4Addr) -> Result<Value> {
    let (lo, hi) = (u64::from(u32::from(start)), u64::from(u32::from(end)));
    if lo > hi {
        return Err(Error::semantic(ErrorKind::InvalidToken));
    }
    let mut cidrs = Array::new();
    let mut cursor = lo;
    while cursor <= hi {
        // Largest aligned power-of-two block that stays inside the range
        let align = if cursor == 0 {
            32
        } else {
            cursor.trailing_zeros().min(32)
        };
        let mut size: u64 = 1 << align;
        while cursor + size - 1 > hi {
            size >>= 1;
        }
        let prefix = 32 - size.trailing_zeros();
        let base = Ipv4Addr::from(u32::try_from(cursor).unwrap_or(u32::MAX));
        cidrs.push(format!("{base}/{prefix}"));
        cursor += size;
    }
    let mut out = Object::new();
    out.insert("start", start.to_string());
    out.insert("end", end.to_string());
    out.insert(
        "count",
        i64::try_from(hi - lo + 1).unwrap_or(i64::MAX),
    );
    out.insert("cidrs", Value::Array(cidrs));
    Ok(Value::Object(out))
}

static BOLD: LazyLock<Regex> = LazyLock::new(|| compile(r"\*\*([^*]+)\*\*"));
static EMPHASIS: LazyLock<Regex> = LazyLock::new(|| compile(r"\*([^*]+)\*"));
static INLINE_CODE: LazyLock<Regex> = LazyLock::new(|| compile(r"`([^`]+)`"));
static LINK: LazyLock<Regex> = LazyLock::new(|| compile(r"\[([^\]]+)\]\(([^)]+)\)"));
static HTML_HEADING: LazyLock<Regex> = LazyLock::new(|| compile(r"<h([1-6])>(.*?)</h[1-6]>"));
static HTML_BOLD: LazyLock<Regex> = LazyLock::new(|| compile(r"</?(?:strong|b)>"));
static HTML_EM: LazyLock<Regex> = LazyLock::new(|| compile(r"</?(?:em|i)>"));
static HTML_CODE: LazyLock<Regex> = LazyLock::new(|| compile(r"</?code>"));
static HTML_LINK: LazyLock<Regex> =
    LazyLock::new(|| compile(r#"<a href="([^"]*)">(.*?)</a>"#));
static HTML_TAG: LazyLock<Regex> = LazyLock::new(|| compile(r"</?[a-zA-Z][^>]*>"));

#[allow(clippy::unwrap_used)]
fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap()
}

/// Render a line-oriented markdown subset as HTML
///
/// Supports headings, unordered and ordered lists, fenced code blocks
/// and the bold/emphasis/inline-code/link inline spans.
pub fn markdown_to_html(markdown: &str) -> String {
    let mut out = String::new();
    let mut in_code = false;
    let mut list_tag: Option<&str> = None;
    let close_list = |out: &mut String, tag: &mut Option<&str>| {
        if let Some(t) = tag.take() {
            out.push_str(&format!("</{t}>\n"));
        }
    };
    for line in markdown.lines() {
        if line.trim_start().starts_with("```") {
            close_list(&mut out, &mut list_tag);
            out.push_str(if in_code {
                "</code></pre>\n"
            } else {
                "<pre><code>"
            });
            in_code = !in_code;
            continue;
        }
        if in_code {
            out.push_str(&escape_html(line));
            out.push('\n');
            continue;
        }
        let trimmed = line.trim();
        if trimmed.is_empty() {
            close_list(&mut out, &mut list_tag);
            continue;
        }
        let hashes = trimmed.chars().take_while(|c| *c == '#').count();
        if (1..=6).contains(&hashes) && trimmed.chars().nth(hashes) == Some(' ') {
            close_list(&mut out, &mut list_tag);
            let body = inline_html(trimmed.get(hashes + 1..).unwrap_or("").trim());
            out.push_str(&format!("<h{hashes}>{body}</h{hashes}>\n"));
            continue;
        }
        if let Some(item) = trimmed
            .strip_prefix("- ")
            .or_else(|| trimmed.strip_prefix("* "))
        {
            if list_tag != Some("ul") {
                close_list(&mut out, &mut list_tag);
                out.push_str("<ul>\n");
                list_tag = Some("ul");
            }
            out.push_str(&format!("<li>{}</li>\n", inline_html(item.trim())));
            continue;
        }
        if let Some(item) = ordered_item(trimmed) {
            if list_tag != Some("ol") {
                close_list(&mut out, &mut list_tag);
                out.push_str("<ol>\n");
                list_tag = Some("ol");
            }
            out.push_str(&format!("<li>{}</li>\n", inline_html(item)));
            continue;
        }
        close_list(&mut out, &mut list_tag);
        out.push_str(&format!("<p>{}</p>\n", inline_html(trimmed)));
    }
    close_list(&mut out, &mut list_tag);
    if in_code {
        out.push_str("</code></pre>\n");
    }
    out
}

fn ordered_item(line: &str) -> Option<&str> {
    let dot = line.find(". ")?;
    let head = line.get(..dot)?;
    if !head.is_empty() && head.bytes().all(|b| b.is_ascii_digit()) {
        line.get(dot + 2..).map(str::trim)
    } else {
        None
    }
}

fn inline_html(text: &str) -> String {
    let text = LINK.replace_all(text, r#"<a href="$2">$1</a>"#);
    let text = BOLD.replace_all(&text, "<strong>$1</strong>");
    let text = EMPHASIS.replace_all(&text, "<em>$1</em>");
    INLINE_CODE.replace_all(&text, "<code>$1</code>").into_owned()
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Reverse [`markdown_to_html`] for the same subset
pub fn html_to_markdown(html: &str) -> String {
    let mut out = String::new();
    let mut in_code = false;
    for line in html.lines() {
        let mut line = line.to_string();
        if line.contains("<pre><code>") {
            out.push_str("```\n");
            line = line.replace("<pre><code>", "");
            in_code = true;
        }
        if line.contains("</code></pre>") {
            line = line.replace("</code></pre>", "");
            if !line.trim().is_empty() {
                out.push_str(&unescape_html(&line));
                out.push('\n');
            }
            out.push_str("```\n");
            in_code = false;
            continue;
        }
        if in_code {
            out.push_str(&unescape_html(&line));
            out.push('\n');
            continue;
        }
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed == "<ul>" || trimmed == "</ul>" || trimmed == "<ol>"
            || trimmed == "</ol>"
        {
            continue;
        }
        if let Some(caps) = HTML_HEADING.captures(trimmed) {
            let level: usize = caps
                .get(1)
                .and_then(|m| m.as_str().parse().ok())
                .unwrap_or(1);
            let body = caps.get(2).map(|m| m.as_str()).unwrap_or("");
            out.push_str(&"#".repeat(level));
            out.push(' ');
            out.push_str(&inline_markdown(body));
            out.push('\n');
            continue;
        }
        if let Some(item) = trimmed
            .strip_prefix("<li>")
            .and_then(|s| s.strip_suffix("</li>"))
        {
            out.push_str("- ");
            out.push_str(&inline_markdown(item));
            out.push('\n');
            continue;
        }
        let body = trimmed
            .strip_prefix("<p>")
            .and_then(|s| s.strip_suffix("</p>"))
            .unwrap_or(trimmed);
        let converted = inline_markdown(body);
        let converted = HTML_TAG.replace_all(&converted, "");
        if !converted.trim().is_empty() {
            out.push_str(converted.trim());
            out.push('\n');
        }
    }
    out
}

fn inline_markdown(text: &str) -> String {
    let text = HTML_LINK.replace_all(text, "[$2]($1)");
    let text = HTML_BOLD.replace_all(&text, "**");
    let text = HTML_EM.replace_all(&text, "*");
    HTML_CODE.replace_all(&text, "`").into_owned()
}

fn unescape_html(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_base_conversions() {
        let out = convert_number_base("decimal", "255").unwrap();
        assert_eq!(out["binary"], "0b11111111");
        assert_eq!(out["octal"], "0o377");
        assert_eq!(out["decimal"], "255");
        assert_eq!(out["hex"], "0xff");
    }

    #[test]
    fn test_number_base_prefixes_and_separators() {
        assert_eq!(convert_number_base("decimal", "0xFF").unwrap()["decimal"], "255");
        assert_eq!(convert_number_base("binary", "1010_1010").unwrap()["hex"], "0xaa");
        assert_eq!(convert_number_base("decimal", "-16").unwrap()["hex"], "-0x10");
    }

    #[test]
    fn test_number_base_big_values() {
        let out = convert_number_base("hex", "ffffffffffffffffffff").unwrap();
        assert_eq!(out["decimal"], "1208925819614629174706175");
    }

    #[test]
    fn test_number_base_rejects_garbage() {
        assert!(convert_number_base("decimal", "12a").is_err());
        assert!(convert_number_base("base7", "12").is_err());
    }

    #[test]
    fn test_ipv4_single_address() {
        let info = ipv4_info("192.168.1.1").unwrap();
        let object = info.as_object().unwrap();
        assert_eq!(object["integer"], Value::Int(3_232_235_777));
        assert_eq!(object["hex"], Value::String("0xc0a80101".to_string()));
    }

    #[test]
    fn test_ipv4_cidr() {
        let info = ipv4_info("192.168.1.130/24").unwrap();
        let object = info.as_object().unwrap();
        assert_eq!(object["network"], Value::String("192.168.1.0".to_string()));
        assert_eq!(object["broadcast"], Value::String("192.168.1.255".to_string()));
        assert_eq!(object["first_host"], Value::String("192.168.1.1".to_string()));
        assert_eq!(object["host_count"], Value::Int(254));
    }

    #[test]
    fn test_ipv4_dotted_mask() {
        let info = ipv4_info("10.0.0.1/255.255.0.0").unwrap();
        let object = info.as_object().unwrap();
        assert_eq!(object["prefix"], Value::Int(16));
        assert_eq!(object["network"], Value::String("10.0.0.0".to_string()));
    }

    #[test]
    fn test_ipv4_range_to_cidrs() {
        let info = ipv4_info("10.0.0.0-10.0.0.255").unwrap();
        let object = info.as_object().unwrap();
        let cidrs = object["cidrs"].as_array().unwrap();
        assert_eq!(cidrs.len(), 1);
        assert_eq!(cidrs[0], Value::String("10.0.0.0/24".to_string()));

        let info = ipv4_info("10.0.0.1-10.0.0.4").unwrap();
        let cidrs = info.as_object().unwrap()["cidrs"].as_array().unwrap().clone();
        assert_eq!(
            cidrs.iter().cloned().collect::<Vec<_>>(),
            vec![
                Value::String("10.0.0.1/32".to_string()),
                Value::String("10.0.0.2/31".to_string()),
                Value::String("10.0.0.4/32".to_string()),
            ]
        );
    }

    #[test]
    fn test_ipv4_rejects_bad_input() {
        assert!(ipv4_info("300.0.0.1").is_err());
        assert!(ipv4_info("10.0.0.1/33").is_err());
        assert!(ipv4_info("10.0.0.1/255.0.255.0").is_err());
        assert!(ipv4_info("10.0.0.9-10.0.0.1").is_err());
    }

    #[test]
    fn test_markdown_to_html_basics() {
        let html = markdown_to_html("# Title\n\nSome **bold** and `code`.\n\n- one\n- two\n");
        assert!(html.contains("<h1>Title</h1>"));
        assert!(html.contains("<p>Some <strong>bold</strong> and <code>code</code>.</p>"));
        assert!(html.contains("<ul>\n<li>one</li>\n<li>two</li>\n</ul>"));
    }

    #[test]
    fn test_markdown_code_fence_escapes() {
        let html = markdown_to_html("```\nif a < b {}\n```\n");
        assert!(html.contains("<pre><code>if a &lt; b {}\n</code></pre>"));
    }

    #[test]
    fn test_markdown_links_and_ordered_lists() {
        let html = markdown_to_html("1. [site](https://example.com)\n2. next\n");
        assert!(html.contains("<ol>"));
        assert!(html.contains(r#"<li><a href="https://example.com">site</a></li>"#));
    }

    #[test]
    fn test_html_to_markdown_round_trip() {
        let markdown = "# Title\n**bold** and *em* and `code`\n- item\n[site](https://example.com)\n";
        let back = html_to_markdown(&markdown_to_html(markdown));
        assert!(back.contains("# Title"));
        assert!(back.contains("**bold** and *em* and `code`"));
        assert!(back.contains("- item"));
        assert!(back.contains("[site](https://example.com)"));
    }
}
