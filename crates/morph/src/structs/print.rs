//! Canonical struct-text printer
//!
//! Output is stable: printing the parse of printed text reproduces it byte
//! for byte, which is what makes struct-text formatting idempotent.

use crate::structs::StructDefinition;

/// Render definitions as canonical struct text
pub fn to_string(defs: &[StructDefinition]) -> String {
    let mut out = String::new();
    for (i, def) in defs.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        write_definition(def, &mut out);
    }
    out
}

fn write_definition(def: &StructDefinition, out: &mut String) {
    out.push_str(&format!("type {} struct {{\n", def.name));

    let name_width = def
        .fields
        .iter()
        .map(|f| f.name.chars().count())
        .max()
        .unwrap_or(0);
    let any_tag = def.fields.iter().any(|f| !f.raw_tag.is_empty());
    let type_width = if any_tag {
        def.fields
            .iter()
            .map(|f| f.type_expr.chars().count())
            .max()
            .unwrap_or(0)
    } else {
        0
    };

    for field in &def.fields {
        for doc_line in field.doc.lines() {
            if !doc_line.trim().is_empty() {
                out.push_str(&format!("\t// {}\n", doc_line.trim()));
            }
        }
        let mut line = String::from("\t");
        if field.name == field.type_expr || is_embedded(field) {
            line.push_str(&field.type_expr);
        } else {
            line.push_str(&pad(&field.name, name_width));
            line.push(' ');
            line.push_str(&pad(&field.type_expr, type_width));
        }
        if !field.raw_tag.is_empty() {
            line.push(' ');
            line.push_str(&format!("`{}`", field.raw_tag));
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out.push_str("}\n");
}

fn is_embedded(field: &crate::structs::StructField) -> bool {
    let base = field.type_expr.trim_start_matches('*');
    base.rsplit('.').next() == Some(field.name.as_str()) && field.type_expr != field.name
}

fn pad(s: &str, width: usize) -> String {
    let len = s.chars().count();
    if len >= width {
        s.to_string()
    } else {
        let mut out = String::with_capacity(width);
        out.push_str(s);
        for _ in len..width {
            out.push(' ');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structs::parse::parse;

    #[test]
    fn test_render_aligned() {
        let defs = parse("type User struct {\n\tName string `json:\"name\"`\n\tAge int `json:\"age\"`\n}").unwrap();
        let text = to_string(&defs);
        assert_eq!(
            text,
            "type User struct {\n\tName string `json:\"name\"`\n\tAge  int    `json:\"age\"`\n}\n"
        );
    }

    #[test]
    fn test_idempotent() {
        let source = "type demo struct{ID string}";
        let once = to_string(&parse(source).unwrap());
        let twice = to_string(&parse(&once).unwrap());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_docs_precede_fields() {
        let defs = parse("type A struct {\n\tN int // count\n}").unwrap();
        let text = to_string(&defs);
        assert_eq!(text, "type A struct {\n\t// count\n\tN int\n}\n");
    }

    #[test]
    fn test_embedded_rendered_bare() {
        let defs = parse("type A struct {\n\thttp.Client\n}").unwrap();
        assert_eq!(to_string(&defs), "type A struct {\n\thttp.Client\n}\n");
    }
}
