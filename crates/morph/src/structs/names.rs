//! Identifier casing rules shared by struct-text and the schema projections

/// Title-case a key into an exported identifier: `user_name` -> `UserName`
pub fn export_name(key: &str) -> String {
    let mut out = String::new();
    let mut cap_next = true;
    for c in key.chars() {
        if c.is_alphanumeric() {
            if cap_next {
                out.extend(c.to_uppercase());
                cap_next = false;
            } else {
                out.push(c);
            }
        } else {
            cap_next = true;
        }
    }
    // Identifiers cannot start with a digit
    let trimmed: String = out
        .chars()
        .skip_while(|c| !c.is_alphabetic() && *c != '_')
        .collect();
    trimmed
}

/// Lower-camel an identifier, keeping acronym runs: `HTTPServerV2` -> `httpServerV2`
pub fn lower_camel(s: &str) -> String {
    if s.is_empty() {
        return String::new();
    }
    let words = split_words(s);
    let Some((first, rest)) = words.split_first() else {
        return s.to_lowercase();
    };
    let mut out = first.to_lowercase();
    for word in rest {
        if word.is_empty() {
            continue;
        }
        if is_all_upper(word) {
            out.push_str(word);
            continue;
        }
        let lowered = word.to_lowercase();
        let mut chars = lowered.chars();
        if let Some(head) = chars.next() {
            out.extend(head.to_uppercase());
            out.push_str(chars.as_str());
        }
    }
    out
}

/// Split on case and digit boundaries: `HTTPServerV2` -> [HTTP, Server, V, 2]
pub fn split_words(s: &str) -> Vec<String> {
    let runes: Vec<char> = s.chars().collect();
    let Some(&head) = runes.first() else {
        return Vec::new();
    };
    let mut parts = Vec::new();
    let mut current = vec![head];
    for i in 1..runes.len() {
        let c = runes[i];
        let prev = runes[i - 1];
        let next_lower = runes.get(i + 1).is_some_and(|n| n.is_lowercase());
        let boundary = if c.is_uppercase() {
            prev.is_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_uppercase() && next_lower)
        } else if c.is_ascii_digit() {
            !prev.is_ascii_digit()
        } else {
            prev.is_ascii_digit()
        };
        if boundary {
            parts.push(current.iter().collect());
            current = vec![c];
        } else {
            current.push(c);
        }
    }
    parts.push(current.iter().collect());
    parts
}

fn is_all_upper(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| !c.is_alphabetic() || c.is_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_name() {
        assert_eq!(export_name("user_name"), "UserName");
        assert_eq!(export_name("HTTP_server_v2"), "HTTPServerV2");
        assert_eq!(export_name("a1 b2"), "A1B2");
        assert_eq!(export_name("2fa_code"), "faCode");
    }

    #[test]
    fn test_lower_camel() {
        assert_eq!(lower_camel("UserName"), "userName");
        assert_eq!(lower_camel("HTTPServerV2"), "httpServerV2");
        assert_eq!(lower_camel("ID"), "id");
        assert_eq!(lower_camel("Name"), "name");
    }

    #[test]
    fn test_split_words() {
        assert_eq!(split_words("HTTPServerV2"), vec!["HTTP", "Server", "V", "2"]);
        assert_eq!(split_words("userName"), vec!["user", "Name"]);
    }
}
