//! # Attribute Lists
//!
//! Parsing of the bracketed attribute lists shared by block attribute lines,
//! block macros and inline macros, plus `{name}` reference substitution for
//! places that expand references outside the inline parser (include targets,
//! attribute values, listing content).

use std::collections::BTreeMap;

use super::kinds::is_valid_id;

/// A parsed `[positional, key=value, ...]` list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttrList {
    pub positional: Vec<String>,
    pub named: Vec<(String, String)>,
}

impl AttrList {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.named
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn positional(&self, n: usize) -> Option<&str> {
        self.positional
            .get(n)
            .map(String::as_str)
            .filter(|s| !s.is_empty())
    }
}

/// Splits the inside of an attribute list on commas, honouring single and
/// double quotes. Returns `None` on an unterminated quote.
pub fn parse_attrlist(s: &str) -> Option<AttrList> {
    let mut list = AttrList::default();
    if s.trim().is_empty() {
        return Some(list);
    }
    let b = s.as_bytes();
    let mut i = 0;
    loop {
        while i < b.len() && b[i] == b' ' {
            i += 1;
        }
        let (key, value, next) = parse_entry(s, i)?;
        match key {
            Some(k) => list.named.push((k, value)),
            None => list.positional.push(value),
        }
        i = next;
        if i >= b.len() {
            break;
        }
        // separator
        i += 1;
    }
    Some(list)
}

/// Parses one entry starting at `start`; returns the key (if named), the
/// value and the index of the terminating comma or end of input.
fn parse_entry(s: &str, start: usize) -> Option<(Option<String>, String, usize)> {
    let b = s.as_bytes();
    let mut key = None;
    let mut i = start;

    if let Some(eq) = s[start..].find(['=', ',']).map(|p| p + start)
        && b[eq] == b'='
    {
        let name = s[start..eq].trim();
        if !name.is_empty() && !name.contains(['"', '\'', ' ']) {
            key = Some(name.to_string());
            i = eq + 1;
            while i < b.len() && b[i] == b' ' {
                i += 1;
            }
        }
    }

    if i < b.len() && (b[i] == b'"' || b[i] == b'\'') {
        let quote = b[i];
        let mut value = String::new();
        let mut j = i + 1;
        loop {
            if j >= b.len() {
                return None;
            }
            if b[j] == b'\\' && b.get(j + 1) == Some(&quote) {
                value.push(quote as char);
                j += 2;
                continue;
            }
            if b[j] == quote {
                break;
            }
            let c = s[j..].chars().next()?;
            value.push(c);
            j += c.len_utf8();
        }
        j += 1;
        // anything between the closing quote and the comma is dropped
        let end = s[j..].find(',').map_or(b.len(), |p| p + j);
        return Some((key, value, end));
    }

    let end = s[i..].find(',').map_or(b.len(), |p| p + i);
    Some((key, s[i..end].trim().to_string(), end))
}

/// The `#id.role%option` shorthand allowed in the first positional
/// attribute. The leading style name (if any) is returned separately.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Shorthand {
    pub style: Option<String>,
    pub id: Option<String>,
    pub roles: Vec<String>,
    pub options: Vec<String>,
}

pub fn parse_shorthand(s: &str) -> Option<Shorthand> {
    let mut out = Shorthand::default();
    let mut parts = vec![];
    let mut start = 0;
    for (i, c) in s.char_indices() {
        if matches!(c, '#' | '.' | '%') && i > start {
            parts.push(&s[start..i]);
            start = i;
        } else if matches!(c, '#' | '.' | '%') {
            start = i;
        }
    }
    parts.push(&s[start..]);

    for (n, part) in parts.into_iter().enumerate() {
        if part.is_empty() {
            continue;
        }
        match part.as_bytes()[0] {
            b'#' => {
                let id = &part[1..];
                if !is_valid_id(id) {
                    return None;
                }
                out.id = Some(id.to_string());
            }
            b'.' if part.len() > 1 => out.roles.push(part[1..].to_string()),
            b'%' if part.len() > 1 => out.options.push(part[1..].to_string()),
            _ if n == 0 => out.style = Some(part.trim().to_string()),
            _ => return None,
        }
    }
    Some(out)
}

/// Replaces `{name}` references with attribute values. Unknown references
/// and escaped `\{name}` are kept literally.
pub fn substitute_attributes(s: &str, attributes: &BTreeMap<String, String>) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(open) = rest.find('{') {
        if open > 0 && rest.as_bytes()[open - 1] == b'\\' {
            out.push_str(&rest[..open - 1]);
            out.push('{');
            rest = &rest[open + 1..];
            continue;
        }
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) if attributes.contains_key(&after[..close]) => {
                out.push_str(&attributes[&after[..close]]);
                rest = &after[close + 1..];
            }
            _ => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Alt text derived from an image path: file stem with `-` and `_` as spaces.
pub fn default_alt(target: &str) -> String {
    let file = target.rsplit('/').next().unwrap_or(target);
    let stem = file.rsplit_once('.').map_or(file, |(s, _)| s);
    stem.replace(['-', '_'], " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn positional_and_named() {
        let got = parse_attrlist("source, rust, linenums, title=\"A, B\"").unwrap();
        assert_eq!(got.positional, vec!["source", "rust", "linenums"]);
        assert_eq!(got.get("title"), Some("A, B"));
    }

    #[test]
    fn single_quotes_and_escapes() {
        let got = parse_attrlist("alt='it\\'s here',width=40").unwrap();
        assert_eq!(got.get("alt"), Some("it's here"));
        assert_eq!(got.get("width"), Some("40"));
    }

    #[test]
    fn unterminated_quote_is_rejected() {
        assert_eq!(parse_attrlist("title=\"open"), None);
    }

    #[test]
    fn empty_list() {
        assert_eq!(parse_attrlist("").unwrap(), AttrList::default());
    }

    #[test]
    fn blank_positional_is_skipped_by_accessor() {
        let got = parse_attrlist("quote, , Source").unwrap();
        assert_eq!(got.positional(1), None);
        assert_eq!(got.positional(2), Some("Source"));
    }

    #[test]
    fn shorthand_splits_style_id_roles_options() {
        let got = parse_shorthand("source#main.lead.big%linenums").unwrap();
        assert_eq!(got.style.as_deref(), Some("source"));
        assert_eq!(got.id.as_deref(), Some("main"));
        assert_eq!(got.roles, vec!["lead", "big"]);
        assert_eq!(got.options, vec!["linenums"]);
    }

    #[test]
    fn shorthand_rejects_invalid_id() {
        assert_eq!(parse_shorthand("#1bad"), None);
    }

    #[test]
    fn substitutes_known_references_only() {
        let mut attrs = BTreeMap::new();
        attrs.insert("name".to_string(), "World".to_string());
        assert_eq!(
            substitute_attributes("Hello {name} {missing} \\{name}", &attrs),
            "Hello World {missing} {name}"
        );
    }

    #[test]
    fn alt_text_from_target() {
        assert_eq!(default_alt("img/sunset-view.png"), "sunset view");
        assert_eq!(default_alt("logo"), "logo");
    }
}
