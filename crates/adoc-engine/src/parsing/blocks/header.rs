use std::sync::OnceLock;

use regex::Regex;

use crate::models::{Author, NodeKind, Revision};
use crate::parsing::{
    ParseError,
    attrs::substitute_attributes,
    classify::LineKind,
    inline::parse_inline,
};

use super::Parser;

fn attribute_entry_regex() -> &'static Regex {
    static ATTRIBUTE_ENTRY_REGEX: OnceLock<Regex> = OnceLock::new();
    ATTRIBUTE_ENTRY_REGEX.get_or_init(|| {
        Regex::new(r"^:(!?)([A-Za-z0-9_][A-Za-z0-9_-]*)(!?):(?:[ \t]+(.*))?$")
            .expect("Invalid attribute entry regex")
    })
}

fn author_regex() -> &'static Regex {
    static AUTHOR_REGEX: OnceLock<Regex> = OnceLock::new();
    AUTHOR_REGEX.get_or_init(|| {
        Regex::new(r"^([\w'.-]+)(?:\s+([\w'.-]+))?(?:\s+([\w'.-]+))?(?:\s+<([^>\s]+)>)?$")
            .expect("Invalid author regex")
    })
}

fn revision_regex() -> &'static Regex {
    static REVISION_REGEX: OnceLock<Regex> = OnceLock::new();
    REVISION_REGEX.get_or_init(|| {
        Regex::new(r"^v?(\d[\w.-]*)(?:,\s*([^:]*?))?(?:\s*:\s*(.*))?$")
            .expect("Invalid revision regex")
    })
}

impl Parser<'_> {
    /// Reads the document header: leading attribute entries and comments,
    /// the `= Title` line, then author, revision and attribute entries up
    /// to the first blank line.
    pub(crate) fn parse_header(&mut self) -> Result<(), ParseError> {
        loop {
            let Some(line) = self.next_line() else {
                return Ok(());
            };
            match line.kind {
                LineKind::Empty | LineKind::Comment => {}
                LineKind::BlockComment => self.skip_comment_block(),
                LineKind::AttributeEntry => {
                    if !self.attribute_entry(&line.content)? {
                        self.unread();
                        return Ok(());
                    }
                }
                LineKind::SectionTitle(0) => {
                    self.document_title(&line.content);
                    break;
                }
                _ => {
                    self.unread();
                    return Ok(());
                }
            }
        }

        let mut expect_author = true;
        let mut expect_revision = false;
        while let Some(line) = self.next_line() {
            match line.kind {
                LineKind::Empty => break,
                LineKind::Comment => continue,
                LineKind::AttributeEntry if self.attribute_entry(&line.content)? => {
                    expect_author = false;
                    expect_revision = false;
                }
                LineKind::Text if expect_author && self.author_line(&line.content) => {
                    expect_author = false;
                    expect_revision = true;
                }
                LineKind::Text if expect_revision && self.revision_line(&line.content) => {
                    expect_revision = false;
                }
                _ => {
                    self.unread();
                    break;
                }
            }
        }
        Ok(())
    }

    fn document_title(&mut self, content: &str) {
        let text = content[1..].trim();
        let holder = self.doc.tree.new_node(NodeKind::Text);
        self.doc.tree[holder].raw = text.to_string();
        parse_inline(self.doc, holder);
        let plain = self.doc.cache_text(holder);
        let (main, subtitle) = match plain.rsplit_once(": ") {
            Some((main, sub)) => (main.to_string(), Some(sub.to_string())),
            None => (plain.clone(), None),
        };
        self.doc.header.title = Some(holder);
        self.doc.header.main_title = main;
        self.doc.header.subtitle = subtitle;
        self.set_attribute("doctitle", &plain);
    }

    /// `First Middle Last <email>; Other Author`
    fn author_line(&mut self, content: &str) -> bool {
        let mut authors = vec![];
        for part in content.split(';') {
            let Some(caps) = author_regex().captures(part.trim()) else {
                return false;
            };
            let names: Vec<String> = (1..=3)
                .filter_map(|i| caps.get(i))
                .map(|m| m.as_str().replace('_', " "))
                .collect();
            let (first, middle, last) = match names.as_slice() {
                [f] => (f.clone(), String::new(), String::new()),
                [f, l] => (f.clone(), String::new(), l.clone()),
                [f, m, l] => (f.clone(), m.clone(), l.clone()),
                _ => return false,
            };
            let initials = names.iter().filter_map(|n| n.chars().next()).collect();
            authors.push(Author {
                full_name: names.join(" "),
                first_name: first,
                middle_name: middle,
                last_name: last,
                initials,
                email: caps.get(4).map(|m| m.as_str().to_string()),
            });
        }
        if authors.is_empty() {
            return false;
        }
        let first = &authors[0];
        let pairs = [
            ("author", first.full_name.clone()),
            ("firstname", first.first_name.clone()),
            ("middlename", first.middle_name.clone()),
            ("lastname", first.last_name.clone()),
            ("authorinitials", first.initials.clone()),
            ("email", first.email.clone().unwrap_or_default()),
            (
                "authors",
                authors
                    .iter()
                    .map(|a| a.full_name.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
            ),
        ];
        for (name, value) in pairs {
            if !value.is_empty() {
                self.set_attribute(name, &value);
            }
        }
        self.doc.header.authors = authors;
        true
    }

    /// `v1.0, 2024-01-01: remark`
    fn revision_line(&mut self, content: &str) -> bool {
        let Some(caps) = revision_regex().captures(content) else {
            return false;
        };
        let get = |i| caps.get(i).map_or("", |m| m.as_str().trim()).to_string();
        let rev = Revision {
            number: get(1),
            date: get(2),
            remark: get(3),
        };
        for (name, value) in [
            ("revnumber", &rev.number),
            ("revdate", &rev.date),
            ("revremark", &rev.remark),
        ] {
            if !value.is_empty() {
                self.set_attribute(name, value);
            }
        }
        self.doc.header.revision = Some(rev);
        true
    }

    /// Sets an attribute unless the caller locked it.
    fn set_attribute(&mut self, name: &str, value: &str) {
        if !self.locked.contains(name) {
            self.doc
                .attributes
                .insert(name.to_string(), value.to_string());
        }
    }

    /// Applies an attribute entry line. Returns false when the line is not
    /// a valid entry.
    ///
    /// Values ending in ` \` continue on the next line.
    pub(crate) fn attribute_entry(&mut self, content: &str) -> Result<bool, ParseError> {
        let Some(caps) = attribute_entry_regex().captures(content) else {
            return Ok(false);
        };
        let name = caps[2].to_ascii_lowercase();
        let unset = !caps[1].is_empty() || !caps[3].is_empty();
        let mut value = caps.get(4).map_or("", |m| m.as_str()).to_string();
        while let Some(head) = value.strip_suffix(" \\") {
            let head = head.to_string();
            let Some(next) = self.next_line() else {
                value = head;
                break;
            };
            value = format!("{head} {}", next.raw().trim());
        }

        if self.locked.contains(&name) {
            log::debug!("attribute {name:?} is locked; ignoring entry");
            return Ok(true);
        }
        if unset {
            self.doc.attributes.remove(&name);
            if name == "leveloffset" {
                self.level_offset = 0;
            }
            return Ok(true);
        }
        let value = substitute_attributes(&value, &self.doc.attributes);
        if name == "leveloffset" {
            self.apply_level_offset(&value)?;
        }
        self.doc.attributes.insert(name, value);
        Ok(true)
    }

    fn apply_level_offset(&mut self, value: &str) -> Result<(), ParseError> {
        self.level_offset =
            self.shifted_offset(value)
                .ok_or_else(|| ParseError::InvalidLevelOffset {
                    value: value.trim().to_string(),
                    line: self.x,
                })?;
        Ok(())
    }

    /// `+N` and `-N` shift the current offset, `N` replaces it, empty is 0.
    pub(crate) fn shifted_offset(&self, value: &str) -> Option<i32> {
        let v = value.trim();
        if v.is_empty() {
            Some(0)
        } else if let Some(n) = v.strip_prefix('+') {
            n.parse::<i32>().ok().map(|n| self.level_offset + n)
        } else if let Some(n) = v.strip_prefix('-') {
            n.parse::<i32>().ok().map(|n| self.level_offset - n)
        } else {
            v.parse::<i32>().ok()
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::models::Document;
    use crate::parsing::{ParseError, ParseOptions, parse_document};
    use pretty_assertions::assert_eq;

    fn parse(input: &str) -> Document {
        parse_document(input, &ParseOptions::default()).unwrap()
    }

    #[test]
    fn title_author_revision() {
        let doc = parse(
            "= The Guide: Second Edition\nJane Q Doe <jane@example.org>; Bo Lee\nv2.1, 2024-05-01: Revised\n:toc:\n\nBody",
        );
        assert_eq!(doc.title().as_deref(), Some("The Guide: Second Edition"));
        assert_eq!(doc.header.main_title, "The Guide");
        assert_eq!(doc.header.subtitle.as_deref(), Some("Second Edition"));
        assert_eq!(doc.header.authors.len(), 2);
        assert_eq!(doc.header.authors[0].middle_name, "Q");
        assert_eq!(doc.attribute("email"), Some("jane@example.org"));
        assert_eq!(doc.attribute("authorinitials"), Some("JQD"));
        assert_eq!(doc.attribute("authors"), Some("Jane Q Doe, Bo Lee"));
        assert_eq!(doc.attribute("revnumber"), Some("2.1"));
        assert_eq!(doc.attribute("revdate"), Some("2024-05-01"));
        assert_eq!(doc.attribute("revremark"), Some("Revised"));
        assert_eq!(doc.attribute("toc"), Some(""));
    }

    #[test]
    fn header_without_author_keeps_first_line_as_body() {
        let doc = parse("= Title\nThis is not, an author line at all\n\nBody");
        assert!(doc.header.authors.is_empty());
        assert_eq!(doc.tree.children(doc.preamble).count(), 2);
    }

    #[test]
    fn entries_set_unset_and_continue() {
        let doc = parse(":a: one\n:b: two \\\nthree\n:c: {a}-{b}\n:a!:\n\ntext");
        assert_eq!(doc.attribute("a"), None);
        assert_eq!(doc.attribute("b"), Some("two three"));
        assert_eq!(doc.attribute("c"), Some("one-two three"));
    }

    #[test]
    fn locked_attributes_win() {
        let mut options = ParseOptions::default();
        options.attributes.insert("name".into(), "caller".into());
        let doc = parse_document(":name: doc\n\n{name}", &options).unwrap();
        assert_eq!(doc.attribute("name"), Some("caller"));
    }

    #[test]
    fn invalid_leveloffset_is_an_error() {
        let err = parse_document(":leveloffset: two\n", &ParseOptions::default()).unwrap_err();
        assert!(matches!(err, ParseError::InvalidLevelOffset { ref value, .. } if value == "two"));
    }

    #[test]
    fn leveloffset_shifts_sections() {
        let doc = parse(":leveloffset: +1\n\n== A\n\n:leveloffset: -1\n\n== B");
        let levels: Vec<usize> = doc.sections().iter().map(|&s| doc.tree[s].level).collect();
        assert_eq!(levels, vec![2, 1]);
    }
}
