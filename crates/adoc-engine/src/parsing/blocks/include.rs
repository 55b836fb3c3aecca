use std::sync::OnceLock;

use regex::Regex;

use crate::io::resolve_include_path;
use crate::parsing::attrs::{parse_attrlist, substitute_attributes};

use super::Parser;

fn include_regex() -> &'static Regex {
    static INCLUDE_REGEX: OnceLock<Regex> = OnceLock::new();
    INCLUDE_REGEX
        .get_or_init(|| Regex::new(r"^include::(\S+?)\[(.*)\]$").expect("Invalid include regex"))
}

impl Parser<'_> {
    /// Replaces the include directive just read with the lines of the
    /// included file and moves the cursor back onto the first of them.
    ///
    /// Returns false, leaving the directive to be read as text, when the
    /// line is malformed, the include limit is reached or the file cannot
    /// be resolved.
    pub(crate) fn splice_include(&mut self, content: &str) -> bool {
        let Some(caps) = include_regex().captures(content) else {
            return false;
        };
        if self.includes >= self.options.max_includes {
            log::warn!(
                "include limit of {} reached; keeping {content:?} as text",
                self.options.max_includes
            );
            return false;
        }
        let target = substitute_attributes(&caps[1], &self.doc.attributes);
        let path = resolve_include_path(&self.options.base_dir, &target);
        let Some(text) = self.options.resolver.resolve(&path) else {
            log::warn!("unresolved include {}", path.display());
            return false;
        };
        let opts = parse_attrlist(&caps[2]).unwrap_or_default();

        let mut spliced: Vec<String> = text.lines().map(str::to_string).collect();
        if let Some(spec) = opts.get("lines") {
            spliced = select_lines(spliced, spec);
        }
        log::debug!("including {} lines from {}", spliced.len(), path.display());

        self.includes += 1;
        self.x -= 1;
        let at = self.x;
        let added = spliced.len();
        for (end, _) in &mut self.level_restores {
            if *end > at {
                *end = *end + added - 1;
            }
        }
        if let Some(value) = opts.get("leveloffset") {
            match self.shifted_offset(value) {
                Some(offset) => {
                    self.level_restores.push((at + added, self.level_offset));
                    self.level_offset = offset;
                }
                None => log::warn!("ignoring invalid include leveloffset {value:?}"),
            }
        }
        self.lines.splice(at..=at, spliced);
        true
    }
}

/// Keeps the 1-based line ranges in `spec`: `1..3;7`, `5..-1` (to the end).
fn select_lines(lines: Vec<String>, spec: &str) -> Vec<String> {
    let n = lines.len();
    let mut keep = vec![false; n];
    for part in spec.split([';', ',']).map(str::trim).filter(|p| !p.is_empty()) {
        let (from, to) = match part.split_once("..") {
            Some((a, b)) => (a.trim().parse::<i64>(), b.trim().parse::<i64>()),
            None => (part.parse::<i64>(), part.parse::<i64>()),
        };
        let (Ok(from), Ok(to)) = (from, to) else {
            continue;
        };
        let to = if to < 0 { n as i64 } else { to };
        for i in from.max(1)..=to.min(n as i64) {
            keep[(i - 1) as usize] = true;
        }
    }
    lines
        .into_iter()
        .zip(keep)
        .filter_map(|(l, k)| k.then_some(l))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::select_lines;
    use crate::io::IncludeResolver;
    use crate::models::Document;
    use crate::parsing::{ParseOptions, parse_document, snapshot::dump};
    use pretty_assertions::assert_eq;

    /// Serves files from an in-memory list.
    struct MapResolver(Vec<(&'static str, &'static str)>);

    impl IncludeResolver for MapResolver {
        fn resolve(&self, path: &Path) -> Option<String> {
            self.0
                .iter()
                .find(|(name, _)| path.ends_with(name))
                .map(|(_, body)| body.to_string())
        }
    }

    fn parse_with(input: &str, files: Vec<(&'static str, &'static str)>) -> Document {
        let options = ParseOptions {
            resolver: Box::new(MapResolver(files)),
            ..ParseOptions::default()
        };
        parse_document(input, &options).unwrap()
    }

    #[test]
    fn included_lines_replace_directive() {
        let doc = parse_with(
            "before\n\ninclude::part.adoc[]\n\nafter",
            vec![("part.adoc", "* one\n* two")],
        );
        insta::assert_snapshot!(dump(&doc, doc.preamble), @r#"
        Preamble
          Paragraph
            Text "before"
          ListUnordered level=1
            ListUnorderedItem level=1
              Paragraph
                Text "one"
            ListUnorderedItem level=1
              Paragraph
                Text "two"
          Paragraph
            Text "after"
        "#);
    }

    #[test]
    fn missing_include_stays_as_text() {
        let doc = parse_with("include::missing.adoc[]", vec![]);
        insta::assert_snapshot!(dump(&doc, doc.preamble), @r#"
        Preamble
          Paragraph
            Text "include::missing.adoc[]"
        "#);
    }

    #[test]
    fn self_include_stops_at_limit() {
        let options = ParseOptions {
            resolver: Box::new(MapResolver(vec![("loop.adoc", "x\ninclude::loop.adoc[]")])),
            max_includes: 3,
            ..ParseOptions::default()
        };
        let doc = parse_document("include::loop.adoc[]", &options).unwrap();
        let p = doc.tree.children(doc.preamble).next().unwrap();
        assert_eq!(doc.plain_text(p), "x\nx\nx\ninclude::loop.adoc[]");
    }

    #[test]
    fn include_target_expands_attributes_and_leveloffset() {
        let doc = parse_with(
            ":chapter: intro\n\n== Top\n\ninclude::{chapter}.adoc[leveloffset=+1]\n\n== Next",
            vec![("intro.adoc", "== Intro")],
        );
        let levels: Vec<usize> = doc.sections().iter().map(|&s| doc.tree[s].level).collect();
        assert_eq!(levels, vec![1, 2, 1]);
    }

    #[test]
    fn leveloffset_include_ending_in_prose_restores_offset() {
        let doc = parse_with(
            "include::part.adoc[leveloffset=+1]\n\n== After",
            vec![("part.adoc", "Some included text")],
        );
        insta::assert_snapshot!(dump(&doc, doc.root), @r#"
        Root
          Preamble
            Paragraph
              Text "Some included text"
          Section level=1 #_after title="After"
        "#);
    }

    #[test]
    fn leveloffset_include_directly_after_paragraph() {
        let doc = parse_with(
            "Lead in\ninclude::part.adoc[leveloffset=+1]\n\n== After",
            vec![("part.adoc", "more text")],
        );
        let p = doc.tree.children(doc.preamble).next().unwrap();
        assert_eq!(doc.plain_text(p), "Lead in\nmore text");
        let levels: Vec<usize> = doc.sections().iter().map(|&s| doc.tree[s].level).collect();
        assert_eq!(levels, vec![1]);
    }

    #[test]
    fn nested_leveloffset_includes_unwind() {
        let doc = parse_with(
            "== Top\n\ninclude::outer.adoc[leveloffset=+1]\n\n== Last",
            vec![
                ("outer.adoc", "== Outer\n\ninclude::inner.adoc[leveloffset=+1]\n\n== Outer Again"),
                ("inner.adoc", "== Inner\n\ninner prose"),
            ],
        );
        let levels: Vec<usize> = doc.sections().iter().map(|&s| doc.tree[s].level).collect();
        assert_eq!(levels, vec![1, 2, 3, 2, 1]);
    }

    #[test]
    fn line_selection() {
        let lines: Vec<String> = (1..=6).map(|i| i.to_string()).collect();
        assert_eq!(select_lines(lines.clone(), "2..3;5"), vec!["2", "3", "5"]);
        assert_eq!(select_lines(lines, "5..-1"), vec!["5", "6"]);
    }
}
