use crate::models::{NodeId, NodeKind, SectionCounters};
use crate::parsing::{ParseError, inline::parse_inline};

use super::{Ctx, Line, Parser};

impl Parser<'_> {
    /// Opens a section at `level` (before the level offset) and parses its
    /// body up to the next section title.
    pub(crate) fn section(&mut self, line: &Line, level: usize) -> Result<(), ParseError> {
        let level = self.shift_level(level);
        let parent = self.section_parent(level);
        let node = self.doc.tree.new_node(NodeKind::Section);
        self.doc.tree[node].level = level;
        self.doc.tree.append_child(parent, node);
        self.title_block(node, &line.content);
        self.current_section = node;
        log::debug!(
            "section level {level}: {:?}",
            self.doc.tree[node].text.as_str()
        );
        self.parse_block(node, Ctx::default())
    }

    /// A heading that does not open a section: `[discrete]`, or any title
    /// line inside a delimited block.
    pub(crate) fn heading(&mut self, parent: NodeId, line: &Line, level: usize) {
        let node = self.doc.tree.new_node(NodeKind::Heading);
        self.doc.tree[node].level = self.shift_level(level);
        self.doc.tree.append_child(parent, node);
        self.title_block(node, &line.content);
    }

    fn shift_level(&self, level: usize) -> usize {
        (level as i32 + self.level_offset).clamp(0, SectionCounters::MAX_LEVEL as i32) as usize
    }

    /// The open section one level up from `level`, or the root when there
    /// is none.
    fn section_parent(&self, level: usize) -> NodeId {
        let root = self.doc.root;
        if level == 0 {
            return root;
        }
        std::iter::once(self.current_section)
            .chain(self.doc.tree.ancestors(self.current_section))
            .find(|&n| {
                let n = &self.doc.tree[n];
                n.kind == NodeKind::Section && n.level + 1 == level
            })
            .unwrap_or(root)
    }

    /// Title, id and number of a section or heading.
    ///
    /// The id is, in order: the id from block metadata, a trailing `[[id]]`
    /// in the title, or one generated from the title text when `sectids`
    /// is set.
    fn title_block(&mut self, node: NodeId, content: &str) {
        let text = strip_title_markers(content);
        let explicit = self.meta.id.take();
        let reftext = self.meta.reftext.take();
        self.apply_meta(node);

        let holder = self.doc.tree.new_node(NodeKind::Text);
        self.doc.tree[holder].raw = text.to_string();
        parse_inline(self.doc, holder);
        let trailing = self
            .doc
            .tree
            .last_child(holder)
            .filter(|&c| self.doc.tree[c].kind == NodeKind::InlineId);
        let mut promoted = None;
        if let Some(c) = trailing {
            self.doc.tree.detach(c);
            promoted = self.doc.tree[c].id.take();
            if let Some(last) = self.doc.tree.last_child(holder)
                && self.doc.tree[last].kind == NodeKind::Text
            {
                let raw = &mut self.doc.tree[last].raw;
                raw.truncate(raw.trim_end().len());
            }
        }
        let plain = self.doc.cache_text(holder);
        self.doc.tree[node].title = Some(holder);
        self.doc.tree[node].text = plain.clone();
        let label = reftext.unwrap_or_else(|| plain.clone());

        let id = if let Some(id) = explicit {
            Some(self.doc.register_anchor(&id, &label))
        } else if let Some(id) = promoted {
            self.doc.set_anchor_label(&id, &label);
            Some(id)
        } else if self.doc.has_attribute("sectids") {
            let generated = self.generate_id(&plain);
            Some(self.doc.register_anchor(&generated, &label))
        } else {
            None
        };
        self.doc.tree[node].id = id;

        let level = self.doc.tree[node].level;
        if self.doc.tree[node].kind == NodeKind::Section && level > 0 && self.numbered(level) {
            let number = self.doc.counters.set(level).to_string();
            let label = self.doc.tree.new_node(NodeKind::Text);
            self.doc.tree[label].raw = number;
            self.doc.tree[node].label = Some(label);
        }
    }

    fn numbered(&self, level: usize) -> bool {
        let max = self
            .doc
            .attribute("sectnumlevels")
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(3);
        self.doc.has_attribute("sectnums") && level <= max
    }

    /// `idprefix` followed by the lowercased alphanumeric runs of `title`
    /// joined with `idseparator`.
    fn generate_id(&self, title: &str) -> String {
        let prefix = self.doc.attribute("idprefix").unwrap_or("_");
        let sep = self.doc.attribute("idseparator").unwrap_or("_");
        let words: Vec<String> = title
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .map(str::to_lowercase)
            .collect();
        format!("{prefix}{}", words.join(sep))
    }
}

/// Removes the leading marker run and a matching trailing run.
fn strip_title_markers(content: &str) -> &str {
    let marker = content.chars().next().unwrap_or('=');
    let rest = content.trim_start_matches(marker);
    let n = content.len() - rest.len();
    let rest = rest.trim();
    let closing = marker.to_string().repeat(n);
    match rest.strip_suffix(closing.as_str()) {
        Some(head) if head.ends_with([' ', '\t']) => head.trim_end(),
        _ => rest,
    }
}

#[cfg(test)]
mod tests {
    use super::strip_title_markers;
    use crate::models::Document;
    use crate::parsing::{ParseOptions, parse_document, snapshot::dump};
    use pretty_assertions::assert_eq;

    fn parse(input: &str) -> Document {
        parse_document(input, &ParseOptions::default()).unwrap()
    }

    #[test]
    fn strips_symmetric_markers() {
        assert_eq!(strip_title_markers("== Title =="), "Title");
        assert_eq!(strip_title_markers("=== A == B"), "A == B");
        assert_eq!(strip_title_markers("# Hash"), "Hash");
    }

    #[test]
    fn ids_explicit_inline_and_generated() {
        let doc = parse("[#first]\n== One\n\n== Two [[second]]\n\n== Two");
        let ids: Vec<_> = doc
            .sections()
            .iter()
            .map(|&s| doc.tree[s].id.clone().unwrap_or_default())
            .collect();
        assert_eq!(ids, vec!["first", "second", "_two"]);
        assert_eq!(doc.anchor_label("second"), Some("Two"));
        assert_eq!(doc.id_for_title("One"), Some("first"));
    }

    #[test]
    fn duplicate_titles_get_suffixed_ids() {
        let doc = parse("== Same\n\n== Same\n\n== Same");
        let ids: Vec<_> = doc
            .sections()
            .iter()
            .map(|&s| doc.tree[s].id.clone().unwrap_or_default())
            .collect();
        assert_eq!(ids, vec!["_same", "_same_1", "_same_2"]);
    }

    #[test]
    fn custom_id_prefix_and_separator() {
        let doc = parse(":idprefix:\n:idseparator: -\n\n== Getting Started Now");
        assert_eq!(doc.tree[doc.sections()[0]].id.as_deref(), Some("getting-started-now"));
    }

    #[test]
    fn numbered_sections() {
        let doc = parse(":sectnums:\n\n== A\n\n=== B\n\n==== C\n\n== D");
        insta::assert_snapshot!(dump(&doc, doc.root), @r#"
        Root
          Preamble
          Section level=1 #_a title="A" label="1."
            Section level=2 #_b title="B" label="1.1."
              Section level=3 #_c title="C" label="1.1.1."
          Section level=1 #_d title="D" label="2."
        "#);
    }

    #[test]
    fn skipped_level_attaches_to_root() {
        let doc = parse("== A\n\n==== Deep");
        let deep = doc.sections()[1];
        assert_eq!(doc.tree[deep].parent, Some(doc.root));
    }

    #[test]
    fn parent_lookup_walks_up_from_current_section() {
        let doc = parse("== A\n\n==== Deep\n\n=== B");
        insta::assert_snapshot!(dump(&doc, doc.root), @r#"
        Root
          Preamble
          Section level=1 #_a title="A"
          Section level=3 #_deep title="Deep"
          Section level=2 #_b title="B"
        "#);
    }

    #[test]
    fn discrete_heading_does_not_open_section() {
        let doc = parse("[discrete]\n== Aside\n\ntext");
        insta::assert_snapshot!(dump(&doc, doc.preamble), @r#"
        Preamble
          Heading level=1 #_aside style=Discrete title="Aside"
          Paragraph
            Text "text"
        "#);
    }
}
