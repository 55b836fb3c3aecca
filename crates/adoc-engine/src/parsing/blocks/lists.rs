use crate::models::{NodeId, NodeKind};
use crate::parsing::{
    ParseError,
    classify::{LineKind, description_marker, list_item_level},
    inline::parse_inline,
};

use super::{Ctx, Flow, Line, Parser};

impl Parser<'_> {
    /// Parses a list starting at `first` and every following item of the
    /// same kind and level, including nested lists and attached blocks.
    pub(crate) fn list(&mut self, parent: NodeId, first: Line, ctx: Ctx) -> Result<(), ParseError> {
        let ctx = Ctx {
            in_list: true,
            ..ctx
        };
        let Some(item_kind) = first.kind.block_kind() else {
            return Ok(());
        };
        let Some(list_kind) = item_kind.list_pair() else {
            return Ok(());
        };
        let level = list_item_level(first.kind, &first.content);
        let list = self.doc.tree.new_node(list_kind);
        self.doc.tree[list].level = level;
        self.doc.tree.append_child(parent, list);
        self.apply_meta(list);

        let mut line = first;
        loop {
            let item = self.list_item(list, &line, item_kind, level, ctx);
            self.item_body(item, ctx)?;
            match self.next_line() {
                Some(next)
                    if next.kind == line.kind
                        && list_item_level(next.kind, &next.content) == level =>
                {
                    line = next;
                }
                Some(_) => {
                    self.unread();
                    break;
                }
                None => break,
            }
        }
        Ok(())
    }

    /// Creates an item with its principal text.
    fn list_item(
        &mut self,
        list: NodeId,
        line: &Line,
        kind: NodeKind,
        level: usize,
        ctx: Ctx,
    ) -> NodeId {
        let item = self.doc.tree.new_node(kind);
        self.doc.tree[item].level = level;
        self.doc.tree.append_child(list, item);

        let content = line.content.as_str();
        let text = if kind == NodeKind::ListDescriptionItem {
            let Some(m) = description_marker(content) else {
                return item;
            };
            let term = self.doc.tree.new_node(NodeKind::Text);
            self.doc.tree[term].raw = content[..m.start].trim().to_string();
            parse_inline(self.doc, term);
            self.doc.cache_text(term);
            self.doc.tree[item].label = Some(term);
            content[m.start + m.len..].trim()
        } else {
            let marker_end = content
                .find(|c: char| c == ' ' || c == '\t')
                .unwrap_or(content.len());
            let text = content[marker_end..].trim_start();
            self.checkbox(list, item, text)
        };

        let mut lines = vec![];
        if !text.is_empty() {
            lines.push(text.to_string());
        }
        self.gather(&mut lines, ctx);
        if !lines.is_empty() {
            let p = self.doc.tree.new_node(NodeKind::Paragraph);
            self.doc.tree.append_child(item, p);
            self.doc.tree[p].raw = lines.join("\n");
            parse_inline(self.doc, p);
        }
        item
    }

    /// Strips a `[ ]` / `[x]` checklist marker, recording its state.
    fn checkbox<'t>(&mut self, list: NodeId, item: NodeId, text: &'t str) -> &'t str {
        let checked = match text.get(..4) {
            Some("[ ] ") => "false",
            Some("[x] " | "[*] ") => "true",
            _ => return text,
        };
        self.doc.tree[item]
            .attrs
            .insert("checked".into(), checked.into());
        self.doc.tree[list].add_role("checklist");
        &text[4..]
    }

    /// Nested lists, `+` continuations and detached literal paragraphs
    /// belonging to `item`.
    ///
    /// Returns with the first line that belongs elsewhere pushed back.
    fn item_body(&mut self, item: NodeId, ctx: Ctx) -> Result<(), ParseError> {
        while let Some(line) = self.next_line() {
            match line.kind {
                LineKind::Empty | LineKind::Comment => {}
                LineKind::BlockComment => self.skip_comment_block(),
                LineKind::ListContinuation => {
                    if !self.continuation(item, ctx)? {
                        return Ok(());
                    }
                }
                k if k.is_list_item() => {
                    let level = list_item_level(k, &line.content);
                    if self.open_item(item, k, level) {
                        self.unread();
                        return Ok(());
                    }
                    self.list(item, line, ctx)?;
                }
                LineKind::LiteralParagraph if self.after_blank() => {
                    self.literal_paragraph(item, line, ctx)?;
                }
                _ => {
                    self.unread();
                    return Ok(());
                }
            }
        }
        Ok(())
    }

    /// Attaches the block after a `+` line to `item`. Returns false when a
    /// section title or the enclosing delimiter ended the list.
    fn continuation(&mut self, item: NodeId, ctx: Ctx) -> Result<bool, ParseError> {
        while let Some(next) = self.next_line() {
            if ctx.term == Some(next.kind) {
                self.unread();
                return Ok(false);
            }
            match self.dispatch(item, next, ctx)? {
                Flow::Meta => continue,
                Flow::Block => return Ok(true),
                Flow::Return => return Ok(false),
            }
        }
        Ok(true)
    }

    /// Returns true if `item` or an enclosing item has the kind and level of
    /// a list item line, which then continues that enclosing list.
    fn open_item(&self, item: NodeId, kind: LineKind, level: usize) -> bool {
        let Some(kind) = kind.block_kind() else {
            return false;
        };
        std::iter::once(item)
            .chain(self.doc.tree.ancestors(item))
            .any(|n| {
                let n = &self.doc.tree[n];
                n.kind == kind && n.level == level
            })
    }
}

#[cfg(test)]
mod tests {
    use crate::models::Document;
    use crate::parsing::{ParseOptions, parse_document, snapshot::dump};

    fn parse(input: &str) -> Document {
        parse_document(input, &ParseOptions::default()).unwrap()
    }

    #[test]
    fn ordered_items_and_multiline_text() {
        let doc = parse(". one\ncontinued\n. two\n\nafter");
        insta::assert_snapshot!(dump(&doc, doc.preamble), @r#"
        Preamble
          ListOrdered level=1
            ListOrderedItem level=1
              Paragraph
                Text "one\ncontinued"
            ListOrderedItem level=1
              Paragraph
                Text "two"
          Paragraph
            Text "after"
        "#);
    }

    #[test]
    fn continuation_attaches_block_to_item() {
        let doc = parse("* item\n+\n----\ncode\n----\n* next");
        insta::assert_snapshot!(dump(&doc, doc.preamble), @r#"
        Preamble
          ListUnordered level=1
            ListUnorderedItem level=1
              Paragraph
                Text "item"
              BlockListing "code"
            ListUnorderedItem level=1
              Paragraph
                Text "next"
        "#);
    }

    #[test]
    fn description_list_with_term_labels() {
        let doc = parse("CPU:: The brain\nRAM::\n  Short-term memory");
        insta::assert_snapshot!(dump(&doc, doc.preamble), @r#"
        Preamble
          ListDescription level=1
            ListDescriptionItem level=1 label="CPU"
              Paragraph
                Text "The brain"
            ListDescriptionItem level=1 label="RAM"
              Paragraph
                Text "Short-term memory"
        "#);
    }

    #[test]
    fn mixed_kinds_nest() {
        let doc = parse("* fruit\n. apple\n. pear\n* veg");
        insta::assert_snapshot!(dump(&doc, doc.preamble), @r#"
        Preamble
          ListUnordered level=1
            ListUnorderedItem level=1
              Paragraph
                Text "fruit"
              ListOrdered level=1
                ListOrderedItem level=1
                  Paragraph
                    Text "apple"
                ListOrderedItem level=1
                  Paragraph
                    Text "pear"
            ListUnorderedItem level=1
              Paragraph
                Text "veg"
        "#);
    }

    #[test]
    fn blank_line_then_attribute_line_ends_list() {
        let doc = parse("* a\n\n[source]\nx = 1");
        insta::assert_snapshot!(dump(&doc, doc.preamble), @r#"
        Preamble
          ListUnordered level=1
            ListUnorderedItem level=1
              Paragraph
                Text "a"
          BlockListing style=Source "x = 1"
        "#);
    }

    #[test]
    fn checklist_items() {
        let doc = parse("* [x] done\n* [ ] todo");
        insta::assert_snapshot!(dump(&doc, doc.preamble), @r#"
        Preamble
          ListUnordered level=1 .checklist
            ListUnorderedItem level=1 checked="true"
              Paragraph
                Text "done"
            ListUnorderedItem level=1 checked="false"
              Paragraph
                Text "todo"
        "#);
    }

    #[test]
    fn literal_after_blank_line_stays_in_item() {
        let doc = parse("* a\n\n  literal\n* b");
        insta::assert_snapshot!(dump(&doc, doc.preamble), @r#"
        Preamble
          ListUnordered level=1
            ListUnorderedItem level=1
              Paragraph
                Text "a"
              LiteralParagraph "literal"
            ListUnorderedItem level=1
              Paragraph
                Text "b"
        "#);
    }
}
