use crate::models::{BlockStyle, NodeId, NodeKind};
use crate::parsing::{
    ParseError,
    attrs::substitute_attributes,
    classify::{LineKind, admonition_prefix},
    inline::parse_inline,
};

use super::{Ctx, Flow, Line, Parser};

impl Parser<'_> {
    /// Returns true if `line` ends the paragraph being gathered.
    ///
    /// Delimiters only interrupt when their closing line exists. Inside list
    /// item text, list items and `+` interrupt too.
    pub(crate) fn ends_paragraph(&self, line: &Line, ctx: Ctx) -> bool {
        match line.kind {
            LineKind::Empty | LineKind::BlockComment => true,
            k if ctx.term == Some(k) => true,
            k if k.is_delimiter() => self.has_terminator(k),
            LineKind::ListContinuation => ctx.in_list,
            k if k.is_list_item() => ctx.in_list,
            _ => false,
        }
    }

    /// Appends the content of following lines until the paragraph ends.
    pub(crate) fn gather(&mut self, lines: &mut Vec<String>, ctx: Ctx) {
        while let Some(line) = self.next_line() {
            if self.ends_paragraph(&line, ctx) {
                self.unread();
                break;
            }
            if line.kind != LineKind::Comment {
                lines.push(line.content);
            }
        }
    }

    pub(crate) fn paragraph(
        &mut self,
        parent: NodeId,
        first: Line,
        ctx: Ctx,
    ) -> Result<Flow, ParseError> {
        let mut lines = vec![first.content];
        self.gather(&mut lines, ctx);
        self.paragraph_node(parent, &lines.join("\n"));
        Ok(Flow::Block)
    }

    /// Builds a paragraph, or the block its style asks for: `[source]` and
    /// `[listing]` give a listing, `[literal]` a literal block, `[quote]`
    /// and `[verse]` an excerpt.
    pub(crate) fn paragraph_node(&mut self, parent: NodeId, text: &str) -> NodeId {
        let style = self.meta.block_style();
        let kind = match style {
            Some(BlockStyle::Source | BlockStyle::Listing) => NodeKind::BlockListing,
            Some(BlockStyle::Literal) => NodeKind::BlockLiteral,
            Some(BlockStyle::Quote | BlockStyle::Verse) => NodeKind::BlockExcerpts,
            _ => NodeKind::Paragraph,
        };
        let node = self.doc.tree.new_node(kind);
        self.doc.tree.append_child(parent, node);
        self.apply_meta(node);
        match (kind, style) {
            (NodeKind::BlockListing | NodeKind::BlockLiteral, _) => {
                self.doc.tree[node].raw = substitute_attributes(text, &self.doc.attributes);
            }
            (NodeKind::BlockExcerpts, Some(BlockStyle::Quote)) => {
                let p = self.doc.tree.new_node(NodeKind::Paragraph);
                self.doc.tree.append_child(node, p);
                self.doc.tree[p].raw = text.to_string();
                parse_inline(self.doc, p);
            }
            _ => {
                self.doc.tree[node].raw = text.to_string();
                parse_inline(self.doc, node);
            }
        }
        node
    }

    /// `NOTE: text` and its continuation lines.
    pub(crate) fn admonition_paragraph(
        &mut self,
        parent: NodeId,
        first: Line,
        ctx: Ctx,
    ) -> Result<Flow, ParseError> {
        let Some((kind, rest)) = admonition_prefix(&first.content) else {
            return self.paragraph(parent, first, ctx);
        };
        let mut lines = vec![rest.to_string()];
        self.gather(&mut lines, ctx);
        if self.meta.admonition().is_some() {
            self.meta.style = None;
        }
        let node = self.doc.tree.new_node(NodeKind::Paragraph);
        self.doc.tree.append_child(parent, node);
        self.apply_meta(node);
        self.set_admonition(node, kind);
        self.doc.tree[node].raw = lines.join("\n");
        parse_inline(self.doc, node);
        Ok(Flow::Block)
    }

    /// Indented lines kept verbatim, minus their common indentation.
    pub(crate) fn literal_paragraph(
        &mut self,
        parent: NodeId,
        first: Line,
        ctx: Ctx,
    ) -> Result<Flow, ParseError> {
        let mut lines = vec![first];
        while let Some(line) = self.next_line() {
            if self.ends_paragraph(&line, ctx) {
                self.unread();
                break;
            }
            if line.kind != LineKind::Comment {
                lines.push(line);
            }
        }
        let indent = lines
            .iter()
            .map(|l| l.spaces.len())
            .min()
            .unwrap_or(0);
        let text = lines
            .iter()
            .map(|l| {
                let raw = l.raw();
                raw.get(indent..).unwrap_or(raw.trim_start()).to_string()
            })
            .collect::<Vec<_>>()
            .join("\n");

        let kind = match self.meta.block_style() {
            Some(BlockStyle::Source | BlockStyle::Listing) => NodeKind::BlockListing,
            _ => NodeKind::LiteralParagraph,
        };
        let node = self.doc.tree.new_node(kind);
        self.doc.tree.append_child(parent, node);
        self.apply_meta(node);
        self.doc.tree[node].raw = text;
        Ok(Flow::Block)
    }
}

#[cfg(test)]
mod tests {
    use crate::models::{AdmonitionKind, Document, NodeKind};
    use crate::parsing::{ParseOptions, parse_document, snapshot::dump};
    use pretty_assertions::assert_eq;

    fn parse(input: &str) -> Document {
        parse_document(input, &ParseOptions::default()).unwrap()
    }

    #[test]
    fn admonition_prefix_paragraph() {
        let doc = parse("NOTE: watch out");
        let p = doc.tree.children(doc.preamble).next().unwrap();
        assert_eq!(doc.tree[p].kind, NodeKind::Paragraph);
        assert_eq!(doc.tree[p].admonition, Some(AdmonitionKind::Note));
        assert_eq!(doc.tree[p].roles, vec!["note"]);
        assert_eq!(doc.plain_text(doc.tree[p].label.unwrap()), "Note");
        assert_eq!(doc.plain_text(p), "watch out");
    }

    #[test]
    fn admonition_style_on_paragraph() {
        let doc = parse("[TIP]\nTry this.");
        insta::assert_snapshot!(dump(&doc, doc.preamble), @r#"
        Preamble
          Paragraph admonition=Tip .tip label="Tip"
            Text "Try this."
        "#);
    }

    #[test]
    fn paragraph_lines_join_and_skip_comments() {
        let doc = parse("one\n// hidden\ntwo\n\nthree");
        insta::assert_snapshot!(dump(&doc, doc.preamble), @r#"
        Preamble
          Paragraph
            Text "one\ntwo"
          Paragraph
            Text "three"
        "#);
    }

    #[test]
    fn literal_paragraph_strips_common_indent() {
        let doc = parse("  $ make\n    --verbose\n\nafter");
        insta::assert_snapshot!(dump(&doc, doc.preamble), @r#"
        Preamble
          LiteralParagraph "$ make\n  --verbose"
          Paragraph
            Text "after"
        "#);
    }

    #[test]
    fn source_style_paragraph_is_listing() {
        let doc = parse(":v: 2\n\n[source,rust]\nlet x = {v};");
        insta::assert_snapshot!(dump(&doc, doc.preamble), @r#"
        Preamble
          BlockListing style=Source 2="rust" language="rust" "let x = 2;"
        "#);
    }

    #[test]
    fn quote_paragraph_has_attribution() {
        let doc = parse("[quote, Ada Lovelace]\nThat brain of mine.");
        insta::assert_snapshot!(dump(&doc, doc.preamble), @r#"
        Preamble
          BlockExcerpts style=Quote 2="Ada Lovelace" attribution="Ada Lovelace"
            Paragraph
              Text "That brain of mine."
        "#);
    }
}
