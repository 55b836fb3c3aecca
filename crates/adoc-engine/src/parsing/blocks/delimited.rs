use std::sync::OnceLock;

use regex::Regex;

use crate::models::{BlockStyle, NodeId, NodeKind};
use crate::parsing::{
    ParseError,
    attrs::{default_alt, parse_attrlist, substitute_attributes},
    classify::LineKind,
    inline::parse_inline,
};

use super::{Ctx, Line, Parser};

fn block_macro_regex() -> &'static Regex {
    static BLOCK_MACRO_REGEX: OnceLock<Regex> = OnceLock::new();
    BLOCK_MACRO_REGEX.get_or_init(|| {
        Regex::new(r"^(image|video|audio)::([^\[\s]+)\[(.*)\]$").expect("Invalid block macro regex")
    })
}

impl Parser<'_> {
    /// Parses a delimited block whose opening line of `kind` was just read.
    /// The caller has checked that a closing line exists.
    pub(crate) fn delimited(&mut self, parent: NodeId, kind: LineKind) -> Result<(), ParseError> {
        let Some(node_kind) = kind.block_kind() else {
            return Ok(());
        };
        let node = self.doc.tree.new_node(node_kind);
        self.doc.tree.append_child(parent, node);
        self.apply_meta(node);

        match kind {
            LineKind::BlockListing | LineKind::BlockLiteral => {
                let body = self.verbatim(kind);
                self.doc.tree[node].raw = substitute_attributes(&body, &self.doc.attributes);
            }
            LineKind::BlockPassthrough => {
                self.doc.tree[node].raw = self.verbatim(kind);
            }
            LineKind::BlockExcerpts if self.doc.tree[node].style == Some(BlockStyle::Verse) => {
                self.doc.tree[node].raw = self.verbatim(kind);
                parse_inline(self.doc, node);
            }
            LineKind::Table => self.table(node)?,
            _ => {
                self.block_depth += 1;
                let result = self.parse_block(
                    node,
                    Ctx {
                        term: Some(kind),
                        in_list: false,
                    },
                );
                self.block_depth -= 1;
                result?;
            }
        }
        Ok(())
    }

    /// Reads lines up to the closing delimiter, keeping their indentation.
    pub(crate) fn verbatim(&mut self, kind: LineKind) -> String {
        let mut body = vec![];
        while let Some(line) = self.next_line() {
            if line.kind == kind {
                break;
            }
            body.push(line.raw());
        }
        body.join("\n")
    }

    /// `image::target[alt, width, height]`, `video::` and `audio::`.
    /// Returns false for a malformed macro line.
    pub(crate) fn block_macro(&mut self, parent: NodeId, line: &Line) -> bool {
        let Some(caps) = block_macro_regex().captures(&line.content) else {
            return false;
        };
        let Some(list) = parse_attrlist(&caps[3]) else {
            return false;
        };
        let kind = match &caps[1] {
            "image" => NodeKind::BlockImage,
            "video" => NodeKind::BlockVideo,
            _ => NodeKind::BlockAudio,
        };
        let target = substitute_attributes(&caps[2], &self.doc.attributes);
        let node = self.doc.tree.new_node(kind);
        self.doc.tree.append_child(parent, node);
        self.apply_meta(node);

        let n = &mut self.doc.tree[node];
        if kind == NodeKind::BlockImage {
            let alt = list
                .positional(0)
                .map(str::to_string)
                .unwrap_or_else(|| default_alt(&target));
            n.attrs.insert("alt".into(), alt);
            for (i, key) in [(1, "width"), (2, "height")] {
                if let Some(v) = list.positional(i) {
                    n.attrs.insert(key.into(), v.to_string());
                }
            }
        } else if let Some(poster) = list.positional(0) {
            n.attrs.insert("poster".into(), poster.to_string());
        }
        for (k, v) in list.named {
            match k.as_str() {
                "role" => v.split_whitespace().for_each(|r| n.add_role(r)),
                "opts" | "options" => v.split(',').for_each(|o| n.add_option(o)),
                _ => {
                    n.attrs.insert(k, v);
                }
            }
        }
        n.attrs.insert("target".into(), target);
        true
    }

    /// Horizontal rule, page break and `toc::[]`.
    pub(crate) fn leaf(&mut self, parent: NodeId, kind: LineKind) {
        if let Some(node_kind) = kind.block_kind() {
            let node = self.doc.tree.new_node(node_kind);
            self.doc.tree.append_child(parent, node);
            self.apply_meta(node);
        }
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
    fn listing_expands_attributes_passthrough_does_not() {
        let doc = parse(":v: 1.0\n\n----\nversion {v}\n  indented\n----\n\n++++\n<b>{v}</b>\n++++");
        insta::assert_snapshot!(dump(&doc, doc.preamble), @r#"
        Preamble
          BlockListing "version 1.0\n  indented"
          BlockPassthrough "<b>{v}</b>"
        "#);
    }

    #[test]
    fn compound_blocks_parse_recursively() {
        let doc = parse("****\n.Inner\n====\nNested *text*\n====\n****");
        insta::assert_snapshot!(dump(&doc, doc.preamble), @r#"
        Preamble
          BlockSidebar
            BlockExample title="Inner"
              Paragraph
                Text "Nested "
                Text [bold]
                  Text "text"
        "#);
    }

    #[test]
    fn example_with_admonition_style() {
        let doc = parse("[WARNING]\n====\nHot surface.\n====");
        insta::assert_snapshot!(dump(&doc, doc.preamble), @r#"
        Preamble
          BlockExample admonition=Warning .warning label="Warning"
            Paragraph
              Text "Hot surface."
        "#);
    }

    #[test]
    fn headings_inside_blocks_are_discrete() {
        let doc = parse("--\n== Inside\n--\n\n== Outside");
        insta::assert_snapshot!(dump(&doc, doc.root), @r#"
        Root
          Preamble
            BlockOpen
              Heading level=1 #_inside title="Inside"
          Section level=1 #_outside title="Outside"
        "#);
    }

    #[test]
    fn verse_keeps_lines() {
        let doc = parse("[verse, Poet]\n____\nline one\nline two\n____");
        insta::assert_snapshot!(dump(&doc, doc.preamble), @r#"
        Preamble
          BlockExcerpts style=Verse 2="Poet" attribution="Poet"
            Text "line one\nline two"
        "#);
    }

    #[test]
    fn image_macro_attributes() {
        let doc = parse("image::img/sunset-view.png[Sunset, 300, role=thumb]\n\nimage::broken");
        insta::assert_snapshot!(dump(&doc, doc.preamble), @r#"
        Preamble
          BlockImage .thumb alt="Sunset" target="img/sunset-view.png" width="300"
          Paragraph
            Text "image::broken"
        "#);
    }

    #[test]
    fn leaves() {
        let doc = parse("'''\n\n<<<\n\ntoc::[]");
        insta::assert_snapshot!(dump(&doc, doc.preamble), @r#"
        Preamble
          HorizontalRule
          PageBreak
          TocMacro
        "#);
    }
}
