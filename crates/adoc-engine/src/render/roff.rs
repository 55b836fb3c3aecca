//! man(7) backend.
//!
//! Requests always start on a fresh line; text is escaped so that a
//! leading `.` or `'` is never read as a request.

use std::fmt::Write;

use crate::models::{BlockStyle, Document, Emphasis, NodeId, NodeKind, Row, Table};

use super::{RenderError, Visitor, Walk, walk};

#[derive(Debug, Default)]
pub struct RoffRenderer {
    out: String,
    closers: Vec<String>,
}

impl RoffRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render(mut self, doc: &Document) -> Result<String, RenderError> {
        walk(doc, doc.root, &mut self)?;
        self.newline();
        Ok(self.out)
    }

    fn enter(&mut self, close: impl Into<String>) -> Walk {
        self.closers.push(close.into());
        Walk::Children
    }

    /// Moves to the start of a line.
    fn newline(&mut self) {
        if !self.out.is_empty() && !self.out.ends_with('\n') {
            self.out.push('\n');
        }
    }

    fn request(&mut self, req: &str) {
        self.newline();
        self.out.push_str(req);
        self.out.push('\n');
    }

    fn text(&mut self, s: &str) {
        let at_line_start = self.out.is_empty() || self.out.ends_with('\n');
        let escaped = escape(s);
        if at_line_start && escaped.starts_with(['.', '\'']) {
            self.out.push_str("\\&");
        }
        self.out.push_str(&escaped);
    }

    fn inline(&mut self, doc: &Document, id: NodeId) -> Result<(), RenderError> {
        walk(doc, id, self)
    }

    fn children(&mut self, doc: &Document, id: NodeId) -> Result<(), RenderError> {
        for c in doc.tree.children(id) {
            walk(doc, c, self)?;
        }
        Ok(())
    }

    /// Plain upper-cased text of a sub-tree, for `.TH` and `.SH` arguments.
    fn quoted_upper(doc: &Document, id: Option<NodeId>) -> String {
        let text = id.map(|t| doc.plain_text(t)).unwrap_or_default();
        escape(&text).to_uppercase().replace('"', "\\(dq")
    }

    fn title(&mut self, doc: &Document, id: NodeId) -> Result<(), RenderError> {
        if let Some(t) = doc.tree[id].title {
            self.request(".sp");
            self.out.push_str("\\fB");
            self.inline(doc, t)?;
            self.out.push_str("\\fP");
            self.newline();
        }
        Ok(())
    }

    fn th(&mut self, doc: &Document) -> Result<(), RenderError> {
        let title = Self::quoted_upper(doc, doc.header.title);
        let volume = doc.attribute("manvolnum").unwrap_or("1");
        let date = doc.attribute("revdate").unwrap_or_default();
        let source = doc.attribute("mansource").or(doc.attribute("revnumber"));
        let manual = doc.attribute("manmanual").unwrap_or_default();
        writeln!(
            self.out,
            ".TH \"{title}\" \"{}\" \"{}\" \"{}\" \"{}\"",
            escape(volume),
            escape(date),
            escape(source.unwrap_or_default()),
            escape(manual)
        )?;
        self.out.push_str(".ie \\n(.g .ds Aq \\(aq\n.el .ds Aq '\n.nh\n.ad l\n");
        Ok(())
    }

    fn notes(&mut self, doc: &Document) -> Result<(), RenderError> {
        if doc.footnotes().is_empty() {
            return Ok(());
        }
        self.request(".SH \"NOTES\"");
        for (i, f) in doc.footnotes().iter().enumerate() {
            self.request(&format!(".IP \"{}.\" 4", i + 1));
            self.children(doc, f.content)?;
        }
        Ok(())
    }

    fn table(&mut self, doc: &Document, table: &Table) -> Result<(), RenderError> {
        self.request(".TS");
        self.out.push_str("allbox tab(:);\n");
        let ncols = table.ncols();
        let body_format = vec!["lt"; ncols].join(" ");
        if table.header.is_some() {
            let bold = vec!["ltB"; ncols].join(" ");
            writeln!(self.out, "{bold}")?;
        }
        writeln!(self.out, "{body_format}.")?;
        let rows = table
            .header
            .iter()
            .chain(&table.rows)
            .chain(table.footer.iter());
        for row in rows {
            self.row(doc, row)?;
        }
        self.request(".TE");
        self.request(".sp");
        Ok(())
    }

    fn row(&mut self, doc: &Document, row: &Row) -> Result<(), RenderError> {
        for (i, cell) in row.cells.iter().enumerate() {
            if i > 0 {
                self.out.push(':');
            }
            self.out.push_str("T{\n");
            if doc.tree[cell.node].kind == NodeKind::LiteralParagraph {
                self.text(&doc.tree[cell.node].raw);
            } else {
                self.children(doc, cell.node)?;
            }
            self.newline();
            self.out.push_str("T}");
        }
        self.out.push('\n');
        Ok(())
    }

    fn item_marker(doc: &Document, id: NodeId) -> String {
        let n = &doc.tree[id];
        match n.kind {
            NodeKind::ListOrderedItem => {
                let pos = n.parent.map_or(0, |p| {
                    doc.tree.children(p).take_while(|&c| c != id).count()
                });
                format!(".IP \" {}.\" 4", pos + 1)
            }
            _ => match n.attr("checked") {
                Some("true") => ".IP \"[x]\" 4".to_string(),
                Some(_) => ".IP \"[ ]\" 4".to_string(),
                None => ".IP \\(bu 2".to_string(),
            },
        }
    }
}

impl Visitor for RoffRenderer {
    fn begin(&mut self, doc: &Document, id: NodeId) -> Result<Walk, RenderError> {
        let n = &doc.tree[id];
        Ok(match n.kind {
            NodeKind::Root => {
                if !doc.embedded {
                    self.th(doc)?;
                }
                self.enter("")
            }
            NodeKind::Preamble => self.enter(""),
            NodeKind::Section if n.level <= 1 => {
                self.request(&format!(".SH \"{}\"", Self::quoted_upper(doc, n.title)));
                self.enter("")
            }
            NodeKind::Section | NodeKind::Heading => {
                self.newline();
                self.out.push_str(".SS \"");
                if let Some(t) = n.title {
                    self.inline(doc, t)?;
                }
                self.out.push_str("\"\n");
                if n.kind == NodeKind::Heading {
                    Walk::Skip
                } else {
                    self.enter("")
                }
            }
            NodeKind::Paragraph => {
                let in_item = n.prev.is_none()
                    && n.parent.is_some_and(|p| doc.tree[p].kind.is_list_item());
                if let Some(a) = n.admonition {
                    self.request(".sp");
                    writeln!(self.out, "\\fB{}\\fP", a.label())?;
                    self.request(".RS 4");
                    return Ok(self.enter(".RE\n"));
                }
                if !in_item {
                    self.title(doc, id)?;
                    self.request(".sp");
                }
                self.newline();
                self.enter("")
            }
            NodeKind::LiteralParagraph | NodeKind::BlockListing | NodeKind::BlockLiteral => {
                self.title(doc, id)?;
                self.request(".sp");
                self.request(".if n .RS 4");
                self.request(".nf");
                self.text(&n.raw);
                self.request(".fi");
                self.request(".if n .RE");
                Walk::Skip
            }
            NodeKind::BlockPassthrough => {
                self.newline();
                self.out.push_str(&n.raw);
                self.newline();
                Walk::Skip
            }
            NodeKind::BlockExample if n.admonition.is_some() => {
                let label = n.admonition.map(|a| a.label()).unwrap_or_default();
                self.request(".sp");
                writeln!(self.out, "\\fB{label}\\fP")?;
                self.request(".RS 4");
                self.enter(".RE\n")
            }
            NodeKind::BlockExample
            | NodeKind::BlockSidebar
            | NodeKind::BlockOpen
            | NodeKind::BlockExcerpts => {
                self.title(doc, id)?;
                self.request(".RS 4");
                if n.kind == NodeKind::BlockExcerpts && n.style == Some(BlockStyle::Verse) {
                    self.request(".nf");
                    let mut close = String::from(".fi\n");
                    if let Some(who) = n.attr("attribution") {
                        let _ = writeln!(close, "\\(em {}", escape(who));
                    }
                    close.push_str(".RE\n");
                    return Ok(self.enter(close));
                }
                let close = match n.attr("attribution") {
                    Some(who) => format!(".RE\n.sp\n\\(em {}\n", escape(who)),
                    None => ".RE\n".to_string(),
                };
                self.enter(close)
            }
            NodeKind::ListOrdered | NodeKind::ListUnordered | NodeKind::ListDescription => {
                self.title(doc, id)?;
                if n.level > 1 {
                    self.request(".RS 4");
                    self.enter(".RE\n")
                } else {
                    self.enter("")
                }
            }
            NodeKind::ListOrderedItem | NodeKind::ListUnorderedItem => {
                self.request(".sp");
                let marker = Self::item_marker(doc, id);
                self.request(&marker);
                self.enter("")
            }
            NodeKind::ListDescriptionItem => {
                self.request(".sp");
                self.request(".TP");
                if let Some(l) = n.label {
                    self.inline(doc, l)?;
                }
                self.newline();
                self.enter("")
            }
            NodeKind::BlockImage | NodeKind::BlockVideo | NodeKind::BlockAudio => {
                self.title(doc, id)?;
                self.request(".sp");
                let alt = n.attr("alt").or(n.attr("target")).unwrap_or_default();
                self.text(&format!("[{alt}]"));
                self.newline();
                Walk::Skip
            }
            NodeKind::Table => {
                self.title(doc, id)?;
                if let Some(t) = &n.table {
                    self.table(doc, t)?;
                }
                Walk::Skip
            }
            NodeKind::HorizontalRule => {
                self.request(".sp");
                Walk::Skip
            }
            NodeKind::PageBreak => {
                self.request(".bp");
                Walk::Skip
            }
            NodeKind::TocMacro | NodeKind::InlineId => Walk::Skip,
            NodeKind::Text => {
                let mut close = String::new();
                for (flag, font) in [
                    (Emphasis::BOLD, "\\fB"),
                    (Emphasis::ITALIC, "\\fI"),
                    (Emphasis::MONO, "\\f(CR"),
                ] {
                    if n.emphasis.contains(flag) {
                        self.out.push_str(font);
                        close.push_str("\\fP");
                    }
                }
                self.text(&n.raw);
                self.enter(close)
            }
            NodeKind::Passthrough => {
                self.text(&n.raw);
                Walk::Skip
            }
            NodeKind::PassthroughRaw => {
                self.out.push_str(&n.raw);
                Walk::Skip
            }
            NodeKind::Superscript => {
                self.out.push('^');
                self.enter("")
            }
            NodeKind::Subscript => {
                self.out.push('~');
                self.enter("")
            }
            NodeKind::CrossReference => {
                if !doc.tree.has_children(id) {
                    let target = n.attr("target").unwrap_or_default();
                    let label = doc
                        .anchor_label(target)
                        .filter(|l| !l.is_empty())
                        .map_or_else(|| format!("[{target}]"), str::to_string);
                    self.text(&label);
                }
                self.enter("")
            }
            NodeKind::Footnote => {
                write!(self.out, "[{}]", n.attr("number").unwrap_or("?"))?;
                Walk::Skip
            }
            NodeKind::InlineImage => {
                self.text(&format!("[{}]", n.attr("alt").unwrap_or_default()));
                Walk::Skip
            }
            NodeKind::Url => {
                let href = n.attr("href").unwrap_or_default();
                if n.roles.iter().any(|r| r == "bare") {
                    self.enter("")
                } else {
                    self.enter(format!(" <{}>", escape(href)))
                }
            }
            NodeKind::LineBreak => {
                self.request(".br");
                Walk::Skip
            }
            NodeKind::QuoteDoubleBegin => self.glyph("\\(lq"),
            NodeKind::QuoteDoubleEnd => self.glyph("\\(rq"),
            NodeKind::QuoteSingleBegin => self.glyph("\\(oq"),
            NodeKind::QuoteSingleEnd => self.glyph("\\(cq"),
            NodeKind::InlineIdShort => self.enter(""),
        })
    }

    fn end(&mut self, doc: &Document, id: NodeId) -> Result<(), RenderError> {
        let close = self.closers.pop().unwrap_or_default();
        if close.starts_with('.') {
            self.newline();
        }
        self.out.push_str(&close);
        if doc.tree[id].kind == NodeKind::Root {
            self.notes(doc)?;
        }
        Ok(())
    }
}

impl RoffRenderer {
    fn glyph(&mut self, g: &str) -> Walk {
        self.out.push_str(g);
        Walk::Skip
    }
}

/// Escapes backslashes and hyphens, and guards request characters at the
/// start of embedded lines.
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut line_start = false;
    for c in s.chars() {
        if line_start && matches!(c, '.' | '\'') {
            out.push_str("\\&");
        }
        match c {
            '\\' => out.push_str("\\e"),
            '-' => out.push_str("\\-"),
            _ => out.push(c),
        }
        line_start = c == '\n';
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::{ParseOptions, parse_document};
    use pretty_assertions::assert_eq;

    fn roff(input: &str) -> String {
        parse_document(input, &ParseOptions::default())
            .unwrap()
            .to_roff()
            .unwrap()
    }

    #[test]
    fn escapes_requests_and_hyphens() {
        assert_eq!(escape("a-b\n.c \\d"), "a\\-b\n\\&.c \\ed");
    }

    #[test]
    fn man_page_skeleton() {
        let out = roff(
            "= tool(1)\n:manmanual: Tool Manual\n\n== Name\n\ntool - does *things*\n\n== Options\n\n* one\n* two",
        );
        insta::assert_snapshot!(out, @r#"
        .TH "TOOL(1)" "1" "" "" "Tool Manual"
        .ie \n(.g .ds Aq \(aq
        .el .ds Aq '
        .nh
        .ad l
        .SH "NAME"
        .sp
        tool \- does \fBthings\fP
        .SH "OPTIONS"
        .sp
        .IP \(bu 2
        one
        .sp
        .IP \(bu 2
        two
        "#);
    }

    #[test]
    fn listing_is_no_fill() {
        let out = roff("----\n.hidden\n----");
        assert!(out.contains(".nf\n\\&.hidden\n.fi\n"));
    }

    #[test]
    fn ordered_items_are_numbered() {
        let out = roff(". first\n. second");
        assert!(out.contains(".IP \" 1.\" 4\nfirst"));
        assert!(out.contains(".IP \" 2.\" 4\nsecond"));
    }

    #[test]
    fn footnotes_become_notes() {
        let out = roff("Claim.footnote:[Source.]");
        assert!(out.contains("Claim.[1]"));
        assert!(out.contains(".SH \"NOTES\"\n.IP \"1.\" 4\nSource."));
    }
}
