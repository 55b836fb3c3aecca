//! HTML backend.
//!
//! Markup follows the class names of Asciidoctor's default stylesheet so
//! rendered pages can reuse it. Verbatim content is escaped; triple-plus
//! and `pass:[]` passthroughs are written as they are.

use std::fmt::Write;

use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::models::{
    BlockStyle, Cell, CellStyle, Document, Emphasis, NodeId, NodeKind, Row, Table,
};

use super::{RenderError, Visitor, Walk, walk};

const ORDERED_STYLES: [&str; 5] = [
    "arabic",
    "loweralpha",
    "lowerroman",
    "upperalpha",
    "upperroman",
];

#[derive(Debug, Default)]
pub struct HtmlRenderer {
    out: String,
    /// Closing markup for every node whose children are being visited.
    closers: Vec<String>,
    /// Rendering section titles for the table of contents.
    in_toc: bool,
}

impl HtmlRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Renders `doc`; a document flagged `is_for_toc` yields only its
    /// table of contents.
    pub fn render(mut self, doc: &Document) -> Result<String, RenderError> {
        if doc.is_for_toc {
            self.toc(doc)?;
        } else {
            walk(doc, doc.root, &mut self)?;
        }
        Ok(self.out)
    }

    fn enter(&mut self, close: impl Into<String>) -> Walk {
        self.closers.push(close.into());
        Walk::Children
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

    fn title(&mut self, doc: &Document, id: NodeId) -> Result<(), RenderError> {
        if let Some(t) = doc.tree[id].title {
            self.out.push_str("<div class=\"title\">");
            self.inline(doc, t)?;
            self.out.push_str("</div>\n");
        }
        Ok(())
    }

    fn header(&mut self, doc: &Document) -> Result<(), RenderError> {
        let title = doc.title().unwrap_or_else(|| "Untitled".to_string());
        write!(
            self.out,
            "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"UTF-8\">\n<title>{}</title>\n</head>\n<body class=\"article\">\n<div id=\"header\">\n",
            encode_text(&title)
        )?;
        if let Some(t) = doc.header.title {
            self.out.push_str("<h1>");
            self.inline(doc, t)?;
            self.out.push_str("</h1>\n");
        }
        let authors = &doc.header.authors;
        if !authors.is_empty() || doc.header.revision.is_some() {
            self.out.push_str("<div class=\"details\">\n");
            for (i, a) in authors.iter().enumerate() {
                let suffix = if i == 0 { String::new() } else { (i + 1).to_string() };
                writeln!(
                    self.out,
                    "<span id=\"author{suffix}\" class=\"author\">{}</span><br>",
                    encode_text(&a.full_name)
                )?;
                if let Some(email) = &a.email {
                    writeln!(
                        self.out,
                        "<span id=\"email{suffix}\" class=\"email\"><a href=\"mailto:{0}\">{1}</a></span><br>",
                        encode_double_quoted_attribute(email),
                        encode_text(email)
                    )?;
                }
            }
            if let Some(rev) = &doc.header.revision {
                let comma = if rev.date.is_empty() { "" } else { "," };
                writeln!(
                    self.out,
                    "<span id=\"revnumber\">version {}{comma}</span>",
                    encode_text(&rev.number)
                )?;
                if !rev.date.is_empty() {
                    writeln!(self.out, "<span id=\"revdate\">{}</span>", encode_text(&rev.date))?;
                }
                if !rev.remark.is_empty() {
                    writeln!(
                        self.out,
                        "<br><span id=\"revremark\">{}</span>",
                        encode_text(&rev.remark)
                    )?;
                }
            }
            self.out.push_str("</div>\n");
        }
        if doc.attribute("toc").is_some_and(|t| t != "macro") {
            self.toc(doc)?;
        }
        self.out.push_str("</div>\n<div id=\"content\">\n");
        Ok(())
    }

    fn footnotes(&mut self, doc: &Document) -> Result<(), RenderError> {
        if doc.footnotes().is_empty() {
            return Ok(());
        }
        self.out.push_str("<div id=\"footnotes\">\n<hr>\n");
        for (i, f) in doc.footnotes().iter().enumerate() {
            let n = i + 1;
            write!(
                self.out,
                "<div class=\"footnote\" id=\"_footnotedef_{n}\">\n<a href=\"#_footnoteref_{n}\">{n}</a>. "
            )?;
            self.children(doc, f.content)?;
            self.out.push_str("\n</div>\n");
        }
        self.out.push_str("</div>\n");
        Ok(())
    }

    fn toc(&mut self, doc: &Document) -> Result<(), RenderError> {
        let title = doc.attribute("toc-title").unwrap_or("Table of Contents");
        write!(
            self.out,
            "<div id=\"toc\" class=\"toc\">\n<div id=\"toctitle\">{}</div>\n",
            encode_text(title)
        )?;
        let levels = doc
            .attribute("toclevels")
            .and_then(|v| v.parse().ok())
            .unwrap_or(2);
        self.in_toc = true;
        let result = self.toc_level(doc, doc.root, 1, levels);
        self.in_toc = false;
        result?;
        self.out.push_str("</div>\n");
        Ok(())
    }

    fn toc_level(
        &mut self,
        doc: &Document,
        parent: NodeId,
        depth: usize,
        levels: usize,
    ) -> Result<(), RenderError> {
        let sections: Vec<NodeId> = doc
            .tree
            .children(parent)
            .filter(|&c| doc.tree[c].kind == NodeKind::Section && doc.tree[c].level <= levels)
            .collect();
        if sections.is_empty() {
            return Ok(());
        }
        writeln!(self.out, "<ul class=\"sectlevel{depth}\">")?;
        for s in sections {
            let n = &doc.tree[s];
            write!(
                self.out,
                "<li><a href=\"#{}\">",
                encode_double_quoted_attribute(n.id.as_deref().unwrap_or_default())
            )?;
            if let Some(l) = n.label {
                self.inline(doc, l)?;
                self.out.push(' ');
            }
            if let Some(t) = n.title {
                self.inline(doc, t)?;
            }
            self.out.push_str("</a>\n");
            self.toc_level(doc, s, depth + 1, levels)?;
            self.out.push_str("</li>\n");
        }
        self.out.push_str("</ul>\n");
        Ok(())
    }

    fn admonition(&mut self, doc: &Document, id: NodeId) -> Result<(), RenderError> {
        let n = &doc.tree[id];
        let role = n.admonition.map_or("note", |a| a.role());
        write!(
            self.out,
            "<div{} class=\"admonitionblock {role}\">\n<table>\n<tr>\n<td class=\"icon\">\n<div class=\"title\">",
            id_attr(doc, id)
        )?;
        if let Some(l) = n.label {
            self.inline(doc, l)?;
        }
        self.out.push_str("</div>\n</td>\n<td class=\"content\">\n");
        self.title(doc, id)?;
        Ok(())
    }

    fn table(&mut self, doc: &Document, id: NodeId, table: &Table) -> Result<(), RenderError> {
        write!(
            self.out,
            "<table{} class=\"tableblock frame-all grid-all stretch{}\">\n",
            id_attr(doc, id),
            roles(doc, id)
        )?;
        if let Some(t) = doc.tree[id].title {
            self.out.push_str("<caption class=\"title\">");
            self.inline(doc, t)?;
            self.out.push_str("</caption>\n");
        }
        self.out.push_str("<colgroup>\n");
        for w in &table.widths {
            writeln!(self.out, "<col style=\"width: {w}%;\">")?;
        }
        self.out.push_str("</colgroup>\n");
        if let Some(h) = &table.header {
            self.out.push_str("<thead>\n");
            self.row(doc, h, true)?;
            self.out.push_str("</thead>\n");
        }
        if !table.rows.is_empty() {
            self.out.push_str("<tbody>\n");
            for r in &table.rows {
                self.row(doc, r, false)?;
            }
            self.out.push_str("</tbody>\n");
        }
        if let Some(f) = &table.footer {
            self.out.push_str("<tfoot>\n");
            self.row(doc, f, false)?;
            self.out.push_str("</tfoot>\n");
        }
        self.out.push_str("</table>\n");
        Ok(())
    }

    fn row(&mut self, doc: &Document, row: &Row, head: bool) -> Result<(), RenderError> {
        self.out.push_str("<tr>\n");
        for cell in &row.cells {
            self.cell(doc, cell, head)?;
        }
        self.out.push_str("</tr>\n");
        Ok(())
    }

    fn cell(&mut self, doc: &Document, cell: &Cell, head: bool) -> Result<(), RenderError> {
        let tag = if head || cell.format.style == CellStyle::Header {
            "th"
        } else {
            "td"
        };
        write!(
            self.out,
            "<{tag} class=\"tableblock halign-{} valign-{}\"",
            cell.format.halign.as_str(),
            cell.format.valign.as_str()
        )?;
        if cell.colspan > 1 {
            write!(self.out, " colspan=\"{}\"", cell.colspan)?;
        }
        if cell.rowspan > 1 {
            write!(self.out, " rowspan=\"{}\"", cell.rowspan)?;
        }
        self.out.push('>');
        let node = &doc.tree[cell.node];
        if head {
            self.children(doc, cell.node)?;
        } else {
            match node.kind {
                NodeKind::BlockOpen => {
                    self.out.push_str("<div class=\"content\">");
                    self.children(doc, cell.node)?;
                    self.out.push_str("</div>");
                }
                NodeKind::LiteralParagraph => write!(
                    self.out,
                    "<div class=\"literal\"><pre>{}</pre></div>",
                    encode_text(&node.raw)
                )?,
                _ => {
                    let (open, close) = match cell.format.style {
                        CellStyle::Strong => ("<strong>", "</strong>"),
                        CellStyle::Emphasis => ("<em>", "</em>"),
                        CellStyle::Monospace => ("<code>", "</code>"),
                        _ => ("", ""),
                    };
                    write!(self.out, "<p class=\"tableblock\">{open}")?;
                    self.children(doc, cell.node)?;
                    write!(self.out, "{close}</p>")?;
                }
            }
        }
        writeln!(self.out, "</{tag}>")?;
        Ok(())
    }

    fn block_begin(&mut self, doc: &Document, id: NodeId) -> Result<Walk, RenderError> {
        let n = &doc.tree[id];
        let ida = id_attr(doc, id);
        let roles = roles(doc, id);
        Ok(match n.kind {
            NodeKind::Root => {
                if !doc.embedded {
                    self.header(doc)?;
                }
                self.enter("")
            }
            NodeKind::Preamble => {
                if !doc.tree.has_children(id) {
                    return Ok(Walk::Skip);
                }
                if doc.sections().is_empty() {
                    self.enter("")
                } else {
                    self.out
                        .push_str("<div id=\"preamble\">\n<div class=\"sectionbody\">\n");
                    self.enter("</div>\n</div>\n")
                }
            }
            NodeKind::Section if n.level == 0 => {
                write!(self.out, "<h1{ida} class=\"sect0{roles}\">")?;
                self.section_title(doc, id)?;
                self.out.push_str("</h1>\n");
                self.enter("")
            }
            NodeKind::Section => {
                let h = n.level + 1;
                write!(self.out, "<div class=\"sect{}{roles}\">\n<h{h}{ida}>", n.level)?;
                self.section_title(doc, id)?;
                writeln!(self.out, "</h{h}>")?;
                if n.level == 1 {
                    self.out.push_str("<div class=\"sectionbody\">\n");
                    self.enter("</div>\n</div>\n")
                } else {
                    self.enter("</div>\n")
                }
            }
            NodeKind::Heading => {
                let h = (n.level + 1).min(6);
                write!(self.out, "<h{h}{ida} class=\"discrete{roles}\">")?;
                if let Some(t) = n.title {
                    self.inline(doc, t)?;
                }
                writeln!(self.out, "</h{h}>")?;
                Walk::Skip
            }
            NodeKind::Paragraph => {
                if n.admonition.is_some() {
                    self.admonition(doc, id)?;
                    return Ok(self.enter("\n</td>\n</tr>\n</table>\n</div>\n"));
                }
                let in_item = n.prev.is_none()
                    && n.parent.is_some_and(|p| doc.tree[p].kind.is_list_item());
                if in_item {
                    self.out.push_str("<p>");
                    let checked = n.parent.and_then(|p| doc.tree[p].attr("checked"));
                    match checked {
                        Some("true") => self.out.push_str("&#10003; "),
                        Some(_) => self.out.push_str("&#10063; "),
                        None => {}
                    }
                    return Ok(self.enter("</p>\n"));
                }
                write!(self.out, "<div{ida} class=\"paragraph{roles}\">\n")?;
                self.title(doc, id)?;
                self.out.push_str("<p>");
                self.enter("</p>\n</div>\n")
            }
            NodeKind::LiteralParagraph | NodeKind::BlockLiteral => {
                write!(self.out, "<div{ida} class=\"literalblock{roles}\">\n")?;
                self.title(doc, id)?;
                write!(
                    self.out,
                    "<div class=\"content\">\n<pre>{}</pre>\n</div>\n</div>\n",
                    encode_text(&n.raw)
                )?;
                Walk::Skip
            }
            NodeKind::BlockListing => {
                write!(self.out, "<div{ida} class=\"listingblock{roles}\">\n")?;
                self.title(doc, id)?;
                self.out.push_str("<div class=\"content\">\n");
                match n.attr("language") {
                    Some(lang) if n.style == Some(BlockStyle::Source) => write!(
                        self.out,
                        "<pre class=\"highlight\"><code class=\"language-{0}\" data-lang=\"{0}\">{1}</code></pre>",
                        encode_double_quoted_attribute(lang),
                        encode_text(&n.raw)
                    )?,
                    _ if n.style == Some(BlockStyle::Source) => write!(
                        self.out,
                        "<pre class=\"highlight\"><code>{}</code></pre>",
                        encode_text(&n.raw)
                    )?,
                    _ => write!(self.out, "<pre>{}</pre>", encode_text(&n.raw))?,
                }
                self.out.push_str("\n</div>\n</div>\n");
                Walk::Skip
            }
            NodeKind::BlockPassthrough => {
                writeln!(self.out, "{}", n.raw)?;
                Walk::Skip
            }
            NodeKind::BlockExample if n.admonition.is_some() => {
                self.admonition(doc, id)?;
                self.enter("</td>\n</tr>\n</table>\n</div>\n")
            }
            NodeKind::BlockExample => {
                write!(self.out, "<div{ida} class=\"exampleblock{roles}\">\n")?;
                self.title(doc, id)?;
                self.out.push_str("<div class=\"content\">\n");
                self.enter("</div>\n</div>\n")
            }
            NodeKind::BlockSidebar => {
                write!(
                    self.out,
                    "<div{ida} class=\"sidebarblock{roles}\">\n<div class=\"content\">\n"
                )?;
                self.title(doc, id)?;
                self.enter("</div>\n</div>\n")
            }
            NodeKind::BlockOpen if n.style == Some(BlockStyle::Abstract) => {
                write!(self.out, "<div{ida} class=\"quoteblock abstract{roles}\">\n")?;
                self.title(doc, id)?;
                self.out.push_str("<blockquote>\n");
                self.enter("</blockquote>\n</div>\n")
            }
            NodeKind::BlockOpen => {
                write!(self.out, "<div{ida} class=\"openblock{roles}\">\n")?;
                self.title(doc, id)?;
                self.out.push_str("<div class=\"content\">\n");
                self.enter("</div>\n</div>\n")
            }
            NodeKind::BlockExcerpts if n.style == Some(BlockStyle::Verse) => {
                write!(self.out, "<div{ida} class=\"verseblock{roles}\">\n")?;
                self.title(doc, id)?;
                self.out.push_str("<pre class=\"content\">");
                let close = format!("</pre>\n{}</div>\n", attribution(doc, id));
                self.enter(close)
            }
            NodeKind::BlockExcerpts => {
                write!(self.out, "<div{ida} class=\"quoteblock{roles}\">\n")?;
                self.title(doc, id)?;
                self.out.push_str("<blockquote>\n");
                let close = format!("</blockquote>\n{}</div>\n", attribution(doc, id));
                self.enter(close)
            }
            NodeKind::ListUnordered => {
                write!(self.out, "<div{ida} class=\"ulist{roles}\">\n")?;
                self.title(doc, id)?;
                if n.roles.iter().any(|r| r == "checklist") {
                    self.out.push_str("<ul class=\"checklist\">\n");
                } else {
                    self.out.push_str("<ul>\n");
                }
                self.enter("</ul>\n</div>\n")
            }
            NodeKind::ListOrdered => {
                let style = ORDERED_STYLES[n.level.saturating_sub(1) % ORDERED_STYLES.len()];
                write!(self.out, "<div{ida} class=\"olist {style}{roles}\">\n")?;
                self.title(doc, id)?;
                writeln!(self.out, "<ol class=\"{style}\">")?;
                self.enter("</ol>\n</div>\n")
            }
            NodeKind::ListDescription => {
                write!(self.out, "<div{ida} class=\"dlist{roles}\">\n")?;
                self.title(doc, id)?;
                self.out.push_str("<dl>\n");
                self.enter("</dl>\n</div>\n")
            }
            NodeKind::ListOrderedItem | NodeKind::ListUnorderedItem => {
                self.out.push_str("<li>\n");
                self.enter("</li>\n")
            }
            NodeKind::ListDescriptionItem => {
                self.out.push_str("<dt class=\"hdlist1\">");
                if let Some(l) = n.label {
                    self.inline(doc, l)?;
                }
                self.out.push_str("</dt>\n<dd>\n");
                self.enter("</dd>\n")
            }
            NodeKind::BlockImage => {
                write!(
                    self.out,
                    "<div{ida} class=\"imageblock{roles}\">\n<div class=\"content\">\n"
                )?;
                self.img(doc, id)?;
                self.out.push_str("\n</div>\n");
                self.title(doc, id)?;
                self.out.push_str("</div>\n");
                Walk::Skip
            }
            NodeKind::BlockVideo | NodeKind::BlockAudio => {
                let (class, tag) = if n.kind == NodeKind::BlockVideo {
                    ("videoblock", "video")
                } else {
                    ("audioblock", "audio")
                };
                write!(self.out, "<div{ida} class=\"{class}{roles}\">\n")?;
                self.title(doc, id)?;
                write!(
                    self.out,
                    "<div class=\"content\">\n<{tag} src=\"{}\"",
                    encode_double_quoted_attribute(n.attr("target").unwrap_or_default())
                )?;
                if let Some(p) = n.attr("poster") {
                    write!(self.out, " poster=\"{}\"", encode_double_quoted_attribute(p))?;
                }
                writeln!(
                    self.out,
                    " controls>\nYour browser does not support the {tag} tag.\n</{tag}>\n</div>\n</div>"
                )?;
                Walk::Skip
            }
            NodeKind::Table => {
                if let Some(table) = &n.table {
                    self.table(doc, id, table)?;
                }
                Walk::Skip
            }
            NodeKind::TocMacro => {
                if doc.attribute("toc") == Some("macro") {
                    self.toc(doc)?;
                }
                Walk::Skip
            }
            NodeKind::HorizontalRule => {
                self.out.push_str("<hr>\n");
                Walk::Skip
            }
            NodeKind::PageBreak => {
                self.out
                    .push_str("<div style=\"page-break-after: always;\"></div>\n");
                Walk::Skip
            }
            _ => self.inline_begin(doc, id)?,
        })
    }

    fn section_title(&mut self, doc: &Document, id: NodeId) -> Result<(), RenderError> {
        let n = &doc.tree[id];
        if let Some(l) = n.label {
            self.inline(doc, l)?;
            self.out.push(' ');
        }
        if let Some(t) = n.title {
            self.inline(doc, t)?;
        }
        Ok(())
    }

    fn img(&mut self, doc: &Document, id: NodeId) -> Result<(), RenderError> {
        let n = &doc.tree[id];
        write!(
            self.out,
            "<img src=\"{}\" alt=\"{}\"",
            encode_double_quoted_attribute(n.attr("target").unwrap_or_default()),
            encode_double_quoted_attribute(n.attr("alt").unwrap_or_default())
        )?;
        for key in ["width", "height"] {
            if let Some(v) = n.attr(key) {
                write!(self.out, " {key}=\"{}\"", encode_double_quoted_attribute(v))?;
            }
        }
        self.out.push('>');
        Ok(())
    }

    fn inline_begin(&mut self, doc: &Document, id: NodeId) -> Result<Walk, RenderError> {
        let n = &doc.tree[id];
        Ok(match n.kind {
            NodeKind::Text => {
                let mut close = String::new();
                for (flag, tag) in [
                    (Emphasis::BOLD, "strong"),
                    (Emphasis::ITALIC, "em"),
                    (Emphasis::MONO, "code"),
                ] {
                    if n.emphasis.contains(flag) {
                        write!(self.out, "<{tag}>")?;
                        close.insert_str(0, &format!("</{tag}>"));
                    }
                }
                self.out.push_str(&encode_text(&n.raw));
                self.enter(close)
            }
            NodeKind::Passthrough => {
                self.out.push_str(&encode_text(&n.raw));
                Walk::Skip
            }
            NodeKind::PassthroughRaw => {
                self.out.push_str(&n.raw);
                Walk::Skip
            }
            NodeKind::Superscript => {
                self.out.push_str("<sup>");
                self.enter("</sup>")
            }
            NodeKind::Subscript => {
                self.out.push_str("<sub>");
                self.enter("</sub>")
            }
            NodeKind::InlineId => {
                if !self.in_toc {
                    write!(self.out, "<a{}></a>", id_attr(doc, id))?;
                }
                Walk::Skip
            }
            NodeKind::InlineIdShort => {
                let roles = n.roles.join(" ");
                self.out.push_str("<span");
                if !self.in_toc {
                    self.out.push_str(&id_attr(doc, id));
                }
                if !roles.is_empty() {
                    write!(self.out, " class=\"{}\"", encode_double_quoted_attribute(&roles))?;
                }
                self.out.push('>');
                self.enter("</span>")
            }
            NodeKind::CrossReference => {
                let target = n.attr("target").unwrap_or_default();
                let (href, anchor) = xref_target(doc, target);
                let labelled = doc.tree.has_children(id);
                if self.in_toc {
                    if !labelled {
                        self.out.push_str(&encode_text(&xref_text(doc, &anchor)));
                    }
                    return Ok(self.enter(""));
                }
                write!(self.out, "<a href=\"{}\">", encode_double_quoted_attribute(&href))?;
                if labelled {
                    self.enter("</a>")
                } else {
                    write!(self.out, "{}</a>", encode_text(&xref_text(doc, &anchor)))?;
                    Walk::Skip
                }
            }
            NodeKind::Footnote => {
                if self.in_toc {
                    return Ok(Walk::Skip);
                }
                let num = n.attr("number").unwrap_or("?");
                self.out.push_str("<sup class=\"footnote\"");
                if let Some(fid) = &n.id {
                    write!(
                        self.out,
                        " id=\"_footnote_{}\"",
                        encode_double_quoted_attribute(fid)
                    )?;
                }
                write!(
                    self.out,
                    ">[<a id=\"_footnoteref_{num}\" class=\"footnote\" href=\"#_footnotedef_{num}\" title=\"View footnote.\">{num}</a>]</sup>"
                )?;
                Walk::Skip
            }
            NodeKind::InlineImage => {
                self.out.push_str("<span class=\"image\">");
                self.img(doc, id)?;
                self.out.push_str("</span>");
                Walk::Skip
            }
            NodeKind::Url => {
                if self.in_toc {
                    return Ok(self.enter(""));
                }
                write!(
                    self.out,
                    "<a href=\"{}\"",
                    encode_double_quoted_attribute(n.attr("href").unwrap_or_default())
                )?;
                let roles = n.roles.join(" ");
                if !roles.is_empty() {
                    write!(self.out, " class=\"{roles}\"")?;
                }
                self.out.push('>');
                self.enter("</a>")
            }
            NodeKind::LineBreak => {
                self.out.push_str("<br>\n");
                Walk::Skip
            }
            NodeKind::QuoteDoubleBegin => self.entity("&#8220;"),
            NodeKind::QuoteDoubleEnd => self.entity("&#8221;"),
            NodeKind::QuoteSingleBegin => self.entity("&#8216;"),
            NodeKind::QuoteSingleEnd => self.entity("&#8217;"),
            _ => self.enter(""),
        })
    }

    fn entity(&mut self, e: &str) -> Walk {
        self.out.push_str(e);
        Walk::Skip
    }
}

impl Visitor for HtmlRenderer {
    fn begin(&mut self, doc: &Document, node: NodeId) -> Result<Walk, RenderError> {
        self.block_begin(doc, node)
    }

    fn end(&mut self, doc: &Document, node: NodeId) -> Result<(), RenderError> {
        let close = self.closers.pop().unwrap_or_default();
        self.out.push_str(&close);
        if doc.tree[node].kind == NodeKind::Root {
            self.footnotes(doc)?;
            if !doc.embedded {
                self.out.push_str("</div>\n</body>\n</html>\n");
            }
        }
        Ok(())
    }
}

/// `&#8212; who` and `<cite>` lines under a quote or verse.
fn attribution(doc: &Document, id: NodeId) -> String {
    let n = &doc.tree[id];
    let (who, cite) = (n.attr("attribution"), n.attr("citetitle"));
    if who.is_none() && cite.is_none() {
        return String::new();
    }
    let mut s = String::from("<div class=\"attribution\">\n");
    if let Some(w) = who {
        s.push_str("&#8212; ");
        s.push_str(&encode_text(w));
    }
    if let Some(c) = cite {
        if who.is_some() {
            s.push_str("<br>\n");
        }
        s.push_str("<cite>");
        s.push_str(&encode_text(c));
        s.push_str("</cite>");
    }
    s.push_str("\n</div>\n");
    s
}

fn id_attr(doc: &Document, id: NodeId) -> String {
    match &doc.tree[id].id {
        Some(i) => format!(" id=\"{}\"", encode_double_quoted_attribute(i)),
        None => String::new(),
    }
}

fn roles(doc: &Document, id: NodeId) -> String {
    doc.tree[id]
        .roles
        .iter()
        .map(|r| format!(" {}", encode_double_quoted_attribute(r)))
        .collect()
}

/// Link target and anchor id of an xref: `id`, `Section Title`,
/// `file.adoc#id` or `file#id`.
fn xref_target(doc: &Document, target: &str) -> (String, String) {
    if let Some((file, frag)) = target.split_once('#') {
        let file = file.strip_suffix(".adoc").unwrap_or(file);
        if file.is_empty() {
            return (format!("#{frag}"), frag.to_string());
        }
        return (format!("{file}.html#{frag}"), frag.to_string());
    }
    let id = if doc.anchor(target).is_some() {
        target
    } else {
        doc.id_for_title(target).unwrap_or(target)
    };
    (format!("#{id}"), id.to_string())
}

fn xref_text(doc: &Document, id: &str) -> String {
    match doc.anchor_label(id) {
        Some(l) if !l.is_empty() => l.to_string(),
        _ => format!("[{id}]"),
    }
}
