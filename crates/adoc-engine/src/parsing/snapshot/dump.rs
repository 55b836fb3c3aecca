use std::fmt::Write;

use crate::models::{Document, NodeId, NodeKind};

/// Renders the sub-tree under `id` as an indented outline, one node per line.
///
/// Each line shows the kind followed by the facets that are set: level,
/// `#id`, `[emphasis]`, admonition, style, `.roles`, `%options`, attributes,
/// title and label text, then the raw content.
pub fn dump(doc: &Document, id: NodeId) -> String {
    let mut out = String::new();
    dump_node(doc, id, 0, &mut out);
    out
}

fn dump_node(doc: &Document, id: NodeId, depth: usize, out: &mut String) {
    let n = &doc.tree[id];
    let _ = write!(out, "{}{:?}", "  ".repeat(depth), n.kind);
    if matches!(n.kind, NodeKind::Section | NodeKind::Heading)
        || n.kind.is_list()
        || n.kind.is_list_item()
    {
        let _ = write!(out, " level={}", n.level);
    }
    if let Some(id) = &n.id {
        let _ = write!(out, " #{id}");
    }
    if !n.emphasis.is_empty() {
        let _ = write!(out, " [{}]", n.emphasis);
    }
    if let Some(a) = n.admonition {
        let _ = write!(out, " admonition={a:?}");
    }
    if let Some(s) = n.style {
        let _ = write!(out, " style={s:?}");
    }
    for r in &n.roles {
        let _ = write!(out, " .{r}");
    }
    for o in &n.options {
        let _ = write!(out, " %{o}");
    }
    for (k, v) in &n.attrs {
        let _ = write!(out, " {k}={v:?}");
    }
    if let Some(t) = n.title {
        let _ = write!(out, " title={:?}", doc.plain_text(t));
    }
    if let Some(l) = n.label {
        let _ = write!(out, " label={:?}", doc.plain_text(l));
    }
    if let Some(table) = &n.table {
        let _ = write!(out, " cols={}", table.ncols());
        if table.header.is_some() {
            out.push_str(" header");
        }
        let _ = write!(out, " rows={}", table.rows.len());
        if table.footer.is_some() {
            out.push_str(" footer");
        }
    }
    if !n.raw.is_empty() {
        let _ = write!(out, " {:?}", n.raw);
    }
    out.push('\n');
    for c in doc.tree.children(id) {
        dump_node(doc, c, depth + 1, out);
    }
}
