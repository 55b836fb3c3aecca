use std::collections::{BTreeMap, HashMap};

use super::{
    counters::SectionCounters,
    node::{NodeId, NodeKind},
    tree::Tree,
};

/// A registered anchor: display label plus the number of collisions seen
/// on this base id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Anchor {
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Author {
    pub full_name: String,
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
    pub initials: String,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Revision {
    pub number: String,
    pub date: String,
    pub remark: String,
}

/// Document header facts gathered before the first blank line.
#[derive(Debug, Clone, Default)]
pub struct Header {
    /// Inline-parsed title; not linked into the body.
    pub title: Option<NodeId>,
    /// Plain text of the main title (before the subtitle separator).
    pub main_title: String,
    pub subtitle: Option<String>,
    pub authors: Vec<Author>,
    pub revision: Option<Revision>,
}

#[derive(Debug, Clone)]
pub struct Footnote {
    pub id: Option<String>,
    /// Container node holding the inline-parsed footnote text.
    pub content: NodeId,
}

/// A parsed AsciiDoc document.
///
/// Owns every node of the tree plus the registries filled while parsing.
/// Nothing here is shared between documents.
#[derive(Debug, Clone)]
pub struct Document {
    pub tree: Tree,
    pub root: NodeId,
    pub preamble: NodeId,
    pub header: Header,
    pub attributes: BTreeMap<String, String>,
    pub counters: SectionCounters,
    /// Render only the body, without `<html>`/`<head>` wrapping.
    pub embedded: bool,
    /// Set while rendering table of contents entries.
    pub is_for_toc: bool,
    anchors: BTreeMap<String, Anchor>,
    titles: HashMap<String, String>,
    footnotes: Vec<Footnote>,
}

/// Attributes every document starts with.
pub fn default_attributes() -> BTreeMap<String, String> {
    [
        ("empty", ""),
        ("sp", " "),
        ("nbsp", "\u{a0}"),
        ("zwsp", "\u{200b}"),
        ("wj", "\u{2060}"),
        ("amp", "&"),
        ("lt", "<"),
        ("gt", ">"),
        ("startsb", "["),
        ("endsb", "]"),
        ("vbar", "|"),
        ("caret", "^"),
        ("asterisk", "*"),
        ("tilde", "~"),
        ("plus", "+"),
        ("backslash", "\\"),
        ("backtick", "`"),
        ("apos", "'"),
        ("quot", "\""),
        ("idprefix", "_"),
        ("idseparator", "_"),
        ("sectids", ""),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        let mut tree = Tree::new();
        let root = tree.new_node(NodeKind::Root);
        let preamble = tree.new_node(NodeKind::Preamble);
        tree.append_child(root, preamble);
        Self {
            tree,
            root,
            preamble,
            header: Header::default(),
            attributes: default_attributes(),
            counters: SectionCounters::new(),
            embedded: false,
            is_for_toc: false,
            anchors: BTreeMap::new(),
            titles: HashMap::new(),
            footnotes: vec![],
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    /// Registers `id` with a display label and returns the id actually used.
    ///
    /// Colliding ids get a `_N` suffix where `N` counts collisions on that
    /// base id: `id`, `id_1`, `id_2`, ...
    pub fn register_anchor(&mut self, id: &str, label: &str) -> String {
        let got = match self.anchors.get(id) {
            Some(existing) => {
                let mut n = existing.count;
                let candidate = loop {
                    n += 1;
                    let candidate = format!("{id}_{n}");
                    if !self.anchors.contains_key(&candidate) {
                        break candidate;
                    }
                };
                if let Some(a) = self.anchors.get_mut(id) {
                    a.count = n;
                }
                candidate
            }
            None => id.to_string(),
        };
        self.anchors.insert(
            got.clone(),
            Anchor {
                label: label.to_string(),
                count: 0,
            },
        );
        if !label.is_empty() {
            self.titles.entry(label.to_string()).or_insert(got.clone());
        }
        got
    }

    pub fn anchor(&self, id: &str) -> Option<&Anchor> {
        self.anchors.get(id)
    }

    pub fn anchor_label(&self, id: &str) -> Option<&str> {
        self.anchors.get(id).map(|a| a.label.as_str())
    }

    /// Updates the label of an already registered anchor.
    pub fn set_anchor_label(&mut self, id: &str, label: &str) {
        if let Some(a) = self.anchors.get_mut(id) {
            a.label = label.to_string();
        }
        if !label.is_empty() {
            self.titles
                .entry(label.to_string())
                .or_insert_with(|| id.to_string());
        }
    }

    /// Looks up the id of a section or anchor by its title.
    pub fn id_for_title(&self, title: &str) -> Option<&str> {
        self.titles.get(title).map(String::as_str)
    }

    /// Registers a footnote and returns its 1-based display number.
    ///
    /// A footnote with an id that was registered before reuses the
    /// existing number; `content` is ignored in that case.
    pub fn register_footnote(&mut self, id: Option<&str>, content: NodeId) -> usize {
        if let Some(id) = id
            && let Some(pos) = self
                .footnotes
                .iter()
                .position(|f| f.id.as_deref() == Some(id))
        {
            return pos + 1;
        }
        self.footnotes.push(Footnote {
            id: id.map(str::to_string),
            content,
        });
        self.footnotes.len()
    }

    /// Number of an existing footnote id, if any.
    pub fn footnote_number(&self, id: &str) -> Option<usize> {
        self.footnotes
            .iter()
            .position(|f| f.id.as_deref() == Some(id))
            .map(|p| p + 1)
    }

    pub fn footnotes(&self) -> &[Footnote] {
        &self.footnotes
    }

    /// Builds the plain text of a node from its raw content and children.
    pub fn plain_text(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        let n = &self.tree[id];
        match n.kind {
            NodeKind::QuoteDoubleBegin => out.push('\u{201c}'),
            NodeKind::QuoteDoubleEnd => out.push('\u{201d}'),
            NodeKind::QuoteSingleBegin => out.push('\u{2018}'),
            NodeKind::QuoteSingleEnd => out.push('\u{2019}'),
            NodeKind::LineBreak => out.push(' '),
            NodeKind::InlineId | NodeKind::Footnote | NodeKind::InlineImage => {}
            _ => out.push_str(&n.raw),
        }
        for c in self.tree.children(id) {
            self.collect_text(c, out);
        }
    }

    /// Fills and returns the cached plain text of a node.
    pub fn cache_text(&mut self, id: NodeId) -> String {
        let text = self.plain_text(id);
        self.tree[id].text = text.clone();
        text
    }

    /// Title of the document header, as plain text.
    pub fn title(&self) -> Option<String> {
        self.header.title.map(|t| self.plain_text(t))
    }

    /// Sections in document order, for the table of contents.
    pub fn sections(&self) -> Vec<NodeId> {
        let mut out = vec![];
        self.collect_sections(self.root, &mut out);
        out
    }

    fn collect_sections(&self, id: NodeId, out: &mut Vec<NodeId>) {
        for c in self.tree.children(id) {
            if self.tree[c].kind == NodeKind::Section {
                out.push(c);
                self.collect_sections(c, out);
            }
        }
    }
}
