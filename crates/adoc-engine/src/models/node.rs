use std::collections::BTreeMap;
use std::fmt;

use super::table::Table;

/// Handle to a node stored in a [`Tree`](super::tree::Tree) arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Returns the arena index of this node.
    pub fn index(self) -> usize {
        self.0
    }
}

/// The kind of a node in the document tree.
///
/// Block kinds are produced by the block parser, inline kinds by the inline
/// parser. Line classification uses its own [`LineKind`](crate::parsing::classify::LineKind).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Root of the document body.
    Root,
    /// Content between the header and the first section.
    Preamble,
    /// A section; `level` holds the section level (0–5).
    Section,
    /// A heading that does not open a section (`[discrete]`).
    Heading,
    Paragraph,
    LiteralParagraph,
    ListOrdered,
    ListOrderedItem,
    ListUnordered,
    ListUnorderedItem,
    ListDescription,
    ListDescriptionItem,
    BlockListing,
    BlockLiteral,
    BlockPassthrough,
    BlockExample,
    /// Quote or verse block (`____`).
    BlockExcerpts,
    BlockSidebar,
    BlockOpen,
    BlockImage,
    BlockVideo,
    BlockAudio,
    Table,
    TocMacro,
    HorizontalRule,
    PageBreak,

    /// Plain text leaf, or an emphasis container when `emphasis` is set.
    Text,
    /// `+text+` and `++text++`: literal text, still escaped on output.
    Passthrough,
    /// `+++text+++` and `pass:[text]`: emitted without escaping.
    PassthroughRaw,
    Superscript,
    Subscript,
    /// `[[id]]` anchor.
    InlineId,
    /// `[#id]#text#` span.
    InlineIdShort,
    CrossReference,
    Footnote,
    InlineImage,
    Url,
    LineBreak,
    QuoteDoubleBegin,
    QuoteDoubleEnd,
    QuoteSingleBegin,
    QuoteSingleEnd,
}

impl NodeKind {
    /// Returns true for the three list container kinds.
    pub fn is_list(self) -> bool {
        matches!(
            self,
            NodeKind::ListOrdered | NodeKind::ListUnordered | NodeKind::ListDescription
        )
    }

    /// Returns true for the three list item kinds.
    pub fn is_list_item(self) -> bool {
        matches!(
            self,
            NodeKind::ListOrderedItem
                | NodeKind::ListUnorderedItem
                | NodeKind::ListDescriptionItem
        )
    }

    /// The item kind belonging to a list kind, or the list kind of an item.
    pub fn list_pair(self) -> Option<NodeKind> {
        match self {
            NodeKind::ListOrdered => Some(NodeKind::ListOrderedItem),
            NodeKind::ListUnordered => Some(NodeKind::ListUnorderedItem),
            NodeKind::ListDescription => Some(NodeKind::ListDescriptionItem),
            NodeKind::ListOrderedItem => Some(NodeKind::ListOrdered),
            NodeKind::ListUnorderedItem => Some(NodeKind::ListUnordered),
            NodeKind::ListDescriptionItem => Some(NodeKind::ListDescription),
            _ => None,
        }
    }

    /// Whitespace inside these nodes is significant and never trimmed.
    pub fn is_passthrough(self) -> bool {
        matches!(self, NodeKind::Passthrough | NodeKind::PassthroughRaw)
    }
}

/// Combinable text emphasis flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Emphasis(u8);

impl Emphasis {
    pub const NONE: Emphasis = Emphasis(0);
    pub const BOLD: Emphasis = Emphasis(1);
    pub const ITALIC: Emphasis = Emphasis(1 << 1);
    pub const MONO: Emphasis = Emphasis(1 << 2);

    pub fn contains(self, other: Emphasis) -> bool {
        other.0 != 0 && self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: Emphasis) {
        self.0 |= other.0;
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Emphasis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names = vec![];
        if self.contains(Emphasis::BOLD) {
            names.push("bold");
        }
        if self.contains(Emphasis::ITALIC) {
            names.push("italic");
        }
        if self.contains(Emphasis::MONO) {
            names.push("mono");
        }
        f.write_str(&names.join("+"))
    }
}

/// Admonition labels recognised as `NOTE:` prefixes or `[NOTE]` styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdmonitionKind {
    Note,
    Tip,
    Important,
    Warning,
    Caution,
}

impl AdmonitionKind {
    pub const ALL: [AdmonitionKind; 5] = [
        AdmonitionKind::Note,
        AdmonitionKind::Tip,
        AdmonitionKind::Important,
        AdmonitionKind::Warning,
        AdmonitionKind::Caution,
    ];

    /// The upper-case marker, e.g. `NOTE`.
    pub fn marker(self) -> &'static str {
        match self {
            AdmonitionKind::Note => "NOTE",
            AdmonitionKind::Tip => "TIP",
            AdmonitionKind::Important => "IMPORTANT",
            AdmonitionKind::Warning => "WARNING",
            AdmonitionKind::Caution => "CAUTION",
        }
    }

    /// The display label, e.g. `Note`.
    pub fn label(self) -> &'static str {
        match self {
            AdmonitionKind::Note => "Note",
            AdmonitionKind::Tip => "Tip",
            AdmonitionKind::Important => "Important",
            AdmonitionKind::Warning => "Warning",
            AdmonitionKind::Caution => "Caution",
        }
    }

    /// The CSS role, e.g. `note`.
    pub fn role(self) -> &'static str {
        match self {
            AdmonitionKind::Note => "note",
            AdmonitionKind::Tip => "tip",
            AdmonitionKind::Important => "important",
            AdmonitionKind::Warning => "warning",
            AdmonitionKind::Caution => "caution",
        }
    }

    pub fn from_marker(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.marker() == s)
    }
}

/// Named block styles taken from the first positional block attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockStyle {
    Source,
    Listing,
    Literal,
    Quote,
    Verse,
    Discrete,
    Appendix,
    Abstract,
}

impl BlockStyle {
    pub fn from_name(s: &str) -> Option<Self> {
        match s {
            "source" => Some(BlockStyle::Source),
            "listing" => Some(BlockStyle::Listing),
            "literal" => Some(BlockStyle::Literal),
            "quote" => Some(BlockStyle::Quote),
            "verse" => Some(BlockStyle::Verse),
            "discrete" | "float" => Some(BlockStyle::Discrete),
            "appendix" => Some(BlockStyle::Appendix),
            "abstract" => Some(BlockStyle::Abstract),
            _ => None,
        }
    }
}

/// A single element of the document tree.
///
/// Links are arena handles: ownership runs through `parent -> child -> next`,
/// `prev` and `parent` are back references.
#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    /// Unparsed content; emptied once consumed into children.
    pub raw: String,
    /// Plain-text cache used for anchors and the table of contents.
    pub text: String,
    /// List nesting level or section level.
    pub level: usize,
    pub id: Option<String>,
    pub emphasis: Emphasis,
    pub admonition: Option<AdmonitionKind>,
    pub style: Option<BlockStyle>,
    pub roles: Vec<String>,
    pub options: Vec<String>,
    pub attrs: BTreeMap<String, String>,
    /// Caption sub-tree, not linked as a child.
    pub title: Option<NodeId>,
    /// Label sub-tree (description term, admonition label, section number).
    pub label: Option<NodeId>,
    pub table: Option<Table>,
    pub parent: Option<NodeId>,
    pub child: Option<NodeId>,
    pub next: Option<NodeId>,
    pub prev: Option<NodeId>,
}

impl Node {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            raw: String::new(),
            text: String::new(),
            level: 0,
            id: None,
            emphasis: Emphasis::NONE,
            admonition: None,
            style: None,
            roles: vec![],
            options: vec![],
            attrs: BTreeMap::new(),
            title: None,
            label: None,
            table: None,
            parent: None,
            child: None,
            next: None,
            prev: None,
        }
    }

    /// Adds a role, keeping the list free of duplicates.
    pub fn add_role(&mut self, role: &str) {
        let role = role.trim();
        if !role.is_empty() && !self.roles.iter().any(|r| r == role) {
            self.roles.push(role.to_string());
        }
    }

    pub fn add_option(&mut self, opt: &str) {
        let opt = opt.trim();
        if !opt.is_empty() && !self.options.iter().any(|o| o == opt) {
            self.options.push(opt.to_string());
        }
    }

    pub fn has_option(&self, opt: &str) -> bool {
        self.options.iter().any(|o| o == opt)
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).map(String::as_str)
    }
}
