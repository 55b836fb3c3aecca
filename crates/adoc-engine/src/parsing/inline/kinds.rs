//! # Inline Kinds
//!
//! Inline markers and the formats the parser keeps open on its stack. The
//! parser never hardcodes a marker byte; it asks these types.

use crate::models::{Emphasis, NodeKind};

/// Formatting that spans text and is opened and closed by markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatKind {
    /// `*x*`
    Bold,
    /// `**x**`
    BoldUnconstrained,
    /// `_x_`
    Italic,
    /// `__x__`
    ItalicUnconstrained,
    /// `` `x` ``
    Mono,
    /// ``` ``x`` ```
    MonoUnconstrained,
    /// `^x^`
    Superscript,
    /// `~x~`
    Subscript,
    /// `[#id]#x#` or `[.role]#x#`
    Span,
}

impl FormatKind {
    /// The format opened by a single or doubled emphasis marker.
    pub fn from_marker(marker: u8, doubled: bool) -> Option<Self> {
        Some(match (marker, doubled) {
            (Marker::BOLD, false) => FormatKind::Bold,
            (Marker::BOLD, true) => FormatKind::BoldUnconstrained,
            (Marker::ITALIC, false) => FormatKind::Italic,
            (Marker::ITALIC, true) => FormatKind::ItalicUnconstrained,
            (Marker::MONO, false) => FormatKind::Mono,
            (Marker::MONO, true) => FormatKind::MonoUnconstrained,
            (Marker::SUPERSCRIPT, _) => FormatKind::Superscript,
            (Marker::SUBSCRIPT, _) => FormatKind::Subscript,
            _ => return None,
        })
    }

    /// Emphasis flag carried by the format node, if any.
    pub fn emphasis(self) -> Emphasis {
        match self {
            FormatKind::Bold | FormatKind::BoldUnconstrained => Emphasis::BOLD,
            FormatKind::Italic | FormatKind::ItalicUnconstrained => Emphasis::ITALIC,
            FormatKind::Mono | FormatKind::MonoUnconstrained => Emphasis::MONO,
            _ => Emphasis::NONE,
        }
    }

    /// Node kind created when the format opens.
    pub fn node_kind(self) -> NodeKind {
        match self {
            FormatKind::Superscript => NodeKind::Superscript,
            FormatKind::Subscript => NodeKind::Subscript,
            FormatKind::Span => NodeKind::InlineIdShort,
            _ => NodeKind::Text,
        }
    }
}

/// Single-byte inline markers.
pub struct Marker;

impl Marker {
    pub const ESCAPE: u8 = b'\\';
    pub const BOLD: u8 = b'*';
    pub const ITALIC: u8 = b'_';
    pub const MONO: u8 = b'`';
    pub const SUPERSCRIPT: u8 = b'^';
    pub const SUBSCRIPT: u8 = b'~';
    pub const PASS: u8 = b'+';
    pub const SPAN: u8 = b'#';
    pub const MACRO: u8 = b':';
    pub const ATTR_OPEN: u8 = b'{';
    pub const ATTR_CLOSE: u8 = b'}';

    /// Bytes a backslash can escape.
    pub fn is_escapable(c: u8) -> bool {
        matches!(
            c,
            b'\\'
                | b'*'
                | b'_'
                | b'`'
                | b'^'
                | b'~'
                | b'+'
                | b'#'
                | b'['
                | b']'
                | b'{'
                | b'}'
                | b'<'
                | b'>'
                | b'('
                | b'-'
                | b'.'
                | b'='
                | b'"'
                | b'\''
        )
    }
}

/// Bracketed inline constructs.
pub struct Bracket;

impl Bracket {
    pub const ANCHOR_OPEN: &'static str = "[[";
    pub const ANCHOR_CLOSE: &'static str = "]]";
    pub const XREF_OPEN: &'static str = "<<";
    pub const XREF_CLOSE: &'static str = ">>";
}

/// Smart quote markers.
pub struct Quote;

impl Quote {
    pub const DOUBLE_OPEN: &'static str = "\"`";
    pub const DOUBLE_CLOSE: &'static str = "`\"";
    pub const SINGLE_OPEN: &'static str = "'`";
    pub const SINGLE_CLOSE: &'static str = "`'";
}

/// Macro names recognised before a `:`.
pub const MACRO_NAMES: [&str; 10] = [
    "footnote", "image", "https", "http", "ftp", "irc", "mailto", "link", "xref", "pass",
];

/// URL schemes among [`MACRO_NAMES`].
pub fn is_url_scheme(name: &str) -> bool {
    matches!(name, "https" | "http" | "ftp" | "irc")
}

/// Typographic replacements, checked in order.
pub const REPLACEMENTS: [(&str, &str); 9] = [
    ("(C)", "\u{a9}"),
    ("(R)", "\u{ae}"),
    ("(TM)", "\u{2122}"),
    ("...", "\u{2026}"),
    ("->", "\u{2192}"),
    ("=>", "\u{21d2}"),
    ("<-", "\u{2190}"),
    ("<=", "\u{21d0}"),
    ("--", "\u{2014}"),
];

/// Typographic apostrophe used between two word characters.
pub const APOSTROPHE: char = '\u{2019}';

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markers_map_to_formats() {
        assert_eq!(FormatKind::from_marker(b'*', false), Some(FormatKind::Bold));
        assert_eq!(
            FormatKind::from_marker(b'`', true),
            Some(FormatKind::MonoUnconstrained)
        );
        assert_eq!(FormatKind::from_marker(b'x', false), None);
    }

    #[test]
    fn constrained_and_unconstrained_share_emphasis() {
        assert_eq!(
            FormatKind::Italic.emphasis(),
            FormatKind::ItalicUnconstrained.emphasis()
        );
        assert!(FormatKind::Span.emphasis().is_empty());
    }
}
