//! # Syntax Kinds
//!
//! Block-level syntax constants, kept in one place so the classifier and the
//! block parser never hardcode delimiter strings.

/// Delimiter lines, matched exactly after trailing whitespace is trimmed.
pub struct Delimiter;

impl Delimiter {
    pub const BLOCK_COMMENT: &'static str = "////";
    pub const LINE_COMMENT: &'static str = "//";
    pub const OPEN: &'static str = "--";
    pub const EXCERPTS: &'static str = "____";
    pub const LITERAL: &'static str = "....";
    pub const PASSTHROUGH: &'static str = "++++";
    pub const SIDEBAR: &'static str = "****";
    pub const EXAMPLE: &'static str = "====";
    pub const LISTING: &'static str = "----";
    /// Prefix; `|====` and longer also open a table.
    pub const TABLE: &'static str = "|===";
    pub const PAGE_BREAK: &'static str = "<<<";
    pub const HORIZONTAL_RULES: [&'static str; 5] = ["'''", "---", "- - -", "***", "* * *"];
    pub const LIST_CONTINUATION: &'static str = "+";
}

/// Line-level macros recognised by prefix.
pub struct BlockMacro;

impl BlockMacro {
    pub const IMAGE: &'static str = "image::";
    pub const INCLUDE: &'static str = "include::";
    pub const VIDEO: &'static str = "video::";
    pub const AUDIO: &'static str = "audio::";
    pub const TOC: &'static str = "toc::[]";
    pub const LISTING_NAMED: &'static str = "[listing]";
    pub const LITERAL_NAMED: &'static str = "[literal]";
}

/// Whitespace stripped from the end of every line.
pub fn is_trailing_space(c: char) -> bool {
    matches!(
        c,
        ' ' | '\t' | '\r' | '\n' | '\x0c' | '\x0b' | '\u{85}' | '\u{a0}'
    )
}

pub fn trim_end_space(s: &str) -> &str {
    s.trim_end_matches(is_trailing_space)
}

/// Valid characters for ids and attribute names: the first must be a
/// letter, `_` or `:`; the rest may add digits, `-` and `.`.
pub fn is_valid_id(id: &str) -> bool {
    let mut chars = id.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == ':' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | ':'))
}

/// Attribute names: word characters and `-`, not starting with `-`.
pub fn is_valid_attr_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphanumeric() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}
