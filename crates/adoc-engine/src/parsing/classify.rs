use crate::models::{AdmonitionKind, NodeKind};

use super::kinds::{BlockMacro, Delimiter, trim_end_space};

/// The kind of a single source line.
///
/// Kept separate from [`NodeKind`]: several line kinds never become nodes
/// (comments, attribute lines) and several node kinds never come from a
/// single line (inline kinds).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineKind {
    Empty,
    BlockComment,
    Comment,
    HorizontalRule,
    PageBreak,
    BlockOpen,
    BlockExcerpts,
    BlockLiteral,
    BlockPassthrough,
    BlockSidebar,
    BlockExample,
    BlockListing,
    /// `[listing]` on its own line.
    ListingNamed,
    /// `[literal]` on its own line.
    LiteralNamed,
    TocMacro,
    Table,
    BlockImage,
    Include,
    BlockVideo,
    BlockAudio,
    Admonition,
    DescriptionItem,
    /// Indented text, kept verbatim.
    LiteralParagraph,
    AttributeEntry,
    /// `[[id]]`
    InlineId,
    /// `[#id]`
    InlineIdShort,
    /// `[.role]`
    StyleClass,
    /// `[style, attr=value]`
    AttributeElement,
    /// `=` to `======` (or `#` runs) followed by a space; holds the level 0–5.
    SectionTitle(usize),
    /// `.Title`
    BlockTitle,
    OrderedListItem,
    UnorderedListItem,
    ListContinuation,
    Text,
}

impl LineKind {
    /// Node kind produced by a delimiter or block macro line.
    pub fn block_kind(self) -> Option<NodeKind> {
        Some(match self {
            LineKind::HorizontalRule => NodeKind::HorizontalRule,
            LineKind::PageBreak => NodeKind::PageBreak,
            LineKind::BlockOpen => NodeKind::BlockOpen,
            LineKind::BlockExcerpts => NodeKind::BlockExcerpts,
            LineKind::BlockLiteral | LineKind::LiteralNamed => NodeKind::BlockLiteral,
            LineKind::BlockPassthrough => NodeKind::BlockPassthrough,
            LineKind::BlockSidebar => NodeKind::BlockSidebar,
            LineKind::BlockExample => NodeKind::BlockExample,
            LineKind::BlockListing | LineKind::ListingNamed => NodeKind::BlockListing,
            LineKind::TocMacro => NodeKind::TocMacro,
            LineKind::Table => NodeKind::Table,
            LineKind::BlockImage => NodeKind::BlockImage,
            LineKind::BlockVideo => NodeKind::BlockVideo,
            LineKind::BlockAudio => NodeKind::BlockAudio,
            LineKind::LiteralParagraph => NodeKind::LiteralParagraph,
            LineKind::OrderedListItem => NodeKind::ListOrderedItem,
            LineKind::UnorderedListItem => NodeKind::ListUnorderedItem,
            LineKind::DescriptionItem => NodeKind::ListDescriptionItem,
            LineKind::SectionTitle(_) => NodeKind::Section,
            _ => return None,
        })
    }

    /// Delimiter lines that open a block closed by the same kind.
    pub fn is_delimiter(self) -> bool {
        matches!(
            self,
            LineKind::BlockOpen
                | LineKind::BlockExcerpts
                | LineKind::BlockLiteral
                | LineKind::BlockPassthrough
                | LineKind::BlockSidebar
                | LineKind::BlockExample
                | LineKind::BlockListing
                | LineKind::Table
        )
    }

    pub fn is_list_item(self) -> bool {
        matches!(
            self,
            LineKind::OrderedListItem | LineKind::UnorderedListItem | LineKind::DescriptionItem
        )
    }

    /// Block metadata lines that only describe the next block.
    pub fn is_block_meta(self) -> bool {
        matches!(
            self,
            LineKind::InlineId
                | LineKind::InlineIdShort
                | LineKind::StyleClass
                | LineKind::AttributeElement
                | LineKind::BlockTitle
                | LineKind::ListingNamed
                | LineKind::LiteralNamed
        )
    }
}

/// Classification of a single line: its kind, leading whitespace and the
/// content after trimming.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineClass<'a> {
    pub kind: LineKind,
    /// Leading whitespace removed from indented lines; empty otherwise.
    pub spaces: &'a str,
    /// The line without trailing whitespace and without `spaces`.
    pub content: &'a str,
}

impl<'a> LineClass<'a> {
    fn new(kind: LineKind, spaces: &'a str, content: &'a str) -> Self {
        Self {
            kind,
            spaces,
            content,
        }
    }
}

/// Position of a description list marker (`::`, `:::`, `::::`, `;;`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DescriptionMarker {
    /// Byte offset where the marker starts; the term is `line[..start]`.
    pub start: usize,
    pub len: usize,
    /// 1 for `::`, 2 for `:::`, 3 for `::::`, 4 for `;;`.
    pub level: usize,
}

/// Classifies a raw line.
///
/// Pure and total: every input yields a kind, `Text` when nothing else
/// matches. The order of checks is significant.
pub fn classify(line: &str) -> LineClass<'_> {
    let line = trim_end_space(line);

    if line.is_empty() {
        return LineClass::new(LineKind::Empty, "", line);
    }
    // Block comments first: a single-line comment check would match them too.
    if line.starts_with(Delimiter::BLOCK_COMMENT) {
        return LineClass::new(LineKind::BlockComment, "", line);
    }
    if line.starts_with(Delimiter::LINE_COMMENT) {
        return LineClass::new(LineKind::Comment, "", line);
    }

    if let Some(kind) = exact_kind(line) {
        return LineClass::new(kind, "", line);
    }

    if line.starts_with(Delimiter::TABLE) {
        return LineClass::new(LineKind::Table, "", line);
    }
    if line.starts_with(BlockMacro::IMAGE) {
        return LineClass::new(LineKind::BlockImage, "", line);
    }
    if line.starts_with(BlockMacro::INCLUDE) {
        return LineClass::new(LineKind::Include, "", line);
    }
    if line.starts_with(BlockMacro::VIDEO) {
        return LineClass::new(LineKind::BlockVideo, "", line);
    }
    if line.starts_with(BlockMacro::AUDIO) {
        return LineClass::new(LineKind::BlockAudio, "", line);
    }
    if admonition_prefix(line).is_some() {
        return LineClass::new(LineKind::Admonition, "", line);
    }

    let indent = line.len() - line.trim_start_matches([' ', '\t']).len();
    let (spaces, line) = line.split_at(indent);
    if indent > 0 {
        if description_marker(line).is_some() {
            return LineClass::new(LineKind::DescriptionItem, spaces, line);
        }
        if !line.starts_with(['*', '-', '.']) {
            return LineClass::new(LineKind::LiteralParagraph, spaces, line);
        }
    }

    let b = line.as_bytes();
    let kind = match b[0] {
        b':' => LineKind::AttributeEntry,
        b'[' => bracket_kind(b),
        b'=' | b'#' => heading_kind(b),
        b'.' => dot_kind(b),
        b'*' | b'-' => bullet_kind(b),
        _ => {
            if line == Delimiter::LIST_CONTINUATION {
                LineKind::ListContinuation
            } else if line == Delimiter::LISTING {
                LineKind::BlockListing
            } else if is_numbered_item(b) {
                LineKind::OrderedListItem
            } else if description_marker(line).is_some() {
                LineKind::DescriptionItem
            } else {
                LineKind::Text
            }
        }
    };
    LineClass::new(kind, spaces, line)
}

fn exact_kind(line: &str) -> Option<LineKind> {
    if Delimiter::HORIZONTAL_RULES.contains(&line) {
        return Some(LineKind::HorizontalRule);
    }
    Some(match line {
        Delimiter::PAGE_BREAK => LineKind::PageBreak,
        Delimiter::OPEN => LineKind::BlockOpen,
        Delimiter::EXCERPTS => LineKind::BlockExcerpts,
        Delimiter::LITERAL => LineKind::BlockLiteral,
        Delimiter::PASSTHROUGH => LineKind::BlockPassthrough,
        Delimiter::SIDEBAR => LineKind::BlockSidebar,
        Delimiter::EXAMPLE => LineKind::BlockExample,
        BlockMacro::LISTING_NAMED => LineKind::ListingNamed,
        BlockMacro::LITERAL_NAMED => LineKind::LiteralNamed,
        BlockMacro::TOC => LineKind::TocMacro,
        _ => return None,
    })
}

/// Returns the admonition and the text after `LABEL: `.
pub fn admonition_prefix(line: &str) -> Option<(AdmonitionKind, &str)> {
    AdmonitionKind::ALL.into_iter().find_map(|k| {
        line.strip_prefix(k.marker())
            .and_then(|rest| rest.strip_prefix(": "))
            .map(|rest| (k, rest))
    })
}

fn bracket_kind(b: &[u8]) -> LineKind {
    let l = b.len();
    if b[l - 1] != b']' {
        return LineKind::Text;
    }
    if l >= 5 && b[1] == b'[' && b[l - 2] == b']' {
        return LineKind::InlineId;
    }
    if l >= 4 {
        if b[1] == b'#' {
            return LineKind::InlineIdShort;
        }
        if b[1] == b'.' {
            return LineKind::StyleClass;
        }
    }
    LineKind::AttributeElement
}

fn heading_kind(b: &[u8]) -> LineKind {
    let marker = b[0];
    let n = b.iter().take_while(|&&c| c == marker).count();
    match b.get(n) {
        Some(b' ' | b'\t') if n <= 6 => LineKind::SectionTitle(n - 1),
        _ => LineKind::Text,
    }
}

fn dot_kind(b: &[u8]) -> LineKind {
    if b.len() <= 1 {
        return LineKind::Text;
    }
    if b[1].is_ascii_alphanumeric() {
        return LineKind::BlockTitle;
    }
    for &c in b {
        match c {
            b'.' => continue,
            b' ' | b'\t' => return LineKind::OrderedListItem,
            _ => break,
        }
    }
    LineKind::Text
}

fn bullet_kind(b: &[u8]) -> LineKind {
    if b.len() <= 1 {
        return LineKind::Text;
    }
    let marker = b[0];
    let mut count = 0;
    let mut x = 0;
    while x < b.len() {
        if b[x] == marker {
            count += 1;
            x += 1;
            continue;
        }
        if b[x] == b' ' || b[x] == b'\t' {
            return LineKind::UnorderedListItem;
        }
        break;
    }
    if marker == b'-' && count == 4 && x == b.len() {
        LineKind::BlockListing
    } else {
        LineKind::Text
    }
}

/// `1. item`, `10. item`
fn is_numbered_item(b: &[u8]) -> bool {
    let digits = b.iter().take_while(|c| c.is_ascii_digit()).count();
    digits > 0 && b.get(digits) == Some(&b'.') && matches!(b.get(digits + 1), Some(b' ' | b'\t'))
}

/// Finds an unescaped description list marker followed by whitespace or
/// the end of the line.
pub fn description_marker(line: &str) -> Option<DescriptionMarker> {
    let b = line.as_bytes();
    let mut i = 1;
    while i + 1 < b.len() {
        let c = b[i];
        if (c != b':' && c != b';') || b[i + 1] != c || b[i - 1] == b'\\' {
            i += 1;
            continue;
        }
        let run = b[i..].iter().take_while(|&&x| x == c).count();
        let level = match (c, run) {
            (b':', 2..=4) => Some(run - 1),
            (b';', 2) => Some(4),
            _ => None,
        };
        let ends = matches!(b.get(i + run), None | Some(b' ' | b'\t'));
        if let Some(level) = level
            && ends
            && !line[..i].trim().is_empty()
        {
            return Some(DescriptionMarker {
                start: i,
                len: run,
                level,
            });
        }
        i += run;
    }
    None
}

/// Level of a list item line: the marker run length for `*`, `-` and `.`
/// items, 1 for numbered items, the colon count for description items.
pub fn list_item_level(kind: LineKind, content: &str) -> usize {
    match kind {
        LineKind::UnorderedListItem | LineKind::OrderedListItem => {
            let b = content.as_bytes();
            if b.first().is_some_and(u8::is_ascii_digit) {
                return 1;
            }
            let marker = b[0];
            b.iter().take_while(|&&c| c == marker).count()
        }
        LineKind::DescriptionItem => description_marker(content).map_or(1, |m| m.level),
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("", LineKind::Empty)]
    #[case("   \t", LineKind::Empty)]
    #[case("////", LineKind::BlockComment)]
    #[case("////////", LineKind::BlockComment)]
    #[case("// note", LineKind::Comment)]
    #[case("//note", LineKind::Comment)]
    #[case("'''", LineKind::HorizontalRule)]
    #[case("---", LineKind::HorizontalRule)]
    #[case("- - -", LineKind::HorizontalRule)]
    #[case("***", LineKind::HorizontalRule)]
    #[case("* * *", LineKind::HorizontalRule)]
    #[case("<<<", LineKind::PageBreak)]
    #[case("--", LineKind::BlockOpen)]
    #[case("____", LineKind::BlockExcerpts)]
    #[case("....", LineKind::BlockLiteral)]
    #[case("++++", LineKind::BlockPassthrough)]
    #[case("****", LineKind::BlockSidebar)]
    #[case("====", LineKind::BlockExample)]
    #[case("----", LineKind::BlockListing)]
    #[case("----  ", LineKind::BlockListing)]
    #[case("[listing]", LineKind::ListingNamed)]
    #[case("[literal]", LineKind::LiteralNamed)]
    #[case("toc::[]", LineKind::TocMacro)]
    #[case("|===", LineKind::Table)]
    #[case("|====", LineKind::Table)]
    #[case("image::logo.png[]", LineKind::BlockImage)]
    #[case("include::other.adoc[]", LineKind::Include)]
    #[case("video::clip.mp4[]", LineKind::BlockVideo)]
    #[case("audio::song.ogg[]", LineKind::BlockAudio)]
    #[case("NOTE: careful", LineKind::Admonition)]
    #[case("CAUTION: hot", LineKind::Admonition)]
    #[case("NOTE:careful", LineKind::Text)]
    #[case(":toc: left", LineKind::AttributeEntry)]
    #[case("[[intro]]", LineKind::InlineId)]
    #[case("[#intro]", LineKind::InlineIdShort)]
    #[case("[.lead]", LineKind::StyleClass)]
    #[case("[source,rust]", LineKind::AttributeElement)]
    #[case("[NOTE]", LineKind::AttributeElement)]
    #[case("[not closed", LineKind::Text)]
    #[case("= Title", LineKind::SectionTitle(0))]
    #[case("== Section", LineKind::SectionTitle(1))]
    #[case("====== Deep", LineKind::SectionTitle(5))]
    #[case("======= Too deep", LineKind::Text)]
    #[case("## Markdown style", LineKind::SectionTitle(1))]
    #[case("==no space", LineKind::Text)]
    #[case(".Title", LineKind::BlockTitle)]
    #[case(". item", LineKind::OrderedListItem)]
    #[case(".. nested", LineKind::OrderedListItem)]
    #[case(".", LineKind::Text)]
    #[case("...", LineKind::Text)]
    #[case("1. first", LineKind::OrderedListItem)]
    #[case("* item", LineKind::UnorderedListItem)]
    #[case("*** deep", LineKind::UnorderedListItem)]
    #[case("- dash", LineKind::UnorderedListItem)]
    #[case("*bold* start", LineKind::Text)]
    #[case("-", LineKind::Text)]
    #[case("+", LineKind::ListContinuation)]
    #[case("term:: definition", LineKind::DescriptionItem)]
    #[case("term::", LineKind::DescriptionItem)]
    #[case("term;; definition", LineKind::DescriptionItem)]
    #[case("std::vec is a path", LineKind::Text)]
    #[case("escaped\\:: colon", LineKind::Text)]
    #[case("  indented text", LineKind::LiteralParagraph)]
    #[case("  NOTE: indented", LineKind::LiteralParagraph)]
    #[case("  * indented item", LineKind::UnorderedListItem)]
    #[case("plain words", LineKind::Text)]
    fn classifies(#[case] line: &str, #[case] expected: LineKind) {
        assert_eq!(classify(line).kind, expected);
    }

    #[test]
    fn indented_description_item_wins_over_literal() {
        let got = classify("  term:: def");
        assert_eq!(got.kind, LineKind::DescriptionItem);
        assert_eq!(got.spaces, "  ");
        assert_eq!(got.content, "term:: def");
    }

    #[test]
    fn literal_paragraph_keeps_spaces_apart() {
        let got = classify("\t  code();  ");
        assert_eq!(got.kind, LineKind::LiteralParagraph);
        assert_eq!(got.spaces, "\t  ");
        assert_eq!(got.content, "code();");
    }

    #[test]
    fn four_dashes_with_text_is_not_listing() {
        assert_eq!(classify("---- x").kind, LineKind::UnorderedListItem);
        assert_eq!(classify("----x").kind, LineKind::Text);
    }

    #[test]
    fn classification_is_pure() {
        let lines = ["* a", "== b", "  c", "[[d]]", "e:: f", "|==="];
        for l in lines {
            assert_eq!(classify(l), classify(l));
        }
    }

    #[test]
    fn description_marker_levels() {
        assert_eq!(description_marker("a:: b").map(|m| m.level), Some(1));
        assert_eq!(description_marker("a::: b").map(|m| m.level), Some(2));
        assert_eq!(description_marker("a:::: b").map(|m| m.level), Some(3));
        assert_eq!(description_marker("a;; b").map(|m| m.level), Some(4));
        assert_eq!(description_marker(":: b"), None);
        let m = description_marker("CPU:: the brain").unwrap();
        assert_eq!(&"CPU:: the brain"[..m.start], "CPU");
    }

    #[test]
    fn list_levels() {
        assert_eq!(list_item_level(LineKind::UnorderedListItem, "*** x"), 3);
        assert_eq!(list_item_level(LineKind::UnorderedListItem, "- x"), 1);
        assert_eq!(list_item_level(LineKind::OrderedListItem, ".. x"), 2);
        assert_eq!(list_item_level(LineKind::OrderedListItem, "12. x"), 1);
        assert_eq!(list_item_level(LineKind::DescriptionItem, "t::: x"), 2);
    }

    #[test]
    fn block_kind_mapping() {
        assert_eq!(
            LineKind::ListingNamed.block_kind(),
            Some(NodeKind::BlockListing)
        );
        assert_eq!(LineKind::Comment.block_kind(), None);
        assert_eq!(
            LineKind::SectionTitle(3).block_kind(),
            Some(NodeKind::Section)
        );
    }
}
