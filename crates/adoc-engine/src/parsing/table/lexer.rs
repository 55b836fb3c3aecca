//! Cell tokenizer for table bodies.
//!
//! The body is cut into cells at every unescaped `|`. The text right
//! before a `|`, when preceded by whitespace or the start of a line, may be
//! a [`CellSpec`] for the cell that `|` opens.

use logos::Logos;

use super::format::{CellSpec, parse_cell_spec};

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellToken {
    #[token("|")]
    Pipe,

    #[token("\\|")]
    EscapedPipe,

    #[regex(r"\r?\n")]
    Newline,

    /// `N*`, `N+`, `.N+`, `N.M+`
    #[regex(r"[0-9]+\*")]
    #[regex(r"[0-9]+\+")]
    #[regex(r"\.[0-9]+\+")]
    #[regex(r"[0-9]+\.[0-9]+\+")]
    SpanSpec,

    #[regex(r"[ \t]+")]
    Whitespace,

    #[token("\\")]
    Backslash,

    #[regex(r"[^ \t\r\n|\\]+")]
    Text,
}

/// A cell cut from the table body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCell {
    pub spec: CellSpec,
    pub text: String,
}

/// Splits a table body into cells. `None` marks a blank line between rows.
///
/// Text before the first `|` other than a cell spec is dropped.
pub fn split_cells(body: &str) -> Vec<Option<RawCell>> {
    let mut out = vec![];
    let mut buf = String::new();
    let mut spec: Option<CellSpec> = None;
    let mut blank = false;
    let mut line_has_content = false;

    let mut lexer = CellToken::lexer(body);
    while let Some(token) = lexer.next() {
        let text = lexer.slice();
        match token {
            Ok(CellToken::Pipe) => {
                let (head, next) = take_spec(&buf, spec.is_none());
                if let Some(s) = spec.take() {
                    out.push(Some(RawCell {
                        spec: s,
                        text: head.trim().to_string(),
                    }));
                    if blank {
                        out.push(None);
                    }
                }
                blank = false;
                spec = Some(next);
                buf.clear();
                line_has_content = true;
            }
            Ok(CellToken::EscapedPipe) => {
                buf.push('|');
                line_has_content = true;
            }
            Ok(CellToken::Newline) => {
                if !line_has_content && spec.is_some() {
                    blank = true;
                }
                buf.push('\n');
                line_has_content = false;
            }
            Ok(CellToken::Whitespace) => buf.push_str(text),
            _ => {
                buf.push_str(text);
                line_has_content = true;
            }
        }
    }
    if let Some(s) = spec {
        out.push(Some(RawCell {
            spec: s,
            text: buf.trim().to_string(),
        }));
    }
    out
}

/// Splits a trailing cell spec off `buf`. The spec must follow whitespace,
/// a newline, or be all of `buf` before the first `|`.
fn take_spec(buf: &str, first: bool) -> (&str, CellSpec) {
    if buf.ends_with([' ', '\t', '\n']) {
        return (buf, CellSpec::default());
    }
    let start = buf.rfind([' ', '\t', '\n']).map_or(0, |i| i + 1);
    if start == 0 && !first {
        return (buf, CellSpec::default());
    }
    match parse_cell_spec(&buf[start..]) {
        Some(spec) => (&buf[..start], spec),
        None => (buf, CellSpec::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CellStyle, HAlign};
    use pretty_assertions::assert_eq;

    fn texts(cells: &[Option<RawCell>]) -> Vec<Option<&str>> {
        cells
            .iter()
            .map(|c| c.as_ref().map(|c| c.text.as_str()))
            .collect()
    }

    #[test]
    fn tokens() {
        let got: Vec<_> = CellToken::lexer("2+|a \\| b\n")
            .map(|t| t.unwrap())
            .collect();
        assert_eq!(
            got,
            vec![
                CellToken::SpanSpec,
                CellToken::Pipe,
                CellToken::Text,
                CellToken::Whitespace,
                CellToken::EscapedPipe,
                CellToken::Whitespace,
                CellToken::Text,
                CellToken::Newline,
            ]
        );
    }

    #[test]
    fn cells_and_blank_line_markers() {
        let cells = split_cells("|a |b\n\n|c\n|d");
        assert_eq!(texts(&cells), vec![Some("a"), Some("b"), None, Some("c"), Some("d")]);
    }

    #[test]
    fn escaped_pipe_stays_in_cell() {
        let cells = split_cells("|x \\| y|z");
        assert_eq!(texts(&cells), vec![Some("x | y"), Some("z")]);
    }

    #[test]
    fn specs_attach_to_the_following_cell() {
        let cells = split_cells("2+^|wide\n|one a|two");
        let specs: Vec<_> = cells.iter().flatten().map(|c| c.spec).collect();
        assert_eq!(texts(&cells), vec![Some("wide"), Some("one"), Some("two")]);
        assert_eq!(specs[0].colspan, 2);
        assert_eq!(specs[0].halign, Some(HAlign::Center));
        assert_eq!(specs[1], CellSpec::default());
        assert_eq!(specs[2].style, Some(CellStyle::AsciiDoc));
    }

    #[test]
    fn glued_text_is_not_a_spec() {
        let cells = split_cells("|a|2+|b");
        assert_eq!(texts(&cells), vec![Some("a"), Some("2+"), Some("b")]);
    }
}
