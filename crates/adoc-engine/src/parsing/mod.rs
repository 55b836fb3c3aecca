//! # Parsing Pipeline
//!
//! Source text goes through four stages, all writing into one [`Document`]:
//!
//! - **`classify`**: one line at a time, decides what the line is
//! - **`blocks`**: recursive descent over the classified lines, builds the
//!   block tree, handles the header, attribute entries and includes
//! - **`inline`**: turns the raw text of each text-bearing block into
//!   formatted inline nodes
//! - **`table`**: cell tokenizer and row assembly for `|===` blocks
//!
//! `attrs` holds the attribute list and shorthand parsers shared by block
//! metadata, macros and tables; `kinds` the delimiter constants;
//! `snapshot` the outline dumper and invariant checks used in tests.

pub mod attrs;
pub mod blocks;
pub mod classify;
pub mod inline;
pub mod kinds;
pub mod snapshot;
pub mod table;

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::io::{FsIncludeResolver, IncludeResolver};
use crate::models::Document;

use blocks::Parser;

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Invalid leveloffset value {value:?} at line {line}")]
    InvalidLevelOffset { value: String, line: usize },
}

/// Caller-side settings for one parse.
pub struct ParseOptions {
    /// Directory include targets are resolved against.
    pub base_dir: PathBuf,
    /// Attributes set by the caller. They override, and cannot be changed by,
    /// attribute entries in the document.
    pub attributes: BTreeMap<String, String>,
    pub resolver: Box<dyn IncludeResolver>,
    /// Include splices allowed per document, including nested ones.
    pub max_includes: usize,
    /// Decimals kept in table column widths.
    pub column_width_precision: usize,
    /// Render without the standalone page frame.
    pub embedded: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("."),
            attributes: BTreeMap::new(),
            resolver: Box::new(FsIncludeResolver),
            max_includes: 64,
            column_width_precision: 4,
            embedded: false,
        }
    }
}

/// Parses `input` into a new document.
pub fn parse_document(input: &str, options: &ParseOptions) -> Result<Document, ParseError> {
    let mut doc = Document::new();
    doc.embedded = options.embedded;
    for (k, v) in &options.attributes {
        doc.attributes.insert(k.clone(), v.clone());
    }
    let input = input.replace("\r\n", "\n");
    Parser::new(&mut doc, options, &input).parse()?;
    Ok(doc)
}

impl Document {
    /// Parses `input` with default options.
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        parse_document(input, &ParseOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NodeKind;
    use pretty_assertions::assert_eq;

    #[test]
    fn crlf_input_parses_like_lf() {
        let lf = Document::parse("= T\n\n* a\n* b").unwrap();
        let crlf = Document::parse("= T\r\n\r\n* a\r\n* b").unwrap();
        assert_eq!(
            snapshot::dump(&lf, lf.root),
            snapshot::dump(&crlf, crlf.root)
        );
    }

    #[test]
    fn caller_attributes_are_visible_to_the_body() {
        let mut options = ParseOptions::default();
        options.attributes.insert("product".into(), "Widget".into());
        let doc = parse_document("Buy {product}.", &options).unwrap();
        let p = doc.tree.children(doc.preamble).next().unwrap();
        assert_eq!(doc.tree[p].kind, NodeKind::Paragraph);
        assert_eq!(doc.plain_text(p), "Buy Widget.");
    }

    #[test]
    fn embedded_flag_reaches_the_document() {
        let options = ParseOptions {
            embedded: true,
            ..ParseOptions::default()
        };
        assert!(parse_document("x", &options).unwrap().embedded);
    }
}
