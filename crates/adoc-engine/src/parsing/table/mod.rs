//! # Table Sub-parser
//!
//! Turns the body of a `|===` block into rows of cells.
//!
//! - **`format`**: the `cols` grammar, cell specs and width normalisation
//! - **`lexer`**: the logos cell tokenizer
//!
//! Rows are assembled from the flat cell list: each row holds as many
//! columns as the table has, counting column spans, duplicated cells and
//! cells spanning down from earlier rows. The first row is a header when
//! the `header` option is set or when the first line is followed by a
//! blank line; `footer` takes the last row.

pub mod format;
pub mod lexer;

use std::collections::VecDeque;

use crate::models::{Cell, CellStyle, ColumnFormat, NodeId, NodeKind, Row, Table};

use super::{
    ParseError,
    blocks::{Ctx, Parser},
    classify::LineKind,
    inline::parse_inline,
};

use format::{column_widths, parse_cols};
use lexer::{RawCell, split_cells};

impl Parser<'_> {
    /// Parses the table body after the opening `|===` line into `node`.
    pub(crate) fn table(&mut self, node: NodeId) -> Result<(), ParseError> {
        let body = self.verbatim(LineKind::Table);
        let n = &self.doc.tree[node];
        let cols = n.attr("cols").map(str::to_string);
        let header_option = n.has_option("header");
        let noheader = n.has_option("noheader");
        let footer_option = n.has_option("footer");

        let cells: Vec<RawCell> = split_cells(&body).into_iter().flatten().collect();
        let first_line = body.lines().position(|l| !l.trim().is_empty());
        let first_width = first_line
            .and_then(|i| body.lines().nth(i))
            .map(|l| {
                split_cells(l)
                    .into_iter()
                    .flatten()
                    .map(|c| c.spec.width())
                    .sum::<usize>()
            })
            .unwrap_or(0);
        let formats = match cols {
            Some(c) => parse_cols(&c),
            None => vec![ColumnFormat::default(); first_width.max(1)],
        };
        let ncols = formats.len();
        let implicit_header = first_width == ncols
            && first_line.is_some_and(|i| {
                body.lines()
                    .nth(i + 1)
                    .is_some_and(|l| l.trim().is_empty())
            });

        let mut rows = self.assemble_rows(node, cells, &formats)?;
        let header = if (header_option || implicit_header) && !noheader && !rows.is_empty() {
            Some(rows.remove(0))
        } else {
            None
        };
        let footer = if footer_option && !rows.is_empty() {
            rows.pop()
        } else {
            None
        };
        let widths = column_widths(&formats, self.options.column_width_precision);
        self.doc.tree[node].table = Some(Table {
            formats,
            header,
            rows,
            footer,
            widths,
        });
        Ok(())
    }

    fn assemble_rows(
        &mut self,
        table: NodeId,
        cells: Vec<RawCell>,
        formats: &[ColumnFormat],
    ) -> Result<Vec<Row>, ParseError> {
        let ncols = formats.len();
        // Repeats and row spans are bounded by the size of the body.
        let dup_limit = cells.len().max(1) * ncols.max(1);
        let row_limit = cells.len().max(1);
        let mut rows = vec![];
        let mut row = Row::default();
        let mut used = 0;
        // Columns taken in upcoming rows by cells spanning down.
        let mut spill: VecDeque<usize> = VecDeque::new();

        for raw in cells {
            let dup = raw.spec.dup.min(dup_limit);
            let rowspan = raw.spec.rowspan.clamp(1, row_limit);
            for _ in 0..dup {
                let base = formats.get(used).copied().unwrap_or_default();
                let format = raw.spec.apply(base);
                let node = self.table_cell(table, &raw.text, format.style)?;
                let colspan = raw.spec.colspan.min(ncols);
                row.cells.push(Cell {
                    node,
                    colspan,
                    rowspan,
                    format,
                });
                for k in 0..rowspan - 1 {
                    if spill.len() <= k {
                        spill.push_back(0);
                    }
                    spill[k] += colspan;
                }
                used += colspan;
                while used >= ncols {
                    rows.push(std::mem::take(&mut row));
                    used = spill.pop_front().unwrap_or(0);
                }
            }
        }
        if !row.cells.is_empty() {
            rows.push(row);
        }
        Ok(rows)
    }

    /// Creates the content node of one cell under the table node.
    fn table_cell(
        &mut self,
        table: NodeId,
        text: &str,
        style: CellStyle,
    ) -> Result<NodeId, ParseError> {
        let kind = match style {
            CellStyle::AsciiDoc => NodeKind::BlockOpen,
            CellStyle::Literal => NodeKind::LiteralParagraph,
            _ => NodeKind::Paragraph,
        };
        let cell = self.doc.tree.new_node(kind);
        self.doc.tree.append_child(table, cell);
        match style {
            CellStyle::AsciiDoc => {
                let includes = {
                    let mut sub = self.nested(text);
                    sub.parse_block(cell, Ctx::default())?;
                    sub.includes
                };
                self.includes = includes;
            }
            CellStyle::Literal => self.doc.tree[cell].raw = text.to_string(),
            _ => {
                self.doc.tree[cell].raw = text.to_string();
                parse_inline(self.doc, cell);
            }
        }
        Ok(cell)
    }
}

#[cfg(test)]
mod tests {
    use crate::models::{Document, HAlign, NodeKind};
    use crate::parsing::{ParseOptions, parse_document, snapshot::dump};
    use pretty_assertions::assert_eq;

    fn parse(input: &str) -> Document {
        parse_document(input, &ParseOptions::default()).unwrap()
    }

    fn table(doc: &Document) -> &crate::models::Table {
        let node = doc.tree.children(doc.preamble).next().unwrap();
        doc.tree[node].table.as_ref().unwrap()
    }

    #[test]
    fn implicit_header_from_blank_line() {
        let doc = parse("|===\n|Name |Role\n\n|Ada |Engineer\n|Bob |Pilot\n|===");
        let t = table(&doc);
        assert_eq!(t.ncols(), 2);
        assert!(t.header.is_some());
        assert_eq!(t.rows.len(), 2);
        assert_eq!(t.widths, vec!["50", "50"]);
        let first = t.header.as_ref().unwrap().cells[0].node;
        assert_eq!(doc.plain_text(first), "Name");
    }

    #[test]
    fn cols_attribute_and_footer() {
        let doc = parse("[cols=\"1,>3\", options=\"footer\"]\n|===\n|a |b\n|c |d\n|total |4\n|===");
        let t = table(&doc);
        assert!(t.header.is_none());
        assert_eq!(t.rows.len(), 2);
        assert!(t.footer.is_some());
        assert_eq!(t.formats[1].halign, HAlign::Right);
        assert_eq!(t.widths, vec!["25", "75"]);
    }

    #[test]
    fn spans_fill_rows() {
        let doc = parse("[cols=3]\n|===\n.2+|tall 2+|wide\n|x |y\n|===");
        let t = table(&doc);
        let shape: Vec<usize> = t.rows.iter().map(|r| r.cells.len()).collect();
        assert_eq!(shape, vec![2, 2]);
        assert_eq!(t.rows[0].cells[0].rowspan, 2);
        assert_eq!(t.rows[0].cells[1].colspan, 2);
    }

    #[test]
    fn duplicated_cells() {
        let doc = parse("[%header,cols=3]\n|===\n3*|same\n|a |b |c\n|===");
        let t = table(&doc);
        assert_eq!(t.header.as_ref().unwrap().cells.len(), 3);
        assert_eq!(t.rows.len(), 1);
    }

    #[test]
    fn oversized_repeat_and_row_span_are_bounded() {
        let doc = parse("[cols=2]\n|===\n99999999*|x\n|===");
        let t = table(&doc);
        assert_eq!(t.rows.len(), 1);
        assert_eq!(t.rows[0].cells.len(), 2);

        let doc = parse("[cols=2]\n|===\n.99999999+|x |y\n|===");
        let t = table(&doc);
        assert_eq!(t.rows.len(), 1);
        assert_eq!(t.rows[0].cells[0].rowspan, 2);
    }

    #[test]
    fn asciidoc_cells_hold_blocks() {
        let doc = parse("[cols=\"1a\"]\n|===\n|\n* one\n* two\n|===");
        insta::assert_snapshot!(dump(&doc, doc.preamble), @r#"
        Preamble
          Table cols="1a" cols=1 rows=1
            BlockOpen
              ListUnordered level=1
                ListUnorderedItem level=1
                  Paragraph
                    Text "one"
                ListUnorderedItem level=1
                  Paragraph
                    Text "two"
        "#);
    }

    #[test]
    fn cells_are_children_of_the_table() {
        let doc = parse("|===\n|*b* |`m`\n|===");
        let node = doc.tree.children(doc.preamble).next().unwrap();
        let kinds: Vec<NodeKind> = doc.tree.children(node).map(|c| doc.tree[c].kind).collect();
        assert_eq!(kinds, vec![NodeKind::Paragraph, NodeKind::Paragraph]);
    }
}
