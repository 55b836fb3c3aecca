//! # Document Model
//!
//! The arena-backed document tree and the registries that travel with it.
//!
//! - **`node`**: `Node`, `NodeKind`, `NodeId` and the style facets
//!   (`Emphasis`, `AdmonitionKind`, `BlockStyle`)
//! - **`tree`**: `Tree` arena with first-child/next-sibling links
//! - **`document`**: `Document` owning the tree, attributes, anchors and footnotes
//! - **`counters`**: `SectionCounters` for section numbering
//! - **`table`**: table rows, cells and column formats

pub mod counters;
pub mod document;
pub mod node;
pub mod table;
pub mod tree;

pub use counters::SectionCounters;
pub use document::{Anchor, Author, Document, Footnote, Header, Revision};
pub use node::{AdmonitionKind, BlockStyle, Emphasis, Node, NodeId, NodeKind};
pub use table::{Cell, CellStyle, ColumnFormat, HAlign, Row, Table, VAlign};
pub use tree::Tree;
