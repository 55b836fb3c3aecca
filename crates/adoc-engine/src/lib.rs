//! # adoc-engine
//!
//! Parses AsciiDoc text into an arena-backed document tree and renders it
//! as HTML or man page markup.
//!
//! ```
//! use adoc_engine::Document;
//!
//! let doc = Document::parse("= Title\n\nHello *world*.").unwrap();
//! assert_eq!(doc.title().as_deref(), Some("Title"));
//! assert!(doc.to_html().unwrap().contains("<strong>world</strong>"));
//! ```

pub mod io;
pub mod models;
pub mod parsing;
pub mod render;

// Re-export key types for easier usage
pub use io::{FsIncludeResolver, IncludeResolver, IoError};
pub use models::{Document, Node, NodeId, NodeKind};
pub use parsing::{ParseError, ParseOptions, parse_document};
pub use render::{HtmlRenderer, RenderError, RoffRenderer, Visitor, Walk, walk};
