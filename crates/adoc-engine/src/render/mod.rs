//! # Rendering
//!
//! Backends consume the finished tree through a begin/end traversal.
//!
//! - **`html`**: Asciidoctor-flavoured HTML, standalone or embedded
//! - **`roff`**: man(7) page markup
//!
//! [`walk`] calls [`Visitor::begin`] before a node's children and
//! [`Visitor::end`] after them. A visitor that writes a node in full from
//! `begin` returns [`Walk::Skip`]; its children are not visited and `end`
//! is not called for it.

pub mod html;
pub mod roff;

use std::fmt;

use crate::models::{Document, NodeId};

pub use html::HtmlRenderer;
pub use roff::RoffRenderer;

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Formatting error: {0}")]
    Fmt(#[from] fmt::Error),
}

/// What [`walk`] does after [`Visitor::begin`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Walk {
    Children,
    Skip,
}

pub trait Visitor {
    fn begin(&mut self, doc: &Document, node: NodeId) -> Result<Walk, RenderError>;

    fn end(&mut self, _doc: &Document, _node: NodeId) -> Result<(), RenderError> {
        Ok(())
    }
}

/// Depth-first traversal of the sub-tree under `node`.
pub fn walk<V: Visitor + ?Sized>(
    doc: &Document,
    node: NodeId,
    visitor: &mut V,
) -> Result<(), RenderError> {
    if visitor.begin(doc, node)? == Walk::Skip {
        return Ok(());
    }
    for child in doc.tree.children(node) {
        walk(doc, child, visitor)?;
    }
    visitor.end(doc, node)
}

impl Document {
    /// Renders the document as HTML.
    pub fn to_html(&self) -> Result<String, RenderError> {
        HtmlRenderer::new().render(self)
    }

    /// Renders the document as a man page.
    pub fn to_roff(&self) -> Result<String, RenderError> {
        RoffRenderer::new().render(self)
    }
}
