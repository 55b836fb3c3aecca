//! # Block Parser
//!
//! Recursive descent over an owned line buffer. Each line is classified on
//! demand; include directives splice the included lines into the buffer in
//! place of the directive, so the cursor simply re-reads from the splice
//! point.
//!
//! - **`meta`**: block titles, ids and attribute lines applied to the next block
//! - **`header`**: document title, author and revision lines, attribute entries
//! - **`section`**: section nesting, ids and numbering, discrete headings
//! - **`paragraph`**: paragraphs, admonition paragraphs, literal paragraphs
//! - **`lists`**: ordered, unordered and description lists with continuations
//! - **`delimited`**: delimited blocks, block macros, rules and breaks
//! - **`include`**: include directive resolution and splicing
//!
//! ## Termination
//!
//! `parse_block(parent, ctx)` consumes lines until EOF, a line of the
//! terminator kind carried in `ctx`, or a section title that belongs to an
//! enclosing level. Section titles are pushed back and handled by the top
//! level loop, which keeps recursion depth equal to block nesting depth.

mod delimited;
mod header;
mod include;
mod lists;
pub mod meta;
mod paragraph;
mod section;

use std::collections::BTreeSet;

use crate::models::{Document, NodeId};

use super::{
    ParseError, ParseOptions,
    classify::{LineClass, LineKind, classify},
};

pub use meta::Meta;

/// An owned, classified line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Line {
    pub kind: LineKind,
    pub spaces: String,
    pub content: String,
}

impl Line {
    /// The line with its indentation restored, trailing space removed.
    pub fn raw(&self) -> String {
        format!("{}{}", self.spaces, self.content)
    }
}

impl From<LineClass<'_>> for Line {
    fn from(c: LineClass<'_>) -> Self {
        Self {
            kind: c.kind,
            spaces: c.spaces.to_string(),
            content: c.content.to_string(),
        }
    }
}

/// Where a `parse_block` call is running.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Ctx {
    /// Delimiter kind that closes the enclosing block.
    pub term: Option<LineKind>,
    /// Inside list item text: list items and `+` end paragraphs.
    pub in_list: bool,
}

/// What a dispatched line turned into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Flow {
    /// Metadata, comments, blank lines or attribute entries; no block yet.
    Meta,
    /// A block was appended.
    Block,
    /// The line belongs to an enclosing construct and was pushed back.
    Return,
}

pub(crate) struct Parser<'a> {
    pub(crate) doc: &'a mut Document,
    pub(crate) options: &'a ParseOptions,
    pub(crate) lines: Vec<String>,
    /// Index of the next unread line.
    pub(crate) x: usize,
    pub(crate) meta: Meta,
    /// Include splices performed so far.
    pub(crate) includes: usize,
    pub(crate) level_offset: i32,
    /// `(line index, offset)` pairs: once the cursor reaches the index the
    /// offset in force before an include with `leveloffset` comes back.
    /// Innermost include last.
    pub(crate) level_restores: Vec<(usize, i32)>,
    /// Enclosing delimited blocks and table cells.
    pub(crate) block_depth: usize,
    current_section: NodeId,
    /// Attributes set by the caller; entries in the document cannot change them.
    locked: BTreeSet<String>,
}

impl<'a> Parser<'a> {
    pub(crate) fn new(doc: &'a mut Document, options: &'a ParseOptions, input: &str) -> Self {
        let current_section = doc.root;
        Self {
            doc,
            options,
            lines: input.lines().map(str::to_string).collect(),
            x: 0,
            meta: Meta::default(),
            includes: 0,
            level_offset: 0,
            level_restores: Vec::new(),
            block_depth: 0,
            current_section,
            locked: options.attributes.keys().cloned().collect(),
        }
    }

    /// A parser over `input` sharing this parser's document, used for
    /// AsciiDoc table cells.
    pub(crate) fn nested<'b>(&'b mut self, input: &str) -> Parser<'b> {
        let current_section = self.current_section;
        Parser {
            doc: &mut *self.doc,
            options: self.options,
            lines: input.lines().map(str::to_string).collect(),
            x: 0,
            meta: Meta::default(),
            includes: self.includes,
            level_offset: self.level_offset,
            level_restores: Vec::new(),
            block_depth: self.block_depth + 1,
            current_section,
            locked: self.locked.clone(),
        }
    }

    /// Parses the whole buffer into the document.
    pub(crate) fn parse(&mut self) -> Result<(), ParseError> {
        self.parse_header()?;
        let preamble = self.doc.preamble;
        self.parse_block(preamble, Ctx::default())?;
        while let Some(line) = self.next_line() {
            match line.kind {
                LineKind::SectionTitle(level) => self.section(&line, level)?,
                _ => {
                    self.unread();
                    let section = self.current_section;
                    self.parse_block(section, Ctx::default())?;
                }
            }
        }
        Ok(())
    }

    /// Returns the next line, splicing include directives as they come.
    pub(crate) fn next_line(&mut self) -> Option<Line> {
        loop {
            while let Some(&(end, offset)) = self.level_restores.last()
                && end <= self.x
            {
                self.level_offset = offset;
                self.level_restores.pop();
            }
            let line = Line::from(classify(self.lines.get(self.x)?));
            self.x += 1;
            if line.kind == LineKind::Include && self.splice_include(&line.content) {
                continue;
            }
            return Some(line);
        }
    }

    /// Pushes the last line read back.
    pub(crate) fn unread(&mut self) {
        self.x = self.x.saturating_sub(1);
    }

    /// Kind of the line before the one last read.
    pub(crate) fn prev_kind(&self) -> Option<LineKind> {
        let i = self.x.checked_sub(2)?;
        self.lines.get(i).map(|l| classify(l).kind)
    }

    pub(crate) fn after_blank(&self) -> bool {
        self.prev_kind() == Some(LineKind::Empty)
    }

    /// Returns true if a closing line of `kind` exists ahead.
    pub(crate) fn has_terminator(&self, kind: LineKind) -> bool {
        self.lines[self.x.min(self.lines.len())..]
            .iter()
            .any(|l| classify(l).kind == kind)
    }

    /// Skips a `////` comment block up to its closing line or EOF.
    pub(crate) fn skip_comment_block(&mut self) {
        while let Some(l) = self.lines.get(self.x) {
            self.x += 1;
            if classify(l).kind == LineKind::BlockComment {
                break;
            }
        }
    }

    /// Consumes lines into `parent` until EOF, the terminator in `ctx`, or a
    /// section title for an enclosing level.
    pub(crate) fn parse_block(&mut self, parent: NodeId, ctx: Ctx) -> Result<(), ParseError> {
        while let Some(line) = self.next_line() {
            if ctx.term == Some(line.kind) {
                return Ok(());
            }
            if self.dispatch(parent, line, ctx)? == Flow::Return {
                return Ok(());
            }
        }
        Ok(())
    }

    /// Builds whatever `line` starts and appends it to `parent`.
    pub(crate) fn dispatch(
        &mut self,
        parent: NodeId,
        line: Line,
        ctx: Ctx,
    ) -> Result<Flow, ParseError> {
        use LineKind as K;
        match line.kind {
            K::Empty | K::Comment => Ok(Flow::Meta),
            K::BlockComment => {
                self.skip_comment_block();
                Ok(Flow::Meta)
            }
            K::AttributeEntry => {
                if self.attribute_entry(&line.content)? {
                    Ok(Flow::Meta)
                } else {
                    self.paragraph(parent, line, ctx)
                }
            }
            k if k.is_block_meta() => {
                if self.meta_line(k, &line.content) {
                    Ok(Flow::Meta)
                } else {
                    self.paragraph(parent, line, ctx)
                }
            }
            K::SectionTitle(level) => {
                if self.block_depth > 0 || self.meta.is_discrete() {
                    self.heading(parent, &line, level);
                    Ok(Flow::Block)
                } else {
                    self.unread();
                    Ok(Flow::Return)
                }
            }
            K::HorizontalRule | K::PageBreak | K::TocMacro => {
                self.leaf(parent, line.kind);
                Ok(Flow::Block)
            }
            k if k.is_delimiter() => {
                if self.has_terminator(k) {
                    self.delimited(parent, k)?;
                    Ok(Flow::Block)
                } else {
                    log::debug!("unterminated {k:?} block; reading it as text");
                    self.paragraph(parent, line, ctx)
                }
            }
            K::BlockImage | K::BlockVideo | K::BlockAudio => {
                if self.block_macro(parent, &line) {
                    Ok(Flow::Block)
                } else {
                    self.paragraph(parent, line, ctx)
                }
            }
            K::Admonition => self.admonition_paragraph(parent, line, ctx),
            K::LiteralParagraph => self.literal_paragraph(parent, line, ctx),
            k if k.is_list_item() => {
                self.list(parent, line, ctx)?;
                Ok(Flow::Block)
            }
            _ => self.paragraph(parent, line, ctx),
        }
    }
}
