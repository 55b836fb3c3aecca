//! # Inline Parser
//!
//! Turns the raw text of a block into a chain of inline nodes.
//!
//! - **`cursor`**: byte cursor over a rewritable buffer with look-behind
//! - **`kinds`**: markers, macro names, replacements and open format kinds
//! - **`parser`**: the state machine
//!
//! ## Precedence
//!
//! At every position the parser tries, in order: escapes, passthroughs,
//! macros (`name:target[...]`), super/subscript, smart quotes, emphasis,
//! span closers, bracket constructs, cross references, attribute references
//! and typographic replacements. Anything else is copied verbatim.
//!
//! Constrained markers (`*x*`) open only when not glued to a word on the
//! left and a closer exists ahead; unterminated markers stay literal.

pub mod cursor;
pub mod kinds;
pub mod parser;

pub use parser::parse_inline;
