//! # Snapshot Testing Support
//!
//! Utilities for testing the parser via snapshot assertions and invariant checks.
//!
//! ## Modules
//!
//! - **`dump`**: renders a sub-tree as an indented, stable text outline for
//!   `insta` snapshots
//! - **`invariants`**: runtime checks of the tree links (parent/child and
//!   sibling back references agree, raw text is consumed into children)

pub mod dump;
pub mod invariants;

pub use dump::dump;
pub use invariants::check as invariants;
