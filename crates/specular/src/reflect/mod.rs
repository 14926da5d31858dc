//! Reflection groups and their recursive expansion.
//!
//! Purpose
//! - A reflection group is a family of rays leaving one (possibly virtual)
//!   source through one gate. The root group is the true source with a
//!   degenerate gate; every other group is the mirror image of its parent's
//!   source across the mirror it bounced off.
//! - Expanding a group sweeps around its source, yields one child per visible
//!   mirror span and the path to the target when the target is visible.
//!
//! Policy
//! - Groups live in a [`GroupTree`] arena and point to their parent by
//!   [`GroupId`]. Paths are rebuilt by walking parent links.
//! - Precondition violations (mis-oriented gate, a path reported twice, an
//!   event the sweep never registered) surface as [`crate::error::ReflectError`]
//!   and abort only the group being expanded.
//! - Spans shorter than the rounding noise of their endpoints are dropped.

mod collect;
mod filter;
mod tree;
mod types;

pub use tree::GroupTree;
pub use types::{Expansion, FoundPath, Gate, GroupId, GroupKind, ReflectionGroup};

#[cfg(test)]
mod tests;
