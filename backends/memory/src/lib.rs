//! Ripple memory host – a headless display tree.
//!
//! [`MemoryHost`] implements [`ripple_core::Host`] over a node arena. Every mutation the
//! reconciler performs is appended to a [`Mutation`] log and tallied in
//! [`MutationStats`], and any subtree can be serialized to HTML. Tests use it to assert
//! on output, node identity and mutation counts; embedders use it to render without a
//! real UI toolkit.

#![deny(missing_debug_implementations)]

pub mod html;
pub mod mutation;
pub mod tree;

pub use mutation::{Mutation, MutationStats};
pub use tree::{MemoryHost, NodeData};
