//! Mutation log entries recorded by [`MemoryHost`](crate::MemoryHost).

use std::rc::Rc;

use ripple_core::{NodeId, PropValue};

/// One operation applied to the display tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    /// A detached element was created.
    CreateElement {
        /// The new node.
        node: NodeId,
        /// Element tag.
        tag: Rc<str>,
    },
    /// A detached text node was created.
    CreateText {
        /// The new node.
        node: NodeId,
        /// Initial content.
        text: String,
    },
    /// A detached node was attached.
    Insert {
        /// New parent.
        parent: NodeId,
        /// Attached node.
        node: NodeId,
        /// Sibling the node was placed before; `None` appends.
        anchor: Option<NodeId>,
    },
    /// An attached node changed position.
    Move {
        /// Parent after the move.
        parent: NodeId,
        /// Moved node.
        node: NodeId,
        /// Sibling the node was placed before; `None` appends.
        anchor: Option<NodeId>,
    },
    /// A node was detached.
    Remove {
        /// Former parent.
        parent: NodeId,
        /// Detached node.
        node: NodeId,
    },
    /// Text content changed.
    SetText {
        /// Text node.
        node: NodeId,
        /// New content.
        text: String,
    },
    /// A prop was set or removed.
    SetProp {
        /// Element.
        node: NodeId,
        /// Prop name.
        name: String,
        /// New value; `None` when removed.
        value: Option<PropValue>,
    },
}

/// Aggregate counters over a mutation log.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MutationStats {
    /// Elements and text nodes created.
    pub created: usize,
    /// Detached nodes attached.
    pub inserted: usize,
    /// Attached nodes moved.
    pub moved: usize,
    /// Nodes detached.
    pub removed: usize,
    /// Text content updates.
    pub text_updates: usize,
    /// Prop sets and removals.
    pub prop_updates: usize,
}

impl MutationStats {
    /// Counts one mutation.
    pub const fn record(&mut self, mutation: &Mutation) {
        match mutation {
            Mutation::CreateElement { .. } | Mutation::CreateText { .. } => self.created += 1,
            Mutation::Insert { .. } => self.inserted += 1,
            Mutation::Move { .. } => self.moved += 1,
            Mutation::Remove { .. } => self.removed += 1,
            Mutation::SetText { .. } => self.text_updates += 1,
            Mutation::SetProp { .. } => self.prop_updates += 1,
        }
    }

    /// Total number of recorded mutations.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.created
            + self.inserted
            + self.moved
            + self.removed
            + self.text_updates
            + self.prop_updates
    }
}

impl<'a> FromIterator<&'a Mutation> for MutationStats {
    fn from_iter<I: IntoIterator<Item = &'a Mutation>>(iter: I) -> Self {
        let mut stats = Self::default();
        for mutation in iter {
            stats.record(mutation);
        }
        stats
    }
}
