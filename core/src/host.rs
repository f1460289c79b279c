//! Display-tree contract implemented by rendering backends.

use crate::props::PropValue;

/// Identifier for a display node owned by a [`Host`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeId(usize);

impl NodeId {
    /// Creates a new [`NodeId`] from the raw index.
    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Returns the raw index backing this identifier.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// The live display tree the reconciler mutates.
///
/// The reconciler never reads display state back; every decision is made from
/// descriptors, so hosts only need to apply what they are told.
pub trait Host {
    /// Creates a detached element tagged `tag`.
    fn create_element(&mut self, tag: &str) -> NodeId;

    /// Creates a detached text node.
    fn create_text(&mut self, text: &str) -> NodeId;

    /// Replaces the content of a text node.
    fn set_text(&mut self, node: NodeId, text: &str);

    /// Inserts `child` under `parent` before `anchor`, or last when `anchor` is `None`.
    ///
    /// When `child` is already attached somewhere it is moved, not copied.
    fn insert_before(&mut self, parent: NodeId, child: NodeId, anchor: Option<NodeId>);

    /// Detaches `child` from `parent`.
    fn remove_child(&mut self, parent: NodeId, child: NodeId);

    /// Applies or removes the effect of a single prop.
    ///
    /// Called exactly once per changed prop; `old`/`new` are `None` when the prop is
    /// absent on that side.
    fn apply_prop(
        &mut self,
        node: NodeId,
        name: &str,
        old: Option<&PropValue>,
        new: Option<&PropValue>,
    );

    /// Returns `true` while `node` is a live node of this host.
    fn contains(&self, node: NodeId) -> bool;

    /// Signals that the reconciler dropped its last handle to `node`.
    fn release(&mut self, node: NodeId) {
        let _ = node;
    }
}
