//! Refs: callbacks or holders that observe realized nodes and instances.

use alloc::rc::Rc;
use core::{cell::Cell, fmt};

use crate::{component::InstanceId, host::NodeId};

/// What a [`Ref`] observes once its descriptor is mounted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RefTarget {
    /// The display node of an element.
    Node(NodeId),
    /// The instance behind a component descriptor.
    Instance(InstanceId),
}

impl RefTarget {
    /// Returns the display node, if this target is one.
    #[must_use]
    pub const fn node(self) -> Option<NodeId> {
        match self {
            Self::Node(node) => Some(node),
            Self::Instance(_) => None,
        }
    }

    /// Returns the instance id, if this target is one.
    #[must_use]
    pub const fn instance(self) -> Option<InstanceId> {
        match self {
            Self::Instance(id) => Some(id),
            Self::Node(_) => None,
        }
    }
}

/// Observer invoked with the realized target on mount and with `None` on unmount.
#[derive(Clone)]
pub enum Ref {
    /// A callback receiving every transition.
    Callback(Rc<dyn Fn(Option<RefTarget>)>),
    /// A slot that keeps the latest target.
    Holder(Rc<Cell<Option<RefTarget>>>),
}

impl Ref {
    /// Creates a callback ref.
    pub fn callback(f: impl Fn(Option<RefTarget>) + 'static) -> Self {
        Self::Callback(Rc::new(f))
    }

    /// Creates an empty holder ref.
    #[must_use]
    pub fn holder() -> Self {
        Self::Holder(Rc::new(Cell::new(None)))
    }

    /// Delivers a new target.
    pub fn set(&self, target: Option<RefTarget>) {
        match self {
            Self::Callback(f) => f(target),
            Self::Holder(slot) => slot.set(target),
        }
    }

    /// Returns the current target of a holder ref; callbacks have no memory.
    #[must_use]
    pub fn current(&self) -> Option<RefTarget> {
        match self {
            Self::Holder(slot) => slot.get(),
            Self::Callback(_) => None,
        }
    }

    /// Returns `true` when both refs point to the same callback or slot.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Callback(a), Self::Callback(b)) => Rc::ptr_eq(a, b),
            (Self::Holder(a), Self::Holder(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl PartialEq for Ref {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for Ref {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Callback(_) => f.write_str("Ref::Callback"),
            Self::Holder(slot) => f.debug_tuple("Ref::Holder").field(&slot.get()).finish(),
        }
    }
}
