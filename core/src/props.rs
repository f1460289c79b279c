//! Prop maps attached to descriptors.

use alloc::{collections::BTreeMap, rc::Rc, vec::Vec};
use core::fmt;

use crate::{
    host::NodeId,
    node::{Children, VNodeRef},
    node_ref::Ref,
};

/// Event delivered to [`Handler`]s by a host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    /// Event name without the `on` prefix, e.g. `click`.
    pub name: Rc<str>,
    /// Node the event was dispatched on.
    pub target: NodeId,
}

impl Event {
    /// Creates a new event.
    pub fn new(name: impl Into<Rc<str>>, target: NodeId) -> Self {
        Self {
            name: name.into(),
            target,
        }
    }
}

/// Event handler stored in an `on*` prop.
///
/// Handlers compare by identity, so re-rendering with the same handler does not
/// re-apply the prop.
#[derive(Clone)]
pub struct Handler(Rc<dyn Fn(&Event)>);

impl Handler {
    /// Wraps a closure into a handler.
    pub fn new(f: impl Fn(&Event) + 'static) -> Self {
        Self(Rc::new(f))
    }

    /// Invokes the handler.
    pub fn call(&self, event: &Event) {
        (self.0)(event);
    }
}

impl PartialEq for Handler {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Handler")
    }
}

/// A single prop value.
#[derive(Debug, Clone, Default)]
pub enum PropValue {
    /// Explicit absence; in clone overrides this removes the prop.
    #[default]
    Null,
    /// Boolean attribute.
    Bool(bool),
    /// Numeric attribute.
    Number(f64),
    /// String attribute.
    Str(Rc<str>),
    /// Event handler.
    Handler(Handler),
    /// Ref observer.
    Ref(Ref),
    /// Nested children, used by the `children` prop.
    Children(Children),
    /// Ordered list of values.
    List(Rc<[PropValue]>),
}

impl PropValue {
    /// Returns `true` for [`PropValue::Null`].
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Borrows the string payload.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the boolean payload.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the numeric payload.
    #[must_use]
    pub const fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Borrows the handler payload.
    #[must_use]
    pub const fn as_handler(&self) -> Option<&Handler> {
        match self {
            Self::Handler(h) => Some(h),
            _ => None,
        }
    }

    /// Borrows the children payload.
    #[must_use]
    pub const fn as_children(&self) -> Option<&Children> {
        match self {
            Self::Children(c) => Some(c),
            _ => None,
        }
    }
}

impl PartialEq for PropValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Number(a), Self::Number(b)) => a.to_bits() == b.to_bits() || a == b,
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::Handler(a), Self::Handler(b)) => a == b,
            (Self::Ref(a), Self::Ref(b)) => a == b,
            (Self::Children(a), Self::Children(b)) => a == b,
            (Self::List(a), Self::List(b)) => a == b,
            _ => false,
        }
    }
}

impl From<()> for PropValue {
    fn from((): ()) -> Self {
        Self::Null
    }
}

impl From<bool> for PropValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for PropValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

macro_rules! impl_number_from {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for PropValue {
                fn from(value: $ty) -> Self {
                    Self::Number(f64::from(value))
                }
            }
        )*
    };
}

impl_number_from!(i8, i16, i32, u8, u16, u32, f32);

impl From<&str> for PropValue {
    fn from(value: &str) -> Self {
        Self::Str(value.into())
    }
}

impl From<String> for PropValue {
    fn from(value: String) -> Self {
        Self::Str(value.into())
    }
}

impl From<Rc<str>> for PropValue {
    fn from(value: Rc<str>) -> Self {
        Self::Str(value)
    }
}

impl From<Handler> for PropValue {
    fn from(value: Handler) -> Self {
        Self::Handler(value)
    }
}

impl From<Ref> for PropValue {
    fn from(value: Ref) -> Self {
        Self::Ref(value)
    }
}

impl From<Children> for PropValue {
    fn from(value: Children) -> Self {
        Self::Children(value)
    }
}

impl From<VNodeRef> for PropValue {
    fn from(value: VNodeRef) -> Self {
        Self::Children(Children::Single(value))
    }
}

impl From<Vec<PropValue>> for PropValue {
    fn from(value: Vec<PropValue>) -> Self {
        Self::List(value.into())
    }
}

/// One entry of the difference between two prop maps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PropChange<'a> {
    /// Prop name.
    pub name: &'a str,
    /// Value before the change, `None` when the prop was absent.
    pub old: Option<&'a PropValue>,
    /// Value after the change, `None` when the prop is removed.
    pub new: Option<&'a PropValue>,
}

/// Ordered map from prop name to value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Props(BTreeMap<Rc<str>, PropValue>);

impl Props {
    /// Creates an empty prop map.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, name: impl Into<Rc<str>>, value: impl Into<PropValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Inserts or replaces a prop, returning the previous value.
    pub fn insert(
        &mut self,
        name: impl Into<Rc<str>>,
        value: impl Into<PropValue>,
    ) -> Option<PropValue> {
        self.0.insert(name.into(), value.into())
    }

    /// Looks up a prop.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&PropValue> {
        self.0.get(name)
    }

    /// Returns `true` when the prop is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Removes a prop, returning its value.
    pub fn remove(&mut self, name: &str) -> Option<PropValue> {
        self.0.remove(name)
    }

    /// Number of props.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` when no prop is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates props in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropValue)> {
        self.0.iter().map(|(name, value)| (&**name, value))
    }

    /// Computes the changes needed to go from `self` to `next`.
    ///
    /// Names present only in `self` are reported as removals, names present only in
    /// `next` as additions, and shared names only when their values differ.
    #[must_use]
    pub fn changes<'a>(&'a self, next: &'a Self) -> Vec<PropChange<'a>> {
        let mut changes = Vec::new();
        for (name, old) in &self.0 {
            match next.0.get(name) {
                Some(new) if new == old => {}
                new => changes.push(PropChange {
                    name,
                    old: Some(old),
                    new,
                }),
            }
        }
        for (name, new) in &next.0 {
            if !self.0.contains_key(name) {
                changes.push(PropChange {
                    name,
                    old: None,
                    new: Some(new),
                });
            }
        }
        changes
    }
}

impl<K: Into<Rc<str>>, V: Into<PropValue>> FromIterator<(K, V)> for Props {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}
