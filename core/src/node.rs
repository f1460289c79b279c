//! Virtual node descriptors.
//!
//! A [`VNode`] is an immutable template shared as [`VNodeRef`]. Builders always produce
//! well-formed descriptors; [`VNode::from_raw`] validates flag-based input instead.

use alloc::{rc::Rc, slice, string::String, vec::Vec};
use core::fmt::Write as _;

use crate::{
    component::ComponentType,
    error::{Error, Result},
    host::NodeId,
    key::Key,
    node_ref::Ref,
    props::{PropValue, Props},
};

/// Shared handle to an immutable descriptor.
pub type VNodeRef = Rc<VNode>;

/// What a descriptor realizes as.
#[derive(Debug, Clone)]
pub enum Kind {
    /// Host element with the given tag.
    Element(Rc<str>),
    /// Text node; the content lives in [`Children::Text`].
    Text,
    /// Stateful or functional component.
    Component(ComponentType),
    /// Transparent group of children.
    Fragment,
    /// Children rendered into a foreign container.
    Portal(NodeId),
    /// Renders nothing.
    Empty,
    /// Raw flags without a recognised kind; rejected at mount.
    Unknown(u32),
}

impl Kind {
    /// Returns `true` when a descriptor of kind `other` can patch one of `self`.
    ///
    /// Portals match portals regardless of their container.
    #[must_use]
    pub fn same_type(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Element(a), Self::Element(b)) => a == b,
            (Self::Component(a), Self::Component(b)) => a == b,
            (Self::Text, Self::Text)
            | (Self::Fragment, Self::Fragment)
            | (Self::Portal(_), Self::Portal(_))
            | (Self::Empty, Self::Empty) => true,
            _ => false,
        }
    }

    /// Short label for logs.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Element(tag) => tag,
            Self::Text => "#text",
            Self::Component(ty) => ty.name(),
            Self::Fragment => "#fragment",
            Self::Portal(_) => "#portal",
            Self::Empty => "#empty",
            Self::Unknown(_) => "#unknown",
        }
    }
}

/// Child structure of a descriptor.
#[derive(Debug, Clone, Default)]
pub enum Children {
    /// No children.
    #[default]
    None,
    /// Exactly one child descriptor.
    Single(VNodeRef),
    /// Ordered children, each carrying a unique key.
    Keyed(Vec<VNodeRef>),
    /// Ordered children matched by position.
    Unkeyed(Vec<VNodeRef>),
    /// Literal text content.
    Text(Rc<str>),
}

impl Children {
    /// Classifies a list: keyed when it is non-empty and every entry has a key.
    #[must_use]
    pub fn from_list(list: Vec<VNodeRef>) -> Self {
        if !list.is_empty() && list.iter().all(|child| child.key.is_some()) {
            Self::Keyed(list)
        } else {
            Self::Unkeyed(list)
        }
    }

    /// Descriptor children as a slice; empty for [`Children::None`] and [`Children::Text`].
    #[must_use]
    pub fn as_slice(&self) -> &[VNodeRef] {
        match self {
            Self::Single(child) => slice::from_ref(child),
            Self::Keyed(list) | Self::Unkeyed(list) => list,
            Self::None | Self::Text(_) => &[],
        }
    }

    /// Returns `true` when nothing would render.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::None => true,
            Self::Text(_) => false,
            _ => self.as_slice().is_empty(),
        }
    }

    /// Literal text, if this is [`Children::Text`].
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Converts a `children` prop value into a child structure.
    #[must_use]
    pub fn from_prop(value: &PropValue) -> Self {
        match value {
            PropValue::Children(children) => children.clone(),
            PropValue::Str(text) => Self::Text(text.clone()),
            PropValue::Number(n) => Self::Text(format_number(*n).into()),
            _ => Self::None,
        }
    }

    /// Same structure, with text content turned into a text descriptor.
    pub(crate) fn without_text(self) -> Self {
        match self {
            Self::Text(content) => Self::Single(text(content)),
            other => other,
        }
    }
}

impl PartialEq for Children {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::None, Self::None) => true,
            (Self::Single(a), Self::Single(b)) => Rc::ptr_eq(a, b),
            (Self::Keyed(a), Self::Keyed(b)) | (Self::Unkeyed(a), Self::Unkeyed(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(a, b)| Rc::ptr_eq(a, b))
            }
            (Self::Text(a), Self::Text(b)) => a == b,
            _ => false,
        }
    }
}

/// An immutable node descriptor.
#[derive(Debug, Clone)]
pub struct VNode {
    pub(crate) kind: Kind,
    pub(crate) key: Option<Key>,
    pub(crate) props: Props,
    pub(crate) children: Children,
    pub(crate) node_ref: Option<Ref>,
    pub(crate) recreate: bool,
}

impl VNode {
    /// What this descriptor realizes as.
    #[must_use]
    pub const fn kind(&self) -> &Kind {
        &self.kind
    }

    /// Element tag, if this is an element.
    #[must_use]
    pub fn tag(&self) -> Option<&str> {
        match &self.kind {
            Kind::Element(tag) => Some(tag),
            _ => None,
        }
    }

    /// Sibling identity key.
    #[must_use]
    pub const fn key(&self) -> Option<&Key> {
        self.key.as_ref()
    }

    /// Props, excluding the lifted `key` and `ref`.
    #[must_use]
    pub const fn props(&self) -> &Props {
        &self.props
    }

    /// Child structure. Component children live in `props.children` instead.
    #[must_use]
    pub const fn children(&self) -> &Children {
        &self.children
    }

    /// Ref observer.
    #[must_use]
    pub const fn node_ref(&self) -> Option<&Ref> {
        self.node_ref.as_ref()
    }

    /// Forces unmount and remount even when kind and name are unchanged.
    #[must_use]
    pub const fn recreate(&self) -> bool {
        self.recreate
    }

    /// Text content of a text descriptor.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match self.kind {
            Kind::Text => self.children.text(),
            _ => None,
        }
    }

    /// Raw flags describing this descriptor.
    #[must_use]
    pub fn flags(&self) -> VNodeFlags {
        let kind = match self.kind {
            Kind::Element(_) => VNodeFlags::ELEMENT,
            Kind::Text => VNodeFlags::TEXT,
            Kind::Component(_) => VNodeFlags::COMPONENT,
            Kind::Fragment => VNodeFlags::FRAGMENT,
            Kind::Portal(_) => VNodeFlags::PORTAL,
            Kind::Empty => VNodeFlags::EMPTY,
            Kind::Unknown(bits) => VNodeFlags::from_bits_retain(bits),
        };
        if self.recreate {
            kind | VNodeFlags::RECREATE
        } else {
            kind
        }
    }

    /// Builds a descriptor from flag-based raw input.
    ///
    /// # Errors
    ///
    /// [`Error::MalformedDescriptor`] when more than one kind bit is set, the name does
    /// not fit the kind, or the child structure does not fit the kind.
    pub fn from_raw(raw: RawVNode) -> Result<VNodeRef> {
        let RawVNode {
            flags,
            name,
            key,
            mut props,
            children,
            node_ref,
        } = raw;

        let kinds = flags & VNodeFlags::KINDS;
        let unknown = flags.bits() & !VNodeFlags::all().bits();
        if kinds.bits().count_ones() > 1 {
            return Err(malformed(format_args!("conflicting kind flags {:#x}", flags.bits())));
        }

        let (lifted_key, lifted_ref) = lift_reserved(&mut props);
        let key = key.or(lifted_key);
        let node_ref = node_ref.or(lifted_ref);
        let recreate = flags.contains(VNodeFlags::RECREATE);

        if kinds.is_empty() || unknown != 0 {
            return Ok(Rc::new(Self {
                kind: Kind::Unknown(flags.bits()),
                key,
                props,
                children,
                node_ref,
                recreate,
            }));
        }

        let kind = if kinds == VNodeFlags::ELEMENT {
            match name {
                RawName::Tag(tag) if !tag.is_empty() => Kind::Element(tag),
                RawName::Tag(_) => return Err(malformed(format_args!("element with empty tag"))),
                other => return Err(malformed(format_args!("element named by {other:?}"))),
            }
        } else if kinds == VNodeFlags::COMPONENT {
            match name {
                RawName::Component(ty) => Kind::Component(ty),
                other => return Err(malformed(format_args!("component named by {other:?}"))),
            }
        } else if kinds == VNodeFlags::PORTAL {
            match name {
                RawName::Container(container) => Kind::Portal(container),
                other => return Err(malformed(format_args!("portal targeting {other:?}"))),
            }
        } else {
            if !matches!(name, RawName::None) {
                return Err(malformed(format_args!("unexpected name {name:?}")));
            }
            if kinds == VNodeFlags::TEXT {
                Kind::Text
            } else if kinds == VNodeFlags::FRAGMENT {
                Kind::Fragment
            } else {
                Kind::Empty
            }
        };

        match (&kind, &children) {
            (Kind::Text, Children::Text(_))
            | (Kind::Element(_), _)
            | (Kind::Component(_) | Kind::Empty, Children::None) => {}
            (Kind::Fragment | Kind::Portal(_), children) if children.text().is_none() => {}
            (kind, children) => {
                return Err(malformed(format_args!(
                    "{} cannot hold {}",
                    kind.label(),
                    describe(children)
                )));
            }
        }

        Ok(Rc::new(Self {
            kind,
            key,
            props,
            children,
            node_ref,
            recreate,
        }))
    }
}

fn malformed(message: core::fmt::Arguments<'_>) -> Error {
    Error::MalformedDescriptor(message.to_string())
}

const fn describe(children: &Children) -> &'static str {
    match children {
        Children::None => "no children",
        Children::Single(_) => "a child",
        Children::Keyed(_) => "keyed children",
        Children::Unkeyed(_) => "children",
        Children::Text(_) => "text content",
    }
}

/// Formats a number the way it would print as an attribute: integers without a fraction.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn format_number(n: f64) -> String {
    let mut out = String::new();
    if n.fract() == 0.0 && n.abs() < 1e15 {
        let _ = write!(out, "{}", n as i64);
    } else {
        let _ = write!(out, "{n}");
    }
    out
}

/// Moves `key` and `ref` entries out of `props`.
pub(crate) fn lift_reserved(props: &mut Props) -> (Option<Key>, Option<Ref>) {
    let key = props.remove("key").and_then(|value| key_from_prop(&value));
    let node_ref = match props.remove("ref") {
        Some(PropValue::Ref(node_ref)) => Some(node_ref),
        _ => None,
    };
    (key, node_ref)
}

pub(crate) fn key_from_prop(value: &PropValue) -> Option<Key> {
    match value {
        PropValue::Str(s) => Some(Key::from(s.clone())),
        PropValue::Number(n) => Some(Key::from(format_number(*n))),
        _ => None,
    }
}

bitflags::bitflags! {
    /// Flag taxonomy accepted by [`VNode::from_raw`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct VNodeFlags: u32 {
        /// Host element.
        const ELEMENT = 1;
        /// Text node.
        const TEXT = 1 << 1;
        /// Component.
        const COMPONENT = 1 << 2;
        /// Fragment.
        const FRAGMENT = 1 << 3;
        /// Portal.
        const PORTAL = 1 << 4;
        /// Empty placeholder.
        const EMPTY = 1 << 5;
        /// Force remount on patch.
        const RECREATE = 1 << 6;
        /// Every kind bit.
        const KINDS = Self::ELEMENT.bits()
            | Self::TEXT.bits()
            | Self::COMPONENT.bits()
            | Self::FRAGMENT.bits()
            | Self::PORTAL.bits()
            | Self::EMPTY.bits();
    }
}

/// Name slot of a [`RawVNode`].
#[derive(Debug, Clone, Default)]
pub enum RawName {
    /// No name.
    #[default]
    None,
    /// Element tag.
    Tag(Rc<str>),
    /// Component reference.
    Component(ComponentType),
    /// Portal container.
    Container(NodeId),
}

/// Unvalidated descriptor input.
#[derive(Debug, Clone, Default)]
pub struct RawVNode {
    /// Kind and behaviour bits.
    pub flags: VNodeFlags,
    /// Tag, component or container.
    pub name: RawName,
    /// Sibling key; a `key` prop is used when this is `None`.
    pub key: Option<Key>,
    /// Props, possibly including `key` and `ref`.
    pub props: Props,
    /// Child structure.
    pub children: Children,
    /// Ref observer; a `ref` prop is used when this is `None`.
    pub node_ref: Option<Ref>,
}

/// Builder for well-formed descriptors.
#[derive(Debug, Clone)]
#[must_use]
pub struct VNodeBuilder {
    kind: Kind,
    key: Option<Key>,
    props: Props,
    children: Children,
    node_ref: Option<Ref>,
    recreate: bool,
}

/// Starts an element descriptor.
pub fn element(tag: impl Into<Rc<str>>) -> VNodeBuilder {
    VNodeBuilder::new(Kind::Element(tag.into()))
}

/// Starts a component descriptor.
pub fn component(ty: &ComponentType) -> VNodeBuilder {
    VNodeBuilder::new(Kind::Component(ty.clone()))
}

/// Starts a fragment descriptor.
pub fn fragment() -> VNodeBuilder {
    VNodeBuilder::new(Kind::Fragment)
}

/// Starts a portal descriptor rendering into `container`.
pub fn portal(container: NodeId) -> VNodeBuilder {
    VNodeBuilder::new(Kind::Portal(container))
}

/// Creates a text descriptor.
#[must_use]
pub fn text(content: impl Into<Rc<str>>) -> VNodeRef {
    Rc::new(VNode {
        kind: Kind::Text,
        key: None,
        props: Props::new(),
        children: Children::Text(content.into()),
        node_ref: None,
        recreate: false,
    })
}

/// Creates a descriptor that renders nothing.
#[must_use]
pub fn empty() -> VNodeRef {
    Rc::new(VNode {
        kind: Kind::Empty,
        key: None,
        props: Props::new(),
        children: Children::None,
        node_ref: None,
        recreate: false,
    })
}

impl VNodeBuilder {
    const fn new(kind: Kind) -> Self {
        Self {
            kind,
            key: None,
            props: Props::new(),
            children: Children::None,
            node_ref: None,
            recreate: false,
        }
    }

    /// Sets a prop; `key` and `ref` are routed to their dedicated fields.
    pub fn prop(mut self, name: &str, value: impl Into<PropValue>) -> Self {
        let value = value.into();
        match name {
            "key" => self.key = key_from_prop(&value),
            "ref" => {
                self.node_ref = match value {
                    PropValue::Ref(node_ref) => Some(node_ref),
                    _ => None,
                };
            }
            _ => {
                self.props.insert(name, value);
            }
        }
        self
    }

    /// Sets the `className` prop.
    pub fn class_name(self, class: impl Into<Rc<str>>) -> Self {
        self.prop("className", PropValue::Str(class.into()))
    }

    /// Sets the sibling key.
    pub fn key(mut self, key: impl Into<Key>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Sets the ref observer.
    pub fn node_ref(mut self, node_ref: Ref) -> Self {
        self.node_ref = Some(node_ref);
        self
    }

    /// Forces remount on every patch.
    pub const fn recreate(mut self) -> Self {
        self.recreate = true;
        self
    }

    /// Appends one child.
    pub fn child(mut self, child: VNodeRef) -> Self {
        self.children = match core::mem::take(&mut self.children) {
            Children::None => Children::Single(child),
            Children::Single(first) => Children::from_list(vec![first, child]),
            Children::Text(content) => Children::from_list(vec![text(content), child]),
            Children::Keyed(mut list) | Children::Unkeyed(mut list) => {
                list.push(child);
                Children::from_list(list)
            }
        };
        self
    }

    /// Sets the children from a list, keyed when every entry has a key.
    pub fn children(mut self, children: impl IntoIterator<Item = VNodeRef>) -> Self {
        self.children = Children::from_list(children.into_iter().collect());
        self
    }

    /// Sets a keyed child list without checking the keys.
    pub fn keyed_children(mut self, children: impl IntoIterator<Item = VNodeRef>) -> Self {
        self.children = Children::Keyed(children.into_iter().collect());
        self
    }

    /// Sets a positional child list.
    pub fn unkeyed_children(mut self, children: impl IntoIterator<Item = VNodeRef>) -> Self {
        self.children = Children::Unkeyed(children.into_iter().collect());
        self
    }

    /// Sets literal text content.
    pub fn text(mut self, content: impl Into<Rc<str>>) -> Self {
        self.children = Children::Text(content.into());
        self
    }

    /// Finishes the descriptor.
    #[must_use]
    pub fn build(self) -> VNodeRef {
        let Self {
            kind,
            key,
            mut props,
            children,
            node_ref,
            recreate,
        } = self;

        let children = match &kind {
            Kind::Component(_) => {
                if !matches!(children, Children::None) {
                    props.insert("children", children);
                }
                Children::None
            }
            Kind::Element(_) | Kind::Fragment | Kind::Portal(_) => {
                let lifted = props.remove("children");
                let children = match (children, lifted) {
                    (Children::None, Some(value)) => Children::from_prop(&value),
                    (children, _) => children,
                };
                if matches!(kind, Kind::Element(_)) {
                    children
                } else {
                    children.without_text()
                }
            }
            Kind::Text | Kind::Empty | Kind::Unknown(_) => Children::None,
        };

        Rc::new(VNode {
            kind,
            key,
            props,
            children,
            node_ref,
            recreate,
        })
    }
}
