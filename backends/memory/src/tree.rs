//! Node arena implementing [`Host`].

use std::{collections::BTreeMap, rc::Rc};

use ripple_core::{Event, Handler, Host, NodeId, PropValue};

use crate::mutation::{Mutation, MutationStats};

/// Payload of a node.
#[derive(Debug, Clone)]
pub enum NodeData {
    /// A root created with [`MemoryHost::create_container`].
    Container,
    /// An element with its attributes and event listeners.
    Element {
        /// Element tag.
        tag: Rc<str>,
        /// Attribute props, keyed by prop name.
        attributes: BTreeMap<String, PropValue>,
        /// Listeners keyed by lowercase event name.
        listeners: BTreeMap<String, Handler>,
    },
    /// A text node.
    Text(String),
}

#[derive(Debug)]
struct NodeEntry {
    data: NodeData,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    released: bool,
}

impl NodeEntry {
    const fn new(data: NodeData) -> Self {
        Self {
            data,
            parent: None,
            children: Vec::new(),
            released: false,
        }
    }
}

/// Headless display tree.
///
/// Released nodes keep their slot, so a [`NodeId`] is never reused and the arena only
/// grows. Meant for tests and short-lived trees.
#[derive(Debug, Default)]
pub struct MemoryHost {
    nodes: Vec<NodeEntry>,
    log: Vec<Mutation>,
    stats: MutationStats,
}

impl MemoryHost {
    /// Creates an empty host.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            nodes: Vec::new(),
            log: Vec::new(),
            stats: MutationStats {
                created: 0,
                inserted: 0,
                moved: 0,
                removed: 0,
                text_updates: 0,
                prop_updates: 0,
            },
        }
    }

    /// Creates a root node to render into. Not recorded as a mutation.
    pub fn create_container(&mut self) -> NodeId {
        self.push(NodeData::Container)
    }

    /// Mutations recorded since creation or the last [`MemoryHost::take_mutations`].
    #[must_use]
    pub fn mutations(&self) -> &[Mutation] {
        &self.log
    }

    /// Counters over [`MemoryHost::mutations`].
    #[must_use]
    pub const fn stats(&self) -> MutationStats {
        self.stats
    }

    /// Drains the mutation log and resets the counters.
    pub fn take_mutations(&mut self) -> Vec<Mutation> {
        self.stats = MutationStats::default();
        std::mem::take(&mut self.log)
    }

    /// Children of `node` in order.
    #[must_use]
    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.nodes
            .get(node.index())
            .map_or(&[], |entry| entry.children.as_slice())
    }

    /// Parent of `node`, if attached.
    #[must_use]
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node.index()).and_then(|entry| entry.parent)
    }

    /// Payload of `node`.
    #[must_use]
    pub fn data(&self, node: NodeId) -> Option<&NodeData> {
        self.nodes.get(node.index()).map(|entry| &entry.data)
    }

    /// Element tag of `node`.
    #[must_use]
    pub fn tag(&self, node: NodeId) -> Option<&str> {
        match self.data(node)? {
            NodeData::Element { tag, .. } => Some(tag),
            _ => None,
        }
    }

    /// Content of a text node.
    #[must_use]
    pub fn text(&self, node: NodeId) -> Option<&str> {
        match self.data(node)? {
            NodeData::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Attribute prop `name` of an element.
    #[must_use]
    pub fn attribute(&self, node: NodeId, name: &str) -> Option<&PropValue> {
        match self.data(node)? {
            NodeData::Element { attributes, .. } => attributes.get(name),
            _ => None,
        }
    }

    /// Returns `true` when an element listens for `event` (e.g. `click`).
    #[must_use]
    pub fn has_listener(&self, node: NodeId, event: &str) -> bool {
        matches!(
            self.data(node),
            Some(NodeData::Element { listeners, .. }) if listeners.contains_key(event)
        )
    }

    /// Returns `true` once the reconciler released `node`.
    #[must_use]
    pub fn is_released(&self, node: NodeId) -> bool {
        self.nodes.get(node.index()).is_some_and(|entry| entry.released)
    }

    /// Number of nodes ever created, including containers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` when no node exists.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Invokes the listener for `event` on `node`; returns `true` when one ran.
    pub fn dispatch(&self, node: NodeId, event: &str) -> bool {
        let Some(NodeData::Element { listeners, .. }) = self.data(node) else {
            return false;
        };
        let Some(handler) = listeners.get(event).cloned() else {
            return false;
        };
        handler.call(&Event::new(event, node));
        true
    }

    fn push(&mut self, data: NodeData) -> NodeId {
        let id = NodeId::new(self.nodes.len());
        self.nodes.push(NodeEntry::new(data));
        id
    }

    fn record(&mut self, mutation: Mutation) {
        tracing::trace!(?mutation, "memory host mutation");
        self.stats.record(&mutation);
        self.log.push(mutation);
    }

    fn entry_mut(&mut self, node: NodeId) -> Option<&mut NodeEntry> {
        self.nodes.get_mut(node.index())
    }

    fn detach(&mut self, node: NodeId) -> Option<NodeId> {
        let parent = self.entry_mut(node)?.parent.take()?;
        if let Some(entry) = self.entry_mut(parent) {
            entry.children.retain(|child| *child != node);
        }
        Some(parent)
    }
}

/// Maps `onClick` to `click`; `None` for non-event props.
fn event_name(prop: &str) -> Option<String> {
    let rest = prop.strip_prefix("on")?;
    rest.starts_with(|c: char| c.is_ascii_uppercase())
        .then(|| rest.to_ascii_lowercase())
}

impl Host for MemoryHost {
    fn create_element(&mut self, tag: &str) -> NodeId {
        let tag: Rc<str> = tag.into();
        let node = self.push(NodeData::Element {
            tag: tag.clone(),
            attributes: BTreeMap::new(),
            listeners: BTreeMap::new(),
        });
        self.record(Mutation::CreateElement { node, tag });
        node
    }

    fn create_text(&mut self, text: &str) -> NodeId {
        let node = self.push(NodeData::Text(text.to_owned()));
        self.record(Mutation::CreateText {
            node,
            text: text.to_owned(),
        });
        node
    }

    fn set_text(&mut self, node: NodeId, text: &str) {
        if let Some(NodeEntry {
            data: NodeData::Text(content),
            ..
        }) = self.entry_mut(node)
        {
            text.clone_into(content);
        } else {
            tracing::warn!(?node, "set_text on a node that is not text");
            return;
        }
        self.record(Mutation::SetText {
            node,
            text: text.to_owned(),
        });
    }

    fn insert_before(&mut self, parent: NodeId, child: NodeId, anchor: Option<NodeId>) {
        if anchor == Some(child) || !self.contains(parent) || !self.contains(child) {
            tracing::warn!(?parent, ?child, ?anchor, "ignored invalid insertion");
            return;
        }
        let moved = self.detach(child).is_some();
        let Some(entry) = self.entry_mut(parent) else {
            return;
        };
        let index = anchor
            .and_then(|anchor| entry.children.iter().position(|c| *c == anchor))
            .unwrap_or(entry.children.len());
        entry.children.insert(index, child);
        if let Some(entry) = self.entry_mut(child) {
            entry.parent = Some(parent);
        }
        self.record(if moved {
            Mutation::Move {
                parent,
                node: child,
                anchor,
            }
        } else {
            Mutation::Insert {
                parent,
                node: child,
                anchor,
            }
        });
    }

    fn remove_child(&mut self, parent: NodeId, child: NodeId) {
        if self.parent(child) != Some(parent) {
            tracing::warn!(?parent, ?child, "remove_child on a node with another parent");
            return;
        }
        self.detach(child);
        self.record(Mutation::Remove {
            parent,
            node: child,
        });
    }

    fn apply_prop(
        &mut self,
        node: NodeId,
        name: &str,
        _old: Option<&PropValue>,
        new: Option<&PropValue>,
    ) {
        let Some(NodeEntry {
            data:
                NodeData::Element {
                    attributes,
                    listeners,
                    ..
                },
            ..
        }) = self.entry_mut(node)
        else {
            tracing::warn!(?node, name, "apply_prop on a node that is not an element");
            return;
        };

        if let Some(event) = event_name(name) {
            match new {
                Some(PropValue::Handler(handler)) => {
                    listeners.insert(event, handler.clone());
                }
                _ => {
                    listeners.remove(&event);
                }
            }
        } else {
            match new {
                Some(value) if !value.is_null() => {
                    attributes.insert(name.to_owned(), value.clone());
                }
                _ => {
                    attributes.remove(name);
                }
            }
        }

        self.record(Mutation::SetProp {
            node,
            name: name.to_owned(),
            value: new.cloned(),
        });
    }

    fn contains(&self, node: NodeId) -> bool {
        self.nodes
            .get(node.index())
            .is_some_and(|entry| !entry.released)
    }

    fn release(&mut self, node: NodeId) {
        if let Some(entry) = self.entry_mut(node) {
            entry.released = true;
        }
    }
}
