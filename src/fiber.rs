//! Mounted shadow records, one per tree position.
//!
//! Descriptors are immutable and may be shared between positions, so everything the
//! engine learns while mounting lives here instead: the realized display node or
//! component instance, the parent link and the ordered child records.

use std::ops::{Index, IndexMut};

use ripple_core::{InstanceId, Kind, NodeId, VNodeRef};

/// Identifier for a fiber stored inside the [`FiberArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FiberId(usize);

/// What a fiber realized in the display tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Realized {
    /// Fragments, portals and empty descriptors own no node.
    Nothing,
    /// Elements and text nodes.
    Node(NodeId),
    /// Components.
    Instance(InstanceId),
}

/// Shadow record of one mounted descriptor.
#[derive(Debug)]
pub struct Fiber {
    /// Descriptor last applied at this position.
    pub vnode: VNodeRef,
    /// Enclosing fiber; `None` for a root.
    pub parent: Option<FiberId>,
    /// Display node this position's own nodes live under.
    pub host_parent: NodeId,
    /// Realized node or instance.
    pub realized: Realized,
    /// Child records in display order.
    pub children: Vec<FiberId>,
}

impl Fiber {
    /// Creates a childless record.
    #[must_use]
    pub const fn new(
        vnode: VNodeRef,
        parent: Option<FiberId>,
        host_parent: NodeId,
        realized: Realized,
    ) -> Self {
        Self {
            vnode,
            parent,
            host_parent,
            realized,
            children: Vec::new(),
        }
    }

    /// The fiber's own display node.
    #[must_use]
    pub const fn node(&self) -> Option<NodeId> {
        match self.realized {
            Realized::Node(node) => Some(node),
            _ => None,
        }
    }

    /// The fiber's component instance.
    #[must_use]
    pub const fn instance(&self) -> Option<InstanceId> {
        match self.realized {
            Realized::Instance(id) => Some(id),
            _ => None,
        }
    }
}

/// Slot arena of fibers with index reuse.
#[derive(Debug, Default)]
pub struct FiberArena {
    slots: Vec<Option<Fiber>>,
    free: Vec<usize>,
}

impl FiberArena {
    /// Creates an empty arena.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    /// Stores a fiber.
    pub fn insert(&mut self, fiber: Fiber) -> FiberId {
        if let Some(index) = self.free.pop() {
            self.slots[index] = Some(fiber);
            FiberId(index)
        } else {
            self.slots.push(Some(fiber));
            FiberId(self.slots.len() - 1)
        }
    }

    /// Removes a fiber, returning it when it was live.
    pub fn remove(&mut self, id: FiberId) -> Option<Fiber> {
        let fiber = self.slots.get_mut(id.0)?.take()?;
        self.free.push(id.0);
        Some(fiber)
    }

    /// Looks up a live fiber.
    #[must_use]
    pub fn get(&self, id: FiberId) -> Option<&Fiber> {
        self.slots.get(id.0).and_then(Option::as_ref)
    }

    /// Looks up a live fiber mutably.
    pub fn get_mut(&mut self, id: FiberId) -> Option<&mut Fiber> {
        self.slots.get_mut(id.0).and_then(Option::as_mut)
    }

    /// Number of live fibers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    /// First display node at `id`'s position, in display order.
    #[must_use]
    pub fn first_node(&self, id: FiberId) -> Option<NodeId> {
        let fiber = self.get(id)?;
        match fiber.vnode.kind() {
            Kind::Element(_) | Kind::Text => fiber.node(),
            Kind::Component(_) | Kind::Fragment => fiber
                .children
                .iter()
                .find_map(|child| self.first_node(*child)),
            Kind::Portal(_) | Kind::Empty | Kind::Unknown(_) => None,
        }
    }

    /// Every top-level display node at `id`'s position, in display order.
    pub fn collect_nodes(&self, id: FiberId, out: &mut Vec<NodeId>) {
        let Some(fiber) = self.get(id) else {
            return;
        };
        match fiber.vnode.kind() {
            Kind::Element(_) | Kind::Text => out.extend(fiber.node()),
            Kind::Component(_) | Kind::Fragment => {
                for child in &fiber.children {
                    self.collect_nodes(*child, out);
                }
            }
            Kind::Portal(_) | Kind::Empty | Kind::Unknown(_) => {}
        }
    }

    /// The display node that follows `id`'s position under its host parent.
    ///
    /// Walks the following siblings, then climbs through fragments and components
    /// until an element, a portal or a root ends the search.
    #[must_use]
    pub fn next_anchor(&self, id: FiberId) -> Option<NodeId> {
        let mut current = id;
        loop {
            let parent_id = self.get(current)?.parent?;
            let parent = self.get(parent_id)?;
            let position = parent.children.iter().position(|c| *c == current)?;
            if let Some(node) = parent.children[position + 1..]
                .iter()
                .find_map(|sibling| self.first_node(*sibling))
            {
                return Some(node);
            }
            match parent.vnode.kind() {
                Kind::Component(_) | Kind::Fragment => current = parent_id,
                _ => return None,
            }
        }
    }

    /// Anchor for nodes appended after `id`'s last child.
    #[must_use]
    pub fn children_end_anchor(&self, id: FiberId) -> Option<NodeId> {
        match self.get(id)?.vnode.kind() {
            Kind::Component(_) | Kind::Fragment => self.next_anchor(id),
            _ => None,
        }
    }

    /// Re-points `id` and its transparent descendants at a new host parent.
    pub fn rehost(&mut self, id: FiberId, host_parent: NodeId) {
        let Some(fiber) = self.get_mut(id) else {
            return;
        };
        fiber.host_parent = host_parent;
        if matches!(fiber.vnode.kind(), Kind::Component(_) | Kind::Fragment) {
            let children = fiber.children.clone();
            for child in children {
                self.rehost(child, host_parent);
            }
        }
    }

    /// Swaps `old` for `new` in its parent's child list.
    pub fn replace_child(&mut self, parent: FiberId, old: FiberId, new: FiberId) {
        if let Some(slot) = self
            .get_mut(parent)
            .and_then(|fiber| fiber.children.iter_mut().find(|child| **child == old))
        {
            *slot = new;
        }
    }
}

impl Index<FiberId> for FiberArena {
    type Output = Fiber;

    fn index(&self, id: FiberId) -> &Fiber {
        match self.get(id) {
            Some(fiber) => fiber,
            None => panic!("fiber {} is not mounted", id.0),
        }
    }
}

impl IndexMut<FiberId> for FiberArena {
    fn index_mut(&mut self, id: FiberId) -> &mut Fiber {
        match self.get_mut(id) {
            Some(fiber) => fiber,
            None => panic!("fiber {} is not mounted", id.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use ripple_core::{element, empty, fragment, text};

    use super::*;

    const ROOT: NodeId = NodeId::new(0);

    fn leaf(arena: &mut FiberArena, parent: FiberId, node: usize) -> FiberId {
        let id = arena.insert(Fiber::new(
            text("x"),
            Some(parent),
            ROOT,
            Realized::Node(NodeId::new(node)),
        ));
        arena[parent].children.push(id);
        id
    }

    #[test]
    fn anchors_climb_through_fragments() {
        let mut arena = FiberArena::new();
        let root = arena.insert(Fiber::new(
            element("div").build(),
            None,
            ROOT,
            Realized::Node(NodeId::new(1)),
        ));
        let outer = arena.insert(Fiber::new(fragment().build(), Some(root), ROOT, Realized::Nothing));
        arena[root].children.push(outer);
        let inner = arena.insert(Fiber::new(fragment().build(), Some(outer), ROOT, Realized::Nothing));
        arena[outer].children.push(inner);
        let a = leaf(&mut arena, inner, 2);
        let hole = arena.insert(Fiber::new(empty(), Some(outer), ROOT, Realized::Nothing));
        arena[outer].children.push(hole);
        let b = leaf(&mut arena, outer, 3);
        let c = leaf(&mut arena, root, 4);

        assert_eq!(arena.next_anchor(a), Some(NodeId::new(3)));
        assert_eq!(arena.next_anchor(inner), Some(NodeId::new(3)));
        assert_eq!(arena.next_anchor(b), Some(NodeId::new(4)));
        assert_eq!(arena.next_anchor(c), None);
        assert_eq!(arena.first_node(outer), Some(NodeId::new(2)));

        let mut nodes = Vec::new();
        arena.collect_nodes(outer, &mut nodes);
        assert_eq!(nodes, [NodeId::new(2), NodeId::new(3)]);
    }

    #[test]
    fn removed_slots_are_reused() {
        let mut arena = FiberArena::new();
        let a = arena.insert(Fiber::new(empty(), None, ROOT, Realized::Nothing));
        assert!(arena.remove(a).is_some());
        assert!(arena.remove(a).is_none());
        assert_eq!(arena.len(), 0);
        let b = arena.insert(Fiber::new(empty(), None, ROOT, Realized::Nothing));
        assert_eq!(a, b);
        assert_eq!(arena.len(), 1);
    }
}
