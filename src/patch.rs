//! Bringing a mounted position from one descriptor to the next.

use std::rc::Rc;

use ripple_core::{
    Error, Host, Kind, NodeId, Ref, RefTarget, Result, VNode, VNodeRef, empty,
};

use crate::{
    Renderer,
    fiber::{Fiber, FiberId, Realized},
};

impl<H: Host> Renderer<H> {
    /// Patches the fiber `id` to `next`, returning the fiber now occupying the position.
    ///
    /// The id changes only when the position had to be replaced; the parent's child
    /// list is updated in that case.
    pub(crate) fn patch(&mut self, id: FiberId, next: VNodeRef) -> Result<FiberId> {
        let old = self.fibers[id].vnode.clone();
        if Rc::ptr_eq(&old, &next) {
            return Ok(id);
        }
        if old.recreate() || next.recreate() || !old.kind().same_type(next.kind()) {
            return self.replace(id, next);
        }
        tracing::trace!(kind = next.kind().label(), "patch");

        match next.kind() {
            Kind::Element(_) => self.patch_element(id, &old, &next)?,
            Kind::Text => {
                if old.text() != next.text()
                    && let Some(node) = self.fibers[id].node()
                {
                    self.host.set_text(node, next.text().unwrap_or_default());
                }
            }
            Kind::Component(_) => {
                self.update_component(id, &next)?;
                if let Some(instance) = self.fibers[id].instance() {
                    swap_refs(&old, &next, RefTarget::Instance(instance));
                }
            }
            Kind::Fragment => {
                let host_parent = self.fibers[id].host_parent;
                self.patch_children(id, host_parent, old.children(), next.children())?;
            }
            Kind::Portal(container) => self.patch_portal(id, &old, &next, *container)?,
            Kind::Empty | Kind::Unknown(_) => {}
        }

        self.fibers[id].vnode = next;
        Ok(id)
    }

    /// Unmounts `id` entirely, then mounts `next` at the same position.
    ///
    /// Old refs and unmount hooks run before anything new exists. When the new mount
    /// fails, the previous descriptor is mounted back so the position keeps its last
    /// good output; if that fails too the position stays empty.
    fn replace(&mut self, id: FiberId, next: VNodeRef) -> Result<FiberId> {
        let (old, parent, host_parent) = {
            let fiber = &self.fibers[id];
            (fiber.vnode.clone(), fiber.parent, fiber.host_parent)
        };
        tracing::trace!(from = old.kind().label(), to = next.kind().label(), "replace");

        let anchor = self.fibers.next_anchor(id);
        let hole = self
            .fibers
            .insert(Fiber::new(empty(), parent, host_parent, Realized::Nothing));
        self.settle(parent, id, hole);
        self.unmount_fiber(id, true);

        let error = match self.mount(next, parent, host_parent, anchor) {
            Ok(replacement) => {
                self.fill_hole(parent, hole, replacement);
                return Ok(replacement);
            }
            Err(error) => error,
        };
        tracing::debug!(%error, "replacement failed, restoring the previous descriptor");
        match self.mount(old, parent, host_parent, anchor) {
            Ok(restored) => self.fill_hole(parent, hole, restored),
            Err(restore) => tracing::warn!(error = %restore, "previous descriptor did not remount"),
        }
        Err(error)
    }

    fn fill_hole(&mut self, parent: Option<FiberId>, hole: FiberId, fiber: FiberId) {
        self.settle(parent, hole, fiber);
        self.fibers.remove(hole);
    }

    fn patch_element(&mut self, id: FiberId, old: &VNode, next: &VNode) -> Result<()> {
        let Some(node) = self.fibers[id].node() else {
            return Ok(());
        };
        for change in old.props().changes(next.props()) {
            if change.name != "children" {
                self.host.apply_prop(node, change.name, change.old, change.new);
            }
        }
        self.patch_children(id, node, old.children(), next.children())?;
        swap_refs(old, next, RefTarget::Node(node));
        Ok(())
    }

    fn patch_portal(
        &mut self,
        id: FiberId,
        old: &VNode,
        next: &VNode,
        container: NodeId,
    ) -> Result<()> {
        let Kind::Portal(previous) = *old.kind() else {
            return Ok(());
        };
        if previous != container {
            if !self.host.contains(container) {
                return Err(Error::UnmountableDescriptor(format!(
                    "portal container {} is not part of the host",
                    container.index()
                )));
            }
            tracing::trace!(from = previous.index(), to = container.index(), "portal move");
            let children = self.fibers[id].children.clone();
            for child in children {
                self.move_fiber(child, container, None);
                self.fibers.rehost(child, container);
            }
        }
        self.patch_children(id, container, old.children(), next.children())
    }
}

/// Detaches the old ref and attaches the new one when they differ.
fn swap_refs(old: &VNode, next: &VNode, target: RefTarget) {
    let same = match (old.node_ref(), next.node_ref()) {
        (Some(a), Some(b)) => Ref::ptr_eq(a, b),
        (None, None) => true,
        _ => false,
    };
    if same {
        return;
    }
    if let Some(node_ref) = old.node_ref() {
        node_ref.set(None);
    }
    if let Some(node_ref) = next.node_ref() {
        node_ref.set(Some(target));
    }
}
