//! Creating and destroying display nodes for descriptors.

use ripple_core::{Children, Error, Host, Kind, NodeId, RefTarget, Result, VNodeRef, text};

use crate::{
    Renderer,
    fiber::{Fiber, FiberId, Realized},
};

impl<H: Host> Renderer<H> {
    /// Realizes `vnode` under `host_parent`, before `anchor`.
    ///
    /// The returned fiber still has to be linked into `parent`'s child list. On error
    /// everything created by this call has been torn down again.
    pub(crate) fn mount(
        &mut self,
        vnode: VNodeRef,
        parent: Option<FiberId>,
        host_parent: NodeId,
        anchor: Option<NodeId>,
    ) -> Result<FiberId> {
        tracing::trace!(kind = vnode.kind().label(), "mount");
        match vnode.kind().clone() {
            Kind::Element(tag) => {
                let node = self.host.create_element(&tag);
                for (name, value) in vnode.props().iter() {
                    if name != "children" {
                        self.host.apply_prop(node, name, None, Some(value));
                    }
                }
                let id = self.fibers.insert(Fiber::new(
                    vnode.clone(),
                    parent,
                    host_parent,
                    Realized::Node(node),
                ));
                if let Err(error) = self.mount_children(id, node, vnode.children(), None) {
                    self.abandon(id, false);
                    return Err(error);
                }
                self.host.insert_before(host_parent, node, anchor);
                if let Some(node_ref) = vnode.node_ref() {
                    node_ref.set(Some(RefTarget::Node(node)));
                }
                Ok(id)
            }
            Kind::Text => {
                let node = self.host.create_text(vnode.text().unwrap_or_default());
                self.host.insert_before(host_parent, node, anchor);
                Ok(self.fibers.insert(Fiber::new(
                    vnode,
                    parent,
                    host_parent,
                    Realized::Node(node),
                )))
            }
            Kind::Component(ty) => self.mount_component(vnode, &ty, parent, host_parent, anchor),
            Kind::Fragment => {
                let id = self
                    .fibers
                    .insert(Fiber::new(vnode.clone(), parent, host_parent, Realized::Nothing));
                if let Err(error) = self.mount_children(id, host_parent, vnode.children(), anchor) {
                    self.abandon(id, true);
                    return Err(error);
                }
                Ok(id)
            }
            Kind::Portal(container) => {
                if !self.host.contains(container) {
                    return Err(Error::UnmountableDescriptor(format!(
                        "portal container {} is not part of the host",
                        container.index()
                    )));
                }
                let id = self
                    .fibers
                    .insert(Fiber::new(vnode.clone(), parent, host_parent, Realized::Nothing));
                if let Err(error) = self.mount_children(id, container, vnode.children(), None) {
                    self.abandon(id, true);
                    return Err(error);
                }
                Ok(id)
            }
            Kind::Empty => Ok(self.fibers.insert(Fiber::new(
                vnode,
                parent,
                host_parent,
                Realized::Nothing,
            ))),
            Kind::Unknown(bits) => Err(Error::UnmountableDescriptor(format!(
                "no descriptor kind in flags {bits:#x}"
            ))),
        }
    }

    /// Mounts `children` as the child list of `id`, all before `anchor`.
    pub(crate) fn mount_children(
        &mut self,
        id: FiberId,
        host_parent: NodeId,
        children: &Children,
        anchor: Option<NodeId>,
    ) -> Result<()> {
        if let Children::Text(content) = children {
            return self.mount_child(id, host_parent, text(content.clone()), anchor);
        }
        for child in children.as_slice() {
            self.mount_child(id, host_parent, child.clone(), anchor)?;
        }
        Ok(())
    }

    fn mount_child(
        &mut self,
        id: FiberId,
        host_parent: NodeId,
        vnode: VNodeRef,
        anchor: Option<NodeId>,
    ) -> Result<()> {
        let child = self.mount(vnode, Some(id), host_parent, anchor)?;
        self.fibers[id].children.push(child);
        Ok(())
    }

    /// Tears down a fiber whose mount failed before its own node was attached.
    ///
    /// Refs of the fiber itself were never set and are left alone.
    pub(crate) fn abandon(&mut self, id: FiberId, detach_children: bool) {
        let Some(fiber) = self.fibers.remove(id) else {
            return;
        };
        for child in fiber.children {
            self.unmount_fiber(child, detach_children);
        }
        if let Realized::Node(node) = fiber.realized {
            self.host.release(node);
        }
    }

    /// Removes the subtree at `id`, detaching its top-level nodes when `detach` is set.
    ///
    /// Teardown never stops halfway: hook errors are deferred to the end of the
    /// surrounding operation.
    pub(crate) fn unmount_fiber(&mut self, id: FiberId, detach: bool) {
        if let Some(instance) = self.fibers.get(id).and_then(Fiber::instance) {
            let node = self.fibers.first_node(id);
            self.will_unmount(instance, node);
        }

        let Some(fiber) = self.fibers.remove(id) else {
            return;
        };
        tracing::trace!(kind = fiber.vnode.kind().label(), detach, "unmount");

        match fiber.vnode.kind() {
            Kind::Element(_) => {
                if let Some(node_ref) = fiber.vnode.node_ref() {
                    node_ref.set(None);
                }
                for child in fiber.children {
                    self.unmount_fiber(child, false);
                }
                self.release_node(&fiber.realized, fiber.host_parent, detach);
            }
            Kind::Text => self.release_node(&fiber.realized, fiber.host_parent, detach),
            Kind::Component(_) => {
                for child in fiber.children {
                    self.unmount_fiber(child, detach);
                }
                if let Realized::Instance(instance) = fiber.realized {
                    self.release_instance(instance);
                }
                if let Some(node_ref) = fiber.vnode.node_ref() {
                    node_ref.set(None);
                }
            }
            Kind::Fragment => {
                for child in fiber.children {
                    self.unmount_fiber(child, detach);
                }
            }
            Kind::Portal(_) => {
                for child in fiber.children {
                    self.unmount_fiber(child, true);
                }
            }
            Kind::Empty | Kind::Unknown(_) => {}
        }
    }

    fn release_node(&mut self, realized: &Realized, host_parent: NodeId, detach: bool) {
        if let Realized::Node(node) = *realized {
            if detach {
                self.host.remove_child(host_parent, node);
            }
            self.host.release(node);
        }
    }

    /// Moves every top-level node of `id` before `anchor`.
    pub(crate) fn move_fiber(&mut self, id: FiberId, host_parent: NodeId, anchor: Option<NodeId>) {
        let mut nodes = Vec::new();
        self.fibers.collect_nodes(id, &mut nodes);
        tracing::trace!(count = nodes.len(), ?anchor, "move");
        for node in nodes {
            self.host.insert_before(host_parent, node, anchor);
        }
    }
}
