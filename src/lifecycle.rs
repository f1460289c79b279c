//! Component lifecycle driver.
//!
//! Mount: construct, `will_mount`, render, mount output, `did_mount`, ref.
//! Prop delivery: queued state, `will_receive_props`, `should_update`, then a
//! re-render unless the component declined. Re-render: `will_update`, render, patch,
//! `did_update`, one-shot callbacks. Unmount: `will_unmount`, teardown, release.

use ripple_core::{
    Callback, ComponentType, Host, InstanceHandle, InstanceId, NodeId, PendingUpdate, Props,
    RefTarget, Result, VNode, VNodeRef,
};

use crate::{
    Renderer,
    fiber::{Fiber, FiberId, Realized},
    instance::{InstanceEntry, Phase},
};

impl<H: Host> Renderer<H> {
    pub(crate) fn mount_component(
        &mut self,
        vnode: VNodeRef,
        ty: &ComponentType,
        parent: Option<FiberId>,
        host_parent: NodeId,
        anchor: Option<NodeId>,
    ) -> Result<FiberId> {
        let instance = self.instances.reserve();
        let props = vnode.props().clone();
        let component = ty.create_instance(&props, InstanceHandle::new(instance, &self.queue));
        tracing::trace!(component = ty.name(), ?instance, "construct");

        let id = self.fibers.insert(Fiber::new(
            vnode.clone(),
            parent,
            host_parent,
            Realized::Instance(instance),
        ));
        self.instances.fill(
            instance,
            InstanceEntry {
                fiber: id,
                component,
                props,
                phase: Phase::Mounting,
                after_update: Vec::new(),
            },
        );

        if let Err(error) = self.run_mount(id, instance, host_parent, anchor) {
            let Some(fiber) = self.fibers.remove(id) else {
                return Err(error);
            };
            for child in fiber.children {
                self.unmount_fiber(child, true);
            }
            self.release_instance(instance);
            return Err(error);
        }

        if let Some(node_ref) = vnode.node_ref() {
            node_ref.set(Some(RefTarget::Instance(instance)));
        }
        Ok(id)
    }

    fn run_mount(
        &mut self,
        id: FiberId,
        instance: InstanceId,
        host_parent: NodeId,
        anchor: Option<NodeId>,
    ) -> Result<()> {
        let Some(entry) = self.instances.get_mut(instance) else {
            return Ok(());
        };
        entry.component.will_mount(&entry.props)?;

        // State set during `will_mount` is folded into the first render.
        let early = self.queue.borrow_mut().take(instance);
        let output = {
            let Some(entry) = self.instances.get_mut(instance) else {
                return Ok(());
            };
            if let Some(early) = early {
                apply_updates(entry, early);
            }
            entry.component.render(&entry.props)?
        };

        let child = self.mount(output, Some(id), host_parent, anchor)?;
        self.fibers[id].children.push(child);

        let node = self.fibers.first_node(id);
        let Some(entry) = self.instances.get_mut(instance) else {
            return Ok(());
        };
        entry.component.did_mount(node)?;
        entry.phase = Phase::Mounted;
        let callbacks = std::mem::take(&mut entry.after_update);
        run_callbacks(callbacks);
        Ok(())
    }

    /// Delivers the props of `next` to the instance at `id`.
    pub(crate) fn update_component(&mut self, id: FiberId, next: &VNode) -> Result<()> {
        let Some(instance) = self.fibers[id].instance() else {
            return Ok(());
        };
        let pending = self.take_pending(instance);
        let next_props = next.props().clone();

        let Some(entry) = self.instances.get_mut(instance) else {
            return Ok(());
        };
        if let Some(pending) = pending {
            apply_updates(entry, pending);
        }
        entry.component.will_receive_props(&next_props)?;
        let update = entry.component.should_update(&entry.props, &next_props);
        let prev = std::mem::replace(&mut entry.props, next_props);

        if update {
            self.rerender(instance, &prev)
        } else {
            tracing::trace!(?instance, "should_update declined");
            let callbacks = std::mem::take(&mut entry.after_update);
            run_callbacks(callbacks);
            Ok(())
        }
    }

    /// Renders an instance again and patches its subtree.
    pub(crate) fn rerender(&mut self, instance: InstanceId, prev: &Props) -> Result<()> {
        let Some(entry) = self.instances.get_mut(instance) else {
            return Ok(());
        };
        entry.phase = Phase::Updating;
        let result = self.run_update(instance, prev);
        if let Some(entry) = self.instances.get_mut(instance)
            && entry.phase == Phase::Updating
        {
            entry.phase = Phase::Mounted;
        }
        result
    }

    fn run_update(&mut self, instance: InstanceId, prev: &Props) -> Result<()> {
        let (id, output) = {
            let Some(entry) = self.instances.get_mut(instance) else {
                return Ok(());
            };
            entry.component.will_update(&entry.props)?;
            (entry.fiber, entry.component.render(&entry.props)?)
        };

        match self.fibers[id].children.first().copied() {
            Some(child) => {
                self.patch(child, output)?;
            }
            None => {
                let host_parent = self.fibers[id].host_parent;
                let anchor = self.fibers.next_anchor(id);
                let child = self.mount(output, Some(id), host_parent, anchor)?;
                self.fibers[id].children.push(child);
            }
        }

        let node = self.fibers.first_node(id);
        let Some(entry) = self.instances.get_mut(instance) else {
            return Ok(());
        };
        entry.phase = Phase::Mounted;
        let did_update = entry.component.did_update(prev, node);
        let callbacks = std::mem::take(&mut entry.after_update);
        if let Err(error) = did_update {
            self.defer(error.into());
            return Ok(());
        }
        run_callbacks(callbacks);
        Ok(())
    }

    pub(crate) fn will_unmount(&mut self, instance: InstanceId, node: Option<NodeId>) {
        let Some(entry) = self.instances.get_mut(instance) else {
            return;
        };
        entry.phase = Phase::Unmounting;
        if let Err(error) = entry.component.will_unmount(node) {
            self.defer(error.into());
        }
    }

    /// Drops queued work and hook slots of an instance and invalidates its id.
    pub(crate) fn release_instance(&mut self, instance: InstanceId) {
        self.take_pending(instance);
        if self.instances.release(instance).is_some() {
            tracing::trace!(?instance, "released");
        }
    }

    /// Queued work for `instance`, from the running batch and from the queue.
    fn take_pending(&mut self, instance: InstanceId) -> Option<PendingUpdate> {
        let from_batch = self.batch.as_mut().and_then(|batch| batch.take(instance));
        let from_queue = self.queue.borrow_mut().take(instance);
        match (from_batch, from_queue) {
            (Some(mut first), Some(later)) => {
                first.append(later);
                Some(first)
            }
            (first, later) => first.or(later),
        }
    }

    /// Applies queued work for a dirty instance and re-renders it.
    pub(crate) fn process_update(&mut self, instance: InstanceId, pending: PendingUpdate) -> Result<bool> {
        let Some(entry) = self.instances.get_mut(instance) else {
            tracing::warn!(?instance, "dropping state update for an unmounted component");
            return Ok(false);
        };
        if entry.phase != Phase::Mounted {
            tracing::warn!(?instance, phase = ?entry.phase, "dropping state update for a busy component");
            return Ok(false);
        }
        apply_updates(entry, pending);
        let prev = entry.props.clone();
        self.rerender(instance, &prev)?;
        Ok(true)
    }
}

fn apply_updates(entry: &mut InstanceEntry, pending: PendingUpdate) {
    for update in pending.updates {
        update(entry.component.as_mut());
    }
    entry.after_update.extend(pending.callbacks);
}

fn run_callbacks(callbacks: Vec<Callback>) {
    for callback in callbacks {
        callback();
    }
}
