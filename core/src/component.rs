//! Stateful components and the shared update queue.
//!
//! A [`ComponentType`] is the name carried by a component descriptor. Mounting it
//! produces an instance (a boxed [`Component`]) owned by the renderer. Instances never
//! re-render themselves: [`Updater`] handles only record work in the [`UpdateQueue`], and
//! the renderer drains that queue batch by batch.

use alloc::{
    boxed::Box,
    collections::VecDeque,
    rc::{Rc, Weak},
    vec::Vec,
};
use core::{
    any::{Any, TypeId},
    cell::RefCell,
    fmt,
    marker::PhantomData,
};
use std::collections::HashMap;

use crate::{host::NodeId, node::VNodeRef, props::Props};

/// A stateful unit that renders a descriptor subtree from its props.
///
/// Every hook has a no-op default; only [`Component::render`] is required. Errors
/// returned by hooks propagate unchanged to the caller of the render or flush that ran
/// them.
#[allow(unused_variables)]
pub trait Component: 'static {
    /// Produces the subtree for the current props and state.
    ///
    /// # Errors
    ///
    /// Any application error; the previously rendered subtree stays in place.
    fn render(&self, props: &Props) -> anyhow::Result<VNodeRef>;

    /// Runs before the first render.
    ///
    /// # Errors
    ///
    /// Aborts the mount.
    fn will_mount(&mut self, props: &Props) -> anyhow::Result<()> {
        Ok(())
    }

    /// Runs once the rendered subtree is attached, with its first display node.
    ///
    /// # Errors
    ///
    /// Aborts the mount.
    fn did_mount(&mut self, node: Option<NodeId>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Runs when a parent re-render delivers new props.
    ///
    /// # Errors
    ///
    /// Aborts the update.
    fn will_receive_props(&mut self, next: &Props) -> anyhow::Result<()> {
        Ok(())
    }

    /// Decides whether new props require a render.
    fn should_update(&self, current: &Props, next: &Props) -> bool {
        true
    }

    /// Runs before a re-render.
    ///
    /// # Errors
    ///
    /// Aborts the update.
    fn will_update(&mut self, props: &Props) -> anyhow::Result<()> {
        Ok(())
    }

    /// Runs after a re-render was patched into the display tree.
    ///
    /// # Errors
    ///
    /// Reported once the surrounding render or flush completes; the display tree
    /// already reflects the new render.
    fn did_update(&mut self, prev: &Props, node: Option<NodeId>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Runs before the rendered subtree is removed, with the node about to be destroyed.
    ///
    /// # Errors
    ///
    /// Reported after the unmount completes; the subtree is removed regardless.
    fn will_unmount(&mut self, node: Option<NodeId>) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Object-safe view of a [`Component`] that supports downcasting.
pub trait AnyComponent: Component {
    /// Upcasts to [`Any`].
    fn as_any(&self) -> &dyn Any;
    /// Upcasts to mutable [`Any`].
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Component> AnyComponent for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl fmt::Debug for dyn AnyComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AnyComponent")
    }
}

type Factory = dyn Fn(&Props, InstanceHandle) -> Box<dyn AnyComponent>;

struct ComponentDef {
    name: &'static str,
    type_id: TypeId,
    factory: Box<Factory>,
}

/// The name of a component descriptor.
///
/// Identity is the declaration: clones of one `ComponentType` are the same type, while
/// two declarations are different types even when they construct the same Rust type.
/// Patching a descriptor onto one of another type remounts it.
#[derive(Clone)]
pub struct ComponentType(Rc<ComponentDef>);

impl ComponentType {
    /// Declares a stateful component constructed by `ctor`.
    pub fn class<C: Component>(
        name: &'static str,
        ctor: impl Fn(&Props, Updater<C>) -> C + 'static,
    ) -> Self {
        Self(Rc::new(ComponentDef {
            name,
            type_id: TypeId::of::<C>(),
            factory: Box::new(move |props: &Props, handle: InstanceHandle| -> Box<dyn AnyComponent> {
                Box::new(ctor(props, Updater::new(handle)))
            }),
        }))
    }

    /// Declares a stateless component rendered by `render`.
    pub fn function<F>(name: &'static str, render: F) -> Self
    where
        F: Fn(&Props) -> anyhow::Result<VNodeRef> + 'static,
    {
        let render = Rc::new(render);
        Self(Rc::new(ComponentDef {
            name,
            type_id: TypeId::of::<F>(),
            factory: Box::new(move |_: &Props, _: InstanceHandle| -> Box<dyn AnyComponent> {
                Box::new(FunctionComponent {
                    render: render.clone(),
                })
            }),
        }))
    }

    /// Display name used in logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.0.name
    }

    /// Returns `true` when this type constructs `C`.
    #[must_use]
    pub fn is<C: Component>(&self) -> bool {
        self.0.type_id == TypeId::of::<C>()
    }

    /// Constructs a fresh instance.
    #[must_use]
    pub fn create_instance(&self, props: &Props, handle: InstanceHandle) -> Box<dyn AnyComponent> {
        (self.0.factory)(props, handle)
    }
}

impl PartialEq for ComponentType {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for ComponentType {}

impl fmt::Debug for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ComponentType").field(&self.0.name).finish()
    }
}

struct FunctionComponent<F> {
    render: Rc<F>,
}

impl<F> Component for FunctionComponent<F>
where
    F: Fn(&Props) -> anyhow::Result<VNodeRef> + 'static,
{
    fn render(&self, props: &Props) -> anyhow::Result<VNodeRef> {
        (self.render)(props)
    }
}

/// Generational identifier of a component instance.
///
/// Ids of released instances never match a live instance again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceId {
    index: usize,
    generation: u32,
}

impl InstanceId {
    /// Creates an id from its parts.
    #[must_use]
    pub const fn new(index: usize, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Arena slot of the instance.
    #[must_use]
    pub const fn index(self) -> usize {
        self.index
    }

    /// Generation of the slot when the instance was created.
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

/// Deferred mutation of a component's state.
pub type StateUpdate = Box<dyn FnOnce(&mut dyn AnyComponent)>;

/// Callback fired once after the update that carried it.
pub type Callback = Box<dyn FnOnce()>;

/// Work queued for one instance.
#[derive(Default)]
pub struct PendingUpdate {
    /// State closures, in request order.
    pub updates: Vec<StateUpdate>,
    /// One-shot callbacks to run after the update completes.
    pub callbacks: Vec<Callback>,
}

impl PendingUpdate {
    /// Appends work requested after `self`.
    pub fn append(&mut self, mut later: Self) {
        self.updates.append(&mut later.updates);
        self.callbacks.append(&mut later.callbacks);
    }
}

impl fmt::Debug for PendingUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingUpdate")
            .field("updates", &self.updates.len())
            .field("callbacks", &self.callbacks.len())
            .finish()
    }
}

/// Dirty instances waiting for the next flush, in the order they were first marked.
#[derive(Debug, Default)]
pub struct UpdateQueue {
    order: Vec<InstanceId>,
    pending: HashMap<InstanceId, PendingUpdate>,
}

impl UpdateQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `id` dirty, attaching an optional state closure and callback.
    ///
    /// Repeated requests for the same instance coalesce into one render.
    pub fn request(&mut self, id: InstanceId, update: Option<StateUpdate>, callback: Option<Callback>) {
        let entry = self.pending.entry(id).or_insert_with(|| {
            self.order.push(id);
            PendingUpdate::default()
        });
        entry.updates.extend(update);
        entry.callbacks.extend(callback);
    }

    /// Removes and returns the work queued for `id`.
    pub fn take(&mut self, id: InstanceId) -> Option<PendingUpdate> {
        let update = self.pending.remove(&id)?;
        self.order.retain(|queued| *queued != id);
        Some(update)
    }

    /// Drops everything queued for `id`; returns `true` when something was queued.
    pub fn discard(&mut self, id: InstanceId) -> bool {
        self.take(id).is_some()
    }

    /// Returns `true` when `id` has queued work.
    #[must_use]
    pub fn contains(&self, id: InstanceId) -> bool {
        self.pending.contains_key(&id)
    }

    /// Number of dirty instances.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns `true` when nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Moves all queued work into a batch, leaving the queue empty.
    pub fn take_batch(&mut self) -> Option<Batch> {
        if self.is_empty() {
            return None;
        }
        Some(Batch {
            order: core::mem::take(&mut self.order).into(),
            pending: core::mem::take(&mut self.pending),
        })
    }

    /// Puts unprocessed work from `batch` back in front of anything queued since.
    pub fn requeue(&mut self, mut batch: Batch) {
        let mut order: Vec<InstanceId> = batch
            .order
            .drain(..)
            .filter(|id| batch.pending.contains_key(id))
            .collect();
        for id in self.order.drain(..) {
            if !batch.pending.contains_key(&id) {
                order.push(id);
            }
        }
        for (id, later) in self.pending.drain() {
            batch.pending.entry(id).or_default().append(later);
        }
        self.order = order;
        self.pending = batch.pending;
    }
}

/// One drain of the [`UpdateQueue`].
#[derive(Debug, Default)]
pub struct Batch {
    order: VecDeque<InstanceId>,
    pending: HashMap<InstanceId, PendingUpdate>,
}

impl Batch {
    /// Takes the next instance still holding work.
    pub fn pop(&mut self) -> Option<(InstanceId, PendingUpdate)> {
        while let Some(id) = self.order.pop_front() {
            if let Some(update) = self.pending.remove(&id) {
                return Some((id, update));
            }
        }
        None
    }

    /// Takes the work for `id` out of order, e.g. when a parent re-render reaches it first.
    pub fn take(&mut self, id: InstanceId) -> Option<PendingUpdate> {
        self.pending.remove(&id)
    }

    /// Returns `true` when no work is left.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

/// Untyped handle an instance uses to reach the update queue.
#[derive(Clone)]
pub struct InstanceHandle {
    id: InstanceId,
    queue: Weak<RefCell<UpdateQueue>>,
}

impl InstanceHandle {
    /// Creates a handle for `id` feeding `queue`.
    #[must_use]
    pub fn new(id: InstanceId, queue: &Rc<RefCell<UpdateQueue>>) -> Self {
        Self {
            id,
            queue: Rc::downgrade(queue),
        }
    }

    /// The instance this handle belongs to.
    #[must_use]
    pub const fn id(&self) -> InstanceId {
        self.id
    }

    /// Queues work; a no-op once the renderer is gone.
    pub fn request(&self, update: Option<StateUpdate>, callback: Option<Callback>) {
        let Some(queue) = self.queue.upgrade() else {
            tracing::debug!(instance = ?self.id, "renderer dropped, update ignored");
            return;
        };
        queue.borrow_mut().request(self.id, update, callback);
    }
}

impl fmt::Debug for InstanceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstanceHandle").field("id", &self.id).finish()
    }
}

/// Typed state-update handle given to a component at construction.
pub struct Updater<C> {
    handle: InstanceHandle,
    _component: PhantomData<fn(&mut C)>,
}

impl<C> Clone for Updater<C> {
    fn clone(&self) -> Self {
        Self {
            handle: self.handle.clone(),
            _component: PhantomData,
        }
    }
}

impl<C> fmt::Debug for Updater<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Updater").field(&self.handle.id).finish()
    }
}

impl<C: Component> Updater<C> {
    const fn new(handle: InstanceHandle) -> Self {
        Self {
            handle,
            _component: PhantomData,
        }
    }

    /// The instance this updater drives.
    #[must_use]
    pub const fn id(&self) -> InstanceId {
        self.handle.id
    }

    /// Queues a state change; the instance re-renders on the next flush.
    pub fn set_state(&self, f: impl FnOnce(&mut C) + 'static) {
        self.handle.request(Some(Self::wrap(f)), None);
    }

    /// Queues a state change and a callback fired once after the resulting update.
    pub fn set_state_then(&self, f: impl FnOnce(&mut C) + 'static, then: impl FnOnce() + 'static) {
        self.handle
            .request(Some(Self::wrap(f)), Some(Box::new(then)));
    }

    /// Queues a re-render without changing state.
    pub fn force_update(&self) {
        self.handle.request(None, None);
    }

    fn wrap(f: impl FnOnce(&mut C) + 'static) -> StateUpdate {
        Box::new(move |component: &mut dyn AnyComponent| {
            if let Some(component) = component.as_any_mut().downcast_mut::<C>() {
                f(component);
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::element;

    struct Counter {
        count: u32,
    }

    impl Component for Counter {
        fn render(&self, _props: &Props) -> anyhow::Result<VNodeRef> {
            Ok(element("span").text(self.count.to_string()).build())
        }
    }

    fn id(index: usize) -> InstanceId {
        InstanceId::new(index, 0)
    }

    #[test]
    fn requests_coalesce_per_instance_in_first_marked_order() {
        let mut queue = UpdateQueue::new();
        queue.request(id(2), None, None);
        queue.request(id(1), None, None);
        queue.request(id(2), None, Some(Box::new(|| {})));
        assert_eq!(queue.len(), 2);

        let mut batch = queue.take_batch().unwrap();
        assert!(queue.is_empty());
        let (first, update) = batch.pop().unwrap();
        assert_eq!(first, id(2));
        assert_eq!(update.callbacks.len(), 1);
        assert_eq!(batch.pop().unwrap().0, id(1));
        assert!(batch.pop().is_none());
    }

    #[test]
    fn taken_entries_are_skipped_by_pop() {
        let mut queue = UpdateQueue::new();
        queue.request(id(0), None, None);
        queue.request(id(1), None, None);
        let mut batch = queue.take_batch().unwrap();
        assert!(batch.take(id(0)).is_some());
        assert_eq!(batch.pop().unwrap().0, id(1));
        assert!(batch.is_empty());
    }

    #[test]
    fn requeue_keeps_leftovers_first() {
        let mut queue = UpdateQueue::new();
        queue.request(id(0), None, None);
        queue.request(id(1), None, None);
        let mut batch = queue.take_batch().unwrap();
        batch.pop();
        queue.request(id(3), None, None);
        queue.request(id(1), None, Some(Box::new(|| {})));
        queue.requeue(batch);

        assert_eq!(queue.len(), 2);
        let mut batch = queue.take_batch().unwrap();
        let (first, update) = batch.pop().unwrap();
        assert_eq!(first, id(1));
        assert_eq!(update.callbacks.len(), 1);
        assert_eq!(batch.pop().unwrap().0, id(3));
    }

    #[test]
    fn discard_drops_queued_work() {
        let mut queue = UpdateQueue::new();
        queue.request(id(4), None, None);
        assert!(queue.discard(id(4)));
        assert!(!queue.discard(id(4)));
        assert!(queue.take_batch().is_none());
    }

    #[test]
    fn updater_feeds_shared_queue() {
        let queue = Rc::new(RefCell::new(UpdateQueue::new()));
        let ty = ComponentType::class::<Counter>("Counter", |_, _| Counter { count: 0 });
        let handle = InstanceHandle::new(id(7), &queue);
        let mut instance = ty.create_instance(&Props::new(), handle.clone());
        let updater = Updater::<Counter>::new(handle);

        updater.set_state(|c| c.count += 2);
        updater.set_state(|c| c.count += 1);
        assert_eq!(queue.borrow().len(), 1);

        let mut batch = queue.borrow_mut().take_batch().unwrap();
        let (_, pending) = batch.pop().unwrap();
        for update in pending.updates {
            update(instance.as_mut());
        }
        let counter = instance.as_any().downcast_ref::<Counter>().unwrap();
        assert_eq!(counter.count, 3);
    }

    #[test]
    fn updates_after_renderer_drop_are_ignored() {
        let queue = Rc::new(RefCell::new(UpdateQueue::new()));
        let updater = Updater::<Counter>::new(InstanceHandle::new(id(0), &queue));
        drop(queue);
        updater.force_update();
    }

    #[test]
    fn component_type_identity_follows_the_declaration() {
        let a = ComponentType::class::<Counter>("A", |_, _| Counter { count: 0 });
        let b = ComponentType::class::<Counter>("B", |_, _| Counter { count: 1 });
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
        assert!(a.is::<Counter>() && b.is::<Counter>());

        let labelled = |label: &'static str| {
            ComponentType::function("Label", move |_| Ok(element("p").text(label).build()))
        };
        assert_ne!(labelled("x"), labelled("y"));
    }
}
