//! Generational arena of component instances.

use ripple_core::{AnyComponent, Callback, Component, InstanceId, Props};

use crate::fiber::FiberId;

/// Lifecycle phase of an instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Constructed, first render in progress.
    Mounting,
    /// Idle and attached.
    Mounted,
    /// Re-render in progress.
    Updating,
    /// Teardown in progress.
    Unmounting,
}

/// A live component instance.
pub struct InstanceEntry {
    /// Fiber of the component descriptor.
    pub fiber: FiberId,
    /// The component value and its state.
    pub component: Box<dyn AnyComponent>,
    /// Props the instance currently renders with.
    pub props: Props,
    /// Lifecycle phase.
    pub phase: Phase,
    /// One-shot hooks fired after the next completed update.
    pub after_update: Vec<Callback>,
}

impl std::fmt::Debug for InstanceEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstanceEntry")
            .field("fiber", &self.fiber)
            .field("component", &self.component)
            .field("props", &self.props)
            .field("phase", &self.phase)
            .field("after_update", &self.after_update.len())
            .finish()
    }
}

#[derive(Debug, Default)]
struct Slot {
    generation: u32,
    entry: Option<InstanceEntry>,
    reserved: bool,
}

/// Instance storage; released slots bump their generation so stale ids never resolve.
#[derive(Debug, Default)]
pub struct InstanceArena {
    slots: Vec<Slot>,
    free: Vec<usize>,
}

impl InstanceArena {
    /// Creates an empty arena.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    /// Reserves an id for an instance about to be constructed.
    pub fn reserve(&mut self) -> InstanceId {
        let index = self.free.pop().unwrap_or_else(|| {
            self.slots.push(Slot::default());
            self.slots.len() - 1
        });
        let slot = &mut self.slots[index];
        slot.reserved = true;
        InstanceId::new(index, slot.generation)
    }

    /// Stores the constructed instance under a reserved id.
    pub fn fill(&mut self, id: InstanceId, entry: InstanceEntry) {
        if let Some(slot) = self.slot_mut(id) {
            slot.entry = Some(entry);
        }
    }

    /// Drops the instance and invalidates `id`.
    pub fn release(&mut self, id: InstanceId) -> Option<InstanceEntry> {
        let slot = self.slot_mut(id)?;
        let entry = slot.entry.take();
        slot.reserved = false;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index());
        entry
    }

    /// Looks up a live instance.
    #[must_use]
    pub fn get(&self, id: InstanceId) -> Option<&InstanceEntry> {
        self.slots
            .get(id.index())
            .filter(|slot| slot.generation == id.generation())
            .and_then(|slot| slot.entry.as_ref())
    }

    /// Looks up a live instance mutably.
    pub fn get_mut(&mut self, id: InstanceId) -> Option<&mut InstanceEntry> {
        self.slot_mut(id).and_then(|slot| slot.entry.as_mut())
    }

    /// Downcasts a live instance to its component type.
    #[must_use]
    pub fn component<C: Component>(&self, id: InstanceId) -> Option<&C> {
        self.get(id)?.component.as_any().downcast_ref()
    }

    /// Number of live instances.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.entry.is_some()).count()
    }

    fn slot_mut(&mut self, id: InstanceId) -> Option<&mut Slot> {
        self.slots
            .get_mut(id.index())
            .filter(|slot| slot.generation == id.generation() && slot.reserved)
    }
}
