//! The renderer owning a display tree and everything mounted into it.

use std::{cell::RefCell, collections::HashMap, fmt, rc::Rc};

use ripple_core::{
    Batch, Component, Error, Host, InstanceId, NodeId, Props, Result, UpdateQueue, VNodeRef,
};

use crate::{
    config::Config,
    fiber::{FiberArena, FiberId},
    instance::InstanceArena,
};

/// Reconciles descriptor trees into a [`Host`].
///
/// Each container passed to [`Renderer::render`] holds one independent tree. The
/// renderer remembers the last descriptor applied at every position and only issues
/// the host mutations needed to reach the next one.
pub struct Renderer<H: Host> {
    pub(crate) host: H,
    pub(crate) config: Config,
    pub(crate) fibers: FiberArena,
    pub(crate) instances: InstanceArena,
    pub(crate) queue: Rc<RefCell<UpdateQueue>>,
    pub(crate) batch: Option<Batch>,
    roots: HashMap<NodeId, FiberId>,
    deferred: Option<Error>,
}

impl<H: Host> Renderer<H> {
    /// Creates a renderer with the default [`Config`].
    pub fn new(host: H) -> Self {
        Self::with_config(host, Config::default())
    }

    /// Creates a renderer with an explicit [`Config`].
    pub fn with_config(host: H, config: Config) -> Self {
        Self {
            host,
            config,
            fibers: FiberArena::new(),
            instances: InstanceArena::new(),
            queue: Rc::new(RefCell::new(UpdateQueue::new())),
            batch: None,
            roots: HashMap::new(),
            deferred: None,
        }
    }

    /// Mounts, patches or clears the tree rendered into `container`.
    ///
    /// Passing `None` unmounts the current tree. When [`Config::auto_flush`] is set,
    /// state updates queued along the way are flushed before returning.
    ///
    /// # Errors
    ///
    /// The first error raised by a descriptor, a keyed-children check or application
    /// code. Work completed before the error stays applied; the failing subtree keeps
    /// its previous state.
    pub fn render(&mut self, vnode: impl Into<Option<VNodeRef>>, container: NodeId) -> Result<()> {
        let vnode = vnode.into();
        let _span = tracing::debug_span!("render", container = container.index()).entered();

        let result = self.render_root(vnode, container);
        let result = match result {
            Ok(()) if self.config.auto_flush => self.drain_queue().map(|_| ()),
            other => other,
        };
        self.finish(result)
    }

    /// Unmounts whatever is rendered into `container`.
    ///
    /// # Errors
    ///
    /// The first error returned by a `will_unmount` hook; the tree is removed regardless.
    pub fn unmount(&mut self, container: NodeId) -> Result<()> {
        if let Some(root) = self.roots.remove(&container) {
            self.unmount_fiber(root, true);
        }
        self.finish(Ok(()))
    }

    /// The display tree.
    pub const fn host(&self) -> &H {
        &self.host
    }

    /// The display tree, mutably.
    pub const fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Consumes the renderer, returning the display tree.
    pub fn into_host(self) -> H {
        self.host
    }

    /// Active configuration.
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Returns `true` when something is rendered into `container`.
    pub fn is_rendered(&self, container: NodeId) -> bool {
        self.roots.contains_key(&container)
    }

    /// Borrows a mounted instance as its component type.
    pub fn component<C: Component>(&self, id: InstanceId) -> Option<&C> {
        self.instances.component(id)
    }

    /// Props a mounted instance currently renders with.
    pub fn props_of(&self, id: InstanceId) -> Option<&Props> {
        self.instances.get(id).map(|entry| &entry.props)
    }

    /// Returns `true` while `id` refers to a mounted instance.
    pub fn is_mounted(&self, id: InstanceId) -> bool {
        self.instances.get(id).is_some()
    }

    /// Number of instances with queued state updates.
    pub fn pending_updates(&self) -> usize {
        self.queue.borrow().len()
    }

    fn render_root(&mut self, vnode: Option<VNodeRef>, container: NodeId) -> Result<()> {
        match (self.roots.get(&container).copied(), vnode) {
            (None, None) => Ok(()),
            (None, Some(vnode)) => {
                if !self.host.contains(container) {
                    return Err(Error::UnmountableDescriptor(format!(
                        "container {} is not part of the host",
                        container.index()
                    )));
                }
                let root = self.mount(vnode, None, container, None)?;
                self.roots.insert(container, root);
                Ok(())
            }
            (Some(root), Some(vnode)) => {
                let root = self.patch(root, vnode)?;
                self.roots.insert(container, root);
                Ok(())
            }
            (Some(root), None) => {
                self.roots.remove(&container);
                self.unmount_fiber(root, true);
                Ok(())
            }
        }
    }

    /// Points whatever referenced `old` (its parent's child list or a root slot) at `new`.
    pub(crate) fn settle(&mut self, parent: Option<FiberId>, old: FiberId, new: FiberId) {
        match parent {
            Some(parent) => self.fibers.replace_child(parent, old, new),
            None => {
                if let Some(root) = self.roots.values_mut().find(|root| **root == old) {
                    *root = new;
                }
            }
        }
    }

    /// Records an error that must not interrupt the operation in progress.
    pub(crate) fn defer(&mut self, error: Error) {
        tracing::debug!(%error, "deferring error until the operation completes");
        if self.deferred.is_none() {
            self.deferred = Some(error);
        }
    }

    pub(crate) fn finish(&mut self, result: Result<()>) -> Result<()> {
        let deferred = self.deferred.take();
        result?;
        deferred.map_or(Ok(()), Err)
    }
}

impl<H: Host + fmt::Debug> fmt::Debug for Renderer<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Renderer")
            .field("host", &self.host)
            .field("config", &self.config)
            .field("fibers", &self.fibers.len())
            .field("instances", &self.instances.len())
            .field("pending_updates", &self.pending_updates())
            .finish_non_exhaustive()
    }
}
