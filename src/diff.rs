//! Child-list reconciliation.

use std::collections::{HashMap, HashSet};

use ripple_core::{Children, Error, Host, Key, NodeId, Result, VNodeRef, text};

use crate::{Renderer, fiber::FiberId, lis::longest_increasing};

impl<H: Host> Renderer<H> {
    /// Reconciles the children of `id`, which live under `host_parent`.
    pub(crate) fn patch_children(
        &mut self,
        id: FiberId,
        host_parent: NodeId,
        old: &Children,
        next: &Children,
    ) -> Result<()> {
        match (old, next) {
            (Children::None, Children::None) => Ok(()),
            (Children::Text(previous), Children::Text(content)) => {
                if previous == content {
                    return Ok(());
                }
                match self.fibers[id].children.first().copied() {
                    Some(child) => {
                        if let Some(node) = self.fibers[child].node() {
                            self.host.set_text(node, content);
                        }
                        self.fibers[child].vnode = text(content.clone());
                        Ok(())
                    }
                    None => self.mount_children(id, host_parent, next, None),
                }
            }
            (Children::Single(_), Children::Single(child)) => {
                match self.fibers[id].children.first().copied() {
                    Some(current) => self.patch(current, child.clone()).map(|_| ()),
                    None => {
                        let anchor = self.fibers.children_end_anchor(id);
                        self.mount_children(id, host_parent, next, anchor)
                    }
                }
            }
            (Children::Unkeyed(_), Children::Unkeyed(list)) => {
                self.patch_unkeyed(id, host_parent, list)
            }
            (Children::Keyed(_), Children::Keyed(list)) => self.patch_keyed(id, host_parent, list),
            _ => self.replace_children(id, host_parent, next),
        }
    }

    /// Removes every child of `id` and mounts `next` in their place.
    fn replace_children(&mut self, id: FiberId, host_parent: NodeId, next: &Children) -> Result<()> {
        tracing::trace!("replace children");
        let anchor = self.fibers.children_end_anchor(id);
        let old = std::mem::take(&mut self.fibers[id].children);
        for child in old {
            self.unmount_fiber(child, true);
        }
        self.mount_children(id, host_parent, next, anchor)
    }

    /// Positional diff: patch pairs, trim the tail, append the rest.
    fn patch_unkeyed(&mut self, id: FiberId, host_parent: NodeId, next: &[VNodeRef]) -> Result<()> {
        let current = self.fibers[id].children.clone();
        let common = current.len().min(next.len());

        for (child, vnode) in current.iter().zip(next) {
            self.patch(*child, vnode.clone())?;
        }

        if current.len() > common {
            let excess = self.fibers[id].children.split_off(common);
            for child in excess {
                self.unmount_fiber(child, true);
            }
        } else if next.len() > common {
            let anchor = self.fibers.children_end_anchor(id);
            for vnode in &next[common..] {
                let child = self.mount(vnode.clone(), Some(id), host_parent, anchor)?;
                self.fibers[id].children.push(child);
            }
        }
        Ok(())
    }

    /// Keyed diff: match by key, keep the longest increasing run in place, move the
    /// rest, then mount new entries at their final positions.
    fn patch_keyed(&mut self, id: FiberId, host_parent: NodeId, next: &[VNodeRef]) -> Result<()> {
        let current = self.fibers[id].children.clone();
        let old_keys: Vec<Option<Key>> = current
            .iter()
            .map(|child| self.fibers[*child].vnode.key().cloned())
            .collect();

        let checked = check_keys(old_keys.iter().map(Option::as_ref))
            .and_then(|()| check_keys(next.iter().map(|vnode| vnode.key())));
        if let Err(error) = checked {
            if self.config.strict_keys {
                return Err(error);
            }
            tracing::warn!(%error, "keyed children fall back to positional diffing");
            return self.patch_unkeyed(id, host_parent, next);
        }

        let positions: HashMap<&Key, usize> = old_keys
            .iter()
            .enumerate()
            .filter_map(|(index, key)| key.as_ref().map(|key| (key, index)))
            .collect();
        let sources: Vec<Option<usize>> = next
            .iter()
            .map(|vnode| vnode.key().and_then(|key| positions.get(key).copied()))
            .collect();
        let matched: HashSet<usize> = sources.iter().flatten().copied().collect();

        // Unmatched old entries go first, in their original order.
        let mut live = Vec::with_capacity(matched.len());
        for (index, child) in current.iter().enumerate() {
            if matched.contains(&index) {
                live.push(*child);
            } else {
                self.unmount_fiber(*child, true);
            }
        }
        self.fibers[id].children = live;

        let mut placed: Vec<Option<FiberId>> = vec![None; next.len()];
        for (slot, (source, vnode)) in placed.iter_mut().zip(sources.iter().zip(next)) {
            if let Some(source) = source {
                *slot = Some(self.patch(current[*source], vnode.clone())?);
            }
        }

        let order: Vec<usize> = sources.iter().flatten().copied().collect();
        let stable = longest_increasing(&order);
        let end = self.fibers.children_end_anchor(id);

        // Moves, walking backwards so every anchor is already in its final place.
        let mut anchor = end;
        let mut stable = stable.iter().rev();
        for child in placed.iter().rev().flatten() {
            if !stable.next().copied().unwrap_or(true) {
                self.move_fiber(*child, host_parent, anchor);
            }
            anchor = self.fibers.first_node(*child).or(anchor);
        }

        // Mounts, after every move.
        let mut anchor = end;
        let mut result = Ok(());
        for (slot, vnode) in placed.iter_mut().zip(next).rev() {
            if slot.is_none() {
                match self.mount(vnode.clone(), Some(id), host_parent, anchor) {
                    Ok(child) => *slot = Some(child),
                    Err(error) => {
                        result = Err(error);
                        break;
                    }
                }
            }
            if let Some(child) = *slot {
                anchor = self.fibers.first_node(child).or(anchor);
            }
        }

        self.fibers[id].children = placed.into_iter().flatten().collect();
        result
    }
}

/// Verifies that every entry carries a key and that keys are unique.
fn check_keys<'a>(keys: impl Iterator<Item = Option<&'a Key>>) -> Result<()> {
    let mut seen = HashSet::new();
    for (index, key) in keys.enumerate() {
        let key = key.ok_or(Error::MissingKey { index })?;
        if !seen.insert(key) {
            return Err(Error::DuplicateKey { key: key.clone() });
        }
    }
    Ok(())
}
