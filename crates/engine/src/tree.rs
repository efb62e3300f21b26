//! Ensemble tree: arena-backed component storage and structural mutation.
//!
//! A tree owns every node it ever created through its [`Arena`]; the shape
//! of the tree is the child lists hanging off the root. Removing a child
//! detaches it (parent cleared, node kept in the arena) so callers can
//! re-attach it later; [`EnsembleTree::prune_detached`] reclaims nodes that
//! are no longer reachable from the root.
//!
//! Attach-time invariants are id-based: a component id may appear at most
//! once among an ensemble's children, and no component may become its own
//! ancestor. The attach check walks the would-be parent's ancestor chain
//! only; the deep scan that also catches duplicate ids brought in by
//! independently built subtrees lives in the validation pass.

use crate::arena::{Arena, NodeId};
use crate::node::{Node, NodeKind};
use std::collections::{HashMap, HashSet};
use tracing::debug;
use trousseau_core::{ComponentId, Error, Result};

/// One rentable ensemble: a root composite plus the arena holding its
/// subtree.
///
/// All operations address nodes by [`NodeId`]; a stale handle surfaces as
/// `Error::ComponentNotFound` rather than panicking.
pub struct EnsembleTree {
    pub(crate) arena: Arena<Node>,
    root: NodeId,
}

impl EnsembleTree {
    /// Create a tree from its root node.
    pub fn new(root: Node) -> Self {
        let mut arena = Arena::new();
        let root = arena.insert(root);
        EnsembleTree { arena, root }
    }

    /// Handle of the root component.
    pub fn root_id(&self) -> NodeId {
        self.root
    }

    /// Resolve a handle to its node.
    pub fn node(&self, id: NodeId) -> Result<&Node> {
        self.arena
            .get(id)
            .ok_or_else(|| Error::ComponentNotFound(id.to_string()))
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.arena
            .get_mut(id)
            .ok_or_else(|| Error::ComponentNotFound(id.to_string()))
    }

    /// Store a node without attaching it anywhere.
    pub(crate) fn insert_node(&mut self, node: Node) -> NodeId {
        self.arena.insert(node)
    }

    /// Number of live nodes, detached ones included.
    pub fn node_count(&self) -> usize {
        self.arena.len()
    }

    /// Depth of a node; the root sits at level 0.
    pub fn level(&self, id: NodeId) -> Result<usize> {
        let mut depth = 0;
        let mut cursor = self.node(id)?.parent;
        while let Some(current) = cursor {
            depth += 1;
            cursor = self.node(current)?.parent;
        }
        Ok(depth)
    }

    /// Subtree handles in depth-first pre-order, children left to right.
    pub(crate) fn collect_subtree(&self, id: NodeId) -> Result<Vec<NodeId>> {
        let mut order = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let node = self.node(current)?;
            order.push(current);
            for child in node.children().iter().rev() {
                stack.push(*child);
            }
        }
        Ok(order)
    }

    /// Attach `child` as the last child of `parent`.
    ///
    /// Checked in order: the parent must be an ensemble, no current child of
    /// the parent may carry the same component id, the child must not be an
    /// ancestor of the parent (the parent itself included, so self-adoption
    /// is cyclic), and the child must not already hang off another ensemble.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        let (child_id, child_attached) = {
            let node = self.node(child)?;
            (node.id.clone(), node.parent.is_some())
        };
        let parent_node = self.node(parent)?;
        if !parent_node.is_ensemble() {
            return Err(Error::NotComposite(parent_node.id.clone()));
        }
        let parent_id = parent_node.id.clone();
        for existing in parent_node.children() {
            if self.node(*existing)?.id == child_id {
                return Err(Error::DuplicateChild(child_id));
            }
        }
        // ancestor walk, id-based, O(depth)
        let mut cursor = Some(parent);
        while let Some(current) = cursor {
            let node = self.node(current)?;
            if node.id == child_id {
                return Err(Error::CyclicReference(child_id));
            }
            cursor = node.parent;
        }
        if child_attached {
            return Err(Error::ChildAlreadyAttached(child_id));
        }

        self.node_mut(child)?.parent = Some(parent);
        let parent_node = self.node_mut(parent)?;
        if let NodeKind::Ensemble { children } = &mut parent_node.kind {
            children.push(child);
        }
        parent_node.touch();
        debug!("attached component '{}' under '{}'", child_id, parent_id);
        Ok(())
    }

    /// Detach `child` from `parent`.
    ///
    /// The node stays in the arena with its parent cleared, so it can be
    /// re-attached; fails with `ComponentNotFound` when `child` is not a
    /// direct child of `parent`.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        let child_id = self.node(child)?.id.clone();
        let parent_node = self.node(parent)?;
        if !parent_node.is_ensemble() {
            return Err(Error::NotComposite(parent_node.id.clone()));
        }
        let position = parent_node
            .children()
            .iter()
            .position(|c| *c == child)
            .ok_or_else(|| Error::ComponentNotFound(child_id.to_string()))?;

        let parent_node = self.node_mut(parent)?;
        if let NodeKind::Ensemble { children } = &mut parent_node.kind {
            children.remove(position);
        }
        parent_node.touch();
        self.node_mut(child)?.parent = None;
        debug!("detached component '{}'", child_id);
        Ok(())
    }

    /// Detach the direct child carrying `component_id`, returning its handle.
    pub fn remove_child_by_id(&mut self, parent: NodeId, component_id: &str) -> Result<NodeId> {
        let parent_node = self.node(parent)?;
        if !parent_node.is_ensemble() {
            return Err(Error::NotComposite(parent_node.id.clone()));
        }
        let mut found = None;
        for candidate in parent_node.children() {
            if self.node(*candidate)?.id.as_str() == component_id {
                found = Some(*candidate);
                break;
            }
        }
        let child = found.ok_or_else(|| Error::ComponentNotFound(component_id.to_string()))?;
        self.remove_child(parent, child)?;
        Ok(child)
    }

    /// Drop every node no longer reachable from the root.
    ///
    /// Returns how many nodes were reclaimed. Handles to pruned nodes go
    /// stale.
    pub fn prune_detached(&mut self) -> usize {
        let mut reachable = HashSet::new();
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            if !reachable.insert(id) {
                continue;
            }
            if let Some(node) = self.arena.get(id) {
                stack.extend(node.children().iter().copied());
            }
        }
        let stale: Vec<NodeId> = self
            .arena
            .iter()
            .map(|(id, _)| id)
            .filter(|id| !reachable.contains(id))
            .collect();
        for id in &stale {
            self.arena.remove(*id);
        }
        if !stale.is_empty() {
            debug!("pruned {} detached component(s)", stale.len());
        }
        stale.len()
    }

    /// Move every node of `other` into this tree's arena, returning the
    /// handle of `other`'s root, detached and ready for [`add_child`].
    ///
    /// Handles are remapped, so ids issued by `other` do not resolve here.
    /// Nodes detached inside `other` are dropped rather than carried over.
    /// No id-uniqueness check runs here; a duplicate brought in this way is
    /// reported by the validation scan.
    ///
    /// [`add_child`]: EnsembleTree::add_child
    pub fn adopt(&mut self, other: EnsembleTree) -> Result<NodeId> {
        let other_root = other.root_id();
        let order = other.collect_subtree(other_root)?;
        let mut source = other.arena;
        let mut remap: HashMap<NodeId, NodeId> = HashMap::with_capacity(order.len());
        for old in &order {
            let node = source
                .remove(*old)
                .ok_or_else(|| Error::ComponentNotFound(old.to_string()))?;
            remap.insert(*old, self.arena.insert(node));
        }
        for old in &order {
            let new = self.remapped(&remap, *old)?;
            let node = self.node_mut(new)?;
            if let Some(parent) = node.parent {
                node.parent = remap.get(&parent).copied();
            }
            if let NodeKind::Ensemble { children } = &mut node.kind {
                for child in children.iter_mut() {
                    *child = remap
                        .get(child)
                        .copied()
                        .ok_or_else(|| Error::ComponentNotFound(child.to_string()))?;
                }
            }
        }
        debug!("adopted subtree of {} component(s)", order.len());
        self.remapped(&remap, other_root)
    }

    fn remapped(&self, remap: &HashMap<NodeId, NodeId>, old: NodeId) -> Result<NodeId> {
        remap
            .get(&old)
            .copied()
            .ok_or_else(|| Error::ComponentNotFound(old.to_string()))
    }

    /// Mark every garment in the subtree as rented out.
    ///
    /// Returns the number of garments flipped.
    pub fn mark_rented(&mut self, id: NodeId) -> Result<usize> {
        let flipped = self.set_subtree_availability(id, false)?;
        debug!("marked {} garment(s) as rented", flipped);
        Ok(flipped)
    }

    /// Mark every garment in the subtree as available again.
    pub fn mark_available(&mut self, id: NodeId) -> Result<usize> {
        let flipped = self.set_subtree_availability(id, true)?;
        debug!("marked {} garment(s) as available", flipped);
        Ok(flipped)
    }

    /// Flag every garment in the subtree for laundry.
    pub fn mark_for_laundry(&mut self, id: NodeId) -> Result<usize> {
        let order = self.collect_subtree(id)?;
        let mut flagged = 0;
        for current in order {
            let node = self.node_mut(current)?;
            if let NodeKind::Garment(garment) = &mut node.kind {
                garment.needs_laundry = true;
                flagged += 1;
            }
            node.touch();
        }
        debug!("sent {} garment(s) to laundry", flagged);
        Ok(flagged)
    }

    /// Override the base laundry priority of a garment leaf.
    pub fn set_laundry_priority(&mut self, id: NodeId, priority: u8) -> Result<()> {
        let node = self.node_mut(id)?;
        match &mut node.kind {
            NodeKind::Garment(garment) => garment.laundry_priority = priority,
            NodeKind::Ensemble { .. } => {
                return Err(Error::ComponentNotFound(format!(
                    "no garment behind component '{}'",
                    node.id
                )))
            }
        }
        node.touch();
        Ok(())
    }

    fn set_subtree_availability(&mut self, id: NodeId, available: bool) -> Result<usize> {
        let order = self.collect_subtree(id)?;
        let mut flipped = 0;
        for current in order {
            let node = self.node_mut(current)?;
            if let NodeKind::Garment(garment) = &mut node.kind {
                garment.available = available;
                flipped += 1;
            }
            node.touch();
        }
        Ok(flipped)
    }
}

impl std::fmt::Debug for EnsembleTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnsembleTree")
            .field("root", &self.root)
            .field("nodes", &self.arena.len())
            .finish()
    }
}
