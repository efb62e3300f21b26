//! Registry of ensemble root trees.
//!
//! This module provides [`EnsembleRegistry`], the shared owner of every
//! finished ensemble. Roots are keyed by their component id; each root
//! carries its own read/write lock, so operations on different roots never
//! contend and read-only aggregation on one root runs concurrently.

use crate::types::{Operation, OperationOutcome, RegistryStats, RootSummary, SearchHit};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::RwLock;
use rust_decimal::Decimal;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};
use trousseau_core::{Error, Result, ValidationReport};
use trousseau_engine::EnsembleTree;

/// Shared owner of registered ensemble trees.
///
/// The registry is the only shared mutable state of the engine. Mutation of
/// a root (marking, structural edits through [`write_tree`]) takes that
/// root's write lock; aggregation takes its read lock; different roots use
/// different locks.
///
/// # Example
///
/// ```ignore
/// use trousseau::prelude::*;
///
/// let registry = EnsembleRegistry::new();
/// let root_id = registry.register(tree)?;
///
/// let price = registry.execute(&root_id, Operation::Price)?;
/// let rendered = registry.render(&root_id)?;
/// ```
///
/// [`write_tree`]: EnsembleRegistry::write_tree
pub struct EnsembleRegistry {
    roots: DashMap<String, Arc<RwLock<EnsembleTree>>>,
}

impl EnsembleRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        EnsembleRegistry {
            roots: DashMap::new(),
        }
    }

    /// Create a registry sized for an expected number of roots.
    pub fn with_capacity(roots: usize) -> Self {
        EnsembleRegistry {
            roots: DashMap::with_capacity(roots),
        }
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Register a finished tree under its root component id.
    ///
    /// The tree is validated first, so only structurally sound ensembles
    /// enter the registry; a root id already in use is rejected with
    /// `DuplicateRoot`. Returns the registry key.
    pub fn register(&self, tree: EnsembleTree) -> Result<String> {
        let root = tree.root_id();
        tree.validate(root)?.into_result()?;
        let key = tree.node(root)?.id.as_str().to_string();
        match self.roots.entry(key.clone()) {
            Entry::Occupied(_) => Err(Error::DuplicateRoot(key)),
            Entry::Vacant(slot) => {
                slot.insert(Arc::new(RwLock::new(tree)));
                info!("registered ensemble '{}'", key);
                Ok(key)
            }
        }
    }

    /// Remove a root, dropping its whole subtree.
    pub fn remove(&self, id: &str) -> Result<()> {
        match self.roots.remove(id) {
            Some(_) => {
                info!("removed ensemble '{}'", id);
                Ok(())
            }
            None => Err(Error::BundleNotFound(id.to_string())),
        }
    }

    /// Whether a root with this id is registered.
    pub fn contains(&self, id: &str) -> bool {
        self.roots.contains_key(id)
    }

    /// Number of registered roots.
    pub fn len(&self) -> usize {
        self.roots.len()
    }

    /// Whether the registry holds no roots.
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// All registered root ids, sorted.
    pub fn root_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.roots.iter().map(|e| e.key().clone()).collect();
        ids.sort();
        ids
    }

    // =========================================================================
    // Per-root access
    // =========================================================================

    /// Run a read-only closure against one root under its read lock.
    pub fn read_tree<R>(&self, id: &str, f: impl FnOnce(&EnsembleTree) -> Result<R>) -> Result<R> {
        let handle = self.handle(id)?;
        let guard = handle.read();
        f(&guard)
    }

    /// Run a mutating closure against one root under its write lock.
    pub fn write_tree<R>(
        &self,
        id: &str,
        f: impl FnOnce(&mut EnsembleTree) -> Result<R>,
    ) -> Result<R> {
        let handle = self.handle(id)?;
        let mut guard = handle.write();
        f(&mut guard)
    }

    /// Dispatch one of the uniform operations against a root.
    pub fn execute(&self, id: &str, operation: Operation) -> Result<OperationOutcome> {
        debug!("executing {} on root '{}'", operation, id);
        match operation {
            Operation::Price => self.read_tree(id, |tree| {
                Ok(OperationOutcome::Price(tree.total_price(tree.root_id())?))
            }),
            Operation::CheckAvailability => self.read_tree(id, |tree| {
                Ok(OperationOutcome::Availability(
                    tree.is_available(tree.root_id())?,
                ))
            }),
            Operation::MarkRented => self.write_tree(id, |tree| {
                Ok(OperationOutcome::MarkedRented(
                    tree.mark_rented(tree.root_id())?,
                ))
            }),
            Operation::MarkAvailable => self.write_tree(id, |tree| {
                Ok(OperationOutcome::MarkedAvailable(
                    tree.mark_available(tree.root_id())?,
                ))
            }),
            Operation::SendToLaundry => self.write_tree(id, |tree| {
                Ok(OperationOutcome::SentToLaundry(
                    tree.mark_for_laundry(tree.root_id())?,
                ))
            }),
        }
    }

    // =========================================================================
    // Cross-root queries
    // =========================================================================

    /// Find a reference across every registered root.
    ///
    /// Returns at most one hit per root (depth-first, first match), ordered
    /// by root id.
    pub fn find_by_reference(&self, reference: &str) -> Result<Vec<SearchHit>> {
        let mut hits = Vec::new();
        for (root_id, handle) in self.sorted_handles() {
            let tree = handle.read();
            if let Some(node_id) = tree.find_by_reference(tree.root_id(), reference)? {
                let node = tree.node(node_id)?;
                if let Some(garment) = node.garment_data() {
                    hits.push(SearchHit {
                        root_id,
                        component_id: node.id.clone(),
                        garment: garment.clone(),
                    });
                }
            }
        }
        Ok(hits)
    }

    /// Root ids whose whole ensemble is currently rentable, sorted.
    pub fn available_roots(&self) -> Result<Vec<String>> {
        let mut out = Vec::new();
        for (root_id, handle) in self.sorted_handles() {
            let tree = handle.read();
            if tree.is_available(tree.root_id())? {
                out.push(root_id);
            }
        }
        Ok(out)
    }

    /// Root ids with laundry pending somewhere in the tree, sorted.
    pub fn laundry_roots(&self) -> Result<Vec<String>> {
        let mut out = Vec::new();
        for (root_id, handle) in self.sorted_handles() {
            let tree = handle.read();
            if tree.needs_laundry(tree.root_id())? {
                out.push(root_id);
            }
        }
        Ok(out)
    }

    // =========================================================================
    // Export and reporting
    // =========================================================================

    /// Serialize one root to its wire shape.
    pub fn export(&self, id: &str) -> Result<Value> {
        self.read_tree(id, |tree| tree.snapshot(tree.root_id())?.to_json())
    }

    /// Serialize every root, keyed by root id.
    pub fn export_all(&self) -> Result<Value> {
        let mut map = serde_json::Map::new();
        for (root_id, handle) in self.sorted_handles() {
            let tree = handle.read();
            map.insert(root_id, tree.snapshot(tree.root_id())?.to_json()?);
        }
        Ok(Value::Object(map))
    }

    /// Render one root as an ASCII tree.
    pub fn render(&self, id: &str) -> Result<String> {
        self.read_tree(id, |tree| tree.render(tree.root_id()))
    }

    /// Condensed listing of every root, ordered by root id.
    pub fn summaries(&self) -> Result<Vec<RootSummary>> {
        let mut out = Vec::new();
        for (root_id, handle) in self.sorted_handles() {
            let tree = handle.read();
            let root = tree.root_id();
            let node = tree.node(root)?;
            let stats = tree.stats(root)?;
            out.push(RootSummary {
                root_id,
                name: node.name.clone(),
                category: node
                    .metadata
                    .get("tipo")
                    .and_then(Value::as_str)
                    .map(String::from),
                components: stats.total_components,
                pieces: stats.total_pieces,
                total_price: stats.total_price,
                available: tree.is_available(root)?,
                needs_laundry: tree.needs_laundry(root)?,
            });
        }
        Ok(out)
    }

    /// Aggregate statistics across the whole registry.
    pub fn stats(&self) -> Result<RegistryStats> {
        let handles = self.sorted_handles();
        let roots = handles.len();
        let mut total_components = 0usize;
        let mut total_pieces = 0u32;
        let mut total_price = Decimal::ZERO;
        let mut available_roots = 0usize;
        let mut roots_needing_laundry = 0usize;
        let mut direct_children = 0usize;
        for (_, handle) in &handles {
            let tree = handle.read();
            let root = tree.root_id();
            let stats = tree.stats(root)?;
            total_components += stats.total_components;
            total_pieces += stats.total_pieces;
            total_price += stats.total_price;
            if tree.is_available(root)? {
                available_roots += 1;
            }
            if tree.needs_laundry(root)? {
                roots_needing_laundry += 1;
            }
            direct_children += tree.node(root)?.children().len();
        }
        let average_children_per_root = if roots == 0 {
            0.0
        } else {
            direct_children as f64 / roots as f64
        };
        Ok(RegistryStats {
            roots,
            total_components,
            total_pieces,
            total_price,
            available_roots,
            roots_needing_laundry,
            average_children_per_root,
        })
    }

    /// Re-validate every registered root, keyed by root id.
    ///
    /// Registration already guarantees validity, but post-registration
    /// mutation through [`write_tree`] can degrade a tree; this surfaces
    /// every finding per root.
    ///
    /// [`write_tree`]: EnsembleRegistry::write_tree
    pub fn validate_all(&self) -> Result<BTreeMap<String, ValidationReport>> {
        let mut reports = BTreeMap::new();
        for (root_id, handle) in self.sorted_handles() {
            let tree = handle.read();
            let report = tree.validate(tree.root_id())?;
            if !report.is_valid() {
                warn!(
                    "registered ensemble '{}' is no longer valid: {} finding(s)",
                    root_id,
                    report.errors.len()
                );
            }
            reports.insert(root_id, report);
        }
        Ok(reports)
    }

    fn handle(&self, id: &str) -> Result<Arc<RwLock<EnsembleTree>>> {
        self.roots
            .get(id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| Error::BundleNotFound(id.to_string()))
    }

    fn sorted_handles(&self) -> Vec<(String, Arc<RwLock<EnsembleTree>>)> {
        let mut handles: Vec<_> = self
            .roots
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();
        handles.sort_by(|a, b| a.0.cmp(&b.0));
        handles
    }
}

impl Default for EnsembleRegistry {
    fn default() -> Self {
        Self::new()
    }
}
