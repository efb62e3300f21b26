//! Fluent construction of ensemble trees.
//!
//! The builder is the only place garments enter a tree: every reference is
//! resolved through the injected [`GarmentLookup`] exactly once, at attach
//! time, and the resulting snapshot is copied into a leaf. A builder holds
//! at most one in-progress ensemble; [`EnsembleBuilder::build`] validates
//! it, hands it over and clears the slot, so one build cycle starts with
//! [`EnsembleBuilder::start`] and ends with `build`.
//!
//! Batch attachment stops at the first failing reference and keeps the
//! garments already appended. Callers that need all-or-nothing semantics
//! must stage into a separate ensemble and attach it whole.

use crate::node::Node;
use crate::tree::EnsembleTree;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::debug;
use trousseau_core::{
    ComponentId, EnsembleCategory, Error, GarmentLookup, Result, ValidationReport,
};

/// Identity and metadata for a new ensemble.
#[derive(Debug, Clone, Default)]
pub struct EnsembleConfig {
    id: Option<String>,
    name: String,
    description: String,
    category: Option<EnsembleCategory>,
    metadata: BTreeMap<String, Value>,
}

impl EnsembleConfig {
    /// Start a config with the ensemble's display name.
    pub fn new(name: impl Into<String>) -> Self {
        EnsembleConfig {
            name: name.into(),
            ..EnsembleConfig::default()
        }
    }

    /// Supply an explicit component id instead of a generated one.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the ensemble category, stored in metadata under `"tipo"`.
    pub fn with_category(mut self, category: EnsembleCategory) -> Self {
        self.category = Some(category);
        self
    }

    /// Add one metadata entry.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    fn into_node(self) -> Node {
        let id = match self.id {
            Some(id) => ComponentId::new(id),
            None => ComponentId::generate("conjunto"),
        };
        let mut metadata = self.metadata;
        if let Some(category) = self.category {
            metadata.insert(
                "tipo".to_string(),
                Value::String(category.wire_token().to_string()),
            );
        }
        Node::ensemble(id, self.name, self.description, metadata)
    }
}

/// Builds one ensemble at a time against a garment lookup.
pub struct EnsembleBuilder<'a> {
    lookup: &'a dyn GarmentLookup,
    current: Option<EnsembleTree>,
}

impl std::fmt::Debug for EnsembleBuilder<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnsembleBuilder").finish_non_exhaustive()
    }
}

impl<'a> EnsembleBuilder<'a> {
    /// Create a builder over the given lookup.
    pub fn new(lookup: &'a dyn GarmentLookup) -> Self {
        EnsembleBuilder {
            lookup,
            current: None,
        }
    }

    /// Begin a fresh ensemble, discarding any unfinished one.
    pub fn start(&mut self, config: EnsembleConfig) -> &mut Self {
        if self.current.is_some() {
            debug!("discarding unfinished ensemble");
        }
        let tree = EnsembleTree::new(config.into_node());
        debug!(
            "started ensemble '{}'",
            tree.node(tree.root_id()).map(|n| n.id.to_string()).unwrap_or_default()
        );
        self.current = Some(tree);
        self
    }

    /// Resolve one reference and append the garment to the ensemble.
    pub fn add_garment(&mut self, reference: &str) -> Result<&mut Self> {
        let tree = self.current.as_mut().ok_or(Error::NoActiveBuild)?;
        let snapshot = self
            .lookup
            .find_by_reference(reference)
            .ok_or_else(|| Error::GarmentNotFound(reference.to_string()))?;
        let root = tree.root_id();
        let leaf = tree.insert_node(Node::garment(snapshot));
        if let Err(err) = tree.add_child(root, leaf) {
            tree.arena.remove(leaf);
            return Err(err);
        }
        Ok(self)
    }

    /// Resolve and append references in order, stopping at the first
    /// failure.
    ///
    /// Garments appended before the failure stay in the ensemble.
    pub fn add_garments(&mut self, references: &[&str]) -> Result<&mut Self> {
        for reference in references {
            self.add_garment(reference)?;
        }
        Ok(self)
    }

    /// Build a nested ensemble from `config` and `references` and attach it
    /// as a child of the current one.
    ///
    /// The nested ensemble is assembled by a fresh builder, so a failing
    /// reference leaves the current ensemble untouched.
    pub fn sub_ensemble(
        &mut self,
        config: EnsembleConfig,
        references: &[&str],
    ) -> Result<&mut Self> {
        if self.current.is_none() {
            return Err(Error::NoActiveBuild);
        }
        let mut inner = EnsembleBuilder::new(self.lookup);
        inner.start(config);
        inner.add_garments(references)?;
        let sub = inner.current.take().ok_or(Error::NoActiveBuild)?;
        self.attach_tree(sub)
    }

    /// Graft a separately built tree under the current ensemble's root.
    pub fn attach_tree(&mut self, tree: EnsembleTree) -> Result<&mut Self> {
        let current = self.current.as_mut().ok_or(Error::NoActiveBuild)?;
        let root = current.root_id();
        let grafted = current.adopt(tree)?;
        if let Err(err) = current.add_child(root, grafted) {
            current.prune_detached();
            return Err(err);
        }
        Ok(self)
    }

    /// Apply laundry priority overrides by reference.
    ///
    /// References not present in the ensemble are skipped.
    pub fn set_priorities(&mut self, overrides: &[(&str, u8)]) -> Result<&mut Self> {
        let tree = self.current.as_mut().ok_or(Error::NoActiveBuild)?;
        let root = tree.root_id();
        for (reference, priority) in overrides {
            match tree.find_by_reference(root, reference)? {
                Some(leaf) => tree.set_laundry_priority(leaf, *priority)?,
                None => debug!(
                    "priority override skipped, reference '{}' not in ensemble",
                    reference
                ),
            }
        }
        Ok(self)
    }

    /// Validate the in-progress ensemble without finalizing it.
    pub fn validate(&self) -> Result<ValidationReport> {
        let tree = self.current.as_ref().ok_or(Error::NoActiveBuild)?;
        tree.validate(tree.root_id())
    }

    /// Validate and hand over the finished ensemble.
    ///
    /// On validation failure the in-progress ensemble is kept, so the
    /// caller can repair it and try again.
    pub fn build(&mut self) -> Result<EnsembleTree> {
        self.validate()?.into_result()?;
        let tree = self.current.take().ok_or(Error::NoActiveBuild)?;
        debug!(
            "finished ensemble '{}' with {} component(s)",
            tree.node(tree.root_id()).map(|n| n.id.to_string()).unwrap_or_default(),
            tree.node_count()
        );
        Ok(tree)
    }
}
