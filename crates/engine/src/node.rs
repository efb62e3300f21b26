//! Tree node representation.
//!
//! A node is either a garment leaf or an ensemble with ordered children.
//! The two variants share identity, description, timestamps and a metadata
//! map; the variant-specific payload lives in [`NodeKind`] so every
//! recursive operation is an exhaustive match.
//!
//! Ownership runs parent to child through the child id lists; the `parent`
//! field is a plain back-reference used for ancestor checks and depth
//! computation, never for ownership.

use crate::arena::NodeId;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::BTreeMap;
use trousseau_core::{ComponentId, ComponentKind, GarmentSnapshot};

/// Variant payload of a tree node.
#[derive(Debug)]
pub enum NodeKind {
    /// Terminal node wrapping one garment snapshot.
    Garment(GarmentSnapshot),
    /// Composite node with an ordered child list.
    Ensemble {
        /// Children in insertion order, referenced by arena handle.
        children: Vec<NodeId>,
    },
}

/// One component in an ensemble tree.
#[derive(Debug)]
pub struct Node {
    /// Component id, unique within a tree.
    pub id: ComponentId,
    /// Display name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// Free-form metadata; ensembles store their category under `"tipo"`.
    pub metadata: BTreeMap<String, Value>,
    /// Creation instant.
    pub created_at: DateTime<Utc>,
    /// Last mutation instant.
    pub modified_at: DateTime<Utc>,
    /// Back-reference to the owning ensemble, `None` for roots and
    /// detached nodes.
    pub(crate) parent: Option<NodeId>,
    /// Leaf or composite payload.
    pub kind: NodeKind,
}

impl Node {
    /// Create a garment leaf from an attach-time snapshot.
    ///
    /// The component id is the garment's persistence id and the description
    /// is derived from color and size.
    pub fn garment(snapshot: GarmentSnapshot) -> Self {
        let now = Utc::now();
        let description = match (snapshot.color.is_empty(), snapshot.size.is_empty()) {
            (false, false) => format!("{} - talla {}", snapshot.color, snapshot.size),
            (false, true) => snapshot.color.clone(),
            (true, false) => format!("talla {}", snapshot.size),
            (true, true) => format!("prenda {}", snapshot.reference),
        };
        Node {
            id: snapshot.component_id(),
            name: snapshot.name.clone(),
            description,
            metadata: BTreeMap::new(),
            created_at: now,
            modified_at: now,
            parent: None,
            kind: NodeKind::Garment(snapshot),
        }
    }

    /// Create an empty ensemble node.
    pub fn ensemble(
        id: ComponentId,
        name: impl Into<String>,
        description: impl Into<String>,
        metadata: BTreeMap<String, Value>,
    ) -> Self {
        let now = Utc::now();
        Node {
            id,
            name: name.into(),
            description: description.into(),
            metadata,
            created_at: now,
            modified_at: now,
            parent: None,
            kind: NodeKind::Ensemble {
                children: Vec::new(),
            },
        }
    }

    /// Which variant this node is, as the shared kind tag.
    pub fn kind_tag(&self) -> ComponentKind {
        match self.kind {
            NodeKind::Garment(_) => ComponentKind::Garment,
            NodeKind::Ensemble { .. } => ComponentKind::Ensemble,
        }
    }

    /// Whether this node is a composite.
    pub fn is_ensemble(&self) -> bool {
        matches!(self.kind, NodeKind::Ensemble { .. })
    }

    /// Child handles in insertion order; empty for leaves.
    pub fn children(&self) -> &[NodeId] {
        match &self.kind {
            NodeKind::Garment(_) => &[],
            NodeKind::Ensemble { children } => children,
        }
    }

    /// The wrapped garment snapshot, if this node is a leaf.
    pub fn garment_data(&self) -> Option<&GarmentSnapshot> {
        match &self.kind {
            NodeKind::Garment(snapshot) => Some(snapshot),
            NodeKind::Ensemble { .. } => None,
        }
    }

    /// Owning ensemble handle, `None` for roots and detached nodes.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Refresh the last-modified timestamp.
    pub(crate) fn touch(&mut self) {
        self.modified_at = Utc::now();
    }
}
