//! Structure-preserving serialization of ensemble trees.
//!
//! [`ComponentSnapshot`] is the plain nested-object form of a component:
//! a type tag (`tipo`), identity fields, timestamps, metadata, and, for
//! composites, the children in order. The shape is what the surrounding
//! system ships over the wire, so the field names follow its conventions.
//!
//! Restoring does what attach-time mutation deliberately does not:
//! [`EnsembleTree::from_snapshot`] refuses duplicate component ids anywhere
//! in the payload, since a snapshot is supposed to describe a valid tree.

use crate::arena::NodeId;
use crate::node::{Node, NodeKind};
use crate::tree::EnsembleTree;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use trousseau_core::{ComponentId, ComponentKind, Error, GarmentSnapshot, Result};

/// Serialized form of one component, tagged by `tipo`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "tipo")]
pub enum ComponentSnapshot {
    /// A garment leaf (`tipo: "simple"`).
    #[serde(rename = "simple")]
    Garment {
        /// Component id.
        id: String,
        /// Display name.
        #[serde(rename = "nombre")]
        name: String,
        /// Description.
        #[serde(rename = "descripcion")]
        description: String,
        /// Creation instant.
        #[serde(rename = "fechaCreacion")]
        created_at: DateTime<Utc>,
        /// Last mutation instant.
        #[serde(rename = "ultimaModificacion")]
        modified_at: DateTime<Utc>,
        /// Free-form metadata.
        #[serde(default)]
        metadata: BTreeMap<String, Value>,
        /// The wrapped garment record.
        #[serde(rename = "prenda")]
        garment: GarmentSnapshot,
    },
    /// An ensemble (`tipo: "composite"`).
    #[serde(rename = "composite")]
    Ensemble {
        /// Component id.
        id: String,
        /// Display name.
        #[serde(rename = "nombre")]
        name: String,
        /// Description.
        #[serde(rename = "descripcion")]
        description: String,
        /// Creation instant.
        #[serde(rename = "fechaCreacion")]
        created_at: DateTime<Utc>,
        /// Last mutation instant.
        #[serde(rename = "ultimaModificacion")]
        modified_at: DateTime<Utc>,
        /// Free-form metadata; the category travels under `"tipo"` here.
        #[serde(default)]
        metadata: BTreeMap<String, Value>,
        /// Children in insertion order.
        #[serde(rename = "hijos", default)]
        children: Vec<ComponentSnapshot>,
    },
}

impl ComponentSnapshot {
    /// Component id of this snapshot node.
    pub fn id(&self) -> &str {
        match self {
            ComponentSnapshot::Garment { id, .. } => id,
            ComponentSnapshot::Ensemble { id, .. } => id,
        }
    }

    /// Display name of this snapshot node.
    pub fn name(&self) -> &str {
        match self {
            ComponentSnapshot::Garment { name, .. } => name,
            ComponentSnapshot::Ensemble { name, .. } => name,
        }
    }

    /// Kind tag of this snapshot node.
    pub fn kind(&self) -> ComponentKind {
        match self {
            ComponentSnapshot::Garment { .. } => ComponentKind::Garment,
            ComponentSnapshot::Ensemble { .. } => ComponentKind::Ensemble,
        }
    }

    /// Encode as a JSON value.
    pub fn to_json(&self) -> Result<Value> {
        serde_json::to_value(self).map_err(|e| Error::Snapshot(e.to_string()))
    }

    /// Decode from a JSON value.
    pub fn from_json(value: Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| Error::Snapshot(e.to_string()))
    }
}

impl EnsembleTree {
    /// Serialize the subtree rooted at `id`.
    pub fn snapshot(&self, id: NodeId) -> Result<ComponentSnapshot> {
        let node = self.node(id)?;
        match &node.kind {
            NodeKind::Garment(garment) => Ok(ComponentSnapshot::Garment {
                id: node.id.as_str().to_string(),
                name: node.name.clone(),
                description: node.description.clone(),
                created_at: node.created_at,
                modified_at: node.modified_at,
                metadata: node.metadata.clone(),
                garment: garment.clone(),
            }),
            NodeKind::Ensemble { children } => {
                let mut serialized = Vec::with_capacity(children.len());
                for child in children {
                    serialized.push(self.snapshot(*child)?);
                }
                Ok(ComponentSnapshot::Ensemble {
                    id: node.id.as_str().to_string(),
                    name: node.name.clone(),
                    description: node.description.clone(),
                    created_at: node.created_at,
                    modified_at: node.modified_at,
                    metadata: node.metadata.clone(),
                    children: serialized,
                })
            }
        }
    }

    /// Rebuild a tree from its serialized form.
    ///
    /// The root must be a composite and every component id in the payload
    /// must be unique; violations surface as `Error::Snapshot`. Timestamps
    /// and metadata are restored verbatim.
    pub fn from_snapshot(snapshot: ComponentSnapshot) -> Result<EnsembleTree> {
        let (id, name, description, created_at, modified_at, metadata, children) =
            match snapshot {
                ComponentSnapshot::Ensemble {
                    id,
                    name,
                    description,
                    created_at,
                    modified_at,
                    metadata,
                    children,
                } => (id, name, description, created_at, modified_at, metadata, children),
                ComponentSnapshot::Garment { .. } => {
                    return Err(Error::Snapshot(
                        "tree root must be a composite component".to_string(),
                    ))
                }
            };
        let mut seen = HashSet::new();
        claim(&mut seen, &id)?;
        let mut root_node = Node::ensemble(ComponentId::new(id), name, description, metadata);
        root_node.created_at = created_at;
        root_node.modified_at = modified_at;
        let mut tree = EnsembleTree::new(root_node);
        let root = tree.root_id();
        for child in children {
            let restored = restore(&mut tree, child, &mut seen)?;
            link(&mut tree, root, restored)?;
        }
        Ok(tree)
    }
}

fn restore(
    tree: &mut EnsembleTree,
    snapshot: ComponentSnapshot,
    seen: &mut HashSet<String>,
) -> Result<NodeId> {
    match snapshot {
        ComponentSnapshot::Garment {
            id,
            name,
            description,
            created_at,
            modified_at,
            metadata,
            garment,
        } => {
            claim(seen, &id)?;
            let mut node = Node::garment(garment);
            node.id = ComponentId::new(id);
            node.name = name;
            node.description = description;
            node.created_at = created_at;
            node.modified_at = modified_at;
            node.metadata = metadata;
            Ok(tree.insert_node(node))
        }
        ComponentSnapshot::Ensemble {
            id,
            name,
            description,
            created_at,
            modified_at,
            metadata,
            children,
        } => {
            claim(seen, &id)?;
            let mut node = Node::ensemble(ComponentId::new(id), name, description, metadata);
            node.created_at = created_at;
            node.modified_at = modified_at;
            let parent = tree.insert_node(node);
            for child in children {
                let restored = restore(tree, child, seen)?;
                link(tree, parent, restored)?;
            }
            Ok(parent)
        }
    }
}

// direct link, no attach checks and no timestamp touch
fn link(tree: &mut EnsembleTree, parent: NodeId, child: NodeId) -> Result<()> {
    tree.node_mut(child)?.parent = Some(parent);
    if let NodeKind::Ensemble { children } = &mut tree.node_mut(parent)?.kind {
        children.push(child);
    }
    Ok(())
}

fn claim(seen: &mut HashSet<String>, id: &str) -> Result<()> {
    if !seen.insert(id.to_string()) {
        return Err(Error::Snapshot(format!(
            "duplicate component id '{}' in snapshot",
            id
        )));
    }
    Ok(())
}
