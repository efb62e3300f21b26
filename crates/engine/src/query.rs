//! Read-only aggregation over ensemble trees.
//!
//! Every operation takes the handle of the node to start from and treats
//! garments and ensembles uniformly: leaves answer from their snapshot,
//! composites fold the same operation over their children. None of these
//! operations mutate the tree, so the registry runs them under a read lock.

use crate::arena::NodeId;
use crate::node::NodeKind;
use crate::tree::EnsembleTree;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use trousseau_core::{ComponentId, ComponentKind, Result};

/// Position and lifecycle facts about one component.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComponentInfo {
    /// Leaf or composite.
    pub kind: ComponentKind,
    /// Depth below the root, root at 0.
    pub level: usize,
    /// Component id of the owning ensemble, if attached.
    pub parent: Option<ComponentId>,
    /// Creation instant.
    pub created_at: DateTime<Utc>,
    /// Last mutation instant.
    pub modified_at: DateTime<Utc>,
}

/// Dashboard snapshot of one subtree.
///
/// Totals aggregate the whole subtree; the `*_children` counts look at
/// direct children only.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnsembleStats {
    /// Nodes in the subtree, the starting node included.
    pub total_components: usize,
    /// Sum of garment piece counts.
    pub total_pieces: u32,
    /// Sum of garment rental prices.
    pub total_price: Decimal,
    /// Direct children currently rentable.
    pub available_children: usize,
    /// Direct children with laundry pending somewhere below them.
    pub children_needing_laundry: usize,
    /// Aggregated laundry priority of the subtree.
    pub max_laundry_priority: u8,
    /// Depth of the starting node.
    pub depth: usize,
}

impl EnsembleTree {
    /// Sum of rental prices over the subtree.
    pub fn total_price(&self, id: NodeId) -> Result<Decimal> {
        let node = self.node(id)?;
        match &node.kind {
            NodeKind::Garment(garment) => Ok(garment.rental_price),
            NodeKind::Ensemble { children } => {
                let mut total = Decimal::ZERO;
                for child in children {
                    total += self.total_price(*child)?;
                }
                Ok(total)
            }
        }
    }

    /// Number of physical pieces in the subtree.
    pub fn piece_count(&self, id: NodeId) -> Result<u32> {
        let node = self.node(id)?;
        match &node.kind {
            NodeKind::Garment(garment) => Ok(garment.pieces),
            NodeKind::Ensemble { children } => {
                let mut pieces = 0;
                for child in children {
                    pieces += self.piece_count(*child)?;
                }
                Ok(pieces)
            }
        }
    }

    /// Rental references of the subtree, depth-first, children in insertion
    /// order.
    pub fn reference_list(&self, id: NodeId) -> Result<Vec<String>> {
        let node = self.node(id)?;
        match &node.kind {
            NodeKind::Garment(garment) => Ok(vec![garment.reference.clone()]),
            NodeKind::Ensemble { children } => {
                let mut references = Vec::new();
                for child in children {
                    references.extend(self.reference_list(*child)?);
                }
                Ok(references)
            }
        }
    }

    /// Whether the subtree can be rented as a unit.
    ///
    /// A garment answers with its own flag. An ensemble requires every
    /// child to be available; an ensemble with no children answers `false`,
    /// since there is nothing in it to rent.
    pub fn is_available(&self, id: NodeId) -> Result<bool> {
        let node = self.node(id)?;
        match &node.kind {
            NodeKind::Garment(garment) => Ok(garment.available),
            NodeKind::Ensemble { children } => {
                if children.is_empty() {
                    return Ok(false);
                }
                for child in children {
                    if !self.is_available(*child)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
        }
    }

    /// Whether any garment in the subtree is waiting for laundry.
    pub fn needs_laundry(&self, id: NodeId) -> Result<bool> {
        let node = self.node(id)?;
        match &node.kind {
            NodeKind::Garment(garment) => Ok(garment.needs_laundry),
            NodeKind::Ensemble { children } => {
                for child in children {
                    if self.needs_laundry(*child)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
        }
    }

    /// Laundry priority of the subtree: the maximum over children, since
    /// urgency does not add up. An empty ensemble reports 0.
    pub fn laundry_priority(&self, id: NodeId) -> Result<u8> {
        let node = self.node(id)?;
        match &node.kind {
            NodeKind::Garment(garment) => Ok(garment.laundry_priority),
            NodeKind::Ensemble { children } => {
                let mut highest = 0;
                for child in children {
                    highest = highest.max(self.laundry_priority(*child)?);
                }
                Ok(highest)
            }
        }
    }

    /// True only for ensembles.
    pub fn is_composite(&self, id: NodeId) -> Result<bool> {
        Ok(self.node(id)?.is_ensemble())
    }

    /// Description of a component; for ensembles it carries live child and
    /// piece counts.
    pub fn describe(&self, id: NodeId) -> Result<String> {
        let node = self.node(id)?;
        match &node.kind {
            NodeKind::Garment(_) => Ok(node.description.clone()),
            NodeKind::Ensemble { children } => {
                let counts = format!(
                    "{} hijos, {} piezas",
                    children.len(),
                    self.piece_count(id)?
                );
                if node.description.is_empty() {
                    Ok(counts)
                } else {
                    Ok(format!("{} ({})", node.description, counts))
                }
            }
        }
    }

    /// Depth-first search for the garment carrying `reference`.
    ///
    /// First match wins; the returned handle is the node itself, so repeated
    /// calls yield the same identity.
    pub fn find_by_reference(&self, id: NodeId, reference: &str) -> Result<Option<NodeId>> {
        let node = self.node(id)?;
        match &node.kind {
            NodeKind::Garment(garment) => {
                Ok((garment.reference == reference).then_some(id))
            }
            NodeKind::Ensemble { children } => {
                for child in children {
                    if let Some(hit) = self.find_by_reference(*child, reference)? {
                        return Ok(Some(hit));
                    }
                }
                Ok(None)
            }
        }
    }

    /// Garments in the subtree whose name contains `pattern`,
    /// case-insensitively. Ensemble names are never matched.
    pub fn find_garments_by_name(&self, id: NodeId, pattern: &str) -> Result<Vec<NodeId>> {
        let needle = pattern.to_lowercase();
        let mut hits = Vec::new();
        self.collect_name_matches(id, &needle, &mut hits)?;
        Ok(hits)
    }

    fn collect_name_matches(
        &self,
        id: NodeId,
        needle: &str,
        hits: &mut Vec<NodeId>,
    ) -> Result<()> {
        let node = self.node(id)?;
        match &node.kind {
            NodeKind::Garment(garment) => {
                if garment.name.to_lowercase().contains(needle) {
                    hits.push(id);
                }
            }
            NodeKind::Ensemble { children } => {
                for child in children {
                    self.collect_name_matches(*child, needle, hits)?;
                }
            }
        }
        Ok(())
    }

    /// Kind, depth, parent and timestamps of one component.
    pub fn component_info(&self, id: NodeId) -> Result<ComponentInfo> {
        let node = self.node(id)?;
        let parent = match node.parent() {
            Some(parent_id) => Some(self.node(parent_id)?.id.clone()),
            None => None,
        };
        Ok(ComponentInfo {
            kind: node.kind_tag(),
            level: self.level(id)?,
            parent,
            created_at: node.created_at,
            modified_at: node.modified_at,
        })
    }

    /// Flat dashboard snapshot of the subtree rooted at `id`.
    pub fn stats(&self, id: NodeId) -> Result<EnsembleStats> {
        let node = self.node(id)?;
        let mut available_children = 0;
        let mut children_needing_laundry = 0;
        for child in node.children() {
            if self.is_available(*child)? {
                available_children += 1;
            }
            if self.needs_laundry(*child)? {
                children_needing_laundry += 1;
            }
        }
        Ok(EnsembleStats {
            total_components: self.collect_subtree(id)?.len(),
            total_pieces: self.piece_count(id)?,
            total_price: self.total_price(id)?,
            available_children,
            children_needing_laundry,
            max_laundry_priority: self.laundry_priority(id)?,
            depth: self.level(id)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Node;
    use std::collections::BTreeMap;
    use trousseau_core::GarmentSnapshot;

    fn euros(cents: i64) -> Decimal {
        Decimal::new(cents, 2)
    }

    fn fixture() -> (EnsembleTree, NodeId, NodeId) {
        let mut t = EnsembleTree::new(Node::ensemble(
            ComponentId::new("conjunto-novia"),
            "Conjunto novia",
            "Conjunto completo de novia",
            BTreeMap::new(),
        ));
        let root = t.root_id();
        let dress = t.insert_node(Node::garment(
            GarmentSnapshot::new("g-vestido", "VN-001", "Vestido de novia")
                .with_price(euros(30000))
                .with_laundry_priority(8),
        ));
        t.add_child(root, dress).unwrap();

        let accessories = t.insert_node(Node::ensemble(
            ComponentId::new("conjunto-accesorios"),
            "Accesorios",
            "",
            BTreeMap::new(),
        ));
        t.add_child(root, accessories).unwrap();

        let veil = t.insert_node(Node::garment(
            GarmentSnapshot::new("g-velo", "VL-002", "Velo catedral")
                .with_price(euros(5000))
                .with_available(false)
                .with_laundry_priority(3),
        ));
        let shoes = t.insert_node(Node::garment(
            GarmentSnapshot::new("g-zapatos", "ZP-003", "Zapatos de raso")
                .with_price(euros(8000))
                .with_pieces(2),
        ));
        t.add_child(accessories, veil).unwrap();
        t.add_child(accessories, shoes).unwrap();
        (t, root, accessories)
    }

    #[test]
    fn test_total_price_sums_subtree() {
        let (t, root, accessories) = fixture();
        assert_eq!(t.total_price(root).unwrap(), euros(43000));
        assert_eq!(t.total_price(accessories).unwrap(), euros(13000));
    }

    #[test]
    fn test_piece_count_honors_multi_piece_garments() {
        let (t, root, _) = fixture();
        // dress 1 + veil 1 + shoes 2
        assert_eq!(t.piece_count(root).unwrap(), 4);
    }

    #[test]
    fn test_reference_list_preserves_insertion_order_depth_first() {
        let (t, root, _) = fixture();
        assert_eq!(
            t.reference_list(root).unwrap(),
            vec!["VN-001", "VL-002", "ZP-003"]
        );
    }

    #[test]
    fn test_availability_is_conjunction_over_children() {
        let (mut t, root, accessories) = fixture();
        assert!(!t.is_available(root).unwrap());
        t.mark_available(root).unwrap();
        assert!(t.is_available(root).unwrap());
        assert!(t.is_available(accessories).unwrap());
    }

    #[test]
    fn test_empty_ensemble_is_never_available() {
        let t = EnsembleTree::new(Node::ensemble(
            ComponentId::new("conjunto-vacio"),
            "Vacío",
            "",
            BTreeMap::new(),
        ));
        assert!(!t.is_available(t.root_id()).unwrap());
        assert_eq!(t.laundry_priority(t.root_id()).unwrap(), 0);
    }

    #[test]
    fn test_laundry_aggregation_or_and_max() {
        let (mut t, root, _) = fixture();
        assert!(!t.needs_laundry(root).unwrap());
        assert_eq!(t.laundry_priority(root).unwrap(), 8);
        t.mark_for_laundry(root).unwrap();
        assert!(t.needs_laundry(root).unwrap());
    }

    #[test]
    fn test_find_by_reference_returns_stable_identity() {
        let (t, root, _) = fixture();
        let first = t.find_by_reference(root, "ZP-003").unwrap().unwrap();
        let second = t.find_by_reference(root, "ZP-003").unwrap().unwrap();
        assert_eq!(first, second);
        assert_eq!(t.node(first).unwrap().id.as_str(), "g-zapatos");
        assert!(t.find_by_reference(root, "XX-999").unwrap().is_none());
    }

    #[test]
    fn test_find_garments_by_name_is_case_insensitive_and_skips_ensembles() {
        let (t, root, _) = fixture();
        let hits = t.find_garments_by_name(root, "VELO").unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(t.node(hits[0]).unwrap().name, "Velo catedral");
        // "novia" appears in the root ensemble name and in one garment
        let hits = t.find_garments_by_name(root, "novia").unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(t.node(hits[0]).unwrap().id.as_str(), "g-vestido");
    }

    #[test]
    fn test_describe_reports_child_and_piece_counts() {
        let (t, root, accessories) = fixture();
        assert_eq!(
            t.describe(root).unwrap(),
            "Conjunto completo de novia (2 hijos, 4 piezas)"
        );
        assert_eq!(t.describe(accessories).unwrap(), "2 hijos, 3 piezas");
    }

    #[test]
    fn test_component_info_walks_parents_for_level() {
        let (t, root, accessories) = fixture();
        let veil = t.find_by_reference(root, "VL-002").unwrap().unwrap();
        let info = t.component_info(veil).unwrap();
        assert_eq!(info.kind, ComponentKind::Garment);
        assert_eq!(info.level, 2);
        assert_eq!(info.parent, Some(ComponentId::new("conjunto-accesorios")));
        let info = t.component_info(root).unwrap();
        assert_eq!(info.kind, ComponentKind::Ensemble);
        assert_eq!(info.level, 0);
        assert_eq!(info.parent, None);
        assert_eq!(t.component_info(accessories).unwrap().level, 1);
    }

    #[test]
    fn test_stats_flat_snapshot() {
        let (t, root, _) = fixture();
        let stats = t.stats(root).unwrap();
        assert_eq!(stats.total_components, 5);
        assert_eq!(stats.total_pieces, 4);
        assert_eq!(stats.total_price, euros(43000));
        // dress available, accessories blocked by the veil
        assert_eq!(stats.available_children, 1);
        assert_eq!(stats.children_needing_laundry, 0);
        assert_eq!(stats.max_laundry_priority, 8);
        assert_eq!(stats.depth, 0);
    }
}
