//! Structural validation.
//!
//! Validation aggregates findings instead of failing fast: one pass surfaces
//! every problem in the tree at once. Each call checks, in order, its own
//! identity fields, the at-least-one-child rule, every child recursively
//! (findings prefixed with the child's position and id), and finally runs a
//! depth-first scan over the subtree with a fresh visited set keyed by
//! component id.
//!
//! The scan is deliberately separate from the ancestor walk performed at
//! attach time. The walk only inspects one parent chain; the scan sees the
//! whole subtree, so it is the check that catches a duplicate id smuggled in
//! by attaching an independently built ensemble.

use crate::arena::NodeId;
use crate::node::NodeKind;
use crate::tree::EnsembleTree;
use std::collections::HashSet;
use tracing::warn;
use trousseau_core::{ComponentId, Result, ValidationReport};

impl EnsembleTree {
    /// Validate the subtree rooted at `id`, aggregating every finding.
    pub fn validate(&self, id: NodeId) -> Result<ValidationReport> {
        let errors = self.integrity_errors(id)?;
        if !errors.is_empty() {
            warn!(
                "validation of component {} produced {} finding(s)",
                id,
                errors.len()
            );
        }
        Ok(ValidationReport::from_errors(errors))
    }

    fn integrity_errors(&self, id: NodeId) -> Result<Vec<String>> {
        let node = self.node(id)?;
        let mut errors = Vec::new();
        if node.id.is_empty() {
            errors.push("component id is empty".to_string());
        }
        if node.name.trim().is_empty() {
            errors.push(format!("component '{}' has an empty name", node.id));
        }
        if let NodeKind::Ensemble { children } = &node.kind {
            if children.is_empty() {
                errors.push(format!(
                    "ensemble '{}' must have at least one child",
                    node.id
                ));
            }
            for (index, child) in children.iter().enumerate() {
                let child_id = self.node(*child)?.id.clone();
                for finding in self.integrity_errors(*child)? {
                    errors.push(format!("child {} ('{}'): {}", index, child_id, finding));
                }
            }
        }
        let mut visited = HashSet::new();
        self.scan_for_cycles(id, &mut visited, &mut errors)?;
        Ok(errors)
    }

    /// Depth-first scan flagging any component id met twice.
    ///
    /// Stops descending at a repeated id, which bounds the scan by the
    /// number of live nodes.
    fn scan_for_cycles(
        &self,
        id: NodeId,
        visited: &mut HashSet<ComponentId>,
        errors: &mut Vec<String>,
    ) -> Result<()> {
        let node = self.node(id)?;
        if !visited.insert(node.id.clone()) {
            errors.push(format!(
                "cyclic reference detected at component '{}'",
                node.id
            ));
            return Ok(());
        }
        for child in node.children() {
            self.scan_for_cycles(*child, visited, errors)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Node;
    use std::collections::BTreeMap;
    use trousseau_core::GarmentSnapshot;

    fn ensemble(id: &str, name: &str) -> Node {
        Node::ensemble(ComponentId::new(id), name, "", BTreeMap::new())
    }

    #[test]
    fn test_valid_tree_passes() {
        let mut t = EnsembleTree::new(ensemble("conjunto-1", "Gala"));
        let root = t.root_id();
        let leaf = t.insert_node(Node::garment(GarmentSnapshot::new("g-1", "R-1", "Clutch")));
        t.add_child(root, leaf).unwrap();
        let report = t.validate(root).unwrap();
        assert!(report.is_valid());
        assert!(report.errors.is_empty());
    }

    #[test]
    fn test_empty_ensemble_fails_with_child_rule() {
        let t = EnsembleTree::new(ensemble("conjunto-1", "Gala"));
        let report = t.validate(t.root_id()).unwrap();
        assert!(!report.is_valid());
        assert!(report
            .errors
            .iter()
            .any(|e| e.contains("must have at least one child")));
    }

    #[test]
    fn test_findings_aggregate_instead_of_short_circuiting() {
        let mut t = EnsembleTree::new(ensemble("conjunto-1", ""));
        let root = t.root_id();
        let inner = t.insert_node(ensemble("conjunto-2", "Accesorios"));
        t.add_child(root, inner).unwrap();
        let report = t.validate(root).unwrap();
        // empty root name and empty inner ensemble both reported
        assert!(report
            .errors
            .iter()
            .any(|e| e.contains("has an empty name")));
        assert!(report
            .errors
            .iter()
            .any(|e| e.contains("must have at least one child")));
    }

    #[test]
    fn test_child_findings_carry_position_and_id() {
        let mut t = EnsembleTree::new(ensemble("conjunto-1", "Gala"));
        let root = t.root_id();
        let ok = t.insert_node(Node::garment(GarmentSnapshot::new("g-1", "R-1", "Clutch")));
        let empty = t.insert_node(ensemble("conjunto-2", "Accesorios"));
        t.add_child(root, ok).unwrap();
        t.add_child(root, empty).unwrap();
        let report = t.validate(root).unwrap();
        assert!(report
            .errors
            .iter()
            .any(|e| e.starts_with("child 1 ('conjunto-2'):")));
    }

    #[test]
    fn test_scan_flags_duplicate_id_from_grafted_subtree() {
        let mut host = EnsembleTree::new(ensemble("conjunto-1", "Novia"));
        let host_root = host.root_id();
        let dress = host.insert_node(Node::garment(GarmentSnapshot::new(
            "g-vestido",
            "VN-1",
            "Vestido",
        )));
        host.add_child(host_root, dress).unwrap();

        // independently built ensemble reusing the dress id
        let mut guest = EnsembleTree::new(ensemble("conjunto-2", "Accesorios"));
        let guest_root = guest.root_id();
        let twin = guest.insert_node(Node::garment(GarmentSnapshot::new(
            "g-vestido",
            "VN-1",
            "Vestido",
        )));
        guest.add_child(guest_root, twin).unwrap();

        // the attach-time checks cannot see inside the grafted subtree
        let grafted = host.adopt(guest).unwrap();
        host.add_child(host_root, grafted).unwrap();

        let report = host.validate(host_root).unwrap();
        assert!(!report.is_valid());
        assert!(report
            .errors
            .iter()
            .any(|e| e.contains("cyclic reference detected at component 'g-vestido'")));
    }

    #[test]
    fn test_into_result_surfaces_invalid_bundle() {
        let t = EnsembleTree::new(ensemble("conjunto-1", "Gala"));
        let err = t
            .validate(t.root_id())
            .unwrap()
            .into_result()
            .unwrap_err();
        assert!(err.is_validation());
    }
}
