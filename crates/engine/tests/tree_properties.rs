//! Property-based tests for ensemble tree invariants.
//!
//! Trees are generated through the builder from randomized garment specs,
//! with a random subset of garments pushed one level down into a nested
//! ensemble, so every property is checked across flat and nested shapes:
//! price and piece aggregation, availability conjunction, laundry
//! disjunction and max-priority, reference ordering, structural rejection
//! of re-attachment, and serialization round-trips.

use proptest::prelude::*;
use rust_decimal::Decimal;
use trousseau_core::{GarmentCatalog, GarmentSnapshot};
use trousseau_engine::snapshot::ComponentSnapshot;
use trousseau_engine::{EnsembleBuilder, EnsembleConfig, EnsembleTree};

#[derive(Debug, Clone)]
struct GarmentSpec {
    price_cents: i64,
    pieces: u32,
    available: bool,
    needs_laundry: bool,
    priority: u8,
    nested: bool,
}

fn garment_spec() -> impl Strategy<Value = GarmentSpec> {
    (
        0..50_000i64,
        1..4u32,
        any::<bool>(),
        any::<bool>(),
        0..=10u8,
        any::<bool>(),
    )
        .prop_map(
            |(price_cents, pieces, available, needs_laundry, priority, nested)| GarmentSpec {
                price_cents,
                pieces,
                available,
                needs_laundry,
                priority,
                nested,
            },
        )
}

fn garment_specs() -> impl Strategy<Value = Vec<GarmentSpec>> {
    proptest::collection::vec(garment_spec(), 1..12)
}

fn catalog_for(specs: &[GarmentSpec]) -> GarmentCatalog {
    specs
        .iter()
        .enumerate()
        .map(|(index, spec)| {
            GarmentSnapshot::new(
                format!("g-{index}"),
                format!("R-{index}"),
                format!("Prenda {index}"),
            )
            .with_price(Decimal::new(spec.price_cents, 2))
            .with_pieces(spec.pieces)
            .with_available(spec.available)
            .with_needs_laundry(spec.needs_laundry)
            .with_laundry_priority(spec.priority)
        })
        .collect()
}

/// Build a tree with non-nested garments at the root, followed by one
/// nested ensemble holding the rest. Returns the tree and the expected
/// flattened reference order.
fn build_tree(specs: &[GarmentSpec]) -> (EnsembleTree, Vec<String>) {
    let catalog = catalog_for(specs);
    let mut builder = EnsembleBuilder::new(&catalog);
    builder.start(EnsembleConfig::new("Conjunto generado").with_id("conjunto-raiz"));

    let top: Vec<String> = specs
        .iter()
        .enumerate()
        .filter(|(_, s)| !s.nested)
        .map(|(i, _)| format!("R-{i}"))
        .collect();
    let nested: Vec<String> = specs
        .iter()
        .enumerate()
        .filter(|(_, s)| s.nested)
        .map(|(i, _)| format!("R-{i}"))
        .collect();

    let top_refs: Vec<&str> = top.iter().map(String::as_str).collect();
    builder.add_garments(&top_refs).unwrap();
    if !nested.is_empty() {
        let nested_refs: Vec<&str> = nested.iter().map(String::as_str).collect();
        builder
            .sub_ensemble(
                EnsembleConfig::new("Subconjunto").with_id("conjunto-sub"),
                &nested_refs,
            )
            .unwrap();
    }
    let tree = builder.build().unwrap();

    let mut expected = top;
    expected.extend(nested);
    (tree, expected)
}

proptest! {
    /// Total price of any bundle equals the plain sum of its leaf prices.
    #[test]
    fn prop_total_price_is_sum_of_leaf_prices(specs in garment_specs()) {
        let (tree, _) = build_tree(&specs);
        let expected: i64 = specs.iter().map(|s| s.price_cents).sum();
        prop_assert_eq!(
            tree.total_price(tree.root_id()).unwrap(),
            Decimal::new(expected, 2)
        );
    }

    /// Piece counts add up across nesting levels.
    #[test]
    fn prop_piece_count_is_sum_of_leaf_pieces(specs in garment_specs()) {
        let (tree, _) = build_tree(&specs);
        let expected: u32 = specs.iter().map(|s| s.pieces).sum();
        prop_assert_eq!(tree.piece_count(tree.root_id()).unwrap(), expected);
    }

    /// The flattened reference list preserves insertion order depth-first.
    #[test]
    fn prop_reference_list_preserves_order(specs in garment_specs()) {
        let (tree, expected) = build_tree(&specs);
        prop_assert_eq!(tree.reference_list(tree.root_id()).unwrap(), expected);
    }

    /// A bundle is available exactly when every garment in it is.
    #[test]
    fn prop_availability_is_conjunction(specs in garment_specs()) {
        let (tree, _) = build_tree(&specs);
        let expected = specs.iter().all(|s| s.available);
        prop_assert_eq!(tree.is_available(tree.root_id()).unwrap(), expected);
    }

    /// Laundry need is a disjunction, laundry priority the maximum.
    #[test]
    fn prop_laundry_or_and_max(specs in garment_specs()) {
        let (tree, _) = build_tree(&specs);
        let any_dirty = specs.iter().any(|s| s.needs_laundry);
        let max_priority = specs.iter().map(|s| s.priority).max().unwrap_or(0);
        prop_assert_eq!(tree.needs_laundry(tree.root_id()).unwrap(), any_dirty);
        prop_assert_eq!(tree.laundry_priority(tree.root_id()).unwrap(), max_priority);
    }

    /// Marking rented then available flips every garment and reports the
    /// garment count both times.
    #[test]
    fn prop_mark_cycle_touches_every_garment(specs in garment_specs()) {
        let (mut tree, _) = build_tree(&specs);
        let root = tree.root_id();
        prop_assert_eq!(tree.mark_rented(root).unwrap(), specs.len());
        prop_assert!(!tree.is_available(root).unwrap());
        prop_assert_eq!(tree.mark_available(root).unwrap(), specs.len());
        prop_assert!(tree.is_available(root).unwrap());
    }

    /// Re-attaching a garment that already hangs somewhere in the tree is
    /// rejected structurally and leaves the tree unchanged.
    #[test]
    fn prop_reattach_is_rejected_and_harmless(specs in garment_specs()) {
        let (mut tree, expected) = build_tree(&specs);
        let root = tree.root_id();
        let leaf = tree.find_by_reference(root, "R-0").unwrap().unwrap();
        let err = tree.add_child(root, leaf).unwrap_err();
        prop_assert!(err.is_structural());
        prop_assert_eq!(tree.reference_list(root).unwrap(), expected);
    }

    /// Serialize/restore keeps ids, names and the reference list intact.
    #[test]
    fn prop_round_trip_preserves_structure(specs in garment_specs()) {
        let (tree, expected) = build_tree(&specs);
        let root = tree.root_id();
        let encoded = tree.snapshot(root).unwrap().to_json().unwrap();
        let restored =
            EnsembleTree::from_snapshot(ComponentSnapshot::from_json(encoded).unwrap()).unwrap();
        let restored_root = restored.root_id();
        prop_assert_eq!(restored.reference_list(restored_root).unwrap(), expected);
        prop_assert_eq!(
            restored.node(restored_root).unwrap().id.as_str(),
            tree.node(root).unwrap().id.as_str()
        );
        prop_assert_eq!(
            &restored.node(restored_root).unwrap().name,
            &tree.node(root).unwrap().name
        );
        prop_assert_eq!(restored.node_count(), tree.node_count());
    }
}
