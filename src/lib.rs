//! # Trousseau
//!
//! In-memory composite engine for garment-rental ensembles.
//!
//! Rental shops hire garments out one by one or as curated ensembles
//! (bridal looks, gala outfits, themed costumes), and ensembles nest:
//! a bridal look may contain an accessories set which contains the veil.
//! Trousseau models all of it through one component contract, so pricing,
//! availability, laundry state and piece counts are answered the same way
//! for a single garment and for an arbitrarily deep tree.
//!
//! - **Uniform components**: one node type covers garments and ensembles;
//!   every aggregate is computed recursively over the tree.
//! - **Guarded composition**: duplicate children, cycles and child stealing
//!   are rejected at attach time, and whole trees re-validate on demand.
//! - **Catalog-driven assembly**: [`EnsembleBuilder`] resolves garment
//!   references against a [`GarmentLookup`] and hands back validated trees.
//! - **Concurrent registry**: [`EnsembleRegistry`] owns finished roots
//!   behind per-root locks and dispatches uniform operations on them.
//! - **Stable wire shape**: every tree serializes to tagged JSON
//!   (`"tipo": "simple" | "composite"`) and loads back unchanged.
//!
//! ## Quick Start
//!
//! ```
//! use trousseau::prelude::*;
//!
//! fn main() -> Result<()> {
//!     // Rentable garments, keyed by reference.
//!     let catalog: GarmentCatalog = [
//!         GarmentSnapshot::new("prenda-1", "VN-001", "Vestido de novia")
//!             .with_price(Decimal::new(30000, 2)),
//!         GarmentSnapshot::new("prenda-2", "VE-001", "Velo largo")
//!             .with_price(Decimal::new(5000, 2)),
//!     ]
//!     .into_iter()
//!     .collect();
//!
//!     // Assemble an ensemble against the catalog.
//!     let mut builder = EnsembleBuilder::new(&catalog);
//!     builder.start(EnsembleConfig::new("Novia clasica").with_category(EnsembleCategory::Bridal));
//!     builder.add_garments(&["VN-001", "VE-001"])?;
//!     let tree = builder.build()?;
//!
//!     // Register the root and run uniform operations against it.
//!     let registry = EnsembleRegistry::new();
//!     let root_id = registry.register(tree)?;
//!     assert_eq!(
//!         registry.execute(&root_id, Operation::Price)?,
//!         OperationOutcome::Price(Decimal::new(35000, 2)),
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - `trousseau-core`: component ids, garment snapshots, the catalog
//!   lookup contract and the error taxonomy.
//! - `trousseau-engine`: arena-backed ensemble trees with aggregation,
//!   validation, rendering, wire snapshots and the builder.
//! - `trousseau` (this crate): the registry facade and operation dispatch.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod registry;
mod types;

pub mod prelude;

// Registry facade
pub use registry::EnsembleRegistry;
pub use types::{Operation, OperationOutcome, RegistryStats, RootSummary, SearchHit};

// Component contract
pub use types::{ComponentId, ComponentKind, EnsembleCategory, ValidationReport};

// Garment catalog
pub use types::{GarmentCatalog, GarmentLookup, GarmentSnapshot};

// Tree engine
pub use types::{
    ComponentInfo, ComponentSnapshot, EnsembleBuilder, EnsembleConfig, EnsembleStats,
    EnsembleTree, NodeId,
};

// Error handling
pub use trousseau_core::{Error, Result};
