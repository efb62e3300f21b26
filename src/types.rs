//! Public types for the trousseau unified API.
//!
//! This module defines the registry-level operation types and re-exports
//! the component vocabulary from the internal crates with a clean public
//! interface.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// Component vocabulary
pub use trousseau_core::ComponentId;
pub use trousseau_core::ComponentKind;
pub use trousseau_core::EnsembleCategory;
pub use trousseau_core::ValidationReport;

// Garment resolution seam
pub use trousseau_core::{GarmentCatalog, GarmentLookup, GarmentSnapshot};

// Tree types
pub use trousseau_engine::{ComponentInfo, ComponentSnapshot, EnsembleStats, EnsembleTree, NodeId};

// Construction
pub use trousseau_engine::{EnsembleBuilder, EnsembleConfig};

/// Operation dispatched against one registered root.
///
/// Wire names follow the surrounding system's conventions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    /// Aggregate the rental price of the whole tree.
    #[serde(rename = "calcularPrecio")]
    Price,
    /// Check whether the whole tree can be rented.
    #[serde(rename = "verificarDisponibilidad")]
    CheckAvailability,
    /// Mark every garment in the tree as rented out.
    #[serde(rename = "marcarAlquilado")]
    MarkRented,
    /// Mark every garment in the tree as available.
    #[serde(rename = "marcarDisponible")]
    MarkAvailable,
    /// Flag every garment in the tree for laundry.
    #[serde(rename = "enviarLavado")]
    SendToLaundry,
}

impl Operation {
    /// Wire token of this operation.
    pub fn wire_name(&self) -> &'static str {
        match self {
            Operation::Price => "calcularPrecio",
            Operation::CheckAvailability => "verificarDisponibilidad",
            Operation::MarkRented => "marcarAlquilado",
            Operation::MarkAvailable => "marcarDisponible",
            Operation::SendToLaundry => "enviarLavado",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// Typed result of [`Operation`] dispatch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum OperationOutcome {
    /// Aggregated rental price.
    Price(Decimal),
    /// Whether the tree is rentable as a unit.
    Availability(bool),
    /// Number of garments marked as rented.
    MarkedRented(usize),
    /// Number of garments marked as available.
    MarkedAvailable(usize),
    /// Number of garments flagged for laundry.
    SentToLaundry(usize),
}

/// One garment found by a registry-wide reference search.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    /// Root the garment hangs under.
    pub root_id: String,
    /// Component id of the leaf inside that root.
    pub component_id: ComponentId,
    /// Copy of the garment record.
    pub garment: GarmentSnapshot,
}

/// One registered root, condensed for listings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RootSummary {
    /// Root component id, the registry key.
    pub root_id: String,
    /// Ensemble display name.
    pub name: String,
    /// Category token from the root's metadata, when present.
    pub category: Option<String>,
    /// Nodes in the tree.
    pub components: usize,
    /// Physical pieces in the tree.
    pub pieces: u32,
    /// Aggregated rental price.
    pub total_price: Decimal,
    /// Whether the whole ensemble is rentable.
    pub available: bool,
    /// Whether any garment waits for laundry.
    pub needs_laundry: bool,
}

/// Aggregate statistics over every registered root.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegistryStats {
    /// Registered roots.
    pub roots: usize,
    /// Nodes across all trees.
    pub total_components: usize,
    /// Physical pieces across all trees.
    pub total_pieces: u32,
    /// Summed rental price across all trees.
    pub total_price: Decimal,
    /// Roots currently rentable as a unit.
    pub available_roots: usize,
    /// Roots with laundry pending.
    pub roots_needing_laundry: usize,
    /// Mean direct-children count per root.
    pub average_children_per_root: f64,
}
