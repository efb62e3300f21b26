//! Convenience re-exports covering the whole public surface.
//!
//! ```ignore
//! use trousseau::prelude::*;
//! ```

// Entry points
pub use crate::registry::EnsembleRegistry;
pub use crate::types::{Operation, OperationOutcome, RegistryStats, RootSummary, SearchHit};

// Assembly
pub use crate::types::{EnsembleBuilder, EnsembleConfig, EnsembleTree};

// Component contract
pub use crate::types::{
    ComponentId, ComponentInfo, ComponentKind, ComponentSnapshot, EnsembleCategory,
    EnsembleStats, NodeId, ValidationReport,
};

// Garments
pub use crate::types::{GarmentCatalog, GarmentLookup, GarmentSnapshot};

// Error handling
pub use trousseau_core::{Error, Result};

// Money and ad-hoc JSON
pub use rust_decimal::Decimal;
pub use serde_json::json;
