//! Garment snapshots and the lookup collaborator seam.
//!
//! The engine never talks to persistence directly. A [`GarmentLookup`]
//! implementation resolves rental references to [`GarmentSnapshot`] records,
//! and the engine copies the snapshot into the tree at attach time. After
//! that point the tree is decoupled from the lookup: flag changes (rented,
//! laundry) happen on the snapshot copy, never on live garment data.
//!
//! [`GarmentCatalog`] is the bundled in-memory implementation, used by tests
//! and by callers that preload garment data from an upstream service.

use crate::types::ComponentId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

fn one_piece() -> u32 {
    1
}

/// Attach-time copy of one garment record.
///
/// Field values come from the lookup collaborator; `available`,
/// `needs_laundry` and `laundry_priority` are the only fields the engine
/// mutates afterwards (rental state and laundry marking).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GarmentSnapshot {
    /// Persistence id of the garment; becomes the leaf's component id
    pub id: String,
    /// Rental reference code, e.g. `VN-2024-001`
    #[serde(rename = "referencia")]
    pub reference: String,
    /// Display name
    #[serde(rename = "nombre")]
    pub name: String,
    /// Color description
    pub color: String,
    /// Size label (`S`, `M`, `42`, ...)
    #[serde(rename = "talla")]
    pub size: String,
    /// Rental price per service, exact decimal
    #[serde(rename = "precioAlquiler")]
    pub rental_price: Decimal,
    /// Piece count for multi-piece garments (suit + waistcoat counts 2)
    #[serde(rename = "piezas", default = "one_piece")]
    pub pieces: u32,
    /// Whether the garment can currently be rented
    #[serde(rename = "disponible")]
    pub available: bool,
    /// Whether the garment is waiting for laundry
    #[serde(rename = "requiereLavado")]
    pub needs_laundry: bool,
    /// Base laundry priority, aggregated by max across ensembles
    #[serde(rename = "prioridadLavado")]
    pub laundry_priority: u8,
}

impl GarmentSnapshot {
    /// Create a snapshot with the mandatory identity fields.
    ///
    /// Remaining fields start at rentable defaults (available, clean,
    /// priority 0, one piece, zero price) and are set with the `with_*`
    /// builders.
    pub fn new(
        id: impl Into<String>,
        reference: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        GarmentSnapshot {
            id: id.into(),
            reference: reference.into(),
            name: name.into(),
            color: String::new(),
            size: String::new(),
            rental_price: Decimal::ZERO,
            pieces: 1,
            available: true,
            needs_laundry: false,
            laundry_priority: 0,
        }
    }

    /// Set the color.
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    /// Set the size label.
    pub fn with_size(mut self, size: impl Into<String>) -> Self {
        self.size = size.into();
        self
    }

    /// Set the rental price.
    pub fn with_price(mut self, price: Decimal) -> Self {
        self.rental_price = price;
        self
    }

    /// Set the piece count (multi-piece garments).
    pub fn with_pieces(mut self, pieces: u32) -> Self {
        self.pieces = pieces;
        self
    }

    /// Set initial availability.
    pub fn with_available(mut self, available: bool) -> Self {
        self.available = available;
        self
    }

    /// Set the initial laundry flag.
    pub fn with_needs_laundry(mut self, needs_laundry: bool) -> Self {
        self.needs_laundry = needs_laundry;
        self
    }

    /// Set the base laundry priority.
    pub fn with_laundry_priority(mut self, priority: u8) -> Self {
        self.laundry_priority = priority;
        self
    }

    /// Component id a leaf wrapping this snapshot will carry.
    pub fn component_id(&self) -> ComponentId {
        ComponentId::new(self.id.clone())
    }
}

/// Resolution seam between the engine and garment persistence.
///
/// The builder resolves every reference through this trait exactly once, at
/// attach time. Returning `None` surfaces as `Error::GarmentNotFound` in the
/// builder.
pub trait GarmentLookup {
    /// Resolve a rental reference to a garment snapshot.
    fn find_by_reference(&self, reference: &str) -> Option<GarmentSnapshot>;
}

/// In-memory garment catalog keyed by rental reference.
///
/// The natural lookup implementation for tests and for callers that preload
/// garment data. Inserting a snapshot with an existing reference replaces
/// the previous entry.
#[derive(Debug, Clone, Default)]
pub struct GarmentCatalog {
    garments: HashMap<String, GarmentSnapshot>,
}

impl GarmentCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        GarmentCatalog {
            garments: HashMap::new(),
        }
    }

    /// Insert a snapshot, keyed by its reference.
    ///
    /// Returns the replaced snapshot when the reference was already present.
    pub fn insert(&mut self, snapshot: GarmentSnapshot) -> Option<GarmentSnapshot> {
        self.garments.insert(snapshot.reference.clone(), snapshot)
    }

    /// Number of cataloged garments.
    pub fn len(&self) -> usize {
        self.garments.len()
    }

    /// Whether the catalog holds no garments.
    pub fn is_empty(&self) -> bool {
        self.garments.is_empty()
    }

    /// All known references, sorted for deterministic listings.
    pub fn references(&self) -> Vec<String> {
        let mut refs: Vec<String> = self.garments.keys().cloned().collect();
        refs.sort();
        refs
    }
}

impl GarmentLookup for GarmentCatalog {
    fn find_by_reference(&self, reference: &str) -> Option<GarmentSnapshot> {
        self.garments.get(reference).cloned()
    }
}

impl FromIterator<GarmentSnapshot> for GarmentCatalog {
    fn from_iter<I: IntoIterator<Item = GarmentSnapshot>>(iter: I) -> Self {
        let mut catalog = GarmentCatalog::new();
        for snapshot in iter {
            catalog.insert(snapshot);
        }
        catalog
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dress() -> GarmentSnapshot {
        GarmentSnapshot::new("g-001", "VN-001", "Vestido de novia")
            .with_color("blanco")
            .with_size("M")
            .with_price(Decimal::new(30000, 2))
            .with_laundry_priority(8)
    }

    #[test]
    fn test_snapshot_defaults() {
        let g = GarmentSnapshot::new("g-1", "R-1", "Guantes");
        assert!(g.available);
        assert!(!g.needs_laundry);
        assert_eq!(g.pieces, 1);
        assert_eq!(g.rental_price, Decimal::ZERO);
    }

    #[test]
    fn test_catalog_lookup_returns_copy() {
        let catalog: GarmentCatalog = [dress()].into_iter().collect();
        let found = catalog.find_by_reference("VN-001").unwrap();
        assert_eq!(found.name, "Vestido de novia");
        assert_eq!(found.rental_price, Decimal::new(30000, 2));
        assert!(catalog.find_by_reference("VN-999").is_none());
    }

    #[test]
    fn test_catalog_insert_replaces_by_reference() {
        let mut catalog = GarmentCatalog::new();
        assert!(catalog.insert(dress()).is_none());
        let replaced = catalog.insert(dress().with_color("marfil"));
        assert_eq!(replaced.unwrap().color, "blanco");
        assert_eq!(catalog.len(), 1);
        assert_eq!(
            catalog.find_by_reference("VN-001").unwrap().color,
            "marfil"
        );
    }

    #[test]
    fn test_snapshot_wire_names() {
        let json = serde_json::to_value(dress()).unwrap();
        assert_eq!(json["referencia"], "VN-001");
        assert_eq!(json["talla"], "M");
        assert_eq!(json["precioAlquiler"], "300.00");
        assert_eq!(json["prioridadLavado"], 8);
        // piezas defaults to 1 when absent from older payloads
        let legacy = serde_json::json!({
            "id": "g-2",
            "referencia": "R-2",
            "nombre": "Chaleco",
            "color": "gris",
            "talla": "L",
            "precioAlquiler": "45.00",
            "disponible": true,
            "requiereLavado": false,
            "prioridadLavado": 2
        });
        let parsed: GarmentSnapshot = serde_json::from_value(legacy).unwrap();
        assert_eq!(parsed.pieces, 1);
    }
}
