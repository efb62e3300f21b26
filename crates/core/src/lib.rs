//! Core types for the garment composite engine
//!
//! This crate defines the vocabulary shared by the tree engine and the
//! registry facade:
//! - [`ComponentId`]: identity of a node in an ensemble tree
//! - [`GarmentSnapshot`] / [`GarmentLookup`]: attach-time garment resolution
//! - [`Error`]: the full error taxonomy, with a shared [`Result`] alias
//! - [`ValidationReport`]: aggregated structural validation findings

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod garment;
pub mod types;

pub use error::{Error, Result};
pub use garment::{GarmentCatalog, GarmentLookup, GarmentSnapshot};
pub use types::{ComponentId, ComponentKind, EnsembleCategory, ValidationReport};
