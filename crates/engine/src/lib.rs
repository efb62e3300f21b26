//! Composite tree engine for garment ensembles
//!
//! This crate implements the recursive core: arena-backed trees whose nodes
//! are either garment leaves or nested ensembles, with uniform aggregation
//! (price, pieces, availability, laundry state), id-based structural
//! invariants, aggregated validation, structure-preserving serialization
//! and a fluent builder.
//!
//! The registry that owns root trees and the concurrency discipline around
//! them live in the facade crate; everything here is synchronous and
//! single-threaded.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod arena;
pub mod builder;
pub mod node;
pub mod query;
pub mod render;
pub mod snapshot;
pub mod tree;
pub mod validate;

pub use arena::{Arena, NodeId};
pub use builder::{EnsembleBuilder, EnsembleConfig};
pub use node::{Node, NodeKind};
pub use query::{ComponentInfo, EnsembleStats};
pub use snapshot::ComponentSnapshot;
pub use tree::EnsembleTree;
