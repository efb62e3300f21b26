//! Unified error types for the composite engine.
//!
//! One canonical error enum covers the whole engine: tree mutation, builder
//! resolution, snapshot decoding, and registry lifecycle. Every mutation-path
//! error is raised synchronously and leaves the tree in its pre-call state;
//! the single documented exception is the partial-append behavior of batch
//! garment resolution (see `EnsembleBuilder::add_garments`).

use crate::types::ComponentId;
use thiserror::Error;

/// All composite-engine errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Error {
    /// A child with the same component id is already attached
    #[error("duplicate child: component '{0}' is already a child of this ensemble")]
    DuplicateChild(ComponentId),

    /// Attaching the component would make it its own ancestor
    #[error("cyclic reference: component '{0}' is an ancestor of the target ensemble")]
    CyclicReference(ComponentId),

    /// Component not present (stale handle, or no child with that id)
    #[error("component not found: {0}")]
    ComponentNotFound(String),

    /// The garment lookup collaborator did not resolve a reference
    #[error("garment not found for reference '{0}'")]
    GarmentNotFound(String),

    /// Structural validation failed; carries the complete error list
    #[error("invalid ensemble: {}", errors.join("; "))]
    InvalidBundle {
        /// Every validation message, aggregated in one pass
        errors: Vec<String>,
    },

    /// No registered root tree with that id
    #[error("ensemble not found in registry: '{0}'")]
    BundleNotFound(String),

    /// Children can only be attached to composite nodes
    #[error("component '{0}' is a garment leaf and cannot hold children")]
    NotComposite(ComponentId),

    /// A component belongs to exactly one ensemble at a time
    #[error("component '{0}' is already attached to another ensemble")]
    ChildAlreadyAttached(ComponentId),

    /// Root ids are unique across the registry
    #[error("an ensemble with root id '{0}' is already registered")]
    DuplicateRoot(String),

    /// Builder operation without an ensemble in progress
    #[error("no ensemble in progress; call start() first")]
    NoActiveBuild,

    /// Malformed serialized tree
    #[error("snapshot error: {0}")]
    Snapshot(String),
}

/// Result type for composite-engine operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Check if this is a not-found error (component, garment, or root).
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::ComponentNotFound(_) | Error::GarmentNotFound(_) | Error::BundleNotFound(_)
        )
    }

    /// Check if this error was raised by a rejected tree mutation.
    ///
    /// Structural errors always leave the tree unchanged.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Error::DuplicateChild(_)
                | Error::CyclicReference(_)
                | Error::NotComposite(_)
                | Error::ChildAlreadyAttached(_)
        )
    }

    /// Check if this error carries an aggregated validation report.
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::InvalidBundle { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_bundle_joins_messages() {
        let err = Error::InvalidBundle {
            errors: vec![
                "ensemble must have at least one child".to_string(),
                "component id must not be empty".to_string(),
            ],
        };
        let text = err.to_string();
        assert!(text.contains("at least one child"));
        assert!(text.contains("; "));
    }

    #[test]
    fn test_predicates() {
        assert!(Error::GarmentNotFound("REF-1".into()).is_not_found());
        assert!(Error::DuplicateChild(ComponentId::new("a")).is_structural());
        assert!(Error::InvalidBundle { errors: vec![] }.is_validation());
        assert!(!Error::NoActiveBuild.is_structural());
    }

    #[test]
    fn test_display_carries_ids() {
        let err = Error::CyclicReference(ComponentId::new("conj-raiz"));
        assert!(err.to_string().contains("conj-raiz"));
    }
}
