//! Core types for the composite engine
//!
//! This module defines the fundamental types used throughout the system:
//! - [`ComponentId`]: Unique string identifier for tree components
//! - [`ComponentKind`]: The two component shapes (garment leaf / ensemble)
//! - [`EnsembleCategory`]: Well-known ensemble categories
//! - [`ValidationReport`]: Aggregated result of a structural integrity check

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// Unique identifier for a tree component
///
/// Component ids are plain strings: garment leaves inherit the id of the
/// garment record they wrap, ensembles get a caller-supplied or generated id.
/// Ids must be unique within a single tree; the registry additionally
/// enforces uniqueness of root ids at registration time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComponentId(String);

impl ComponentId {
    /// Create an id from an existing string
    pub fn new(id: impl Into<String>) -> Self {
        ComponentId(id.into())
    }

    /// Generate a fresh id with the given prefix, e.g. `ensemble-<uuid>`
    ///
    /// # Examples
    ///
    /// ```
    /// use trousseau_core::ComponentId;
    ///
    /// let id1 = ComponentId::generate("ensemble");
    /// let id2 = ComponentId::generate("ensemble");
    /// assert_ne!(id1, id2);
    /// assert!(id1.as_str().starts_with("ensemble-"));
    /// ```
    pub fn generate(prefix: &str) -> Self {
        ComponentId(format!("{}-{}", prefix, Uuid::new_v4()))
    }

    /// View the id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the id is the empty string (rejected by validation)
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for ComponentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ComponentId {
    fn from(s: &str) -> Self {
        ComponentId(s.to_string())
    }
}

impl From<String> for ComponentId {
    fn from(s: String) -> Self {
        ComponentId(s)
    }
}

impl AsRef<str> for ComponentId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// The two component shapes of the composite tree
///
/// Wire names follow the serialized `tipo` tag: a garment leaf is `simple`,
/// an ensemble is `composite`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComponentKind {
    /// Terminal node wrapping one garment snapshot
    #[serde(rename = "simple")]
    Garment,
    /// Composite node aggregating child components
    #[serde(rename = "composite")]
    Ensemble,
}

impl ComponentKind {
    /// Canonical wire name (`simple` / `composite`)
    pub fn wire_name(&self) -> &'static str {
        match self {
            ComponentKind::Garment => "simple",
            ComponentKind::Ensemble => "composite",
        }
    }
}

impl std::fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.wire_name())
    }
}

/// Well-known ensemble categories
///
/// Stored in root metadata under the `tipo` key and serialized with the
/// catalog's historical tokens (`novias`, `gala`, `casual`, `formal`,
/// `tematico`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnsembleCategory {
    /// Bridal sets (dress, veil, accessories)
    #[serde(rename = "novias")]
    Bridal,
    /// Evening and gala wear
    #[serde(rename = "gala")]
    Gala,
    /// Everyday casual sets
    #[serde(rename = "casual")]
    Casual,
    /// Business and ceremony formal wear
    #[serde(rename = "formal")]
    Formal,
    /// Costume and themed sets
    #[serde(rename = "tematico")]
    Themed,
}

impl EnsembleCategory {
    /// Canonical wire token for this category
    pub fn wire_token(&self) -> &'static str {
        match self {
            EnsembleCategory::Bridal => "novias",
            EnsembleCategory::Gala => "gala",
            EnsembleCategory::Casual => "casual",
            EnsembleCategory::Formal => "formal",
            EnsembleCategory::Themed => "tematico",
        }
    }
}

impl std::fmt::Display for EnsembleCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.wire_token())
    }
}

impl FromStr for EnsembleCategory {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "novias" => Ok(EnsembleCategory::Bridal),
            "gala" => Ok(EnsembleCategory::Gala),
            "casual" => Ok(EnsembleCategory::Casual),
            "formal" => Ok(EnsembleCategory::Formal),
            "tematico" => Ok(EnsembleCategory::Themed),
            other => Err(Error::Snapshot(format!(
                "unknown ensemble category '{}'",
                other
            ))),
        }
    }
}

/// Aggregated result of a structural integrity check
///
/// Validation never short-circuits: one pass surfaces every problem found at
/// every level of the tree, so `errors` may carry messages from deeply nested
/// children, each prefixed with the child index and id on the path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// True when no structural error was found
    pub valid: bool,
    /// Every problem found, in discovery order
    pub errors: Vec<String>,
}

impl ValidationReport {
    /// Build a report from collected error messages
    pub fn from_errors(errors: Vec<String>) -> Self {
        ValidationReport {
            valid: errors.is_empty(),
            errors,
        }
    }

    /// Report with no findings
    pub fn ok() -> Self {
        ValidationReport {
            valid: true,
            errors: Vec::new(),
        }
    }

    /// Whether the checked subtree is structurally sound
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Convert into a `Result`, surfacing the full error list on failure
    pub fn into_result(self) -> Result<()> {
        if self.valid {
            Ok(())
        } else {
            Err(Error::InvalidBundle {
                errors: self.errors,
            })
        }
    }
}
