//! Unit and strategy records.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::attributes::AttributeVector;
use crate::error::{AdvisorError, ConfigError};

/// A selectable unit type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    /// Unique identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Attribute profile.
    pub attributes: AttributeVector,
}

/// A candidate strategy and the profile it rewards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Strategy {
    /// Unique identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Ideal army profile for this strategy.
    #[serde(rename = "ideal_attributes", alias = "ideal")]
    pub ideal: AttributeVector,
}

/// Units indexed by identifier, in catalog order.
#[derive(Debug, Clone, Default)]
pub struct UnitCatalog {
    units: Vec<Unit>,
    index: HashMap<String, usize>,
}

impl UnitCatalog {
    /// Build a catalog.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::DuplicateUnit`] if two units share an id.
    pub fn new(units: Vec<Unit>) -> Result<Self, ConfigError> {
        let mut index = HashMap::with_capacity(units.len());
        for (i, unit) in units.iter().enumerate() {
            if index.insert(unit.id.clone(), i).is_some() {
                return Err(ConfigError::DuplicateUnit(unit.id.clone()));
            }
        }
        Ok(Self { units, index })
    }

    /// Look up a unit by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Unit> {
        self.index.get(id).map(|&i| &self.units[i])
    }

    /// Look up a unit by id, failing with [`AdvisorError::UnitNotFound`].
    ///
    /// # Errors
    ///
    /// Returns an error if no unit has this id.
    pub fn lookup(&self, id: &str) -> Result<&Unit, AdvisorError> {
        self.get(id)
            .ok_or_else(|| AdvisorError::UnitNotFound(id.to_string()))
    }

    /// Whether a unit with this id exists.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// All units in catalog order.
    #[must_use]
    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    /// Number of units.
    #[must_use]
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Whether the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}
