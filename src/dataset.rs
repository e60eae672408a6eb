//! The configuration snapshot every computation reads from.
//!
//! A [`Dataset`] is loaded once (from a directory of JSON files or from
//! in-memory parts), validated, and then only ever borrowed.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::affinity::AffinityConfig;
use crate::attributes::AttributeVector;
use crate::catalog::{Strategy, Unit, UnitCatalog};
use crate::error::ConfigError;
use crate::modifiers::{ConditionKind, ModifierTable};

/// Unit catalog file.
pub const UNITS_FILE: &str = "units.json";
/// Strategy catalog file.
pub const STRATEGIES_FILE: &str = "strategies.json";
/// Modifier table file.
pub const MODIFIERS_FILE: &str = "modifiers.json";
/// Optional affinity file.
pub const AFFINITIES_FILE: &str = "unit_affinities.json";

#[derive(Deserialize)]
struct UnitsFile {
    units: Vec<Unit>,
}

#[derive(Deserialize)]
struct StrategiesFile {
    strategies: Vec<Strategy>,
}

/// A unit as offered to a front end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitOption {
    /// Unit id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Description.
    pub description: String,
}

/// A terrain, weather or troop status as offered to a front end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConditionOption {
    /// Slug of the name.
    pub id: String,
    /// Condition name, as used in requests.
    pub name: String,
}

/// Lowercase a name and replace spaces with underscores.
#[must_use]
pub fn slugify(name: &str) -> String {
    name.to_lowercase().replace(' ', "_")
}

/// Validated, read-only configuration.
#[derive(Debug, Clone)]
pub struct Dataset {
    units: UnitCatalog,
    strategies: Vec<Strategy>,
    modifiers: ModifierTable,
    affinity: Option<AffinityConfig>,
}

impl Dataset {
    /// Build a dataset from in-memory parts.
    ///
    /// # Errors
    ///
    /// Returns an error for duplicate ids, catalog attributes outside
    /// `[0, 1]`, or out-of-range affinity values.
    pub fn new(
        units: Vec<Unit>,
        strategies: Vec<Strategy>,
        modifiers: ModifierTable,
        affinity: Option<AffinityConfig>,
    ) -> Result<Self, ConfigError> {
        for unit in &units {
            check_range(&unit.id, &unit.attributes)?;
        }

        let mut seen = HashSet::with_capacity(strategies.len());
        for strategy in &strategies {
            if !seen.insert(strategy.id.as_str()) {
                return Err(ConfigError::DuplicateStrategy(strategy.id.clone()));
            }
            check_range(&strategy.id, &strategy.ideal)?;
        }

        let units = UnitCatalog::new(units)?;

        if let Some(config) = &affinity {
            config.validate()?;
            for unit_id in config.referenced_units() {
                if !units.contains(unit_id) {
                    log::warn!("affinity configuration mentions unknown unit {unit_id:?}");
                }
            }
        }

        Ok(Self {
            units,
            strategies,
            modifiers,
            affinity,
        })
    }

    /// Load every data file from `dir`.
    ///
    /// `unit_affinities.json` is optional; the other three are required.
    ///
    /// # Errors
    ///
    /// Returns an error if a required file is missing, any file fails to
    /// parse, or the assembled dataset fails validation.
    pub fn load(dir: &Path) -> Result<Self, ConfigError> {
        let units: UnitsFile = read_json(&dir.join(UNITS_FILE))?;
        let strategies: StrategiesFile = read_json(&dir.join(STRATEGIES_FILE))?;
        let modifiers: ModifierTable = read_json(&dir.join(MODIFIERS_FILE))?;

        let affinity_path = dir.join(AFFINITIES_FILE);
        let affinity = if affinity_path.exists() {
            Some(read_json::<AffinityConfig>(&affinity_path)?)
        } else {
            log::debug!("no {} in {}", AFFINITIES_FILE, dir.display());
            None
        };

        let dataset = Self::new(units.units, strategies.strategies, modifiers, affinity)?;
        log::info!(
            "loaded {} units, {} strategies, {} conditions from {}",
            dataset.units.len(),
            dataset.strategies.len(),
            dataset.modifiers.len(),
            dir.display()
        );
        Ok(dataset)
    }

    /// Unit catalog.
    #[must_use]
    pub fn units(&self) -> &UnitCatalog {
        &self.units
    }

    /// Strategy catalog, in file order.
    #[must_use]
    pub fn strategies(&self) -> &[Strategy] {
        &self.strategies
    }

    /// Modifier tables.
    #[must_use]
    pub fn modifiers(&self) -> &ModifierTable {
        &self.modifiers
    }

    /// Affinity configuration, if one was supplied.
    #[must_use]
    pub fn affinity(&self) -> Option<&AffinityConfig> {
        self.affinity.as_ref()
    }

    /// Units for a selection list.
    #[must_use]
    pub fn unit_options(&self) -> Vec<UnitOption> {
        self.units
            .units()
            .iter()
            .map(|u| UnitOption {
                id: u.id.clone(),
                name: u.name.clone(),
                description: u.description.clone(),
            })
            .collect()
    }

    /// Conditions of one group for a selection list, in table order.
    #[must_use]
    pub fn condition_options(&self, kind: ConditionKind) -> Vec<ConditionOption> {
        self.modifiers
            .conditions(kind)
            .iter()
            .map(|c| ConditionOption {
                id: slugify(&c.name),
                name: c.name.clone(),
            })
            .collect()
    }
}

fn check_range(owner: &str, vector: &AttributeVector) -> Result<(), ConfigError> {
    match vector.iter().find(|(_, v)| !(0.0..=1.0).contains(v)) {
        Some((attribute, value)) => Err(ConfigError::AttributeOutOfRange {
            owner: owner.to_string(),
            attribute,
            value,
        }),
        None => Ok(()),
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
