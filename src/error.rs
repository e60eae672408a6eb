//! Error types for the recommendation engine.
//!
//! Two layers: [`ConfigError`] is raised while a [`Dataset`](crate::Dataset)
//! is being built and is fatal for the process, [`AdvisorError`] is what a
//! single request can fail with.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::attributes::Attribute;

/// Malformed or missing configuration data.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A data file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// A data file is not valid JSON or has the wrong shape.
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        /// File that failed.
        path: PathBuf,
        /// Underlying parse error.
        #[source]
        source: serde_json::Error,
    },
    /// Two units share the same identifier.
    #[error("duplicate unit id: {0}")]
    DuplicateUnit(String),
    /// Two strategies share the same identifier.
    #[error("duplicate strategy id: {0}")]
    DuplicateStrategy(String),
    /// A catalog attribute lies outside `[0, 1]`.
    #[error("attribute {attribute} of {owner} out of range: {value}")]
    AttributeOutOfRange {
        /// Unit or strategy id.
        owner: String,
        /// Offending attribute.
        attribute: Attribute,
        /// Offending value.
        value: f64,
    },
    /// A modifier table entry is structurally invalid.
    #[error("invalid modifier {key:?} in {table} condition {condition:?}: {reason}")]
    InvalidModifier {
        /// Table group (`terrain`, `weather`, `troop_status`).
        table: &'static str,
        /// Condition name.
        condition: String,
        /// Entry key.
        key: String,
        /// What is wrong with it.
        reason: String,
    },
    /// An affinity value is outside its allowed range.
    #[error("invalid affinity for {unit}: {field} = {value}")]
    InvalidAffinity {
        /// Unit id (or `default` for config-wide values).
        unit: String,
        /// Field that failed.
        field: String,
        /// Offending value.
        value: f64,
    },
}

/// Errors surfaced by the engine entry points.
#[derive(Debug, Error)]
pub enum AdvisorError {
    /// Empty selection or malformed request shape.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// A request referenced a unit id that is not in the catalog.
    #[error("unit not found: {0}")]
    UnitNotFound(String),
    /// Configuration is unusable.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl AdvisorError {
    /// Whether the error was caused by the caller's input rather than by
    /// the configuration.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidInput(_) | Self::UnitNotFound(_))
    }
}

/// Result type for engine operations.
pub type AdvisorResult<T> = Result<T, AdvisorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_error_classification() {
        assert!(AdvisorError::InvalidInput("empty".into()).is_client_error());
        assert!(AdvisorError::UnitNotFound("ghost".into()).is_client_error());
        assert!(!AdvisorError::Config(ConfigError::DuplicateUnit("a".into())).is_client_error());
    }

    #[test]
    fn test_error_display() {
        let err = ConfigError::AttributeOutOfRange {
            owner: "archers".into(),
            attribute: Attribute::RangePower,
            value: 1.5,
        };
        let msg = format!("{err}");
        assert!(msg.contains("archers"));
        assert!(msg.contains("U7_range_power"));
        assert!(msg.contains("1.5"));

        let err = AdvisorError::UnitNotFound("ghost".into());
        assert_eq!(format!("{err}"), "unit not found: ghost");
    }
}
