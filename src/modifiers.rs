//! Contextual modifiers: terrain, weather and troop status.
//!
//! Conditions are applied in a fixed order (terrain, then weather, then troop
//! status). Multipliers compose, so the order is observable; values are only
//! clamped to `[0, 1]` once all three stages have run.

mod table;

pub use table::{
    ALL_KEY, CRITICAL_TOKEN, Condition, ConditionKind, Effect, Modifier, ModifierTable,
    ModifierTarget,
};

use std::fmt;

use serde::{Serialize, Serializer};

use crate::attributes::{Attribute, AttributeVector};

/// Values strictly below this are penalised by a `CRITICAL` entry.
pub const CRITICAL_THRESHOLD: f64 = 0.5;

/// Multiplier applied by a triggered `CRITICAL` entry.
pub const CRITICAL_PENALTY: f64 = 0.5;

/// The conditions of one request. `None` skips that stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Conditions<'a> {
    /// Terrain name.
    pub terrain: Option<&'a str>,
    /// Weather name.
    pub weather: Option<&'a str>,
    /// Troop status name.
    pub troop_status: Option<&'a str>,
}

impl<'a> Conditions<'a> {
    /// No conditions at all.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            terrain: None,
            weather: None,
            troop_status: None,
        }
    }

    /// Condition name for one group.
    #[must_use]
    pub const fn get(&self, kind: ConditionKind) -> Option<&'a str> {
        match kind {
            ConditionKind::Terrain => self.terrain,
            ConditionKind::Weather => self.weather,
            ConditionKind::TroopStatus => self.troop_status,
        }
    }
}

/// A `CRITICAL` entry that fired.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CriticalWarning {
    /// Penalised attribute.
    pub attribute: Attribute,
    /// Name of the condition that carried the entry.
    pub condition: String,
    /// Group the condition belongs to.
    pub kind: ConditionKind,
}

impl fmt::Display for CriticalWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CRITICAL: {} in {} (value < {CRITICAL_THRESHOLD}) - penalty applied",
            self.attribute, self.condition
        )
    }
}

impl Serialize for CriticalWarning {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Output of [`apply_modifiers`].
#[derive(Debug, Clone, PartialEq)]
pub struct ModifiedProfile {
    /// Clamped profile after all conditions.
    pub vector: AttributeVector,
    /// Triggered `CRITICAL` entries, in application order.
    pub warnings: Vec<CriticalWarning>,
}

/// Apply the named conditions to `vector`.
///
/// Unknown condition names are ignored. The input is not modified.
#[must_use]
pub fn apply_modifiers(
    vector: &AttributeVector,
    conditions: &Conditions<'_>,
    table: &ModifierTable,
) -> ModifiedProfile {
    let mut warnings = Vec::new();
    let raw = ConditionKind::ALL.into_iter().fold(*vector, |current, kind| {
        apply_stage(current, kind, conditions.get(kind), table, &mut warnings)
    });

    ModifiedProfile {
        vector: raw.clamped(),
        warnings,
    }
}

/// Apply one condition group. Returns the unclamped result.
fn apply_stage(
    vector: AttributeVector,
    kind: ConditionKind,
    name: Option<&str>,
    table: &ModifierTable,
    warnings: &mut Vec<CriticalWarning>,
) -> AttributeVector {
    let Some(name) = name else {
        return vector;
    };
    let Some(condition) = table.condition(kind, name) else {
        log::debug!("ignoring unknown {kind} {name:?}");
        return vector;
    };

    log::debug!("applying {kind} {name:?} ({} entries)", condition.effects.len());
    condition
        .effects
        .iter()
        .fold(vector, |current, effect| match (effect.target, effect.modifier) {
            (ModifierTarget::All, Modifier::Factor(factor)) => current.scale(factor),
            (ModifierTarget::Attribute(attribute), Modifier::Factor(factor)) => {
                current.scale_attribute(attribute, factor)
            }
            (ModifierTarget::Attribute(attribute), Modifier::Critical) => {
                if current[attribute] < CRITICAL_THRESHOLD {
                    warnings.push(CriticalWarning {
                        attribute,
                        condition: condition.name.clone(),
                        kind,
                    });
                    current.scale_attribute(attribute, CRITICAL_PENALTY)
                } else {
                    current
                }
            }
            // Rejected when the table is built.
            (ModifierTarget::All, Modifier::Critical) => current,
        })
}
