//! Modifier tables and their JSON form.
//!
//! On disk a table is three nested objects:
//!
//! ```json
//! {
//!   "terrain":      { "Forest": { "U3_mobility": 0.7, "U4_stealth": "CRITICAL" } },
//!   "weather":      { "Fog":    { "U7_range_power": 0.6 } },
//!   "troop_status": { "Tired":  { "ALL": 0.85 } }
//! }
//! ```
//!
//! Entry order matters (it decides warning order), so objects are read as
//! ordered entry lists rather than hash maps.

use std::collections::HashSet;
use std::fmt;
use std::marker::PhantomData;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};

use crate::attributes::Attribute;
use crate::error::ConfigError;

/// Key that applies a troop-status factor to every attribute.
pub const ALL_KEY: &str = "ALL";

/// Token marking a conditional penalty.
pub const CRITICAL_TOKEN: &str = "CRITICAL";

/// One of the three condition groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConditionKind {
    /// Ground the battle is fought on.
    Terrain,
    /// Weather during the battle.
    Weather,
    /// State of the troops.
    TroopStatus,
}

impl ConditionKind {
    /// All kinds, in application order.
    pub const ALL: [ConditionKind; 3] = [
        ConditionKind::Terrain,
        ConditionKind::Weather,
        ConditionKind::TroopStatus,
    ];

    /// Key of this group in `modifiers.json`.
    #[must_use]
    pub const fn table_name(self) -> &'static str {
        match self {
            Self::Terrain => "terrain",
            Self::Weather => "weather",
            Self::TroopStatus => "troop_status",
        }
    }
}

impl fmt::Display for ConditionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Terrain => f.write_str("terrain"),
            Self::Weather => f.write_str("weather"),
            Self::TroopStatus => f.write_str("troop status"),
        }
    }
}

/// How an entry changes its target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Modifier {
    /// Unconditional multiplier.
    Factor(f64),
    /// Halve the attribute only if it is below the critical threshold.
    Critical,
}

/// What an entry applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModifierTarget {
    /// A single attribute.
    Attribute(Attribute),
    /// Every attribute (troop status only).
    All,
}

impl ModifierTarget {
    /// Key of this target in `modifiers.json`.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Attribute(attribute) => attribute.key(),
            Self::All => ALL_KEY,
        }
    }
}

/// One `(target, modifier)` entry of a condition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Effect {
    /// Attribute (or all attributes) affected.
    pub target: ModifierTarget,
    /// The change applied.
    pub modifier: Modifier,
}

/// A named condition and its effects, in table order.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    /// Human-readable condition name, also the lookup key.
    pub name: String,
    /// Effects in application order.
    pub effects: Vec<Effect>,
}

impl Condition {
    /// Create a condition.
    #[must_use]
    pub fn new(name: impl Into<String>, effects: Vec<Effect>) -> Self {
        Self {
            name: name.into(),
            effects,
        }
    }
}

/// Terrain, weather and troop-status tables.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(try_from = "RawModifierTable")]
pub struct ModifierTable {
    terrain: Vec<Condition>,
    weather: Vec<Condition>,
    troop_status: Vec<Condition>,
}

impl ModifierTable {
    /// Build a validated table.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidModifier`] if `ALL` appears outside the
    /// troop-status group, if `ALL` is combined with `CRITICAL`, if a
    /// condition name repeats within a group, or if a target appears twice
    /// in one condition.
    pub fn new(
        terrain: Vec<Condition>,
        weather: Vec<Condition>,
        troop_status: Vec<Condition>,
    ) -> Result<Self, ConfigError> {
        let table = Self {
            terrain,
            weather,
            troop_status,
        };
        for kind in ConditionKind::ALL {
            table.validate_group(kind)?;
        }
        Ok(table)
    }

    fn validate_group(&self, kind: ConditionKind) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for condition in self.conditions(kind) {
            let invalid = |key: &str, reason: &str| ConfigError::InvalidModifier {
                table: kind.table_name(),
                condition: condition.name.clone(),
                key: key.to_string(),
                reason: reason.to_string(),
            };
            if !seen.insert(condition.name.as_str()) {
                return Err(invalid("", "duplicate condition name"));
            }
            let mut targets = HashSet::new();
            for effect in &condition.effects {
                if !targets.insert(effect.target) {
                    return Err(invalid(effect.target.key(), "duplicate entry"));
                }
                match (effect.target, effect.modifier) {
                    (ModifierTarget::All, _) if kind != ConditionKind::TroopStatus => {
                        return Err(invalid(ALL_KEY, "only valid in troop_status"));
                    }
                    (ModifierTarget::All, Modifier::Critical) => {
                        return Err(invalid(ALL_KEY, "cannot be CRITICAL"));
                    }
                    (_, Modifier::Factor(f)) if !f.is_finite() => {
                        return Err(invalid("", "factor must be finite"));
                    }
                    _ => {}
                }
            }
        }
        Ok(())
    }

    /// Conditions of one group, in table order.
    #[must_use]
    pub fn conditions(&self, kind: ConditionKind) -> &[Condition] {
        match kind {
            ConditionKind::Terrain => &self.terrain,
            ConditionKind::Weather => &self.weather,
            ConditionKind::TroopStatus => &self.troop_status,
        }
    }

    /// Find a condition by exact name.
    #[must_use]
    pub fn condition(&self, kind: ConditionKind, name: &str) -> Option<&Condition> {
        self.conditions(kind).iter().find(|c| c.name == name)
    }

    /// Total number of conditions across all groups.
    #[must_use]
    pub fn len(&self) -> usize {
        self.terrain.len() + self.weather.len() + self.troop_status.len()
    }

    /// Whether every group is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A JSON object read as an ordered list of entries.
#[derive(Debug)]
struct OrderedEntries<V>(Vec<(String, V)>);

impl<V> Default for OrderedEntries<V> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for OrderedEntries<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(OrderedEntriesVisitor(PhantomData))
    }
}

struct OrderedEntriesVisitor<V>(PhantomData<V>);

impl<'de, V: Deserialize<'de>> Visitor<'de> for OrderedEntriesVisitor<V> {
    type Value = OrderedEntries<V>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a JSON object")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
        while let Some(entry) = map.next_entry::<String, V>()? {
            entries.push(entry);
        }
        Ok(OrderedEntries(entries))
    }
}

/// A modifier value as written: a number or a token.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawModifier {
    Factor(f64),
    Token(String),
}

type RawGroup = OrderedEntries<OrderedEntries<RawModifier>>;

#[derive(Debug, Default, Deserialize)]
struct RawModifierTable {
    #[serde(default)]
    terrain: RawGroup,
    #[serde(default)]
    weather: RawGroup,
    #[serde(default)]
    troop_status: RawGroup,
}

impl TryFrom<RawModifierTable> for ModifierTable {
    type Error = ConfigError;

    fn try_from(raw: RawModifierTable) -> Result<Self, Self::Error> {
        Self::new(
            convert_group(ConditionKind::Terrain, raw.terrain)?,
            convert_group(ConditionKind::Weather, raw.weather)?,
            convert_group(ConditionKind::TroopStatus, raw.troop_status)?,
        )
    }
}

fn convert_group(kind: ConditionKind, group: RawGroup) -> Result<Vec<Condition>, ConfigError> {
    group
        .0
        .into_iter()
        .map(|(name, entries)| {
            let effects = entries
                .0
                .into_iter()
                .map(|(key, value)| convert_effect(kind, &name, key, value))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Condition::new(name, effects))
        })
        .collect()
}

fn convert_effect(
    kind: ConditionKind,
    condition: &str,
    key: String,
    value: RawModifier,
) -> Result<Effect, ConfigError> {
    let invalid = |key: String, reason: String| ConfigError::InvalidModifier {
        table: kind.table_name(),
        condition: condition.to_string(),
        key,
        reason,
    };

    let target = if key == ALL_KEY {
        ModifierTarget::All
    } else if let Some(attribute) = Attribute::from_key(&key) {
        ModifierTarget::Attribute(attribute)
    } else {
        return Err(invalid(key, "unknown attribute".to_string()));
    };

    let modifier = match value {
        RawModifier::Factor(f) => Modifier::Factor(f),
        RawModifier::Token(token) if token == CRITICAL_TOKEN => Modifier::Critical,
        RawModifier::Token(token) => {
            return Err(invalid(key, format!("unexpected token {token:?}")));
        }
    };

    Ok(Effect { target, modifier })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_preserves_order() {
        let json = r#"{
            "terrain": {
                "Mountains": {"U3_mobility": 0.5, "U6_terrain_adapt": "CRITICAL"},
                "Forest": {"U4_stealth": 1.3}
            },
            "troop_status": {"Exhausted": {"ALL": 0.8, "U5_discipline": "CRITICAL"}}
        }"#;
        let table: ModifierTable = serde_json::from_str(json).unwrap();

        let names: Vec<_> = table
            .conditions(ConditionKind::Terrain)
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(names, ["Mountains", "Forest"]);
        assert!(table.conditions(ConditionKind::Weather).is_empty());
        assert_eq!(table.len(), 3);

        let mountains = table.condition(ConditionKind::Terrain, "Mountains").unwrap();
        assert_eq!(
            mountains.effects[1],
            Effect {
                target: ModifierTarget::Attribute(Attribute::TerrainAdapt),
                modifier: Modifier::Critical,
            }
        );

        let exhausted = table.condition(ConditionKind::TroopStatus, "Exhausted").unwrap();
        assert_eq!(exhausted.effects[0].target, ModifierTarget::All);
    }

    #[test]
    fn test_all_outside_troop_status_rejected() {
        let json = r#"{"weather": {"Storm": {"ALL": 0.9}}}"#;
        let err = serde_json::from_str::<ModifierTable>(json).unwrap_err();
        assert!(err.to_string().contains("only valid in troop_status"));
    }

    #[test]
    fn test_all_critical_rejected() {
        let json = r#"{"troop_status": {"Routed": {"ALL": "CRITICAL"}}}"#;
        assert!(serde_json::from_str::<ModifierTable>(json).is_err());
    }

    #[test]
    fn test_unknown_attribute_and_token_rejected() {
        let json = r#"{"terrain": {"Swamp": {"U9_morale": 0.5}}}"#;
        let err = serde_json::from_str::<ModifierTable>(json).unwrap_err();
        assert!(err.to_string().contains("unknown attribute"));

        let json = r#"{"terrain": {"Swamp": {"U3_mobility": "SEVERE"}}}"#;
        let err = serde_json::from_str::<ModifierTable>(json).unwrap_err();
        assert!(err.to_string().contains("SEVERE"));
    }

    #[test]
    fn test_duplicate_condition_rejected() {
        let result = ModifierTable::new(
            vec![Condition::new("Plains", vec![]), Condition::new("Plains", vec![])],
            vec![],
            vec![],
        );
        assert!(matches!(result, Err(ConfigError::InvalidModifier { .. })));
    }

    #[test]
    fn test_duplicate_entry_rejected() {
        let json = r#"{"terrain": {"Hills": {"U3_mobility": 0.5, "U3_mobility": 0.8}}}"#;
        let err = serde_json::from_str::<ModifierTable>(json).unwrap_err();
        assert!(err.to_string().contains("duplicate entry"));

        let all_twice = Condition::new(
            "Tired",
            vec![
                Effect {
                    target: ModifierTarget::All,
                    modifier: Modifier::Factor(0.9),
                },
                Effect {
                    target: ModifierTarget::All,
                    modifier: Modifier::Factor(0.8),
                },
            ],
        );
        let result = ModifierTable::new(vec![], vec![], vec![all_twice]);
        assert!(matches!(
            result,
            Err(ConfigError::InvalidModifier { ref key, .. }) if key == ALL_KEY
        ));
    }

    #[test]
    fn test_all_and_single_attribute_may_combine() {
        let json = r#"{"troop_status": {"Veteran": {"ALL": 1.05, "U5_discipline": 1.2}}}"#;
        let table: ModifierTable = serde_json::from_str(json).unwrap();
        assert_eq!(table.condition(ConditionKind::TroopStatus, "Veteran").unwrap().effects.len(), 2);
    }

    #[test]
    fn test_integer_factor_accepted() {
        let json = r#"{"terrain": {"Road": {"U3_mobility": 2}}}"#;
        let table: ModifierTable = serde_json::from_str(json).unwrap();
        let road = table.condition(ConditionKind::Terrain, "Road").unwrap();
        assert!(matches!(road.effects[0].modifier, Modifier::Factor(f) if (f - 2.0).abs() < 1e-12));
    }
}
