//! Bidirectional unit/environment affinity.
//!
//! Some units have strategies that suit them naturally, and those
//! strategies work better or worse depending on where and when the battle
//! happens. An affinity of `1.0` pulls the strategy closer (bonus), `0.0`
//! pushes it away (malus) and `0.5` is neutral.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Neutral affinity.
pub const NEUTRAL_AFFINITY: f64 = 0.5;

/// Default cap on a single unit's distance adjustment.
pub const DEFAULT_MAX_ADJUSTMENT: f64 = 0.1;

const fn neutral() -> f64 {
    NEUTRAL_AFFINITY
}

const fn default_max_adjustment() -> f64 {
    DEFAULT_MAX_ADJUSTMENT
}

/// Strategies a unit is naturally suited to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyAffinity {
    /// Strategy ids that receive environment adjustments for this unit.
    #[serde(default)]
    pub natural_strategies: Vec<String>,
    /// Largest adjustment this unit can contribute.
    #[serde(default = "default_max_adjustment")]
    pub max_adjustment: f64,
}

/// Per-environment affinity scores for one unit.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EnvironmentAffinity {
    /// Terrain name to affinity in `[0, 1]`.
    #[serde(default)]
    pub terrain: HashMap<String, f64>,
    /// Weather name to affinity in `[0, 1]`.
    #[serde(default)]
    pub weather: HashMap<String, f64>,
}

/// Relative weight of terrain and weather when combining affinities.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentWeights {
    /// Weight of the terrain affinity.
    #[serde(default = "neutral")]
    pub terrain: f64,
    /// Weight of the weather affinity.
    #[serde(default = "neutral")]
    pub weather: f64,
}

impl Default for EnvironmentWeights {
    fn default() -> Self {
        Self {
            terrain: 0.5,
            weather: 0.5,
        }
    }
}

/// The full affinity configuration (`unit_affinities.json`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AffinityConfig {
    /// Natural strategies per unit.
    #[serde(default)]
    pub unit_strategy_affinity: HashMap<String, StrategyAffinity>,
    /// Environment affinities per unit.
    #[serde(default)]
    pub environment_affinity: HashMap<String, EnvironmentAffinity>,
    /// Terrain/weather weights per unit.
    #[serde(default)]
    pub environment_weights: HashMap<String, EnvironmentWeights>,
    /// Affinity used when a unit has no entry for the active environment.
    #[serde(default = "neutral")]
    pub default_affinity: f64,
    /// Weights used when a unit has no weights of its own.
    #[serde(default)]
    pub default_weights: EnvironmentWeights,
}

impl Default for AffinityConfig {
    fn default() -> Self {
        Self {
            unit_strategy_affinity: HashMap::new(),
            environment_affinity: HashMap::new(),
            environment_weights: HashMap::new(),
            default_affinity: NEUTRAL_AFFINITY,
            default_weights: EnvironmentWeights::default(),
        }
    }
}

impl AffinityConfig {
    /// Check value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidAffinity`] for an affinity outside
    /// `[0, 1]`, an environment weight (per-unit or default) outside
    /// `[0, 1]`, or a negative or non-finite `max_adjustment`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let check = |unit: &str, field: String, value: f64, ok: bool| {
            if ok {
                Ok(())
            } else {
                Err(ConfigError::InvalidAffinity {
                    unit: unit.to_string(),
                    field,
                    value,
                })
            }
        };
        let in_unit_range = |v: f64| (0.0..=1.0).contains(&v);

        check(
            "default",
            "default_affinity".to_string(),
            self.default_affinity,
            in_unit_range(self.default_affinity),
        )?;

        for (unit, strategy) in &self.unit_strategy_affinity {
            let v = strategy.max_adjustment;
            check(unit.as_str(), "max_adjustment".to_string(), v, v.is_finite() && v >= 0.0)?;
        }

        for (unit, env) in &self.environment_affinity {
            for (name, &v) in &env.terrain {
                check(unit.as_str(), format!("terrain.{name}"), v, in_unit_range(v))?;
            }
            for (name, &v) in &env.weather {
                check(unit.as_str(), format!("weather.{name}"), v, in_unit_range(v))?;
            }
        }

        let weights = std::iter::once(("default", &self.default_weights)).chain(
            self.environment_weights
                .iter()
                .map(|(unit, weights)| (unit.as_str(), weights)),
        );
        for (unit, weights) in weights {
            for (field, v) in [("terrain", weights.terrain), ("weather", weights.weather)] {
                check(unit, format!("weights.{field}"), v, in_unit_range(v))?;
            }
            if (weights.terrain + weights.weather - 1.0).abs() > 1e-6 {
                log::warn!(
                    "environment weights for {unit} sum to {}",
                    weights.terrain + weights.weather
                );
            }
        }

        Ok(())
    }

    /// Unit ids mentioned anywhere in the configuration.
    pub fn referenced_units(&self) -> impl Iterator<Item = &str> + '_ {
        self.unit_strategy_affinity
            .keys()
            .chain(self.environment_affinity.keys())
            .chain(self.environment_weights.keys())
            .map(String::as_str)
    }

    /// Terrain/weather weights for a unit, falling back to the defaults.
    #[must_use]
    pub fn weights_for(&self, unit_id: &str) -> EnvironmentWeights {
        self.environment_weights
            .get(unit_id)
            .copied()
            .unwrap_or(self.default_weights)
    }

    /// Combined environment affinity of a unit, in `[0, 1]` for sane weights.
    #[must_use]
    pub fn environment_affinity(
        &self,
        unit_id: &str,
        terrain: Option<&str>,
        weather: Option<&str>,
    ) -> f64 {
        let env = self.environment_affinity.get(unit_id);
        let terrain_affinity = env
            .zip(terrain)
            .and_then(|(env, name)| env.terrain.get(name).copied())
            .unwrap_or(self.default_affinity);
        let weather_affinity = env
            .zip(weather)
            .and_then(|(env, name)| env.weather.get(name).copied())
            .unwrap_or(self.default_affinity);
        let weights = self.weights_for(unit_id);
        terrain_affinity * weights.terrain + weather_affinity * weights.weather
    }

    /// Adjustment one unit contributes to a strategy's distance, or `None`
    /// if the strategy is not natural for that unit.
    #[must_use]
    pub fn unit_adjustment(
        &self,
        unit_id: &str,
        strategy_id: &str,
        terrain: Option<&str>,
        weather: Option<&str>,
    ) -> Option<f64> {
        let strategy = self.unit_strategy_affinity.get(unit_id)?;
        if !strategy.natural_strategies.iter().any(|s| s == strategy_id) {
            return None;
        }
        let affinity = self.environment_affinity(unit_id, terrain, weather);
        Some((NEUTRAL_AFFINITY - affinity) * 2.0 * strategy.max_adjustment)
    }
}

/// Signed distance correction for `strategy_id` given the selected units.
///
/// Negative values favour the strategy. Units without an affinity for the
/// strategy still count in the denominator, diluting the average.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn compute_adjustment<S: AsRef<str>>(
    unit_ids: &[S],
    strategy_id: &str,
    terrain: Option<&str>,
    weather: Option<&str>,
    config: Option<&AffinityConfig>,
) -> f64 {
    let Some(config) = config else {
        return 0.0;
    };
    if unit_ids.is_empty() {
        return 0.0;
    }

    let mut total = 0.0;
    let mut qualifying = 0usize;
    for id in unit_ids {
        if let Some(adjustment) = config.unit_adjustment(id.as_ref(), strategy_id, terrain, weather)
        {
            total += adjustment;
            qualifying += 1;
        }
    }

    if qualifying == 0 {
        return 0.0;
    }
    total / unit_ids.len() as f64
}
