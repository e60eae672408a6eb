//! Batch evaluation of many scenarios.
//!
//! Scenarios are plain [`Request`]s. They can be read from a JSON array or
//! generated from a seed; either way a batch is deterministic and its
//! results come back in scenario order, even though they are computed in
//! parallel.

use std::collections::HashMap;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rayon::prelude::*;
use serde::Serialize;

use crate::advisor::{Advisor, Recommendation, Request};
use crate::dataset::Dataset;
use crate::error::{AdvisorError, AdvisorResult};
use crate::modifiers::ConditionKind;

/// Parameters for random scenario generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RandomBatchConfig {
    /// Number of scenarios.
    pub tests: usize,
    /// Distinct units per scenario.
    pub units_per_test: usize,
    /// Pick a random weather for each scenario.
    pub include_weather: bool,
    /// Pick a random troop status for each scenario.
    pub include_troop_status: bool,
    /// RNG seed.
    pub seed: u64,
}

impl Default for RandomBatchConfig {
    fn default() -> Self {
        Self {
            tests: 10,
            units_per_test: 1,
            include_weather: false,
            include_troop_status: false,
            seed: 42,
        }
    }
}

/// Generate random scenarios from the dataset's catalogs.
///
/// Units are sampled without replacement; one terrain is always picked
/// (unless the terrain table is empty).
///
/// # Errors
///
/// Returns [`AdvisorError::InvalidInput`] if `tests` is zero or
/// `units_per_test` is not in `1..=catalog size`.
pub fn random_scenarios(
    dataset: &Dataset,
    config: &RandomBatchConfig,
) -> AdvisorResult<Vec<Request>> {
    let unit_ids: Vec<&str> = dataset.units().units().iter().map(|u| u.id.as_str()).collect();
    if config.tests == 0 {
        return Err(AdvisorError::InvalidInput(
            "number of tests must be greater than 0".to_string(),
        ));
    }
    if config.units_per_test == 0 || config.units_per_test > unit_ids.len() {
        return Err(AdvisorError::InvalidInput(format!(
            "units per test must be between 1 and {}",
            unit_ids.len()
        )));
    }

    let terrains = condition_names(dataset, ConditionKind::Terrain);
    let weathers = condition_names(dataset, ConditionKind::Weather);
    let statuses = condition_names(dataset, ConditionKind::TroopStatus);

    let mut rng = StdRng::seed_from_u64(config.seed);
    let scenarios = (0..config.tests)
        .map(|_| {
            let units = unit_ids
                .choose_multiple(&mut rng, config.units_per_test)
                .map(|id| (*id).to_string())
                .collect();
            let terrain = terrains.choose(&mut rng).map(|s| (*s).to_string());
            let weather = if config.include_weather {
                weathers.choose(&mut rng).map(|s| (*s).to_string())
            } else {
                None
            };
            let troop_status = if config.include_troop_status {
                statuses.choose(&mut rng).map(|s| (*s).to_string())
            } else {
                None
            };
            Request {
                units,
                terrain,
                weather,
                troop_status,
            }
        })
        .collect();

    Ok(scenarios)
}

fn condition_names(dataset: &Dataset, kind: ConditionKind) -> Vec<&str> {
    dataset
        .modifiers()
        .conditions(kind)
        .iter()
        .map(|c| c.name.as_str())
        .collect()
}

/// Evaluate every scenario. Results are in scenario order.
#[must_use]
pub fn run_batch(
    advisor: &Advisor<'_>,
    scenarios: &[Request],
) -> Vec<AdvisorResult<Recommendation>> {
    scenarios
        .par_iter()
        .map(|request| advisor.recommend(request))
        .collect()
}

/// How often one strategy came out on top.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrategyCount {
    /// Strategy id.
    pub id: String,
    /// Strategy display name.
    pub name: String,
    /// Number of scenarios it won.
    pub count: usize,
    /// Share of all scenarios, in percent.
    pub percentage: f64,
}

/// Aggregate view of a batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchSummary {
    /// Scenarios evaluated.
    pub tests: usize,
    /// Scenarios that failed.
    pub failures: usize,
    /// Scenarios whose ranking was empty.
    pub without_strategy: usize,
    /// Top strategies, most frequent first.
    pub top_strategies: Vec<StrategyCount>,
}

impl BatchSummary {
    /// Summarise batch results.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_results(results: &[AdvisorResult<Recommendation>]) -> Self {
        let mut summary = Self {
            tests: results.len(),
            ..Self::default()
        };
        let mut index: HashMap<&str, usize> = HashMap::new();

        for result in results {
            let Ok(recommendation) = result else {
                summary.failures += 1;
                continue;
            };
            let Some(top) = recommendation.top_strategy() else {
                summary.without_strategy += 1;
                continue;
            };
            let id = top.strategy.id.as_str();
            let slot = *index.entry(id).or_insert_with(|| {
                summary.top_strategies.push(StrategyCount {
                    id: id.to_string(),
                    name: top.strategy.name.clone(),
                    count: 0,
                    percentage: 0.0,
                });
                summary.top_strategies.len() - 1
            });
            summary.top_strategies[slot].count += 1;
        }

        if summary.tests > 0 {
            for entry in &mut summary.top_strategies {
                entry.percentage = entry.count as f64 / summary.tests as f64 * 100.0;
            }
        }
        summary.top_strategies.sort_by(|a, b| b.count.cmp(&a.count));
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::AttributeVector;
    use crate::catalog::{Strategy, Unit};
    use crate::modifiers::ModifierTable;

    fn dataset() -> Dataset {
        let units = [("a", 0.2), ("b", 0.4), ("c", 0.6), ("d", 0.8)]
            .into_iter()
            .map(|(id, value)| Unit {
                id: id.to_string(),
                name: id.to_uppercase(),
                description: String::new(),
                attributes: AttributeVector::splat(value),
            })
            .collect();
        let strategies = vec![
            Strategy {
                id: "low".into(),
                name: "Low".into(),
                description: String::new(),
                ideal: AttributeVector::splat(0.2),
            },
            Strategy {
                id: "high".into(),
                name: "High".into(),
                description: String::new(),
                ideal: AttributeVector::splat(0.8),
            },
        ];
        let modifiers: ModifierTable = serde_json::from_str(
            r#"{
                "terrain": {"Hills": {"U3_mobility": 0.8}, "Plains": {"U3_mobility": 1.1}},
                "weather": {"Rain": {"U7_range_power": 0.7}},
                "troop_status": {"Fresh": {"ALL": 1.05}}
            }"#,
        )
        .unwrap();
        Dataset::new(units, strategies, modifiers, None).unwrap()
    }

    #[test]
    fn test_random_scenarios_deterministic() {
        let dataset = dataset();
        let config = RandomBatchConfig {
            tests: 20,
            units_per_test: 3,
            include_weather: true,
            include_troop_status: false,
            seed: 7,
        };
        let first = random_scenarios(&dataset, &config).unwrap();
        let second = random_scenarios(&dataset, &config).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 20);

        for scenario in &first {
            let mut units = scenario.units.clone();
            units.sort();
            units.dedup();
            assert_eq!(units.len(), 3, "units must be distinct");
            assert!(scenario.terrain.is_some());
            assert_eq!(scenario.weather.as_deref(), Some("Rain"));
            assert!(scenario.troop_status.is_none());
        }
    }

    #[test]
    fn test_random_scenarios_validates_counts() {
        let dataset = dataset();
        let too_many = RandomBatchConfig {
            units_per_test: 5,
            ..RandomBatchConfig::default()
        };
        assert!(matches!(
            random_scenarios(&dataset, &too_many),
            Err(AdvisorError::InvalidInput(_))
        ));
        let none = RandomBatchConfig {
            tests: 0,
            ..RandomBatchConfig::default()
        };
        assert!(random_scenarios(&dataset, &none).is_err());
    }

    #[test]
    fn test_run_batch_preserves_order() {
        let dataset = dataset();
        let advisor = Advisor::new(&dataset);
        let scenarios = vec![
            Request::new(["a"]),
            Request::new(["ghost"]),
            Request::new(["d"]),
            Request::new(["a", "b"]),
        ];
        let results = run_batch(&advisor, &scenarios);
        assert_eq!(results.len(), 4);
        assert_eq!(results[0].as_ref().unwrap().top_strategy().unwrap().strategy.id, "low");
        assert!(results[1].is_err());
        assert_eq!(results[2].as_ref().unwrap().top_strategy().unwrap().strategy.id, "high");

        let summary = BatchSummary::from_results(&results);
        assert_eq!(summary.tests, 4);
        assert_eq!(summary.failures, 1);
        assert_eq!(summary.top_strategies[0].id, "low");
        assert_eq!(summary.top_strategies[0].count, 2);
        assert!((summary.top_strategies[0].percentage - 50.0).abs() < 1e-9);
        assert_eq!(summary.top_strategies[1].id, "high");
    }

    #[test]
    fn test_summary_ties_keep_first_appearance() {
        let dataset = dataset();
        let advisor = Advisor::new(&dataset);
        let results = run_batch(&advisor, &[Request::new(["d"]), Request::new(["a"])]);
        let summary = BatchSummary::from_results(&results);
        let ids: Vec<_> = summary.top_strategies.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["high", "low"]);
    }
}
