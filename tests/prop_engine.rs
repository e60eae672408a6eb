//! Property-based tests for the recommendation engine.
//!
//! These tests verify aggregation, modifier and ranking invariants.
//! Run with: cargo test --release prop_engine

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::cast_precision_loss, clippy::float_cmp)]

use proptest::prelude::*;

use war_advisor::affinity::{AffinityConfig, EnvironmentAffinity, StrategyAffinity};
use war_advisor::modifiers::{Condition, Effect, Modifier, ModifierTarget};
use war_advisor::ranking::MAX_DISTANCE;
use war_advisor::{
    ATTRIBUTE_COUNT, Attribute, AttributeVector, Conditions, ModifierTable, Strategy as BattleStrategy,
    Unit, UnitCatalog, aggregate, apply_modifiers, compute_adjustment, rank,
};

fn vector() -> impl Strategy<Value = AttributeVector> {
    prop::array::uniform8(0.0f64..=1.0).prop_map(AttributeVector::new)
}

fn effect() -> impl Strategy<Value = Effect> {
    let target = prop_oneof![
        (0..ATTRIBUTE_COUNT).prop_map(|i| ModifierTarget::Attribute(Attribute::ALL[i])),
        Just(ModifierTarget::All),
    ];
    let modifier = prop_oneof![
        3 => (0.0f64..3.0).prop_map(Modifier::Factor),
        1 => Just(Modifier::Critical),
    ];
    (target, modifier)
        .prop_map(|(target, modifier)| match (target, modifier) {
            // CRITICAL only applies to a single attribute.
            (ModifierTarget::All, Modifier::Critical) => Effect {
                target: ModifierTarget::Attribute(Attribute::Discipline),
                modifier,
            },
            (target, modifier) => Effect { target, modifier },
        })
}

/// Keep the first entry per target; a condition may name each target once.
fn unique_targets(effects: Vec<Effect>) -> Vec<Effect> {
    let mut seen = Vec::new();
    effects
        .into_iter()
        .filter(|e| {
            let fresh = !seen.contains(&e.target);
            seen.push(e.target);
            fresh
        })
        .collect()
}

fn attribute_only(effects: Vec<Effect>) -> Vec<Effect> {
    unique_targets(
        effects
            .into_iter()
            .map(|e| match e.target {
                ModifierTarget::All => Effect {
                    target: ModifierTarget::Attribute(Attribute::Attack),
                    ..e
                },
                ModifierTarget::Attribute(_) => e,
            })
            .collect(),
    )
}

fn strategy(id: String, ideal: AttributeVector) -> BattleStrategy {
    BattleStrategy {
        id,
        name: String::new(),
        description: String::new(),
        ideal,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    /// The army profile is the per-attribute mean of its units.
    #[test]
    fn prop_aggregate_is_mean(vectors in prop::collection::vec(vector(), 1..8)) {
        let units: Vec<Unit> = vectors
            .iter()
            .enumerate()
            .map(|(i, v)| Unit {
                id: format!("u{i}"),
                name: format!("Unit {i}"),
                description: String::new(),
                attributes: *v,
            })
            .collect();
        let ids: Vec<String> = units.iter().map(|u| u.id.clone()).collect();
        let catalog = UnitCatalog::new(units).unwrap();

        let army = aggregate(&ids, &catalog).unwrap();
        prop_assert!(army.is_normalized());
        for attribute in Attribute::ALL {
            let expected: f64 =
                vectors.iter().map(|v| v[attribute]).sum::<f64>() / vectors.len() as f64;
            prop_assert!((army[attribute] - expected).abs() < 1e-9);
        }
    }

    /// Modified profiles always stay inside the unit hypercube.
    #[test]
    fn prop_modifiers_clamp(
        army in vector(),
        terrain in prop::collection::vec(effect(), 0..6),
        weather in prop::collection::vec(effect(), 0..6),
        status in prop::collection::vec(effect(), 0..6),
    ) {
        let table = ModifierTable::new(
            vec![Condition::new("T", attribute_only(terrain))],
            vec![Condition::new("W", attribute_only(weather))],
            vec![Condition::new("S", unique_targets(status))],
        )
        .unwrap();
        let conditions = Conditions {
            terrain: Some("T"),
            weather: Some("W"),
            troop_status: Some("S"),
        };
        let before = army;
        let modified = apply_modifiers(&army, &conditions, &table);
        prop_assert!(modified.vector.is_normalized());
        prop_assert_eq!(army, before);
    }

    /// Rankings are sorted and every score is in range.
    #[test]
    fn prop_ranking_sorted_and_bounded(
        army in vector(),
        ideals in prop::collection::vec(vector(), 0..12),
    ) {
        let strategies: Vec<BattleStrategy> = ideals
            .into_iter()
            .enumerate()
            .map(|(i, v)| strategy(format!("s{i}"), v))
            .collect();
        let ranked = rank(&army, &strategies, None);
        prop_assert_eq!(ranked.len(), strategies.len());
        prop_assert!(ranked.windows(2).all(|w| w[0].distance <= w[1].distance));
        for r in &ranked {
            prop_assert!(r.distance >= 0.0 && r.distance <= MAX_DISTANCE + 1e-4);
            prop_assert!((0.0..=100.0).contains(&r.compatibility));
        }
    }

    /// The affinity correction never exceeds the largest per-unit cap.
    #[test]
    fn prop_affinity_bounded(
        max_adjustment in 0.0f64..0.5,
        terrain_affinity in 0.0f64..=1.0,
        weather_affinity in 0.0f64..=1.0,
        qualifying in 1usize..5,
        others in 0usize..5,
    ) {
        let mut config = AffinityConfig::default();
        config.unit_strategy_affinity.insert(
            "scouts".into(),
            StrategyAffinity {
                natural_strategies: vec!["ambush".into()],
                max_adjustment,
            },
        );
        config.environment_affinity.insert(
            "scouts".into(),
            EnvironmentAffinity {
                terrain: [("Forest".to_string(), terrain_affinity)].into(),
                weather: [("Fog".to_string(), weather_affinity)].into(),
            },
        );

        let mut units = vec!["scouts"; qualifying];
        units.extend(std::iter::repeat_n("militia", others));

        let adjustment = compute_adjustment(&units, "ambush", Some("Forest"), Some("Fog"), Some(&config));
        prop_assert!(adjustment.abs() <= max_adjustment + 1e-12);
        prop_assert_eq!(
            compute_adjustment(&units, "siege", Some("Forest"), Some("Fog"), Some(&config)),
            0.0
        );
    }
}
