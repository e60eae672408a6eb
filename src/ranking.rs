//! Strategy ranking by distance in attribute space.
//!
//! Each strategy's ideal profile is compared to the army profile with the
//! Euclidean distance, optionally corrected by unit/environment affinity.
//! Lower distance is a better match.
//!
//! Distances are rounded to four decimals and compatibilities to one before
//! they are stored, and the sort runs on the rounded distance. The sort is
//! stable, so strategies whose rounded distances tie keep catalog order.

use serde::Serialize;

use crate::affinity::{AffinityConfig, compute_adjustment};
use crate::attributes::AttributeVector;
use crate::catalog::Strategy;

/// Largest possible distance inside the unit hypercube, `sqrt(8)`.
pub const MAX_DISTANCE: f64 = 2.0 * std::f64::consts::SQRT_2;

/// Decimal places kept for distances.
pub const DISTANCE_DECIMALS: i32 = 4;

/// Decimal places kept for compatibilities.
pub const COMPATIBILITY_DECIMALS: i32 = 1;

/// Inputs for the affinity correction.
#[derive(Debug, Clone, Copy)]
pub struct AffinityContext<'a> {
    /// Selected unit ids (repeats allowed).
    pub unit_ids: &'a [String],
    /// Active terrain, if any.
    pub terrain: Option<&'a str>,
    /// Active weather, if any.
    pub weather: Option<&'a str>,
    /// Affinity configuration.
    pub config: &'a AffinityConfig,
}

impl AffinityContext<'_> {
    /// Signed distance correction for one strategy.
    #[must_use]
    pub fn adjustment(&self, strategy_id: &str) -> f64 {
        compute_adjustment(
            self.unit_ids,
            strategy_id,
            self.terrain,
            self.weather,
            Some(self.config),
        )
    }
}

/// A strategy annotated with its fit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedStrategy {
    /// The strategy.
    #[serde(flatten)]
    pub strategy: Strategy,
    /// Adjusted distance, rounded to [`DISTANCE_DECIMALS`].
    pub distance: f64,
    /// Compatibility percentage, rounded to [`COMPATIBILITY_DECIMALS`].
    pub compatibility: f64,
}

/// Round to a number of decimal places.
#[must_use]
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}

/// Convert a distance into a percentage in `[0, 100]`.
#[must_use]
pub fn compatibility(distance: f64) -> f64 {
    (100.0 * (1.0 - distance / MAX_DISTANCE)).max(0.0)
}

/// Score a single strategy. Returns the unrounded adjusted distance.
#[must_use]
pub fn strategy_distance(
    vector: &AttributeVector,
    strategy: &Strategy,
    affinity: Option<&AffinityContext<'_>>,
) -> f64 {
    let raw = vector.distance(&strategy.ideal);
    match affinity {
        Some(ctx) if !ctx.unit_ids.is_empty() => {
            let adjustment = ctx.adjustment(&strategy.id);
            log::debug!(
                "strategy {}: distance {raw:.4} adjusted by {adjustment:+.4}",
                strategy.id
            );
            (raw + adjustment).max(0.0)
        }
        _ => raw,
    }
}

/// Rank every strategy against `vector`, best first.
#[must_use]
pub fn rank(
    vector: &AttributeVector,
    strategies: &[Strategy],
    affinity: Option<&AffinityContext<'_>>,
) -> Vec<RankedStrategy> {
    let mut ranked: Vec<RankedStrategy> = strategies
        .iter()
        .map(|strategy| {
            let distance = strategy_distance(vector, strategy, affinity);
            RankedStrategy {
                strategy: strategy.clone(),
                distance: round_to(distance, DISTANCE_DECIMALS),
                compatibility: round_to(compatibility(distance), COMPATIBILITY_DECIMALS),
            }
        })
        .collect();

    ranked.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    ranked
}
