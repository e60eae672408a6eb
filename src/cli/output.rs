//! Output formatting utilities for CLI.

use serde::Serialize;
use war_advisor::batch::BatchSummary;
use war_advisor::dataset::{ConditionOption, UnitOption};
use war_advisor::report::{attribute_bar, bar};
use war_advisor::{AdvisorResult, ConditionKind, Dataset, Recommendation, Request};

/// JSON-serializable option listings.
#[derive(Debug, Serialize)]
pub(super) struct JsonOptions {
    /// Selectable units.
    units: Vec<UnitOption>,
    /// Terrain names.
    terrain: Vec<ConditionOption>,
    /// Weather names.
    weather: Vec<ConditionOption>,
    /// Troop status names.
    troop_status: Vec<ConditionOption>,
}

impl JsonOptions {
    /// Collect listings from a dataset.
    pub(super) fn from_dataset(dataset: &Dataset) -> Self {
        Self {
            units: dataset.unit_options(),
            terrain: dataset.condition_options(ConditionKind::Terrain),
            weather: dataset.condition_options(ConditionKind::Weather),
            troop_status: dataset.condition_options(ConditionKind::TroopStatus),
        }
    }
}

/// JSON-serializable outcome of one batch scenario.
#[derive(Debug, Serialize)]
pub(super) struct JsonScenarioResult<'a> {
    /// The scenario as evaluated.
    request: &'a Request,
    /// Top strategy id (null if the scenario failed or the catalog is empty).
    top_strategy: Option<&'a str>,
    /// Compatibility of the top strategy.
    compatibility: Option<f64>,
    /// Error message if the scenario failed.
    error: Option<String>,
}

/// JSON-serializable batch result.
#[derive(Debug, Serialize)]
pub(super) struct JsonBatchResult<'a> {
    /// Per-scenario outcomes, in scenario order.
    scenarios: Vec<JsonScenarioResult<'a>>,
    /// Aggregate summary.
    summary: &'a BatchSummary,
}

impl<'a> JsonBatchResult<'a> {
    /// Pair scenarios with their results.
    pub(super) fn new(
        scenarios: &'a [Request],
        results: &'a [AdvisorResult<Recommendation>],
        summary: &'a BatchSummary,
    ) -> Self {
        let scenarios = scenarios
            .iter()
            .zip(results)
            .map(|(request, result)| match result {
                Ok(rec) => JsonScenarioResult {
                    request,
                    top_strategy: rec.top_strategy().map(|t| t.strategy.id.as_str()),
                    compatibility: rec.top_strategy().map(|t| t.compatibility),
                    error: None,
                },
                Err(e) => JsonScenarioResult {
                    request,
                    top_strategy: None,
                    compatibility: None,
                    error: Some(e.to_string()),
                },
            })
            .collect();
        Self { scenarios, summary }
    }
}

/// Format a recommendation as human-readable text.
pub(super) fn format_recommendation_text(rec: &Recommendation) -> String {
    let mut output = String::new();

    output.push_str("Conditions:\n");
    output.push_str(&format!(
        "  Terrain: {}\n",
        rec.terrain_name.as_deref().unwrap_or("None")
    ));
    output.push_str(&format!(
        "  Weather: {}\n",
        rec.weather_name.as_deref().unwrap_or("None")
    ));
    output.push_str(&format!(
        "  Status:  {}\n\n",
        rec.troop_status_name.as_deref().unwrap_or("None")
    ));

    output.push_str("Profile (army -> modified):\n");
    for ((attribute, base), (_, modified)) in rec.army_profile.iter().zip(rec.modified_profile.iter()) {
        output.push_str(&format!(
            "  {:<18} {base:.2} -> {modified:.2} {}\n",
            attribute.key(),
            attribute_bar(modified)
        ));
    }

    if !rec.critical_warnings.is_empty() {
        output.push_str("\nWarnings:\n");
        for warning in &rec.critical_warnings {
            output.push_str(&format!("  ! {warning}\n"));
        }
    }

    output.push_str("\nStrategies:\n");
    if rec.ranking.is_empty() {
        output.push_str("  No strategy found\n");
    }
    for (i, ranked) in rec.ranking.iter().enumerate() {
        output.push_str(&format!(
            "  {:>2}. {:<28} {:>5.1}%  (distance {:.4})\n",
            i + 1,
            ranked.strategy.name,
            ranked.compatibility,
            ranked.distance
        ));
    }

    if let Some(top) = rec.top_strategy() {
        output.push_str(&format!("\nSuggested: {} ({})\n", top.strategy.name, top.strategy.id));
        if !top.strategy.description.is_empty() {
            output.push_str(&format!("  {}\n", top.strategy.description));
        }
    }

    output
}

/// Format option listings as human-readable text.
pub(super) fn format_options_text(options: &JsonOptions) -> String {
    let mut output = String::new();

    output.push_str("Units:\n");
    for unit in &options.units {
        output.push_str(&format!("  {:<20} {}\n", unit.id, unit.name));
    }

    for (title, list) in [
        ("Terrain", &options.terrain),
        ("Weather", &options.weather),
        ("Troop status", &options.troop_status),
    ] {
        output.push_str(&format!("\n{title}:\n"));
        if list.is_empty() {
            output.push_str("  (none)\n");
        }
        for option in list {
            output.push_str(&format!("  {}\n", option.name));
        }
    }

    output
}

/// Format a batch summary as human-readable text.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub(super) fn format_summary_text(summary: &BatchSummary) -> String {
    let mut output = String::new();

    output.push_str(&format!("Batch Results ({} scenarios)\n", summary.tests));
    output.push_str("========================================\n\n");

    output.push_str("Top strategies:\n");
    for entry in &summary.top_strategies {
        output.push_str(&format!(
            "  {}: {} {}x ({:.0}%)\n",
            entry.name,
            bar((entry.percentage / 5.0) as usize, 20),
            entry.count,
            entry.percentage
        ));
    }
    if summary.without_strategy > 0 {
        output.push_str(&format!("  (no strategy): {}\n", summary.without_strategy));
    }
    if summary.failures > 0 {
        output.push_str(&format!("\nFailed scenarios: {}\n", summary.failures));
    }

    output
}
