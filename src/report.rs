//! Plain-text test reports.
//!
//! One block per evaluated scenario, meant to be appended to a running log
//! file while tuning the data files.

#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;

use chrono::NaiveDateTime;

use crate::advisor::{Recommendation, Request};
use crate::dataset::Dataset;

/// Timestamp format used in block headers.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const HEADER_WIDTH: usize = 70;
const BAR_CELLS: usize = 10;

/// A bar of `width` cells with `filled` of them solid.
#[must_use]
pub fn bar(filled: usize, width: usize) -> String {
    let filled = filled.min(width);
    let mut out = "█".repeat(filled);
    out.push_str(&"░".repeat(width - filled));
    out
}

/// A ten-cell bar for a value in `[0, 1]`.
#[must_use]
pub fn attribute_bar(value: f64) -> String {
    bar((value * BAR_CELLS as f64).floor().max(0.0) as usize, BAR_CELLS)
}

/// Render one report block.
#[must_use]
pub fn render_entry(
    dataset: &Dataset,
    request: &Request,
    recommendation: &Recommendation,
    timestamp: NaiveDateTime,
) -> String {
    let rule = "=".repeat(HEADER_WIDTH);
    let mut out = String::new();

    out.push_str(&format!("{rule}\n"));
    out.push_str(&format!("TEST RUN - {}\n", timestamp.format(TIMESTAMP_FORMAT)));
    out.push_str(&format!("{rule}\n\n"));

    out.push_str("UNITS:\n");
    for id in &request.units {
        let name = dataset.units().get(id).map_or(id.as_str(), |u| u.name.as_str());
        out.push_str(&format!("   * {name} ({id})\n"));
    }
    out.push('\n');

    out.push_str("CONDITIONS:\n");
    for (label, value) in [
        ("Terrain:", &recommendation.terrain_name),
        ("Weather:", &recommendation.weather_name),
        ("Status: ", &recommendation.troop_status_name),
    ] {
        out.push_str(&format!("   {label} {}\n", value.as_deref().unwrap_or("None")));
    }
    out.push('\n');

    if !recommendation.critical_warnings.is_empty() {
        out.push_str("CRITICAL WARNINGS:\n");
        for warning in &recommendation.critical_warnings {
            out.push_str(&format!("   ! {warning}\n"));
        }
        out.push('\n');
    }

    out.push_str("ARMY PROFILE (after modifiers):\n");
    for (attribute, value) in recommendation.modified_profile.iter() {
        out.push_str(&format!(
            "   {}: {} {value:.2}\n",
            attribute.key(),
            attribute_bar(value)
        ));
    }
    out.push('\n');

    match recommendation.top_strategy() {
        Some(top) => {
            out.push_str("SUGGESTED STRATEGY:\n");
            out.push_str(&format!("   Name:          {}\n", top.strategy.name));
            out.push_str(&format!("   ID:            {}\n", top.strategy.id));
            out.push_str(&format!("   Compatibility: {:.1}%\n", top.compatibility));
            out.push_str(&format!("   Distance:      {:.4}\n", top.distance));
            out.push_str(&format!("   Description:   {}\n", top.strategy.description));
        }
        None => out.push_str("No strategy found\n"),
    }

    out.push_str(&format!("\n{}\n\n", "-".repeat(HEADER_WIDTH)));
    out
}

/// Write report blocks to `path`, appending or truncating.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or written.
pub fn write_report<S: AsRef<str>>(path: &Path, blocks: &[S], append: bool) -> io::Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .write(true)
        .append(append)
        .truncate(!append)
        .open(path)?;
    for block in blocks {
        file.write_all(block.as_ref().as_bytes())?;
    }
    file.flush()?;
    log::info!("wrote {} report blocks to {}", blocks.len(), path.display());
    Ok(())
}
