//! Advise command implementation.

use super::output::format_recommendation_text;
use super::{CliError, OutputFormat, load_dataset};
use std::path::Path;
use war_advisor::{Advisor, Request};

/// Execute the advise command.
///
/// # Errors
///
/// Returns an error if the data cannot be loaded or the request is invalid.
pub(crate) fn execute(
    data: &Path,
    units: Vec<String>,
    terrain: Option<String>,
    weather: Option<String>,
    troop_status: Option<String>,
    format: OutputFormat,
) -> Result<(), CliError> {
    let dataset = load_dataset(data)?;
    let request = Request {
        units,
        terrain,
        weather,
        troop_status,
    };

    let recommendation = Advisor::new(&dataset).recommend(&request)?;

    match format {
        OutputFormat::Text => print!("{}", format_recommendation_text(&recommendation)),
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&recommendation)?;
            println!("{json}");
        }
    }

    Ok(())
}
