//! Options command implementation.

use super::output::{JsonOptions, format_options_text};
use super::{CliError, OutputFormat, load_dataset};
use std::path::Path;

/// Execute the options command.
///
/// # Errors
///
/// Returns an error if the data cannot be loaded.
pub(crate) fn execute(data: &Path, format: OutputFormat) -> Result<(), CliError> {
    let dataset = load_dataset(data)?;
    let options = JsonOptions::from_dataset(&dataset);

    match format {
        OutputFormat::Text => print!("{}", format_options_text(&options)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&options)?),
    }

    Ok(())
}
