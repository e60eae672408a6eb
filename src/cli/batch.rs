//! Batch command implementation.

use super::output::{JsonBatchResult, format_summary_text};
use super::{CliError, OutputFormat, load_dataset};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use war_advisor::batch::{BatchSummary, RandomBatchConfig, random_scenarios, run_batch};
use war_advisor::report::{render_entry, write_report};
use war_advisor::{Advisor, Request};

/// Where the scenarios come from.
#[derive(Debug)]
pub(crate) enum Source {
    /// A JSON array of requests.
    File(PathBuf),
    /// Randomly generated scenarios.
    Random {
        /// Number of scenarios.
        tests: usize,
        /// Units per scenario.
        units_per_test: usize,
        /// Pick a weather.
        include_weather: bool,
        /// Pick a troop status.
        include_troop_status: bool,
        /// Seed (default: random).
        seed: Option<u64>,
    },
}

/// Presentation options for a batch run.
#[derive(Debug)]
pub(crate) struct BatchOptions {
    /// Report file.
    pub(crate) report: Option<PathBuf>,
    /// Append to the report file.
    pub(crate) append: bool,
    /// Rayon thread count.
    pub(crate) threads: Option<usize>,
    /// Show a progress bar.
    pub(crate) progress: bool,
    /// Output format.
    pub(crate) format: OutputFormat,
}

/// Execute the batch command.
///
/// # Errors
///
/// Returns an error if the data or scenario file cannot be loaded, the
/// random parameters are invalid, or the report cannot be written.
pub(crate) fn execute(data: &Path, source: Source, options: &BatchOptions) -> Result<(), CliError> {
    let dataset = load_dataset(data)?;

    let scenarios: Vec<Request> = match source {
        Source::File(path) => {
            let text = fs::read_to_string(&path).map_err(|e| {
                CliError::new(format!("Failed to read {}: {e}", path.display()))
            })?;
            serde_json::from_str(&text).map_err(|e| {
                CliError::new(format!("Failed to parse {}: {e}", path.display()))
            })?
        }
        Source::Random {
            tests,
            units_per_test,
            include_weather,
            include_troop_status,
            seed,
        } => {
            let seed = seed.unwrap_or_else(|| {
                use std::time::{SystemTime, UNIX_EPOCH};
                SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .map_or(42, |d| d.as_secs())
            });
            log::info!("random batch seed {seed}");
            let config = RandomBatchConfig {
                tests,
                units_per_test,
                include_weather,
                include_troop_status,
                seed,
            };
            random_scenarios(&dataset, &config)?
        }
    };

    // Set thread pool size if specified
    if let Some(num_threads) = options.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build_global()
            .ok(); // Ignore error if already initialized
    }

    let pb = if options.progress {
        let pb = ProgressBar::new(scenarios.len() as u64);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} scenarios")
            .map_err(|e| CliError::new(format!("Invalid progress template: {e}")))?
            .progress_chars("=>-");
        pb.set_style(style);
        Some(pb)
    } else {
        None
    };

    let start = Instant::now();
    let advisor = Advisor::new(&dataset);
    let results = run_batch(&advisor, &scenarios);
    let summary = BatchSummary::from_results(&results);

    if let Some(pb) = pb {
        pb.set_position(results.len() as u64);
        pb.finish_with_message("done");
    }

    for (i, result) in results.iter().enumerate() {
        if let Err(e) = result {
            log::warn!("scenario {} failed: {e}", i + 1);
        }
    }

    if let Some(path) = &options.report {
        let timestamp = chrono::Local::now().naive_local();
        let blocks: Vec<String> = scenarios
            .iter()
            .zip(&results)
            .filter_map(|(request, result)| {
                result
                    .as_ref()
                    .ok()
                    .map(|rec| render_entry(&dataset, request, rec, timestamp))
            })
            .collect();
        write_report(path, &blocks, options.append).map_err(|e| {
            CliError::new(format!("Failed to write {}: {e}", path.display()))
        })?;
    }

    let duration = start.elapsed();

    match options.format {
        OutputFormat::Text => {
            println!();
            print!("{}", format_summary_text(&summary));
            println!();
            println!("Duration: {:.2}s", duration.as_secs_f64());
            if let Some(path) = &options.report {
                println!("Report written to {}", path.display());
            }
        }
        OutputFormat::Json => {
            let json_result = JsonBatchResult::new(&scenarios, &results, &summary);
            println!("{}", serde_json::to_string_pretty(&json_result)?);
        }
    }

    Ok(())
}
