//! War Advisor CLI - recommend strategies for a force composition.

// Allow print in the CLI binary
#![allow(clippy::print_stdout, clippy::print_stderr)]

mod cli;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

/// War Advisor - pick a battle strategy from units and conditions
#[derive(Parser, Debug)]
#[command(name = "war-advisor")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory holding units.json, strategies.json and modifiers.json
    #[arg(long, global = true, env = "WAR_ADVISOR_DATA", default_value = "data")]
    data: PathBuf,

    /// Log pipeline details to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Recommend strategies for one army
    Advise {
        /// Unit ids (repeat an id to weight it)
        #[arg(required = true)]
        units: Vec<String>,

        /// Terrain name
        #[arg(short, long)]
        terrain: Option<String>,

        /// Weather name
        #[arg(short, long)]
        weather: Option<String>,

        /// Troop status name
        #[arg(short, long)]
        status: Option<String>,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: cli::OutputFormat,
    },

    /// List the units and conditions a request may use
    Options {
        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: cli::OutputFormat,
    },

    /// Evaluate many scenarios and summarise the top strategies
    Batch {
        /// JSON file with an array of requests
        #[arg(long, conflicts_with = "random", required_unless_present = "random")]
        scenarios: Option<PathBuf>,

        /// Generate N random scenarios
        #[arg(short, long)]
        random: Option<usize>,

        /// Units per random scenario (default: 1)
        #[arg(short, long, default_value = "1")]
        units: usize,

        /// Pick a random weather for each scenario
        #[arg(long)]
        with_weather: bool,

        /// Pick a random troop status for each scenario
        #[arg(long)]
        with_status: bool,

        /// Random seed (default: random)
        #[arg(long)]
        seed: Option<u64>,

        /// Write a text report to this file
        #[arg(long)]
        report: Option<PathBuf>,

        /// Append to the report instead of overwriting it
        #[arg(long, requires = "report")]
        append: bool,

        /// Parallel threads (default: CPU count)
        #[arg(short = 'j', long)]
        threads: Option<usize>,

        /// Show progress bar
        #[arg(short, long)]
        progress: bool,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: cli::OutputFormat,
    },
}

fn main() -> ExitCode {
    let args = Args::parse();

    let log_level = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let result = match args.command {
        Commands::Advise {
            units,
            terrain,
            weather,
            status,
            format,
        } => cli::advise::execute(&args.data, units, terrain, weather, status, format),

        Commands::Options { format } => cli::options::execute(&args.data, format),

        Commands::Batch {
            scenarios,
            random,
            units,
            with_weather,
            with_status,
            seed,
            report,
            append,
            threads,
            progress,
            format,
        } => {
            let source = match scenarios {
                Some(path) => cli::batch::Source::File(path),
                None => cli::batch::Source::Random {
                    tests: random.unwrap_or(10),
                    units_per_test: units,
                    include_weather: with_weather,
                    include_troop_status: with_status,
                    seed,
                },
            };
            let options = cli::batch::BatchOptions {
                report,
                append,
                threads,
                progress,
                format,
            };
            cli::batch::execute(&args.data, source, &options)
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
