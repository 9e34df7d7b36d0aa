//! Reimbursement scoring command line interface

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use reimburse_cli::{evaluate_all, load_cases, logging::init_logging, write_results, AccuracyReport};
use reimburse_core::tree::Branch;
use reimburse_core::{Engine, EngineConfig, RoundingMode, TripInput};
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser)]
#[command(name = "reimburse")]
#[command(about = "Deterministic trip reimbursement scoring", long_about = None)]
#[command(version)]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Model document, overrides the configured one
    #[arg(long, global = true, value_name = "PATH")]
    model: Option<PathBuf>,

    /// Rounding convention: half_even, half_away_from_zero or half_toward_zero
    #[arg(long, global = true, value_name = "MODE")]
    rounding: Option<RoundingMode>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
#[command(allow_negative_numbers = true)]
struct TripArgs {
    /// Trip length in days
    duration: f64,
    /// Distance travelled
    distance: f64,
    /// Total receipts
    amount: f64,
}

impl TripArgs {
    fn input(&self) -> TripInput {
        TripInput::new(self.duration, self.distance, self.amount)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the reimbursement for one trip
    Calc(TripArgs),
    /// Show the features and decision path behind one result
    Explain {
        #[command(flatten)]
        trip: TripArgs,
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Evaluate every record of a case file, one result per line
    Batch {
        /// JSON or CSV case file
        #[arg(short, long, value_name = "PATH")]
        input: PathBuf,
        /// Output file (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
    /// Compare results against the expected outputs of labelled cases
    Accuracy {
        /// JSON or CSV case file with expected outputs
        #[arg(long, value_name = "PATH")]
        cases: PathBuf,
        /// Number of worst cases to list
        #[arg(long, default_value = "5")]
        worst: usize,
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Print the canonical hash of the loaded model
    Hash,
    /// Print the effective configuration
    ShowConfig,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = resolve_config(&cli)?;

    init_logging(&config.logging, cli.verbose)?;

    if let Commands::ShowConfig = cli.command {
        print!("{}", config.to_toml_string()?);
        return Ok(());
    }

    let engine = Engine::from_config(&config).context("Failed to initialise scoring engine")?;

    match cli.command {
        Commands::Calc(trip) => {
            let result = engine.evaluate(&trip.input())?;
            println!("{result:.2}");
        }
        Commands::Explain { trip, json } => explain(&engine, &trip.input(), json)?,
        Commands::Batch { input, output } => run_batch(&engine, &input, output)?,
        Commands::Accuracy { cases, worst, json } => run_accuracy(&engine, &cases, worst, json)?,
        Commands::Hash => println!("{}", engine.model().hash_hex()?),
        Commands::ShowConfig => {}
    }

    Ok(())
}

/// Config file, then `REIMBURSE_*` environment, then command line flags
fn resolve_config(cli: &Cli) -> Result<EngineConfig> {
    let mut config = match &cli.config {
        Some(path) => EngineConfig::load_from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => EngineConfig::default(),
    };

    config
        .apply_env_overrides()
        .context("Invalid REIMBURSE_* environment override")?;

    if let Some(model) = &cli.model {
        config.model.path = Some(model.clone());
    }
    if let Some(rounding) = cli.rounding {
        config.evaluation.rounding = Some(rounding);
    }

    Ok(config)
}

fn explain(engine: &Engine, input: &TripInput, json: bool) -> Result<()> {
    let explanation = engine.explain(input)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&explanation)?);
        return Ok(());
    }

    println!(
        "Trip: {} days, {} miles, ${:.2} receipts",
        input.duration, input.distance, input.amount
    );
    println!("Features:");
    for (feature, value) in explanation.features.iter() {
        println!("  {:<22} {}", feature.name(), value);
    }
    println!("Path:");
    for (depth, decision) in explanation.path.iter().enumerate() {
        let op = match decision.branch {
            Branch::Left => "<=",
            Branch::Right => ">",
        };
        println!(
            "  {}. {} = {} {} {}",
            depth + 1,
            decision.feature,
            decision.value,
            op,
            decision.threshold
        );
    }
    println!("Leaf: {}", explanation.leaf);
    println!("Result: {:.2}", explanation.result);
    Ok(())
}

fn run_batch(engine: &Engine, input: &Path, output: Option<PathBuf>) -> Result<()> {
    let cases = load_cases(input)?;
    let inputs: Vec<TripInput> = cases.iter().map(|case| case.input).collect();
    let results = evaluate_all(engine, &inputs)?;

    match output {
        Some(path) => {
            let file = File::create(&path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            write_results(BufWriter::new(file), &results)?;
            info!("Wrote {} results to {}", results.len(), path.display());
        }
        None => write_results(io::stdout().lock(), &results)?,
    }
    Ok(())
}

fn run_accuracy(engine: &Engine, cases_path: &Path, worst: usize, json: bool) -> Result<()> {
    let cases = load_cases(cases_path)?;
    let inputs: Vec<TripInput> = cases.iter().map(|case| case.input).collect();
    let results = evaluate_all(engine, &inputs)?;

    let report = AccuracyReport::build(&cases, &results, worst);
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{report}");
    }
    Ok(())
}
