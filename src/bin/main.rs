//! repsim Command Line Interface
//!
//! Compares two representations stored as CSV feature matrices, or runs the
//! synthetic "noisy copy" demonstration.

use clap::{Args, Parser, Subcommand, ValueEnum};
use env_logger::Env;
use log::{error, info};
use repsim::api::{Comparison, SimilarityReport};
use repsim::core::{Metric, Result};
use repsim::utils::synthetic;
use repsim::CSVFeatures;
use serde::Serialize;
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(name = "repsim")]
#[command(about = "Similarity of neural network representations (CKA and CCA)")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = "repsim contributors")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare two feature matrices stored as CSV
    Compare(CompareArgs),
    /// Compare a random representation with a noisy copy of itself
    Demo(DemoArgs),
}

#[derive(Args)]
struct CompareArgs {
    /// First feature matrix (examples x features)
    #[arg(long)]
    x: PathBuf,

    /// Second feature matrix, same examples in the same order
    #[arg(long)]
    y: PathBuf,

    /// Metric to compute (repeatable, default: all)
    #[arg(short, long = "metric", value_enum)]
    metrics: Vec<CliMetric>,

    /// Use the unbiased HSIC estimator for CKA
    #[arg(long)]
    debiased: bool,

    /// RBF bandwidth as a fraction of the median distance
    #[arg(short, long, default_value = "1.0")]
    threshold: f64,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct DemoArgs {
    /// Random seed
    #[arg(short, long, default_value = "0")]
    seed: u64,

    /// Number of examples
    #[arg(short = 'n', long, default_value = "100")]
    examples: usize,

    /// Number of features
    #[arg(short, long, default_value = "10")]
    features: usize,

    /// RBF bandwidth as a fraction of the median distance
    #[arg(short, long, default_value = "0.5")]
    threshold: f64,

    /// Print the reports as JSON
    #[arg(long)]
    json: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum CliMetric {
    /// CKA over explicit linear Gram matrices
    #[value(name = "linear-cka")]
    LinearCka,
    /// CKA over RBF Gram matrices
    #[value(name = "rbf-cka")]
    RbfCka,
    /// Linear CKA computed in feature space
    #[value(name = "feature-space")]
    FeatureSpace,
    /// Mean squared canonical correlation
    #[value(name = "cca")]
    Cca,
}

impl From<CliMetric> for Metric {
    fn from(cli_metric: CliMetric) -> Self {
        match cli_metric {
            CliMetric::LinearCka => Metric::LinearCka,
            CliMetric::RbfCka => Metric::RbfCka,
            CliMetric::FeatureSpace => Metric::FeatureSpaceLinearCka,
            CliMetric::Cca => Metric::Cca,
        }
    }
}

#[derive(Serialize)]
struct DemoOutput {
    seed: u64,
    biased: SimilarityReport,
    debiased: SimilarityReport,
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.debug {
        "debug"
    } else if cli.verbose {
        "info"
    } else {
        "warn"
    };

    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    let result = match cli.command {
        Commands::Compare(args) => compare_command(args),
        Commands::Demo(args) => demo_command(args),
    };

    if let Err(e) = result {
        error!("Error: {e}");
        process::exit(1);
    }
}

fn compare_command(args: CompareArgs) -> Result<()> {
    info!("Loading representations from {:?} and {:?}", args.x, args.y);
    let x = CSVFeatures::from_file(&args.x)?;
    let y = CSVFeatures::from_file(&args.y)?;
    info!(
        "Loaded {}x{} and {}x{} matrices",
        x.n_examples(),
        x.n_features(),
        y.n_examples(),
        y.n_features()
    );

    let metrics: Vec<Metric> = if args.metrics.is_empty() {
        Metric::ALL.to_vec()
    } else {
        args.metrics.iter().map(|&m| m.into()).collect()
    };

    let report = Comparison::new()
        .with_debiased(args.debiased)
        .with_rbf_threshold(args.threshold)
        .with_metrics(&metrics)
        .compare(x.matrix(), y.matrix())?;

    if args.json {
        println!("{}", report.to_json()?);
    } else {
        report.print_summary();
    }

    Ok(())
}

fn demo_command(args: DemoArgs) -> Result<()> {
    info!(
        "Generating {}x{} representation and noisy copy (seed {})",
        args.examples, args.features, args.seed
    );
    let (x, y) = synthetic::noisy_pair(args.seed, args.examples, args.features);

    let biased = Comparison::new()
        .with_rbf_threshold(args.threshold)
        .compare(&x, &y)?;
    let debiased = Comparison::new()
        .with_debiased(true)
        .with_metrics(&[Metric::LinearCka, Metric::FeatureSpaceLinearCka])
        .compare(&x, &y)?;

    if args.json {
        let output = DemoOutput {
            seed: args.seed,
            biased,
            debiased,
        };
        let json = serde_json::to_string_pretty(&output)
            .map_err(|e| repsim::SimilarityError::SerializationError(e.to_string()))?;
        println!("{json}");
        return Ok(());
    }

    let score = |report: &SimilarityReport, metric| report.get(metric).unwrap_or(f64::NAN);

    println!("=== Noisy Copy Demo ===");
    println!(
        "Examples: {}, features: {}, seed: {}",
        args.examples, args.features, args.seed
    );
    println!(
        "Linear CKA from examples:            {:.5}",
        score(&biased, Metric::LinearCka)
    );
    println!(
        "Linear CKA from features:            {:.5}",
        score(&biased, Metric::FeatureSpaceLinearCka)
    );
    println!(
        "RBF CKA (threshold {}):             {:.5}",
        args.threshold,
        score(&biased, Metric::RbfCka)
    );
    println!(
        "Linear CKA from examples (debiased): {:.5}",
        score(&debiased, Metric::LinearCka)
    );
    println!(
        "Linear CKA from features (debiased): {:.5}",
        score(&debiased, Metric::FeatureSpaceLinearCka)
    );
    println!(
        "Mean squared CCA correlation:        {:.5}",
        score(&biased, Metric::Cca)
    );

    Ok(())
}
