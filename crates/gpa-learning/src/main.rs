//! CLI entry point for training and querying the GPA regression pipeline.

use anyhow::{Context, Result, anyhow};
use clap::{Args, Parser, Subcommand};
use gpa_learning::{
    DEFAULT_ID_COLUMN, DEFAULT_TARGET_COLUMN, FittedPipeline, Predictor, TrainingConfig,
    TrainingPipeline,
};
use gpa_processing::load_csv;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Student GPA prediction pipeline",
    long_about = "Train a random-forest GPA regressor from a student CSV file and use \
                  the saved pipeline for predictions.\n\n\
                  EXAMPLES:\n  \
                  # Train with the default dataset and output paths\n  \
                  gpa-predictor train\n\n  \
                  # Train on a custom file\n  \
                  gpa-predictor train --data students.csv --out artifacts/model.json\n\n  \
                  # Predict one student\n  \
                  gpa-predictor predict --model model/model.json \\\n    \
                  --record '{\"Age\": 22, \"Gender\": \"Female\", \"Academic_Year\": \"2nd\"}'"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,

    /// Suppress progress output (only show warnings, errors and results)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output JSON to stdout instead of a human-readable summary
    ///
    /// Disables all logging so stdout only carries the JSON document.
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fit the pipeline on a CSV file and save it
    Train(TrainArgs),
    /// Predict GPA with a saved pipeline
    Predict(PredictArgs),
}

#[derive(Args, Debug)]
struct TrainArgs {
    /// Path to the training CSV file
    #[arg(long, default_value = "data/student_sleep_academic_performance.csv")]
    data: PathBuf,

    /// Where to write the fitted pipeline (parent directories are created)
    #[arg(long, default_value = "model/model.json")]
    out: PathBuf,

    /// Target column
    #[arg(long, default_value = DEFAULT_TARGET_COLUMN)]
    target: String,

    /// Identifier column to drop before training (repeatable)
    #[arg(long = "id-column", default_value = DEFAULT_ID_COLUMN)]
    id_columns: Vec<String>,

    /// Fraction of rows held out for evaluation
    #[arg(long, default_value = "0.2")]
    test_size: f64,

    /// Seed for the train/test split and the forest
    #[arg(long, default_value = "42")]
    seed: u64,

    /// Number of trees
    #[arg(long, default_value = "200")]
    n_estimators: usize,

    /// Maximum tree depth (unlimited when omitted)
    #[arg(long)]
    max_depth: Option<usize>,

    /// Worker threads for tree building (-1 = all cores)
    #[arg(long, default_value = "-1", allow_hyphen_values = true)]
    n_jobs: i32,

    /// Reject categories at inference that were not seen during training
    #[arg(long)]
    strict_categories: bool,
}

#[derive(Args, Debug)]
struct PredictArgs {
    /// Path to a saved pipeline
    #[arg(long, default_value = "model/model.json")]
    model: PathBuf,

    /// CSV file with one student per row
    #[arg(long, conflicts_with = "record", required_unless_present = "record")]
    input: Option<PathBuf>,

    /// A single student as a JSON object
    #[arg(long)]
    record: Option<String>,
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled to ensure
/// only JSON is written to stdout.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level, cli.quiet, cli.json);

    match &cli.command {
        Command::Train(args) => run_train(args, cli.json),
        Command::Predict(args) => run_predict(args, cli.json),
    }
}

fn run_train(args: &TrainArgs, json: bool) -> Result<()> {
    if !args.data.exists() {
        return Err(anyhow!("Input file not found: {}", args.data.display()));
    }

    let config = TrainingConfig::builder()
        .target_column(&args.target)
        .id_columns(args.id_columns.iter().cloned())
        .test_size(args.test_size)
        .random_seed(args.seed)
        .n_estimators(args.n_estimators)
        .max_depth(args.max_depth)
        .n_jobs(args.n_jobs)
        .strict_categories(args.strict_categories)
        .build()?;
    debug!("Training config: {:?}", config);

    let pipeline = TrainingPipeline::builder().config(config).build()?;
    let fitted = pipeline
        .train_csv(&args.data)
        .with_context(|| format!("Training on {} failed", args.data.display()))?;

    fitted
        .save(&args.out)
        .with_context(|| format!("Could not write model to {}", args.out.display()))?;

    let result = fitted.training_result();
    if json {
        let report = serde_json::json!({
            "model_path": args.out.display().to_string(),
            "result": result,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("\nMODEL PERFORMANCE:");
    println!("{}", result.metrics);
    println!("\nTop features:");
    for (name, importance) in result.top_features(5) {
        println!("  {:<32} {:.4}", name, importance);
    }
    for warning in &result.warnings {
        println!("Warning: {}", warning);
    }
    println!("\nModel saved to: {}", args.out.display());
    Ok(())
}

fn run_predict(args: &PredictArgs, json: bool) -> Result<()> {
    let predictor = Predictor::load(&args.model)?;
    info!("Model expects features: {:?}", predictor.pipeline().feature_columns());

    if let Some(record) = &args.record {
        let value: serde_json::Value =
            serde_json::from_str(record).context("--record must be a JSON object")?;
        let gpa = predictor.predict_record(&value)?;
        if json {
            println!("{}", serde_json::json!({ "prediction": gpa }));
        } else {
            println!("Predicted GPA: {:.2}", gpa);
        }
        return Ok(());
    }

    let input = args
        .input
        .as_deref()
        .ok_or_else(|| anyhow!("either --input or --record is required"))?;
    predict_csv(predictor.pipeline(), input, json)
}

fn predict_csv(pipeline: &FittedPipeline, input: &Path, json: bool) -> Result<()> {
    let df = load_csv(input)?;
    let predictions = pipeline.predict(&df)?;

    if json {
        println!("{}", serde_json::json!({ "predictions": predictions }));
        return Ok(());
    }

    println!("{:>6}  {:>13}", "row", "predicted GPA");
    for (row, gpa) in predictions.iter().enumerate() {
        println!("{:>6}  {:>13.2}", row, gpa);
    }
    Ok(())
}
