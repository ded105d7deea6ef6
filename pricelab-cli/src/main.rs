//! PriceLab CLI: inspect, analyze, validate and generate commands.
//!
//! Commands:
//! - `inspect` loads a CSV and prints the upload receipt
//! - `analyze` runs the four engines and optionally saves artifacts
//! - `validate` runs the fixture harness; exits 1 on any failure
//! - `generate` writes a seeded synthetic CSV

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pricelab_core::composer::AnalysisReport;
use pricelab_core::data::{generate, write_csv, SyntheticKind, SyntheticParams};
use pricelab_core::validation::ValidationReport;
use pricelab_runner::{
    analyze_series, export_json, export_validation_json, save_artifacts, validate, DatasetStore,
    PricelabConfig, UploadReceipt,
};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(name = "pricelab", about = "PriceLab: daily OHLCV analysis")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a CSV and print what was found.
    Inspect {
        /// Path to the price CSV.
        csv: PathBuf,

        /// Print the receipt as JSON.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Run SMA, returns, runs and max-profit analysis on a CSV.
    Analyze {
        /// Path to the price CSV.
        csv: PathBuf,

        /// SMA window (1-50). Overrides the config file.
        #[arg(long)]
        window: Option<usize>,

        /// Path to a TOML config file.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Run the engines one after another instead of in parallel.
        #[arg(long, default_value_t = false)]
        sequential: bool,

        /// Save report.json, chart.csv and transactions.csv under this directory.
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Print the full report as JSON instead of a summary.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Run the engines against hand-computed fixtures.
    Validate {
        /// Print the full report as JSON.
        #[arg(long, default_value_t = false)]
        json: bool,

        /// Absolute tolerance for float comparisons.
        #[arg(long)]
        tolerance: Option<f64>,

        /// Path to a TOML config file.
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Write a synthetic price CSV.
    Generate {
        /// normal, bull, bear, volatile or small.
        kind: SyntheticKind,

        /// Output file.
        #[arg(long)]
        out: PathBuf,

        /// Number of trading days. Defaults depend on the kind.
        #[arg(long)]
        days: Option<usize>,

        /// RNG seed.
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn main() -> Result<()> {
    init_logging()?;
    let cli = Cli::parse();

    match cli.command {
        Commands::Inspect { csv, json } => run_inspect(&csv, json),
        Commands::Analyze {
            csv,
            window,
            config,
            sequential,
            output_dir,
            json,
        } => run_analyze(&csv, window, config, sequential, output_dir, json),
        Commands::Validate {
            json,
            tolerance,
            config,
        } => run_validate(json, tolerance, config),
        Commands::Generate {
            kind,
            out,
            days,
            seed,
        } => run_generate(kind, &out, days, seed),
    }
}

/// Logs go to stderr so JSON on stdout stays clean. `RUST_LOG` overrides.
fn init_logging() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn load_config(path: Option<PathBuf>) -> Result<PricelabConfig> {
    match path {
        Some(path) => PricelabConfig::from_file(&path)
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(PricelabConfig::default()),
    }
}

fn read_csv(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

fn run_inspect(csv: &Path, json: bool) -> Result<()> {
    let store = DatasetStore::new();
    let receipt = store.upload(&read_csv(csv)?)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&receipt)?);
    } else {
        print_receipt(&receipt);
    }
    Ok(())
}

fn run_analyze(
    csv: &Path,
    window: Option<usize>,
    config_path: Option<PathBuf>,
    sequential: bool,
    output_dir: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    let mut config = load_config(config_path)?;
    if let Some(window) = window {
        config.analysis.sma_window = window;
    }
    if sequential {
        config.analysis.parallel = false;
    }
    config.validate()?;

    let store = DatasetStore::new();
    let receipt = store.upload(&read_csv(csv)?)?;
    let dataset = store
        .current()
        .context("dataset missing right after upload")?;
    let report = analyze_series(&dataset.series, &config.analysis)?;

    if json {
        println!("{}", export_json(&report)?);
    } else {
        print_receipt(&receipt);
        print_summary(&report);
    }

    if let Some(dir) = output_dir {
        let run_dir = save_artifacts(&report, &dir)?;
        eprintln!("Artifacts saved to: {}", run_dir.display());
    }
    Ok(())
}

fn run_validate(json: bool, tolerance: Option<f64>, config_path: Option<PathBuf>) -> Result<()> {
    let mut config = load_config(config_path)?;
    if let Some(tolerance) = tolerance {
        config.validation.tolerance = tolerance;
    }
    let report = validate(&config.validation)?;

    if json {
        println!("{}", export_validation_json(&report)?);
    } else {
        print_validation(&report);
    }

    if !report.all_passed() {
        std::process::exit(1);
    }
    Ok(())
}

fn run_generate(
    kind: SyntheticKind,
    out: &Path,
    days: Option<usize>,
    seed: Option<u64>,
) -> Result<()> {
    let mut params = SyntheticParams::for_kind(kind);
    if let Some(days) = days {
        params.days = days;
    }
    if let Some(seed) = seed {
        params.seed = seed;
    }
    let series = generate(kind, &params)?;
    let text = write_csv(&series)?;
    std::fs::write(out, text).with_context(|| format!("writing {}", out.display()))?;
    println!(
        "Wrote {} {} days to {} (seed {})",
        series.len(),
        kind.name(),
        out.display(),
        params.seed
    );
    Ok(())
}

fn print_receipt(receipt: &UploadReceipt) {
    println!();
    println!("=== Dataset ===");
    println!("Fingerprint:    {}", receipt.fingerprint.short());
    println!("Rows:           {}", receipt.rows);
    println!(
        "Period:         {} to {}",
        receipt.date_range.start, receipt.date_range.end
    );
    println!("Columns:        {}", receipt.columns.join(", "));
    if receipt.reordered {
        println!("NOTE: rows were sorted by date");
    }
    for warn in &receipt.warnings {
        println!("WARNING: {warn}");
    }
}

fn print_summary(report: &AnalysisReport) {
    let s = &report.summary;
    let runs = &report.runs_analysis;
    println!();
    println!("=== Analysis ===");
    println!(
        "Price Range:    {:.2} to {:.2}",
        s.price_range.min, s.price_range.max
    );
    println!("Avg Volume:     {:.0}", s.avg_volume);
    match s.volatility {
        Some(v) => println!("Volatility:     {:.4}%", v * 100.0),
        None => println!("Volatility:     n/a"),
    }
    println!(
        "SMA({}):         {}",
        report.sma_window,
        report
            .sma
            .points
            .last()
            .and_then(|p| p.value)
            .map(|v| format!("{v:.2}"))
            .unwrap_or_else(|| "n/a".to_string())
    );
    println!();
    println!("--- Runs ---");
    println!(
        "Upward:         {} runs, {} days, longest {}",
        runs.total_upward_runs, runs.total_upward_days, runs.longest_upward_streak
    );
    println!(
        "Downward:       {} runs, {} days, longest {}",
        runs.total_downward_runs, runs.total_downward_days, runs.longest_downward_streak
    );
    println!();
    println!("--- Max Profit ---");
    println!("Total Profit:   {:.2}", report.max_profit.total_profit);
    println!("Transactions:   {}", report.max_profit.transactions.len());
    let undefined = report.daily_returns.undefined_indices();
    if !undefined.is_empty() {
        println!();
        println!(
            "WARNING: {} daily return(s) undefined (zero prior close or overflow)",
            undefined.len()
        );
    }
}

fn print_validation(report: &ValidationReport) {
    println!();
    println!("=== Validation ===");
    for case in &report.test_cases {
        let mark = if case.passed { "PASS" } else { "FAIL" };
        println!("[{mark}] {}", case.test);
        if !case.passed {
            println!("       expected: {}", case.expected);
            println!("       actual:   {}", case.actual);
        }
    }
    println!();
    println!(
        "Passed {}/{} ({:.1}%)",
        report.summary.passed, report.summary.total, report.summary.success_rate
    );
}
