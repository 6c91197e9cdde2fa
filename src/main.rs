use analytics::{AnalyticsEngine, MetricsBundle};
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use configuration::{Config, OutputFormat, load_config};
use serde::Serialize;
use std::path::PathBuf;
use stress::{StressReport, StressTester};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod input;
mod render;

use input::{MarketData, build_weights, load_market_data, parse_weight};

/// Portfolio risk metrics and historical stress tests from a daily price history.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the full risk metrics bundle for a portfolio.
    Metrics(RunArgs),
    /// Replay a portfolio over the configured crisis periods.
    Stress(RunArgs),
    /// Metrics and stress results together.
    Report(RunArgs),
}

#[derive(Args)]
struct RunArgs {
    /// JSON file with `dates`, per-asset `prices` and an optional `benchmark`.
    #[arg(long, short)]
    input: PathBuf,

    /// Portfolio weight in percent, e.g. `--weight SPY=60`. Repeat per asset.
    #[arg(long = "weight", short, value_parser = parse_weight, required = true)]
    weights: Vec<(String, f64)>,

    /// TOML configuration file. Defaults to `config.toml` in the working directory, if present.
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Output format. Overrides `output.format` from the configuration.
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,
}

#[derive(Serialize)]
struct FullReport<'a> {
    metrics: &'a MetricsBundle,
    stress: &'a StressReport,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();
    match cli.command {
        Commands::Metrics(args) => {
            let run = Run::prepare(args)?;
            let bundle = run.metrics()?;
            match run.format {
                OutputFormat::Json => print_json(&bundle)?,
                OutputFormat::Table => print_metrics(&bundle),
            }
        }
        Commands::Stress(args) => {
            let run = Run::prepare(args)?;
            let report = run.stress()?;
            match run.format {
                OutputFormat::Json => print_json(&report)?,
                OutputFormat::Table => println!("{}", render::stress_table(&report)),
            }
        }
        Commands::Report(args) => {
            let run = Run::prepare(args)?;
            let bundle = run.metrics()?;
            let report = run.stress()?;
            match run.format {
                OutputFormat::Json => print_json(&FullReport {
                    metrics: &bundle,
                    stress: &report,
                })?,
                OutputFormat::Table => {
                    print_metrics(&bundle);
                    println!("{}", render::stress_table(&report));
                }
            }
        }
    }
    Ok(())
}

/// Everything one subcommand needs, loaded and validated up front.
struct Run {
    config: Config,
    data: MarketData,
    weights: core_types::WeightVector,
    format: OutputFormat,
}

impl Run {
    fn prepare(args: RunArgs) -> Result<Self> {
        let config = load_config(args.config.as_deref()).context("Failed to load configuration")?;
        let data = load_market_data(&args.input)?;
        let weights = build_weights(args.weights)?;
        let format = args.format.unwrap_or(config.output.format);
        Ok(Self {
            config,
            data,
            weights,
            format,
        })
    }

    fn metrics(&self) -> Result<MetricsBundle> {
        let engine = AnalyticsEngine::new(self.config.metrics.clone());
        let bundle = engine
            .calculate(&self.data.prices, &self.weights, self.data.benchmark.as_ref())
            .context("Failed to calculate portfolio metrics")?;
        Ok(bundle)
    }

    fn stress(&self) -> Result<StressReport> {
        let tester = StressTester::from_params(&self.config.stress);
        let report = tester
            .run_all(&self.data.prices, &self.weights)
            .context("Failed to run stress tests")?;
        Ok(report)
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize results")?;
    println!("{json}");
    Ok(())
}

fn print_metrics(bundle: &MetricsBundle) {
    println!("{}", render::metrics_table(bundle));
    if let Some(table) = render::correlation_table(bundle) {
        println!("{table}");
    }
}
