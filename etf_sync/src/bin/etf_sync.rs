use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use etf_sync::config::{PipelineConfig, load_config_path};
use etf_sync::db::{connection, migrate};
use etf_sync::pipeline::{Pipeline, RunReport, StepSelection};
use market_feed::providers::yahoo_chart::YahooChartProvider;
use shared_utils::env::get_env_var_or;

#[derive(Parser)]
#[command(version, about = "ETF ingestion and currency normalization pipeline")]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Run the pipeline for all active symbols.
    Run {
        /// Path to the pipeline TOML config.
        #[arg(long, value_name = "FILE", default_value = "etf_sync.toml")]
        config: String,
        /// Which step(s) to run.
        #[arg(long, value_enum, default_value_t = Step::Full)]
        step: Step,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Step {
    Full,
    Fetch,
    Normalize,
    Metrics,
}

impl From<Step> for StepSelection {
    fn from(step: Step) -> Self {
        match step {
            Step::Full => StepSelection::Full,
            Step::Fetch => StepSelection::FetchOnly,
            Step::Normalize => StepSelection::NormalizeOnly,
            Step::Metrics => StepSelection::MetricsOnly,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Cmd::Run { config, step } => match run(&config, step.into()).await {
            Ok(report) if report.has_failures() => ExitCode::FAILURE,
            Ok(_) => ExitCode::SUCCESS,
            Err(err) => {
                error!(error = %format!("{err:#}"), "run did not start");
                ExitCode::FAILURE
            }
        },
    }
}

async fn run(config_path: &str, step: StepSelection) -> Result<RunReport> {
    let config: PipelineConfig =
        load_config_path(config_path).with_context(|| format!("load config {config_path}"))?;
    let database_url = get_env_var_or("DATABASE_URL", &config.database_url);

    let mut conn = match open_storage(&database_url) {
        Ok(conn) => conn,
        Err(err) => {
            // Storage being unavailable is the one fatal condition; the run
            // still leaves a report behind saying so.
            let report = RunReport::aborted(format!("cannot open database: {err:#}"));
            write_report(&config, &report);
            return Err(err).with_context(|| format!("open database {database_url}"));
        }
    };

    let provider = YahooChartProvider::new().context("build market data provider")?;
    let pipeline = Pipeline::new(&provider, &provider, &config);

    let today = Utc::now().date_naive();
    let report = pipeline.run(&mut conn, today, step).await;
    write_report(&config, &report);
    Ok(report)
}

fn open_storage(database_url: &str) -> Result<diesel::SqliteConnection> {
    migrate::run_sqlite(database_url).context("run migrations")?;
    connection::connect_sqlite(database_url)
}

fn write_report(config: &PipelineConfig, report: &RunReport) {
    if let Some(path) = &config.report_path {
        match report.write_json(path) {
            Ok(()) => info!(path = %path.display(), "run report written"),
            Err(err) => error!(error = %format!("{err:#}"), "could not write run report"),
        }
    }
}
