//! # climate-fcst
//!
//! Command-line interface for SARIMAX climate forecasting runs.

use anyhow::Context;
use clap::{Parser, Subcommand};
use climate_fcst_core::{load_csv, Config, ForecastError, Frequency};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod run;

#[derive(Parser)]
#[command(name = "climate-fcst")]
#[command(about = "SARIMAX forecasting for climate time series", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train the configured model and write its forecast
    Forecast {
        /// Configuration file (JSON)
        #[arg(short, long)]
        config: PathBuf,

        /// Base name of the output files (default: the feature name)
        #[arg(short, long)]
        output_name: Option<String>,

        /// Also write prediction bounds at this coverage level, e.g. 0.95
        #[arg(short, long)]
        interval: Option<f64>,
    },

    /// Summarize the training table
    Describe {
        /// Configuration file (JSON)
        #[arg(short, long)]
        config: PathBuf,
    },
}

fn forecast(
    config: PathBuf,
    output_name: Option<String>,
    interval: Option<f64>,
) -> anyhow::Result<()> {
    let config = Config::from_path(&config)
        .with_context(|| format!("Failed to load configuration {}", config.display()))?;
    let name = output_name.unwrap_or_else(|| config.params.feature.clone());

    let outputs = run::run(&config, &name, interval)?;
    println!("Forecast written to {}", outputs.forecast.display());
    if let Some(path) = outputs.intervals {
        println!("Prediction intervals written to {}", path.display());
    }
    println!("Model summary written to {}", outputs.artifact.display());
    Ok(())
}

fn describe(config: PathBuf) -> anyhow::Result<()> {
    let config = Config::from_path(&config)
        .with_context(|| format!("Failed to load configuration {}", config.display()))?;
    let frame = load_csv(&config.paths.train_data)?;

    println!("Training data: {}", config.paths.train_data.display());
    println!("Rows: {}", frame.len());
    if let (Some(first), Some(last)) = (frame.first_timestamp(), frame.last_timestamp()) {
        println!("Range: {} .. {}", first, last);
    }
    match Frequency::infer(frame.index()) {
        Some(freq) => println!("Inferred frequency: {}", freq),
        None => println!("Inferred frequency: unknown"),
    }
    println!();
    println!("{:<16} {:>12} {:>12} {:>12}", "column", "mean", "min", "max");
    for (name, values) in frame.columns() {
        let n = values.len().max(1) as f64;
        let mean = values.iter().sum::<f64>() / n;
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let marker = if name == config.params.feature { " *" } else { "" };
        println!(
            "{:<16} {:>12.3} {:>12.3} {:>12.3}{}",
            name, mean, min, max, marker
        );
    }
    Ok(())
}

fn exit_code(err: &anyhow::Error) -> u8 {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<ForecastError>())
        .and_then(|e| u8::try_from(e.to_code()).ok())
        .unwrap_or(1)
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "climate_fcst=info,climate_fcst_core=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Forecast {
            config,
            output_name,
            interval,
        } => forecast(config, output_name, interval),
        Commands::Describe { config } => describe(config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::from(exit_code(&err))
        }
    }
}
