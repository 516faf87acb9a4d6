//! Synastry report for two charts.
//!
//! ```bash
//! aztro_synastry chart1.json chart2.json [--config engine.toml] [--name1 Ana] [--name2 Ben] [--pretty]
//! ```
//!
//! Each chart file holds `{"planets": {"Sun": 123.4, ...}, "houses": [c1, ..., c12]}`.

use anyhow::{Context, Result};
use aztro_synastry::{ChartSnapshot, EngineConfig, SynastryEngine};
use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[clap(name = "aztro_synastry")]
#[clap(about = "Score the compatibility of two astrological charts")]
struct Args {
    /// First person's chart (JSON)
    chart1: PathBuf,

    /// Second person's chart (JSON)
    chart2: PathBuf,

    /// Engine configuration (TOML)
    #[clap(long, value_name = "FILE")]
    config: Option<PathBuf>,

    #[clap(long, default_value = "Person 1")]
    name1: String,

    #[clap(long, default_value = "Person 2")]
    name2: String,

    /// Pretty-print the JSON response
    #[clap(long)]
    pretty: bool,
}

fn read_chart(path: &Path) -> Result<ChartSnapshot> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read chart {}", path.display()))?;
    let chart = ChartSnapshot::from_json(&contents)
        .with_context(|| format!("Failed to parse chart {}", path.display()))?;
    Ok(chart)
}

fn run(args: &Args) -> Result<bool> {
    let config = match &args.config {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => EngineConfig::default(),
    };
    info!("Scoring policy: {:?}", config.overall_score);

    let chart1 = read_chart(&args.chart1)?;
    let chart2 = read_chart(&args.chart2)?;

    let engine = SynastryEngine::new(config);
    let response = engine.respond_named(&chart1, &chart2, &args.name1, &args.name2);

    let output = if args.pretty {
        serde_json::to_string_pretty(&response)?
    } else {
        serde_json::to_string(&response)?
    };
    println!("{}", output);

    Ok(response.is_success())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("aztro_synastry=info")),
        )
        .init();

    let args = Args::parse();

    match run(&args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
