use accessiweather::config::AccessiWeatherConfig;
use accessiweather::logging::init_logging;
use accessiweather::{DataFusionEngine, FusionError, Location, SourceRecord};
use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Fuse weather records from several providers into one
#[derive(Debug, Parser)]
#[command(name = "accessiweather-fuse", version, about)]
struct Cli {
    /// SourceRecord JSON files, one per provider
    #[arg(required = true)]
    records: Vec<PathBuf>,

    /// Treat the location as domestic (US) when picking default priorities
    #[arg(long)]
    us: bool,

    #[arg(long, default_value = "Unknown location")]
    location_name: String,

    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    lat: f64,

    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    lon: f64,

    /// Configuration file (TOML)
    #[arg(long, env = "ACCESSIWEATHER_CONFIG")]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,
}

fn read_record(path: &Path) -> Result<SourceRecord> {
    let text = std::fs::read_to_string(path)
        .map_err(FusionError::from)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let record: SourceRecord = serde_json::from_str(&text)
        .map_err(FusionError::from)
        .with_context(|| format!("Failed to parse source record {}", path.display()))?;
    Ok(record)
}

fn run(cli: Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => AccessiWeatherConfig::load_from_path(Some(path.clone()))?,
        None => AccessiWeatherConfig::load()?,
    };
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    init_logging(&config.logging)?;

    let records = cli.records.iter().map(|path| read_record(path)).collect::<Result<Vec<_>>>()?;
    let location = Location::new(cli.location_name, cli.lat, cli.lon);

    let fused = DataFusionEngine::new().fuse(&location, &records, &config.sources, cli.us)?;
    println!("{}", serde_json::to_string_pretty(&fused)?);
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<FusionError>() {
                Some(fusion_err) => eprintln!("Error: {}\nCaused by: {e:#}", fusion_err.user_message()),
                None => eprintln!("Error: {e:#}"),
            }
            ExitCode::FAILURE
        }
    }
}
