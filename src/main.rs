//! CLI entry point for the Varese air-quality data updater.
//!
//! Provides subcommands for running the full update pipeline (fetch,
//! aggregate, write JSON) and for inspecting the station directory.

use anyhow::{Result, bail};
use aria_varese::analyzers::exceedance::count_exceedance_days;
use aria_varese::analyzers::timeseries::build_chart_data;
use aria_varese::config::Config;
use aria_varese::directory::build_directory;
use aria_varese::fetch::BasicClient;
use aria_varese::infra::socrata::SocrataClient;
use aria_varese::output::write_outputs;
use aria_varese::readings::fetch_all_readings;
use aria_varese::services::open_data::OpenDataApi;
use chrono::Local;
use clap::{Parser, Subcommand};
use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::path::Path;
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "aria_varese")]
#[command(about = "Updates the air-quality dashboard data for a province", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch readings and rebuild all dashboard JSON files
    Update {
        /// Two-letter province code for the server-side filter
        #[arg(short, long, default_value = "VA")]
        province: String,

        /// Size of the recent window in days
        #[arg(short, long, default_value_t = 30)]
        days: i64,

        /// Directory for stazioni.json and dati_grafici.json
        #[arg(long, default_value = "data")]
        data_dir: String,

        /// Static-site directory; the chart document is duplicated under
        /// its data/ subdirectory
        #[arg(long, default_value = "docs")]
        docs_dir: String,
    },
    /// Fetch and list the station directory without touching any files
    Stations {
        /// Two-letter province code for the server-side filter
        #[arg(short, long, default_value = "VA")]
        province: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/aria_varese.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("aria_varese.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse().unwrap()));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse().unwrap()));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Update { province, days, data_dir, docs_dir } => {
            let config = Config::new(&province, days, data_dir, docs_dir);
            update(&config).await?;
        }
        Commands::Stations { province } => {
            let config = Config::new(&province, 30, "data", "docs");
            list_stations(&config).await?;
        }
    }

    Ok(())
}

/// Runs the full pipeline: stations, both reading windows, aggregation, and
/// the JSON writes. One sequential HTTP request at a time.
#[tracing::instrument(skip(config), fields(province = %config.province, days = config.lookback_days))]
async fn update(config: &Config) -> Result<()> {
    let api = build_client(config)?;

    let rows = api.stations(&config.province).await?;
    let sensors = build_directory(config, rows);
    if sensors.is_empty() {
        bail!("No stations found for province {}", config.province);
    }

    let now = Local::now();
    let windows = fetch_all_readings(&api, &sensors, now.date_naive(), config.lookback_days).await;

    let mut chart = build_chart_data(config, &sensors, &windows.recent, now);
    chart.exceedances = count_exceedance_days(&sensors, &windows.year_to_date, config.pm10_limit);

    write_outputs(config, &sensors, &chart)?;

    info!(
        sensors = sensors.len(),
        comuni = chart.comuni.len(),
        reference_date = %chart.reference_date,
        "Update complete"
    );
    Ok(())
}

/// Fetches the station directory and logs it, with a per-pollutant summary.
#[tracing::instrument(skip(config), fields(province = %config.province))]
async fn list_stations(config: &Config) -> Result<()> {
    let api = build_client(config)?;

    let rows = api.stations(&config.province).await?;
    let sensors = build_directory(config, rows);

    for sensor in &sensors {
        info!(
            sensor_id = %sensor.sensor_id,
            station = %sensor.station_name,
            comune = %sensor.municipality_display,
            pollutant = %sensor.pollutant,
            unit = %sensor.unit,
            "Sensor"
        );
    }

    let mut per_pollutant: BTreeMap<&str, usize> = BTreeMap::new();
    for sensor in &sensors {
        *per_pollutant.entry(sensor.pollutant.as_str()).or_default() += 1;
    }

    info!(total = sensors.len(), breakdown = ?per_pollutant, "Station directory summary");
    Ok(())
}

fn build_client(config: &Config) -> Result<SocrataClient<BasicClient>> {
    let http = BasicClient::with_timeouts(config.request_timeout, config.connect_timeout)?;
    Ok(SocrataClient::new(config, http))
}
