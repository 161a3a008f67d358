//! Run configuration for the air-quality pipeline.
//!
//! Everything that was tunable in the dashboard's data feed lives here as an
//! immutable [`Config`] built once at startup and passed by reference into
//! each component. Endpoint URLs can be overridden through the environment
//! (`ARIA_BASE_URL`), which `dotenvy` populates from a `.env` file when
//! present.

use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://www.dati.lombardia.it/resource";
const STATIONS_DATASET: &str = "ib47-atvt";
const READINGS_DATASET: &str = "nicp-bhqi";

/// Color-band thresholds for one pollutant, in µg/m³.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Thresholds {
    pub verde: f64,
    pub giallo: f64,
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Socrata resource endpoint for station/sensor metadata.
    pub stations_url: String,
    /// Socrata resource endpoint for sensor measurements.
    pub readings_url: String,
    /// Two-letter province code used in the server-side filter.
    pub province: String,
    /// Row cap for the station metadata query.
    pub station_row_cap: u32,
    /// Row cap for each per-sensor measurement query.
    pub reading_row_cap: u32,
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
    /// Size of the recent window, in days.
    pub lookback_days: i64,
    /// Municipalities whose stations are no longer active and must be skipped.
    pub excluded_municipalities: Vec<String>,
    /// Ordered (substring, normalized code) pairs matched against the raw
    /// sensor-type string. First match wins, so the declared order matters.
    pub pollutant_table: Vec<(String, String)>,
    /// Upper-case municipality name -> display name.
    pub municipality_names: BTreeMap<String, String>,
    /// Per-pollutant color thresholds, copied verbatim into the output.
    pub soglie: BTreeMap<String, Thresholds>,
    /// Daily PM10 average above which a day counts as an exceedance.
    pub pm10_limit: f64,
    pub data_dir: PathBuf,
    pub docs_dir: PathBuf,
}

impl Config {
    pub fn new(
        province: &str,
        lookback_days: i64,
        data_dir: impl Into<PathBuf>,
        docs_dir: impl Into<PathBuf>,
    ) -> Self {
        let base_url =
            std::env::var("ARIA_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        let pollutant_table = [
            ("PM10", "PM10"),
            ("PM2.5", "PM2.5"),
            ("Particelle sospese PM2.5", "PM2.5"),
            ("Biossido di Azoto", "NO2"),
            ("Ossidi di Azoto", "NO2"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let municipality_names = [
            ("VARESE", "Varese"),
            ("BUSTO ARSIZIO", "Busto Arsizio"),
            ("SARONNO", "Saronno"),
            ("FERNO", "Ferno"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let soglie = [
            ("PM10", Thresholds { verde: 35.0, giallo: 50.0 }),
            ("PM2.5", Thresholds { verde: 20.0, giallo: 25.0 }),
            ("NO2", Thresholds { verde: 100.0, giallo: 200.0 }),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

        Self {
            stations_url: format!("{base_url}/{STATIONS_DATASET}.json"),
            readings_url: format!("{base_url}/{READINGS_DATASET}.json"),
            province: province.to_string(),
            station_row_cap: 1_000,
            reading_row_cap: 50_000,
            request_timeout: Duration::from_secs(60),
            connect_timeout: Duration::from_secs(10),
            lookback_days,
            excluded_municipalities: ["GALLARATE", "LONATE POZZOLO", "SOMMA LOMBARDO"]
                .into_iter()
                .map(String::from)
                .collect(),
            pollutant_table,
            municipality_names,
            soglie,
            pm10_limit: 50.0,
            data_dir: data_dir.into(),
            docs_dir: docs_dir.into(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new("VA", 30, "data", "docs")
    }
}
