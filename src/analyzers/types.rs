//! Serializable documents produced by the aggregation pipeline.
//!
//! Field names match the JSON the dashboard already consumes. Maps are
//! `BTreeMap` so two runs over identical input serialize byte-identically
//! apart from the generation timestamp.

use chrono::{DateTime, Local};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::config::Thresholds;

/// One averaged day in a (municipality, pollutant) time series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    #[serde(rename = "data")]
    pub date: String,
    #[serde(rename = "valore")]
    pub value: f64,
}

/// Whole-window average for one station, used in the per-pollutant ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationComparison {
    #[serde(rename = "stazione")]
    pub station: String,
    #[serde(rename = "comune")]
    pub municipality: String,
    #[serde(rename = "valore")]
    pub value: f64,
}

/// Days above the PM10 limit for one municipality, year to date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Exceedance {
    #[serde(rename = "comune")]
    pub municipality: String,
    #[serde(rename = "giorni_superamento")]
    pub days: u32,
}

/// The combined document behind every chart on the dashboard, rebuilt
/// wholesale on each run.
#[derive(Debug, Serialize)]
pub struct ChartData {
    #[serde(rename = "ultimo_aggiornamento")]
    pub generated_at: DateTime<Local>,
    pub comuni: Vec<String>,
    pub soglie: BTreeMap<String, Thresholds>,
    /// municipality -> pollutant -> ascending daily series.
    #[serde(rename = "serie_temporali")]
    pub time_series: BTreeMap<String, BTreeMap<String, Vec<SeriesPoint>>>,
    /// municipality -> pollutant -> value for the reference date (or the
    /// last available day).
    #[serde(rename = "dati_oggi")]
    pub today: BTreeMap<String, BTreeMap<String, f64>>,
    /// municipality -> pollutants with at least one valid reading.
    #[serde(rename = "inquinanti_disponibili")]
    pub available_pollutants: BTreeMap<String, Vec<String>>,
    /// Most recent date present anywhere in the fetched window.
    #[serde(rename = "data_riferimento")]
    pub reference_date: String,
    /// pollutant -> stations ranked by whole-window average, descending.
    #[serde(rename = "confronto_stazioni")]
    pub station_comparison: BTreeMap<String, Vec<StationComparison>>,
    #[serde(rename = "superamenti")]
    pub exceedances: Vec<Exceedance>,
}
