//! Trait and record types for the upstream open-data query source.
//!
//! The service returns JSON arrays of flat records with loosely-typed string
//! fields, so everything here is optional and coercion happens downstream.

use anyhow::Result;
use serde::Deserialize;

/// One sensor row from the station metadata dataset.
#[derive(Debug, Clone, Deserialize)]
pub struct RawStation {
    pub idsensore: Option<String>,
    pub idstazione: Option<String>,
    pub nomestazione: Option<String>,
    pub comune: Option<String>,
    pub provincia: Option<String>,
    /// Free-text sensor type, e.g. "Particelle sospese PM10".
    pub nometiposensore: Option<String>,
    pub unitamisura: Option<String>,
    pub lat: Option<String>,
    pub lng: Option<String>,
}

/// One measurement row from the readings dataset.
#[derive(Debug, Clone, Deserialize)]
pub struct RawReading {
    pub idsensore: Option<String>,
    /// Floating timestamp, e.g. "2024-06-01T00:00:00.000". The first ten
    /// characters carry the date used for daily grouping.
    pub data: Option<String>,
    /// Measured value as a string; non-numeric values are dropped later.
    pub valore: Option<String>,
    pub stato: Option<String>,
}

/// Abstraction over the open-data service (Regione Lombardia Socrata API).
#[async_trait::async_trait]
pub trait OpenDataApi {
    /// Returns all sensor metadata rows for a province.
    async fn stations(&self, province: &str) -> Result<Vec<RawStation>>;

    /// Returns measurement rows for one sensor between two bounds
    /// (inclusive, "%Y-%m-%dT%H:%M:%S" strings), newest first.
    async fn readings(&self, sensor_id: &str, from: &str, to: &str) -> Result<Vec<RawReading>>;
}
