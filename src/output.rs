//! JSON persistence for the station directory and chart document.
//!
//! Two destinations: the data directory, and a copy under `docs/data` so the
//! static site serves it directly. Any write failure aborts the run.

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::info;

use crate::analyzers::types::ChartData;
use crate::config::Config;
use crate::directory::Sensor;

pub fn write_outputs(config: &Config, sensors: &[Sensor], chart: &ChartData) -> Result<()> {
    fs::create_dir_all(&config.data_dir)
        .with_context(|| format!("Failed to create {}", config.data_dir.display()))?;
    write_json(&config.data_dir.join("stazioni.json"), &sensors)?;
    write_json(&config.data_dir.join("dati_grafici.json"), chart)?;

    let docs_data = config.docs_dir.join("data");
    fs::create_dir_all(&docs_data)
        .with_context(|| format!("Failed to create {}", docs_data.display()))?;
    write_json(&docs_data.join("dati_grafici.json"), chart)?;

    Ok(())
}

fn write_json(path: &Path, value: &impl Serialize) -> Result<()> {
    let body = serde_json::to_string_pretty(value)?;
    fs::write(path, body).with_context(|| format!("Failed to write {}", path.display()))?;
    info!(path = %path.display(), "Saved");
    Ok(())
}
