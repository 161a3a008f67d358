//! Recent-window aggregation: daily series, today values, station ranking.

use chrono::{DateTime, Local};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use crate::analyzers::types::{ChartData, SeriesPoint, StationComparison};
use crate::analyzers::utility::{date_key, mean, parse_value, round1};
use crate::config::Config;
use crate::directory::Sensor;
use crate::services::open_data::RawReading;

/// Builds the chart document from the recent-window readings.
///
/// Readings whose sensor id is not in the directory are skipped, as are
/// readings with missing dates or non-numeric values. Groups that end up
/// with zero valid values emit nothing; there is no zero-filling. The
/// `superamenti` field is left empty for the caller to fill from the
/// year-to-date window.
pub fn build_chart_data(
    config: &Config,
    sensors: &[Sensor],
    recent: &[RawReading],
    generated_at: DateTime<Local>,
) -> ChartData {
    let sensor_map: BTreeMap<&str, &Sensor> =
        sensors.iter().map(|s| (s.sensor_id.as_str(), s)).collect();

    let comuni: BTreeSet<&str> = sensors
        .iter()
        .map(|s| s.municipality_display.as_str())
        .collect();

    // The reference date is the most recent date present anywhere in the
    // fetched data, before any sensor or value filtering.
    let reference_date = recent
        .iter()
        .filter_map(|r| r.data.as_deref().and_then(date_key))
        .max()
        .map(str::to_string)
        .unwrap_or_else(|| generated_at.format("%Y-%m-%d").to_string());

    // (municipality, pollutant) -> date -> same-day values
    let mut grouped: BTreeMap<(String, String), BTreeMap<String, Vec<f64>>> = BTreeMap::new();
    // pollutant -> (station, municipality) -> whole-window values
    let mut ranking: BTreeMap<String, BTreeMap<(String, String), Vec<f64>>> = BTreeMap::new();

    for record in recent {
        let Some(sensor) = record
            .idsensore
            .as_deref()
            .and_then(|id| sensor_map.get(id))
        else {
            continue;
        };
        let Some(value) = parse_value(record.valore.as_deref()) else {
            continue;
        };
        let Some(date) = record.data.as_deref().and_then(date_key) else {
            continue;
        };

        grouped
            .entry((
                sensor.municipality_display.clone(),
                sensor.pollutant.clone(),
            ))
            .or_default()
            .entry(date.to_string())
            .or_default()
            .push(value);

        ranking
            .entry(sensor.pollutant.clone())
            .or_default()
            .entry((
                sensor.station_name.clone(),
                sensor.municipality_display.clone(),
            ))
            .or_default()
            .push(value);
    }

    let mut time_series: BTreeMap<String, BTreeMap<String, Vec<SeriesPoint>>> = BTreeMap::new();
    let mut today: BTreeMap<String, BTreeMap<String, f64>> = BTreeMap::new();
    let mut available_pollutants: BTreeMap<String, Vec<String>> = BTreeMap::new();

    for ((municipality, pollutant), by_date) in grouped {
        let serie: Vec<SeriesPoint> = by_date
            .iter()
            .map(|(date, values)| SeriesPoint {
                date: date.clone(),
                value: round1(mean(values)),
            })
            .collect();

        // Today's value: the reference date if present, otherwise the last
        // chronological entry of this pair's series.
        let today_value = by_date
            .get(&reference_date)
            .map(|values| round1(mean(values)))
            .or_else(|| serie.last().map(|p| p.value));
        let Some(today_value) = today_value else {
            continue;
        };

        time_series
            .entry(municipality.clone())
            .or_default()
            .insert(pollutant.clone(), serie);
        today
            .entry(municipality.clone())
            .or_default()
            .insert(pollutant.clone(), today_value);
        available_pollutants
            .entry(municipality)
            .or_default()
            .push(pollutant);
    }

    let mut station_comparison: BTreeMap<String, Vec<StationComparison>> = BTreeMap::new();
    for (pollutant, stations) in ranking {
        let mut entries: Vec<StationComparison> = stations
            .into_iter()
            .map(|((station, municipality), values)| StationComparison {
                station,
                municipality,
                value: round1(mean(&values)),
            })
            .collect();
        // Stable sort: ties keep the alphabetical encounter order.
        entries.sort_by(|a, b| b.value.partial_cmp(&a.value).unwrap_or(Ordering::Equal));
        station_comparison.insert(pollutant, entries);
    }

    ChartData {
        generated_at,
        comuni: comuni.into_iter().map(str::to_string).collect(),
        soglie: config.soglie.clone(),
        time_series,
        today,
        available_pollutants,
        reference_date,
        station_comparison,
        exceedances: Vec::new(),
    }
}
