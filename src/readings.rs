//! Measurement fetching: two bounded windows per sensor.
//!
//! For every distinct sensor id the measurements endpoint is queried twice,
//! once for the recent window and once for the current calendar year.
//! Requests run strictly one at a time; a failed window is logged and skipped
//! so one dead sensor never aborts the run.

use chrono::{Duration, NaiveDate};
use std::collections::BTreeSet;
use tracing::{info, warn};

use crate::directory::Sensor;
use crate::services::open_data::{OpenDataApi, RawReading};

/// Raw readings split by query window.
#[derive(Debug, Default)]
pub struct ReadingWindows {
    /// Last N days, used for the time series and comparisons.
    pub recent: Vec<RawReading>,
    /// Since January 1st, used for the exceedance counts.
    pub year_to_date: Vec<RawReading>,
}

/// Fetches both windows for every distinct sensor in the directory.
///
/// Sensor ids are deduplicated into sorted order so runs are deterministic.
pub async fn fetch_all_readings<A: OpenDataApi>(
    api: &A,
    sensors: &[Sensor],
    today: NaiveDate,
    lookback_days: i64,
) -> ReadingWindows {
    let end = format!("{}T23:59:59", today.format("%Y-%m-%d"));
    let recent_start = format!(
        "{}T00:00:00",
        (today - Duration::days(lookback_days)).format("%Y-%m-%d")
    );
    let year_start = format!("{}-01-01T00:00:00", today.format("%Y"));

    let sensor_ids: BTreeSet<&str> = sensors.iter().map(|s| s.sensor_id.as_str()).collect();
    info!(sensor_count = sensor_ids.len(), "Fetching measurements");

    let mut windows = ReadingWindows::default();

    for (i, sensor_id) in sensor_ids.iter().enumerate() {
        info!(
            sensor_id,
            progress = format!("{}/{}", i + 1, sensor_ids.len()),
            "Fetching sensor"
        );

        match api.readings(sensor_id, &recent_start, &end).await {
            Ok(rows) => windows.recent.extend(rows),
            Err(e) => warn!(sensor_id, error = %e, "Recent-window fetch failed, skipping"),
        }

        match api.readings(sensor_id, &year_start, &end).await {
            Ok(rows) => windows.year_to_date.extend(rows),
            Err(e) => warn!(sensor_id, error = %e, "Year-to-date fetch failed, skipping"),
        }
    }

    info!(
        recent = windows.recent.len(),
        year_to_date = windows.year_to_date.len(),
        "Measurement fetch complete"
    );

    windows
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Result, bail};
    use std::sync::Mutex;

    use crate::services::open_data::RawStation;

    struct CannedApi {
        /// Sensor ids whose fetches must fail.
        broken: Vec<String>,
        calls: Mutex<Vec<(String, String)>>,
    }

    #[async_trait::async_trait]
    impl OpenDataApi for CannedApi {
        async fn stations(&self, _province: &str) -> Result<Vec<RawStation>> {
            Ok(Vec::new())
        }

        async fn readings(
            &self,
            sensor_id: &str,
            from: &str,
            _to: &str,
        ) -> Result<Vec<RawReading>> {
            self.calls
                .lock()
                .unwrap()
                .push((sensor_id.to_string(), from.to_string()));

            if self.broken.iter().any(|b| b == sensor_id) {
                bail!("HTTP 500");
            }

            Ok(vec![RawReading {
                idsensore: Some(sensor_id.to_string()),
                data: Some("2024-06-01T00:00:00.000".to_string()),
                valore: Some("10".to_string()),
                stato: Some("VA".to_string()),
            }])
        }
    }

    fn sensor(id: &str) -> Sensor {
        Sensor {
            sensor_id: id.to_string(),
            station_id: None,
            station_name: "Test".to_string(),
            municipality: "VARESE".to_string(),
            municipality_display: "Varese".to_string(),
            province: Some("VA".to_string()),
            pollutant: "PM10".to_string(),
            unit: "µg/m³".to_string(),
            lat: None,
            lng: None,
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    #[tokio::test]
    async fn test_duplicate_sensor_ids_are_fetched_once() {
        let api = CannedApi { broken: vec![], calls: Mutex::new(Vec::new()) };
        let sensors = vec![sensor("a"), sensor("a"), sensor("b")];

        let windows = fetch_all_readings(&api, &sensors, today(), 30).await;

        // Two distinct sensors, two windows each.
        assert_eq!(api.calls.lock().unwrap().len(), 4);
        assert_eq!(windows.recent.len(), 2);
        assert_eq!(windows.year_to_date.len(), 2);
    }

    #[tokio::test]
    async fn test_failed_sensor_is_skipped_not_fatal() {
        let api = CannedApi {
            broken: vec!["a".to_string()],
            calls: Mutex::new(Vec::new()),
        };
        let sensors = vec![sensor("a"), sensor("b")];

        let windows = fetch_all_readings(&api, &sensors, today(), 30).await;

        assert_eq!(windows.recent.len(), 1);
        assert_eq!(windows.recent[0].idsensore.as_deref(), Some("b"));
        assert_eq!(windows.year_to_date.len(), 1);
    }

    #[tokio::test]
    async fn test_window_bounds() {
        let api = CannedApi { broken: vec![], calls: Mutex::new(Vec::new()) };
        let sensors = vec![sensor("a")];

        fetch_all_readings(&api, &sensors, today(), 30).await;

        let calls = api.calls.lock().unwrap();
        assert_eq!(calls[0].1, "2024-05-16T00:00:00");
        assert_eq!(calls[1].1, "2024-01-01T00:00:00");
    }
}
