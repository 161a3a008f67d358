//! Year-to-date PM10 exceedance-day counts.

use std::collections::BTreeMap;

use crate::analyzers::types::Exceedance;
use crate::analyzers::utility::{date_key, mean, parse_value};
use crate::directory::Sensor;
use crate::services::open_data::RawReading;

/// Counts, per municipality, the days whose PM10 daily average strictly
/// exceeds `limit`. Only PM10 sensors present in the directory contribute;
/// a municipality with PM10 data but no exceedances still appears with a
/// zero count. Sorted descending by count, ties in alphabetical order.
pub fn count_exceedance_days(
    sensors: &[Sensor],
    year_to_date: &[RawReading],
    limit: f64,
) -> Vec<Exceedance> {
    let pm10_sensors: BTreeMap<&str, &Sensor> = sensors
        .iter()
        .filter(|s| s.pollutant == "PM10")
        .map(|s| (s.sensor_id.as_str(), s))
        .collect();

    // municipality -> date -> same-day values
    let mut daily: BTreeMap<String, BTreeMap<String, Vec<f64>>> = BTreeMap::new();

    for record in year_to_date {
        let Some(sensor) = record
            .idsensore
            .as_deref()
            .and_then(|id| pm10_sensors.get(id))
        else {
            continue;
        };
        let Some(value) = parse_value(record.valore.as_deref()) else {
            continue;
        };
        let Some(date) = record.data.as_deref().and_then(date_key) else {
            continue;
        };

        daily
            .entry(sensor.municipality_display.clone())
            .or_default()
            .entry(date.to_string())
            .or_default()
            .push(value);
    }

    let mut counts: Vec<Exceedance> = daily
        .into_iter()
        .map(|(municipality, by_date)| Exceedance {
            municipality,
            days: by_date.values().filter(|values| mean(values) > limit).count() as u32,
        })
        .collect();

    counts.sort_by(|a, b| b.days.cmp(&a.days));
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sensor(id: &str, display: &str, pollutant: &str) -> Sensor {
        Sensor {
            sensor_id: id.to_string(),
            station_id: None,
            station_name: format!("{display} Centro"),
            municipality: display.to_uppercase(),
            municipality_display: display.to_string(),
            province: Some("VA".to_string()),
            pollutant: pollutant.to_string(),
            unit: "µg/m³".to_string(),
            lat: None,
            lng: None,
        }
    }

    fn reading(id: &str, date: &str, valore: &str) -> RawReading {
        RawReading {
            idsensore: Some(id.to_string()),
            data: Some(format!("{date}T00:00:00.000")),
            valore: Some(valore.to_string()),
            stato: None,
        }
    }

    #[test]
    fn test_strict_threshold_boundary() {
        // 40 and 60 on the same day average exactly 50: not an exceedance.
        let sensors = vec![sensor("1", "Varese", "PM10")];
        let rows = vec![
            reading("1", "2024-06-01", "40"),
            reading("1", "2024-06-01", "60"),
            reading("1", "2024-06-02", "50.1"),
        ];

        let counts = count_exceedance_days(&sensors, &rows, 50.0);
        assert_eq!(counts, vec![Exceedance { municipality: "Varese".to_string(), days: 1 }]);
    }

    #[test]
    fn test_counts_distinct_days() {
        let sensors = vec![sensor("1", "Varese", "PM10")];
        let rows = vec![
            reading("1", "2024-01-10", "80"),
            reading("1", "2024-01-10", "90"),
            reading("1", "2024-01-11", "70"),
            reading("1", "2024-01-12", "20"),
        ];

        let counts = count_exceedance_days(&sensors, &rows, 50.0);
        assert_eq!(counts[0].days, 2);
    }

    #[test]
    fn test_non_pm10_sensors_ignored() {
        let sensors = vec![sensor("1", "Varese", "NO2")];
        let rows = vec![reading("1", "2024-01-10", "150")];

        assert!(count_exceedance_days(&sensors, &rows, 50.0).is_empty());
    }

    #[test]
    fn test_zero_count_municipality_still_listed() {
        let sensors = vec![sensor("1", "Varese", "PM10")];
        let rows = vec![reading("1", "2024-01-10", "20")];

        let counts = count_exceedance_days(&sensors, &rows, 50.0);
        assert_eq!(counts, vec![Exceedance { municipality: "Varese".to_string(), days: 0 }]);
    }

    #[test]
    fn test_sorted_descending_by_count() {
        let sensors = vec![
            sensor("1", "Varese", "PM10"),
            sensor("2", "Saronno", "PM10"),
            sensor("3", "Ferno", "PM10"),
        ];
        let rows = vec![
            reading("1", "2024-01-10", "80"),
            reading("2", "2024-01-10", "80"),
            reading("2", "2024-01-11", "80"),
            reading("3", "2024-01-12", "10"),
        ];

        let counts = count_exceedance_days(&sensors, &rows, 50.0);
        let order: Vec<(&str, u32)> = counts
            .iter()
            .map(|c| (c.municipality.as_str(), c.days))
            .collect();
        assert_eq!(order, [("Saronno", 2), ("Varese", 1), ("Ferno", 0)]);
    }

    #[test]
    fn test_readings_from_unknown_sensors_discarded() {
        let sensors = vec![sensor("1", "Varese", "PM10")];
        let rows = vec![reading("999", "2024-01-10", "80")];

        assert!(count_exceedance_days(&sensors, &rows, 50.0).is_empty());
    }
}
