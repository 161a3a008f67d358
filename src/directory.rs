//! Station directory: turns raw metadata rows into [`Sensor`] records.
//!
//! A row survives only if its municipality is active and its sensor-type
//! string maps to a known pollutant. The serialized field names match the
//! upstream dataset so the dashboard can consume `stazioni.json` unchanged.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::Config;
use crate::services::open_data::RawStation;

/// A single pollutant-measuring instrument at a station.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sensor {
    #[serde(rename = "idsensore")]
    pub sensor_id: String,
    #[serde(rename = "idstazione")]
    pub station_id: Option<String>,
    #[serde(rename = "nomestazione")]
    pub station_name: String,
    #[serde(rename = "comune")]
    pub municipality: String,
    #[serde(rename = "comune_formatted")]
    pub municipality_display: String,
    #[serde(rename = "provincia")]
    pub province: Option<String>,
    #[serde(rename = "inquinante")]
    pub pollutant: String,
    #[serde(rename = "unitamisura")]
    pub unit: String,
    pub lat: Option<String>,
    pub lng: Option<String>,
}

/// Maps a raw sensor-type string to a normalized pollutant code by substring
/// match against the ordered table. First match wins.
fn normalize_pollutant<'a>(table: &'a [(String, String)], sensor_type: &str) -> Option<&'a str> {
    table
        .iter()
        .find(|(substring, _)| sensor_type.contains(substring.as_str()))
        .map(|(_, code)| code.as_str())
}

/// Formats a municipality name for display: lookup table first, otherwise
/// each word capitalized.
pub fn format_municipality(config: &Config, name: &str) -> String {
    let upper = name.to_uppercase();
    if let Some(display) = config.municipality_names.get(&upper) {
        return display.clone();
    }

    upper
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Builds the station directory from raw metadata rows.
///
/// Rows in excluded municipalities, rows without a sensor id, and rows whose
/// type matches no pollutant are dropped.
pub fn build_directory(config: &Config, rows: Vec<RawStation>) -> Vec<Sensor> {
    let mut sensors = Vec::new();

    for row in rows {
        let municipality = row.comune.as_deref().unwrap_or("").to_uppercase();
        if config.excluded_municipalities.contains(&municipality) {
            continue;
        }

        let Some(sensor_id) = row.idsensore else {
            continue;
        };

        let sensor_type = row.nometiposensore.as_deref().unwrap_or("");
        let Some(pollutant) = normalize_pollutant(&config.pollutant_table, sensor_type) else {
            continue;
        };

        sensors.push(Sensor {
            sensor_id,
            station_id: row.idstazione,
            station_name: row.nomestazione.unwrap_or_default(),
            municipality_display: format_municipality(config, &municipality),
            municipality,
            province: row.provincia,
            pollutant: pollutant.to_string(),
            unit: row.unitamisura.unwrap_or_else(|| "µg/m³".to_string()),
            lat: row.lat,
            lng: row.lng,
        });
    }

    info!(
        sensor_count = sensors.len(),
        province = %config.province,
        "Station directory built"
    );

    sensors
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(comune: &str, tipo: &str, id: &str) -> RawStation {
        RawStation {
            idsensore: Some(id.to_string()),
            idstazione: Some("100".to_string()),
            nomestazione: Some(format!("{comune} via Test")),
            comune: Some(comune.to_string()),
            provincia: Some("VA".to_string()),
            nometiposensore: Some(tipo.to_string()),
            unitamisura: Some("µg/m³".to_string()),
            lat: Some("45.8".to_string()),
            lng: Some("8.8".to_string()),
        }
    }

    #[test]
    fn test_known_pollutant_substrings_are_normalized() {
        let config = Config::default();
        let rows = vec![
            raw("Varese", "Particelle sospese PM10", "1"),
            raw("Varese", "Particelle sospese PM2.5", "2"),
            raw("Varese", "Biossido di Azoto", "3"),
            raw("Varese", "Ossidi di Azoto", "4"),
        ];

        let sensors = build_directory(&config, rows);
        let codes: Vec<&str> = sensors.iter().map(|s| s.pollutant.as_str()).collect();
        assert_eq!(codes, ["PM10", "PM2.5", "NO2", "NO2"]);
    }

    #[test]
    fn test_unknown_sensor_type_is_excluded() {
        let config = Config::default();
        let rows = vec![
            raw("Varese", "Ozono", "1"),
            raw("Varese", "Monossido di Carbonio", "2"),
            raw("Varese", "", "3"),
        ];

        assert!(build_directory(&config, rows).is_empty());
    }

    #[test]
    fn test_excluded_municipalities_are_dropped() {
        let config = Config::default();
        let rows = vec![
            raw("GALLARATE", "Particelle sospese PM10", "1"),
            raw("Lonate Pozzolo", "Particelle sospese PM10", "2"),
            raw("Ferno", "Particelle sospese PM10", "3"),
        ];

        let sensors = build_directory(&config, rows);
        assert_eq!(sensors.len(), 1);
        assert_eq!(sensors[0].municipality, "FERNO");
    }

    #[test]
    fn test_row_without_sensor_id_is_dropped() {
        let config = Config::default();
        let mut row = raw("Varese", "Particelle sospese PM10", "1");
        row.idsensore = None;

        assert!(build_directory(&config, vec![row]).is_empty());
    }

    #[test]
    fn test_missing_unit_defaults_to_micrograms() {
        let config = Config::default();
        let mut row = raw("Varese", "Particelle sospese PM10", "1");
        row.unitamisura = None;

        let sensors = build_directory(&config, vec![row]);
        assert_eq!(sensors[0].unit, "µg/m³");
    }

    #[test]
    fn test_format_municipality_uses_lookup_then_title_case() {
        let config = Config::default();
        assert_eq!(format_municipality(&config, "BUSTO ARSIZIO"), "Busto Arsizio");
        assert_eq!(format_municipality(&config, "busto arsizio"), "Busto Arsizio");
        // Not in the table: word-by-word capitalization fallback.
        assert_eq!(format_municipality(&config, "CASTELLANZA"), "Castellanza");
        assert_eq!(
            format_municipality(&config, "CASSANO MAGNAGO"),
            "Cassano Magnago"
        );
    }

    #[test]
    fn test_first_substring_match_wins() {
        // "Particelle sospese PM2.5" also contains "PM2.5"; the earlier
        // table entry must take effect and both map to the same code.
        let config = Config::default();
        let sensors = build_directory(
            &config,
            vec![raw("Varese", "Particelle sospese PM2.5", "1")],
        );
        assert_eq!(sensors[0].pollutant, "PM2.5");
    }
}
