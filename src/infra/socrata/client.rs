use anyhow::Result;
use async_trait::async_trait;
use reqwest::{Method, Request, Url};
use tracing::debug;

use crate::config::Config;
use crate::fetch::HttpClient;
use crate::services::open_data::{OpenDataApi, RawReading, RawStation};

/// Client for SODA (Socrata) resource endpoints.
///
/// Queries are expressed server-side through `$where`, `$order` and `$limit`
/// parameters. The transport is injected so tests can run against canned
/// responses.
pub struct SocrataClient<C> {
    http: C,
    stations_url: String,
    readings_url: String,
    station_row_cap: u32,
    reading_row_cap: u32,
}

impl<C: HttpClient> SocrataClient<C> {
    pub fn new(config: &Config, http: C) -> Self {
        Self {
            http,
            stations_url: config.stations_url.clone(),
            readings_url: config.readings_url.clone(),
            station_row_cap: config.station_row_cap,
            reading_row_cap: config.reading_row_cap,
        }
    }

    async fn query(&self, base: &str, params: &[(&str, String)]) -> Result<reqwest::Response> {
        let url = Url::parse_with_params(base, params)?;
        debug!(url = %url, "Issuing open-data query");

        let response = self
            .http
            .execute(Request::new(Method::GET, url))
            .await
            .map_err(|e| anyhow::anyhow!("Failed to send request: {}", e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("API returned status {}: {}", status, body));
        }

        Ok(response)
    }
}

#[async_trait]
impl<C: HttpClient> OpenDataApi for SocrataClient<C> {
    async fn stations(&self, province: &str) -> Result<Vec<RawStation>> {
        let params = [
            ("$where", format!("provincia='{province}'")),
            ("$limit", self.station_row_cap.to_string()),
        ];

        let response = self.query(&self.stations_url, &params).await?;
        let rows: Vec<RawStation> = response
            .json()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to parse station response: {}", e))?;

        Ok(rows)
    }

    async fn readings(&self, sensor_id: &str, from: &str, to: &str) -> Result<Vec<RawReading>> {
        let params = [
            (
                "$where",
                format!("idsensore='{sensor_id}' AND data >= '{from}' AND data <= '{to}'"),
            ),
            ("$order", "data DESC".to_string()),
            ("$limit", self.reading_row_cap.to_string()),
        ];

        let response = self.query(&self.readings_url, &params).await?;
        let rows: Vec<RawReading> = response
            .json()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to parse reading response: {}", e))?;

        Ok(rows)
    }
}
