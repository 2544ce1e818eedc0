use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use crate::{
    model::{WeatherLookup, WeatherRecord},
    provider::{normalize_base_url, truncate_body},
};

use super::WeatherProvider;

const DEFAULT_BASE_URL: &str = "https://api.weatherapi.com/v1";

/// Current conditions from WeatherAPI.com.
#[derive(Debug, Clone)]
pub struct WeatherApiProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl WeatherApiProvider {
    pub fn new(api_key: String) -> Self {
        Self { api_key, base_url: DEFAULT_BASE_URL.to_string(), http: Client::new() }
    }

    pub fn with_base_url(api_key: String, base_url: &str) -> Result<Self> {
        Ok(Self { api_key, base_url: normalize_base_url(base_url)?, http: Client::new() })
    }

    async fn fetch_current(&self, city: &str) -> Result<WeatherLookup> {
        let url = format!("{}/current.json", self.base_url);
        tracing::debug!(city, "Requesting current conditions");

        let res = self
            .http
            .get(&url)
            .query(&[("key", self.api_key.as_str()), ("q", city)])
            .send()
            .await
            .context("Failed to send request to WeatherAPI.com (current)")?;

        let status = res.status();
        let body = res.text().await.context("Failed to read WeatherAPI current response body")?;

        // WeatherAPI reports unknown locations with an `error` key, usually with a 400.
        // Its presence is what counts, whatever shape the value has.
        let json = serde_json::from_str::<Value>(&body);
        if let Some(err) = json.as_ref().ok().and_then(|v| v.get("error")).filter(|e| !e.is_null()) {
            let code = err.get("code").and_then(Value::as_i64);
            let message = err.get("message").and_then(Value::as_str).or_else(|| err.as_str());
            tracing::warn!(?code, ?message, %status, "WeatherAPI rejected location");
            return Ok(WeatherLookup::NotFound);
        }

        if !status.is_success() {
            return Err(anyhow::anyhow!(
                "WeatherAPI current request failed with status {}: {}",
                status,
                truncate_body(&body),
            ));
        }

        let parsed: WaResponse = serde_json::from_value(
            json.context("Failed to parse WeatherAPI current JSON")?,
        )
        .context("Unexpected WeatherAPI current conditions format")?;
        let current = parsed
            .current
            .ok_or_else(|| anyhow::anyhow!("WeatherAPI response contained no current conditions"))?;

        Ok(WeatherLookup::Found(WeatherRecord {
            temperature_c: current.temp_c,
            wind_speed_kph: current.wind_kph,
        }))
    }
}

#[derive(Debug, Deserialize)]
struct WaCurrent {
    temp_c: f64,
    wind_kph: f64,
}

#[derive(Debug, Deserialize)]
struct WaResponse {
    current: Option<WaCurrent>,
}

#[async_trait]
impl WeatherProvider for WeatherApiProvider {
    async fn current_conditions(&self, city: &str) -> Result<WeatherLookup> {
        self.fetch_current(city).await
    }
}
