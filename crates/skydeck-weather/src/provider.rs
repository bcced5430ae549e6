use reqwest::Client;
use serde::de::DeserializeOwned;
use skydeck_core::{ReqwestErrorExt, WeatherConfig};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use crate::source::{Geocoder, WeatherSource};
use crate::types::{CitySuggestion, CurrentConditions, ForecastSample, UnitSystem, WeatherError};
use crate::wire::{CurrentResponse, ForecastResponse};

const GEOCODE_PATH: &str = "geo/1.0/direct";
const CURRENT_PATH: &str = "data/2.5/weather";
const FORECAST_PATH: &str = "data/2.5/forecast";
const USER_AGENT: &str = concat!("skydeck/", env!("CARGO_PKG_VERSION"));

/// HTTP client for the OpenWeatherMap geocoding, current-weather and
/// forecast endpoints.
#[derive(Debug, Clone)]
pub struct WeatherProvider {
    client: Arc<Client>,
    base_url: Url,
    api_key: Option<String>,
}

impl WeatherProvider {
    pub fn new(
        base_url: &str,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, WeatherError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| WeatherError::Network(e.into_network_error()))?;

        // Join relative paths onto the base rather than replacing its last segment
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{}/", base_url)
        };
        let base_url = Url::parse(&normalized)
            .map_err(|e| WeatherError::parse(format!("invalid base URL {}: {}", base_url, e)))?;

        if api_key.is_none() {
            tracing::warn!("No OpenWeatherMap API key configured; requests will be rejected");
        }

        Ok(Self {
            client: Arc::new(client),
            base_url,
            api_key,
        })
    }

    pub fn from_config(config: &WeatherConfig) -> Result<Self, WeatherError> {
        Self::new(
            &config.base_url,
            config.resolved_api_key(),
            Duration::from_secs(config.timeout_seconds),
        )
    }

    /// Look up at most `limit` candidate locations for free-text input.
    pub async fn geocode(
        &self,
        query: &str,
        limit: u32,
    ) -> Result<Vec<CitySuggestion>, WeatherError> {
        tracing::debug!("Geocoding {:?} (limit {})", query, limit);
        let limit = limit.to_string();
        let suggestions: Vec<CitySuggestion> = self
            .get_json(GEOCODE_PATH, &[("q", query), ("limit", limit.as_str())])
            .await?;
        tracing::debug!("Geocode returned {} candidates", suggestions.len());
        Ok(suggestions)
    }

    pub async fn fetch_current(
        &self,
        city: &str,
        units: UnitSystem,
    ) -> Result<CurrentConditions, WeatherError> {
        tracing::debug!("Fetching current conditions for {}", city);
        let response: CurrentResponse = self
            .get_json(CURRENT_PATH, &[("q", city), ("units", units.api_param())])
            .await?;
        CurrentConditions::try_from(response)
    }

    pub async fn fetch_forecast(
        &self,
        city: &str,
        units: UnitSystem,
    ) -> Result<Vec<ForecastSample>, WeatherError> {
        tracing::debug!("Fetching forecast for {}", city);
        let response: ForecastResponse = self
            .get_json(FORECAST_PATH, &[("q", city), ("units", units.api_param())])
            .await?;
        response.into_samples()
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<T, WeatherError> {
        let url = self
            .base_url
            .join(path)
            .map_err(|e| WeatherError::parse(format!("invalid endpoint {}: {}", path, e)))?;

        let mut request = self.client.get(url).query(params);
        if let Some(key) = &self.api_key {
            request = request.query(&[("appid", key.as_str())]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| WeatherError::Network(e.into_network_error()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(WeatherError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| WeatherError::parse(e.to_string()))
    }
}

impl Geocoder for WeatherProvider {
    async fn suggest(&self, query: &str, limit: u32) -> Result<Vec<CitySuggestion>, WeatherError> {
        self.geocode(query, limit).await
    }
}

impl WeatherSource for WeatherProvider {
    async fn current(
        &self,
        city: &str,
        units: UnitSystem,
    ) -> Result<CurrentConditions, WeatherError> {
        self.fetch_current(city, units).await
    }

    async fn forecast(
        &self,
        city: &str,
        units: UnitSystem,
    ) -> Result<Vec<ForecastSample>, WeatherError> {
        self.fetch_forecast(city, units).await
    }
}
