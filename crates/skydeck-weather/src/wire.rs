//! OpenWeatherMap response shapes and conversions to domain types.

use chrono::DateTime;
use serde::Deserialize;

use crate::types::{CurrentConditions, ForecastSample, WeatherCategory, WeatherError};

#[derive(Debug, Deserialize)]
pub(crate) struct CurrentResponse {
    pub weather: Vec<CurrentCondition>,
    pub main: CurrentMain,
    pub wind: WindBlock,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CurrentCondition {
    pub main: String,
    pub description: String,
    pub icon: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CurrentMain {
    pub temp: f64,
    pub humidity: f64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WindBlock {
    pub speed: f64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ForecastResponse {
    pub list: Vec<ForecastEntry>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ForecastEntry {
    pub dt: i64,
    pub main: ForecastMain,
    pub weather: Vec<ForecastCondition>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ForecastMain {
    pub temp: f64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ForecastCondition {
    pub description: String,
}

impl TryFrom<CurrentResponse> for CurrentConditions {
    type Error = WeatherError;

    fn try_from(response: CurrentResponse) -> Result<Self, Self::Error> {
        let condition = response
            .weather
            .into_iter()
            .next()
            .ok_or_else(|| WeatherError::parse("current conditions had no weather entry"))?;

        Ok(CurrentConditions {
            temperature: response.main.temp,
            description: condition.description,
            humidity: response.main.humidity.round().clamp(0.0, 100.0) as u8,
            wind_speed: response.wind.speed,
            icon: condition.icon,
            category: WeatherCategory::from_main(&condition.main),
        })
    }
}

impl TryFrom<ForecastEntry> for ForecastSample {
    type Error = WeatherError;

    fn try_from(entry: ForecastEntry) -> Result<Self, Self::Error> {
        let timestamp = DateTime::from_timestamp(entry.dt, 0)
            .ok_or_else(|| WeatherError::parse(format!("timestamp out of range: {}", entry.dt)))?;
        let description = entry
            .weather
            .into_iter()
            .next()
            .map(|w| w.description)
            .ok_or_else(|| WeatherError::parse("forecast sample had no weather entry"))?;

        Ok(ForecastSample {
            timestamp,
            temperature: entry.main.temp,
            description,
        })
    }
}

impl ForecastResponse {
    pub(crate) fn into_samples(self) -> Result<Vec<ForecastSample>, WeatherError> {
        self.list.into_iter().map(ForecastSample::try_from).collect()
    }
}
