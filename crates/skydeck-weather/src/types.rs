use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use skydeck_core::{NetworkError, WeatherServiceError};

pub use skydeck_core::UnitSystem;

const ICON_BASE_URL: &str = "https://openweathermap.org/img/wn";

/// Condition category reported in `weather[0].main`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeatherCategory {
    Clear,
    Rain,
    Clouds,
    Snow,
    Other(String),
}

impl WeatherCategory {
    /// Parse the upstream category name, case-insensitively.
    pub fn from_main(main: &str) -> Self {
        match main.to_lowercase().as_str() {
            "clear" => Self::Clear,
            "rain" => Self::Rain,
            "clouds" => Self::Clouds,
            "snow" => Self::Snow,
            _ => Self::Other(main.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Clear => "Clear",
            Self::Rain => "Rain",
            Self::Clouds => "Clouds",
            Self::Snow => "Snow",
            Self::Other(name) => name,
        }
    }
}

/// One candidate returned by a geocode lookup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CitySuggestion {
    pub name: String,
    #[serde(default)]
    pub country: String,
    pub lat: f64,
    pub lon: f64,
}

impl CitySuggestion {
    /// Text shown in the suggestion list, e.g. "Paris, FR".
    pub fn display(&self) -> String {
        format!("{}, {}", self.name, self.country)
    }

    /// Identity of a row in the suggestion list.
    pub fn key(&self) -> String {
        format!("{}-{}-{}-{}", self.name, self.country, self.lat, self.lon)
    }
}

/// Snapshot of present weather for one city
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub temperature: f64,
    pub description: String,
    pub humidity: u8,
    pub wind_speed: f64,
    pub icon: String,
    pub category: WeatherCategory,
}

impl CurrentConditions {
    pub fn icon_url(&self) -> String {
        format!("{}/{}@2x.png", ICON_BASE_URL, self.icon)
    }
}

/// One fixed-cadence forecast data point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSample {
    pub timestamp: DateTime<Utc>,
    pub temperature: f64,
    pub description: String,
}

/// Forecast samples averaged over one calendar day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecastPoint {
    pub date: NaiveDate,
    /// Mean of every sample on `date`, rounded to one decimal place
    pub avg_temp: f64,
    /// Description of the first sample seen for `date`
    pub description: String,
}

impl DailyForecastPoint {
    /// Numeric US date, e.g. "10/16/2026".
    pub fn date_label(&self) -> String {
        self.date.format("%-m/%-d/%Y").to_string()
    }
}

/// Everything one fetch cycle produces for a tracked city
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    pub city: String,
    pub units: UnitSystem,
    pub current: CurrentConditions,
    /// Temperature of the first forecast sample, not the current reading
    pub latest_forecast_temp: f64,
    pub daily: Vec<DailyForecastPoint>,
    pub fetched_at: DateTime<Utc>,
}

/// Weather provider errors
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("Parse error: {0}")]
    Parse(String),
}

impl WeatherError {
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }

    /// Classify as a dashboard service error; `subject` names the city or query.
    pub fn into_service_error(self, subject: &str) -> WeatherServiceError {
        match self {
            WeatherError::Api { status: 401, .. } => WeatherServiceError::InvalidApiKey,
            WeatherError::Api { status: 404, .. } => {
                WeatherServiceError::CityNotFound(subject.to_string())
            }
            other => WeatherServiceError::FetchFailed(other.to_string()),
        }
    }
}
