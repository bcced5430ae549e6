use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

use crate::error::ConfigError;

/// Environment variable consulted when no API key is set in the config file.
pub const API_KEY_ENV: &str = "OPENWEATHER_API_KEY";

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a user-friendly message summarizing all errors
    pub fn error_summary(&self) -> String {
        if self.errors.is_empty() {
            return String::new();
        }
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Measurement convention shared by every tracked city.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    #[default]
    Metric,
    Imperial,
}

impl UnitSystem {
    /// Value sent as the upstream `units` query parameter.
    pub fn api_param(self) -> &'static str {
        match self {
            UnitSystem::Metric => "metric",
            UnitSystem::Imperial => "imperial",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            UnitSystem::Metric => UnitSystem::Imperial,
            UnitSystem::Imperial => UnitSystem::Metric,
        }
    }

    pub fn temperature_label(self) -> &'static str {
        match self {
            UnitSystem::Metric => "°C",
            UnitSystem::Imperial => "°F",
        }
    }

    pub fn wind_speed_label(self) -> &'static str {
        match self {
            UnitSystem::Metric => "m/s",
            UnitSystem::Imperial => "mph",
        }
    }

    /// Label for the control that flips to the other system.
    pub fn toggle_prompt(self) -> &'static str {
        match self {
            UnitSystem::Metric => "Show in Fahrenheit",
            UnitSystem::Imperial => "Show in Celsius",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application configuration directory
    pub config_dir: PathBuf,

    /// Upstream weather API settings
    #[serde(default)]
    pub weather: WeatherConfig,

    /// City suggestion settings
    #[serde(default)]
    pub suggest: SuggestConfig,

    /// Tracked-city persistence settings
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// OpenWeatherMap API key. Falls back to `OPENWEATHER_API_KEY`.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Base URL for geocoding and weather endpoints
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Background refresh period for every tracked city
    #[serde(default = "default_refresh_seconds")]
    pub refresh_seconds: u64,

    /// Unit system used at startup
    #[serde(default)]
    pub units: UnitSystem,
}

fn default_base_url() -> String {
    "https://api.openweathermap.org".to_string()
}

fn default_timeout_seconds() -> u64 {
    10
}

fn default_refresh_seconds() -> u64 {
    300
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            timeout_seconds: default_timeout_seconds(),
            refresh_seconds: default_refresh_seconds(),
            units: UnitSystem::default(),
        }
    }
}

impl WeatherConfig {
    /// API key from the config file, else from the environment.
    pub fn resolved_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|k| !k.is_empty())
            .or_else(|| std::env::var(API_KEY_ENV).ok().filter(|k| !k.is_empty()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestConfig {
    /// Quiescence window before a lookup is dispatched
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Maximum number of candidates requested per lookup
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_debounce_ms() -> u64 {
    300
}

fn default_limit() -> u32 {
    5
}

impl Default for SuggestConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            limit: default_limit(),
        }
    }
}

/// Where the tracked-city list is persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// One JSON file per key
    #[default]
    Json,
    /// Single SQLite database
    Sqlite,
    /// Nothing durable; the list starts empty every run
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,

    /// Overrides the default location under the config directory
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("skydeck");

        Self {
            config_dir,
            weather: WeatherConfig::default(),
            suggest: SuggestConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file, creating default if it doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        Self::load_from(&config_path)
    }

    /// Load configuration from an explicit path, writing defaults there if missing
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            let config = Self::default();
            config.save_to(config_path)?;
            return Ok(config);
        }

        let contents =
            std::fs::read_to_string(config_path).context("Failed to read config file")?;

        let config: Config = toml::from_str(&contents).context("Failed to parse config file")?;

        Ok(config)
    }

    /// Load configuration and validate it
    ///
    /// Returns the config along with any validation warnings.
    /// Returns an error if loading fails or validation finds critical errors.
    pub fn load_validated() -> Result<(Self, ValidationResult), ConfigError> {
        Self::load()
            .map_err(|e| ConfigError::Load(format!("{:#}", e)))?
            .validated()
    }

    /// Validate an already loaded configuration, logging any warnings.
    pub fn validated(self) -> Result<(Self, ValidationResult), ConfigError> {
        let validation = self.validate();

        if !validation.is_valid() {
            return Err(ConfigError::Invalid(validation.error_summary()));
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok((self, validation))
    }

    /// Validate the configuration
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        self.validate_url(&self.weather.base_url, "weather.base_url", &mut result);

        if self.weather.timeout_seconds == 0 {
            result.add_error("weather.timeout_seconds", "Timeout must be greater than 0");
        }

        if self.weather.refresh_seconds == 0 {
            result.add_error(
                "weather.refresh_seconds",
                "Refresh period must be greater than 0",
            );
        } else if self.weather.refresh_seconds > 86_400 {
            result.add_warning(
                "weather.refresh_seconds",
                "Weather refresh interval is more than 24 hours",
            );
        }

        // Missing credentials surface later as upstream authentication failures
        if self.weather.resolved_api_key().is_none() {
            result.add_warning(
                "weather.api_key",
                format!("No API key configured (set it here or via {API_KEY_ENV})"),
            );
        }

        if self.suggest.debounce_ms == 0 {
            result.add_error("suggest.debounce_ms", "Debounce window must be greater than 0");
        }

        if self.suggest.limit == 0 {
            result.add_error("suggest.limit", "Suggestion limit must be greater than 0");
        }

        result
    }

    /// Validate a URL field
    fn validate_url(&self, url_str: &str, field_name: &str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }

                if url.host().is_none() {
                    result.add_error(field_name, "URL must have a host");
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }

    /// Where the tracked-city list lives for the configured backend.
    pub fn storage_path(&self) -> PathBuf {
        if let Some(path) = &self.storage.path {
            return path.clone();
        }
        match self.storage.backend {
            StorageBackend::Sqlite => self.config_dir.join("skydeck.db"),
            StorageBackend::Json | StorageBackend::Memory => self.config_dir.join("storage"),
        }
    }

    fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(config_path, contents).context("Failed to write config file")?;

        Ok(())
    }

    /// Get the path to the configuration file
    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("skydeck");

        Ok(config_dir.join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;

    #[test]
    fn test_valid_default_config() {
        let config = Config::default();
        let result = config.validate();
        assert!(result.is_valid(), "Default config should be valid: {:?}", result.errors);
    }

    #[test]
    fn test_defaults_match_dashboard_behavior() {
        let config = Config::default();
        assert_eq!(config.weather.refresh_seconds, 300);
        assert_eq!(config.suggest.debounce_ms, 300);
        assert_eq!(config.suggest.limit, 5);
        assert_eq!(config.weather.units, UnitSystem::Metric);
        assert_eq!(config.storage.backend, StorageBackend::Json);
    }

    #[test]
    fn test_invalid_url() {
        let mut config = Config::default();
        config.weather.base_url = "not-a-url".to_string();
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.field == "weather.base_url"));
    }

    #[test]
    fn test_invalid_url_scheme() {
        let mut config = Config::default();
        config.weather.base_url = "ftp://api.openweathermap.org".to_string();
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.message.contains("http or https")));
    }

    #[test]
    fn test_zero_refresh_is_error() {
        let mut config = Config::default();
        config.weather.refresh_seconds = 0;
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.field == "weather.refresh_seconds"));
    }

    #[test]
    fn test_zero_suggest_settings_are_errors() {
        let mut config = Config::default();
        config.suggest.debounce_ms = 0;
        config.suggest.limit = 0;
        let result = config.validate();
        assert!(result.errors.iter().any(|e| e.field == "suggest.debounce_ms"));
        assert!(result.errors.iter().any(|e| e.field == "suggest.limit"));
    }

    #[test]
    fn test_configured_api_key_has_no_warning() {
        let mut config = Config::default();
        config.weather.api_key = Some("abc123".to_string());
        let result = config.validate();
        assert!(!result.warnings.iter().any(|w| w.field == "weather.api_key"));
        assert_eq!(config.weather.resolved_api_key().as_deref(), Some("abc123"));
    }

    #[test]
    fn test_unit_system_labels() {
        assert_eq!(UnitSystem::Metric.api_param(), "metric");
        assert_eq!(UnitSystem::Imperial.api_param(), "imperial");
        assert_eq!(UnitSystem::Metric.wind_speed_label(), "m/s");
        assert_eq!(UnitSystem::Imperial.wind_speed_label(), "mph");
        assert_eq!(UnitSystem::Imperial.temperature_label(), "°F");
        assert_eq!(UnitSystem::Metric.toggle_prompt(), "Show in Fahrenheit");
        assert_eq!(UnitSystem::Metric.toggled(), UnitSystem::Imperial);
        assert_eq!(UnitSystem::Imperial.toggled(), UnitSystem::Metric);
    }

    #[test]
    fn test_storage_path_per_backend() {
        let mut config = Config::default();
        config.config_dir = PathBuf::from("/tmp/skydeck-test");
        config.storage.backend = StorageBackend::Sqlite;
        assert_eq!(config.storage_path(), PathBuf::from("/tmp/skydeck-test/skydeck.db"));

        config.storage.path = Some(PathBuf::from("/var/lib/skydeck"));
        assert_eq!(config.storage_path(), PathBuf::from("/var/lib/skydeck"));
    }

    #[test]
    fn test_load_from_creates_defaults_then_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let created = Config::load_from(&path).unwrap();
        assert!(path.exists());

        let reloaded = Config::load_from(&path).unwrap();
        assert_eq!(reloaded.weather.base_url, created.weather.base_url);
        assert_eq!(reloaded.suggest.limit, created.suggest.limit);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "config_dir = \"/tmp/skydeck\"\n[weather]\nunits = \"imperial\"\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.weather.units, UnitSystem::Imperial);
        assert_eq!(config.weather.refresh_seconds, 300);
        assert_eq!(config.storage.backend, StorageBackend::Json);
    }

    #[test]
    fn test_validation_result_error_summary() {
        let mut result = ValidationResult::default();
        result.add_error("field1", "error1");
        result.add_error("field2", "error2");
        let summary = result.error_summary();
        assert!(summary.contains("field1"));
        assert!(summary.contains("field2"));
    }

    #[test]
    fn test_validated_rejects_critical_errors() {
        let mut config = Config::default();
        config.weather.refresh_seconds = 0;

        match config.validated() {
            Err(ConfigError::Invalid(summary)) => {
                assert!(summary.contains("weather.refresh_seconds"))
            }
            other => panic!("expected invalid config, got {:?}", other.map(|(_, v)| v)),
        }

        let (config, validation) = Config::default().validated().unwrap();
        assert!(validation.is_valid());
        assert_eq!(config.suggest.limit, 5);
    }
}
