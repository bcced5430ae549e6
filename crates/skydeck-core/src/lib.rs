pub mod config;
pub mod error;

pub use config::{
    Config, StorageBackend, StorageConfig, SuggestConfig, UnitSystem, ValidationResult,
    WeatherConfig,
};
pub use error::{
    AppError, ConfigError, NetworkError, ReqwestErrorExt, RusqliteErrorExt, StorageError,
    WeatherServiceError,
};

use anyhow::Result;

/// Initialize logging for the dashboard host.
///
/// Honors `RUST_LOG`; defaults to `info`. Safe to call more than once.
pub fn init() -> Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init();

    tracing::info!("Skydeck core initialized");
    Ok(())
}
