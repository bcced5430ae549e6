//! Seams between the dashboard services and the upstream API.

use std::future::Future;

use chrono::{TimeZone, Utc};

use crate::forecast::daily_averages;
use crate::types::{
    CitySuggestion, CurrentConditions, ForecastSample, UnitSystem, WeatherError, WeatherReport,
};

/// Resolves free-text city input to ranked candidate locations.
pub trait Geocoder: Send + Sync + 'static {
    fn suggest(
        &self,
        query: &str,
        limit: u32,
    ) -> impl Future<Output = Result<Vec<CitySuggestion>, WeatherError>> + Send;
}

/// Retrieves current conditions and forecast samples for a named city.
pub trait WeatherSource: Send + Sync + 'static {
    fn current(
        &self,
        city: &str,
        units: UnitSystem,
    ) -> impl Future<Output = Result<CurrentConditions, WeatherError>> + Send;

    fn forecast(
        &self,
        city: &str,
        units: UnitSystem,
    ) -> impl Future<Output = Result<Vec<ForecastSample>, WeatherError>> + Send;
}

/// Run one fetch cycle: current conditions first, then the forecast, then
/// reduce the forecast into daily averages on `tz` calendar dates.
///
/// Either retrieval failing fails the whole cycle.
pub async fn fetch_all<S, Tz>(
    source: &S,
    city: &str,
    units: UnitSystem,
    tz: &Tz,
) -> Result<WeatherReport, WeatherError>
where
    S: WeatherSource,
    Tz: TimeZone + Sync,
{
    let current = source.current(city, units).await?;
    let samples = source.forecast(city, units).await?;

    let latest_forecast_temp = samples
        .first()
        .map(|s| s.temperature)
        .ok_or_else(|| WeatherError::parse("forecast contained no samples"))?;

    let daily = daily_averages(&samples, tz);

    tracing::debug!(
        "Fetched {} forecast samples for {} ({} days)",
        samples.len(),
        city,
        daily.len()
    );

    Ok(WeatherReport {
        city: city.to_string(),
        units,
        current,
        latest_forecast_temp,
        daily,
        fetched_at: Utc::now(),
    })
}
