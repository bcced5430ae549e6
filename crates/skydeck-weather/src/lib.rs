//! Weather data for Skydeck
//!
//! Talks to the OpenWeatherMap geocoding, current-weather and forecast
//! endpoints and reduces forecast samples into per-day averages.

pub mod forecast;
pub mod provider;
pub mod source;
pub mod types;
mod wire;

pub use forecast::daily_averages;
pub use provider::WeatherProvider;
pub use source::{fetch_all, Geocoder, WeatherSource};
pub use types::*;
