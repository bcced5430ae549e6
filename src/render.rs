//! Plain-text views for the console host.

use std::fmt::Write;

use skydeck_core::UnitSystem;
use skydeck_services::{CardView, SuggesterState};
use skydeck_weather::WeatherReport;

pub fn card(city: &str, view: &CardView) -> String {
    let mut out = format!("== {} ==\n", city);
    match view.report() {
        Some(report) => out.push_str(&report_body(report)),
        None => {
            if let Some(status) = view.status_line(city) {
                out.push_str(&status);
                out.push('\n');
            }
        }
    }
    out
}

fn report_body(report: &WeatherReport) -> String {
    let units = report.units;
    let temp = units.temperature_label();
    let current = &report.current;

    let mut out = String::new();
    let _ = writeln!(out, "Icon: {}", current.icon_url());
    let _ = writeln!(out, "Temperature: {:.1}{}", report.latest_forecast_temp, temp);
    let _ = writeln!(out, "Weather: {}", current.description);
    let _ = writeln!(out, "Humidity: {}%", current.humidity);
    let _ = writeln!(
        out,
        "Wind Speed: {} {}",
        current.wind_speed,
        units.wind_speed_label()
    );
    let _ = writeln!(out, "5-Day Forecast (Average Temperature):");
    for day in &report.daily {
        let _ = writeln!(
            out,
            "  {:<10}  {:<20}  Avg Temp: {:.1}{}",
            day.date_label(),
            day.description,
            day.avg_temp,
            temp
        );
    }
    out
}

pub fn suggestions(state: &SuggesterState) -> String {
    let mut out = String::new();
    if state.loading {
        out.push_str("Loading suggestions...\n");
    }
    if let Some(error) = &state.error {
        let _ = writeln!(out, "{}", error);
    }
    for (i, suggestion) in state.suggestions.iter().enumerate() {
        let marker = if state.active_index == Some(i) { '>' } else { ' ' };
        let _ = writeln!(out, "{} {}. {}", marker, i + 1, suggestion.display());
    }
    out
}

pub fn units_prompt(units: UnitSystem) -> String {
    format!("[units] {}", units.toggle_prompt())
}
