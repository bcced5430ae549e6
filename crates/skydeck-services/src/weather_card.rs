//! Per-city polling task.
//!
//! A card owns one background task that fetches immediately, then every
//! refresh period. A unit change drops any in-flight fetch, fetches again
//! and restarts the period. Dropping the card stops the task.

use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use parking_lot::RwLock;
use skydeck_weather::{fetch_all, UnitSystem, WeatherError, WeatherReport, WeatherSource};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// What a card shows in place of its content.
#[derive(Debug, Clone, PartialEq)]
pub enum CardView {
    Loading,
    Failed(String),
    Ready(Box<WeatherReport>),
}

impl CardView {
    /// Inline status text, or `None` when a report is ready.
    pub fn status_line(&self, city: &str) -> Option<String> {
        match self {
            CardView::Loading => Some(format!("Loading weather data for {}...", city)),
            CardView::Failed(message) => Some(message.clone()),
            CardView::Ready(_) => None,
        }
    }

    pub fn report(&self) -> Option<&WeatherReport> {
        match self {
            CardView::Ready(report) => Some(report.as_ref()),
            _ => None,
        }
    }
}

pub struct WeatherCard {
    city: String,
    view: Arc<RwLock<CardView>>,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl WeatherCard {
    /// Start polling `city`. Must be called from within a tokio runtime.
    pub fn spawn<W: WeatherSource>(
        city: &str,
        source: Arc<W>,
        units: watch::Receiver<UnitSystem>,
        refresh: Duration,
    ) -> Self {
        let view = Arc::new(RwLock::new(CardView::Loading));
        let cancel = CancellationToken::new();

        let task = tokio::spawn(poll(
            city.to_string(),
            source,
            units,
            refresh,
            Arc::clone(&view),
            cancel.clone(),
        ));

        tracing::info!("Started weather card for {}", city);
        Self {
            city: city.to_string(),
            view,
            cancel,
            task,
        }
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn view(&self) -> CardView {
        self.view.read().clone()
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for WeatherCard {
    fn drop(&mut self) {
        self.cancel.cancel();
        tracing::debug!("Stopped weather card for {}", self.city);
    }
}

async fn poll<W: WeatherSource>(
    city: String,
    source: Arc<W>,
    mut units_rx: watch::Receiver<UnitSystem>,
    refresh: Duration,
    view: Arc<RwLock<CardView>>,
    cancel: CancellationToken,
) {
    let mut ticker = tokio::time::interval_at(Instant::now() + refresh, refresh);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let tz = Local;

    loop {
        let units = *units_rx.borrow_and_update();
        *view.write() = CardView::Loading;

        let outcome = tokio::select! {
            _ = cancel.cancelled() => return,
            changed = units_rx.changed() => {
                if changed.is_err() {
                    return;
                }
                tracing::debug!("Units changed mid-fetch for {}; restarting", city);
                ticker.reset();
                continue;
            }
            result = fetch_all(source.as_ref(), &city, units, &tz) => result,
        };

        apply(&view, &city, outcome);

        tokio::select! {
            _ = cancel.cancelled() => return,
            changed = units_rx.changed() => {
                if changed.is_err() {
                    return;
                }
                ticker.reset();
            }
            _ = ticker.tick() => {
                tracing::debug!("Refreshing weather for {}", city);
            }
        }
    }
}

fn apply(view: &RwLock<CardView>, city: &str, outcome: Result<WeatherReport, WeatherError>) {
    let next = match outcome {
        Ok(report) => {
            tracing::debug!(
                "Weather for {}: {} ({} forecast days)",
                city,
                report.current.description,
                report.daily.len()
            );
            CardView::Ready(Box::new(report))
        }
        Err(e) => {
            let err = e.into_service_error(city);
            tracing::warn!("Weather fetch for {} failed: {}", city, err);
            CardView::Failed(err.user_message().to_string())
        }
    };
    *view.write() = next;
}
