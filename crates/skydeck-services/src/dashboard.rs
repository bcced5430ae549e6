//! Dashboard orchestrator.
//!
//! Owns the tracked-city list, the shared unit flag, and one `WeatherCard`
//! per tracked city. Cards follow the list: every mutation persists first,
//! then cards are reconciled against the stored order. A mutation whose
//! write fails changes nothing.

use std::sync::Arc;
use std::time::Duration;

use skydeck_core::{AppError, UnitSystem, WeatherConfig};
use skydeck_weather::WeatherSource;
use tokio::sync::watch;

use crate::city_store::TrackedCityStore;
use crate::kv::{KeyValueStore, StoreError};
use crate::weather_card::WeatherCard;

pub struct Dashboard<S: KeyValueStore, W: WeatherSource> {
    store: TrackedCityStore<S>,
    source: Arc<W>,
    units_tx: watch::Sender<UnitSystem>,
    cards: Vec<WeatherCard>,
    refresh: Duration,
}

impl<S: KeyValueStore, W: WeatherSource> Dashboard<S, W> {
    /// Build the dashboard and start a card for every stored city.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(
        store: TrackedCityStore<S>,
        source: Arc<W>,
        units: UnitSystem,
        refresh: Duration,
    ) -> Self {
        let (units_tx, _) = watch::channel(units);
        let mut dashboard = Self {
            store,
            source,
            units_tx,
            cards: Vec::new(),
            refresh,
        };
        dashboard.sync_cards();
        dashboard
    }

    pub fn from_config(store: TrackedCityStore<S>, source: Arc<W>, config: &WeatherConfig) -> Self {
        Self::new(
            store,
            source,
            config.units,
            Duration::from_secs(config.refresh_seconds),
        )
    }

    pub fn cities(&self) -> &[String] {
        self.store.cities()
    }

    pub fn units(&self) -> UnitSystem {
        *self.units_tx.borrow()
    }

    /// Cards in tracked order.
    pub fn cards(&self) -> &[WeatherCard] {
        &self.cards
    }

    pub fn card(&self, city: &str) -> Option<&WeatherCard> {
        self.cards.iter().find(|c| c.city() == city)
    }

    /// Track `city`. Exact duplicates are ignored.
    ///
    /// A failed write leaves both the list and the cards unchanged.
    pub fn add(&mut self, city: &str) -> Result<bool, AppError> {
        let added = self.store.add(city).map_err(|e| persist_failed("save", e))?;
        if added {
            self.sync_cards();
            tracing::info!("Tracking {}", city);
        }
        Ok(added)
    }

    /// Stop tracking `city`. Unknown cities are ignored.
    pub fn remove(&mut self, city: &str) -> Result<bool, AppError> {
        let removed = self
            .store
            .remove(city)
            .map_err(|e| persist_failed("save", e))?;
        if removed {
            self.sync_cards();
            tracing::info!("Stopped tracking {}", city);
        }
        Ok(removed)
    }

    /// Stop tracking everything and delete the stored list.
    pub fn clear(&mut self) -> Result<(), AppError> {
        self.store.clear().map_err(|e| persist_failed("delete", e))?;
        self.sync_cards();
        tracing::info!("Cleared all tracked cities");
        Ok(())
    }

    /// Flip metric/imperial. Cards pick up the change themselves.
    pub fn toggle_units(&mut self) -> UnitSystem {
        let next = self.units().toggled();
        self.units_tx.send_replace(next);
        tracing::info!("Units set to {}", next.api_param());
        next
    }

    /// Start cards for new cities, drop cards for removed ones, and keep
    /// card order equal to the stored order.
    fn sync_cards(&mut self) {
        let mut previous = std::mem::take(&mut self.cards);
        let mut next = Vec::with_capacity(self.store.cities().len());

        for city in self.store.cities() {
            match previous.iter().position(|c| c.city() == city) {
                Some(pos) => next.push(previous.swap_remove(pos)),
                None => next.push(WeatherCard::spawn(
                    city,
                    Arc::clone(&self.source),
                    self.units_tx.subscribe(),
                    self.refresh,
                )),
            }
        }

        // Whatever is left is no longer tracked; dropping stops the task
        drop(previous);
        self.cards = next;
    }
}

fn persist_failed(action: &str, err: StoreError) -> AppError {
    tracing::warn!("Failed to {} tracked cities: {}", action, err);
    AppError::from(err)
}
