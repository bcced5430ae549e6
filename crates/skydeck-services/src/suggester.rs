//! City search box: debounced geocode lookups plus keyboard navigation.
//!
//! Lookup results land in a shared `SuggesterState` from a background task,
//! so callers read a snapshot via [`Suggester::state`] rather than awaiting
//! the lookup.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use skydeck_core::{SuggestConfig, WeatherServiceError};
use skydeck_weather::{CitySuggestion, Geocoder};

use crate::debounce::Debouncer;

/// Keys the suggestion list reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavKey {
    Down,
    Up,
    Enter,
}

/// Outcome of confirming a city name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Confirmation {
    /// Not tracked yet; the caller should add it.
    Accepted(String),
    /// Already tracked under some casing.
    Duplicate(String),
    /// Nothing to add.
    Empty,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SuggesterState {
    pub query: String,
    pub suggestions: Vec<CitySuggestion>,
    pub loading: bool,
    pub error: Option<String>,
    /// Highlighted row; `None` when nothing is highlighted.
    pub active_index: Option<usize>,
}

pub struct Suggester<G: Geocoder> {
    geocoder: Arc<G>,
    limit: u32,
    state: Arc<RwLock<SuggesterState>>,
    debouncer: Debouncer,
}

impl<G: Geocoder> Suggester<G> {
    pub fn new(geocoder: Arc<G>, debounce: Duration, limit: u32) -> Self {
        Self {
            geocoder,
            limit,
            state: Arc::new(RwLock::new(SuggesterState::default())),
            debouncer: Debouncer::new(debounce),
        }
    }

    pub fn from_config(geocoder: Arc<G>, config: &SuggestConfig) -> Self {
        Self::new(
            geocoder,
            Duration::from_millis(config.debounce_ms),
            config.limit,
        )
    }

    /// Snapshot of the current search state.
    pub fn state(&self) -> SuggesterState {
        self.state.read().clone()
    }

    /// Record a keystroke.
    ///
    /// Empty input clears suggestions at once. Anything else schedules a
    /// lookup that replaces any lookup still pending or in flight.
    pub fn input(&mut self, query: &str) {
        {
            let mut state = self.state.write();
            state.query = query.to_string();
            state.active_index = None;
        }

        if query.is_empty() {
            self.debouncer.cancel();
            let mut state = self.state.write();
            state.suggestions.clear();
            state.loading = false;
            return;
        }

        let geocoder = Arc::clone(&self.geocoder);
        let state = Arc::clone(&self.state);
        let query = query.to_string();
        let limit = self.limit;

        self.debouncer.schedule(async move {
            {
                let mut s = state.write();
                s.loading = true;
                s.error = None;
            }

            tracing::debug!("Looking up suggestions for {:?}", query);
            let result = geocoder.suggest(&query, limit).await;

            let mut s = state.write();
            match result {
                Ok(suggestions) => {
                    tracing::debug!("{} suggestions for {:?}", suggestions.len(), query);
                    s.suggestions = suggestions;
                }
                Err(e) => {
                    let err = WeatherServiceError::SuggestionsFailed(e.to_string());
                    tracing::warn!("{}", err);
                    s.suggestions.clear();
                    s.error = Some(err.user_message().to_string());
                }
            }
            s.loading = false;
        });
    }

    /// Move the highlight or confirm the highlighted row.
    ///
    /// Returns a confirmation only for `Enter` on a highlighted row.
    pub fn key(&mut self, key: NavKey, tracked: &[String]) -> Option<Confirmation> {
        let picked = {
            let mut state = self.state.write();
            let len = state.suggestions.len();
            match key {
                NavKey::Down => {
                    state.active_index = match state.active_index {
                        None if len > 0 => Some(0),
                        Some(i) if i + 1 < len => Some(i + 1),
                        other => other,
                    };
                    None
                }
                NavKey::Up => {
                    if let Some(i) = state.active_index.filter(|&i| i > 0) {
                        state.active_index = Some(i - 1);
                    }
                    None
                }
                NavKey::Enter => match state.active_index {
                    Some(i) => {
                        let name = state.suggestions.get(i).map(|s| s.name.clone());
                        state.active_index = None;
                        name
                    }
                    None => return None,
                },
            }
        };

        picked.map(|name| self.confirm(&name, tracked))
    }

    /// Confirm the suggestion at `index` (a click on the list).
    pub fn select(&mut self, index: usize, tracked: &[String]) -> Option<Confirmation> {
        let name = self.state.read().suggestions.get(index)?.name.clone();
        Some(self.confirm(&name, tracked))
    }

    /// Confirm whatever is typed in the box (the add button).
    pub fn submit(&mut self, tracked: &[String]) -> Confirmation {
        let query = self.state.read().query.clone();
        self.confirm(&query, tracked)
    }

    /// Accept `city` unless it is empty or already tracked ignoring case.
    /// Acceptance clears the search box.
    pub fn confirm(&mut self, city: &str, tracked: &[String]) -> Confirmation {
        if city.is_empty() {
            return Confirmation::Empty;
        }

        let folded = city.to_lowercase();
        if tracked.iter().any(|c| c.to_lowercase() == folded) {
            tracing::debug!("{} is already tracked", city);
            return Confirmation::Duplicate(city.to_string());
        }

        self.debouncer.cancel();
        let mut state = self.state.write();
        state.query.clear();
        state.suggestions.clear();
        state.loading = false;
        state.active_index = None;

        Confirmation::Accepted(city.to_string())
    }
}
