//! Ordered, persisted list of tracked cities.

use crate::kv::{KeyValueStore, StoreError, StoreResult};

/// Record name holding the JSON array of tracked city names.
pub const CITIES_KEY: &str = "cities";

/// Tracked cities in insertion order, mirrored to a `KeyValueStore`.
///
/// Duplicate checks here are exact-string; case-folded rejection happens
/// where a city is confirmed (see `Suggester::confirm`).
pub struct TrackedCityStore<S: KeyValueStore> {
    backend: S,
    cities: Vec<String>,
}

impl<S: KeyValueStore> TrackedCityStore<S> {
    /// Load the persisted list once. Missing, unreadable, or malformed
    /// records all yield an empty list.
    pub fn open(backend: S) -> Self {
        let cities = match backend.get(CITIES_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<String>>(&raw) {
                Ok(cities) => cities,
                Err(e) => {
                    tracing::warn!("Ignoring malformed tracked-city record: {}", e);
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!("Failed to load tracked cities: {}", e);
                Vec::new()
            }
        };

        tracing::info!("Loaded {} tracked cities", cities.len());
        Self { backend, cities }
    }

    pub fn cities(&self) -> &[String] {
        &self.cities
    }

    pub fn contains(&self, city: &str) -> bool {
        self.cities.iter().any(|c| c == city)
    }

    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }

    /// Append `city` unless the exact string is already tracked.
    ///
    /// Returns whether the list changed. The list is persisted either way,
    /// and is left untouched when the write fails.
    pub fn add(&mut self, city: &str) -> StoreResult<bool> {
        let mut next = self.cities.clone();
        let changed = !self.contains(city);
        if changed {
            next.push(city.to_string());
        }
        self.commit(next)?;
        Ok(changed)
    }

    /// Remove `city` by exact match. Absent cities are not an error.
    pub fn remove(&mut self, city: &str) -> StoreResult<bool> {
        let mut next = self.cities.clone();
        next.retain(|c| c != city);
        let changed = next.len() != self.cities.len();
        self.commit(next)?;
        Ok(changed)
    }

    /// Forget every city and delete the persisted record.
    ///
    /// The in-memory list is only emptied once the record is gone.
    pub fn clear(&mut self) -> StoreResult<()> {
        self.backend.remove(CITIES_KEY)?;
        self.cities.clear();
        Ok(())
    }

    fn commit(&mut self, next: Vec<String>) -> StoreResult<()> {
        let json = serde_json::to_string(&next)
            .map_err(|e| StoreError::write(format!("Failed to serialize cities: {}", e)))?;
        self.backend.set(CITIES_KEY, &json)?;
        self.cities = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::kv::testing::LockableStore;
    use crate::kv::MemoryStore;
    use std::sync::Arc;

    fn persisted(backend: &MemoryStore) -> Option<Vec<String>> {
        backend
            .get(CITIES_KEY)
            .unwrap()
            .map(|raw| serde_json::from_str(&raw).unwrap())
    }

    #[test]
    fn test_add_appends_and_persists() {
        let backend = Arc::new(MemoryStore::new());
        let mut store = TrackedCityStore::open(backend.clone());

        assert!(store.add("Paris").unwrap());
        assert!(store.add("Tokyo").unwrap());

        assert_eq!(store.cities(), ["Paris", "Tokyo"]);
        assert_eq!(persisted(&backend).unwrap(), vec!["Paris", "Tokyo"]);
    }

    #[test]
    fn test_add_is_idempotent_for_exact_string() {
        let mut store = TrackedCityStore::open(MemoryStore::new());

        store.add("Paris").unwrap();
        assert!(!store.add("Paris").unwrap());

        assert_eq!(store.cities(), ["Paris"]);
    }

    #[test]
    fn test_add_does_not_case_fold() {
        let mut store = TrackedCityStore::open(MemoryStore::new());
        store.add("Paris").unwrap();
        store.add("paris").unwrap();
        assert_eq!(store.cities().len(), 2);
    }

    #[test]
    fn test_remove_is_exact_and_tolerates_absent() {
        let backend = Arc::new(MemoryStore::new());
        let mut store = TrackedCityStore::open(backend.clone());
        store.add("Paris").unwrap();
        store.add("Lima").unwrap();

        assert!(!store.remove("paris").unwrap());
        assert!(!store.remove("Berlin").unwrap());
        assert!(store.remove("Paris").unwrap());

        assert_eq!(store.cities(), ["Lima"]);
        assert_eq!(persisted(&backend).unwrap(), vec!["Lima"]);
    }

    #[test]
    fn test_clear_removes_record() {
        let backend = Arc::new(MemoryStore::new());
        let mut store = TrackedCityStore::open(backend.clone());
        store.add("Paris").unwrap();

        store.clear().unwrap();

        assert!(store.is_empty());
        assert_eq!(persisted(&backend), None);
    }

    #[test]
    fn test_removing_last_city_keeps_empty_record() {
        let backend = Arc::new(MemoryStore::new());
        let mut store = TrackedCityStore::open(backend.clone());
        store.add("Paris").unwrap();

        store.remove("Paris").unwrap();

        assert_eq!(persisted(&backend), Some(Vec::new()));
    }

    #[test]
    fn test_reload_preserves_order() {
        let backend = Arc::new(MemoryStore::new());
        {
            let mut store = TrackedCityStore::open(backend.clone());
            for city in ["Zurich", "Accra", "Manila"] {
                store.add(city).unwrap();
            }
        }

        let reloaded = TrackedCityStore::open(backend);
        assert_eq!(reloaded.cities(), ["Zurich", "Accra", "Manila"]);
    }

    #[test]
    fn test_malformed_record_loads_empty() {
        let backend = MemoryStore::new();
        backend.set(CITIES_KEY, "{not json").unwrap();

        let store = TrackedCityStore::open(backend);
        assert!(store.is_empty());
    }

    #[test]
    fn test_failed_writes_leave_list_matching_record() {
        let backend = Arc::new(LockableStore::default());
        let mut store = TrackedCityStore::open(backend.clone());
        store.add("Paris").unwrap();
        backend.lock();

        assert!(matches!(store.add("Oslo"), Err(StoreError::Write(_))));
        assert!(store.remove("Paris").is_err());
        assert!(store.clear().is_err());

        assert_eq!(store.cities(), ["Paris"]);
        let reloaded = TrackedCityStore::open(backend);
        assert_eq!(reloaded.cities(), store.cities());
    }
}
