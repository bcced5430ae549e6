//! Dashboard services: persistence, the tracked-city store, city search and
//! per-city weather polling.

pub mod city_store;
pub mod dashboard;
pub mod debounce;
pub mod json_store;
pub mod kv;
pub mod sqlite_store;
pub mod suggester;
pub mod weather_card;

pub use city_store::{TrackedCityStore, CITIES_KEY};
pub use dashboard::Dashboard;
pub use debounce::Debouncer;
pub use json_store::JsonFileStore;
pub use kv::{KeyValueStore, MemoryStore, StoreError, StoreResult};
pub use sqlite_store::SqliteKvStore;
pub use suggester::{Confirmation, NavKey, Suggester, SuggesterState};
pub use weather_card::{CardView, WeatherCard};

use skydeck_core::{Config, StorageBackend};

/// Open the persistence backend named in `config`.
///
/// Falls back to an in-memory store when the durable one cannot be opened,
/// so the dashboard still runs with an empty list.
pub fn open_store(config: &Config) -> Box<dyn KeyValueStore> {
    let path = config.storage_path();
    let opened: StoreResult<Box<dyn KeyValueStore>> = match config.storage.backend {
        StorageBackend::Json => {
            JsonFileStore::open(&path).map(|s| Box::new(s) as Box<dyn KeyValueStore>)
        }
        StorageBackend::Sqlite => {
            SqliteKvStore::open(&path).map(|s| Box::new(s) as Box<dyn KeyValueStore>)
        }
        StorageBackend::Memory => Ok(Box::new(MemoryStore::new())),
    };

    match opened {
        Ok(store) => store,
        Err(e) => {
            tracing::warn!(
                "Persistent storage unavailable ({}); cities will not be saved",
                e
            );
            Box::new(MemoryStore::new())
        }
    }
}
