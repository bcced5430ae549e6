//! Integration tests for the dashboard against real stores and a mock
//! OpenWeatherMap server.

#![allow(clippy::unwrap_used, clippy::panic)]

use std::sync::Arc;
use std::time::Duration;

use skydeck_core::{Config, StorageBackend, StorageConfig, UnitSystem};
use skydeck_services::{
    open_store, CardView, Confirmation, Dashboard, JsonFileStore, KeyValueStore, NavKey,
    SqliteKvStore, Suggester, TrackedCityStore, CITIES_KEY,
};
use skydeck_weather::WeatherProvider;
use tempfile::tempdir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const REFRESH: Duration = Duration::from_secs(300);

async fn mock_weather_api() -> MockServer {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .and(query_param("q", "Madrid"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "weather": [{"main": "Clear", "description": "clear sky", "icon": "01d"}],
            "main": {"temp": 27.3, "humidity": 30},
            "wind": {"speed": 2.6}
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/forecast"))
        .and(query_param("q", "Madrid"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "list": [
                {"dt": 1_792_152_000, "main": {"temp": 26.0}, "weather": [{"description": "clear sky"}]},
                {"dt": 1_792_162_800, "main": {"temp": 22.0}, "weather": [{"description": "few clouds"}]}
            ]
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .and(query_param("q", "Nowhereville"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "cod": "404",
            "message": "city not found"
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/geo/1.0/direct"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"name": "Madrid", "country": "ES", "lat": 40.4167, "lon": -3.7033},
            {"name": "Madrid", "country": "US", "lat": 41.8766, "lon": -93.8238}
        ])))
        .mount(&mock_server)
        .await;

    mock_server
}

fn provider(server: &MockServer) -> Arc<WeatherProvider> {
    Arc::new(
        WeatherProvider::new(&server.uri(), Some("test-key".into()), Duration::from_secs(5))
            .unwrap(),
    )
}

/// Wait for a card to leave the loading state.
async fn wait_for_view<S: KeyValueStore>(
    dash: &Dashboard<S, WeatherProvider>,
    city: &str,
) -> CardView {
    for _ in 0..100 {
        let view = dash.card(city).unwrap().view();
        if view != CardView::Loading {
            return view;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("card for {} never finished loading", city);
}

#[tokio::test]
async fn test_cities_survive_restart_in_order() {
    let dir = tempdir().unwrap();
    let mock_server = mock_weather_api().await;

    {
        let store = TrackedCityStore::open(JsonFileStore::open(dir.path()).unwrap());
        let mut dash = Dashboard::new(store, provider(&mock_server), UnitSystem::Metric, REFRESH);
        for city in ["Madrid", "Nowhereville", "Tromso"] {
            dash.add(city).unwrap();
        }
        dash.remove("Tromso").unwrap();
        dash.add("Tromso").unwrap();
    }

    let reloaded = TrackedCityStore::open(JsonFileStore::open(dir.path()).unwrap());
    assert_eq!(reloaded.cities(), ["Madrid", "Nowhereville", "Tromso"]);
}

#[tokio::test]
async fn test_clear_is_distinct_from_empty_list() {
    let cleared_dir = tempdir().unwrap();
    let emptied_dir = tempdir().unwrap();

    let mut cleared = TrackedCityStore::open(JsonFileStore::open(cleared_dir.path()).unwrap());
    cleared.add("Madrid").unwrap();
    cleared.clear().unwrap();

    let mut emptied = TrackedCityStore::open(JsonFileStore::open(emptied_dir.path()).unwrap());
    emptied.add("Madrid").unwrap();
    emptied.remove("Madrid").unwrap();

    let cleared_backend = JsonFileStore::open(cleared_dir.path()).unwrap();
    let emptied_backend = JsonFileStore::open(emptied_dir.path()).unwrap();
    assert_eq!(cleared_backend.get(CITIES_KEY).unwrap(), None);
    assert_eq!(emptied_backend.get(CITIES_KEY).unwrap().as_deref(), Some("[]"));

    assert!(TrackedCityStore::open(cleared_backend).is_empty());
    assert!(TrackedCityStore::open(emptied_backend).is_empty());
}

#[tokio::test]
async fn test_sqlite_backend_round_trip() {
    let dir = tempdir().unwrap();
    let db = dir.path().join("skydeck.db");

    {
        let mut store = TrackedCityStore::open(SqliteKvStore::open(&db).unwrap());
        store.add("Nairobi").unwrap();
        store.add("Lima").unwrap();
    }

    let reloaded = TrackedCityStore::open(SqliteKvStore::open(&db).unwrap());
    assert_eq!(reloaded.cities(), ["Nairobi", "Lima"]);
}

#[tokio::test]
async fn test_open_store_uses_configured_backend() {
    let dir = tempdir().unwrap();
    let config = Config {
        config_dir: dir.path().to_path_buf(),
        storage: StorageConfig {
            backend: StorageBackend::Sqlite,
            path: None,
        },
        ..Config::default()
    };

    let mut store = TrackedCityStore::open(open_store(&config));
    store.add("Hobart").unwrap();

    assert!(dir.path().join("skydeck.db").exists());
    let reloaded = TrackedCityStore::open(open_store(&config));
    assert_eq!(reloaded.cities(), ["Hobart"]);
}

#[tokio::test]
async fn test_cards_render_report_or_error() {
    let mock_server = mock_weather_api().await;
    let store = TrackedCityStore::open(skydeck_services::MemoryStore::new());
    let mut dash = Dashboard::new(store, provider(&mock_server), UnitSystem::Metric, REFRESH);

    dash.add("Madrid").unwrap();
    dash.add("Nowhereville").unwrap();

    match wait_for_view(&dash, "Madrid").await {
        CardView::Ready(report) => {
            assert_eq!(report.current.description, "clear sky");
            assert_eq!(report.current.humidity, 30);
            assert_eq!(report.latest_forecast_temp, 26.0);
            assert!(!report.daily.is_empty());
        }
        other => panic!("expected a report, got {:?}", other),
    }

    assert_eq!(
        wait_for_view(&dash, "Nowhereville").await,
        CardView::Failed("Could not fetch weather data".into())
    );
}

#[tokio::test]
async fn test_suggestion_pick_flows_into_dashboard() {
    let mock_server = mock_weather_api().await;
    let provider = provider(&mock_server);
    let store = TrackedCityStore::open(skydeck_services::MemoryStore::new());
    let mut dash = Dashboard::new(store, Arc::clone(&provider), UnitSystem::Metric, REFRESH);
    let mut suggester = Suggester::new(provider, Duration::from_millis(50), 5);

    suggester.input("Madr");
    for _ in 0..100 {
        if suggester.state().suggestions.len() == 2 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    suggester.key(NavKey::Down, dash.cities());
    let confirmation = suggester.key(NavKey::Enter, dash.cities());
    assert_eq!(confirmation, Some(Confirmation::Accepted("Madrid".into())));
    dash.add("Madrid").unwrap();

    // Same city again, any casing, is turned away before reaching the store
    assert_eq!(
        suggester.confirm("MADRID", dash.cities()),
        Confirmation::Duplicate("MADRID".into())
    );
    assert_eq!(dash.cities(), ["Madrid"]);
}
