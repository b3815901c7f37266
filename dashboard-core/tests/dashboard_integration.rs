//! End-to-end searches against mock providers using wiremock.

use dashboard_core::{
    COULD_NOT_FETCH_WEATHER, Config, Dashboard, DashboardContext, DistanceUnit, SearchOrigin,
    SearchOutcome, Stage, ViewState,
};
use serde_json::{Value, json};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn location(name: &str, country: &str) -> Value {
    json!({
        "name": name,
        "region": "",
        "country": country,
        "lat": 42.37,
        "lon": -71.11,
        "tz_id": "America/New_York",
        "localtime": "2026-10-18 10:00"
    })
}

/// Mount the five weather-provider endpoints for one location.
async fn mount_weather(server: &MockServer, name: &str, country: &str, temp_c: f64, avg_c: f64) {
    let loc = location(name, country);

    let bodies = [
        ("/v1/timezone.json", json!({ "location": loc })),
        (
            "/v1/current.json",
            json!({
                "location": loc,
                "current": {
                    "last_updated": "2026-10-18 09:45",
                    "temp_c": temp_c,
                    "feelslike_c": temp_c - 1.5,
                    "is_day": 1,
                    "condition": { "text": "Partly cloudy", "icon": "//cdn/116.png", "code": 1003 },
                    "wind_kph": 15.1, "wind_dir": "SW",
                    "pressure_mb": 1012.0, "precip_mm": 0.1,
                    "humidity": 68, "cloud": 50, "uv": 3.0,
                    "vis_km": 10.0, "vis_miles": 6.0
                }
            }),
        ),
        (
            "/v1/forecast.json",
            json!({
                "location": loc,
                "forecast": { "forecastday": [{
                    "date": "2026-10-18",
                    "day": {
                        "maxtemp_c": avg_c + 4.0, "mintemp_c": avg_c - 4.0, "avgtemp_c": avg_c,
                        "maxwind_kph": 20.0, "totalprecip_mm": 0.4, "avghumidity": 70,
                        "daily_chance_of_rain": 30, "uv": 3.0,
                        "condition": { "text": "Patchy rain possible", "code": 1063 }
                    },
                    "hour": [
                        { "time": "2026-10-18 00:00", "temp_c": avg_c - 3.0, "is_day": 0,
                          "condition": { "text": "Clear", "code": 1000 }, "wind_kph": 8.0, "chance_of_rain": 0 }
                    ]
                }]}
            }),
        ),
        (
            "/v1/astronomy.json",
            json!({
                "location": loc,
                "astronomy": { "astro": {
                    "sunrise": "07:05 AM", "sunset": "05:59 PM",
                    "moonrise": "03:12 AM", "moonset": "04:40 PM",
                    "moon_phase": "Waning Crescent", "moon_illumination": 12,
                    "is_moon_up": 1, "is_sun_up": 1
                }}
            }),
        ),
        (
            "/v1/marine.json",
            json!({
                "location": loc,
                "forecast": { "forecastday": [{ "day": { "tides": [{ "tide": [
                    { "tide_time": "2026-10-18 04:20", "tide_height_mt": "2.9", "tide_type": "HIGH" },
                    { "tide_time": "2026-10-18 10:35", "tide_height_mt": "0.3", "tide_type": "LOW" }
                ]}]}}]}
            }),
        ),
    ];

    for (route, body) in bodies {
        Mock::given(method("GET"))
            .and(path(route))
            .and(query_param("key", "test-weather-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(server)
            .await;
    }
}

fn config_for(server: &MockServer) -> Config {
    let uri = server.uri();
    let mut config = Config::default();

    config.apply_env(|name| match name {
        "WEATHERAPI_KEY" => Some("test-weather-key".into()),
        "ZIPCODESTACK_KEY" => Some("test-zip-key".into()),
        "WEATHERAPI_BASE_URL" => Some(format!("{uri}/v1")),
        "ZIPCODESTACK_BASE_URL" => Some(format!("{uri}/zip/v1")),
        _ => None,
    });
    config.endpoints.geolocation_url = format!("{uri}/ip/json");
    config.endpoints.countries_url = format!("{uri}/countries/v3.1/name");
    config.endpoints.icons_url = format!("{uri}/docs/weather_conditions.json");

    config
}

fn dashboard_for(server: &MockServer) -> Dashboard {
    let config = config_for(server);
    let ctx = DashboardContext::from_config(&config).expect("http client builds");
    Dashboard::new(ctx, ViewState::new(config.dashboard.units(), config.dashboard.search_radius))
}

#[tokio::test]
async fn test_postal_code_search_fills_nearby_history_and_counter() {
    let server = MockServer::start().await;
    mount_weather(&server, "Cambridge", "United States", 14.0, 12.5).await;

    Mock::given(method("GET"))
        .and(path("/countries/v3.1/name/United%20States"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "cca2": "US", "name": { "common": "United States" } }])))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/zip/v1/radius"))
        .and(query_param("apikey", "test-zip-key"))
        .and(query_param("code", "02139"))
        .and(query_param("country", "us"))
        .and(query_param("radius", "10"))
        .and(query_param("unit", "miles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "query": { "code": "02139", "unit": "miles", "radius": "10" },
            "results": [
                { "code": "02138", "city": "Cambridge", "state": "MA", "distance": 1.1 },
                { "code": "02142", "city": "Cambridge", "state": "MA", "distance": 1.4 },
                { "code": "02114", "city": "Boston", "state": "MA", "distance": 2.3 }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dash = dashboard_for(&server);
    let outcome = dash.search("02139", SearchOrigin::Manual).await;
    assert!(outcome.is_committed(), "search should commit: {outcome:?}");

    let state = dash.snapshot();
    assert_eq!(state.nearby().len(), 3);
    assert_eq!(state.nearby()[2].city, "Boston");
    assert_eq!(state.history().len(), 1);
    assert_eq!(state.summary().search_count, 1);
    assert_eq!(state.summary().last_temperature_c, 14.0);
    assert_eq!(state.summary().last_forecast_avg_c, 12.5);
    assert_eq!(state.marine().map(|m| m.tides.len()), Some(2));
    assert!(state.error().is_none());

    // Distances were fetched in miles; a later switch converts them for display.
    assert_eq!(state.nearby_unit(), DistanceUnit::Miles);
    dash.update(|s| s.set_distance_unit(DistanceUnit::Kilometers));
    let km = dash.view(|s| s.nearby_distance(&s.nearby()[2]));
    assert!((km - 2.3 * 1.60934).abs() < 1e-9, "got {km}");
}

#[tokio::test]
async fn test_failing_weather_fetch_keeps_state_and_sets_error() {
    let server = MockServer::start().await;
    mount_weather(&server, "London", "United Kingdom", 11.0, 10.0).await;

    let dash = dashboard_for(&server);
    assert!(dash.search("London", SearchOrigin::Manual).await.is_committed());
    let before = dash.snapshot();
    assert!(before.current().is_some());

    // From now on only the current-weather call fails; the other three succeed.
    Mock::given(method("GET"))
        .and(path("/v1/current.json"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .with_priority(1)
        .mount(&server)
        .await;

    let outcome = dash.search("Paris", SearchOrigin::Manual).await;
    let SearchOutcome::Failed(err) = outcome else {
        panic!("expected failure");
    };
    assert_eq!(err.stage, Stage::Current);
    assert!(err.to_string().contains("500"), "error should mention status: {err}");

    let after = dash.snapshot();
    assert_eq!(after.current(), before.current());
    assert_eq!(after.forecast(), before.forecast());
    assert_eq!(after.astronomy(), before.astronomy());
    assert_eq!(after.marine(), before.marine());
    assert_eq!(after.summary(), before.summary());
    assert_eq!(after.summary().search_count, 1);
    let queries: Vec<_> = after.history().map(|h| h.query.as_str()).collect();
    assert_eq!(queries, ["London"]);
    assert_eq!(after.error(), Some(COULD_NOT_FETCH_WEATHER));
}

#[tokio::test]
async fn test_failing_nearby_search_does_not_abort() {
    let server = MockServer::start().await;
    mount_weather(&server, "Cambridge", "United States", 14.0, 12.5).await;

    Mock::given(method("GET"))
        .and(path("/countries/v3.1/name/United%20States"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "cca2": "US" }])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/zip/v1/radius"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({ "message": "rate limited" })))
        .mount(&server)
        .await;

    let dash = dashboard_for(&server);
    assert!(dash.search("02139", SearchOrigin::Manual).await.is_committed());

    let state = dash.snapshot();
    assert!(state.nearby().is_empty());
    assert!(state.current().is_some());
    assert!(state.forecast().is_some());
    assert!(state.astronomy().is_some());
    assert!(state.marine().is_some());
    assert!(state.error().is_none());
    assert_eq!(state.summary().search_count, 1);
}

#[tokio::test]
async fn test_failing_country_lookup_does_not_abort() {
    let server = MockServer::start().await;
    mount_weather(&server, "Springfield", "Freedonia", 9.0, 8.0).await;

    Mock::given(method("GET"))
        .and(path("/countries/v3.1/name/Freedonia"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "status": 404, "message": "Not Found" })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/zip/v1/radius"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "results": [] })))
        .expect(0)
        .mount(&server)
        .await;

    let dash = dashboard_for(&server);
    assert!(dash.search("11111", SearchOrigin::Manual).await.is_committed());
    assert!(dash.view(|s| s.nearby().is_empty()));
}

#[tokio::test]
async fn test_initial_load_is_not_recorded_but_manual_searches_are() {
    let server = MockServer::start().await;
    mount_weather(&server, "Somerville", "United States", 11.0, 10.0).await;

    Mock::given(method("GET"))
        .and(path("/ip/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ip": "203.0.113.7", "city": "Somerville", "latitude": 42.39, "longitude": -71.1
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dash = dashboard_for(&server);

    assert!(dash.initial_load().await.is_committed());
    dash.view(|s| {
        assert_eq!(s.history().len(), 0);
        assert_eq!(s.summary().search_count, 1);
        assert!(!s.is_loading());
    });

    assert!(dash.search("Somerville", SearchOrigin::Manual).await.is_committed());
    assert!(dash.search("Somerville", SearchOrigin::Manual).await.is_committed());
    dash.view(|s| {
        assert_eq!(s.history().len(), 2);
        assert_eq!(s.summary().search_count, 3);
    });
}

#[tokio::test]
async fn test_missing_weather_key_surfaces_on_first_use() {
    let server = MockServer::start().await;
    mount_weather(&server, "Paris", "France", 16.0, 15.0).await;

    let mut config = config_for(&server);
    config.providers.remove("weatherapi");

    let ctx = DashboardContext::from_config(&config).expect("http client builds");
    let dash = Dashboard::new(ctx, ViewState::default());

    let SearchOutcome::Failed(err) = dash.search("Paris", SearchOrigin::Manual).await else {
        panic!("expected failure");
    };
    assert!(err.source.is_missing_key());
    assert!(err.to_string().contains("weatherapi"));
}

#[tokio::test]
async fn test_icon_table_is_fetched_once() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/docs/weather_conditions.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "code": 1000, "day": "Sunny", "night": "Clear", "icon": 113 },
            { "code": 1003, "day": "Partly cloudy", "night": "Partly cloudy", "icon": 116 },
            { "code": 1999, "day": "Meteor shower", "night": "Meteor shower", "icon": 999 }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let dash = dashboard_for(&server);
    let icons = dash.icons().clone();

    tokio::join!(icons.warm(), dash.icons().warm());
    assert!(icons.is_loaded());
    assert_eq!(icons.resolve(1999, false), "icons/999n@2x.png");
    assert_eq!(icons.resolve(4242, true), "icons/113d@2x.png");
}
