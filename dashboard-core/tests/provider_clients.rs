//! Collaborator clients against a mock HTTP server.

use std::sync::Arc;

use dashboard_core::{
    DistanceUnit, FetchError,
    http::{FetchJson, HttpFetcher},
    provider::{
        CountryClient, CountrySource, GeolocationSource, IpGeolocationClient, NearbySource,
        WeatherApiClient, WeatherSource, ZipcodeStackClient,
    },
};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn http() -> Arc<dyn FetchJson> {
    Arc::new(HttpFetcher::new().expect("client builds"))
}

#[tokio::test]
async fn test_non_success_status_is_an_error_with_truncated_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/current.json"))
        .respond_with(ResponseTemplate::new(400).set_body_string("x".repeat(500)))
        .mount(&server)
        .await;

    let client = WeatherApiClient::new(Some("k".into()), format!("{}/v1", server.uri()), http());
    let err = client.current("???").await.unwrap_err();

    match &err {
        FetchError::Status { status, body, url } => {
            assert_eq!(*status, 400);
            assert!(body.ends_with("..."));
            assert!(body.len() <= 203);
            assert!(!url.contains("key=k&"), "api key must be redacted: {url}");
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_transport_error_does_not_leak_api_key() {
    let client = WeatherApiClient::new(Some("SUPERSECRET".into()), "http://127.0.0.1:1/v1", http());
    let err = client.current("London").await.unwrap_err();

    assert!(matches!(err, FetchError::Request(_)), "got {err:?}");

    let mut chain: Vec<String> = vec![err.to_string(), format!("{err:?}")];
    let mut source = std::error::Error::source(&err);
    while let Some(cause) = source {
        chain.push(cause.to_string());
        source = cause.source();
    }
    for text in &chain {
        assert!(!text.contains("SUPERSECRET"), "api key leaked: {text}");
    }
}

#[tokio::test]
async fn test_forecast_requests_a_single_day() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast.json"))
        .and(query_param("days", "1"))
        .and(query_param("q", "Lisbon"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "location": { "name": "Lisbon", "region": "Lisboa", "country": "Portugal" },
            "forecast": { "forecastday": [{
                "date": "2026-10-18",
                "day": { "avgtemp_c": 19.4, "condition": { "text": "Sunny", "code": 1000 } },
                "hour": []
            }]}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = WeatherApiClient::new(Some("k".into()), format!("{}/v1", server.uri()), http());
    let forecast = client.forecast("Lisbon").await.expect("forecast decodes");

    assert_eq!(forecast.location.country, "Portugal");
    assert_eq!(forecast.day.avgtemp_c, 19.4);
}

#[tokio::test]
async fn test_malformed_body_is_a_decode_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/astronomy.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "unexpected": true })))
        .mount(&server)
        .await;

    let client = WeatherApiClient::new(Some("k".into()), format!("{}/v1", server.uri()), http());
    let err = client.astronomy("Oslo").await.unwrap_err();
    assert!(matches!(err, FetchError::Decode { what: "astronomy", .. }), "got {err:?}");
}

#[tokio::test]
async fn test_country_code_is_lowercased() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v3.1/name/Germany"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "cca2": "DE" }, { "cca2": "XX" }])))
        .mount(&server)
        .await;

    let client = CountryClient::new(format!("{}/v3.1/name", server.uri()), http());
    assert_eq!(client.country_code("Germany").await.unwrap(), Some("de".to_string()));
}

#[tokio::test]
async fn test_country_lookup_with_no_matches_is_none() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v3.1/name/Nowhere"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let client = CountryClient::new(format!("{}/v3.1/name", server.uri()), http());
    assert_eq!(client.country_code("Nowhere").await.unwrap(), None);
}

#[tokio::test]
async fn test_nearby_requires_api_key() {
    let client = ZipcodeStackClient::new(None, "http://127.0.0.1:9/v1", http());
    let err = client.nearby("02139", "us", 10, DistanceUnit::Miles).await.unwrap_err();
    assert!(err.is_missing_key());
}

#[tokio::test]
async fn test_nearby_passes_kilometers() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/radius"))
        .and(query_param("unit", "km"))
        .and(query_param("radius", "25"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{ "code": "10115", "city": "Berlin", "state": "Berlin", "distance": 3.2 }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = ZipcodeStackClient::new(Some("zk".into()), format!("{}/v1", server.uri()), http());
    let found = client.nearby("10117", "de", 25, DistanceUnit::Kilometers).await.unwrap();

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].distance, 3.2);
}

#[tokio::test]
async fn test_geolocation_reads_coordinates() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/json/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ip": "198.51.100.4", "latitude": 51.5072, "longitude": -0.1276, "country_name": "United Kingdom"
        })))
        .mount(&server)
        .await;

    let client = IpGeolocationClient::new(format!("{}/json/", server.uri()), http());
    let coords = client.locate().await.unwrap();

    assert_eq!(coords.lat, 51.5072);
    assert_eq!(coords.to_query(), "51.5072,-0.1276");
}
