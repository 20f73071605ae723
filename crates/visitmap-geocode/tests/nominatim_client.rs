//! Integration tests for `NominatimClient` against a `wiremock` server.
//!
//! Covers the best-match happy path, the empty result set, and the failure
//! modes that the `Geocoder` implementation folds into `TransportError`.

use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use visitmap_geocode::{GeocodeError, GeocodeOutcome, Geocoder, NominatimClient};

fn test_client(base_url: &str) -> NominatimClient {
    NominatimClient::new(base_url, "visitmap-test/0.1 (qa@example.test)", 5)
        .expect("failed to build test NominatimClient")
}

#[tokio::test]
async fn search_returns_first_match_and_sends_user_agent() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "Jl. Sudirman 1, Jakarta"))
        .and(query_param("format", "json"))
        .and(query_param("limit", "1"))
        .and(header("user-agent", "visitmap-test/0.1 (qa@example.test)"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"lat": "-6.2088", "lon": "106.8456", "display_name": "Jakarta"}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let result = client.search("Jl. Sudirman 1, Jakarta").await;

    let (lat, lng) = result.expect("search ok").expect("has match");
    assert!((lat - (-6.2088)).abs() < 1e-9);
    assert!((lng - 106.8456).abs() < 1e-9);
}

#[tokio::test]
async fn geocode_maps_empty_array_to_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    assert_eq!(
        client.geocode("nowhere in particular").await,
        GeocodeOutcome::NotFound
    );
}

#[tokio::test]
async fn geocode_maps_server_error_to_transport_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let outcome = client.geocode("Bandung").await;
    assert!(
        matches!(outcome, GeocodeOutcome::TransportError(ref msg) if msg.contains("503")),
        "expected TransportError mentioning 503, got: {outcome:?}"
    );
}

#[tokio::test]
async fn geocode_maps_malformed_body_to_transport_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    assert!(matches!(
        client.geocode("Surabaya").await,
        GeocodeOutcome::TransportError(_)
    ));
}

#[tokio::test]
async fn search_surfaces_rate_limit_with_retry_after() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "30"))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.search("Medan").await.unwrap_err();
    assert!(
        matches!(
            err,
            GeocodeError::RateLimited {
                retry_after_secs: 30
            }
        ),
        "expected RateLimited(30), got: {err:?}"
    );
}

#[tokio::test]
async fn search_rejects_non_numeric_coordinates() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{"lat": "north", "lon": "106.8"}])),
        )
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.search("Depok").await.unwrap_err();
    assert!(matches!(
        err,
        GeocodeError::InvalidCoordinate { field: "lat", .. }
    ));
}

#[tokio::test]
async fn geocoder_is_usable_through_shared_reference() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{"lat": "1.5", "lon": "2.5"}])),
        )
        .mount(&server)
        .await;

    let client = std::sync::Arc::new(test_client(&server.uri()));
    let outcome = client.geocode("Bogor").await;
    assert_eq!(outcome.coordinate(), Some((1.5, 2.5)));
}
