use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{TimeZone, Utc};
use tokio::time::Instant;

use super::*;

fn visit(id: i64, location: &str) -> Visit {
    Visit {
        id,
        username: "rina".to_string(),
        display_name: None,
        store_name: format!("Store {id}"),
        location: location.to_string(),
        start_time: Utc.with_ymd_and_hms(2025, 3, 4, 9, 0, 0).unwrap(),
        end_time: None,
        description: None,
        order_id: None,
    }
}

/// Geocoder that answers from a fixed table and records when it was called.
#[derive(Default)]
struct ScriptedGeocoder {
    answers: HashMap<String, GeocodeOutcome>,
    calls: Mutex<Vec<(String, Instant)>>,
    latency: Duration,
}

impl ScriptedGeocoder {
    fn with(mut self, address: &str, outcome: GeocodeOutcome) -> Self {
        self.answers.insert(address.to_string(), outcome);
        self
    }

    fn call_log(&self) -> Vec<(String, Instant)> {
        self.calls.lock().unwrap().clone()
    }
}

impl Geocoder for ScriptedGeocoder {
    async fn geocode(&self, address: &str) -> GeocodeOutcome {
        self.calls
            .lock()
            .unwrap()
            .push((address.to_string(), Instant::now()));
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        self.answers
            .get(address)
            .cloned()
            .unwrap_or(GeocodeOutcome::NotFound)
    }
}

fn found(latitude: f64, longitude: f64) -> GeocodeOutcome {
    GeocodeOutcome::Found {
        latitude,
        longitude,
    }
}

#[tokio::test(start_paused = true)]
async fn literal_pairs_resolve_exactly_without_lookup_or_delay() {
    let geocoder = ScriptedGeocoder::default();
    let resolver = Resolver::new(&geocoder, ResolverConfig::default());
    let visits = vec![visit(1, "-6.2,106.8"), visit(2, " 51.5074 , -0.1278 ")];

    let start = Instant::now();
    let report = resolver.resolve(&visits).await;

    assert_eq!(start.elapsed(), Duration::ZERO);
    assert!(geocoder.call_log().is_empty());
    assert_eq!(report.mapped(), 2);
    assert_eq!(report.coordinates[0].latitude, -6.2);
    assert_eq!(report.coordinates[0].longitude, 106.8);
    assert_eq!(report.coordinates[1].latitude, 51.5074);
    assert_eq!(report.coordinates[1].longitude, -0.1278);
}

#[tokio::test(start_paused = true)]
async fn address_lookups_are_spaced_by_the_throttle_interval() {
    let geocoder = ScriptedGeocoder::default()
        .with("Jakarta", found(-6.2, 106.8))
        .with("Bandung", found(-6.9, 107.6))
        .with("Bogor", found(-6.6, 106.8));
    let resolver = Resolver::new(&geocoder, ResolverConfig::default());
    let visits = vec![visit(1, "Jakarta"), visit(2, "Bandung"), visit(3, "Bogor")];

    let report = resolver.resolve(&visits).await;
    assert_eq!(report.mapped(), 3);

    let log = geocoder.call_log();
    let addresses: Vec<&str> = log.iter().map(|(a, _)| a.as_str()).collect();
    assert_eq!(addresses, vec!["Jakarta", "Bandung", "Bogor"]);
    for pair in log.windows(2) {
        let gap = pair[1].1 - pair[0].1;
        assert!(gap >= Duration::from_secs(1), "lookups only {gap:?} apart");
    }
}

#[tokio::test(start_paused = true)]
async fn failed_lookups_still_count_toward_spacing() {
    let geocoder = ScriptedGeocoder::default()
        .with("Nowhere", GeocodeOutcome::NotFound)
        .with("Bandung", found(-6.9, 107.6));
    let resolver = Resolver::new(&geocoder, ResolverConfig::default());
    let visits = vec![visit(1, "Nowhere"), visit(2, "Bandung")];

    resolver.resolve(&visits).await;

    let log = geocoder.call_log();
    assert_eq!(log.len(), 2);
    assert!(log[1].1 - log[0].1 >= Duration::from_secs(1));
}

#[tokio::test(start_paused = true)]
async fn literal_after_address_is_not_delayed() {
    let geocoder = ScriptedGeocoder::default().with("Jakarta", found(-6.2, 106.8));
    let resolver = Resolver::new(&geocoder, ResolverConfig::default());
    let visits = vec![visit(1, "Jakarta"), visit(2, "-6.9,107.6")];

    let start = Instant::now();
    let report = resolver.resolve(&visits).await;

    assert_eq!(report.mapped(), 2);
    assert_eq!(start.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn failures_are_dropped_and_order_is_preserved() {
    let geocoder = ScriptedGeocoder::default()
        .with("Toko A", found(-6.21, 106.81))
        .with(
            "Toko Rusak",
            GeocodeOutcome::TransportError("connection reset".to_string()),
        );
    let resolver = Resolver::new(&geocoder, ResolverConfig::default());
    let visits = vec![
        visit(10, "-6.2,106.8"),
        visit(11, "Toko Rusak"),
        visit(12, "Toko A"),
        visit(13, "Unknown Street 99"),
        visit(14, "-6.3,106.9"),
    ];

    let report = resolver.resolve(&visits).await;

    assert_eq!(report.attempted, 5);
    assert_eq!(report.mapped(), 3);
    assert_eq!(report.mapped_summary(), "3 of 5 mapped");

    let ids: Vec<i64> = report
        .coordinates
        .iter()
        .map(|c| c.source_visit.id)
        .collect();
    assert_eq!(ids, vec![10, 12, 14]);
    let indices: Vec<usize> = report.coordinates.iter().map(|c| c.input_index).collect();
    assert!(indices.windows(2).all(|w| w[0] < w[1]));

    assert_eq!(report.failures.len(), 2);
    assert_eq!(report.failures[0].visit_id, 11);
    assert!(matches!(
        report.failures[0].reason,
        FailureReason::Transport(_)
    ));
    assert_eq!(report.failures[1].visit_id, 13);
    assert_eq!(report.failures[1].reason, FailureReason::NotFound);
}

#[tokio::test(start_paused = true)]
async fn empty_input_returns_immediately_without_io() {
    let geocoder = ScriptedGeocoder::default();
    let resolver = Resolver::new(&geocoder, ResolverConfig::default());

    let report = resolver.resolve(&[]).await;

    assert_eq!(report, ResolveReport::default());
    assert!(geocoder.call_log().is_empty());
}

#[tokio::test(start_paused = true)]
async fn out_of_range_literal_fails_without_geocoding() {
    let geocoder = ScriptedGeocoder::default();
    let resolver = Resolver::new(&geocoder, ResolverConfig::default());

    let report = resolver.resolve(&[visit(1, "200,10")]).await;

    assert_eq!(report.mapped(), 0);
    assert!(geocoder.call_log().is_empty());
    assert_eq!(
        report.failures[0].reason,
        FailureReason::OutOfRange {
            latitude: 200.0,
            longitude: 10.0
        }
    );
}

#[tokio::test(start_paused = true)]
async fn slow_lookup_times_out_and_pass_continues() {
    let geocoder = ScriptedGeocoder {
        latency: Duration::from_secs(30),
        ..ScriptedGeocoder::default()
    }
    .with("Slow Road", found(1.0, 1.0));
    let config = ResolverConfig {
        throttle_interval: Duration::from_secs(1),
        lookup_timeout: Duration::from_secs(5),
    };
    let resolver = Resolver::new(&geocoder, config);
    let visits = vec![visit(1, "Slow Road"), visit(2, "-6.2,106.8")];

    let start = Instant::now();
    let report = resolver.resolve(&visits).await;

    assert!(start.elapsed() < Duration::from_secs(30));
    assert_eq!(report.mapped(), 1);
    assert_eq!(report.coordinates[0].source_visit.id, 2);
    assert_eq!(report.failures[0].reason, FailureReason::TimedOut);
}

#[test]
fn resolver_config_follows_app_config() {
    let app = visitmap_core::AppConfig {
        env: visitmap_core::Environment::Test,
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        log_level: "debug".to_string(),
        geocoder_url: "http://localhost/".to_string(),
        geocoder_user_agent: "test".to_string(),
        geocoder_timeout_secs: 4,
        geocoder_throttle_ms: 1200,
        map_padding_px: 50,
        api_keys: None,
    };
    let config = ResolverConfig::from_app_config(&app);
    assert_eq!(config.throttle_interval, Duration::from_millis(1200));
    assert_eq!(config.lookup_timeout, Duration::from_secs(4));
}

#[test]
fn failure_reasons_render_readably() {
    assert_eq!(FailureReason::NotFound.to_string(), "address not found");
    assert_eq!(
        FailureReason::TimedOut.to_string(),
        "geocoder lookup timed out"
    );
    assert_eq!(
        FailureReason::OutOfRange {
            latitude: 200.0,
            longitude: 10.0
        }
        .to_string(),
        "coordinate 200,10 is out of range"
    );
}
