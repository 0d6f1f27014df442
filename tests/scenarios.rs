use httpmock::{Method::GET, MockServer};
use std::time::{Duration, Instant};

mod common;

use api_pressure_engine::{aggregate, run_test, TestConfiguration};

// Paths used in load tests performed during these tests.
const OK_PATH: &str = "/ok";
const MISSING_PATH: &str = "/missing";
const HANG_PATH: &str = "/hang";

// One user, two APIs: one succeeds, one returns 404.
#[tokio::test]
async fn test_one_success_one_not_found() {
    let server = MockServer::start();
    let ok = server.mock(|when, then| {
        when.method(GET).path(OK_PATH);
        then.status(200).body("fine");
    });
    let missing = server.mock(|when, then| {
        when.method(GET).path(MISSING_PATH);
        then.status(404).body("no such thing");
    });

    let apis = vec![common::get(&server, OK_PATH), common::get(&server, MISSING_PATH)];
    let config = TestConfiguration::new(1, 1.0);
    let results = run_test(&apis, &config).await.unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(ok.calls(), 1);
    assert_eq!(missing.calls(), 1);

    assert_eq!(results[0].status_code, 200);
    assert!(results[0].error_message.is_none());
    assert_eq!(results[0].bytes_received, 4);
    assert_eq!(results[1].status_code, 404);
    assert_eq!(results[1].error_message.as_deref(), Some("no such thing"));

    let summary = aggregate(&results, &config).unwrap();
    assert!((summary.error_rate - 50.0).abs() < 1e-9);
    assert_eq!(summary.successful_urls, vec![server.url(OK_PATH)]);
    assert_eq!(summary.top_error_rates[0].url, server.url(MISSING_PATH));
}

// Three users staggered over three seconds against a 10ms endpoint.
#[tokio::test]
async fn test_three_users_ramp_up() {
    let server = MockServer::start();
    let ok = server.mock(|when, then| {
        when.method(GET).path(OK_PATH);
        then.status(200).delay(Duration::from_millis(10));
    });

    let apis = vec![common::get(&server, OK_PATH)];
    let config = TestConfiguration::new(3, 3.0);
    let started = Instant::now();
    let results = run_test(&apis, &config).await.unwrap();
    let elapsed = started.elapsed();

    assert_eq!(results.len(), 3);
    assert_eq!(ok.calls(), 3);
    // The last user starts two seconds in.
    assert!(elapsed >= Duration::from_secs(2), "elapsed {:?}", elapsed);

    let summary = aggregate(&results, &config).unwrap();
    assert_eq!(summary.error_rate, 0.0);
    assert!(summary.mean_response_time >= 10.0);
    assert!(summary.mean_response_time < 1000.0);
    assert!((summary.throughput - 3.0 / 9.0).abs() < 1e-9);
    assert_eq!(summary.slowest_successful.len(), 1);
}

// A request that never answers within the timeout becomes a 500 result.
#[tokio::test]
async fn test_hanging_request_times_out() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path(HANG_PATH);
        then.status(200).delay(Duration::from_secs(5));
    });

    let apis = vec![common::get(&server, HANG_PATH)];
    let config = TestConfiguration::new(1, 1.0).with_request_timeout(Duration::from_secs(1));
    let results = run_test(&apis, &config).await.unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].status_code, 500);
    assert!(!results[0].error_message.as_deref().unwrap_or_default().is_empty());
    assert!(results[0].response_time_ms >= 900.0);
    assert!(results[0].response_time_ms < 4900.0);
}

// An empty API list is rejected before anything else happens.
#[tokio::test]
async fn test_empty_api_list_rejected() {
    let err = run_test(&[], &TestConfiguration::new(2, 1.0)).await.unwrap_err();
    assert!(err.is_validation());
}

// A bad definition anywhere in the list stops the run before any request is sent.
#[tokio::test]
async fn test_invalid_definition_sends_nothing() {
    let server = MockServer::start();
    let ok = server.mock(|when, then| {
        when.method(GET).path(OK_PATH);
        then.status(200);
    });

    let mut broken = common::get(&server, OK_PATH);
    broken.url = String::new();
    let apis = vec![common::get(&server, OK_PATH), broken];
    let err = run_test(&apis, &TestConfiguration::new(2, 1.0)).await.unwrap_err();

    assert!(err.is_validation());
    assert_eq!(ok.calls(), 0);
}
