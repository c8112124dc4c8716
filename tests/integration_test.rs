//! Live API integration tests.
//!
//! These tests call the API configured through `IBERCHECK_API_URL` and
//! require network access.
//! Run with: `cargo test --features integration-tests`

#![cfg(feature = "integration-tests")]

use ibercheck::ApiRequest;
use ibercheck::config::fetch_config;

#[tokio::test]
async fn test_api_host_is_reachable() {
    let app_config = fetch_config().expect("failed to load config");
    let config = &app_config.ibercheck;
    let token = config
        .access_token
        .as_deref()
        .map(String::as_str)
        .unwrap_or("invalid-token");

    let client =
        ApiRequest::with_defaults(config.request_defaults()).expect("failed to build client");
    let result = client.get(token, &config.endpoint("/")).await;

    if let Err(err) = result {
        assert!(!err.is_network(), "API host unreachable: {err}");
    }
}
