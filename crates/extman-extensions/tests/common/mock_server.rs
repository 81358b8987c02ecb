//! Wiremock setup for the API and distribution origins
//!
//! One server plays both roles: the API origin lives under `/v1` and the
//! per-account distribution base under `/dist/acct_test`.

use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::constants::*;

/// API origin path prefix
pub const API_PREFIX: &str = "/v1";

/// Distribution base path
pub const DIST_PREFIX: &str = "/dist/acct_test";

/// API origin URL for `server`
pub fn api_base_url(server: &MockServer) -> String {
    format!("{}{}", server.uri(), API_PREFIX)
}

/// Distribution base URL for `server`
pub fn distribution_base_url(server: &MockServer) -> String {
    format!("{}{}", server.uri(), DIST_PREFIX)
}

/// Answer the distribution endpoint for the test credential
pub async fn mock_distribution_endpoint(server: &MockServer) {
    let body = serde_json::json!({ "plugin_base_url": distribution_base_url(server) });
    Mock::given(method("GET"))
        .and(path(format!("{}/{}", API_PREFIX, DISTRIBUTION_ENDPOINT)))
        .and(header("authorization", format!("Bearer {}", TEST_API_KEY).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// Reject every credential at the distribution endpoint
pub async fn mock_distribution_unauthorized(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path(format!("{}/{}", API_PREFIX, DISTRIBUTION_ENDPOINT)))
        .respond_with(ResponseTemplate::new(401))
        .mount(server)
        .await;
}

/// Serve `body` as the remote catalog, expecting `times` requests
pub async fn mock_remote_catalog(server: &MockServer, body: &str, times: u64) {
    Mock::given(method("GET"))
        .and(path(format!("{}/{}", DIST_PREFIX, CATALOG_FILENAME)))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .expect(times)
        .mount(server)
        .await;
}

/// Serve raw bytes at `route`
pub async fn mock_bytes(server: &MockServer, route: &str, content: &[u8]) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(content))
        .mount(server)
        .await;
}

/// Fail every request to `route` with `status`
pub async fn mock_status(server: &MockServer, route: &str, status: u16) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}
