//! Shared helpers for client integration tests.

#![allow(dead_code)]

use phoebe_client::{Client, ClientBuilder};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const API_KEY: &str = "test-api-key";

/// A builder pointed at the stub server, with an API key configured.
pub fn client_for(server: &MockServer) -> ClientBuilder {
    let addr = server.address();
    Client::builder()
        .host(addr.ip().to_string())
        .port(addr.port())
        .api_key(API_KEY)
}

/// Stub `POST /dash/start-session` to hand out `session_id`.
pub async fn mock_start(server: &MockServer, session_id: &str, times: u64) {
    Mock::given(method("POST"))
        .and(path("/dash/start-session"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "session_id": session_id })))
        .expect(times)
        .mount(server)
        .await;
}

/// Stub `POST /dash/end-session/{session_id}` with `status`.
pub async fn mock_end(server: &MockServer, session_id: &str, status: u16, times: u64) {
    Mock::given(method("POST"))
        .and(path(format!("/dash/end-session/{session_id}")))
        .respond_with(ResponseTemplate::new(status).set_body_json(json!({ "success": status == 200 })))
        .expect(times)
        .mount(server)
        .await;
}

/// A local port with nothing listening on it.
pub fn unused_port() -> u16 {
    std::net::TcpListener::bind("127.0.0.1:0")
        .and_then(|l| l.local_addr())
        .map(|a| a.port())
        .unwrap()
}
