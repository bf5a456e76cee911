mod common;

use common::{API_KEY, client_for, mock_start};
use phoebe_client::{Args, Error, TransportError};
use serde::Serialize;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{any, body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn bound_client(server: &MockServer, session_id: &str) -> phoebe_client::Client {
    mock_start(server, session_id, 1).await;
    let mut client = client_for(server).build().unwrap();
    client.start_session().await.unwrap();
    client
}

#[tokio::test]
async fn execute_without_session_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = client_for(&server).build().unwrap();

    let err = client.execute("run_compute", Args::new()).await.unwrap_err();
    assert!(matches!(err, Error::NoSession));

    let err = client.get_value("period@binary").await.unwrap_err();
    assert!(matches!(err, Error::NoSession));
}

#[tokio::test]
async fn response_is_returned_unchanged() {
    let server = MockServer::start().await;
    let client = bound_client(&server, "s-1").await;
    let reply = json!({"success": true, "result": {"value": 2.5, "unit": "d"}, "extra": [1, 2]});
    Mock::given(method("POST"))
        .and(path("/send/s-1"))
        .and(body_json(json!({"twig": "period@binary", "command": "get_value"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(reply.clone()))
        .expect(1)
        .mount(&server)
        .await;

    assert_eq!(client.get_value("period@binary").await.unwrap(), reply);
}

#[tokio::test]
async fn response_without_success_flag_passes_through() {
    let server = MockServer::start().await;
    let client = bound_client(&server, "s-1").await;
    Mock::given(method("POST"))
        .and(path("/send/s-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(["not", "a", "mapping"])))
        .mount(&server)
        .await;

    let reply = client.execute("odd", Args::new()).await.unwrap();
    assert_eq!(reply, json!(["not", "a", "mapping"]));
}

#[tokio::test]
async fn command_name_overrides_args() {
    let server = MockServer::start().await;
    let client = bound_client(&server, "s-1").await;
    Mock::given(method("POST"))
        .and(path("/send/s-1"))
        .and(body_json(json!({"x": 1, "command": "run_compute"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;

    client
        .run_compute(&json!({"x": 1, "command": "something_else"}))
        .await
        .unwrap();
}

#[tokio::test]
async fn numeric_arrays_are_sent_as_plain_sequences() {
    #[derive(Serialize)]
    struct Options {
        times: Vec<f64>,
        grid: [[u8; 2]; 2],
        flags: (bool, bool),
    }

    let server = MockServer::start().await;
    let client = bound_client(&server, "s-1").await;
    Mock::given(method("POST"))
        .and(path("/send/s-1"))
        .and(body_json(json!({
            "kind": "lc",
            "dataset": "lc01",
            "times": [0.0, 0.5, 1.0],
            "grid": [[1, 2], [3, 4]],
            "flags": [true, false],
            "command": "add_dataset",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;

    #[derive(Serialize)]
    struct Dataset<'a> {
        dataset: &'a str,
        #[serde(flatten)]
        options: Options,
    }

    client
        .add_dataset(
            "lc",
            &Dataset {
                dataset: "lc01",
                options: Options {
                    times: vec![0.0, 0.5, 1.0],
                    grid: [[1, 2], [3, 4]],
                    flags: (true, false),
                },
            },
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn wrappers_name_their_commands() {
    let server = MockServer::start().await;
    let client = bound_client(&server, "s-1").await;
    for body in [
        json!({"twig": "teff@primary", "command": "get_parameter"}),
        json!({"dataset": "lc01", "command": "remove_dataset"}),
        json!({"solver": "nm", "command": "run_solver"}),
        json!({"command": "get_bundle"}),
        json!({"bundle": "{\"blob\": 1}", "command": "load_bundle"}),
        json!({"command": "save_bundle"}),
    ] {
        Mock::given(method("POST"))
            .and(path("/send/s-1"))
            .and(body_json(body))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
            .expect(1)
            .mount(&server)
            .await;
    }

    client.get_parameter("teff@primary").await.unwrap();
    client.remove_dataset("lc01").await.unwrap();
    client.run_solver(&json!({"solver": "nm"})).await.unwrap();
    client.get_bundle().await.unwrap();
    client.load_bundle("{\"blob\": 1}").await.unwrap();
    client.save_bundle().await.unwrap();
}

#[tokio::test]
async fn non_mapping_args_fail_before_sending() {
    let server = MockServer::start().await;
    let client = bound_client(&server, "s-1").await;
    Mock::given(path("/send/s-1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = client.run_compute(&vec![1, 2, 3]).await.unwrap_err();
    assert!(matches!(err, Error::InvalidArgs(_)));
}

#[tokio::test]
async fn unauthorized_statuses_signal_authorization() {
    for status in [401u16, 403] {
        let server = MockServer::start().await;
        let client = bound_client(&server, "s-1").await;
        Mock::given(method("POST"))
            .and(path("/send/s-1"))
            .respond_with(ResponseTemplate::new(status))
            .mount(&server)
            .await;

        let err = client.save_bundle().await.unwrap_err();

        assert!(
            matches!(&err, Error::Command(TransportError::Unauthorized { status: s }) if s.as_u16() == status),
            "got {err:?}"
        );
        assert!(err.is_unauthorized());
        assert!(err.to_string().contains("authorization"), "{err}");
        assert_eq!(client.session_id(), Some("s-1"));
    }
}

#[tokio::test]
async fn other_statuses_are_generic_command_errors() {
    let server = MockServer::start().await;
    let client = bound_client(&server, "s-1").await;
    Mock::given(method("POST"))
        .and(path("/send/s-1"))
        .respond_with(ResponseTemplate::new(500).set_body_string("bundle exploded"))
        .mount(&server)
        .await;

    let err = client.run_compute(&()).await.unwrap_err();

    assert!(matches!(&err, Error::Command(TransportError::Status { .. })));
    assert!(!err.is_unauthorized());
    assert!(err.to_string().contains("bundle exploded"));
}

#[tokio::test]
async fn timeout_is_a_command_error() {
    let server = MockServer::start().await;
    mock_start(&server, "s-1", 1).await;
    Mock::given(method("POST"))
        .and(path("/send/s-1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"success": true}))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let mut client = client_for(&server)
        .timeout(Duration::from_millis(100))
        .build().unwrap();
    client.start_session().await.unwrap();

    let err = client.run_compute(&()).await.unwrap_err();

    let Error::Command(TransportError::Network(cause)) = &err else {
        panic!("expected network error, got {err:?}");
    };
    assert!(cause.is_timeout());
}

#[tokio::test]
async fn commands_carry_api_key_but_no_bearer_by_default() {
    let server = MockServer::start().await;
    let client = bound_client(&server, "s-1").await;
    Mock::given(method("POST"))
        .and(path("/send/s-1"))
        .and(header("x-api-key", API_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;

    client.save_bundle().await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let send = requests
        .iter()
        .find(|r| r.url.path() == "/send/s-1")
        .unwrap();
    assert!(!send.headers.contains_key("authorization"));
}
