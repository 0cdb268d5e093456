//! Blocking client tests
mod common;

use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{Script, ScriptedTransport, UNIT};
use justhttp::{blocking, Client, Error, RequestOptions};

#[tokio::test]
async fn test_blocking_get_and_post() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/item"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 7})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/item"))
        .and(body_json(json!({"id": 8})))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let url = format!("{}/item", server.uri());
    let (fetched, created) = tokio::task::spawn_blocking(move || {
        let client = blocking::Client::new();
        let fetched = client.get(&url, RequestOptions::new()).unwrap();
        let created = client.post(&url, RequestOptions::new().json(json!({"id": 8}))).unwrap();
        (fetched, created)
    })
    .await
    .unwrap();

    assert_eq!(fetched.json(), Some(&json!({"id": 7})));
    assert_eq!(created.status_code(), 201);
}

#[test]
fn test_blocking_shares_transport_with_async_client() {
    let transport = Arc::new(ScriptedTransport::new(UNIT, Script::Respond));
    let client = Client::with_transport(transport.clone()).blocking();

    let result = client.put("http://example.com/x", RequestOptions::new()).unwrap();
    assert_eq!(result.text(), "done");
    assert_eq!(transport.started(), 1);
}

#[test]
fn test_blocking_failure_and_abandon() {
    let failing = blocking::Client::with_transport(ScriptedTransport::new(UNIT, Script::Fail));
    assert!(matches!(
        failing.delete("http://example.com/x", RequestOptions::new()),
        Err(Error::Connection(_))
    ));

    let abandoning = blocking::Client::with_transport(ScriptedTransport::new(UNIT, Script::Abandon));
    assert!(matches!(
        abandoning.get("http://example.com/x", RequestOptions::new()),
        Err(Error::Abandoned)
    ));
}
