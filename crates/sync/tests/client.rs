mod common;

use std::sync::Arc;

use common::{CountingStore, TOKEN, client, client_with_store};
use fti_sync::{
    client::ClientError,
    session::SessionStatus,
    store::{CREDENTIAL_KEY, DurableStore},
};
use reqwest::Method;
use serde_json::{Value, json};
use wiremock::{
    Mock, ResponseTemplate,
    matchers::{body_json, header, method, path},
};

#[tokio::test]
async fn calls_carry_bearer_credential() {
    let (server, client) = client().await;
    Mock::given(method("GET"))
        .and(path("/api/categories"))
        .and(header("authorization", format!("Bearer {TOKEN}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(["Food"])))
        .expect(1)
        .mount(&server)
        .await;

    let categories: Vec<String> = client.get("/api/categories").await.unwrap();
    assert_eq!(categories, vec!["Food".to_string()]);
}

#[tokio::test]
async fn json_body_is_sent() {
    let (server, client) = client().await;
    Mock::given(method("POST"))
        .and(path("/api/budget"))
        .and(body_json(json!({"total_amount": 1500.0, "month": "2026-10"})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let res = client
        .post("/api/budget", &json!({"total_amount": 1500.0, "month": "2026-10"}))
        .await
        .unwrap();
    assert_eq!(res, Value::Null);
}

#[tokio::test]
async fn unauthorized_clears_credential_once_under_concurrency() {
    let store = Arc::new(CountingStore::default());
    let (server, client) = client_with_store(store.clone()).await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"message": "Token is invalid"})),
        )
        .mount(&server)
        .await;
    let mut status = client.session().subscribe();

    let (a, b) = tokio::join!(
        client.get::<Value>("/api/dashboard"),
        client.get::<Value>("/api/goals"),
    );

    assert!(matches!(a, Err(ClientError::SessionExpired)));
    assert!(matches!(b, Err(ClientError::SessionExpired)));
    assert_eq!(store.removes(), 1);
    assert_eq!(store.get(CREDENTIAL_KEY), None);
    assert_eq!(client.session().status(), SessionStatus::Expired);
    assert!(status.has_changed().unwrap());
}

#[tokio::test]
async fn expired_session_makes_no_further_calls() {
    let (server, client) = client().await;
    Mock::given(method("GET"))
        .and(path("/api/alerts"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let first = client.get::<Value>("/api/alerts").await.unwrap_err();
    let second = client.get::<Value>("/api/alerts").await.unwrap_err();
    assert!(first.is_fatal());
    assert!(second.is_fatal());
}

#[tokio::test]
async fn other_failures_are_not_fatal() {
    let (server, client) = client().await;
    Mock::given(method("DELETE"))
        .and(path("/api/goals/abc"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"error": "boom"})))
        .expect(1)
        .mount(&server)
        .await;

    let err = client
        .call::<()>(Method::DELETE, "/api/goals/abc", None)
        .await
        .unwrap_err();
    assert!(matches!(&err, ClientError::Server(msg) if msg == "boom"));
    assert!(!err.is_fatal());
    assert_eq!(client.session().status(), SessionStatus::Active);
}

#[tokio::test]
async fn undecodable_success_body_is_reported() {
    let (server, client) = client().await;
    Mock::given(method("GET"))
        .and(path("/api/goals"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;

    let err = client.get::<Value>("/api/goals").await.unwrap_err();
    assert!(matches!(err, ClientError::Decode(_)));
}
