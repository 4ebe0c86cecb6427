mod common;

use std::sync::Arc;

use common::client_with_store;
use fti_sync::{
    categories::CategoryCache,
    store::{CATEGORIES_KEY, DurableStore, MemoryStore},
};
use serde_json::json;
use wiremock::{
    Mock, ResponseTemplate,
    matchers::{method, path},
};

#[tokio::test]
async fn second_get_is_served_from_cache() {
    let store = Arc::new(MemoryStore::new());
    let (server, client) = client_with_store(store.clone()).await;
    Mock::given(method("GET"))
        .and(path("/api/categories"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(["Food", "Rent", "Other"])))
        .expect(1)
        .mount(&server)
        .await;

    let cache = CategoryCache::new(client, store.clone());
    let first = cache.get().await.unwrap();
    let second = cache.get().await.unwrap();

    assert_eq!(first, vec!["Food", "Rent", "Other"]);
    assert_eq!(first, second);
    assert_eq!(
        store.get(CATEGORIES_KEY).as_deref(),
        Some(r#"["Food","Rent","Other"]"#)
    );
}

#[tokio::test]
async fn concurrent_misses_share_one_fetch() {
    let store = Arc::new(MemoryStore::new());
    let (server, client) = client_with_store(store.clone()).await;
    Mock::given(method("GET"))
        .and(path("/api/categories"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(["Food"])))
        .expect(1)
        .mount(&server)
        .await;

    let cache = CategoryCache::new(client, store);
    let (a, b) = tokio::join!(cache.get(), cache.get());
    assert_eq!(a.unwrap(), b.unwrap());
}

#[tokio::test]
async fn stored_list_skips_the_network() {
    let store = Arc::new(MemoryStore::new());
    store.set(CATEGORIES_KEY, r#"["Travel"]"#).unwrap();
    let (server, client) = client_with_store(store.clone()).await;
    Mock::given(method("GET"))
        .and(path("/api/categories"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(["Food"])))
        .expect(0)
        .mount(&server)
        .await;

    let cache = CategoryCache::new(client, store);
    assert_eq!(cache.get().await.unwrap(), vec!["Travel"]);
}

#[tokio::test]
async fn failed_fetch_caches_nothing() {
    let store = Arc::new(MemoryStore::new());
    let (server, client) = client_with_store(store.clone()).await;
    Mock::given(method("GET"))
        .and(path("/api/categories"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let cache = CategoryCache::new(client, store.clone());
    assert!(cache.get().await.is_err());
    assert_eq!(store.get(CATEGORIES_KEY), None);
}

#[tokio::test]
async fn invalidate_forces_refetch() {
    let store = Arc::new(MemoryStore::new());
    let (server, client) = client_with_store(store.clone()).await;
    Mock::given(method("GET"))
        .and(path("/api/categories"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(["Food"])))
        .expect(2)
        .mount(&server)
        .await;

    let cache = CategoryCache::new(client, store);
    cache.get().await.unwrap();
    cache.invalidate();
    cache.get().await.unwrap();
}

#[tokio::test]
async fn response_text_is_stored_verbatim() {
    let store = Arc::new(MemoryStore::new());
    let (server, client) = client_with_store(store.clone()).await;
    let body = "[ \"Food\", \"Rent\" ]\n";
    Mock::given(method("GET"))
        .and(path("/api/categories"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "application/json"))
        .expect(1)
        .mount(&server)
        .await;

    let cache = CategoryCache::new(client, store.clone());
    assert_eq!(cache.get().await.unwrap(), vec!["Food", "Rent"]);
    assert_eq!(store.get(CATEGORIES_KEY).as_deref(), Some(body));
}
