#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{config_yaml, project_model, record};
use httpmock::prelude::*;
use objstore_connector::{ConnectorError, ObjectStoreConnector};
use objstore_http::HttpError;
use objstore_query::SchemaRegistry;
use serde_json::json;

fn connector(server: &MockServer) -> ObjectStoreConnector {
    ObjectStoreConnector::connect(
        config_yaml(&server.base_url(), "timeout: 500ms\n"),
        SchemaRegistry::new().register(project_model()),
    )
    .unwrap()
}

#[tokio::test]
async fn create_sends_bearer_authenticated_edit() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(Method::POST)
                .path("/storage/edits/events/objectLocator")
                .header("authorization", "Bearer t0k3n")
                .header("content-type", "application/json");
            then.status(200);
        })
        .await;

    let key = connector(&server)
        .create("Project", &record(json!({"title": "Bioprinting", "team": "X"})))
        .await
        .unwrap();

    assert_eq!(key, "f1ef03b2f194e2551af7c40ef1405453");
    mock.assert_async().await;
}

#[tokio::test]
async fn find_reads_search_hits() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(Method::POST)
                .path("/objects/search/objects")
                .query_param("pageSize", "100");
            then.status(200).json_body(json!({
                "hits": [{"object": {
                    "primaryKey": {"project_uid": "abc"},
                    "properties": {"project": "Bioprinting", "team": "X"}
                }}],
                "totalHits": 1
            }));
        })
        .await;

    let filter = serde_json::from_value(json!({"where": {"team": "X"}})).unwrap();
    let results = connector(&server).find("Project", &filter).await.unwrap();

    mock.assert_async().await;
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["id"], json!("abc"));
    assert_eq!(results[0]["title"], json!("Bioprinting"));
}

#[tokio::test]
async fn load_with_empty_body_is_not_found() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(Method::POST).path("/storage/load/objectsByLocator");
            then.status(200);
        })
        .await;

    let found = connector(&server)
        .find_by_id("Project", &json!("abc"))
        .await
        .unwrap();
    assert_eq!(found, None);
}

#[tokio::test]
async fn server_error_maps_to_transport_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(Method::POST);
            then.status(500).body("boom");
        })
        .await;

    let err = connector(&server)
        .destroy_by_id("Project", &json!("abc"))
        .await
        .unwrap_err();

    match err {
        ConnectorError::Transport(HttpError::HttpStatus {
            status,
            body_preview,
            ..
        }) => {
            assert_eq!(status.as_u16(), 500);
            assert_eq!(body_preview, "boom");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn slow_service_times_out() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(Method::POST);
            then.status(200)
                .delay(std::time::Duration::from_secs(3))
                .json_body(json!({"hits": [], "totalHits": 0}));
        })
        .await;

    let err = connector(&server).count("Project", None).await.unwrap_err();

    assert!(matches!(err, ConnectorError::Transport(HttpError::Timeout(_))));
}
