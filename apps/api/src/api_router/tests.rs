use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use cmms_domain::{EntityCatalog, EntityRecord};
use cmms_infrastructure::InMemoryEntityCollectionApi;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use crate::state::AppState;

use super::build_router;

async fn router_with_people() -> Router {
    let catalog = EntityCatalog::campus().unwrap_or_else(|_| unreachable!());
    let store = Arc::new(InMemoryEntityCollectionApi::new(&catalog));
    let people = vec![
        EntityRecord::from_value(json!({ "personal_id": "P001", "name": "Alice Smith" }))
            .unwrap_or_else(|_| unreachable!()),
        EntityRecord::from_value(json!({ "personal_id": "P002", "name": "Bob Jones" }))
            .unwrap_or_else(|_| unreachable!()),
    ];
    assert!(store.seed("persons", people).await.is_ok());

    build_router(AppState { store }, "http://localhost:3000").unwrap_or_else(|_| unreachable!())
}

async fn call(router: Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(body) => {
            request = request.header("content-type", "application/json");
            Body::from(body.to_string())
        }
        None => Body::empty(),
    };
    let request = request.body(body).unwrap_or_else(|_| unreachable!());

    let response = router
        .oneshot(request)
        .await
        .unwrap_or_else(|_| unreachable!());
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .map(|collected| collected.to_bytes())
        .unwrap_or_default();
    let payload = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

    (status, payload)
}

#[tokio::test]
async fn health_reports_ok() {
    let (status, payload) = call(router_with_people().await, Method::GET, "/api/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(payload, json!({ "status": "ok" }));
}

#[tokio::test]
async fn list_returns_seeded_rows() {
    let (status, payload) = call(router_with_people().await, Method::GET, "/api/persons", None).await;

    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = payload
        .as_array()
        .map(|rows| rows.iter().filter_map(|row| row["name"].as_str()).collect())
        .unwrap_or_default();
    assert_eq!(names, vec!["Alice Smith", "Bob Jones"]);
}

#[tokio::test]
async fn create_returns_created_message() {
    let router = router_with_people().await;

    let (status, payload) = call(
        router.clone(),
        Method::POST,
        "/api/persons",
        Some(json!({ "personal_id": "P003", "name": "Charlie Brown" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(payload, json!({ "message": "Person created" }));

    let (status, payload) = call(
        router,
        Method::POST,
        "/api/persons",
        Some(json!({ "personal_id": "P003", "name": "Charlie again" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(
        payload,
        json!({ "error": "Person with ID 'P003' already exists" })
    );
}

#[tokio::test]
async fn update_and_delete_report_missing_rows() {
    let router = router_with_people().await;

    let (status, payload) = call(
        router.clone(),
        Method::PUT,
        "/api/persons/P001",
        Some(json!({ "name": "Alice Jones" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(payload, json!({ "message": "Person updated" }));

    let (status, payload) = call(
        router.clone(),
        Method::PUT,
        "/api/persons/P001",
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(payload, json!({ "error": "No fields to update" }));

    let (status, payload) = call(router.clone(), Method::DELETE, "/api/persons/P002", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(payload, json!({ "message": "Person deleted" }));

    let (status, _) = call(router, Method::DELETE, "/api/persons/P404", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_collection_is_not_found() {
    let (status, payload) = call(router_with_people().await, Method::GET, "/api/buildings", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(payload, json!({ "error": "Unknown entity: buildings" }));
}

#[tokio::test]
async fn import_validates_payload_shape() {
    let router = router_with_people().await;

    let (status, payload) = call(
        router.clone(),
        Method::POST,
        "/api/import",
        Some(json!({ "entity": "persons", "items": "not a list" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(payload, json!({ "error": "'items' must be a list" }));

    let (status, _) = call(
        router.clone(),
        Method::POST,
        "/api/import",
        Some(json!({ "entity": "persons" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, payload) = call(
        router,
        Method::POST,
        "/api/import",
        Some(json!({ "entity": "unsupported", "items": [{ "field": "value" }] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(payload, json!({ "error": "Unsupported entity: unsupported" }));
}

#[tokio::test]
async fn import_inserts_every_item() {
    let router = router_with_people().await;

    let (status, payload) = call(
        router.clone(),
        Method::POST,
        "/api/import",
        Some(json!({
            "entity": "activities",
            "items": [
                { "activity_id": "A001", "type": "Seminar", "organiser_id": "P001" },
                { "activity_id": "A002", "type": "Lecture", "organiser_id": "P002" }
            ]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(payload, json!({ "message": "Successfully imported 2 items" }));

    let (_, payload) = call(router, Method::GET, "/api/activities", None).await;
    assert_eq!(payload.as_array().map(Vec::len), Some(2));
}

async fn call_raw(router: Router, method: Method, uri: &str, body: &'static str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap_or_else(|_| unreachable!());

    let response = router
        .oneshot(request)
        .await
        .unwrap_or_else(|_| unreachable!());
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .map(|collected| collected.to_bytes())
        .unwrap_or_default();

    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

#[tokio::test]
async fn malformed_json_bodies_answer_with_error_payload() {
    for (method, uri) in [
        (Method::POST, "/api/persons"),
        (Method::PUT, "/api/persons/P001"),
        (Method::POST, "/api/import"),
    ] {
        let (status, payload) =
            call_raw(router_with_people().await, method, uri, "{\"name\": ").await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        let error = payload["error"].as_str().unwrap_or_default();
        assert!(error.contains("JSON"), "{uri}: {error}");
    }
}
