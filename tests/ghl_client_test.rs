use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use jobber_ghl_sync::crm::{CrmService, GhlClient};
use jobber_ghl_sync::error::{CrmError, SyncError};
use jobber_ghl_sync::model::{JobberEvent, NewContact, Tag};
use jobber_ghl_sync::sync::sync_contact;
use reqwest::Url;
use serde_json::{json, Value};
use tokio::sync::Mutex;

#[derive(Debug, Clone)]
struct Received {
    route: String,
    auth: Option<String>,
    body: Value,
}

type Log = Arc<Mutex<Vec<Received>>>;

fn auth_of(headers: &HeaderMap) -> Option<String> {
    headers
        .get("authorization")
        .and_then(|h| h.to_str().ok())
        .map(str::to_string)
}

async fn lookup(
    State(log): State<Log>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let email = query.get("email").cloned().unwrap_or_default();
    log.lock().await.push(Received {
        route: format!("lookup:{}", email),
        auth: auth_of(&headers),
        body: Value::Null,
    });
    match email.as_str() {
        "known@example.com" => Json(json!({
            "contact": { "id": "c-1", "email": "known@example.com", "firstName": "Kim" }
        }))
        .into_response(),
        "missing@example.com" => {
            (StatusCode::NOT_FOUND, Json(json!({ "msg": "not found" }))).into_response()
        }
        "listed@example.com" => {
            Json(json!({ "contacts": [{ "id": "c-2" }] })).into_response()
        }
        "broken@example.com" => (StatusCode::BAD_GATEWAY, "upstream down").into_response(),
        "throttled@example.com" => (
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({ "msg": "slow down" })),
        )
            .into_response(),
        _ => Json(json!({})).into_response(),
    }
}

async fn create(State(log): State<Log>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    log.lock().await.push(Received {
        route: "create".into(),
        auth: auth_of(&headers),
        body: body.clone(),
    });
    Json(json!({ "contact": { "id": "new-1", "email": body["email"] } })).into_response()
}

async fn add_tags(
    State(log): State<Log>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    log.lock().await.push(Received {
        route: format!("tags:{}", id),
        auth: auth_of(&headers),
        body,
    });
    if id == "locked" {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "msg": "contact locked" })),
        )
            .into_response();
    }
    Json(json!({ "tags": ["ok"] })).into_response()
}

async fn start_stub() -> (GhlClient, Log) {
    let log: Log = Arc::default();
    let app = Router::new()
        .route("/v1/contacts/lookup", get(lookup))
        .route("/v1/contacts/", post(create))
        .route("/v1/contacts/:id/tags/", post(add_tags))
        .with_state(log.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let base = Url::parse(&format!("http://{}/v1/", addr)).unwrap();
    let client = GhlClient::with_base_url(
        "secret".into(),
        "loc-9".into(),
        base,
        Duration::from_secs(5),
    )
    .unwrap();
    (client, log)
}

#[tokio::test]
async fn lookup_returns_known_contact() {
    let (client, log) = start_stub().await;

    let contact = client
        .find_contact_by_email("known@example.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(contact.id, "c-1");
    assert_eq!(contact.first_name.as_deref(), Some("Kim"));

    let log = log.lock().await;
    assert_eq!(log[0].route, "lookup:known@example.com");
    assert_eq!(log[0].auth.as_deref(), Some("Bearer secret"));
}

#[tokio::test]
async fn lookup_without_contact_is_absent() {
    let (client, _log) = start_stub().await;

    assert!(client
        .find_contact_by_email("nobody@example.com")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn lookup_404_is_an_error() {
    let (client, _log) = start_stub().await;

    let err = client
        .find_contact_by_email("missing@example.com")
        .await
        .unwrap_err();
    assert!(matches!(err, CrmError::Status { status: 404, .. }));
    assert_eq!(err.payload(), json!({ "msg": "not found" }));
}

#[tokio::test]
async fn lookup_404_stops_sync_before_create() {
    let (client, log) = start_stub().await;
    let event: JobberEvent = serde_json::from_value(json!({
        "client": { "email": "missing@example.com" },
        "job": { "status": "closed" }
    }))
    .unwrap();

    let err = sync_contact(&client, &event).await.unwrap_err();
    assert!(matches!(
        err,
        SyncError::Upstream(CrmError::Status { status: 404, .. })
    ));

    let routes: Vec<String> = log.lock().await.iter().map(|r| r.route.clone()).collect();
    assert_eq!(routes, vec!["lookup:missing@example.com".to_string()]);
}

#[tokio::test]
async fn rate_limit_is_reported_with_body() {
    let (client, _log) = start_stub().await;

    let err = client
        .find_contact_by_email("throttled@example.com")
        .await
        .unwrap_err();
    assert!(matches!(err, CrmError::Status { status: 429, .. }));
    assert_eq!(err.payload(), json!({ "msg": "slow down" }));
}

#[tokio::test]
async fn lookup_accepts_contacts_array() {
    let (client, _log) = start_stub().await;

    let contact = client
        .find_contact_by_email("listed@example.com")
        .await
        .unwrap();
    assert_eq!(contact.map(|c| c.id).as_deref(), Some("c-2"));
}

#[tokio::test]
async fn lookup_server_error_is_reported() {
    let (client, _log) = start_stub().await;

    let err = client
        .find_contact_by_email("broken@example.com")
        .await
        .unwrap_err();
    match err {
        CrmError::Status { status, body } => {
            assert_eq!(status, 502);
            assert_eq!(body, "upstream down");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn create_sends_names_and_location() {
    let (client, log) = start_stub().await;

    let created = client
        .create_contact(&NewContact {
            first_name: "Ada".into(),
            last_name: "".into(),
            email: "ada@example.com".into(),
        })
        .await
        .unwrap();
    assert_eq!(created.id, "new-1");

    let log = log.lock().await;
    let body = &log[0].body;
    assert_eq!(body["firstName"], "Ada");
    assert_eq!(body["lastName"], "");
    assert_eq!(body["name"], "Ada");
    assert_eq!(body["locationId"], "loc-9");
}

#[tokio::test]
async fn add_tags_posts_labels_through_trait() {
    let (client, log) = start_stub().await;
    let crm: &dyn CrmService = &client;

    crm.add_tags("c-1", &[Tag::JobCompleted]).await.unwrap();

    let log = log.lock().await;
    assert_eq!(log[0].route, "tags:c-1");
    assert_eq!(log[0].body, json!({ "tags": ["Job Completed"] }));
}

#[tokio::test]
async fn add_tags_rejection_carries_body() {
    let (client, _log) = start_stub().await;

    let err = client
        .add_tags("locked", &[Tag::JobClosed])
        .await
        .unwrap_err();
    assert!(matches!(err, CrmError::Status { status: 422, .. }));
    assert_eq!(err.payload(), json!({ "msg": "contact locked" }));
}

#[tokio::test]
async fn unreachable_crm_is_a_transport_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = GhlClient::with_base_url(
        "secret".into(),
        "loc".into(),
        Url::parse(&format!("http://{}/v1/", addr)).unwrap(),
        Duration::from_secs(2),
    )
    .unwrap();
    let err = client
        .find_contact_by_email("a@example.com")
        .await
        .unwrap_err();
    assert!(matches!(err, CrmError::Transport(_)));
}
