#![cfg(feature = "web")]

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

use service_dashboard::app::{AppState, Backend, router};
use service_dashboard::record::SEED_SERVICES;
use service_dashboard::saving::FileStore;
use service_dashboard::session::SessionRegistry;
use service_dashboard::sqlite::SqliteStore;
use service_dashboard::store::MemoryStore;

fn memory_app() -> Router {
    router(Arc::new(AppState::new(Backend::Memory(Mutex::new(
        MemoryStore::with_seed(9),
    )))))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Option<String>, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(str::to_string);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, cookie, body)
}

fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

fn cycle(body: Value, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/api/cycle")
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn names(body: &Value) -> Vec<String> {
    body["options"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn fresh_store_serves_seed_set() {
    let app = memory_app();
    let (status, _, body) = send(&app, get("/api/dataset", None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(names(&body), SEED_SERVICES);
    for record in body["records"].as_array().unwrap() {
        for field in ["urgency", "resources", "regulations", "uncertainty"] {
            let value = record[field].as_u64().unwrap();
            assert!((1..=10).contains(&value));
        }
    }
    assert_eq!(body["chart"].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn add_then_remove_round_trips_to_seed() {
    let app = memory_app();
    let (_, _, seed) = send(&app, get("/api/dataset", None)).await;

    let (status, _, added) = send(
        &app,
        cycle(
            json!({"trigger": "add", "new_name": "X", "urgency": 3, "resources": 7, "regulations": 2, "uncertainty": 9}),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let records = added["records"].as_array().unwrap();
    assert_eq!(records.len(), 6);
    assert_eq!(
        records[5],
        json!({"service": "X", "urgency": 3, "resources": 7, "regulations": 2, "uncertainty": 9})
    );
    assert!(names(&added).contains(&"X".to_string()));

    let (_, _, removed) = send(
        &app,
        cycle(json!({"trigger": "remove", "selected_name": "X"}), None),
    )
    .await;
    assert_eq!(removed["records"], seed["records"]);
}

#[tokio::test]
async fn update_replaces_ratings_and_keeps_name() {
    let app = memory_app();
    let (_, _, before) = send(&app, get("/api/dataset", None)).await;

    let (_, _, after) = send(
        &app,
        cycle(
            json!({
                "trigger": "update-button",
                "selected_name": "Broadband Access",
                "new_name": "Ignored",
                "urgency": 10, "resources": 1, "regulations": 2, "uncertainty": 3
            }),
            None,
        ),
    )
    .await;

    let records = after["records"].as_array().unwrap();
    assert_eq!(
        records[0],
        json!({"service": "Broadband Access", "urgency": 10, "resources": 1, "regulations": 2, "uncertainty": 3})
    );
    assert_eq!(records[1..], before["records"].as_array().unwrap()[1..]);
}

#[tokio::test]
async fn unknown_trigger_leaves_dataset_alone() {
    let app = memory_app();
    let (_, _, before) = send(&app, get("/api/dataset", None)).await;
    let (status, _, after) = send(
        &app,
        cycle(json!({"trigger": "data-store", "new_name": "Nope"}), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(after["records"], before["records"]);

    let (_, _, missing) = send(&app, cycle(json!({"trigger": "remove"}), None)).await;
    assert_eq!(missing["records"], before["records"]);
}

#[tokio::test]
async fn sessions_keep_separate_datasets() {
    let app = router(Arc::new(AppState::new(Backend::Session(
        SessionRegistry::new().with_seed(1),
    ))));

    let (_, alice, _) = send(&app, get("/api/dataset", None)).await;
    let (_, bob, _) = send(&app, get("/api/dataset", None)).await;
    let alice = alice.expect("session cookie");
    let bob = bob.expect("session cookie");
    assert_ne!(alice, bob);

    let (_, cookie, body) = send(
        &app,
        cycle(json!({"trigger": "add", "new_name": "Alice Only"}), Some(&alice)),
    )
    .await;
    assert_eq!(cookie.as_deref(), Some(alice.as_str()));
    assert_eq!(body["records"].as_array().unwrap().len(), 6);

    let (_, _, bob_view) = send(&app, get("/api/dataset", Some(&bob))).await;
    assert!(!names(&bob_view).contains(&"Alice Only".to_string()));

    let (_, _, alice_view) = send(&app, get("/api/dataset", Some(&alice))).await;
    assert!(names(&alice_view).contains(&"Alice Only".to_string()));
}

#[tokio::test]
async fn sqlite_backend_persists_across_restarts() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("services.db");

    let app = router(Arc::new(AppState::new(Backend::Sqlite(Mutex::new(
        SqliteStore::open(&db).unwrap(),
    )))));
    send(
        &app,
        cycle(json!({"trigger": "add", "new_name": "Persisted", "urgency": 2}), None),
    )
    .await;
    drop(app);

    let reopened = router(Arc::new(AppState::new(Backend::Sqlite(Mutex::new(
        SqliteStore::open(&db).unwrap(),
    )))));
    let (_, _, body) = send(&reopened, get("/api/dataset", None)).await;
    let records = body["records"].as_array().unwrap();
    assert_eq!(records.len(), 6);
    assert_eq!(records[5]["service"], "Persisted");
    assert_eq!(records[5]["urgency"], 2);
    assert_eq!(records[5]["resources"], 5);
}

#[tokio::test]
async fn file_backend_writes_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dashboard.bin.gz");
    let app = router(Arc::new(AppState::new(Backend::File(Mutex::new(
        FileStore::with_seed(&path, 8),
    )))));

    send(&app, cycle(json!({"trigger": "remove", "selected_name": "Tech Delivery"}), None)).await;

    let stored = service_dashboard::saving::load_dataset(&path).unwrap();
    assert_eq!(stored.len(), 4);
    assert!(!stored.contains("Tech Delivery"));
}

#[tokio::test]
async fn chart_and_exports_reflect_dataset() {
    let app = memory_app();

    let response = app.clone().oneshot(get("/api/chart.svg", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/svg+xml");
    let svg = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let svg = String::from_utf8(svg.to_vec()).unwrap();
    assert!(svg.contains("IT Support Hotline"));

    let response = app.clone().oneshot(get("/api/export.csv", None)).await.unwrap();
    assert_eq!(response.headers()[header::CONTENT_TYPE], "text/csv");
    let csv = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let csv = String::from_utf8(csv.to_vec()).unwrap();
    assert_eq!(csv.lines().count(), 6);
    assert!(csv.starts_with("service,urgency,resources,regulations,uncertainty"));

    let response = app.clone().oneshot(get("/api/export.xlsx", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn dashboard_page_has_controls() {
    let app = memory_app();
    let response = app.clone().oneshot(get("/", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let html = String::from_utf8(html.to_vec()).unwrap();
    for id in ["service-dropdown", "new-service-name", "add-button", "update-button", "remove-button"] {
        assert!(html.contains(id), "missing {}", id);
    }
}

#[tokio::test]
async fn read_only_endpoints_never_rewrite_sqlite() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("services.db");
    let app = router(Arc::new(AppState::new(Backend::Sqlite(Mutex::new(
        SqliteStore::open(&db).unwrap().with_seed(4),
    )))));
    let (_, _, seeded) = send(&app, get("/api/dataset", None)).await;

    let audit = rusqlite::Connection::open(&db).unwrap();
    audit
        .execute_batch(
            "CREATE TABLE deleted_rows (service TEXT);
             CREATE TRIGGER log_deletes AFTER DELETE ON services
             BEGIN INSERT INTO deleted_rows VALUES (OLD.service); END;",
        )
        .unwrap();
    let deletes = || -> i64 {
        audit
            .query_row("SELECT COUNT(*) FROM deleted_rows", [], |row| row.get(0))
            .unwrap()
    };

    for uri in ["/api/chart.svg", "/api/export.csv", "/api/export.xlsx"] {
        let response = app.clone().oneshot(get(uri, None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK, "{}", uri);
    }
    assert_eq!(deletes(), 0);

    let (_, _, cycled) = send(&app, cycle(json!({}), None)).await;
    assert_eq!(cycled["records"], seeded["records"]);
    assert_eq!(deletes(), 5);
}

#[tokio::test]
async fn cookieless_reads_open_no_session() {
    let app = router(Arc::new(AppState::new(Backend::Session(
        SessionRegistry::new().with_seed(3),
    ))));

    for uri in ["/api/chart.svg", "/api/export.csv", "/api/export.xlsx"] {
        let (status, cookie, _) = send(&app, get(uri, None)).await;
        assert_eq!(status, StatusCode::OK, "{}", uri);
        assert_eq!(cookie, None, "{} issued a session", uri);
    }

    let (_, cookie, _) = send(&app, get("/api/dataset", None)).await;
    let cookie = cookie.expect("session cookie");
    send(&app, cycle(json!({"trigger": "add", "new_name": "Kept"}), Some(&cookie))).await;

    let response = app
        .clone()
        .oneshot(get("/api/export.csv", Some(&cookie)))
        .await
        .unwrap();
    assert!(response.headers().get(header::SET_COOKIE).is_none());
    let csv = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert!(String::from_utf8(csv.to_vec()).unwrap().contains("Kept"));
}

#[tokio::test]
async fn null_slider_values_use_the_default() {
    let app = memory_app();
    let (status, _, body) = send(
        &app,
        cycle(
            json!({"trigger": "remove", "selected_name": "Tech Delivery", "urgency": null}),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(!names(&body).contains(&"Tech Delivery".to_string()));

    let (status, _, body) = send(
        &app,
        cycle(
            json!({"trigger": "add", "new_name": "Nulls", "urgency": null, "resources": 8, "regulations": null, "uncertainty": null}),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["records"].as_array().unwrap().last().unwrap(),
        &json!({"service": "Nulls", "urgency": 5, "resources": 8, "regulations": 5, "uncertainty": 5})
    );
}
