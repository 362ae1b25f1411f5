// HTTP API tests: drive the real router with in-memory requests.
//
// Each test builds a fresh in-memory database and router, then sends
// requests through `tower::ServiceExt::oneshot`.

#![cfg(feature = "web")]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use tower::ServiceExt;

use verbatim::config::Config;
use verbatim::db::models::{Document, User};
use verbatim::db::{self, Database, SqliteDatabase};
use verbatim::web::{build_router, AppState};

const SECRET: &str = "integration-test-session-secret";

fn test_app() -> (Router, Arc<dyn Database>) {
    let db: Arc<dyn Database> = Arc::new(SqliteDatabase::new(db::open_in_memory().unwrap()));
    (app_with(db.clone()), db)
}

fn app_with(db: Arc<dyn Database>) -> Router {
    let config = Config {
        db_path: ":memory:".to_string(),
        session_secret: SECRET.to_string(),
        bind: "127.0.0.1".to_string(),
        port: 0,
    };
    let state = AppState {
        db,
        config: Arc::new(config),
    };
    build_router(state)
}

/// SQLite store whose next document insert fails, for exercising the
/// handler's storage-error path.
struct FlakyStore {
    inner: SqliteDatabase,
    fail_next_store: AtomicBool,
}

impl FlakyStore {
    fn new() -> Self {
        Self {
            inner: SqliteDatabase::new(db::open_in_memory().unwrap()),
            fail_next_store: AtomicBool::new(true),
        }
    }
}

#[async_trait]
impl Database for FlakyStore {
    async fn table_count(&self) -> Result<i64> {
        self.inner.table_count().await
    }

    async fn store_document_text(&self, text: &str, submitted_by: Option<i64>) -> Result<i64> {
        if self.fail_next_store.swap(false, Ordering::SeqCst) {
            anyhow::bail!("disk I/O error");
        }
        self.inner.store_document_text(text, submitted_by).await
    }

    async fn list_document_texts(&self) -> Result<Vec<String>> {
        self.inner.list_document_texts().await
    }

    async fn list_documents(&self) -> Result<Vec<Document>> {
        self.inner.list_documents().await
    }

    async fn document_count(&self) -> Result<i64> {
        self.inner.document_count().await
    }

    async fn create_user(&self, username: &str, password_hash: &str) -> Result<Option<i64>> {
        self.inner.create_user(username, password_hash).await
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.inner.find_user_by_username(username).await
    }

    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>> {
        self.inner.find_user_by_id(id).await
    }

    async fn user_count(&self) -> Result<i64> {
        self.inner.user_count().await
    }
}

fn json_request(method: &str, uri: &str, body: serde_json::Value, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Sign up and log in, returning the `name=value` cookie pair.
async fn login_cookie(app: &Router, username: &str, password: &str) -> String {
    let credentials = serde_json::json!({ "username": username, "password": password });

    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/signup", credentials.clone(), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/login", credentials, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap();
    set_cookie.split(';').next().unwrap().to_string()
}

#[tokio::test]
async fn health_is_public_and_not_cached() {
    let (app, _) = test_app();
    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CACHE_CONTROL).unwrap(),
        "no-store"
    );
}

#[tokio::test]
async fn protected_routes_require_session() {
    let (app, _) = test_app();
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/detect/database",
            serde_json::json!({ "text": "anything" }),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/documents",
            serde_json::json!({ "text": "anything" }),
            Some("verbatim_session=1.2.3.forged"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn signup_rejects_duplicates_and_blanks() {
    let (app, _) = test_app();
    let _cookie = login_cookie(&app, "ada", "lovelace").await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/signup",
            serde_json::json!({ "username": "ada", "password": "other" }),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/signup",
            serde_json::json!({ "username": "  ", "password": "pw" }),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn login_failures() {
    let (app, _) = test_app();
    let _cookie = login_cookie(&app, "grace", "hopper").await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/login",
            serde_json::json!({ "username": "grace", "password": "wrong" }),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/login",
            serde_json::json!({ "username": "nobody", "password": "x" }),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn add_documents_then_detect() {
    let (app, db) = test_app();
    let cookie = login_cookie(&app, "alan", "turing").await;

    for text in [
        "Computing machinery and intelligence asks whether machines can think",
        "Bread baking requires flour water salt and yeast",
    ] {
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/documents",
                serde_json::json!({ "text": text }),
                Some(cookie.as_str()),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }
    assert_eq!(db.document_count().await.unwrap(), 2);

    let response = app
        .clone()
        .oneshot(
            Request::get("/api/documents")
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let listing = body_json(response).await;
    assert_eq!(listing["total"], 2);

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/detect/database",
            serde_json::json!({ "text": "Can machines think? Computing machinery intelligence" }),
            Some(cookie.as_str()),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let report = body_json(response).await;
    assert_eq!(report["detection_type"], "database");
    let results = report["results"].as_array().unwrap();
    assert_eq!(results.len(), 2);
    let first = results[0]["score"].as_f64().unwrap();
    let second = results[1]["score"].as_f64().unwrap();
    assert!(first > second);
    assert_eq!(second, 0.0);
    assert!(report["top_common_terms"].as_array().unwrap().len() <= 3);
}

#[tokio::test]
async fn direct_comparison_is_public() {
    let (app, _) = test_app();
    let response = app
        .oneshot(json_request(
            "POST",
            "/api/detect/direct",
            serde_json::json!({
                "text1": "Rivers carve canyons over millions of years",
                "text2": "Over millions of years rivers carve deep canyons",
            }),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let report = body_json(response).await;
    assert_eq!(report["detection_type"], "direct");
    let score = report["similarity_score"].as_f64().unwrap();
    let percent = report["similarity_percent"].as_f64().unwrap();
    assert!(score > 0.5 && score <= 1.0);
    assert!((percent - score * 100.0).abs() < 1e-9);
    let terms = report["top_common_terms"].as_array().unwrap();
    assert_eq!(terms.len(), 3);
    assert!(terms[0]["weight_a"].as_f64().unwrap() > 0.0);
}

#[tokio::test]
async fn direct_comparison_of_empty_texts() {
    let (app, _) = test_app();
    let response = app
        .oneshot(json_request(
            "POST",
            "/api/detect/direct",
            serde_json::json!({ "text1": "", "text2": "" }),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let report = body_json(response).await;
    assert_eq!(report["similarity_score"].as_f64().unwrap(), 0.0);
}

#[tokio::test]
async fn logout_clears_cookie() {
    let (app, _) = test_app();
    let cookie = login_cookie(&app, "barbara", "liskov").await;
    let response = app
        .oneshot(json_request(
            "POST",
            "/api/logout",
            serde_json::json!({}),
            Some(cookie.as_str()),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(set_cookie.contains("Max-Age=0"));
}

#[tokio::test]
async fn storage_failure_is_500_and_server_keeps_serving() {
    let db: Arc<dyn Database> = Arc::new(FlakyStore::new());
    let app = app_with(db.clone());
    let cookie = login_cookie(&app, "edsger", "dijkstra").await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/documents",
            serde_json::json!({ "text": "lost to a failing disk" }),
            Some(cookie.as_str()),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert!(body["error"].is_string());
    assert_eq!(db.document_count().await.unwrap(), 0);

    // Same router, next request goes through normally
    let response = app
        .oneshot(json_request(
            "POST",
            "/api/documents",
            serde_json::json!({ "text": "stored after recovery" }),
            Some(cookie.as_str()),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(
        db.list_document_texts().await.unwrap(),
        vec!["stored after recovery".to_string()]
    );
}

#[tokio::test]
async fn cors_preflight_allows_only_content_type() {
    let (app, _) = test_app();
    let response = app
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/api/detect/direct")
                .header(header::ORIGIN, "https://example.com")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let allowed = response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_HEADERS)
        .unwrap()
        .to_str()
        .unwrap()
        .to_ascii_lowercase();
    assert_eq!(allowed, "content-type");
}
