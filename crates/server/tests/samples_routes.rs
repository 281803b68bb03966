use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};
use tower::ServiceExt;
use tower_http::cors::CorsLayer;

use configs::AppConfig;
use server::{routes, startup};
use service::cache::SystemClock;
use service::storage::MemoryBlobStore;

const SECRET: &str = "test-secret";
const EN_US: &str = "sample-queries/en-us/sample-queries.json";
const FR_FR: &str = "sample-queries/fr-fr/sample-queries.json";
const POLICIES: &str = "policies/sample-queries-policies.json";
const MAIL_ID: &str = "3482cc10-f2be-40fc-bcdb-d3ac35f3e4c3";
const USERS_ID: &str = "0b2a7c5e-6f0b-4d6a-9d32-5e1f5c0f1b11";

fn document() -> String {
    json!({
        "sampleQueries": [
            {"id": MAIL_ID, "category": "Mail", "method": "GET", "humanName": "my mails",
             "requestUrl": "/v1.0/me/messages", "tip": "needs Mail.Read"},
            {"id": USERS_ID, "category": "Users", "method": "GET", "humanName": "all users",
             "requestUrl": "/v1.0/users"}
        ]
    })
    .to_string()
}

fn policies() -> String {
    json!({
        "categoryPolicies": [
            {"categoryName": "Mail",
             "create": {"access": "open"},
             "update": {"access": "restricted", "users": ["alice@contoso.com"]},
             "delete": {"access": "restricted", "users": ["alice@contoso.com"]}}
        ]
    })
    .to_string()
}

fn app_with(store: Arc<MemoryBlobStore>) -> Router {
    let mut cfg = AppConfig::default();
    cfg.auth.jwt_secret = SECRET.into();
    let state = startup::build_state(&cfg, store, Arc::new(SystemClock));
    routes::build_router(state, CorsLayer::very_permissive())
}

fn seeded_store() -> Arc<MemoryBlobStore> {
    Arc::new(
        MemoryBlobStore::new()
            .with_blob(EN_US, &document())
            .with_blob(POLICIES, &policies()),
    )
}

fn token(upn: Option<&str>) -> String {
    let mut claims: HashMap<String, Value> = HashMap::new();
    claims.insert("exp".into(), json!(chrono::Utc::now().timestamp() + 3600));
    if let Some(upn) = upn {
        claims.insert("upn".into(), json!(upn));
    }
    encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET.as_bytes())).unwrap()
}

fn request(method: Method, uri: &str, user: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri).header(header::HOST, "localhost");
    if let Some(user) = user {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token(Some(user))));
    }
    match body {
        Some(v) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(v.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn body_json(res: axum::response::Response) -> Value {
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn mail_record() -> Value {
    json!({"category": "Mail", "method": "get", "humanName": "my inbox", "requestUrl": "/v1.0/me/mailFolders/inbox"})
}

#[tokio::test]
async fn list_returns_whole_document_ordered() {
    let app = app_with(seeded_store());
    let res = app.oneshot(request(Method::GET, "/api/samples", None, None)).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body = body_json(res).await;
    let list = body["sampleQueries"].as_array().unwrap();
    assert_eq!(list.len(), 2);
    assert_eq!(list[0]["category"], "Mail");
    assert_eq!(list[1]["category"], "Users");
}

#[tokio::test]
async fn search_filters_or_reports_not_found() {
    let app = app_with(seeded_store());
    let res = app.clone().oneshot(request(Method::GET, "/samples?search=mail.read", None, None)).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body = body_json(res).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["id"], MAIL_ID);

    let res = app.oneshot(request(Method::GET, "/samples?search=zzz", None, None)).await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn empty_document_answers_no_content() {
    let app = app_with(Arc::new(MemoryBlobStore::new()));
    let res = app.clone().oneshot(request(Method::GET, "/api/samples", None, None)).await.unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    let res = app.oneshot(request(Method::GET, &format!("/api/samples/{MAIL_ID}"), None, None)).await.unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn get_by_id_uses_accept_language() {
    let store = seeded_store();
    store.put(FR_FR, &json!({"sampleQueries": [{"id": MAIL_ID, "category": "Courrier", "humanName": "mes courriels"}]}).to_string());
    let app = app_with(store);

    let req = Request::builder()
        .uri(format!("/api/samples/{MAIL_ID}"))
        .header(header::ACCEPT_LANGUAGE, "fr-FR,en;q=0.5")
        .body(Body::empty())
        .unwrap();
    let res = app.clone().oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body_json(res).await["category"], "Courrier");

    let res = app.oneshot(request(Method::GET, &format!("/api/samples/{USERS_ID}"), None, None)).await.unwrap();
    assert_eq!(body_json(res).await["humanName"], "all users");
}

#[tokio::test]
async fn malformed_and_unknown_ids() {
    let app = app_with(seeded_store());
    let res = app.clone().oneshot(request(Method::GET, "/api/samples/not-a-guid", None, None)).await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let res = app
        .oneshot(request(Method::GET, "/api/samples/00000000-0000-0000-0000-000000000001", None, None))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn writes_require_a_token() {
    let app = app_with(seeded_store());
    let res = app.clone().oneshot(request(Method::POST, "/api/samples", None, Some(mail_record()))).await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let req = Request::builder()
        .method(Method::DELETE)
        .uri(format!("/api/samples/{MAIL_ID}"))
        .header(header::AUTHORIZATION, "Bearer not-a-jwt")
        .body(Body::empty())
        .unwrap();
    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn update_is_restricted_to_listed_users() {
    let store = seeded_store();
    let app = app_with(store.clone());
    let uri = format!("/api/samples/{MAIL_ID}");

    let res = app.clone().oneshot(request(Method::PUT, &uri, Some("bob@contoso.com"), Some(mail_record()))).await.unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let err = body_json(res).await;
    assert!(err["detail"].as_str().unwrap().contains("bob@contoso.com"));

    let res = app.clone().oneshot(request(Method::PUT, &uri, Some("Alice@Contoso.com"), Some(mail_record()))).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body = body_json(res).await;
    assert_eq!(body["id"], MAIL_ID);
    assert_eq!(body["method"], "GET");

    // nothing is written back
    assert_eq!(store.write_count(), 0);
    let res = app.oneshot(request(Method::GET, &uri, None, None)).await.unwrap();
    assert_eq!(body_json(res).await["humanName"], "my mails");
}

#[tokio::test]
async fn invalid_record_is_rejected_before_policy_check() {
    let app = app_with(seeded_store());
    let res = app
        .oneshot(request(
            Method::PUT,
            &format!("/api/samples/{MAIL_ID}"),
            Some("bob@contoso.com"),
            Some(json!({"category": "Mail", "humanName": "x", "requestUrl": "v1.0/me"})),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_body_is_a_json_bad_request() {
    let app = app_with(seeded_store());
    let uri = format!("/api/samples/{MAIL_ID}");

    let mut bad_id = mail_record();
    bad_id["id"] = json!("abc");
    let res = app.clone().oneshot(request(Method::PUT, &uri, Some("alice@contoso.com"), Some(bad_id))).await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(res).await["error"], "Bad Request");

    let req = Request::builder()
        .method(Method::POST)
        .uri("/api/samples")
        .header(header::AUTHORIZATION, format!("Bearer {}", token(Some("alice@contoso.com"))))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"category\": "))
        .unwrap();
    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let err = body_json(res).await;
    assert_eq!(err["error"], "Bad Request");
    assert!(err["detail"].is_string());
}

#[tokio::test]
async fn create_sets_location_header() {
    let app = app_with(seeded_store());
    let res = app
        .oneshot(request(Method::POST, "/api/samples", Some("carol@contoso.com"), Some(mail_record())))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let location = res.headers().get(header::LOCATION).unwrap().to_str().unwrap().to_string();
    let body = body_json(res).await;
    let id = body["id"].as_str().unwrap();
    assert_ne!(id, "00000000-0000-0000-0000-000000000000");
    assert_eq!(location, format!("http://localhost/api/samples/{id}"));
}

#[tokio::test]
async fn create_in_unlisted_category_is_forbidden() {
    let app = app_with(seeded_store());
    let record = json!({"category": "Users", "humanName": "me", "requestUrl": "/v1.0/me"});
    let res = app
        .oneshot(request(Method::POST, "/samples", Some("alice@contoso.com"), Some(record)))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn delete_answers_no_content() {
    let app = app_with(seeded_store());
    let uri = format!("/samples/{MAIL_ID}");
    let res = app.clone().oneshot(request(Method::DELETE, &uri, Some("bob@contoso.com"), None)).await.unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = app.clone().oneshot(request(Method::DELETE, &uri, Some("alice@contoso.com"), None)).await.unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    assert!(bytes.is_empty());

    let res = app
        .oneshot(request(Method::DELETE, "/samples/00000000-0000-0000-0000-000000000001", Some("alice@contoso.com"), None))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn token_without_upn_is_forbidden() {
    let app = app_with(seeded_store());
    let req = Request::builder()
        .method(Method::DELETE)
        .uri(format!("/api/samples/{MAIL_ID}"))
        .header(header::AUTHORIZATION, format!("Bearer {}", token(None)))
        .body(Body::empty())
        .unwrap();
    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn missing_policy_document_is_bootstrapped() {
    let store = Arc::new(MemoryBlobStore::new().with_blob(EN_US, &document()));
    let app = app_with(store.clone());
    let res = app
        .oneshot(request(Method::POST, "/api/samples", Some("alice@contoso.com"), Some(mail_record())))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let written: Value = serde_json::from_str(&store.get(POLICIES).unwrap()).unwrap();
    assert_eq!(written["categoryPolicies"], json!([]));
}

#[tokio::test]
async fn storage_failure_is_internal_error() {
    let store = seeded_store();
    store.set_failing(true);
    let app = app_with(store);
    let res = app.oneshot(request(Method::GET, "/api/samples", None, None)).await.unwrap();
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body_json(res).await.get("error").is_some());
}

#[tokio::test]
async fn health_metrics_and_openapi() {
    let app = app_with(seeded_store());
    let res = app.clone().oneshot(request(Method::GET, "/health", None, None)).await.unwrap();
    assert_eq!(body_json(res).await, json!({"status": "ok"}));

    let _ = app.clone().oneshot(request(Method::GET, "/api/samples", None, None)).await.unwrap();
    let res = app.clone().oneshot(request(Method::GET, "/metrics", None, None)).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let text = String::from_utf8(to_bytes(res.into_body(), usize::MAX).await.unwrap().to_vec()).unwrap();
    assert!(text.contains("samples_cache_populations_total"));

    let res = app.oneshot(request(Method::GET, "/api-docs/openapi.json", None, None)).await.unwrap();
    let doc = body_json(res).await;
    assert!(doc["paths"].get("/api/samples/{id}").is_some());
}
