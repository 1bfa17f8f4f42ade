use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::Service;

use server::routes;
use server::state::AppState;
use service::auth::TokenIssuer;
use service::blog::{BlogRepository, GistBlogRepository};
use service::gist::mock::MemoryGistStore;
use service::rate_limit::RateLimiter;

const ADMIN_PASSWORD: &str = "S3curePass!";

fn build_app(store: Arc<MemoryGistStore>) -> Router {
    let repo: Arc<dyn BlogRepository> = Arc::new(GistBlogRepository::new(store));
    let state = AppState {
        repo,
        issuer: Arc::new(TokenIssuer::new("test-secret", ADMIN_PASSWORD, 7)),
        limiter: Arc::new(RateLimiter::new(1000, true)),
    };
    routes::build_router(state, routes::build_cors("http://localhost:5173"))
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_json(resp: axum::response::Response) -> Value {
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn login(app: &Router) -> String {
    let resp = app
        .clone()
        .call(json_request("POST", "/api/auth/login", json!({"password": ADMIN_PASSWORD})))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    body["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn public_reads_need_no_token() {
    let app = build_app(Arc::new(MemoryGistStore::default()));

    let resp = app.clone().call(get_request("/health")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = app.clone().call(get_request("/api/blog-posts")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await, json!({}));

    let resp = app.clone().call(get_request("/api/blog-posts/1")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn mutations_require_a_valid_token() {
    let app = build_app(Arc::new(MemoryGistStore::default()));

    let resp = app
        .clone()
        .call(json_request("POST", "/api/blog-posts", json!({"title": "A", "content": "x"})))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let mut req = json_request("DELETE", "/api/blog-posts/1", json!({}));
    req.headers_mut()
        .insert("authorization", "Bearer not.a.token".parse().unwrap());
    let resp = app.clone().call(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(resp).await["detail"], "Authentication failed");
}

#[tokio::test]
async fn full_crud_flow() {
    let app = build_app(Arc::new(MemoryGistStore::default()));
    let token = login(&app).await;
    let bearer = format!("Bearer {token}");

    // Create two posts
    let mut req = json_request("POST", "/api/blog-posts", json!({"title": "A", "content": "x"}));
    req.headers_mut().insert("authorization", bearer.parse().unwrap());
    let resp = app.clone().call(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let created = body_json(resp).await;
    assert_eq!(created["id"], "1");
    assert_eq!(created["title"], "A");

    let mut req = json_request("POST", "/api/blog-posts", json!({"title": "B", "content": "y"}));
    req.headers_mut().insert("authorization", bearer.parse().unwrap());
    let resp = app.clone().call(req).await.unwrap();
    assert_eq!(body_json(resp).await["id"], "2");

    // Read back
    let resp = app.clone().call(get_request("/api/blog-posts/1")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["title"], "A");

    let resp = app.clone().call(get_request("/api/blog-posts")).await.unwrap();
    let listed = body_json(resp).await;
    let ids: Vec<&String> = listed.as_object().unwrap().keys().collect();
    assert_eq!(ids, ["1", "2"]);

    // Partial update keeps the other fields
    let mut req = json_request("PUT", "/api/blog-posts/1", json!({"content": "z"}));
    req.headers_mut().insert("authorization", bearer.parse().unwrap());
    let resp = app.clone().call(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let updated = body_json(resp).await;
    assert_eq!(updated["title"], "A");
    assert_eq!(updated["content"], "z");

    // Update of a missing id is a 404
    let mut req = json_request("PUT", "/api/blog-posts/99", json!({"content": "z"}));
    req.headers_mut().insert("authorization", bearer.parse().unwrap());
    let resp = app.clone().call(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // Delete once, then observe absence
    let mut req = Request::builder()
        .method("DELETE")
        .uri("/api/blog-posts/1")
        .body(Body::empty())
        .unwrap();
    req.headers_mut().insert("authorization", bearer.parse().unwrap());
    let resp = app.clone().call(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let mut req = Request::builder()
        .method("DELETE")
        .uri("/api/blog-posts/1")
        .body(Body::empty())
        .unwrap();
    req.headers_mut().insert("authorization", bearer.parse().unwrap());
    let resp = app.clone().call(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = app.clone().call(get_request("/api/blog-posts/1")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn invalid_draft_is_rejected_with_422() {
    let app = build_app(Arc::new(MemoryGistStore::default()));
    let token = login(&app).await;

    let mut req = json_request("POST", "/api/blog-posts", json!({"title": "", "content": "x"}));
    req.headers_mut()
        .insert("authorization", format!("Bearer {token}").parse().unwrap());
    let resp = app.clone().call(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn store_outage_maps_to_503() {
    let store = Arc::new(MemoryGistStore::default());
    let app = build_app(store.clone());
    store.set_unreachable(true);

    let resp = app.clone().call(get_request("/api/blog-posts")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = body_json(resp).await;
    assert_eq!(body["detail"], "Gist store unavailable");
    assert!(body["message"].as_str().unwrap().contains("unreachable"));
}
