use axum::http::HeaderValue;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::{
    DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer,
};
use tracing::Level;

use common::types::Health;

use crate::middleware::{rate_limit, require_admin};
use crate::state::AppState;

pub mod auth;
pub mod blog;

pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({"message": "Welcome to the blog API"}))
}

/// CORS for the configured frontend origin plus the local dev fallback.
pub fn build_cors(frontend_url: &str) -> CorsLayer {
    let origins: Vec<HeaderValue> = [frontend_url, "http://localhost:3000"]
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Build the full application router: public reads, token-guarded writes,
/// login/verify, all behind the rate limiter.
pub fn build_router(state: AppState, cors: CorsLayer) -> Router {
    // Public routes: reads need no credential
    let public = Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/api/blog-posts", get(blog::list_posts))
        .route("/api/blog-posts/:id", get(blog::get_post));

    // Mutating routes and the token check require a valid admin token
    let admin = Router::new()
        .route("/api/blog-posts", post(blog::create_post))
        .route(
            "/api/blog-posts/:id",
            put(blog::update_post).delete(blog::delete_post),
        )
        .route("/api/auth/verify", get(auth::verify))
        .route_layer(from_fn_with_state(state.clone(), require_admin));

    let auth_routes = Router::new()
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/logout", post(auth::logout));

    public
        .merge(admin)
        .merge(auth_routes)
        .with_state(state.clone())
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
        // Outermost: the limiter sees every request before routing
        .layer(from_fn_with_state(state, rate_limit))
}
