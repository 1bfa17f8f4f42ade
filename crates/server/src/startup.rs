use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use common::utils::logging::init_logging_from_env;
use dotenvy::dotenv;
use tracing::info;

use service::auth::TokenIssuer;
use service::blog::{BlogRepository, GistBlogRepository};
use service::gist::HttpGistStore;
use service::rate_limit::RateLimiter;

use crate::routes;
use crate::state::AppState;

/// Public entry: load config, wire the services, run the HTTP server.
pub async fn run() -> anyhow::Result<()> {
    dotenv().ok();
    init_logging_from_env();

    let cfg = configs::AppConfig::load_and_validate()?;

    let store = HttpGistStore::new(
        &cfg.gist.api_base,
        &cfg.gist.gist_id,
        &cfg.gist.token,
        &cfg.gist.filename,
    );
    let repo: Arc<dyn BlogRepository> = Arc::new(GistBlogRepository::new(store));
    let issuer = Arc::new(TokenIssuer::new(
        &cfg.auth.secret_key,
        &cfg.auth.admin_password,
        cfg.auth.token_ttl_days,
    ));
    let limiter = Arc::new(RateLimiter::new(
        cfg.rate_limit.requests_per_minute,
        cfg.rate_limit.enabled,
    ));
    let state = AppState { repo, issuer, limiter };

    let cors = routes::build_cors(&cfg.server.frontend_url);
    let app: Router = routes::build_router(state, cors);

    let addr: SocketAddr = format!("{}:{}", cfg.server.host, cfg.server.port).parse()?;
    info!(%addr, "starting blog server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}
