use std::sync::Arc;

use service::auth::TokenIssuer;
use service::blog::BlogRepository;
use service::rate_limit::RateLimiter;

/// Shared services, constructed once at startup and handed to every
/// request-handling context.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<dyn BlogRepository>,
    pub issuer: Arc<TokenIssuer>,
    pub limiter: Arc<RateLimiter>,
}
