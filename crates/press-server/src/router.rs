use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::handler;
use crate::state::AppState;

/// Upper bound on a request body; publish forms carry images.
pub const MAX_BODY_BYTES: usize = 20 * 1024 * 1024;

/// Build the axum router with every press endpoint.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(handler::health_handler))
        .route("/api/articles", get(handler::public_articles_handler))
        .route("/api/admin/login", post(handler::login_handler))
        .route("/api/admin/logout", post(handler::logout_handler))
        .route("/api/admin/publish", post(handler::publish_handler))
        .route("/api/admin/articles", get(handler::list_articles_handler))
        .route(
            "/api/admin/articles/:slug",
            get(handler::get_article_handler)
                .put(handler::update_article_handler)
                .delete(handler::delete_article_handler),
        )
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
