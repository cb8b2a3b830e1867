//! HTTP server for press.
//!
//! Serves the admin API (login, article CRUD, multipart publish) and the
//! public article index on top of a [`Publisher`]. Admin routes sit behind
//! the [`AdminSession`] extractor, which runs before any body is read.
//!
//! [`Publisher`]: press_publish::Publisher

pub mod config;
pub mod error;
pub mod form;
pub mod handler;
pub mod router;
pub mod server;
pub mod session;
pub mod state;

pub use config::{AdminSettings, GitHubSettings, ServerConfig};
pub use error::{ServerError, ServerResult};
pub use router::build_router;
pub use server::PressServer;
pub use session::AdminSession;
pub use state::AppState;

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::Request;
    use press_store::InMemoryContentStore;
    use tower::util::ServiceExt;

    use super::*;

    fn app() -> axum::Router {
        let admin = AdminSettings {
            password: "hunter2".into(),
            cookie_secret: "secret".into(),
            ..AdminSettings::default()
        };
        let state = AppState::new(Arc::new(InMemoryContentStore::new("main")), &admin).unwrap();
        build_router(state)
    }

    #[tokio::test]
    async fn health_endpoint() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/api/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
    }

    #[tokio::test]
    async fn unknown_route_is_404() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/api/nope")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), 404);
    }
}
