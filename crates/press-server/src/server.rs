use tokio::net::TcpListener;
use tracing::info;

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::router::build_router;
use crate::state::AppState;

/// The press HTTP server.
pub struct PressServer {
    config: ServerConfig,
    state: AppState,
}

impl PressServer {
    /// Validate `config` and connect the content store.
    pub fn new(config: ServerConfig) -> ServerResult<Self> {
        let state = AppState::from_config(&config)?;
        Ok(Self { config, state })
    }

    /// Serve an already-built state (useful for testing).
    pub fn with_state(config: ServerConfig, state: AppState) -> Self {
        Self { config, state }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn router(&self) -> axum::Router {
        build_router(self.state.clone())
    }

    /// Start serving requests until the process is stopped.
    pub async fn serve(self) -> ServerResult<()> {
        let app = self.router();
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        info!(addr = %self.config.bind_addr, "press server listening");
        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn construction_requires_complete_config() {
        let err = PressServer::new(ServerConfig::default()).err().unwrap();
        assert!(matches!(err, ServerError::Config(_)));
    }

    #[test]
    fn construction_with_complete_config() {
        let mut config = ServerConfig::default();
        config.github.token = "github_pat_x".into();
        config.github.owner = "me".into();
        config.github.repo = "blog".into();
        config.admin.password = "pw".into();
        config.admin.cookie_secret = "secret".into();

        let server = PressServer::new(config).unwrap();
        assert_eq!(server.config().github.repo, "blog");
        let _router = server.router();
    }
}
