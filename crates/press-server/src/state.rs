use std::sync::Arc;

use press_auth::{
    AdminCredentials, AttemptStore, InMemoryAttemptStore, RateLimiter, SessionSigner,
};
use press_publish::Publisher;
use press_store::{ContentStore, GitHubStore};
use tracing::info;

use crate::config::{AdminSettings, ServerConfig};
use crate::error::{ServerError, ServerResult};

/// Everything a handler needs. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    publisher: Publisher,
    signer: SessionSigner,
    credentials: AdminCredentials,
    limiter: RateLimiter,
    secure_cookies: bool,
}

impl AppState {
    /// State over an arbitrary content store, with an in-process login
    /// attempt counter.
    pub fn new(store: Arc<dyn ContentStore>, admin: &AdminSettings) -> ServerResult<Self> {
        let signer = SessionSigner::new(admin.cookie_secret.as_bytes())
            .map_err(|e| ServerError::Config(format!("ADMIN_COOKIE_SECRET: {e}")))?;
        Ok(Self {
            publisher: Publisher::new(store),
            signer,
            credentials: AdminCredentials::new(admin.username.as_str(), admin.password.as_str()),
            limiter: RateLimiter::new(Arc::new(InMemoryAttemptStore::new()), admin.rate_limit()),
            secure_cookies: admin.secure_cookies,
        })
    }

    /// Validate `config` and connect to the configured GitHub repository.
    pub fn from_config(config: &ServerConfig) -> ServerResult<Self> {
        config.validate()?;
        let remote = config.remote_config();
        info!(
            repository = %remote.full_name(),
            branch = %remote.branch,
            scheme = %remote.scheme,
            "content store configured"
        );
        let store = GitHubStore::with_options(remote, config.github_options())
            .map_err(|e| ServerError::Config(e.to_string()))?;
        Self::new(Arc::new(store), &config.admin)
    }

    /// Keep login attempts in `store` instead of process memory.
    pub fn with_attempt_store(mut self, store: Arc<dyn AttemptStore>) -> Self {
        self.limiter = RateLimiter::new(store, self.limiter.config());
        self
    }

    pub fn publisher(&self) -> &Publisher {
        &self.publisher
    }

    pub fn signer(&self) -> &SessionSigner {
        &self.signer
    }

    pub fn credentials(&self) -> &AdminCredentials {
        &self.credentials
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    pub fn secure_cookies(&self) -> bool {
        self.secure_cookies
    }
}
