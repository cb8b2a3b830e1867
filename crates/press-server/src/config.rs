//! Server configuration: a TOML file, then environment overrides.
//!
//! ```toml
//! bind_addr = "0.0.0.0:3000"
//!
//! [github]
//! owner = "me"
//! repo = "blog"
//! branch = "content"
//!
//! [admin]
//! username = "editor"
//! secure_cookies = true
//! ```
//!
//! Secrets normally come from the environment: `GITHUB_TOKEN`,
//! `ADMIN_PASSWORD`, `ADMIN_COOKIE_SECRET`.

use std::fmt;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use press_auth::{RateLimitConfig, DEFAULT_ADMIN_USERNAME};
use press_store::{normalize_branch, CredentialScheme, GitHubOptions, RemoteConfig, DEFAULT_BRANCH};
use serde::{Deserialize, Serialize};

use crate::error::{ServerError, ServerResult};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub github: GitHubSettings,
    pub admin: AdminSettings,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            github: GitHubSettings::default(),
            admin: AdminSettings::default(),
        }
    }
}

/// Where content is committed.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GitHubSettings {
    pub token: String,
    pub owner: String,
    pub repo: String,
    pub branch: String,
    /// Inferred from the token when unset.
    pub scheme: Option<CredentialScheme>,
    /// GitHub Enterprise API root; public GitHub when unset.
    pub api_base: Option<String>,
}

impl Default for GitHubSettings {
    fn default() -> Self {
        Self {
            token: String::new(),
            owner: String::new(),
            repo: String::new(),
            branch: DEFAULT_BRANCH.to_string(),
            scheme: None,
            api_base: None,
        }
    }
}

impl fmt::Debug for GitHubSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitHubSettings")
            .field("token", &redacted(&self.token))
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("branch", &self.branch)
            .field("scheme", &self.scheme)
            .field("api_base", &self.api_base)
            .finish()
    }
}

/// The admin account and its session cookie.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminSettings {
    pub username: String,
    pub password: String,
    pub cookie_secret: String,
    /// Add `Secure` to the session cookie (serve over HTTPS).
    pub secure_cookies: bool,
    pub login_max_attempts: u32,
    pub login_window_secs: u64,
}

impl AdminSettings {
    pub fn rate_limit(&self) -> RateLimitConfig {
        RateLimitConfig {
            window: Duration::from_secs(self.login_window_secs),
            max_attempts: self.login_max_attempts,
        }
    }
}

impl Default for AdminSettings {
    fn default() -> Self {
        let limits = RateLimitConfig::default();
        Self {
            username: DEFAULT_ADMIN_USERNAME.to_string(),
            password: String::new(),
            cookie_secret: String::new(),
            secure_cookies: false,
            login_max_attempts: limits.max_attempts,
            login_window_secs: limits.window.as_secs(),
        }
    }
}

impl fmt::Debug for AdminSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminSettings")
            .field("username", &self.username)
            .field("password", &redacted(&self.password))
            .field("cookie_secret", &redacted(&self.cookie_secret))
            .field("secure_cookies", &self.secure_cookies)
            .field("login_max_attempts", &self.login_max_attempts)
            .field("login_window_secs", &self.login_window_secs)
            .finish()
    }
}

fn redacted(secret: &str) -> &'static str {
    if secret.is_empty() {
        "<unset>"
    } else {
        "<redacted>"
    }
}

impl ServerConfig {
    pub fn from_toml_str(raw: &str) -> ServerResult<Self> {
        toml::from_str(raw).map_err(|e| ServerError::Config(format!("invalid config file: {e}")))
    }

    /// Read `path` if given, then apply environment overrides.
    pub fn load(path: Option<&Path>) -> ServerResult<Self> {
        let mut config = match path {
            Some(path) => Self::from_toml_str(&std::fs::read_to_string(path)?)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Override fields from environment-style variables. Blank values are
    /// ignored except `CONTENT_BRANCH`, which falls back to `main`.
    pub fn apply_env<F>(&mut self, lookup: F) -> ServerResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(token) = get("GITHUB_TOKEN") {
            self.github.token = token;
        }
        if let Some(owner) = get("GITHUB_OWNER") {
            self.github.owner = owner;
        }
        if let Some(repo) = get("GITHUB_REPO") {
            self.github.repo = repo;
        }
        if let Some(branch) = lookup("CONTENT_BRANCH") {
            self.github.branch = normalize_branch(&branch);
        }
        if let Some(scheme) = get("GITHUB_TOKEN_SCHEME") {
            self.github.scheme = Some(
                scheme
                    .parse()
                    .map_err(|e: String| ServerError::Config(format!("GITHUB_TOKEN_SCHEME: {e}")))?,
            );
        }
        if let Some(api_base) = get("GITHUB_API_BASE") {
            self.github.api_base = Some(api_base);
        }
        if let Some(username) = get("ADMIN_USERNAME") {
            self.admin.username = username;
        }
        // Passwords are taken verbatim; only an unset or empty value is skipped.
        if let Some(password) = lookup("ADMIN_PASSWORD").filter(|v| !v.is_empty()) {
            self.admin.password = password;
        }
        if let Some(secret) = lookup("ADMIN_COOKIE_SECRET").filter(|v| !v.is_empty()) {
            self.admin.cookie_secret = secret;
        }
        if let Some(bind) = get("PRESS_BIND") {
            self.bind_addr = bind
                .parse()
                .map_err(|e| ServerError::Config(format!("PRESS_BIND {bind:?}: {e}")))?;
        }
        Ok(())
    }

    /// Reject a configuration the server cannot run with, naming every
    /// missing variable at once.
    pub fn validate(&self) -> ServerResult<()> {
        self.check(true)?;
        if self.admin.login_max_attempts == 0 {
            return Err(ServerError::Config(
                "admin.login_max_attempts must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Like [`validate`](Self::validate) but only for the GitHub settings,
    /// for tools that never serve the admin API.
    pub fn validate_content_store(&self) -> ServerResult<()> {
        self.check(false)
    }

    fn check(&self, with_admin: bool) -> ServerResult<()> {
        let mut required = vec![
            ("GITHUB_TOKEN", self.github.token.trim()),
            ("GITHUB_OWNER", self.github.owner.trim()),
            ("GITHUB_REPO", self.github.repo.trim()),
        ];
        if with_admin {
            required.push(("ADMIN_PASSWORD", self.admin.password.as_str()));
            required.push(("ADMIN_COOKIE_SECRET", self.admin.cookie_secret.as_str()));
        }
        let missing: Vec<&str> = required
            .into_iter()
            .filter(|(_, value)| value.is_empty())
            .map(|(name, _)| name)
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ServerError::Config(format!(
                "missing configuration: {}",
                missing.join(", ")
            )))
        }
    }

    pub fn remote_config(&self) -> RemoteConfig {
        let github = &self.github;
        let config = RemoteConfig::new(
            github.token.trim(),
            github.owner.trim(),
            github.repo.trim(),
            &github.branch,
        );
        match github.scheme {
            Some(scheme) => config.with_scheme(scheme),
            None => config,
        }
    }

    pub fn github_options(&self) -> GitHubOptions {
        let mut options = GitHubOptions::default();
        if let Some(api_base) = &self.github.api_base {
            options.api_base = api_base.clone();
        }
        options
    }
}
