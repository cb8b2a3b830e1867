//! Fixed-window login rate limiting.
//!
//! Counters live behind the [`AttemptStore`] trait so a multi-instance
//! deployment can keep them in a shared cache; [`InMemoryAttemptStore`]
//! serves a single process.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::{AuthError, AuthResult};

/// Counter state for one client.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AttemptWindow {
    /// Attempts recorded in the current window, including this one.
    pub count: u32,
    pub started_at: DateTime<Utc>,
}

/// Storage for per-client attempt counters.
#[async_trait]
pub trait AttemptStore: Send + Sync {
    /// Count one attempt for `key`, opening a fresh window if the previous
    /// one (of length `window`) has ended by `now`.
    async fn record(
        &self,
        key: &str,
        window: Duration,
        now: DateTime<Utc>,
    ) -> AuthResult<AttemptWindow>;

    /// Forget every attempt for `key`.
    async fn reset(&self, key: &str) -> AuthResult<()>;
}

/// Process-local [`AttemptStore`]. Expired windows are pruned on write.
#[derive(Debug, Default)]
pub struct InMemoryAttemptStore {
    windows: Mutex<HashMap<String, AttemptWindow>>,
}

impl InMemoryAttemptStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of clients currently tracked.
    pub fn tracked(&self) -> usize {
        self.windows.lock().map(|w| w.len()).unwrap_or(0)
    }
}

fn window_end(start: DateTime<Utc>, window: Duration) -> DateTime<Utc> {
    chrono::Duration::from_std(window)
        .ok()
        .and_then(|w| start.checked_add_signed(w))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

#[async_trait]
impl AttemptStore for InMemoryAttemptStore {
    async fn record(
        &self,
        key: &str,
        window: Duration,
        now: DateTime<Utc>,
    ) -> AuthResult<AttemptWindow> {
        let mut windows = self
            .windows
            .lock()
            .map_err(|e| AuthError::Store(format!("lock poisoned: {e}")))?;
        windows.retain(|_, w| window_end(w.started_at, window) >= now);

        let entry = windows
            .entry(key.to_string())
            .and_modify(|w| w.count = w.count.saturating_add(1))
            .or_insert(AttemptWindow {
                count: 1,
                started_at: now,
            });
        Ok(*entry)
    }

    async fn reset(&self, key: &str) -> AuthResult<()> {
        self.windows
            .lock()
            .map_err(|e| AuthError::Store(format!("lock poisoned: {e}")))?
            .remove(key);
        Ok(())
    }
}

/// Window length and attempt budget.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub window: Duration,
    pub max_attempts: u32,
}

impl Default for RateLimitConfig {
    /// Five attempts per fifteen minutes.
    fn default() -> Self {
        Self {
            window: Duration::from_secs(15 * 60),
            max_attempts: 5,
        }
    }
}

/// Outcome of one rate-limit check.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub remaining: u32,
    pub reset_at: DateTime<Utc>,
    /// Zero when allowed.
    pub retry_after: Duration,
}

impl RateLimitDecision {
    /// Whole seconds to wait, rounded up, for a `Retry-After` header.
    pub fn retry_after_secs(&self) -> u64 {
        let secs = self.retry_after.as_secs();
        if self.retry_after.subsec_nanos() > 0 {
            secs + 1
        } else {
            secs
        }
    }
}

/// Applies a [`RateLimitConfig`] over an [`AttemptStore`].
#[derive(Clone)]
pub struct RateLimiter {
    store: Arc<dyn AttemptStore>,
    config: RateLimitConfig,
}

impl RateLimiter {
    pub fn new(store: Arc<dyn AttemptStore>, config: RateLimitConfig) -> Self {
        Self { store, config }
    }

    /// In-memory limiter with the default budget.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryAttemptStore::new()), RateLimitConfig::default())
    }

    pub fn config(&self) -> RateLimitConfig {
        self.config
    }

    /// Record an attempt for `key` and decide whether it may proceed.
    pub async fn check(&self, key: &str, now: DateTime<Utc>) -> AuthResult<RateLimitDecision> {
        let window = self.store.record(key, self.config.window, now).await?;
        let reset_at = window_end(window.started_at, self.config.window);
        let allowed = window.count <= self.config.max_attempts;
        let decision = RateLimitDecision {
            allowed,
            remaining: self.config.max_attempts.saturating_sub(window.count),
            reset_at,
            retry_after: if allowed {
                Duration::ZERO
            } else {
                (reset_at - now).to_std().unwrap_or(Duration::ZERO)
            },
        };
        if !allowed {
            tracing::warn!(
                client = key,
                retry_after = decision.retry_after_secs(),
                "login rate limited"
            );
        }
        Ok(decision)
    }

    /// Clear `key`'s counter, e.g. after a successful login.
    pub async fn reset(&self, key: &str) -> AuthResult<()> {
        self.store.reset(key).await
    }
}
