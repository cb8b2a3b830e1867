//! Admin authentication for press.
//!
//! - [`SessionSigner`] issues and verifies the signed session token kept in
//!   the admin cookie (`base64url(claims).base64url(hmac_sha256)`).
//! - [`AdminCredentials`] checks a login attempt in constant time.
//! - [`RateLimiter`] bounds login attempts per client over a fixed window,
//!   backed by any [`AttemptStore`].
//! - [`cookie`] builds and reads the session cookie.

pub mod cookie;
pub mod credentials;
pub mod error;
pub mod ratelimit;
pub mod session;

pub use cookie::{
    clear_session_cookie, client_identifier, cookie_value, session_cookie, SESSION_COOKIE,
    SESSION_TTL,
};
pub use credentials::{AdminCredentials, DEFAULT_ADMIN_USERNAME};
pub use error::{AuthError, AuthResult};
pub use ratelimit::{
    AttemptStore, AttemptWindow, InMemoryAttemptStore, RateLimitConfig, RateLimitDecision,
    RateLimiter,
};
pub use session::{SessionClaims, SessionSigner};
