use std::fmt;

use hmac::{Hmac, Mac};
use sha2::Sha256;

/// Username used when none is configured.
pub const DEFAULT_ADMIN_USERNAME: &str = "admin";

const COMPARE_KEY: &[u8] = b"press-credential-compare";

/// The single admin account.
#[derive(Clone)]
pub struct AdminCredentials {
    username: String,
    password: String,
}

impl AdminCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        let username = username.into();
        let username = match username.trim() {
            "" => DEFAULT_ADMIN_USERNAME.to_string(),
            trimmed => trimmed.to_string(),
        };
        Self {
            username,
            password: password.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// `true` if both fields match. The submitted username is trimmed;
    /// the password is compared as given. Both comparisons run in
    /// constant time with respect to the stored values.
    pub fn check(&self, username: &str, password: &str) -> bool {
        if self.password.is_empty() || password.is_empty() {
            return false;
        }
        let user_ok = constant_time_eq(self.username.as_bytes(), username.trim().as_bytes());
        let pass_ok = constant_time_eq(self.password.as_bytes(), password.as_bytes());
        user_ok & pass_ok
    }
}

/// Compare HMAC digests of both sides so timing depends on neither length
/// nor content.
fn constant_time_eq(expected: &[u8], given: &[u8]) -> bool {
    let digest = |data: &[u8]| {
        <Hmac<Sha256> as Mac>::new_from_slice(COMPARE_KEY).map(|mut mac| {
            mac.update(data);
            mac
        })
    };
    match (digest(expected), digest(given)) {
        (Ok(expected), Ok(given)) => expected.verify(&given.finalize().into_bytes()).is_ok(),
        _ => false,
    }
}

impl fmt::Debug for AdminCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}
