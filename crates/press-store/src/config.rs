//! Remote repository configuration.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Branch used when none (or an unusable one) is configured.
pub const DEFAULT_BRANCH: &str = "main";

/// How the service credential is presented in the `Authorization` header.
///
/// Classic personal access tokens use `token <pat>`; fine-grained tokens and
/// app installation tokens use `Bearer <token>`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CredentialScheme {
    Classic,
    FineGrained,
}

impl CredentialScheme {
    /// Infer the scheme from the token's prefix (`ghp_` is a classic PAT).
    pub fn infer(token: &str) -> Self {
        if token.starts_with("ghp_") {
            Self::Classic
        } else {
            Self::FineGrained
        }
    }

    fn header_prefix(&self) -> &'static str {
        match self {
            Self::Classic => "token",
            Self::FineGrained => "Bearer",
        }
    }
}

impl fmt::Display for CredentialScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Classic => f.write_str("classic"),
            Self::FineGrained => f.write_str("fine-grained"),
        }
    }
}

impl FromStr for CredentialScheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "classic" => Ok(Self::Classic),
            "fine-grained" | "fine_grained" | "finegrained" | "bearer" => Ok(Self::FineGrained),
            other => Err(format!(
                "unknown credential scheme {other:?} (expected classic or fine-grained)"
            )),
        }
    }
}

/// Identifies the target repository and branch, plus the credential to use.
#[derive(Clone, PartialEq, Eq)]
pub struct RemoteConfig {
    pub token: String,
    pub owner: String,
    pub repo: String,
    pub branch: String,
    pub scheme: CredentialScheme,
}

impl RemoteConfig {
    /// Build a config, inferring the credential scheme from the token and
    /// normalizing the branch name.
    pub fn new(
        token: impl Into<String>,
        owner: impl Into<String>,
        repo: impl Into<String>,
        branch: impl AsRef<str>,
    ) -> Self {
        let token = token.into();
        let scheme = CredentialScheme::infer(&token);
        Self {
            token,
            owner: owner.into(),
            repo: repo.into(),
            branch: normalize_branch(branch.as_ref()),
            scheme,
        }
    }

    /// Override the inferred credential scheme.
    pub fn with_scheme(mut self, scheme: CredentialScheme) -> Self {
        self.scheme = scheme;
        self
    }

    /// Value of the `Authorization` header.
    pub fn authorization_header(&self) -> String {
        format!("{} {}", self.scheme.header_prefix(), self.token)
    }

    /// `owner/repo`
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}

impl fmt::Debug for RemoteConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteConfig")
            .field("token", &"<redacted>")
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("branch", &self.branch)
            .field("scheme", &self.scheme)
            .finish()
    }
}

/// Trim a configured branch name; blank or whitespace-containing values
/// fall back to [`DEFAULT_BRANCH`].
pub fn normalize_branch(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.chars().any(char::is_whitespace) {
        DEFAULT_BRANCH.to_string()
    } else {
        trimmed.to_string()
    }
}
