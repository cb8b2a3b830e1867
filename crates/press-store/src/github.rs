//! GitHub REST API backend.
//!
//! Reads go through the Contents API (`GET /repos/{owner}/{repo}/contents/{path}?ref={branch}`);
//! writes go through the Git Data API (blobs, trees, commits, refs). Every
//! request carries the configured credential and the pinned API version.

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use bytes::Bytes;
use press_types::{validate_repo_path, EntryKind, ObjectHash};
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::RemoteConfig;
use crate::error::{StoreError, StoreResult};
use crate::traits::{ContentStore, DirEntry, RemoteFile, TreeEntry};

/// Public GitHub API endpoint.
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

const GITHUB_ACCEPT: &str = "application/vnd.github+json";
const GITHUB_API_VERSION: &str = "2022-11-28";

/// Connection options for [`GitHubStore`].
#[derive(Clone, Debug)]
pub struct GitHubOptions {
    /// API root, e.g. `https://api.github.com` or a GitHub Enterprise
    /// `https://ghe.example.com/api/v3`.
    pub api_base: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// GitHub rejects requests without a `User-Agent`.
    pub user_agent: String,
}

impl Default for GitHubOptions {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            timeout: Duration::from_secs(30),
            user_agent: concat!("press/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Operation {
    ReadContents,
    ReadBlob,
    ReadRef,
    ReadCommit,
    CreateBlob,
    CreateTree,
    CreateCommit,
    UpdateRef,
}

impl Operation {
    fn label(&self) -> &'static str {
        match self {
            Self::ReadContents => "read contents",
            Self::ReadBlob => "read blob",
            Self::ReadRef => "read ref",
            Self::ReadCommit => "read commit",
            Self::CreateBlob => "create blob",
            Self::CreateTree => "create tree",
            Self::CreateCommit => "create commit",
            Self::UpdateRef => "update ref",
        }
    }

    fn creates_object(&self) -> bool {
        matches!(self, Self::CreateBlob | Self::CreateTree | Self::CreateCommit)
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
#[serde(untagged)]
enum ContentsResponse {
    Listing(Vec<ContentsEntry>),
    File(ContentsFile),
}

#[derive(Deserialize)]
struct ContentsEntry {
    name: String,
    path: String,
    sha: String,
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Deserialize)]
struct ContentsFile {
    sha: String,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    encoding: Option<String>,
}

#[derive(Deserialize)]
struct BlobResponse {
    content: String,
    encoding: String,
}

#[derive(Deserialize)]
struct ShaOnly {
    sha: String,
}

#[derive(Deserialize)]
struct RefResponse {
    object: ShaOnly,
}

#[derive(Deserialize)]
struct CommitResponse {
    tree: ShaOnly,
}

#[derive(Serialize)]
struct CreateBlobRequest<'a> {
    content: &'a str,
    encoding: &'static str,
}

#[derive(Serialize)]
struct CreateTreeRequest<'a> {
    base_tree: &'a str,
    tree: Vec<TreeItem<'a>>,
}

#[derive(Serialize)]
struct TreeItem<'a> {
    path: &'a str,
    mode: &'static str,
    #[serde(rename = "type")]
    kind: &'static str,
    /// `null` deletes the path from the base tree.
    sha: Option<&'a str>,
}

#[derive(Serialize)]
struct CreateCommitRequest<'a> {
    message: &'a str,
    tree: &'a str,
    parents: [&'a str; 1],
}

#[derive(Serialize)]
struct UpdateRefRequest<'a> {
    sha: &'a str,
    force: bool,
}

#[derive(Deserialize)]
struct ErrorMessage {
    message: String,
}

// ---------------------------------------------------------------------------
// GitHubStore
// ---------------------------------------------------------------------------

/// [`ContentStore`] backed by the GitHub REST API.
pub struct GitHubStore {
    client: reqwest::Client,
    config: RemoteConfig,
    api_base: Url,
}

impl GitHubStore {
    /// Create a store against the public GitHub API.
    pub fn new(config: RemoteConfig) -> StoreResult<Self> {
        Self::with_options(config, GitHubOptions::default())
    }

    pub fn with_options(config: RemoteConfig, options: GitHubOptions) -> StoreResult<Self> {
        let api_base = Url::parse(&options.api_base).map_err(|e| {
            StoreError::InvalidConfig(format!("api base {:?}: {e}", options.api_base))
        })?;
        if api_base.cannot_be_a_base() {
            return Err(StoreError::InvalidConfig(format!(
                "api base {:?} cannot carry a path",
                options.api_base
            )));
        }
        let client = reqwest::Client::builder()
            .user_agent(options.user_agent)
            .timeout(options.timeout)
            .build()?;
        Ok(Self {
            client,
            config,
            api_base,
        })
    }

    pub fn config(&self) -> &RemoteConfig {
        &self.config
    }

    /// `{api_base}/repos/{owner}/{repo}/{segments...}`, each segment
    /// percent-encoded on its own.
    fn repo_url<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> StoreResult<Url> {
        let mut url = self.api_base.clone();
        url.path_segments_mut()
            .map_err(|_| StoreError::InvalidConfig("api base cannot carry a path".into()))?
            .pop_if_empty()
            .extend(["repos", self.config.owner.as_str(), self.config.repo.as_str()])
            .extend(segments);
        Ok(url)
    }

    fn branch_ref_url(&self, endpoint: &str) -> StoreResult<Url> {
        self.repo_url(
            ["git", endpoint, "heads"]
                .into_iter()
                .chain(self.config.branch.split('/')),
        )
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.client
            .request(method, url)
            .header(AUTHORIZATION, self.config.authorization_header())
            .header(ACCEPT, GITHUB_ACCEPT)
            .header("X-GitHub-Api-Version", GITHUB_API_VERSION)
    }

    async fn send(&self, op: Operation, request: RequestBuilder) -> StoreResult<Response> {
        let response = request.send().await?;
        debug!(
            operation = op.label(),
            status = response.status().as_u16(),
            "github response"
        );
        Ok(response)
    }

    /// Pass successful responses through; turn everything else into a
    /// classified [`StoreError`] carrying the remote body.
    async fn ensure_success(&self, op: Operation, response: Response) -> StoreResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        Err(self.classify(op, status, body))
    }

    fn classify(&self, op: Operation, status: StatusCode, body: String) -> StoreError {
        match status.as_u16() {
            401 => StoreError::BadCredentials,
            404 if op.creates_object() => StoreError::RepoAccessDenied {
                operation: op.label().to_string(),
                owner: self.config.owner.clone(),
                repo: self.config.repo.clone(),
            },
            404 if op == Operation::ReadRef => {
                StoreError::BranchNotFound(self.config.branch.clone())
            }
            409 | 422 if op == Operation::UpdateRef && is_lost_race(status, &body) => {
                StoreError::RefUpdateRejected {
                    branch: self.config.branch.clone(),
                    reason: remote_message(&body),
                }
            }
            code => StoreError::Remote {
                operation: op.label().to_string(),
                status: code,
                body,
            },
        }
    }

    async fn parse_json<T: DeserializeOwned>(op: Operation, response: Response) -> StoreResult<T> {
        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| StoreError::Decode(format!("{}: {e}", op.label())))
    }

    async fn fetch_contents(&self, path: &str) -> StoreResult<Option<ContentsResponse>> {
        if !path.is_empty() {
            validate_repo_path(path)?;
        }
        let mut url = self.repo_url(std::iter::once("contents").chain(path.split('/')))?;
        url.query_pairs_mut().append_pair("ref", &self.config.branch);

        let op = Operation::ReadContents;
        let response = self.send(op, self.request(Method::GET, url)).await?;
        if response.status() == StatusCode::NOT_FOUND {
            debug!(path, "path absent");
            return Ok(None);
        }
        let response = self.ensure_success(op, response).await?;
        Self::parse_json(op, response).await.map(Some)
    }

    /// Files over 1 MB come back from the Contents API without inline
    /// content; those are fetched through the blob endpoint instead.
    async fn read_blob(&self, sha: &str) -> StoreResult<Bytes> {
        let op = Operation::ReadBlob;
        let url = self.repo_url(["git", "blobs", sha])?;
        let response = self.send(op, self.request(Method::GET, url)).await?;
        let response = self.ensure_success(op, response).await?;
        let blob: BlobResponse = Self::parse_json(op, response).await?;
        decode_content(Some(&blob.content), Some(&blob.encoding))?
            .ok_or_else(|| StoreError::Decode(format!("blob {sha} has no inline content")))
    }

    async fn post_json<B: Serialize + ?Sized>(
        &self,
        op: Operation,
        segments: &[&str],
        body: &B,
    ) -> StoreResult<ObjectHash> {
        let url = self.repo_url(segments.iter().copied())?;
        let response = self
            .send(op, self.request(Method::POST, url).json(body))
            .await?;
        let response = self.ensure_success(op, response).await?;
        let created: ShaOnly = Self::parse_json(op, response).await?;
        parse_hash(op, &created.sha)
    }
}

#[async_trait]
impl ContentStore for GitHubStore {
    fn branch(&self) -> &str {
        &self.config.branch
    }

    async fn file_exists(&self, path: &str) -> StoreResult<Option<ObjectHash>> {
        match self.fetch_contents(path).await? {
            None => Ok(None),
            Some(ContentsResponse::File(file)) => {
                parse_hash(Operation::ReadContents, &file.sha).map(Some)
            }
            Some(ContentsResponse::Listing(_)) => Err(StoreError::Decode(format!(
                "{path} is a directory, not a file"
            ))),
        }
    }

    async fn read_file(&self, path: &str) -> StoreResult<Option<RemoteFile>> {
        let file = match self.fetch_contents(path).await? {
            None => return Ok(None),
            Some(ContentsResponse::File(file)) => file,
            Some(ContentsResponse::Listing(_)) => {
                return Err(StoreError::Decode(format!(
                    "{path} is a directory, not a file"
                )))
            }
        };
        let hash = parse_hash(Operation::ReadContents, &file.sha)?;
        let content = match decode_content(file.content.as_deref(), file.encoding.as_deref())? {
            Some(bytes) => bytes,
            None => self.read_blob(&file.sha).await?,
        };
        Ok(Some(RemoteFile { hash, content }))
    }

    async fn list_directory(&self, path: &str) -> StoreResult<Option<Vec<DirEntry>>> {
        match self.fetch_contents(path).await? {
            None => Ok(None),
            Some(ContentsResponse::Listing(entries)) => entries
                .into_iter()
                .map(|entry| {
                    Ok(DirEntry {
                        hash: parse_hash(Operation::ReadContents, &entry.sha)?,
                        kind: EntryKind::from_remote(&entry.kind),
                        name: entry.name,
                        path: entry.path,
                    })
                })
                .collect::<StoreResult<Vec<_>>>()
                .map(Some),
            Some(ContentsResponse::File(_)) => Err(StoreError::Decode(format!(
                "{path} is a file, not a directory"
            ))),
        }
    }

    async fn branch_head(&self) -> StoreResult<ObjectHash> {
        let op = Operation::ReadRef;
        let url = self.branch_ref_url("ref")?;
        let response = self.send(op, self.request(Method::GET, url)).await?;
        let response = self.ensure_success(op, response).await?;
        let reference: RefResponse = Self::parse_json(op, response).await?;
        parse_hash(op, &reference.object.sha)
    }

    async fn commit_tree(&self, commit: &ObjectHash) -> StoreResult<ObjectHash> {
        let op = Operation::ReadCommit;
        let url = self.repo_url(["git", "commits", commit.as_str()])?;
        let response = self.send(op, self.request(Method::GET, url)).await?;
        let response = self.ensure_success(op, response).await?;
        let parsed: CommitResponse = Self::parse_json(op, response).await?;
        parse_hash(op, &parsed.tree.sha)
    }

    async fn create_blob(&self, content: &[u8]) -> StoreResult<ObjectHash> {
        let encoded = base64::engine::general_purpose::STANDARD.encode(content);
        let body = CreateBlobRequest {
            content: &encoded,
            encoding: "base64",
        };
        self.post_json(Operation::CreateBlob, &["git", "blobs"], &body)
            .await
    }

    async fn create_tree(
        &self,
        base_tree: &ObjectHash,
        entries: &[TreeEntry],
    ) -> StoreResult<ObjectHash> {
        let tree = entries
            .iter()
            .map(|entry| TreeItem {
                path: &entry.path,
                mode: entry.mode.as_git_mode(),
                kind: "blob",
                sha: entry.hash.as_ref().map(ObjectHash::as_str),
            })
            .collect();
        let body = CreateTreeRequest {
            base_tree: base_tree.as_str(),
            tree,
        };
        self.post_json(Operation::CreateTree, &["git", "trees"], &body)
            .await
    }

    async fn create_commit(
        &self,
        message: &str,
        tree: &ObjectHash,
        parent: &ObjectHash,
    ) -> StoreResult<ObjectHash> {
        let body = CreateCommitRequest {
            message,
            tree: tree.as_str(),
            parents: [parent.as_str()],
        };
        self.post_json(Operation::CreateCommit, &["git", "commits"], &body)
            .await
    }

    async fn update_branch(&self, commit: &ObjectHash) -> StoreResult<()> {
        let op = Operation::UpdateRef;
        let url = self.branch_ref_url("refs")?;
        let body = UpdateRefRequest {
            sha: commit.as_str(),
            force: false,
        };
        let response = self
            .send(op, self.request(Method::PATCH, url).json(&body))
            .await?;
        match self.ensure_success(op, response).await {
            Ok(_) => {
                info!(branch = %self.config.branch, commit = %commit.short(), "branch updated");
                Ok(())
            }
            Err(err) => {
                if err.is_ref_conflict() {
                    warn!(branch = %self.config.branch, commit = %commit.short(), "ref update rejected");
                }
                Err(err)
            }
        }
    }
}

fn parse_hash(op: Operation, sha: &str) -> StoreResult<ObjectHash> {
    ObjectHash::parse(sha).map_err(|e| StoreError::Decode(format!("{}: {e}", op.label())))
}

/// Decode inline content. `Ok(None)` means the content is not inline.
fn decode_content(content: Option<&str>, encoding: Option<&str>) -> StoreResult<Option<Bytes>> {
    match (encoding, content) {
        (Some("base64"), Some(content)) => {
            // The remote wraps base64 at 60 columns.
            let compact: String = content.chars().filter(|c| !c.is_whitespace()).collect();
            base64::engine::general_purpose::STANDARD
                .decode(compact)
                .map(|bytes| Some(Bytes::from(bytes)))
                .map_err(|e| StoreError::Decode(format!("invalid base64 content: {e}")))
        }
        (Some("utf-8"), Some(content)) => Ok(Some(Bytes::copy_from_slice(content.as_bytes()))),
        (Some("none") | None, _) | (_, None) => Ok(None),
        (Some(other), Some(_)) => Err(StoreError::Decode(format!(
            "unsupported content encoding {other:?}"
        ))),
    }
}

/// Pull `message` out of a GitHub error body, falling back to the raw body.
/// A 409 always means the branch moved. A 422 only does when GitHub says
/// the update is not a fast forward; other 422s (a missing ref, a bad sha)
/// will not go away on retry.
fn is_lost_race(status: StatusCode, body: &str) -> bool {
    status == StatusCode::CONFLICT
        || remote_message(body)
            .to_ascii_lowercase()
            .contains("fast forward")
}

fn remote_message(body: &str) -> String {
    serde_json::from_str::<ErrorMessage>(body)
        .map(|e| e.message)
        .unwrap_or_else(|_| body.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CredentialScheme;

    fn store(api_base: &str) -> GitHubStore {
        let config = RemoteConfig::new("ghp_x", "acme", "blog", "content/main");
        GitHubStore::with_options(
            config,
            GitHubOptions {
                api_base: api_base.to_string(),
                ..GitHubOptions::default()
            },
        )
        .unwrap()
    }

    #[test]
    fn repo_urls_encode_each_segment() {
        let s = store("https://api.github.com");
        let url = s
            .repo_url(["contents", "articles", "hola mundo.md"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.github.com/repos/acme/blog/contents/articles/hola%20mundo.md"
        );
    }

    #[test]
    fn enterprise_base_keeps_its_path() {
        let s = store("https://ghe.example.com/api/v3/");
        let url = s.branch_ref_url("refs").unwrap();
        assert_eq!(
            url.as_str(),
            "https://ghe.example.com/api/v3/repos/acme/blog/git/refs/heads/content/main"
        );
    }

    #[test]
    fn rejects_unusable_api_base() {
        let config = RemoteConfig::new("t", "o", "r", "main");
        let bad = GitHubOptions {
            api_base: "not a url".into(),
            ..GitHubOptions::default()
        };
        assert!(matches!(
            GitHubStore::with_options(config.clone(), bad),
            Err(StoreError::InvalidConfig(_))
        ));
        let opaque = GitHubOptions {
            api_base: "mailto:ops@example.com".into(),
            ..GitHubOptions::default()
        };
        assert!(matches!(
            GitHubStore::with_options(config, opaque),
            Err(StoreError::InvalidConfig(_))
        ));
    }

    #[test]
    fn classification_by_operation() {
        let s = store(DEFAULT_API_BASE);
        assert!(matches!(
            s.classify(Operation::ReadContents, StatusCode::UNAUTHORIZED, String::new()),
            StoreError::BadCredentials
        ));
        assert!(matches!(
            s.classify(Operation::CreateBlob, StatusCode::NOT_FOUND, String::new()),
            StoreError::RepoAccessDenied { .. }
        ));
        assert!(matches!(
            s.classify(Operation::ReadRef, StatusCode::NOT_FOUND, String::new()),
            StoreError::BranchNotFound(_)
        ));
        let rejected = s.classify(
            Operation::UpdateRef,
            StatusCode::UNPROCESSABLE_ENTITY,
            r#"{"message":"Update is not a fast forward"}"#.into(),
        );
        match rejected {
            StoreError::RefUpdateRejected { reason, branch } => {
                assert_eq!(reason, "Update is not a fast forward");
                assert_eq!(branch, "content/main");
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(s
            .classify(Operation::UpdateRef, StatusCode::CONFLICT, String::new())
            .is_ref_conflict());
        // A 422 the branch did not cause cannot be fixed by retrying.
        assert!(matches!(
            s.classify(
                Operation::UpdateRef,
                StatusCode::UNPROCESSABLE_ENTITY,
                r#"{"message":"Reference does not exist"}"#.into(),
            ),
            StoreError::Remote { status: 422, ref body, .. } if body.contains("Reference does not exist")
        ));
        // 422 on anything but the ref update is a plain remote failure.
        assert!(matches!(
            s.classify(Operation::CreateTree, StatusCode::UNPROCESSABLE_ENTITY, "x".into()),
            StoreError::Remote { status: 422, .. }
        ));
    }

    #[test]
    fn decode_wrapped_base64() {
        let decoded = decode_content(Some("aG9s\nYQ==\n"), Some("base64"))
            .unwrap()
            .unwrap();
        assert_eq!(&decoded[..], b"hola");
        assert_eq!(
            decode_content(Some(""), Some("base64")).unwrap().unwrap().len(),
            0
        );
        assert!(decode_content(Some(""), Some("none")).unwrap().is_none());
        assert!(decode_content(Some("x"), Some("rot13")).is_err());
        assert!(decode_content(Some("!!"), Some("base64")).is_err());
    }

    #[test]
    fn scheme_reaches_the_header() {
        let s = store(DEFAULT_API_BASE);
        assert_eq!(s.config().scheme, CredentialScheme::Classic);
        assert_eq!(s.config().authorization_header(), "token ghp_x");
    }
}
