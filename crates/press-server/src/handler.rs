use axum::extract::{FromRequest, Multipart, Path, Request, State};
use axum::http::{header, HeaderMap};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use press_article::ArticleSummary;
use press_auth::{clear_session_cookie, client_identifier, session_cookie, SESSION_TTL};
use press_images::PendingEdit;
use press_publish::{ArticleInput, PublishError, PublishReceipt};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::error::{ServerError, ServerResult};
use crate::form::read_article_form;
use crate::session::AdminSession;
use crate::state::AppState;

/// Cache policy of the public index.
pub const PUBLIC_INDEX_CACHE_CONTROL: &str =
    "public, max-age=0, s-maxage=3600, stale-while-revalidate=86400";

pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Rate-limited per client. A malformed body counts as a failed attempt.
pub async fn login_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Option<Json<LoginRequest>>,
) -> ServerResult<Response> {
    let header_str = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());
    let client = client_identifier(header_str("x-forwarded-for"), header_str("x-real-ip"));

    let decision = state.limiter().check(&client, Utc::now()).await?;
    if !decision.allowed {
        return Err(ServerError::TooManyAttempts {
            retry_after: decision.retry_after_secs(),
        });
    }

    let login = body.map(|Json(login)| login).unwrap_or_default();
    if !state.credentials().check(&login.username, &login.password) {
        warn!(%client, remaining = decision.remaining, "admin login failed");
        return Err(ServerError::InvalidCredentials);
    }

    state.limiter().reset(&client).await?;
    let token = state.signer().issue(SESSION_TTL, Utc::now())?;
    info!(%client, "admin logged in");
    Ok((
        [(header::SET_COOKIE, session_cookie(&token, state.secure_cookies()))],
        Json(json!({ "ok": true })),
    )
        .into_response())
}

pub async fn logout_handler(State(state): State<AppState>) -> Response {
    (
        [(header::SET_COOKIE, clear_session_cookie(state.secure_cookies()))],
        Json(json!({ "ok": true })),
    )
        .into_response()
}

pub async fn list_articles_handler(
    _session: AdminSession,
    State(state): State<AppState>,
) -> ServerResult<Json<Vec<ArticleSummary>>> {
    Ok(Json(state.publisher().list().await?))
}

/// Response of publish and update.
#[derive(Debug, Serialize)]
pub struct SavedResponse {
    pub ok: bool,
    pub slug: String,
    pub path: String,
    pub commit: String,
}

impl From<PublishReceipt> for SavedResponse {
    fn from(receipt: PublishReceipt) -> Self {
        Self {
            ok: true,
            slug: receipt.slug.into_string(),
            path: receipt.path,
            commit: receipt.commit.to_string(),
        }
    }
}

pub async fn publish_handler(
    _session: AdminSession,
    State(state): State<AppState>,
    multipart: Multipart,
) -> ServerResult<Json<SavedResponse>> {
    let (input, edit) = read_article_form(multipart).await?;
    let receipt = state.publisher().create(input, &edit).await?;
    Ok(Json(receipt.into()))
}

/// An article as the admin editor loads it.
#[derive(Debug, Serialize)]
pub struct ArticleResponse {
    pub slug: String,
    pub title: String,
    pub category: String,
    pub date: String,
    pub content: String,
}

pub async fn get_article_handler(
    _session: AdminSession,
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ServerResult<Json<ArticleResponse>> {
    let doc = state
        .publisher()
        .read(&slug)
        .await?
        .ok_or(PublishError::NotFound { slug })?;
    Ok(Json(ArticleResponse {
        slug: doc.slug.into_string(),
        title: doc.title,
        category: doc.category,
        date: doc.date,
        content: doc.body,
    }))
}

/// Accepts the multipart form (with images) or a JSON
/// `{title, category, content}` body.
pub async fn update_article_handler(
    _session: AdminSession,
    State(state): State<AppState>,
    Path(slug): Path<String>,
    request: Request,
) -> ServerResult<Json<SavedResponse>> {
    let (input, edit) = if is_multipart(request.headers()) {
        let multipart = Multipart::from_request(request, &state)
            .await
            .map_err(|rejection| ServerError::BadRequest(rejection.body_text()))?;
        read_article_form(multipart).await?
    } else {
        let Json(input) = Json::<ArticleInput>::from_request(request, &state)
            .await
            .map_err(|rejection| ServerError::BadRequest(rejection.body_text()))?;
        (input, PendingEdit::empty())
    };
    let receipt = state.publisher().update(&slug, input, &edit).await?;
    Ok(Json(receipt.into()))
}

pub async fn delete_article_handler(
    _session: AdminSession,
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ServerResult<Json<Value>> {
    state.publisher().delete(&slug).await?;
    Ok(Json(json!({ "ok": true })))
}

/// One row of the public search index.
#[derive(Debug, Serialize)]
pub struct PublicArticle {
    pub id: String,
    pub title: String,
    pub category: String,
}

/// Public index. Failures never expose remote details.
pub async fn public_articles_handler(State(state): State<AppState>) -> ServerResult<Response> {
    let summaries = state.publisher().list().await.map_err(|err| {
        warn!(error = %err, "public index unavailable");
        ServerError::Unavailable
    })?;
    let rows: Vec<PublicArticle> = summaries
        .into_iter()
        .map(|summary| PublicArticle {
            id: summary.slug,
            title: summary.title,
            category: summary.category,
        })
        .collect();
    Ok((
        [(header::CACHE_CONTROL, PUBLIC_INDEX_CACHE_CONTROL)],
        Json(rows),
    )
        .into_response())
}

fn is_multipart(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.to_ascii_lowercase().starts_with("multipart/form-data"))
}
