//! JSON API handlers

use crate::AppState;
use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use likescope_social::{Collection, DateWindow, Embed, FetchError, fetch_tweets};
use serde::Deserialize;
use serde_json::json;

/// Query parameters for `/api/tweets`. Missing fields arrive as empty strings
/// so validation errors come back as JSON like every other failure.
#[derive(Debug, Deserialize)]
pub struct TweetsQuery {
    #[serde(default)]
    handles: String,
    #[serde(default)]
    start: String,
    #[serde(default)]
    end: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EmbedQuery {
    #[serde(default)]
    account: String,
    #[serde(default)]
    id: String,
}

/// A [`FetchError`] rendered as `{"error": ..., "kind": ...}`.
pub struct ApiError(FetchError);

impl From<FetchError> for ApiError {
    fn from(err: FetchError) -> Self {
        Self(err)
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self(FetchError::InvalidRequest(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            FetchError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            FetchError::Auth(_) => StatusCode::UNAUTHORIZED,
            FetchError::Upstream(_) => StatusCode::BAD_GATEWAY,
        };
        let body = Json(json!({
            "error": self.0.to_string(),
            "kind": self.0.kind(),
        }));
        (status, body).into_response()
    }
}

/// Run a full resolve + collect for the requested handles and window.
pub async fn tweets(
    State(state): State<AppState>,
    query: Result<Query<TweetsQuery>, QueryRejection>,
) -> Result<Json<Collection>, ApiError> {
    let Query(params) = query?;
    let window = DateWindow::parse(&params.start, params.end.as_deref())?;
    tracing::info!(handles = %params.handles, start = %window.start, end = ?window.end, "dashboard.tweets");

    match fetch_tweets(&*state.source, &params.handles, &window, &state.collector).await {
        Ok(collection) => Ok(Json(collection)),
        Err(err) => {
            tracing::warn!(error = %err, kind = err.kind(), "dashboard.tweets_failed");
            Err(err.into())
        }
    }
}

/// oEmbed fragment for one post.
pub async fn embed(
    State(state): State<AppState>,
    query: Result<Query<EmbedQuery>, QueryRejection>,
) -> Result<Json<Embed>, ApiError> {
    let Query(params) = query?;
    let embed = state.embeds.embed_post(&params.account, &params.id).await?;
    Ok(Json(embed))
}
