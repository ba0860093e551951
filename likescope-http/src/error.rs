use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("bad url: {0}")]
    Url(String),
    #[error("could not build request: {0}")]
    Build(String),
    /// The bearer token could not be turned into a valid header.
    #[error("unusable credential: {0}")]
    Credential(String),
    #[error("transport failure: {0}")]
    Network(String),
    #[error("response is not the expected JSON ({0}); body starts with: {1}")]
    Decode(String, String),
    #[error("{status}: {message} (request {request_id})")]
    Api {
        status: StatusCode,
        message: String,
        request_id: String,
    },
}

impl HttpError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            HttpError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct Problem {
    message: String,
    detail: String,
    title: String,
    error: String,
}

#[derive(Deserialize)]
struct ProblemList {
    errors: Vec<Problem>,
}

/// Human message from an error body.
///
/// v2 endpoints answer either with a problem list
/// (`{"errors":[{"detail":..,"title":..}]}`) or a single problem object
/// (`{"title":..,"detail":..,"status":401}`). Anything else falls back to the
/// start of the body.
pub(crate) fn api_message(body: &[u8]) -> String {
    let first_filled = |p: Problem| {
        [p.message, p.detail, p.title, p.error]
            .into_iter()
            .find(|s| !s.is_empty())
    };

    serde_json::from_slice::<ProblemList>(body)
        .ok()
        .and_then(|list| list.errors.into_iter().next())
        .and_then(first_filled)
        .or_else(|| {
            serde_json::from_slice::<Problem>(body)
                .ok()
                .and_then(first_filled)
        })
        .unwrap_or_else(|| crate::redact::snippet(body))
}
