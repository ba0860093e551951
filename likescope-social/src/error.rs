use likescope_http::HttpError;
use thiserror::Error;

/// The credential is missing or the API refused it. Always fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("no bearer token: pass --token, set twitter.bearer_token, or export TWITTERTOKEN")]
    Missing,
    #[error("bearer token is malformed: {0}")]
    Malformed(String),
    #[error("bearer token rejected ({status}): {message}")]
    Rejected { status: u16, message: String },
}

/// Network failure or a payload we could not make sense of.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpstreamError {
    #[error("network failure: {0}")]
    Network(String),
    #[error("malformed upstream payload: {0}")]
    Malformed(String),
    #[error("upstream returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("client misconfigured: {0}")]
    Config(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl FetchError {
    /// Short machine-readable tag, used in JSON error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::Auth(_) => "auth",
            FetchError::Upstream(_) => "upstream",
            FetchError::InvalidRequest(_) => "invalid_request",
        }
    }
}

impl From<HttpError> for FetchError {
    fn from(err: HttpError) -> Self {
        match err {
            HttpError::Credential(msg) => AuthError::Malformed(msg).into(),
            HttpError::Api {
                status, message, ..
            } if status.as_u16() == 401 || status.as_u16() == 403 => AuthError::Rejected {
                status: status.as_u16(),
                message,
            }
            .into(),
            HttpError::Api {
                status, message, ..
            } => UpstreamError::Status {
                status: status.as_u16(),
                message,
            }
            .into(),
            HttpError::Network(msg) => UpstreamError::Network(msg).into(),
            HttpError::Decode(msg, snippet) => {
                UpstreamError::Malformed(format!("{msg} (body: {snippet})")).into()
            }
            HttpError::Url(msg) | HttpError::Build(msg) => UpstreamError::Config(msg).into(),
        }
    }
}
