use crate::error::{HttpError, api_message};
use crate::redact;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

static SEQ: AtomicU64 = AtomicU64::new(1);

/// How a request authenticates.
#[derive(Clone, Copy, Debug)]
pub enum Auth<'a> {
    /// `Authorization: Bearer <token>`; the token is cleaned up first.
    Bearer(&'a str),
    None,
}

/// Per-request knobs. Unset fields fall back to the client's defaults.
///
/// ```
/// use likescope_http::{Auth, RequestOpts};
/// use std::time::Duration;
///
/// let opts = RequestOpts {
///     timeout: Some(Duration::from_secs(30)),
///     auth: Some(Auth::Bearer("demo")),
///     query: Some(vec![("max_results", "100".into())]),
/// };
/// assert_eq!(opts.query.as_ref().map(Vec::len), Some(1));
/// ```
#[derive(Clone, Debug, Default)]
pub struct RequestOpts<'a> {
    pub timeout: Option<Duration>,
    pub auth: Option<Auth<'a>>,
    pub query: Option<Vec<(&'a str, Cow<'a, str>)>>,
}

#[derive(Clone, Debug)]
pub struct HttpClient {
    base: Url,
    inner: Client,
    timeout: Duration,
}

impl HttpClient {
    /// Client rooted at `base`. Request paths are joined onto it, so a base
    /// with a path prefix keeps that prefix.
    ///
    /// ```
    /// use likescope_http::HttpClient;
    /// use std::time::Duration;
    ///
    /// let client = HttpClient::new("http://127.0.0.1:8080/mock")?;
    /// assert_eq!(client.base().as_str(), "http://127.0.0.1:8080/mock/");
    /// assert_eq!(client.timeout(), Duration::from_secs(15));
    /// # Ok::<(), likescope_http::HttpError>(())
    /// ```
    pub fn new(base: &str) -> Result<Self, HttpError> {
        let mut base = Url::parse(base).map_err(|e| HttpError::Url(format!("{base}: {e}")))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let inner = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| HttpError::Build(e.to_string()))?;
        Ok(Self {
            base,
            inner,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// GET `path` (relative to the base) and decode the JSON body.
    ///
    /// Non-2xx answers become [`HttpError::Api`] with the message pulled out
    /// of the problem body.
    pub async fn get_json<T>(&self, path: &str, opts: RequestOpts<'_>) -> Result<T, HttpError>
    where
        T: DeserializeOwned,
    {
        let url = self
            .base
            .join(path.trim_start_matches('/'))
            .map_err(|e| HttpError::Url(format!("{path}: {e}")))?;
        let timeout = opts.timeout.unwrap_or(self.timeout);

        let mut builder = self.inner.get(url).timeout(timeout);
        if let Some(query) = &opts.query {
            let pairs: Vec<(&str, &str)> = query.iter().map(|(k, v)| (*k, v.as_ref())).collect();
            builder = builder.query(&pairs);
        }
        let bearer = match opts.auth {
            Some(Auth::Bearer(raw)) => {
                builder = builder.bearer_auth(clean_token(raw)?);
                true
            }
            Some(Auth::None) | None => false,
        };
        let request = builder
            .build()
            .map_err(|e| HttpError::Build(e.to_string()))?;

        let seq = SEQ.fetch_add(1, Ordering::Relaxed);
        let owned_query: Vec<(String, String)> = request.url().query_pairs().into_owned().collect();
        tracing::debug!(
            seq,
            host = request.url().host_str().unwrap_or("-"),
            path = request.url().path(),
            query = ?redact::query(owned_query.iter().map(|(k, v)| (k.as_str(), v.as_str()))),
            timeout_ms = timeout.as_millis() as u64,
            bearer,
            "http.request"
        );
        if redact::raw_logging() {
            let curl = redact::curl(request.url(), bearer);
            tracing::debug!(target: "http.raw", seq, %curl, "request");
        }

        let started = Instant::now();
        let response = self.inner.execute(request).await.map_err(|e| {
            tracing::warn!(seq, error = %e, "http.send_failed");
            HttpError::Network(e.to_string())
        })?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(|e| {
            tracing::warn!(seq, error = %e, "http.body_failed");
            HttpError::Network(e.to_string())
        })?;
        let elapsed_ms = started.elapsed().as_millis() as u64;
        let request_id = upstream_request_id(&headers);

        tracing::debug!(
            seq,
            %status,
            elapsed_ms,
            bytes = body.len(),
            %request_id,
            "http.response"
        );
        if redact::raw_logging() {
            let shown = &body[..body.len().min(redact::RAW_BODY_LIMIT)];
            tracing::info!(
                target: "http.raw",
                seq,
                %status,
                headers = ?redact::headers(&headers),
                body = %String::from_utf8_lossy(shown),
                truncated = body.len() > redact::RAW_BODY_LIMIT,
                "response"
            );
        }

        if !status.is_success() {
            let message = api_message(&body);
            tracing::warn!(seq, %status, %message, %request_id, "http.status_error");
            return Err(HttpError::Api {
                status,
                message,
                request_id,
            });
        }

        serde_json::from_slice(&body).map_err(|e| {
            let snippet = redact::snippet(&body);
            tracing::warn!(seq, error = %e, %snippet, "http.decode_failed");
            HttpError::Decode(e.to_string(), snippet)
        })
    }
}

/// Twitter tags responses with `x-transaction-id`; other hosts use the usual names.
fn upstream_request_id(headers: &HeaderMap) -> String {
    ["x-transaction-id", "x-request-id", "x-correlation-id"]
        .iter()
        .find_map(|name| headers.get(*name)?.to_str().ok())
        .unwrap_or("-")
        .to_owned()
}

/// Tokens pasted from dashboards often carry quotes or line breaks.
fn clean_token(raw: &str) -> Result<String, HttpError> {
    let token: String = raw
        .trim()
        .trim_matches(|c| c == '"' || c == '\'')
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();

    if token.is_empty() {
        return Err(HttpError::Credential("bearer token is empty".into()));
    }
    if let Some(bad) = token.chars().find(|c| !c.is_ascii() || c.is_ascii_control()) {
        return Err(HttpError::Credential(format!(
            "bearer token contains {:?}",
            bad
        )));
    }
    HeaderValue::from_str(&format!("Bearer {token}"))
        .map_err(|e| HttpError::Credential(e.to_string()))?;
    Ok(token)
}
