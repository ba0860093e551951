//! oEmbed lookups against publish.twitter.com, used for hover previews.
use crate::error::FetchError;
use crate::model::{AccountHandle, TweetRecord, status_url};
use crate::twitter::types::OEmbedResponse;
use likescope_http::{Auth, HttpClient, RequestOpts};
use serde::Serialize;
use std::time::Duration;

pub const DEFAULT_PUBLISH_BASE: &str = "https://publish.twitter.com";

/// Rendered preview of a single post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Embed {
    pub html: String,
    pub author_name: Option<String>,
    pub url: Option<String>,
}

#[derive(Clone, Debug)]
pub struct EmbedClient {
    http: HttpClient,
}

impl EmbedClient {
    pub fn new() -> Result<Self, FetchError> {
        Self::with_base(DEFAULT_PUBLISH_BASE)
    }

    pub fn with_base(base: &str) -> Result<Self, FetchError> {
        Ok(Self {
            http: HttpClient::new(base)?,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.http = self.http.with_timeout(timeout);
        self
    }

    /// Fetch the embed fragment for a canonical status URL.
    pub async fn embed(&self, status_url: &str) -> Result<Embed, FetchError> {
        let resp: OEmbedResponse = self
            .http
            .get_json(
                "oembed",
                RequestOpts {
                    auth: Some(Auth::None),
                    query: Some(vec![("url", status_url.into())]),
                    ..Default::default()
                },
            )
            .await?;

        tracing::debug!(status_url, html_len = resp.html.len(), "embed.fetched");
        Ok(Embed {
            html: resp.html,
            author_name: resp.author_name,
            url: resp.url,
        })
    }

    /// Embed for a post identified by its account handle and id.
    pub async fn embed_post(&self, account: &str, id: &str) -> Result<Embed, FetchError> {
        let account = AccountHandle::parse(account)?;
        let id = id.trim();
        if id.is_empty() || !id.chars().all(|c| c.is_ascii_digit()) {
            return Err(FetchError::InvalidRequest(format!(
                "post id {id:?} is not numeric"
            )));
        }
        self.embed(&status_url(account.as_str(), id)).await
    }

    pub async fn embed_record(&self, record: &TweetRecord) -> Result<Embed, FetchError> {
        self.embed(&record.status_url()).await
    }
}
