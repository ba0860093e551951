//! Thin wrapper around the Twitter/X v2 user endpoints.
//!
//! Handles auth and request parameter shaping before delegating to the shared
//! HTTP client. Pagination is driven by the caller through the `cursor`
//! argument of [`TwitterSource::user_tweets`].
use crate::credential::BearerToken;
use crate::error::FetchError;
use crate::model::{AccountHandle, DateWindow};
use crate::source::TwitterSource;
use crate::twitter::types::{TimelineResponse, UsersLookupResponse};
use async_trait::async_trait;
use likescope_http::{Auth, HttpClient, HttpError, RequestOpts};
use std::borrow::Cow;
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "https://api.twitter.com";

/// Upper bound the timeline endpoint accepts for `max_results`.
pub const PAGE_SIZE: u32 = 100;

const USER_FIELDS: &str = "created_at,name,public_metrics";
const TWEET_FIELDS: &str = "created_at,public_metrics";

#[derive(Clone, Debug)]
pub struct TwitterApi {
    http: HttpClient,
    bearer: BearerToken,
}

impl TwitterApi {
    pub fn new(bearer: BearerToken) -> Result<Self, FetchError> {
        Self::with_base(DEFAULT_API_BASE, bearer)
    }

    /// Point the client somewhere other than api.twitter.com (mock servers,
    /// proxies).
    pub fn with_base(base: &str, bearer: BearerToken) -> Result<Self, FetchError> {
        let http = HttpClient::new(base)?;
        Ok(Self { http, bearer })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.http = self.http.with_timeout(timeout);
        self
    }

    fn opts<'a>(&'a self, query: Vec<(&'a str, Cow<'a, str>)>) -> RequestOpts<'a> {
        RequestOpts {
            auth: Some(Auth::Bearer(self.bearer.expose())),
            query: Some(query),
            ..Default::default()
        }
    }
}

#[async_trait]
impl TwitterSource for TwitterApi {
    async fn lookup_users(
        &self,
        handles: &[AccountHandle],
    ) -> Result<UsersLookupResponse, HttpError> {
        let usernames = handles
            .iter()
            .map(AccountHandle::as_str)
            .collect::<Vec<_>>()
            .join(",");

        let resp: UsersLookupResponse = self
            .http
            .get_json(
                "2/users/by",
                self.opts(vec![
                    ("usernames", usernames.into()),
                    ("user.fields", USER_FIELDS.into()),
                ]),
            )
            .await?;

        tracing::debug!(
            found = resp.data.as_ref().map_or(0, Vec::len),
            problems = resp.errors.as_ref().map_or(0, Vec::len),
            "twitter.users_by.response"
        );
        Ok(resp)
    }

    async fn user_tweets(
        &self,
        user_id: &str,
        window: &DateWindow,
        cursor: Option<&str>,
    ) -> Result<TimelineResponse, HttpError> {
        let mut params: Vec<(&str, Cow<'_, str>)> = vec![
            ("max_results", PAGE_SIZE.to_string().into()),
            ("start_time", window.start_time().into()),
        ];
        if let Some(end) = window.end_time() {
            params.push(("end_time", end.into()));
        }
        params.push(("tweet.fields", TWEET_FIELDS.into()));
        if let Some(cursor) = cursor {
            params.push(("pagination_token", cursor.into()));
        }

        let path = format!("2/users/{user_id}/tweets");
        let resp: TimelineResponse = self.http.get_json(&path, self.opts(params)).await?;

        tracing::debug!(
            user_id,
            page_len = resp.data.as_ref().map_or(0, Vec::len),
            has_next = resp.next_token().is_some(),
            "twitter.user_tweets.response"
        );
        Ok(resp)
    }
}
