use crate::model::{AccountHandle, DateWindow};
use crate::twitter::types::{TimelineResponse, UsersLookupResponse};
use async_trait::async_trait;
use likescope_http::HttpError;

/// The two upstream calls the retrieval layer needs.
///
/// [`crate::TwitterApi`] implements this over HTTP; tests substitute scripted
/// sources.
#[async_trait]
pub trait TwitterSource: Send + Sync {
    /// `GET /2/users/by` for every handle at once.
    async fn lookup_users(&self, handles: &[AccountHandle])
    -> Result<UsersLookupResponse, HttpError>;

    /// One page of `GET /2/users/{id}/tweets` restricted to `window`.
    async fn user_tweets(
        &self,
        user_id: &str,
        window: &DateWindow,
        cursor: Option<&str>,
    ) -> Result<TimelineResponse, HttpError>;
}
