//! Retrieval layer: resolve Twitter/X handles, page through their timelines
//! over a date window, and merge the results into one date-sorted dataset.
//!
//! The flow is [`resolver::resolve_accounts`] (one lookup call for every
//! handle) followed by [`collector::collect`] (one paginated timeline walk per
//! account). [`fetch_tweets`] runs both. Both stages talk to the API through
//! the [`TwitterSource`] trait; [`twitter::TwitterApi`] is the HTTP
//! implementation.
//!
//! Outcomes are tagged: an account with no tweets in the window is
//! [`collector::AccountOutcome::NoTweets`], not an error, while auth problems
//! and upstream faults surface as [`FetchError`].
pub mod collector;
pub mod credential;
pub mod embed;
pub mod error;
pub mod model;
pub mod resolver;
pub mod source;
pub mod twitter;

pub use collector::{AccountStatus, AccountSummary, Collection, CollectorOptions, collect};
pub use credential::BearerToken;
pub use embed::{Embed, EmbedClient};
pub use error::{AuthError, FetchError, UpstreamError};
pub use model::{AccountHandle, AccountProfile, DateWindow, ResolvedAccounts, TweetRecord};
pub use resolver::resolve_accounts;
pub use source::TwitterSource;
pub use twitter::TwitterApi;

/// Parse `handles`, resolve them, and collect their tweets inside `window`.
pub async fn fetch_tweets<S>(
    source: &S,
    handles: &str,
    window: &DateWindow,
    opts: &CollectorOptions,
) -> Result<Collection, FetchError>
where
    S: TwitterSource + ?Sized,
{
    let handles = model::parse_handles(handles)?;
    let accounts = resolve_accounts(source, &handles).await?;
    collect(source, &accounts, window, opts).await
}
