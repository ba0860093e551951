//! Tweet collection: walk each resolved account's timeline page by page,
//! tag records with their handle, then merge everything into one dataset
//! sorted by creation date.
//!
//! Per-account results are tagged ([`AccountOutcome`]) so that "this account
//! posted nothing in the window" never looks like a failure. Upstream faults
//! are scoped to the account that hit them; an auth failure stops everything
//! because every remaining call would be refused the same way.
use crate::error::{AuthError, FetchError, UpstreamError};
use crate::model::{
    AccountHandle, DateWindow, ResolvedAccount, ResolvedAccounts, TweetBatch, TweetRecord,
};
use crate::source::TwitterSource;
use crate::twitter::types::Tweet;
use futures::{StreamExt, TryStreamExt, stream};
use serde::{Serialize, Serializer};
use std::fmt::Display;
use time::format_description::well_known::Rfc3339;
use time::{OffsetDateTime, UtcOffset};

#[derive(Debug, Clone)]
pub struct CollectorOptions {
    /// How many accounts are fetched at once. `1` walks them strictly one
    /// after another; larger values still merge in account order.
    pub concurrency: usize,
}

impl Default for CollectorOptions {
    fn default() -> Self {
        Self { concurrency: 1 }
    }
}

/// What one account's timeline walk produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountOutcome {
    Tweets(TweetBatch),
    NoTweets { pages: usize },
    Failed { pages: usize, error: UpstreamError },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AccountStatus {
    Collected,
    NoTweets,
    Failed {
        #[serde(serialize_with = "serialize_display")]
        error: UpstreamError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountSummary {
    pub handle: AccountHandle,
    pub pages: usize,
    pub records: usize,
    #[serde(flatten)]
    pub status: AccountStatus,
}

/// Merged result of one collection run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Collection {
    /// Every record, ascending by `created`; ties keep account then API order.
    pub records: Vec<TweetRecord>,
    pub accounts: Vec<AccountSummary>,
    /// Requested handles the lookup did not recognise.
    pub missing: Vec<AccountHandle>,
}

impl Collection {
    pub fn failures(&self) -> impl Iterator<Item = (&AccountHandle, &UpstreamError)> {
        self.accounts.iter().filter_map(|a| match &a.status {
            AccountStatus::Failed { error } => Some((&a.handle, error)),
            _ => None,
        })
    }

    /// Records only if every account was collected cleanly.
    pub fn into_records_strict(self) -> Result<Vec<TweetRecord>, FetchError> {
        if let Some((handle, error)) = self.failures().next() {
            tracing::debug!(%handle, "collector.strict_failure");
            return Err(error.clone().into());
        }
        Ok(self.records)
    }
}

fn serialize_display<S, T>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    T: Display,
{
    serializer.collect_str(value)
}

/// Collect tweets for every resolved account inside `window`.
pub async fn collect<S>(
    source: &S,
    accounts: &ResolvedAccounts,
    window: &DateWindow,
    opts: &CollectorOptions,
) -> Result<Collection, FetchError>
where
    S: TwitterSource + ?Sized,
{
    let concurrency = opts.concurrency.max(1);
    tracing::info!(
        accounts = accounts.len(),
        start = %window.start,
        end = ?window.end,
        concurrency,
        "collector.start"
    );

    // `buffered` yields in input order, so the merge below is deterministic
    // whatever order the fetches finish in.
    // Futures are lazy: building them up front starts no work; `buffered`
    // still drives at most `concurrency` of them at a time.
    let fetches: Vec<_> = accounts
        .iter()
        .map(|account| collect_paired(source, account, window))
        .collect();
    let outcomes: Vec<(&ResolvedAccount, AccountOutcome)> = stream::iter(fetches)
        .buffered(concurrency)
        .try_collect()
        .await?;

    let mut collection = Collection {
        missing: accounts.missing().to_vec(),
        ..Default::default()
    };

    for (account, outcome) in outcomes {
        let handle = account.handle.clone();
        let summary = match outcome {
            AccountOutcome::Tweets(batch) => {
                let summary = AccountSummary {
                    handle,
                    pages: batch.pages,
                    records: batch.records.len(),
                    status: AccountStatus::Collected,
                };
                collection.records.extend(batch.records);
                summary
            }
            AccountOutcome::NoTweets { pages } => AccountSummary {
                handle,
                pages,
                records: 0,
                status: AccountStatus::NoTweets,
            },
            AccountOutcome::Failed { pages, error } => AccountSummary {
                handle,
                pages,
                records: 0,
                status: AccountStatus::Failed { error },
            },
        };
        collection.accounts.push(summary);
    }

    // Stable: equal dates keep the concatenation order.
    collection.records.sort_by_key(|r| r.created);

    tracing::info!(
        records = collection.records.len(),
        failed = collection.failures().count(),
        missing = collection.missing.len(),
        "collector.done"
    );
    Ok(collection)
}

// Named fn rather than an async closure: the closure form is not general
// enough over the account lifetime for the `Send` check in the axum handler.
async fn collect_paired<'a, S>(
    source: &S,
    account: &'a ResolvedAccount,
    window: &DateWindow,
) -> Result<(&'a ResolvedAccount, AccountOutcome), AuthError>
where
    S: TwitterSource + ?Sized,
{
    collect_account(source, account, window)
        .await
        .map(|outcome| (account, outcome))
}

/// Walk one account's timeline until the API stops handing out cursors.
///
/// Only an auth failure escapes as `Err`; everything else is folded into the
/// returned outcome.
pub async fn collect_account<S>(
    source: &S,
    account: &ResolvedAccount,
    window: &DateWindow,
) -> Result<AccountOutcome, AuthError>
where
    S: TwitterSource + ?Sized,
{
    let handle = &account.handle;
    let user_id = account.profile.id.as_str();
    let mut records = Vec::new();
    let mut cursor: Option<String> = None;
    let mut pages = 0usize;

    if window.is_empty() {
        tracing::info!(%handle, "collector.window_empty");
        return Ok(AccountOutcome::NoTweets { pages });
    }

    loop {
        let page = match source.user_tweets(user_id, window, cursor.as_deref()).await {
            Ok(page) => page,
            Err(err) => {
                return match FetchError::from(err) {
                    FetchError::Auth(auth) => Err(auth),
                    FetchError::Upstream(error) => {
                        tracing::warn!(%handle, pages, %error, "collector.account_failed");
                        Ok(AccountOutcome::Failed { pages, error })
                    }
                    FetchError::InvalidRequest(msg) => Ok(AccountOutcome::Failed {
                        pages,
                        error: UpstreamError::Config(msg),
                    }),
                };
            }
        };
        pages += 1;

        let next = page.next_token().map(str::to_owned);
        match page.data {
            Some(tweets) => {
                tracing::debug!(%handle, page = pages, count = tweets.len(), "collector.page");
                for tweet in tweets {
                    match to_record(tweet, handle) {
                        Ok(record) => records.push(record),
                        Err(error) => {
                            tracing::warn!(%handle, pages, %error, "collector.account_failed");
                            return Ok(AccountOutcome::Failed { pages, error });
                        }
                    }
                }
            }
            None => {
                for problem in page.errors.iter().flatten() {
                    tracing::info!(%handle, detail = problem.summary(), "collector.page_problem");
                }
                tracing::debug!(%handle, page = pages, "collector.page_without_data");
            }
        }

        match next {
            Some(token) if cursor.as_deref() == Some(token.as_str()) => {
                let error = UpstreamError::Malformed(format!(
                    "pagination cursor {token:?} repeated for {handle}"
                ));
                tracing::warn!(%handle, pages, %error, "collector.account_failed");
                return Ok(AccountOutcome::Failed { pages, error });
            }
            Some(token) => cursor = Some(token),
            None => break,
        }
    }

    if records.is_empty() {
        tracing::info!(%handle, pages, "collector.account_no_tweets");
        return Ok(AccountOutcome::NoTweets { pages });
    }

    tracing::info!(%handle, pages, records = records.len(), "collector.account_done");
    Ok(AccountOutcome::Tweets(TweetBatch {
        account: handle.clone(),
        records,
        pages,
    }))
}

fn to_record(tweet: Tweet, handle: &AccountHandle) -> Result<TweetRecord, UpstreamError> {
    let raw = tweet.created_at.as_deref().ok_or_else(|| {
        UpstreamError::Malformed(format!("tweet {} has no created_at", tweet.id))
    })?;
    let created = OffsetDateTime::parse(raw, &Rfc3339)
        .map_err(|e| {
            UpstreamError::Malformed(format!("tweet {} created_at {raw:?}: {e}", tweet.id))
        })?
        .to_offset(UtcOffset::UTC)
        .date();
    let metrics = tweet.public_metrics.unwrap_or_else(|| {
        tracing::warn!(%handle, tweet_id = %tweet.id, "collector.public_metrics_missing");
        Default::default()
    });

    Ok(TweetRecord {
        id: tweet.id,
        created,
        like_count: metrics.like_count.unwrap_or(0),
        impression_count: metrics.impression_count.unwrap_or(0),
        retweet_count: metrics.retweet_count.unwrap_or(0),
        reply_count: metrics.reply_count.unwrap_or(0),
        quote_count: metrics.quote_count.unwrap_or(0),
        text: tweet.text,
        account: handle.clone(),
    })
}
