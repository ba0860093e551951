//! Account resolution: requested handles → internal ids + baseline metrics.
use crate::error::{FetchError, UpstreamError};
use crate::model::{AccountHandle, AccountProfile, ResolvedAccount, ResolvedAccounts};
use crate::source::TwitterSource;

/// Resolve every handle with a single lookup call.
///
/// Handles the API does not recognise are left out of the mapping and listed
/// in [`ResolvedAccounts::missing`]; that is not an error. Auth failures and
/// upstream faults abort, since nothing downstream can run without ids.
pub async fn resolve_accounts<S>(
    source: &S,
    handles: &[AccountHandle],
) -> Result<ResolvedAccounts, FetchError>
where
    S: TwitterSource + ?Sized,
{
    if handles.is_empty() {
        return Err(FetchError::InvalidRequest(
            "at least one account handle is required".into(),
        ));
    }

    let resp = source.lookup_users(handles).await?;

    for problem in resp.errors.iter().flatten() {
        tracing::info!(
            value = problem.value.as_deref().unwrap_or("-"),
            detail = problem.summary(),
            "resolver.handle_not_found"
        );
    }

    let users = resp.data.unwrap_or_default();
    let mut accounts = Vec::with_capacity(handles.len());
    let mut missing = Vec::new();

    for handle in handles {
        let Some(user) = users.iter().find(|u| handle.matches(&u.username)) else {
            missing.push(handle.clone());
            continue;
        };
        if user.id.trim().is_empty() {
            return Err(UpstreamError::Malformed(format!(
                "user {} came back without an id",
                user.username
            ))
            .into());
        }
        let metrics = user.public_metrics.clone().unwrap_or_else(|| {
            tracing::warn!(username = %user.username, "resolver.public_metrics_missing");
            Default::default()
        });
        accounts.push(ResolvedAccount {
            handle: handle.clone(),
            profile: AccountProfile {
                id: user.id.clone(),
                followers_count: metrics.followers_count,
                tweet_count: metrics.tweet_count,
            },
        });
    }

    for user in &users {
        if !handles.iter().any(|h| h.matches(&user.username)) {
            tracing::warn!(username = %user.username, "resolver.unrequested_user_ignored");
        }
    }

    tracing::info!(
        requested = handles.len(),
        resolved = accounts.len(),
        missing = missing.len(),
        "resolver.done"
    );
    Ok(ResolvedAccounts::new(accounts, missing))
}
