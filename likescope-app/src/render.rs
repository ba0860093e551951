//! Plain-text output for the terminal.
use crate::cli::OutputFormat;
use anyhow::Context;
use likescope_social::{AccountStatus, Collection, ResolvedAccounts, TweetRecord};
use std::fmt::Write;

/// What `fetch` prints. JSON is always the whole collection; `strict` only
/// decides whether a failed account turns into an error first.
pub fn fetch_output(
    collection: Collection,
    format: OutputFormat,
    strict: bool,
) -> anyhow::Result<String> {
    if strict {
        let failed: Vec<String> = collection.failures().map(|(h, _)| h.to_string()).collect();
        collection
            .clone()
            .into_records_strict()
            .with_context(|| format!("strict fetch, failed accounts: {}", failed.join(", ")))?;
    }
    Ok(match format {
        OutputFormat::Json => format!("{}\n", serde_json::to_string_pretty(&collection)?),
        OutputFormat::Table => records_table(&collection.records),
    })
}

pub fn records_table(records: &[TweetRecord]) -> String {
    let width = records
        .iter()
        .map(|r| r.account.as_str().len())
        .max()
        .unwrap_or(0)
        .max("account".len());

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<10}  {:<width$}  {:>8}  {:>12}  id",
        "created", "account", "likes", "impressions"
    );
    for r in records {
        let _ = writeln!(
            out,
            "{:<10}  {:<width$}  {:>8}  {:>12}  {}",
            r.created.to_string(),
            r.account.as_str(),
            r.like_count,
            r.impression_count,
            r.id
        );
    }
    out
}

/// One line per account that did not contribute records, plus unknown handles.
pub fn collection_notes(collection: &Collection) -> Vec<String> {
    let mut notes = Vec::new();
    for summary in &collection.accounts {
        match &summary.status {
            AccountStatus::Collected => {}
            AccountStatus::NoTweets => {
                notes.push(format!("{}: no tweets in window", summary.handle))
            }
            AccountStatus::Failed { error } => notes.push(format!(
                "{}: failed after {} page(s): {error}",
                summary.handle, summary.pages
            )),
        }
    }
    for handle in &collection.missing {
        notes.push(format!("{handle}: not found"));
    }
    notes
}

pub fn accounts_table(accounts: &ResolvedAccounts) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<20}  {:>20}  {:>10}  {:>8}",
        "handle", "id", "followers", "tweets"
    );
    for account in accounts.iter() {
        let _ = writeln!(
            out,
            "{:<20}  {:>20}  {:>10}  {:>8}",
            account.handle.as_str(),
            account.profile.id,
            account.profile.followers_count,
            account.profile.tweet_count
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use likescope_social::{AccountHandle, AccountSummary, UpstreamError};
    use time::macros::date;

    fn record(account: &str, id: &str) -> TweetRecord {
        TweetRecord {
            id: id.into(),
            created: date!(2023 - 01 - 05),
            like_count: 12,
            impression_count: 1200,
            retweet_count: 0,
            reply_count: 0,
            quote_count: 0,
            text: String::new(),
            account: AccountHandle::parse(account).unwrap(),
        }
    }

    fn summary(handle: &str, status: AccountStatus) -> AccountSummary {
        AccountSummary {
            handle: AccountHandle::parse(handle).unwrap(),
            pages: 1,
            records: 0,
            status,
        }
    }

    #[test]
    fn json_shape_is_the_same_with_and_without_strict() {
        let collection = Collection {
            records: vec![record("acct_a", "1")],
            accounts: vec![summary("acct_a", AccountStatus::Collected)],
            missing: vec![],
        };
        let lenient = fetch_output(collection.clone(), OutputFormat::Json, false).unwrap();
        let strict = fetch_output(collection, OutputFormat::Json, true).unwrap();
        assert_eq!(lenient, strict);

        let v: serde_json::Value = serde_json::from_str(&strict).unwrap();
        assert_eq!(v["records"][0]["id"], "1");
        assert_eq!(v["accounts"][0]["status"], "collected");
    }

    #[test]
    fn strict_output_refuses_failed_accounts() {
        let collection = Collection {
            records: vec![],
            accounts: vec![summary(
                "flaky",
                AccountStatus::Failed {
                    error: UpstreamError::Network("reset".into()),
                },
            )],
            missing: vec![],
        };
        let err = fetch_output(collection.clone(), OutputFormat::Json, true).unwrap_err();
        assert!(err.to_string().contains("flaky"));
        assert!(fetch_output(collection, OutputFormat::Table, false).is_ok());
    }

    #[test]
    fn table_has_header_and_one_row_per_record() {
        let table = records_table(&[record("acct_a", "1"), record("acct_b", "2")]);
        let lines: Vec<_> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("created"));
        assert!(lines[1].starts_with("2023-01-05  acct_a"));
        assert!(lines[2].ends_with("  2"));
    }

    #[test]
    fn notes_cover_empty_failed_and_missing_accounts() {
        let handle = |h: &str| AccountHandle::parse(h).unwrap();
        let collection = Collection {
            records: vec![record("busy", "1")],
            accounts: vec![
                AccountSummary {
                    handle: handle("busy"),
                    pages: 1,
                    records: 1,
                    status: AccountStatus::Collected,
                },
                AccountSummary {
                    handle: handle("quiet"),
                    pages: 1,
                    records: 0,
                    status: AccountStatus::NoTweets,
                },
                AccountSummary {
                    handle: handle("flaky"),
                    pages: 2,
                    records: 0,
                    status: AccountStatus::Failed {
                        error: UpstreamError::Network("reset".into()),
                    },
                },
            ],
            missing: vec![handle("ghost")],
        };

        let notes = collection_notes(&collection);
        assert_eq!(notes.len(), 3);
        assert_eq!(notes[0], "quiet: no tweets in window");
        assert!(notes[1].starts_with("flaky: failed after 2 page(s)"));
        assert_eq!(notes[2], "ghost: not found");
    }
}
