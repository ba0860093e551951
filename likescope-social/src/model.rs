//! Request and result types shared by the resolver, collector and dashboard.
use crate::error::FetchError;
use serde::{Deserialize, Serialize};
use std::fmt;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, PrimitiveDateTime, Time};

/// A public username as typed by the user, e.g. `google`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountHandle(String);

impl AccountHandle {
    /// Validate one handle: surrounding whitespace is trimmed, an optional
    /// leading `@` dropped; empty handles and inner whitespace are rejected.
    ///
    /// ```
    /// use likescope_social::AccountHandle;
    ///
    /// assert_eq!(AccountHandle::parse(" @google ").unwrap().as_str(), "google");
    /// assert!(AccountHandle::parse("two words").is_err());
    /// ```
    pub fn parse(raw: &str) -> Result<Self, FetchError> {
        let trimmed = raw.trim();
        let handle = trimmed.strip_prefix('@').unwrap_or(trimmed);
        if handle.is_empty() {
            return Err(FetchError::InvalidRequest("empty account handle".into()));
        }
        if handle.chars().any(char::is_whitespace) {
            return Err(FetchError::InvalidRequest(format!(
                "account handle {handle:?} contains whitespace"
            )));
        }
        Ok(Self(handle.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Twitter usernames compare case-insensitively.
    pub fn matches(&self, username: &str) -> bool {
        self.0.eq_ignore_ascii_case(username)
    }
}

impl fmt::Display for AccountHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for AccountHandle {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Split a comma-separated handle list. Duplicates (ignoring case) collapse
/// onto their first occurrence.
///
/// ```
/// use likescope_social::model::parse_handles;
///
/// let handles = parse_handles("google, amazon,Google").unwrap();
/// let names: Vec<_> = handles.iter().map(|h| h.as_str()).collect();
/// assert_eq!(names, ["google", "amazon"]);
/// ```
pub fn parse_handles(raw: &str) -> Result<Vec<AccountHandle>, FetchError> {
    if raw.trim().is_empty() {
        return Err(FetchError::InvalidRequest(
            "at least one account handle is required".into(),
        ));
    }
    let mut out: Vec<AccountHandle> = Vec::new();
    for part in raw.split(',') {
        let handle = AccountHandle::parse(part)?;
        if !out.iter().any(|h| h.matches(handle.as_str())) {
            out.push(handle);
        }
    }
    Ok(out)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountProfile {
    pub id: String,
    pub followers_count: u64,
    pub tweet_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedAccount {
    pub handle: AccountHandle,
    pub profile: AccountProfile,
}

/// Handle → profile mapping in request order. Keys are always the requested
/// spelling of the handle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolvedAccounts {
    accounts: Vec<ResolvedAccount>,
    missing: Vec<AccountHandle>,
}

impl ResolvedAccounts {
    pub fn new(accounts: Vec<ResolvedAccount>, missing: Vec<AccountHandle>) -> Self {
        Self { accounts, missing }
    }

    pub fn get(&self, handle: &str) -> Option<&AccountProfile> {
        self.accounts
            .iter()
            .find(|a| a.handle.as_str() == handle)
            .map(|a| &a.profile)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResolvedAccount> {
        self.accounts.iter()
    }

    pub fn handles(&self) -> impl Iterator<Item = &AccountHandle> {
        self.accounts.iter().map(|a| &a.handle)
    }

    /// Requested handles the API did not recognise.
    pub fn missing(&self) -> &[AccountHandle] {
        &self.missing
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

/// Creation-date filter. `start` is inclusive; `end` is passed through to
/// the API as midnight UTC of that day, which Twitter treats as exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateWindow {
    pub start: Date,
    pub end: Option<Date>,
}

impl DateWindow {
    pub fn new(start: Date, end: Option<Date>) -> Result<Self, FetchError> {
        if let Some(end) = end {
            if end < start {
                return Err(FetchError::InvalidRequest(format!(
                    "end date {end} is before start date {start}"
                )));
            }
        }
        Ok(Self { start, end })
    }

    /// Parse `yyyy-mm-dd` inputs; a blank end means "open-ended".
    ///
    /// ```
    /// use likescope_social::DateWindow;
    ///
    /// let w = DateWindow::parse("2023-01-01", Some("")).unwrap();
    /// assert!(w.end.is_none());
    /// assert_eq!(w.start_time(), "2023-01-01T00:00:00Z");
    /// ```
    pub fn parse(start: &str, end: Option<&str>) -> Result<Self, FetchError> {
        let start = parse_date(start)?;
        let end = match end.map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => Some(parse_date(raw)?),
            None => None,
        };
        Self::new(start, end)
    }

    /// `start_time` query value.
    pub fn start_time(&self) -> String {
        midnight_utc(self.start)
    }

    /// `end_time` query value, when the window is closed.
    pub fn end_time(&self) -> Option<String> {
        self.end.map(midnight_utc)
    }

    /// True when `end == start`: no day can match and the API refuses the range.
    pub fn is_empty(&self) -> bool {
        self.end == Some(self.start)
    }

    pub fn contains(&self, date: Date) -> bool {
        date >= self.start && self.end.is_none_or(|end| date < end)
    }
}

fn parse_date(raw: &str) -> Result<Date, FetchError> {
    let fmt = format_description!("[year]-[month]-[day]");
    Date::parse(raw.trim(), &fmt).map_err(|e| {
        FetchError::InvalidRequest(format!("date {raw:?} is not yyyy-mm-dd: {e}"))
    })
}

fn midnight_utc(date: Date) -> String {
    PrimitiveDateTime::new(date, Time::MIDNIGHT)
        .assume_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| format!("{date}T00:00:00Z"))
}

/// One post, tagged with the handle whose timeline produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TweetRecord {
    pub id: String,
    pub created: Date,
    pub like_count: u64,
    pub impression_count: u64,
    pub retweet_count: u64,
    pub reply_count: u64,
    pub quote_count: u64,
    pub text: String,
    pub account: AccountHandle,
}

impl TweetRecord {
    pub fn status_url(&self) -> String {
        status_url(self.account.as_str(), &self.id)
    }
}

/// Canonical web URL of a post, as accepted by the oEmbed endpoint.
pub fn status_url(account: &str, id: &str) -> String {
    format!("https://twitter.com/{account}/status/{id}")
}

/// All records one account contributed, in API order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TweetBatch {
    pub account: AccountHandle,
    pub records: Vec<TweetRecord>,
    pub pages: usize,
}
