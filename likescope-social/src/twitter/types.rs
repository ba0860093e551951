use serde::{Deserialize, Serialize};

/// `GET /2/users/by` body. Unknown usernames show up in `errors`, not as an
/// HTTP failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UsersLookupResponse {
    #[serde(default)]
    pub data: Option<Vec<User>>,
    #[serde(default)]
    pub errors: Option<Vec<ApiProblem>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub public_metrics: Option<UserMetrics>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserMetrics {
    #[serde(default)]
    pub followers_count: u64,
    #[serde(default)]
    pub following_count: u64,
    #[serde(default)]
    pub tweet_count: u64,
    #[serde(default)]
    pub listed_count: u64,
}

/// `GET /2/users/{id}/tweets` body. `data` is absent when the window holds no
/// tweets.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimelineResponse {
    #[serde(default)]
    pub data: Option<Vec<Tweet>>,
    #[serde(default)]
    pub meta: Option<Meta>,
    #[serde(default)]
    pub errors: Option<Vec<ApiProblem>>,
}

impl TimelineResponse {
    pub fn next_token(&self) -> Option<&str> {
        self.meta.as_ref().and_then(|m| m.next_token.as_deref())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Meta {
    #[serde(default)]
    pub result_count: Option<u64>,
    #[serde(default)]
    pub next_token: Option<String>,
    #[serde(default)]
    pub newest_id: Option<String>,
    #[serde(default)]
    pub oldest_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tweet {
    pub id: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub public_metrics: Option<PublicMetrics>,
    #[serde(default)]
    pub edit_history_tweet_ids: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PublicMetrics {
    #[serde(default)]
    pub like_count: Option<u64>,
    #[serde(default)]
    pub impression_count: Option<u64>,
    #[serde(default)]
    pub retweet_count: Option<u64>,
    #[serde(default)]
    pub reply_count: Option<u64>,
    #[serde(default)]
    pub quote_count: Option<u64>,
    #[serde(default)]
    pub bookmark_count: Option<u64>,
}

/// Partial-error entry, e.g. `{"value":"ghost","detail":"Could not find user
/// with usernames: [ghost].","title":"Not Found Error",...}`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ApiProblem {
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub resource_type: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

impl ApiProblem {
    pub fn summary(&self) -> &str {
        self.detail
            .as_deref()
            .or(self.title.as_deref())
            .unwrap_or("unspecified upstream problem")
    }
}

/// `GET /oembed` body from publish.twitter.com.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OEmbedResponse {
    pub html: String,
    #[serde(default)]
    pub author_name: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub width: Option<u32>,
}
