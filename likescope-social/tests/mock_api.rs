mod common;

use likescope_social::{
    AccountStatus, AuthError, BearerToken, CollectorOptions, DateWindow, EmbedClient, FetchError,
    TwitterApi, fetch_tweets,
};
use serde_json::{Value, json};
use time::macros::date;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN: &str = "test-bearer";

fn api(server: &MockServer) -> TwitterApi {
    TwitterApi::with_base(&server.uri(), BearerToken::new(TOKEN).unwrap()).unwrap()
}

fn user(id: &str, username: &str) -> Value {
    json!({
        "id": id,
        "username": username,
        "name": username.to_uppercase(),
        "created_at": "2010-01-01T00:00:00.000Z",
        "public_metrics": {"followers_count": 1000, "following_count": 1, "tweet_count": 50, "listed_count": 0}
    })
}

fn tweet(id: &str, created_at: &str, likes: u64) -> Value {
    json!({
        "id": id,
        "text": format!("post {id}"),
        "created_at": created_at,
        "edit_history_tweet_ids": [id],
        "public_metrics": {
            "retweet_count": 0, "reply_count": 0, "like_count": likes,
            "quote_count": 0, "bookmark_count": 0, "impression_count": likes * 100
        }
    })
}

async fn mount_users(server: &MockServer, usernames: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path("/2/users/by"))
        .and(query_param("usernames", usernames))
        .and(query_param("user.fields", "created_at,name,public_metrics"))
        .and(header("authorization", format!("Bearer {TOKEN}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn two_accounts_in_january_are_merged_by_date() {
    common::init_test_tracing();
    let server = MockServer::start().await;

    mount_users(
        &server,
        "acct_a,acct_b",
        json!({"data": [user("111", "acct_a"), user("222", "acct_b")]}),
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/2/users/111/tweets"))
        .and(query_param("max_results", "100"))
        .and(query_param("start_time", "2023-01-01T00:00:00Z"))
        .and(query_param("end_time", "2023-01-31T00:00:00Z"))
        .and(query_param("tweet.fields", "created_at,public_metrics"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                tweet("a10", "2023-01-10T15:00:00.000Z", 40),
                tweet("a05", "2023-01-05T09:00:00.000Z", 12)
            ],
            "meta": {"result_count": 2, "newest_id": "a10", "oldest_id": "a05"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/2/users/222/tweets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [tweet("b03", "2023-01-03T18:30:00.000Z", 7)],
            "meta": {"result_count": 1}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let window = DateWindow::parse("2023-01-01", Some("2023-01-31")).unwrap();
    let out = fetch_tweets(
        &api(&server),
        "acct_a,acct_b",
        &window,
        &CollectorOptions::default(),
    )
    .await
    .unwrap();

    let got: Vec<_> = out
        .records
        .iter()
        .map(|r| (r.account.as_str(), r.created))
        .collect();
    assert_eq!(
        got,
        vec![
            ("acct_b", date!(2023 - 01 - 03)),
            ("acct_a", date!(2023 - 01 - 05)),
            ("acct_a", date!(2023 - 01 - 10)),
        ]
    );
    assert_eq!(out.records[1].like_count, 12);
    assert_eq!(out.records[1].impression_count, 1200);
    assert!(out.missing.is_empty());
}

#[tokio::test]
async fn pagination_issues_n_plus_one_requests() {
    common::init_test_tracing();
    let server = MockServer::start().await;
    mount_users(&server, "pager", json!({"data": [user("7", "pager")]})).await;

    const CURSOR_PAGES: usize = 3;

    // First page: no pagination_token.
    Mock::given(method("GET"))
        .and(path("/2/users/7/tweets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [tweet("p0", "2023-03-01T00:00:00Z", 0)],
            "meta": {"result_count": 1, "next_token": "tok1"}
        })))
        .with_priority(5)
        .expect(1)
        .mount(&server)
        .await;

    for n in 1..=CURSOR_PAGES {
        let next = (n < CURSOR_PAGES).then(|| format!("tok{}", n + 1));
        let mut meta = json!({"result_count": 1});
        if let Some(next) = next {
            meta["next_token"] = json!(next);
        }
        Mock::given(method("GET"))
            .and(path("/2/users/7/tweets"))
            .and(query_param("pagination_token", format!("tok{n}").as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [tweet(&format!("p{n}"), "2023-03-02T00:00:00Z", n as u64)],
                "meta": meta
            })))
            .with_priority(1)
            .expect(1)
            .mount(&server)
            .await;
    }

    let window = DateWindow::parse("2023-03-01", None).unwrap();
    let out = fetch_tweets(&api(&server), "pager", &window, &CollectorOptions::default())
        .await
        .unwrap();

    let timeline_requests = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.url.path() == "/2/users/7/tweets")
        .count();
    assert_eq!(timeline_requests, CURSOR_PAGES + 1);
    assert_eq!(out.records.len(), CURSOR_PAGES + 1);
    assert_eq!(out.accounts[0].pages, CURSOR_PAGES + 1);

    let open_ended = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.url.path() == "/2/users/7/tweets")
        .all(|r| !r.url.query_pairs().any(|(k, _)| k == "end_time"));
    assert!(open_ended, "no end date means no end_time parameter");
}

#[tokio::test]
async fn empty_account_and_unknown_handle_are_tolerated() {
    common::init_test_tracing();
    let server = MockServer::start().await;
    mount_users(
        &server,
        "quiet,busy,ghost",
        json!({
            "data": [user("1", "quiet"), user("2", "busy")],
            "errors": [{
                "value": "ghost",
                "detail": "Could not find user with usernames: [ghost].",
                "title": "Not Found Error",
                "resource_type": "user",
                "parameter": "usernames",
                "type": "https://api.twitter.com/2/problems/resource-not-found"
            }]
        }),
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/2/users/1/tweets"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"meta": {"result_count": 0}})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/2/users/2/tweets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                tweet("1", "2023-01-02T00:00:00Z", 1),
                tweet("2", "2023-01-03T00:00:00Z", 2),
                tweet("3", "2023-01-04T00:00:00Z", 3)
            ],
            "meta": {"result_count": 3}
        })))
        .mount(&server)
        .await;

    let window = DateWindow::parse("2023-01-01", None).unwrap();
    let out = fetch_tweets(
        &api(&server),
        "quiet,busy,ghost",
        &window,
        &CollectorOptions::default(),
    )
    .await
    .unwrap();

    assert_eq!(out.records.len(), 3);
    assert!(out.records.iter().all(|r| r.account.as_str() == "busy"));
    assert_eq!(out.accounts[0].status, AccountStatus::NoTweets);
    assert_eq!(out.missing.len(), 1);
    assert_eq!(out.missing[0].as_str(), "ghost");
}

#[tokio::test]
async fn rejected_token_fails_resolution() {
    common::init_test_tracing();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/2/users/by"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "title": "Unauthorized", "type": "about:blank", "status": 401, "detail": "Unauthorized"
        })))
        .mount(&server)
        .await;

    let window = DateWindow::parse("2023-01-01", None).unwrap();
    let err = fetch_tweets(&api(&server), "google", &window, &CollectorOptions::default())
        .await
        .unwrap_err();

    assert_eq!(
        err,
        FetchError::Auth(AuthError::Rejected {
            status: 401,
            message: "Unauthorized".into()
        })
    );
}

#[tokio::test]
async fn non_json_lookup_is_an_upstream_error() {
    common::init_test_tracing();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/2/users/by"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let window = DateWindow::parse("2023-01-01", None).unwrap();
    let err = fetch_tweets(&api(&server), "google", &window, &CollectorOptions::default())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "upstream");
}

#[tokio::test]
async fn embed_fetches_oembed_html_for_status_url() {
    common::init_test_tracing();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/oembed"))
        .and(query_param("url", "https://twitter.com/google/status/12345"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "url": "https://twitter.com/google/status/12345",
            "author_name": "Google",
            "html": "<blockquote class=\"twitter-tweet\">hello</blockquote>",
            "width": 550,
            "type": "rich"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = EmbedClient::with_base(&server.uri()).unwrap();
    let embed = client.embed_post("google", "12345").await.unwrap();
    assert!(embed.html.contains("twitter-tweet"));
    assert_eq!(embed.author_name.as_deref(), Some("Google"));
}
