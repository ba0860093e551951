//! What gets logged about a request, minus the secrets.
use reqwest::Url;
use reqwest::header::HeaderMap;
use std::env;

const RAW_ENV: &str = "LIKESCOPE_HTTP_RAW";
/// Raw bodies are cut at 64 KiB.
pub(crate) const RAW_BODY_LIMIT: usize = 64 * 1024;
const SNIPPET_LEN: usize = 500;
const HIDDEN: &str = "<redacted>";

pub(crate) fn raw_logging() -> bool {
    env::var(RAW_ENV)
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

fn secret_param(name: &str) -> bool {
    const SECRET: [&str; 8] = [
        "access_token",
        "api_key",
        "auth",
        "authorization",
        "bearer",
        "client_secret",
        "key",
        "token",
    ];
    let name = name.to_ascii_lowercase();
    SECRET.contains(&name.as_str()) || name.ends_with("secret")
}

/// Query pairs safe to log.
pub(crate) fn query<'a, I>(pairs: I) -> Vec<(String, String)>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    pairs
        .into_iter()
        .map(|(k, v)| {
            let v = if secret_param(k) { HIDDEN } else { v };
            (k.to_owned(), v.to_owned())
        })
        .collect()
}

/// Response headers safe to log.
pub(crate) fn headers(map: &HeaderMap) -> Vec<(String, String)> {
    map.iter()
        .map(|(k, v)| {
            let shown = if k.as_str().eq_ignore_ascii_case("authorization")
                || k.as_str().eq_ignore_ascii_case("set-cookie")
            {
                HIDDEN.to_owned()
            } else {
                v.to_str().unwrap_or("<binary>").to_owned()
            };
            (k.as_str().to_owned(), shown)
        })
        .collect()
}

/// A curl line that reproduces a GET, with the token and secret params hidden.
pub(crate) fn curl(url: &Url, bearer: bool) -> String {
    let mut shown = url.clone();
    let owned: Vec<(String, String)> = url.query_pairs().into_owned().collect();
    let pairs = query(owned.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    if !pairs.is_empty() {
        shown.query_pairs_mut().clear().extend_pairs(pairs);
    }

    let mut line = String::from("curl -sS");
    if bearer {
        line.push_str(" -H 'Authorization: Bearer <redacted>'");
    }
    line.push_str(&format!(" '{}'", shown.as_str().replace('\'', r"'\''")));
    line
}

/// First few hundred characters of a body, for error messages and logs.
pub(crate) fn snippet(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    match text.char_indices().nth(SNIPPET_LEN) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.into_owned(),
    }
}
