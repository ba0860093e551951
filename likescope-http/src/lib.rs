//! JSON GET client shared by the Twitter and oEmbed clients.
//!
//! One attempt per request; callers decide what a failure means. Bearer
//! tokens are sanitised before they reach a header and never appear in logs.
//! Set `LIKESCOPE_HTTP_RAW=1` to log a curl line per request and the raw
//! response under the `http.raw` target.
//!
//! ```no_run
//! # async fn demo() -> Result<(), likescope_http::HttpError> {
//! use likescope_http::{Auth, HttpClient, RequestOpts};
//!
//! let client = HttpClient::new("https://api.twitter.com")?;
//! let users: serde_json::Value = client
//!     .get_json(
//!         "2/users/by",
//!         RequestOpts {
//!             auth: Some(Auth::Bearer("token")),
//!             query: Some(vec![("usernames", "google".into())]),
//!             ..Default::default()
//!         },
//!     )
//!     .await?;
//! # Ok(()) }
//! ```

mod client;
mod error;
mod redact;

pub use client::{Auth, HttpClient, RequestOpts};
pub use error::HttpError;
pub use reqwest::StatusCode;
