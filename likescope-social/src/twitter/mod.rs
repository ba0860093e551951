//! Twitter/X v2 API surface: the HTTP client wrapper and the response models
//! it decodes into.
pub mod client;
pub mod types;

pub use client::TwitterApi;
