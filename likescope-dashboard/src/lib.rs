//! Browser dashboard for Likescope.
//!
//! Serves one page with handle/date inputs, a likes-over-time scatter plot
//! (Plotly, loaded from CDN) and an embedded preview of the hovered tweet.
//! The page talks to two JSON endpoints: `/api/tweets` runs a collection and
//! `/api/embed` fetches the oEmbed fragment for one post. Page assets are
//! compiled into the binary.

pub mod handlers;
pub mod server;

pub use server::{DashboardServer, router};

use likescope_social::{CollectorOptions, EmbedClient, TwitterSource};
use std::sync::Arc;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub source: Arc<dyn TwitterSource>,
    pub embeds: EmbedClient,
    pub collector: CollectorOptions,
}
