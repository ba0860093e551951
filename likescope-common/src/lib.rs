//! Shared plumbing for the Likescope crates.
//!
//! Today this is only the [`observability`] module: one place that knows how
//! binaries and integration tests install their `tracing` subscriber.
//!
//! ```rust
//! use likescope_common::{LogConfig, LogFormat};
//!
//! let cfg = LogConfig {
//!     format: LogFormat::Json,
//!     ..LogConfig::default()
//! };
//! assert_eq!(cfg.app_name, "likescope");
//! ```

pub mod observability;

pub use observability::{LogConfig, LogFormat, init_logging};
