//! Process-wide `tracing` setup.
//!
//! [`init_logging`] writes to a daily rolling file and, if asked, to `stderr`
//! as well. The first call wins; later calls return the same file path, so
//! tests can call it freely.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::{
    EnvFilter, Layer, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt,
};

const LOG_DIR_ENV: &str = "LIKESCOPE_LOG_DIR";

static FILE_GUARD: OnceLock<WorkerGuard> = OnceLock::new();
static ACTIVE_FILE: OnceLock<PathBuf> = OnceLock::new();

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    /// File name prefix and fallback directory name.
    pub app_name: &'static str,
    /// Where log files go. Unset means `LIKESCOPE_LOG_DIR`, then
    /// `~/.local/share/<app_name>`.
    pub log_dir: Option<PathBuf>,
    /// Mirror every event to `stderr`.
    pub emit_stderr: bool,
    pub format: LogFormat,
    /// Used when `RUST_LOG` is not set.
    pub default_filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            app_name: "likescope",
            log_dir: None,
            emit_stderr: false,
            format: LogFormat::Text,
            default_filter: "info".to_string(),
        }
    }
}

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Install the global subscriber and return today's log file.
pub fn init_logging(config: LogConfig) -> anyhow::Result<PathBuf> {
    if let Some(path) = ACTIVE_FILE.get() {
        return Ok(path.clone());
    }

    let dir = log_dir_for(config.app_name, config.log_dir.as_deref());
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("cannot create log directory {}", dir.display()))?;

    let prefix = format!("{}.log", config.app_name);
    let file = dated_file(&dir, &prefix, Utc::now());

    let (writer, guard) = tracing_appender::non_blocking(rolling::daily(&dir, &prefix));
    let _ = FILE_GUARD.set(guard);

    let mut layers: Vec<BoxedLayer> = Vec::with_capacity(2);
    layers.push(match config.format {
        LogFormat::Text => fmt::layer().with_writer(writer).with_ansi(false).boxed(),
        LogFormat::Json => fmt::layer().json().with_writer(writer).boxed(),
    });
    if config.emit_stderr {
        layers.push(match config.format {
            LogFormat::Text => fmt::layer().with_writer(std::io::stderr).boxed(),
            LogFormat::Json => fmt::layer().json().with_writer(std::io::stderr).boxed(),
        });
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.default_filter));

    tracing_subscriber::registry()
        .with(layers)
        .with(filter)
        .try_init()
        .map_err(|e| anyhow::anyhow!("a global subscriber is already installed: {e}"))?;

    tracing::debug!(file = %file.display(), format = ?config.format, "logging.ready");
    let _ = ACTIVE_FILE.set(file.clone());
    Ok(file)
}

/// `rolling::daily` appends the UTC date to the prefix.
fn dated_file(dir: &Path, prefix: &str, now: DateTime<Utc>) -> PathBuf {
    dir.join(format!("{prefix}.{}", now.format("%Y-%m-%d")))
}

fn log_dir_for(app_name: &str, explicit: Option<&Path>) -> PathBuf {
    let from_env = std::env::var(LOG_DIR_ENV)
        .ok()
        .filter(|dir| !dir.trim().is_empty())
        .map(PathBuf::from);

    match explicit.map(Path::to_path_buf).or(from_env) {
        Some(dir) => with_home(&dir),
        None => match std::env::var("HOME") {
            Ok(home) => Path::new(&home).join(".local/share").join(app_name),
            Err(_) => PathBuf::from(app_name),
        },
    }
}

/// Expand a leading `~/`.
fn with_home(path: &Path) -> PathBuf {
    match (path.strip_prefix("~"), std::env::var("HOME")) {
        (Ok(rest), Ok(home)) => Path::new(&home).join(rest),
        _ => path.to_path_buf(),
    }
}
