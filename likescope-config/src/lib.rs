//! Loader for Likescope settings with YAML + environment overlays.
//!
//! Sources are merged in this order, later ones winning:
//!
//! 1. built-in defaults (every field has one),
//! 2. YAML files and inline snippets, in the order they were added,
//! 3. `LIKESCOPE__SECTION__KEY` environment variables.
//!
//! String values may reference the environment as `$VAR` or `${VAR}`; they are
//! expanded (recursively, up to a fixed depth) after merging. Unknown variables
//! are left untouched, so an unset `${TWITTERTOKEN}` stays literal and
//! [`TwitterSettings::bearer_token`] reports it as absent.
//!
//! ```yaml
//! twitter:
//!   bearer_token: "${TWITTERTOKEN}"
//!   api_base: https://api.twitter.com
//!   publish_base: https://publish.twitter.com
//!   timeout_secs: 15
//!   concurrency: 1
//! dashboard:
//!   host: 127.0.0.1
//!   port: 8050
//! logging:
//!   format: text
//!   emit_stderr: true
//!   default_filter: info
//! ```
use config::{Config, ConfigError, Environment, File, FileFormat};
use likescope_common::{LogConfig, LogFormat};
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};

const MAX_EXPANSION_DEPTH: usize = 8;

pub const DEFAULT_CONFIG_FILE: &str = "likescope.yaml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LikescopeConfig {
    pub twitter: TwitterSettings,
    pub dashboard: DashboardSettings,
    pub logging: LoggingSettings,
}

/// Upstream endpoints and credentials.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TwitterSettings {
    pub bearer_token: Option<String>,
    pub api_base: String,
    pub publish_base: String,
    pub timeout_secs: u64,
    /// Accounts fetched at once; 1 keeps collection strictly sequential.
    pub concurrency: usize,
}

impl Default for TwitterSettings {
    fn default() -> Self {
        Self {
            bearer_token: None,
            api_base: "https://api.twitter.com".into(),
            publish_base: "https://publish.twitter.com".into(),
            timeout_secs: 15,
            concurrency: 1,
        }
    }
}

impl TwitterSettings {
    /// The configured token, or `None` when it is blank or an unexpanded
    /// `${VAR}` placeholder.
    pub fn bearer_token(&self) -> Option<&str> {
        self.bearer_token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty() && !t.contains("${"))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DashboardSettings {
    pub host: String,
    pub port: u16,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 8050,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub format: LogFormat,
    pub emit_stderr: bool,
    pub default_filter: String,
    pub dir: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            format: LogFormat::Text,
            emit_stderr: true,
            default_filter: "info".into(),
            dir: None,
        }
    }
}

impl LoggingSettings {
    pub fn to_log_config(&self) -> LogConfig {
        LogConfig {
            log_dir: self.dir.clone(),
            emit_stderr: self.emit_stderr,
            format: self.format,
            default_filter: self.default_filter.clone(),
            ..LogConfig::default()
        }
    }
}

/// Expand `$VAR`/`${VAR}` in a string until it stops changing.
///
/// Values that themselves reference variables are followed a few levels
/// deep; a cycle just stops at the depth limit with the placeholder intact.
fn expand_str(raw: &str) -> String {
    let mut current = raw.to_owned();
    for _ in 0..MAX_EXPANSION_DEPTH {
        let Ok(next) = shellexpand::env(&current) else {
            break;
        };
        if next == current {
            break;
        }
        current = next.into_owned();
    }
    current
}

fn expand_vars(value: &mut Value) {
    match value {
        Value::String(s) if s.contains('$') => *s = expand_str(s),
        Value::Array(items) => items.iter_mut().for_each(expand_vars),
        Value::Object(fields) => fields.values_mut().for_each(expand_vars),
        _ => {}
    }
}

/// Builder hiding the `config` crate wiring (YAML + env overrides).
pub struct LikescopeConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
    env_prefix: String,
}

impl Default for LikescopeConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl LikescopeConfigLoader {
    /// Start with defaults only; `LIKESCOPE__` env overrides are applied on load.
    ///
    /// ```
    /// use likescope_config::LikescopeConfigLoader;
    ///
    /// let config = LikescopeConfigLoader::new()
    ///     .with_yaml_str("dashboard:\n  port: 9000")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(config.dashboard.port, 9000);
    /// assert_eq!(config.dashboard.host, "127.0.0.1");
    /// assert_eq!(config.twitter.concurrency, 1);
    /// ```
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
            env_prefix: "LIKESCOPE".into(),
        }
    }

    /// Use a different environment prefix (tests use this to stay isolated).
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Attach a YAML/TOML/JSON file that must exist; format is inferred by suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Attach a file that is silently skipped when missing.
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Merge an inline YAML snippet.
    ///
    /// ```
    /// use likescope_config::LikescopeConfigLoader;
    ///
    /// let cfg = LikescopeConfigLoader::new()
    ///     .with_yaml_str(
    ///         r#"
    /// twitter:
    ///   bearer_token: "example"
    ///   concurrency: 4
    /// "#,
    ///     )
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(cfg.twitter.bearer_token(), Some("example"));
    /// assert_eq!(cfg.twitter.concurrency, 4);
    /// ```
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, FileFormat::Yaml));
        self
    }

    /// Consume the builder and deserialize the merged sources.
    ///
    /// ```
    /// use likescope_config::LikescopeConfigLoader;
    ///
    /// unsafe { std::env::set_var("DOCTEST_TW_TOKEN", "injected-from-env"); }
    ///
    /// let config = LikescopeConfigLoader::new()
    ///     .with_yaml_str(r#"
    /// twitter:
    ///   bearer_token: "${DOCTEST_TW_TOKEN}"
    /// "#)
    ///     .load()
    ///     .expect("valid configuration");
    ///
    /// assert_eq!(config.twitter.bearer_token(), Some("injected-from-env"));
    /// assert_eq!(config.twitter.api_base, "https://api.twitter.com");
    ///
    /// unsafe { std::env::remove_var("DOCTEST_TW_TOKEN"); }
    /// ```
    pub fn load(self) -> Result<LikescopeConfig, ConfigError> {
        let cfg = self
            .builder
            .add_source(
                Environment::with_prefix(&self.env_prefix)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut merged: Value = cfg.try_deserialize()?;
        expand_vars(&mut merged);

        // Back through `config` so digits-only env values still land in
        // string fields and quoted numbers in numeric ones.
        Config::builder()
            .add_source(File::from_str(&merged.to_string(), FileFormat::Json))
            .build()?
            .try_deserialize()
    }
}
