use likescope_common::LogFormat;
use likescope_config::LikescopeConfigLoader;
use serial_test::serial;
use std::{fs, path::PathBuf};
use tempfile::TempDir;

/// Helper to write a YAML file in a temp dir and return its path.
fn write_yaml(tmp: &TempDir, name: &str, yaml: &str) -> PathBuf {
    let p = tmp.path().join(name);
    fs::write(&p, yaml).expect("write yaml");
    p
}

#[test]
#[serial]
fn loads_file_and_expands_token() {
    let tmp = TempDir::new().unwrap();

    let file_yaml = r#"
twitter:
  bearer_token: "${LIKESCOPE_TEST_BEARER}"
  api_base: "http://127.0.0.1:9999"
  concurrency: 3
dashboard:
  port: 8123
logging:
  format: json
  emit_stderr: false
  "#;
    let p = write_yaml(&tmp, "likescope.yaml", file_yaml);

    let config = temp_env::with_var("LIKESCOPE_TEST_BEARER", Some("from-env"), || {
        LikescopeConfigLoader::new()
            .with_env_prefix("LIKESCOPE_TEST_A")
            .with_file(&p)
            .load()
            .expect("load config")
    });

    assert_eq!(config.twitter.bearer_token(), Some("from-env"));
    assert_eq!(config.twitter.api_base, "http://127.0.0.1:9999");
    assert_eq!(config.twitter.publish_base, "https://publish.twitter.com");
    assert_eq!(config.twitter.concurrency, 3);
    assert_eq!(config.dashboard.port, 8123);
    assert_eq!(config.logging.format, LogFormat::Json);
    assert!(!config.logging.emit_stderr);
}

#[test]
#[serial]
fn missing_required_file_is_an_error() {
    let tmp = TempDir::new().unwrap();
    let result = LikescopeConfigLoader::new()
        .with_env_prefix("LIKESCOPE_TEST_B")
        .with_file(tmp.path().join("nope.yaml"))
        .load();
    assert!(result.is_err());
}

#[test]
#[serial]
fn missing_optional_file_falls_back_to_defaults() {
    let tmp = TempDir::new().unwrap();
    let config = LikescopeConfigLoader::new()
        .with_env_prefix("LIKESCOPE_TEST_C")
        .with_optional_file(tmp.path().join("nope.yaml"))
        .load()
        .expect("defaults load");

    assert_eq!(config.twitter.api_base, "https://api.twitter.com");
    assert_eq!(config.twitter.timeout_secs, 15);
    assert_eq!(config.dashboard.host, "127.0.0.1");
    assert_eq!(config.dashboard.port, 8050);
    assert_eq!(config.twitter.bearer_token(), None);
}

#[test]
#[serial]
fn environment_overrides_file() {
    let tmp = TempDir::new().unwrap();
    let p = write_yaml(&tmp, "likescope.yaml", "dashboard:\n  port: 8123\n");

    let config = temp_env::with_vars(
        [
            ("LIKESCOPE_TEST_D__DASHBOARD__PORT", Some("9100")),
            ("LIKESCOPE_TEST_D__TWITTER__BEARER_TOKEN", Some("env-token")),
        ],
        || {
            LikescopeConfigLoader::new()
                .with_env_prefix("LIKESCOPE_TEST_D")
                .with_file(&p)
                .load()
                .expect("load config")
        },
    );

    assert_eq!(config.dashboard.port, 9100);
    assert_eq!(config.twitter.bearer_token(), Some("env-token"));
}

#[test]
#[serial]
fn digits_only_values_fit_string_fields() {
    let config = temp_env::with_vars(
        [
            ("LIKESCOPE_TEST_E__TWITTER__BEARER_TOKEN", Some("1234567890")),
            ("LIKESCOPE_TEST_E__DASHBOARD__HOST", Some("8080")),
            ("LIKESCOPE_TEST_E__TWITTER__TIMEOUT_SECS", Some("30")),
        ],
        || {
            LikescopeConfigLoader::new()
                .with_env_prefix("LIKESCOPE_TEST_E")
                .with_yaml_str("logging:\n  default_filter: \"debug\"\n")
                .load()
                .expect("numeric env values load")
        },
    );

    assert_eq!(config.twitter.bearer_token(), Some("1234567890"));
    assert_eq!(config.dashboard.host, "8080");
    assert_eq!(config.twitter.timeout_secs, 30);
    assert_eq!(config.logging.default_filter, "debug");
}

#[test]
#[serial]
fn unquoted_numeric_token_in_yaml_is_a_string() {
    let tmp = TempDir::new().unwrap();
    let p = write_yaml(&tmp, "likescope.yaml", "twitter:\n  bearer_token: 987654321\n");

    let config = LikescopeConfigLoader::new()
        .with_env_prefix("LIKESCOPE_TEST_F")
        .with_file(&p)
        .load()
        .expect("load config");

    assert_eq!(config.twitter.bearer_token(), Some("987654321"));
}
