use loki_batcher::app::{Config, ConfigError, LogLevel};
use loki_batcher::encoder::Encoding;
use serial_test::serial;
use std::io::Write;
use std::time::Duration;
use tempfile::NamedTempFile;
use tokio_test::{assert_err, assert_ok};

const ENV_VARS: &[&str] = &[
    "LOKI_HOST",
    "LOKI_JSON",
    "LOKI_INTERVAL",
    "LOKI_TIMEOUT_SECS",
    "LOKI_CONNECT_TIMEOUT_SECS",
    "LOKI_USER_AGENT",
    "LOKI_DEFAULT_LABELS",
    "LOG_LEVEL",
    "LOG_JSON",
    "CONFIG_FILE",
];

fn clear_env() {
    for var in ENV_VARS {
        unsafe { std::env::remove_var(var) };
    }
}

#[test]
#[serial]
fn test_from_args_with_defaults() {
    clear_env();

    let config = assert_ok!(Config::from_args(["loki-batcher", "--host", "http://loki:3100"]));

    assert_eq!(config.host, "http://loki:3100");
    assert_eq!(config.encoding(), Encoding::Protobuf);
    assert_eq!(config.flush_interval, Duration::from_secs(5));
    assert_eq!(config.timeout, Duration::from_secs(30));
    assert_eq!(config.connect_timeout, Duration::from_secs(10));
    assert_eq!(config.log_level, LogLevel::Info);
    assert_eq!(config.default_labels, "{job=\"loki-batcher\"}");
}

#[test]
#[serial]
fn test_from_args_json_and_interval() {
    clear_env();

    let config = Config::from_args([
        "loki-batcher",
        "--host",
        "https://logs.example.com",
        "--json",
        "--interval",
        "2",
        "--log-level",
        "debug",
    ])
    .unwrap();

    assert_eq!(config.encoding(), Encoding::Json);
    assert_eq!(config.flush_interval, Duration::from_secs(2));
    assert_eq!(config.log_level, LogLevel::Debug);

    let scheduler = config.scheduler_config();
    assert_eq!(scheduler.encoding, Encoding::Json);
    assert_eq!(scheduler.flush_interval, Duration::from_secs(2));
}

#[test]
#[serial]
fn test_zero_interval_means_default() {
    clear_env();

    let config =
        Config::from_args(["loki-batcher", "--host", "http://loki:3100", "--interval", "0"])
            .unwrap();

    assert_eq!(config.flush_interval, Duration::from_secs(5));
}

#[test]
#[serial]
fn test_from_env_vars() {
    clear_env();
    unsafe {
        std::env::set_var("LOKI_HOST", "http://env-loki:3100");
        std::env::set_var("LOKI_INTERVAL", "7");
        std::env::set_var("LOKI_DEFAULT_LABELS", "{job=\"env\"}");
    }

    let config = Config::from_args(["loki-batcher"]).unwrap();
    clear_env();

    assert_eq!(config.host, "http://env-loki:3100");
    assert_eq!(config.flush_interval, Duration::from_secs(7));
    assert_eq!(config.default_labels, "{job=\"env\"}");
}

#[test]
#[serial]
fn test_missing_host_fails() {
    clear_env();

    let err = assert_err!(Config::from_args(["loki-batcher"]));

    assert!(matches!(err, ConfigError::InvalidConfig(msg) if msg.contains("host")));
}

#[test]
#[serial]
fn test_non_http_host_fails() {
    clear_env();

    let result = Config::from_args(["loki-batcher", "--host", "ftp://loki:21"]);

    assert!(matches!(result, Err(ConfigError::InvalidUrl(_))));
}

#[test]
#[serial]
fn test_zero_timeout_fails() {
    clear_env();

    let result = Config::from_args([
        "loki-batcher",
        "--host",
        "http://loki:3100",
        "--timeout-secs",
        "0",
    ]);

    assert!(matches!(result, Err(ConfigError::InvalidConfig(_))));
}

#[test]
fn test_from_toml_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
host = "http://file-loki:3100"
json = true
interval = 3
default_labels = '{{job="from-file"}}'
log_level = "warn"
"#
    )
    .unwrap();

    let config = Config::from_file(file.path()).unwrap();

    assert_eq!(config.host, "http://file-loki:3100");
    assert_eq!(config.encoding(), Encoding::Json);
    assert_eq!(config.flush_interval, Duration::from_secs(3));
    assert_eq!(config.default_labels, "{job=\"from-file\"}");
    assert_eq!(config.log_level, LogLevel::Warn);
    // Unset keys keep their defaults
    assert_eq!(config.timeout, Duration::from_secs(30));
    assert_eq!(config.config_file.as_deref(), Some(file.path()));
}

#[test]
#[serial]
fn test_cli_host_overrides_config_file() {
    clear_env();

    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "host = \"http://file-loki:3100\"\ninterval = 4").unwrap();
    let path = file.path().to_string_lossy().to_string();

    let from_file = Config::from_args(["loki-batcher", "--config-file", path.as_str()]).unwrap();
    assert_eq!(from_file.host, "http://file-loki:3100");
    assert_eq!(from_file.flush_interval, Duration::from_secs(4));

    let overridden = Config::from_args([
        "loki-batcher",
        "--config-file",
        path.as_str(),
        "--host",
        "http://cli-loki:3100",
    ])
    .unwrap();
    assert_eq!(overridden.host, "http://cli-loki:3100");
    assert_eq!(overridden.flush_interval, Duration::from_secs(4));
}

#[test]
#[serial]
fn test_explicit_cli_options_override_config_file() {
    clear_env();

    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        "host = \"http://file-loki:3100\"\ninterval = 4\ntimeout_secs = 20"
    )
    .unwrap();
    let path = file.path().to_string_lossy().to_string();

    let config = assert_ok!(Config::from_args([
        "loki-batcher",
        "--config-file",
        path.as_str(),
        "--json",
        "--interval",
        "0.25",
    ]));

    assert_eq!(config.host, "http://file-loki:3100");
    assert_eq!(config.encoding(), Encoding::Json);
    assert_eq!(config.flush_interval, Duration::from_millis(250));
    // Left at its clap default, so the file value stands
    assert_eq!(config.timeout, Duration::from_secs(20));
}

#[test]
#[serial]
fn test_env_var_overrides_config_file() {
    clear_env();

    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "host = \"http://file-loki:3100\"\ninterval = 4").unwrap();
    let path = file.path().to_string_lossy().to_string();

    unsafe { std::env::set_var("LOKI_INTERVAL", "9") };
    let config = Config::from_args(["loki-batcher", "--config-file", path.as_str()]);
    clear_env();

    assert_eq!(assert_ok!(config).flush_interval, Duration::from_secs(9));
}

#[test]
#[serial]
fn test_fractional_interval_from_args() {
    clear_env();

    let config = assert_ok!(Config::from_args([
        "loki-batcher",
        "--host",
        "http://loki:3100",
        "--interval",
        "0.5",
    ]));

    assert_eq!(config.flush_interval, Duration::from_millis(500));
}

#[test]
fn test_negative_interval_in_file_fails() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "host = \"http://loki:3100\"\ninterval = -2.5").unwrap();

    let err = assert_err!(Config::from_file(file.path()));

    assert!(matches!(err, ConfigError::InvalidConfig(msg) if msg.contains("interval")));
}

#[test]
fn test_malformed_toml_fails() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "host = [unterminated").unwrap();

    let result = Config::from_file(file.path());

    assert!(matches!(result, Err(ConfigError::ParseError(_))));
}

#[test]
fn test_missing_file_fails() {
    let result = Config::from_file("/nonexistent/loki-batcher.toml");

    assert!(matches!(result, Err(ConfigError::FileError(_))));
}

#[test]
fn test_client_config_carries_timeouts() {
    let mut config = Config {
        host: "http://loki:3100".to_string(),
        timeout_secs: 12,
        connect_timeout_secs: 3,
        ..Config::default()
    };
    config.post_process().unwrap();

    let client = config.client_config();
    assert_eq!(client.host, "http://loki:3100");
    assert_eq!(client.timeout, Duration::from_secs(12));
    assert_eq!(client.connection_timeout, Duration::from_secs(3));
}
