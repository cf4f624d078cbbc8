use crate::encoder::Encoding;
use crate::reliability::DEFAULT_FLUSH_INTERVAL;
use crate::scheduler::SchedulerConfig;
use crate::sender::ClientConfig;
use clap::parser::ValueSource;
use clap::{ArgMatches, CommandFactory, FromArgMatches, Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use url::Url;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("File error: {0}")]
    FileError(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    ParseError(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

const DEFAULT_LABELS: &str = "{job=\"loki-batcher\"}";

#[derive(Parser, Debug, Clone, Serialize, Deserialize)]
#[command(author, version, about, long_about = None)]
#[serde(default)]
pub struct Config {
    /// Base URL of the log backend; batches go to {host}/api/prom/push
    #[arg(long, env = "LOKI_HOST", default_value = "", hide_default_value = true)]
    pub host: String,

    /// Push JSON bodies instead of protobuf
    #[arg(long, env = "LOKI_JSON")]
    pub json: bool,

    /// Flush interval in seconds, fractions allowed (0 or unset means 5)
    #[arg(long, env = "LOKI_INTERVAL")]
    pub interval: Option<f64>,

    /// Request timeout in seconds
    #[arg(long, env = "LOKI_TIMEOUT_SECS", default_value = "30")]
    pub timeout_secs: u64,

    /// Connect timeout in seconds
    #[arg(long, env = "LOKI_CONNECT_TIMEOUT_SECS", default_value = "10")]
    pub connect_timeout_secs: u64,

    /// User-Agent header sent with every push
    #[arg(long, env = "LOKI_USER_AGENT", default_value = concat!("loki-batcher/", env!("CARGO_PKG_VERSION")))]
    pub user_agent: String,

    /// Label set for input lines that are not JSON entries
    #[arg(long, env = "LOKI_DEFAULT_LABELS", default_value = DEFAULT_LABELS)]
    pub default_labels: String,

    /// Log level
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: LogLevel,

    /// Emit JSON formatted logs
    #[arg(long, env = "LOG_JSON")]
    pub log_json: bool,

    /// Configuration file path (optional)
    #[arg(long, env = "CONFIG_FILE")]
    #[serde(skip)]
    pub config_file: Option<PathBuf>,

    /// Derived fields (not CLI arguments)
    #[serde(skip)]
    #[arg(skip)]
    pub flush_interval: Duration,

    #[serde(skip)]
    #[arg(skip)]
    pub timeout: Duration,

    #[serde(skip)]
    #[arg(skip)]
    pub connect_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: String::new(),
            json: false,
            interval: None,
            timeout_secs: 30,
            connect_timeout_secs: 10,
            user_agent: format!("loki-batcher/{}", env!("CARGO_PKG_VERSION")),
            default_labels: DEFAULT_LABELS.to_string(),
            log_level: LogLevel::Info,
            log_json: false,
            config_file: None,
            flush_interval: DEFAULT_FLUSH_INTERVAL,
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

impl Config {
    /// Parses CLI args (with env fallbacks). When `--config-file` is given
    /// the file is the base and every option set on the command line or
    /// through its env var overrides it.
    pub fn from_args<I, T>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let matches = Config::command().get_matches_from(args);
        let cli = Config::from_arg_matches(&matches)
            .map_err(|e| ConfigError::InvalidConfig(e.to_string()))?;

        let mut config = match cli.config_file.clone() {
            Some(path) => {
                let mut file_config = Self::read_file(&path)?;
                file_config.overlay_explicit(cli, &matches);
                file_config.config_file = Some(path);
                file_config
            }
            None => cli,
        };

        config.post_process()?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let mut config = Self::read_file(path.as_ref())?;
        config.config_file = Some(path.as_ref().to_path_buf());
        config.post_process()?;
        config.validate()?;
        Ok(config)
    }

    fn read_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Copies over every option of `cli` that was not left at its default.
    fn overlay_explicit(&mut self, cli: Config, matches: &ArgMatches) {
        let explicit = |id: &str| {
            matches!(
                matches.value_source(id),
                Some(ValueSource::CommandLine | ValueSource::EnvVariable)
            )
        };

        if explicit("host") {
            self.host = cli.host;
        }
        if explicit("json") {
            self.json = cli.json;
        }
        if explicit("interval") {
            self.interval = cli.interval;
        }
        if explicit("timeout_secs") {
            self.timeout_secs = cli.timeout_secs;
        }
        if explicit("connect_timeout_secs") {
            self.connect_timeout_secs = cli.connect_timeout_secs;
        }
        if explicit("user_agent") {
            self.user_agent = cli.user_agent;
        }
        if explicit("default_labels") {
            self.default_labels = cli.default_labels;
        }
        if explicit("log_level") {
            self.log_level = cli.log_level;
        }
        if explicit("log_json") {
            self.log_json = cli.log_json;
        }
    }

    pub fn post_process(&mut self) -> Result<(), ConfigError> {
        self.flush_interval = match self.interval {
            Some(secs) if secs > 0.0 => {
                Duration::try_from_secs_f64(secs).unwrap_or(DEFAULT_FLUSH_INTERVAL)
            }
            _ => DEFAULT_FLUSH_INTERVAL,
        };
        self.timeout = Duration::from_secs(self.timeout_secs);
        self.connect_timeout = Duration::from_secs(self.connect_timeout_secs);
        self.host = self.host.trim().to_string();

        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.is_empty() {
            return Err(ConfigError::InvalidConfig(
                "host is required (use --host, LOKI_HOST or a config file)".to_string(),
            ));
        }

        let url = Url::parse(&self.host)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid host URL '{}': {}", self.host, e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidUrl(format!(
                "Host URL '{}' must use http or https",
                self.host
            )));
        }

        if let Some(secs) = self.interval
            && Duration::try_from_secs_f64(secs).is_err()
        {
            return Err(ConfigError::InvalidConfig(format!(
                "Flush interval must be a finite, non-negative number of seconds, got {secs}"
            )));
        }

        if self.timeout_secs == 0 {
            return Err(ConfigError::InvalidConfig(
                "Request timeout must be greater than 0".to_string(),
            ));
        }

        if self.connect_timeout_secs == 0 {
            return Err(ConfigError::InvalidConfig(
                "Connect timeout must be greater than 0".to_string(),
            ));
        }

        if self.default_labels.trim().is_empty() {
            return Err(ConfigError::InvalidConfig(
                "Default labels must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    pub fn encoding(&self) -> Encoding {
        Encoding::from_json_flag(self.json)
    }

    pub fn scheduler_config(&self) -> SchedulerConfig {
        SchedulerConfig {
            encoding: self.encoding(),
            flush_interval: self.flush_interval,
            ..SchedulerConfig::default()
        }
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            host: self.host.clone(),
            timeout: self.timeout,
            connection_timeout: self.connect_timeout,
            user_agent: self.user_agent.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_defaults_to_five_seconds() {
        let mut config = Config {
            host: "http://localhost:3100".to_string(),
            ..Config::default()
        };
        config.post_process().unwrap();
        assert_eq!(config.flush_interval, Duration::from_secs(5));

        config.interval = Some(0.0);
        config.post_process().unwrap();
        assert_eq!(config.flush_interval, Duration::from_secs(5));

        config.interval = Some(2.0);
        config.post_process().unwrap();
        assert_eq!(config.flush_interval, Duration::from_secs(2));

        config.interval = Some(0.5);
        config.post_process().unwrap();
        assert_eq!(config.flush_interval, Duration::from_millis(500));
    }

    #[test]
    fn test_negative_or_non_finite_interval_is_rejected() {
        for bad in [-1.0, f64::NAN, f64::INFINITY] {
            let mut config = Config {
                host: "http://localhost:3100".to_string(),
                interval: Some(bad),
                ..Config::default()
            };
            config.post_process().unwrap();

            assert!(matches!(
                config.validate(),
                Err(ConfigError::InvalidConfig(msg)) if msg.contains("interval")
            ));
        }
    }

    #[test]
    fn test_missing_host_is_rejected() {
        let config = Config::default();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidConfig(msg)) if msg.contains("host")
        ));
    }

    #[test]
    fn test_json_flag_selects_encoding() {
        let config = Config {
            json: true,
            ..Config::default()
        };
        assert_eq!(config.encoding(), Encoding::Json);
        assert_eq!(Config::default().encoding(), Encoding::Protobuf);
    }
}
