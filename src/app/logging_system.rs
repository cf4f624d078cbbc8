use super::config::{Config, LogLevel};
use thiserror::Error;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Error, Debug)]
pub enum LoggingError {
    #[error("Invalid log filter '{filter}': {source}")]
    InvalidFilter {
        filter: String,
        #[source]
        source: tracing_subscriber::filter::ParseError,
    },
    #[error("Failed to set global tracing subscriber: {0}")]
    Install(String),
}

pub struct LoggingSystem {
    directives: Vec<(String, LogLevel)>,
    default_level: LogLevel,
    json: bool,
}

impl LoggingSystem {
    /// Starts with dependency targets capped at `warn`.
    pub fn new(default_level: LogLevel) -> Self {
        let directives = ["hyper", "hyper_util", "reqwest", "h2", "rustls"]
            .iter()
            .map(|target| (target.to_string(), LogLevel::Warn))
            .collect();

        Self {
            directives,
            default_level,
            json: false,
        }
    }

    pub fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }

    pub fn add_directive(&mut self, target: impl Into<String>, level: LogLevel) {
        self.directives.push((target.into(), level));
    }

    pub fn directive_count(&self) -> usize {
        self.directives.len()
    }

    pub fn build_filter_string(&self) -> String {
        let mut filter_parts = Vec::with_capacity(self.directives.len() + 1);
        filter_parts.push(self.default_level.as_str().to_string());

        for (target, level) in &self.directives {
            filter_parts.push(format!("{}={}", target, level.as_str()));
        }

        filter_parts.join(",")
    }

    /// Installs the global subscriber. `RUST_LOG`, when set and valid, wins
    /// over the configured filter.
    pub fn initialize(&self) -> Result<(), LoggingError> {
        let env_filter = match EnvFilter::try_from_default_env() {
            Ok(filter) => filter,
            Err(_) => {
                let filter = self.build_filter_string();
                EnvFilter::try_new(&filter)
                    .map_err(|source| LoggingError::InvalidFilter { filter, source })?
            }
        };

        let registry = tracing_subscriber::registry().with(env_filter);

        let result = if self.json {
            registry
                .with(fmt::layer().json().with_target(true))
                .try_init()
        } else {
            registry
                .with(fmt::layer().with_target(true).with_level(true).compact())
                .try_init()
        };

        result.map_err(|e| LoggingError::Install(e.to_string()))
    }
}

pub fn setup_logging(config: &Config) -> Result<(), LoggingError> {
    LoggingSystem::new(config.log_level)
        .with_json(config.log_json)
        .initialize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_string_lists_default_level_first() {
        let mut logging = LoggingSystem::new(LogLevel::Debug);
        logging.add_directive("loki_batcher::sender", LogLevel::Trace);

        let filter = logging.build_filter_string();

        assert!(filter.starts_with("debug,"));
        assert!(filter.contains("reqwest=warn"));
        assert!(filter.ends_with("loki_batcher::sender=trace"));
        assert!(EnvFilter::try_new(&filter).is_ok());
    }

    #[test]
    fn test_default_directives() {
        assert_eq!(LoggingSystem::new(LogLevel::Info).directive_count(), 5);
    }
}
