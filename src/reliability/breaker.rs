use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Cadence used when no interval is configured.
pub const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_millis(5000);

/// Fixed wait between attempts once a push has failed.
pub const CIRCUIT_BREAKER_INTERVAL: Duration = Duration::from_millis(60_000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BreakerState {
    /// Flushing at the configured cadence.
    Normal,
    /// Last flush failed; waiting the fixed breaker interval.
    Backoff,
}

/// Two-state flush interval controller.
///
/// The configured cadence and the state are stored separately, so a
/// configured cadence equal to [`CIRCUIT_BREAKER_INTERVAL`] still returns to
/// `Normal` after a success.
#[derive(Debug, Clone)]
pub struct CircuitBreaker {
    configured_interval: Duration,
    breaker_interval: Duration,
    state: BreakerState,
}

impl CircuitBreaker {
    pub fn new(configured_interval: Duration) -> Self {
        Self::with_breaker_interval(configured_interval, CIRCUIT_BREAKER_INTERVAL)
    }

    pub fn with_breaker_interval(configured_interval: Duration, breaker_interval: Duration) -> Self {
        Self {
            configured_interval,
            breaker_interval,
            state: BreakerState::Normal,
        }
    }

    pub fn state(&self) -> BreakerState {
        self.state
    }

    pub fn configured_interval(&self) -> Duration {
        self.configured_interval
    }

    pub fn breaker_interval(&self) -> Duration {
        self.breaker_interval
    }

    pub fn current_interval(&self) -> Duration {
        match self.state {
            BreakerState::Normal => self.configured_interval,
            BreakerState::Backoff => self.breaker_interval,
        }
    }

    /// Returns `true` when the call moved the breaker out of `Backoff`.
    pub fn record_success(&mut self) -> bool {
        let recovered = self.state == BreakerState::Backoff;
        self.state = BreakerState::Normal;
        recovered
    }

    /// Returns `true` when the call moved the breaker into `Backoff`.
    pub fn record_failure(&mut self) -> bool {
        let tripped = self.state == BreakerState::Normal;
        self.state = BreakerState::Backoff;
        tripped
    }
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::new(DEFAULT_FLUSH_INTERVAL)
    }
}
