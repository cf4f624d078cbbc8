pub mod breaker;

pub use breaker::{
    BreakerState, CIRCUIT_BREAKER_INTERVAL, CircuitBreaker, DEFAULT_FLUSH_INTERVAL,
};
