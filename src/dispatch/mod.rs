//! Bounded-concurrency dispatch of personalized send batches.

pub mod engine;

pub use engine::dispatch_batch;

use std::env;

/// Default ceiling on simultaneously in-flight send attempts.
const DEFAULT_MAX_IN_FLIGHT: usize = 5;

/// Runtime configuration for the dispatch engine.
///
/// The ceiling is deliberately the engine's only knob: no retries and no
/// per-send deadline live here. A hung provider call occupies one worker
/// slot and degrades throughput, never correctness.
#[derive(Debug, Clone)]
pub struct DispatchConfig {
    pub max_in_flight: usize,
}

impl DispatchConfig {
    pub fn from_env() -> Self {
        let max_in_flight = env::var("DISPATCH_MAX_IN_FLIGHT")
            .ok()
            .and_then(|value| value.parse::<usize>().ok())
            .unwrap_or(DEFAULT_MAX_IN_FLIGHT)
            .max(1);

        Self { max_in_flight }
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            max_in_flight: DEFAULT_MAX_IN_FLIGHT,
        }
    }
}
