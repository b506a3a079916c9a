//! Simulated remote generation call.
//!
//! Each job sleeps for a uniform random delay, then draws once against the
//! configured failure rate.  No retry, no timeout beyond the delay itself,
//! and no cancellation: a started call always reaches a terminal state.

use std::time::Duration;

use rand::Rng;

use mirage_core::Handle;

/// Error text attached to handles that draw a simulated failure.
pub const SIMULATED_FAILURE: &str = "simulated worker failure";

/// Latency and failure parameters for the simulated backend.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunnerConfig {
    /// Inclusive delay bounds in milliseconds.
    pub latency_ms: (u64, u64),
    /// Probability in `[0, 1]` that a job resolves to `Failed`.
    pub failure_rate: f64,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            latency_ms: (200, 1200),
            failure_rate: 0.1,
        }
    }
}

impl RunnerConfig {
    /// Silently repair out-of-range parameters: inverted latency bounds are
    /// swapped, NaN and out-of-range failure rates are clamped into `[0, 1]`.
    pub fn normalized(self) -> Self {
        let (min, max) = self.latency_ms;
        let latency_ms = if min <= max { (min, max) } else { (max, min) };
        let failure_rate = if self.failure_rate.is_nan() {
            0.0
        } else {
            self.failure_rate.clamp(0.0, 1.0)
        };
        Self {
            latency_ms,
            failure_rate,
        }
    }
}

/// Deterministic result placeholder for a successful job.
pub fn result_placeholder(job_index: usize) -> String {
    format!("render-{job_index:04}")
}

/// Run one simulated call for `handle`, resolving to a fresh terminal copy.
///
/// The input handle is never mutated.  The sleep here is the sole suspension
/// point of the whole engine; both random draws happen on the thread RNG
/// outside the await.
pub async fn run_job(handle: &Handle, config: RunnerConfig) -> Handle {
    let config = config.normalized();
    let (min, max) = config.latency_ms;
    let delay = rand::rng().random_range(min..=max);

    tokio::time::sleep(Duration::from_millis(delay)).await;

    let roll: f64 = rand::rng().random();
    if roll < config.failure_rate {
        tracing::debug!(
            job_id = %handle.job_id,
            job_index = handle.job.index,
            delay_ms = delay,
            "simulated call failed"
        );
        handle.finished_err(SIMULATED_FAILURE)
    } else {
        tracing::debug!(
            job_id = %handle.job_id,
            job_index = handle.job.index,
            delay_ms = delay,
            "simulated call succeeded"
        );
        handle.finished_ok(result_placeholder(handle.job.index))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
