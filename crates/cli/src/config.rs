//! Environment-driven configuration for the `mirage` binary.
//!
//! All list-shaped inputs are JSON strings passed through the tolerant
//! boundary helpers in `mirage_core::pairing`, so malformed shapes degrade
//! to empty values (with the discard count surfaced) instead of failing.

use std::path::PathBuf;

use mirage_core::pairing::{groups_from_json, refs_from_json, BuildRequest, PairMode};
use mirage_core::Payload;
use mirage_engine::{RunnerConfig, SubmitConfig};

const DEFAULT_CONCURRENCY: usize = 4;
const DEFAULT_LATENCY_MS: (u64, u64) = (200, 1200);
const DEFAULT_FAILURE_RATE: f64 = 0.1;

/// Fully resolved run configuration.
#[derive(Debug)]
pub struct CliConfig {
    /// `None` when `MIRAGE_MODE` was present but unrecognized; the run then
    /// degrades to an empty batch rather than erroring.
    pub mode: Option<PairMode>,
    pub request: BuildRequest,
    pub submit: SubmitConfig,
    /// Write the CSV export here instead of stdout.
    pub csv_out: Option<PathBuf>,
    /// Inputs dropped while normalizing the JSON boundary values.
    pub discarded_inputs: usize,
}

impl CliConfig {
    /// Resolve the configuration from the environment.
    ///
    /// `MIRAGE_PROMPTS` is required; everything else falls back to a
    /// default.  See the variable table in `main.rs`.
    pub fn from_env() -> Self {
        let prompts_raw = std::env::var("MIRAGE_PROMPTS").unwrap_or_else(|_| {
            tracing::error!("MIRAGE_PROMPTS environment variable is required");
            std::process::exit(1);
        });

        let mut discarded_inputs = 0;

        let (prompts, dropped) = refs_from_json(&json_env_value(&prompts_raw, "MIRAGE_PROMPTS"));
        discarded_inputs += dropped;

        let shared_refs = match std::env::var("MIRAGE_SHARED_REFS") {
            Ok(raw) => {
                let (refs, dropped) = refs_from_json(&json_env_value(&raw, "MIRAGE_SHARED_REFS"));
                discarded_inputs += dropped;
                refs
            }
            Err(_) => Vec::new(),
        };

        let groups = match std::env::var("MIRAGE_GROUPS") {
            Ok(raw) => {
                let (groups, dropped) = groups_from_json(&json_env_value(&raw, "MIRAGE_GROUPS"));
                discarded_inputs += dropped;
                groups
            }
            Err(_) => Vec::new(),
        };

        let payload = match std::env::var("MIRAGE_PAYLOAD") {
            Ok(raw) => match json_env_value(&raw, "MIRAGE_PAYLOAD") {
                serde_json::Value::Object(map) => map,
                serde_json::Value::Null => Payload::new(),
                _ => {
                    tracing::warn!("MIRAGE_PAYLOAD must be a JSON object, ignoring");
                    discarded_inputs += 1;
                    Payload::new()
                }
            },
            Err(_) => Payload::new(),
        };

        let mode = match std::env::var("MIRAGE_MODE") {
            Ok(raw) => match raw.parse::<PairMode>() {
                Ok(mode) => Some(mode),
                Err(e) => {
                    tracing::warn!(error = %e, "MIRAGE_MODE not recognized");
                    None
                }
            },
            Err(_) => Some(PairMode::default()),
        };

        let concurrency = std::env::var("MIRAGE_CONCURRENCY")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(DEFAULT_CONCURRENCY)
            .max(1);

        let failure_rate = std::env::var("MIRAGE_FAILURE_RATE")
            .ok()
            .and_then(|v| v.parse::<f64>().ok())
            .unwrap_or(DEFAULT_FAILURE_RATE);

        let latency_ms = latency_range(std::env::var("MIRAGE_LATENCY_MS").ok());

        Self {
            mode,
            request: BuildRequest {
                prompts,
                shared_refs,
                groups,
                payload,
            },
            submit: SubmitConfig {
                concurrency,
                runner: RunnerConfig {
                    latency_ms,
                    failure_rate,
                },
            },
            csv_out: std::env::var("MIRAGE_CSV_OUT").ok().map(PathBuf::from),
            discarded_inputs,
        }
    }
}

/// Parse an env var as JSON, degrading parse failures to `null` with a
/// warning.
fn json_env_value(raw: &str, var: &'static str) -> serde_json::Value {
    match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(var, error = %e, "ignoring unparseable JSON value");
            serde_json::Value::Null
        }
    }
}

/// Parse a `min..max` millisecond range, falling back to the default on any
/// malformed input.
fn latency_range(raw: Option<String>) -> (u64, u64) {
    let Some(raw) = raw else {
        return DEFAULT_LATENCY_MS;
    };
    if let Some((min, max)) = raw.split_once("..") {
        if let (Ok(min), Ok(max)) = (min.trim().parse(), max.trim().parse()) {
            return (min, max);
        }
    }
    tracing::warn!(value = %raw, "MIRAGE_LATENCY_MS must look like '200..1200', using default");
    DEFAULT_LATENCY_MS
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latency_range_parses_min_max() {
        assert_eq!(latency_range(Some("100..500".to_string())), (100, 500));
        assert_eq!(latency_range(Some(" 0 .. 10 ".to_string())), (0, 10));
    }

    #[test]
    fn latency_range_defaults_on_malformed_input() {
        assert_eq!(latency_range(None), DEFAULT_LATENCY_MS);
        assert_eq!(latency_range(Some("fast".to_string())), DEFAULT_LATENCY_MS);
        assert_eq!(latency_range(Some("100-500".to_string())), DEFAULT_LATENCY_MS);
    }

    #[test]
    fn json_env_value_degrades_to_null() {
        assert_eq!(
            json_env_value("not json", "MIRAGE_PROMPTS"),
            serde_json::Value::Null
        );
        assert_eq!(
            json_env_value("[\"a\"]", "MIRAGE_PROMPTS"),
            serde_json::json!(["a"])
        );
    }
}
