//! `mirage` -- batch generation simulator.
//!
//! Builds a batch of prompt/reference jobs from environment configuration,
//! submits it against a simulated worker pool with bounded concurrency and
//! randomized latency/failure, and emits the CSV export of the collected,
//! index-aligned results.
//!
//! # Environment variables
//!
//! | Variable              | Required | Default       | Description                                        |
//! |-----------------------|----------|---------------|----------------------------------------------------|
//! | `MIRAGE_PROMPTS`      | yes      | --            | JSON string array of prompts                       |
//! | `MIRAGE_MODE`         | no       | `one-to-many` | Pairing mode: `one-to-many`, `zip`, `cartesian`    |
//! | `MIRAGE_SHARED_REFS`  | no       | `[]`          | JSON string array of shared reference ids          |
//! | `MIRAGE_GROUPS`       | no       | `[]`          | JSON array of string arrays (per-slot ref groups)  |
//! | `MIRAGE_PAYLOAD`      | no       | `{}`          | JSON object copied into every job                  |
//! | `MIRAGE_CONCURRENCY`  | no       | `4`           | Max jobs in flight                                 |
//! | `MIRAGE_LATENCY_MS`   | no       | `200..1200`   | Simulated delay range, `min..max` milliseconds     |
//! | `MIRAGE_FAILURE_RATE` | no       | `0.1`         | Per-job failure probability in `[0, 1]`            |
//! | `MIRAGE_CSV_OUT`      | no       | --            | Write the CSV here instead of stdout               |

mod config;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mirage_engine::Session;

use crate::config::CliConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mirage_cli=info,mirage_engine=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = CliConfig::from_env();
    if config.discarded_inputs > 0 {
        tracing::warn!(
            discarded = config.discarded_inputs,
            "some inputs were dropped during normalization",
        );
    }

    let mut session = Session::new();
    match config.mode {
        Some(mode) => {
            session.build(mode, &config.request);
        }
        None => {
            tracing::warn!("no valid pairing mode, running an empty batch");
        }
    }

    let summary = session.submit(config.submit).await;
    tracing::info!(
        total = summary.total,
        succeeded = summary.succeeded,
        failed = summary.failed,
        queued = summary.queued,
        "batch finished",
    );

    let csv = session.export_csv();
    match &config.csv_out {
        Some(path) => {
            std::fs::write(path, &csv)
                .with_context(|| format!("failed to write CSV to {}", path.display()))?;
            tracing::info!(path = %path.display(), rows = summary.total, "CSV export written");
        }
        None => print!("{csv}"),
    }

    Ok(())
}
