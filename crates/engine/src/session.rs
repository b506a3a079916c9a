//! Lifecycle session: Build -> Submit -> Collect -> Export.
//!
//! A [`Session`] owns one batch at a time.  Building a new batch bumps the
//! session generation and invalidates everything accumulated for the
//! previous one; results belonging to a superseded generation are discarded
//! rather than silently accepted.
//!
//! Lifecycle operations take `&mut self`, so concurrent Build/Submit against
//! the same session is ruled out at compile time rather than being a caller
//! obligation.

use std::collections::HashMap;
use std::sync::Arc;

use uuid::Uuid;

use mirage_core::export;
use mirage_core::pairing::{build_jobs, BuildRequest, PairMode};
use mirage_core::{BatchSummary, Handle, Job};

use crate::pool;
use crate::runner::{self, RunnerConfig};

/// Parameters for one submit run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubmitConfig {
    /// Maximum number of jobs in flight at once (clamped to >= 1).
    pub concurrency: usize,
    /// Simulated backend latency/failure parameters.
    pub runner: RunnerConfig,
}

impl Default for SubmitConfig {
    fn default() -> Self {
        Self {
            concurrency: 4,
            runner: RunnerConfig::default(),
        }
    }
}

/// Coordinator for the job/handle lifecycle of a single batch.
#[derive(Debug, Default)]
pub struct Session {
    /// Bumped on every build; stamps which batch an accumulator belongs to.
    generation: u64,
    jobs: Vec<Arc<Job>>,
    /// Completions keyed by job id.  Single writer (submit), read by collect.
    completions: HashMap<Uuid, Handle>,
    discarded_refs: usize,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Expand a build request into this session's job list.
    ///
    /// Discards all handles and results from any previous build and returns
    /// the new job count.
    pub fn build(&mut self, mode: PairMode, request: &BuildRequest) -> usize {
        let outcome = build_jobs(mode, request);
        self.generation += 1;
        self.jobs = outcome.jobs.into_iter().map(Arc::new).collect();
        self.completions.clear();
        self.discarded_refs = outcome.discarded_refs;

        tracing::info!(
            generation = self.generation,
            mode = mode.as_str(),
            job_count = self.jobs.len(),
            discarded_refs = self.discarded_refs,
            "batch built"
        );
        self.jobs.len()
    }

    /// Current build generation.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Jobs of the current build, in canonical index order.
    pub fn jobs(&self) -> &[Arc<Job>] {
        &self.jobs
    }

    /// Shared references dropped by normalization during the last build.
    pub fn discarded_refs(&self) -> usize {
        self.discarded_refs
    }

    /// Raw completion accumulator, keyed by job id.
    pub fn completions(&self) -> &HashMap<Uuid, Handle> {
        &self.completions
    }

    /// Submit every job of the current build and wait for the pool to drain.
    ///
    /// One handle is synthesized per job (fresh id, submit timestamp) and
    /// marked running before dispatch; each settlement is upserted into the
    /// accumulator as it streams in.  Returns the status summary of the
    /// collect view once all jobs have settled.
    pub async fn submit(&mut self, config: SubmitConfig) -> BatchSummary {
        let generation = self.generation;
        let runner_config = config.runner.normalized();

        let handles: Vec<Handle> = self
            .jobs
            .iter()
            .map(|job| {
                let mut handle = Handle::submitted(Arc::clone(job));
                handle.mark_running();
                handle
            })
            .collect();

        tracing::info!(
            generation,
            job_count = handles.len(),
            concurrency = config.concurrency,
            failure_rate = runner_config.failure_rate,
            "submitting batch"
        );

        let mut accumulator: HashMap<Uuid, Handle> = HashMap::with_capacity(handles.len());
        pool::run_bounded(
            handles,
            config.concurrency,
            |handle| async move { runner::run_job(&handle, runner_config).await },
            |settled: &Handle| {
                accumulator.insert(settled.job_id, settled.clone());
            },
        )
        .await;

        self.absorb(generation, accumulator);

        let summary = BatchSummary::from_handles(&self.collect());
        tracing::info!(
            generation,
            succeeded = summary.succeeded,
            failed = summary.failed,
            "batch settled"
        );
        summary
    }

    /// Merge a drained accumulator into the session.
    ///
    /// `generation` is the session generation at submit entry.  When a newer
    /// build has superseded it the results are discarded and `false` is
    /// returned; the upsert is idempotent otherwise.
    pub fn absorb(&mut self, generation: u64, accumulator: HashMap<Uuid, Handle>) -> bool {
        if generation != self.generation {
            tracing::warn!(
                submitted_generation = generation,
                current_generation = self.generation,
                discarded = accumulator.len(),
                "discarding results from superseded build"
            );
            return false;
        }
        self.completions.extend(accumulator);
        true
    }

    /// Index-aligned view of the current build.
    ///
    /// For each job ascending by index: its accumulated terminal handle if
    /// one exists, else a synthetic queued placeholder.  Output length
    /// always equals the job list length, decoupling presentation order from
    /// completion order.
    pub fn collect(&self) -> Vec<Handle> {
        let by_index: HashMap<usize, &Handle> = self
            .completions
            .values()
            .map(|handle| (handle.job.index, handle))
            .collect();

        self.jobs
            .iter()
            .map(|job| match by_index.get(&job.index) {
                Some(handle) => (*handle).clone(),
                None => Handle::placeholder(Arc::clone(job)),
            })
            .collect()
    }

    /// CSV export of the collect view.
    pub fn export_csv(&self) -> String {
        export::export_csv(&self.collect())
    }
}
