//! Job and handle types for the batch lifecycle.
//!
//! A [`Job`] is an immutable unit of requested work produced by the pairing
//! engine; a [`Handle`] is the mutable lifecycle record wrapping exactly one
//! job from submission through its terminal state.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque extra-parameter blob copied verbatim into every job of a build.
pub type Payload = serde_json::Map<String, serde_json::Value>;

// ---------------------------------------------------------------------------
// Job
// ---------------------------------------------------------------------------

/// One unit of requested work: a prompt plus an ordered reference set.
///
/// Created only by [`crate::pairing::build_jobs`] and never mutated
/// afterwards.  `index` is 0-based, gap-free within one build, and defines
/// the canonical presentation order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    /// Canonical position within the build (`0..N-1`).
    pub index: usize,
    /// The generation instruction.
    pub prompt: String,
    /// Ordered reference identifiers; empty means text-only.
    pub refs: Vec<String>,
    /// Extra parameters, passed through untouched.
    pub payload: Payload,
}

// ---------------------------------------------------------------------------
// JobStatus
// ---------------------------------------------------------------------------

/// Lifecycle state of a [`Handle`].
///
/// Transitions are strictly `Queued -> Running -> {Succeeded | Failed}`;
/// a terminal status is never left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Created but not yet handed to the executor.
    Queued,
    /// Handed to the executor; the simulated call is (or is about to be)
    /// in flight.
    Running,
    /// Terminal: the simulated call produced a result.
    Succeeded,
    /// Terminal: the simulated call drew a failure.
    Failed,
}

impl JobStatus {
    /// Human-readable label for display and export.
    pub fn label(self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Running => "running",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        }
    }

    /// Whether this status admits no further transition.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }
}

// ---------------------------------------------------------------------------
// Handle
// ---------------------------------------------------------------------------

/// Mutable lifecycle record for one [`Job`].
///
/// The wrapped job is shared read-only between the coordinator and the pool
/// worker, hence the `Arc`.  Terminal handles are produced as fresh values
/// by the runner; an in-flight handle is never mutated into a terminal one
/// in place.
#[derive(Debug, Clone)]
pub struct Handle {
    /// Unique id generated at submission; nil for synthetic placeholders.
    pub job_id: Uuid,
    /// Current lifecycle state.
    pub status: JobStatus,
    /// The job this handle tracks, fixed for the handle's lifetime.
    pub job: Arc<Job>,
    /// When the handle was created by submit; `None` on placeholders.
    pub submitted_at: Option<DateTime<Utc>>,
    /// Set exactly once, on the terminal transition.
    pub finished_at: Option<DateTime<Utc>>,
    /// Result placeholder text; present only when `Succeeded`.
    pub result: Option<String>,
    /// Error text; present only when `Failed`.
    pub error: Option<String>,
}

impl Handle {
    /// Create a freshly submitted handle in the `Queued` state.
    pub fn submitted(job: Arc<Job>) -> Self {
        Self {
            job_id: Uuid::now_v7(),
            status: JobStatus::Queued,
            job,
            submitted_at: Some(Utc::now()),
            finished_at: None,
            result: None,
            error: None,
        }
    }

    /// Create a synthetic placeholder for a job with no completion yet.
    ///
    /// Placeholders carry the nil UUID so they are distinguishable from any
    /// generated id, stay `Queued`, and have no timestamps or result fields.
    pub fn placeholder(job: Arc<Job>) -> Self {
        Self {
            job_id: Uuid::nil(),
            status: JobStatus::Queued,
            job,
            submitted_at: None,
            finished_at: None,
            result: None,
            error: None,
        }
    }

    /// Whether this handle is a synthetic placeholder from collect.
    pub fn is_placeholder(&self) -> bool {
        self.job_id.is_nil()
    }

    /// Mark the handle as handed to the executor.
    pub fn mark_running(&mut self) {
        self.status = JobStatus::Running;
    }

    /// Terminal copy of this handle in the `Succeeded` state.
    pub fn finished_ok(&self, result: impl Into<String>) -> Self {
        let mut done = self.clone();
        done.status = JobStatus::Succeeded;
        done.finished_at = Some(Utc::now());
        done.result = Some(result.into());
        done.error = None;
        done
    }

    /// Terminal copy of this handle in the `Failed` state.
    pub fn finished_err(&self, error: impl Into<String>) -> Self {
        let mut done = self.clone();
        done.status = JobStatus::Failed;
        done.finished_at = Some(Utc::now());
        done.result = None;
        done.error = Some(error.into());
        done
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
