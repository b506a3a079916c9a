//! Batch status summaries.

use serde::Serialize;

use crate::job::{Handle, JobStatus};

/// Per-status counts over a set of handles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub queued: usize,
    pub running: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl BatchSummary {
    /// Count handles by status.
    pub fn from_handles(handles: &[Handle]) -> Self {
        let mut summary = Self {
            total: handles.len(),
            ..Self::default()
        };
        for handle in handles {
            match handle.status {
                JobStatus::Queued => summary.queued += 1,
                JobStatus::Running => summary.running += 1,
                JobStatus::Succeeded => summary.succeeded += 1,
                JobStatus::Failed => summary.failed += 1,
            }
        }
        summary
    }

    /// Whether every handle has reached a terminal state.
    pub fn is_settled(&self) -> bool {
        self.succeeded + self.failed == self.total
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
