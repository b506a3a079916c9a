//! `mirage-core` -- pure domain logic for the mirage batch simulator.
//!
//! Everything in this crate is synchronous and side-effect free: job and
//! handle types, the prompt/reference pairing engine, input normalization,
//! CSV export, and batch status summaries.  The async execution layer lives
//! in `mirage-engine`.

pub mod error;
pub mod export;
pub mod job;
pub mod pairing;
pub mod summary;

pub use error::CoreError;
pub use job::{Handle, Job, JobStatus, Payload};
pub use pairing::{build_jobs, BuildOutcome, BuildRequest, PairMode};
pub use summary::BatchSummary;
