//! `mirage-engine` -- async execution layer for the mirage batch simulator.
//!
//! Drives jobs produced by `mirage-core` through a bounded-concurrency pool
//! with simulated latency and failure, and reconciles completions back into
//! stable job order.

pub mod pool;
pub mod runner;
pub mod session;

pub use runner::RunnerConfig;
pub use session::{Session, SubmitConfig};
