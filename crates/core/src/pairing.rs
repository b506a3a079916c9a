//! Pairing engine: expands prompts and reference groups into an ordered
//! job list.
//!
//! Pure functions only.  No input shape causes a failure here -- malformed
//! values degrade to empty lists, and every degradation is counted so the
//! caller can audit what was silently dropped.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::job::{Job, Payload};

// ---------------------------------------------------------------------------
// Pairing mode
// ---------------------------------------------------------------------------

/// Strategy for combining prompts with reference groups into jobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PairMode {
    /// Every prompt pairs with the entire shared reference list.
    OneToMany,
    /// Positional 1:1 pairing, truncated to the shorter side.
    Zip,
    /// Cross join of prompts against the group catalogue, or against
    /// individual shared references when no groups are supplied.
    Cartesian,
}

impl PairMode {
    /// Canonical string form, matching the serde representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OneToMany => "one-to-many",
            Self::Zip => "zip",
            Self::Cartesian => "cartesian",
        }
    }
}

impl Default for PairMode {
    fn default() -> Self {
        Self::OneToMany
    }
}

impl FromStr for PairMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "one-to-many" => Ok(Self::OneToMany),
            "zip" => Ok(Self::Zip),
            "cartesian" => Ok(Self::Cartesian),
            other => Err(CoreError::Validation(format!(
                "Unknown pairing mode '{other}'. Valid modes: one-to-many, zip, cartesian"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Build request / outcome
// ---------------------------------------------------------------------------

/// Inputs for one pairing run.
#[derive(Debug, Clone, Default)]
pub struct BuildRequest {
    pub prompts: Vec<String>,
    /// Shared reference list, used by one-to-many and the cartesian fallback.
    pub shared_refs: Vec<String>,
    /// Group catalogue, used by zip and cartesian.  A group may be
    /// explicitly empty, which is distinct from supplying no groups at all.
    pub groups: Vec<Vec<String>>,
    /// Extra parameters copied verbatim into every job.
    pub payload: Payload,
}

/// Result of a pairing run: the ordered job list plus a count of shared
/// references discarded by normalization.
#[derive(Debug, Clone, Default)]
pub struct BuildOutcome {
    pub jobs: Vec<Job>,
    pub discarded_refs: usize,
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Filter empty and whitespace-only entries out of a shared reference list,
/// returning the kept entries and the number discarded.
fn normalize_shared_refs(raw: &[String]) -> (Vec<String>, usize) {
    let kept: Vec<String> = raw
        .iter()
        .filter(|r| !r.trim().is_empty())
        .cloned()
        .collect();
    let discarded = raw.len() - kept.len();
    (kept, discarded)
}

/// Extract a string list from a JSON value, degrading malformed shapes to
/// empty and counting everything discarded.
///
/// - `null` is an absent input: empty list, nothing discarded.
/// - A non-array value is one discarded input.
/// - Non-string array elements are discarded individually.
pub fn refs_from_json(value: &serde_json::Value) -> (Vec<String>, usize) {
    match value {
        serde_json::Value::Null => (Vec::new(), 0),
        serde_json::Value::Array(items) => {
            let mut refs = Vec::with_capacity(items.len());
            let mut discarded = 0;
            for item in items {
                match item.as_str() {
                    Some(s) => refs.push(s.to_string()),
                    None => discarded += 1,
                }
            }
            (refs, discarded)
        }
        _ => (Vec::new(), 1),
    }
}

/// Extract a list of reference groups from a JSON value, with the same
/// degradation rules as [`refs_from_json`] applied per element.
///
/// A valid inner array is kept even when empty -- an explicitly empty group
/// is meaningful to the cartesian mode.
pub fn groups_from_json(value: &serde_json::Value) -> (Vec<Vec<String>>, usize) {
    match value {
        serde_json::Value::Null => (Vec::new(), 0),
        serde_json::Value::Array(items) => {
            let mut groups = Vec::with_capacity(items.len());
            let mut discarded = 0;
            for item in items {
                match item {
                    serde_json::Value::Array(_) => {
                        let (group, dropped) = refs_from_json(item);
                        groups.push(group);
                        discarded += dropped;
                    }
                    _ => discarded += 1,
                }
            }
            (groups, discarded)
        }
        _ => (Vec::new(), 1),
    }
}

// ---------------------------------------------------------------------------
// Job construction
// ---------------------------------------------------------------------------

/// Expand a [`BuildRequest`] into the ordered job list for `mode`.
///
/// Never fails.  Indices are assigned sequentially from 0 in the order jobs
/// are produced, so within one call they are exactly `0..N-1`.
///
/// - **one-to-many**: one job per prompt; each `refs` is an independent
///   clone of the normalized shared list.
/// - **zip**: job `i` pairs `prompts[i]` with `groups[i]`; excess entries on
///   either side are silently dropped.
/// - **cartesian** with groups: every prompt crossed with every group, the
///   group list treated as a flat catalogue (prompt-major order).  An empty
///   group yields a text-only job per prompt.
/// - **cartesian** without groups: every prompt crossed with every
///   individual shared reference, each job getting a singleton `refs`.
pub fn build_jobs(mode: PairMode, req: &BuildRequest) -> BuildOutcome {
    let (shared, discarded_refs) = normalize_shared_refs(&req.shared_refs);

    let mut jobs = Vec::new();
    let mut push = |prompt: &str, refs: Vec<String>| {
        let index = jobs.len();
        jobs.push(Job {
            index,
            prompt: prompt.to_string(),
            refs,
            payload: req.payload.clone(),
        });
    };

    match mode {
        PairMode::OneToMany => {
            for prompt in &req.prompts {
                push(prompt, shared.clone());
            }
        }
        PairMode::Zip => {
            for (prompt, group) in req.prompts.iter().zip(&req.groups) {
                push(prompt, group.clone());
            }
        }
        PairMode::Cartesian => {
            if !req.groups.is_empty() {
                for prompt in &req.prompts {
                    for group in &req.groups {
                        push(prompt, group.clone());
                    }
                }
            } else {
                for prompt in &req.prompts {
                    for reference in &shared {
                        push(prompt, vec![reference.clone()]);
                    }
                }
            }
        }
    }

    BuildOutcome {
        jobs,
        discarded_refs,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
