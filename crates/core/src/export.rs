//! Tabular (CSV) export of handle lifecycles.
//!
//! One row per handle, in the order the handles are given -- callers wanting
//! the index-aligned view pass the collect output.  A pure serialization
//! concern; no lifecycle logic lives here.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::job::Handle;

/// Column order of the export, fixed by the external interface.
pub const CSV_HEADER: &str =
    "index,job_id,status,prompt,ref_count,submitted_at,finished_at,error,result";

/// Render a full CSV document (header plus one row per handle).
pub fn export_csv(handles: &[Handle]) -> String {
    let mut out = String::with_capacity(64 * (handles.len() + 1));
    out.push_str(CSV_HEADER);
    out.push('\n');
    for handle in handles {
        out.push_str(&handle_row(handle));
        out.push('\n');
    }
    out
}

/// Render a single handle as a CSV row (no trailing newline).
///
/// Placeholder handles render an empty `job_id` and empty timestamps.
pub fn handle_row(handle: &Handle) -> String {
    let job_id = if handle.is_placeholder() {
        String::new()
    } else {
        handle.job_id.to_string()
    };
    // The prompt is free text; newlines are flattened to spaces before the
    // usual CSV quoting.
    let prompt = handle.job.prompt.replace(['\r', '\n'], " ");

    [
        handle.job.index.to_string(),
        job_id,
        handle.status.label().to_string(),
        csv_field(&prompt),
        handle.job.refs.len().to_string(),
        timestamp_field(handle.submitted_at),
        timestamp_field(handle.finished_at),
        csv_field(handle.error.as_deref().unwrap_or("")),
        csv_field(handle.result.as_deref().unwrap_or("")),
    ]
    .join(",")
}

/// RFC 3339 rendering of an optional timestamp; empty when absent.
fn timestamp_field(ts: Option<DateTime<Utc>>) -> String {
    ts.map(|t| t.to_rfc3339_opts(SecondsFormat::Millis, true))
        .unwrap_or_default()
}

/// Quote a field when it contains a delimiter, quote, or newline.
fn csv_field(raw: &str) -> String {
    if raw.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", raw.replace('"', "\"\""))
    } else {
        raw.to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::job::{Job, Payload};

    fn handle(index: usize, prompt: &str, refs: &[&str]) -> Handle {
        Handle::submitted(Arc::new(Job {
            index,
            prompt: prompt.to_string(),
            refs: refs.iter().map(|s| s.to_string()).collect(),
            payload: Payload::new(),
        }))
    }

    #[test]
    fn header_matches_row_arity() {
        let row = handle_row(&handle(0, "p", &["a"]));
        assert_eq!(
            row.split(',').count(),
            CSV_HEADER.split(',').count(),
        );
    }

    #[test]
    fn succeeded_row_carries_result_and_timestamps() {
        let done = handle(2, "a prompt", &["R1", "R2"]).finished_ok("render-0002");
        let row = handle_row(&done);
        assert!(row.starts_with("2,"));
        assert!(row.contains(",succeeded,"));
        assert!(row.contains(",a prompt,2,"));
        assert!(row.ends_with(",render-0002"));
        // Both timestamps rendered.
        assert_eq!(row.matches('Z').count(), 2);
    }

    #[test]
    fn placeholder_row_has_empty_id_and_timestamps() {
        let job = Arc::new(Job {
            index: 4,
            prompt: "pending".to_string(),
            refs: Vec::new(),
            payload: Payload::new(),
        });
        let row = handle_row(&Handle::placeholder(job));
        assert_eq!(row, "4,,queued,pending,0,,,,");
    }

    #[test]
    fn prompt_newlines_are_flattened() {
        let row = handle_row(&handle(0, "line one\nline two", &[]));
        assert!(row.contains("line one line two"));
        assert!(!row.contains('\n'));
    }

    #[test]
    fn fields_with_delimiters_are_quoted() {
        assert_eq!(csv_field("a,b"), "\"a,b\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(csv_field("plain"), "plain");
    }

    #[test]
    fn export_emits_header_and_one_row_per_handle() {
        let handles = vec![handle(0, "a", &[]), handle(1, "b", &["R"])];
        let csv = export_csv(&handles);
        let lines: Vec<&str> = csv.trim_end().lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], CSV_HEADER);
        assert!(lines[1].starts_with("0,"));
        assert!(lines[2].starts_with("1,"));
    }
}
