//! Snapshot naming convention.
//!
//! Automatic snapshots are named `auto-<resource>-<timestamp>`, with the
//! timestamp in UTC at seconds precision (`2026-08-01T04:00:00Z`). Only names
//! of this exact shape are ever counted or pruned; a user snapshot that merely
//! starts with `auto-` is left alone.

use chrono::{DateTime, NaiveDateTime, Utc};

const AUTO_PREFIX: &str = "auto-";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";
const TIMESTAMP_LEN: usize = 20;

/// Builds the snapshot name for a resource at the given instant.
pub fn snapshot_name(resource_name: &str, now: DateTime<Utc>) -> String {
    format!(
        "{AUTO_PREFIX}{resource_name}-{}",
        now.format(TIMESTAMP_FORMAT)
    )
}

/// Returns true if `name` was generated by [`snapshot_name`]: the `auto-`
/// prefix, a non-empty resource segment, and a well-formed timestamp suffix.
pub fn is_auto_snapshot(name: &str) -> bool {
    let Some(rest) = name.strip_prefix(AUTO_PREFIX) else {
        return false;
    };
    // Resource segment must be at least one char plus the `-` separator.
    if rest.len() < TIMESTAMP_LEN + 2 || !rest.is_char_boundary(rest.len() - TIMESTAMP_LEN) {
        return false;
    }
    let (head, timestamp) = rest.split_at(rest.len() - TIMESTAMP_LEN);
    if !head.ends_with('-') {
        return false;
    }
    NaiveDateTime::parse_from_str(timestamp, TIMESTAMP_FORMAT).is_ok()
}
