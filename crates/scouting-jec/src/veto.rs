//! Jet veto map selection.
//!
//! Entries are either a plain file path, which applies to every run, or a `min:max:path`
//! triple restricted to the half-open range `[min, max)`. A negative bound is open.

use scouting_core::{run_ranges::RunRange, RunNumber};

/// Strict integer form accepted for veto map bounds: optional `-` followed by digits.
/// Trailing commas and closing brackets left over from list syntax are tolerated.
fn parse_bound(s: &str) -> Option<&str> {
    let s = s.trim().trim_end_matches(&[',', ']', ')'][..]).trim();
    let digits = s.strip_prefix('-').unwrap_or(s);
    (!digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())).then_some(s)
}

/// Select the veto map file for `run`, scanning `entries` in order.
///
/// Entries without two colons, or whose bounds are not integers, or whose path is empty, are
/// returned as plain files. Returns `None` when no entry applies.
pub fn pick_veto_map_for_run<S: AsRef<str>>(entries: &[S], run: RunNumber) -> Option<String> {
    for raw in entries {
        let entry = raw.as_ref().trim();
        if entry.is_empty() {
            continue;
        }
        let mut parts = entry.splitn(3, ':');
        let (Some(min), Some(max), Some(file)) = (parts.next(), parts.next(), parts.next()) else {
            return Some(entry.to_string());
        };
        let file = file.trim();
        let range = match (parse_bound(min), parse_bound(max)) {
            (Some(min), Some(max)) if !file.is_empty() => {
                RunRange::parse(min, max).map(RunRange::negative_as_open)
            }
            _ => return Some(entry.to_string()),
        };
        match range {
            Ok(range) if range.contains(run) => return Some(file.to_string()),
            Ok(_) => {}
            Err(err) => {
                tracing::debug!("treating veto map entry {entry} as a plain file: {err}");
                return Some(entry.to_string());
            }
        }
    }
    None
}
