//! `L2L3Residual` lists: run-range keyed residual correction files.

use std::{fmt::Display, str::FromStr};

use scouting_core::{
    run_ranges::{RunBoundError, RunRange},
    RunNumber,
};
use serde::{Serialize, Serializer};
use thiserror::Error;

/// One `min:max:path` entry of a residual list.
///
/// Bounds are kept as written; they are only interpreted by [`ResidualRange::run_range`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ResidualRange {
    /// Inclusive lower run bound (`-1` for open).
    pub low: String,
    /// Exclusive upper run bound (`-1` for open).
    pub high: String,
    /// Correction file path; may itself contain colons.
    pub path: String,
}

/// A list item that does not contain the two `:` delimiters.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("malformed residual entry \"{item}\" (expected min:max:path)")]
pub struct ResidualParseError {
    /// The offending item, trimmed.
    pub item: String,
}

impl ResidualRange {
    /// Build an entry from its three parts.
    pub fn new(low: impl Into<String>, high: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            low: low.into(),
            high: high.into(),
            path: path.into(),
        }
    }
    /// Interpret the bounds as a half-open run range.
    ///
    /// # Errors
    ///
    /// Returns a [`RunBoundError`] when either bound is not an integer.
    pub fn run_range(&self) -> Result<RunRange, RunBoundError> {
        RunRange::parse(&self.low, &self.high)
    }
}

impl FromStr for ResidualRange {
    type Err = ResidualParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(3, ':');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(low), Some(high), Some(path)) => Ok(Self::new(low.trim(), high.trim(), path.trim())),
            _ => Err(ResidualParseError {
                item: s.trim().to_string(),
            }),
        }
    }
}

impl Display for ResidualRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.low, self.high, self.path)
    }
}

impl Serialize for ResidualRange {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Parse a one-line list such as `[ -1:-1:/a.txt, 382298:383247:/b.txt ]`.
///
/// Surrounding brackets are optional, items may be wrapped in parentheses, empty items are
/// skipped, and only the first two colons of an item split it.
///
/// # Errors
///
/// Returns a [`ResidualParseError`] for the first item with fewer than two colons.
pub fn parse_residual_list(s: &str) -> Result<Vec<ResidualRange>, ResidualParseError> {
    let mut s = s.trim();
    if s.starts_with('[') && s.ends_with(']') && s.len() >= 2 {
        s = &s[1..s.len() - 1];
    }
    s.split(',')
        .map(|item| item.trim().trim_matches(&['(', ')'][..]))
        .filter(|item| !item.is_empty())
        .map(str::parse::<ResidualRange>)
        .collect()
}

/// Select the residual file for `run`. Entries whose bounds are not integers are skipped.
pub fn pick_residual_for_run(entries: &[ResidualRange], run: RunNumber) -> Option<&ResidualRange> {
    entries.iter().find(|entry| match entry.run_range() {
        Ok(range) => range.contains(run),
        Err(err) => {
            tracing::debug!("skipping residual entry {entry}: {err}");
            false
        }
    })
}
