//! Half-open run ranges as written in correction configuration files.

use std::{fmt::Display, str::FromStr};

use thiserror::Error;

use crate::RunNumber;

/// One end of a run range. An empty string or the `-1` sentinel is open; any other integer,
/// including other negatives, is a literal bound.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub enum RunBound {
    /// No limit on this side.
    #[default]
    Open,
    /// Limited at the given run.
    At(i64),
}

/// Errors raised while decoding a run bound.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RunBoundError {
    /// The bound is neither empty nor an integer that fits in an `i64`.
    #[error("invalid run bound \"{0}\"")]
    Invalid(String),
}

impl RunBound {
    /// Treat every negative bound as open, not only `-1`.
    #[must_use]
    pub fn negative_as_open(self) -> Self {
        match self {
            Self::At(value) if value < 0 => Self::Open,
            bound => bound,
        }
    }
}

impl FromStr for RunBound {
    type Err = RunBoundError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s == "-1" {
            return Ok(Self::Open);
        }
        s.parse()
            .map(Self::At)
            .map_err(|_| RunBoundError::Invalid(s.to_string()))
    }
}

impl Display for RunBound {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open => write!(f, "-1"),
            Self::At(run) => write!(f, "{run}"),
        }
    }
}

/// Run interval `[min, max)`.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct RunRange {
    /// Inclusive lower bound.
    pub min: RunBound,
    /// Exclusive upper bound.
    pub max: RunBound,
}

impl RunRange {
    /// Build a range from its two bounds.
    pub fn new(min: RunBound, max: RunBound) -> Self {
        Self { min, max }
    }
    /// Parse both bounds from their textual form.
    ///
    /// # Errors
    ///
    /// Returns the first [`RunBoundError`] encountered.
    pub fn parse(min: &str, max: &str) -> Result<Self, RunBoundError> {
        Ok(Self::new(min.parse()?, max.parse()?))
    }
    /// The same range with every negative bound treated as open.
    #[must_use]
    pub fn negative_as_open(self) -> Self {
        Self::new(self.min.negative_as_open(), self.max.negative_as_open())
    }
    /// Whether `run` lies in `[min, max)`.
    pub fn contains(&self, run: RunNumber) -> bool {
        let run = i64::from(run);
        let above_min = match self.min {
            RunBound::Open => true,
            RunBound::At(min) => run >= min,
        };
        let below_max = match self.max {
            RunBound::Open => true,
            RunBound::At(max) => run < max,
        };
        above_min && below_max
    }
}

impl Display for RunRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {})", self.min, self.max)
    }
}
