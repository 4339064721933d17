//! Shared types for the scouting ntuple configuration crates.

pub mod eras;
pub mod run_ranges;

/// Run number type as reported by the event-processing framework.
pub type RunNumber = u32;
