//! Era-keyed jet energy correction configuration: parsing, lookup and run-based selection.

use thiserror::Error;

pub mod block;
pub mod database;
pub mod residual;
pub mod veto;

pub use block::EraBlock;
pub use database::ConfigDatabase;
pub use residual::{ResidualParseError, ResidualRange};

/// Convenience alias for results returned while loading correction configuration.
pub type JecResult<T> = Result<T, JecError>;

/// Errors that can occur while reading a correction configuration file.
#[derive(Error, Debug)]
pub enum JecError {
    /// The file exists but could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// Path of the file being read.
        path: String,
        /// Underlying I/O failure.
        source: std::io::Error,
    },
    /// A residual entry could not be split into `min:max:path`.
    #[error("{source_name}: malformed L2L3Residual entry \"{item}\" in section {era} (expected min:max:path)")]
    MalformedResidual {
        /// File path or label of the parsed text.
        source_name: String,
        /// Section key the entry belongs to.
        era: String,
        /// Offending list item.
        item: String,
    },
}

/// Re-exports for the most common types.
pub mod prelude {
    pub use crate::{
        block::EraBlock,
        database::ConfigDatabase,
        residual::{parse_residual_list, pick_residual_for_run, ResidualRange},
        veto::pick_veto_map_for_run,
        JecError, JecResult,
    };
    pub use scouting_core::{
        eras::{infer_era_from_paths, normalize_era_key, EraKey},
        RunNumber,
    };
}
