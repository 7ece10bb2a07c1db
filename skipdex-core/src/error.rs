//! Error types for skip list construction.

use thiserror::Error;

/// Invalid construction parameters.
///
/// Lookups and removals of absent keys are not errors; they return `None`.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    /// Maximum level outside `1..=64`.
    #[error("max level must be in 1..={limit}, got {max_level}")]
    InvalidMaxLevel {
        /// The rejected value.
        max_level: usize,
        /// Upper bound accepted.
        limit: usize,
    },

    /// Leveling probability outside `[0, 1]`.
    #[error("probability must be in [0, 1], got {probability}")]
    InvalidProbability {
        /// The rejected value.
        probability: f64,
    },
}
