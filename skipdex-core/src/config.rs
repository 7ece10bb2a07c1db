//! Construction parameters for [`SkipList`](crate::SkipList).

use crate::error::ConfigError;

/// Default bound on element height.
pub const DEFAULT_MAX_LEVEL: usize = 18;

/// Default leveling probability, `1/e`.
pub const DEFAULT_PROBABILITY: f64 = 1.0 / std::f64::consts::E;

/// Largest accepted `max_level`.
pub const MAX_LEVEL_LIMIT: usize = 64;

/// Skip list configuration.
///
/// ```rust
/// use skipdex_core::{DeferredGuard, SkipList, SkipListConfig};
///
/// let config = SkipListConfig::default()
///     .with_max_level(12)
///     .with_probability(0.25)
///     .with_seed(7);
/// let list: SkipList<&str, DeferredGuard> = SkipList::try_with_config(config).unwrap();
/// assert_eq!(list.max_level(), 12);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SkipListConfig {
    /// Bound on element height, fixed for the lifetime of the list.
    pub max_level: usize,
    /// Geometric parameter for height draws.
    pub probability: f64,
    /// Seed for the level generator. `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for SkipListConfig {
    fn default() -> Self {
        SkipListConfig {
            max_level: DEFAULT_MAX_LEVEL,
            probability: DEFAULT_PROBABILITY,
            seed: None,
        }
    }
}

impl SkipListConfig {
    /// Set the bound on element height, accepted in `1..=64`.
    pub fn with_max_level(mut self, max_level: usize) -> Self {
        self.max_level = max_level;
        self
    }

    /// Set the leveling probability, accepted in `[0, 1]`.
    pub fn with_probability(mut self, probability: f64) -> Self {
        self.probability = probability;
        self
    }

    /// Seed the level generator for reproducible heights.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Check both parameters against their accepted ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_LEVEL_LIMIT).contains(&self.max_level) {
            return Err(ConfigError::InvalidMaxLevel {
                max_level: self.max_level,
                limit: MAX_LEVEL_LIMIT,
            });
        }
        if !(0.0..=1.0).contains(&self.probability) {
            return Err(ConfigError::InvalidProbability {
                probability: self.probability,
            });
        }
        Ok(())
    }
}
