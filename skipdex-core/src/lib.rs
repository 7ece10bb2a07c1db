//! Ordered byte-key index backed by a probabilistic skip list.
//!
//! # Organization
//!
//! - [`skip_list`] - The list, its elements and iterators
//! - [`guard`] - Memory reclamation strategies for removed elements
//! - [`config`] - Construction parameters
//! - [`error`] - Construction errors
//! - [`common_tests`] - Test suites shared with guard implementations

pub mod common_tests;
pub mod config;
pub mod error;
pub mod guard;
pub mod skip_list;

pub use config::{DEFAULT_MAX_LEVEL, DEFAULT_PROBABILITY, MAX_LEVEL_LIMIT, SkipListConfig};
pub use error::ConfigError;
pub use guard::{DeferredGuard, DeferredRef, Guard};
pub use skip_list::{Element, Iter, SkipList};
