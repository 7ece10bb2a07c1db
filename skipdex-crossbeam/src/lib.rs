//! Epoch-based reclamation for skipdex skip lists.
//!
//! `skipdex-core` leaves the question of when removed elements are freed to
//! a `Guard`. This crate supplies `EpochGuard`, backed by crossbeam-epoch,
//! which is the guard to use outside of tests.
//!
//! # Usage
//!
//! ```rust
//! use skipdex_crossbeam::EpochSkipList;
//!
//! let list: EpochSkipList<u64> = EpochSkipList::new();
//! list.set("answer", 42);
//!
//! let found = list.get("answer").unwrap();
//! assert_eq!(*found.value(), 42);
//! ```

pub mod epoch_guard;

pub use epoch_guard::{EpochGuard, EpochRef};

/// A skip list whose retired elements are reclaimed through the global epoch
/// collector.
pub type EpochSkipList<V> = skipdex_core::SkipList<V, EpochGuard>;
