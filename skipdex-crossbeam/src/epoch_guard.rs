//! `Guard` implementation on top of crossbeam-epoch.
//!
//! ```text
//! SkipList<V, EpochGuard>
//!     │
//!     ├── set / get / remove / front   pin, search, make_ref (pins again)
//!     ├── iter / iter_from             one pin held by the iterator
//!     └── remove / value replacement   defer_destroy into the global collector
//! ```
//!
//! An element unlinked by `remove` is handed to the collector while the
//! remover is pinned. Any reader that reached the element earlier holds its
//! own pin, so the collector cannot advance past it until that reader is done.
//!
//! Retired memory is released by whichever thread happens to advance the
//! global epoch, possibly after the list itself is dropped. Values must
//! therefore be `Send + 'static` to be stored or removed:
//!
//! ```compile_fail
//! use std::rc::Rc;
//! use skipdex_crossbeam::EpochSkipList;
//!
//! let list: EpochSkipList<Rc<u8>> = EpochSkipList::new();
//! list.set("k", Rc::new(1));
//! ```
//!
//! ```compile_fail
//! use skipdex_crossbeam::EpochSkipList;
//!
//! let owner = String::from("scoped");
//! let list: EpochSkipList<&str> = EpochSkipList::new();
//! list.set("k", owner.as_str());
//! list.remove("k");
//! ```

use std::fmt;
use std::ops::Deref;

use crossbeam_epoch::{self as epoch, Guard as CrossbeamGuard};
use skipdex_core::guard::Guard;

/// Zero-sized guard that defers destruction to the global epoch collector.
///
/// Nothing is stored per list, so the guard adds no size to a `SkipList`
/// and places no extra bounds on where the list can be shared.
#[derive(Clone, Copy, Debug, Default)]
pub struct EpochGuard;

impl EpochGuard {
    pub fn new() -> Self {
        EpochGuard
    }
}

/// A reference that keeps the current thread pinned while it is alive.
///
/// Dropping the last `EpochRef` on a thread lets the collector reclaim
/// anything retired while it was held.
pub struct EpochRef<'a, T> {
    _pin: CrossbeamGuard,
    data: &'a T,
}

impl<'a, T> EpochRef<'a, T> {
    /// # Safety
    ///
    /// `data` must stay allocated for as long as `pin` is held.
    unsafe fn new(pin: CrossbeamGuard, data: &'a T) -> Self {
        EpochRef { _pin: pin, data }
    }

    /// The protected reference, bounded by this `EpochRef`.
    pub fn get(&self) -> &T {
        self.data
    }
}

impl<T> Deref for EpochRef<'_, T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        self.data
    }
}

impl<T: fmt::Debug> fmt::Debug for EpochRef<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EpochRef({:?})", self.data)
    }
}

impl Guard for EpochGuard {
    type GuardedRef<'a, T: 'a> = EpochRef<'a, T>;

    /// A real pin; iterators hold it for their whole walk.
    type ReadGuard = CrossbeamGuard;

    fn pin() -> Self::ReadGuard {
        epoch::pin()
    }

    unsafe fn defer_destroy<N: Send + 'static>(
        &self,
        ptr: *mut N,
        dealloc: unsafe fn(*mut N),
    ) {
        let pin = epoch::pin();
        unsafe {
            pin.defer_unchecked(move || dealloc(ptr));
        }
    }

    unsafe fn make_ref<'a, T: 'a>(ptr: *const T) -> Self::GuardedRef<'a, T> {
        // Pinning is reentrant, so this nests inside the caller's pin and
        // outlives it.
        unsafe { EpochRef::new(epoch::pin(), &*ptr) }
    }
}
