//! Memory reclamation strategies for skip list elements.
//!
//! Iteration reads forward pointers without taking the list's mutation lock,
//! so an element unlinked by `remove` (or a value displaced by `set`) may
//! still be in use by a reader that reached it earlier. The `Guard` trait
//! decides when such memory is actually released:
//!
//! ```text
//! SkipList<V, G: Guard>
//!     │
//!     ├── SkipList<V, EpochGuard>      (production, skipdex-crossbeam)
//!     └── SkipList<V, DeferredGuard>   (testing)
//! ```
//!
//! # Example
//!
//! ```rust
//! use skipdex_core::{DeferredGuard, SkipList};
//!
//! let list: SkipList<u32, DeferredGuard> = SkipList::new();
//! list.set("a", 1);
//! assert_eq!(*list.get("a").unwrap().value(), 1);
//! ```

mod deferred_guard;

use std::ops::Deref;

pub use deferred_guard::{DeferredGuard, DeferredRef};

/// Decides when memory retired by a skip list is released.
///
/// # Safety Contract
///
/// An implementation must never run a `dealloc` passed to `defer_destroy`
/// while a `ReadGuard` or `GuardedRef` created before that call is alive.
///
/// One guard value is stored per list and used only to retire memory, so it
/// must be `Send + Sync`. Readers protect themselves through `pin`.
pub trait Guard: Sized + Default + Send + Sync {
    /// Element or value reference that carries its own protection.
    type GuardedRef<'a, T: 'a>: Deref<Target = T>;

    /// Protection held by an iterator for the length of its walk.
    type ReadGuard: Sized;

    /// Start protecting the calling thread's reads.
    fn pin() -> Self::ReadGuard;

    /// Hand `ptr` over for release once current readers are done.
    ///
    /// # Safety
    ///
    /// `ptr` must already be unlinked so that no new reader can find it, it
    /// must not be retired twice, and `dealloc` must match its allocation.
    ///
    /// `N: Send + 'static` because `dealloc` may run on another thread, after
    /// the list and anything it borrowed are gone.
    unsafe fn defer_destroy<N: Send + 'static>(
        &self,
        ptr: *mut N,
        dealloc: unsafe fn(*mut N),
    );

    /// Wrap `ptr` into a reference that keeps it alive.
    ///
    /// # Safety
    ///
    /// The caller must be pinned and `ptr` must not yet have been released.
    unsafe fn make_ref<'a, T: 'a>(ptr: *const T) -> Self::GuardedRef<'a, T>;
}
