//! Deferred guard implementation for testing.
//!
//! `DeferredGuard` keeps every retired pointer until the guard itself is
//! dropped, which for a skip list means until the list is dropped.

#[cfg(debug_assertions)]
use std::collections::HashSet;
use std::ops::Deref;

use parking_lot::Mutex;

use super::Guard;

/// A guard that defers all destruction until it is dropped.
///
/// Useful for tests that want predictable destruction timing. Memory
/// retired by `remove` and by value replacement accumulates for the lifetime
/// of the list, so long-running programs should use `EpochGuard` instead.
///
pub struct DeferredGuard {
    deferred: Mutex<Vec<DeferredPtr>>,
    #[cfg(debug_assertions)]
    seen: Mutex<HashSet<usize>>,
}

struct DeferredPtr {
    ptr: *mut (),
    dealloc: unsafe fn(*mut ()),
}

// Safety: the pointer is only dereferenced by `dealloc` when the guard drops,
// and access to the list of pointers is serialized by the mutex.
unsafe impl Send for DeferredPtr {}

impl DeferredGuard {
    pub fn new() -> Self {
        DeferredGuard {
            deferred: Mutex::new(Vec::new()),
            #[cfg(debug_assertions)]
            seen: Mutex::new(HashSet::new()),
        }
    }

    /// Number of pointers waiting for destruction.
    pub fn pending(&self) -> usize {
        self.deferred.lock().len()
    }
}

impl Default for DeferredGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for DeferredGuard {
    fn drop(&mut self) {
        for retired in self.deferred.get_mut().drain(..) {
            unsafe {
                (retired.dealloc)(retired.ptr);
            }
        }
    }
}

/// A reference wrapper for `DeferredGuard`.
///
/// Retired memory lives as long as the guard, so a plain borrow is enough.
///
pub struct DeferredRef<'a, T> {
    data: &'a T,
}

impl<'a, T> DeferredRef<'a, T> {
    pub fn new(data: &'a T) -> Self {
        DeferredRef { data }
    }
}

impl<T> Deref for DeferredRef<'_, T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        self.data
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for DeferredRef<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "DeferredRef({:?})", self.data)
    }
}

impl Guard for DeferredGuard {
    type GuardedRef<'a, T: 'a> = DeferredRef<'a, T>;

    /// No-op: protection comes from the guard stored in the list.
    type ReadGuard = ();

    fn pin() -> Self::ReadGuard {}

    unsafe fn defer_destroy<N: Send + 'static>(
        &self,
        ptr: *mut N,
        dealloc: unsafe fn(*mut N),
    ) {
        // Zero-sized boxes all share one dangling address
        #[cfg(debug_assertions)]
        if std::mem::size_of::<N>() != 0 {
            let addr = ptr as usize;
            if !self.seen.lock().insert(addr) {
                panic!("DUPLICATE defer_destroy at {:#x}", addr);
            }
        }

        let retired = DeferredPtr {
            ptr: ptr as *mut (),
            dealloc: unsafe {
                std::mem::transmute::<unsafe fn(*mut N), unsafe fn(*mut ())>(dealloc)
            },
        };
        self.deferred.lock().push(retired);
    }

    unsafe fn make_ref<'a, T: 'a>(ptr: *const T) -> Self::GuardedRef<'a, T> {
        // Safety: caller guarantees ptr is valid for lifetime 'a
        DeferredRef::new(unsafe { &*ptr })
    }
}
