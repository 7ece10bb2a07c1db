//! Ordered byte-key index backed by a skip list.
//!
//! ```text
//! Level 2:  HEAD ──────────► 10 ────────────────────────────► NULL
//! Level 1:  HEAD ──────────► 10 ──────────► 30 ─────────────► NULL
//! Level 0:  HEAD ──────────► 10 ──► 20 ──► 30 ──► 40 ───────► NULL
//! ```
//!
//! # Concurrency
//!
//! `set`, `get` and `remove` are serialized by one exclusive lock; lookups
//! do not run in parallel with each other or with mutations.
//!
//! `front`, `Element::next` and the iterators never take that lock. They
//! are single atomic loads of a level-0 forward pointer, which is safe
//! because of the publish order in `set` and `remove`:
//!
//! - Insert: the new element's own forward pointers are all written before
//!   any predecessor is repointed at it. A reader that can reach the new
//!   element therefore never sees an uninitialized successor.
//! - Remove: predecessors are repointed past the element, but the element's
//!   own forward pointers are never touched again. A reader standing on a
//!   removed element keeps walking into the live chain.
//!
//! Iteration is weakly consistent: it may or may not observe concurrent
//! inserts and removes ahead of its position.
//!
//! # Memory reclamation
//!
//! Removed elements and values displaced by `set` are handed to the list's
//! [`Guard`], which frees them once no reader can still hold them. Every
//! returned reference is a `G::GuardedRef` that keeps its own protection.

mod element;
mod iter;
mod level;
mod search;

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::config::SkipListConfig;
use crate::error::ConfigError;
use crate::guard::Guard;

pub use element::Element;
pub use iter::Iter;

use element::ElementPtr;
use level::LevelGenerator;

/// State that is only meaningful while the mutation lock is held.
struct Writer<V> {
    levels: LevelGenerator,
    /// Predecessor at every level from the last search ("search fingers").
    fingers: Vec<ElementPtr<V>>,
}

/// An ordered key-value index over byte keys.
///
/// Keys are compared as unsigned byte strings, a shorter prefix sorting
/// first. Values are opaque.
///
/// ```rust
/// use skipdex_core::{DeferredGuard, SkipList};
///
/// let list: SkipList<u32, DeferredGuard> = SkipList::new();
/// list.set("b", 2);
/// list.set("a", 1);
///
/// let keys: Vec<Vec<u8>> = list.iter().map(|e| e.key().to_vec()).collect();
/// assert_eq!(keys, vec![b"a".to_vec(), b"b".to_vec()]);
/// assert_eq!(list.front().unwrap().key(), b"a");
/// ```
pub struct SkipList<V, G: Guard> {
    head: ElementPtr<V>,
    max_level: usize,
    len: AtomicUsize,
    writer: Mutex<Writer<V>>,
    /// Retired elements and values are deferred to this guard.
    guard: G,
}

impl<V, G: Guard> SkipList<V, G> {
    /// Create a list with the default max level (18) and probability (1/e).
    pub fn new() -> Self {
        Self::with_config(SkipListConfig::default())
    }

    /// Create a list whose elements never exceed `max_level` levels.
    ///
    /// # Panics
    ///
    /// Panics if `max_level` is outside `1..=64`.
    pub fn with_max_level(max_level: usize) -> Self {
        Self::with_config(SkipListConfig::default().with_max_level(max_level))
    }

    /// Create a list from a full configuration.
    ///
    /// # Panics
    ///
    /// Panics if the configuration is invalid. Use
    /// [`try_with_config`](Self::try_with_config) to handle that as an error.
    pub fn with_config(config: SkipListConfig) -> Self {
        match Self::try_with_config(config) {
            Ok(list) => list,
            Err(err) => panic!("invalid skip list configuration: {err}"),
        }
    }

    /// Create a list from a full configuration, rejecting invalid parameters.
    pub fn try_with_config(config: SkipListConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        debug!(
            max_level = config.max_level,
            probability = config.probability,
            seeded = config.seed.is_some(),
            "creating skip list"
        );

        Ok(SkipList {
            head: Element::alloc_sentinel(config.max_level),
            max_level: config.max_level,
            len: AtomicUsize::new(0),
            writer: Mutex::new(Writer {
                levels: LevelGenerator::new(config.probability, config.max_level, config.seed),
                fingers: vec![std::ptr::null_mut(); config.max_level],
            }),
            guard: G::default(),
        })
    }

    /// Upper bound on element height.
    pub fn max_level(&self) -> usize {
        self.max_level
    }

    /// Current leveling probability.
    pub fn probability(&self) -> f64 {
        self.writer.lock().levels.probability()
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.len.load(Ordering::Acquire)
    }

    /// `true` when no element is linked.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The guard that retired elements are deferred to.
    pub fn guard(&self) -> &G {
        &self.guard
    }

    /// Change the probability used for future height draws.
    ///
    /// Existing elements keep their heights. Taking `&mut self` means no
    /// `set` or `remove` can run concurrently with the change.
    ///
    /// `probability` must lie in `[0, 1]`, the range `SkipListConfig`
    /// accepts. Debug builds panic otherwise; release builds saturate, so a
    /// value above 1 behaves as 1 and anything below 0 (or NaN) as 0.
    pub fn set_probability(&mut self, probability: f64) {
        debug_assert!(
            (0.0..=1.0).contains(&probability),
            "probability must be in [0, 1], got {probability}"
        );
        debug!(probability, "changing skip list probability");
        self.writer.get_mut().levels.set_probability(probability);
    }

    /// Insert `value` under `key`, or replace the value if `key` is present.
    ///
    /// Returns the live element. Replacing a value never changes the
    /// element's height or position.
    ///
    /// The displaced value is retired through the guard and may be dropped
    /// on another thread, hence `V: Send + 'static`.
    pub fn set<K: AsRef<[u8]>>(&self, key: K, value: V) -> G::GuardedRef<'_, Element<V>>
    where
        V: Send + 'static,
    {
        let key = key.as_ref();
        let _read = G::pin();

        let mut writer = self.writer.lock();
        let Writer { levels, fingers } = &mut *writer;

        unsafe {
            let candidate = search::find_fingers(self.head, self.max_level, key, fingers);

            if let Some(existing) = search::matching(candidate, key) {
                let previous = (*existing).swap_value(value);
                self.guard.defer_destroy(previous, Element::<V>::dealloc_value);

                trace!(key_len = key.len(), "replaced value in place");
                return G::make_ref(existing);
            }

            let height = levels.random_level();
            let element = Element::alloc_with_key(Box::from(key), value, height);

            // Fully initialize the tower before it becomes reachable.
            for (level, &pred) in fingers.iter().enumerate().take(height) {
                (*element).set_forward(level, (*pred).forward_at(level));
            }
            for (level, &pred) in fingers.iter().enumerate().take(height) {
                (*pred).set_forward(level, element);
            }

            self.len.fetch_add(1, Ordering::Release);
            trace!(key_len = key.len(), height, "inserted element");

            G::make_ref(element)
        }
    }

    /// Look up the element stored under exactly `key`.
    pub fn get<K: AsRef<[u8]>>(&self, key: K) -> Option<G::GuardedRef<'_, Element<V>>> {
        let key = key.as_ref();
        let _read = G::pin();

        let found = {
            let _writer = self.writer.lock();
            unsafe { search::find_candidate(self.head, self.max_level, key) }
        };

        found.map(|element| unsafe { G::make_ref(element) })
    }

    /// Whether an element is stored under exactly `key`.
    pub fn contains_key<K: AsRef<[u8]>>(&self, key: K) -> bool {
        self.get(key).is_some()
    }

    /// Unlink the element stored under `key` from every level.
    ///
    /// Returns the removed element, which stays readable through the
    /// returned reference. Its forward pointers are left as they were.
    pub fn remove<K: AsRef<[u8]>>(&self, key: K) -> Option<G::GuardedRef<'_, Element<V>>>
    where
        V: Send + 'static,
    {
        let key = key.as_ref();
        let _read = G::pin();

        let mut writer = self.writer.lock();
        let fingers = &mut writer.fingers;

        unsafe {
            let candidate = search::find_fingers(self.head, self.max_level, key, fingers);
            let element = search::matching(candidate, key)?;

            for (level, &pred) in fingers.iter().enumerate().take((*element).height()) {
                debug_assert_eq!((*pred).forward_at(level), element);
                (*pred).set_forward(level, (*element).forward_at(level));
            }

            self.len.fetch_sub(1, Ordering::Release);
            self.guard.defer_destroy(element, Element::<V>::dealloc_element);

            trace!(key_len = key.len(), height = (*element).height(), "removed element");
            Some(G::make_ref(element))
        }
    }

    /// The first element in ascending key order.
    ///
    /// Lock-free: a single atomic load of the head's level-0 pointer.
    pub fn front(&self) -> Option<G::GuardedRef<'_, Element<V>>> {
        let _read = G::pin();
        let first = unsafe { (*self.head).forward_at(0) };

        if first.is_null() {
            None
        } else {
            Some(unsafe { G::make_ref(first) })
        }
    }

    /// Iterate every element in ascending key order without taking the lock.
    pub fn iter(&self) -> Iter<'_, V, G> {
        let read = G::pin();
        let first = unsafe { (*self.head).forward_at(0) };
        Iter::new(read, first)
    }

    /// Iterate from the first element whose key is `>= key`.
    ///
    /// Locating the start point takes the lock; walking from it does not.
    pub fn iter_from<K: AsRef<[u8]>>(&self, key: K) -> Iter<'_, V, G> {
        let read = G::pin();

        let start = {
            let _writer = self.writer.lock();
            unsafe { search::find_lower_bound(self.head, self.max_level, key.as_ref()) }
        };

        Iter::new(read, start)
    }

    /// Snapshot of every key in ascending order.
    pub fn keys(&self) -> Vec<Vec<u8>> {
        self.iter().map(|element| element.key().to_vec()).collect()
    }

    /// Walk every level and panic on any structural violation.
    ///
    /// Checks that each level is strictly ascending, only holds elements
    /// tall enough for it, is a subsequence of level 0, and that level 0
    /// holds exactly `len()` elements.
    pub(crate) fn check_invariants(&self) {
        let _writer = self.writer.lock();

        unsafe {
            let mut level_zero = std::collections::HashSet::new();
            let mut curr = (*self.head).forward_at(0);
            while !curr.is_null() {
                level_zero.insert(curr as usize);
                curr = (*curr).forward_at(0);
            }

            assert_eq!(
                level_zero.len(),
                self.len(),
                "INVARIANT VIOLATION: level 0 holds {} elements, len is {}",
                level_zero.len(),
                self.len()
            );

            for level in 0..self.max_level {
                let mut prev: Option<&[u8]> = None;
                let mut curr = (*self.head).forward_at(level);

                while !curr.is_null() {
                    let element = &*curr;
                    assert!(
                        element.height() > level,
                        "INVARIANT VIOLATION: element of height {} linked at level {}",
                        element.height(),
                        level
                    );
                    assert!(
                        level_zero.contains(&(curr as usize)),
                        "INVARIANT VIOLATION: element at level {} missing from level 0",
                        level
                    );
                    if let Some(prev) = prev {
                        assert!(
                            prev < element.key(),
                            "INVARIANT VIOLATION: level {} not strictly ascending",
                            level
                        );
                    }
                    prev = Some(element.key());
                    curr = element.forward_at(level);
                }
            }
        }
    }
}

impl<V, G: Guard> Default for SkipList<V, G> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V, G: Guard> fmt::Debug for SkipList<V, G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SkipList")
            .field("max_level", &self.max_level)
            .field("probability", &self.probability())
            .field("len", &self.len())
            .finish()
    }
}

impl<V, G: Guard> Drop for SkipList<V, G> {
    fn drop(&mut self) {
        // Linked elements are freed here; removed ones belong to the guard.
        unsafe {
            let mut curr = (*self.head).forward_at(0);
            while !curr.is_null() {
                let next = (*curr).forward_at(0);
                Element::dealloc_element(curr);
                curr = next;
            }

            Element::dealloc_element(self.head);
        }
    }
}

// Safety: elements are only mutated under the writer lock or through atomic
// slots, and retired memory goes through the guard.
unsafe impl<V: Send, G: Guard> Send for SkipList<V, G> {}
unsafe impl<V: Send + Sync, G: Guard> Sync for SkipList<V, G> {}
