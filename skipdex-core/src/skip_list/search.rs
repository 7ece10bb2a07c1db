//! Level-descending predecessor search.
//!
//! ```text
//! search "35"
//!
//! Level 2:  HEAD ──────────► 10 ───────────────────────────► NULL
//!                             │ (drop)
//! Level 1:  HEAD ──────────► 10 ──────────► 30 ────────────► NULL
//!                                            │ (drop)
//! Level 0:  HEAD ──────────► 10 ──► 20 ──► 30 ──► 40 ──────► NULL
//!                                            ▲     ▲
//!                                         finger candidate
//! ```
//!
//! At every level the walk advances while the successor's key is strictly
//! less than the search key, records its position, and drops a level without
//! returning to the head. The level-0 successor of the final position is the
//! candidate match.

use super::element::ElementPtr;

/// Walk from `head` down to level 0, reporting the rightmost element with a
/// key strictly below `key` at every level. Returns the level-0 successor of
/// the final position.
///
/// # Safety
/// `head` must be a valid sentinel with `max_level` levels, and every
/// element reachable from it must stay allocated for the duration of the
/// call.
#[inline]
unsafe fn descend<V, F>(
    head: ElementPtr<V>,
    max_level: usize,
    key: &[u8],
    mut record: F,
) -> ElementPtr<V>
where
    F: FnMut(usize, ElementPtr<V>),
{
    let mut pred = head;
    let mut next = std::ptr::null_mut();

    for level in (0..max_level).rev() {
        unsafe {
            next = (*pred).forward_at(level);

            while !next.is_null() && (*next).key() < key {
                pred = next;
                next = (*next).forward_at(level);
            }
        }

        record(level, pred);
    }

    next
}

/// Locate the element whose key equals `key`, if any.
///
/// # Safety
/// See [`descend`].
pub(crate) unsafe fn find_candidate<V>(
    head: ElementPtr<V>,
    max_level: usize,
    key: &[u8],
) -> Option<ElementPtr<V>> {
    let candidate = unsafe { descend(head, max_level, key, |_, _| {}) };
    unsafe { matching(candidate, key) }
}

/// Fill `fingers[level]` with the predecessor at every level and return the
/// level-0 candidate (which may hold a greater key, or be null).
///
/// # Safety
/// See [`descend`]. `fingers` must hold at least `max_level` slots.
pub(crate) unsafe fn find_fingers<V>(
    head: ElementPtr<V>,
    max_level: usize,
    key: &[u8],
    fingers: &mut [ElementPtr<V>],
) -> ElementPtr<V> {
    debug_assert!(fingers.len() >= max_level);
    unsafe { descend(head, max_level, key, |level, pred| fingers[level] = pred) }
}

/// First element whose key is greater than or equal to `key`.
///
/// # Safety
/// See [`descend`].
pub(crate) unsafe fn find_lower_bound<V>(
    head: ElementPtr<V>,
    max_level: usize,
    key: &[u8],
) -> ElementPtr<V> {
    unsafe { descend(head, max_level, key, |_, _| {}) }
}

/// Narrow a candidate to an exact key match.
///
/// Equality is tested explicitly rather than inferred from ordering, so a
/// broken ordering elsewhere surfaces as a miss instead of a wrong element.
///
/// # Safety
/// `candidate` must be null or valid.
#[inline]
pub(crate) unsafe fn matching<V>(candidate: ElementPtr<V>, key: &[u8]) -> Option<ElementPtr<V>> {
    let found = !candidate.is_null() && unsafe { (*candidate).key() } == key;
    found.then_some(candidate)
}
