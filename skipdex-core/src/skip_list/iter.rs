use std::marker::PhantomData;

use super::SkipList;
use super::element::{Element, ElementPtr};
use crate::guard::Guard;

/// Ascending iterator over a [`SkipList`].
///
/// Holds a read guard for its whole lifetime and advances with single
/// atomic loads of level-0 forward pointers, never taking the list's lock.
/// Each yielded item carries its own protection, so items may outlive the
/// iterator.
pub struct Iter<'a, V, G: Guard> {
    _guard: G::ReadGuard,
    next: ElementPtr<V>,
    _list: PhantomData<&'a SkipList<V, G>>,
}

impl<'a, V, G: Guard> Iter<'a, V, G> {
    pub(crate) fn new(guard: G::ReadGuard, first: ElementPtr<V>) -> Self {
        Iter {
            _guard: guard,
            next: first,
            _list: PhantomData,
        }
    }
}

impl<'a, V: 'a, G: Guard> Iterator for Iter<'a, V, G> {
    type Item = G::GuardedRef<'a, Element<V>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next.is_null() {
            return None;
        }

        let current = self.next;
        unsafe {
            self.next = (*current).forward_at(0);
            Some(G::make_ref(current))
        }
    }
}

impl<'a, V: 'a, G: Guard> std::iter::FusedIterator for Iter<'a, V, G> {}
