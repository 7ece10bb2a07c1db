use std::alloc::{Layout, alloc, dealloc};
use std::fmt;
use std::marker::PhantomData;
use std::ptr;
use std::sync::atomic::{AtomicPtr, Ordering};

pub(crate) type ElementPtr<V> = *mut Element<V>;

// ============================================================================
// Element - one key/value pair with its tower of forward pointers
// ============================================================================

/// A stored key/value pair.
///
/// Uses the flexible array member pattern:
/// - Single allocation per element
/// - Forward pointers are inline after the struct fields
/// - Layout: [header][forward[0..h]] where h = height
///
/// The sentinel head is an `Element` too, with an empty key, no value and
/// one forward slot per level of the list, so search and splice code never
/// distinguishes "before the first element" from a real predecessor.
///
#[repr(C)]
pub struct Element<V> {
    key: Box<[u8]>,
    value: AtomicPtr<V>,
    height: usize,
    _marker: PhantomData<Box<V>>,
    // Flexible array: forward pointers are allocated inline after this struct
    forward: [AtomicPtr<Element<V>>; 0],
}

impl<V> Element<V> {
    /// Calculate layout for an element with given height
    fn get_layout(height: usize) -> Layout {
        Layout::new::<Self>()
            .extend(Layout::array::<AtomicPtr<Self>>(height).expect("tower fits in memory"))
            .expect("tower fits in memory")
            .0
            .pad_to_align()
    }

    fn alloc_raw(key: Box<[u8]>, value: *mut V, height: usize) -> ElementPtr<V> {
        unsafe {
            let layout = Self::get_layout(height);
            let ptr = alloc(layout) as *mut Self;
            if ptr.is_null() {
                std::alloc::handle_alloc_error(layout);
            }

            ptr::write(ptr::addr_of_mut!((*ptr).key), key);
            ptr::write(ptr::addr_of_mut!((*ptr).value), AtomicPtr::new(value));
            ptr::write(ptr::addr_of_mut!((*ptr).height), height);
            ptr::write(ptr::addr_of_mut!((*ptr)._marker), PhantomData);

            let forward_base = ptr::addr_of_mut!((*ptr).forward) as *mut AtomicPtr<Self>;
            for i in 0..height {
                ptr::write(forward_base.add(i), AtomicPtr::new(ptr::null_mut()));
            }

            ptr
        }
    }

    /// Allocate an element with all forward pointers null.
    pub(crate) fn alloc_with_key(key: Box<[u8]>, value: V, height: usize) -> ElementPtr<V> {
        Self::alloc_raw(key, Box::into_raw(Box::new(value)), height)
    }

    /// Allocate the sentinel head (empty key, no value).
    pub(crate) fn alloc_sentinel(height: usize) -> ElementPtr<V> {
        Self::alloc_raw(Box::default(), ptr::null_mut(), height)
    }

    /// Deallocate an element together with its current value.
    ///
    /// # Safety
    /// The pointer must have been allocated by `alloc_with_key` or
    /// `alloc_sentinel`, and no reader may still reach it.
    pub(crate) unsafe fn dealloc_element(ptr: ElementPtr<V>) {
        unsafe {
            let layout = Self::get_layout((*ptr).height);

            let value = (*ptr).value.load(Ordering::Relaxed);
            if !value.is_null() {
                Self::dealloc_value(value);
            }
            ptr::drop_in_place(&mut (*ptr).key);

            dealloc(ptr as *mut u8, layout);
        }
    }

    /// Free a value displaced by `swap_value`.
    ///
    /// # Safety
    /// `value` must have come from this element's value slot and be
    /// unreachable by new readers.
    pub(crate) unsafe fn dealloc_value(value: *mut V) {
        unsafe { drop(Box::from_raw(value)) }
    }

    #[inline]
    pub(crate) fn is_sentinel(&self) -> bool {
        self.value.load(Ordering::Relaxed).is_null()
    }

    /// Replace the value in place, returning the previous one.
    #[inline]
    pub(crate) fn swap_value(&self, value: V) -> *mut V {
        self.value
            .swap(Box::into_raw(Box::new(value)), Ordering::AcqRel)
    }

    // =========================================================================
    // Forward pointer accessors (indices 0..height)
    // =========================================================================

    #[inline]
    unsafe fn slot(&self, level: usize) -> &AtomicPtr<Element<V>> {
        debug_assert!(level < self.height, "level {} >= height {}", level, self.height);
        unsafe { &*self.forward.as_ptr().add(level) }
    }

    /// Load forward pointer at level (Acquire ordering)
    #[inline]
    pub(crate) fn forward_at(&self, level: usize) -> ElementPtr<V> {
        unsafe { self.slot(level).load(Ordering::Acquire) }
    }

    /// Store forward pointer at level (Release ordering)
    #[inline]
    pub(crate) fn set_forward(&self, level: usize, next: ElementPtr<V>) {
        unsafe { self.slot(level).store(next, Ordering::Release) }
    }

    // =========================================================================
    // Public accessors
    // =========================================================================

    /// The key this element was inserted with.
    #[inline]
    pub fn key(&self) -> &[u8] {
        &self.key
    }

    /// The current value.
    ///
    /// A concurrent `set` of the same key may replace the value; the one
    /// returned here stays valid for as long as this reference does.
    #[inline]
    pub fn value(&self) -> &V {
        let value = self.value.load(Ordering::Acquire);
        debug_assert!(!value.is_null(), "value requested from sentinel");
        unsafe { &*value }
    }

    /// Number of levels this element participates in.
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// The ascending successor, or `None` at the end of the list.
    ///
    /// This is a single atomic load of the level-0 forward pointer and never
    /// takes the list's mutation lock. If this element was removed after the
    /// caller reached it, the frozen pointer still leads into the live chain.
    #[inline]
    pub fn next(&self) -> Option<&Element<V>> {
        unsafe { self.forward_at(0).as_ref() }
    }
}

impl<V: fmt::Debug> fmt::Debug for Element<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Element");
        s.field("key", &String::from_utf8_lossy(&self.key));
        if !self.is_sentinel() {
            s.field("value", self.value());
        }
        s.field("height", &self.height).finish()
    }
}
