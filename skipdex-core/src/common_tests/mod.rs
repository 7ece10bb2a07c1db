//! Test suites shared by every `Guard` implementation.
//!
//! The functions here are generic over the guard and are driven from the
//! `tests/` directories of `skipdex-core` (with `DeferredGuard`) and
//! `skipdex-crossbeam` (with `EpochGuard`).


/// Big-endian encoding, so byte order matches numeric order.
pub fn ordered_key(i: u64) -> [u8; 8] {
    i.to_be_bytes()
}

/// Inverse of [`ordered_key`].
pub fn ordered_key_value(key: &[u8]) -> u64 {
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(key);
    u64::from_be_bytes(bytes)
}
