//! Per-thread free-list cache.
//!
//! Each thread owns one address-ordered free list reached through TLS.
//! No lock guards it: only the owning thread ever touches it, which is
//! what keeps the allocation hot path serialization-free. Blocks migrate
//! between threads solely via the global pool.
//!
//! Cache inventory is abandoned when its thread exits; there is no
//! eviction.

use std::cell::RefCell;

use crate::free_list::FreeList;

thread_local! {
    static LOCAL_CACHE: RefCell<FreeList> = const { RefCell::new(FreeList::new()) };
}

/// Runs `f` with exclusive access to the calling thread's cache.
pub fn with_cache<R>(f: impl FnOnce(&mut FreeList) -> R) -> R {
    LOCAL_CACHE.with(|cache| f(&mut cache.borrow_mut()))
}

/// `(header address, payload size)` of every cached block, in address
/// order. Diagnostic.
#[must_use]
pub fn snapshot() -> Vec<(usize, usize)> {
    with_cache(|cache| cache.snapshot())
}
