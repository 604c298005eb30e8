//! The placement engine.
//!
//! Allocation walks three tiers in order: the thread cache (first-fit,
//! no locks), the global pool (one try-acquire probe), then heap growth.
//! Growth always carves two blocks and tries to donate one, so the pool
//! is continuously reseeded and later threads can allocate without
//! growing. Release is an ordered insert into the releasing thread's
//! cache with bi-directional coalescing.
//!
//! Cross-thread donation deliberately funnels through the requesting
//! thread's cache rather than being returned directly: the migrated
//! block lands next to that thread's other inventory and stays eligible
//! for coalescing and splitting like any local block.

use core::ptr::NonNull;

use crate::align::{CHUNK_SIZE, size_align};
use crate::block::{Block, HEADER_SIZE};
use crate::global_pool;
use crate::heap::{self, HeapError};
use crate::metrics::{AllocMetrics, METRICS};
use crate::thread_cache;

/// Allocates a block with payload capacity at least `request` bytes,
/// aligned to the word size.
///
/// Returns `None` only for a zero-size request. Heap-extender failure
/// does not surface here: the allocation contract has no error path, so
/// exhaustion aborts the process.
pub fn allocate(request: usize) -> Option<NonNull<u8>> {
    if request == 0 {
        return None;
    }
    let size = size_align(request);

    // Step 1: local first-fit.
    if let Some(block) = thread_cache::with_cache(|cache| cache.allocate_first_fit(size)) {
        AllocMetrics::inc(&METRICS.local_hits);
        return NonNull::new(block.payload_ptr());
    }

    // Step 2: probe the global pool, non-blockingly. A migrated block is
    // freed into the local cache first, then claimed by a second local
    // walk, so it merges with existing inventory before any split.
    if let Some(migrated) = global_pool::try_take_fit(size) {
        let refit = thread_cache::with_cache(|cache| {
            cache.insert(migrated);
            cache.allocate_first_fit(size)
        });
        if let Some(block) = refit {
            return NonNull::new(block.payload_ptr());
        }
    }

    // Step 3: grow the heap.
    if size > CHUNK_SIZE - HEADER_SIZE {
        grow_large(size)
    } else {
        grow_small(size)
    }
}

/// Releases the payload pointer `ptr` into the calling thread's cache.
/// A null pointer is ignored.
///
/// # Safety
///
/// `ptr` must be null or a payload pointer obtained from [`allocate`],
/// [`crate::resize::resize`], or a zeroed allocation, not yet released.
pub unsafe fn release(ptr: *mut u8) {
    if ptr.is_null() {
        return;
    }
    // SAFETY: caller guarantees `ptr` is a live payload pointer.
    let block = unsafe { Block::from_payload(ptr) };
    thread_cache::with_cache(|cache| cache.insert(block));
    AllocMetrics::inc(&METRICS.releases);
}

/// Allocates `nitems * size` bytes and fills them with zero.
///
/// Returns `None` when either count is zero or their product overflows.
/// The zeroed extent is the word-aligned request size,
/// `size_align(nitems * size)` bytes, which is also the minimum capacity
/// of the returned block.
pub fn zeroed(nitems: usize, size: usize) -> Option<NonNull<u8>> {
    if nitems == 0 || size == 0 {
        return None;
    }
    let total = nitems.checked_mul(size)?;
    let aligned = size_align(total);
    let payload = allocate(aligned)?;
    // SAFETY: the block's capacity is at least `aligned`.
    unsafe { core::ptr::write_bytes(payload.as_ptr(), 0, aligned) };
    Some(payload)
}

/// Payload capacity recorded in the header of the live block at `ptr`.
/// Zero for null.
///
/// # Safety
///
/// `ptr` must be null or a live payload pointer from this allocator.
#[must_use]
pub unsafe fn usable_size(ptr: *mut u8) -> usize {
    if ptr.is_null() {
        return 0;
    }
    // SAFETY: caller guarantees `ptr` is a live payload pointer.
    unsafe { Block::from_payload(ptr) }.size()
}

/// Large-request growth: extend by `2 * size + 2 * H`, carve two equal
/// blocks, donate one, return the other live.
fn grow_large(size: usize) -> Option<NonNull<u8>> {
    let region = heap::extend(2 * size + 2 * HEADER_SIZE).unwrap_or_else(|err| fatal(err));
    AllocMetrics::inc(&METRICS.large_growths);

    // SAFETY: the extender handed us 2 * (H + size) fresh bytes; the two
    // carves tile them exactly.
    let kept = unsafe { Block::carve(region.as_ptr(), size) };
    let spare = unsafe { Block::carve(region.as_ptr().add(HEADER_SIZE + size), size) };

    if let Err(spare) = global_pool::try_donate(spare) {
        // Contended pool: the spare half stays local as cache inventory.
        thread_cache::with_cache(|cache| cache.insert(spare));
    }

    NonNull::new(kept.payload_ptr())
}

/// Small-request growth: extend by two chunks, donate the second, insert
/// the retained span into the cache, and satisfy the request from it.
fn grow_small(size: usize) -> Option<NonNull<u8>> {
    debug_assert!(size <= CHUNK_SIZE - HEADER_SIZE);
    let region = heap::extend(2 * CHUNK_SIZE).unwrap_or_else(|err| fatal(err));
    AllocMetrics::inc(&METRICS.small_growths);

    // SAFETY: the second chunk starts exactly one chunk into the fresh
    // region and tiles the rest of it.
    let spare = unsafe { Block::carve(region.as_ptr().add(CHUNK_SIZE), CHUNK_SIZE - HEADER_SIZE) };
    let retained_payload = match global_pool::try_donate(spare) {
        // Donation failed: the retained span swallows the whole region,
        // and the spare header just wrote becomes ordinary payload bytes.
        Err(_spare) => 2 * CHUNK_SIZE - HEADER_SIZE,
        Ok(()) => CHUNK_SIZE - HEADER_SIZE,
    };
    // SAFETY: the retained span starts at the region base and lies inside
    // the fresh extension either way.
    let retained = unsafe { Block::carve(region.as_ptr(), retained_payload) };

    let block = thread_cache::with_cache(|cache| {
        cache.insert(retained);
        cache.allocate_first_fit(size)
    })?;
    NonNull::new(block.payload_ptr())
}

/// The single out-of-memory boundary. The allocation API has no error
/// path, so extender failure ends the process.
fn fatal(err: HeapError) -> ! {
    eprintln!("stratalloc: fatal: {err}");
    std::process::abort()
}
