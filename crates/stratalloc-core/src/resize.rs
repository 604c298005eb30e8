//! The resize engine.
//!
//! Resizing prefers to keep the payload where it is: an equal request is
//! a no-op, a shrink carves the tail back into the cache, and a grow
//! first tries to absorb the free block that starts exactly at the
//! payload's end. Only when no adjacent inventory can cover the request
//! does the engine fall back to allocate-copy-release.

use core::ptr::NonNull;

use crate::align::size_align;
use crate::block::{Block, HEADER_SIZE};
use crate::metrics::{AllocMetrics, METRICS};
use crate::placement::{allocate, release};
use crate::thread_cache;

/// Resizes the block at `ptr` to a payload capacity of at least
/// `request` bytes, returning the (possibly moved) payload pointer.
///
/// A null `ptr` degenerates to [`allocate`]; a zero `request` degenerates
/// to [`release`] and returns `None`. When the result moves, the first
/// `min(old, request)` payload bytes are preserved.
///
/// # Safety
///
/// `ptr` must be null or a live payload pointer from this allocator. On
/// return the old pointer is invalid whenever the result differs from it.
pub unsafe fn resize(ptr: *mut u8, request: usize) -> Option<NonNull<u8>> {
    if ptr.is_null() {
        return allocate(request);
    }
    if request == 0 {
        // SAFETY: caller guarantees `ptr` is live.
        unsafe { release(ptr) };
        return None;
    }

    let size = size_align(request);
    // SAFETY: caller guarantees `ptr` is a live payload pointer.
    let block = unsafe { Block::from_payload(ptr) };
    let old = block.size();

    if old == size {
        AllocMetrics::inc(&METRICS.resizes_in_place);
        return NonNull::new(ptr);
    }

    if old > size {
        shrink(block, size);
        AllocMetrics::inc(&METRICS.resizes_in_place);
        return NonNull::new(ptr);
    }

    if absorb_right(block, size) {
        AllocMetrics::inc(&METRICS.resizes_absorbed);
        return NonNull::new(ptr);
    }

    // No adjacent inventory: move the payload.
    let fresh = allocate(size)?;
    // SAFETY: the regions cannot overlap (`fresh` was carved from free
    // inventory while `ptr`'s block is still live) and the old payload
    // holds at least `old` readable bytes.
    unsafe { core::ptr::copy_nonoverlapping(ptr, fresh.as_ptr(), old) };
    // SAFETY: `ptr` is live until this release.
    unsafe { release(ptr) };
    AllocMetrics::inc(&METRICS.resizes_moved);
    Some(fresh)
}

/// Carves the shrink remainder back into the cache when it is big enough
/// to stand as a block; otherwise leaves the capacity untouched.
fn shrink(block: Block, size: usize) {
    let old = block.size();
    if old > size + HEADER_SIZE {
        let tail_addr = (block.header_addr() + HEADER_SIZE + size) as *mut u8;
        // SAFETY: the tail range lies wholly inside the live payload the
        // caller owns.
        let tail = unsafe { Block::carve(tail_addr, old - size - HEADER_SIZE) };
        block.set_size(size);
        // SAFETY: the tail payload was just carved and is unreachable
        // elsewhere.
        unsafe { release(tail.payload_ptr()) };
    }
}

/// Tries to grow `block` in place by absorbing the free neighbor that
/// begins exactly at its end. Applies the split-or-hand-over rule against
/// the extended capacity. Returns false with the cache untouched when no
/// qualifying neighbor exists.
fn absorb_right(block: Block, size: usize) -> bool {
    let old = block.size();
    // The neighbor qualifies when old + H + neighbor >= size.
    let min_payload = (size - old).saturating_sub(HEADER_SIZE);
    let Some(neighbor) =
        thread_cache::with_cache(|cache| cache.take_adjacent_right(block.end_addr(), min_payload))
    else {
        return false;
    };

    block.set_size(old + HEADER_SIZE + neighbor.size());

    let extended = block.size();
    if extended > size + HEADER_SIZE {
        let remainder_addr = (block.header_addr() + HEADER_SIZE + size) as *mut u8;
        // SAFETY: the remainder range lies inside the just-extended block.
        let remainder = unsafe { Block::carve(remainder_addr, extended - size - HEADER_SIZE) };
        block.set_size(size);
        thread_cache::with_cache(|cache| cache.insert(remainder));
    }
    true
}
