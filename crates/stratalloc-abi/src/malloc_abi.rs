//! ABI layer for the allocation entry points (`malloc`, `free`, `calloc`,
//! `realloc`, `malloc_usable_size`).
//!
//! Thin shims over `stratalloc-core`: null-pointer conventions and the
//! zero-size contracts live in the core; this layer only adapts
//! signatures. Alignment guarantees stop at the word size: a
//! `GlobalAlloc` caller asking for more gets a null, which Rust treats as
//! allocation failure.

use core::alloc::{GlobalAlloc, Layout};
#[cfg(feature = "c-export")]
use core::ffi::c_void;
use core::ptr::null_mut;

#[cfg(feature = "c-export")]
use stratalloc_core::usable_size;
use stratalloc_core::{WORD_ALIGN, allocate, release, resize, zeroed};

/// The allocator as a `#[global_allocator]` candidate.
pub struct StratAlloc;

unsafe impl GlobalAlloc for StratAlloc {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        if layout.align() > WORD_ALIGN {
            return null_mut();
        }
        match allocate(layout.size().max(1)) {
            Some(payload) => payload.as_ptr(),
            None => null_mut(),
        }
    }

    unsafe fn dealloc(&self, ptr: *mut u8, _layout: Layout) {
        // SAFETY: GlobalAlloc contract: `ptr` came from `alloc` on self.
        unsafe { release(ptr) };
    }

    unsafe fn alloc_zeroed(&self, layout: Layout) -> *mut u8 {
        if layout.align() > WORD_ALIGN {
            return null_mut();
        }
        match zeroed(layout.size().max(1), 1) {
            Some(payload) => payload.as_ptr(),
            None => null_mut(),
        }
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        if layout.align() > WORD_ALIGN {
            return null_mut();
        }
        // SAFETY: GlobalAlloc contract: `ptr` came from `alloc` on self.
        match unsafe { resize(ptr, new_size.max(1)) } {
            Some(payload) => payload.as_ptr(),
            None => null_mut(),
        }
    }
}

/// POSIX `malloc` -- allocates `size` bytes of uninitialized memory.
///
/// Returns null for a zero `size`.
///
/// # Safety
///
/// Caller must eventually `free` the returned pointer exactly once.
#[cfg(feature = "c-export")]
#[unsafe(no_mangle)]
pub unsafe extern "C" fn malloc(size: usize) -> *mut c_void {
    match allocate(size) {
        Some(payload) => payload.as_ptr().cast(),
        None => null_mut(),
    }
}

/// POSIX `free` -- releases memory from `malloc`/`calloc`/`realloc`.
///
/// A null `ptr` is a no-op.
///
/// # Safety
///
/// `ptr` must be null or a pointer returned by this allocator, not yet
/// freed.
#[cfg(feature = "c-export")]
#[unsafe(no_mangle)]
pub unsafe extern "C" fn free(ptr: *mut c_void) {
    // SAFETY: caller upholds the free contract.
    unsafe { release(ptr.cast()) };
}

/// POSIX `calloc` -- allocates `nmemb * size` bytes, zero-filled.
///
/// Returns null when either count is zero or the product overflows.
///
/// # Safety
///
/// Caller must eventually `free` the returned pointer exactly once.
#[cfg(feature = "c-export")]
#[unsafe(no_mangle)]
pub unsafe extern "C" fn calloc(nmemb: usize, size: usize) -> *mut c_void {
    match zeroed(nmemb, size) {
        Some(payload) => payload.as_ptr().cast(),
        None => null_mut(),
    }
}

/// POSIX `realloc` -- resizes a block, possibly moving it.
///
/// Null `ptr` behaves as `malloc(size)`; zero `size` frees and returns
/// null.
///
/// # Safety
///
/// `ptr` must be null or a live pointer from this allocator; it is
/// invalid after a call that returns a different pointer.
#[cfg(feature = "c-export")]
#[unsafe(no_mangle)]
pub unsafe extern "C" fn realloc(ptr: *mut c_void, size: usize) -> *mut c_void {
    // SAFETY: caller upholds the realloc contract.
    match unsafe { resize(ptr.cast(), size) } {
        Some(payload) => payload.as_ptr().cast(),
        None => null_mut(),
    }
}

/// glibc `malloc_usable_size` -- capacity of the block backing `ptr`.
///
/// # Safety
///
/// `ptr` must be null or a live pointer from this allocator.
#[cfg(feature = "c-export")]
#[unsafe(no_mangle)]
pub unsafe extern "C" fn malloc_usable_size(ptr: *mut c_void) -> usize {
    // SAFETY: caller upholds the liveness contract.
    unsafe { usable_size(ptr.cast()) }
}
