//! The heap extender.
//!
//! One contiguous anonymous mapping is reserved at first use and handed
//! out in grow-only slices by advancing a bump cursor. Extension requests
//! are serialized by the heap mutex, which protects nothing else and is
//! held only for the duration of one cursor advance (or the one-time
//! reservation). Memory is never returned to the OS.
//!
//! `MAP_NORESERVE` keeps the reservation cheap: pages are backed lazily
//! as blocks are actually touched.

use core::ptr::NonNull;

use parking_lot::Mutex;
use thiserror::Error;

use crate::align::WORD_ALIGN;
use crate::config;

/// Failure of the heap extender. Both variants are fatal to callers on the
/// allocation path; the placement engine converts them into a process
/// abort at its single out-of-memory boundary.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum HeapError {
    /// The one-time segment reservation failed.
    #[error("heap segment reservation of {requested} bytes failed")]
    ReserveFailed {
        /// Bytes asked of the OS.
        requested: usize,
    },
    /// The reserved segment cannot satisfy the extension.
    #[error("heap segment exhausted: {requested} bytes requested, {remaining} of {reserve} left")]
    SegmentExhausted {
        /// Bytes asked of the extender.
        requested: usize,
        /// Bytes still unclaimed in the segment.
        remaining: usize,
        /// Total segment reservation.
        reserve: usize,
    },
}

/// Reservation state behind the heap mutex. Addresses are stored as plain
/// integers; the segment lives for the rest of the process. A zero base
/// means the segment has not been reserved yet.
struct Segment {
    base: usize,
    reserve: usize,
    used: usize,
}

static HEAP: Mutex<Segment> = Mutex::new(Segment {
    base: 0,
    reserve: 0,
    used: 0,
});

/// Extends the heap by `len` bytes and returns the start of the new
/// region. The region is contiguous with the previous extension and its
/// start is word-aligned.
///
/// `len` must be a positive multiple of [`WORD_ALIGN`]; growth sizes
/// computed by the placement engine always are.
pub fn extend(len: usize) -> Result<NonNull<u8>, HeapError> {
    debug_assert!(len > 0 && len % WORD_ALIGN == 0);

    let mut segment = HEAP.lock();
    if segment.base == 0 {
        *segment = reserve_segment()?;
    }

    let remaining = segment.reserve - segment.used;
    if len > remaining {
        return Err(HeapError::SegmentExhausted {
            requested: len,
            remaining,
            reserve: segment.reserve,
        });
    }

    let start = segment.base + segment.used;
    segment.used += len;
    // SAFETY: start lies inside the non-null reserved mapping.
    Ok(unsafe { NonNull::new_unchecked(start as *mut u8) })
}

/// Total bytes handed out by the extender so far. Diagnostic.
#[must_use]
pub fn used_bytes() -> usize {
    HEAP.lock().used
}

fn reserve_segment() -> Result<Segment, HeapError> {
    let reserve = config::reserve_bytes();
    // SAFETY: anonymous private mapping; no fd, no offset, no aliasing.
    let raw = unsafe {
        libc::mmap(
            core::ptr::null_mut(),
            reserve,
            libc::PROT_READ | libc::PROT_WRITE,
            libc::MAP_PRIVATE | libc::MAP_ANONYMOUS | libc::MAP_NORESERVE,
            -1,
            0,
        )
    };
    if raw == libc::MAP_FAILED {
        return Err(HeapError::ReserveFailed { requested: reserve });
    }
    Ok(Segment {
        base: raw as usize,
        reserve,
        used: 0,
    })
}
