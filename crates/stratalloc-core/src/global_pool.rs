//! The shared overflow pool.
//!
//! One process-wide address-ordered free list behind a mutex. Every
//! hot-path access is a try-acquire: a thread that cannot take the mutex
//! immediately treats the pool as absent and proceeds to grow the heap.
//! That non-blocking discipline is load-bearing: it is what prevents
//! wait-chains between the pool and the heap mutex and what makes the
//! pool an overflow buffer rather than a serialization point.

use parking_lot::Mutex;

use crate::block::Block;
use crate::free_list::FreeList;
use crate::metrics::{AllocMetrics, METRICS};

struct Pool {
    list: Mutex<FreeList>,
}

// SAFETY: the list holds raw heap addresses; every access to it goes
// through the mutex, and the blocks it links are reachable from no other
// list while they sit here.
unsafe impl Sync for Pool {}

static GLOBAL_POOL: Pool = Pool {
    list: Mutex::new(FreeList::new()),
};

/// Probes the pool for the first block of capacity at least `size` and
/// unlinks it whole. Returns `None` when the mutex is contended or no
/// block fits; the two outcomes are deliberately indistinguishable to the
/// caller and are separated only in the metrics.
pub fn try_take_fit(size: usize) -> Option<Block> {
    let Some(mut list) = GLOBAL_POOL.list.try_lock() else {
        AllocMetrics::inc(&METRICS.global_contended);
        return None;
    };
    match list.take_first_fit(size) {
        Some(block) => {
            AllocMetrics::inc(&METRICS.global_hits);
            Some(block)
        }
        None => {
            AllocMetrics::inc(&METRICS.global_misses);
            None
        }
    }
}

/// Attempts to donate `block` to the pool with an ordered insert. On
/// mutex contention the block is returned to the caller, who releases it
/// into the local cache instead.
pub fn try_donate(block: Block) -> Result<(), Block> {
    let Some(mut list) = GLOBAL_POOL.list.try_lock() else {
        AllocMetrics::inc(&METRICS.donation_failures);
        return Err(block);
    };
    list.insert(block);
    AllocMetrics::inc(&METRICS.donations);
    Ok(())
}

/// `(header address, payload size)` of every pooled block, in address
/// order. Diagnostic; takes the mutex blockingly and must not be called
/// from an allocation path.
#[must_use]
pub fn snapshot() -> Vec<(usize, usize)> {
    GLOBAL_POOL.list.lock().snapshot()
}
