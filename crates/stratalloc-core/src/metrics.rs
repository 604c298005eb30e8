//! Atomic counters for allocator observability.
//!
//! All counters use relaxed ordering — they are advisory/diagnostic,
//! not synchronization primitives. The snapshot is a plain-data copy
//! that serializes to JSON for offline inspection.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Global allocation-path counters.
pub struct AllocMetrics {
    /// Requests satisfied by the thread cache on the first walk.
    pub local_hits: AtomicU64,
    /// Global-pool probes that found and migrated a block.
    pub global_hits: AtomicU64,
    /// Global-pool probes skipped because the mutex was contended.
    pub global_contended: AtomicU64,
    /// Global-pool probes that found nothing adequate.
    pub global_misses: AtomicU64,
    /// Heap growths on the small path (two chunks).
    pub small_growths: AtomicU64,
    /// Heap growths on the large path (two equal blocks).
    pub large_growths: AtomicU64,
    /// Blocks donated to the global pool.
    pub donations: AtomicU64,
    /// Donations abandoned to the local cache on mutex contention.
    pub donation_failures: AtomicU64,
    /// Releases into a thread cache.
    pub releases: AtomicU64,
    /// Resizes satisfied without moving the payload.
    pub resizes_in_place: AtomicU64,
    /// Resizes that grew by absorbing the adjacent free neighbor.
    pub resizes_absorbed: AtomicU64,
    /// Resizes that fell back to allocate-copy-release.
    pub resizes_moved: AtomicU64,
}

impl AllocMetrics {
    /// Creates a zeroed metrics instance.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            local_hits: AtomicU64::new(0),
            global_hits: AtomicU64::new(0),
            global_contended: AtomicU64::new(0),
            global_misses: AtomicU64::new(0),
            small_growths: AtomicU64::new(0),
            large_growths: AtomicU64::new(0),
            donations: AtomicU64::new(0),
            donation_failures: AtomicU64::new(0),
            releases: AtomicU64::new(0),
            resizes_in_place: AtomicU64::new(0),
            resizes_absorbed: AtomicU64::new(0),
            resizes_moved: AtomicU64::new(0),
        }
    }

    /// Increments a counter by 1.
    #[inline]
    pub fn inc(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Reads a counter value.
    #[inline]
    pub fn get(counter: &AtomicU64) -> u64 {
        counter.load(Ordering::Relaxed)
    }

    /// Copies every counter into a plain-data snapshot.
    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            local_hits: Self::get(&self.local_hits),
            global_hits: Self::get(&self.global_hits),
            global_contended: Self::get(&self.global_contended),
            global_misses: Self::get(&self.global_misses),
            small_growths: Self::get(&self.small_growths),
            large_growths: Self::get(&self.large_growths),
            donations: Self::get(&self.donations),
            donation_failures: Self::get(&self.donation_failures),
            releases: Self::get(&self.releases),
            resizes_in_place: Self::get(&self.resizes_in_place),
            resizes_absorbed: Self::get(&self.resizes_absorbed),
            resizes_moved: Self::get(&self.resizes_moved),
        }
    }
}

impl Default for AllocMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Process-wide metrics instance.
pub static METRICS: AllocMetrics = AllocMetrics::new();

/// Point-in-time copy of [`AllocMetrics`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub local_hits: u64,
    pub global_hits: u64,
    pub global_contended: u64,
    pub global_misses: u64,
    pub small_growths: u64,
    pub large_growths: u64,
    pub donations: u64,
    pub donation_failures: u64,
    pub releases: u64,
    pub resizes_in_place: u64,
    pub resizes_absorbed: u64,
    pub resizes_moved: u64,
}

impl MetricsSnapshot {
    /// Renders the snapshot as a JSON object.
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| String::from("{}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_start_at_zero() {
        let metrics = AllocMetrics::new();
        assert_eq!(AllocMetrics::get(&metrics.local_hits), 0);
        assert_eq!(AllocMetrics::get(&metrics.donations), 0);
    }

    #[test]
    fn test_inc_and_snapshot() {
        let metrics = AllocMetrics::new();
        AllocMetrics::inc(&metrics.local_hits);
        AllocMetrics::inc(&metrics.local_hits);
        AllocMetrics::inc(&metrics.resizes_moved);

        let snap = metrics.snapshot();
        assert_eq!(snap.local_hits, 2);
        assert_eq!(snap.resizes_moved, 1);
        assert_eq!(snap.global_hits, 0);
    }

    #[test]
    fn test_snapshot_serializes_to_json() {
        let metrics = AllocMetrics::new();
        AllocMetrics::inc(&metrics.small_growths);
        let json = metrics.snapshot().to_json();
        assert!(json.contains("\"small_growths\":1"));
        assert!(json.contains("\"donation_failures\":0"));
    }
}
