//! End-to-end placement scenarios.
//!
//! Each scenario runs on a freshly spawned thread so it starts from an
//! empty thread cache and carving order is deterministic. The heap and
//! global pool are process-global and shared with the other scenarios
//! here, so assertions stay local to the scenario's own blocks.

use stratalloc_core::{HEADER_SIZE, allocate, release, resize, thread_cache, usable_size, zeroed};

fn on_fresh_thread(f: impl FnOnce() + Send + 'static) {
    std::thread::spawn(f).join().expect("scenario thread");
}

fn assert_cache_well_formed(snapshot: &[(usize, usize)]) {
    for pair in snapshot.windows(2) {
        let (addr_a, size_a) = pair[0];
        let (addr_b, _) = pair[1];
        assert!(addr_a < addr_b, "cache not address-ordered");
        assert!(
            addr_a + HEADER_SIZE + size_a < addr_b,
            "adjacent free blocks left uncoalesced"
        );
    }
}

#[test]
fn released_block_is_reused_for_the_next_fit() {
    // S1: alloc(16); release; alloc(16) comes back at the same address.
    on_fresh_thread(|| {
        let a = allocate(16).expect("alloc");
        unsafe { release(a.as_ptr()) };
        let b = allocate(16).expect("alloc");
        assert_eq!(b, a);
        unsafe { release(b.as_ptr()) };
    });
}

#[test]
fn neighboring_releases_coalesce_into_one_block() {
    // S2: two 16-byte neighbors merge into a single 48-byte free block
    // (16 + H + 16). A third live allocation guards the right edge so the
    // merge cannot continue into the chunk remainder.
    on_fresh_thread(|| {
        let a = allocate(16).expect("alloc");
        let b = allocate(16).expect("alloc");
        let guard = allocate(16).expect("alloc");
        assert_eq!(b.as_ptr() as usize, a.as_ptr() as usize + 16 + HEADER_SIZE);

        unsafe { release(a.as_ptr()) };
        unsafe { release(b.as_ptr()) };

        let snapshot = thread_cache::snapshot();
        assert_cache_well_formed(&snapshot);
        let a_header = a.as_ptr() as usize - HEADER_SIZE;
        let merged: Vec<_> = snapshot
            .iter()
            .filter(|&&(addr, _)| addr == a_header)
            .collect();
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].1, 2 * 16 + HEADER_SIZE);

        unsafe { release(guard.as_ptr()) };
    });
}

#[test]
fn growing_resize_absorbs_the_adjacent_remainder() {
    // S4, in-place branch: the block after `a` is the free chunk
    // remainder, so growth keeps the pointer.
    on_fresh_thread(|| {
        let a = allocate(100).expect("alloc");
        unsafe { a.as_ptr().write_bytes(0x7E, 100) };
        let b = unsafe { resize(a.as_ptr(), 200) }.expect("resize");
        assert_eq!(b, a);
        let bytes = unsafe { core::slice::from_raw_parts(b.as_ptr(), 100) };
        assert!(bytes.iter().all(|&x| x == 0x7E));
        unsafe { release(b.as_ptr()) };
    });
}

#[test]
fn growing_resize_moves_and_copies_when_blocked() {
    // S4, moving branch: a live right neighbor forces allocate-copy-
    // release; the first 100 bytes must survive the move.
    on_fresh_thread(|| {
        let a = allocate(100).expect("alloc");
        unsafe { a.as_ptr().write_bytes(0x42, 100) };
        let blocker = allocate(24).expect("alloc");

        let b = unsafe { resize(a.as_ptr(), 200) }.expect("resize");
        assert_ne!(b, a);
        let bytes = unsafe { core::slice::from_raw_parts(b.as_ptr(), 100) };
        assert!(bytes.iter().all(|&x| x == 0x42));

        unsafe { release(b.as_ptr()) };
        unsafe { release(blocker.as_ptr()) };
    });
}

#[test]
fn releasing_null_is_silent() {
    // S5.
    unsafe { release(core::ptr::null_mut()) };
}

#[test]
fn zeroed_allocation_is_all_zero() {
    // S6: zeroed(10, 8) yields 80 zero bytes.
    on_fresh_thread(|| {
        let a = zeroed(10, 8).expect("alloc");
        assert!(unsafe { usable_size(a.as_ptr()) } >= 80);
        let bytes = unsafe { core::slice::from_raw_parts(a.as_ptr(), 80) };
        assert!(bytes.iter().all(|&b| b == 0));
        unsafe { release(a.as_ptr()) };
    });
}

#[test]
fn round_trip_restores_the_cache_shape() {
    // Universal invariant 5: an alloc/release pair leaves the cache
    // indistinguishable from before, modulo re-merged neighbors.
    on_fresh_thread(|| {
        let prime = allocate(64).expect("alloc");
        unsafe { release(prime.as_ptr()) };
        let before = thread_cache::snapshot();

        let p = allocate(64).expect("alloc");
        unsafe { release(p.as_ptr()) };

        assert_eq!(thread_cache::snapshot(), before);
    });
}
