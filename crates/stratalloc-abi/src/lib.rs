//! # stratalloc-abi
//!
//! The outward faces of the allocator: a [`StratAlloc`] type implementing
//! [`core::alloc::GlobalAlloc`], and, behind the `c-export` feature,
//! unmangled `malloc`/`free`/`calloc`/`realloc` symbols for use as a
//! drop-in C allocator. The feature is off by default so test binaries
//! never shadow the system allocator they themselves run on.

pub mod malloc_abi;

pub use malloc_abi::StratAlloc;
