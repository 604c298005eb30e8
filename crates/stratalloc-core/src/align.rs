//! Word alignment and growth constants.
//!
//! Every request size is rounded up to a multiple of the word alignment
//! before any fit, split, or growth computation, so block payloads and
//! header addresses stay mutually aligned as blocks are carved and merged.

/// Base alignment of every payload, in bytes.
pub const WORD_ALIGN: usize = 8;

/// Minimum heap-growth unit for small requests, in bytes.
pub const CHUNK_SIZE: usize = 32_768;

/// Smallest payload a split may leave behind. A split that would produce
/// less than this hands the whole block over instead.
pub const MIN_REMAINDER: usize = WORD_ALIGN;

const _: () = assert!(WORD_ALIGN.is_power_of_two());
const _: () = assert!(CHUNK_SIZE % WORD_ALIGN == 0);

/// Rounds `size` up to the next multiple of [`WORD_ALIGN`].
#[inline(always)]
pub const fn size_align(size: usize) -> usize {
    (size + (WORD_ALIGN - 1)) & !(WORD_ALIGN - 1)
}
