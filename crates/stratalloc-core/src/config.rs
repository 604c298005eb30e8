//! Runtime configuration.
//!
//! One knob, read once from the environment: `STRATALLOC_RESERVE` sets the
//! size of the contiguous segment the heap extender reserves at first use.
//! Values accept a loose `k`/`m`/`g` suffix (`512m`, `2g`, `65536`).
//! Anything unparseable falls back to the default; the parser never errors.

use std::sync::OnceLock;

/// Environment variable naming the segment reservation size.
pub const RESERVE_ENV: &str = "STRATALLOC_RESERVE";

/// Default segment reservation: 1 GiB.
pub const DEFAULT_RESERVE: usize = 1 << 30;

/// Reservation size for the heap segment, cached after the first read.
#[must_use]
pub fn reserve_bytes() -> usize {
    static RESERVE: OnceLock<usize> = OnceLock::new();
    *RESERVE.get_or_init(|| {
        std::env::var(RESERVE_ENV)
            .ok()
            .and_then(|raw| parse_size_loose(&raw))
            .unwrap_or(DEFAULT_RESERVE)
    })
}

/// Parses `"65536"`, `"64k"`, `"512M"`, `"2g"` (case-insensitive,
/// surrounding whitespace ignored). Returns `None` for anything else,
/// including zero and overflowing values.
fn parse_size_loose(raw: &str) -> Option<usize> {
    let trimmed = raw.trim().to_ascii_lowercase();
    let (digits, shift) = match trimmed.strip_suffix(['k', 'm', 'g']) {
        Some(rest) => {
            let shift = match trimmed.as_bytes()[trimmed.len() - 1] {
                b'k' => 10,
                b'm' => 20,
                _ => 30,
            };
            (rest.trim_end(), shift)
        }
        None => (trimmed.as_str(), 0),
    };
    let value: usize = digits.parse().ok()?;
    let bytes = value.checked_mul(1usize << shift)?;
    (bytes > 0).then_some(bytes)
}
