use once_cell::sync::Lazy;
use std::sync::atomic::{AtomicU64, Ordering};

/// Process-wide counter; starts at 1 so 0 never appears as a live id.
static CORRELATION_ID_COUNTER: Lazy<AtomicU64> = Lazy::new(|| AtomicU64::new(1));

/// Returns a fresh correlation id, unique within this process.
///
/// Both peers draw from independent counters; that is fine because replies
/// are only ever matched against the issuing side's own pending table.
#[inline]
pub fn generate_correlation_id() -> u64 {
    CORRELATION_ID_COUNTER.fetch_add(1, Ordering::Relaxed)
}
