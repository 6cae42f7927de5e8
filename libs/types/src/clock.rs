//! Monotonic nanosecond timestamps
//!
//! Timestamps are nanoseconds since the Unix epoch, produced from a
//! process-wide monotonic source: the wall clock is sampled once at
//! first use and all later readings advance it by `Instant` elapsed
//! time, so timestamps never go backwards within a process.

use std::sync::OnceLock;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

/// Nanoseconds since the Unix epoch
pub type Timestamp = u64;

static ANCHOR: OnceLock<(u64, Instant)> = OnceLock::new();

/// Current monotonic timestamp
pub fn now() -> Timestamp {
    let &(epoch_ns, started) = ANCHOR.get_or_init(|| {
        let epoch_ns = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0);
        (epoch_ns, Instant::now())
    });
    epoch_ns + started.elapsed().as_nanos() as u64
}
