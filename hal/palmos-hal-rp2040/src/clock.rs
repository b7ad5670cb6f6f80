//! Monotonic clock over the RP2040 TIMER peripheral

use embassy_time::Instant;
use palmos_hal::clock::MonotonicClock;

/// RP2040 monotonic microsecond clock
///
/// Reads embassy-time's `Instant`, which the time driver backs with
/// the 64-bit TIMER counter; it never wraps in practice.
#[derive(Debug, Clone, Copy, Default)]
pub struct RpClock;

impl MonotonicClock for RpClock {
    fn now_micros(&self) -> u64 {
        Instant::now().as_micros()
    }
}
