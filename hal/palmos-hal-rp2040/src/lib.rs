//! RP2040-specific HAL for Palmos
//!
//! Implements the shared `palmos-hal` traits over embassy-rp:
//!
//! - [`gpio::RpGpioDriver`] - pin configuration, level I/O, and edge
//!   dispatch via per-pin embassy tasks
//! - [`clock::RpClock`] - monotonic microsecond clock over the TIMER
//!   peripheral

#![no_std]

pub mod clock;
pub mod gpio;

pub use clock::RpClock;
pub use gpio::RpGpioDriver;

// Re-export shared traits from palmos-hal for convenience
pub use palmos_hal::{GpioDriver as GpioDriverTrait, MonotonicClock as MonotonicClockTrait};
