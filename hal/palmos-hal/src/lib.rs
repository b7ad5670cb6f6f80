//! Palmos Hardware Abstraction Layer
//!
//! This crate defines the platform seams the Palmos pin objects are
//! built on. A chip-specific HAL (RP2040, ESP32, a host-side mock)
//! implements these traits; everything above them is portable.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Pin objects (palmos-drivers)           │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  palmos-hal (this crate - traits)       │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │  palmos-hal-  │       │  test mocks,  │
//! │    rp2040     │       │  other chips  │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::GpioDriver`] - pin configuration, level I/O, edge callbacks
//! - [`gpio::EdgeHandler`] - callback invoked from interrupt context
//! - [`clock::MonotonicClock`] - monotonic microsecond time source

#![no_std]
#![deny(unsafe_code)]

pub mod clock;
pub mod gpio;

// Re-export key traits at crate root for convenience
pub use clock::MonotonicClock;
pub use gpio::{EdgeHandler, GpioDriver};
