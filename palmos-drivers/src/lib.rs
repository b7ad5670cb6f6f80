//! Pin objects for Palmos GPIO signal conditioning
//!
//! Concrete pin drivers built on the `palmos-hal` platform traits:
//!
//! - [`OutputPin`] - owns one GPIO line configured for output and
//!   drives a digital level
//! - [`InputPin`] - owns one GPIO line configured for input with an
//!   any-edge interrupt, debouncing and counting transitions away
//!   from its rest level
//!
//! Both also implement the `embedded-hal` 1.0 digital traits so they
//! plug into ecosystem drivers.

#![no_std]
#![deny(unsafe_code)]

pub mod input;
pub mod output;

pub use input::InputPin;
pub use output::OutputPin;

/// Errors that can occur while creating a pin
///
/// Creation is the only fallible phase; every operation on a
/// successfully created pin is infallible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// The driver rejected the pin configuration
    PinFailed,
    /// Interrupt service installation or handler registration was
    /// rejected
    IsrFailed,
}
