//! Board-agnostic core logic for Palmos GPIO signal conditioning
//!
//! This crate contains everything that does not depend on a specific
//! platform driver:
//!
//! - The tri-state digital [`Level`](level::Level) and its raw encoding
//! - The debounce/edge-count state machine
//!   ([`EdgeCounter`](debounce::EdgeCounter)) shared between interrupt
//!   and reader context

#![no_std]
#![deny(unsafe_code)]

pub mod debounce;
pub mod level;

pub use debounce::{EdgeCounter, EdgeVerdict, DEFAULT_MIN_PULSE_MICROS};
pub use level::Level;
