//! Debounced edge counting
//!
//! The heart of the input pin: turns a stream of raw edge interrupts
//! into a count of genuine transitions away from a configured rest
//! level. One instance is shared between the edge callback and the
//! reading context, so every field is an atomic and no operation ever
//! blocks.

use portable_atomic::{AtomicU64, AtomicU8, Ordering};

use crate::level::Level;

/// Default debounce window in microseconds
pub const DEFAULT_MIN_PULSE_MICROS: u64 = 10_000;

/// What a processed edge did to the counter state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EdgeVerdict {
    /// Accepted transition away from the rest level; counted
    Counted,
    /// Accepted transition back to the rest level; level tracked but
    /// not counted
    Rest,
    /// Discarded by the debounce gate; no state was touched
    Noise,
}

/// Debounce and edge-count state for one input pin
///
/// Two logical states - resting (level equals the rest level) and
/// active - with the debounce gate guarding every transition attempt.
/// The counter increments exactly on resting-to-active transitions
/// that pass the gate.
///
/// The writer side ([`process`](Self::process)) runs at interrupt
/// priority and is serialized per pin by the hardware. Readers may
/// observe an in-flight update; the fields are not transactionally
/// linked. All accesses are relaxed loads and stores - a lock here
/// could deadlock the interrupt path against the reading context.
#[derive(Debug)]
pub struct EdgeCounter {
    /// Rest level; transitions away from it are the counted events
    default_level: AtomicU8,
    /// Last observed level
    level: AtomicU8,
    /// Accepted departures from rest
    count: AtomicU64,
    /// Timestamp of the last counted transition, in microseconds
    last_transition: AtomicU64,
    /// Debounce window in microseconds
    min_pulse: AtomicU64,
}

impl EdgeCounter {
    /// Create an unbound counter: level unknown, everything zeroed
    pub const fn new() -> Self {
        Self {
            default_level: AtomicU8::new(Level::Unknown as u8),
            level: AtomicU8::new(Level::Unknown as u8),
            count: AtomicU64::new(0),
            last_transition: AtomicU64::new(0),
            min_pulse: AtomicU64::new(DEFAULT_MIN_PULSE_MICROS),
        }
    }

    /// Reset to the initial state for a new owner
    ///
    /// Sets the rest level and clears level, count, timestamp and the
    /// debounce window back to [`DEFAULT_MIN_PULSE_MICROS`].
    pub fn bind(&self, default_level: Level) {
        self.default_level
            .store(default_level.code(), Ordering::Relaxed);
        self.level.store(Level::Unknown.code(), Ordering::Relaxed);
        self.count.store(0, Ordering::Relaxed);
        self.last_transition.store(0, Ordering::Relaxed);
        self.min_pulse
            .store(DEFAULT_MIN_PULSE_MICROS, Ordering::Relaxed);
    }

    /// Process one raw hardware edge
    ///
    /// The edge-callback step. The debounce gate runs first: an edge
    /// within the window of the last counted transition is noise and
    /// leaves level, count and timestamp exactly as they were, so a
    /// burst of sub-window edges cannot keep the window open forever.
    pub fn process(&self, raw_level: bool, now_micros: u64) -> EdgeVerdict {
        let elapsed = now_micros.wrapping_sub(self.last_transition.load(Ordering::Relaxed));
        if elapsed <= self.min_pulse.load(Ordering::Relaxed) {
            return EdgeVerdict::Noise;
        }

        self.apply(raw_level, now_micros)
    }

    /// Creation-time pass: seed the state from the pin's current level
    ///
    /// Same as [`process`](Self::process) minus the debounce gate. The
    /// gate would discard the pass whenever the pin is created within
    /// the first window after boot, leaving the level `Unknown` until
    /// the first edge.
    pub fn prime(&self, raw_level: bool, now_micros: u64) -> EdgeVerdict {
        self.apply(raw_level, now_micros)
    }

    fn apply(&self, raw_level: bool, now_micros: u64) -> EdgeVerdict {
        let level = Level::from_raw(raw_level);
        self.level.store(level.code(), Ordering::Relaxed);

        if level.code() == self.default_level.load(Ordering::Relaxed) {
            // Back at rest: one count per full pulse, not two
            return EdgeVerdict::Rest;
        }

        let count = self.count.load(Ordering::Relaxed);
        self.count.store(count.saturating_add(1), Ordering::Relaxed);
        self.last_transition.store(now_micros, Ordering::Relaxed);

        EdgeVerdict::Counted
    }

    /// Last observed level
    pub fn level(&self) -> Level {
        Level::from_code(self.level.load(Ordering::Relaxed))
    }

    /// Rest level transitions are counted away from
    pub fn default_level(&self) -> Level {
        Level::from_code(self.default_level.load(Ordering::Relaxed))
    }

    /// Number of accepted departures from the rest level
    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    /// Timestamp of the last counted transition, in microseconds
    pub fn last_transition_micros(&self) -> u64 {
        self.last_transition.load(Ordering::Relaxed)
    }

    /// Elapsed time since the last counted transition
    pub fn elapsed_micros(&self, now_micros: u64) -> u64 {
        now_micros.wrapping_sub(self.last_transition.load(Ordering::Relaxed))
    }

    /// Zero the transition counter
    ///
    /// Level and timestamp are untouched.
    pub fn reset_count(&self) {
        self.count.store(0, Ordering::Relaxed);
    }

    /// Current debounce window in microseconds
    pub fn min_pulse_micros(&self) -> u64 {
        self.min_pulse.load(Ordering::Relaxed)
    }

    /// Set the debounce window
    ///
    /// Takes effect on the next processed edge, never retroactively.
    pub fn set_min_pulse_micros(&self, micros: u64) {
        self.min_pulse.store(micros, Ordering::Relaxed);
    }
}

impl Default for EdgeCounter {
    fn default() -> Self {
        Self::new()
    }
}
