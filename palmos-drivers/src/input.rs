//! Debounced, edge-counting input pin
//!
//! Configures a GPIO line as input with an any-edge interrupt and
//! turns the raw edge stream into a debounced count of transitions
//! away from the line's rest level.
//!
//! Edge callbacks dispatch through a fixed-size static pin table: each
//! pin number maps to one [`EdgeCounter`] slot, and the slot itself is
//! the handler the platform driver invokes. No context pointers, no
//! unsafe.

use core::convert::Infallible;

use palmos_core::{EdgeCounter, Level};
use palmos_hal::clock::MonotonicClock;
use palmos_hal::gpio::{Direction, EdgeHandler, GpioDriver, PinConfig, Pull, Trigger};

use crate::ConfigError;

/// Size of the dispatch table; pin numbers at or above this fail
/// creation
pub const MAX_PINS: usize = 40;

/// One dispatch-table entry: the counter state shared between the
/// edge callback and the owning pin object
struct EdgeSlot {
    counter: EdgeCounter,
}

impl EdgeHandler for EdgeSlot {
    fn on_edge(&self, raw_level: bool, now_micros: u64) {
        self.counter.process(raw_level, now_micros);
    }
}

// A pin number maps to exactly one slot for the life of the image;
// re-creating a pin rebinds its slot. Sharing one pin number across
// two live instances is unsupported and unchecked.
const UNBOUND: EdgeSlot = EdgeSlot {
    counter: EdgeCounter::new(),
};
static PIN_TABLE: [EdgeSlot; MAX_PINS] = [UNBOUND; MAX_PINS];

/// Debounced, edge-counting input pin
///
/// Queries read the state maintained by the edge callback and are safe
/// to call with a callback in flight on another context; readers may
/// see an in-progress update but never block and are never blocked.
pub struct InputPin<'d, C: MonotonicClock> {
    clock: &'d C,
    pin: u8,
    slot: &'static EdgeSlot,
}

impl<'d, C: MonotonicClock> InputPin<'d, C> {
    /// Configure `pin` as a debounced edge-counting input
    ///
    /// Sets up the line for input with the pull resistor holding it at
    /// `default_level`, installs the chip-wide interrupt service
    /// (already-installed is fine), registers the edge callback, and
    /// runs one synchronous processing pass so the level is known
    /// before the first edge.
    ///
    /// Fails with [`ConfigError::PinFailed`] when the pin
    /// configuration is rejected (invalid pin number, unusable default
    /// level) and [`ConfigError::IsrFailed`] when service installation
    /// or handler registration is rejected. No instance escapes on
    /// failure.
    pub fn create<D: GpioDriver>(
        driver: &D,
        clock: &'d C,
        pin: u8,
        default_level: Level,
    ) -> Result<Self, ConfigError> {
        let rest = default_level.as_raw().ok_or(ConfigError::PinFailed)?;
        let slot = PIN_TABLE.get(pin as usize).ok_or(ConfigError::PinFailed)?;

        let config = PinConfig {
            direction: Direction::Input,
            pull: if rest { Pull::Up } else { Pull::Down },
            trigger: Trigger::AnyEdge,
        };
        driver
            .configure(pin, &config)
            .map_err(|_| ConfigError::PinFailed)?;

        driver
            .install_isr_service()
            .map_err(|_| ConfigError::IsrFailed)?;

        slot.counter.bind(default_level);
        driver
            .attach_edge_handler(pin, slot)
            .map_err(|_| ConfigError::IsrFailed)?;

        slot.counter
            .prime(driver.read_level(pin), clock.now_micros());

        Ok(Self { clock, pin, slot })
    }

    /// Last observed level (not a fresh driver read)
    pub fn level(&self) -> Level {
        self.slot.counter.level()
    }

    /// Number of accepted transitions away from the rest level
    pub fn count(&self) -> u64 {
        self.slot.counter.count()
    }

    /// Elapsed time since the last counted transition, in microseconds
    pub fn elapsed_micros(&self) -> u64 {
        self.slot.counter.elapsed_micros(self.clock.now_micros())
    }

    /// Zero the transition counter
    ///
    /// The level and the elapsed-time baseline are untouched.
    pub fn reset_count(&self) {
        self.slot.counter.reset_count();
    }

    /// Current debounce window in microseconds
    pub fn min_pulse_micros(&self) -> u64 {
        self.slot.counter.min_pulse_micros()
    }

    /// Set the debounce window used for subsequent edges
    pub fn set_min_pulse_micros(&self, micros: u64) {
        self.slot.counter.set_min_pulse_micros(micros);
    }

    /// Rest level transitions are counted away from
    pub fn default_level(&self) -> Level {
        self.slot.counter.default_level()
    }

    /// Pin number this instance owns
    pub fn pin(&self) -> u8 {
        self.pin
    }
}

impl<'d, C: MonotonicClock> embedded_hal::digital::ErrorType for InputPin<'d, C> {
    type Error = Infallible;
}

impl<'d, C: MonotonicClock> embedded_hal::digital::InputPin for InputPin<'d, C> {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.level().is_high())
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(self.level().is_low())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;
    use palmos_hal::gpio::{DriverError, IsrService};

    // Each test uses its own pin number: the dispatch table is a
    // process-wide static and tests run in parallel.

    /// Mock GPIO driver for testing
    struct MockDriver {
        level: Cell<bool>,
        config: Cell<Option<PinConfig>>,
        handler: Cell<Option<&'static dyn EdgeHandler>>,
        installs: Cell<u32>,
        fail_configure: Cell<bool>,
        fail_install: Cell<bool>,
        fail_attach: Cell<bool>,
    }

    impl MockDriver {
        fn new() -> Self {
            Self {
                level: Cell::new(false),
                config: Cell::new(None),
                handler: Cell::new(None),
                installs: Cell::new(0),
                fail_configure: Cell::new(false),
                fail_install: Cell::new(false),
                fail_attach: Cell::new(false),
            }
        }

        /// Simulate one hardware edge: the line settles at `raw` and
        /// the attached handler fires with the given timestamp
        fn fire(&self, raw: bool, now_micros: u64) {
            self.level.set(raw);
            self.handler.get().unwrap().on_edge(raw, now_micros);
        }
    }

    impl GpioDriver for MockDriver {
        fn configure(&self, _pin: u8, config: &PinConfig) -> Result<(), DriverError> {
            if self.fail_configure.get() {
                return Err(DriverError::InvalidConfig);
            }
            self.config.set(Some(*config));
            Ok(())
        }

        fn install_isr_service(&self) -> Result<IsrService, DriverError> {
            if self.fail_install.get() {
                return Err(DriverError::ServiceFailed);
            }
            self.installs.set(self.installs.get() + 1);
            if self.installs.get() == 1 {
                Ok(IsrService::Installed)
            } else {
                Ok(IsrService::AlreadyInstalled)
            }
        }

        fn attach_edge_handler(
            &self,
            _pin: u8,
            handler: &'static dyn EdgeHandler,
        ) -> Result<(), DriverError> {
            if self.fail_attach.get() {
                return Err(DriverError::ServiceFailed);
            }
            self.handler.set(Some(handler));
            Ok(())
        }

        fn read_level(&self, _pin: u8) -> bool {
            self.level.get()
        }

        fn write_level(&self, _pin: u8, raw_level: bool) {
            self.level.set(raw_level);
        }
    }

    /// Mock monotonic clock, starts well past the first window
    struct MockClock {
        now: Cell<u64>,
    }

    impl MockClock {
        fn new() -> Self {
            Self {
                now: Cell::new(1_000_000),
            }
        }

        fn advance(&self, micros: u64) -> u64 {
            self.now.set(self.now.get() + micros);
            self.now.get()
        }
    }

    impl MonotonicClock for MockClock {
        fn now_micros(&self) -> u64 {
            self.now.get()
        }
    }

    #[test]
    fn test_create_configures_and_primes() {
        let driver = MockDriver::new();
        let clock = MockClock::new();

        let pin = InputPin::create(&driver, &clock, 0, Level::Low).unwrap();

        // Resting line: level known immediately, nothing counted
        assert_eq!(pin.level(), Level::Low);
        assert_eq!(pin.count(), 0);
        assert_eq!(pin.default_level(), Level::Low);
        assert_eq!(pin.pin(), 0);

        let config = driver.config.get().unwrap();
        assert_eq!(config.direction, Direction::Input);
        assert_eq!(config.pull, Pull::Down);
        assert_eq!(config.trigger, Trigger::AnyEdge);
        assert_eq!(driver.installs.get(), 1);
    }

    #[test]
    fn test_create_high_rest_pulls_up() {
        let driver = MockDriver::new();
        let clock = MockClock::new();
        driver.level.set(true);

        let pin = InputPin::create(&driver, &clock, 1, Level::High).unwrap();

        assert_eq!(pin.level(), Level::High);
        assert_eq!(pin.count(), 0);
        assert_eq!(driver.config.get().unwrap().pull, Pull::Up);
    }

    #[test]
    fn test_create_counts_active_line() {
        let driver = MockDriver::new();
        let clock = MockClock::new();
        driver.level.set(true);

        // Line already away from rest at creation: the priming pass
        // records it as a transition
        let pin = InputPin::create(&driver, &clock, 2, Level::Low).unwrap();

        assert_eq!(pin.level(), Level::High);
        assert_eq!(pin.count(), 1);
        assert_eq!(pin.elapsed_micros(), 0);
    }

    #[test]
    fn test_create_invalid_pin() {
        let driver = MockDriver::new();
        let clock = MockClock::new();

        let result = InputPin::create(&driver, &clock, 99, Level::Low);

        assert_eq!(result.err(), Some(ConfigError::PinFailed));
        assert!(driver.handler.get().is_none());
    }

    #[test]
    fn test_create_rejected_configuration() {
        let driver = MockDriver::new();
        let clock = MockClock::new();
        driver.fail_configure.set(true);

        let result = InputPin::create(&driver, &clock, 3, Level::Low);
        assert_eq!(result.err(), Some(ConfigError::PinFailed));
    }

    #[test]
    fn test_create_service_install_failure() {
        let driver = MockDriver::new();
        let clock = MockClock::new();
        driver.fail_install.set(true);

        let result = InputPin::create(&driver, &clock, 4, Level::Low);
        assert_eq!(result.err(), Some(ConfigError::IsrFailed));
    }

    #[test]
    fn test_create_handler_registration_failure() {
        let driver = MockDriver::new();
        let clock = MockClock::new();
        driver.fail_attach.set(true);

        let result = InputPin::create(&driver, &clock, 5, Level::Low);
        assert_eq!(result.err(), Some(ConfigError::IsrFailed));
    }

    #[test]
    fn test_second_pin_reuses_installed_service() {
        let driver = MockDriver::new();
        let clock = MockClock::new();

        let first = InputPin::create(&driver, &clock, 6, Level::Low);
        let second = InputPin::create(&driver, &clock, 7, Level::Low);

        // Already-installed is not an error
        assert!(first.is_ok());
        assert!(second.is_ok());
        assert_eq!(driver.installs.get(), 2);
    }

    #[test]
    fn test_edges_dispatch_through_handler() {
        let driver = MockDriver::new();
        let clock = MockClock::new();
        let pin = InputPin::create(&driver, &clock, 8, Level::Low).unwrap();

        // Pulse: departure counted
        driver.fire(true, clock.advance(1_000));
        assert_eq!((pin.count(), pin.level()), (1, Level::High));

        // Contact bounce inside the window: invisible
        driver.fire(false, clock.advance(5_000));
        assert_eq!((pin.count(), pin.level()), (1, Level::High));

        // Clean return to rest: tracked, not counted
        driver.fire(false, clock.advance(20_000));
        assert_eq!((pin.count(), pin.level()), (1, Level::Low));

        // Next pulse
        driver.fire(true, clock.advance(15_000));
        assert_eq!((pin.count(), pin.level()), (2, Level::High));
    }

    #[test]
    fn test_reset_count_and_elapsed() {
        let driver = MockDriver::new();
        let clock = MockClock::new();
        let pin = InputPin::create(&driver, &clock, 9, Level::Low).unwrap();

        driver.fire(true, clock.advance(1_000));
        assert_eq!(pin.elapsed_micros(), 0);

        clock.advance(2_500);
        assert_eq!(pin.elapsed_micros(), 2_500);

        pin.reset_count();
        assert_eq!(pin.count(), 0);
        assert_eq!(pin.level(), Level::High);
        assert_eq!(pin.elapsed_micros(), 2_500);
    }

    #[test]
    fn test_min_pulse_reconfiguration() {
        let driver = MockDriver::new();
        let clock = MockClock::new();
        let pin = InputPin::create(&driver, &clock, 10, Level::Low).unwrap();

        driver.fire(true, clock.advance(1_000));
        assert_eq!(pin.count(), 1);

        pin.set_min_pulse_micros(50_000);
        assert_eq!(pin.min_pulse_micros(), 50_000);

        // Inside the widened window: noise
        driver.fire(false, clock.advance(20_000));
        assert_eq!(pin.level(), Level::High);

        driver.fire(false, clock.advance(40_000));
        assert_eq!(pin.level(), Level::Low);
        assert_eq!(pin.count(), 1);
    }

    #[test]
    fn test_embedded_hal_input() {
        use embedded_hal::digital::InputPin as _;

        let driver = MockDriver::new();
        let clock = MockClock::new();
        let mut pin = InputPin::create(&driver, &clock, 11, Level::Low).unwrap();

        assert!(pin.is_low().unwrap());
        driver.fire(true, clock.advance(1_000));
        assert!(pin.is_high().unwrap());
    }
}
