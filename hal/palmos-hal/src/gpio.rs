//! GPIO driver abstractions
//!
//! The contract between the Palmos pin objects and the platform's GPIO
//! driver: pin configuration, raw level I/O, and edge-interrupt
//! callback registration.

/// Pin direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Input only
    Input,
    /// Output only
    Output,
    /// Output with the input path left enabled, so the driven level
    /// can be read back
    InputOutput,
}

/// Internal pull resistor selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Pull {
    /// No pull resistor
    None,
    /// Pull-up enabled
    Up,
    /// Pull-down enabled
    Down,
}

/// Edge interrupt trigger mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Trigger {
    /// No interrupt for this pin
    Disabled,
    /// Interrupt on low-to-high transitions
    RisingEdge,
    /// Interrupt on high-to-low transitions
    FallingEdge,
    /// Interrupt on any transition
    AnyEdge,
}

/// Hardware configuration for a single pin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PinConfig {
    pub direction: Direction,
    pub pull: Pull,
    pub trigger: Trigger,
}

/// Errors a platform driver can report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DriverError {
    /// Pin number is not a GPIO on this chip
    InvalidPin,
    /// The requested mode/pull/trigger combination was rejected
    InvalidConfig,
    /// Interrupt service installation or handler registration failed
    ServiceFailed,
}

/// Outcome of installing the shared interrupt service
///
/// The service is chip-global and installed lazily; asking for it a
/// second time is not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IsrService {
    /// This call installed the service
    Installed,
    /// The service was already running
    AlreadyInstalled,
}

/// Callback invoked from interrupt context on every raw edge
///
/// The driver samples the pin's raw level and a monotonic microsecond
/// timestamp at interrupt time and hands both to the handler. Handlers
/// must be short and non-blocking; they run at interrupt priority.
pub trait EdgeHandler: Sync {
    /// Process one raw hardware edge
    fn on_edge(&self, raw_level: bool, now_micros: u64);
}

/// Platform GPIO driver
///
/// All methods take `&self`: one driver instance serves every pin on
/// the chip, so implementations use interior mutability. Level reads
/// and writes on a configured pin are infallible by contract.
pub trait GpioDriver {
    /// Apply a hardware configuration to a pin
    fn configure(&self, pin: u8, config: &PinConfig) -> Result<(), DriverError>;

    /// Install the chip-wide edge interrupt service
    ///
    /// Idempotent: returns [`IsrService::AlreadyInstalled`] instead of
    /// an error when the service is already running.
    fn install_isr_service(&self) -> Result<IsrService, DriverError>;

    /// Register an edge callback for a pin
    ///
    /// The handler is invoked once per raw hardware edge, serialized
    /// per pin by the interrupt hardware.
    fn attach_edge_handler(
        &self,
        pin: u8,
        handler: &'static dyn EdgeHandler,
    ) -> Result<(), DriverError>;

    /// Read the instantaneous raw level of a configured pin
    fn read_level(&self, pin: u8) -> bool;

    /// Drive the raw level of a configured output pin
    fn write_level(&self, pin: u8, raw_level: bool);
}
