//! RP2040 GPIO driver
//!
//! Implements `palmos_hal::GpioDriver` over embassy-rp. Raw edge
//! interrupts are delivered through per-pin dispatcher tasks: embassy's
//! GPIO interrupt wakes the task, which samples the line and invokes
//! the registered edge handler with the level and a timestamp.

use core::cell::RefCell;
use core::mem;
use core::sync::atomic::{AtomicBool, Ordering};

use critical_section::Mutex;
use embassy_executor::Spawner;
use embassy_rp::gpio::{AnyPin, Flex, Pull as RpPull};
use embassy_rp::Peri;
use embassy_time::Instant;

use palmos_hal::gpio::{
    Direction, DriverError, EdgeHandler, GpioDriver, IsrService, PinConfig, Pull, Trigger,
};

/// Number of GPIO pins on RP2040
pub const GPIO_COUNT: usize = 30;

/// Size of the dispatcher task pool: at most this many pins can have
/// edge handlers attached
pub const MAX_DISPATCHERS: usize = 8;

// Chip-global interrupt service flag. Embassy binds the GPIO interrupt
// itself when the first pin is created; the flag models the
// install-once contract of the trait.
static ISR_SERVICE: AtomicBool = AtomicBool::new(false);

// Last sampled level per pin, maintained by the dispatcher once the
// pin itself has moved into its task.
const LEVEL_INIT: AtomicBool = AtomicBool::new(false);
static LEVEL_MIRROR: [AtomicBool; GPIO_COUNT] = [LEVEL_INIT; GPIO_COUNT];

/// Where a pin currently lives
enum PinState {
    /// Untouched, still in the bank
    Free(Peri<'static, AnyPin>),
    /// Configured and parked; level I/O goes straight to the pad
    Parked { flex: Flex<'static>, trigger: Trigger },
    /// Handed to a dispatcher task; level reads come from the mirror
    Dispatched,
}

/// RP2040 GPIO driver
///
/// One instance serves all GPIOs. `configure` materializes a pin from
/// the bank, `attach_edge_handler` hands it to a dispatcher task.
pub struct RpGpioDriver {
    spawner: Spawner,
    pins: Mutex<RefCell<[PinState; GPIO_COUNT]>>,
}

impl RpGpioDriver {
    /// Create the driver from the chip's GPIO bank
    ///
    /// Build the array with [`pin_bank!`](crate::pin_bank).
    pub fn new(spawner: Spawner, bank: [Peri<'static, AnyPin>; GPIO_COUNT]) -> Self {
        Self {
            spawner,
            pins: Mutex::new(RefCell::new(bank.map(PinState::Free))),
        }
    }
}

fn apply_config(flex: &mut Flex<'static>, config: &PinConfig) {
    flex.set_pull(match config.pull {
        Pull::None => RpPull::None,
        Pull::Up => RpPull::Up,
        Pull::Down => RpPull::Down,
    });
    match config.direction {
        Direction::Input => flex.set_as_input(),
        // The RP2040 pad keeps its input buffer enabled, so driven
        // levels read back through the same path
        Direction::Output | Direction::InputOutput => flex.set_as_output(),
    }
}

impl GpioDriver for RpGpioDriver {
    fn configure(&self, pin: u8, config: &PinConfig) -> Result<(), DriverError> {
        critical_section::with(|cs| {
            let mut pins = self.pins.borrow_ref_mut(cs);
            let state = pins
                .get_mut(pin as usize)
                .ok_or(DriverError::InvalidPin)?;

            match mem::replace(state, PinState::Dispatched) {
                PinState::Free(peri) => {
                    let mut flex = Flex::new(peri);
                    apply_config(&mut flex, config);
                    *state = PinState::Parked {
                        flex,
                        trigger: config.trigger,
                    };
                    Ok(())
                }
                PinState::Parked { mut flex, .. } => {
                    apply_config(&mut flex, config);
                    *state = PinState::Parked {
                        flex,
                        trigger: config.trigger,
                    };
                    Ok(())
                }
                // The pin is owned by a dispatcher task now
                PinState::Dispatched => Err(DriverError::InvalidConfig),
            }
        })
    }

    fn install_isr_service(&self) -> Result<IsrService, DriverError> {
        if ISR_SERVICE.swap(true, Ordering::AcqRel) {
            Ok(IsrService::AlreadyInstalled)
        } else {
            Ok(IsrService::Installed)
        }
    }

    fn attach_edge_handler(
        &self,
        pin: u8,
        handler: &'static dyn EdgeHandler,
    ) -> Result<(), DriverError> {
        let (flex, trigger) = critical_section::with(|cs| {
            let mut pins = self.pins.borrow_ref_mut(cs);
            let state = pins
                .get_mut(pin as usize)
                .ok_or(DriverError::InvalidPin)?;

            match mem::replace(state, PinState::Dispatched) {
                PinState::Parked { flex, trigger } if trigger != Trigger::Disabled => {
                    Ok((flex, trigger))
                }
                // Not configured for interrupts, or already dispatched
                other => {
                    *state = other;
                    Err(DriverError::ServiceFailed)
                }
            }
        })?;

        // Seed the mirror while the pin is still in hand
        LEVEL_MIRROR[pin as usize].store(flex.is_high(), Ordering::Relaxed);

        self.spawner
            .spawn(edge_dispatch(flex, pin, trigger, handler))
            .map_err(|_| DriverError::ServiceFailed)
    }

    fn read_level(&self, pin: u8) -> bool {
        if pin as usize >= GPIO_COUNT {
            return false;
        }
        critical_section::with(|cs| match &self.pins.borrow_ref(cs)[pin as usize] {
            PinState::Parked { flex, .. } => flex.is_high(),
            _ => LEVEL_MIRROR[pin as usize].load(Ordering::Relaxed),
        })
    }

    fn write_level(&self, pin: u8, raw_level: bool) {
        if pin as usize >= GPIO_COUNT {
            return;
        }
        critical_section::with(|cs| {
            if let PinState::Parked { flex, .. } = &mut self.pins.borrow_ref_mut(cs)[pin as usize]
            {
                if raw_level {
                    flex.set_high();
                } else {
                    flex.set_low();
                }
            }
        });
    }
}

/// Per-pin edge dispatcher
///
/// Stands in for a raw edge ISR: waits on the configured trigger,
/// samples the line, mirrors it, and invokes the handler.
#[embassy_executor::task(pool_size = MAX_DISPATCHERS)]
async fn edge_dispatch(
    mut flex: Flex<'static>,
    pin: u8,
    trigger: Trigger,
    handler: &'static dyn EdgeHandler,
) -> ! {
    loop {
        match trigger {
            Trigger::RisingEdge => flex.wait_for_rising_edge().await,
            Trigger::FallingEdge => flex.wait_for_falling_edge().await,
            _ => flex.wait_for_any_edge().await,
        }

        let raw = flex.is_high();
        LEVEL_MIRROR[pin as usize].store(raw, Ordering::Relaxed);
        handler.on_edge(raw, Instant::now().as_micros());
    }
}

/// Build the GPIO bank array for [`RpGpioDriver::new`] from Embassy
/// peripherals
///
/// Usage:
/// ```ignore
/// let p = embassy_rp::init(Default::default());
/// let driver = RpGpioDriver::new(spawner, pin_bank!(p));
/// ```
#[macro_export]
macro_rules! pin_bank {
    ($p:expr) => {
        [
            embassy_rp::Peri::<embassy_rp::gpio::AnyPin>::from($p.PIN_0),
            embassy_rp::Peri::<embassy_rp::gpio::AnyPin>::from($p.PIN_1),
            embassy_rp::Peri::<embassy_rp::gpio::AnyPin>::from($p.PIN_2),
            embassy_rp::Peri::<embassy_rp::gpio::AnyPin>::from($p.PIN_3),
            embassy_rp::Peri::<embassy_rp::gpio::AnyPin>::from($p.PIN_4),
            embassy_rp::Peri::<embassy_rp::gpio::AnyPin>::from($p.PIN_5),
            embassy_rp::Peri::<embassy_rp::gpio::AnyPin>::from($p.PIN_6),
            embassy_rp::Peri::<embassy_rp::gpio::AnyPin>::from($p.PIN_7),
            embassy_rp::Peri::<embassy_rp::gpio::AnyPin>::from($p.PIN_8),
            embassy_rp::Peri::<embassy_rp::gpio::AnyPin>::from($p.PIN_9),
            embassy_rp::Peri::<embassy_rp::gpio::AnyPin>::from($p.PIN_10),
            embassy_rp::Peri::<embassy_rp::gpio::AnyPin>::from($p.PIN_11),
            embassy_rp::Peri::<embassy_rp::gpio::AnyPin>::from($p.PIN_12),
            embassy_rp::Peri::<embassy_rp::gpio::AnyPin>::from($p.PIN_13),
            embassy_rp::Peri::<embassy_rp::gpio::AnyPin>::from($p.PIN_14),
            embassy_rp::Peri::<embassy_rp::gpio::AnyPin>::from($p.PIN_15),
            embassy_rp::Peri::<embassy_rp::gpio::AnyPin>::from($p.PIN_16),
            embassy_rp::Peri::<embassy_rp::gpio::AnyPin>::from($p.PIN_17),
            embassy_rp::Peri::<embassy_rp::gpio::AnyPin>::from($p.PIN_18),
            embassy_rp::Peri::<embassy_rp::gpio::AnyPin>::from($p.PIN_19),
            embassy_rp::Peri::<embassy_rp::gpio::AnyPin>::from($p.PIN_20),
            embassy_rp::Peri::<embassy_rp::gpio::AnyPin>::from($p.PIN_21),
            embassy_rp::Peri::<embassy_rp::gpio::AnyPin>::from($p.PIN_22),
            embassy_rp::Peri::<embassy_rp::gpio::AnyPin>::from($p.PIN_23),
            embassy_rp::Peri::<embassy_rp::gpio::AnyPin>::from($p.PIN_24),
            embassy_rp::Peri::<embassy_rp::gpio::AnyPin>::from($p.PIN_25),
            embassy_rp::Peri::<embassy_rp::gpio::AnyPin>::from($p.PIN_26),
            embassy_rp::Peri::<embassy_rp::gpio::AnyPin>::from($p.PIN_27),
            embassy_rp::Peri::<embassy_rp::gpio::AnyPin>::from($p.PIN_28),
            embassy_rp::Peri::<embassy_rp::gpio::AnyPin>::from($p.PIN_29),
        ]
    };
}
