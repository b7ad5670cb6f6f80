//! Digital output pin
//!
//! Stateless beyond identity: the level is never cached, every read
//! goes back to the driver.

use core::convert::Infallible;

use palmos_core::Level;
use palmos_hal::gpio::{Direction, GpioDriver, PinConfig, Pull, Trigger};

use crate::ConfigError;

/// Digital output pin
///
/// Owns one GPIO line configured for output with the input path left
/// enabled, so [`level`](Self::level) reads the line as actually
/// driven.
pub struct OutputPin<'d, D: GpioDriver> {
    driver: &'d D,
    pin: u8,
}

impl<'d, D: GpioDriver> OutputPin<'d, D> {
    /// Configure `pin` for output and drive it to `default_level`
    ///
    /// The pull resistor matches the default level so the line rests
    /// there even before the output stage engages. Fails with
    /// [`ConfigError::PinFailed`] if the driver rejects the
    /// configuration; a failed pin must not be used.
    pub fn create(driver: &'d D, pin: u8, default_level: Level) -> Result<Self, ConfigError> {
        let raw = default_level.as_raw().ok_or(ConfigError::PinFailed)?;

        let config = PinConfig {
            direction: Direction::InputOutput,
            pull: if raw { Pull::Up } else { Pull::Down },
            trigger: Trigger::Disabled,
        };
        driver
            .configure(pin, &config)
            .map_err(|_| ConfigError::PinFailed)?;
        driver.write_level(pin, raw);

        Ok(Self { driver, pin })
    }

    /// Drive the pin to a level
    ///
    /// `Unknown` is not a drivable level and is ignored.
    pub fn set_level(&mut self, level: Level) {
        if let Some(raw) = level.as_raw() {
            self.driver.write_level(self.pin, raw);
        }
    }

    /// Drive the pin high
    pub fn set_high(&mut self) {
        self.driver.write_level(self.pin, true);
    }

    /// Drive the pin low
    pub fn set_low(&mut self) {
        self.driver.write_level(self.pin, false);
    }

    /// Invert the current level
    pub fn toggle(&mut self) {
        let raw = self.driver.read_level(self.pin);
        self.driver.write_level(self.pin, !raw);
    }

    /// Read the instantaneous level from the driver
    pub fn level(&self) -> Level {
        Level::from_raw(self.driver.read_level(self.pin))
    }

    /// Pin number this instance owns
    pub fn pin(&self) -> u8 {
        self.pin
    }
}

impl<'d, D: GpioDriver> embedded_hal::digital::ErrorType for OutputPin<'d, D> {
    type Error = Infallible;
}

impl<'d, D: GpioDriver> embedded_hal::digital::OutputPin for OutputPin<'d, D> {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.driver.write_level(self.pin, false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.driver.write_level(self.pin, true);
        Ok(())
    }
}

impl<'d, D: GpioDriver> embedded_hal::digital::StatefulOutputPin for OutputPin<'d, D> {
    fn is_set_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.driver.read_level(self.pin))
    }

    fn is_set_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.driver.read_level(self.pin))
    }
}
