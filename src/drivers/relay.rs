//! Single-channel relay driver (heater or water valve).
//!
//! Active-high coil drive.  The driver keeps its own view of the coil so
//! callers can assert on it without reading the pin back.
//!
//! ## Safety contract
//!
//! This driver is a dumb actuator.  Ordering and the all-off guarantee live
//! in [`crate::safety`].

use embedded_hal::digital::OutputPin;
use log::{debug, warn};

use crate::adapters::gpio::ReleasablePin;
use crate::error::ActuatorError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayState {
    /// Pin in input mode, coil undriven.
    Released,
    Off,
    On,
}

pub struct Relay<P> {
    pin: P,
    label: &'static str,
    state: RelayState,
}

impl<P: OutputPin + ReleasablePin> Relay<P> {
    pub fn new(pin: P, label: &'static str) -> Self {
        Self {
            pin,
            label,
            state: RelayState::Released,
        }
    }

    pub fn set(&mut self, on: bool) -> Result<(), ActuatorError> {
        let res = if on { self.pin.set_high() } else { self.pin.set_low() };
        res.map_err(|e| {
            warn!("{} relay: write failed: {:?}", self.label, e);
            ActuatorError::GpioWriteFailed
        })?;
        self.state = if on { RelayState::On } else { RelayState::Off };
        debug!("{} relay {}", self.label, if on { "on" } else { "off" });
        Ok(())
    }

    pub fn release(&mut self) -> Result<(), ActuatorError> {
        self.pin.release().map_err(|e| {
            warn!("{} relay: release failed: {:?}", self.label, e);
            ActuatorError::GpioReleaseFailed
        })?;
        self.state = RelayState::Released;
        Ok(())
    }

    pub fn state(&self) -> RelayState {
        self.state
    }

    pub fn is_on(&self) -> bool {
        self.state == RelayState::On
    }

    pub fn pin(&self) -> &P {
        &self.pin
    }
}
