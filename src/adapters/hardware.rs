//! Hardware adapter: bridges the relay and buzzer drivers to domain ports.
//!
//! Owns both relays and the buzzer, exposing them through [`ActuatorPort`]
//! and [`BuzzerPort`].  This is the only module that drives actual pins;
//! generic over the pin type so the host tests run on recording pins.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use log::{error, info};

use crate::adapters::gpio::{ReleasablePin, SysfsPin};
use crate::adapters::time::StdDelay;
use crate::app::ports::{ActuatorPort, BeepPattern, BuzzerPort, Channel, OutputState};
use crate::config::BrewConfig;
use crate::drivers::buzzer::Buzzer;
use crate::drivers::relay::Relay;
use crate::error::{ActuatorError, Error, Result};

/// Production board: sysfs pins, sleeping delay.
pub type SysfsRelayBoard = RelayBoard<SysfsPin, StdDelay>;

/// Concrete adapter that combines all outputs behind port traits.
pub struct RelayBoard<P, D> {
    power: Relay<P>,
    water: Relay<P>,
    buzzer: Buzzer<P, D>,
}

impl<P, D> RelayBoard<P, D>
where
    P: OutputPin + ReleasablePin,
    D: DelayNs,
{
    pub fn new(power: P, water: P, beep: P, delay: D) -> Self {
        Self {
            power: Relay::new(power, "power"),
            water: Relay::new(water, "water"),
            buzzer: Buzzer::new(beep, delay),
        }
    }

    pub fn relay(&self, channel: Channel) -> &Relay<P> {
        match channel {
            Channel::Power => &self.power,
            Channel::Water => &self.water,
        }
    }
}

impl SysfsRelayBoard {
    /// Export the three configured pins.
    pub fn open(config: &BrewConfig) -> Result<Self> {
        let open = |pin: u32| {
            SysfsPin::open(&config.gpio_root, pin).map_err(|e| {
                error!("gpio: {}", e);
                Error::from(ActuatorError::GpioWriteFailed)
            })
        };
        let board = Self::new(
            open(config.power_pin)?,
            open(config.water_pin)?,
            open(config.beep_pin)?,
            StdDelay,
        );
        info!(
            "HW | power=gpio{} water=gpio{} beep=gpio{}",
            config.power_pin, config.water_pin, config.beep_pin
        );
        Ok(board)
    }
}

// ── ActuatorPort implementation ───────────────────────────────

impl<P, D> ActuatorPort for RelayBoard<P, D>
where
    P: OutputPin + ReleasablePin,
    D: DelayNs,
{
    fn set_output(
        &mut self,
        channel: Channel,
        state: OutputState,
    ) -> core::result::Result<(), ActuatorError> {
        let on = state == OutputState::Energized;
        match channel {
            Channel::Power => self.power.set(on),
            Channel::Water => self.water.set(on),
        }
    }

    fn release(&mut self) -> core::result::Result<(), ActuatorError> {
        let water = self.water.release();
        let power = self.power.release();
        water.and(power)
    }
}

// ── BuzzerPort implementation ─────────────────────────────────

impl<P, D> BuzzerPort for RelayBoard<P, D>
where
    P: OutputPin + ReleasablePin,
    D: DelayNs,
{
    fn beep(&mut self, pattern: BeepPattern) -> core::result::Result<(), ActuatorError> {
        self.buzzer.beep(pattern)
    }
}
