//! Piezo buzzer on a plain GPIO line.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use log::warn;

use crate::app::ports::BeepPattern;
use crate::error::ActuatorError;

fn millis(d: core::time::Duration) -> u32 {
    u32::try_from(d.as_millis()).unwrap_or(u32::MAX)
}

pub struct Buzzer<P, D> {
    pin: P,
    delay: D,
}

impl<P: OutputPin, D: DelayNs> Buzzer<P, D> {
    pub fn new(pin: P, delay: D) -> Self {
        Self { pin, delay }
    }

    /// Sound `pattern.count` pulses.  The line is always left low.
    pub fn beep(&mut self, pattern: BeepPattern) -> Result<(), ActuatorError> {
        for i in 0..pattern.count {
            if let Err(e) = self.pin.set_high() {
                warn!("buzzer: write failed: {:?}", e);
                let _ = self.pin.set_low();
                return Err(ActuatorError::GpioWriteFailed);
            }
            self.delay.delay_ms(millis(pattern.on));
            self.pin.set_low().map_err(|e| {
                warn!("buzzer: write failed: {:?}", e);
                ActuatorError::GpioWriteFailed
            })?;
            if i + 1 < pattern.count {
                self.delay.delay_ms(millis(pattern.off));
            }
        }
        Ok(())
    }

    pub fn pin(&self) -> &P {
        &self.pin
    }
}
