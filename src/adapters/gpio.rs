//! Linux sysfs GPIO pin.
//!
//! ```text
//! {root}/export            <- "17"
//! {root}/gpio17/direction  <- "out" | "in"
//! {root}/gpio17/value      <- "1" | "0"
//! ```
//!
//! Implements `embedded_hal::digital::OutputPin` so the relay and buzzer
//! drivers stay generic over the pin type.  Releasing a pin switches it to
//! input (high impedance); the next write claims it as an output again.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use embedded_hal::digital::{self, ErrorKind, ErrorType, OutputPin};
use log::{debug, warn};

/// A GPIO line that can be returned to its safe input state.
pub trait ReleasablePin: ErrorType {
    fn release(&mut self) -> Result<(), Self::Error>;
}

/// Failed sysfs write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GpioError {
    pub pin: u32,
    pub op: &'static str,
    pub kind: io::ErrorKind,
}

impl fmt::Display for GpioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gpio{} {}: {}", self.pin, self.op, self.kind)
    }
}

impl std::error::Error for GpioError {}

impl digital::Error for GpioError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Out,
    In,
}

impl Direction {
    fn as_str(self) -> &'static str {
        match self {
            Self::Out => "out",
            Self::In => "in",
        }
    }
}

#[derive(Debug)]
pub struct SysfsPin {
    pin: u32,
    dir: PathBuf,
    direction: Direction,
}

impl SysfsPin {
    /// Export `pin` under `root` and leave it in input mode.
    pub fn open(root: &Path, pin: u32) -> Result<Self, GpioError> {
        let dir = root.join(format!("gpio{pin}"));
        if !dir.exists() {
            fs::write(root.join("export"), pin.to_string()).map_err(|e| GpioError {
                pin,
                op: "export",
                kind: e.kind(),
            })?;
            debug!("gpio{}: exported", pin);
        }
        let mut p = Self {
            pin,
            dir,
            direction: Direction::Out,
        };
        p.set_direction(Direction::In)?;
        Ok(p)
    }

    pub fn number(&self) -> u32 {
        self.pin
    }

    fn write_attr(&self, attr: &str, value: &str, op: &'static str) -> Result<(), GpioError> {
        fs::write(self.dir.join(attr), value).map_err(|e| {
            warn!("gpio{}: {} failed: {}", self.pin, op, e);
            GpioError {
                pin: self.pin,
                op,
                kind: e.kind(),
            }
        })
    }

    fn set_direction(&mut self, direction: Direction) -> Result<(), GpioError> {
        if self.direction == direction {
            return Ok(());
        }
        self.write_attr("direction", direction.as_str(), "set direction")?;
        self.direction = direction;
        Ok(())
    }

    fn drive(&mut self, high: bool) -> Result<(), GpioError> {
        self.set_direction(Direction::Out)?;
        self.write_attr("value", if high { "1" } else { "0" }, "write value")
    }
}

impl ErrorType for SysfsPin {
    type Error = GpioError;
}

impl OutputPin for SysfsPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.drive(false)
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.drive(true)
    }
}

impl ReleasablePin for SysfsPin {
    fn release(&mut self) -> Result<(), Self::Error> {
        self.set_direction(Direction::In)
    }
}
