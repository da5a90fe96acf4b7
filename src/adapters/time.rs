//! Host time adapters.
//!
//! - [`SystemClock`] reads local wall-clock time for resolving "now"
//!   schedule fields.
//! - [`StdDelay`] is the blocking `DelayNs` used by the buzzer driver.

use std::thread;
use std::time::Duration;

use chrono::{Local, NaiveTime};
use embedded_hal::delay::DelayNs;

use crate::app::ports::Clock;

/// Local timezone wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveTime {
        Local::now().time()
    }
}

/// `thread::sleep`-backed delay.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdDelay;

impl DelayNs for StdDelay {
    fn delay_ns(&mut self, ns: u32) {
        thread::sleep(Duration::from_nanos(u64::from(ns)));
    }

    fn delay_us(&mut self, us: u32) {
        thread::sleep(Duration::from_micros(u64::from(us)));
    }

    fn delay_ms(&mut self, ms: u32) {
        thread::sleep(Duration::from_millis(u64::from(ms)));
    }
}
