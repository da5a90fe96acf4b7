//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ BrewController (domain)
//! ```
//!
//! Driven adapters (medium, state file, relays, buzzer, crontab, clock)
//! implement these traits.  The [`BrewController`](super::service::BrewController)
//! and [`ActuatorSequencer`](crate::safety::ActuatorSequencer) consume them via
//! generics, so the domain core never touches a device node directly.

use std::time::Duration;

use chrono::NaiveTime;
use serde::Serialize;

use crate::codec::{BrewCommand, Command, ScheduleCommand};
use crate::error::{ActuatorError, Result};
use crate::safety::{Hold, StopSignal};
use crate::scheduler::DailyTime;

// ───────────────────────────────────────────────────────────────
// Medium ports (driven adapter: floppy ↔ domain)
// ───────────────────────────────────────────────────────────────

/// Redundant command block on the raw medium.
pub trait MediumPort {
    /// Read and majority-decode the block.
    ///
    /// Fails with [`Error::MediumUnavailable`](crate::error::Error::MediumUnavailable)
    /// when the device cannot be opened, never with a zeroed command.
    fn read_command(&mut self) -> Result<Command>;

    /// Encode `cmd` and write every redundant copy.
    fn write_command(&mut self, cmd: &Command) -> Result<()>;
}

/// Cheap presence test used by the monitor.  Not a full read.
pub trait PresenceProbe {
    fn probe(&self) -> bool;
}

// ───────────────────────────────────────────────────────────────
// State port (driven adapter: domain ↔ local state file)
// ───────────────────────────────────────────────────────────────

/// The two persisted slots.  A slot that failed validation is `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StoredCommands {
    pub schedule: Option<ScheduleCommand>,
    pub brew: Option<BrewCommand>,
}

/// Most-recently-seen schedule and brew commands.
pub trait StatePort {
    /// Fails with `StateUnavailable` on first run; callers fall back to
    /// [`StoredCommands::default`].
    fn load(&self) -> Result<StoredCommands>;

    /// Overwrite the slot matching `cmd`'s kind, leaving the other untouched.
    fn save(&mut self, cmd: &Command) -> Result<()>;
}

// ───────────────────────────────────────────────────────────────
// Scheduler port (driven adapter: domain → cron)
// ───────────────────────────────────────────────────────────────

/// Arranges a recurring re-invocation of `make-coffee`.
pub trait SchedulerPort {
    fn schedule_daily(&mut self, at: DailyTime) -> Result<()>;
}

// ───────────────────────────────────────────────────────────────
// Actuator ports (driven adapter: domain → GPIO)
// ───────────────────────────────────────────────────────────────

/// The two relay channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Heater relay.
    Power,
    /// Water valve relay.
    Water,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputState {
    Energized,
    DeEnergized,
}

/// Write-side port for the relay pair.
pub trait ActuatorPort {
    fn set_output(&mut self, channel: Channel, state: OutputState)
        -> core::result::Result<(), ActuatorError>;

    /// Return both relay pins to high-impedance input mode.
    fn release(&mut self) -> core::result::Result<(), ActuatorError>;
}

/// Audible feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BeepPattern {
    pub count: u8,
    pub on: Duration,
    pub off: Duration,
}

pub trait BuzzerPort {
    fn beep(&mut self, pattern: BeepPattern) -> core::result::Result<(), ActuatorError>;
}

// ───────────────────────────────────────────────────────────────
// Time ports
// ───────────────────────────────────────────────────────────────

/// Blocking hold between sequencer steps.  Must return
/// [`Hold::Stopped`] promptly once `stop` is triggered.
pub trait Timer {
    fn hold(&mut self, duration: Duration, stop: &StopSignal) -> Hold;
}

/// Local wall clock, used to resolve "now" schedule fields.
pub trait Clock {
    fn now(&self) -> NaiveTime;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}
