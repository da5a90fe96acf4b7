//! Outbound application events.
//!
//! The [`BrewController`](super::service::BrewController) emits these through
//! the [`EventSink`](super::ports::EventSink) port.  The log adapter turns
//! them into console lines.

use crate::codec::{BrewCommand, Command};
use crate::error::Error;
use crate::safety::BrewReport;
use crate::scheduler::DailyTime;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The event loop started; carries medium presence at boot.
    Started { medium_present: bool },

    MediumInserted,

    MediumRemoved,

    /// A disk could not be read, or its command could not be saved or scheduled.
    Rejected(Error),

    /// A command was written to the state file.
    CommandStored(Command),

    /// A daily job was installed.
    Scheduled(DailyTime),

    BrewStarted(BrewCommand),

    BrewFinished(BrewReport),

    /// A brew ended early; outputs are already de-energized.
    BrewAborted(Error),
}
