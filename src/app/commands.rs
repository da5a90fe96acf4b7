//! Inbound commands to the application core.
//!
//! What the operator asked for, already validated.  The CLI layer builds
//! one of these; `main` wires the adapters it needs and executes it.

use crate::codec::Command;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppCommand {
    /// Enter the presence event loop.
    MonitorDisks,

    /// Brew the saved brew command once.
    MakeCoffee,

    /// Encode a command onto the medium.
    WriteDisk(Command),

    /// De-energize both relays unconditionally.
    StopHeater,

    /// Decode the medium and print it.
    ReadDisk { json: bool },

    /// Print the persisted slots.
    ShowState { json: bool },
}
