//! Application core: pure domain logic, zero I/O.
//!
//! Presence edges in, brew cycles and persisted commands out.  All
//! interaction with devices happens through the **port traits** in
//! [`ports`], keeping this layer testable without a drive or relays.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
