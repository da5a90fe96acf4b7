//! Unified error types for the controller.
//!
//! A single `Error` enum that every subsystem converts into, keeping the
//! event loop's error handling uniform.  All variants are `Copy` so they can
//! be logged, stored in an outcome, and re-reported without allocation.

use core::fmt;
use std::io;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible operation in the crate funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// open/seek/read/write failed on the medium, the state file, or a GPIO node.
    Io {
        op: &'static str,
        kind: io::ErrorKind,
        errno: Option<i32>,
    },
    /// The medium could not be opened for reading (no disk in the drive).
    MediumUnavailable { errno: Option<i32> },
    /// The state file is absent or shorter than its 4-byte layout.
    StateUnavailable,
    /// A decoded or CLI-constructed command failed validation.
    InvalidCommand(InvalidCommand),
    /// A required configuration key is absent.
    ConfigMissing(&'static str),
    /// A configuration key is present but unusable.
    ConfigInvalid(&'static str),
    /// A relay or buzzer pin could not be driven.
    Actuator(ActuatorError),
    /// The external scheduler refused the job.
    Scheduler(SchedulerError),
    /// The emergency stop latched before or during a brew.
    Interrupted,
}

impl Error {
    /// Wrap an `io::Error` with the name of the operation that failed.
    pub fn io(op: &'static str, err: &io::Error) -> Self {
        Self::Io {
            op,
            kind: err.kind(),
            errno: err.raw_os_error(),
        }
    }

    /// True for conditions the controller recovers from by staying idle.
    pub fn is_transient(&self) -> bool {
        !matches!(self, Self::ConfigMissing(_) | Self::ConfigInvalid(_))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { op, kind, errno } => match errno {
                Some(code) => write!(f, "{op}: {kind} (errno {code})"),
                None => write!(f, "{op}: {kind}"),
            },
            Self::MediumUnavailable { errno } => match errno {
                Some(code) => write!(f, "medium unavailable (errno {code})"),
                None => write!(f, "medium unavailable"),
            },
            Self::StateUnavailable => write!(f, "state file unavailable"),
            Self::InvalidCommand(e) => write!(f, "invalid command: {e}"),
            Self::ConfigMissing(key) => write!(f, "config: missing required key `{key}`"),
            Self::ConfigInvalid(key) => write!(f, "config: invalid value for `{key}`"),
            Self::Actuator(e) => write!(f, "actuator: {e}"),
            Self::Scheduler(e) => write!(f, "scheduler: {e}"),
            Self::Interrupted => write!(f, "interrupted by emergency stop"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Command validation errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidCommand {
    /// Byte 0 is neither the schedule nor the brew tag.
    UnknownTag(i8),
    HourOutOfRange(i8),
    MinuteOutOfRange(i8),
    QuantityOutOfRange(i8),
    UnknownVariety(i8),
    /// A schedule command was handed to the sequencer.
    NotABrew,
    /// A "now" disk was inserted but no brew command has been saved yet.
    NoSavedBrew,
}

impl fmt::Display for InvalidCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownTag(t) => write!(f, "unknown tag {t}"),
            Self::HourOutOfRange(h) => write!(f, "hour {h} outside -1..=23"),
            Self::MinuteOutOfRange(m) => write!(f, "minute {m} outside -1..=59"),
            Self::QuantityOutOfRange(q) => write!(f, "quantity {q} outside 1..=2"),
            Self::UnknownVariety(v) => write!(f, "unknown variety tag {v}"),
            Self::NotABrew => write!(f, "not a brew command"),
            Self::NoSavedBrew => write!(f, "no saved brew command"),
        }
    }
}

impl From<InvalidCommand> for Error {
    fn from(e: InvalidCommand) -> Self {
        Self::InvalidCommand(e)
    }
}

// ---------------------------------------------------------------------------
// Actuator errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorError {
    /// Setting a pin level failed.
    GpioWriteFailed,
    /// Returning a pin to high-impedance input mode failed.
    GpioReleaseFailed,
}

impl fmt::Display for ActuatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GpioWriteFailed => write!(f, "GPIO write failed"),
            Self::GpioReleaseFailed => write!(f, "GPIO release failed"),
        }
    }
}

impl From<ActuatorError> for Error {
    fn from(e: ActuatorError) -> Self {
        Self::Actuator(e)
    }
}

// ---------------------------------------------------------------------------
// Scheduler errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerError {
    /// The crontab binary could not be started.
    SpawnFailed,
    /// crontab exited non-zero (exit code when available).
    Rejected(Option<i32>),
}

impl fmt::Display for SchedulerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SpawnFailed => write!(f, "could not run crontab"),
            Self::Rejected(Some(code)) => write!(f, "crontab exited with status {code}"),
            Self::Rejected(None) => write!(f, "crontab killed by signal"),
        }
    }
}

impl From<SchedulerError> for Error {
    fn from(e: SchedulerError) -> Self {
        Self::Scheduler(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
