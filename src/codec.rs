//! Disk command codec.
//!
//! Wire format of one entry (3 signed bytes):
//! ```text
//! ┌─────────┬──────────────┬──────────────┐
//! │ Tag     │ Field 1      │ Field 2      │
//! ├─────────┼──────────────┼──────────────┤
//! │ 0 Sched │ hour | -1    │ minute | -1  │
//! │ 1 Brew  │ quantity 1-2 │ variety 2/3  │
//! └─────────┴──────────────┴──────────────┘
//! ```
//!
//! An encoded block is the same entry repeated N times back to back.  The
//! medium is a worn floppy, so reads come back with sparse byte flips;
//! [`collapse`] folds the N samples of each byte position back into one.

use core::fmt;

use chrono::{NaiveTime, Timelike};
use serde::{Serialize, Serializer};

use crate::error::InvalidCommand;
use crate::scheduler::DailyTime;

/// Bytes per encoded entry.
pub const ENTRY_SIZE: usize = 3;

pub const TAG_SCHEDULE: i8 = 0;
pub const TAG_BREW: i8 = 1;

/// "Use the current hour/minute" sentinel.
pub const NOW: i8 = -1;

const MAX_HOUR: i8 = 23;
const MAX_MINUTE: i8 = 59;
const MAX_QUANTITY: i8 = 2;

// ---------------------------------------------------------------------------
// Schedule fields
// ---------------------------------------------------------------------------

/// One hour or minute field of a schedule command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeField {
    Now,
    At(u8),
}

impl TimeField {
    fn from_wire(raw: i8, max: i8) -> Option<Self> {
        match raw {
            NOW => Some(Self::Now),
            v if (0..=max).contains(&v) => Some(Self::At(v as u8)),
            _ => None,
        }
    }

    fn to_wire(self) -> i8 {
        match self {
            Self::Now => NOW,
            Self::At(v) => v as i8,
        }
    }

    fn or_current(self, current: u32) -> u8 {
        match self {
            Self::Now => current as u8,
            Self::At(v) => v,
        }
    }
}

impl Serialize for TimeField {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Now => s.serialize_str("now"),
            Self::At(v) => s.serialize_u8(*v),
        }
    }
}

impl fmt::Display for TimeField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Now => write!(f, "now"),
            Self::At(v) => write!(f, "{v:02}"),
        }
    }
}

/// "Brew at hour:minute" command.  Either field may be [`TimeField::Now`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScheduleCommand {
    pub hour: TimeField,
    pub minute: TimeField,
}

impl ScheduleCommand {
    /// Validate raw hour/minute values (`-1` means now).
    pub fn new(hour: i8, minute: i8) -> Result<Self, InvalidCommand> {
        let hour =
            TimeField::from_wire(hour, MAX_HOUR).ok_or(InvalidCommand::HourOutOfRange(hour))?;
        let minute = TimeField::from_wire(minute, MAX_MINUTE)
            .ok_or(InvalidCommand::MinuteOutOfRange(minute))?;
        Ok(Self { hour, minute })
    }

    /// The blank "make it now" disk.
    pub const fn now() -> Self {
        Self {
            hour: TimeField::Now,
            minute: TimeField::Now,
        }
    }

    /// Both fields carry the now sentinel.
    pub fn is_now(&self) -> bool {
        self.hour == TimeField::Now && self.minute == TimeField::Now
    }

    /// Substitute the current clock for any `Now` field.
    pub fn resolve(&self, now: NaiveTime) -> DailyTime {
        DailyTime {
            hour: self.hour.or_current(now.hour()),
            minute: self.minute.or_current(now.minute()),
        }
    }

    pub(crate) fn payload(&self) -> [i8; 2] {
        [self.hour.to_wire(), self.minute.to_wire()]
    }

    pub(crate) fn from_payload(p: [i8; 2]) -> Result<Self, InvalidCommand> {
        Self::new(p[0], p[1])
    }
}

// ---------------------------------------------------------------------------
// Brew fields
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Variety {
    Espresso,
    Americano,
}

impl Variety {
    pub const fn tag(self) -> i8 {
        match self {
            Self::Espresso => 2,
            Self::Americano => 3,
        }
    }

    pub fn from_tag(tag: i8) -> Result<Self, InvalidCommand> {
        match tag {
            2 => Ok(Self::Espresso),
            3 => Ok(Self::Americano),
            other => Err(InvalidCommand::UnknownVariety(other)),
        }
    }
}

impl fmt::Display for Variety {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Espresso => write!(f, "Espresso"),
            Self::Americano => write!(f, "Americano"),
        }
    }
}

/// "Brew `quantity` cups of `variety`" command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BrewCommand {
    quantity: u8,
    variety: Variety,
}

impl BrewCommand {
    pub fn new(quantity: i8, variety: Variety) -> Result<Self, InvalidCommand> {
        if !(1..=MAX_QUANTITY).contains(&quantity) {
            return Err(InvalidCommand::QuantityOutOfRange(quantity));
        }
        Ok(Self {
            quantity: quantity as u8,
            variety,
        })
    }

    pub fn quantity(&self) -> u8 {
        self.quantity
    }

    pub fn variety(&self) -> Variety {
        self.variety
    }

    pub(crate) fn payload(&self) -> [i8; 2] {
        [self.quantity as i8, self.variety.tag()]
    }

    pub(crate) fn from_payload(p: [i8; 2]) -> Result<Self, InvalidCommand> {
        // Quantity is checked first so a fully blank slot reports the quantity.
        if !(1..=MAX_QUANTITY).contains(&p[0]) {
            return Err(InvalidCommand::QuantityOutOfRange(p[0]));
        }
        Self::new(p[0], Variety::from_tag(p[1])?)
    }
}

// ---------------------------------------------------------------------------
// Command
// ---------------------------------------------------------------------------

/// A decoded disk command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Command {
    Schedule(ScheduleCommand),
    Brew(BrewCommand),
}

impl Command {
    pub fn tag(&self) -> i8 {
        match self {
            Self::Schedule(_) => TAG_SCHEDULE,
            Self::Brew(_) => TAG_BREW,
        }
    }

    /// `[tag, field1, field2]`.
    pub fn encode(&self) -> [i8; ENTRY_SIZE] {
        let [a, b] = match self {
            Self::Schedule(s) => s.payload(),
            Self::Brew(b) => b.payload(),
        };
        [self.tag(), a, b]
    }

    /// Select the variant from byte 0 and validate its fields.
    pub fn decode(entry: [i8; ENTRY_SIZE]) -> Result<Self, InvalidCommand> {
        let payload = [entry[1], entry[2]];
        match entry[0] {
            TAG_SCHEDULE => ScheduleCommand::from_payload(payload).map(Self::Schedule),
            TAG_BREW => BrewCommand::from_payload(payload).map(Self::Brew),
            other => Err(InvalidCommand::UnknownTag(other)),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Schedule(s) if s.is_now() => write!(f, "time: now"),
            Self::Schedule(s) => write!(f, "time: {}h {}m", s.hour, s.minute),
            Self::Brew(b) => write!(f, "variety: {}x {}", b.quantity, b.variety),
        }
    }
}

// ---------------------------------------------------------------------------
// Redundant block encoding
// ---------------------------------------------------------------------------

/// Repeat `entry` `copies` times contiguously.
pub fn repeat(entry: [i8; ENTRY_SIZE], copies: usize) -> Vec<u8> {
    let bytes = entry.map(|b| b as u8);
    let mut out = Vec::with_capacity(copies * ENTRY_SIZE);
    for _ in 0..copies {
        out.extend_from_slice(&bytes);
    }
    out
}

/// Collapse N redundant copies back into one entry.
///
/// Each byte position is decided independently: the value held by a strict
/// majority of the copies wins; with no strict majority the truncated
/// arithmetic mean of the samples is used.  Returns `None` when `samples`
/// is empty or not a whole number of entries.
pub fn collapse(samples: &[u8]) -> Option<[i8; ENTRY_SIZE]> {
    if samples.is_empty() || samples.len() % ENTRY_SIZE != 0 {
        return None;
    }
    let copies = samples.len() / ENTRY_SIZE;

    let mut out = [0i8; ENTRY_SIZE];
    for (pos, slot) in out.iter_mut().enumerate() {
        let mut counts = [0usize; 256];
        let mut sum: i64 = 0;
        for entry in samples.chunks_exact(ENTRY_SIZE) {
            let v = entry[pos];
            counts[v as usize] += 1;
            sum += i64::from(v as i8);
        }

        *slot = match counts.iter().position(|&n| n * 2 > copies) {
            Some(winner) => winner as u8 as i8,
            None => (sum / copies as i64) as i8,
        };
    }
    Some(out)
}
