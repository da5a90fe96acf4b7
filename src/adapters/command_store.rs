//! Local state file holding the last schedule and brew commands.
//!
//! Layout (4 bytes, tag not stored, slot position implies kind):
//! ```text
//! ┌──────────┬──────────┬──────────┬──────────┐
//! │ 0 hour   │ 1 minute │ 2 qty    │ 3 variety│
//! └──────────┴──────────┴──────────┴──────────┘
//!  schedule slot [0,2)   brew slot [2,4)
//! ```
//!
//! The file is created by the install step.  `save` opens it read+write
//! without create or truncate, so updating one slot never disturbs the other.

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use log::{debug, error, info, warn};

use crate::app::ports::{StatePort, StoredCommands};
use crate::codec::{BrewCommand, Command, ScheduleCommand};
use crate::error::{Error, Result};

pub const STATE_LEN: usize = 4;

const SCHEDULE_OFFSET: u64 = 0;
const BREW_OFFSET: u64 = 2;

/// Decode both slots; an invalid slot becomes `None`.
pub fn decode_slots(raw: [u8; STATE_LEN]) -> StoredCommands {
    let b = raw.map(|x| x as i8);
    let schedule = ScheduleCommand::from_payload([b[0], b[1]])
        .inspect_err(|e| warn!("state: schedule slot ignored: {}", e))
        .ok();
    let brew = BrewCommand::from_payload([b[2], b[3]])
        .inspect_err(|e| debug!("state: brew slot empty: {}", e))
        .ok();
    StoredCommands { schedule, brew }
}

#[derive(Debug, Clone)]
pub struct CommandStore {
    path: PathBuf,
}

impl CommandStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn unavailable_or_io(op: &'static str, e: &io::Error) -> Error {
        match e.kind() {
            io::ErrorKind::NotFound | io::ErrorKind::UnexpectedEof => Error::StateUnavailable,
            _ => Error::io(op, e),
        }
    }
}

impl StatePort for CommandStore {
    fn load(&self) -> Result<StoredCommands> {
        let mut f = File::open(&self.path).map_err(|e| {
            warn!("state: open {} failed: {}", self.path.display(), e);
            Self::unavailable_or_io("open state file", &e)
        })?;
        let mut raw = [0u8; STATE_LEN];
        f.read_exact(&mut raw).map_err(|e| {
            warn!("state: read {} failed: {}", self.path.display(), e);
            Self::unavailable_or_io("read state file", &e)
        })?;
        Ok(decode_slots(raw))
    }

    fn save(&mut self, cmd: &Command) -> Result<()> {
        let (offset, payload) = match cmd {
            Command::Schedule(s) => (SCHEDULE_OFFSET, s.payload()),
            Command::Brew(b) => (BREW_OFFSET, b.payload()),
        };

        let mut f = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&self.path)
            .map_err(|e| {
                warn!("state: open {} for write failed: {}", self.path.display(), e);
                Self::unavailable_or_io("open state file", &e)
            })?;
        let path = &self.path;
        let io_err = |op: &'static str| {
            move |e: io::Error| {
                error!("state: {} {} failed: {}", op, path.display(), e);
                Error::io(op, &e)
            }
        };
        f.seek(SeekFrom::Start(offset))
            .map_err(io_err("seek state file"))?;
        f.write_all(&payload.map(|b| b as u8))
            .map_err(io_err("write state file"))?;
        f.sync_data().map_err(io_err("sync state file"))?;

        info!("STATE | saved {}", cmd);
        Ok(())
    }
}
