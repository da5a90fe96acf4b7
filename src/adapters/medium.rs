//! Raw block-device adapter for the command disk.
//!
//! Implements [`MediumPort`] and [`PresenceProbe`].  No filesystem is
//! assumed: the block lives at a fixed byte offset and is addressed as a
//! plain byte range, so a regular file works the same way in tests.
//!
//! Every call opens, seeks, transfers, and closes.  Nothing holds the device
//! open between calls, which keeps the drive ejectable.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use log::{debug, error, info, warn};

use crate::app::ports::{MediumPort, PresenceProbe};
use crate::codec::{self, Command, ENTRY_SIZE};
use crate::config::BrewConfig;
use crate::error::{Error, Result};

#[derive(Debug, Clone)]
pub struct BlockMedium {
    path: PathBuf,
    offset: u64,
    copies: usize,
}

impl BlockMedium {
    pub fn new(path: impl Into<PathBuf>, offset: u64, copies: usize) -> Self {
        Self {
            path: path.into(),
            offset,
            copies,
        }
    }

    pub fn from_config(config: &BrewConfig) -> Self {
        Self::new(&config.drive, config.offset, config.copies)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write `entry` `copies` times starting at `offset`.
    pub fn write_redundant(&self, entry: [i8; ENTRY_SIZE]) -> Result<()> {
        let mut f = OpenOptions::new().write(true).open(&self.path).map_err(|e| {
            error!(
                "open {} for write failed (write-protect tab?): {}",
                self.path.display(),
                e
            );
            Error::io("open medium for write", &e)
        })?;
        f.seek(SeekFrom::Start(self.offset)).map_err(|e| {
            error!("seek to {} failed: {}", self.offset, e);
            Error::io("seek medium", &e)
        })?;

        let block = codec::repeat(entry, self.copies);
        f.write_all(&block).map_err(|e| {
            error!("write to {} failed: {}", self.path.display(), e);
            Error::io("write medium", &e)
        })?;
        f.sync_all().map_err(|e| {
            error!("sync {} failed: {}", self.path.display(), e);
            Error::io("sync medium", &e)
        })?;
        debug!("wrote {} copies of {:?} at +{}", self.copies, entry, self.offset);
        Ok(())
    }

    /// Read all copies and collapse them into one raw entry.
    pub fn read_majority(&self) -> Result<[i8; ENTRY_SIZE]> {
        let mut f = File::open(&self.path).map_err(|e| {
            warn!("open {} for read failed: {}", self.path.display(), e);
            Error::MediumUnavailable {
                errno: e.raw_os_error(),
            }
        })?;
        f.seek(SeekFrom::Start(self.offset)).map_err(|e| {
            error!("seek to {} failed: {}", self.offset, e);
            Error::io("seek medium", &e)
        })?;

        let mut samples = vec![0u8; self.copies * ENTRY_SIZE];
        f.read_exact(&mut samples).map_err(|e| {
            error!("read from {} failed: {}", self.path.display(), e);
            Error::io("read medium", &e)
        })?;

        codec::collapse(&samples).ok_or(Error::Io {
            op: "collapse medium",
            kind: std::io::ErrorKind::InvalidData,
            errno: None,
        })
    }
}

impl MediumPort for BlockMedium {
    fn read_command(&mut self) -> Result<Command> {
        let entry = self.read_majority()?;
        let cmd = Command::decode(entry).map_err(|e| {
            warn!("disk decoded to {:?}, rejected: {}", entry, e);
            Error::from(e)
        })?;
        info!("DISK | read {}", cmd);
        Ok(cmd)
    }

    fn write_command(&mut self, cmd: &Command) -> Result<()> {
        self.write_redundant(cmd.encode())?;
        info!("DISK | wrote {}", cmd);
        Ok(())
    }
}

impl PresenceProbe for BlockMedium {
    fn probe(&self) -> bool {
        File::open(&self.path).is_ok()
    }
}
