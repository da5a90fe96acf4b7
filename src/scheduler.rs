//! "Brew later" handoff to cron.
//!
//! The controller never keeps time itself.  A schedule disk becomes one
//! recurring crontab entry that re-invokes `make-coffee` at that time of
//! day:
//!
//! ```text
//! 30 7 * * * /usr/local/bin/floppy-coffee --config /etc/floppy-coffee.toml make-coffee # floppy-coffee
//! │  │
//! │  └─ hour
//! └──── minute (cron field order, and the order used everywhere in this module)
//! ```
//!
//! Installing a new time replaces the previous tagged entry; the rest of the
//! user's crontab is preserved.

use std::fmt;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use log::{debug, error, info};
use serde::Serialize;

use crate::app::ports::SchedulerPort;
use crate::error::{Error, Result, SchedulerError};

/// Trailing comment identifying our entry.
pub const CRON_TAG: &str = "# floppy-coffee";

/// A concrete time of day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DailyTime {
    pub hour: u8,
    pub minute: u8,
}

impl fmt::Display for DailyTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// Build the tagged crontab line for `at`.
pub fn render_entry(at: DailyTime, invocation: &str) -> String {
    format!("{} {} * * * {} {}", at.minute, at.hour, invocation, CRON_TAG)
}

/// Replace any previously tagged line in `existing` with `entry`.
pub fn merge_crontab(existing: &str, entry: &str) -> String {
    let mut out: String = existing
        .lines()
        .filter(|line| !line.trim_end().ends_with(CRON_TAG))
        .flat_map(|line| [line, "\n"])
        .collect();
    out.push_str(entry);
    out.push('\n');
    out
}

/// Quote `arg` for the shell command field of a crontab line.
///
/// Anything outside a conservative plain set is single-quoted, and `%` is
/// always escaped because cron turns a bare `%` into a newline.
pub fn cron_quote(arg: &str) -> String {
    let plain = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "/._-+:,@=".contains(c));
    let quoted = if plain {
        arg.to_owned()
    } else {
        format!("'{}'", arg.replace('\'', r"'\''"))
    };
    quoted.replace('%', r"\%")
}

/// [`SchedulerPort`] backed by the user's crontab.
pub struct CronScheduler {
    crontab: String,
    program: PathBuf,
    config_path: PathBuf,
}

impl CronScheduler {
    pub fn new(crontab: impl Into<String>, program: PathBuf, config_path: PathBuf) -> Self {
        Self {
            crontab: crontab.into(),
            program,
            config_path,
        }
    }

    fn invocation(&self) -> String {
        format!(
            "{} --config {} make-coffee",
            cron_quote(&self.program.to_string_lossy()),
            cron_quote(&self.config_path.to_string_lossy())
        )
    }

    fn read_table(&self) -> Result<String> {
        let output = Command::new(&self.crontab)
            .arg("-l")
            .stdin(Stdio::null())
            .output()
            .map_err(|e| {
                error!("crontab -l: spawn failed: {}", e);
                Error::from(SchedulerError::SpawnFailed)
            })?;

        if output.status.success() {
            return Ok(String::from_utf8_lossy(&output.stdout).into_owned());
        }
        let stderr = String::from_utf8_lossy(&output.stderr);
        if stderr.contains("no crontab") {
            debug!("crontab -l: no existing table");
            return Ok(String::new());
        }
        error!("crontab -l failed: {}", stderr.trim());
        Err(SchedulerError::Rejected(output.status.code()).into())
    }

    fn write_table(&self, table: &str) -> Result<()> {
        let mut child = Command::new(&self.crontab)
            .arg("-")
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                error!("crontab -: spawn failed: {}", e);
                Error::from(SchedulerError::SpawnFailed)
            })?;

        // stdin is closed at the end of this statement, before the wait.
        let fed = match child.stdin.take() {
            Some(mut stdin) => stdin.write_all(table.as_bytes()),
            None => Ok(()),
        };

        // Always reaped, even when feeding the table failed.
        let output = child.wait_with_output().map_err(|e| {
            error!("crontab -: wait failed: {}", e);
            Error::io("wait crontab", &e)
        })?;
        if !output.status.success() {
            error!(
                "crontab - rejected table: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            );
            return Err(SchedulerError::Rejected(output.status.code()).into());
        }
        fed.map_err(|e| {
            error!("crontab -: writing table failed: {}", e);
            Error::io("write crontab", &e)
        })
    }
}

impl SchedulerPort for CronScheduler {
    fn schedule_daily(&mut self, at: DailyTime) -> Result<()> {
        let entry = render_entry(at, &self.invocation());
        let table = merge_crontab(&self.read_table()?, &entry);
        self.write_table(&table)?;
        info!("SCHED | daily brew at {} installed", at);
        Ok(())
    }
}
