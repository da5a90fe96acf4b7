//! System configuration.
//!
//! One immutable [`BrewConfig`] is built at startup from a TOML key/value
//! file and handed to each component's constructor.  Seven keys are
//! required; anything else falls back to the defaults below.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::error;
use serde::Deserialize;

use crate::app::ports::BeepPattern;
use crate::error::{Error, Result};

pub const DEFAULT_CONFIG_PATH: &str = "/etc/floppy-coffee.toml";

const DEFAULT_OFFSET: u64 = 1000;
const DEFAULT_COPIES: usize = 100;
const DEFAULT_STATE_FILE: &str = "/var/lib/floppy-coffee/state";
const DEFAULT_POLL_MS: u64 = 500;
const DEFAULT_SETTLE_TICKS: u32 = 1;
const DEFAULT_BEEP_MS: u64 = 150;
const DEFAULT_BEEP_COUNT: u8 = 2;
const DEFAULT_GPIO_ROOT: &str = "/sys/class/gpio";
const DEFAULT_CRONTAB: &str = "crontab";

/// Core system configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrewConfig {
    // --- Medium ---
    /// Raw block device holding the command block.
    pub drive: PathBuf,
    /// Byte offset of the block on the device.
    pub offset: u64,
    /// Redundancy factor N.
    pub copies: usize,
    /// Consecutive agreeing probes before a presence change is accepted.
    pub settle_ticks: u32,
    /// Presence poll interval (milliseconds).
    pub poll_ms: u64,

    // --- Brew timing ---
    pub warmup_secs: u64,
    /// Valve-open time per espresso.
    pub espresso_secs: u64,
    /// Valve-open time per americano.
    pub americano_secs: u64,

    // --- GPIO ---
    pub water_pin: u32,
    pub power_pin: u32,
    pub beep_pin: u32,
    pub beep_ms: u64,
    pub beep_count: u8,
    /// sysfs GPIO root.
    pub gpio_root: PathBuf,

    // --- Persistence / scheduling ---
    pub state_file: PathBuf,
    /// crontab binary used for the daily job.
    pub crontab: String,
}

/// File shape.  Every key is optional here so the missing ones can be
/// reported by name.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct RawConfig {
    drive: Option<PathBuf>,
    warmup_secs: Option<u64>,
    espresso_secs: Option<u64>,
    americano_secs: Option<u64>,
    water_pin: Option<u32>,
    power_pin: Option<u32>,
    beep_pin: Option<u32>,

    offset: Option<u64>,
    copies: Option<usize>,
    state_file: Option<PathBuf>,
    poll_ms: Option<u64>,
    settle_ticks: Option<u32>,
    beep_ms: Option<u64>,
    beep_count: Option<u8>,
    gpio_root: Option<PathBuf>,
    crontab: Option<String>,
}

fn required<T>(value: Option<T>, key: &'static str) -> Result<T> {
    value.ok_or(Error::ConfigMissing(key))
}

impl BrewConfig {
    /// Read and validate the config file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| {
            error!("config: cannot read {}: {}", path.display(), e);
            match e.kind() {
                std::io::ErrorKind::NotFound => Error::ConfigMissing("file"),
                _ => Error::io("read config", &e),
            }
        })?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        let raw: RawConfig = toml::from_str(text).map_err(|e| {
            error!("config: {}", e);
            Error::ConfigInvalid("file")
        })?;

        let config = Self {
            drive: required(raw.drive, "drive")?,
            warmup_secs: required(raw.warmup_secs, "warmupSecs")?,
            espresso_secs: required(raw.espresso_secs, "espressoSecs")?,
            americano_secs: required(raw.americano_secs, "americanoSecs")?,
            water_pin: required(raw.water_pin, "waterPin")?,
            power_pin: required(raw.power_pin, "powerPin")?,
            beep_pin: required(raw.beep_pin, "beepPin")?,
            offset: raw.offset.unwrap_or(DEFAULT_OFFSET),
            copies: raw.copies.unwrap_or(DEFAULT_COPIES),
            state_file: raw
                .state_file
                .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_FILE)),
            poll_ms: raw.poll_ms.unwrap_or(DEFAULT_POLL_MS),
            settle_ticks: raw.settle_ticks.unwrap_or(DEFAULT_SETTLE_TICKS),
            beep_ms: raw.beep_ms.unwrap_or(DEFAULT_BEEP_MS),
            beep_count: raw.beep_count.unwrap_or(DEFAULT_BEEP_COUNT),
            gpio_root: raw
                .gpio_root
                .unwrap_or_else(|| PathBuf::from(DEFAULT_GPIO_ROOT)),
            crontab: raw.crontab.unwrap_or_else(|| DEFAULT_CRONTAB.to_owned()),
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let checks: [(bool, &'static str); 6] = [
            (self.copies >= 1, "copies"),
            (self.settle_ticks >= 1, "settleTicks"),
            (self.poll_ms >= 1, "pollMs"),
            (self.espresso_secs > 0, "espressoSecs"),
            (self.americano_secs > 0, "americanoSecs"),
            (
                self.water_pin != self.power_pin
                    && self.water_pin != self.beep_pin
                    && self.power_pin != self.beep_pin,
                "beepPin",
            ),
        ];
        match checks.iter().find(|(ok, _)| !ok) {
            Some(&(_, key)) => {
                error!("config: `{}` failed validation", key);
                Err(Error::ConfigInvalid(key))
            }
            None => Ok(()),
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_ms)
    }

    pub fn beep_pattern(&self) -> BeepPattern {
        BeepPattern {
            count: self.beep_count,
            on: Duration::from_millis(self.beep_ms),
            off: Duration::from_millis(self.beep_ms),
        }
    }
}
