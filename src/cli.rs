//! Command-line surface.
//!
//! ```text
//! floppy-coffee [--config PATH] <monitor-disks | make-coffee | stop-heater
//!                               | create-disk time <H> <M>
//!                               | create-disk variety <Q> <espresso|americano>
//!                               | read-disk [--json] | show-state [--json]>
//! ```
//!
//! clap rejects unknown or missing subcommands with exit status 2.  Range
//! checks on the disk fields happen in [`CreateDisk::to_command`], so they
//! report the same [`InvalidCommand`](crate::error::InvalidCommand) errors
//! as a bad disk.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::app::commands::AppCommand;
use crate::codec::{BrewCommand, Command, ScheduleCommand, Variety};
use crate::config::DEFAULT_CONFIG_PATH;
use crate::error::Result;

#[derive(Debug, Parser)]
#[command(
    name = "floppy-coffee",
    version,
    about = "Floppy-disk driven coffee machine controller"
)]
pub struct Cli {
    /// Configuration file.
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Watch the drive and act on every inserted disk.
    MonitorDisks,
    /// Brew the saved brew command now.
    MakeCoffee,
    /// Write a command disk.
    CreateDisk {
        #[command(subcommand)]
        disk: CreateDisk,
    },
    /// Switch the heater and water valve off.
    StopHeater,
    /// Decode the disk in the drive.
    ReadDisk {
        #[arg(long)]
        json: bool,
    },
    /// Print the saved schedule and brew commands.
    ShowState {
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Clone, Copy, Subcommand)]
pub enum CreateDisk {
    /// Daily brew time; -1 for either field means "now".
    Time {
        #[arg(allow_negative_numbers = true)]
        hour: i8,
        #[arg(allow_negative_numbers = true)]
        minute: i8,
    },
    /// Cup count (1-2) and variety.
    Variety {
        quantity: i8,
        #[arg(value_enum)]
        variety: VarietyArg,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum VarietyArg {
    Espresso,
    Americano,
}

impl From<VarietyArg> for Variety {
    fn from(v: VarietyArg) -> Self {
        match v {
            VarietyArg::Espresso => Variety::Espresso,
            VarietyArg::Americano => Variety::Americano,
        }
    }
}

impl CreateDisk {
    pub fn to_command(self) -> Result<Command> {
        let cmd = match self {
            Self::Time { hour, minute } => Command::Schedule(ScheduleCommand::new(hour, minute)?),
            Self::Variety { quantity, variety } => {
                Command::Brew(BrewCommand::new(quantity, variety.into())?)
            }
        };
        Ok(cmd)
    }
}

impl Cli {
    pub fn into_app_command(self) -> Result<AppCommand> {
        Ok(match self.command {
            CliCommand::MonitorDisks => AppCommand::MonitorDisks,
            CliCommand::MakeCoffee => AppCommand::MakeCoffee,
            CliCommand::CreateDisk { disk } => AppCommand::WriteDisk(disk.to_command()?),
            CliCommand::StopHeater => AppCommand::StopHeater,
            CliCommand::ReadDisk { json } => AppCommand::ReadDisk { json },
            CliCommand::ShowState { json } => AppCommand::ShowState { json },
        })
    }
}
