//! floppy-coffee: entry point.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     Adapters (outer ring)                    │
//! │                                                              │
//! │  BlockMedium      CommandStore   CronScheduler  SystemClock  │
//! │  (Medium+Probe)   (StatePort)    (Scheduler)    (Clock)      │
//! │  SysfsRelayBoard  LogEventSink   poller / ctrlc              │
//! │  (Actuator+Beep)  (EventSink)    (PresenceTick)              │
//! │                                                              │
//! │  ──────────────── Port Trait Boundary ───────────────────    │
//! │                                                              │
//! │  ┌────────────────────────────────────────────────────────┐  │
//! │  │  BrewController · MediumMonitor · ActuatorSequencer    │  │
//! │  └────────────────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```

use std::path::Path;
use std::process::ExitCode;
use std::sync::mpsc::{self, SyncSender};

use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info, warn};

use floppy_coffee::adapters::command_store::CommandStore;
use floppy_coffee::adapters::hardware::SysfsRelayBoard;
use floppy_coffee::adapters::log_sink::LogEventSink;
use floppy_coffee::adapters::medium::BlockMedium;
use floppy_coffee::adapters::time::SystemClock;
use floppy_coffee::app::commands::AppCommand;
use floppy_coffee::app::ports::{MediumPort, StatePort, StoredCommands};
use floppy_coffee::app::service::BrewController;
use floppy_coffee::cli::Cli;
use floppy_coffee::codec::Command;
use floppy_coffee::config::BrewConfig;
use floppy_coffee::events::{PresenceTick, TICK_BACKLOG, spawn_poller};
use floppy_coffee::logging;
use floppy_coffee::monitor::MediumMonitor;
use floppy_coffee::safety::{ActuatorSequencer, BrewTiming, EmergencyStop, SystemTimer};
use floppy_coffee::scheduler::CronScheduler;

type Controller = BrewController<
    BlockMedium,
    CommandStore,
    CronScheduler,
    SysfsRelayBoard,
    SystemTimer,
    SystemClock,
>;

fn main() -> ExitCode {
    // Usage errors exit 2 from inside clap.
    let cli = Cli::parse();
    logging::init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.clone();
    let cmd = cli.into_app_command().context("invalid arguments")?;

    // Fatal before any pin is touched.
    let config = BrewConfig::load(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;
    info!(
        "config: drive={} offset={} copies={}",
        config.drive.display(),
        config.offset,
        config.copies
    );

    match cmd {
        AppCommand::MonitorDisks => monitor_disks(&config, &config_path),
        AppCommand::MakeCoffee => make_coffee(&config, &config_path),
        AppCommand::WriteDisk(c) => write_disk(&config, &c),
        AppCommand::StopHeater => stop_heater(&config),
        AppCommand::ReadDisk { json } => read_disk(&config, json),
        AppCommand::ShowState { json } => show_state(&config, json),
    }
}

// ── Wiring ────────────────────────────────────────────────────

fn sequencer(config: &BrewConfig) -> Result<ActuatorSequencer<SysfsRelayBoard, SystemTimer>> {
    let board = SysfsRelayBoard::open(config).context("claiming relay pins")?;
    Ok(ActuatorSequencer::new(
        board,
        SystemTimer,
        BrewTiming::from_config(config),
        config.beep_pattern(),
    ))
}

fn controller(config: &BrewConfig, config_path: &Path) -> Result<Controller> {
    let program = std::env::current_exe().context("locating own executable")?;
    let config_path = std::fs::canonicalize(config_path).unwrap_or_else(|_| config_path.to_owned());
    Ok(BrewController::new(
        BlockMedium::from_config(config),
        CommandStore::new(&config.state_file),
        CronScheduler::new(config.crontab.clone(), program, config_path),
        sequencer(config)?,
        SystemClock,
    ))
}

/// SIGINT/SIGTERM latch the emergency stop, then ask the loop to exit.
fn install_stop_handler(
    stop: EmergencyStop<SysfsRelayBoard>,
    tx: Option<SyncSender<PresenceTick>>,
) -> Result<()> {
    ctrlc::set_handler(move || {
        if let Err(e) = stop.trigger() {
            error!("emergency stop incomplete: {}", e);
        }
        // Blocking send: a Shutdown must never be coalesced like a Recheck.
        if let Some(tx) = &tx {
            let _ = tx.send(PresenceTick::Shutdown);
        }
    })
    .context("installing signal handler")
}

// ── Subcommands ───────────────────────────────────────────────

fn monitor_disks(config: &BrewConfig, config_path: &Path) -> Result<()> {
    let mut controller = controller(config, config_path)?;
    let mut monitor = MediumMonitor::new(BlockMedium::from_config(config), config.settle_ticks);

    let (tx, rx) = mpsc::sync_channel(TICK_BACKLOG);
    install_stop_handler(controller.stop_handle(), Some(tx.clone()))?;
    let _poller = spawn_poller(config.poll_interval(), tx).context("starting presence poller")?;

    info!(
        "monitoring {} every {}ms",
        config.drive.display(),
        config.poll_ms
    );
    controller.run(&mut monitor, &rx, &mut LogEventSink::new());
    Ok(())
}

fn make_coffee(config: &BrewConfig, config_path: &Path) -> Result<()> {
    let mut controller = controller(config, config_path)?;
    install_stop_handler(controller.stop_handle(), None)?;
    let report = controller.make_coffee(&mut LogEventSink::new())?;
    info!(
        "brewed {}x {} in {}s",
        report.command.quantity(),
        report.command.variety(),
        (report.warmup + report.dispense).as_secs()
    );
    Ok(())
}

fn write_disk(config: &BrewConfig, cmd: &Command) -> Result<()> {
    BlockMedium::from_config(config)
        .write_command(cmd)
        .with_context(|| format!("writing {} to {}", cmd, config.drive.display()))?;
    println!("{cmd}");
    Ok(())
}

fn stop_heater(config: &BrewConfig) -> Result<()> {
    let seq = sequencer(config)?;
    seq.emergency_stop().context("de-energizing outputs")?;
    info!("heater and water valve off");
    Ok(())
}

fn read_disk(config: &BrewConfig, json: bool) -> Result<()> {
    let cmd = BlockMedium::from_config(config)
        .read_command()
        .with_context(|| format!("reading {}", config.drive.display()))?;
    if json {
        println!("{}", serde_json::to_string_pretty(&cmd)?);
    } else {
        println!("{cmd}");
    }
    Ok(())
}

fn show_state(config: &BrewConfig, json: bool) -> Result<()> {
    let stored = CommandStore::new(&config.state_file)
        .load()
        .with_context(|| format!("reading {}", config.state_file.display()))?;
    if json {
        println!("{}", serde_json::to_string_pretty(&stored)?);
    } else {
        print_state(&stored);
    }
    Ok(())
}

fn print_state(stored: &StoredCommands) {
    match stored.schedule {
        Some(s) => println!("{}", Command::Schedule(s)),
        None => {
            warn!("schedule slot is invalid");
            println!("time: (none)");
        }
    }
    match stored.brew {
        Some(b) => println!("{}", Command::Brew(b)),
        None => println!("variety: (none)"),
    }
}
