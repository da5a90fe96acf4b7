//! Application service: the hexagonal core.
//!
//! [`BrewController`] reacts to debounced presence edges.  All I/O flows
//! through port traits, so the whole controller runs against mock adapters
//! in the integration tests.
//!
//! ```text
//!  MediumPort ──▶ ┌────────────────────────┐ ──▶ SchedulerPort
//!   StatePort ◀──▶│     BrewController     │ ──▶ EventSink
//!                 │  Idle ⇄ Handling       │
//!                 └───────────┬────────────┘
//!                             ▼
//!                    ActuatorSequencer ──▶ ActuatorPort + BuzzerPort
//! ```
//!
//! ## Insert handling
//!
//! | Disk reads as                 | Action                                  |
//! |-------------------------------|-----------------------------------------|
//! | unreadable (device gone)      | ignore as spurious                      |
//! | invalid command               | reject, nothing persisted               |
//! | schedule `now:now`            | tone, brew the saved brew command       |
//! | schedule with a concrete time | save, install daily job, tone           |
//! | brew                          | save, tone                              |

use std::sync::mpsc::Receiver;

use log::{debug, error, info, warn};

use crate::codec::{BrewCommand, Command};
use crate::error::{Error, InvalidCommand, Result};
use crate::events::PresenceTick;
use crate::monitor::{MediumMonitor, PresenceEdge};
use crate::safety::{ActuatorSequencer, BrewReport, EmergencyStop};
use crate::scheduler::DailyTime;

use super::events::AppEvent;
use super::ports::{
    ActuatorPort, BuzzerPort, Clock, EventSink, MediumPort, PresenceProbe, SchedulerPort,
    StatePort, StoredCommands, Timer,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Idle,
    Handling,
}

/// What one presence edge led to.
#[derive(Debug, Clone, PartialEq)]
pub enum HandleOutcome {
    Brewed(BrewReport),
    Scheduled(DailyTime),
    Stored(BrewCommand),
    /// Removal, or an insert that turned out to be spurious.
    Ignored,
    Failed(Error),
}

// ───────────────────────────────────────────────────────────────
// BrewController
// ───────────────────────────────────────────────────────────────

pub struct BrewController<M, S, Q, A, T, C> {
    medium: M,
    store: S,
    scheduler: Q,
    sequencer: ActuatorSequencer<A, T>,
    clock: C,
    state: ControllerState,
}

impl<M, S, Q, A, T, C> BrewController<M, S, Q, A, T, C>
where
    M: MediumPort,
    S: StatePort,
    Q: SchedulerPort,
    A: ActuatorPort + BuzzerPort,
    T: Timer,
    C: Clock,
{
    pub fn new(
        medium: M,
        store: S,
        scheduler: Q,
        sequencer: ActuatorSequencer<A, T>,
        clock: C,
    ) -> Self {
        Self {
            medium,
            store,
            scheduler,
            sequencer,
            clock,
            state: ControllerState::Idle,
        }
    }

    // ── Event loop ────────────────────────────────────────────

    /// Consume ticks until `Shutdown` or until every sender is gone.
    pub fn run<P: PresenceProbe>(
        &mut self,
        monitor: &mut MediumMonitor<P>,
        ticks: &Receiver<PresenceTick>,
        sink: &mut impl EventSink,
    ) {
        sink.emit(&AppEvent::Started {
            medium_present: monitor.is_present(),
        });
        if let Some(edge) = monitor.boot_edge() {
            self.handle_edge(edge, sink);
        }

        for tick in ticks {
            match tick {
                PresenceTick::Recheck => {
                    if let Some(edge) = monitor.on_tick() {
                        self.handle_edge(edge, sink);
                    }
                }
                PresenceTick::Shutdown => {
                    info!("controller: shutdown requested");
                    break;
                }
            }
        }
        info!("controller: event loop exited");
    }

    /// Process one debounced edge and return to `Idle`.
    pub fn handle_edge(&mut self, edge: PresenceEdge, sink: &mut impl EventSink) -> HandleOutcome {
        match edge {
            PresenceEdge::Removed => {
                sink.emit(&AppEvent::MediumRemoved);
                HandleOutcome::Ignored
            }
            PresenceEdge::Inserted => {
                sink.emit(&AppEvent::MediumInserted);
                self.state = ControllerState::Handling;
                let outcome = self.handle_insert(sink);
                self.state = ControllerState::Idle;
                match &outcome {
                    HandleOutcome::Failed(e) if !e.is_transient() => {
                        error!("controller: unrecoverable failure: {}", e);
                    }
                    other => debug!("controller: insert handled -> {:?}", other),
                }
                outcome
            }
        }
    }

    fn handle_insert(&mut self, sink: &mut impl EventSink) -> HandleOutcome {
        let cmd = match self.medium.read_command() {
            Ok(cmd) => cmd,
            Err(e @ Error::MediumUnavailable { .. }) => {
                warn!("controller: medium vanished before read ({}), ignoring", e);
                return HandleOutcome::Ignored;
            }
            Err(e) => {
                sink.emit(&AppEvent::Rejected(e));
                return HandleOutcome::Failed(e);
            }
        };

        match cmd {
            Command::Schedule(s) if s.is_now() => match self.make_coffee(sink) {
                Ok(report) => HandleOutcome::Brewed(report),
                Err(e) => HandleOutcome::Failed(e),
            },
            Command::Schedule(s) => {
                if let Err(e) = self.persist(&cmd, sink) {
                    return HandleOutcome::Failed(e);
                }

                let at = s.resolve(self.clock.now());
                if let Err(e) = self.scheduler.schedule_daily(at) {
                    warn!("controller: schedule handoff failed: {}", e);
                    sink.emit(&AppEvent::Rejected(e));
                    return HandleOutcome::Failed(e);
                }
                sink.emit(&AppEvent::Scheduled(at));
                self.sequencer.alert();
                HandleOutcome::Scheduled(at)
            }
            Command::Brew(b) => {
                if let Err(e) = self.persist(&cmd, sink) {
                    return HandleOutcome::Failed(e);
                }
                self.sequencer.alert();
                HandleOutcome::Stored(b)
            }
        }
    }

    /// Save `cmd`; a failure is reported to the sink, never swallowed.
    fn persist(&mut self, cmd: &Command, sink: &mut impl EventSink) -> Result<()> {
        self.store.save(cmd).inspect_err(|e| {
            warn!("controller: could not save {}: {}", cmd, e);
            sink.emit(&AppEvent::Rejected(*e));
        })?;
        sink.emit(&AppEvent::CommandStored(*cmd));
        Ok(())
    }

    // ── Operations ────────────────────────────────────────────

    /// Persisted slots, or empty slots on first run.
    pub fn saved(&self) -> Result<StoredCommands> {
        match self.store.load() {
            Err(Error::StateUnavailable) => {
                info!("controller: no state file yet, using empty slots");
                Ok(StoredCommands::default())
            }
            other => other,
        }
    }

    /// Tone, then run one full brew of the saved brew command.
    pub fn make_coffee(&mut self, sink: &mut impl EventSink) -> Result<BrewReport> {
        let brew = self
            .saved()
            .and_then(|s| s.brew.ok_or(Error::InvalidCommand(InvalidCommand::NoSavedBrew)))
            .inspect_err(|e| {
                warn!("controller: cannot brew: {}", e);
                sink.emit(&AppEvent::Rejected(*e));
            })?;

        self.sequencer.alert();
        sink.emit(&AppEvent::BrewStarted(brew));
        match self.sequencer.brew(&Command::Brew(brew)) {
            Ok(report) => {
                sink.emit(&AppEvent::BrewFinished(report));
                Ok(report)
            }
            Err(e) => {
                sink.emit(&AppEvent::BrewAborted(e));
                Err(e)
            }
        }
    }

    pub fn stop_handle(&self) -> EmergencyStop<A> {
        self.sequencer.stop_handle()
    }

    // ── Accessors ─────────────────────────────────────────────

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn sequencer(&self) -> &ActuatorSequencer<A, T> {
        &self.sequencer
    }

    pub fn medium(&self) -> &M {
        &self.medium
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn scheduler(&self) -> &Q {
        &self.scheduler
    }
}
