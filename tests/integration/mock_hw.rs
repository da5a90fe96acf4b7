//! Mock adapters for integration tests.
//!
//! Records every port call so tests can assert on the full history without
//! touching a device node, a GPIO line, or the user's crontab.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::time::Duration;

use chrono::NaiveTime;
use floppy_coffee::app::events::AppEvent;
use floppy_coffee::app::ports::{
    ActuatorPort, BeepPattern, BuzzerPort, Channel, Clock, EventSink, MediumPort, OutputState,
    PresenceProbe, SchedulerPort, StatePort, StoredCommands, Timer,
};
use floppy_coffee::codec::Command;
use floppy_coffee::error::{ActuatorError, Error, Result, SchedulerError};
use floppy_coffee::safety::{ActuatorSequencer, BrewTiming, Hold, StopSignal};
use floppy_coffee::scheduler::DailyTime;

// ── Output call record ────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputCall {
    Set(Channel, OutputState),
    Release,
    Beep(BeepPattern),
}

// ── MockOutputs ───────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct MockOutputs {
    pub calls: Vec<OutputCall>,
    /// Fail this exact write.
    pub fail_on: Option<(Channel, OutputState)>,
}

#[allow(dead_code)]
impl MockOutputs {
    fn last_state(&self, channel: Channel) -> OutputState {
        self.calls
            .iter()
            .rev()
            .find_map(|c| match c {
                OutputCall::Set(ch, s) if *ch == channel => Some(*s),
                _ => None,
            })
            .unwrap_or(OutputState::DeEnergized)
    }

    pub fn power_on(&self) -> bool {
        self.last_state(Channel::Power) == OutputState::Energized
    }

    pub fn water_on(&self) -> bool {
        self.last_state(Channel::Water) == OutputState::Energized
    }

    pub fn released(&self) -> bool {
        matches!(self.calls.last(), Some(OutputCall::Release))
    }

    pub fn relay_calls(&self) -> Vec<OutputCall> {
        self.calls
            .iter()
            .copied()
            .filter(|c| !matches!(c, OutputCall::Beep(_)))
            .collect()
    }

    pub fn beeps(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, OutputCall::Beep(_)))
            .count()
    }
}

impl ActuatorPort for MockOutputs {
    fn set_output(
        &mut self,
        channel: Channel,
        state: OutputState,
    ) -> core::result::Result<(), ActuatorError> {
        self.calls.push(OutputCall::Set(channel, state));
        if self.fail_on == Some((channel, state)) {
            return Err(ActuatorError::GpioWriteFailed);
        }
        Ok(())
    }

    fn release(&mut self) -> core::result::Result<(), ActuatorError> {
        self.calls.push(OutputCall::Release);
        Ok(())
    }
}

impl BuzzerPort for MockOutputs {
    fn beep(&mut self, pattern: BeepPattern) -> core::result::Result<(), ActuatorError> {
        self.calls.push(OutputCall::Beep(pattern));
        Ok(())
    }
}

// ── InstantTimer ──────────────────────────────────────────────

/// Records holds without sleeping.  `stop_on_hold = Some(n)` latches the
/// stop during the n-th hold (0-based).
#[derive(Debug, Default)]
pub struct InstantTimer {
    pub holds: Vec<Duration>,
    pub stop_on_hold: Option<usize>,
}

impl Timer for InstantTimer {
    fn hold(&mut self, duration: Duration, stop: &StopSignal) -> Hold {
        let index = self.holds.len();
        self.holds.push(duration);
        if self.stop_on_hold == Some(index) {
            stop.trigger();
        }
        if stop.is_triggered() {
            Hold::Stopped
        } else {
            Hold::Elapsed
        }
    }
}

// ── MockMedium ────────────────────────────────────────────────

pub struct MockMedium {
    pub next: Result<Command>,
    pub reads: usize,
    pub written: Vec<Command>,
}

#[allow(dead_code)]
impl MockMedium {
    pub fn holding(cmd: Command) -> Self {
        Self {
            next: Ok(cmd),
            reads: 0,
            written: Vec::new(),
        }
    }

    pub fn failing(err: Error) -> Self {
        Self {
            next: Err(err),
            reads: 0,
            written: Vec::new(),
        }
    }
}

impl MediumPort for MockMedium {
    fn read_command(&mut self) -> Result<Command> {
        self.reads += 1;
        self.next
    }

    fn write_command(&mut self, cmd: &Command) -> Result<()> {
        self.written.push(*cmd);
        Ok(())
    }
}

// ── MockStore ─────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct MockStore {
    pub stored: StoredCommands,
    pub unavailable: bool,
    pub saves: Vec<Command>,
}

impl StatePort for MockStore {
    fn load(&self) -> Result<StoredCommands> {
        if self.unavailable {
            return Err(Error::StateUnavailable);
        }
        Ok(self.stored)
    }

    fn save(&mut self, cmd: &Command) -> Result<()> {
        if self.unavailable {
            return Err(Error::StateUnavailable);
        }
        match cmd {
            Command::Schedule(s) => self.stored.schedule = Some(*s),
            Command::Brew(b) => self.stored.brew = Some(*b),
        }
        self.saves.push(*cmd);
        Ok(())
    }
}

// ── MockScheduler ─────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct MockScheduler {
    pub installed: Vec<DailyTime>,
    pub reject: bool,
}

impl SchedulerPort for MockScheduler {
    fn schedule_daily(&mut self, at: DailyTime) -> Result<()> {
        if self.reject {
            return Err(SchedulerError::Rejected(Some(1)).into());
        }
        self.installed.push(at);
        Ok(())
    }
}

// ── Clock / probe / sink ──────────────────────────────────────

pub struct FixedClock(pub NaiveTime);

impl FixedClock {
    pub fn at(hour: u32, minute: u32) -> Self {
        Self(NaiveTime::from_hms_opt(hour, minute, 0).expect("valid time"))
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveTime {
        self.0
    }
}

/// Replays scripted probe results, then repeats the last one.
pub struct ScriptedProbe(RefCell<VecDeque<bool>>);

impl ScriptedProbe {
    pub fn new(seq: &[bool]) -> Self {
        Self(RefCell::new(seq.iter().copied().collect()))
    }
}

impl PresenceProbe for ScriptedProbe {
    fn probe(&self) -> bool {
        let mut q = self.0.borrow_mut();
        if q.len() > 1 {
            q.pop_front().unwrap_or(false)
        } else {
            q.front().copied().unwrap_or(false)
        }
    }
}

#[derive(Debug, Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── Fixtures ──────────────────────────────────────────────────

pub fn timing() -> BrewTiming {
    BrewTiming {
        warmup: Duration::from_secs(30),
        espresso: Duration::from_secs(12),
        americano: Duration::from_secs(40),
    }
}

pub fn beep() -> BeepPattern {
    BeepPattern {
        count: 2,
        on: Duration::from_millis(150),
        off: Duration::from_millis(150),
    }
}

pub fn sequencer(timer: InstantTimer) -> ActuatorSequencer<MockOutputs, InstantTimer> {
    ActuatorSequencer::new(MockOutputs::default(), timer, timing(), beep())
}
