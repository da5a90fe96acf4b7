//! Actuator sequencing and the safety stop.
//!
//! The heater and water relays are the only hardware that can do harm, so
//! every path that energizes them goes through this module.
//!
//! ## Output lifecycle
//!
//! 1. [`ActuatorSequencer::brew`] acquires an [`OutputGuard`]: power on,
//!    water off.
//! 2. Warmup hold, then water on, then dispense hold.
//! 3. The guard de-energizes both channels and releases the pins.  This
//!    runs from `finish()` on success and from `Drop` on every early return,
//!    `?` propagation, or unwinding panic.
//!
//! ## Emergency stop
//!
//! [`EmergencyStop::trigger`] latches a [`StopSignal`], wakes any pending
//! hold, and shuts the outputs down itself.  Energizing steps re-check the
//! latch while holding the outputs lock, so a stop that lands at any point
//! leaves both channels de-energized.  The latch is never cleared: once
//! stopped, the sequencer refuses further brews for the life of the process.

use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use log::{error, info, warn};

use crate::app::ports::{ActuatorPort, BeepPattern, BuzzerPort, Channel, OutputState, Timer};
use crate::codec::{BrewCommand, Command, Variety};
use crate::config::BrewConfig;
use crate::error::{ActuatorError, Error, InvalidCommand, Result};

// ---------------------------------------------------------------------------
// Stop latch
// ---------------------------------------------------------------------------

/// Outcome of a [`Timer::hold`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hold {
    Elapsed,
    Stopped,
}

/// Latched stop flag shared between the sequencer and stop handles.
#[derive(Debug, Clone, Default)]
pub struct StopSignal {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trigger(&self) {
        let (flag, cv) = &*self.inner;
        *flag.lock().unwrap_or_else(PoisonError::into_inner) = true;
        cv.notify_all();
    }

    pub fn is_triggered(&self) -> bool {
        let (flag, _) = &*self.inner;
        *flag.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Sleep for `duration` unless the latch fires first.
    pub fn wait_timeout(&self, duration: Duration) -> Hold {
        let (flag, cv) = &*self.inner;
        let guard = flag.lock().unwrap_or_else(PoisonError::into_inner);
        let (guard, _) = cv
            .wait_timeout_while(guard, duration, |stopped| !*stopped)
            .unwrap_or_else(PoisonError::into_inner);
        if *guard { Hold::Stopped } else { Hold::Elapsed }
    }
}

/// Production [`Timer`]: a condvar wait that a stop interrupts.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimer;

impl Timer for SystemTimer {
    fn hold(&mut self, duration: Duration, stop: &StopSignal) -> Hold {
        stop.wait_timeout(duration)
    }
}

// ---------------------------------------------------------------------------
// Timing
// ---------------------------------------------------------------------------

/// Configured hold durations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrewTiming {
    pub warmup: Duration,
    pub espresso: Duration,
    pub americano: Duration,
}

impl BrewTiming {
    pub fn from_config(config: &BrewConfig) -> Self {
        Self {
            warmup: Duration::from_secs(config.warmup_secs),
            espresso: Duration::from_secs(config.espresso_secs),
            americano: Duration::from_secs(config.americano_secs),
        }
    }

    pub fn per_unit(&self, variety: Variety) -> Duration {
        match variety {
            Variety::Espresso => self.espresso,
            Variety::Americano => self.americano,
        }
    }

    /// Water-valve open time for the whole command.
    pub fn dispense(&self, cmd: &BrewCommand) -> Duration {
        self.per_unit(cmd.variety()) * u32::from(cmd.quantity())
    }
}

/// A completed brew cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrewReport {
    pub command: BrewCommand,
    pub warmup: Duration,
    pub dispense: Duration,
}

// ---------------------------------------------------------------------------
// All-off
// ---------------------------------------------------------------------------

fn lock<A>(outputs: &Mutex<A>) -> MutexGuard<'_, A> {
    // A poisoned lock still has to be usable to switch the heater off.
    outputs.lock().unwrap_or_else(PoisonError::into_inner)
}

/// De-energize water then power, then release both pins.
///
/// Every step is attempted even if an earlier one fails; the first error
/// is returned.
pub fn shutdown_outputs(outputs: &mut impl ActuatorPort) -> core::result::Result<(), ActuatorError> {
    let water = outputs.set_output(Channel::Water, OutputState::DeEnergized);
    let power = outputs.set_output(Channel::Power, OutputState::DeEnergized);
    let release = outputs.release();

    for (step, res) in [("water off", &water), ("power off", &power), ("release", &release)] {
        if let Err(e) = res {
            error!("shutdown step '{}' failed: {}", step, e);
        }
    }
    water.and(power).and(release)
}

/// Scoped ownership of the energized relay pair.
pub struct OutputGuard<'a, A: ActuatorPort> {
    outputs: &'a Mutex<A>,
    stop: &'a StopSignal,
    armed: bool,
}

impl<'a, A: ActuatorPort> OutputGuard<'a, A> {
    /// Power on, water off.
    fn acquire(outputs: &'a Mutex<A>, stop: &'a StopSignal) -> Result<Self> {
        let mut guard = Self {
            outputs,
            stop,
            armed: true,
        };
        guard.set(Channel::Power, OutputState::Energized)?;
        guard.set(Channel::Water, OutputState::DeEnergized)?;
        Ok(guard)
    }

    fn set(&mut self, channel: Channel, state: OutputState) -> Result<()> {
        let mut out = lock(self.outputs);
        if state == OutputState::Energized && self.stop.is_triggered() {
            return Err(Error::Interrupted);
        }
        out.set_output(channel, state)?;
        Ok(())
    }

    /// Happy-path release that reports shutdown errors to the caller.
    fn finish(mut self) -> Result<()> {
        self.armed = false;
        let mut out = lock(self.outputs);
        shutdown_outputs(&mut *out).map_err(Error::from)
    }
}

impl<A: ActuatorPort> Drop for OutputGuard<'_, A> {
    fn drop(&mut self) {
        if self.armed {
            warn!("brew sequence left early, forcing outputs off");
            let mut out = lock(self.outputs);
            let _ = shutdown_outputs(&mut *out);
        }
    }
}

// ---------------------------------------------------------------------------
// Emergency stop handle
// ---------------------------------------------------------------------------

/// Cloneable, `Send` handle that latches the stop and kills both outputs.
pub struct EmergencyStop<A> {
    outputs: Arc<Mutex<A>>,
    stop: StopSignal,
}

impl<A> Clone for EmergencyStop<A> {
    fn clone(&self) -> Self {
        Self {
            outputs: Arc::clone(&self.outputs),
            stop: self.stop.clone(),
        }
    }
}

impl<A: ActuatorPort> EmergencyStop<A> {
    pub fn trigger(&self) -> Result<()> {
        self.stop.trigger();
        warn!("EMERGENCY STOP: de-energizing heater and water");
        let mut out = lock(&self.outputs);
        shutdown_outputs(&mut *out).map_err(Error::from)
    }
}

// ---------------------------------------------------------------------------
// Sequencer
// ---------------------------------------------------------------------------

/// Drives the warmup → dispense → shutdown cycle.
pub struct ActuatorSequencer<A, T> {
    outputs: Arc<Mutex<A>>,
    stop: StopSignal,
    timer: T,
    timing: BrewTiming,
    beep: BeepPattern,
}

impl<A: ActuatorPort, T: Timer> ActuatorSequencer<A, T> {
    pub fn new(outputs: A, timer: T, timing: BrewTiming, beep: BeepPattern) -> Self {
        Self {
            outputs: Arc::new(Mutex::new(outputs)),
            stop: StopSignal::new(),
            timer,
            timing,
            beep,
        }
    }

    /// Run one full brew cycle for `cmd`.
    ///
    /// Anything other than a brew command is rejected before any output is
    /// touched.
    pub fn brew(&mut self, cmd: &Command) -> Result<BrewReport> {
        let Command::Brew(brew) = cmd else {
            warn!("sequencer refused non-brew command: {}", cmd);
            return Err(InvalidCommand::NotABrew.into());
        };
        if self.stop.is_triggered() {
            warn!("sequencer is stopped, refusing brew");
            return Err(Error::Interrupted);
        }

        let warmup = self.timing.warmup;
        let dispense = self.timing.dispense(brew);
        info!(
            "BREW | {}x {} | warmup={}s dispense={}s",
            brew.quantity(),
            brew.variety(),
            warmup.as_secs(),
            dispense.as_secs()
        );

        let mut guard = OutputGuard::acquire(&self.outputs, &self.stop)?;

        if self.timer.hold(warmup, &self.stop) == Hold::Stopped {
            warn!("brew interrupted during warmup");
            return Err(Error::Interrupted);
        }

        guard.set(Channel::Water, OutputState::Energized)?;

        if self.timer.hold(dispense, &self.stop) == Hold::Stopped {
            warn!("brew interrupted during dispense");
            return Err(Error::Interrupted);
        }

        guard.finish()?;
        info!("BREW | done");
        Ok(BrewReport {
            command: *brew,
            warmup,
            dispense,
        })
    }

    /// De-energize everything and latch the stop.
    pub fn emergency_stop(&self) -> Result<()> {
        self.stop_handle().trigger()
    }

    pub fn stop_handle(&self) -> EmergencyStop<A> {
        EmergencyStop {
            outputs: Arc::clone(&self.outputs),
            stop: self.stop.clone(),
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.stop.is_triggered()
    }

    pub fn timing(&self) -> BrewTiming {
        self.timing
    }

    pub fn timer(&self) -> &T {
        &self.timer
    }

    /// Inspect the owned outputs (mainly for tests and diagnostics).
    pub fn with_outputs<R>(&self, f: impl FnOnce(&A) -> R) -> R {
        f(&lock(&self.outputs))
    }
}

impl<A: ActuatorPort + BuzzerPort, T: Timer> ActuatorSequencer<A, T> {
    /// Sound the alert tone.  Failures are logged, never fatal.
    pub fn alert(&self) {
        let mut out = lock(&self.outputs);
        if let Err(e) = out.beep(self.beep) {
            warn!("alert tone failed: {}", e);
        }
    }
}
