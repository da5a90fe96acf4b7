//! Medium presence debouncer.
//!
//! Two states, `Absent` and `Present`, seeded by one probe at construction.
//! Each tick re-probes; an edge is emitted only once a changed reading has
//! held for `settle_ticks` consecutive ticks.  Ticks that agree with the
//! current state emit nothing, so a notification storm on an untouched
//! drive is harmless.

use log::debug;

use crate::app::ports::PresenceProbe;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Absent,
    Present,
}

impl Presence {
    fn from_probe(present: bool) -> Self {
        if present { Self::Present } else { Self::Absent }
    }
}

/// Debounced presence change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresenceEdge {
    Inserted,
    Removed,
}

pub struct MediumMonitor<P> {
    probe: P,
    state: Presence,
    settle_ticks: u32,
    /// Consecutive probes disagreeing with `state`.
    pending: u32,
    boot_pending: bool,
}

impl<P: PresenceProbe> MediumMonitor<P> {
    pub fn new(probe: P, settle_ticks: u32) -> Self {
        let state = Presence::from_probe(probe.probe());
        debug!("monitor: initial presence {:?}", state);
        Self {
            probe,
            state,
            settle_ticks: settle_ticks.max(1),
            pending: 0,
            boot_pending: state == Presence::Present,
        }
    }

    /// `Inserted` once if the medium was already in the drive at startup.
    pub fn boot_edge(&mut self) -> Option<PresenceEdge> {
        if std::mem::take(&mut self.boot_pending) {
            Some(PresenceEdge::Inserted)
        } else {
            None
        }
    }

    /// Re-probe and report a settled edge, if any.
    pub fn on_tick(&mut self) -> Option<PresenceEdge> {
        let seen = Presence::from_probe(self.probe.probe());
        if seen == self.state {
            self.pending = 0;
            return None;
        }

        self.pending += 1;
        if self.pending < self.settle_ticks {
            debug!("monitor: {:?} seen {}/{}", seen, self.pending, self.settle_ticks);
            return None;
        }

        self.pending = 0;
        self.state = seen;
        // A removal before the boot edge was consumed cancels it.
        self.boot_pending = false;
        Some(match seen {
            Presence::Present => PresenceEdge::Inserted,
            Presence::Absent => PresenceEdge::Removed,
        })
    }

    pub fn presence(&self) -> Presence {
        self.state
    }

    pub fn is_present(&self) -> bool {
        self.state == Presence::Present
    }

    pub fn probe(&self) -> &P {
        &self.probe
    }
}
