//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the `log` facade (stderr via `tracing-subscriber` in production).

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`].
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started { medium_present } => {
                info!(
                    "START | medium={}",
                    if *medium_present { "present" } else { "absent" }
                );
            }
            AppEvent::MediumInserted => info!("DISK | inserted"),
            AppEvent::MediumRemoved => info!("DISK | removed"),
            AppEvent::Rejected(e) => warn!("DISK | rejected: {}", e),
            AppEvent::CommandStored(cmd) => info!("STATE | stored {}", cmd),
            AppEvent::Scheduled(at) => info!("SCHED | daily brew at {}", at),
            AppEvent::BrewStarted(b) => {
                info!("BREW | start {}x {}", b.quantity(), b.variety());
            }
            AppEvent::BrewFinished(r) => {
                info!(
                    "BREW | finished {}x {} | warmup={}s dispense={}s",
                    r.command.quantity(),
                    r.command.variety(),
                    r.warmup.as_secs(),
                    r.dispense.as_secs()
                );
            }
            AppEvent::BrewAborted(e) => warn!("BREW | aborted: {}", e),
        }
    }
}
