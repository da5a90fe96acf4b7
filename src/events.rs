//! Presence-check ticks.
//!
//! The hotplug collaborator only says "something changed, look again".  The
//! monitor never trusts a tick's payload, so the only messages are a recheck
//! request and a shutdown request.
//!
//! ```text
//! ┌──────────────┐
//! │ poller       │──Recheck──▶┌──────────────┐     ┌────────────────┐
//! │ ctrlc        │──Shutdown─▶│ sync_channel │────▶│ BrewController │
//! └──────────────┘            └──────────────┘     └────────────────┘
//! ```

use std::sync::mpsc::{SyncSender, TrySendError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::debug;

/// Capacity of the tick channel.  One pending `Recheck` is all the loop
/// needs, so further ticks coalesce into it.
pub const TICK_BACKLOG: usize = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresenceTick {
    /// Re-probe the medium.
    Recheck,
    /// Leave the event loop.
    Shutdown,
}

/// Queue `tick` without blocking.  A full channel already holds a pending
/// tick, so this one is dropped.  `false` once the receiver is gone.
pub fn offer(tx: &SyncSender<PresenceTick>, tick: PresenceTick) -> bool {
    match tx.try_send(tick) {
        Ok(()) | Err(TrySendError::Full(_)) => true,
        Err(TrySendError::Disconnected(_)) => false,
    }
}

/// Offer a `Recheck` every `interval` until the receiver is dropped.
pub fn spawn_poller(
    interval: Duration,
    tx: SyncSender<PresenceTick>,
) -> std::io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("presence-poll".into())
        .spawn(move || {
            loop {
                thread::sleep(interval);
                if !offer(&tx, PresenceTick::Recheck) {
                    debug!("poller: receiver gone, exiting");
                    break;
                }
            }
        })
}
