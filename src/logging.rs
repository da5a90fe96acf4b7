//! Console logging.
//!
//! Every module logs through the `log` facade.  `init` installs a
//! `tracing-subscriber` registry whose `LogTracer` bridge picks those
//! records up, filtered by `RUST_LOG` (default `info`), written to stderr.
//!
//! ```bash
//! RUST_LOG=floppy_coffee=debug floppy-coffee monitor-disks
//! ```

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // A second init (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init();
}
