//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter         | Implements              | Connects to                |
//! |-----------------|-------------------------|----------------------------|
//! | `medium`        | MediumPort              | raw block device           |
//! |                 | PresenceProbe           |                            |
//! | `command_store` | StatePort               | 4-byte local state file    |
//! | `gpio`          | embedded-hal OutputPin  | Linux sysfs GPIO           |
//! | `hardware`      | ActuatorPort            | relay + buzzer drivers     |
//! |                 | BuzzerPort              |                            |
//! | `log_sink`      | EventSink               | `log` facade               |
//! | `time`          | Clock, DelayNs          | local wall clock, sleep    |
//!
//! The crontab adapter lives in [`crate::scheduler`].

pub mod command_store;
pub mod gpio;
pub mod hardware;
pub mod log_sink;
pub mod medium;
pub mod time;
