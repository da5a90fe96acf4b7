//! Per-pin actuator drivers.

pub mod buzzer;
pub mod relay;
