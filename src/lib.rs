//! Floppy-disk driven coffee machine controller.
//!
//! Exposes every module for integration testing.  The binary in `main.rs`
//! only wires adapters to the [`app`] core.

#![deny(unused_must_use)]

pub mod app;
pub mod cli;
pub mod codec;
pub mod config;
pub mod error;
pub mod events;
pub mod logging;
pub mod monitor;
pub mod safety;
pub mod scheduler;

pub mod adapters;
pub mod drivers;
