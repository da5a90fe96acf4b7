//! Integration test driver for the `tests/integration/` submodules.
//!
//! Each `mod` below maps to a file that exercises one flow against mock
//! adapters or tempfile-backed devices.  No drive, relay, or crontab
//! required.

mod cli_tests;
mod disk_flow_tests;
mod mock_hw;
