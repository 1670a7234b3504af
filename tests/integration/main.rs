//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises a specific subsystem
//! against mock adapters.  Everything runs in memory.

mod alert_tests;
mod mock_ports;
mod service_tests;
