//! Application core: the monitor's domain logic, zero I/O.
//!
//! Evaluation, alert policy and actuator tracking live here.  All
//! interaction with data stores, caches and chat services happens through
//! **port traits** defined in [`ports`], keeping this layer fully testable
//! with in-memory adapters.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
