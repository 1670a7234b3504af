//! PondWatch: fuzzy-logic water-quality monitoring for aquaculture ponds.
//!
//! ```text
//!   Reading ─▶ sensors::validate ─▶ fuzzy::evaluate ─▶ Decision
//!                                                     │
//!                         history (DecisionStore) ◀───┤
//!                         alert (policy + dispatch) ◀─┘
//! ```
//!
//! The [`fuzzy`] engine is pure.  Everything with side effects goes
//! through the port traits in [`app::ports`]; [`adapters`] holds the
//! in-memory, file and log implementations used by the host binary and
//! the tests.

#![deny(unused_must_use)]

pub mod adapters;
pub mod alert;
pub mod analytics;
pub mod app;
pub mod config;
pub mod error;
pub mod fuzzy;
pub mod history;
pub mod sensors;

pub use error::{Error, Result};
