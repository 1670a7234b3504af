//! Unified error type for the monitor.
//!
//! Every subsystem error converts into [`Error`] so the service loop and
//! the binary handle failures in one place.  Port-specific error enums live
//! next to their traits in [`crate::app::ports`].

use core::fmt;

use crate::app::ports::{ConfigError, NotifyError, SourceError};
use crate::sensors::Quantity;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// The reading is implausible and was not evaluated.
    Sensor(SensorError),
    /// The sensor source has no reading yet.
    NoReading,
    Source(SourceError),
    Notify(NotifyError),
    Config(ConfigError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::NoReading => write!(f, "no reading available"),
            Self::Source(e) => write!(f, "source: {e}"),
            Self::Notify(e) => write!(f, "notify: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// Value is non-finite or outside the probe's physical range.
    OutOfRange(Quantity),
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfRange(q) => write!(f, "{q} reading out of range"),
        }
    }
}

impl std::error::Error for SensorError {}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

impl From<SourceError> for Error {
    fn from(e: SourceError) -> Self {
        Self::Source(e)
    }
}

impl From<NotifyError> for Error {
    fn from(e: NotifyError) -> Self {
        Self::Notify(e)
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
