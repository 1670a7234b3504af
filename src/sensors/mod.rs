//! Sensor readings and their plausibility checks.
//!
//! A [`Reading`] is what the probe pushes to the data store every poll.
//! [`validate`] rejects values no working probe can produce; the fuzzy
//! engine itself accepts any number, so this check runs first.

pub mod calibration;

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::error::SensorError;
use crate::fuzzy::Parameter;

/// Physical limits of the probes.  Bounds are inclusive.
pub const PH_RANGE: (f32, f32) = (0.0, 14.0);
pub const TDS_RANGE: (f32, f32) = (0.0, 20_000.0);
pub const TURBIDITY_RANGE: (f32, f32) = (0.0, 1000.0);

/// One sample of every probe.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub ph: f32,
    /// Total dissolved solids, ppm.
    pub tds: f32,
    /// NTU.
    pub turbidity: f32,
    /// Centimetres above the tank floor.
    #[serde(default)]
    pub water_level: f32,
    /// Unix seconds.
    pub timestamp: u64,
}

impl Reading {
    pub fn value(&self, parameter: Parameter) -> f32 {
        match parameter {
            Parameter::Ph => self.ph,
            Parameter::Tds => self.tds,
            Parameter::Turbidity => self.turbidity,
        }
    }

    pub fn validate(&self) -> Result<(), SensorError> {
        validate(self)
    }
}

/// Anything a reading carries that can be out of range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quantity {
    Quality(Parameter),
    WaterLevel,
}

impl From<Parameter> for Quantity {
    fn from(p: Parameter) -> Self {
        Self::Quality(p)
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Quality(p) => write!(f, "{p}"),
            Self::WaterLevel => f.write_str("water level"),
        }
    }
}

fn range_of(parameter: Parameter) -> (f32, f32) {
    match parameter {
        Parameter::Ph => PH_RANGE,
        Parameter::Tds => TDS_RANGE,
        Parameter::Turbidity => TURBIDITY_RANGE,
    }
}

/// True when `value` is a finite number inside the probe's range.
pub fn is_plausible(parameter: Parameter, value: f32) -> bool {
    let (lo, hi) = range_of(parameter);
    value.is_finite() && value >= lo && value <= hi
}

/// Reject a reading that no working probe could have produced.
///
/// Checks run in canonical parameter order, then water level; the first
/// failure is reported.
pub fn validate(reading: &Reading) -> Result<(), SensorError> {
    for p in Parameter::ALL {
        if !is_plausible(p, reading.value(p)) {
            return Err(SensorError::OutOfRange(p.into()));
        }
    }
    if !reading.water_level.is_finite() || reading.water_level < 0.0 {
        return Err(SensorError::OutOfRange(Quantity::WaterLevel));
    }
    Ok(())
}
