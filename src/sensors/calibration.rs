//! Probe calibration: raw ADC counts and echo distances to engineering
//! units.
//!
//! These mirror the conversions the pond probe firmware performs before a
//! reading reaches the data store, so a host can replay raw captures.
//! Defaults target a 12-bit ADC on a 3.3 V rail.

use log::warn;
use serde::{Deserialize, Serialize};

use crate::fuzzy::Parameter;

use super::{Reading, is_plausible, range_of};

pub const ADC_MAX: u16 = 4095;
pub const ADC_VREF: f32 = 3.3;

/// Samples averaged per reported value.
pub const SAMPLES_PER_READING: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhCalibration {
    /// Probe voltage at pH 7.
    pub neutral_voltage: f32,
    /// Volts per pH unit.
    pub slope: f32,
    pub offset: f32,
}

impl Default for PhCalibration {
    fn default() -> Self {
        Self {
            neutral_voltage: 2.5,
            slope: 0.18,
            offset: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TurbidityCalibration {
    /// Voltage in clear water (0 NTU and above).
    pub clear_voltage: f32,
    /// Voltage in fully murky water (1000 NTU and below).
    pub murky_voltage: f32,
}

impl Default for TurbidityCalibration {
    fn default() -> Self {
        Self {
            clear_voltage: 2.7,
            murky_voltage: 1.2,
        }
    }
}

/// Ultrasonic level probe mounted above the tank.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TankGeometry {
    pub height_cm: f32,
    /// Gap between the probe face and the full-water mark.
    pub sensor_offset_cm: f32,
}

impl Default for TankGeometry {
    fn default() -> Self {
        Self {
            height_cm: 100.0,
            sensor_offset_cm: 5.0,
        }
    }
}

/// Measurable range of the ultrasonic probe, cm.
pub const DISTANCE_RANGE: (f32, f32) = (2.0, 400.0);

/// TDS → salinity conversion factor.
pub const SALINITY_FACTOR: f32 = 0.57;

pub fn adc_to_voltage(raw: u16) -> f32 {
    f32::from(raw.min(ADC_MAX)) * ADC_VREF / f32::from(ADC_MAX)
}

pub fn ph_from_voltage(voltage: f32, cal: &PhCalibration) -> f32 {
    7.0 + (cal.neutral_voltage - voltage) / cal.slope + cal.offset
}

/// TDS in ppm from the probe voltage, compensated to 25 °C.
pub fn tds_from_voltage(voltage: f32, temperature_c: f32) -> f32 {
    const K_VALUE: f32 = 0.5;
    let v = voltage / (1.0 + 0.02 * (temperature_c - 25.0));
    (133.42 * v * v * v - 255.86 * v * v + 857.39 * v) * K_VALUE
}

pub fn turbidity_from_voltage(voltage: f32, cal: &TurbidityCalibration) -> f32 {
    if voltage > cal.clear_voltage {
        0.0
    } else if voltage < cal.murky_voltage {
        1000.0
    } else {
        (cal.clear_voltage - voltage) / (cal.clear_voltage - cal.murky_voltage) * 1000.0
    }
}

/// Median of three echo distances; `None` when it lies outside the probe's
/// measurable range.
pub fn median_distance(samples: [f32; 3]) -> Option<f32> {
    let mut s = samples;
    s.sort_by(f32::total_cmp);
    let median = s[1];
    (median >= DISTANCE_RANGE.0 && median <= DISTANCE_RANGE.1).then_some(median)
}

/// Water height above the floor for a probe-to-surface distance.
pub fn water_level_from_distance(distance_cm: f32, tank: &TankGeometry) -> f32 {
    (tank.height_cm - (distance_cm - tank.sensor_offset_cm)).clamp(0.0, tank.height_cm)
}

/// Salinity in ppt from TDS in ppm.
pub fn salinity_ppt(tds_ppm: f32) -> f32 {
    tds_ppm / (SALINITY_FACTOR * 1000.0)
}

/// Averages the plausible samples of one parameter.
#[derive(Debug, Clone)]
pub struct SampleWindow {
    parameter: Parameter,
    sum: f32,
    valid: usize,
    seen: usize,
}

impl SampleWindow {
    pub fn new(parameter: Parameter) -> Self {
        Self {
            parameter,
            sum: 0.0,
            valid: 0,
            seen: 0,
        }
    }

    /// Add a sample.  Implausible samples are counted but not averaged.
    pub fn push(&mut self, value: f32) -> bool {
        self.seen += 1;
        if is_plausible(self.parameter, value) {
            self.sum += value;
            self.valid += 1;
            true
        } else {
            false
        }
    }

    pub fn is_full(&self) -> bool {
        self.seen >= SAMPLES_PER_READING
    }

    pub fn valid_count(&self) -> usize {
        self.valid
    }

    /// Mean of the plausible samples, `None` if there were none.  Held to
    /// the probe range against rounding in the sum.
    pub fn average(&self) -> Option<f32> {
        let (lo, hi) = range_of(self.parameter);
        (self.valid > 0).then(|| (self.sum / self.valid as f32).clamp(lo, hi))
    }

    /// Mean, or the probe's fallback value: neutral 7 for pH, 0 otherwise.
    pub fn average_or_fallback(&self) -> f32 {
        self.average().unwrap_or(match self.parameter {
            Parameter::Ph => 7.0,
            Parameter::Tds | Parameter::Turbidity => 0.0,
        })
    }
}

/// Every calibration needed to turn a [`RawCapture`] into a [`Reading`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Calibration {
    pub ph: PhCalibration,
    pub turbidity: TurbidityCalibration,
    pub tank: TankGeometry,
}

fn default_temperature() -> f32 {
    25.0
}

/// One poll of unconverted probe output.
///
/// ADC lists hold up to [`SAMPLES_PER_READING`] counts each; extra counts
/// are ignored.  Three echo distances feed the median filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawCapture {
    pub ph_adc: Vec<u16>,
    pub tds_adc: Vec<u16>,
    pub turbidity_adc: Vec<u16>,
    pub distance_cm: [f32; 3],
    /// Water temperature for TDS compensation.
    #[serde(default = "default_temperature")]
    pub temperature_c: f32,
    /// Unix seconds.
    pub timestamp: u64,
}

impl RawCapture {
    /// Convert and average the capture.  Parameters with no plausible
    /// sample fall back as [`SampleWindow::average_or_fallback`] does; an
    /// unusable echo reports an empty tank.
    pub fn to_reading(&self, cal: &Calibration) -> Reading {
        let window = |parameter: Parameter, counts: &[u16], convert: &dyn Fn(f32) -> f32| {
            let mut w = SampleWindow::new(parameter);
            for &raw in counts.iter().take(SAMPLES_PER_READING) {
                w.push(convert(adc_to_voltage(raw)));
            }
            if w.valid_count() == 0 {
                warn!("capture {}: no plausible {} sample", self.timestamp, parameter);
            }
            w.average_or_fallback()
        };

        let ph = window(Parameter::Ph, &self.ph_adc, &|v| ph_from_voltage(v, &cal.ph));
        let tds = window(Parameter::Tds, &self.tds_adc, &|v| tds_from_voltage(v, self.temperature_c));
        let turbidity = window(Parameter::Turbidity, &self.turbidity_adc, &|v| {
            turbidity_from_voltage(v, &cal.turbidity)
        });
        let water_level = match median_distance(self.distance_cm) {
            Some(d) => water_level_from_distance(d, &cal.tank),
            None => {
                warn!("capture {}: echo distance out of range", self.timestamp);
                0.0
            }
        };

        Reading {
            ph,
            tds,
            turbidity,
            water_level,
            timestamp: self.timestamp,
        }
    }
}
