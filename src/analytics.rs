//! Summary statistics and a moving-average outlook over past readings.
//!
//! Nothing here predicts: the outlook is the mean of the most recent
//! readings, with a confidence level derived from how much pH and TDS
//! varied over the same window.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::fuzzy::evaluate_reading;
use crate::sensors::Reading;
use crate::sensors::calibration::salinity_ppt;

/// Fewest readings an outlook is computed from.
pub const MIN_OUTLOOK_READINGS: usize = 3;

/// Below this many readings the outlook is always low confidence.
const CONFIDENT_READINGS: usize = 5;

// ───────────────────────────────────────────────────────────────
// Summary
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub avg: f32,
    pub min: f32,
    pub max: f32,
}

impl Stats {
    /// `None` for an empty input.
    pub fn of(values: impl IntoIterator<Item = f32>) -> Option<Self> {
        let mut n = 0usize;
        let mut sum = 0.0_f64;
        let mut min = f32::INFINITY;
        let mut max = f32::NEG_INFINITY;
        for v in values {
            n += 1;
            sum += f64::from(v);
            min = min.min(v);
            max = max.max(v);
        }
        (n > 0).then(|| Self {
            avg: (sum / n as f64) as f32,
            min,
            max,
        })
    }
}

/// Aggregate view of a set of readings.  The score is recomputed for
/// every reading with the inference engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistorySummary {
    pub count: usize,
    pub ph: Stats,
    pub tds: Stats,
    pub turbidity: Stats,
    pub water_level: Stats,
    pub score: Stats,
}

/// `None` when `readings` is empty.
pub fn summarize(readings: &[Reading]) -> Option<HistorySummary> {
    let field = |f: fn(&Reading) -> f32| Stats::of(readings.iter().map(f));
    Some(HistorySummary {
        count: readings.len(),
        ph: field(|r| r.ph)?,
        tds: field(|r| r.tds)?,
        turbidity: field(|r| r.turbidity)?,
        water_level: field(|r| r.water_level)?,
        score: Stats::of(readings.iter().map(|r| evaluate_reading(r).score))?,
    })
}

// ───────────────────────────────────────────────────────────────
// Outlook
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Outlook {
    /// Readings averaged.
    pub samples: usize,
    pub ph: f32,
    pub tds: f32,
    pub turbidity: f32,
    /// Salinity in ppt, derived from TDS.
    pub salinity: f32,
    pub confidence: Confidence,
}

/// Moving average of the last `window` readings (`readings` oldest first).
/// `None` with fewer than [`MIN_OUTLOOK_READINGS`].
pub fn outlook(readings: &[Reading], window: usize) -> Option<Outlook> {
    let recent = &readings[readings.len().saturating_sub(window)..];
    if recent.len() < MIN_OUTLOOK_READINGS {
        return None;
    }
    let ph: Vec<f32> = recent.iter().map(|r| r.ph).collect();
    let tds: Vec<f32> = recent.iter().map(|r| r.tds).collect();
    Some(Outlook {
        samples: recent.len(),
        ph: round2(mean(&ph)),
        tds: round2(mean(&tds)),
        turbidity: round2(mean(&recent.iter().map(|r| r.turbidity).collect::<Vec<_>>())),
        salinity: round2(mean(&recent.iter().map(|r| salinity_ppt(r.tds)).collect::<Vec<_>>())),
        confidence: confidence(&ph, &tds),
    })
}

fn confidence(ph: &[f32], tds: &[f32]) -> Confidence {
    if ph.len() < CONFIDENT_READINGS {
        return Confidence::Low;
    }
    let (ph_sd, tds_sd) = (std_dev(ph), std_dev(tds));
    if ph_sd < 0.3 && tds_sd < 50.0 {
        Confidence::High
    } else if ph_sd < 0.6 && tds_sd < 100.0 {
        Confidence::Medium
    } else {
        Confidence::Low
    }
}

fn mean(values: &[f32]) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f32>() / values.len() as f32
}

/// Population standard deviation.
fn std_dev(values: &[f32]) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let var = values.iter().map(|v| (v - m) * (v - m)).sum::<f32>() / values.len() as f32;
    var.sqrt()
}

fn round2(x: f32) -> f32 {
    (x * 100.0).round() / 100.0
}
