//! Monitor configuration.
//!
//! Alert thresholds, safe bands and bookkeeping limits.  Loaded from JSON
//! by the binary, or through a [`ConfigPort`](crate::app::ports::ConfigPort).

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::app::ports::ConfigError;
use crate::fuzzy::Parameter;
use crate::history::MAX_HISTORY_CAPACITY;

/// Inclusive `[min, max]` range a parameter should stay within.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SafeBand {
    pub min: f32,
    pub max: f32,
}

impl SafeBand {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f32) -> bool {
        self.position(value) == BandPosition::Within
    }

    /// Where `value` sits relative to the band.  NaN is never within it.
    pub fn position(&self, value: f32) -> BandPosition {
        if value.is_nan() {
            BandPosition::Invalid
        } else if value < self.min {
            BandPosition::Below
        } else if value > self.max {
            BandPosition::Above
        } else {
            BandPosition::Within
        }
    }
}

impl fmt::Display for SafeBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.min, self.max)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BandPosition {
    Below,
    Within,
    Above,
    /// Not a number.
    Invalid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    // --- Alerts ---
    /// Quality alert fires when the score is strictly below this.
    pub alert_score_threshold: f32,
    /// Minimum gap between two alerts with the same key (seconds).
    pub alert_cooldown_secs: u32,
    /// Notifier destination (chat id, address, ...).
    pub alert_destination: String,

    // --- Safe bands ---
    pub ph_band: SafeBand,
    pub tds_band: SafeBand,
    pub turbidity_band: SafeBand,

    // --- Bookkeeping ---
    /// Decision records kept in history.
    pub history_capacity: u8,
    /// Readings averaged by the outlook.
    pub outlook_window: u16,
    /// Seconds between polls of the sensor source.
    pub poll_interval_secs: u32,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            alert_score_threshold: 45.0,
            alert_cooldown_secs: 60,
            alert_destination: String::from("pond-operators"),

            ph_band: SafeBand::new(6.5, 8.5),
            tds_band: SafeBand::new(300.0, 800.0),
            turbidity_band: SafeBand::new(20.0, 45.0),

            history_capacity: 32,
            outlook_window: 12,
            poll_interval_secs: 3,
        }
    }
}

impl MonitorConfig {
    pub fn band(&self, parameter: Parameter) -> &SafeBand {
        match parameter {
            Parameter::Ph => &self.ph_band,
            Parameter::Tds => &self.tds_band,
            Parameter::Turbidity => &self.turbidity_band,
        }
    }

    pub fn cooldown(&self) -> core::time::Duration {
        core::time::Duration::from_secs(u64::from(self.alert_cooldown_secs))
    }

    /// Reject values that would disable alerts or corrupt history.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.alert_score_threshold.is_finite()
            && (0.0..=100.0).contains(&self.alert_score_threshold))
        {
            return Err(ConfigError::ValidationFailed("alert_score_threshold must be within 0..=100"));
        }
        if self.alert_cooldown_secs == 0 {
            return Err(ConfigError::ValidationFailed("alert_cooldown_secs must be > 0"));
        }
        for p in Parameter::ALL {
            let band = self.band(p);
            if !(band.min.is_finite() && band.max.is_finite()) || band.min > band.max {
                return Err(ConfigError::ValidationFailed(match p {
                    Parameter::Ph => "ph_band is inverted or non-finite",
                    Parameter::Tds => "tds_band is inverted or non-finite",
                    Parameter::Turbidity => "turbidity_band is inverted or non-finite",
                }));
            }
        }
        if self.history_capacity == 0 || usize::from(self.history_capacity) > MAX_HISTORY_CAPACITY {
            return Err(ConfigError::ValidationFailed("history_capacity must be within 1..=32"));
        }
        if self.outlook_window < 3 {
            return Err(ConfigError::ValidationFailed("outlook_window must be >= 3"));
        }
        if self.poll_interval_secs == 0 {
            return Err(ConfigError::ValidationFailed("poll_interval_secs must be > 0"));
        }
        Ok(())
    }
}
