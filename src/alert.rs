//! Alert policy.
//!
//! Decides after every evaluation whether operators must be told, renders
//! the message and dispatches it through the rate-limit cache.
//!
//! ## Alert kinds
//!
//! 1. **Quality**: the decision score is below the configured threshold.
//!    Keyed `quality:<bucket>` so a drop from Poor to Critical alerts again.
//! 2. **Parameters**: one or more readings sit outside their safe band.
//!    A single combined alert lists every offender, keyed
//!    `params:<keys in canonical order joined by ','>`.
//!
//! ## Dispatch
//!
//! Each planned alert first claims its key in the [`RateLimitCache`] for
//! the cool-down period.  Only the caller that wins the claim sends.  If
//! the cache cannot be reached the alert is skipped: a broken cache must
//! never turn into an alert storm.  There are no retries.

use core::fmt;
use core::time::Duration;

use chrono::{DateTime, Utc};
use log::{error, info, warn};

use crate::analytics::{HistorySummary, Stats};
use crate::app::ports::{CacheError, NotifyError, Notifier, RateLimitCache};
use crate::config::{BandPosition, MonitorConfig, SafeBand};
use crate::fuzzy::{Decision, Parameter, QualityBucket};
use crate::sensors::Reading;

/// At most one quality and one parameter alert per evaluation.
pub const MAX_ALERTS_PER_PLAN: usize = 2;

const RULE_LINE: &str = "----------------------------------------";

// ───────────────────────────────────────────────────────────────
// Out-of-band bitmask
// ───────────────────────────────────────────────────────────────

/// Set of parameters outside their safe band, one bit per [`Parameter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OutOfBand(u8);

impl OutOfBand {
    pub const NONE: Self = Self(0);

    const fn mask(p: Parameter) -> u8 {
        1 << (p as u8)
    }

    pub fn contains(self, p: Parameter) -> bool {
        self.0 & Self::mask(p) != 0
    }

    pub fn insert(&mut self, p: Parameter) {
        self.0 |= Self::mask(p);
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    /// Offending parameters in canonical order.
    pub fn iter(self) -> impl Iterator<Item = Parameter> {
        Parameter::ALL.into_iter().filter(move |p| self.contains(*p))
    }

    /// Rate-limit key of the combined parameter alert.
    pub fn key(self) -> String {
        let mut key = String::from("params:");
        for (i, p) in self.iter().enumerate() {
            if i > 0 {
                key.push(',');
            }
            key.push_str(p.key());
        }
        key
    }
}

// ───────────────────────────────────────────────────────────────
// Plan
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    Quality(QualityBucket),
    Parameters(OutOfBand),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlannedAlert {
    /// Rate-limit key.
    pub key: String,
    pub kind: AlertKind,
    pub message: String,
}

/// Alerts one evaluation asks for, quality first.  Never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertPlan {
    alerts: heapless::Vec<PlannedAlert, MAX_ALERTS_PER_PLAN>,
}

impl AlertPlan {
    pub fn alerts(&self) -> &[PlannedAlert] {
        &self.alerts
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.alerts.iter().map(|a| a.key.as_str())
    }

    pub fn len(&self) -> usize {
        self.alerts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }
}

// ───────────────────────────────────────────────────────────────
// Policy
// ───────────────────────────────────────────────────────────────

pub struct AlertPolicy {
    score_threshold: f32,
    bands: [SafeBand; 3],
    /// Out-of-band set seen on the previous [`track`](Self::track).
    active: OutOfBand,
}

impl AlertPolicy {
    pub fn new(config: &MonitorConfig) -> Self {
        Self {
            score_threshold: config.alert_score_threshold,
            bands: Parameter::ALL.map(|p| *config.band(p)),
            active: OutOfBand::NONE,
        }
    }

    /// Adopt new thresholds.  The tracked out-of-band set is kept.
    pub fn reconfigure(&mut self, config: &MonitorConfig) {
        self.score_threshold = config.alert_score_threshold;
        self.bands = Parameter::ALL.map(|p| *config.band(p));
    }

    pub fn band(&self, p: Parameter) -> &SafeBand {
        &self.bands[p as usize]
    }

    pub fn out_of_band(&self, reading: &Reading) -> OutOfBand {
        let mut set = OutOfBand::NONE;
        for p in Parameter::ALL {
            if !self.band(p).contains(reading.value(p)) {
                set.insert(p);
            }
        }
        set
    }

    /// Record the out-of-band set of a new reading, logging each parameter
    /// that leaves or returns to its band.
    pub fn track(&mut self, reading: &Reading) -> OutOfBand {
        let current = self.out_of_band(reading);
        for p in Parameter::ALL {
            match (self.active.contains(p), current.contains(p)) {
                (false, true) => warn!("{} left safe band {}: {:.2}", p, self.band(p), reading.value(p)),
                (true, false) => info!("{} back within safe band: {:.2}", p, reading.value(p)),
                _ => {}
            }
        }
        self.active = current;
        current
    }

    pub fn active(&self) -> OutOfBand {
        self.active
    }

    /// Alerts warranted by this decision and reading, `None` when the
    /// water needs no attention.
    pub fn should_alert(&self, decision: &Decision, reading: &Reading) -> Option<AlertPlan> {
        let quality = (decision.score < self.score_threshold).then(|| {
            let bucket = decision.bucket();
            PlannedAlert {
                key: format!("quality:{bucket}"),
                kind: AlertKind::Quality(bucket),
                message: self.render_quality(decision, reading),
            }
        });

        let offenders = self.out_of_band(reading);
        let params = (!offenders.is_empty()).then(|| PlannedAlert {
            key: offenders.key(),
            kind: AlertKind::Parameters(offenders),
            message: self.render_parameters(offenders, reading),
        });

        let alerts: heapless::Vec<_, MAX_ALERTS_PER_PLAN> = quality.into_iter().chain(params).collect();
        (!alerts.is_empty()).then_some(AlertPlan { alerts })
    }

    // ── Rendering ─────────────────────────────────────────────────

    fn render_quality(&self, decision: &Decision, reading: &Reading) -> String {
        QualityMessage {
            policy: self,
            decision,
            reading,
        }
        .to_string()
    }

    fn render_parameters(&self, offenders: OutOfBand, reading: &Reading) -> String {
        ParameterMessage {
            policy: self,
            offenders,
            reading,
        }
        .to_string()
    }

    fn write_parameter(
        &self,
        f: &mut fmt::Formatter<'_>,
        p: Parameter,
        reading: &Reading,
        with_status: bool,
    ) -> fmt::Result {
        let band = self.band(p);
        let value = reading.value(p);
        let position = band.position(value);
        let flag = if position == BandPosition::Within { "[OK]" } else { "[ABNORMAL]" };
        let unit = unit_suffix(p);
        let label = if p == Parameter::Ph { "pH Level" } else { p.display_name() };
        writeln!(f, "{label}: {value:.2}{unit} {flag}")?;
        writeln!(f, "  - Normal Range: {} - {}{}", band.min, band.max, unit)?;
        if with_status {
            let status = match position {
                BandPosition::Below => "BELOW THRESHOLD",
                BandPosition::Above => "ABOVE THRESHOLD",
                BandPosition::Within => "WITHIN RANGE",
                BandPosition::Invalid => "INVALID READING",
            };
            writeln!(f, "  - Status: {status}")?;
        }
        Ok(())
    }
}

struct QualityMessage<'a> {
    policy: &'a AlertPolicy,
    decision: &'a Decision,
    reading: &'a Reading,
}

impl fmt::Display for QualityMessage<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let d = self.decision;
        writeln!(f, "[SYSTEM ALERT - POND WATER QUALITY]")?;
        writeln!(f, "{RULE_LINE}")?;
        writeln!(f, "TIMESTAMP: {}", format_timestamp(self.reading.timestamp))?;
        writeln!(f, "STATUS: {}", d.bucket())?;
        writeln!(f, "SCORE: {:.2}/100", d.score)?;
        match d.rule {
            Some(id) => writeln!(f, "RULE: {} ({}, aerator {})", id, d.category, d.actuator_command)?,
            None => writeln!(f, "RULE: none ({})", d.recommendation)?,
        }
        writeln!(f, "{RULE_LINE}")?;
        writeln!(f, "SENSOR READINGS")?;
        for p in Parameter::ALL {
            self.policy.write_parameter(f, p, self.reading, false)?;
        }
        writeln!(f, "{RULE_LINE}")?;
        if d.rule.is_some() {
            writeln!(f, "RECOMMENDATION: {}", d.recommendation)?;
        }
        write!(f, "ACTION REQUIRED: Please check pond conditions immediately.")
    }
}

struct ParameterMessage<'a> {
    policy: &'a AlertPolicy,
    offenders: OutOfBand,
    reading: &'a Reading,
}

impl fmt::Display for ParameterMessage<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[COMBINED ALERT - POND WATER QUALITY]")?;
        writeln!(f, "{RULE_LINE}")?;
        writeln!(f, "TIMESTAMP: {}", format_timestamp(self.reading.timestamp))?;
        writeln!(f, "ABNORMAL PARAMETERS: {}", self.offenders.len())?;
        writeln!(f, "{RULE_LINE}")?;
        writeln!(f, "SENSOR READINGS")?;
        for p in Parameter::ALL {
            self.policy
                .write_parameter(f, p, self.reading, self.offenders.contains(p))?;
        }
        writeln!(f, "{RULE_LINE}")?;
        write!(f, "ACTION REQUIRED: Immediate inspection recommended.")
    }
}

impl Default for AlertPolicy {
    fn default() -> Self {
        Self::new(&MonitorConfig::default())
    }
}

// ───────────────────────────────────────────────────────────────
// Dispatch
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum AlertOutcome {
    Sent,
    /// A live entry for the key exists; nothing sent.
    RateLimited,
    /// The cache failed; nothing sent.
    Skipped(CacheError),
    /// The key was claimed but the notifier failed.
    TransportFailed(NotifyError),
}

impl AlertOutcome {
    pub fn is_sent(&self) -> bool {
        matches!(self, Self::Sent)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AlertReport {
    pub key: String,
    pub outcome: AlertOutcome,
}

/// Send every alert of `plan` whose key is not in its cool-down.
pub fn dispatch<C, N>(
    plan: &AlertPlan,
    cache: &C,
    notifier: &mut N,
    destination: &str,
    cooldown: Duration,
) -> Vec<AlertReport>
where
    C: RateLimitCache + ?Sized,
    N: Notifier + ?Sized,
{
    plan.alerts()
        .iter()
        .map(|alert| {
            let outcome = match cache.try_set_if_absent(&alert.key, cooldown) {
                Ok(true) => match notifier.send(&alert.message, destination) {
                    Ok(()) => {
                        info!("alert {} sent to {}", alert.key, destination);
                        AlertOutcome::Sent
                    }
                    Err(e) => {
                        error!("alert {} not delivered: {}", alert.key, e);
                        AlertOutcome::TransportFailed(e)
                    }
                },
                Ok(false) => {
                    warn!("alert {} suppressed: cool-down active", alert.key);
                    AlertOutcome::RateLimited
                }
                Err(e) => {
                    warn!("alert {} skipped: {}", alert.key, e);
                    AlertOutcome::Skipped(e)
                }
            };
            AlertReport {
                key: alert.key.clone(),
                outcome,
            }
        })
        .collect()
}

// ───────────────────────────────────────────────────────────────
// Daily report
// ───────────────────────────────────────────────────────────────

/// Render the avg/min/max report for readings taken in `[start, end]`.
pub fn render_daily_report(summary: &HistorySummary, start: u64, end: u64) -> String {
    DailyReport { summary, start, end }.to_string()
}

struct DailyReport<'a> {
    summary: &'a HistorySummary,
    start: u64,
    end: u64,
}

impl fmt::Display for DailyReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self.summary;
        writeln!(f, "[DAILY REPORT - POND WATER QUALITY]")?;
        writeln!(f, "{RULE_LINE}")?;
        writeln!(
            f,
            "PERIOD: {} to {}",
            format_timestamp(self.start),
            format_timestamp(self.end)
        )?;
        writeln!(f, "TOTAL READINGS: {}", s.count)?;
        writeln!(f, "{RULE_LINE}")?;
        writeln!(f, "DAILY SUMMARY")?;
        write_stats(f, "pH Level", &s.ph, "")?;
        write_stats(f, "TDS", &s.tds, " ppm")?;
        write_stats(f, "Turbidity", &s.turbidity, " NTU")?;
        write_stats(f, "Water Level", &s.water_level, " cm")?;
        write_stats(f, "Water Quality Score", &s.score, "/100")?;
        write!(f, "{RULE_LINE}")
    }
}

fn write_stats(f: &mut fmt::Formatter<'_>, title: &str, stats: &Stats, unit: &str) -> fmt::Result {
    writeln!(f, "{title}")?;
    writeln!(f, "  - Average: {:.2}{unit}", stats.avg)?;
    writeln!(f, "  - Min: {:.2} | Max: {:.2}", stats.min, stats.max)
}

fn unit_suffix(p: Parameter) -> &'static str {
    match p {
        Parameter::Ph => "",
        Parameter::Tds => " ppm",
        Parameter::Turbidity => " NTU",
    }
}

/// `YYYY-MM-DD HH:MM:SS UTC`, or the raw seconds if out of range.
pub fn format_timestamp(unix_secs: u64) -> String {
    i64::try_from(unix_secs)
        .ok()
        .and_then(|s| DateTime::<Utc>::from_timestamp(s, 0))
        .map_or_else(
            || format!("@{unix_secs}"),
            |dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        )
}
