//! Application service: the hexagonal core.
//!
//! [`MonitorService`] owns the configuration, the alert policy and the
//! last aerator recommendation.  All I/O flows through port traits
//! injected at call sites, so the whole cycle is testable with in-memory
//! adapters.
//!
//! ```text
//!  SensorSource ──▶ ┌──────────────────────────┐ ──▶ EventSink
//!                   │      MonitorService      │
//! DecisionStore ◀── │ validate · infer · alert │ ──▶ Notifier
//!                   └──────────────────────────┘
//!                                │
//!                          RateLimitCache
//! ```

use log::{debug, info, warn};

use crate::alert::{AlertOutcome, AlertPolicy, AlertReport, dispatch, render_daily_report};
use crate::analytics::summarize;
use crate::config::MonitorConfig;
use crate::error::{Error, Result};
use crate::fuzzy::{ActuatorCommand, Decision, evaluate_reading};
use crate::sensors::Reading;

use super::commands::AppCommand;
use super::events::{AppEvent, EvaluationSummary};
use super::ports::{ConfigPort, DecisionStore, EventSink, Notifier, RateLimitCache, RecordId, SensorSource, StoreError};

/// Upper bound on readings pulled for one daily report.
pub const REPORT_READING_LIMIT: usize = 10_000;

/// What one evaluation cycle did.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    pub reading: Reading,
    pub decision: Decision,
    /// Outcome of persisting the decision.
    pub persisted: core::result::Result<RecordId, StoreError>,
    /// One entry per planned alert; empty when nothing was planned.
    pub alerts: Vec<AlertReport>,
    /// The aerator recommendation differs from the previous cycle's.
    pub actuator_changed: bool,
}

/// Result of [`MonitorService::handle_command`].
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutcome {
    Cycle(CycleReport),
    ConfigUpdated,
    /// Daily report sent, covering this many readings.
    ReportSent(usize),
}

// ───────────────────────────────────────────────────────────────
// MonitorService
// ───────────────────────────────────────────────────────────────

pub struct MonitorService {
    config: MonitorConfig,
    policy: AlertPolicy,
    /// Last recommendation; `None` until the first evaluation.
    actuator: Option<ActuatorCommand>,
    cycle_count: u64,
}

impl MonitorService {
    /// Construct the service.  `config` is expected to be validated.
    pub fn new(config: MonitorConfig) -> Self {
        let policy = AlertPolicy::new(&config);
        Self {
            config,
            policy,
            actuator: None,
            cycle_count: 0,
        }
    }

    pub fn start(&mut self, sink: &mut impl EventSink) {
        sink.emit(&AppEvent::Started {
            score_threshold: self.config.alert_score_threshold,
        });
        info!(
            "MonitorService started (alert below {:.0}, cool-down {}s)",
            self.config.alert_score_threshold, self.config.alert_cooldown_secs
        );
    }

    // ── Evaluation ────────────────────────────────────────────

    /// Validate and evaluate one reading, tracking the aerator state.
    ///
    /// Implausible readings are rejected before they reach the engine.
    pub fn evaluate_reading(&mut self, reading: &Reading, sink: &mut impl EventSink) -> Result<Decision> {
        if let Err(e) = reading.validate() {
            warn!("reading at {} rejected: {}", reading.timestamp, e);
            sink.emit(&AppEvent::ReadingRejected(e));
            return Err(e.into());
        }

        let decision = evaluate_reading(reading);
        sink.emit(&AppEvent::Evaluated(EvaluationSummary {
            timestamp: reading.timestamp,
            category: decision.category,
            bucket: decision.bucket(),
            score: decision.score,
            rule: decision.rule,
            rule_strength: decision.rule_strength,
            actuator: decision.actuator_command,
        }));

        let next = decision.actuator_command;
        match self.actuator.replace(next) {
            Some(prev) if prev != next => {
                info!("aerator {} -> {}", prev, next);
                sink.emit(&AppEvent::ActuatorChanged { from: prev, to: next });
            }
            None => debug!("aerator initial state {}", next),
            _ => {}
        }
        Ok(decision)
    }

    /// Run one full cycle: fetch → validate → infer → persist → alert.
    ///
    /// Store and notifier failures do not abort the cycle; they are
    /// reported in the returned [`CycleReport`] and as events.
    pub fn run_cycle(
        &mut self,
        source: &impl SensorSource,
        store: &mut impl DecisionStore,
        cache: &impl RateLimitCache,
        notifier: &mut impl Notifier,
        sink: &mut impl EventSink,
    ) -> Result<CycleReport> {
        self.cycle_count += 1;

        let Some(reading) = source.latest()? else {
            debug!("no reading available");
            sink.emit(&AppEvent::NoReading);
            return Err(Error::NoReading);
        };

        let previous = self.actuator;
        let decision = self.evaluate_reading(&reading, sink)?;
        let actuator_changed = previous.is_some_and(|p| p != decision.actuator_command);

        let persisted = store.save(&reading, &decision);
        match &persisted {
            Ok(id) => sink.emit(&AppEvent::Persisted(*id)),
            Err(e) => {
                warn!("decision not persisted: {}", e);
                sink.emit(&AppEvent::PersistFailed(e.clone()));
            }
        }

        self.policy.track(&reading);
        let alerts = match self.policy.should_alert(&decision, &reading) {
            Some(plan) => dispatch(
                &plan,
                cache,
                notifier,
                &self.config.alert_destination,
                self.config.cooldown(),
            ),
            None => Vec::new(),
        };
        for report in &alerts {
            sink.emit(&alert_event(report));
        }

        info!(
            "cycle {}: {} (score {:.2}, {}), aerator {}, {} alert(s) planned",
            self.cycle_count,
            decision.category,
            decision.score,
            decision.bucket(),
            decision.actuator_command,
            alerts.len()
        );

        Ok(CycleReport {
            reading,
            decision,
            persisted,
            alerts,
            actuator_changed,
        })
    }

    // ── Command handling ──────────────────────────────────────

    /// Process an external command.
    pub fn handle_command(
        &mut self,
        cmd: AppCommand,
        source: &impl SensorSource,
        store: &mut impl DecisionStore,
        cache: &impl RateLimitCache,
        notifier: &mut impl Notifier,
        sink: &mut impl EventSink,
    ) -> Result<CommandOutcome> {
        match cmd {
            AppCommand::EvaluateLatest => self
                .run_cycle(source, store, cache, notifier, sink)
                .map(CommandOutcome::Cycle),
            AppCommand::UpdateConfig(new_config) => {
                new_config.validate()?;
                self.policy.reconfigure(&new_config);
                self.config = new_config;
                info!("configuration updated at runtime");
                sink.emit(&AppEvent::ConfigUpdated);
                Ok(CommandOutcome::ConfigUpdated)
            }
            AppCommand::SendDailyReport { start, end } => {
                let readings = source.historical(start, end, REPORT_READING_LIMIT)?;
                let Some(summary) = summarize(&readings) else {
                    sink.emit(&AppEvent::NoReading);
                    return Err(Error::NoReading);
                };
                let message = render_daily_report(&summary, start, end);
                notifier.send(&message, &self.config.alert_destination)?;
                info!("daily report sent ({} readings)", summary.count);
                sink.emit(&AppEvent::DailyReportSent {
                    readings: summary.count,
                });
                Ok(CommandOutcome::ReportSent(summary.count))
            }
        }
    }

    // ── Config persistence ────────────────────────────────────

    /// Persist the live configuration.
    pub fn save_config(&self, port: &impl ConfigPort) -> Result<()> {
        port.save(&self.config)?;
        info!("configuration saved");
        Ok(())
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Last aerator recommendation, `None` before the first evaluation.
    pub fn actuator(&self) -> Option<ActuatorCommand> {
        self.actuator
    }

    pub fn cycle_count(&self) -> u64 {
        self.cycle_count
    }
}

fn alert_event(report: &AlertReport) -> AppEvent {
    let key = report.key.clone();
    match &report.outcome {
        AlertOutcome::Sent => AppEvent::AlertSent { key },
        AlertOutcome::RateLimited => AppEvent::AlertSuppressed { key },
        AlertOutcome::Skipped(error) => AppEvent::AlertSkipped {
            key,
            error: error.clone(),
        },
        AlertOutcome::TransportFailed(error) => AppEvent::AlertFailed {
            key,
            error: error.clone(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::ports::ConfigError;

    struct NullSink;

    impl EventSink for NullSink {
        fn emit(&mut self, _event: &AppEvent) {}
    }

    fn reading(ph: f32) -> Reading {
        Reading {
            ph,
            tds: 380.0,
            turbidity: 10.0,
            water_level: 40.0,
            timestamp: 1,
        }
    }

    #[test]
    fn actuator_state_is_tracked() {
        let mut svc = MonitorService::new(MonitorConfig::default());
        assert_eq!(svc.actuator(), None);
        svc.evaluate_reading(&reading(7.5), &mut NullSink).unwrap();
        assert_eq!(svc.actuator(), Some(ActuatorCommand::Off));
        svc.evaluate_reading(&reading(9.5), &mut NullSink).unwrap();
        assert_eq!(svc.actuator(), Some(ActuatorCommand::On));
    }

    #[test]
    fn implausible_reading_leaves_state_untouched() {
        let mut svc = MonitorService::new(MonitorConfig::default());
        let err = svc.evaluate_reading(&reading(15.0), &mut NullSink).unwrap_err();
        assert!(matches!(err, Error::Sensor(_)));
        assert_eq!(svc.actuator(), None);
    }

    #[test]
    fn save_config_surfaces_port_errors() {
        struct ReadOnly;
        impl ConfigPort for ReadOnly {
            fn load(&self) -> core::result::Result<MonitorConfig, ConfigError> {
                Ok(MonitorConfig::default())
            }
            fn save(&self, _config: &MonitorConfig) -> core::result::Result<(), ConfigError> {
                Err(ConfigError::IoError)
            }
        }
        let svc = MonitorService::new(MonitorConfig::default());
        assert_eq!(svc.save_config(&ReadOnly), Err(Error::Config(ConfigError::IoError)));
    }
}
