//! Integration tests: MonitorService → history / alerts / events.

use pondwatch::Error;
use pondwatch::adapters::log_notifier::LogNotifier;
use pondwatch::adapters::memory::{MemoryRateLimitCache, MemorySensorSource, MemoryStorage};
use pondwatch::adapters::time::ManualClock;
use pondwatch::alert::AlertOutcome;
use pondwatch::app::commands::AppCommand;
use pondwatch::app::events::AppEvent;
use pondwatch::app::ports::{CacheError, ConfigPort, NotifyError, StorageError, StoreError};
use pondwatch::app::service::{CommandOutcome, MonitorService};
use pondwatch::config::MonitorConfig;
use pondwatch::error::SensorError;
use pondwatch::fuzzy::{ActuatorCommand, Category, Parameter, QualityBucket, RuleId};
use pondwatch::history::DecisionHistory;
use pondwatch::sensors::Quantity;

use crate::mock_ports::{FailingCache, FailingNotifier, FailingStore, RecordingSink, reading};

/// Config whose turbidity band admits clear water, so good readings are quiet.
fn quiet_config() -> MonitorConfig {
    MonitorConfig {
        turbidity_band: pondwatch::config::SafeBand::new(0.0, 45.0),
        ..MonitorConfig::default()
    }
}

struct Rig {
    service: MonitorService,
    source: MemorySensorSource,
    history: DecisionHistory<MemoryStorage>,
    clock: ManualClock,
    notifier: LogNotifier,
    sink: RecordingSink,
}

impl Rig {
    fn new(config: MonitorConfig) -> Self {
        let capacity = usize::from(config.history_capacity);
        Self {
            service: MonitorService::new(config),
            source: MemorySensorSource::default(),
            history: DecisionHistory::open(MemoryStorage::new(), capacity),
            clock: ManualClock::new(1_700_000_000_000),
            notifier: LogNotifier::new(),
            sink: RecordingSink::new(),
        }
    }

    fn cycle(&mut self) -> pondwatch::Result<pondwatch::app::service::CycleReport> {
        let cache = MemoryRateLimitCache::new(&self.clock);
        self.service
            .run_cycle(&self.source, &mut self.history, &cache, &mut self.notifier, &mut self.sink)
    }
}

// ── Evaluation ────────────────────────────────────────────────

#[test]
fn good_water_is_persisted_without_alerts() {
    let mut rig = Rig::new(quiet_config());
    rig.source.push(reading(7.5, 380.0, 10.0, 1_700_000_000));

    let report = rig.cycle().unwrap();
    assert_eq!(report.decision.rule, Some(RuleId::R7));
    assert_eq!(report.decision.category, Category::Good);
    assert_eq!(report.decision.bucket(), QualityBucket::Good);
    assert_eq!(report.persisted, Ok(0));
    assert!(report.alerts.is_empty());
    assert!(rig.notifier.sent().is_empty());
    assert_eq!(rig.history.count(), 1);
    assert_eq!(rig.sink.count(|e| matches!(e, AppEvent::Persisted(0))), 1);
}

#[test]
fn empty_source_reports_no_reading() {
    let mut rig = Rig::new(MonitorConfig::default());
    assert_eq!(rig.cycle(), Err(Error::NoReading));
    assert_eq!(rig.sink.events, vec![AppEvent::NoReading]);
    assert_eq!(rig.history.count(), 0);
}

#[test]
fn implausible_reading_is_rejected_before_inference() {
    let mut rig = Rig::new(MonitorConfig::default());
    rig.source.push(reading(15.0, 380.0, 10.0, 1));

    let err = rig.cycle().unwrap_err();
    assert_eq!(
        err,
        Error::Sensor(SensorError::OutOfRange(Quantity::Quality(Parameter::Ph)))
    );
    assert_eq!(rig.history.count(), 0);
    assert!(rig.notifier.sent().is_empty());
    assert_eq!(rig.sink.count(|e| matches!(e, AppEvent::Evaluated(_))), 0);
}

#[test]
fn actuator_change_is_reported_once() {
    let mut rig = Rig::new(quiet_config());
    rig.source.push(reading(7.5, 380.0, 10.0, 100));
    assert!(!rig.cycle().unwrap().actuator_changed);

    rig.source.push(reading(9.0, 380.0, 10.0, 200));
    let report = rig.cycle().unwrap();
    assert!(report.actuator_changed);
    assert_eq!(rig.service.actuator(), Some(ActuatorCommand::On));
    assert_eq!(
        rig.sink.count(|e| matches!(
            e,
            AppEvent::ActuatorChanged {
                from: ActuatorCommand::Off,
                to: ActuatorCommand::On
            }
        )),
        1
    );

    rig.source.push(reading(9.1, 380.0, 10.0, 300));
    assert!(!rig.cycle().unwrap().actuator_changed);
}

// ── Alerts ────────────────────────────────────────────────────

#[test]
fn poor_water_sends_quality_and_parameter_alerts() {
    let mut rig = Rig::new(MonitorConfig::default());
    rig.source.push(reading(9.0, 900.0, 80.0, 1_700_000_000));

    let report = rig.cycle().unwrap();
    let keys: Vec<_> = report.alerts.iter().map(|a| a.key.as_str()).collect();
    assert_eq!(keys, ["quality:Poor", "params:ph,tds,turbidity"]);
    assert!(report.alerts.iter().all(|a| a.outcome.is_sent()));
    assert_eq!(rig.notifier.sent().len(), 2);
    assert!(rig.notifier.sent().iter().all(|(to, _)| to == "pond-operators"));
    assert!(rig.notifier.sent()[0].1.contains("RULE: R5"));
}

#[test]
fn cooldown_suppresses_repeats_until_it_expires() {
    let mut rig = Rig::new(MonitorConfig::default());
    rig.source.push(reading(9.0, 380.0, 30.0, 100));
    let cache = MemoryRateLimitCache::new(&rig.clock);

    let first = rig
        .service
        .run_cycle(&rig.source, &mut rig.history, &cache, &mut rig.notifier, &mut rig.sink)
        .unwrap();
    assert!(first.alerts.iter().all(|a| a.outcome.is_sent()));
    let sent = rig.notifier.sent().len();

    rig.clock.advance_ms(30_000);
    let second = rig
        .service
        .run_cycle(&rig.source, &mut rig.history, &cache, &mut rig.notifier, &mut rig.sink)
        .unwrap();
    assert!(second.alerts.iter().all(|a| a.outcome == AlertOutcome::RateLimited));
    assert_eq!(rig.notifier.sent().len(), sent);

    rig.clock.advance_ms(30_000);
    let third = rig
        .service
        .run_cycle(&rig.source, &mut rig.history, &cache, &mut rig.notifier, &mut rig.sink)
        .unwrap();
    assert!(third.alerts.iter().all(|a| a.outcome.is_sent()));
    assert_eq!(rig.notifier.sent().len(), sent * 2);
}

#[test]
fn cache_failure_skips_alerts_but_keeps_the_decision() {
    let mut rig = Rig::new(MonitorConfig::default());
    rig.source.push(reading(9.0, 900.0, 80.0, 1));

    let report = rig
        .service
        .run_cycle(&rig.source, &mut rig.history, &FailingCache, &mut rig.notifier, &mut rig.sink)
        .unwrap();
    assert!(!report.alerts.is_empty());
    assert!(
        report
            .alerts
            .iter()
            .all(|a| a.outcome == AlertOutcome::Skipped(CacheError::Unavailable))
    );
    assert!(rig.notifier.sent().is_empty());
    assert_eq!(rig.history.count(), 1);
    assert_eq!(
        rig.sink.count(|e| matches!(e, AppEvent::AlertSkipped { .. })),
        report.alerts.len()
    );
}

#[test]
fn notifier_failure_is_reported_and_not_retried() {
    let mut rig = Rig::new(MonitorConfig::default());
    rig.source.push(reading(9.0, 900.0, 80.0, 1));
    let cache = MemoryRateLimitCache::new(&rig.clock);
    let mut notifier = FailingNotifier::default();

    let report = rig
        .service
        .run_cycle(&rig.source, &mut rig.history, &cache, &mut notifier, &mut rig.sink)
        .unwrap();
    assert_eq!(notifier.attempts, report.alerts.len());
    assert!(
        report
            .alerts
            .iter()
            .all(|a| a.outcome == AlertOutcome::TransportFailed(NotifyError::Timeout))
    );
    assert_eq!(rig.sink.count(|e| matches!(e, AppEvent::AlertFailed { .. })), 2);
}

#[test]
fn store_failure_does_not_block_alerts() {
    let mut rig = Rig::new(MonitorConfig::default());
    rig.source.push(reading(9.0, 900.0, 80.0, 1));
    let cache = MemoryRateLimitCache::new(&rig.clock);

    let report = rig
        .service
        .run_cycle(&rig.source, &mut FailingStore, &cache, &mut rig.notifier, &mut rig.sink)
        .unwrap();
    assert_eq!(report.persisted, Err(StoreError::Storage(StorageError::Full)));
    assert_eq!(rig.notifier.sent().len(), 2);
    assert_eq!(rig.sink.count(|e| matches!(e, AppEvent::PersistFailed(_))), 1);
}

#[test]
fn unknown_decision_alerts_on_quality() {
    let mut rig = Rig::new(MonitorConfig::default());
    // In range for the probes, outside every fuzzy set.
    rig.source.push(reading(14.0, 15_000.0, 900.0, 1));

    let report = rig.cycle().unwrap();
    assert!(report.decision.is_unknown());
    assert_eq!(report.decision.score, 0.0);
    assert_eq!(report.alerts[0].key, "quality:Critical");
    assert!(rig.notifier.sent()[0].1.contains("RULE: none"));
}

// ── Commands ──────────────────────────────────────────────────

#[test]
fn update_config_changes_threshold_and_rejects_invalid() {
    let mut rig = Rig::new(quiet_config());
    let cache = MemoryRateLimitCache::new(&rig.clock);

    let bad = MonitorConfig {
        alert_cooldown_secs: 0,
        ..MonitorConfig::default()
    };
    let err = rig
        .service
        .handle_command(
            AppCommand::UpdateConfig(bad),
            &rig.source,
            &mut rig.history,
            &cache,
            &mut rig.notifier,
            &mut rig.sink,
        )
        .unwrap_err();
    assert!(matches!(err, Error::Config(_)));
    assert_eq!(rig.service.config().alert_cooldown_secs, 60);

    let strict = MonitorConfig {
        alert_score_threshold: 80.0,
        ..quiet_config()
    };
    let outcome = rig
        .service
        .handle_command(
            AppCommand::UpdateConfig(strict),
            &rig.source,
            &mut rig.history,
            &cache,
            &mut rig.notifier,
            &mut rig.sink,
        )
        .unwrap();
    assert_eq!(outcome, CommandOutcome::ConfigUpdated);

    // Score 75 is now below the threshold.
    rig.source.push(reading(7.5, 380.0, 10.0, 1));
    let report = rig.cycle().unwrap();
    assert_eq!(report.alerts.len(), 1);
    assert_eq!(report.alerts[0].key, "quality:Good");
}

#[test]
fn daily_report_covers_the_requested_window() {
    let mut rig = Rig::new(MonitorConfig::default());
    for (i, ph) in [7.0, 7.5, 8.0].into_iter().enumerate() {
        rig.source.push(reading(ph, 380.0, 10.0, 1_000 + i as u64 * 100));
    }
    rig.source.push(reading(7.5, 380.0, 10.0, 90_000));
    let cache = MemoryRateLimitCache::new(&rig.clock);

    let outcome = rig
        .service
        .handle_command(
            AppCommand::SendDailyReport { start: 0, end: 86_400 },
            &rig.source,
            &mut rig.history,
            &cache,
            &mut rig.notifier,
            &mut rig.sink,
        )
        .unwrap();
    assert_eq!(outcome, CommandOutcome::ReportSent(3));
    let (_, message) = &rig.notifier.sent()[0];
    assert!(message.starts_with("[DAILY REPORT - POND WATER QUALITY]"));
    assert!(message.contains("TOTAL READINGS: 3"));
    assert!(message.contains("  - Min: 7.00 | Max: 8.00"));
}

#[test]
fn daily_report_with_no_readings_sends_nothing() {
    let mut rig = Rig::new(MonitorConfig::default());
    let cache = MemoryRateLimitCache::new(&rig.clock);
    let err = rig
        .service
        .handle_command(
            AppCommand::SendDailyReport { start: 0, end: 10 },
            &rig.source,
            &mut rig.history,
            &cache,
            &mut rig.notifier,
            &mut rig.sink,
        )
        .unwrap_err();
    assert_eq!(err, Error::NoReading);
    assert!(rig.notifier.sent().is_empty());
}

#[test]
fn saved_config_survives_a_restart() {
    let storage = MemoryStorage::new();
    let config = MonitorConfig {
        alert_destination: String::from("-100123"),
        ..MonitorConfig::default()
    };
    MonitorService::new(config.clone()).save_config(&storage).unwrap();
    assert_eq!(storage.load().unwrap(), config);
}

#[test]
fn history_survives_reopen_and_keeps_ids_increasing() {
    let mut rig = Rig::new(quiet_config());
    rig.history = DecisionHistory::open(MemoryStorage::new(), 4);
    for ts in 0..6 {
        rig.source.push(reading(7.5, 380.0, 10.0, ts));
        rig.cycle().unwrap();
    }

    let reopened = DecisionHistory::open(rig.history.storage().clone(), 4);
    let ids: Vec<_> = reopened.read_all().iter().map(|r| r.id).collect();
    assert_eq!(ids, [2, 3, 4, 5]);
    assert_eq!(reopened.latest().map(|r| r.timestamp), Some(5));
}
