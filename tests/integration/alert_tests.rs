//! Integration tests: AlertPolicy → dispatch → rendered messages.

use std::time::Duration;

use pondwatch::adapters::log_notifier::LogNotifier;
use pondwatch::adapters::memory::MemoryRateLimitCache;
use pondwatch::adapters::time::ManualClock;
use pondwatch::alert::{AlertKind, AlertOutcome, AlertPolicy, dispatch, format_timestamp};
use pondwatch::config::MonitorConfig;
use pondwatch::fuzzy::{Parameter, QualityBucket, evaluate_reading};

use crate::mock_ports::reading;

const COOLDOWN: Duration = Duration::from_secs(60);

#[test]
fn clear_water_is_below_the_default_turbidity_band() {
    let policy = AlertPolicy::default();
    let r = reading(7.5, 380.0, 10.0, 1_700_000_000);
    let plan = policy.should_alert(&evaluate_reading(&r), &r).unwrap();

    assert_eq!(plan.len(), 1);
    let alert = &plan.alerts()[0];
    assert_eq!(alert.key, "params:turbidity");
    match alert.kind {
        AlertKind::Parameters(set) => {
            assert!(set.contains(Parameter::Turbidity));
            assert_eq!(set.len(), 1);
        }
        AlertKind::Quality(_) => panic!("unexpected quality alert"),
    }
    assert!(alert.message.starts_with("[COMBINED ALERT - POND WATER QUALITY]"));
    assert!(alert.message.contains("ABNORMAL PARAMETERS: 1"));
    assert!(alert.message.contains("Turbidity: 10.00 NTU [ABNORMAL]"));
    assert!(alert.message.contains("  - Status: BELOW THRESHOLD"));
    assert!(alert.message.contains("pH Level: 7.50 [OK]"));
}

#[test]
fn quality_message_carries_score_rule_and_timestamp() {
    let policy = AlertPolicy::default();
    let r = reading(9.0, 900.0, 80.0, 1_700_000_000);
    let plan = policy.should_alert(&evaluate_reading(&r), &r).unwrap();

    let quality = &plan.alerts()[0];
    assert_eq!(quality.kind, AlertKind::Quality(QualityBucket::Poor));
    let m = &quality.message;
    assert!(m.starts_with("[SYSTEM ALERT - POND WATER QUALITY]"));
    assert!(m.contains("TIMESTAMP: 2023-11-14 22:13:20 UTC"));
    assert!(m.contains("STATUS: Poor"));
    assert!(m.contains("SCORE: 30.00/100"));
    assert!(m.contains("RULE: R5 (Poor, aerator ON)"));
    assert!(m.contains("  - Normal Range: 300 - 800 ppm"));
    assert!(m.ends_with("ACTION REQUIRED: Please check pond conditions immediately."));
}

#[test]
fn worsening_bucket_alerts_during_cooldown() {
    let clock = ManualClock::new(0);
    let cache = MemoryRateLimitCache::new(&clock);
    let mut notifier = LogNotifier::new();
    let policy = AlertPolicy::new(&MonitorConfig::default());

    let poor = reading(9.0, 380.0, 30.0, 1);
    let plan = policy.should_alert(&evaluate_reading(&poor), &poor).unwrap();
    let first = dispatch(&plan, &cache, &mut notifier, "ops", COOLDOWN);
    assert_eq!(first[0].key, "quality:Poor");
    assert!(first[0].outcome.is_sent());

    clock.advance(Duration::from_secs(5));
    let critical = reading(14.0, 15_000.0, 900.0, 6);
    let plan = policy.should_alert(&evaluate_reading(&critical), &critical).unwrap();
    let second = dispatch(&plan, &cache, &mut notifier, "ops", COOLDOWN);
    assert_eq!(second[0].key, "quality:Critical");
    assert!(second[0].outcome.is_sent());

    // Same bucket again: suppressed.
    let third = dispatch(&plan, &cache, &mut notifier, "ops", COOLDOWN);
    assert_eq!(third[0].outcome, AlertOutcome::RateLimited);
}

#[test]
fn parameter_key_changes_with_the_offender_set() {
    let policy = AlertPolicy::default();
    let a = reading(9.0, 380.0, 30.0, 1);
    let b = reading(9.0, 900.0, 30.0, 2);
    assert_eq!(policy.out_of_band(&a).key(), "params:ph");
    assert_eq!(policy.out_of_band(&b).key(), "params:ph,tds");
}

#[test]
fn track_follows_parameters_in_and_out_of_band() {
    let mut policy = AlertPolicy::default();
    assert!(policy.active().is_empty());

    let set = policy.track(&reading(9.0, 380.0, 30.0, 1));
    assert!(set.contains(Parameter::Ph));
    assert_eq!(policy.active(), set);

    let set = policy.track(&reading(7.5, 380.0, 30.0, 2));
    assert!(set.is_empty());
    assert!(policy.active().is_empty());
}

#[test]
fn band_edges_are_in_band() {
    let policy = AlertPolicy::default();
    let r = reading(8.5, 800.0, 45.0, 1);
    assert!(policy.out_of_band(&r).is_empty());
    let r = reading(6.5, 300.0, 20.0, 1);
    assert!(policy.out_of_band(&r).is_empty());
}

#[test]
fn timestamps_render_in_utc() {
    assert_eq!(format_timestamp(0), "1970-01-01 00:00:00 UTC");
    assert_eq!(format_timestamp(u64::MAX), format!("@{}", u64::MAX));
}
