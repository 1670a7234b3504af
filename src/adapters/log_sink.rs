//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing each application event as one
//! structured line through the `log` facade.  A dashboard or metrics
//! adapter would implement the same trait.

use log::{debug, error, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`].
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started { score_threshold } => {
                info!("START | alert_threshold={:.1}", score_threshold);
            }
            AppEvent::Evaluated(e) => {
                let rule = e.rule.map_or_else(|| "-".to_owned(), |r| r.to_string());
                info!(
                    "EVAL  | ts={} | category={} | bucket={} | score={:.2} | rule={} ({:.2}) | aerator={}",
                    e.timestamp, e.category, e.bucket, e.score, rule, e.rule_strength, e.actuator
                );
            }
            AppEvent::ActuatorChanged { from, to } => {
                info!("AERATOR | {} -> {}", from, to);
            }
            AppEvent::Persisted(id) => {
                debug!("STORE | record={}", id);
            }
            AppEvent::PersistFailed(e) => {
                warn!("STORE | failed: {}", e);
            }
            AppEvent::AlertSent { key } => {
                info!("ALERT | sent key={}", key);
            }
            AppEvent::AlertSuppressed { key } => {
                info!("ALERT | suppressed key={}", key);
            }
            AppEvent::AlertSkipped { key, error } => {
                warn!("ALERT | skipped key={} cache={}", key, error);
            }
            AppEvent::AlertFailed { key, error } => {
                error!("ALERT | failed key={} notifier={}", key, error);
            }
            AppEvent::ReadingRejected(e) => {
                warn!("READ  | rejected: {}", e);
            }
            AppEvent::NoReading => {
                info!("READ  | no reading available");
            }
            AppEvent::ConfigUpdated => {
                info!("CONFIG | updated");
            }
            AppEvent::DailyReportSent { readings } => {
                info!("REPORT | sent readings={}", readings);
            }
        }
    }
}
