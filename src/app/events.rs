//! Outbound application events.
//!
//! The [`MonitorService`](super::service::MonitorService) emits these
//! through the [`EventSink`](super::ports::EventSink) port.  Adapters on
//! the other side decide what to do with them: log them, forward them to
//! a dashboard, count them.

use crate::app::ports::{CacheError, NotifyError, RecordId, StoreError};
use crate::error::SensorError;
use crate::fuzzy::{ActuatorCommand, Category, QualityBucket, RuleId};

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The service has started with this configuration threshold.
    Started { score_threshold: f32 },

    /// A reading was evaluated.
    Evaluated(EvaluationSummary),

    /// The aerator recommendation flipped.
    ActuatorChanged { from: ActuatorCommand, to: ActuatorCommand },

    /// The decision was written to the store.
    Persisted(RecordId),

    /// The decision could not be stored.
    PersistFailed(StoreError),

    AlertSent { key: String },

    /// Cool-down for this key is still running.
    AlertSuppressed { key: String },

    /// Rate-limit cache failed; the alert was not sent.
    AlertSkipped { key: String, error: CacheError },

    AlertFailed { key: String, error: NotifyError },

    /// The latest reading failed plausibility checks.
    ReadingRejected(SensorError),

    /// The source had nothing to evaluate.
    NoReading,

    ConfigUpdated,

    DailyReportSent { readings: usize },
}

/// Compact view of one decision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvaluationSummary {
    pub timestamp: u64,
    pub category: Category,
    pub bucket: QualityBucket,
    pub score: f32,
    pub rule: Option<RuleId>,
    pub rule_strength: f32,
    pub actuator: ActuatorCommand,
}
