//! Inbound commands to the application service.
//!
//! These represent actions requested by the outside world (scheduler,
//! operator console, chat bot) that the
//! [`MonitorService`](super::service::MonitorService) interprets and acts
//! upon.

use crate::config::MonitorConfig;

/// Commands that external adapters can send into the application core.
#[derive(Debug, Clone)]
pub enum AppCommand {
    /// Evaluate the most recent reading now instead of waiting for the
    /// next poll.
    EvaluateLatest,

    /// Hot-reload configuration.  Rejected if it fails validation.
    UpdateConfig(MonitorConfig),

    /// Summarise readings in `[start, end]` (Unix seconds) and send the
    /// report to the configured destination.
    SendDailyReport { start: u64, end: u64 },
}
