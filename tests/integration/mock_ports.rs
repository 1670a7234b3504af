//! Mock port adapters for integration tests.
//!
//! Failing variants of each driven port plus an event recorder, so tests
//! can assert on how the service degrades.

use std::time::Duration;

use pondwatch::app::events::AppEvent;
use pondwatch::app::ports::{
    CacheError, DecisionStore, EventSink, Notifier, NotifyError, RateLimitCache, RecordId, StorageError,
    StoreError,
};
use pondwatch::fuzzy::Decision;
use pondwatch::sensors::Reading;

// ── Event recorder ────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── Failing ports ─────────────────────────────────────────────

/// Cache whose backend is always down.
pub struct FailingCache;

impl RateLimitCache for FailingCache {
    fn try_set_if_absent(&self, _key: &str, _ttl: Duration) -> Result<bool, CacheError> {
        Err(CacheError::Unavailable)
    }
}

/// Notifier that never gets through.
#[derive(Default)]
pub struct FailingNotifier {
    pub attempts: usize,
}

impl Notifier for FailingNotifier {
    fn send(&mut self, _message: &str, _destination: &str) -> Result<(), NotifyError> {
        self.attempts += 1;
        Err(NotifyError::Timeout)
    }
}

/// Store that is always full.
pub struct FailingStore;

impl DecisionStore for FailingStore {
    fn save(&mut self, _reading: &Reading, _decision: &Decision) -> Result<RecordId, StoreError> {
        Err(StoreError::Storage(StorageError::Full))
    }
}

// ── Fixtures ──────────────────────────────────────────────────

pub fn reading(ph: f32, tds: f32, turbidity: f32, timestamp: u64) -> Reading {
    Reading {
        ph,
        tds,
        turbidity,
        water_level: 60.0,
        timestamp,
    }
}
