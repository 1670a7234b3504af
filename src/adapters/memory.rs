//! In-memory adapters.
//!
//! Used by the host binary for storage and rate limiting, and by tests as
//! drop-in port implementations.

use std::cell::RefCell;
use std::collections::HashMap;
use std::time::Duration;

use log::{debug, info};
use parking_lot::Mutex;

use crate::app::ports::{
    CacheError, Clock, ConfigError, ConfigPort, RateLimitCache, SensorSource, SourceError, StorageError,
    StoragePort,
};
use crate::config::MonitorConfig;
use crate::sensors::Reading;

const CONFIG_NAMESPACE: &str = "cfg";
const CONFIG_KEY: &str = "monitor";

// ───────────────────────────────────────────────────────────────
// Storage
// ───────────────────────────────────────────────────────────────

/// Namespaced key-value store backed by a `HashMap`.
///
/// Also serves as a [`ConfigPort`], storing the postcard-encoded config
/// under `cfg/monitor`.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    store: RefCell<HashMap<String, Vec<u8>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn composite_key(namespace: &str, key: &str) -> String {
        format!("{}/{}", namespace, key)
    }

    pub fn len(&self) -> usize {
        self.store.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.borrow().is_empty()
    }
}

impl StoragePort for MemoryStorage {
    fn read(&self, namespace: &str, key: &str, buf: &mut [u8]) -> Result<usize, StorageError> {
        let store = self.store.borrow();
        let data = store
            .get(&Self::composite_key(namespace, key))
            .ok_or(StorageError::NotFound)?;
        if data.len() > buf.len() {
            return Err(StorageError::BufferTooSmall);
        }
        buf[..data.len()].copy_from_slice(data);
        Ok(data.len())
    }

    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError> {
        self.store
            .get_mut()
            .insert(Self::composite_key(namespace, key), data.to_vec());
        Ok(())
    }

    fn delete(&mut self, namespace: &str, key: &str) -> Result<(), StorageError> {
        self.store.get_mut().remove(&Self::composite_key(namespace, key));
        Ok(())
    }

    fn exists(&self, namespace: &str, key: &str) -> bool {
        self.store
            .borrow()
            .contains_key(&Self::composite_key(namespace, key))
    }
}

impl ConfigPort for MemoryStorage {
    fn load(&self) -> Result<MonitorConfig, ConfigError> {
        let store = self.store.borrow();
        match store.get(&Self::composite_key(CONFIG_NAMESPACE, CONFIG_KEY)) {
            Some(bytes) => {
                let cfg: MonitorConfig = postcard::from_bytes(bytes).map_err(|_| ConfigError::Corrupted)?;
                cfg.validate()?;
                Ok(cfg)
            }
            None => {
                info!("MemoryStorage: no stored config, using defaults");
                Ok(MonitorConfig::default())
            }
        }
    }

    fn save(&self, config: &MonitorConfig) -> Result<(), ConfigError> {
        config.validate()?;
        let bytes = postcard::to_allocvec(config).map_err(|_| ConfigError::IoError)?;
        self.store
            .borrow_mut()
            .insert(Self::composite_key(CONFIG_NAMESPACE, CONFIG_KEY), bytes);
        Ok(())
    }
}

// ───────────────────────────────────────────────────────────────
// Sensor source
// ───────────────────────────────────────────────────────────────

/// Readings held in memory, kept sorted by timestamp.
#[derive(Debug, Clone, Default)]
pub struct MemorySensorSource {
    readings: Vec<Reading>,
}

impl MemorySensorSource {
    pub fn new(mut readings: Vec<Reading>) -> Self {
        readings.sort_by_key(|r| r.timestamp);
        Self { readings }
    }

    /// Record a new reading.
    pub fn push(&mut self, reading: Reading) {
        let at = self.readings.partition_point(|r| r.timestamp <= reading.timestamp);
        self.readings.insert(at, reading);
    }

    pub fn readings(&self) -> &[Reading] {
        &self.readings
    }
}

impl SensorSource for MemorySensorSource {
    fn latest(&self) -> Result<Option<Reading>, SourceError> {
        Ok(self.readings.last().copied())
    }

    fn historical(&self, start: u64, end: u64, limit: usize) -> Result<Vec<Reading>, SourceError> {
        Ok(self
            .readings
            .iter()
            .filter(|r| r.timestamp >= start && r.timestamp <= end)
            .take(limit)
            .copied()
            .collect())
    }
}

// ───────────────────────────────────────────────────────────────
// Rate-limit cache
// ───────────────────────────────────────────────────────────────

/// TTL cache with an atomic set-if-absent.
///
/// The expiry check and the insert happen under one lock, so concurrent
/// callers racing on a key see exactly one `true`.
pub struct MemoryRateLimitCache<C: Clock> {
    clock: C,
    /// key → expiry (clock milliseconds).
    entries: Mutex<HashMap<String, u64>>,
}

impl<C: Clock> MemoryRateLimitCache<C> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Drop expired entries.  Returns how many remain.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now_ms();
        let mut entries = self.entries.lock();
        entries.retain(|_, expires_at| *expires_at > now);
        entries.len()
    }
}

impl<C: Clock> RateLimitCache for MemoryRateLimitCache<C> {
    fn try_set_if_absent(&self, key: &str, ttl: Duration) -> Result<bool, CacheError> {
        let now = self.clock.now_ms();
        let ttl_ms = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX);
        let mut entries = self.entries.lock();
        if let Some(expires_at) = entries.get(key) {
            if *expires_at > now {
                debug!("rate limit: {} live for {} ms", key, expires_at - now);
                return Ok(false);
            }
        }
        entries.insert(key.to_owned(), now.saturating_add(ttl_ms));
        Ok(true)
    }
}
