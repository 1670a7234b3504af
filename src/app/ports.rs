//! Port traits: the hexagonal boundary between the monitor core and the
//! outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ MonitorService (domain)
//! ```
//!
//! Driven adapters (data store, cache, chat bot, storage) implement these
//! traits.  The [`MonitorService`](super::service::MonitorService) consumes
//! them via generics, so the inference core never touches I/O directly.
//!
//! All port errors are typed; callers must handle every variant explicitly.

use core::fmt;
use core::time::Duration;

use crate::config::MonitorConfig;
use crate::fuzzy::Decision;
use crate::sensors::Reading;

// ───────────────────────────────────────────────────────────────
// Sensor source (driven adapter: data store → domain)
// ───────────────────────────────────────────────────────────────

/// Where readings come from.
pub trait SensorSource {
    /// Most recent reading, `None` when nothing has been recorded yet.
    fn latest(&self) -> Result<Option<Reading>, SourceError>;

    /// Readings with `start <= timestamp <= end` (Unix seconds), oldest
    /// first, at most `limit` of them.
    fn historical(&self, start: u64, end: u64, limit: usize) -> Result<Vec<Reading>, SourceError>;
}

// ───────────────────────────────────────────────────────────────
// Decision store (driven adapter: domain → persistence)
// ───────────────────────────────────────────────────────────────

/// Identifier assigned to a persisted decision.
pub type RecordId = u32;

pub trait DecisionStore {
    fn save(&mut self, reading: &Reading, decision: &Decision) -> Result<RecordId, StoreError>;
}

// ───────────────────────────────────────────────────────────────
// Rate-limit cache (shared, TTL set-if-absent)
// ───────────────────────────────────────────────────────────────

/// Key/TTL store used to rate-limit alerts.
///
/// `try_set_if_absent` must be atomic: of two concurrent callers with the
/// same key, at most one sees `Ok(true)`.
pub trait RateLimitCache {
    /// Insert `key` with the given time-to-live if no live entry exists.
    /// `Ok(true)` when inserted, `Ok(false)` when a live entry exists.
    fn try_set_if_absent(&self, key: &str, ttl: Duration) -> Result<bool, CacheError>;
}

// ───────────────────────────────────────────────────────────────
// Notifier (driven adapter: domain → chat / mail)
// ───────────────────────────────────────────────────────────────

pub trait Notifier {
    fn send(&mut self, message: &str, destination: &str) -> Result<(), NotifyError>;
}

// ───────────────────────────────────────────────────────────────
// Clock
// ───────────────────────────────────────────────────────────────

/// Monotonic-enough millisecond time source.
pub trait Clock {
    fn now_ms(&self) -> u64;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists monitor configuration.
///
/// Implementations MUST call [`MonitorConfig::validate`] before persisting
/// and reject invalid values with [`ConfigError::ValidationFailed`] rather
/// than clamping them.
pub trait ConfigPort {
    /// Returns [`MonitorConfig::default()`] if no stored config exists.
    fn load(&self) -> Result<MonitorConfig, ConfigError>;

    fn save(&self, config: &MonitorConfig) -> Result<(), ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Storage port (driven adapter: domain ↔ key-value bytes)
// ───────────────────────────────────────────────────────────────

/// Persistent key-value storage, namespaced per subsystem.
///
/// Writes MUST be atomic: no partial value is ever observable.
pub trait StoragePort {
    /// Read a value.  Returns the number of bytes written to `buf`.
    fn read(&self, namespace: &str, key: &str, buf: &mut [u8]) -> Result<usize, StorageError>;

    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError>;

    /// Delete a key.  Returns `Ok(())` even if the key didn't exist.
    fn delete(&mut self, namespace: &str, key: &str) -> Result<(), StorageError>;

    fn exists(&self, namespace: &str, key: &str) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`SensorSource`] operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    /// Backend could not be reached.
    Unavailable,
    /// A record could not be decoded into a [`Reading`].
    Malformed(String),
    Io(String),
}

/// Errors from [`DecisionStore`] operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Record could not be encoded.
    Encode,
    Storage(StorageError),
}

/// Errors from [`RateLimitCache`] operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    Unavailable,
    Backend(String),
}

/// Errors from [`Notifier`] operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifyError {
    Unreachable,
    Timeout,
    /// The remote end refused the message.
    Rejected(String),
}

/// Errors from [`ConfigPort`] operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    NotFound,
    /// Stored config failed deserialization.
    Corrupted,
    /// A field failed range validation; the message names the field.
    ValidationFailed(&'static str),
    IoError,
}

/// Errors from [`StoragePort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    NotFound,
    Full,
    /// Caller's buffer is smaller than the stored value.
    BufferTooSmall,
    IoError,
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable => write!(f, "source unavailable"),
            Self::Malformed(msg) => write!(f, "malformed record: {}", msg),
            Self::Io(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Encode => write!(f, "record encoding failed"),
            Self::Storage(e) => write!(f, "{}", e),
        }
    }
}

impl From<StorageError> for StoreError {
    fn from(e: StorageError) -> Self {
        Self::Storage(e)
    }
}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable => write!(f, "cache unavailable"),
            Self::Backend(msg) => write!(f, "cache backend error: {}", msg),
        }
    }
}

impl fmt::Display for NotifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unreachable => write!(f, "notifier unreachable"),
            Self::Timeout => write!(f, "notifier timed out"),
            Self::Rejected(msg) => write!(f, "message rejected: {}", msg),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "config not found"),
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "key not found"),
            Self::Full => write!(f, "storage full"),
            Self::BufferTooSmall => write!(f, "buffer too small"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl std::error::Error for SourceError {}
impl std::error::Error for StoreError {}
impl std::error::Error for CacheError {}
impl std::error::Error for NotifyError {}
impl std::error::Error for ConfigError {}
impl std::error::Error for StorageError {}
