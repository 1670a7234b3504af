//! Decision history.
//!
//! Keeps the most recent decisions in a ring buffer over a
//! [`StoragePort`] under the `"history"` namespace.  Each slot holds one
//! postcard-encoded [`DecisionRecord`]; a separate key holds the next
//! record id so ids keep increasing across restarts.  Slot `n` stores the
//! record whose `id % capacity == n`.

use log::warn;
use serde::{Deserialize, Serialize};

use crate::app::ports::{DecisionStore, RecordId, StorageError, StoragePort, StoreError};
use crate::fuzzy::{ActuatorCommand, Category, Decision, RuleId};
use crate::sensors::Reading;

/// Hard upper bound on the ring size.
pub const MAX_HISTORY_CAPACITY: usize = 32;

/// Recommendation text is cut to this many bytes when persisted.
pub const RECOMMENDATION_BYTES: usize = 96;

const NAMESPACE: &str = "history";
const NEXT_ID_KEY: &str = "next_id";
const RECORD_BUF: usize = 256;

/// Persisted form of one evaluated reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionRecord {
    pub id: RecordId,
    pub timestamp: u64,
    pub ph: f32,
    pub tds: f32,
    pub turbidity: f32,
    pub water_level: f32,
    pub category: Category,
    pub actuator: ActuatorCommand,
    pub score: f32,
    pub rule_strength: f32,
    pub rule: Option<RuleId>,
    pub recommendation: heapless::String<RECOMMENDATION_BYTES>,
}

impl DecisionRecord {
    pub fn new(id: RecordId, reading: &Reading, decision: &Decision) -> Self {
        Self {
            id,
            timestamp: reading.timestamp,
            ph: reading.ph,
            tds: reading.tds,
            turbidity: reading.turbidity,
            water_level: reading.water_level,
            category: decision.category,
            actuator: decision.actuator_command,
            score: decision.score,
            rule_strength: decision.rule_strength,
            rule: decision.rule,
            recommendation: truncated(&decision.recommendation),
        }
    }

    /// The reading this record was evaluated from.
    pub fn reading(&self) -> Reading {
        Reading {
            ph: self.ph,
            tds: self.tds,
            turbidity: self.turbidity,
            water_level: self.water_level,
            timestamp: self.timestamp,
        }
    }
}

/// Copy as many whole characters of `s` as fit.
fn truncated<const N: usize>(s: &str) -> heapless::String<N> {
    let mut out = heapless::String::new();
    for c in s.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}

/// Storage-backed ring buffer of [`DecisionRecord`]s.
pub struct DecisionHistory<S: StoragePort> {
    storage: S,
    capacity: usize,
    next_id: RecordId,
}

impl<S: StoragePort> DecisionHistory<S> {
    /// Open the history kept in `storage`.  `capacity` is clamped to
    /// `1..=MAX_HISTORY_CAPACITY`.
    ///
    /// If the stored next id is missing or unreadable while records exist,
    /// it is recovered from the highest record id so new records still sort
    /// after old ones.
    pub fn open(storage: S, capacity: usize) -> Self {
        let mut history = Self {
            storage,
            capacity: capacity.clamp(1, MAX_HISTORY_CAPACITY),
            next_id: 0,
        };
        let mut buf = [0u8; 4];
        history.next_id = match history.storage.read(NAMESPACE, NEXT_ID_KEY, &mut buf) {
            Ok(4) => u32::from_le_bytes(buf),
            Err(StorageError::NotFound) if history.count_slots(MAX_HISTORY_CAPACITY) == 0 => 0,
            other => {
                let recovered = history.scan(MAX_HISTORY_CAPACITY).last().map_or(0, |r| r.id.wrapping_add(1));
                warn!("history: next id unreadable ({:?}), resuming at {}", other.err(), recovered);
                recovered
            }
        };
        history
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Append a record, overwriting the oldest when full.
    pub fn append(&mut self, reading: &Reading, decision: &Decision) -> Result<RecordId, StoreError> {
        let id = self.next_id;
        let record = DecisionRecord::new(id, reading, decision);
        let bytes = postcard::to_allocvec(&record).map_err(|_| StoreError::Encode)?;

        // Claim the id first: a failed slot write leaves a gap, never a
        // stored record reported as lost.
        let next = id.wrapping_add(1);
        self.storage.write(NAMESPACE, NEXT_ID_KEY, &next.to_le_bytes())?;
        self.next_id = next;
        self.storage.write(NAMESPACE, &self.slot_key(id), &bytes)?;
        Ok(id)
    }

    /// Every decodable record, oldest first.
    pub fn read_all(&self) -> Vec<DecisionRecord> {
        self.scan(self.capacity)
    }

    /// Most recent record, if any.
    pub fn latest(&self) -> Option<DecisionRecord> {
        self.read_all().pop()
    }

    pub fn count(&self) -> usize {
        self.count_slots(self.capacity)
    }

    /// Erase every record and reset ids.
    pub fn clear(&mut self) -> Result<(), StorageError> {
        for slot in 0..MAX_HISTORY_CAPACITY {
            self.storage.delete(NAMESPACE, &slot_name(slot))?;
        }
        self.storage.delete(NAMESPACE, NEXT_ID_KEY)?;
        self.next_id = 0;
        Ok(())
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    fn slot_key(&self, id: RecordId) -> String {
        slot_name(id as usize % self.capacity)
    }

    /// Decodable records in the first `slots` slots, sorted by id.
    fn scan(&self, slots: usize) -> Vec<DecisionRecord> {
        let mut records: Vec<DecisionRecord> = (0..slots)
            .filter_map(|slot| {
                let mut buf = [0u8; RECORD_BUF];
                let len = self.storage.read(NAMESPACE, &slot_name(slot), &mut buf).ok()?;
                postcard::from_bytes(&buf[..len]).ok()
            })
            .collect();
        records.sort_by_key(|r| r.id);
        records
    }

    fn count_slots(&self, slots: usize) -> usize {
        (0..slots)
            .filter(|slot| self.storage.exists(NAMESPACE, &slot_name(*slot)))
            .count()
    }
}

impl<S: StoragePort> DecisionStore for DecisionHistory<S> {
    fn save(&mut self, reading: &Reading, decision: &Decision) -> Result<RecordId, StoreError> {
        self.append(reading, decision)
    }
}

fn slot_name(slot: usize) -> String {
    format!("d{slot}")
}
