//! Fuzz target: `DecisionHistory` ring buffer
//!
//! Drives arbitrary append / reopen / clear sequences over an in-memory
//! store and verifies:
//! - No panics
//! - `read_all` never returns more than `capacity` records
//! - Record ids are strictly increasing
//! - `read_all` after `clear` is empty
//!
//! cargo fuzz run fuzz_history

#![no_main]

use libfuzzer_sys::fuzz_target;
use pondwatch::adapters::memory::MemoryStorage;
use pondwatch::app::ports::DecisionStore;
use pondwatch::fuzzy::evaluate_reading;
use pondwatch::history::DecisionHistory;
use pondwatch::sensors::Reading;

fuzz_target!(|data: &[u8]| {
    let Some((&first, ops)) = data.split_first() else {
        return;
    };
    let capacity = usize::from(first % 40);
    let mut history = DecisionHistory::open(MemoryStorage::new(), capacity);

    for (i, op) in ops.iter().enumerate() {
        match op % 8 {
            0 => {
                let storage = history.storage().clone();
                history = DecisionHistory::open(storage, capacity);
            }
            1 => {
                let _ = history.clear();
                assert!(history.read_all().is_empty());
            }
            _ => {
                let r = Reading {
                    ph: f32::from(*op) / 18.0,
                    tds: f32::from(*op) * 4.0,
                    turbidity: f32::from(*op) / 2.0,
                    water_level: 50.0,
                    timestamp: i as u64,
                };
                let _ = history.save(&r, &evaluate_reading(&r));
            }
        }

        let records = history.read_all();
        assert!(records.len() <= history.capacity());
        assert!(records.windows(2).all(|w| w[0].id < w[1].id));
    }
});
