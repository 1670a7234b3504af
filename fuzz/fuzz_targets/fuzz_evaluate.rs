//! Fuzz target: fuzzy inference
//!
//! Feeds arbitrary bit patterns (NaN, infinities, subnormals included) to
//! the engine and checks:
//! - No panics
//! - Score within `[0, 100]`, strength within `[0, 1]`
//! - No rule fired ⇔ the Unknown decision
//!
//! cargo fuzz run fuzz_evaluate

#![no_main]

use libfuzzer_sys::fuzz_target;
use pondwatch::fuzzy::{Category, evaluate};

fuzz_target!(|data: &[u8]| {
    let Some(bytes) = data.get(..12) else {
        return;
    };
    let word = |i: usize| f32::from_le_bytes([bytes[i], bytes[i + 1], bytes[i + 2], bytes[i + 3]]);
    let (ph, tds, turbidity) = (word(0), word(4), word(8));

    let d = evaluate(ph, tds, turbidity);
    assert!((0.0..=100.0).contains(&d.score), "score {} out of range", d.score);
    assert!((0.0..=1.0).contains(&d.rule_strength));
    assert_eq!(d.rule.is_none(), d.category == Category::Unknown);
    assert!(!d.diagnostic_trace.is_empty());
});
