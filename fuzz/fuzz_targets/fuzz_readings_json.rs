//! Fuzz target: readings and raw capture parsers
//!
//! Arbitrary text must either parse into readings sorted by timestamp or
//! fail with a `SourceError`; it must never panic.  Calibrated captures
//! must also stay inside the probes' physical ranges.
//!
//! cargo fuzz run fuzz_readings_json

#![no_main]

use libfuzzer_sys::fuzz_target;
use pondwatch::adapters::json_file::JsonFileSource;
use pondwatch::sensors::calibration::Calibration;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = core::str::from_utf8(data) else {
        return;
    };
    if let Ok(source) = JsonFileSource::parse(text) {
        let readings = source.readings();
        assert!(readings.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
    }
    if let Ok(source) = JsonFileSource::parse_raw(text, &Calibration::default()) {
        assert!(source.readings().iter().all(|r| r.validate().is_ok()));
    }
});
