#![no_main]

use libfuzzer_sys::fuzz_target;
use war_advisor::{AffinityConfig, ModifierTable};

// Arbitrary bytes must never panic the data file parsers.
fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(table) = serde_json::from_str::<ModifierTable>(text) {
        let _ = table.len();
    }
    if let Ok(config) = serde_json::from_str::<AffinityConfig>(text) {
        let _ = config.validate();
    }
});
