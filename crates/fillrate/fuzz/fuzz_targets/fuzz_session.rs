//! Fuzz target for session file decoding.
//!
//! Decoding arbitrary JSON and converting its combinations never panics.

#![no_main]

use fillrate::config::PersistedCombination;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 100_000 {
        return;
    }

    if let Ok(entries) = serde_json::from_slice::<Vec<PersistedCombination>>(data) {
        for entry in &entries {
            let _ = entry.to_combination(16);
        }
    }
});
