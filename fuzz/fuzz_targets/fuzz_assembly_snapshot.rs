//! Fuzz target for assembly snapshot parsing and validation.
//!
//! Goal: the loader should **never panic** on any input, however hostile the snapshot.
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_assembly_snapshot
//! ```

#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        let _ = modguard_assembly::fuzz::parse_assembly(text);
    }
});
