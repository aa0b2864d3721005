//! Fuzz target for Container parsing with arbitrary byte input.
//!
//! Walks the directory chain and extracts the game-setup file from
//! potentially malformed containers, looking for panics and hangs.
//!
//! Run with: cargo +nightly fuzz run container_open

#![no_main]

use libfuzzer_sys::fuzz_target;
use rdasave::format::MAGIC;
use rdasave::read::Container;

fuzz_target!(|data: &[u8]| {
    // Most random inputs would stop at the magic check
    let mut bytes = MAGIC.to_vec();
    bytes.extend_from_slice(data);

    let Ok(container) = Container::open(bytes) else {
        return;
    };
    if let Ok(entries) = container.entries() {
        for entry in &entries {
            let _ = entry.name.len();
            let _ = entry.field_offsets();
        }
    }
    let _ = rdasave::SaveEditor::open(container.into_bytes(), Default::default());
});
