//! Fuzz target for the game-setup tree decoder.
//!
//! Decodes arbitrary payloads and, when decoding succeeds, renders the tree
//! and runs a patch against the recovered bookkeeping.
//!
//! Run with: cargo +nightly fuzz run tree_decode

#![no_main]

use libfuzzer_sys::fuzz_target;
use rdasave::ListSchema;
use rdasave::edit::Patch;
use rdasave::tree::decode;

fuzz_target!(|data: &[u8]| {
    let Ok((tree, book)) = decode(data, &ListSchema::default()) else {
        return;
    };
    let _ = tree.render();
    let _ = Patch::new(&book).apply(data, &[0xE541_0600, 0x8361_0000]);
});
