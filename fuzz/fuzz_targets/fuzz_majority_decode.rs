//! Fuzz target: `codec::collapse` + `Command::decode`
//!
//! Arbitrary raw medium contents must collapse and decode without
//! panicking, and anything that decodes must re-encode to the collapsed
//! entry.
//!
//! cargo fuzz run fuzz_majority_decode

#![no_main]

use floppy_coffee::codec::{self, Command};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Some(entry) = codec::collapse(data) else {
        assert!(data.is_empty() || data.len() % codec::ENTRY_SIZE != 0);
        return;
    };
    if let Ok(cmd) = Command::decode(entry) {
        assert_eq!(cmd.encode(), entry, "decode/encode disagree for {:?}", entry);
    }
});
