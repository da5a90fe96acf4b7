//! Fuzz target: state-file slot decoding.
//!
//! Any 4 bytes must load into two independently valid-or-empty slots.
//!
//! cargo fuzz run fuzz_state_slots

#![no_main]

use floppy_coffee::adapters::command_store::{STATE_LEN, decode_slots};
use floppy_coffee::codec::Command;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(raw) = <[u8; STATE_LEN]>::try_from(data) else {
        return;
    };
    let stored = decode_slots(raw);
    if let Some(s) = stored.schedule {
        let enc = Command::Schedule(s).encode();
        assert_eq!([enc[1] as u8, enc[2] as u8], [raw[0], raw[1]]);
    }
    if let Some(b) = stored.brew {
        let enc = Command::Brew(b).encode();
        assert_eq!([enc[1] as u8, enc[2] as u8], [raw[2], raw[3]]);
    }
});
