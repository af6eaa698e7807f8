//! Fuzz target: `LineDecoder::push` → `Command::parse`
//!
//! Drives arbitrary byte sequences through the line decoder and the verb
//! parser and asserts that neither panics and that no emitted line is
//! longer than the decoder limit.
//!
//! cargo fuzz run fuzz_line_decoder

#![no_main]

use agitator::app::commands::Command;
use agitator::remote::codec::{LineDecoder, MAX_LINE_LEN};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut decoder = LineDecoder::new();

    for &byte in data {
        if let Some(line) = decoder.push(byte) {
            assert!(line.len() <= MAX_LINE_LEN, "line exceeds MAX_LINE_LEN");
            assert!(!line.contains('\n'), "newline leaked into a line");
            let _ = Command::parse(&line);
        }
    }

    // After a reset the decoder must accept a clean verb.
    decoder.reset();
    let mut last = None;
    for &byte in b"status\n" {
        last = decoder.push(byte).or(last);
    }
    assert_eq!(last.as_deref(), Some("status"));
});
