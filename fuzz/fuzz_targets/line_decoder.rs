//! Fuzz target for IRC line decoding
//!
//! Feeds arbitrary bytes through `decode_line` and ensures it never
//! panics; the decoder must survive anything a hostile server frames.

#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Lines over the protocol budget never reach the decoder.
    if data.len() > 512 {
        return;
    }

    if let Ok(message) = irc_engine::decode_line(data) {
        // Parsed messages uphold their invariants.
        assert!(!message.command.is_empty());
        if message.params.len() > 1 {
            for param in &message.params[..message.params.len() - 1] {
                assert!(!param.contains(&b' '));
            }
        }
    }
});
