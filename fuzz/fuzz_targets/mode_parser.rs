//! Fuzz target for MODE string parsing
//!
//! The parser must reject malformed input with an error, never a panic,
//! and on success every parameter must be consumed exactly once.

#![no_main]

use libfuzzer_sys::fuzz_target;
use std::str;

fuzz_target!(|data: &[u8]| {
    let mut pieces = data.split(|&b| b == b' ');
    let modes = match pieces.next().and_then(|m| str::from_utf8(m).ok()) {
        Some(modes) => modes,
        None => return,
    };
    let params: Vec<Vec<u8>> = pieces.map(|p| p.to_vec()).collect();

    if let Ok((added, removed)) = irc_engine::parse_modes(modes, &params, ("ovb", "ovb")) {
        let consumed = added
            .iter()
            .chain(removed.iter())
            .filter(|(_, arg)| arg.is_some())
            .count();
        assert_eq!(consumed, params.len());
    }
});
