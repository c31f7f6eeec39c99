//! Fuzz target for netmask parsing
//!
//! `User::parse` promises to never fail; any string must produce a user
//! with the sigil, nick, user and host fields accounted for.

#![no_main]

use libfuzzer_sys::fuzz_target;
use std::str;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = str::from_utf8(data) {
        let _ = irc_engine::User::parse(input);
    }
});
