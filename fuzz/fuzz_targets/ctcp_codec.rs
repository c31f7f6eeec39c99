//! Fuzz target for the CTCP codec
//!
//! Exercises both quoting layers and extraction. The quote/dequote pairs
//! must be exact inverses on arbitrary bytes, and extraction must never
//! panic.

#![no_main]

use libfuzzer_sys::fuzz_target;

use irc_engine::{ctcp_dequote, ctcp_extract, ctcp_quote, low_dequote, low_quote};

fuzz_target!(|data: &[u8]| {
    assert_eq!(low_dequote(&low_quote(data)), data);
    assert_eq!(ctcp_dequote(&ctcp_quote(data)), data);

    // Lenient dequoting of raw input must not panic either.
    let _ = low_dequote(data);
    let _ = ctcp_dequote(data);
    let _ = ctcp_extract(data);
});
