//! CTCP (Client-to-Client Protocol) codec.
//!
//! CTCP messages ride inside PRIVMSG and NOTICE payloads between `\x01`
//! delimiters, protected by two independent quoting layers: the low-level
//! M-quote (`\x10`) that makes payloads safe for the IRC line framing, and
//! the X-level quote (`\\`) that makes them safe for the `\x01` delimiter.
//!
//! Everything here operates on bytes. A payload that fails to decode as
//! text must still round-trip through the codec untouched.
//!
//! # Reference
//! - CTCP specification (Zeuge, Rollo, Mesander 1994)

/// The CTCP delimiter byte.
pub const X_DELIM: u8 = 0x01;

/// The low-level quote byte.
const M_QUOTE: u8 = 0x10;

/// The X-level quote byte.
const X_QUOTE: u8 = b'\\';

/// Apply the low-level M-quote: NUL, NL, CR and the quote byte itself are
/// escaped as `\x10` followed by `0`, `n`, `r` or `\x10`.
pub fn low_quote(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len());
    for &b in data {
        match b {
            0x00 => out.extend_from_slice(&[M_QUOTE, b'0']),
            b'\n' => out.extend_from_slice(&[M_QUOTE, b'n']),
            b'\r' => out.extend_from_slice(&[M_QUOTE, b'r']),
            M_QUOTE => out.extend_from_slice(&[M_QUOTE, M_QUOTE]),
            _ => out.push(b),
        }
    }
    out
}

/// Reverse [`low_quote`]. Unknown escape suffixes dequote to themselves; a
/// dangling quote byte at the end of input is passed through.
pub fn low_dequote(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len());
    let mut iter = data.iter().copied();
    while let Some(b) = iter.next() {
        if b != M_QUOTE {
            out.push(b);
            continue;
        }
        match iter.next() {
            Some(b'0') => out.push(0x00),
            Some(b'n') => out.push(b'\n'),
            Some(b'r') => out.push(b'\r'),
            Some(M_QUOTE) => out.push(M_QUOTE),
            Some(other) => out.push(other),
            None => out.push(M_QUOTE),
        }
    }
    out
}

/// Apply the X-level quote: the `\x01` delimiter becomes `\a` and the
/// backslash doubles.
pub fn ctcp_quote(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len());
    for &b in data {
        match b {
            X_DELIM => out.extend_from_slice(&[X_QUOTE, b'a']),
            X_QUOTE => out.extend_from_slice(&[X_QUOTE, X_QUOTE]),
            _ => out.push(b),
        }
    }
    out
}

/// Reverse [`ctcp_quote`], with the same leniency as [`low_dequote`].
pub fn ctcp_dequote(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len());
    let mut iter = data.iter().copied();
    while let Some(b) = iter.next() {
        if b != X_QUOTE {
            out.push(b);
            continue;
        }
        match iter.next() {
            Some(b'a') => out.push(X_DELIM),
            Some(X_QUOTE) => out.push(X_QUOTE),
            Some(other) => out.push(other),
            None => out.push(X_QUOTE),
        }
    }
    out
}

/// An extended (CTCP) message: a tag and its optional data.
pub type Tagged = (Vec<u8>, Option<Vec<u8>>);

/// The result of [`ctcp_extract`]: the CTCP tags found in a payload and
/// the plain text that surrounded them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Extract {
    /// Plain-text segments, in order.
    pub normal: Vec<Vec<u8>>,
    /// Extended `(tag, data)` segments, in order.
    pub extended: Vec<Tagged>,
}

/// Extract CTCP tags from an already low-dequoted payload.
///
/// The payload alternates normal and extended segments on `\x01`
/// boundaries, starting with normal text. Extended segments are
/// X-dequoted and split once on space into `(tag, data)`; empty segments
/// on either side are dropped.
pub fn ctcp_extract(message: &[u8]) -> Extract {
    let mut extract = Extract::default();

    for (idx, segment) in message.split(|&b| b == X_DELIM).enumerate() {
        if segment.is_empty() {
            continue;
        }
        if idx % 2 == 0 {
            extract.normal.push(segment.to_vec());
        } else {
            let segment = ctcp_dequote(segment);
            match segment.iter().position(|&b| b == b' ') {
                Some(sp) => extract
                    .extended
                    .push((segment[..sp].to_vec(), Some(segment[sp + 1..].to_vec()))),
                None => extract.extended.push((segment, None)),
            }
        }
    }

    extract
}

/// Compose one or more `(tag, data)` pairs into a CTCP payload.
///
/// Each pair is rendered as `tag SP data` (or the tag alone when data is
/// absent or empty), X-quoted, wrapped in `\x01`, and the results are
/// concatenated without a separator.
pub fn ctcp_stringify(messages: &[(&[u8], Option<&[u8]>)]) -> Vec<u8> {
    let mut out = Vec::new();
    for (tag, data) in messages {
        let mut plain = tag.to_vec();
        if let Some(data) = data {
            if !data.is_empty() {
                plain.push(b' ');
                plain.extend_from_slice(data);
            }
        }
        out.push(X_DELIM);
        out.extend_from_slice(&ctcp_quote(&plain));
        out.push(X_DELIM);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_low_quote_escapes() {
        assert_eq!(low_quote(b"a\x00b"), b"a\x100b");
        assert_eq!(low_quote(b"a\nb"), b"a\x10nb");
        assert_eq!(low_quote(b"a\rb"), b"a\x10rb");
        assert_eq!(low_quote(b"a\x10b"), b"a\x10\x10b");
    }

    #[test]
    fn test_low_dequote_unknown_suffix_is_lenient() {
        assert_eq!(low_dequote(b"\x10z"), b"z");
        assert_eq!(low_dequote(b"\x10"), b"\x10");
    }

    #[test]
    fn test_ctcp_quote_escapes() {
        assert_eq!(ctcp_quote(b"a\x01b"), b"a\\ab");
        assert_eq!(ctcp_quote(b"a\\b"), b"a\\\\b");
    }

    #[test]
    fn test_ctcp_dequote_unknown_suffix_is_lenient() {
        assert_eq!(ctcp_dequote(b"\\z"), b"z");
        assert_eq!(ctcp_dequote(b"\\"), b"\\");
    }

    #[test]
    fn test_extract_action() {
        let extract = ctcp_extract(b"\x01ACTION waves\x01");
        assert!(extract.normal.is_empty());
        assert_eq!(
            extract.extended,
            vec![(b"ACTION".to_vec(), Some(b"waves".to_vec()))]
        );
    }

    #[test]
    fn test_extract_tag_without_data() {
        let extract = ctcp_extract(b"\x01VERSION\x01");
        assert_eq!(extract.extended, vec![(b"VERSION".to_vec(), None)]);
    }

    #[test]
    fn test_extract_mixed_segments() {
        let extract = ctcp_extract(b"hello \x01PING 123\x01 world");
        assert_eq!(
            extract.normal,
            vec![b"hello ".to_vec(), b" world".to_vec()]
        );
        assert_eq!(
            extract.extended,
            vec![(b"PING".to_vec(), Some(b"123".to_vec()))]
        );
    }

    #[test]
    fn test_extract_filters_empty_segments() {
        let extract = ctcp_extract(b"\x01\x01\x01PING x\x01");
        assert_eq!(extract.normal, Vec::<Vec<u8>>::new());
        assert_eq!(extract.extended.len(), 1);
    }

    #[test]
    fn test_stringify_joins_and_wraps() {
        let out = ctcp_stringify(&[
            (b"PING".as_slice(), Some(b"123".as_slice())),
            (b"SOURCE".as_slice(), None),
        ]);
        assert_eq!(out, b"\x01PING 123\x01\x01SOURCE\x01");
    }

    #[test]
    fn test_stringify_quotes_delimiters() {
        let out = ctcp_stringify(&[(b"TAG".as_slice(), Some(b"a\x01b\\c".as_slice()))]);
        assert_eq!(out, b"\x01TAG a\\ab\\\\c\x01");
    }

    #[test]
    fn test_extract_stringify_idempotence() {
        let messages: &[(&[u8], Option<&[u8]>)] =
            &[(b"ACTION", Some(b"waves \\ hello")), (b"VERSION", None)];
        let extract = ctcp_extract(&ctcp_stringify(messages));
        let expected: Vec<Tagged> = messages
            .iter()
            .map(|(t, d)| (t.to_vec(), d.map(|d| d.to_vec())))
            .collect();
        assert_eq!(extract.extended, expected);
    }

    proptest! {
        #[test]
        fn prop_low_quote_roundtrip(data in proptest::collection::vec(any::<u8>(), 0..256)) {
            prop_assert_eq!(low_dequote(&low_quote(&data)), data);
        }

        #[test]
        fn prop_ctcp_quote_roundtrip(data in proptest::collection::vec(any::<u8>(), 0..256)) {
            prop_assert_eq!(ctcp_dequote(&ctcp_quote(&data)), data);
        }

        #[test]
        fn prop_stringify_extract_recovers_tags(
            tag in "[A-Z]{1,10}",
            data in proptest::option::of("[!-~][ -~]{0,30}"),
        ) {
            let data_bytes = data.as_ref().map(|d| d.as_bytes());
            let payload = ctcp_stringify(&[(tag.as_bytes(), data_bytes)]);
            let extract = ctcp_extract(&payload);
            prop_assert_eq!(extract.extended.len(), 1);
            let (got_tag, got_data) = &extract.extended[0];
            prop_assert_eq!(got_tag.as_slice(), tag.as_bytes());
            prop_assert_eq!(
                got_data.as_ref().map(|d| d.as_slice()),
                data_bytes
            );
        }
    }
}
