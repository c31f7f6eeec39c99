//! IRC wire codec: inbound line decoding, outbound line encoding and the
//! byte-stream framer.
//!
//! IRC is a byte protocol; parameters stay `Vec<u8>` all the way to the
//! dispatcher so that payloads which do not decode as text survive intact.
//! Only the prefix and the command name, which are ASCII on any sane
//! network, are carried as strings.

use bytes::{Buf, BytesMut};
use encoding::Encoding;
use nom::{
    bytes::complete::take_while1,
    character::complete::char,
    combinator::opt,
    sequence::preceded,
    IResult,
};
use tokio_util::codec::Decoder;
use tracing::warn;

use crate::error::{MessageParseError, ProtocolError};
use crate::response::Response;

/// Maximum length of a single IRC line, CRLF included (RFC 2812 §2.3).
pub const MAX_COMMAND_LENGTH: usize = 512;

/// A parsed inbound IRC line.
///
/// `command` is the uppercase symbolic name; numeric commands are
/// translated through [`Response`] at parse time. Only the final element
/// of `params` (the trailing parameter) may contain spaces.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    /// Raw netmask or server name, without the leading `:`.
    pub prefix: Option<String>,
    /// Uppercase symbolic command name, or the three-digit string for an
    /// unknown numeric.
    pub command: String,
    /// Ordered parameters; the trailing `:` segment is a single element
    /// with the colon stripped.
    pub params: Vec<Vec<u8>>,
}

impl Message {
    /// The last parameter, if any.
    pub fn trailing(&self) -> Option<&[u8]> {
        self.params.last().map(|p| p.as_slice())
    }
}

/// Parse the message prefix (the part after `:` and before the first space).
fn parse_prefix(input: &[u8]) -> IResult<&[u8], &[u8]> {
    preceded(char(':'), take_while1(|c| c != b' '))(input)
}

/// Parse the command name (alphanumeric bytes).
fn parse_command(input: &[u8]) -> IResult<&[u8], &[u8]> {
    take_while1(|c: u8| c.is_ascii_alphanumeric())(input)
}

/// Parse the parameters following the command.
///
/// Runs of spaces separate middle parameters; the first parameter opening
/// with `:` swallows the rest of the line verbatim, colon stripped.
fn parse_params(input: &[u8]) -> Vec<Vec<u8>> {
    let mut params = Vec::new();
    let mut rest = input;

    while let Some(b' ') = rest.first().copied() {
        while rest.first() == Some(&b' ') {
            rest = &rest[1..];
        }
        if rest.is_empty() {
            break;
        }

        if rest[0] == b':' {
            params.push(rest[1..].to_vec());
            break;
        }

        let end = rest
            .iter()
            .position(|&b| b == b' ')
            .unwrap_or(rest.len());
        params.push(rest[..end].to_vec());
        rest = &rest[end..];
    }

    params
}

/// Decode a single IRC line with CR/LF already stripped.
///
/// Numeric commands are translated to their symbolic names; an unknown
/// numeric is kept as-is and logged. The command is normalized to upper
/// case.
pub fn decode_line(line: &[u8]) -> Result<Message, MessageParseError> {
    if line.is_empty() {
        return Err(MessageParseError::EmptyMessage);
    }

    let (rest, prefix) =
        opt(parse_prefix)(line).map_err(|_: nom::Err<nom::error::Error<&[u8]>>| {
            MessageParseError::MissingCommand
        })?;
    let rest = skip_spaces(rest);

    let (rest, raw_command) =
        parse_command(rest).map_err(|_: nom::Err<nom::error::Error<&[u8]>>| {
            MessageParseError::MissingCommand
        })?;

    let mut command = String::from_utf8_lossy(raw_command).to_ascii_uppercase();
    if raw_command.iter().all(|b| b.is_ascii_digit()) {
        match command.parse::<Response>() {
            Ok(response) => command = response.name().to_string(),
            Err(_) => warn!(numeric = %command, "unknown numeric command"),
        }
    }

    let params = parse_params(rest);

    Ok(Message {
        prefix: prefix.map(|p| String::from_utf8_lossy(p).into_owned()),
        command,
        params,
    })
}

fn skip_spaces(input: &[u8]) -> &[u8] {
    let mut rest = input;
    while rest.first() == Some(&b' ') {
        rest = &rest[1..];
    }
    rest
}

/// Encode one outbound line with the session encoding and append CRLF.
///
/// The line must not already carry a terminator; embedded CR/LF would
/// smuggle extra commands and are stripped.
pub fn encode_line(encoding: &'static Encoding, line: &str) -> Vec<u8> {
    let (encoded, _, had_errors) = encoding.encode(line);
    if had_errors {
        warn!(encoding = encoding.name(), "lossy encode of outbound line");
    }
    let mut out = Vec::with_capacity(encoded.len() + 2);
    out.extend(encoded.iter().filter(|&&b| b != b'\r' && b != b'\n'));
    out.extend_from_slice(b"\r\n");
    out
}

/// Inbound framer: accumulates bytes, splits on LF, discards CR and hands
/// out decoded messages.
///
/// A partial line that outgrows [`MAX_COMMAND_LENGTH`] without a
/// terminator is surfaced as an error and the stream is discarded up to
/// the next LF, after which decoding resumes.
#[derive(Debug, Default)]
pub struct LineDecoder {
    discarding: bool,
}

impl LineDecoder {
    /// Create a framer with an empty buffer state.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Decoder for LineDecoder {
    type Item = Message;
    type Error = ProtocolError;

    fn decode(&mut self, buf: &mut BytesMut) -> Result<Option<Message>, ProtocolError> {
        loop {
            match buf.iter().position(|&b| b == b'\n') {
                Some(pos) => {
                    let mut line: Vec<u8> =
                        buf[..pos].iter().copied().filter(|&b| b != b'\r').collect();
                    buf.advance(pos + 1);
                    if std::mem::take(&mut self.discarding) {
                        continue;
                    }
                    while line.last() == Some(&b' ') {
                        line.pop();
                    }
                    if line.is_empty() {
                        continue;
                    }
                    return decode_line(&line).map(Some).map_err(Into::into);
                }
                None => {
                    if self.discarding {
                        buf.clear();
                        return Ok(None);
                    }
                    if buf.len() > MAX_COMMAND_LENGTH {
                        buf.clear();
                        self.discarding = true;
                        return Err(MessageParseError::LineTooLong {
                            limit: MAX_COMMAND_LENGTH,
                        }
                        .into());
                    }
                    return Ok(None);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn decode(s: &str) -> Message {
        decode_line(s.as_bytes()).unwrap()
    }

    #[test]
    fn test_decode_simple_command() {
        let msg = decode("PING");
        assert_eq!(msg.command, "PING");
        assert!(msg.prefix.is_none());
        assert!(msg.params.is_empty());
    }

    #[test]
    fn test_decode_with_params() {
        let msg = decode("PRIVMSG #channel :Hello, world!");
        assert_eq!(msg.command, "PRIVMSG");
        assert_eq!(
            msg.params,
            vec![b"#channel".to_vec(), b"Hello, world!".to_vec()]
        );
    }

    #[test]
    fn test_decode_with_prefix() {
        let msg = decode(":nick!user@host PRIVMSG #channel :Hello");
        assert_eq!(msg.prefix.as_deref(), Some("nick!user@host"));
        assert_eq!(msg.command, "PRIVMSG");
    }

    #[test]
    fn test_decode_numeric_translation() {
        let msg = decode(":server 001 nick :Welcome");
        assert_eq!(msg.command, "RPL_WELCOME");
        assert_eq!(msg.params[0], b"nick".to_vec());
    }

    #[test]
    fn test_decode_unknown_numeric_kept() {
        let msg = decode(":server 999 nick :whatever");
        assert_eq!(msg.command, "999");
    }

    #[test]
    fn test_decode_lowercase_normalized() {
        let msg = decode("privmsg #ch :hi");
        assert_eq!(msg.command, "PRIVMSG");
    }

    #[test]
    fn test_decode_empty_is_error() {
        assert_eq!(
            decode_line(b""),
            Err(MessageParseError::EmptyMessage)
        );
    }

    #[test]
    fn test_decode_multiple_spaces_collapse() {
        let msg = decode("USER  guest   0 * :Real Name");
        assert_eq!(msg.command, "USER");
        assert_eq!(msg.params.len(), 4);
        assert_eq!(msg.params[3], b"Real Name".to_vec());
    }

    #[test]
    fn test_decode_trailing_preserves_inner_spaces() {
        let msg = decode("PRIVMSG #c :a  b");
        assert_eq!(msg.params[1], b"a  b".to_vec());
    }

    #[test]
    fn test_decode_empty_trailing() {
        let msg = decode("PRIVMSG #channel :");
        assert_eq!(msg.params, vec![b"#channel".to_vec(), b"".to_vec()]);
    }

    #[test]
    fn test_decode_middle_params_no_spaces() {
        let msg = decode(":srv KICK #c victim :get out");
        for param in &msg.params[..msg.params.len() - 1] {
            assert!(!param.contains(&b' '));
        }
    }

    #[test]
    fn test_decode_non_utf8_payload() {
        let msg = decode_line(b"PRIVMSG #c :\xff\xfe").unwrap();
        assert_eq!(msg.params[1], vec![0xff, 0xfe]);
    }

    #[test]
    fn test_encode_line_appends_crlf() {
        let out = encode_line(encoding::UTF_8, "NICK alice");
        assert_eq!(out, b"NICK alice\r\n");
    }

    #[test]
    fn test_encode_line_strips_embedded_terminators() {
        let out = encode_line(encoding::UTF_8, "QUIT :bye\r\nPRIVMSG x :y");
        assert_eq!(out, b"QUIT :byePRIVMSG x :y\r\n");
    }

    #[test]
    fn test_framer_accumulates_partial_lines() {
        let mut codec = LineDecoder::new();
        let mut buf = BytesMut::new();
        buf.extend_from_slice(b"PING :ab");
        assert!(codec.decode(&mut buf).unwrap().is_none());
        buf.extend_from_slice(b"c\r\nPRIVMSG");
        let msg = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(msg.command, "PING");
        assert_eq!(msg.params[0], b"abc".to_vec());
        assert!(codec.decode(&mut buf).unwrap().is_none());
    }

    #[test]
    fn test_framer_skips_blank_lines() {
        let mut codec = LineDecoder::new();
        let mut buf = BytesMut::new();
        buf.extend_from_slice(b"\r\n\r\nPING :x\r\n");
        let msg = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(msg.command, "PING");
    }

    #[test]
    fn test_framer_tolerates_lone_cr() {
        let mut codec = LineDecoder::new();
        let mut buf = BytesMut::new();
        buf.extend_from_slice(b"PING\r :x\n");
        let msg = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(msg.command, "PING");
        assert_eq!(msg.params[0], b"x".to_vec());
    }

    #[test]
    fn test_framer_overlong_line_recovers() {
        let mut codec = LineDecoder::new();
        let mut buf = BytesMut::new();
        buf.extend_from_slice(&vec![b'a'; MAX_COMMAND_LENGTH + 1]);
        let err = codec.decode(&mut buf).unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::BadMessage(MessageParseError::LineTooLong { .. })
        ));
        // Remainder of the runaway line is discarded, next line decodes.
        buf.extend_from_slice(b"aaaa\r\nPING :ok\r\n");
        let msg = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(msg.command, "PING");
        assert_eq!(msg.params[0], b"ok".to_vec());
    }

    proptest! {
        // Any chunking of a well-formed stream frames to the same messages
        // as feeding it a line at a time.
        #[test]
        fn prop_framing_is_split_invariant(cuts in proptest::collection::vec(1usize..40, 0..20)) {
            let stream: &[u8] =
                b":srv 001 alice :Welcome\r\nPING :abc\r\n:bob!u@h PRIVMSG #r :hello there\r\nNOTICE alice :hi\r\n";
            let mut expected = Vec::new();
            let mut whole = LineDecoder::new();
            let mut buf = BytesMut::from(stream);
            while let Some(msg) = whole.decode(&mut buf).unwrap() {
                expected.push(msg);
            }

            let mut got = Vec::new();
            let mut codec = LineDecoder::new();
            let mut buf = BytesMut::new();
            let mut offset = 0;
            for cut in cuts {
                let end = (offset + cut).min(stream.len());
                buf.extend_from_slice(&stream[offset..end]);
                while let Some(msg) = codec.decode(&mut buf).unwrap() {
                    got.push(msg);
                }
                offset = end;
                if offset == stream.len() {
                    break;
                }
            }
            buf.extend_from_slice(&stream[offset..]);
            while let Some(msg) = codec.decode(&mut buf).unwrap() {
                got.push(msg);
            }

            prop_assert_eq!(got, expected);
        }
    }
}
