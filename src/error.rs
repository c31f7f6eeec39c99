//! Error types for the IRC engine.
//!
//! This module defines error types for wire-format parsing failures,
//! mode-string parsing issues, ISUPPORT token problems and command-surface
//! contract violations.

use thiserror::Error;

/// Convenience type alias for Results using [`ProtocolError`].
pub type Result<T, E = ProtocolError> = std::result::Result<T, E>;

/// Top-level protocol errors.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProtocolError {
    /// I/O error during reading or writing.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse an inbound IRC line.
    #[error("bad message: {0}")]
    BadMessage(#[from] MessageParseError),
}

/// Errors encountered when decoding inbound IRC lines.
///
/// A single malformed line is logged and dropped by the session; it never
/// tears the connection down.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum MessageParseError {
    /// Line was empty.
    #[error("empty message")]
    EmptyMessage,

    /// Line had a prefix but no command token.
    #[error("missing command")]
    MissingCommand,

    /// A partial line outgrew the protocol line budget with no LF in sight.
    #[error("line exceeds {limit} bytes without a terminator")]
    LineTooLong {
        /// The framing budget that was exceeded, CRLF included.
        limit: usize,
    },
}

/// Errors encountered when parsing MODE change strings.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ModeParseError {
    /// Empty mode string.
    #[error("empty mode string")]
    EmptyModeString,

    /// Mode string did not begin with `+` or `-`.
    #[error("malformed modes string: {modes:?}")]
    Malformed {
        /// The offending mode string.
        modes: String,
    },

    /// Two consecutive direction signs, or a trailing sign.
    #[error("empty mode sequence: {modes:?}")]
    EmptySequence {
        /// The offending mode string.
        modes: String,
    },

    /// A parameter-taking mode letter had no parameter left to consume.
    #[error("not enough parameters for mode {mode:?}")]
    NotEnoughParameters {
        /// The mode letter that went unfed.
        mode: char,
    },

    /// Parameters remained after every mode letter was consumed.
    #[error("too many parameters: {modes:?} left {remaining}")]
    TooManyParameters {
        /// The mode string being parsed.
        modes: String,
        /// How many parameters were left over.
        remaining: usize,
    },
}

/// Errors encountered when parsing ISUPPORT tokens.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum IsupportError {
    /// A `\xHH` escape did not contain two hexadecimal digits.
    #[error("invalid hex octet: {octet:?}")]
    InvalidHexOctet {
        /// The malformed escape payload.
        octet: String,
    },
}

/// Contract violations on the outbound command surface.
///
/// These are surfaced synchronously to the caller; nothing is sent.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CommandError {
    /// `msg` was asked to split below its own framing overhead.
    #[error("maximum length must exceed {minimum} for message to {target}")]
    LengthTooSmall {
        /// Smallest usable length for this target, framing and CRLF included.
        minimum: usize,
        /// The message target.
        target: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MessageParseError::LineTooLong { limit: 512 };
        assert_eq!(
            format!("{}", err),
            "line exceeds 512 bytes without a terminator"
        );

        let err = ModeParseError::EmptyModeString;
        assert_eq!(format!("{}", err), "empty mode string");

        let err = CommandError::LengthTooSmall {
            minimum: 13,
            target: "x".to_string(),
        };
        assert_eq!(
            format!("{}", err),
            "maximum length must exceed 13 for message to x"
        );
    }

    #[test]
    fn test_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset");
        let protocol_err: ProtocolError = io_err.into();
        assert!(matches!(protocol_err, ProtocolError::Io(_)));

        let protocol_err: ProtocolError = MessageParseError::EmptyMessage.into();
        assert!(matches!(protocol_err, ProtocolError::BadMessage(_)));
    }

    #[test]
    fn test_error_source_chaining() {
        let parse_err = MessageParseError::EmptyMessage;
        let protocol_err: ProtocolError = parse_err.clone().into();
        let source = std::error::Error::source(&protocol_err);
        assert!(source.is_some());
        assert_eq!(source.unwrap().to_string(), parse_err.to_string());
    }
}
