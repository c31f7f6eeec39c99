//! # irc-engine
//!
//! A client-side IRC protocol engine (RFC 1459/2812 with the ISUPPORT
//! and CTCP extensions): wire parsing, session state, a typed feature
//! store, outbound command building and a signal-based event fabric.
//!
//! The engine is transport-agnostic. A transport feeds inbound bytes and
//! lifecycle notifications into a [`Session`]; the session frames and
//! decodes lines, tracks the registration handshake and server
//! capabilities, and publishes semantic [`Event`]s on a [`SignalBus`].
//! Outbound lines leave through a channel of [`Outbound`] items, each a
//! complete CRLF-terminated line.
//!
//! ## Features
//!
//! - Byte-exact IRC line parsing with numeric-to-symbolic translation
//! - CTCP quoting, extraction and default query handling
//! - ISUPPORT (RPL_ISUPPORT) tracking with typed per-key reducers
//! - MODE parsing driven by the advertised `PREFIX`/`CHANMODES`
//! - Named signals with concurrent, isolated receiver delivery
//!
//! ## Quick start
//!
//! ```no_run
//! use std::sync::Arc;
//! use irc_engine::{receiver, Event, Session, SessionConfig, SignalBus};
//!
//! # async fn run() {
//! let bus = Arc::new(SignalBus::new());
//! let (tx, _outbound) = tokio::sync::mpsc::unbounded_channel();
//! let session = Arc::new(Session::new(SessionConfig::new("mybot"), bus, tx));
//!
//! session.bus().signal("on-chanmsg").connect(receiver(|_, event| async move {
//!     if let Event::Chanmsg { channel, user, .. } = &*event {
//!         println!("<{}> said something on {}", user.nick, channel);
//!     }
//! }));
//!
//! // Wire the transport: write `outbound` items to the socket and feed
//! // inbound bytes with `session.feed(..)` after `session.connected()`.
//! session.connected().await;
//! session.feed(b":srv 001 mybot :Welcome\r\n").await;
//! # }
//! ```

#![deny(clippy::all)]
// TODO: Enable once documentation coverage is complete
// #![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod casemap;
pub mod commands;
pub mod ctcp;
pub mod error;
pub mod event;
pub mod isupport;
pub mod mode;
pub mod prefix;
pub mod response;
pub mod session;
pub mod signal;
pub mod util;
pub mod wire;

pub use self::casemap::{irc_eq, irc_to_lower};
pub use self::commands::{ModeParam, CHANNEL_PREFIXES};
pub use self::ctcp::{ctcp_dequote, ctcp_extract, ctcp_quote, ctcp_stringify, low_dequote, low_quote, Extract};
pub use self::error::{CommandError, IsupportError, MessageParseError, ModeParseError, ProtocolError};
pub use self::event::Event;
pub use self::isupport::{ChanModes, Feature, Features, PrefixMap};
pub use self::mode::{parse_modes, ModeChange};
pub use self::prefix::User;
pub use self::response::Response;
pub use self::session::{Outbound, Session, SessionConfig, MAX_PINGRING};
pub use self::signal::{receiver, EmitterId, Receiver, Signal, SignalBus};
pub use self::wire::{decode_line, encode_line, LineDecoder, Message, MAX_COMMAND_LENGTH};
