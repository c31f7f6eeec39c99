//! Semantic events emitted by the protocol engine.
//!
//! Each [`Event`] variant corresponds to one named signal on the bus;
//! [`Event::signal_name`] yields the canonical kebab-case identifier.
//!
//! Free-text server fields (channel names, nicks, topics, reasons) are
//! decoded leniently to `String` at this boundary. PRIVMSG/NOTICE bodies
//! and CTCP data stay `Vec<u8>`: they are the payloads where a failed
//! decode must not destroy information.

use std::collections::HashMap;

use crate::isupport::Feature;
use crate::prefix::User;

/// A semantic event, delivered to receivers together with the id of the
/// emitting session.
#[derive(Clone, Debug, PartialEq)]
#[non_exhaustive]
pub enum Event {
    /// Transport established and the session is processing.
    Connected,
    /// Connection torn down, cleanly or not.
    Disconnected,
    /// We sent QUIT; the connection is about to close.
    Quited,
    /// Registration completed (RPL_WELCOME received).
    SignedOn,

    /// Private message addressed to us.
    Privmsg {
        /// Sender.
        user: User,
        /// Message body, CTCP already stripped.
        message: Vec<u8>,
    },
    /// Message to a channel we observe.
    Chanmsg {
        /// Target channel.
        channel: String,
        /// Sender.
        user: User,
        /// Message body, CTCP already stripped.
        message: Vec<u8>,
    },
    /// NOTICE to us or to a channel.
    Notice {
        /// Sender.
        user: User,
        /// Target (our nick or a channel).
        channel: String,
        /// Notice body.
        message: Vec<u8>,
    },
    /// CTCP ACTION (`/me`).
    Action {
        /// Sender.
        user: User,
        /// Target (our nick or a channel).
        channel: String,
        /// Action text.
        data: Vec<u8>,
    },

    /// We joined a channel.
    Joined {
        /// The channel.
        channel: String,
    },
    /// We left a channel.
    Left {
        /// The channel.
        channel: String,
    },
    /// Another user joined a channel we are on.
    UserJoined {
        /// The channel.
        channel: String,
        /// Who joined.
        user: User,
    },
    /// Another user left a channel we are on.
    UserLeft {
        /// The channel.
        channel: String,
        /// Who left.
        user: User,
    },
    /// Another user disconnected from the network.
    UserQuit {
        /// Who quit.
        user: User,
        /// Their quit message.
        message: String,
    },

    /// Our own nick changed.
    NickChanged {
        /// Our old identity.
        user: User,
        /// The new nick.
        newnick: String,
    },
    /// Someone else's nick changed.
    UserRenamed {
        /// Their old identity.
        user: User,
        /// The new nick.
        newnick: String,
    },

    /// We were kicked from a channel.
    Kicked {
        /// The channel.
        channel: String,
        /// Who kicked us.
        kicker: User,
        /// The kick message.
        message: String,
    },
    /// Another user was kicked.
    UserKicked {
        /// The channel.
        channel: String,
        /// The nick that was kicked.
        kicked: String,
        /// Who kicked them.
        kicker: User,
        /// The kick message.
        message: String,
    },
    /// We are banned from a channel we tried to join.
    Banned {
        /// The channel.
        channel: String,
        /// The server's explanation.
        message: String,
    },
    /// Another nick is banned from a channel.
    UserBanned {
        /// The channel.
        channel: String,
        /// The banned nick.
        user: String,
        /// The server's explanation.
        message: String,
    },

    /// Channel or user modes changed. A mixed MODE line produces one
    /// event for the additions and one for the removals, in that order.
    ModeChanged {
        /// Who changed the modes.
        user: User,
        /// The channel, or our nick for a user-mode change.
        channel: String,
        /// True for added modes, false for removed.
        set: bool,
        /// The mode letters, concatenated.
        modes: String,
        /// Per-letter parameters, `None` for modes that took none.
        args: Vec<Option<Vec<u8>>>,
    },
    /// Someone set a channel topic.
    TopicChanged {
        /// Who set it.
        user: User,
        /// The channel.
        channel: String,
        /// The new topic.
        topic: String,
    },
    /// The server's message of the day, fully assembled.
    Motd {
        /// MOTD lines, `"- "` decorations stripped.
        motd: Vec<String>,
    },

    /// RPL_WELCOME (001).
    RplWelcome {
        /// The welcome text.
        message: String,
    },
    /// RPL_YOURHOST (002).
    RplYourhost {
        /// Server software description.
        info: String,
    },
    /// RPL_CREATED (003).
    RplCreated {
        /// When the server was created.
        when: String,
    },
    /// RPL_MYINFO (004).
    RplMyinfo {
        /// Server name.
        servername: Option<String>,
        /// Server version.
        version: Option<String>,
        /// Available user modes.
        umodes: Option<String>,
        /// Available channel modes.
        cmodes: Option<String>,
    },
    /// RPL_BOUNCE (010): try another server.
    RplBounce {
        /// The suggestion text.
        info: String,
    },
    /// RPL_ISUPPORT (005) burst completed; emitted once per connection.
    RplIsupport {
        /// Snapshot of the feature store after the burst.
        options: HashMap<String, Feature>,
    },
    /// RPL_LUSERCLIENT (251).
    RplLuserclient {
        /// Client/server/service counts, as text.
        info: String,
    },
    /// RPL_LUSEROP (252).
    RplLuserop {
        /// Operator count.
        ops: u32,
    },
    /// RPL_LUSERCHANNELS (254).
    RplLuserchannels {
        /// Channel count.
        channels: u32,
    },
    /// RPL_LUSERME (255).
    RplLuserme {
        /// Local connection counts, as text.
        info: String,
    },
    /// RPL_TOPIC (332).
    RplTopic {
        /// Message source.
        user: User,
        /// The channel.
        channel: String,
        /// The current topic.
        topic: String,
    },
    /// RPL_NOTOPIC (331).
    RplNotopic {
        /// The channel.
        channel: String,
    },
    /// RPL_NAMREPLY (353).
    RplNamreply {
        /// The channel.
        channel: String,
        /// Channel privacy marker (`=`, `*` or `@`).
        privacy: String,
        /// Nicks on the channel, status sigils included.
        users: Vec<String>,
    },
    /// RPL_ENDOFNAMES (366).
    RplEndofnames {
        /// The channel.
        channel: String,
    },
    /// RPL_LIST (322).
    RplList {
        /// The channel.
        channel: String,
        /// Visible user count.
        count: u32,
        /// The channel topic.
        topic: String,
    },
    /// RPL_LISTEND (323).
    RplListend,

    /// Our attempted nick is taken.
    NicknameInUse {
        /// The nick we attempted.
        nickname: String,
    },
    /// Our attempted nick is not allowed.
    ErroneousNickname {
        /// The nick we attempted.
        nickname: String,
    },
    /// The server rejected our password.
    PasswordMismatch,

    /// Inbound CTCP PING query.
    CtcpQueryPing {
        /// Who asked.
        user: User,
        /// Query target (our nick or a channel).
        channel: String,
        /// Opaque echo payload.
        data: Option<Vec<u8>>,
    },
    /// Inbound CTCP FINGER query.
    CtcpQueryFinger {
        /// Who asked.
        user: User,
        /// Query target.
        channel: String,
        /// Stray payload, if the peer sent one.
        data: Option<Vec<u8>>,
    },
    /// Inbound CTCP VERSION query.
    CtcpQueryVersion {
        /// Who asked.
        user: User,
        /// Query target.
        channel: String,
        /// Stray payload, if the peer sent one.
        data: Option<Vec<u8>>,
    },
    /// Inbound CTCP SOURCE query.
    CtcpQuerySource {
        /// Who asked.
        user: User,
        /// Query target.
        channel: String,
        /// Stray payload, if the peer sent one.
        data: Option<Vec<u8>>,
    },
    /// Inbound CTCP USERINFO query.
    CtcpQueryUserinfo {
        /// Who asked.
        user: User,
        /// Query target.
        channel: String,
        /// Stray payload, if the peer sent one.
        data: Option<Vec<u8>>,
    },
    /// A CTCP PING reply matched our ledger.
    Pong {
        /// Who answered.
        user: User,
        /// Round-trip time in seconds.
        secs: f64,
    },
}

impl Event {
    /// Canonical signal name for this event.
    pub fn signal_name(&self) -> &'static str {
        match self {
            Event::Connected => "on-connected",
            Event::Disconnected => "on-disconnected",
            Event::Quited => "on-quited",
            Event::SignedOn => "on-signed-on",
            Event::Privmsg { .. } => "on-privmsg",
            Event::Chanmsg { .. } => "on-chanmsg",
            Event::Notice { .. } => "on-notice",
            Event::Action { .. } => "on-action",
            Event::Joined { .. } => "on-joined",
            Event::Left { .. } => "on-left",
            Event::UserJoined { .. } => "on-user-joined",
            Event::UserLeft { .. } => "on-user-left",
            Event::UserQuit { .. } => "on-user-quit",
            Event::NickChanged { .. } => "on-nick-changed",
            Event::UserRenamed { .. } => "on-user-renamed",
            Event::Kicked { .. } => "on-kicked",
            Event::UserKicked { .. } => "on-user-kicked",
            Event::Banned { .. } => "on-banned",
            Event::UserBanned { .. } => "on-user-banned",
            Event::ModeChanged { .. } => "on-mode-changed",
            Event::TopicChanged { .. } => "on-topic-changed",
            Event::Motd { .. } => "on-motd",
            Event::RplWelcome { .. } => "on-rpl-welcome",
            Event::RplYourhost { .. } => "on-rpl-yourhost",
            Event::RplCreated { .. } => "on-rpl-created",
            Event::RplMyinfo { .. } => "on-rpl-myinfo",
            Event::RplBounce { .. } => "on-rpl-bounce",
            Event::RplIsupport { .. } => "on-rpl-isupport",
            Event::RplLuserclient { .. } => "on-rpl-luserclient",
            Event::RplLuserop { .. } => "on-rpl-luserop",
            Event::RplLuserchannels { .. } => "on-rpl-luserchannels",
            Event::RplLuserme { .. } => "on-rpl-luserme",
            Event::RplTopic { .. } => "on-rpl-topic",
            Event::RplNotopic { .. } => "on-rpl-notopic",
            Event::RplNamreply { .. } => "on-rpl-namreply",
            Event::RplEndofnames { .. } => "on-rpl-endofnames",
            Event::RplList { .. } => "on-rpl-list",
            Event::RplListend => "on-rpl-listend",
            Event::NicknameInUse { .. } => "on-nickname-in-use",
            Event::ErroneousNickname { .. } => "on-erroneous-nickname",
            Event::PasswordMismatch => "on-password-mismatch",
            Event::CtcpQueryPing { .. } => "on-ctcp-query-ping",
            Event::CtcpQueryFinger { .. } => "on-ctcp-query-finger",
            Event::CtcpQueryVersion { .. } => "on-ctcp-query-version",
            Event::CtcpQuerySource { .. } => "on-ctcp-query-source",
            Event::CtcpQueryUserinfo { .. } => "on-ctcp-query-userinfo",
            Event::Pong { .. } => "on-pong",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_names_are_kebab_case() {
        let event = Event::NicknameInUse {
            nickname: "x".to_string(),
        };
        assert_eq!(event.signal_name(), "on-nickname-in-use");
        assert_eq!(Event::SignedOn.signal_name(), "on-signed-on");
        assert_eq!(Event::RplListend.signal_name(), "on-rpl-listend");
    }
}
