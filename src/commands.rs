//! The outbound command surface: user-input commands, client to server.
//!
//! These build well-formed lines and hand them to the session's outbound
//! sink. Anything issued while the session is not processing is logged
//! and dropped; contract violations ([`CommandError`]) come back
//! synchronously and send nothing.

use tracing::info;

use crate::error::CommandError;
use crate::event::Event;
use crate::session::Session;
use crate::util::{ping_key, split_message};
use crate::wire::MAX_COMMAND_LENGTH;

/// Channel name prefixes a target must carry to count as a channel.
pub const CHANNEL_PREFIXES: &[char] = &['&', '#', '!', '+'];

/// The mutually exclusive trailing argument of a MODE command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ModeParam {
    /// User limit, for the `l` flag.
    Limit(u32),
    /// Target nick, for membership flags like `o` and `v`.
    User(String),
    /// Ban mask, for the `b` flag.
    Mask(String),
}

fn ensure_channel(channel: &str) -> String {
    if channel.starts_with(CHANNEL_PREFIXES) {
        channel.to_string()
    } else {
        format!("#{channel}")
    }
}

impl Session {
    /// Join a channel. A name with no channel prefix gets `#` prepended.
    pub fn join(&self, channel: &str, key: Option<&str>) {
        let channel = ensure_channel(channel);
        info!(%channel, "joining");
        match key {
            Some(key) => self.send_line(&format!("JOIN {} {}", channel, key)),
            None => self.send_line(&format!("JOIN {}", channel)),
        }
    }

    /// Leave a channel.
    pub fn leave(&self, channel: &str, reason: Option<&str>) {
        let channel = ensure_channel(channel);
        match reason {
            Some(reason) => self.send_line(&format!("PART {} :{}", channel, reason)),
            None => self.send_line(&format!("PART {}", channel)),
        }
    }

    /// Alias for [`Session::leave`].
    pub fn part(&self, channel: &str, reason: Option<&str>) {
        self.leave(channel, reason);
    }

    /// Attempt to kick a user from a channel.
    pub fn kick(&self, channel: &str, user: &str, reason: Option<&str>) {
        let channel = ensure_channel(channel);
        match reason {
            Some(reason) => self.send_line(&format!("KICK {} {} :{}", channel, user, reason)),
            None => self.send_line(&format!("KICK {} {}", channel, user)),
        }
    }

    /// Set the topic of a channel, or query it when `topic` is `None`.
    pub fn topic(&self, channel: &str, topic: Option<&str>) {
        let channel = ensure_channel(channel);
        match topic {
            Some(topic) => self.send_line(&format!("TOPIC {} :{}", channel, topic)),
            None => self.send_line(&format!("TOPIC {}", channel)),
        }
    }

    /// Change modes on a user or channel.
    pub fn mode(&self, target: &str, set: bool, modes: &str, param: Option<ModeParam>) {
        let sign = if set { '+' } else { '-' };
        let mut line = format!("MODE {} {}{}", target, sign, modes);
        match param {
            Some(ModeParam::Limit(limit)) => line = format!("{} {}", line, limit),
            Some(ModeParam::User(user)) => line = format!("{} {}", line, user),
            Some(ModeParam::Mask(mask)) => line = format!("{} {}", line, mask),
            None => {}
        }
        self.send_line(&line);
    }

    /// Query the network about the channels it handles; all of them when
    /// `channels` is empty.
    pub fn list(&self, channels: &[&str]) {
        if channels.is_empty() {
            self.send_line("LIST");
        } else {
            self.send_line(&format!("LIST {}", channels.join(",")));
        }
    }

    /// Send a message to a channel, prepending `#` when the name carries
    /// no channel prefix.
    pub fn say(
        &self,
        channel: &str,
        message: &str,
        length: Option<usize>,
    ) -> Result<(), CommandError> {
        self.msg(&ensure_channel(channel), message, length)
    }

    /// Send a message to a user or channel.
    ///
    /// The message is split into multiple PRIVMSG commands on newlines,
    /// and any span longer than `length` minus the protocol framing is
    /// re-split, preferring whitespace break points. `length` defaults
    /// to the 512-byte line budget and must exceed the framing overhead
    /// for this target.
    pub fn msg(
        &self,
        target: &str,
        message: &str,
        length: Option<usize>,
    ) -> Result<(), CommandError> {
        let length = length.unwrap_or(MAX_COMMAND_LENGTH);
        // "PRIVMSG <target> :" plus the terminating CRLF.
        let overhead = "PRIVMSG  :".len() + target.len() + 2;
        if length <= overhead {
            return Err(CommandError::LengthTooSmall {
                minimum: overhead,
                target: target.to_string(),
            });
        }
        for chunk in split_message(message, length - overhead) {
            self.send_line(&format!("PRIVMSG {} :{}", target, chunk));
        }
        Ok(())
    }

    /// Send a notice. Notices are like normal messages but must never
    /// trigger automated replies.
    pub fn notice(&self, target: &str, message: &str) {
        self.send_line(&format!("NOTICE {} :{}", target, message));
    }

    /// Mark this client as away.
    pub fn away(&self, message: &str) {
        self.send_line(&format!("AWAY :{}", message));
    }

    /// Clear the away status.
    pub fn back(&self) {
        // An empty away marks us as back.
        self.away("");
    }

    /// Retrieve user information about a nick, optionally via a specific
    /// server.
    pub fn whois(&self, nickname: &str, server: Option<&str>) {
        match server {
            Some(server) => self.send_line(&format!("WHOIS {} {}", server, nickname)),
            None => self.send_line(&format!("WHOIS {}", nickname)),
        }
    }

    /// Log in to the server: `PASS` (when configured), `NICK`, `USER`.
    ///
    /// The configured register throttle is applied between the commands
    /// for servers that race the welcome.
    pub async fn register(&self, nickname: &str, hostname: &str, servername: &str) {
        if let Some(password) = self.config().password.clone() {
            self.send_line(&format!("PASS {}", password));
        }
        let throttle = self.config().register_throttle;
        if !throttle.is_zero() {
            tokio::time::sleep(throttle).await;
        }
        self.set_nick(nickname);
        let username = self
            .config()
            .username
            .clone()
            .unwrap_or_else(|| nickname.to_string());
        if !throttle.is_zero() {
            tokio::time::sleep(throttle).await;
        }
        self.send_line(&format!(
            "USER {} {} {} :{}",
            username,
            hostname,
            servername,
            self.config().realname
        ));
    }

    /// Ask the server for a new nickname.
    pub fn set_nick(&self, nickname: &str) {
        self.record_attempted_nick(nickname);
        self.send_line(&format!("NICK {}", nickname));
    }

    /// Send QUIT and announce it locally.
    pub async fn quit(&self, message: &str) {
        self.send_line(&format!("QUIT :{}", message));
        self.emit(Event::Quited).await;
    }

    /// Strike a pose: CTCP ACTION to a channel or nick.
    pub fn describe(&self, target: &str, action: &str) {
        self.ctcp_make_query(target, &[(b"ACTION".as_slice(), Some(action.as_bytes()))]);
    }

    /// Measure round-trip delay to another client via CTCP PING.
    ///
    /// With no `text`, a random 12-character key is generated. The
    /// `(nick, key)` pair is recorded so the reply can be matched; the
    /// ledger holds at most [`crate::session::MAX_PINGRING`] entries,
    /// evicting the oldest.
    pub fn ping(&self, nick: &str, text: Option<&str>) {
        let key = match text {
            Some(text) => text.to_string(),
            None => ping_key(),
        };
        self.record_ping(nick, &key);
        self.ctcp_make_query(nick, &[(b"PING".as_slice(), Some(key.as_bytes()))]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_channel_prepends_hash() {
        assert_eq!(ensure_channel("rust"), "#rust");
        assert_eq!(ensure_channel("#rust"), "#rust");
        assert_eq!(ensure_channel("&local"), "&local");
        assert_eq!(ensure_channel("!safe"), "!safe");
        assert_eq!(ensure_channel("+modeless"), "+modeless");
    }
}
