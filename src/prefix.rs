//! Message-prefix (netmask) parsing.
//!
//! Server-originated events carry a prefix of the form
//! `[sigil]nick[!user][@host]`, where the optional leading sigil is a
//! channel-status flag (`@`, `+`, `%`, …) some servers attach in NAMES
//! replies and the like.

/// Channel-status sigils recognized in front of a nick.
const STATUS_SIGILS: &[char] = &['@', '+', '%', '&', '~'];

/// A parsed `nick!user@host` netmask.
///
/// Missing components come back as empty strings; parsing never fails.
/// A `User` is a snapshot of one inbound event and is not retained or
/// updated by the engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct User {
    /// Nickname, sigil stripped.
    pub nick: String,
    /// Channel-status sigil, when present.
    pub mode: Option<char>,
    /// The ident/username part after `!`.
    pub user: String,
    /// The host part after `@`.
    pub host: String,
}

impl User {
    /// Parse a netmask. The first byte is taken as a status sigil when it
    /// is one of `@ + % & ~`; the rest splits on the first `!` and the
    /// first `@`.
    pub fn parse(netmask: &str) -> User {
        let (mode, rest) = match netmask.chars().next() {
            Some(c) if STATUS_SIGILS.contains(&c) => (Some(c), &netmask[c.len_utf8()..]),
            _ => (None, netmask),
        };

        let (nick, rest) = match rest.split_once('!') {
            Some((nick, rest)) => (nick, rest),
            None => (rest, ""),
        };
        let (user, host) = match rest.split_once('@') {
            Some((user, host)) => (user, host),
            None => (rest, ""),
        };

        User {
            nick: nick.to_string(),
            mode,
            user: user.to_string(),
            host: host.to_string(),
        }
    }
}

impl std::fmt::Display for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.nick)?;
        if !self.user.is_empty() {
            write!(f, "!{}", self.user)?;
        }
        if !self.host.is_empty() {
            write!(f, "@{}", self.host)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_netmask() {
        let user = User::parse("nick!ident@example.com");
        assert_eq!(user.nick, "nick");
        assert_eq!(user.mode, None);
        assert_eq!(user.user, "ident");
        assert_eq!(user.host, "example.com");
    }

    #[test]
    fn test_sigil_is_stripped() {
        let user = User::parse("@op!ident@host");
        assert_eq!(user.mode, Some('@'));
        assert_eq!(user.nick, "op");

        let user = User::parse("+voiced");
        assert_eq!(user.mode, Some('+'));
        assert_eq!(user.nick, "voiced");
    }

    #[test]
    fn test_nick_only() {
        let user = User::parse("irc.example.net");
        assert_eq!(user.nick, "irc.example.net");
        assert_eq!(user.user, "");
        assert_eq!(user.host, "");
    }

    #[test]
    fn test_host_without_user() {
        let user = User::parse("nick@host");
        assert_eq!(user.nick, "nick");
        assert_eq!(user.user, "");
        assert_eq!(user.host, "host");
    }

    #[test]
    fn test_empty_input_never_errors() {
        let user = User::parse("");
        assert_eq!(user.nick, "");
        assert_eq!(user.mode, None);
    }

    #[test]
    fn test_display_roundtrip() {
        assert_eq!(User::parse("a!b@c").to_string(), "a!b@c");
        assert_eq!(User::parse("a").to_string(), "a");
    }
}
