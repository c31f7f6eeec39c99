//! IRC numeric response codes as defined in RFC 1459/2812.
//!
//! This module provides an enumeration of the server response codes
//! (numerics) a client cares about. Numeric commands on the wire are
//! translated to their symbolic names at parse time; unknown numerics are
//! carried through as their three-digit string.
//!
//! # Reference
//! - RFC 2812: Internet Relay Chat: Client Protocol
//! - draft-brocklesby-irc-isupport-03 (numeric 005)

#![allow(non_camel_case_types)]

use std::str::FromStr;

/// IRC server response code.
///
/// Response codes are categorized as:
/// - 001-099: Connection/registration
/// - 200-399: Command replies
/// - 400-599: Error replies
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u16)]
#[non_exhaustive]
pub enum Response {
    // === Connection Registration (001-099) ===
    /// 001 - Welcome to the IRC network
    RPL_WELCOME = 1,
    /// 002 - Your host is running version
    RPL_YOURHOST = 2,
    /// 003 - Server creation date
    RPL_CREATED = 3,
    /// 004 - Server info (name, version, user modes, channel modes)
    RPL_MYINFO = 4,
    /// 005 - Server supported features (ISUPPORT)
    RPL_ISUPPORT = 5,
    /// 010 - Bounce to another server
    RPL_BOUNCE = 10,

    // === Command Responses (200-399) ===
    /// 221 - User mode string
    RPL_UMODEIS = 221,
    /// 251 - Luser client count
    RPL_LUSERCLIENT = 251,
    /// 252 - Luser operator count
    RPL_LUSEROP = 252,
    /// 253 - Luser unknown connections
    RPL_LUSERUNKNOWN = 253,
    /// 254 - Luser channel count
    RPL_LUSERCHANNELS = 254,
    /// 255 - Luser local info
    RPL_LUSERME = 255,
    /// 263 - Try again later
    RPL_TRYAGAIN = 263,
    /// 265 - Local users
    RPL_LOCALUSERS = 265,
    /// 266 - Global users
    RPL_GLOBALUSERS = 266,
    /// 301 - User is away
    RPL_AWAY = 301,
    /// 302 - USERHOST reply
    RPL_USERHOST = 302,
    /// 303 - ISON reply
    RPL_ISON = 303,
    /// 305 - You are no longer marked as away
    RPL_UNAWAY = 305,
    /// 306 - You have been marked as away
    RPL_NOWAWAY = 306,
    /// 311 - WHOIS user info
    RPL_WHOISUSER = 311,
    /// 312 - WHOIS server
    RPL_WHOISSERVER = 312,
    /// 313 - WHOIS operator status
    RPL_WHOISOPERATOR = 313,
    /// 314 - WHOWAS user info
    RPL_WHOWASUSER = 314,
    /// 315 - End of WHO list
    RPL_ENDOFWHO = 315,
    /// 317 - WHOIS idle time
    RPL_WHOISIDLE = 317,
    /// 318 - End of WHOIS
    RPL_ENDOFWHOIS = 318,
    /// 319 - WHOIS channel list
    RPL_WHOISCHANNELS = 319,
    /// 321 - LIST header
    RPL_LISTSTART = 321,
    /// 322 - LIST entry
    RPL_LIST = 322,
    /// 323 - End of LIST
    RPL_LISTEND = 323,
    /// 324 - Channel mode string
    RPL_CHANNELMODEIS = 324,
    /// 329 - Channel creation time
    RPL_CREATIONTIME = 329,
    /// 331 - No topic is set
    RPL_NOTOPIC = 331,
    /// 332 - Channel topic
    RPL_TOPIC = 332,
    /// 333 - Topic set by/at
    RPL_TOPICWHOTIME = 333,
    /// 341 - Invite confirmation
    RPL_INVITING = 341,
    /// 346 - Invite list entry
    RPL_INVITELIST = 346,
    /// 347 - End of invite list
    RPL_ENDOFINVITELIST = 347,
    /// 348 - Exception list entry
    RPL_EXCEPTLIST = 348,
    /// 349 - End of exception list
    RPL_ENDOFEXCEPTLIST = 349,
    /// 352 - WHO reply
    RPL_WHOREPLY = 352,
    /// 353 - NAMES reply
    RPL_NAMREPLY = 353,
    /// 366 - End of NAMES
    RPL_ENDOFNAMES = 366,
    /// 367 - Ban list entry
    RPL_BANLIST = 367,
    /// 368 - End of ban list
    RPL_ENDOFBANLIST = 368,
    /// 369 - End of WHOWAS
    RPL_ENDOFWHOWAS = 369,
    /// 372 - MOTD line
    RPL_MOTD = 372,
    /// 375 - MOTD start
    RPL_MOTDSTART = 375,
    /// 376 - End of MOTD
    RPL_ENDOFMOTD = 376,
    /// 381 - You are now an operator
    RPL_YOUREOPER = 381,

    // === Error Replies (400-599) ===
    /// 401 - No such nick/channel
    ERR_NOSUCHNICK = 401,
    /// 402 - No such server
    ERR_NOSUCHSERVER = 402,
    /// 403 - No such channel
    ERR_NOSUCHCHANNEL = 403,
    /// 404 - Cannot send to channel
    ERR_CANNOTSENDTOCHAN = 404,
    /// 405 - Too many channels joined
    ERR_TOOMANYCHANNELS = 405,
    /// 406 - There was no such nickname
    ERR_WASNOSUCHNICK = 406,
    /// 407 - Too many targets
    ERR_TOOMANYTARGETS = 407,
    /// 409 - No origin present
    ERR_NOORIGIN = 409,
    /// 411 - No recipient given
    ERR_NORECIPIENT = 411,
    /// 412 - No text to send
    ERR_NOTEXTTOSEND = 412,
    /// 421 - Unknown command
    ERR_UNKNOWNCOMMAND = 421,
    /// 422 - No MOTD available
    ERR_NOMOTD = 422,
    /// 431 - No nickname given
    ERR_NONICKNAMEGIVEN = 431,
    /// 432 - Erroneous nickname
    ERR_ERRONEUSNICKNAME = 432,
    /// 433 - Nickname already in use
    ERR_NICKNAMEINUSE = 433,
    /// 436 - Nickname collision
    ERR_NICKCOLLISION = 436,
    /// 437 - Resource temporarily unavailable
    ERR_UNAVAILRESOURCE = 437,
    /// 441 - User not in channel
    ERR_USERNOTINCHANNEL = 441,
    /// 442 - You are not on that channel
    ERR_NOTONCHANNEL = 442,
    /// 443 - User already on channel
    ERR_USERONCHANNEL = 443,
    /// 451 - You have not registered
    ERR_NOTREGISTERED = 451,
    /// 461 - Not enough parameters
    ERR_NEEDMOREPARAMS = 461,
    /// 462 - You may not reregister
    ERR_ALREADYREGISTERED = 462,
    /// 464 - Password mismatch
    ERR_PASSWDMISMATCH = 464,
    /// 465 - You are banned from this server
    ERR_YOUREBANNEDCREEP = 465,
    /// 467 - Channel key already set
    ERR_KEYSET = 467,
    /// 471 - Channel is full
    ERR_CHANNELISFULL = 471,
    /// 472 - Unknown mode character
    ERR_UNKNOWNMODE = 472,
    /// 473 - Invite-only channel
    ERR_INVITEONLYCHAN = 473,
    /// 474 - Banned from channel
    ERR_BANNEDFROMCHAN = 474,
    /// 475 - Bad channel key
    ERR_BADCHANNELKEY = 475,
    /// 476 - Bad channel mask
    ERR_BADCHANMASK = 476,
    /// 478 - Ban list is full
    ERR_BANLISTFULL = 478,
    /// 481 - No privileges
    ERR_NOPRIVILEGES = 481,
    /// 482 - Channel operator privileges needed
    ERR_CHANOPRIVSNEEDED = 482,
    /// 491 - No O-lines for your host
    ERR_NOOPERHOST = 491,
    /// 501 - Unknown user mode flag
    ERR_UMODEUNKNOWNFLAG = 501,
    /// 502 - Cannot change mode for other users
    ERR_USERSDONTMATCH = 502,
}

impl Response {
    /// Numeric code for this response.
    #[inline]
    pub fn code(&self) -> u16 {
        *self as u16
    }

    /// Look up a response by numeric code.
    pub fn from_code(code: u16) -> Option<Response> {
        Some(match code {
            1 => Response::RPL_WELCOME,
            2 => Response::RPL_YOURHOST,
            3 => Response::RPL_CREATED,
            4 => Response::RPL_MYINFO,
            5 => Response::RPL_ISUPPORT,
            10 => Response::RPL_BOUNCE,
            221 => Response::RPL_UMODEIS,
            251 => Response::RPL_LUSERCLIENT,
            252 => Response::RPL_LUSEROP,
            253 => Response::RPL_LUSERUNKNOWN,
            254 => Response::RPL_LUSERCHANNELS,
            255 => Response::RPL_LUSERME,
            263 => Response::RPL_TRYAGAIN,
            265 => Response::RPL_LOCALUSERS,
            266 => Response::RPL_GLOBALUSERS,
            301 => Response::RPL_AWAY,
            302 => Response::RPL_USERHOST,
            303 => Response::RPL_ISON,
            305 => Response::RPL_UNAWAY,
            306 => Response::RPL_NOWAWAY,
            311 => Response::RPL_WHOISUSER,
            312 => Response::RPL_WHOISSERVER,
            313 => Response::RPL_WHOISOPERATOR,
            314 => Response::RPL_WHOWASUSER,
            315 => Response::RPL_ENDOFWHO,
            317 => Response::RPL_WHOISIDLE,
            318 => Response::RPL_ENDOFWHOIS,
            319 => Response::RPL_WHOISCHANNELS,
            321 => Response::RPL_LISTSTART,
            322 => Response::RPL_LIST,
            323 => Response::RPL_LISTEND,
            324 => Response::RPL_CHANNELMODEIS,
            329 => Response::RPL_CREATIONTIME,
            331 => Response::RPL_NOTOPIC,
            332 => Response::RPL_TOPIC,
            333 => Response::RPL_TOPICWHOTIME,
            341 => Response::RPL_INVITING,
            346 => Response::RPL_INVITELIST,
            347 => Response::RPL_ENDOFINVITELIST,
            348 => Response::RPL_EXCEPTLIST,
            349 => Response::RPL_ENDOFEXCEPTLIST,
            352 => Response::RPL_WHOREPLY,
            353 => Response::RPL_NAMREPLY,
            366 => Response::RPL_ENDOFNAMES,
            367 => Response::RPL_BANLIST,
            368 => Response::RPL_ENDOFBANLIST,
            369 => Response::RPL_ENDOFWHOWAS,
            372 => Response::RPL_MOTD,
            375 => Response::RPL_MOTDSTART,
            376 => Response::RPL_ENDOFMOTD,
            381 => Response::RPL_YOUREOPER,
            401 => Response::ERR_NOSUCHNICK,
            402 => Response::ERR_NOSUCHSERVER,
            403 => Response::ERR_NOSUCHCHANNEL,
            404 => Response::ERR_CANNOTSENDTOCHAN,
            405 => Response::ERR_TOOMANYCHANNELS,
            406 => Response::ERR_WASNOSUCHNICK,
            407 => Response::ERR_TOOMANYTARGETS,
            409 => Response::ERR_NOORIGIN,
            411 => Response::ERR_NORECIPIENT,
            412 => Response::ERR_NOTEXTTOSEND,
            421 => Response::ERR_UNKNOWNCOMMAND,
            422 => Response::ERR_NOMOTD,
            431 => Response::ERR_NONICKNAMEGIVEN,
            432 => Response::ERR_ERRONEUSNICKNAME,
            433 => Response::ERR_NICKNAMEINUSE,
            436 => Response::ERR_NICKCOLLISION,
            437 => Response::ERR_UNAVAILRESOURCE,
            441 => Response::ERR_USERNOTINCHANNEL,
            442 => Response::ERR_NOTONCHANNEL,
            443 => Response::ERR_USERONCHANNEL,
            451 => Response::ERR_NOTREGISTERED,
            461 => Response::ERR_NEEDMOREPARAMS,
            462 => Response::ERR_ALREADYREGISTERED,
            464 => Response::ERR_PASSWDMISMATCH,
            465 => Response::ERR_YOUREBANNEDCREEP,
            467 => Response::ERR_KEYSET,
            471 => Response::ERR_CHANNELISFULL,
            472 => Response::ERR_UNKNOWNMODE,
            473 => Response::ERR_INVITEONLYCHAN,
            474 => Response::ERR_BANNEDFROMCHAN,
            475 => Response::ERR_BADCHANNELKEY,
            476 => Response::ERR_BADCHANMASK,
            478 => Response::ERR_BANLISTFULL,
            481 => Response::ERR_NOPRIVILEGES,
            482 => Response::ERR_CHANOPRIVSNEEDED,
            491 => Response::ERR_NOOPERHOST,
            501 => Response::ERR_UMODEUNKNOWNFLAG,
            502 => Response::ERR_USERSDONTMATCH,
            _ => return None,
        })
    }

    /// The symbolic name, e.g. `"RPL_WELCOME"`.
    ///
    /// This is what the dispatcher matches on after numeric translation.
    pub fn name(&self) -> &'static str {
        match self {
            Response::RPL_WELCOME => "RPL_WELCOME",
            Response::RPL_YOURHOST => "RPL_YOURHOST",
            Response::RPL_CREATED => "RPL_CREATED",
            Response::RPL_MYINFO => "RPL_MYINFO",
            Response::RPL_ISUPPORT => "RPL_ISUPPORT",
            Response::RPL_BOUNCE => "RPL_BOUNCE",
            Response::RPL_UMODEIS => "RPL_UMODEIS",
            Response::RPL_LUSERCLIENT => "RPL_LUSERCLIENT",
            Response::RPL_LUSEROP => "RPL_LUSEROP",
            Response::RPL_LUSERUNKNOWN => "RPL_LUSERUNKNOWN",
            Response::RPL_LUSERCHANNELS => "RPL_LUSERCHANNELS",
            Response::RPL_LUSERME => "RPL_LUSERME",
            Response::RPL_TRYAGAIN => "RPL_TRYAGAIN",
            Response::RPL_LOCALUSERS => "RPL_LOCALUSERS",
            Response::RPL_GLOBALUSERS => "RPL_GLOBALUSERS",
            Response::RPL_AWAY => "RPL_AWAY",
            Response::RPL_USERHOST => "RPL_USERHOST",
            Response::RPL_ISON => "RPL_ISON",
            Response::RPL_UNAWAY => "RPL_UNAWAY",
            Response::RPL_NOWAWAY => "RPL_NOWAWAY",
            Response::RPL_WHOISUSER => "RPL_WHOISUSER",
            Response::RPL_WHOISSERVER => "RPL_WHOISSERVER",
            Response::RPL_WHOISOPERATOR => "RPL_WHOISOPERATOR",
            Response::RPL_WHOWASUSER => "RPL_WHOWASUSER",
            Response::RPL_ENDOFWHO => "RPL_ENDOFWHO",
            Response::RPL_WHOISIDLE => "RPL_WHOISIDLE",
            Response::RPL_ENDOFWHOIS => "RPL_ENDOFWHOIS",
            Response::RPL_WHOISCHANNELS => "RPL_WHOISCHANNELS",
            Response::RPL_LISTSTART => "RPL_LISTSTART",
            Response::RPL_LIST => "RPL_LIST",
            Response::RPL_LISTEND => "RPL_LISTEND",
            Response::RPL_CHANNELMODEIS => "RPL_CHANNELMODEIS",
            Response::RPL_CREATIONTIME => "RPL_CREATIONTIME",
            Response::RPL_NOTOPIC => "RPL_NOTOPIC",
            Response::RPL_TOPIC => "RPL_TOPIC",
            Response::RPL_TOPICWHOTIME => "RPL_TOPICWHOTIME",
            Response::RPL_INVITING => "RPL_INVITING",
            Response::RPL_INVITELIST => "RPL_INVITELIST",
            Response::RPL_ENDOFINVITELIST => "RPL_ENDOFINVITELIST",
            Response::RPL_EXCEPTLIST => "RPL_EXCEPTLIST",
            Response::RPL_ENDOFEXCEPTLIST => "RPL_ENDOFEXCEPTLIST",
            Response::RPL_WHOREPLY => "RPL_WHOREPLY",
            Response::RPL_NAMREPLY => "RPL_NAMREPLY",
            Response::RPL_ENDOFNAMES => "RPL_ENDOFNAMES",
            Response::RPL_BANLIST => "RPL_BANLIST",
            Response::RPL_ENDOFBANLIST => "RPL_ENDOFBANLIST",
            Response::RPL_ENDOFWHOWAS => "RPL_ENDOFWHOWAS",
            Response::RPL_MOTD => "RPL_MOTD",
            Response::RPL_MOTDSTART => "RPL_MOTDSTART",
            Response::RPL_ENDOFMOTD => "RPL_ENDOFMOTD",
            Response::RPL_YOUREOPER => "RPL_YOUREOPER",
            Response::ERR_NOSUCHNICK => "ERR_NOSUCHNICK",
            Response::ERR_NOSUCHSERVER => "ERR_NOSUCHSERVER",
            Response::ERR_NOSUCHCHANNEL => "ERR_NOSUCHCHANNEL",
            Response::ERR_CANNOTSENDTOCHAN => "ERR_CANNOTSENDTOCHAN",
            Response::ERR_TOOMANYCHANNELS => "ERR_TOOMANYCHANNELS",
            Response::ERR_WASNOSUCHNICK => "ERR_WASNOSUCHNICK",
            Response::ERR_TOOMANYTARGETS => "ERR_TOOMANYTARGETS",
            Response::ERR_NOORIGIN => "ERR_NOORIGIN",
            Response::ERR_NORECIPIENT => "ERR_NORECIPIENT",
            Response::ERR_NOTEXTTOSEND => "ERR_NOTEXTTOSEND",
            Response::ERR_UNKNOWNCOMMAND => "ERR_UNKNOWNCOMMAND",
            Response::ERR_NOMOTD => "ERR_NOMOTD",
            Response::ERR_NONICKNAMEGIVEN => "ERR_NONICKNAMEGIVEN",
            Response::ERR_ERRONEUSNICKNAME => "ERR_ERRONEUSNICKNAME",
            Response::ERR_NICKNAMEINUSE => "ERR_NICKNAMEINUSE",
            Response::ERR_NICKCOLLISION => "ERR_NICKCOLLISION",
            Response::ERR_UNAVAILRESOURCE => "ERR_UNAVAILRESOURCE",
            Response::ERR_USERNOTINCHANNEL => "ERR_USERNOTINCHANNEL",
            Response::ERR_NOTONCHANNEL => "ERR_NOTONCHANNEL",
            Response::ERR_USERONCHANNEL => "ERR_USERONCHANNEL",
            Response::ERR_NOTREGISTERED => "ERR_NOTREGISTERED",
            Response::ERR_NEEDMOREPARAMS => "ERR_NEEDMOREPARAMS",
            Response::ERR_ALREADYREGISTERED => "ERR_ALREADYREGISTERED",
            Response::ERR_PASSWDMISMATCH => "ERR_PASSWDMISMATCH",
            Response::ERR_YOUREBANNEDCREEP => "ERR_YOUREBANNEDCREEP",
            Response::ERR_KEYSET => "ERR_KEYSET",
            Response::ERR_CHANNELISFULL => "ERR_CHANNELISFULL",
            Response::ERR_UNKNOWNMODE => "ERR_UNKNOWNMODE",
            Response::ERR_INVITEONLYCHAN => "ERR_INVITEONLYCHAN",
            Response::ERR_BANNEDFROMCHAN => "ERR_BANNEDFROMCHAN",
            Response::ERR_BADCHANNELKEY => "ERR_BADCHANNELKEY",
            Response::ERR_BADCHANMASK => "ERR_BADCHANMASK",
            Response::ERR_BANLISTFULL => "ERR_BANLISTFULL",
            Response::ERR_NOPRIVILEGES => "ERR_NOPRIVILEGES",
            Response::ERR_CHANOPRIVSNEEDED => "ERR_CHANOPRIVSNEEDED",
            Response::ERR_NOOPERHOST => "ERR_NOOPERHOST",
            Response::ERR_UMODEUNKNOWNFLAG => "ERR_UMODEUNKNOWNFLAG",
            Response::ERR_USERSDONTMATCH => "ERR_USERSDONTMATCH",
        }
    }

    /// Check if this is an error response (4xx/5xx).
    #[inline]
    pub fn is_error(&self) -> bool {
        (400..600).contains(&self.code())
    }
}

impl FromStr for Response {
    type Err = ParseResponseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code: u16 = s.parse().map_err(|_| ParseResponseError::InvalidFormat)?;
        Response::from_code(code).ok_or(ParseResponseError::UnknownCode(code))
    }
}

impl std::fmt::Display for Response {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:03}", self.code())
    }
}

/// Error when parsing a response code.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ParseResponseError {
    /// The string was not a valid number.
    InvalidFormat,
    /// The numeric code is not a known response.
    UnknownCode(u16),
}

impl std::fmt::Display for ParseResponseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidFormat => write!(f, "invalid response code format"),
            Self::UnknownCode(code) => write!(f, "unknown response code: {}", code),
        }
    }
}

impl std::error::Error for ParseResponseError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_code() {
        assert_eq!(Response::RPL_WELCOME.code(), 1);
        assert_eq!(Response::ERR_NICKNAMEINUSE.code(), 433);
        assert_eq!(Response::RPL_ENDOFMOTD.code(), 376);
    }

    #[test]
    fn test_from_code() {
        assert_eq!(Response::from_code(1), Some(Response::RPL_WELCOME),);
        assert_eq!(Response::from_code(433), Some(Response::ERR_NICKNAMEINUSE));
        assert_eq!(Response::from_code(9999), None);
    }

    #[test]
    fn test_name() {
        assert_eq!(Response::RPL_ISUPPORT.name(), "RPL_ISUPPORT");
        assert_eq!(Response::ERR_PASSWDMISMATCH.name(), "ERR_PASSWDMISMATCH");
    }

    #[test]
    fn test_parse() {
        assert_eq!("001".parse::<Response>().unwrap(), Response::RPL_WELCOME);
        assert_eq!(
            "433".parse::<Response>().unwrap(),
            Response::ERR_NICKNAMEINUSE
        );
        assert!("abc".parse::<Response>().is_err());
        assert_eq!(
            "999".parse::<Response>(),
            Err(ParseResponseError::UnknownCode(999))
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Response::RPL_WELCOME), "001");
        assert_eq!(format!("{}", Response::ERR_NICKNAMEINUSE), "433");
    }

    #[test]
    fn test_is_error() {
        assert!(!Response::RPL_WELCOME.is_error());
        assert!(Response::ERR_NICKNAMEINUSE.is_error());
    }
}
