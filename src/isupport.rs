//! ISUPPORT (numeric 005) feature tracking.
//!
//! Servers advertise their capabilities and limits in `RPL_ISUPPORT`
//! bursts. The [`Features`] store parses those tokens into typed values,
//! keeps them current across bursts, and answers the queries the rest of
//! the engine depends on, most importantly the `PREFIX`/`CHANMODES`
//! data that drives correct MODE parsing.
//!
//! Specifics were gleaned from `draft-brocklesby-irc-isupport-03`.

use std::collections::HashMap;

use tracing::warn;

use crate::error::IsupportError;

/// Channel prefixes used to seed `CHANLIMIT` from a legacy `MAXCHANNELS`.
const LEGACY_CHANNEL_PREFIXES: [&str; 3] = ["#", "+", "&"];

/// One entry of the `PREFIX` mapping: a status mode, its sigil and its
/// rank (0 is the most privileged).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PrefixEntry {
    /// Mode letter, e.g. `o`.
    pub mode: char,
    /// Status sigil, e.g. `@`.
    pub symbol: char,
    /// Privilege rank; lower is more privileged.
    pub priority: usize,
}

/// Parsed `PREFIX=(modes)symbols` mapping, in advertised order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PrefixMap {
    entries: Vec<PrefixEntry>,
}

impl PrefixMap {
    /// Parse `(modes)symbols`. The i-th symbol pairs with the i-th mode.
    fn parse(value: &str) -> Result<Option<PrefixMap>, ()> {
        if value.is_empty() {
            return Ok(None);
        }
        if !value.starts_with('(') {
            return Err(());
        }
        let close = value.find(')').ok_or(())?;
        let modes = &value[1..close];
        let symbols = &value[close + 1..];

        let entries = modes
            .chars()
            .zip(symbols.chars())
            .enumerate()
            .map(|(priority, (mode, symbol))| PrefixEntry {
                mode,
                symbol,
                priority,
            })
            .collect();
        Ok(Some(PrefixMap { entries }))
    }

    /// All status mode letters, in advertised order.
    pub fn modes(&self) -> String {
        self.entries.iter().map(|e| e.mode).collect()
    }

    /// All status sigils, in advertised order.
    pub fn symbols(&self) -> String {
        self.entries.iter().map(|e| e.symbol).collect()
    }

    /// Sigil and rank for a status mode letter.
    pub fn get(&self, mode: char) -> Option<(char, usize)> {
        self.entries
            .iter()
            .find(|e| e.mode == mode)
            .map(|e| (e.symbol, e.priority))
    }

    /// Iterate the entries in advertised order.
    pub fn iter(&self) -> impl Iterator<Item = &PrefixEntry> {
        self.entries.iter()
    }
}

/// The four `CHANMODES` categories.
///
/// * `address_modes`: list modes, always with a parameter (bans etc.)
/// * `param`: setting modes that always take a parameter
/// * `set_param`: setting modes with a parameter only when set
/// * `no_param`: setting modes that never take a parameter
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChanModes {
    /// Modes that add or remove an address to or from a list.
    pub address_modes: String,
    /// Modes that always take a parameter.
    pub param: String,
    /// Modes that take a parameter only when being set.
    pub set_param: String,
    /// Modes that never take a parameter.
    pub no_param: String,
}

impl ChanModes {
    fn parse(groups: &[String]) -> Result<ChanModes, ()> {
        if groups.len() > 4 {
            return Err(());
        }
        let group = |idx: usize| groups.get(idx).cloned().unwrap_or_default();
        Ok(ChanModes {
            address_modes: group(0),
            param: group(1),
            set_param: group(2),
            no_param: group(3),
        })
    }
}

/// A typed ISUPPORT feature value.
///
/// A feature absent from the store is *unsupported*; presence with an
/// empty or zero value still counts as supported.
#[derive(Clone, Debug, PartialEq)]
#[non_exhaustive]
pub enum Feature {
    /// Numeric limit, e.g. `NICKLEN=9`.
    Int(u32),
    /// Single mode character, e.g. `EXCEPTS=e`.
    Char(char),
    /// Free-text value, e.g. `NETWORK=ExampleNet`.
    Text(String),
    /// Presence-only flag, e.g. `SAFELIST`.
    Flag,
    /// The `PREFIX` status-mode mapping.
    Prefix(PrefixMap),
    /// The `CHANMODES` category split.
    ChanModes(ChanModes),
    /// Channel-type prefixes, e.g. `CHANTYPES=#&`.
    ChanTypes(String),
    /// `key:int` pairs, e.g. `CHANLIMIT=#:25` or `TARGMAX=PRIVMSG:4`.
    Pairs(Vec<(String, Option<u32>)>),
    /// `key:value` string pairs, e.g. `IDCHAN=!:5`.
    StrPairs(Vec<(String, String)>),
    /// Unknown feature, raw arguments as advertised.
    Raw(Vec<String>),
}

impl Feature {
    /// The numeric value, when this is an [`Feature::Int`].
    pub fn as_int(&self) -> Option<u32> {
        match self {
            Feature::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// The text value, when this is a [`Feature::Text`].
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Feature::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// The server-supported feature store.
///
/// Feature names match the ISUPPORT draft identically. The store starts
/// from conservative RFC 1459 defaults so that MODE parsing works even
/// against servers that never send a 005.
#[derive(Clone, Debug, PartialEq)]
pub struct Features {
    features: HashMap<String, Feature>,
}

impl Default for Features {
    fn default() -> Self {
        let mut features = HashMap::new();
        features.insert("CHANNELLEN".to_string(), Feature::Int(200));
        features.insert("CHANTYPES".to_string(), Feature::ChanTypes("#&".to_string()));
        features.insert("MODES".to_string(), Feature::Int(3));
        features.insert("NICKLEN".to_string(), Feature::Int(9));
        if let Ok(Some(prefix)) = PrefixMap::parse("(ovh)@+%") {
            features.insert("PREFIX".to_string(), Feature::Prefix(prefix));
        }
        // The draft has no default for CHANMODES, but MODE parameter
        // association needs one before the 005 burst lands.
        features.insert(
            "CHANMODES".to_string(),
            Feature::ChanModes(ChanModes {
                address_modes: "b".to_string(),
                param: String::new(),
                set_param: "lk".to_string(),
                no_param: String::new(),
            }),
        );
        Features { features }
    }
}

impl Features {
    /// A store holding only the defaults.
    pub fn new() -> Features {
        Features::default()
    }

    /// Get a feature's value; `None` means unsupported.
    pub fn get(&self, feature: &str) -> Option<&Feature> {
        self.features.get(&feature.to_ascii_uppercase())
    }

    /// Whether the server supports a feature at all.
    pub fn has(&self, feature: &str) -> bool {
        self.get(feature).is_some()
    }

    /// A clone of the current feature map, for event payloads.
    pub fn snapshot(&self) -> HashMap<String, Feature> {
        self.features.clone()
    }

    /// The advertised `PREFIX` mapping, if any.
    pub fn prefix(&self) -> Option<&PrefixMap> {
        match self.get("PREFIX") {
            Some(Feature::Prefix(map)) => Some(map),
            _ => None,
        }
    }

    /// The advertised `CHANMODES` categories, if any.
    pub fn chanmodes(&self) -> Option<&ChanModes> {
        match self.get("CHANMODES") {
            Some(Feature::ChanModes(modes)) => Some(modes),
            _ => None,
        }
    }

    /// Valid channel-type prefixes.
    pub fn chantypes(&self) -> &str {
        match self.get("CHANTYPES") {
            Some(Feature::ChanTypes(types)) => types,
            _ => "#&",
        }
    }

    /// Parse a burst of ISUPPORT tokens, mutating the store.
    ///
    /// Several 005 lines may arrive in any order; each call folds its
    /// tokens in. A `-KEY` token removes the feature. An invalid `\xHH`
    /// escape aborts the call; tokens already processed stay applied.
    pub fn parse_tokens<'a, I>(&mut self, tokens: I) -> Result<(), IsupportError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        for token in tokens {
            if token.is_empty() {
                continue;
            }
            if let Some(removed) = token.strip_prefix('-') {
                self.features.remove(&removed.to_ascii_uppercase());
                continue;
            }
            let (key, value) = match token.split_once('=') {
                Some((key, value)) => (key, value),
                None => (token, ""),
            };
            let args = value
                .split(',')
                .map(unescape_value)
                .collect::<Result<Vec<_>, _>>()?;
            self.apply(&key.to_ascii_uppercase(), args);
        }
        Ok(())
    }

    /// Reduce one `KEY args` token into its typed value.
    fn apply(&mut self, key: &str, args: Vec<String>) {
        let first = args.first().map(String::as_str).unwrap_or("");
        let value = match key {
            "PREFIX" => match PrefixMap::parse(first) {
                Ok(Some(map)) => Some(Feature::Prefix(map)),
                Ok(None) => None,
                Err(()) => {
                    warn!(value = first, "malformed PREFIX parameter");
                    self.features.get(key).cloned()
                }
            },
            "CHANMODES" => match ChanModes::parse(&args) {
                Ok(modes) => Some(Feature::ChanModes(modes)),
                Err(()) => {
                    warn!(groups = args.len(), "too many CHANMODES groups");
                    self.features.get(key).cloned()
                }
            },
            "CHANLIMIT" => {
                let pairs = int_pairs(&args);
                if !self.features.contains_key("MAXCHANNELS") {
                    if let Some(limit) = pairs.iter().find_map(|(_, n)| *n) {
                        self.features
                            .insert("MAXCHANNELS".to_string(), Feature::Int(limit));
                    }
                }
                Some(Feature::Pairs(pairs))
            }
            "MAXCHANNELS" => match first.parse::<u32>() {
                Ok(limit) => {
                    if !self.features.contains_key("CHANLIMIT") {
                        let seeded = LEGACY_CHANNEL_PREFIXES
                            .iter()
                            .map(|prefix| (prefix.to_string(), Some(limit)))
                            .collect();
                        self.features
                            .insert("CHANLIMIT".to_string(), Feature::Pairs(seeded));
                    }
                    Some(Feature::Int(limit))
                }
                Err(_) => self.features.get(key).cloned(),
            },
            "NICKLEN" | "CHANNELLEN" | "KICKLEN" | "TOPICLEN" | "MODES" => {
                match first.parse::<u32>() {
                    Ok(n) => Some(Feature::Int(n)),
                    Err(_) => self.features.get(key).cloned(),
                }
            }
            "CHANTYPES" => Some(Feature::ChanTypes(first.to_string())),
            "EXCEPTS" => Some(Feature::Char(first.chars().next().unwrap_or('e'))),
            "INVEX" => Some(Feature::Char(first.chars().next().unwrap_or('I'))),
            "NETWORK" | "STATUSMSG" => Some(Feature::Text(first.to_string())),
            "IDCHAN" => Some(Feature::StrPairs(str_pairs(&args))),
            "MAXLIST" | "TARGMAX" => Some(Feature::Pairs(int_pairs(&args))),
            "SAFELIST" => Some(Feature::Flag),
            _ => Some(Feature::Raw(args)),
        };

        match value {
            Some(value) => {
                self.features.insert(key.to_string(), value);
            }
            None => {
                self.features.remove(key);
            }
        }
    }
}

/// Split `K:V` arguments with integer values; a missing or unparseable
/// value becomes `None`.
fn int_pairs(args: &[String]) -> Vec<(String, Option<u32>)> {
    args.iter()
        .filter(|arg| !arg.is_empty())
        .map(|arg| {
            let (key, value) = arg.split_once(':').unwrap_or((arg.as_str(), ""));
            (key.to_string(), value.parse::<u32>().ok())
        })
        .collect()
}

/// Split `K:V` arguments, keeping values as strings.
fn str_pairs(args: &[String]) -> Vec<(String, String)> {
    args.iter()
        .filter(|arg| !arg.is_empty())
        .map(|arg| {
            let (key, value) = arg.split_once(':').unwrap_or((arg.as_str(), ""));
            (key.to_string(), value.to_string())
        })
        .collect()
}

/// Un-escape an ISUPPORT value. The only supported escape is `\xHH`,
/// where HH must be a valid 2-digit hexadecimal number.
fn unescape_value(value: &str) -> Result<String, IsupportError> {
    if !value.contains("\\x") {
        return Ok(value.to_string());
    }
    let mut parts = value.split("\\x");
    let mut out = parts.next().unwrap_or("").to_string();
    for part in parts {
        if part.len() < 2 || !part.is_char_boundary(2) {
            return Err(IsupportError::InvalidHexOctet {
                octet: part.to_string(),
            });
        }
        let (octet, rest) = part.split_at(2);
        let byte = u8::from_str_radix(octet, 16).map_err(|_| {
            IsupportError::InvalidHexOctet {
                octet: octet.to_string(),
            }
        })?;
        out.push(char::from(byte));
        out.push_str(rest);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(tokens: &[&str]) -> Features {
        let mut features = Features::new();
        features.parse_tokens(tokens.iter().copied()).unwrap();
        features
    }

    #[test]
    fn test_defaults() {
        let features = Features::new();
        assert_eq!(features.get("NICKLEN"), Some(&Feature::Int(9)));
        assert_eq!(features.get("CHANNELLEN"), Some(&Feature::Int(200)));
        assert_eq!(features.get("MODES"), Some(&Feature::Int(3)));
        assert_eq!(features.chantypes(), "#&");
        let prefix = features.prefix().unwrap();
        assert_eq!(prefix.get('o'), Some(('@', 0)));
        assert_eq!(prefix.get('v'), Some(('+', 1)));
        assert_eq!(prefix.get('h'), Some(('%', 2)));
        let chanmodes = features.chanmodes().unwrap();
        assert_eq!(chanmodes.address_modes, "b");
        assert_eq!(chanmodes.set_param, "lk");
    }

    #[test]
    fn test_parse_prefix() {
        let features = parsed(&["PREFIX=(ov)@+"]);
        let prefix = features.prefix().unwrap();
        assert_eq!(prefix.get('o'), Some(('@', 0)));
        assert_eq!(prefix.get('v'), Some(('+', 1)));
        assert_eq!(prefix.get('h'), None);
        assert_eq!(prefix.modes(), "ov");
        assert_eq!(prefix.symbols(), "@+");
    }

    #[test]
    fn test_malformed_prefix_keeps_previous() {
        let features = parsed(&["PREFIX=broken"]);
        let prefix = features.prefix().unwrap();
        assert_eq!(prefix.modes(), "ovh");
    }

    #[test]
    fn test_parse_chanmodes() {
        let features = parsed(&["CHANMODES=b,,lk,"]);
        let chanmodes = features.chanmodes().unwrap();
        assert_eq!(chanmodes.address_modes, "b");
        assert_eq!(chanmodes.param, "");
        assert_eq!(chanmodes.set_param, "lk");
        assert_eq!(chanmodes.no_param, "");
    }

    #[test]
    fn test_excess_chanmodes_groups_keep_previous() {
        let features = parsed(&["CHANMODES=a,b,c,d,e"]);
        let chanmodes = features.chanmodes().unwrap();
        assert_eq!(chanmodes.address_modes, "b");
    }

    #[test]
    fn test_maxchannels_seeds_chanlimit() {
        let features = parsed(&["MAXCHANNELS=5"]);
        assert_eq!(features.get("MAXCHANNELS"), Some(&Feature::Int(5)));
        assert_eq!(
            features.get("CHANLIMIT"),
            Some(&Feature::Pairs(vec![
                ("#".to_string(), Some(5)),
                ("+".to_string(), Some(5)),
                ("&".to_string(), Some(5)),
            ]))
        );
    }

    #[test]
    fn test_chanlimit_seeds_maxchannels() {
        let features = parsed(&["CHANLIMIT=#:25,&:10"]);
        assert_eq!(
            features.get("CHANLIMIT"),
            Some(&Feature::Pairs(vec![
                ("#".to_string(), Some(25)),
                ("&".to_string(), Some(10)),
            ]))
        );
        assert_eq!(features.get("MAXCHANNELS"), Some(&Feature::Int(25)));
    }

    #[test]
    fn test_existing_chanlimit_not_overwritten_by_maxchannels() {
        let features = parsed(&["CHANLIMIT=#:25", "MAXCHANNELS=5"]);
        assert_eq!(
            features.get("CHANLIMIT"),
            Some(&Feature::Pairs(vec![("#".to_string(), Some(25))]))
        );
    }

    #[test]
    fn test_removal() {
        let features = parsed(&["-NICKLEN"]);
        assert!(!features.has("NICKLEN"));
    }

    #[test]
    fn test_unknown_feature_stored_raw() {
        let features = parsed(&["WATCH=128", "MONITOR"]);
        assert_eq!(
            features.get("WATCH"),
            Some(&Feature::Raw(vec!["128".to_string()]))
        );
        assert_eq!(
            features.get("MONITOR"),
            Some(&Feature::Raw(vec![String::new()]))
        );
    }

    #[test]
    fn test_excepts_invex_defaults() {
        let features = parsed(&["EXCEPTS", "INVEX"]);
        assert_eq!(features.get("EXCEPTS"), Some(&Feature::Char('e')));
        assert_eq!(features.get("INVEX"), Some(&Feature::Char('I')));

        let features = parsed(&["EXCEPTS=X"]);
        assert_eq!(features.get("EXCEPTS"), Some(&Feature::Char('X')));
    }

    #[test]
    fn test_network_and_safelist() {
        let features = parsed(&["NETWORK=ExampleNet", "SAFELIST"]);
        assert_eq!(
            features.get("NETWORK"),
            Some(&Feature::Text("ExampleNet".to_string()))
        );
        assert_eq!(features.get("SAFELIST"), Some(&Feature::Flag));
    }

    #[test]
    fn test_targmax_pairs() {
        let features = parsed(&["TARGMAX=PRIVMSG:4,NOTICE:3,JOIN:"]);
        assert_eq!(
            features.get("TARGMAX"),
            Some(&Feature::Pairs(vec![
                ("PRIVMSG".to_string(), Some(4)),
                ("NOTICE".to_string(), Some(3)),
                ("JOIN".to_string(), None),
            ]))
        );
    }

    #[test]
    fn test_idchan_pairs() {
        let features = parsed(&["IDCHAN=!:5"]);
        assert_eq!(
            features.get("IDCHAN"),
            Some(&Feature::StrPairs(vec![(
                "!".to_string(),
                "5".to_string()
            )]))
        );
    }

    #[test]
    fn test_int_fallback_keeps_previous() {
        let features = parsed(&["NICKLEN=bogus"]);
        assert_eq!(features.get("NICKLEN"), Some(&Feature::Int(9)));
    }

    #[test]
    fn test_hex_escape() {
        let features = parsed(&["NETWORK=Some\\x20Net"]);
        assert_eq!(
            features.get("NETWORK"),
            Some(&Feature::Text("Some Net".to_string()))
        );
    }

    #[test]
    fn test_invalid_hex_escape_is_hard_error() {
        let mut features = Features::new();
        let err = features.parse_tokens(["NETWORK=\\xZZ"]).unwrap_err();
        assert!(matches!(err, IsupportError::InvalidHexOctet { .. }));
    }

    #[test]
    fn test_case_insensitive_query() {
        let features = parsed(&["NETWORK=Net"]);
        assert!(features.has("network"));
    }
}
