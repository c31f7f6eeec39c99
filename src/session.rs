//! The IRC session: protocol state machine, dispatcher and CTCP handling.
//!
//! A [`Session`] sits between a transport and application code. The
//! transport feeds it raw bytes ([`Session::feed`]) and lifecycle events
//! ([`Session::connected`], [`Session::transport_closed`],
//! [`Session::transport_error`]); the session frames and decodes lines,
//! runs one handler per command, and publishes semantic [`Event`]s on its
//! [`SignalBus`]. Outbound traffic leaves through an [`Outbound`] channel
//! of CRLF-terminated lines.
//!
//! The session owns the ISUPPORT store, the registration handshake
//! state, the MOTD buffer and the CTCP ping ledger; only the dispatcher
//! mutates them. Receivers observe snapshots carried in event payloads.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use bytes::BytesMut;
use encoding::Encoding;
use tokio::sync::mpsc;
use tokio_util::codec::Decoder;
use tracing::{debug, error, info, warn};

use crate::casemap::irc_eq;
use crate::ctcp;
use crate::event::Event;
use crate::isupport::Features;
use crate::mode::parse_modes;
use crate::prefix::User;
use crate::signal::{EmitterId, SignalBus};
use crate::wire::{LineDecoder, Message};

/// Capacity of the CTCP ping ledger; oldest entries are evicted beyond it.
pub const MAX_PINGRING: usize = 12;

static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);

/// What the session hands to the transport.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outbound {
    /// A complete CRLF-terminated line to write.
    Line(Vec<u8>),
    /// Close the connection once pending writes are flushed.
    Disconnect,
}

/// Static configuration for a session.
#[derive(Clone, Debug)]
pub struct SessionConfig {
    /// Nickname to register with.
    pub nickname: String,
    /// Ident/username; defaults to the nickname.
    pub username: Option<String>,
    /// Real name (GECOS field).
    pub realname: String,
    /// Server password, sent as `PASS` before registration.
    pub password: Option<String>,
    /// Negotiated text encoding for outbound lines.
    pub encoding: &'static Encoding,
    /// Pause between `PASS`/`NICK`/`USER` during registration. Some
    /// servers race the welcome; this is policy, not protocol, and
    /// defaults to zero.
    pub register_throttle: Duration,
    /// CTCP VERSION reply: client name. No name, no reply.
    pub version_name: Option<String>,
    /// CTCP VERSION reply: client version.
    pub version_num: Option<String>,
    /// CTCP VERSION reply: environment.
    pub version_env: Option<String>,
    /// CTCP SOURCE reply URL. Absent means no reply.
    pub source_url: Option<String>,
    /// CTCP USERINFO reply. Absent means no reply.
    pub userinfo: Option<String>,
}

impl SessionConfig {
    /// Configuration with the given nickname and library defaults.
    pub fn new(nickname: impl Into<String>) -> SessionConfig {
        let nickname = nickname.into();
        SessionConfig {
            realname: nickname.clone(),
            nickname,
            username: None,
            password: None,
            encoding: encoding::UTF_8,
            register_throttle: Duration::ZERO,
            version_name: None,
            version_num: None,
            version_env: None,
            source_url: None,
            userinfo: None,
        }
    }
}

/// Mutable session state, only touched by the dispatcher.
struct SessionState {
    attempted_nick: String,
    current_nick: String,
    registered: bool,
    supported: Features,
    motd: Option<Vec<String>>,
    pings: HashMap<(String, String), PingEntry>,
    ping_seq: u64,
    isupport_pending: bool,
    isupport_emitted: bool,
    buffer: BytesMut,
    framer: LineDecoder,
}

/// A pending CTCP PING: when it left, and in what order.
#[derive(Clone, Copy, Debug)]
struct PingEntry {
    started: Instant,
    seq: u64,
}

/// One IRC connection's worth of protocol state.
pub struct Session {
    id: EmitterId,
    config: SessionConfig,
    bus: Arc<SignalBus>,
    outbound: mpsc::UnboundedSender<Outbound>,
    processing: AtomicBool,
    state: Mutex<SessionState>,
}

impl Session {
    /// Create a session that publishes on `bus` and writes to `outbound`.
    pub fn new(
        config: SessionConfig,
        bus: Arc<SignalBus>,
        outbound: mpsc::UnboundedSender<Outbound>,
    ) -> Session {
        let state = SessionState {
            attempted_nick: config.nickname.clone(),
            current_nick: config.nickname.clone(),
            registered: false,
            supported: Features::new(),
            motd: None,
            pings: HashMap::new(),
            ping_seq: 0,
            isupport_pending: false,
            isupport_emitted: false,
            buffer: BytesMut::new(),
            framer: LineDecoder::new(),
        };
        Session {
            id: NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed),
            config,
            bus,
            outbound,
            processing: AtomicBool::new(false),
            state: Mutex::new(state),
        }
    }

    /// The id carried as the sender of every event this session emits.
    pub fn id(&self) -> EmitterId {
        self.id
    }

    /// The bus this session publishes on.
    pub fn bus(&self) -> &Arc<SignalBus> {
        &self.bus
    }

    /// The session configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Whether the session is live (between `connected` and teardown).
    pub fn processing(&self) -> bool {
        self.processing.load(Ordering::SeqCst)
    }

    /// The nick the server currently knows us by.
    pub fn current_nick(&self) -> String {
        self.lock_state().current_nick.clone()
    }

    /// The nick we most recently asked for.
    pub fn attempted_nick(&self) -> String {
        self.lock_state().attempted_nick.clone()
    }

    /// Whether the registration handshake has completed.
    pub fn registered(&self) -> bool {
        self.lock_state().registered
    }

    /// A snapshot of the server-supported features.
    pub fn features(&self) -> Features {
        self.lock_state().supported.clone()
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, SessionState> {
        self.state.lock().expect("session state poisoned")
    }

    pub(crate) async fn emit(&self, event: Event) {
        let signal = self.bus.signal(event.signal_name());
        signal.send(self.id, event).await;
    }

    /// Encode and enqueue one outbound line.
    ///
    /// Silently dropped (after a log line) while the session is not
    /// processing, including writes racing a torn-down transport.
    pub fn send_line(&self, line: &str) {
        if !self.processing() {
            info!("not processing, so not sending any data");
            return;
        }
        debug!(line, "writing line");
        let bytes = crate::wire::encode_line(self.config.encoding, line);
        if self.outbound.send(Outbound::Line(bytes)).is_err() {
            warn!("transport gone, dropping outbound line");
        }
    }

    pub(crate) fn record_attempted_nick(&self, nickname: &str) {
        self.lock_state().attempted_nick = nickname.to_string();
    }

    pub(crate) fn record_ping(&self, nick: &str, key: &str) {
        let mut state = self.lock_state();
        let seq = state.ping_seq;
        state.ping_seq += 1;
        state.pings.insert(
            (nick.to_string(), key.to_string()),
            PingEntry {
                started: Instant::now(),
                seq,
            },
        );
        if state.pings.len() > MAX_PINGRING {
            let excess = state.pings.len() - MAX_PINGRING;
            let mut by_age: Vec<((String, String), PingEntry)> = state
                .pings
                .iter()
                .map(|(k, v)| (k.clone(), *v))
                .collect();
            by_age.sort_by_key(|(_, entry)| (entry.started, entry.seq));
            for (key, _) in by_age.into_iter().take(excess) {
                state.pings.remove(&key);
            }
        }
    }

    // ---- Transport lifecycle -------------------------------------------

    /// The transport came up: start processing and run registration.
    pub async fn connected(&self) {
        self.processing.store(true, Ordering::SeqCst);
        self.emit(Event::Connected).await;
        let nickname = self.config.nickname.clone();
        self.register(&nickname, "foo", "bar").await;
    }

    /// The transport hit a fatal error.
    pub async fn transport_error(&self, error: &str) {
        error!(error, "transport error");
        self.teardown().await;
    }

    /// The transport closed.
    pub async fn transport_closed(&self) {
        self.teardown().await;
    }

    /// A connection attempt never came up (resolve/connect/timeout).
    pub async fn connect_failed(&self) {
        self.emit(Event::Disconnected).await;
    }

    /// Clean two-step disconnect: QUIT, then close the transport.
    pub async fn disconnect(&self) {
        if !self.processing() {
            debug!("not processing, disconnect is a no-op");
            return;
        }
        self.quit("Quiting...").await;
        self.processing.store(false, Ordering::SeqCst);
        let _ = self.outbound.send(Outbound::Disconnect);
        self.emit(Event::Disconnected).await;
    }

    async fn teardown(&self) {
        if self.processing.swap(false, Ordering::SeqCst) {
            self.emit(Event::Disconnected).await;
        }
    }

    // ---- Inbound path --------------------------------------------------

    /// Feed raw bytes from the transport.
    ///
    /// Complete lines are decoded and dispatched in arrival order; a
    /// malformed line is logged and dropped without tearing anything
    /// down; the trailing fragment waits for more bytes.
    pub async fn feed(&self, chunk: &[u8]) {
        self.lock_state().buffer.extend_from_slice(chunk);
        loop {
            let decoded = {
                let mut state = self.lock_state();
                let SessionState { framer, buffer, .. } = &mut *state;
                framer.decode(buffer)
            };
            match decoded {
                Ok(Some(message)) => self.dispatch(message).await,
                Ok(None) => break,
                Err(err) => {
                    warn!(%err, "dropping malformed line");
                    continue;
                }
            }
        }
    }

    /// Dispatch one decoded message to its handler.
    async fn dispatch(&self, message: Message) {
        // End of the ISUPPORT burst: the first command that is not a 005
        // releases the latch, and the snapshot event strictly precedes
        // the triggering command's own events.
        if message.command != "RPL_ISUPPORT" {
            let options = {
                let mut state = self.lock_state();
                if state.isupport_pending {
                    state.isupport_pending = false;
                    state.isupport_emitted = true;
                    Some(state.supported.snapshot())
                } else {
                    None
                }
            };
            if let Some(options) = options {
                self.emit(Event::RplIsupport { options }).await;
            }
        }

        let prefix = message.prefix.as_deref().unwrap_or("");
        let params = &message.params;
        match message.command.as_str() {
            "PING" => self.handle_ping(params),
            "JOIN" => self.handle_join(prefix, params).await,
            "PART" => self.handle_part(prefix, params).await,
            "QUIT" => self.handle_quit(prefix, params).await,
            "NICK" => self.handle_nick(prefix, params).await,
            "KICK" => self.handle_kick(prefix, params).await,
            "MODE" => self.handle_mode(prefix, params).await,
            "PRIVMSG" => self.handle_privmsg(prefix, params).await,
            "NOTICE" => self.handle_notice(prefix, params).await,
            "TOPIC" => self.handle_topic(prefix, params).await,
            "ERROR" => self.handle_error(params).await,
            "RPL_WELCOME" => self.handle_rpl_welcome(params).await,
            "RPL_YOURHOST" => {
                self.emit(Event::RplYourhost {
                    info: param_text(params, 1),
                })
                .await
            }
            "RPL_CREATED" => {
                self.emit(Event::RplCreated {
                    when: param_text(params, 1),
                })
                .await
            }
            "RPL_MYINFO" => self.handle_rpl_myinfo(params).await,
            "RPL_BOUNCE" => {
                self.emit(Event::RplBounce {
                    info: param_text(params, 1),
                })
                .await
            }
            "RPL_ISUPPORT" => self.handle_rpl_isupport(params),
            "RPL_LUSERCLIENT" => {
                self.emit(Event::RplLuserclient {
                    info: param_text(params, 1),
                })
                .await
            }
            "RPL_LUSEROP" => {
                if let Ok(ops) = param_text(params, 1).parse() {
                    self.emit(Event::RplLuserop { ops }).await;
                }
            }
            "RPL_LUSERCHANNELS" => {
                if let Ok(channels) = param_text(params, 1).parse() {
                    self.emit(Event::RplLuserchannels { channels }).await;
                }
            }
            "RPL_LUSERME" => {
                self.emit(Event::RplLuserme {
                    info: param_text(params, 1),
                })
                .await
            }
            "RPL_TOPIC" => {
                self.emit(Event::RplTopic {
                    user: User::parse(prefix),
                    channel: param_text(params, 1),
                    topic: param_text(params, 2),
                })
                .await
            }
            "RPL_NOTOPIC" => {
                self.emit(Event::RplNotopic {
                    channel: param_text(params, 1),
                })
                .await
            }
            "RPL_MOTDSTART" => self.handle_rpl_motdstart(params),
            "RPL_MOTD" => self.handle_rpl_motd(params),
            "RPL_ENDOFMOTD" => self.handle_rpl_endofmotd().await,
            "RPL_NAMREPLY" => self.handle_rpl_namreply(params).await,
            "RPL_ENDOFNAMES" => {
                let channel = param_text(params, 1);
                debug!(%channel, "finished receiving channel users");
                self.emit(Event::RplEndofnames { channel }).await;
            }
            "RPL_LIST" => {
                self.emit(Event::RplList {
                    channel: param_text(params, 1),
                    count: param_text(params, 2).parse().unwrap_or(0),
                    topic: param_text(params, 3),
                })
                .await
            }
            "RPL_LISTEND" => self.emit(Event::RplListend).await,
            "ERR_NICKNAMEINUSE" => {
                let nickname = self.attempted_nick();
                warn!(%nickname, "nickname already in use");
                self.emit(Event::NicknameInUse { nickname }).await;
            }
            "ERR_ERRONEUSNICKNAME" => {
                let nickname = self.attempted_nick();
                warn!(%nickname, "nickname rejected as erroneous");
                self.emit(Event::ErroneousNickname { nickname }).await;
            }
            "ERR_PASSWDMISMATCH" => {
                error!("server rejected our password");
                self.emit(Event::PasswordMismatch).await;
            }
            "ERR_NOTREGISTERED" => {
                warn!(reply = %last_text(params), "not yet registered with the network");
            }
            "ERR_BANNEDFROMCHAN" => self.handle_err_bannedfromchan(params).await,
            command => self.handle_unknown(prefix, command, params),
        }
    }

    // ---- Command handlers ----------------------------------------------

    fn handle_ping(&self, params: &[Vec<u8>]) {
        self.send_line(&format!("PONG :{}", last_text(params)));
    }

    async fn handle_join(&self, prefix: &str, params: &[Vec<u8>]) {
        let user = User::parse(prefix);
        let channel = last_text(params);
        if user.nick == self.current_nick() {
            self.emit(Event::Joined { channel }).await;
        } else {
            self.emit(Event::UserJoined { channel, user }).await;
        }
    }

    async fn handle_part(&self, prefix: &str, params: &[Vec<u8>]) {
        let user = User::parse(prefix);
        let channel = param_text(params, 0);
        if user.nick == self.current_nick() {
            self.emit(Event::Left { channel }).await;
        } else {
            self.emit(Event::UserLeft { channel, user }).await;
        }
    }

    async fn handle_quit(&self, prefix: &str, params: &[Vec<u8>]) {
        self.emit(Event::UserQuit {
            user: User::parse(prefix),
            message: last_text(params),
        })
        .await;
    }

    async fn handle_nick(&self, prefix: &str, params: &[Vec<u8>]) {
        let user = User::parse(prefix);
        let newnick = param_text(params, 0);
        if user.nick == self.current_nick() {
            self.lock_state().current_nick = newnick.clone();
            self.emit(Event::NickChanged { user, newnick }).await;
        } else {
            self.emit(Event::UserRenamed { user, newnick }).await;
        }
    }

    async fn handle_kick(&self, prefix: &str, params: &[Vec<u8>]) {
        let kicker = User::parse(prefix);
        let channel = param_text(params, 0);
        let kicked = param_text(params, 1);
        let message = last_text(params);
        if irc_eq(&kicked, &self.current_nick()) {
            // Yikes!
            self.emit(Event::Kicked {
                channel,
                kicker,
                message,
            })
            .await;
        } else {
            self.emit(Event::UserKicked {
                channel,
                kicked,
                kicker,
                message,
            })
            .await;
        }
    }

    /// Parse a server MODE change, associating parameters per the
    /// ISUPPORT `PREFIX` and `CHANMODES` data.
    async fn handle_mode(&self, prefix: &str, params: &[Vec<u8>]) {
        let user = User::parse(prefix);
        let channel = param_text(params, 0);
        let mut modes = param_text(params, 1);
        let args = params.get(2..).unwrap_or(&[]).to_vec();

        if !modes.starts_with(['+', '-']) {
            modes.insert(0, '+');
        }

        // A mode change to our own user carries no parameters; a channel
        // mode change takes its parameter sets from the feature store.
        let (set_params, clear_params) = if channel == self.current_nick() {
            (String::new(), String::new())
        } else {
            let state = self.lock_state();
            let mut both = state
                .supported
                .prefix()
                .map(|prefix| prefix.modes())
                .unwrap_or_default();
            let mut on_set = String::new();
            if let Some(chanmodes) = state.supported.chanmodes() {
                both.push_str(&chanmodes.address_modes);
                both.push_str(&chanmodes.param);
                on_set.push_str(&chanmodes.set_param);
            }
            (format!("{both}{on_set}"), both)
        };

        let parsed = parse_modes(&modes, &args, (&set_params, &clear_params));
        let (added, removed) = match parsed {
            Ok(changes) => changes,
            Err(err) => {
                error!(%err, %modes, "failed to parse MODE message");
                return;
            }
        };

        if !added.is_empty() {
            let (letters, args) = unzip_changes(added);
            self.emit(Event::ModeChanged {
                user: user.clone(),
                channel: channel.clone(),
                set: true,
                modes: letters,
                args,
            })
            .await;
        }
        if !removed.is_empty() {
            let (letters, args) = unzip_changes(removed);
            self.emit(Event::ModeChanged {
                user,
                channel,
                set: false,
                modes: letters,
                args,
            })
            .await;
        }
    }

    async fn handle_privmsg(&self, prefix: &str, params: &[Vec<u8>]) {
        let user = User::parse(prefix);
        let channel = param_text(params, 0);
        let mut message = params.last().cloned().unwrap_or_default();

        if message.is_empty() {
            // Don't choke when someone sends us a blank message.
            return;
        }

        if message[0] == ctcp::X_DELIM {
            let extract = ctcp::ctcp_extract(&message);
            for (tag, data) in extract.extended {
                self.ctcp_query(&user, &channel, tag, data).await;
            }
            if extract.normal.is_empty() {
                return;
            }
            message = extract.normal.join(&b' ');
        }

        if channel == self.current_nick() {
            self.emit(Event::Privmsg { user, message }).await;
        } else {
            self.emit(Event::Chanmsg {
                channel,
                user,
                message,
            })
            .await;
        }
    }

    async fn handle_notice(&self, prefix: &str, params: &[Vec<u8>]) {
        let user = User::parse(prefix);
        let channel = param_text(params, 0);
        let mut message = params.last().cloned().unwrap_or_default();

        if !message.is_empty() && message[0] == ctcp::X_DELIM {
            let extract = ctcp::ctcp_extract(&message);
            for (tag, data) in extract.extended {
                self.ctcp_reply(&user, &channel, tag, data).await;
            }
            if extract.normal.is_empty() {
                return;
            }
            message = extract.normal.join(&b' ');
        }

        self.emit(Event::Notice {
            user,
            channel,
            message,
        })
        .await;
    }

    async fn handle_topic(&self, prefix: &str, params: &[Vec<u8>]) {
        self.emit(Event::TopicChanged {
            user: User::parse(prefix),
            channel: param_text(params, 0),
            topic: param_text(params, 1),
        })
        .await;
    }

    async fn handle_error(&self, params: &[Vec<u8>]) {
        let reason = param_text(params, 0);
        if reason.contains("Closing Link") {
            self.teardown().await;
        } else {
            debug!(%reason, "unhandled ERROR from server");
        }
    }

    async fn handle_rpl_welcome(&self, params: &[Vec<u8>]) {
        let message = param_text(params, 1);
        self.emit(Event::RplWelcome { message }).await;
        {
            let mut state = self.lock_state();
            state.registered = true;
            state.current_nick = state.attempted_nick.clone();
        }
        self.emit(Event::SignedOn).await;
    }

    async fn handle_rpl_myinfo(&self, params: &[Vec<u8>]) {
        let info = param_text(params, 1);
        let mut parts = info.splitn(4, char::is_whitespace);
        self.emit(Event::RplMyinfo {
            servername: parts.next().map(str::to_string),
            version: parts.next().map(str::to_string),
            umodes: parts.next().map(str::to_string),
            cmodes: parts.next().map(str::to_string),
        })
        .await;
    }

    /// Fold one 005 line into the feature store and arm the latch; the
    /// snapshot event fires when the burst ends (see `dispatch`).
    fn handle_rpl_isupport(&self, params: &[Vec<u8>]) {
        if params.len() < 2 {
            return;
        }
        let tokens: Vec<String> = params[1..params.len() - 1]
            .iter()
            .map(|p| String::from_utf8_lossy(p).into_owned())
            .collect();
        let mut state = self.lock_state();
        if !state.isupport_emitted {
            state.isupport_pending = true;
        }
        if let Err(err) = state
            .supported
            .parse_tokens(tokens.iter().map(String::as_str))
        {
            warn!(%err, "dropping unparseable ISUPPORT line");
        }
    }

    fn handle_rpl_motdstart(&self, params: &[Vec<u8>]) {
        self.lock_state().motd = Some(vec![strip_motd_decoration(&last_text(params))]);
    }

    fn handle_rpl_motd(&self, params: &[Vec<u8>]) {
        let line = strip_motd_decoration(&last_text(params));
        self.lock_state().motd.get_or_insert_with(Vec::new).push(line);
    }

    async fn handle_rpl_endofmotd(&self) {
        let motd = self.lock_state().motd.take().unwrap_or_default();
        self.emit(Event::Motd { motd }).await;
    }

    async fn handle_rpl_namreply(&self, params: &[Vec<u8>]) {
        let users = param_text(params, 3)
            .split(' ')
            .filter(|nick| !nick.is_empty())
            .map(str::to_string)
            .collect();
        self.emit(Event::RplNamreply {
            privacy: param_text(params, 1),
            channel: param_text(params, 2),
            users,
        })
        .await;
    }

    async fn handle_err_bannedfromchan(&self, params: &[Vec<u8>]) {
        let nick = param_text(params, 0);
        let channel = param_text(params, 1);
        let message = param_text(params, 2);
        error!(%nick, %channel, %message, "banned from channel");
        if nick == self.current_nick() {
            self.emit(Event::Banned { channel, message }).await;
        } else {
            self.emit(Event::UserBanned {
                channel,
                user: nick,
                message,
            })
            .await;
        }
    }

    fn handle_unknown(&self, prefix: &str, command: &str, params: &[Vec<u8>]) {
        let kind = if command.chars().all(|c| c.is_ascii_digit()) {
            "unknown"
        } else {
            "unhandled"
        };
        warn!(prefix, command, params = params.len(), "{kind} IRC command");
    }

    // ---- CTCP ----------------------------------------------------------

    /// Handle one extended tag from an inbound PRIVMSG.
    async fn ctcp_query(&self, user: &User, channel: &str, tag: Vec<u8>, data: Option<Vec<u8>>) {
        match tag.to_ascii_uppercase().as_slice() {
            b"ACTION" => {
                self.emit(Event::Action {
                    user: user.clone(),
                    channel: channel.to_string(),
                    data: data.unwrap_or_default(),
                })
                .await;
            }
            b"PING" => {
                self.emit(Event::CtcpQueryPing {
                    user: user.clone(),
                    channel: channel.to_string(),
                    data: data.clone(),
                })
                .await;
                self.ctcp_make_reply(&user.nick, &[(b"PING".as_slice(), data.as_deref())]);
            }
            b"FINGER" => {
                self.quirky_data(user, "FINGER", &data);
                self.emit(Event::CtcpQueryFinger {
                    user: user.clone(),
                    channel: channel.to_string(),
                    data,
                })
                .await;
            }
            b"VERSION" => {
                self.quirky_data(user, "VERSION", &data);
                self.emit(Event::CtcpQueryVersion {
                    user: user.clone(),
                    channel: channel.to_string(),
                    data,
                })
                .await;
                if let Some(name) = &self.config.version_name {
                    let version = format!(
                        "{}:{}:{}",
                        name,
                        self.config.version_num.as_deref().unwrap_or(""),
                        self.config.version_env.as_deref().unwrap_or(""),
                    );
                    self.ctcp_make_reply(
                        &user.nick,
                        &[(b"VERSION".as_slice(), Some(version.as_bytes()))],
                    );
                }
            }
            b"SOURCE" => {
                self.quirky_data(user, "SOURCE", &data);
                self.emit(Event::CtcpQuerySource {
                    user: user.clone(),
                    channel: channel.to_string(),
                    data,
                })
                .await;
                if let Some(url) = &self.config.source_url {
                    // Paired with a terminating tag, per convention.
                    self.ctcp_make_reply(
                        &user.nick,
                        &[
                            (b"SOURCE".as_slice(), Some(url.as_bytes())),
                            (b"SOURCE".as_slice(), None),
                        ],
                    );
                }
            }
            b"USERINFO" => {
                self.quirky_data(user, "USERINFO", &data);
                self.emit(Event::CtcpQueryUserinfo {
                    user: user.clone(),
                    channel: channel.to_string(),
                    data,
                })
                .await;
                if let Some(userinfo) = &self.config.userinfo {
                    self.ctcp_make_reply(
                        &user.nick,
                        &[(b"USERINFO".as_slice(), Some(userinfo.as_bytes()))],
                    );
                }
            }
            b"CLIENTINFO" => self.ctcp_query_clientinfo(user, data),
            b"ERRMSG" => {
                // Strange, but it is what the CTCP spec says to do when
                // faced with an ERRMSG query rather than a reply.
                let reply = format!(
                    "{} :No error has occurred.",
                    String::from_utf8_lossy(&data.unwrap_or_default())
                );
                self.ctcp_make_reply(&user.nick, &[(b"ERRMSG".as_slice(), Some(reply.as_bytes()))]);
            }
            b"TIME" => {
                self.quirky_data(user, "TIME", &data);
                let now = chrono::Local::now().format("%a %b %e %H:%M:%S %Y");
                let reply = format!(":{}", now);
                self.ctcp_make_reply(&user.nick, &[(b"TIME".as_slice(), Some(reply.as_bytes()))]);
            }
            other => {
                let tag = String::from_utf8_lossy(other).into_owned();
                let data = data
                    .map(|d| String::from_utf8_lossy(&d).into_owned())
                    .unwrap_or_default();
                warn!(%user, %tag, %data, "unknown CTCP query");
                let reply = format!("{} {}: Unknown query '{}'", tag, data, tag);
                self.ctcp_make_reply(&user.nick, &[(b"ERRMSG".as_slice(), Some(reply.as_bytes()))]);
            }
        }
    }

    fn ctcp_query_clientinfo(&self, user: &User, data: Option<Vec<u8>>) {
        const KNOWN_TAGS: &str =
            "ACTION CLIENTINFO ERRMSG FINGER PING SOURCE TIME USERINFO VERSION";
        match data {
            None => {
                self.ctcp_make_reply(
                    &user.nick,
                    &[(b"CLIENTINFO".as_slice(), Some(KNOWN_TAGS.as_bytes()))],
                );
            }
            Some(data) => {
                let text = String::from_utf8_lossy(&data).into_owned();
                let asked = text.split_whitespace().next().unwrap_or("");
                match ctcp_tag_help(asked) {
                    Some(help) => {
                        self.ctcp_make_reply(
                            &user.nick,
                            &[(b"CLIENTINFO".as_slice(), Some(help.as_bytes()))],
                        );
                    }
                    None => {
                        let reply =
                            format!("CLIENTINFO {} :Unknown query '{}'", text, asked);
                        self.ctcp_make_reply(
                            &user.nick,
                            &[(b"ERRMSG".as_slice(), Some(reply.as_bytes()))],
                        );
                    }
                }
            }
        }
    }

    /// Handle one extended tag from an inbound NOTICE. Notices never get
    /// automated replies; unmatched tags are only logged.
    async fn ctcp_reply(&self, user: &User, _channel: &str, tag: Vec<u8>, data: Option<Vec<u8>>) {
        match tag.to_ascii_uppercase().as_slice() {
            b"PING" => {
                let key = String::from_utf8_lossy(&data.unwrap_or_default()).into_owned();
                let started = {
                    let state = self.lock_state();
                    state.pings.get(&(user.nick.clone(), key.clone())).copied()
                };
                match started {
                    Some(entry) => {
                        let secs = entry.started.elapsed().as_secs_f64();
                        info!(%user, secs, "ping result");
                        self.emit(Event::Pong {
                            user: user.clone(),
                            secs,
                        })
                        .await;
                    }
                    None => error!(%user, %key, "bogus PING response"),
                }
            }
            other => {
                let tag = String::from_utf8_lossy(other).into_owned();
                let data = data
                    .map(|d| String::from_utf8_lossy(&d).into_owned())
                    .unwrap_or_default();
                warn!(%user, %tag, %data, "unknown CTCP reply");
            }
        }
    }

    /// Send extended messages as a CTCP reply (via NOTICE).
    pub fn ctcp_make_reply(&self, nick: &str, messages: &[(&[u8], Option<&[u8]>)]) {
        let payload = ctcp::ctcp_stringify(messages);
        self.notice(nick, &String::from_utf8_lossy(&payload));
    }

    /// Send extended messages as a CTCP query (via PRIVMSG).
    pub fn ctcp_make_query(&self, nick: &str, messages: &[(&[u8], Option<&[u8]>)]) {
        let payload = ctcp::ctcp_stringify(messages);
        let _ = self.msg(nick, &String::from_utf8_lossy(&payload), None);
    }

    /// Peculiar but not wholly indecipherable traffic gets logged.
    fn quirky_data(&self, user: &User, tag: &str, data: &Option<Vec<u8>>) {
        if let Some(data) = data {
            warn!(
                "quirky message: why did {} send {:?} with a {} query?",
                user,
                String::from_utf8_lossy(data),
                tag,
            );
        }
    }
}

/// One-line usage help for each CTCP tag this client understands.
fn ctcp_tag_help(tag: &str) -> Option<&'static str> {
    match tag.to_ascii_uppercase().as_str() {
        "ACTION" => Some("ACTION <text>: describes an action the sender performs"),
        "CLIENTINFO" => Some("CLIENTINFO [tag]: lists supported tags, or help for one tag"),
        "ERRMSG" => Some("ERRMSG <text>: echoes the text back as a diagnostic"),
        "FINGER" => Some("FINGER: requests user information"),
        "PING" => Some("PING <key>: echoes the key to measure round-trip time"),
        "SOURCE" => Some("SOURCE: points at where this client can be obtained"),
        "TIME" => Some("TIME: reports the local time"),
        "USERINFO" => Some("USERINFO: reports the configured user information"),
        "VERSION" => Some("VERSION: reports the client name and version"),
        _ => None,
    }
}

fn unzip_changes(
    changes: Vec<(char, Option<Vec<u8>>)>,
) -> (String, Vec<Option<Vec<u8>>>) {
    let mut letters = String::with_capacity(changes.len());
    let mut args = Vec::with_capacity(changes.len());
    for (letter, arg) in changes {
        letters.push(letter);
        args.push(arg);
    }
    (letters, args)
}

fn strip_motd_decoration(line: &str) -> String {
    line.strip_prefix("- ").unwrap_or(line).to_string()
}

fn param_text(params: &[Vec<u8>], idx: usize) -> String {
    params
        .get(idx)
        .map(|p| String::from_utf8_lossy(p).into_owned())
        .unwrap_or_default()
}

fn last_text(params: &[Vec<u8>]) -> String {
    params
        .last()
        .map(|p| String::from_utf8_lossy(p).into_owned())
        .unwrap_or_default()
}
