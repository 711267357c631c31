//! The connection engine: one [`Connection`] per configured IRC server.
//!
//! A connection dials with backoff, registers, and then runs four tasks for
//! the life of the link: a receive loop that parses and classifies lines, a
//! send loop that drains the outgoing queue, an error monitor, and a
//! dispatcher that feeds each inbound command or reply through the ordered
//! hook lists. Everything the engine does after connecting, from login to
//! answering PING, is a hook; see [`Hooks::defaults`].
//!
//! ```no_run
//! use slirc_relay::{Connection, IrcConfig};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let conn = Connection::new(IrcConfig {
//!     name: "libera".into(),
//!     server: "irc.libera.chat:6667".into(),
//!     user: "tenyks".into(),
//!     nicks: vec!["tenyks".into(), "tenyks_".into()],
//!     channels: vec!["#tenyks".into()],
//!     ..IrcConfig::default()
//! })?;
//!
//! conn.register_message_handler(|msg| println!("{:?}", msg));
//! conn.dial().await?;
//! # Ok(())
//! # }
//! ```

pub mod defaults;
mod factory;
mod hooks;
mod tasks;

use std::fmt;
use std::sync::{Arc, Weak};

use chrono::Utc;
use futures_util::future::BoxFuture;
use parking_lot::{Mutex, RwLock};
use tokio::sync::mpsc;
use tokio_util::codec::{FramedRead, FramedWrite};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, info_span, warn, Instrument};

pub use self::factory::{addressed_privmsg, CommandFactory, Factories, ReplyFactory};
pub use self::hooks::{
    CommandHook, ConnectHook, DisconnectHook, ErrorHook, HookResult, Hooks, ReplyHook,
};

use crate::backoff::Backoff;
use crate::chat::{path_target, MessageHandler, RelayMessage};
use crate::codec::LineCodec;
use crate::command::{default_command, Command, CommandKind, MessageObject, PrivmsgCommand};
use crate::config::IrcConfig;
use crate::error::{ConfigError, ConnectionError, Result};
use crate::inbound::Inbound;
use crate::message::{Message, MessageType};
use crate::reply::{default_reply, Reply, ReplyKind};
use crate::state::{ConnectionState, ConnectionStatus, SessionState};
use crate::transport::Transport;

/// The pieces of a live link that outlive `dial`.
struct Link {
    cancel: CancellationToken,
    outgoing: mpsc::Sender<Command>,
}

struct Inner {
    config: IrcConfig,
    session: RwLock<SessionState>,
    hooks: RwLock<Hooks>,
    factories: RwLock<Factories>,
    handlers: RwLock<Vec<MessageHandler>>,
    link: Mutex<Option<Link>>,
    /// Serialises `dial` so two callers never open two sockets.
    dial_lock: tokio::sync::Mutex<()>,
}

impl Drop for Inner {
    fn drop(&mut self) {
        if let Some(link) = self.link.get_mut().take() {
            link.cancel.cancel();
        }
    }
}

/// A handle to one IRC connection. Cheap to clone; all clones share the same
/// link, state and hooks.
#[derive(Clone)]
pub struct Connection {
    inner: Arc<Inner>,
}

/// A non-owning handle, held by the connection's own tasks and by inbound
/// PRIVMSGs.
#[derive(Clone)]
pub struct WeakConnection {
    inner: Weak<Inner>,
}

impl WeakConnection {
    pub fn upgrade(&self) -> Option<Connection> {
        self.inner.upgrade().map(|inner| Connection { inner })
    }
}

impl fmt::Debug for WeakConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakConnection")
            .field("alive", &(self.inner.strong_count() > 0))
            .finish()
    }
}

/// Resets a dial that did not get as far as a link.
struct DialGuard<'a> {
    conn: &'a Connection,
    armed: bool,
}

impl Drop for DialGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.conn
                .with_write_lock(|s| s.status.state = ConnectionState::Disconnected);
        }
    }
}

impl Connection {
    /// Validate `config` and build a disconnected connection with the
    /// default hooks and factories.
    pub fn new(config: IrcConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let session = SessionState::new(&config.channels);
        let hooks = Hooks::defaults(config.reconnect);

        Ok(Connection {
            inner: Arc::new(Inner {
                config,
                session: RwLock::new(session),
                hooks: RwLock::new(hooks),
                factories: RwLock::new(Factories::default()),
                handlers: RwLock::new(Vec::new()),
                link: Mutex::new(None),
                dial_lock: tokio::sync::Mutex::new(()),
            }),
        })
    }

    pub fn name(&self) -> &str {
        &self.inner.config.name
    }

    pub fn config(&self) -> &IrcConfig {
        &self.inner.config
    }

    /// A snapshot of the connection status.
    pub fn status(&self) -> ConnectionStatus {
        self.with_read_lock(|s| s.status.clone())
    }

    /// Run `f` with shared access to the session. Do not block in `f`.
    pub fn with_read_lock<R>(&self, f: impl FnOnce(&SessionState) -> R) -> R {
        f(&self.inner.session.read())
    }

    /// Run `f` with exclusive access to the session. Do not block in `f`.
    pub fn with_write_lock<R>(&self, f: impl FnOnce(&mut SessionState) -> R) -> R {
        f(&mut self.inner.session.write())
    }

    pub fn downgrade(&self) -> WeakConnection {
        WeakConnection {
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Whether a link is up (dialed and not closed).
    pub fn is_linked(&self) -> bool {
        self.inner.link.lock().is_some()
    }

    /// Append an `on_connect` hook.
    pub fn on_connect<F>(&self, hook: F)
    where
        F: for<'a> Fn(&'a Connection) -> BoxFuture<'a, HookResult> + Send + Sync + 'static,
    {
        self.inner.hooks.write().on_connect.push(Arc::new(hook));
    }

    pub fn on_disconnect<F>(&self, hook: F)
    where
        F: for<'a> Fn(&'a Connection) -> BoxFuture<'a, HookResult> + Send + Sync + 'static,
    {
        self.inner.hooks.write().on_disconnect.push(Arc::new(hook));
    }

    pub fn on_command<F>(&self, hook: F)
    where
        F: for<'a> Fn(&'a Connection, &'a Command) -> BoxFuture<'a, HookResult>
            + Send
            + Sync
            + 'static,
    {
        self.inner.hooks.write().on_command.push(Arc::new(hook));
    }

    pub fn on_reply<F>(&self, hook: F)
    where
        F: for<'a> Fn(&'a Connection, &'a Reply) -> BoxFuture<'a, HookResult>
            + Send
            + Sync
            + 'static,
    {
        self.inner.hooks.write().on_reply.push(Arc::new(hook));
    }

    pub fn on_error<F>(&self, hook: F)
    where
        F: for<'a> Fn(&'a Connection, &'a ConnectionError) -> BoxFuture<'a, HookResult>
            + Send
            + Sync
            + 'static,
    {
        self.inner.hooks.write().on_error.push(Arc::new(hook));
    }

    /// Edit the hook lists in place, e.g. to remove or reorder defaults.
    pub fn configure_hooks(&self, f: impl FnOnce(&mut Hooks)) {
        f(&mut self.inner.hooks.write());
    }

    /// Edit the command and reply factory overrides.
    pub fn configure_factories(&self, f: impl FnOnce(&mut Factories)) {
        f(&mut self.inner.factories.write());
    }

    /// Add a downstream handler for chat messages received on this
    /// connection.
    pub fn register_message_handler<F>(&self, handler: F)
    where
        F: Fn(RelayMessage) + Send + Sync + 'static,
    {
        self.push_message_handler(Arc::new(handler));
    }

    fn push_message_handler(&self, handler: MessageHandler) {
        self.inner.handlers.write().push(handler);
    }

    pub(crate) fn message_handlers(&self) -> Vec<MessageHandler> {
        self.inner.handlers.read().clone()
    }

    /// Connect, retrying with backoff until a socket is up, start the link
    /// tasks and run the `on_connect` hooks.
    ///
    /// Does nothing if already linked. Configuration errors (a bad root
    /// certificate, say) are returned instead of retried. Retrying stops when
    /// the returned future is dropped.
    pub async fn dial(&self) -> Result<()> {
        let dialing = self.inner.dial_lock.lock().await;
        if self.is_linked() {
            return Ok(());
        }

        let mut guard = DialGuard {
            conn: self,
            armed: true,
        };
        self.with_write_lock(|s| s.status.state = ConnectionState::Connecting);

        let config = &self.inner.config;
        let mut backoff = Backoff::new(config.backoff);
        let transport = loop {
            match Transport::connect(config).await {
                Ok(transport) => break transport,
                Err(ConnectionError::Config(e)) => return Err(e.into()),
                Err(e) => {
                    let delay = backoff.next_delay();
                    error!(
                        server = %config.server,
                        error = %e,
                        retry_in = ?delay,
                        "dial failed"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        };
        info!(server = %config.server, tls = transport.is_tls(), "connected");

        let (read_half, write_half) = tokio::io::split(transport);
        let reader = FramedRead::new(read_half, LineCodec::new());
        let writer = FramedWrite::new(write_half, LineCodec::new());

        let capacity = config.queue_capacity;
        let (outgoing_tx, outgoing_rx) = mpsc::channel(capacity);
        let (inbound_tx, inbound_rx) = mpsc::channel(capacity);
        let (receive_err_tx, receive_err_rx) = mpsc::channel(capacity);
        let (send_err_tx, send_err_rx) = mpsc::channel(capacity);
        let cancel = CancellationToken::new();

        let span = info_span!("irc", connection = %self.name());
        let weak = self.downgrade();
        tokio::spawn(
            tasks::receive_loop(weak.clone(), reader, inbound_tx, receive_err_tx, cancel.clone())
                .instrument(span.clone()),
        );
        tokio::spawn(
            tasks::send_loop(writer, outgoing_rx, send_err_tx, cancel.clone())
                .instrument(span.clone()),
        );
        tokio::spawn(
            tasks::error_monitor(weak.clone(), receive_err_rx, send_err_rx, cancel.clone())
                .instrument(span.clone()),
        );
        tokio::spawn(tasks::dispatcher(weak, inbound_rx, cancel.clone()).instrument(span));

        *self.inner.link.lock() = Some(Link {
            cancel,
            outgoing: outgoing_tx,
        });
        self.with_write_lock(|s| {
            s.status.state = ConnectionState::Connected;
            s.status.started_at = Utc::now();
        });
        guard.armed = false;
        drop(guard);
        drop(dialing);

        let hooks = self.inner.hooks.read().on_connect.clone();
        for hook in hooks {
            hook(self).await.map_err(ConnectionError::Hook)?;
        }
        Ok(())
    }

    /// Tear the link down and run the `on_disconnect` hooks. Does nothing if
    /// not linked. The connection can be dialed again afterwards.
    pub async fn close(&self) -> Result<()> {
        let link = self.inner.link.lock().take();
        let Some(link) = link else {
            return Ok(());
        };
        link.cancel.cancel();
        drop(link);

        self.with_write_lock(|s| {
            s.status.state = ConnectionState::Disconnected;
            s.status.connected = false;
        });
        info!(connection = %self.name(), "disconnected");

        let hooks = self.inner.hooks.read().on_disconnect.clone();
        for hook in hooks {
            hook(self).await.map_err(ConnectionError::Hook)?;
        }
        Ok(())
    }

    /// Validate `command` and queue it for the send loop, waiting for room if
    /// the queue is full.
    pub async fn enqueue_command(&self, command: impl Into<Command>) -> Result<()> {
        let command = command.into();
        command.validate()?;

        let outgoing = self
            .inner
            .link
            .lock()
            .as_ref()
            .map(|link| link.outgoing.clone());
        let outgoing = outgoing.ok_or(ConnectionError::NotConnected)?;

        outgoing
            .send(command)
            .await
            .map_err(|_| ConnectionError::QueueClosed)
    }

    /// Send a relay message out over IRC. Chat messages become a PRIVMSG to
    /// the last segment of their destination path.
    pub async fn send_async(&self, message: &RelayMessage) -> Result<()> {
        match message {
            RelayMessage::Chat(chat) => {
                let target = path_target(&chat.destination_path);
                self.enqueue_command(PrivmsgCommand::new(target, chat.content.as_str()))
                    .await
            }
            RelayMessage::Control(_) => Err(ConnectionError::UnsupportedMessage("control")),
        }
    }

    /// Turn a parsed message into a typed command or reply: a factory
    /// override first, then the built-in wrapper, then `Unknown`.
    pub fn classify(&self, message: Message) -> Inbound {
        match message.message_type() {
            MessageType::Command => {
                let command = match CommandKind::from_verb(message.command()) {
                    Some(kind) => {
                        let factory = self.inner.factories.read().command(kind).cloned();
                        match factory {
                            Some(factory) => factory(self, message),
                            None => default_command(kind, message),
                        }
                    }
                    None => Command::Unknown(message),
                };
                Inbound::Command(command)
            }
            MessageType::Reply => {
                let reply = match ReplyKind::from_numeric(message.command()) {
                    Some(kind) => {
                        let factory = self.inner.factories.read().reply(kind).cloned();
                        match factory {
                            Some(factory) => factory(self, message),
                            None => default_reply(kind, message).unwrap_or_else(Reply::Unknown),
                        }
                    }
                    None => Reply::Unknown(message),
                };
                Inbound::Reply(reply)
            }
        }
    }

    /// Run the command or reply hooks for one inbound item, in order. A
    /// failing hook is logged and the rest still run.
    pub async fn dispatch(&self, inbound: &Inbound) {
        match inbound {
            Inbound::Command(command) => {
                let hooks = self.inner.hooks.read().on_command.clone();
                for hook in hooks {
                    if let Err(e) = hook(self, command).await {
                        warn!(
                            hook = "on_command",
                            line = %command.message().raw(),
                            error = %format!("{:#}", e),
                            "hook failed"
                        );
                    }
                }
            }
            Inbound::Reply(reply) => {
                let hooks = self.inner.hooks.read().on_reply.clone();
                for hook in hooks {
                    if let Err(e) = hook(self, reply).await {
                        warn!(
                            hook = "on_reply",
                            line = %reply.message().raw(),
                            error = %format!("{:#}", e),
                            "hook failed"
                        );
                    }
                }
            }
        }
    }

    pub(crate) async fn run_error_hooks(&self, err: &ConnectionError) {
        let hooks = self.inner.hooks.read().on_error.clone();
        for hook in hooks {
            if let Err(e) = hook(self, err).await {
                warn!(hook = "on_error", error = %format!("{:#}", e), "hook failed");
            }
        }
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("name", &self.name())
            .field("server", &self.inner.config.server)
            .field("linked", &self.is_linked())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::ChatMessage;
    use crate::state::ChannelStatus;

    fn config() -> IrcConfig {
        IrcConfig {
            name: "test".into(),
            server: "127.0.0.1:6667".into(),
            user: "tenyks".into(),
            nicks: vec!["tenyks".into(), "tenyks_".into(), "tenyks__".into()],
            channels: vec!["#tenyks".into(), "#Rust".into()],
            ..IrcConfig::default()
        }
    }

    fn conn() -> Connection {
        Connection::new(config()).unwrap()
    }

    async fn feed(conn: &Connection, line: &str) {
        let item = conn.classify(Message::parse(line).unwrap());
        conn.dispatch(&item).await;
    }

    fn register(conn: &Connection) {
        conn.with_write_lock(|s| {
            s.status.connected = true;
            s.status.current_nick = Some("tenyks".into());
        });
    }

    #[test]
    fn test_new_validates_config() {
        let err = Connection::new(IrcConfig {
            nicks: vec![],
            ..config()
        })
        .unwrap_err();
        assert_eq!(err, ConfigError::NoNicks);
    }

    #[test]
    fn test_new_connection_state() {
        let conn = conn();
        let status = conn.status();
        assert_eq!(status.state, ConnectionState::Disconnected);
        assert!(!status.connected);
        assert!(!conn.is_linked());
        assert_eq!(conn.with_read_lock(|s| s.channels().count()), 2);
    }

    #[test]
    fn test_classify() {
        let conn = conn();
        let item = conn.classify(Message::parse("PING :irc.example.net").unwrap());
        assert!(matches!(item, Inbound::Command(Command::Ping(_))));

        let item = conn.classify(Message::parse(":srv 001 tenyks :Welcome").unwrap());
        assert!(matches!(item, Inbound::Reply(Reply::Welcome(_))));

        let item = conn.classify(Message::parse(":srv 372 tenyks :- motd").unwrap());
        assert!(matches!(item, Inbound::Reply(Reply::Unknown(_))));

        let item = conn.classify(Message::parse(":srv 332 tenyks #a :topic").unwrap());
        assert!(matches!(item, Inbound::Reply(Reply::Unknown(_))));

        let item = conn.classify(Message::parse(":n!u@h NOTICE tenyks :hi").unwrap());
        assert!(matches!(item, Inbound::Command(Command::Unknown(_))));
    }

    #[test]
    fn test_factory_override() {
        let conn = conn();
        conn.configure_factories(|f| {
            f.set_command(CommandKind::Ping, |_, message| Command::Unknown(message));
        });
        let item = conn.classify(Message::parse("PING :srv").unwrap());
        assert!(matches!(item, Inbound::Command(Command::Unknown(_))));

        conn.configure_factories(|f| {
            f.remove_command(CommandKind::Ping);
        });
        let item = conn.classify(Message::parse("PING :srv").unwrap());
        assert!(matches!(item, Inbound::Command(Command::Ping(_))));
    }

    #[test]
    fn test_privmsg_reads_live_session() {
        let conn = conn();
        let item = conn.classify(Message::parse(":kyle!k@h PRIVMSG tenyks :hi").unwrap());
        let Inbound::Command(Command::Privmsg(privmsg)) = item else {
            panic!("expected a PRIVMSG");
        };
        assert!(!privmsg.is_direct());

        register(&conn);
        assert!(privmsg.is_direct());
    }

    #[tokio::test]
    async fn test_enqueue_requires_link() {
        let conn = conn();
        let err = conn
            .enqueue_command(PrivmsgCommand::new("#tenyks", "hi"))
            .await
            .unwrap_err();
        assert!(matches!(err, ConnectionError::NotConnected));

        let err = conn
            .enqueue_command(PrivmsgCommand::new("#tenyks", ""))
            .await
            .unwrap_err();
        assert!(matches!(err, ConnectionError::Validation(_)));
    }

    #[tokio::test]
    async fn test_send_async_rejects_control() {
        let conn = conn();
        let control =
            RelayMessage::Control(crate::chat::ControlMessage::new("0b6c", "ping", "now"));
        let err = conn.send_async(&control).await.unwrap_err();
        assert!(matches!(err, ConnectionError::UnsupportedMessage("control")));
    }

    #[tokio::test]
    async fn test_close_without_link_is_noop() {
        let conn = conn();
        conn.close().await.unwrap();
        assert_eq!(conn.status().state, ConnectionState::Disconnected);
    }

    #[tokio::test]
    async fn test_welcome_then_join_then_names() {
        let conn = conn();
        conn.with_write_lock(|s| s.status.current_nick = Some("tenyks".into()));

        feed(&conn, ":irc.example.net 001 tenyks :Welcome").await;
        let status = conn.status();
        assert!(status.connected);
        assert_eq!(status.current_server.as_deref(), Some("irc.example.net"));

        feed(&conn, ":tenyks!t@h JOIN #tenyks").await;
        feed(&conn, ":irc.example.net 353 tenyks = #tenyks :@kyle tenyks").await;
        feed(&conn, ":irc.example.net 353 tenyks = #TENYKS :+bot").await;
        feed(&conn, ":irc.example.net 366 tenyks #tenyks :End of /NAMES list.").await;

        conn.with_read_lock(|s| {
            let nicks = s.channel("#tenyks").unwrap().nicks().unwrap();
            assert_eq!(nicks.len(), 3);
            assert!(nicks.contains_key("@kyle"));
            assert!(!s.channel("#rust").unwrap().is_joined());
        });
    }

    #[tokio::test]
    async fn test_names_ignored_when_not_joined() {
        let conn = conn();
        register(&conn);
        feed(&conn, ":srv 353 tenyks = #rust :kyle").await;
        assert_eq!(
            conn.with_read_lock(|s| s.channel("#rust").unwrap().status.clone()),
            ChannelStatus::Parted
        );
    }

    #[tokio::test]
    async fn test_someone_elses_join_is_ignored() {
        let conn = conn();
        register(&conn);
        feed(&conn, ":kyle!k@h JOIN :#tenyks").await;
        assert!(!conn.with_read_lock(|s| s.channel("#tenyks").unwrap().is_joined()));

        feed(&conn, ":TENYKS!t@h JOIN :#tenyks").await;
        assert!(conn.with_read_lock(|s| s.channel("#tenyks").unwrap().is_joined()));
    }

    #[tokio::test]
    async fn test_part_and_kick() {
        let conn = conn();
        register(&conn);
        feed(&conn, ":tenyks!t@h JOIN #tenyks,#rust").await;

        feed(&conn, ":tenyks!t@h PART #tenyks :bye").await;
        assert_eq!(
            conn.with_read_lock(|s| s.channel("#tenyks").unwrap().status.clone()),
            ChannelStatus::Parted
        );

        feed(&conn, ":op!o@h KICK #rust tenyks :behave").await;
        assert_eq!(
            conn.with_read_lock(|s| s.channel("#rust").unwrap().status.clone()),
            ChannelStatus::Err {
                message: "behave".into()
            }
        );
    }

    #[tokio::test]
    async fn test_join_rejection() {
        let conn = conn();
        register(&conn);
        feed(&conn, ":srv 474 tenyks #rust :Cannot join channel (+b)").await;
        assert_eq!(
            conn.with_read_lock(|s| s.channel("#rust").unwrap().status.clone()),
            ChannelStatus::Err {
                message: "Cannot join channel (+b)".into()
            }
        );
    }

    #[tokio::test]
    async fn test_nick_change_tracked() {
        let conn = conn();
        register(&conn);
        feed(&conn, ":tenyks!t@h NICK :tenyks2").await;
        assert_eq!(conn.status().current_nick.as_deref(), Some("tenyks2"));

        feed(&conn, ":kyle!k@h NICK :kyle2").await;
        assert_eq!(conn.status().current_nick.as_deref(), Some("tenyks2"));
    }

    #[tokio::test]
    async fn test_nick_fallback_without_link() {
        let conn = conn();
        conn.with_write_lock(|s| s.status.current_nick = Some("tenyks".into()));

        // The NICK cannot be queued without a link; the state still moves on.
        feed(&conn, ":srv 433 * tenyks :Nickname is already in use").await;
        assert_eq!(conn.status().current_nick.as_deref(), Some("tenyks_"));
        assert_eq!(conn.with_read_lock(|s| s.nick_attempt()), 1);

        feed(&conn, ":srv 433 * tenyks_ :Nickname is already in use").await;
        feed(&conn, ":srv 433 * tenyks__ :Nickname is already in use").await;
        assert_eq!(conn.status().current_nick.as_deref(), Some("tenyks__"));
        assert_eq!(conn.with_read_lock(|s| s.nick_attempt()), 2);
    }

    #[tokio::test]
    async fn test_privmsg_reaches_handlers() {
        let conn = conn();
        register(&conn);

        let (tx, rx) = std::sync::mpsc::channel::<ChatMessage>();
        let tx = std::sync::Mutex::new(tx);
        conn.register_message_handler(move |msg| {
            if let RelayMessage::Chat(chat) = msg {
                tx.lock().unwrap().send(chat).unwrap();
            }
        });

        feed(&conn, ":kyle!k@h PRIVMSG #tenyks :tenyks: hello").await;
        feed(&conn, ":kyle!k@h PRIVMSG Tenyks :psst").await;

        let first = rx.try_recv().unwrap();
        assert_eq!(first.destination_path, "/irc/test/#tenyks");
        assert_eq!(first.origin_path, "/irc/test/kyle");
        assert!(first.mention);
        assert!(!first.direct);

        let second = rx.try_recv().unwrap();
        assert!(second.direct);
        assert!(!second.mention);
        assert_eq!(second.content, "psst");
    }

    #[tokio::test]
    async fn test_hook_errors_do_not_stop_dispatch() {
        fn failing<'a>(_: &'a Connection, _: &'a Command) -> BoxFuture<'a, HookResult> {
            Box::pin(async { Err(anyhow::anyhow!("boom")) })
        }

        let conn = conn();
        conn.configure_hooks(|h| h.on_command.insert(0, Arc::new(failing)));
        conn.with_write_lock(|s| s.status.current_nick = Some("tenyks".into()));
        feed(&conn, ":tenyks!t@h JOIN #tenyks").await;
        assert!(conn.with_read_lock(|s| s.channel("#tenyks").unwrap().is_joined()));
    }
}
