//! End-to-end tests of the connection engine against a scripted server on
//! localhost.

use std::future::Future;
use std::time::Duration;

use futures_util::future::BoxFuture;
use slirc_relay::connection::HookResult;
use slirc_relay::{
    BackoffConfig, ChannelStatus, ChatMessage, Connection, ConnectionError, ConnectionState,
    IrcConfig, RelayMessage,
};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::time::{sleep, timeout};

const WAIT: Duration = Duration::from_secs(5);

/// The server side of one accepted connection.
struct Peer {
    lines: Lines<BufReader<OwnedReadHalf>>,
    writer: OwnedWriteHalf,
}

impl Peer {
    async fn accept(listener: &TcpListener) -> Peer {
        let (stream, _) = timeout(WAIT, listener.accept())
            .await
            .expect("client never connected")
            .unwrap();
        Peer::new(stream)
    }

    fn new(stream: TcpStream) -> Peer {
        let (read, writer) = stream.into_split();
        Peer {
            lines: BufReader::new(read).lines(),
            writer,
        }
    }

    async fn expect(&mut self) -> String {
        timeout(WAIT, self.lines.next_line())
            .await
            .expect("timed out waiting for a line")
            .unwrap()
            .expect("client closed the connection")
    }

    async fn send(&mut self, line: &str) {
        self.writer.write_all(line.as_bytes()).await.unwrap();
        self.writer.write_all(b"\r\n").await.unwrap();
    }

    /// Read the login burst and answer with a welcome.
    async fn register(&mut self) {
        assert!(self.expect().await.starts_with("USER "));
        assert!(self.expect().await.starts_with("NICK "));
        self.send(":irc.test 001 tenyks :Welcome to the test network").await;
    }
}

async fn listener() -> (TcpListener, String) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    (listener, addr)
}

fn config(server: &str) -> IrcConfig {
    IrcConfig {
        name: "test".into(),
        server: server.into(),
        user: "tenyks".into(),
        nicks: vec!["tenyks".into(), "tenyks_".into()],
        backoff: BackoffConfig {
            min: Duration::from_millis(20),
            max: Duration::from_millis(100),
            factor: 2.0,
        },
        ..IrcConfig::default()
    }
}

async fn eventually(mut check: impl FnMut() -> bool) {
    for _ in 0..500 {
        if check() {
            return;
        }
        sleep(Duration::from_millis(10)).await;
    }
    panic!("condition never became true");
}

async fn within<T>(fut: impl Future<Output = T>) -> T {
    timeout(WAIT, fut).await.expect("timed out")
}

#[tokio::test]
async fn test_login_sequence() {
    let (listener, addr) = listener().await;
    let conn = Connection::new(IrcConfig {
        password: Some("secret".into()),
        real_name: "Tenyks Relay".into(),
        channels: vec!["#tenyks".into(), "#rust".into()],
        ..config(&addr)
    })
    .unwrap();

    within(conn.dial()).await.unwrap();
    let mut peer = Peer::accept(&listener).await;

    assert_eq!(peer.expect().await, "PASS secret");
    assert_eq!(peer.expect().await, "USER tenyks 0 * :Tenyks Relay");
    assert_eq!(peer.expect().await, "NICK tenyks");
    assert_eq!(peer.expect().await, "JOIN #tenyks,#rust");

    let status = conn.status();
    assert_eq!(status.state, ConnectionState::Connected);
    assert_eq!(status.current_nick.as_deref(), Some("tenyks"));
    assert!(!status.connected);

    conn.close().await.unwrap();
}

#[tokio::test]
async fn test_no_pass_or_join_when_unset() {
    let (listener, addr) = listener().await;
    let conn = Connection::new(config(&addr)).unwrap();

    within(conn.dial()).await.unwrap();
    let mut peer = Peer::accept(&listener).await;

    assert_eq!(peer.expect().await, "USER tenyks 0 * :tenyks");
    assert_eq!(peer.expect().await, "NICK tenyks");

    // Nothing else was queued: the next thing the server sees is our reply.
    peer.send("PING :marker").await;
    assert_eq!(peer.expect().await, "PONG :marker");

    conn.close().await.unwrap();
}

#[tokio::test]
async fn test_registration_and_ping() {
    let (listener, addr) = listener().await;
    let conn = Connection::new(config(&addr)).unwrap();

    within(conn.dial()).await.unwrap();
    let mut peer = Peer::accept(&listener).await;
    peer.register().await;

    eventually(|| conn.status().connected).await;
    assert_eq!(conn.status().current_server.as_deref(), Some("irc.test"));

    peer.send("PING :irc.test").await;
    assert_eq!(peer.expect().await, "PONG :irc.test");
    eventually(|| conn.status().last_server_probe_response.is_some()).await;
    assert!(conn.status().last_server_probe.is_some());

    conn.close().await.unwrap();
}

#[tokio::test]
async fn test_each_ping_gets_exactly_one_pong() {
    let (listener, addr) = listener().await;
    let conn = Connection::new(config(&addr)).unwrap();

    within(conn.dial()).await.unwrap();
    let mut peer = Peer::accept(&listener).await;
    peer.register().await;
    eventually(|| conn.status().connected).await;

    peer.send("PING :a").await;
    peer.send("PING :b").await;
    peer.send("PING :").await;
    peer.send("PING :end").await;

    assert_eq!(peer.expect().await, "PONG :a");
    assert_eq!(peer.expect().await, "PONG :b");
    assert_eq!(peer.expect().await, "PONG");
    assert_eq!(peer.expect().await, "PONG :end");

    conn.close().await.unwrap();
}

#[tokio::test]
async fn test_names_then_end_of_stream_resets_channels() {
    let (listener, addr) = listener().await;
    let conn = Connection::new(IrcConfig {
        channels: vec!["#tenyks".into()],
        ..config(&addr)
    })
    .unwrap();

    within(conn.dial()).await.unwrap();
    let mut peer = Peer::accept(&listener).await;
    peer.register().await;
    assert_eq!(peer.expect().await, "JOIN #tenyks");

    peer.send(":tenyks!t@localhost JOIN #tenyks").await;
    peer.send(":irc.test 353 tenyks = #tenyks :@kyle tenyks").await;
    peer.send(":irc.test 353 tenyks = #tenyks :+bot").await;
    peer.send(":irc.test 366 tenyks #tenyks :End of /NAMES list.").await;

    eventually(|| {
        conn.with_read_lock(|s| {
            s.channel("#tenyks")
                .and_then(|c| c.nicks())
                .is_some_and(|nicks| nicks.len() == 3)
        })
    })
    .await;

    drop(peer);

    eventually(|| conn.status().state == ConnectionState::Disconnected).await;
    assert!(!conn.is_linked());
    assert!(!conn.status().connected);
    eventually(|| {
        conn.with_read_lock(|s| s.channel("#tenyks").unwrap().status == ChannelStatus::Parted)
    })
    .await;
}

#[tokio::test]
async fn test_privmsg_relayed_to_handlers() {
    let (listener, addr) = listener().await;
    let conn = Connection::new(config(&addr)).unwrap();

    let (tx, mut rx) = mpsc::unbounded_channel::<ChatMessage>();
    conn.register_message_handler(move |msg| {
        if let RelayMessage::Chat(chat) = msg {
            let _ = tx.send(chat);
        }
    });

    within(conn.dial()).await.unwrap();
    let mut peer = Peer::accept(&listener).await;
    peer.register().await;
    eventually(|| conn.status().connected).await;

    peer.send(":kyle!k@localhost PRIVMSG #tenyks :tenyks: ping?").await;
    peer.send(":kyle!k@localhost PRIVMSG tenyks :just you").await;

    let mention = within(rx.recv()).await.unwrap();
    assert_eq!(mention.destination_path, "/irc/test/#tenyks");
    assert_eq!(mention.origin_path, "/irc/test/kyle");
    assert_eq!(mention.content, "tenyks: ping?");
    assert!(mention.mention);
    assert!(!mention.direct);

    let direct = within(rx.recv()).await.unwrap();
    assert!(direct.direct);
    assert!(!direct.mention);

    conn.close().await.unwrap();
}

#[tokio::test]
async fn test_send_async_writes_privmsg() {
    let (listener, addr) = listener().await;
    let conn = Connection::new(config(&addr)).unwrap();

    within(conn.dial()).await.unwrap();
    let mut peer = Peer::accept(&listener).await;
    peer.register().await;

    let chat = ChatMessage::new("/irc/test/#tenyks", "hello from the relay");
    conn.send_async(&RelayMessage::Chat(chat)).await.unwrap();
    assert_eq!(peer.expect().await, "PRIVMSG #tenyks :hello from the relay");

    conn.close().await.unwrap();
}

#[tokio::test]
async fn test_invalid_command_is_rejected_before_the_wire() {
    let (listener, addr) = listener().await;
    let conn = Connection::new(config(&addr)).unwrap();

    within(conn.dial()).await.unwrap();
    let mut peer = Peer::accept(&listener).await;
    peer.register().await;

    let bad = slirc_relay::command::PrivmsgCommand::new("#tenyks", "a\r\nQUIT");
    let err = conn.enqueue_command(bad).await.unwrap_err();
    assert!(matches!(err, ConnectionError::Validation(_)));

    let good = slirc_relay::command::PrivmsgCommand::new("#tenyks", "fine");
    conn.enqueue_command(good).await.unwrap();
    assert_eq!(peer.expect().await, "PRIVMSG #tenyks :fine");

    conn.close().await.unwrap();
}

#[tokio::test]
async fn test_nick_in_use_falls_back() {
    let (listener, addr) = listener().await;
    let conn = Connection::new(config(&addr)).unwrap();

    within(conn.dial()).await.unwrap();
    let mut peer = Peer::accept(&listener).await;
    assert!(peer.expect().await.starts_with("USER "));
    assert_eq!(peer.expect().await, "NICK tenyks");

    peer.send(":irc.test 433 * tenyks :Nickname is already in use").await;
    assert_eq!(peer.expect().await, "NICK tenyks_");

    peer.send(":irc.test 001 tenyks_ :Welcome").await;
    eventually(|| conn.status().connected).await;
    assert_eq!(conn.status().current_nick.as_deref(), Some("tenyks_"));

    conn.close().await.unwrap();
}

#[tokio::test]
async fn test_dial_retries_until_server_appears() {
    let (listener, addr) = listener().await;
    drop(listener);

    let conn = Connection::new(config(&addr)).unwrap();
    let dialing = tokio::spawn({
        let conn = conn.clone();
        async move { conn.dial().await }
    });

    eventually(|| conn.status().state == ConnectionState::Connecting).await;
    sleep(Duration::from_millis(100)).await;
    assert!(!conn.is_linked());

    let listener = TcpListener::bind(&addr).await.unwrap();
    let mut peer = Peer::accept(&listener).await;
    within(dialing).await.unwrap().unwrap();

    assert!(conn.is_linked());
    assert!(peer.expect().await.starts_with("USER "));

    conn.close().await.unwrap();
}

#[tokio::test]
async fn test_close_then_redial() {
    let (listener, addr) = listener().await;
    let conn = Connection::new(config(&addr)).unwrap();

    within(conn.dial()).await.unwrap();
    let mut first = Peer::accept(&listener).await;
    first.register().await;
    eventually(|| conn.status().connected).await;

    conn.close().await.unwrap();
    assert_eq!(conn.status().state, ConnectionState::Disconnected);
    assert!(!conn.status().connected);
    // Closing twice is fine.
    conn.close().await.unwrap();

    within(conn.dial()).await.unwrap();
    let mut second = Peer::accept(&listener).await;
    assert!(second.expect().await.starts_with("USER "));

    conn.close().await.unwrap();
}

#[tokio::test]
async fn test_reconnect_after_end_of_stream() {
    let (listener, addr) = listener().await;
    let conn = Connection::new(IrcConfig {
        reconnect: true,
        ..config(&addr)
    })
    .unwrap();

    within(conn.dial()).await.unwrap();
    let mut first = Peer::accept(&listener).await;
    first.register().await;
    drop(first);

    let mut second = Peer::accept(&listener).await;
    assert!(second.expect().await.starts_with("USER "));
    assert_eq!(second.expect().await, "NICK tenyks");

    eventually(|| conn.is_linked()).await;
    conn.close().await.unwrap();
}

#[tokio::test]
async fn test_connect_hook_error_fails_dial() {
    fn refuse(_: &Connection) -> BoxFuture<'_, HookResult> {
        Box::pin(async { Err(anyhow::anyhow!("not today")) })
    }

    let (listener, addr) = listener().await;
    let conn = Connection::new(config(&addr)).unwrap();
    conn.on_connect(refuse);

    let err = within(conn.dial()).await.unwrap_err();
    assert!(matches!(err, ConnectionError::Hook(_)));
    assert_eq!(err.to_string(), "hook failed: not today");

    // The default hooks ran first, so login still went out.
    let mut peer = Peer::accept(&listener).await;
    assert!(peer.expect().await.starts_with("USER "));
    assert!(conn.is_linked());

    conn.close().await.unwrap();
}
