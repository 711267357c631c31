//! Session state shared by a connection's tasks and hooks.
//!
//! Status and the channel map live together in one [`SessionState`] behind a
//! single lock on the connection; see
//! [`Connection::with_read_lock`](crate::Connection::with_read_lock) and
//! [`Connection::with_write_lock`](crate::Connection::with_write_lock).

mod channel;

use std::collections::HashMap;

use chrono::{DateTime, Utc};

pub use self::channel::{Channel, ChannelStatus, Nick};

use crate::casemap::irc_to_lower;

/// Lifecycle of the link to the server.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ConnectionState {
    /// No socket.
    #[default]
    Disconnected,
    /// Dialing, or retrying after a failed dial.
    Connecting,
    /// Socket up and tasks running. Registration is tracked separately by
    /// [`ConnectionStatus::connected`].
    Connected,
}

/// What a connection knows about its session with the server.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConnectionStatus {
    pub state: ConnectionState,
    /// Registered: set by 001, cleared on close.
    pub connected: bool,
    pub current_nick: Option<String>,
    /// Server name from the 001 prefix.
    pub current_server: Option<String>,
    pub started_at: DateTime<Utc>,
    /// When the server last sent PING.
    pub last_server_probe: Option<DateTime<Utc>>,
    /// When we last queued a PONG.
    pub last_server_probe_response: Option<DateTime<Utc>>,
}

impl ConnectionStatus {
    pub fn new() -> Self {
        ConnectionStatus {
            state: ConnectionState::Disconnected,
            connected: false,
            current_nick: None,
            current_server: None,
            started_at: Utc::now(),
            last_server_probe: None,
            last_server_probe_response: None,
        }
    }
}

impl Default for ConnectionStatus {
    fn default() -> Self {
        Self::new()
    }
}

/// Status plus the channel map.
#[derive(Clone, Debug)]
pub struct SessionState {
    pub status: ConnectionStatus,
    channels: HashMap<String, Channel>,
    nick_attempt: usize,
}

impl SessionState {
    /// Track `channels`, all parted.
    pub fn new<I, S>(channels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let channels = channels
            .into_iter()
            .map(|name| {
                let name = name.as_ref();
                (irc_to_lower(name), Channel::new(name))
            })
            .collect();

        SessionState {
            status: ConnectionStatus::new(),
            channels,
            nick_attempt: 0,
        }
    }

    /// Case-insensitive lookup.
    pub fn channel(&self, name: &str) -> Option<&Channel> {
        self.channels.get(&irc_to_lower(name))
    }

    pub fn channel_mut(&mut self, name: &str) -> Option<&mut Channel> {
        self.channels.get_mut(&irc_to_lower(name))
    }

    /// Look up a channel, tracking it (parted) if it is new.
    pub fn channel_entry(&mut self, name: &str) -> &mut Channel {
        self.channels
            .entry(irc_to_lower(name))
            .or_insert_with(|| Channel::new(name))
    }

    pub fn channels(&self) -> impl Iterator<Item = &Channel> {
        self.channels.values()
    }

    /// Put every tracked channel back to a fresh parted state.
    pub fn reset_channels(&mut self) {
        for channel in self.channels.values_mut() {
            *channel = Channel::new(channel.name.clone());
        }
    }

    /// Merge one NAMES fragment. Returns false if the channel is unknown or
    /// not joined.
    pub fn merge_names<'a>(
        &mut self,
        channel: &str,
        names: impl IntoIterator<Item = &'a str>,
    ) -> bool {
        self.channel_mut(channel)
            .is_some_and(|c| c.merge_names(names))
    }

    /// Index into the configured nick list of the nick last sent.
    pub fn nick_attempt(&self) -> usize {
        self.nick_attempt
    }

    pub fn set_nick_attempt(&mut self, attempt: usize) {
        self.nick_attempt = attempt;
    }
}
