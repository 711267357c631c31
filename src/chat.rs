//! Messages exchanged with the relay on the other side of an adapter.
//!
//! IRC targets are addressed by path: `/irc/<connection>/<target>`, where
//! the target is a channel or a nick.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::command::{MessageObject, PrivmsgCommand};

/// A chat line from a person (or a bot), in a channel or direct.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct ChatMessage {
    /// Where the message was sent, or where it should go.
    pub destination_path: String,
    /// Who sent it.
    pub origin_path: String,
    /// Sent straight to us rather than to a channel.
    pub direct: bool,
    /// A channel message that starts by addressing us.
    pub mention: bool,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    /// An outbound chat message for `destination_path`.
    pub fn new(destination_path: impl Into<String>, content: impl Into<String>) -> Self {
        ChatMessage {
            destination_path: destination_path.into(),
            origin_path: String::new(),
            direct: false,
            mention: false,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    /// Translate an inbound PRIVMSG received on `connection`.
    pub fn from_privmsg(connection: &str, privmsg: &PrivmsgCommand) -> Self {
        let message = privmsg.message();
        let origin = message
            .source_nick()
            .or_else(|| message.prefix().map(|p| p.raw()))
            .unwrap_or_default();

        ChatMessage {
            destination_path: irc_path(connection, privmsg.target().unwrap_or_default()),
            origin_path: irc_path(connection, origin),
            direct: privmsg.is_direct(),
            mention: privmsg.is_mention(),
            content: privmsg.text().to_owned(),
            timestamp: message.created_at(),
        }
    }
}

/// An operational message, e.g. a liveness probe between services.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ControlMessage {
    pub oid: String,
    pub kind: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl ControlMessage {
    pub fn new(
        oid: impl Into<String>,
        kind: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        ControlMessage {
            oid: oid.into(),
            kind: kind.into(),
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Anything that crosses the adapter boundary.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(tag = "type", content = "message", rename_all = "lowercase")
)]
pub enum RelayMessage {
    Chat(ChatMessage),
    Control(ControlMessage),
}

impl RelayMessage {
    /// `"chat"` or `"control"`.
    pub fn kind(&self) -> &'static str {
        match self {
            RelayMessage::Chat(_) => "chat",
            RelayMessage::Control(_) => "control",
        }
    }
}

impl From<ChatMessage> for RelayMessage {
    fn from(m: ChatMessage) -> Self {
        RelayMessage::Chat(m)
    }
}

impl From<ControlMessage> for RelayMessage {
    fn from(m: ControlMessage) -> Self {
        RelayMessage::Control(m)
    }
}

/// Downstream consumer of relay messages.
pub type MessageHandler = Arc<dyn Fn(RelayMessage) + Send + Sync>;

/// `/irc/<connection>/<target>`
pub fn irc_path(connection: &str, target: &str) -> String {
    format!("/irc/{}/{}", connection, target)
}

/// The last non-empty segment of `path`, or `""`.
///
/// ```
/// use slirc_relay::chat::path_target;
///
/// assert_eq!(path_target("/irc/libera/#rust"), "#rust");
/// assert_eq!(path_target("/irc/libera/kyle/"), "kyle");
/// assert_eq!(path_target("/"), "");
/// ```
pub fn path_target(path: &str) -> &str {
    path.rsplit('/').find(|s| !s.is_empty()).unwrap_or_default()
}
