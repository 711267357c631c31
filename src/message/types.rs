//! The owned IRC message.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};

use super::serialize::render_line;
use super::tags::Tags;
use crate::error::MessageParseError;
use crate::prefix::Prefix;

/// Whether a message is a command verb or a numeric reply.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MessageType {
    /// A verb such as `PRIVMSG` or `PING`.
    Command,
    /// A three-digit numeric such as `001` or `353`.
    Reply,
}

impl MessageType {
    /// Classify a command token: `Reply` iff it is exactly three ASCII digits.
    pub fn of(command: &str) -> Self {
        if command.len() == 3 && command.bytes().all(|b| b.is_ascii_digit()) {
            MessageType::Reply
        } else {
            MessageType::Command
        }
    }
}

/// A single IRC line, either parsed from the server or built for sending.
///
/// Messages are immutable. Outbound messages render their raw text once at
/// construction; parsed messages keep the line they were read from.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Message {
    pub(super) tags: Option<Tags>,
    pub(super) prefix: Option<Prefix>,
    pub(super) command: String,
    pub(super) message_type: MessageType,
    pub(super) params: Vec<String>,
    pub(super) trail: Option<String>,
    pub(super) created_at: DateTime<Utc>,
    pub(super) raw: String,
    pub(super) parsed: bool,
}

impl Message {
    /// Build an outbound message.
    ///
    /// ```
    /// use slirc_relay::Message;
    ///
    /// let msg = Message::new("PRIVMSG", vec!["#rust".into()], Some("hello".into()));
    /// assert_eq!(msg.raw(), "PRIVMSG #rust :hello");
    /// assert_eq!(msg.encode(), "PRIVMSG #rust :hello\r\n");
    /// ```
    pub fn new(command: impl Into<String>, params: Vec<String>, trail: Option<String>) -> Self {
        let command = command.into();
        let raw = render_line(&command, &params, trail.as_deref());
        Message {
            tags: None,
            prefix: None,
            message_type: MessageType::of(&command),
            command,
            params,
            trail,
            created_at: Utc::now(),
            raw,
            parsed: false,
        }
    }

    /// Parse a line received from a server. See [`parse`](super::parse) for
    /// the grammar.
    pub fn parse(line: &str) -> Result<Self, MessageParseError> {
        super::parse::parse_line(line)
    }

    pub fn tags(&self) -> Option<&Tags> {
        self.tags.as_ref()
    }

    /// Look up a single tag value.
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.as_ref().and_then(|tags| tags.get(key))
    }

    pub fn prefix(&self) -> Option<&Prefix> {
        self.prefix.as_ref()
    }

    /// Nick of the sender, when the prefix names a user.
    pub fn source_nick(&self) -> Option<&str> {
        self.prefix.as_ref().and_then(Prefix::nick)
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn message_type(&self) -> MessageType {
        self.message_type
    }

    pub fn is_reply(&self) -> bool {
        self.message_type == MessageType::Reply
    }

    /// Middle parameters, in order.
    pub fn params(&self) -> &[String] {
        &self.params
    }

    pub fn param(&self, index: usize) -> Option<&str> {
        self.params.get(index).map(String::as_str)
    }

    /// The trailing parameter, if the line had one (possibly empty).
    pub fn trail(&self) -> Option<&str> {
        self.trail.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// The line this message was parsed from, or its rendering if it was
    /// built locally. Never includes the CRLF terminator.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Whether this message came from [`Message::parse`].
    pub fn is_parsed(&self) -> bool {
        self.parsed
    }

    /// Wire form: `COMMAND[ params...][ :trail]\r\n`.
    ///
    /// Tags and prefix are never written; the trailing parameter is written
    /// only when non-empty.
    pub fn encode(&self) -> String {
        let mut line = render_line(&self.command, &self.params, self.trail.as_deref());
        line.push_str("\r\n");
        line
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render_line(
            &self.command,
            &self.params,
            self.trail.as_deref(),
        ))
    }
}

impl FromStr for Message {
    type Err = MessageParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Message::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_type_classification() {
        assert_eq!(MessageType::of("001"), MessageType::Reply);
        assert_eq!(MessageType::of("433"), MessageType::Reply);
        assert_eq!(MessageType::of("PRIVMSG"), MessageType::Command);
        assert_eq!(MessageType::of("01"), MessageType::Command);
        assert_eq!(MessageType::of("0001"), MessageType::Command);
        assert_eq!(MessageType::of("1a3"), MessageType::Command);
    }

    #[test]
    fn test_new_renders_raw() {
        let msg = Message::new("NICK", vec!["tenyks".into()], None);
        assert_eq!(msg.raw(), "NICK tenyks");
        assert!(!msg.is_parsed());
        assert_eq!(msg.message_type(), MessageType::Command);

        let msg = Message::new(
            "USER",
            vec!["bot".into(), "0".into(), "*".into()],
            Some("Real Name".into()),
        );
        assert_eq!(msg.encode(), "USER bot 0 * :Real Name\r\n");
    }

    #[test]
    fn test_encode_without_params() {
        assert_eq!(Message::new("QUIT", vec![], None).encode(), "QUIT\r\n");
        assert_eq!(
            Message::new("PING", vec![], Some("irc.example.net".into())).encode(),
            "PING :irc.example.net\r\n"
        );
    }

    #[test]
    fn test_empty_trail_is_not_written() {
        let msg = Message::new("PRIVMSG", vec!["#c".into()], Some(String::new()));
        assert_eq!(msg.encode(), "PRIVMSG #c\r\n");
        assert_eq!(msg.trail(), Some(""));
    }

    #[test]
    fn test_display_matches_encode() {
        let msg = Message::new("JOIN", vec!["#a,#b".into()], None);
        assert_eq!(format!("{}\r\n", msg), msg.encode());
    }
}
