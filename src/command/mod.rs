//! Typed IRC commands.
//!
//! A [`Command`] is one of the verb wrappers in this module or
//! [`Command::Unknown`] for anything else. Inbound lines are classified by
//! the connection (see [`Factories`](crate::connection::Factories)); outbound
//! commands are built with the wrappers' constructors and handed to
//! [`Connection::enqueue_command`](crate::Connection::enqueue_command).

mod kind;
mod types;

pub use self::kind::{CommandKind, UnknownVerb};
pub use self::types::{
    JoinCommand, KickCommand, NickCommand, PartCommand, PassCommand, PingCommand, PongCommand,
    PrivmsgCommand, SessionView, UserCommand,
};

use crate::error::ValidationError;
use crate::message::Message;
use crate::validation::check_wire_safe;

/// Shared surface of every command and reply wrapper.
pub trait MessageObject {
    /// The wrapped message.
    fn message(&self) -> &Message;

    /// Check the verb's shape rule.
    fn validate(&self) -> Result<(), ValidationError>;

    /// Wire form including the CRLF terminator.
    fn encode(&self) -> String {
        self.message().encode()
    }
}

/// A command, keyed by verb.
#[derive(Clone, Debug)]
pub enum Command {
    Pass(PassCommand),
    User(UserCommand),
    Nick(NickCommand),
    Join(JoinCommand),
    Part(PartCommand),
    Kick(KickCommand),
    Privmsg(PrivmsgCommand),
    Ping(PingCommand),
    Pong(PongCommand),
    /// Any verb without a wrapper. Only wire safety is checked.
    Unknown(Message),
}

impl Command {
    /// The verb table entry, or `None` for [`Command::Unknown`].
    pub fn kind(&self) -> Option<CommandKind> {
        Some(match self {
            Command::Pass(_) => CommandKind::Pass,
            Command::User(_) => CommandKind::User,
            Command::Nick(_) => CommandKind::Nick,
            Command::Join(_) => CommandKind::Join,
            Command::Part(_) => CommandKind::Part,
            Command::Kick(_) => CommandKind::Kick,
            Command::Privmsg(_) => CommandKind::Privmsg,
            Command::Ping(_) => CommandKind::Ping,
            Command::Pong(_) => CommandKind::Pong,
            Command::Unknown(_) => return None,
        })
    }

    pub fn into_message(self) -> Message {
        match self {
            Command::Pass(c) => c.into_message(),
            Command::User(c) => c.into_message(),
            Command::Nick(c) => c.into_message(),
            Command::Join(c) => c.into_message(),
            Command::Part(c) => c.into_message(),
            Command::Kick(c) => c.into_message(),
            Command::Privmsg(c) => c.into_message(),
            Command::Ping(c) => c.into_message(),
            Command::Pong(c) => c.into_message(),
            Command::Unknown(m) => m,
        }
    }
}

impl MessageObject for Command {
    fn message(&self) -> &Message {
        match self {
            Command::Pass(c) => c.message(),
            Command::User(c) => c.message(),
            Command::Nick(c) => c.message(),
            Command::Join(c) => c.message(),
            Command::Part(c) => c.message(),
            Command::Kick(c) => c.message(),
            Command::Privmsg(c) => c.message(),
            Command::Ping(c) => c.message(),
            Command::Pong(c) => c.message(),
            Command::Unknown(m) => m,
        }
    }

    fn validate(&self) -> Result<(), ValidationError> {
        match self {
            Command::Pass(c) => c.validate(),
            Command::User(c) => c.validate(),
            Command::Nick(c) => c.validate(),
            Command::Join(c) => c.validate(),
            Command::Part(c) => c.validate(),
            Command::Kick(c) => c.validate(),
            Command::Privmsg(c) => c.validate(),
            Command::Ping(c) => c.validate(),
            Command::Pong(c) => c.validate(),
            Command::Unknown(m) => check_wire_safe(m),
        }
    }
}

macro_rules! impl_from_wrapper {
    ($($wrapper:ident => $variant:ident),* $(,)?) => {
        $(
            impl From<$wrapper> for Command {
                fn from(c: $wrapper) -> Self {
                    Command::$variant(c)
                }
            }
        )*
    };
}

impl_from_wrapper! {
    PassCommand => Pass,
    UserCommand => User,
    NickCommand => Nick,
    JoinCommand => Join,
    PartCommand => Part,
    KickCommand => Kick,
    PrivmsgCommand => Privmsg,
    PingCommand => Ping,
    PongCommand => Pong,
}

/// Wrap an inbound message with the built-in type for its verb.
pub fn default_command(kind: CommandKind, message: Message) -> Command {
    match kind {
        CommandKind::Pass => Command::Pass(PassCommand::from_message(message)),
        CommandKind::User => Command::User(UserCommand::from_message(message)),
        CommandKind::Nick => Command::Nick(NickCommand::from_message(message)),
        CommandKind::Join => Command::Join(JoinCommand::from_message(message)),
        CommandKind::Part => Command::Part(PartCommand::from_message(message)),
        CommandKind::Kick => Command::Kick(KickCommand::from_message(message)),
        CommandKind::Privmsg => Command::Privmsg(PrivmsgCommand::from_message(message)),
        CommandKind::Ping => Command::Ping(PingCommand::from_message(message)),
        CommandKind::Pong => Command::Pong(PongCommand::from_message(message)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_command_picks_wrapper() {
        let msg = Message::parse("PING :irc.example.net").unwrap();
        let cmd = default_command(CommandKind::Ping, msg);
        assert!(matches!(cmd, Command::Ping(_)));
        assert_eq!(cmd.kind(), Some(CommandKind::Ping));
        assert_eq!(cmd.message().trail(), Some("irc.example.net"));
    }

    #[test]
    fn test_unknown_only_checks_wire_safety() {
        let cmd = Command::Unknown(Message::new("TOPIC", vec![], None));
        assert_eq!(cmd.kind(), None);
        assert!(cmd.validate().is_ok());

        let cmd = Command::Unknown(Message::new("TOPIC", vec!["#c".into()], Some("a\rb".into())));
        assert!(cmd.validate().is_err());
    }

    #[test]
    fn test_from_wrapper() {
        let cmd: Command = NickCommand::new("tenyks").into();
        assert_eq!(cmd.encode(), "NICK tenyks\r\n");
        assert_eq!(cmd.into_message().command(), "NICK");
    }
}
