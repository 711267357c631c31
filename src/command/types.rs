//! Per-verb command wrappers.
//!
//! Each wrapper owns exactly one [`Message`] and adds the accessors and the
//! validation rule for its verb. Wrappers are produced by the connection's
//! factories for inbound lines and by the `new` constructors for outbound
//! ones.

use std::fmt;
use std::sync::Arc;

use super::MessageObject;
use crate::casemap::irc_eq;
use crate::error::{Arity, ValidationError};
use crate::message::Message;
use crate::validation::{check_arity, check_wire_safe, require_trailing};

macro_rules! command_wrapper {
    ($(#[$meta:meta])* $name:ident, |$msg:ident| $validate:block) => {
        $(#[$meta])*
        #[derive(Clone, Debug)]
        pub struct $name {
            message: Message,
        }

        impl $name {
            /// Wrap a message without checking it; call
            /// [`validate`](MessageObject::validate) before relying on the
            /// accessors' shape.
            pub fn from_message(message: Message) -> Self {
                $name { message }
            }

            pub fn into_message(self) -> Message {
                self.message
            }
        }

        impl MessageObject for $name {
            fn message(&self) -> &Message {
                &self.message
            }

            fn validate(&self) -> Result<(), ValidationError> {
                let $msg = &self.message;
                $validate
            }
        }
    };
}

command_wrapper!(
    /// `PASS <password>`
    PassCommand,
    |msg| {
        check_arity(msg, Arity::Exactly(1))?;
        check_wire_safe(msg)
    }
);

impl PassCommand {
    pub fn new(password: impl Into<String>) -> Self {
        PassCommand::from_message(Message::new("PASS", vec![password.into()], None))
    }

    pub fn password(&self) -> Option<&str> {
        self.message.param(0)
    }
}

command_wrapper!(
    /// `USER <user> <mode> * :<real name>`
    UserCommand,
    |msg| {
        check_arity(msg, Arity::Exactly(3))?;
        require_trailing(msg)?;
        check_wire_safe(msg)
    }
);

impl UserCommand {
    pub fn new(user: impl Into<String>, mode: u32, real_name: impl Into<String>) -> Self {
        UserCommand::from_message(Message::new(
            "USER",
            vec![user.into(), mode.to_string(), "*".to_owned()],
            Some(real_name.into()),
        ))
    }

    pub fn user(&self) -> Option<&str> {
        self.message.param(0)
    }

    pub fn real_name(&self) -> Option<&str> {
        self.message.trail()
    }
}

command_wrapper!(
    /// `NICK <nick>`
    NickCommand,
    |msg| {
        check_arity(msg, Arity::Exactly(1))?;
        check_wire_safe(msg)
    }
);

impl NickCommand {
    pub fn new(nick: impl Into<String>) -> Self {
        NickCommand::from_message(Message::new("NICK", vec![nick.into()], None))
    }

    /// The new nick. Servers sometimes send it as the trailing parameter.
    pub fn nick(&self) -> Option<&str> {
        self.message.param(0).or_else(|| self.message.trail())
    }
}

command_wrapper!(
    /// `JOIN <channel>{,<channel>}`
    JoinCommand,
    |msg| {
        check_arity(msg, Arity::AtLeast(1))?;
        check_wire_safe(msg)
    }
);

impl JoinCommand {
    /// One JOIN naming every channel, comma separated, in the given order.
    pub fn new<I, S>(channels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let list = channels
            .into_iter()
            .map(|c| c.as_ref().to_owned())
            .collect::<Vec<_>>()
            .join(",");
        JoinCommand::from_message(Message::new("JOIN", vec![list], None))
    }

    /// The channel an inbound JOIN reports. Some servers put it in the
    /// trailing parameter.
    pub fn channel(&self) -> Option<&str> {
        self.message.param(0).or_else(|| self.message.trail())
    }

    pub fn channels(&self) -> Vec<&str> {
        self.channel()
            .map(|list| list.split(',').filter(|c| !c.is_empty()).collect())
            .unwrap_or_default()
    }
}

command_wrapper!(
    /// `PART <channel>{,<channel>} [:<reason>]`
    PartCommand,
    |msg| {
        check_arity(msg, Arity::AtLeast(1))?;
        check_wire_safe(msg)
    }
);

impl PartCommand {
    pub fn new<I, S>(channels: I, reason: Option<&str>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let list = channels
            .into_iter()
            .map(|c| c.as_ref().to_owned())
            .collect::<Vec<_>>()
            .join(",");
        PartCommand::from_message(Message::new(
            "PART",
            vec![list],
            reason.map(str::to_owned),
        ))
    }

    pub fn channels(&self) -> Vec<&str> {
        self.message
            .param(0)
            .map(|list| list.split(',').filter(|c| !c.is_empty()).collect())
            .unwrap_or_default()
    }

    pub fn reason(&self) -> Option<&str> {
        self.message.trail()
    }
}

command_wrapper!(
    /// `KICK <channel> <nick> [:<reason>]`
    KickCommand,
    |msg| {
        check_arity(msg, Arity::AtLeast(2))?;
        check_wire_safe(msg)
    }
);

impl KickCommand {
    pub fn new(channel: impl Into<String>, nick: impl Into<String>, reason: Option<&str>) -> Self {
        KickCommand::from_message(Message::new(
            "KICK",
            vec![channel.into(), nick.into()],
            reason.map(str::to_owned),
        ))
    }

    pub fn channel(&self) -> Option<&str> {
        self.message.param(0)
    }

    /// The nick being kicked.
    pub fn target(&self) -> Option<&str> {
        self.message.param(1)
    }

    pub fn reason(&self) -> Option<&str> {
        self.message.trail()
    }
}

command_wrapper!(
    /// `PING <server>`
    PingCommand,
    |msg| { check_wire_safe(msg) }
);

impl PingCommand {
    /// The token to echo back in the PONG.
    pub fn server(&self) -> &str {
        self.message
            .trail()
            .or_else(|| self.message.param(0))
            .unwrap_or_default()
    }
}

command_wrapper!(
    /// `PONG :<server>`
    PongCommand,
    |msg| { check_wire_safe(msg) }
);

impl PongCommand {
    pub fn new(server: impl Into<String>) -> Self {
        PongCommand::from_message(Message::new("PONG", Vec::new(), Some(server.into())))
    }

    pub fn server(&self) -> &str {
        self.message
            .trail()
            .or_else(|| self.message.param(0))
            .unwrap_or_default()
    }
}

/// Read access to the live session, used by inbound PRIVMSGs to decide
/// whether they are addressed to us.
pub trait SessionView: Send + Sync {
    /// Our current nick, or `None` while the connection is not registered.
    fn current_nick(&self) -> Option<String>;
}

/// `PRIVMSG <target> :<text>`
#[derive(Clone)]
pub struct PrivmsgCommand {
    message: Message,
    session: Option<Arc<dyn SessionView>>,
}

impl PrivmsgCommand {
    pub fn new(target: impl Into<String>, text: impl Into<String>) -> Self {
        PrivmsgCommand::from_message(Message::new(
            "PRIVMSG",
            vec![target.into()],
            Some(text.into()),
        ))
    }

    /// Wrap a message with no session attached; `is_direct` and
    /// `is_mention` always answer false.
    pub fn from_message(message: Message) -> Self {
        PrivmsgCommand {
            message,
            session: None,
        }
    }

    /// Wrap an inbound message so its addressing checks read `session`.
    pub fn with_session(message: Message, session: Arc<dyn SessionView>) -> Self {
        PrivmsgCommand {
            message,
            session: Some(session),
        }
    }

    pub fn into_message(self) -> Message {
        self.message
    }

    /// Channel or nick the message was sent to.
    pub fn target(&self) -> Option<&str> {
        self.message.param(0)
    }

    pub fn text(&self) -> &str {
        self.message.trail().unwrap_or_default()
    }

    /// Sent straight to our nick rather than to a channel.
    pub fn is_direct(&self) -> bool {
        match (self.current_nick(), self.target()) {
            (Some(nick), Some(target)) => irc_eq(target, &nick),
            _ => false,
        }
    }

    /// Text starts with `<our nick>: `.
    pub fn is_mention(&self) -> bool {
        let Some(nick) = self.current_nick() else {
            return false;
        };
        match self.text().split_once(": ") {
            Some((head, _)) => irc_eq(head, &nick),
            None => false,
        }
    }

    fn current_nick(&self) -> Option<String> {
        self.session.as_ref().and_then(|s| s.current_nick())
    }
}

impl MessageObject for PrivmsgCommand {
    fn message(&self) -> &Message {
        &self.message
    }

    fn validate(&self) -> Result<(), ValidationError> {
        check_arity(&self.message, Arity::Exactly(1))?;
        require_trailing(&self.message)?;
        check_wire_safe(&self.message)
    }
}

impl fmt::Debug for PrivmsgCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivmsgCommand")
            .field("message", &self.message)
            .field("session", &self.session.is_some())
            .finish()
    }
}
