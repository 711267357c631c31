//! A classified inbound line.

use crate::command::{Command, MessageObject};
use crate::message::{Message, MessageType};
use crate::reply::Reply;

/// What the receive loop hands to the dispatcher.
#[derive(Clone, Debug)]
pub enum Inbound {
    Command(Command),
    Reply(Reply),
}

impl Inbound {
    pub fn message(&self) -> &Message {
        match self {
            Inbound::Command(c) => c.message(),
            Inbound::Reply(r) => r.message(),
        }
    }

    pub fn message_type(&self) -> MessageType {
        match self {
            Inbound::Command(_) => MessageType::Command,
            Inbound::Reply(_) => MessageType::Reply,
        }
    }
}

impl From<Command> for Inbound {
    fn from(c: Command) -> Self {
        Inbound::Command(c)
    }
}

impl From<Reply> for Inbound {
    fn from(r: Reply) -> Self {
        Inbound::Reply(r)
    }
}
