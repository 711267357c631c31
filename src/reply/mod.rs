//! Typed numeric replies.

mod kind;
mod types;

pub use self::kind::{ReplyKind, UnknownNumeric};
pub use self::types::{
    EndOfNamesReply, JoinRejectedReply, NamesReply, NickInUseReply, WelcomeReply,
};

use crate::command::MessageObject;
use crate::error::ValidationError;
use crate::message::Message;

/// A numeric reply, keyed by code.
#[derive(Clone, Debug)]
pub enum Reply {
    Welcome(WelcomeReply),
    Names(NamesReply),
    EndOfNames(EndOfNamesReply),
    NickInUse(NickInUseReply),
    JoinRejected(JoinRejectedReply),
    /// Any numeric without a wrapper.
    Unknown(Message),
}

impl Reply {
    /// The numeric, if it is in the [`ReplyKind`] table.
    pub fn kind(&self) -> Option<ReplyKind> {
        ReplyKind::from_numeric(self.message().command())
    }

    pub fn into_message(self) -> Message {
        match self {
            Reply::Welcome(r) => r.into_message(),
            Reply::Names(r) => r.into_message(),
            Reply::EndOfNames(r) => r.into_message(),
            Reply::NickInUse(r) => r.into_message(),
            Reply::JoinRejected(r) => r.into_message(),
            Reply::Unknown(m) => m,
        }
    }
}

impl MessageObject for Reply {
    fn message(&self) -> &Message {
        match self {
            Reply::Welcome(r) => r.message(),
            Reply::Names(r) => r.message(),
            Reply::EndOfNames(r) => r.message(),
            Reply::NickInUse(r) => r.message(),
            Reply::JoinRejected(r) => r.message(),
            Reply::Unknown(m) => m,
        }
    }

    fn validate(&self) -> Result<(), ValidationError> {
        match self {
            Reply::Welcome(r) => r.validate(),
            Reply::Names(r) => r.validate(),
            Reply::EndOfNames(r) => r.validate(),
            Reply::NickInUse(r) => r.validate(),
            Reply::JoinRejected(r) => r.validate(),
            Reply::Unknown(_) => Ok(()),
        }
    }
}

/// Wrap an inbound numeric with its built-in type, if it has one.
pub fn default_reply(kind: ReplyKind, message: Message) -> Result<Reply, Message> {
    match kind {
        ReplyKind::RPL_WELCOME => Ok(Reply::Welcome(WelcomeReply::from_message(message))),
        ReplyKind::RPL_NAMREPLY => Ok(Reply::Names(NamesReply::from_message(message))),
        ReplyKind::RPL_ENDOFNAMES => Ok(Reply::EndOfNames(EndOfNamesReply::from_message(message))),
        ReplyKind::ERR_NICKNAMEINUSE => Ok(Reply::NickInUse(NickInUseReply::from_message(message))),
        k if k.is_join_rejection() => {
            Ok(Reply::JoinRejected(JoinRejectedReply::from_message(message)))
        }
        _ => Err(message),
    }
}
