//! Per-numeric reply wrappers.

use crate::command::MessageObject;
use crate::error::{Arity, ValidationError};
use crate::message::Message;
use crate::validation::check_arity;

macro_rules! reply_wrapper {
    ($(#[$meta:meta])* $name:ident, |$msg:ident| $validate:block) => {
        $(#[$meta])*
        #[derive(Clone, Debug)]
        pub struct $name {
            message: Message,
        }

        impl $name {
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

reply_wrapper!(
    /// 001 `RPL_WELCOME`: registration succeeded.
    WelcomeReply,
    |_msg| { Ok(()) }
);

impl WelcomeReply {
    /// The nick the server registered us under.
    pub fn nick(&self) -> Option<&str> {
        self.message.param(0)
    }
}

reply_wrapper!(
    /// 353 `RPL_NAMREPLY`: `<me> [<type>] <channel> :<names>`
    NamesReply,
    |msg| { check_arity(msg, Arity::Between(2, 3)) }
);

impl NamesReply {
    /// The channel is always the last middle parameter.
    pub fn channel(&self) -> Option<&str> {
        self.message.params().last().map(String::as_str)
    }

    /// Names in this fragment, with any membership prefix kept as sent.
    pub fn names(&self) -> Vec<&str> {
        self.message
            .trail()
            .map(|t| t.split_whitespace().collect())
            .unwrap_or_default()
    }
}

reply_wrapper!(
    /// 366 `RPL_ENDOFNAMES`: `<me> <channel> :End of /NAMES list`
    EndOfNamesReply,
    |msg| { check_arity(msg, Arity::Exactly(2)) }
);

impl EndOfNamesReply {
    pub fn channel(&self) -> Option<&str> {
        self.message.params().last().map(String::as_str)
    }
}

reply_wrapper!(
    /// 433 `ERR_NICKNAMEINUSE`: `<me|*> <nick> :Nickname is already in use`
    NickInUseReply,
    |_msg| { Ok(()) }
);

impl NickInUseReply {
    /// The nick that was refused.
    pub fn nick(&self) -> Option<&str> {
        self.message.param(1)
    }
}

reply_wrapper!(
    /// 403, 471, 473, 474 or 475: `<me> <channel> :<reason>`
    JoinRejectedReply,
    |msg| { check_arity(msg, Arity::AtLeast(2)) }
);

impl JoinRejectedReply {
    pub fn channel(&self) -> Option<&str> {
        self.message.param(1)
    }

    /// The server's explanation, or the numeric if it gave none.
    pub fn reason(&self) -> &str {
        match self.message.trail() {
            Some(t) if !t.is_empty() => t,
            _ => self.message.command(),
        }
    }
}
