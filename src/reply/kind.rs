//! Numeric reply table.
//!
//! Only the numerics the engine reacts to, or that a hook is likely to want
//! by name, are listed. Any other three-digit code still parses; it becomes
//! [`Reply::Unknown`](super::Reply::Unknown).

#![allow(non_camel_case_types)]

use std::fmt;
use std::str::FromStr;

/// A known numeric reply.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u16)]
pub enum ReplyKind {
    // Registration burst. 001 marks the session registered.
    RPL_WELCOME = 1,
    RPL_YOURHOST = 2,
    RPL_CREATED = 3,
    RPL_MYINFO = 4,
    RPL_ISUPPORT = 5,

    // Channel state after a JOIN.
    RPL_NOTOPIC = 331,
    RPL_TOPIC = 332,
    /// One fragment of a channel's member list; merged into the channel.
    RPL_NAMREPLY = 353,
    RPL_ENDOFNAMES = 366,

    ERR_NOSUCHNICK = 401,
    /// Refuses a JOIN, like 471 and 473-475.
    ERR_NOSUCHCHANNEL = 403,
    ERR_ERRONEUSNICKNAME = 432,
    /// Before registration this moves on to the next configured nick.
    ERR_NICKNAMEINUSE = 433,
    ERR_CHANNELISFULL = 471,
    ERR_INVITEONLYCHAN = 473,
    ERR_BANNEDFROMCHAN = 474,
    ERR_BADCHANNELKEY = 475,
}

impl ReplyKind {
    #[inline]
    pub fn code(&self) -> u16 {
        *self as u16
    }

    /// Look up a numeric code.
    pub fn from_code(code: u16) -> Option<ReplyKind> {
        Some(match code {
            1 => ReplyKind::RPL_WELCOME,
            2 => ReplyKind::RPL_YOURHOST,
            3 => ReplyKind::RPL_CREATED,
            4 => ReplyKind::RPL_MYINFO,
            5 => ReplyKind::RPL_ISUPPORT,
            331 => ReplyKind::RPL_NOTOPIC,
            332 => ReplyKind::RPL_TOPIC,
            353 => ReplyKind::RPL_NAMREPLY,
            366 => ReplyKind::RPL_ENDOFNAMES,
            401 => ReplyKind::ERR_NOSUCHNICK,
            403 => ReplyKind::ERR_NOSUCHCHANNEL,
            432 => ReplyKind::ERR_ERRONEUSNICKNAME,
            433 => ReplyKind::ERR_NICKNAMEINUSE,
            471 => ReplyKind::ERR_CHANNELISFULL,
            473 => ReplyKind::ERR_INVITEONLYCHAN,
            474 => ReplyKind::ERR_BANNEDFROMCHAN,
            475 => ReplyKind::ERR_BADCHANNELKEY,
            _ => return None,
        })
    }

    /// Look up a three-digit command token such as `"001"`.
    pub fn from_numeric(token: &str) -> Option<ReplyKind> {
        if token.len() != 3 || !token.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        token.parse().ok().and_then(ReplyKind::from_code)
    }

    /// 4xx and 5xx codes.
    #[inline]
    pub fn is_error(&self) -> bool {
        (400..600).contains(&self.code())
    }

    /// Numerics a server sends when it refuses a JOIN.
    pub fn is_join_rejection(&self) -> bool {
        matches!(
            self,
            ReplyKind::ERR_NOSUCHCHANNEL
                | ReplyKind::ERR_CHANNELISFULL
                | ReplyKind::ERR_INVITEONLYCHAN
                | ReplyKind::ERR_BANNEDFROMCHAN
                | ReplyKind::ERR_BADCHANNELKEY
        )
    }
}

impl fmt::Display for ReplyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:03}", self.code())
    }
}

/// Error returned when a token is not a numeric in the table.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown reply numeric: {0}")]
pub struct UnknownNumeric(pub String);

impl FromStr for ReplyKind {
    type Err = UnknownNumeric;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ReplyKind::from_numeric(s).ok_or_else(|| UnknownNumeric(s.to_owned()))
    }
}
