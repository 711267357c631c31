//! Verb table for the commands the engine understands.

use std::fmt;
use std::str::FromStr;

/// A command verb with a dedicated wrapper type.
///
/// Verbs outside this table still parse; they become
/// [`Command::Unknown`](super::Command::Unknown).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CommandKind {
    Pass,
    User,
    Nick,
    Join,
    Part,
    Kick,
    Privmsg,
    Ping,
    Pong,
}

impl CommandKind {
    /// Every kind, in table order.
    pub const ALL: [CommandKind; 9] = [
        CommandKind::Pass,
        CommandKind::User,
        CommandKind::Nick,
        CommandKind::Join,
        CommandKind::Part,
        CommandKind::Kick,
        CommandKind::Privmsg,
        CommandKind::Ping,
        CommandKind::Pong,
    ];

    /// The verb as written on the wire.
    pub fn verb(self) -> &'static str {
        match self {
            CommandKind::Pass => "PASS",
            CommandKind::User => "USER",
            CommandKind::Nick => "NICK",
            CommandKind::Join => "JOIN",
            CommandKind::Part => "PART",
            CommandKind::Kick => "KICK",
            CommandKind::Privmsg => "PRIVMSG",
            CommandKind::Ping => "PING",
            CommandKind::Pong => "PONG",
        }
    }

    /// Look up a verb, ignoring ASCII case.
    ///
    /// ```
    /// use slirc_relay::CommandKind;
    ///
    /// assert_eq!(CommandKind::from_verb("privmsg"), Some(CommandKind::Privmsg));
    /// assert_eq!(CommandKind::from_verb("TOPIC"), None);
    /// ```
    pub fn from_verb(verb: &str) -> Option<CommandKind> {
        CommandKind::ALL
            .into_iter()
            .find(|kind| kind.verb().eq_ignore_ascii_case(verb))
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.verb())
    }
}

/// Error returned when a string is not a known verb.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown command verb: {0}")]
pub struct UnknownVerb(pub String);

impl FromStr for CommandKind {
    type Err = UnknownVerb;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CommandKind::from_verb(s).ok_or_else(|| UnknownVerb(s.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verb_round_trip() {
        for kind in CommandKind::ALL {
            assert_eq!(CommandKind::from_verb(kind.verb()), Some(kind));
            assert_eq!(kind.to_string(), kind.verb());
        }
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(CommandKind::from_verb("Ping"), Some(CommandKind::Ping));
        assert_eq!("nick".parse::<CommandKind>(), Ok(CommandKind::Nick));
    }

    #[test]
    fn test_unknown_verb() {
        assert_eq!(
            "CTCP".parse::<CommandKind>(),
            Err(UnknownVerb("CTCP".to_string()))
        );
        assert_eq!(CommandKind::from_verb("001"), None);
    }
}
