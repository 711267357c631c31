//! Message prefix (source).

use std::fmt;

/// The origin of a message: a server name or `nick!ident@host`.
///
/// The user parts are only filled in when the raw prefix contains both `!`
/// and `@` with the `!` first. Anything else (a server name, a bare nick) is
/// kept in [`raw`](Prefix::raw) only.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Prefix {
    raw: String,
    user: Option<UserParts>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
struct UserParts {
    nick: String,
    ident: String,
    host: String,
}

impl Prefix {
    /// Decompose a raw prefix (without the leading `:`).
    pub fn parse(raw: &str) -> Self {
        let user = match (raw.find('!'), raw.find('@')) {
            (Some(bang), Some(at)) if bang < at => Some(UserParts {
                nick: raw[..bang].to_owned(),
                ident: raw[bang + 1..at].to_owned(),
                host: raw[at + 1..].to_owned(),
            }),
            _ => None,
        };

        Prefix {
            raw: raw.to_owned(),
            user,
        }
    }

    /// The unaltered prefix text.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn nick(&self) -> Option<&str> {
        self.user.as_ref().map(|u| u.nick.as_str())
    }

    pub fn ident(&self) -> Option<&str> {
        self.user.as_ref().map(|u| u.ident.as_str())
    }

    pub fn host(&self) -> Option<&str> {
        self.user.as_ref().map(|u| u.host.as_str())
    }

    /// Whether the prefix names a user rather than a server.
    pub fn is_user(&self) -> bool {
        self.user.is_some()
    }
}

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_prefix() {
        let p = Prefix::parse("nick!~ident@host.example.com");
        assert!(p.is_user());
        assert_eq!(p.nick(), Some("nick"));
        assert_eq!(p.ident(), Some("~ident"));
        assert_eq!(p.host(), Some("host.example.com"));
        assert_eq!(p.raw(), "nick!~ident@host.example.com");
    }

    #[test]
    fn test_server_prefix() {
        let p = Prefix::parse("irc.example.net");
        assert!(!p.is_user());
        assert_eq!(p.nick(), None);
        assert_eq!(p.to_string(), "irc.example.net");
    }

    #[test]
    fn test_partial_prefixes_stay_raw() {
        // '@' before '!' or either marker missing: no decomposition.
        for raw in ["nick@host!ident", "nick!ident", "nick@host"] {
            let p = Prefix::parse(raw);
            assert_eq!(p.nick(), None, "{}", raw);
            assert_eq!(p.raw(), raw);
        }
    }
}
