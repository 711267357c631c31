//! IRC case mapping.
//!
//! Nicks and channel names are compared with the `rfc1459` mapping, where
//! `[]\~` are the uppercase forms of `{}|^`. The channel tracker keys its map
//! by [`irc_to_lower`] and the PRIVMSG accessors compare nicks with
//! [`irc_eq`].

#[inline]
fn fold(c: char) -> char {
    match c {
        '[' => '{',
        ']' => '}',
        '\\' => '|',
        '~' => '^',
        'A'..='Z' => c.to_ascii_lowercase(),
        _ => c,
    }
}

/// Convert a string to IRC lowercase using RFC 1459 case mapping.
pub fn irc_to_lower(s: &str) -> String {
    s.chars().map(fold).collect()
}

/// Compare two strings using IRC case-insensitive comparison.
pub fn irc_eq(a: &str, b: &str) -> bool {
    a.len() == b.len() && a.chars().zip(b.chars()).all(|(x, y)| fold(x) == fold(y))
}
