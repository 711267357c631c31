//! IRCv3 message tags.
//!
//! Tags are decode-only: they are parsed from inbound lines and exposed on
//! [`Message`](super::Message), but outgoing messages never carry them.

/// A single IRCv3 tag.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tag {
    /// Tag name with any client prefix and vendor stripped.
    pub key: String,
    /// Unescaped value; empty when the tag had no `=`.
    pub value: String,
    /// Vendor namespace (`example.com` in `example.com/key`).
    pub vendor: Option<String>,
    /// Whether the tag carried the `+` client-only prefix.
    pub client_only: bool,
}

impl Tag {
    /// Parse one `key[=value]` item of a tag block.
    pub fn parse(item: &str) -> Self {
        let (raw_key, raw_value) = match item.split_once('=') {
            Some((key, value)) => (key, value),
            None => (item, ""),
        };

        let (client_only, raw_key) = match raw_key.strip_prefix('+') {
            Some(stripped) => (true, stripped),
            None => (false, raw_key),
        };

        let (vendor, key) = match raw_key.split_once('/') {
            Some((vendor, key)) => (Some(vendor.to_owned()), key),
            None => (None, raw_key),
        };

        Tag {
            key: key.to_owned(),
            value: unescape_tag_value(raw_value),
            vendor,
            client_only,
        }
    }
}

/// The tag block of a message: the raw text between `@` and the first space,
/// and the tags it contains in order.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tags {
    raw: String,
    tags: Vec<Tag>,
}

impl Tags {
    /// Split a raw tag block on `;`.
    pub fn parse(raw: &str) -> Self {
        let tags = raw
            .split(';')
            .filter(|item| !item.is_empty())
            .map(Tag::parse)
            .collect();

        Tags {
            raw: raw.to_owned(),
            tags,
        }
    }

    /// The unaltered tag block.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Look up a tag value by key, ignoring vendor and client prefix.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|tag| tag.key == key)
            .map(|tag| tag.value.as_str())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Tag> {
        self.tags.iter()
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

impl<'a> IntoIterator for &'a Tags {
    type Item = &'a Tag;
    type IntoIter = std::slice::Iter<'a, Tag>;

    fn into_iter(self) -> Self::IntoIter {
        self.tags.iter()
    }
}

/// Unescape a tag value from wire format.
///
/// `\:` is `;`, `\s` is a space, `\\` is a backslash, `\r` and `\n` are CR and
/// LF. Any other escaped character stands for itself and a lone trailing
/// backslash is dropped.
pub fn unescape_tag_value(value: &str) -> String {
    if !value.contains('\\') {
        return value.to_owned();
    }

    let mut unescaped = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            unescaped.push(c);
            continue;
        }
        match chars.next() {
            Some(':') => unescaped.push(';'),
            Some('s') => unescaped.push(' '),
            Some('r') => unescaped.push('\r'),
            Some('n') => unescaped.push('\n'),
            Some(other) => unescaped.push(other),
            None => break,
        }
    }
    unescaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_tag() {
        let tag = Tag::parse("msgid=abc123");
        assert_eq!(tag.key, "msgid");
        assert_eq!(tag.value, "abc123");
        assert_eq!(tag.vendor, None);
        assert!(!tag.client_only);
    }

    #[test]
    fn test_valueless_tag() {
        let tag = Tag::parse("test-tag2");
        assert_eq!(tag.key, "test-tag2");
        assert_eq!(tag.value, "");
    }

    #[test]
    fn test_client_vendor_tag() {
        let tag = Tag::parse("+example.com/test-tag=test-tag-value");
        assert!(tag.client_only);
        assert_eq!(tag.vendor.as_deref(), Some("example.com"));
        assert_eq!(tag.key, "test-tag");
        assert_eq!(tag.value, "test-tag-value");
    }

    #[test]
    fn test_vendor_without_client_prefix() {
        let tag = Tag::parse("draft/reply=parent");
        assert!(!tag.client_only);
        assert_eq!(tag.vendor.as_deref(), Some("draft"));
        assert_eq!(tag.key, "reply");
    }

    #[test]
    fn test_value_splits_on_first_equals() {
        let tag = Tag::parse("k=a=b");
        assert_eq!(tag.key, "k");
        assert_eq!(tag.value, "a=b");
    }

    #[test]
    fn test_block_lookup() {
        let tags = Tags::parse("time=2023-01-01T00:00:00Z;+draft/typing=active;bot");
        assert_eq!(tags.len(), 3);
        assert_eq!(tags.raw(), "time=2023-01-01T00:00:00Z;+draft/typing=active;bot");
        assert_eq!(tags.get("time"), Some("2023-01-01T00:00:00Z"));
        assert_eq!(tags.get("typing"), Some("active"));
        assert_eq!(tags.get("bot"), Some(""));
        assert_eq!(tags.get("missing"), None);
    }

    #[test]
    fn test_unescape_sequences() {
        assert_eq!(unescape_tag_value("a\\:b"), "a;b");
        assert_eq!(unescape_tag_value("hello\\sworld"), "hello world");
        assert_eq!(unescape_tag_value("path\\\\file"), "path\\file");
        assert_eq!(unescape_tag_value("line\\rend\\n"), "line\rend\n");
    }

    #[test]
    fn test_unescape_edge_cases() {
        // Lone trailing backslash is dropped, unknown escapes keep the char.
        assert_eq!(unescape_tag_value("test\\"), "test");
        assert_eq!(unescape_tag_value("a\\xb"), "axb");
    }
}
