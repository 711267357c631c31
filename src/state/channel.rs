//! Per-channel membership.

use std::collections::BTreeMap;

/// A channel member as last reported by the server.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Nick {
    /// The name as it appeared in the NAMES list, membership prefix included.
    pub name: String,
}

/// Where we stand in a channel.
///
/// Only `Joined` carries a member map, so a parted or failed channel can never
/// hold stale members.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ChannelStatus {
    /// Never joined, or left.
    Parted,
    /// We are a member.
    Joined { nicks: BTreeMap<String, Nick> },
    /// The server refused the JOIN, or we were kicked.
    Err { message: String },
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Channel {
    pub name: String,
    pub status: ChannelStatus,
}

impl Channel {
    /// A fresh, parted channel.
    pub fn new(name: impl Into<String>) -> Self {
        Channel {
            name: name.into(),
            status: ChannelStatus::Parted,
        }
    }

    pub fn is_joined(&self) -> bool {
        matches!(self.status, ChannelStatus::Joined { .. })
    }

    /// Members, if joined.
    pub fn nicks(&self) -> Option<&BTreeMap<String, Nick>> {
        match &self.status {
            ChannelStatus::Joined { nicks } => Some(nicks),
            _ => None,
        }
    }

    /// Enter `Joined`. Members already known are kept if we were joined.
    pub fn mark_joined(&mut self) {
        if !self.is_joined() {
            self.status = ChannelStatus::Joined {
                nicks: BTreeMap::new(),
            };
        }
    }

    pub fn mark_parted(&mut self) {
        self.status = ChannelStatus::Parted;
    }

    pub fn mark_err(&mut self, message: impl Into<String>) {
        self.status = ChannelStatus::Err {
            message: message.into(),
        };
    }

    /// Add the names of one NAMES fragment. Returns false, changing nothing,
    /// when the channel is not joined.
    pub fn merge_names<'a>(&mut self, names: impl IntoIterator<Item = &'a str>) -> bool {
        let ChannelStatus::Joined { nicks } = &mut self.status else {
            return false;
        };
        for name in names {
            nicks.insert(
                name.to_owned(),
                Nick {
                    name: name.to_owned(),
                },
            );
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_channel_is_parted() {
        let c = Channel::new("#tenyks");
        assert_eq!(c.status, ChannelStatus::Parted);
        assert!(c.nicks().is_none());
    }

    #[test]
    fn test_names_merge_additively() {
        let mut c = Channel::new("#tenyks");
        c.mark_joined();
        assert!(c.merge_names(["@kyle", "tenyks"]));
        assert!(c.merge_names(["+bot", "tenyks"]));

        let names: Vec<_> = c.nicks().unwrap().keys().cloned().collect();
        assert_eq!(names, ["+bot", "@kyle", "tenyks"]);
    }

    #[test]
    fn test_names_ignored_unless_joined() {
        let mut c = Channel::new("#tenyks");
        assert!(!c.merge_names(["kyle"]));
        assert_eq!(c.status, ChannelStatus::Parted);

        c.mark_err("Cannot join channel (+b)");
        assert!(!c.merge_names(["kyle"]));
        assert!(c.nicks().is_none());
    }

    #[test]
    fn test_rejoin_keeps_members_part_drops_them() {
        let mut c = Channel::new("#tenyks");
        c.mark_joined();
        c.merge_names(["kyle"]);
        c.mark_joined();
        assert_eq!(c.nicks().unwrap().len(), 1);

        c.mark_parted();
        assert!(c.nicks().is_none());
        c.mark_joined();
        assert!(c.nicks().unwrap().is_empty());
    }
}
