//! Connection configuration.

use std::path::PathBuf;

use crate::backoff::BackoffConfig;
use crate::error::ConfigError;

/// Default bound of the outgoing and inbound queues.
pub const DEFAULT_QUEUE_CAPACITY: usize = 10;

/// Everything needed to run one connection to one IRC server.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct IrcConfig {
    /// Connection name, used in chat paths and log spans.
    pub name: String,
    /// `host:port` or `[v6addr]:port`.
    pub server: String,
    pub use_tls: bool,
    /// Extra PEM root certificate(s) to trust besides the system store.
    pub root_ca: Option<PathBuf>,
    /// Server password, sent as PASS before registration.
    pub password: Option<String>,
    /// Ident sent in USER.
    pub user: String,
    /// Real name sent in USER; the user name is used when empty.
    pub real_name: String,
    /// Nicks to try, in order. The first is used at login.
    pub nicks: Vec<String>,
    /// Channels joined after login, in order.
    pub channels: Vec<String>,
    /// Re-dial automatically when the server closes the stream.
    pub reconnect: bool,
    pub backoff: BackoffConfig,
    /// Bound of the outgoing and inbound queues.
    pub queue_capacity: usize,
}

impl Default for IrcConfig {
    fn default() -> Self {
        IrcConfig {
            name: String::new(),
            server: String::new(),
            use_tls: false,
            root_ca: None,
            password: None,
            user: String::new(),
            real_name: String::new(),
            nicks: Vec::new(),
            channels: Vec::new(),
            reconnect: false,
            backoff: BackoffConfig::default(),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

impl IrcConfig {
    /// Reject configurations the engine cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        split_host_port(&self.server)?;

        if self.nicks.iter().all(|n| n.is_empty()) {
            return Err(ConfigError::NoNicks);
        }
        if self.user.is_empty() {
            return Err(ConfigError::MissingUser);
        }
        if self.backoff.min.is_zero() {
            return Err(ConfigError::InvalidBackoff("min must be greater than zero"));
        }
        if self.backoff.min > self.backoff.max {
            return Err(ConfigError::InvalidBackoff("min must not exceed max"));
        }
        if self.queue_capacity == 0 {
            return Err(ConfigError::ZeroQueueCapacity);
        }
        if self.use_tls && !cfg!(feature = "tls") {
            return Err(ConfigError::TlsUnavailable);
        }
        Ok(())
    }

    /// Host and port of [`server`](Self::server).
    pub fn host_port(&self) -> Result<(&str, u16), ConfigError> {
        split_host_port(&self.server)
    }

    /// Real name for USER, falling back to the user name.
    pub fn real_name(&self) -> &str {
        if self.real_name.is_empty() {
            &self.user
        } else {
            &self.real_name
        }
    }

    /// Configured nicks, skipping empty entries.
    pub fn nicks(&self) -> impl Iterator<Item = &str> {
        self.nicks.iter().map(String::as_str).filter(|n| !n.is_empty())
    }
}

/// Split `host:port` or `[v6]:port`. The host must be non-empty and the port
/// a valid `u16`.
///
/// ```
/// use slirc_relay::config::split_host_port;
///
/// assert_eq!(split_host_port("irc.libera.chat:6697").unwrap(), ("irc.libera.chat", 6697));
/// assert_eq!(split_host_port("[::1]:6667").unwrap(), ("::1", 6667));
/// assert!(split_host_port("irc.libera.chat").is_err());
/// ```
pub fn split_host_port(addr: &str) -> Result<(&str, u16), ConfigError> {
    let invalid = || ConfigError::InvalidServerAddress(addr.to_owned());

    let (host, port) = if let Some(rest) = addr.strip_prefix('[') {
        let (host, after) = rest.split_once(']').ok_or_else(invalid)?;
        (host, after.strip_prefix(':').ok_or_else(invalid)?)
    } else {
        let (host, port) = addr.rsplit_once(':').ok_or_else(invalid)?;
        // A bare IPv6 literal without brackets is ambiguous.
        if host.contains(':') {
            return Err(invalid());
        }
        (host, port)
    };

    if host.is_empty() {
        return Err(invalid());
    }
    let port = port.parse::<u16>().map_err(|_| invalid())?;
    Ok((host, port))
}
