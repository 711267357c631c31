//! The boundary between chat protocols and the relay.
//!
//! An [`Adapter`] is one live chat network connection. The relay keeps them
//! in an [`AdapterRegistry`], keyed by type and name.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use thiserror::Error;

use crate::chat::{MessageHandler, RelayMessage};
use crate::connection::Connection;

/// Which chat protocol an adapter speaks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum AdapterType {
    Irc,
}

impl AdapterType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdapterType::Irc => "irc",
        }
    }
}

impl fmt::Display for AdapterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown adapter type: {0:?}")]
pub struct UnknownAdapterType(pub String);

impl FromStr for AdapterType {
    type Err = UnknownAdapterType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "irc" => Ok(AdapterType::Irc),
            _ => Err(UnknownAdapterType(s.to_owned())),
        }
    }
}

/// A chat network connection as the relay sees it.
#[async_trait]
pub trait Adapter: Send + Sync {
    fn name(&self) -> &str;

    fn adapter_type(&self) -> AdapterType;

    async fn dial(&self) -> anyhow::Result<()>;

    async fn close(&self) -> anyhow::Result<()>;

    /// Deliver a relay message to the chat network.
    async fn send_async(&self, message: &RelayMessage) -> anyhow::Result<()>;

    /// Add a consumer for messages coming from the chat network.
    fn register_message_handler(&self, handler: MessageHandler);
}

#[async_trait]
impl Adapter for Connection {
    fn name(&self) -> &str {
        Connection::name(self)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Irc
    }

    async fn dial(&self) -> anyhow::Result<()> {
        Ok(Connection::dial(self).await?)
    }

    async fn close(&self) -> anyhow::Result<()> {
        Ok(Connection::close(self).await?)
    }

    async fn send_async(&self, message: &RelayMessage) -> anyhow::Result<()> {
        Ok(Connection::send_async(self, message).await?)
    }

    fn register_message_handler(&self, handler: MessageHandler) {
        Connection::register_message_handler(self, move |message| handler(message));
    }
}

/// Adapters by type, then by name.
#[derive(Default)]
pub struct AdapterRegistry {
    adapters: RwLock<HashMap<AdapterType, HashMap<String, Arc<dyn Adapter>>>>,
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `adapter`, replacing any adapter of the same type and name.
    pub fn register_adapter(&self, adapter: Arc<dyn Adapter>) -> Option<Arc<dyn Adapter>> {
        self.adapters
            .write()
            .entry(adapter.adapter_type())
            .or_default()
            .insert(adapter.name().to_owned(), adapter)
    }

    /// Every adapter of `adapter_type`, by name. Empty when there are none.
    pub fn adapters_for(&self, adapter_type: AdapterType) -> HashMap<String, Arc<dyn Adapter>> {
        self.adapters
            .read()
            .get(&adapter_type)
            .cloned()
            .unwrap_or_default()
    }

    pub fn get(&self, adapter_type: AdapterType, name: &str) -> Option<Arc<dyn Adapter>> {
        self.adapters
            .read()
            .get(&adapter_type)
            .and_then(|by_name| by_name.get(name).cloned())
    }
}

impl fmt::Debug for AdapterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let adapters = self.adapters.read();
        let mut map = f.debug_map();
        for (kind, by_name) in adapters.iter() {
            map.entry(kind, &by_name.keys().collect::<Vec<_>>());
        }
        map.finish()
    }
}
