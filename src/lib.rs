//! # slirc-relay
//!
//! An IRC client engine for chat-relay gateways.
//!
//! ## Features
//!
//! - RFC 2812 line parsing with IRCv3 message tags
//! - Typed commands and numeric replies with per-verb validation
//! - A hook-driven connection engine on Tokio, with backoff, TLS and
//!   channel membership tracking
//! - An adapter boundary that turns PRIVMSGs into relay chat messages

#![deny(clippy::all)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! ## Quick Start
//!
//! ### Parsing IRC Messages
//!
//! ```rust
//! use slirc_relay::{Message, MessageType};
//!
//! let raw = "@time=2023-01-01T12:00:00Z :nick!user@host PRIVMSG #channel :Hello!";
//! let message: Message = raw.parse().expect("Valid IRC message");
//!
//! assert_eq!(message.command(), "PRIVMSG");
//! assert_eq!(message.source_nick(), Some("nick"));
//! assert_eq!(message.tag("time"), Some("2023-01-01T12:00:00Z"));
//! assert_eq!(message.message_type(), MessageType::Command);
//! ```
//!
//! ### Building Commands
//!
//! ```rust
//! use slirc_relay::command::{JoinCommand, MessageObject, PrivmsgCommand};
//!
//! assert_eq!(JoinCommand::new(["#a", "#b"]).encode(), "JOIN #a,#b\r\n");
//! assert!(PrivmsgCommand::new("#rust", "").validate().is_err());
//! ```

pub mod adapter;
pub mod backoff;
pub mod casemap;
pub mod chat;
pub mod codec;
pub mod command;
pub mod config;
pub mod connection;
pub mod error;
pub mod inbound;
pub mod message;
pub mod prefix;
pub mod reply;
pub mod state;
pub mod transport;
pub mod validation;

pub use self::adapter::{Adapter, AdapterRegistry, AdapterType};
pub use self::backoff::{Backoff, BackoffConfig};
pub use self::casemap::{irc_eq, irc_to_lower};
pub use self::chat::{ChatMessage, ControlMessage, MessageHandler, RelayMessage};
pub use self::codec::{LineCodec, MAX_LINE_LEN};
pub use self::command::{Command, CommandKind, MessageObject};
pub use self::config::IrcConfig;
pub use self::connection::{Connection, Factories, Hooks, WeakConnection};
pub use self::error::{
    ConfigError, ConnectionError, MessageParseError, ProtocolError, ValidationError,
};
pub use self::inbound::Inbound;
pub use self::message::{Message, MessageType, Tag, Tags};
pub use self::prefix::Prefix;
pub use self::reply::{Reply, ReplyKind};
pub use self::state::{Channel, ChannelStatus, ConnectionState, ConnectionStatus, SessionState};
pub use self::transport::Transport;
