//! Error types for the IRC relay engine.
//!
//! Errors are layered the same way the data flows: a malformed line produces a
//! [`MessageParseError`], a command that breaks its verb's shape produces a
//! [`ValidationError`], framing and socket failures surface as
//! [`ProtocolError`], and everything the connection engine reports to callers
//! or hooks is a [`ConnectionError`].

use std::fmt;

use thiserror::Error;

/// Convenience type alias for Results using [`ConnectionError`].
pub type Result<T, E = ConnectionError> = std::result::Result<T, E>;

/// Errors raised while turning a raw line into a [`Message`](crate::Message).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum MessageParseError {
    /// The line was empty once the line terminator was removed.
    #[error("empty message")]
    EmptyMessage,

    /// The line started with `@` but no space closed the tag block.
    #[error("invalid message format: tag block is not followed by a space")]
    UnterminatedTags,

    /// A `:` prefix was not followed by a space.
    #[error("invalid prefix: prefix is not followed by a space")]
    UnterminatedPrefix,

    /// Nothing was left to read a command from.
    #[error("missing command")]
    MissingCommand,
}

/// Expected parameter count for a verb.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// Exactly this many middle parameters.
    Exactly(usize),
    /// At least this many middle parameters.
    AtLeast(usize),
    /// An inclusive range of middle parameters.
    Between(usize, usize),
}

impl Arity {
    /// Whether `count` satisfies this arity.
    pub fn accepts(self, count: usize) -> bool {
        match self {
            Arity::Exactly(n) => count == n,
            Arity::AtLeast(n) => count >= n,
            Arity::Between(lo, hi) => (lo..=hi).contains(&count),
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Exactly(n) => write!(f, "{}", n),
            Arity::AtLeast(n) => write!(f, "at least {}", n),
            Arity::Between(lo, hi) => write!(f, "{} or {}", lo, hi),
        }
    }
}

/// Structural violations of a command or reply.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ValidationError {
    /// Wrong number of middle parameters.
    #[error("{command}: wrong number of parameters: expected {expected}, got {got}")]
    ParameterCount {
        /// The verb or numeric being validated.
        command: String,
        /// What the verb requires.
        expected: Arity,
        /// What the message carries.
        got: usize,
    },

    /// The verb requires trailing text and none (or an empty one) was given.
    #[error("{command}: trailing parameter is required")]
    MissingTrailing {
        /// The verb being validated.
        command: String,
    },

    /// A NUL, CR or LF would corrupt the line on the wire.
    #[error("{command}: illegal character {ch:?}")]
    IllegalCharacter {
        /// The verb being validated.
        command: String,
        /// The offending character.
        ch: char,
    },

    /// A middle parameter is empty, contains a space or starts with `:`.
    #[error("{command}: invalid parameter {param:?}")]
    InvalidParameter {
        /// The verb being validated.
        command: String,
        /// The offending parameter.
        param: String,
    },
}

/// Framing and wire-level errors.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProtocolError {
    /// I/O error during reading or writing.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// UTF-8 decoding error.
    #[error("decode error: {0}")]
    Decode(#[from] std::string::FromUtf8Error),

    /// Line exceeded the maximum allowed length.
    #[error("message too long: {0} bytes")]
    MessageTooLong(usize),

    /// Failed to parse an IRC message.
    #[error("failed to decode message: {string}")]
    InvalidMessage {
        /// The raw line.
        string: String,
        /// The underlying parse error.
        #[source]
        cause: MessageParseError,
    },
}

/// Errors rejected while building a connection from its configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// The server address is not `host:port`.
    #[error("invalid server address {0:?}: expected host:port")]
    InvalidServerAddress(String),

    /// No nick was configured.
    #[error("at least one nick is required")]
    NoNicks,

    /// No user (ident) was configured.
    #[error("user is required")]
    MissingUser,

    /// Backoff bounds are unusable.
    #[error("invalid backoff: {0}")]
    InvalidBackoff(&'static str),

    /// Queues need room for at least one message.
    #[error("queue capacity must be at least 1")]
    ZeroQueueCapacity,

    /// TLS was requested but the crate was built without the `tls` feature.
    #[error("TLS requested but the `tls` feature is disabled")]
    TlsUnavailable,

    /// The root certificate store could not be built.
    #[error("certificate error: {0}")]
    Certificate(String),
}

/// Everything the connection engine can report.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConnectionError {
    /// Configuration was rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Framing or parse failure on a single line.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A command failed validation.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Dial, read or write failure.
    #[error("transport error: {0}")]
    Io(#[from] std::io::Error),

    /// The server closed the stream.
    #[error("end of stream")]
    EndOfStream,

    /// The connection has no live link.
    #[error("not connected")]
    NotConnected,

    /// The outgoing queue was closed underneath the caller.
    #[error("outgoing queue closed")]
    QueueClosed,

    /// The relay message is not something this adapter can send.
    #[error("unsupported message type: {0}")]
    UnsupportedMessage(&'static str),

    /// A hook returned an error.
    #[error("hook failed: {0:#}")]
    Hook(anyhow::Error),
}

impl ConnectionError {
    /// Whether this error means the peer went away.
    pub fn is_end_of_stream(&self) -> bool {
        matches!(self, ConnectionError::EndOfStream)
    }
}
