//! Connection-scoped overrides for turning messages into commands and replies.

use std::collections::HashMap;
use std::sync::Arc;

use super::{Connection, WeakConnection};
use crate::command::{Command, CommandKind, PrivmsgCommand, SessionView};
use crate::message::Message;
use crate::reply::{Reply, ReplyKind};

pub type CommandFactory = Arc<dyn Fn(&Connection, Message) -> Command + Send + Sync>;
pub type ReplyFactory = Arc<dyn Fn(&Connection, Message) -> Reply + Send + Sync>;

/// Factories consulted before the built-in
/// [`default_command`](crate::command::default_command) and
/// [`default_reply`](crate::reply::default_reply).
#[derive(Clone)]
pub struct Factories {
    commands: HashMap<CommandKind, CommandFactory>,
    replies: HashMap<ReplyKind, ReplyFactory>,
}

impl Factories {
    /// No overrides.
    pub fn empty() -> Self {
        Factories {
            commands: HashMap::new(),
            replies: HashMap::new(),
        }
    }

    pub fn set_command<F>(&mut self, kind: CommandKind, factory: F)
    where
        F: Fn(&Connection, Message) -> Command + Send + Sync + 'static,
    {
        self.commands.insert(kind, Arc::new(factory));
    }

    pub fn set_reply<F>(&mut self, kind: ReplyKind, factory: F)
    where
        F: Fn(&Connection, Message) -> Reply + Send + Sync + 'static,
    {
        self.replies.insert(kind, Arc::new(factory));
    }

    pub fn remove_command(&mut self, kind: CommandKind) -> Option<CommandFactory> {
        self.commands.remove(&kind)
    }

    pub fn remove_reply(&mut self, kind: ReplyKind) -> Option<ReplyFactory> {
        self.replies.remove(&kind)
    }

    pub fn command(&self, kind: CommandKind) -> Option<&CommandFactory> {
        self.commands.get(&kind)
    }

    pub fn reply(&self, kind: ReplyKind) -> Option<&ReplyFactory> {
        self.replies.get(&kind)
    }
}

impl Default for Factories {
    /// Inbound PRIVMSGs get a live view of the session so they can tell
    /// whether they are addressed to us.
    fn default() -> Self {
        let mut factories = Factories::empty();
        factories.set_command(CommandKind::Privmsg, addressed_privmsg);
        factories
    }
}

impl std::fmt::Debug for Factories {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Factories")
            .field("commands", &self.commands.keys().collect::<Vec<_>>())
            .field("replies", &self.replies.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Wrap a PRIVMSG so `is_direct` and `is_mention` read `conn`'s session.
pub fn addressed_privmsg(conn: &Connection, message: Message) -> Command {
    Command::Privmsg(PrivmsgCommand::with_session(
        message,
        Arc::new(conn.downgrade()),
    ))
}

impl SessionView for WeakConnection {
    fn current_nick(&self) -> Option<String> {
        let conn = self.upgrade()?;
        conn.with_read_lock(|session| {
            if session.status.connected {
                session.status.current_nick.clone()
            } else {
                None
            }
        })
    }
}
