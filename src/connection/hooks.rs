//! Hook types and the per-connection hook lists.

use std::sync::Arc;

use futures_util::future::BoxFuture;

use super::defaults;
use super::Connection;
use crate::command::Command;
use crate::error::ConnectionError;
use crate::reply::Reply;

/// What every hook returns. Errors from `on_connect` abort
/// [`Connection::dial`]; errors from `on_disconnect` abort
/// [`Connection::close`]; errors from the dispatch and error hooks are
/// logged and the remaining hooks still run.
pub type HookResult = anyhow::Result<()>;

pub type ConnectHook =
    Arc<dyn for<'a> Fn(&'a Connection) -> BoxFuture<'a, HookResult> + Send + Sync>;
pub type DisconnectHook =
    Arc<dyn for<'a> Fn(&'a Connection) -> BoxFuture<'a, HookResult> + Send + Sync>;
pub type CommandHook =
    Arc<dyn for<'a> Fn(&'a Connection, &'a Command) -> BoxFuture<'a, HookResult> + Send + Sync>;
pub type ReplyHook =
    Arc<dyn for<'a> Fn(&'a Connection, &'a Reply) -> BoxFuture<'a, HookResult> + Send + Sync>;
pub type ErrorHook = Arc<
    dyn for<'a> Fn(&'a Connection, &'a ConnectionError) -> BoxFuture<'a, HookResult> + Send + Sync,
>;

/// Ordered hook lists. Hooks run one at a time, in list order.
#[derive(Clone, Default)]
pub struct Hooks {
    pub on_connect: Vec<ConnectHook>,
    pub on_disconnect: Vec<DisconnectHook>,
    pub on_command: Vec<CommandHook>,
    pub on_reply: Vec<ReplyHook>,
    pub on_error: Vec<ErrorHook>,
}

impl Hooks {
    /// No hooks at all. A connection built with these never logs in.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The built-in behaviour, in its fixed order.
    pub fn defaults(reconnect: bool) -> Self {
        let on_error: ErrorHook = if reconnect {
            Arc::new(defaults::reconnect_on_end_of_stream)
        } else {
            Arc::new(defaults::close_on_end_of_stream)
        };

        Hooks {
            on_connect: vec![
                Arc::new(defaults::login) as ConnectHook,
                Arc::new(defaults::join_channels),
            ],
            on_disconnect: vec![Arc::new(defaults::reset_channels) as DisconnectHook],
            on_command: vec![
                Arc::new(defaults::join_status_updater) as CommandHook,
                Arc::new(defaults::privmsg_relay),
                Arc::new(defaults::unknown_logger),
                Arc::new(defaults::ping_responder),
                Arc::new(defaults::own_nick_tracker),
                Arc::new(defaults::departure_tracker),
            ],
            on_reply: vec![
                Arc::new(defaults::status_updater) as ReplyHook,
                Arc::new(defaults::member_updater),
                Arc::new(defaults::nick_fallback),
                Arc::new(defaults::join_rejection),
            ],
            on_error: vec![on_error],
        }
    }
}

impl std::fmt::Debug for Hooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hooks")
            .field("on_connect", &self.on_connect.len())
            .field("on_disconnect", &self.on_disconnect.len())
            .field("on_command", &self.on_command.len())
            .field("on_reply", &self.on_reply.len())
            .field("on_error", &self.on_error.len())
            .finish()
    }
}
