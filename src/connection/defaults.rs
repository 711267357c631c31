//! The built-in hooks installed by [`Hooks::defaults`](super::Hooks::defaults).
//!
//! Each hook looks at one kind of event and ignores the rest, so they can be
//! registered side by side on the same list.

use chrono::Utc;
use futures_util::future::BoxFuture;
use tracing::{debug, error, info, warn};

use super::hooks::HookResult;
use super::Connection;
use crate::casemap::irc_eq;
use crate::chat::{ChatMessage, RelayMessage};
use crate::command::{
    Command, JoinCommand, MessageObject, NickCommand, PassCommand, PongCommand, UserCommand,
};
use crate::error::{ConfigError, ConnectionError};
use crate::reply::Reply;
use crate::state::SessionState;

/// Whether `nick` is who we currently are.
fn is_me(session: &SessionState, nick: &str) -> bool {
    session
        .status
        .current_nick
        .as_deref()
        .is_some_and(|me| irc_eq(me, nick))
}

/// PASS (when a password is set), USER, then NICK with the first nick.
pub fn login(conn: &Connection) -> BoxFuture<'_, HookResult> {
    Box::pin(async move {
        let config = conn.config();

        if let Some(password) = config.password.as_deref().filter(|p| !p.is_empty()) {
            conn.enqueue_command(PassCommand::new(password)).await?;
        }
        conn.enqueue_command(UserCommand::new(&config.user, 0, config.real_name()))
            .await?;

        let nick = config.nicks().next().ok_or(ConfigError::NoNicks)?;
        conn.enqueue_command(NickCommand::new(nick)).await?;
        conn.with_write_lock(|session| {
            session.status.current_nick = Some(nick.to_owned());
            session.set_nick_attempt(0);
        });

        Ok(())
    })
}

/// One JOIN naming every configured channel.
pub fn join_channels(conn: &Connection) -> BoxFuture<'_, HookResult> {
    Box::pin(async move {
        let channels = &conn.config().channels;
        if !channels.is_empty() {
            conn.enqueue_command(JoinCommand::new(channels)).await?;
        }
        Ok(())
    })
}

pub fn reset_channels(conn: &Connection) -> BoxFuture<'_, HookResult> {
    Box::pin(async move {
        conn.with_write_lock(SessionState::reset_channels);
        Ok(())
    })
}

/// Our own JOIN echoed back marks the channels joined.
pub fn join_status_updater<'a>(
    conn: &'a Connection,
    command: &'a Command,
) -> BoxFuture<'a, HookResult> {
    Box::pin(async move {
        let Command::Join(join) = command else {
            return Ok(());
        };
        let Some(who) = join.message().source_nick() else {
            return Ok(());
        };

        let channels = join.channels();
        let joined = conn.with_write_lock(|session| {
            if !is_me(session, who) {
                return false;
            }
            for name in &channels {
                session.channel_entry(name).mark_joined();
            }
            true
        });
        if joined {
            debug!(channels = ?channels, "joined");
        }
        Ok(())
    })
}

/// Hand every PRIVMSG to the registered message handlers as a chat message.
pub fn privmsg_relay<'a>(conn: &'a Connection, command: &'a Command) -> BoxFuture<'a, HookResult> {
    Box::pin(async move {
        let Command::Privmsg(privmsg) = command else {
            return Ok(());
        };
        privmsg.validate()?;

        let chat = ChatMessage::from_privmsg(conn.name(), privmsg);
        debug!(
            line = %privmsg.message().raw(),
            direct = chat.direct,
            mention = chat.mention,
            "privmsg"
        );

        for handler in conn.message_handlers() {
            handler(RelayMessage::Chat(chat.clone()));
        }
        Ok(())
    })
}

pub fn unknown_logger<'a>(
    _conn: &'a Connection,
    command: &'a Command,
) -> BoxFuture<'a, HookResult> {
    Box::pin(async move {
        if let Command::Unknown(message) = command {
            debug!(line = %message.raw(), "unknown command");
        }
        Ok(())
    })
}

/// Answer PING with PONG, recording both times.
pub fn ping_responder<'a>(conn: &'a Connection, command: &'a Command) -> BoxFuture<'a, HookResult> {
    Box::pin(async move {
        let Command::Ping(ping) = command else {
            return Ok(());
        };

        conn.with_write_lock(|session| session.status.last_server_probe = Some(Utc::now()));
        conn.enqueue_command(PongCommand::new(ping.server())).await?;
        conn.with_write_lock(|session| {
            session.status.last_server_probe_response = Some(Utc::now())
        });
        Ok(())
    })
}

/// Follow our own nick changes.
pub fn own_nick_tracker<'a>(
    conn: &'a Connection,
    command: &'a Command,
) -> BoxFuture<'a, HookResult> {
    Box::pin(async move {
        let Command::Nick(nick) = command else {
            return Ok(());
        };
        let (Some(old), Some(new)) = (nick.message().source_nick(), nick.nick()) else {
            return Ok(());
        };

        let changed = conn.with_write_lock(|session| {
            if !is_me(session, old) {
                return false;
            }
            session.status.current_nick = Some(new.to_owned());
            true
        });
        if changed {
            info!(old = %old, new = %new, "nick changed");
        }
        Ok(())
    })
}

/// Our PART leaves the channel; a KICK of us puts it in error.
pub fn departure_tracker<'a>(
    conn: &'a Connection,
    command: &'a Command,
) -> BoxFuture<'a, HookResult> {
    Box::pin(async move {
        match command {
            Command::Part(part) => {
                let Some(who) = part.message().source_nick() else {
                    return Ok(());
                };
                conn.with_write_lock(|session| {
                    if !is_me(session, who) {
                        return;
                    }
                    for name in part.channels() {
                        if let Some(channel) = session.channel_mut(name) {
                            channel.mark_parted();
                        }
                    }
                });
            }
            Command::Kick(kick) => {
                let (Some(channel), Some(target)) = (kick.channel(), kick.target()) else {
                    return Ok(());
                };
                let reason = kick.reason().filter(|r| !r.is_empty()).unwrap_or("kicked");
                let kicked = conn.with_write_lock(|session| {
                    if !is_me(session, target) {
                        return false;
                    }
                    if let Some(c) = session.channel_mut(channel) {
                        c.mark_err(reason);
                    }
                    true
                });
                if kicked {
                    warn!(channel = %channel, reason = %reason, "kicked");
                }
            }
            _ => {}
        }
        Ok(())
    })
}

/// 001 marks the connection registered.
pub fn status_updater<'a>(conn: &'a Connection, reply: &'a Reply) -> BoxFuture<'a, HookResult> {
    Box::pin(async move {
        let Reply::Welcome(welcome) = reply else {
            return Ok(());
        };
        let server = welcome.message().prefix().map(|p| p.raw().to_owned());

        let nick = conn.with_write_lock(|session| {
            let status = &mut session.status;
            status.connected = true;
            if let Some(nick) = welcome.nick() {
                status.current_nick = Some(nick.to_owned());
            }
            status.current_server = server.clone();
            status.current_nick.clone()
        });
        info!(nick = ?nick, server = ?server, "registered");
        Ok(())
    })
}

/// Merge NAMES fragments into the channel's member map.
pub fn member_updater<'a>(conn: &'a Connection, reply: &'a Reply) -> BoxFuture<'a, HookResult> {
    Box::pin(async move {
        match reply {
            Reply::Names(names) => {
                names.validate()?;
                let Some(channel) = names.channel() else {
                    return Ok(());
                };
                let merged =
                    conn.with_write_lock(|session| session.merge_names(channel, names.names()));
                if !merged {
                    debug!(channel = %channel, "ignoring names for a channel we are not in");
                }
            }
            Reply::EndOfNames(end) => {
                end.validate()?;
                let Some(channel) = end.channel() else {
                    return Ok(());
                };
                let members = conn.with_read_lock(|session| {
                    session
                        .channel(channel)
                        .and_then(|c| c.nicks())
                        .map(|nicks| nicks.keys().cloned().collect::<Vec<_>>().join(", "))
                        .unwrap_or_default()
                });
                debug!(channel = %channel, members = %members, "end of names");
            }
            _ => {}
        }
        Ok(())
    })
}

/// 433 before registration: try the next configured nick.
pub fn nick_fallback<'a>(conn: &'a Connection, reply: &'a Reply) -> BoxFuture<'a, HookResult> {
    Box::pin(async move {
        let Reply::NickInUse(in_use) = reply else {
            return Ok(());
        };
        let config = conn.config();

        let next = conn.with_write_lock(|session| {
            if session.status.connected {
                return Err(false);
            }
            let attempt = session.nick_attempt() + 1;
            let nick = config.nicks().nth(attempt).ok_or(true)?;
            session.set_nick_attempt(attempt);
            session.status.current_nick = Some(nick.to_owned());
            Ok(nick)
        });

        match next {
            Ok(nick) => {
                warn!(taken = ?in_use.nick(), next = %nick, "nick in use");
                conn.enqueue_command(NickCommand::new(nick)).await?;
            }
            Err(true) => error!(taken = ?in_use.nick(), "every configured nick is in use"),
            Err(false) => {}
        }
        Ok(())
    })
}

/// A refused JOIN puts the channel in error with the server's text.
pub fn join_rejection<'a>(conn: &'a Connection, reply: &'a Reply) -> BoxFuture<'a, HookResult> {
    Box::pin(async move {
        let Reply::JoinRejected(rejected) = reply else {
            return Ok(());
        };
        rejected.validate()?;
        let Some(channel) = rejected.channel() else {
            return Ok(());
        };

        let reason = rejected.reason();
        let tracked = conn.with_write_lock(|session| match session.channel_mut(channel) {
            Some(c) => {
                c.mark_err(reason);
                true
            }
            None => false,
        });
        if tracked {
            warn!(channel = %channel, reason = %reason, "join rejected");
        }
        Ok(())
    })
}

pub fn close_on_end_of_stream<'a>(
    conn: &'a Connection,
    err: &'a ConnectionError,
) -> BoxFuture<'a, HookResult> {
    Box::pin(async move {
        if err.is_end_of_stream() {
            conn.close().await?;
        }
        Ok(())
    })
}

/// Close, then dial again in the background.
pub fn reconnect_on_end_of_stream<'a>(
    conn: &'a Connection,
    err: &'a ConnectionError,
) -> BoxFuture<'a, HookResult> {
    Box::pin(async move {
        if !err.is_end_of_stream() {
            return Ok(());
        }
        conn.close().await?;

        let conn = conn.clone();
        tokio::spawn(async move {
            info!("reconnecting");
            if let Err(e) = conn.dial().await {
                error!(error = %e, "reconnect failed");
            }
        });
        Ok(())
    })
}
