//! Relay client example
//!
//! Connects to one server, joins the given channels and echoes back any
//! message that mentions the bot or is sent to it directly. Every chat
//! message is also printed as it would be handed to a relay.
//!
//! ```text
//! RUST_LOG=slirc_relay=debug cargo run --example relay_client -- irc.libera.chat:6697 tls tenyks '#tenyks'
//! ```

use anyhow::Context;
use slirc_relay::{ChatMessage, Connection, IrcConfig, RelayMessage};
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    let mut args = std::env::args().skip(1);
    let server = args
        .next()
        .context("usage: relay_client <host:port> [tls|plain] [nick] [#channel...]")?;
    let use_tls = args.next().as_deref() == Some("tls");
    let nick = args.next().unwrap_or_else(|| "relaybot".to_string());
    let channels: Vec<String> = args.collect();

    let conn = Connection::new(IrcConfig {
        name: "demo".into(),
        server,
        use_tls,
        user: nick.clone(),
        real_name: "slirc-relay demo".into(),
        nicks: vec![nick.clone(), format!("{}_", nick)],
        channels,
        reconnect: true,
        ..IrcConfig::default()
    })?;

    // Handlers are synchronous; hand the messages to the async side.
    let (tx, mut rx) = mpsc::unbounded_channel::<ChatMessage>();
    conn.register_message_handler(move |msg| {
        if let RelayMessage::Chat(chat) = msg {
            let _ = tx.send(chat);
        }
    });

    conn.dial().await?;
    info!(nick = %nick, "dialed, waiting for messages");

    loop {
        tokio::select! {
            chat = rx.recv() => {
                let Some(chat) = chat else { break };
                println!(
                    "{} -> {}: {} (direct={}, mention={})",
                    chat.origin_path, chat.destination_path, chat.content, chat.direct, chat.mention
                );
                if !(chat.direct || chat.mention) {
                    continue;
                }

                // Answer a direct message to the sender, a mention in the channel.
                let reply_to = if chat.direct { &chat.origin_path } else { &chat.destination_path };
                let reply = ChatMessage::new(reply_to.clone(), format!("echo: {}", chat.content));
                if let Err(e) = conn.send_async(&RelayMessage::Chat(reply)).await {
                    warn!(error = %e, "failed to send echo");
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("shutting down");
                break;
            }
        }
    }

    conn.close().await?;
    Ok(())
}
