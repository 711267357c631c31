//! The four tasks behind a live link.
//!
//! Tasks hold a [`WeakConnection`] and upgrade it per item, so a dropped
//! [`Connection`](super::Connection) is never kept alive by its own tasks.
//! All of them stop when the link's token is cancelled.

use futures_util::{SinkExt, StreamExt};
use tokio::io::{ReadHalf, WriteHalf};
use tokio::sync::mpsc;
use tokio_util::codec::{FramedRead, FramedWrite};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use super::WeakConnection;
use crate::codec::LineCodec;
use crate::command::{Command, MessageObject};
use crate::error::{ConnectionError, ProtocolError};
use crate::inbound::Inbound;
use crate::message::Message;
use crate::transport::Transport;

pub(super) type LineReader = FramedRead<ReadHalf<Transport>, LineCodec>;
pub(super) type LineWriter = FramedWrite<WriteHalf<Transport>, LineCodec>;

/// Push an error to the monitor unless the link is going away.
async fn report(
    errors: &mpsc::Sender<ConnectionError>,
    cancel: &CancellationToken,
    err: ConnectionError,
) {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => {}
        _ = errors.send(err) => {}
    }
}

fn from_protocol(err: ProtocolError) -> ConnectionError {
    match err {
        ProtocolError::Io(e) => ConnectionError::Io(e),
        other => ConnectionError::Protocol(other),
    }
}

/// Read lines, parse and classify them, and queue them for the dispatcher.
pub(super) async fn receive_loop(
    conn: WeakConnection,
    mut reader: LineReader,
    inbound: mpsc::Sender<Inbound>,
    errors: mpsc::Sender<ConnectionError>,
    cancel: CancellationToken,
) {
    loop {
        let next = tokio::select! {
            biased;
            _ = cancel.cancelled() => return,
            next = reader.next() => next,
        };

        let line = match next {
            Some(Ok(Ok(line))) => line,
            Some(Ok(Err(e))) | Some(Err(e)) => {
                report(&errors, &cancel, from_protocol(e)).await;
                continue;
            }
            None => {
                report(&errors, &cancel, ConnectionError::EndOfStream).await;
                cancel.cancelled().await;
                return;
            }
        };

        // Some servers send blank keepalive lines.
        if line.trim().is_empty() {
            continue;
        }

        let message = match Message::parse(&line) {
            Ok(message) => message,
            Err(cause) => {
                let err = ProtocolError::InvalidMessage { string: line, cause };
                report(&errors, &cancel, err.into()).await;
                continue;
            }
        };

        let item = match conn.upgrade() {
            Some(conn) => conn.classify(message),
            None => return,
        };
        debug!(direction = "|<---|", line = %item.message().raw());

        tokio::select! {
            biased;
            _ = cancel.cancelled() => return,
            sent = inbound.send(item) => {
                if sent.is_err() {
                    return;
                }
            }
        }
    }
}

/// Write queued commands in order.
pub(super) async fn send_loop(
    mut writer: LineWriter,
    mut outgoing: mpsc::Receiver<Command>,
    errors: mpsc::Sender<ConnectionError>,
    cancel: CancellationToken,
) {
    loop {
        let command = tokio::select! {
            biased;
            _ = cancel.cancelled() => return,
            command = outgoing.recv() => match command {
                Some(command) => command,
                None => return,
            },
        };

        if let Err(e) = command.validate() {
            report(&errors, &cancel, e.into()).await;
            continue;
        }

        let line = command.encode();
        debug!(direction = "|--->|", line = %line.trim_end());

        let written = tokio::select! {
            biased;
            _ = cancel.cancelled() => return,
            written = writer.send(line) => written,
        };
        if let Err(e) = written {
            report(&errors, &cancel, from_protocol(e)).await;
        }
    }
}

/// Log every receive and send error and run the error hooks on it.
pub(super) async fn error_monitor(
    conn: WeakConnection,
    mut receive_errors: mpsc::Receiver<ConnectionError>,
    mut send_errors: mpsc::Receiver<ConnectionError>,
    cancel: CancellationToken,
) {
    loop {
        let err = tokio::select! {
            biased;
            _ = cancel.cancelled() => return,
            Some(err) = receive_errors.recv() => {
                if err.is_end_of_stream() {
                    info!("server closed the connection");
                } else {
                    error!(error = %err, "receive error");
                }
                err
            }
            Some(err) = send_errors.recv() => {
                error!(error = %err, "send error");
                err
            }
            else => return,
        };

        let Some(conn) = conn.upgrade() else {
            return;
        };
        conn.run_error_hooks(&err).await;
    }
}

/// Run the command and reply hooks for each inbound item, in arrival order.
pub(super) async fn dispatcher(
    conn: WeakConnection,
    mut inbound: mpsc::Receiver<Inbound>,
    cancel: CancellationToken,
) {
    loop {
        let item = tokio::select! {
            biased;
            _ = cancel.cancelled() => return,
            item = inbound.recv() => match item {
                Some(item) => item,
                None => return,
            },
        };

        let Some(conn) = conn.upgrade() else {
            return;
        };
        conn.dispatch(&item).await;
    }
}
