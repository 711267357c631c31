//! Fuzz target for IRC message parsing
//!
//! Feeds arbitrary lines to the parser and, when one parses, runs it through
//! classification-level accessors and validation. None of it may panic.

#![no_main]

use libfuzzer_sys::fuzz_target;
use slirc_relay::command::{default_command, MessageObject};
use slirc_relay::reply::default_reply;
use slirc_relay::{CommandKind, Message, ReplyKind};
use std::str;

fuzz_target!(|data: &[u8]| {
    let Ok(input) = str::from_utf8(data) else {
        return;
    };
    if input.len() > 8191 {
        return;
    }

    let Ok(message) = Message::parse(input) else {
        return;
    };
    let _ = message.encode();
    let _ = message.source_nick();

    if let Some(kind) = CommandKind::from_verb(message.command()) {
        let _ = default_command(kind, message).validate();
    } else if let Some(kind) = ReplyKind::from_numeric(message.command()) {
        if let Ok(reply) = default_reply(kind, message) {
            let _ = reply.validate();
        }
    }
});
