//! Structural checks shared by the command and reply wrappers.
//!
//! Two kinds of rules live here. Shape rules ([`check_arity`],
//! [`require_trailing`]) say how many parameters a verb takes. Wire rules
//! ([`check_wire_safe`]) say whether a message can be written to the socket
//! without corrupting the line:
//!
//! - NUL, CR and LF are never allowed anywhere in the command, the middle
//!   parameters or the trailing parameter.
//! - Middle parameters must be non-empty, must not contain a space and must
//!   not start with `:`; otherwise the receiver would split them differently.

use crate::error::{Arity, ValidationError};
use crate::message::Message;

/// Characters that terminate or delimit an IRC line.
pub const PROTOCOL_CONTROL_CHARS: &[char] = &[
    '\x00', // NUL
    '\x0D', // CR
    '\x0A', // LF
];

/// Check if a character is a protocol control character (NUL, CR, LF).
///
/// ```
/// use slirc_relay::validation::is_protocol_control_char;
///
/// assert!(is_protocol_control_char('\r'));
/// assert!(!is_protocol_control_char('\x02')); // bold is formatting, not framing
/// ```
#[inline]
pub fn is_protocol_control_char(c: char) -> bool {
    PROTOCOL_CONTROL_CHARS.contains(&c)
}

/// Return the first protocol control character in `s`, if any.
pub fn find_protocol_control_char(s: &str) -> Option<char> {
    s.chars().find(|c| is_protocol_control_char(*c))
}

/// Fail unless the message carries a number of middle parameters `expected`
/// accepts.
pub fn check_arity(message: &Message, expected: Arity) -> Result<(), ValidationError> {
    let got = message.params().len();
    if expected.accepts(got) {
        Ok(())
    } else {
        Err(ValidationError::ParameterCount {
            command: message.command().to_owned(),
            expected,
            got,
        })
    }
}

/// Fail unless the message has a non-empty trailing parameter.
pub fn require_trailing(message: &Message) -> Result<(), ValidationError> {
    match message.trail() {
        Some(trail) if !trail.is_empty() => Ok(()),
        _ => Err(ValidationError::MissingTrailing {
            command: message.command().to_owned(),
        }),
    }
}

/// Fail if the message could not be written as a single well-formed line.
pub fn check_wire_safe(message: &Message) -> Result<(), ValidationError> {
    let command = message.command();
    let illegal = |ch| ValidationError::IllegalCharacter {
        command: command.to_owned(),
        ch,
    };

    if let Some(ch) = find_protocol_control_char(command) {
        return Err(illegal(ch));
    }

    for param in message.params() {
        if let Some(ch) = find_protocol_control_char(param) {
            return Err(illegal(ch));
        }
        if param.is_empty() || param.contains(' ') || param.starts_with(':') {
            return Err(ValidationError::InvalidParameter {
                command: command.to_owned(),
                param: param.clone(),
            });
        }
    }

    if let Some(ch) = message.trail().and_then(find_protocol_control_char) {
        return Err(illegal(ch));
    }

    Ok(())
}
