//! Line parser.
//!
//! Grammar (RFC 2812 with the IRCv3 tag block):
//!
//! ```text
//! <message> ::= ['@' <tags> <SPACE>] [':' <prefix> <SPACE>] <command> <params> <crlf>
//! <params>  ::= { <SPACE> <middle> } [ <SPACE> ':' <trailing> ]
//! ```
//!
//! The tag and prefix blocks are read with nom; everything after them is split
//! once at the first `" :"`, the left side tokenised on whitespace and the
//! right side kept as the trailing parameter.

use chrono::Utc;
use nom::{
    bytes::complete::take_until,
    character::complete::{char, space1},
    error::{context, VerboseError},
    sequence::{preceded, terminated},
    IResult,
};

use super::tags::Tags;
use super::types::{Message, MessageType};
use crate::error::MessageParseError;
use crate::prefix::Prefix;

type ParseResult<'a, O> = IResult<&'a str, O, VerboseError<&'a str>>;

/// `@tags` followed by at least one space.
fn tag_block(input: &str) -> ParseResult<'_, &str> {
    context(
        "parsing IRCv3 message tags",
        terminated(preceded(char('@'), take_until(" ")), space1),
    )(input)
}

/// `:prefix` followed by at least one space.
fn prefix_block(input: &str) -> ParseResult<'_, &str> {
    context(
        "parsing message prefix",
        terminated(preceded(char(':'), take_until(" ")), space1),
    )(input)
}

pub(super) fn parse_line(line: &str) -> Result<Message, MessageParseError> {
    let line = line.trim_end_matches(['\r', '\n']);
    if line.is_empty() {
        return Err(MessageParseError::EmptyMessage);
    }

    let mut rest = line;

    let tags = if rest.starts_with('@') {
        let (remaining, raw_tags) =
            tag_block(rest).map_err(|_| MessageParseError::UnterminatedTags)?;
        rest = remaining;
        Some(Tags::parse(raw_tags))
    } else {
        None
    };

    let prefix = if rest.starts_with(':') {
        let (remaining, raw_prefix) =
            prefix_block(rest).map_err(|_| MessageParseError::UnterminatedPrefix)?;
        rest = remaining;
        Some(Prefix::parse(raw_prefix))
    } else {
        None
    };

    let (middle, trail) = match rest.split_once(" :") {
        Some((middle, trail)) => (middle, Some(trail.to_owned())),
        None => (rest, None),
    };

    let mut tokens = middle.split_whitespace();
    let command = tokens
        .next()
        .ok_or(MessageParseError::MissingCommand)?
        .to_owned();
    let params = tokens.map(str::to_owned).collect();

    Ok(Message {
        tags,
        prefix,
        message_type: MessageType::of(&command),
        command,
        params,
        trail,
        created_at: Utc::now(),
        raw: line.to_owned(),
        parsed: true,
    })
}
