//! Line framing for tokio.
//!
//! [`LineCodec`] splits the byte stream on LF and hands back each line as a
//! `String` without its terminator. A line that is too long or not UTF-8 is
//! reported as an `Err` *item*, not as a decoder error, so a
//! [`FramedRead`](tokio_util::codec::FramedRead) keeps going after it. Only
//! I/O failures end the stream.

use bytes::{Buf, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::error::ProtocolError;

/// Maximum line length in bytes, not counting the terminator: 8191 for the
/// IRCv3 tag block plus the 512-byte RFC 2812 body.
pub const MAX_LINE_LEN: usize = 8191 + 512;

/// One decoded line, or the reason it was dropped.
pub type LineResult = Result<String, ProtocolError>;

/// Newline-delimited UTF-8 codec.
#[derive(Debug)]
pub struct LineCodec {
    /// Index of next byte to check for newline
    next_index: usize,
    max_len: usize,
    /// Set after an over-long line was reported until its newline shows up.
    discarding: bool,
}

impl LineCodec {
    pub fn new() -> Self {
        Self::with_max_len(MAX_LINE_LEN)
    }

    /// Create a new codec with custom max line length.
    pub fn with_max_len(max_len: usize) -> Self {
        LineCodec {
            next_index: 0,
            max_len,
            discarding: false,
        }
    }

    pub fn max_len(&self) -> usize {
        self.max_len
    }

    fn finish_line(&self, mut line: BytesMut) -> LineResult {
        if line.last() == Some(&b'\n') {
            line.truncate(line.len() - 1);
        }
        if line.last() == Some(&b'\r') {
            line.truncate(line.len() - 1);
        }
        if line.len() > self.max_len {
            return Err(ProtocolError::MessageTooLong(line.len()));
        }
        Ok(String::from_utf8(line.to_vec())?)
    }
}

impl Default for LineCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for LineCodec {
    type Item = LineResult;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<LineResult>, ProtocolError> {
        loop {
            let newline = src[self.next_index..]
                .iter()
                .position(|b| *b == b'\n')
                .map(|offset| self.next_index + offset);

            match (self.discarding, newline) {
                (true, Some(end)) => {
                    src.advance(end + 1);
                    self.discarding = false;
                    self.next_index = 0;
                }
                (true, None) => {
                    src.clear();
                    self.next_index = 0;
                    return Ok(None);
                }
                (false, Some(end)) => {
                    let line = src.split_to(end + 1);
                    self.next_index = 0;
                    return Ok(Some(self.finish_line(line)));
                }
                (false, None) => {
                    // A trailing CR may still be the start of the terminator.
                    let pending = src.len() - usize::from(src.last() == Some(&b'\r'));
                    if pending > self.max_len {
                        let len = src.len();
                        src.clear();
                        self.next_index = 0;
                        self.discarding = true;
                        return Ok(Some(Err(ProtocolError::MessageTooLong(len))));
                    }
                    self.next_index = src.len();
                    return Ok(None);
                }
            }
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<LineResult>, ProtocolError> {
        if let Some(item) = self.decode(src)? {
            return Ok(Some(item));
        }
        self.next_index = 0;
        if src.is_empty() || self.discarding {
            src.clear();
            self.discarding = false;
            return Ok(None);
        }
        // Server closed without a final newline: deliver what we have.
        let line = src.split_to(src.len());
        Ok(Some(self.finish_line(line)))
    }
}

impl Encoder<String> for LineCodec {
    type Error = ProtocolError;

    fn encode(&mut self, line: String, dst: &mut BytesMut) -> Result<(), ProtocolError> {
        dst.extend_from_slice(line.as_bytes());
        Ok(())
    }
}
