//! Fuzz target for line framing
//!
//! Splits the input at an arbitrary point to mimic two socket reads and
//! decodes every line, including the partial one at EOF.

#![no_main]

use bytes::BytesMut;
use libfuzzer_sys::fuzz_target;
use slirc_relay::LineCodec;
use tokio_util::codec::Decoder;

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }
    let split = usize::from(data[0]) % data.len();
    let (first, second) = data[1..].split_at(split.min(data.len() - 1));

    let mut codec = LineCodec::with_max_len(512);
    let mut buf = BytesMut::from(first);
    while let Ok(Some(_)) = codec.decode(&mut buf) {}

    buf.extend_from_slice(second);
    while let Ok(Some(_)) = codec.decode(&mut buf) {}
    while let Ok(Some(_)) = codec.decode_eof(&mut buf) {}
});
