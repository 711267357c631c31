//! IRC message model and wire codec.

mod parse;
mod serialize;
pub mod tags;
mod types;

pub use self::tags::{Tag, Tags};
pub use self::types::{Message, MessageType};
