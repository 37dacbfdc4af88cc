//! # Serializers
//!
//! Three interchangeable renderings of [`Message`] to bytes, behind one
//! trait. All satisfy `decode(encode(m)) == m` for well-formed messages.
//!
//! Selection is a pure function of configuration: a [`Format`] value is
//! passed wherever a serializer is constructed, and both sides of a
//! connection must agree out of band. Nothing is inferred from the wire
//! bytes and there is no process-wide serializer registry.

mod compact;
mod json;
mod native;

pub use compact::CompactSerializer;
pub use json::JsonSerializer;
pub use native::NativeSerializer;

use std::sync::Arc;

use crate::error::CodecError;
use crate::message::Message;

/// Turns messages into bytes and back. Object-safe: transports hold an
/// `Arc<dyn Serializer>`.
pub trait Serializer: Send + Sync + 'static {
    fn encode(&self, message: &Message) -> Result<Vec<u8>, CodecError>;
    fn decode(&self, bytes: &[u8]) -> Result<Message, CodecError>;
}

/// Which serializer a client/server pairing uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Hand-written tag-length-value encoding over ytpack.
    Native,
    /// MessagePack, map-keyed structs.
    Compact,
    /// JSON.
    Json,
}

impl Format {
    pub fn serializer(self) -> Arc<dyn Serializer> {
        match self {
            Format::Native => Arc::new(NativeSerializer),
            Format::Compact => Arc::new(CompactSerializer),
            Format::Json => Arc::new(JsonSerializer),
        }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Format::Native => write!(f, "native"),
            Format::Compact => write!(f, "compact"),
            Format::Json => write!(f, "json"),
        }
    }
}

impl std::str::FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "native" => Ok(Format::Native),
            "compact" => Ok(Format::Compact),
            "json" => Ok(Format::Json),
            other => Err(format!("unknown serializer format {:?}", other)),
        }
    }
}
