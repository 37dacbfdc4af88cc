//! Compact binary serializer via MessagePack (`rmp-serde`).
//!
//! Uses `to_vec_named` so structs travel as maps keyed by field name, the
//! form other languages' MessagePack decoders expect, rather than as
//! positional arrays.

use crate::error::CodecError;
use crate::message::Message;
use crate::serial::Serializer;

pub struct CompactSerializer;

impl Serializer for CompactSerializer {
    fn encode(&self, message: &Message) -> Result<Vec<u8>, CodecError> {
        rmp_serde::to_vec_named(message).map_err(|e| CodecError::MsgPack(e.to_string()))
    }

    fn decode(&self, bytes: &[u8]) -> Result<Message, CodecError> {
        rmp_serde::from_slice(bytes).map_err(|e| CodecError::MsgPack(e.to_string()))
    }
}
