//! JSON serializer via `serde_json`.

use crate::error::CodecError;
use crate::message::Message;
use crate::serial::Serializer;

pub struct JsonSerializer;

impl Serializer for JsonSerializer {
    fn encode(&self, message: &Message) -> Result<Vec<u8>, CodecError> {
        serde_json::to_vec(message).map_err(|e| CodecError::Json(e.to_string()))
    }

    fn decode(&self, bytes: &[u8]) -> Result<Message, CodecError> {
        serde_json::from_slice(bytes).map_err(|e| CodecError::Json(e.to_string()))
    }
}
