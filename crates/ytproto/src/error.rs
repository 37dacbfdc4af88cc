//! Protocol-level failures: framing and (de)serialization.
//!
//! Both enums are `Clone` on purpose: a connection-level failure fans out
//! to every call pending on that connection, so the error value must be
//! duplicable. Serde error messages are captured as text for the same
//! reason.

/// A violation of the fixed frame header. Always fatal to the connection:
/// a peer that disagrees on magic or version cannot be talked to, and a
/// length field from such a peer must not be trusted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    /// The first nine bytes were not the `"ytrue-rpc"` marker.
    BadMagic([u8; 9]),
    /// The version byte is not the single supported value.
    BadVersion(u8),
    /// The declared payload length exceeds the configured cap.
    Oversized(usize),
    /// The input did not hold exactly one complete frame.
    Truncated,
}

impl std::fmt::Display for FrameError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BadMagic(found) => write!(f, "bad magic bytes {:02X?}", found),
            Self::BadVersion(v) => write!(f, "unsupported protocol version 0x{:02X}", v),
            Self::Oversized(len) => write!(f, "declared payload of {} bytes exceeds cap", len),
            Self::Truncated => write!(f, "input does not hold one complete frame"),
        }
    }
}

impl std::error::Error for FrameError {}

/// A failure while turning a message into bytes or back.
#[derive(Debug, Clone, PartialEq)]
pub enum CodecError {
    /// The underlying ytpack encoding failed.
    Pack(ytpack::Error),
    /// JSON (de)serialization failed.
    Json(String),
    /// MessagePack (de)serialization failed.
    MsgPack(String),
    /// The bytes decoded to something other than the expected message shape.
    Malformed(String),
    /// A structurally valid message that this side must not receive.
    Unexpected(String),
    /// Value nesting deeper than the safety limit.
    RecursionLimitExceeded,
}

impl std::fmt::Display for CodecError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pack(e) => write!(f, "pack error: {}", e),
            Self::Json(msg) => write!(f, "json error: {}", msg),
            Self::MsgPack(msg) => write!(f, "msgpack error: {}", msg),
            Self::Malformed(msg) => write!(f, "malformed message: {}", msg),
            Self::Unexpected(msg) => write!(f, "unexpected message: {}", msg),
            Self::RecursionLimitExceeded => write!(f, "value nesting exceeds safety limit"),
        }
    }
}

impl std::error::Error for CodecError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Pack(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ytpack::Error> for CodecError {
    fn from(e: ytpack::Error) -> Self {
        Self::Pack(e)
    }
}
