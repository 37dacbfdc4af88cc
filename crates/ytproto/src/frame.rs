//! The fixed binary frame around each serialized message.
//!
//! Wire layout, bit-exact:
//!
//! ```text
//! ┌──────────────────┬─────────┬──────────────┬───────────┐
//! │ magic            │ version │ length       │ payload   │
//! │ 9 bytes          │ 1 byte  │ 4 bytes BE   │ N bytes   │
//! │ "ytrue-rpc"      │ 0x01    │ N            │           │
//! └──────────────────┴─────────┴──────────────┴───────────┘
//! ```
//!
//! Magic and version are validated before the length field is trusted; a
//! mismatch poisons the [`FrameBuffer`] and the connection must be torn
//! down.

use crate::error::FrameError;

/// The nine-byte frame marker.
pub const MAGIC: [u8; 9] = *b"ytrue-rpc";

/// The single supported protocol version.
pub const VERSION: u8 = 0x01;

/// Magic + version + length.
pub const HEADER_LEN: usize = MAGIC.len() + 1 + 4;

/// Default cap on a single payload (64 MiB). A length field above this is
/// treated as corruption rather than honored with an allocation.
pub const DEFAULT_MAX_PAYLOAD: usize = 64 * 1024 * 1024;

/// Wrap a serialized message in the frame header.
pub fn encode_frame(payload: &[u8]) -> Result<Vec<u8>, FrameError> {
    if payload.len() > DEFAULT_MAX_PAYLOAD {
        return Err(FrameError::Oversized(payload.len()));
    }
    let mut out = Vec::with_capacity(HEADER_LEN + payload.len());
    out.extend_from_slice(&MAGIC);
    out.push(VERSION);
    out.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    out.extend_from_slice(payload);
    Ok(out)
}

/// Decode exactly one complete frame from `bytes` and return its payload.
///
/// Errors with [`FrameError::Truncated`] if the input is short or holds
/// anything beyond the one frame.
pub fn decode_frame(bytes: &[u8]) -> Result<Vec<u8>, FrameError> {
    let mut buffer = FrameBuffer::new();
    let mut frames = buffer.push(bytes)?;
    if frames.len() != 1 || buffer.buffered() != 0 {
        return Err(FrameError::Truncated);
    }
    Ok(frames.remove(0))
}

#[derive(Clone, Copy)]
enum State {
    /// Waiting for the 14 header bytes.
    Header,
    /// Header consumed and validated; waiting for `len` payload bytes.
    Payload { len: usize },
}

/// Accumulates arbitrary read chunks and yields complete frame payloads.
///
/// Length-prefixed framing over a streaming transport means a frame can
/// arrive in any number of pieces; `push` buffers partial data and returns
/// every payload that became complete.
pub struct FrameBuffer {
    buf: Vec<u8>,
    state: State,
    max_payload: usize,
    poisoned: Option<FrameError>,
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self::with_max_payload(DEFAULT_MAX_PAYLOAD)
    }

    pub fn with_max_payload(max_payload: usize) -> Self {
        Self { buf: Vec::new(), state: State::Header, max_payload, poisoned: None }
    }

    /// Bytes buffered but not yet forming a complete frame.
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    /// Feed a chunk of raw bytes; returns all payloads completed by it.
    ///
    /// After a framing violation the buffer is poisoned and every further
    /// `push` replays the same error; the connection is expected to be
    /// closed.
    pub fn push(&mut self, chunk: &[u8]) -> Result<Vec<Vec<u8>>, FrameError> {
        if let Some(error) = &self.poisoned {
            return Err(error.clone());
        }
        self.buf.extend_from_slice(chunk);

        let mut complete = Vec::new();
        loop {
            match self.state {
                State::Header => {
                    if self.buf.len() < HEADER_LEN {
                        break;
                    }
                    if self.buf[..MAGIC.len()] != MAGIC {
                        let mut found = [0u8; 9];
                        found.copy_from_slice(&self.buf[..MAGIC.len()]);
                        return Err(self.poison(FrameError::BadMagic(found)));
                    }
                    let version = self.buf[MAGIC.len()];
                    if version != VERSION {
                        return Err(self.poison(FrameError::BadVersion(version)));
                    }
                    let len = u32::from_be_bytes([
                        self.buf[10], self.buf[11], self.buf[12], self.buf[13],
                    ]) as usize;
                    if len > self.max_payload {
                        return Err(self.poison(FrameError::Oversized(len)));
                    }
                    self.buf.drain(..HEADER_LEN);
                    self.state = State::Payload { len };
                }
                State::Payload { len } => {
                    if self.buf.len() < len {
                        break;
                    }
                    complete.push(self.buf.drain(..len).collect());
                    self.state = State::Header;
                }
            }
        }
        Ok(complete)
    }

    fn poison(&mut self, error: FrameError) -> FrameError {
        self.poisoned = Some(error.clone());
        self.buf.clear();
        error
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}
