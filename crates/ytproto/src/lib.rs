//! # ytproto
//!
//! The wire protocol of ytrue-rpc: the request/response message model, the
//! fixed binary frame around each message, and three interchangeable
//! serializers behind one trait.
//!
//! ## Architecture
//!
//! - [`message`] - `Value`, `Request`, `Response`, `RemoteFault`, and the
//!   tagged [`Message`] envelope every serializer encodes.
//! - [`frame`] - the `"ytrue-rpc"` magic + version + big-endian length
//!   header, with an incremental [`FrameBuffer`] for partial reads.
//! - [`serial`] - the [`Serializer`] trait and its `Native` (ytpack),
//!   `Compact` (MessagePack), and `Json` variants, selected by [`Format`].
//!
//! This crate is runtime-free: no sockets, no async. Transports live above
//! it.

pub mod error;
pub mod frame;
pub mod message;
pub mod serial;

pub use error::CodecError;
pub use error::FrameError;

pub use frame::FrameBuffer;
pub use frame::MAGIC;
pub use frame::VERSION;

pub use message::Message;
pub use message::RemoteFault;
pub use message::Request;
pub use message::Response;
pub use message::Value;

pub use serial::Format;
pub use serial::Serializer;

#[cfg(test)]
mod tests;
