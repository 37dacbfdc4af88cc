//! The error taxonomy of the invocation path.
//!
//! One `Clone`-able enum: a connection failure is fanned out to every call
//! pending on that connection, so errors must be duplicable. Remote faults
//! pass through every layer unchanged; which network failures fail over is
//! decided in exactly one place, [`Error::eligible_for_failover`].

use ytproto::CodecError;
use ytproto::FrameError;
use ytproto::RemoteFault;

#[derive(Debug, Clone)]
pub enum Error {
    /// The frame header did not match: protocol or version mismatch.
    /// Fatal to the connection, never retried.
    Frame(FrameError),
    /// A message failed to (de)serialize. Never retried.
    Codec(CodecError),
    /// The endpoint could not be reached at all.
    Connect(String),
    /// No matching response before the deadline. The connection stays up;
    /// only the one pending call is cancelled.
    Timeout,
    /// The transport dropped with the call still in flight.
    ConnectionClosed(String),
    /// A load balancer was handed zero candidate endpoints.
    NoCandidates,
    /// Fail-over removed every candidate without a success.
    ClusterExhausted { attempts: usize },
    /// The remote side executed the call and reported an application
    /// failure. A completed call, not a network problem; never retried.
    Remote(RemoteFault),
    /// A cluster-level failure surfaced through the proxy, carrying its
    /// cause.
    CallFailed(Box<Error>),
}

impl Error {
    /// Whether the fail-over policy may try another candidate after this
    /// failure. Framing and codec mismatches are connection-fatal but not
    /// endpoint-recoverable; remote faults are completed calls.
    pub fn eligible_for_failover(&self) -> bool {
        matches!(self, Self::Connect(_) | Self::Timeout | Self::ConnectionClosed(_))
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Frame(e) => write!(f, "framing error: {}", e),
            Self::Codec(e) => write!(f, "codec error: {}", e),
            Self::Connect(msg) => write!(f, "failed to connect: {}", msg),
            Self::Timeout => write!(f, "call timed out"),
            Self::ConnectionClosed(msg) => write!(f, "connection closed: {}", msg),
            Self::NoCandidates => write!(f, "no candidate endpoints"),
            Self::ClusterExhausted { attempts } => {
                write!(f, "all candidates failed after {} attempts", attempts)
            }
            Self::Remote(fault) => write!(f, "remote fault: {}", fault),
            Self::CallFailed(cause) => write!(f, "remote call failed: {}", cause),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Frame(e) => Some(e),
            Self::Codec(e) => Some(e),
            Self::Remote(fault) => Some(fault),
            Self::CallFailed(cause) => Some(cause.as_ref()),
            _ => None,
        }
    }
}

impl From<FrameError> for Error {
    fn from(e: FrameError) -> Self {
        Self::Frame(e)
    }
}

impl From<CodecError> for Error {
    fn from(e: CodecError) -> Self {
        Self::Codec(e)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
