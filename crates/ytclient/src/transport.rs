//! Delivery of one request to one endpoint, and response correlation.
//!
//! A transport owns one connection. The write side is shared by callers
//! behind a mutex; the read side belongs to a single pump task that
//! demultiplexes inbound frames to pending calls by request id. Callers
//! never touch inbound bytes.
//!
//! ## Invariants
//!
//! - At most one pending call per request id (ids are caller-unique).
//! - A pending call resolves exactly once: `DashMap::remove` is the atomic
//!   take, and the oneshot slot enforces single delivery.
//! - A response with no pending entry is a late arrival after timeout:
//!   logged at debug, discarded, never an error.
//! - When the pump stops - EOF, I/O failure, framing violation, or
//!   `close` - every remaining pending call fails with the same error.

use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::io::AsyncRead;
use tokio::io::AsyncReadExt;
use tokio::io::AsyncWrite;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::sync::oneshot;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use ytproto::frame;
use ytproto::Format;
use ytproto::FrameBuffer;
use ytproto::Message;
use ytproto::Request;
use ytproto::Response;
use ytproto::Serializer;

use crate::endpoint::Endpoint;
use crate::error::Error;
use crate::error::Result;

/// Size of the pump's read buffer.
const READ_CHUNK: usize = 64 * 1024;

type PendingTable = DashMap<String, oneshot::Sender<Result<Response>>>;

/// Sends one request to one endpoint and yields the matching response.
///
/// Object-safe: the cluster holds `Box<dyn Transport>`.
#[async_trait::async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Deliver `request` and suspend until the correlated response arrives
    /// or `timeout` elapses. This is the only blocking point in the whole
    /// invocation path.
    async fn invoke(&self, request: &Request, timeout: Duration) -> Result<Response>;

    /// Release the connection. Every call still in flight fails with
    /// [`Error::ConnectionClosed`]; none is left dangling.
    async fn close(&self);
}

/// Opens a fresh transport to an endpoint. The cluster's factory seam:
/// fail-over builds a new transport per attempt through this, and a
/// pooling implementation can be swapped in without touching cluster
/// logic.
#[async_trait::async_trait]
pub trait Connector: Send + Sync + 'static {
    async fn connect(&self, endpoint: &Endpoint) -> Result<Box<dyn Transport>>;
}

/// The production connector: one TCP connection per transport.
pub struct TcpConnector {
    format: Format,
}

impl TcpConnector {
    pub fn new(format: Format) -> Self {
        Self { format }
    }
}

#[async_trait::async_trait]
impl Connector for TcpConnector {
    async fn connect(&self, endpoint: &Endpoint) -> Result<Box<dyn Transport>> {
        Ok(Box::new(TcpTransport::connect(endpoint, self.format).await?))
    }
}

/// A transport over one byte-stream connection.
///
/// Built from a real TCP stream via [`TcpTransport::connect`], or from any
/// duplex stream (in-memory pipes in tests) via
/// [`TcpTransport::from_stream`].
pub struct TcpTransport {
    serializer: Arc<dyn Serializer>,
    writer: Mutex<Box<dyn AsyncWrite + Send + Unpin>>,
    pending: Arc<PendingTable>,
    pump: JoinHandle<()>,
    closed: AtomicBool,
}

impl TcpTransport {
    pub async fn connect(endpoint: &Endpoint, format: Format) -> Result<Self> {
        let stream = TcpStream::connect((endpoint.host.as_str(), endpoint.port))
            .await
            .map_err(|e| Error::Connect(format!("{}: {}", endpoint, e)))?;
        Ok(Self::from_stream(stream, format))
    }

    pub fn from_stream<S>(stream: S, format: Format) -> Self
    where
        S: AsyncRead + AsyncWrite + Send + Unpin + 'static,
    {
        let (reader, writer) = tokio::io::split(stream);
        let serializer = format.serializer();
        let pending: Arc<PendingTable> = Arc::new(DashMap::new());

        let pump = tokio::spawn(Self::pump(reader, serializer.clone(), pending.clone()));

        Self {
            serializer,
            writer: Mutex::new(Box::new(writer)),
            pending,
            pump,
            closed: AtomicBool::new(false),
        }
    }

    /// The single reader for this connection: feeds raw chunks into the
    /// frame buffer and routes each decoded response to its pending call.
    async fn pump<R>(mut reader: R, serializer: Arc<dyn Serializer>, pending: Arc<PendingTable>)
    where
        R: AsyncRead + Send + Unpin + 'static,
    {
        let mut frames = FrameBuffer::new();
        let mut buf = vec![0u8; READ_CHUNK];

        let error = 'pump: loop {
            let n = match reader.read(&mut buf).await {
                Ok(0) => break Error::ConnectionClosed("stream closed by peer".into()),
                Ok(n) => n,
                Err(e) => break Error::ConnectionClosed(e.to_string()),
            };
            let payloads = match frames.push(&buf[..n]) {
                Ok(payloads) => payloads,
                Err(e) => {
                    tracing::error!(error = %e, "framing violation, tearing connection down");
                    break Error::Frame(e);
                }
            };
            for payload in payloads {
                if let Err(e) = Self::dispatch(&payload, &serializer, &pending) {
                    tracing::error!(error = %e, "undeliverable inbound message");
                    break 'pump e;
                }
            }
        };

        Self::fail_all_pending(&pending, error);
    }

    /// Resolve one inbound payload against the pending table.
    fn dispatch(
        payload: &[u8],
        serializer: &Arc<dyn Serializer>,
        pending: &PendingTable,
    ) -> Result<()> {
        match serializer.decode(payload)? {
            Message::Response(response) => {
                // The remove is the atomic take: whoever gets the entry
                // owns the single resolution.
                match pending.remove(&response.request_id) {
                    Some((_, slot)) => {
                        let _ = slot.send(Ok(response));
                    }
                    None => {
                        tracing::debug!(
                            request_id = %response.request_id,
                            "discarding response with no pending call"
                        );
                    }
                }
                Ok(())
            }
            Message::Request(request) => Err(Error::Codec(ytproto::CodecError::Unexpected(
                format!("request {} on a client connection", request.request_id),
            ))),
        }
    }

    /// Fail every pending call with clones of the same error.
    fn fail_all_pending(pending: &PendingTable, error: Error) {
        let keys: Vec<String> = pending.iter().map(|e| e.key().clone()).collect();
        for key in keys {
            if let Some((_, slot)) = pending.remove(&key) {
                let _ = slot.send(Err(error.clone()));
            }
        }
    }
}

#[async_trait::async_trait]
impl Transport for TcpTransport {
    async fn invoke(&self, request: &Request, timeout: Duration) -> Result<Response> {
        if self.closed.load(Ordering::Acquire) {
            return Err(Error::ConnectionClosed("transport already closed".into()));
        }

        let bytes = self.serializer.encode(&Message::Request(request.clone()))?;
        let framed = frame::encode_frame(&bytes)?;

        // Register before writing so the pump can resolve a response that
        // races the write.
        let (slot, result) = oneshot::channel();
        self.pending.insert(request.request_id.clone(), slot);

        {
            let mut writer = self.writer.lock().await;
            if let Err(e) = writer.write_all(&framed).await {
                self.pending.remove(&request.request_id);
                return Err(Error::ConnectionClosed(e.to_string()));
            }
            if let Err(e) = writer.flush().await {
                self.pending.remove(&request.request_id);
                return Err(Error::ConnectionClosed(e.to_string()));
            }
        }

        match tokio::time::timeout(timeout, result).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(_)) => {
                self.pending.remove(&request.request_id);
                Err(Error::ConnectionClosed("response slot dropped".into()))
            }
            Err(_) => {
                // Cancel only this call; the connection stays up and a
                // late response for this id will be discarded by the pump.
                self.pending.remove(&request.request_id);
                tracing::debug!(request_id = %request.request_id, "call timed out");
                Err(Error::Timeout)
            }
        }
    }

    async fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        self.pump.abort();
        Self::fail_all_pending(&self.pending, Error::ConnectionClosed("transport closed".into()));
        let mut writer = self.writer.lock().await;
        let _ = writer.shutdown().await;
    }
}

impl Drop for TcpTransport {
    fn drop(&mut self) {
        self.pump.abort();
    }
}
