//! The remote execution side: answering requests.
//!
//! A [`ServiceRegistry`] maps `interface#method` keys to handlers; a
//! [`Server`] accepts connections and runs a read-dispatch-respond loop
//! per connection over the same frame codec and serializer the client
//! uses. One serializer format per server, fixed at bind time.
//!
//! Handler errors never cross the wire as Rust errors: the `anyhow` cause
//! chain is rendered into a [`RemoteFault`] chain inside a normal
//! response, keeping the application-failure path distinct from every
//! transport failure.

use std::net::SocketAddr;
use std::sync::Arc;

use dashmap::DashMap;
use tokio::io::AsyncReadExt;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;
use tokio::net::TcpStream;
use tokio::task::JoinHandle;

use ytproto::frame;
use ytproto::Format;
use ytproto::FrameBuffer;
use ytproto::Message;
use ytproto::RemoteFault;
use ytproto::Request;
use ytproto::Response;
use ytproto::Serializer;
use ytproto::Value;

use crate::error::Error;
use crate::error::Result;

/// A service method: arguments in, result out. `Value::Unit` results are
/// sent as void responses.
pub type Handler = Box<dyn Fn(&[Value]) -> anyhow::Result<Value> + Send + Sync>;

/// The dispatch table of exposed methods.
#[derive(Default)]
pub struct ServiceRegistry {
    handlers: DashMap<String, Handler>,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&self, interface: &str, method: &str, handler: F)
    where
        F: Fn(&[Value]) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        self.handlers.insert(Self::key(interface, method), Box::new(handler));
    }

    /// Execute the handler for a request and render the outcome as a
    /// response. Always produces a response; failures become faults.
    pub fn dispatch(&self, request: &Request) -> Response {
        let key = Self::key(&request.target, &request.method);
        let handler = match self.handlers.get(&key) {
            Some(handler) => handler,
            None => {
                return Response::fault(
                    request.request_id.clone(),
                    RemoteFault::new(format!("no handler for {}", key)),
                )
            }
        };
        match (handler.value())(&request.args) {
            Ok(Value::Unit) => Response::void(request.request_id.clone()),
            Ok(value) => Response::ok(request.request_id.clone(), value),
            Err(e) => Response::fault(request.request_id.clone(), fault_from_anyhow(&e)),
        }
    }

    fn key(interface: &str, method: &str) -> String {
        format!("{}#{}", interface, method)
    }
}

/// Render an `anyhow` error and its cause chain as a remote fault chain.
fn fault_from_anyhow(error: &anyhow::Error) -> RemoteFault {
    let mut messages: Vec<String> = error.chain().map(|c| c.to_string()).collect();
    let mut fault = RemoteFault::new(messages.pop().unwrap_or_default());
    while let Some(message) = messages.pop() {
        fault = RemoteFault::with_cause(message, fault);
    }
    fault
}

/// A TCP server answering requests with one serializer format.
pub struct Server {
    local_addr: SocketAddr,
    accept: JoinHandle<()>,
}

impl Server {
    /// Bind and start accepting. Pass port 0 to let the OS pick one;
    /// [`Server::local_addr`] reports the actual address.
    pub async fn bind(addr: &str, format: Format, services: Arc<ServiceRegistry>) -> Result<Self> {
        let listener =
            TcpListener::bind(addr).await.map_err(|e| Error::Connect(e.to_string()))?;
        let local_addr =
            listener.local_addr().map_err(|e| Error::Connect(e.to_string()))?;
        let serializer = format.serializer();

        let accept = tokio::spawn(async move {
            loop {
                match listener.accept().await {
                    Ok((stream, peer)) => {
                        tracing::debug!(%peer, "accepted connection");
                        let serializer = serializer.clone();
                        let services = services.clone();
                        tokio::spawn(handle_connection(stream, serializer, services));
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "accept failed");
                    }
                }
            }
        });

        Ok(Self { local_addr, accept })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stop accepting new connections. Established connections finish on
    /// their own terms.
    pub fn shutdown(&self) {
        self.accept.abort();
    }
}

impl Drop for Server {
    fn drop(&mut self) {
        self.accept.abort();
    }
}

/// Per-connection loop: frame in, dispatch, frame out. Any framing or
/// codec violation drops the connection; the peer cannot be trusted past
/// one.
async fn handle_connection(
    stream: TcpStream,
    serializer: Arc<dyn Serializer>,
    services: Arc<ServiceRegistry>,
) {
    let (mut reader, mut writer) = stream.into_split();
    let mut frames = FrameBuffer::new();
    let mut buf = vec![0u8; 64 * 1024];

    loop {
        let n = match reader.read(&mut buf).await {
            Ok(0) => return,
            Ok(n) => n,
            Err(e) => {
                tracing::debug!(error = %e, "connection read failed");
                return;
            }
        };
        let payloads = match frames.push(&buf[..n]) {
            Ok(payloads) => payloads,
            Err(e) => {
                tracing::warn!(error = %e, "framing violation, dropping connection");
                return;
            }
        };
        for payload in payloads {
            let request = match serializer.decode(&payload) {
                Ok(Message::Request(request)) => request,
                Ok(Message::Response(response)) => {
                    tracing::warn!(
                        request_id = %response.request_id,
                        "response frame on a server connection, dropping it"
                    );
                    return;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "undecodable payload, dropping connection");
                    return;
                }
            };

            let response = services.dispatch(&request);
            let bytes = match serializer.encode(&Message::Response(response)) {
                Ok(bytes) => bytes,
                Err(e) => {
                    tracing::error!(error = %e, "response failed to encode");
                    return;
                }
            };
            let framed = match frame::encode_frame(&bytes) {
                Ok(framed) => framed,
                Err(e) => {
                    tracing::error!(error = %e, "response failed to frame");
                    return;
                }
            };
            if let Err(e) = writer.write_all(&framed).await {
                tracing::debug!(error = %e, "connection write failed");
                return;
            }
        }
    }
}
