//! The request/response data model.
//!
//! All of these are plain value objects with no shared mutable state. A
//! `Request` is built once per logical call and identified end-to-end by
//! its `request_id`; the matching `Response` echoes that id back so the
//! caller side can correlate it.

use serde::Deserialize;
use serde::Serialize;

/// An argument or result value.
///
/// The protocol is language-independent, so values travel as this small
/// self-describing model rather than as native types of either side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Unit,
    Bool(bool),
    I32(i32),
    I64(i64),
    F64(f64),
    Str(String),
    Bytes(Vec<u8>),
    List(Vec<Value>),
}

impl Value {
    /// The type descriptor used in `Request::param_types`.
    pub fn descriptor(&self) -> &'static str {
        match self {
            Value::Unit => "unit",
            Value::Bool(_) => "bool",
            Value::I32(_) => "i32",
            Value::I64(_) => "i64",
            Value::F64(_) => "f64",
            Value::Str(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::List(_) => "list",
        }
    }
}

/// One logical call: which interface, which method, with what arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    /// Globally unique per call; the correlation key for the response.
    pub request_id: String,
    /// Qualified name of the target interface.
    pub target: String,
    pub method: String,
    /// Type descriptors, one per argument, in order.
    pub param_types: Vec<String>,
    pub args: Vec<Value>,
}

impl Request {
    pub fn new(
        request_id: impl Into<String>,
        target: impl Into<String>,
        method: impl Into<String>,
        param_types: Vec<String>,
        args: Vec<Value>,
    ) -> Self {
        Self {
            request_id: request_id.into(),
            target: target.into(),
            method: method.into(),
            param_types,
            args,
        }
    }
}

/// A remote application failure, rendered language-neutrally as a message
/// plus an optional cause chain.
///
/// This is the wire form of "the call completed and the remote code threw";
/// it is distinct from every transport-level failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteFault {
    pub message: String,
    pub cause: Option<Box<RemoteFault>>,
}

impl RemoteFault {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into(), cause: None }
    }

    pub fn with_cause(message: impl Into<String>, cause: RemoteFault) -> Self {
        Self { message: message.into(), cause: Some(Box::new(cause)) }
    }
}

impl std::fmt::Display for RemoteFault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)?;
        let mut next = self.cause.as_deref();
        while let Some(fault) = next {
            write!(f, ": caused by: {}", fault.message)?;
            next = fault.cause.as_deref();
        }
        Ok(())
    }
}

impl std::error::Error for RemoteFault {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause.as_ref().map(|c| c.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// The answer to one `Request`, correlated by `request_id`.
///
/// At most one of `result`/`fault` is present. Both absent is a successful
/// void call. The constructors are the only ways this crate builds one, so
/// the invariant holds for every response it produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub request_id: String,
    pub result: Option<Value>,
    pub fault: Option<RemoteFault>,
}

impl Response {
    /// A successful call with a result value.
    pub fn ok(request_id: impl Into<String>, result: Value) -> Self {
        Self { request_id: request_id.into(), result: Some(result), fault: None }
    }

    /// A successful call with nothing to return.
    pub fn void(request_id: impl Into<String>) -> Self {
        Self { request_id: request_id.into(), result: None, fault: None }
    }

    /// A completed call that failed in application code.
    pub fn fault(request_id: impl Into<String>, fault: RemoteFault) -> Self {
        Self { request_id: request_id.into(), result: None, fault: Some(fault) }
    }

    pub fn is_void(&self) -> bool {
        self.result.is_none() && self.fault.is_none()
    }
}

/// The tagged envelope on the wire, so a decoder knows which side of the
/// conversation it is reconstructing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Message {
    Request(Request),
    Response(Response),
}
