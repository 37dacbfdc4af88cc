//! Native binary serializer: hand-written tag-length-value encoding over
//! ytpack.
//!
//! Layout per message: a `"Request"`/`"Response"` variant discriminant,
//! then the fields in declaration order. Values are self-describing, so
//! the decoder dispatches on the next tag.
//!
//! ## Invariants
//! - Decoding never panics on unknown data.
//! - Nested values are bounded by `MAX_VALUE_DEPTH`.

use ytpack::Decoder;
use ytpack::Encoder;
use ytpack::Tag;

use crate::error::CodecError;
use crate::message::Message;
use crate::message::RemoteFault;
use crate::message::Request;
use crate::message::Response;
use crate::message::Value;
use crate::serial::Serializer;

/// The maximum nesting depth of a value (or fault cause chain).
const MAX_VALUE_DEPTH: usize = 64;

pub struct NativeSerializer;

impl Serializer for NativeSerializer {
    fn encode(&self, message: &Message) -> Result<Vec<u8>, CodecError> {
        let mut enc = Encoder::new();
        match message {
            Message::Request(request) => {
                enc.variant("Request")?;
                encode_request(&mut enc, request)?;
            }
            Message::Response(response) => {
                enc.variant("Response")?;
                encode_response(&mut enc, response)?;
            }
        }
        Ok(enc.into_bytes())
    }

    fn decode(&self, bytes: &[u8]) -> Result<Message, CodecError> {
        let mut dec = Decoder::new(bytes);
        let message = match dec.variant()? {
            "Request" => Message::Request(decode_request(&mut dec)?),
            "Response" => Message::Response(decode_response(&mut dec)?),
            other => {
                return Err(CodecError::Malformed(format!("unknown message kind {:?}", other)))
            }
        };
        dec.finish()?;
        Ok(message)
    }
}

fn encode_request(enc: &mut Encoder, request: &Request) -> Result<(), CodecError> {
    enc.str(&request.request_id)?;
    enc.str(&request.target)?;
    enc.str(&request.method)?;
    enc.list(request.param_types.len())?;
    for ty in &request.param_types {
        enc.str(ty)?;
    }
    enc.list(request.args.len())?;
    for arg in &request.args {
        encode_value(enc, arg, 0)?;
    }
    Ok(())
}

fn decode_request(dec: &mut Decoder) -> Result<Request, CodecError> {
    let request_id = dec.str()?.to_string();
    let target = dec.str()?.to_string();
    let method = dec.str()?.to_string();

    let count = dec.list()?;
    let mut param_types = Vec::with_capacity(count.min(64));
    for _ in 0..count {
        param_types.push(dec.str()?.to_string());
    }

    let count = dec.list()?;
    let mut args = Vec::with_capacity(count.min(64));
    for _ in 0..count {
        args.push(decode_value(dec, 0)?);
    }

    Ok(Request { request_id, target, method, param_types, args })
}

fn encode_response(enc: &mut Encoder, response: &Response) -> Result<(), CodecError> {
    enc.str(&response.request_id)?;
    match &response.result {
        Some(value) => {
            enc.option_some()?;
            encode_value(enc, value, 0)?;
        }
        None => {
            enc.option_none()?;
        }
    }
    match &response.fault {
        Some(fault) => {
            enc.option_some()?;
            encode_fault(enc, fault, 0)?;
        }
        None => {
            enc.option_none()?;
        }
    }
    Ok(())
}

fn decode_response(dec: &mut Decoder) -> Result<Response, CodecError> {
    let request_id = dec.str()?.to_string();
    let result = if dec.option()? { Some(decode_value(dec, 0)?) } else { None };
    let fault = if dec.option()? { Some(decode_fault(dec, 0)?) } else { None };
    Ok(Response { request_id, result, fault })
}

fn encode_value(enc: &mut Encoder, value: &Value, depth: usize) -> Result<(), CodecError> {
    if depth > MAX_VALUE_DEPTH {
        return Err(CodecError::RecursionLimitExceeded);
    }
    match value {
        Value::Unit => enc.unit()?,
        Value::Bool(v) => enc.bool(*v)?,
        Value::I32(v) => enc.i32(*v)?,
        Value::I64(v) => enc.i64(*v)?,
        Value::F64(v) => enc.f64(*v)?,
        Value::Str(v) => enc.str(v)?,
        Value::Bytes(v) => enc.bytes(v)?,
        Value::List(items) => {
            enc.list(items.len())?;
            for item in items {
                encode_value(enc, item, depth + 1)?;
            }
            return Ok(());
        }
    };
    Ok(())
}

fn decode_value(dec: &mut Decoder, depth: usize) -> Result<Value, CodecError> {
    if depth > MAX_VALUE_DEPTH {
        return Err(CodecError::RecursionLimitExceeded);
    }
    match dec.peek_tag()? {
        Tag::Unit => {
            dec.unit()?;
            Ok(Value::Unit)
        }
        Tag::Bool => Ok(Value::Bool(dec.bool()?)),
        Tag::S32 => Ok(Value::I32(dec.i32()?)),
        Tag::S64 => Ok(Value::I64(dec.i64()?)),
        Tag::F64 => Ok(Value::F64(dec.f64()?)),
        Tag::Str => Ok(Value::Str(dec.str()?.to_string())),
        Tag::Bytes => Ok(Value::Bytes(dec.bytes()?.to_vec())),
        Tag::List => {
            let count = dec.list()?;
            let mut items = Vec::with_capacity(count.min(64));
            for _ in 0..count {
                items.push(decode_value(dec, depth + 1)?);
            }
            Ok(Value::List(items))
        }
        other => Err(CodecError::Malformed(format!("tag {:?} is not a value", other))),
    }
}

fn encode_fault(enc: &mut Encoder, fault: &RemoteFault, depth: usize) -> Result<(), CodecError> {
    if depth > MAX_VALUE_DEPTH {
        return Err(CodecError::RecursionLimitExceeded);
    }
    enc.str(&fault.message)?;
    match &fault.cause {
        Some(cause) => {
            enc.option_some()?;
            encode_fault(enc, cause, depth + 1)?;
        }
        None => {
            enc.option_none()?;
        }
    }
    Ok(())
}

fn decode_fault(dec: &mut Decoder, depth: usize) -> Result<RemoteFault, CodecError> {
    if depth > MAX_VALUE_DEPTH {
        return Err(CodecError::RecursionLimitExceeded);
    }
    let message = dec.str()?.to_string();
    let cause =
        if dec.option()? { Some(Box::new(decode_fault(dec, depth + 1)?)) } else { None };
    Ok(RemoteFault { message, cause })
}
