//! Protocol tests: the serializer round-trip law and the framing law.

use crate::error::FrameError;
use crate::frame;
use crate::frame::FrameBuffer;
use crate::frame::HEADER_LEN;
use crate::message::Message;
use crate::message::RemoteFault;
use crate::message::Request;
use crate::message::Response;
use crate::message::Value;
use crate::serial::Format;

const ALL_FORMATS: [Format; 3] = [Format::Native, Format::Compact, Format::Json];

fn sample_request() -> Request {
    Request::new(
        "r-1",
        "OrderService",
        "placeOrder",
        vec!["string".into(), "i32".into()],
        vec![Value::Str("A1".into()), Value::I32(3)],
    )
}

fn sample_messages() -> Vec<Message> {
    vec![
        Message::Request(sample_request()),
        Message::Request(Request::new("r-2", "EchoService", "noop", vec![], vec![])),
        Message::Request(Request::new(
            "r-3",
            "BlobService",
            "store",
            vec!["bytes".into(), "list".into(), "f64".into()],
            vec![
                Value::Bytes(vec![0, 1, 2, 255]),
                Value::List(vec![Value::Bool(true), Value::List(vec![Value::I64(-9)])]),
                Value::F64(2.25),
            ],
        )),
        Message::Response(Response::ok("r-1", Value::Bool(true))),
        Message::Response(Response::void("r-2")),
        Message::Response(Response::fault(
            "r-3",
            RemoteFault::with_cause(
                "order rejected",
                RemoteFault::with_cause("inventory check failed", RemoteFault::new("stock is 0")),
            ),
        )),
    ]
}

// --- Serializer round-trip law ---

#[test]
fn test_round_trip_all_formats() {
    for format in ALL_FORMATS {
        let serializer = format.serializer();
        for message in sample_messages() {
            let bytes = serializer
                .encode(&message)
                .unwrap_or_else(|e| panic!("{} encode failed: {}", format, e));
            let decoded = serializer
                .decode(&bytes)
                .unwrap_or_else(|e| panic!("{} decode failed: {}", format, e));
            assert_eq!(decoded, message, "round trip mismatch under {}", format);
        }
    }
}

#[test]
fn test_formats_are_not_interchangeable_config() {
    // Selection is configuration, not wire inference: the native decoder
    // must reject JSON bytes rather than guess.
    let message = Message::Request(sample_request());
    let json_bytes = Format::Json.serializer().encode(&message).unwrap();
    assert!(Format::Native.serializer().decode(&json_bytes).is_err());
}

#[test]
fn test_format_parse_and_display() {
    for format in ALL_FORMATS {
        let parsed: Format = format.to_string().parse().unwrap();
        assert_eq!(parsed, format);
    }
    assert!("hessian2".parse::<Format>().is_err());
}

// --- Framing law ---

#[test]
fn test_frame_round_trip() {
    for payload in [&b""[..], &b"x"[..], &[0u8; 1024][..]] {
        let framed = frame::encode_frame(payload).unwrap();
        assert_eq!(framed.len(), HEADER_LEN + payload.len());
        assert_eq!(frame::decode_frame(&framed).unwrap(), payload);
    }
}

#[test]
fn test_frame_header_layout_is_bit_exact() {
    let framed = frame::encode_frame(b"hi").unwrap();
    assert_eq!(&framed[..9], b"ytrue-rpc");
    assert_eq!(framed[9], 0x01);
    assert_eq!(&framed[10..14], &[0, 0, 0, 2]);
    assert_eq!(&framed[14..], b"hi");
}

#[test]
fn test_large_payload_across_partial_reads() {
    // >64KiB payload arriving in awkward chunk sizes must still decode to
    // exactly one frame.
    let payload: Vec<u8> = (0..100_000u32).map(|i| (i % 251) as u8).collect();
    let framed = frame::encode_frame(&payload).unwrap();

    let mut buffer = FrameBuffer::new();
    let mut frames = Vec::new();
    for chunk in framed.chunks(1313) {
        frames.extend(buffer.push(chunk).unwrap());
    }
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0], payload);
    assert_eq!(buffer.buffered(), 0);
}

#[test]
fn test_multiple_frames_in_one_chunk() {
    let mut stream = frame::encode_frame(b"first").unwrap();
    stream.extend(frame::encode_frame(b"").unwrap());
    stream.extend(frame::encode_frame(b"third").unwrap());

    let mut buffer = FrameBuffer::new();
    let frames = buffer.push(&stream).unwrap();
    assert_eq!(frames, vec![b"first".to_vec(), b"".to_vec(), b"third".to_vec()]);
}

#[test]
fn test_byte_at_a_time_delivery() {
    let framed = frame::encode_frame(b"slow").unwrap();
    let mut buffer = FrameBuffer::new();
    let mut frames = Vec::new();
    for byte in &framed {
        frames.extend(buffer.push(std::slice::from_ref(byte)).unwrap());
    }
    assert_eq!(frames, vec![b"slow".to_vec()]);
}

#[test]
fn test_corrupted_magic_always_fails() {
    let good = frame::encode_frame(b"payload").unwrap();
    for i in 0..9 {
        let mut corrupted = good.clone();
        corrupted[i] ^= 0x40;
        let mut buffer = FrameBuffer::new();
        match buffer.push(&corrupted) {
            Err(FrameError::BadMagic(_)) => {}
            other => panic!("expected BadMagic with byte {} flipped, got {:?}", i, other),
        }
    }
}

#[test]
fn test_unsupported_version_rejected() {
    let mut framed = frame::encode_frame(b"payload").unwrap();
    framed[9] = 0x02;
    let mut buffer = FrameBuffer::new();
    match buffer.push(&framed) {
        Err(FrameError::BadVersion(0x02)) => {}
        other => panic!("expected BadVersion, got {:?}", other),
    }
}

#[test]
fn test_oversized_length_rejected_before_buffering() {
    let mut header = Vec::new();
    header.extend_from_slice(&frame::MAGIC);
    header.push(frame::VERSION);
    header.extend_from_slice(&u32::MAX.to_be_bytes());

    let mut buffer = FrameBuffer::new();
    match buffer.push(&header) {
        Err(FrameError::Oversized(len)) => assert_eq!(len, u32::MAX as usize),
        other => panic!("expected Oversized, got {:?}", other),
    }
}

#[test]
fn test_poisoned_buffer_stays_poisoned() {
    let mut corrupted = frame::encode_frame(b"payload").unwrap();
    corrupted[0] = b'x';

    let mut buffer = FrameBuffer::new();
    assert!(buffer.push(&corrupted).is_err());
    // Even valid frames are refused afterwards.
    let valid = frame::encode_frame(b"fine").unwrap();
    match buffer.push(&valid) {
        Err(FrameError::BadMagic(_)) => {}
        other => panic!("expected replayed BadMagic, got {:?}", other),
    }
}

#[test]
fn test_truncated_input_is_not_a_frame() {
    let framed = frame::encode_frame(b"payload").unwrap();
    assert_eq!(frame::decode_frame(&framed[..framed.len() - 1]), Err(FrameError::Truncated));
}

// --- Message model ---

#[test]
fn test_response_constructors_keep_invariant() {
    let ok = Response::ok("r", Value::I32(1));
    assert!(ok.result.is_some() && ok.fault.is_none());

    let void = Response::void("r");
    assert!(void.is_void());

    let fault = Response::fault("r", RemoteFault::new("boom"));
    assert!(fault.result.is_none() && fault.fault.is_some());
}

#[test]
fn test_value_descriptors_match_request_param_types() {
    let request = sample_request();
    let described: Vec<&str> = request.args.iter().map(|a| a.descriptor()).collect();
    assert_eq!(described, request.param_types);
}

#[test]
fn test_fault_display_walks_cause_chain() {
    let fault = RemoteFault::with_cause("outer", RemoteFault::new("inner"));
    assert_eq!(fault.to_string(), "outer: caused by: inner");
}

#[test]
fn test_framed_message_through_serializer() {
    // Frame and serializer compose: the payload inside the frame is the
    // serializer's output, byte for byte.
    for format in ALL_FORMATS {
        let serializer = format.serializer();
        let message = Message::Response(Response::ok("r-9", Value::Str("done".into())));
        let bytes = serializer.encode(&message).unwrap();
        let framed = frame::encode_frame(&bytes).unwrap();
        let payload = frame::decode_frame(&framed).unwrap();
        assert_eq!(serializer.decode(&payload).unwrap(), message);
    }
}
