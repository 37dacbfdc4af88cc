use crate::Decoder;
use crate::Encoder;
use crate::Error;
use crate::Tag;

#[test]
fn test_scalar_round_trip() {
    let mut enc = Encoder::new();
    enc.unit().unwrap();
    enc.bool(true).unwrap();
    enc.bool(false).unwrap();
    enc.i32(-42).unwrap();
    enc.i64(i64::MIN).unwrap();
    enc.f64(1.5).unwrap();
    let bytes = enc.into_bytes();

    let mut dec = Decoder::new(&bytes);
    dec.unit().unwrap();
    assert!(dec.bool().unwrap());
    assert!(!dec.bool().unwrap());
    assert_eq!(dec.i32().unwrap(), -42);
    assert_eq!(dec.i64().unwrap(), i64::MIN);
    assert_eq!(dec.f64().unwrap(), 1.5);
    dec.finish().unwrap();
}

#[test]
fn test_str_and_bytes_round_trip() {
    let mut enc = Encoder::new();
    enc.str("hello, ytpack").unwrap();
    enc.str("").unwrap();
    enc.bytes(&[0x00, 0xFF, 0x7F]).unwrap();
    enc.bytes(&[]).unwrap();
    let bytes = enc.into_bytes();

    let mut dec = Decoder::new(&bytes);
    assert_eq!(dec.str().unwrap(), "hello, ytpack");
    assert_eq!(dec.str().unwrap(), "");
    assert_eq!(dec.bytes().unwrap(), &[0x00, 0xFF, 0x7F]);
    assert_eq!(dec.bytes().unwrap(), &[] as &[u8]);
    dec.finish().unwrap();
}

#[test]
fn test_nested_list_round_trip() {
    let mut enc = Encoder::new();
    enc.list(2).unwrap();
    enc.i32(1).unwrap();
    enc.list(2).unwrap();
    enc.str("a").unwrap();
    enc.str("b").unwrap();
    let bytes = enc.into_bytes();

    let mut dec = Decoder::new(&bytes);
    assert_eq!(dec.list().unwrap(), 2);
    assert_eq!(dec.i32().unwrap(), 1);
    assert_eq!(dec.list().unwrap(), 2);
    assert_eq!(dec.str().unwrap(), "a");
    assert_eq!(dec.str().unwrap(), "b");
    dec.finish().unwrap();
}

#[test]
fn test_option_round_trip() {
    let mut enc = Encoder::new();
    enc.option_some().unwrap();
    enc.i32(7).unwrap();
    enc.option_none().unwrap();
    let bytes = enc.into_bytes();

    let mut dec = Decoder::new(&bytes);
    assert!(dec.option().unwrap());
    assert_eq!(dec.i32().unwrap(), 7);
    assert!(!dec.option().unwrap());
    dec.finish().unwrap();
}

#[test]
fn test_variant_round_trip() {
    let mut enc = Encoder::new();
    enc.variant("Request").unwrap();
    enc.str("payload").unwrap();
    enc.variant("Empty").unwrap();
    enc.unit().unwrap();
    let bytes = enc.into_bytes();

    let mut dec = Decoder::new(&bytes);
    assert_eq!(dec.variant().unwrap(), "Request");
    assert_eq!(dec.str().unwrap(), "payload");
    assert_eq!(dec.variant().unwrap(), "Empty");
    dec.unit().unwrap();
    dec.finish().unwrap();
}

#[test]
fn test_empty_input_is_unexpected_end() {
    let mut dec = Decoder::new(&[]);
    assert_eq!(dec.i32(), Err(Error::UnexpectedEnd));
}

#[test]
fn test_invalid_tag_rejected() {
    let mut dec = Decoder::new(&[0xEE]);
    assert_eq!(dec.i32(), Err(Error::InvalidTag(0xEE)));
}

#[test]
fn test_type_mismatch_reported() {
    let mut enc = Encoder::new();
    enc.str("not a number").unwrap();
    let bytes = enc.into_bytes();

    let mut dec = Decoder::new(&bytes);
    assert_eq!(
        dec.i32(),
        Err(Error::TypeMismatch { expected: Tag::S32, found: Tag::Str })
    );
}

#[test]
fn test_truncated_blob_is_unexpected_end() {
    let mut enc = Encoder::new();
    enc.str("truncate me").unwrap();
    let mut bytes = enc.into_bytes();
    bytes.truncate(bytes.len() - 3);

    let mut dec = Decoder::new(&bytes);
    assert_eq!(dec.str(), Err(Error::UnexpectedEnd));
}

#[test]
fn test_trailing_bytes_detected() {
    let mut enc = Encoder::new();
    enc.bool(true).unwrap();
    enc.bool(false).unwrap();
    let bytes = enc.into_bytes();

    let mut dec = Decoder::new(&bytes);
    dec.bool().unwrap();
    assert_eq!(dec.finish(), Err(Error::TrailingBytes(2)));
}

#[test]
fn test_malformed_bool_byte() {
    let bytes = [Tag::Bool as u8, 0x02];
    let mut dec = Decoder::new(&bytes);
    assert_eq!(dec.bool(), Err(Error::Malformed));
}

#[test]
fn test_invalid_utf8_rejected() {
    let bytes = [Tag::Str as u8, 2, 0, 0, 0, 0xFF, 0xFE];
    let mut dec = Decoder::new(&bytes);
    assert_eq!(dec.str(), Err(Error::InvalidUtf8));
}

#[test]
fn test_peek_does_not_consume() {
    let mut enc = Encoder::new();
    enc.i64(99).unwrap();
    let bytes = enc.into_bytes();

    let mut dec = Decoder::new(&bytes);
    assert_eq!(dec.peek_tag().unwrap(), Tag::S64);
    assert_eq!(dec.peek_tag().unwrap(), Tag::S64);
    assert_eq!(dec.i64().unwrap(), 99);
}
