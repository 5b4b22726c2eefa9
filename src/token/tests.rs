//! Token codec contract tests

use super::*;
use base64::engine::general_purpose::URL_SAFE;

fn codec() -> TokenCodec {
    TokenCodec::new()
}

/// Token for a hand-written payload, padded the way most encoders emit it
fn raw_token(payload: &[u8]) -> String {
    URL_SAFE.encode(payload)
}

// ===== Encoding =====

#[test]
fn test_encode_start_cursor_is_empty() {
    assert_eq!(codec().encode(&Cursor::start()), "");
}

#[test]
fn test_encode_cursor_with_offset() {
    let encoded = codec().encode(&Cursor::new(5, false, None));
    let decoded = codec().decode(Some(&encoded)).unwrap().unwrap();

    assert_eq!(decoded.offset(), 5);
    assert!(!decoded.reverse());
    assert!(decoded.position().is_none());
}

#[test]
fn test_encode_cursor_with_reverse() {
    let encoded = codec().encode(&Cursor::new(0, true, None));
    let decoded = codec().decode(Some(&encoded)).unwrap().unwrap();
    assert!(decoded.reverse());
}

#[test]
fn test_encode_cursor_with_position() {
    let encoded = codec().encode(&Cursor::new(0, false, Some(Position::new("123"))));
    let decoded = codec().decode(Some(&encoded)).unwrap().unwrap();
    assert_eq!(decoded.position(), Some(&Position::new("123")));
}

#[test]
fn test_encode_decode_roundtrip() {
    let cursor = Cursor::new(10, true, Some(Position::new("abc123")));
    let encoded = codec().encode(&cursor);
    assert_eq!(codec().decode(Some(&encoded)).unwrap(), Some(cursor));
}

#[test]
fn test_position_with_special_characters() {
    for text in ["test&value=123", "100%+1", "%26", "s3:a=b", "ünïcödé"] {
        let cursor = Cursor::new(0, false, Some(Position::new(text)));
        let encoded = codec().encode(&cursor);
        assert_eq!(codec().decode(Some(&encoded)).unwrap(), Some(cursor));
    }
}

#[test]
fn test_tokens_are_url_safe() {
    let cursor = Cursor::new(3, true, Some(Position::new("s7:a/b?c=d")));
    let encoded = codec().encode(&cursor);

    assert!(
        encoded
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    );
}

// ===== Decoding =====

#[test]
fn test_decode_none_returns_none() {
    assert_eq!(codec().decode(None).unwrap(), None);
    assert_eq!(codec().decode(Some("")).unwrap(), None);
}

#[test]
fn test_decode_accepts_padded_tokens() {
    // "o=12" encodes with padding
    let token = raw_token(b"o=12");
    assert!(token.ends_with('='));

    let decoded = codec().decode(Some(&token)).unwrap().unwrap();
    assert_eq!(decoded.offset(), 12);
}

#[test]
fn test_decode_invalid_base64_is_malformed() {
    let err = codec().decode(Some("!!invalid!!")).unwrap_err();
    assert!(matches!(err, TokenError::MalformedToken(_)));
}

#[test]
fn test_decode_invalid_offset() {
    let err = codec().decode(Some(&raw_token(b"o=abc"))).unwrap_err();
    assert_eq!(err, TokenError::InvalidOffset("abc".to_string()));

    let err = codec().decode(Some(&raw_token(b"o=-1"))).unwrap_err();
    assert_eq!(err, TokenError::InvalidOffset("-1".to_string()));
}

#[test]
fn test_offset_cutoff_applied() {
    let codec = TokenCodec::new().with_offset_cutoff(100);

    let decoded = codec.decode(Some(&raw_token(b"o=999"))).unwrap().unwrap();
    assert_eq!(decoded.offset(), 100);

    let decoded = codec.decode(Some(&raw_token(b"o=42"))).unwrap().unwrap();
    assert_eq!(decoded.offset(), 42);
}

#[test]
fn test_negative_reverse_value_in_token() {
    let decoded = codec().decode(Some(&raw_token(b"r=-1"))).unwrap().unwrap();
    assert!(decoded.reverse());

    let decoded = codec().decode(Some(&raw_token(b"r=7"))).unwrap().unwrap();
    assert!(decoded.reverse());

    let decoded = codec().decode(Some(&raw_token(b"r=0"))).unwrap().unwrap();
    assert!(!decoded.reverse());
}

#[test]
fn test_non_integer_reverse_is_malformed() {
    let err = codec().decode(Some(&raw_token(b"r=yes"))).unwrap_err();
    assert!(matches!(err, TokenError::MalformedToken(_)));
}

#[test]
fn test_structural_violations_are_malformed() {
    let payloads: [&[u8]; 5] = [
        b"o=1&o=2",
        b"p=a&p=b",
        b"o",
        b"o=1&&r=1",
        b"p=%zz",
    ];

    for payload in payloads {
        let err = codec().decode(Some(&raw_token(payload))).unwrap_err();
        assert!(
            matches!(err, TokenError::MalformedToken(_)),
            "{:?} should be malformed",
            String::from_utf8_lossy(payload)
        );
    }
}

#[test]
fn test_non_utf8_payload_is_malformed() {
    let err = codec().decode(Some(&raw_token(&[0xff, 0xfe, 0xfd]))).unwrap_err();
    assert!(matches!(err, TokenError::MalformedToken(_)));

    let err = codec().decode(Some(&raw_token(b"p=%ff"))).unwrap_err();
    assert!(matches!(err, TokenError::MalformedToken(_)));
}

#[test]
fn test_unknown_keys_are_ignored() {
    let decoded = codec()
        .decode(Some(&raw_token(b"x=1&o=3&page=9")))
        .unwrap()
        .unwrap();
    assert_eq!(decoded, Cursor::new(3, false, None));
}

#[test]
fn test_oversized_token_rejected() {
    let token = "A".repeat(MAX_TOKEN_LEN + 1);
    let err = codec().decode(Some(&token)).unwrap_err();
    assert_eq!(
        err,
        TokenError::TooLong {
            len: MAX_TOKEN_LEN + 1,
            max: MAX_TOKEN_LEN
        }
    );
}
