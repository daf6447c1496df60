//! Serde serialization/deserialization round-trip tests.
//!
//! These tests verify that the public value types can be serialized to JSON
//! and deserialized back, producing equal values.

#![cfg(feature = "serde")]

use pdfcmap_core::*;

/// Helper: serialize to JSON string, deserialize back, assert equality.
fn roundtrip<T>(value: &T)
where
    T: serde::Serialize + serde::de::DeserializeOwned + PartialEq + std::fmt::Debug,
{
    let json = serde_json::to_string(value).expect("serialize failed");
    let restored: T = serde_json::from_str(&json).expect("deserialize failed");
    assert_eq!(*value, restored, "round-trip mismatch for JSON: {json}");
}

#[test]
fn test_serde_codespace() {
    roundtrip(&Codespace::new(1, 0x00, 0x80).unwrap());
    roundtrip(&Codespace::new(2, 0x8140, 0x9FFC).unwrap());
}

#[test]
fn test_serde_codespace_field_names() {
    let cs = Codespace::new(2, 0x8000, 0xFFFF).unwrap();
    let value = serde_json::to_value(cs).unwrap();
    assert_eq!(value["num_bytes"], 2);
    assert_eq!(value["low"], 0x8000);
    assert_eq!(value["high"], 0xFFFF);
}

#[test]
fn test_serde_codespace_rejects_invalid() {
    for json in [
        r#"{"num_bytes":0,"low":5,"high":1}"#,
        r#"{"num_bytes":2,"low":16,"high":1}"#,
        r#"{"num_bytes":1,"low":0,"high":256}"#,
        r#"{"num_bytes":5,"low":0,"high":1}"#,
    ] {
        let err = serde_json::from_str::<Codespace>(json).unwrap_err();
        assert!(err.to_string().contains("codespace"), "{json}: {err}");
    }
}

#[test]
fn test_serde_bit_width() {
    roundtrip(&BitWidth::Simple);
    roundtrip(&BitWidth::Cid);
}

#[test]
fn test_serde_cmap_type() {
    roundtrip(&CMapType::Cid);
    roundtrip(&CMapType::ToUnicode);
    roundtrip(&CMapType::Other(0));
}

#[test]
fn test_serde_system_info() {
    roundtrip(&CidSystemInfo::new("Adobe", "Japan1", 6));
    roundtrip(&CidSystemInfo::identity_ucs());
}

#[test]
fn test_serde_decoded_text() {
    roundtrip(&DecodedText {
        text: "A\u{FFFD}".to_string(),
        missing: 1,
        fully_matched: true,
    });
}
