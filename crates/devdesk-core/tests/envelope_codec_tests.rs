//! Integration tests for envelope wire decoding.

use devdesk_core::{ApiEnvelope, SUCCESS_CODE};

#[test]
fn decodes_success_envelope_from_wire_shape() {
    let raw = br#"{"code":0,"msg":"success","data":"header.payload.signature"}"#;
    let envelope: ApiEnvelope<String> =
        ApiEnvelope::from_json_bytes(raw).expect("wire envelope should decode");

    assert_eq!(envelope.code, SUCCESS_CODE);
    assert_eq!(envelope.message, "success");
    assert_eq!(envelope.into_data().unwrap(), "header.payload.signature");
}

#[test]
fn decodes_rejection_envelope_with_null_data() {
    let raw = br#"{"code":-1,"msg":"bad credentials","data":null}"#;
    let envelope: ApiEnvelope<String> =
        ApiEnvelope::from_json_bytes(raw).expect("rejection envelope should decode");

    assert!(!envelope.is_success());
    assert!(envelope.into_data().is_err());
}

#[test]
fn rejects_body_that_is_not_an_envelope() {
    let raw = br#"["not", "an", "envelope"]"#;
    assert!(ApiEnvelope::<String>::from_json_bytes(raw).is_err());
}
