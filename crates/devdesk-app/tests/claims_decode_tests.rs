//! Integration tests for credential claim decoding.

use devdesk_session::decode_claims;

mod common;

#[test]
fn claims_decode_tests_round_trip_reproduces_issued_claims() {
    let token = common::issue_token(42, "ada", &["developer", "reviewer"]);
    let claims = decode_claims(&token).expect("issued token should decode");

    assert_eq!(claims.user_id, 42);
    assert_eq!(claims.username, "ada");
    assert_eq!(claims.subject, "ada");
    assert_eq!(claims.roles, vec!["developer".to_string(), "reviewer".to_string()]);
}

#[test]
fn claims_decode_tests_reject_malformed_tokens_without_fault() {
    for raw in [
        "not-a-token",
        "missing.signature",
        "..",
        "@@@.@@@.@@@",
        "eyJhbGciOiJIUzI1NiJ9",
    ] {
        assert!(decode_claims(raw).is_err(), "{raw:?} should be rejected");
    }
}
