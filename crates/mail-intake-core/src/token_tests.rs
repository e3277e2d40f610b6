//! Tests for constant-time token verification.

use super::*;

#[test]
fn test_matching_tokens_verify() {
    assert!(verify_token(Some("T"), "T"));
    assert!(verify_token(Some("a-much-longer-shared-secret"), "a-much-longer-shared-secret"));
}

#[test]
fn test_absent_token_is_rejected() {
    assert!(!verify_token(None, "expected"));
}

#[test]
fn test_length_mismatch_is_rejected() {
    assert!(!verify_token(Some("short"), "a-longer-secret"));
    assert!(!verify_token(Some("a-longer-secret"), "short"));
    assert!(!verify_token(Some(""), "x"));
}

#[test]
fn test_mismatch_position_does_not_change_result() {
    // Equivalence classes: a difference in the first, middle, or last byte
    // must all be plain rejections. Timing-insensitivity itself comes from
    // the bitwise-accumulating comparison, not from a wall-clock assertion.
    let expected = "abcdefgh";
    assert!(!verify_token(Some("Xbcdefgh"), expected));
    assert!(!verify_token(Some("abcdXfgh"), expected));
    assert!(!verify_token(Some("abcdefgX"), expected));
}

#[test]
fn test_non_ascii_tokens() {
    assert!(verify_token(Some("sécrét"), "sécrét"));
    assert!(!verify_token(Some("sécrèt"), "sécrét"));
}
