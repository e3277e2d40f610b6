//! # Token Verifier Module
//!
//! Constant-time comparison for the operator's shared webhook secret.

use subtle::ConstantTimeEq;

/// Verify a received token against the expected secret
///
/// The byte comparison accumulates a bitwise difference across every
/// position instead of short-circuiting on the first mismatch, so runtime
/// does not reveal where the tokens diverge. Length is checked up front;
/// an unequal length returns `false` immediately, which leaks only the
/// non-secret length. An absent token is always rejected.
pub fn verify_token(received: Option<&str>, expected: &str) -> bool {
    let Some(received) = received else {
        return false;
    };

    let received = received.as_bytes();
    let expected = expected.as_bytes();

    if received.len() != expected.len() {
        return false;
    }

    received.ct_eq(expected).into()
}

#[cfg(test)]
#[path = "token_tests.rs"]
mod tests;
