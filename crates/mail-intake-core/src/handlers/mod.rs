//! # Action Handlers
//!
//! The two stateless handlers the dispatcher can invoke. Each one is a
//! free async function over trait abstractions, constructs its entire state
//! per call, and always returns a structured outcome; failures never
//! propagate as panics.

/// Inbound email webhook relay
pub mod webhook;

/// Provider-side parse route provisioning
pub mod provision;
