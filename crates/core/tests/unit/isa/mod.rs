//! Decoder coverage and round-trip properties.

/// Canonical-form round trips and decoder totality.
pub mod roundtrip;
