//! Structural wire encoder and decoder for Tessera (Layer 2).
//!
//! `tessera_rpc` converts between in-memory property trees and the
//! transport-neutral wire format exchanged with the provisioning engine:
//!
//! - [`encode`] - [`Input`](tessera_output::input::Input) trees to wire values,
//!   with dependency tracking
//! - [`decode`] - wire values back to plain values, with secret push-up
//!
//! Both directions are configured by a
//! [`RunContext`](tessera_core::RunContext): whether the run is a preview,
//! and which special forms the engine understands.
//!
//! # Architecture
//!
//! - **Layer 1** (`tessera_core`, `tessera_output`): wire vocabulary and deferred values
//! - **Layer 2** (`tessera_rpc`): structural encoder and decoder (this crate)

/// Structural decoder.
pub mod decode;

/// Structural encoder.
pub mod encode;

/// Error types.
pub mod error;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use crate::decode::{PropertyDecoder, decode};
    pub use crate::encode::{EncodedProperties, KeyTransform, PropertyEncoder, encode};
    pub use crate::error::{DecodeError, EncodeError};
}
