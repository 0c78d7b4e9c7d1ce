//! Wire vocabulary and execution context for Tessera (Layer 1).
//!
//! `tessera_core` holds the leaves every other Tessera crate builds on:
//!
//! - [`unknown`] - the "value not yet known" sentinel and structural checks
//! - [`sig`] - reserved structural markers identifying special payloads
//! - [`asset`] - payload references (inline/file/remote content, archives)
//! - [`context`] - preview flag and engine capabilities
//!
//! # Architecture
//!
//! - **Layer 1** (`tessera_core`): wire vocabulary (this crate)
//! - **Layer 1** (`tessera_output`): deferred values and their combinators
//! - **Layer 2** (`tessera_rpc`): structural encoder and decoder

/// Payload references: assets and archives.
pub mod asset;

/// Execution mode and engine capabilities.
pub mod context;

/// Error types.
pub mod error;

/// Reserved structural markers.
pub mod sig;

/// The unknown-value sentinel.
pub mod unknown;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use crate::asset::{Archive, Asset, AssetOrArchive};
    pub use crate::context::{FeatureSupport, RunContext};
    pub use crate::error::{AssetError, ConfigError};
    pub use crate::sig::{SIG_KEY, Signature};
    pub use crate::unknown::{UNKNOWN, contains_unknowns, is_unknown, unknown};
}

pub use asset::{Archive, Asset, AssetOrArchive};
pub use context::{FeatureSupport, RunContext};
pub use unknown::{UNKNOWN, contains_unknowns, is_unknown, unknown};
