//! # Tessera Internal Library
//!
//! Re-exports the core Tessera crates for convenience.

/// Layer 1: wire markers, run context and payload references.
pub use tessera_core;

/// Layer 1: deferred values, resource handles and encoder inputs.
pub use tessera_output;

/// Layer 2: structural wire encoder and decoder.
pub use tessera_rpc;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use tessera_core::prelude::*;
    pub use tessera_output::prelude::*;
    pub use tessera_rpc::prelude::*;
}
