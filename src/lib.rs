//! Deferred values and wire encoding for infrastructure-as-code programs.
//!
//! Tessera models values that are not known yet (resource ids, urns and
//! anything computed from them) as [`Output`](tessera_output::output::Output)s,
//! and converts property trees holding them to and from the wire format the
//! provisioning engine speaks.

pub use tessera_internal::*;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use tessera_internal::prelude::*;
}
