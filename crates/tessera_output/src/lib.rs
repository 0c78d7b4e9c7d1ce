//! Deferred values and encoder inputs for Tessera (Layer 1).
//!
//! `tessera_output` provides the value calculus resource programs are
//! written in:
//!
//! - [`output`] - deferred values and their combinators
//! - [`input`] - the closed set of shapes a property tree is built from
//! - [`resource`] - identity-compared resource handles
//! - [`macro@InputType`] - derive macro for declared argument bags
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use tessera_output::prelude::*;
//!
//! #[derive(InputType)]
//! struct ListenerArgs {
//!     #[input(name = "hostName")]
//!     host_name: Input,
//!     port: Option<Input>,
//! }
//!
//! # futures::executor::block_on(async {
//! let args = ListenerArgs {
//!     host_name: Output::from_value(json!("example.com")).into(),
//!     port: Some(443.into()),
//! };
//!
//! let lifted = Output::from_input(args);
//! assert_eq!(
//!     lifted.future().await.unwrap(),
//!     Some(json!({"hostName": "example.com", "port": 443}))
//! );
//! # });
//! ```

// Self-reference so `#[derive(InputType)]` output can name `tessera_output::`
// paths within this crate.
extern crate self as tessera_output;

/// Error types.
pub mod error;

/// Encoder inputs and declared argument bags.
pub mod input;

/// Deferred values.
pub mod output;

/// Resource handles.
pub mod resource;

/// Re-export the `#[derive(InputType)]` macro.
pub use input_macros::InputType;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use crate::error::{InputError, OutputError};
    pub use crate::input::{ArgField, Input, InputArgs, InputFuture, InputType};
    pub use crate::output::{Applied, Key, Output};
    pub use crate::resource::{Resource, ResourceHandle, ResourceSet};
}
