//! Procedural macros for `tessera_output`.
//!
//! This crate provides `#[derive(InputType)]` for declaring argument bags.

mod input_type;

use proc_macro::TokenStream;

/// Derive macro for the `InputType` trait.
///
/// Generates an implementation of `tessera_output::input::InputType` for a
/// struct with named fields, plus a conversion into
/// `tessera_output::input::Input`. Every field type must convert into
/// `Input`; fields holding `None` or null are left out of the bag.
///
/// # Attributes
///
/// On the struct:
///
/// - `name` (optional): the declared type name. Defaults to the struct name.
///
/// On fields:
///
/// - `name` (optional): the wire name. Defaults to the field name.
/// - `skip` (optional): leave the field out of the bag entirely.
///
/// # Example
///
/// ```ignore
/// use tessera_output::input::{Input, InputType};
///
/// #[derive(InputType)]
/// struct FooArgs {
///     #[input(name = "firstArg")]
///     first_arg: Input,
///     #[input(name = "secondArg")]
///     second_arg: Option<Input>,
/// }
/// ```
#[proc_macro_derive(InputType, attributes(input))]
pub fn derive_input_type(input: TokenStream) -> TokenStream {
    input_type::derive_input_type(input)
}
