//! Shared utilities for Tessera procedural macro crates.
//!
//! Generated code has to name Tessera items by absolute path. Consumers may
//! depend on a Tessera crate directly, under a renamed key, or only through
//! the `tessera` umbrella crate; [`resolve_crate_path`] finds the right one.

use proc_macro_crate::{FoundCrate, crate_name};
use proc_macro2::TokenStream;
use quote::{format_ident, quote};

/// A Tessera crate that macro-generated code may reference.
pub enum TesseraCrate {
    /// `tessera_output`
    Output,
}

impl TesseraCrate {
    fn package(&self) -> &'static str {
        match self {
            Self::Output => "tessera_output",
        }
    }
}

/// Returns a [`TokenStream`] path naming the given Tessera crate.
///
/// Tried in order:
/// 1. A direct dependency, honoring renames in `Cargo.toml`.
/// 2. The `tessera` umbrella crate, as `tessera::<name>`.
/// 3. The bare package name, so a missing dependency surfaces as an
///    unresolved path at the use site.
pub fn resolve_crate_path(krate: TesseraCrate) -> TokenStream {
    let package = krate.package();
    let fallback = format_ident!("{}", package);

    match crate_name(package) {
        Ok(FoundCrate::Itself) => quote!(#fallback),
        Ok(FoundCrate::Name(found)) => {
            let ident = format_ident!("{}", found);
            quote!(#ident)
        }
        Err(_) => match crate_name("tessera") {
            Ok(FoundCrate::Name(umbrella)) => {
                let umbrella = format_ident!("{}", umbrella);
                quote!(#umbrella::#fallback)
            }
            _ => quote!(#fallback),
        },
    }
}
