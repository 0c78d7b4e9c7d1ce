//! Derive macro for the `InputType` trait.

use darling::{FromDeriveInput, FromField};
use proc_macro::TokenStream;
use quote::quote;
use syn::ext::IdentExt;
use syn::{DeriveInput, parse_macro_input};

/// Parsed struct-level attributes.
#[derive(FromDeriveInput)]
#[darling(attributes(input), supports(struct_named))]
struct InputTypeArgs {
    ident: syn::Ident,
    generics: syn::Generics,
    data: darling::ast::Data<(), InputFieldArgs>,

    /// Declared type name; the struct name if omitted.
    #[darling(default)]
    name: Option<String>,
}

/// Parsed field-level attributes.
#[derive(FromField)]
#[darling(attributes(input))]
struct InputFieldArgs {
    ident: Option<syn::Ident>,

    /// Wire name; the field name if omitted.
    #[darling(default)]
    name: Option<String>,

    #[darling(default)]
    skip: bool,
}

/// Implementation of the `#[derive(InputType)]` macro.
pub(crate) fn derive_input_type(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let args = match InputTypeArgs::from_derive_input(&input) {
        Ok(args) => args,
        Err(err) => return err.write_errors().into(),
    };

    let name = &args.ident;
    let type_name = args.name.clone().unwrap_or_else(|| name.unraw().to_string());
    let (impl_generics, ty_generics, where_clause) = args.generics.split_for_impl();

    let Some(fields) = args.data.take_struct() else {
        return darling::Error::unsupported_shape("enum")
            .with_span(name)
            .write_errors()
            .into();
    };

    let mut pushes = Vec::with_capacity(fields.len());
    for field in fields.into_iter().filter(|field| !field.skip) {
        let Some(ident) = field.ident else {
            continue;
        };
        let field_name = ident.unraw().to_string();
        let wire_name = field.name.unwrap_or_else(|| field_name.clone());
        pushes.push(quote! {
            .field(#field_name, #wire_name, self.#ident)
        });
    }

    let krate =
        tessera_macro_utils::resolve_crate_path(tessera_macro_utils::TesseraCrate::Output);

    let expanded = quote! {
        impl #impl_generics #krate::input::InputType for #name #ty_generics #where_clause {
            fn into_args(self) -> #krate::input::InputArgs {
                #krate::input::InputArgs::new(#type_name)
                    #(#pushes)*
            }
        }

        impl #impl_generics ::core::convert::From<#name #ty_generics> for #krate::input::Input #where_clause {
            fn from(args: #name #ty_generics) -> Self {
                Self::Args(#krate::input::InputType::into_args(args))
            }
        }
    };

    expanded.into()
}
