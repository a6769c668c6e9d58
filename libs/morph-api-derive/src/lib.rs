use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, DeriveInput, Path};

/// Derive macro for conversion-engine type descriptors.
///
/// Generates `TypeDescribed` and `Convertible` impls for the annotated type.
/// The optional `#[convert(...)]` attribute declares the supertype walk:
///
/// - `implements(A, B)` — capability markers, in declaration order. The
///   dispatcher tries them in exactly this order during lookup.
/// - `extends = P` — parent type, tried after all capability markers.
///
/// # Example
///
/// ```ignore
/// #[derive(Convertible)]
/// pub struct Printable;
///
/// #[derive(Convertible)]
/// #[convert(implements(Printable))]
/// pub struct Report {
///     pub body: String,
/// }
/// ```
///
/// Every type named in `implements`/`extends` must itself implement
/// `TypeDescribed` (markers can simply derive `Convertible` with no
/// attribute).
#[proc_macro_derive(Convertible, attributes(convert))]
pub fn derive_convertible(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match derive_impl(&input) {
        Ok(tokens) => tokens,
        Err(e) => e.to_compile_error().into(),
    }
}

fn derive_impl(input: &DeriveInput) -> Result<TokenStream, syn::Error> {
    let name = &input.ident;

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "Convertible cannot be derived for generic types",
        ));
    }

    let mut implements: Vec<Path> = Vec::new();
    let mut extends: Option<Path> = None;

    for attr in &input.attrs {
        if !attr.path().is_ident("convert") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("implements") {
                meta.parse_nested_meta(|inner| {
                    implements.push(inner.path.clone());
                    Ok(())
                })
            } else if meta.path.is_ident("extends") {
                extends = Some(meta.value()?.parse()?);
                Ok(())
            } else {
                Err(meta.error("expected 'implements(...)' or 'extends = ...'"))
            }
        })?;
    }

    let trait_fns = implements.iter().map(|p| {
        quote! { <#p as morph_api::convertible::TypeDescribed>::type_info }
    });

    let parent_expr = match &extends {
        Some(p) => quote! {
            Some(<#p as morph_api::convertible::TypeDescribed>::type_info as fn() -> morph_api::convertible::TypeInfo)
        },
        None => quote! { None },
    };

    let expanded = quote! {
        impl morph_api::convertible::TypeDescribed for #name {
            fn type_info() -> morph_api::convertible::TypeInfo {
                static TRAITS: &[fn() -> morph_api::convertible::TypeInfo] = &[
                    #(#trait_fns),*
                ];
                morph_api::convertible::TypeInfo {
                    key: morph_api::convertible::TypeKey::of::<#name>(),
                    traits: TRAITS,
                    parent: #parent_expr,
                }
            }
        }

        impl morph_api::convertible::Convertible for #name {
            fn type_info(&self) -> morph_api::convertible::TypeInfo {
                <Self as morph_api::convertible::TypeDescribed>::type_info()
            }

            fn as_any(&self) -> &dyn ::core::any::Any {
                self
            }
        }
    };

    Ok(TokenStream::from(expanded))
}
