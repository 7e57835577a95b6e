//! Derive macro for service-container
//!
//! `#[derive(Autowire)]` generates the `Autowire` implementation that lets
//! the container build a struct from its fields.
//!
//! # Example
//!
//! ```rust,ignore
//! use service_container::{Autowire, Container};
//! use std::sync::Arc;
//!
//! #[derive(Autowire)]
//! struct Repository;
//!
//! #[derive(Autowire)]
//! struct Service {
//!     repo: Arc<Repository>,
//!     #[inject(name = "Logger")]
//!     logger: Arc<dyn Logger>,
//!     #[inject(default)]
//!     requests: u64,
//! }
//!
//! let container = Container::new();
//! container.register_type::<Repository>();
//! container.register_type::<Service>();
//! let service = container.make::<Service>().unwrap();
//! ```

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{Attribute, Data, DeriveInput, Fields, LitStr, Type, parse_macro_input};

/// Derive `service_container::Autowire`.
///
/// Each named field becomes one constructor parameter, in declaration order:
///
/// - `Arc<T>` - resolved as `T`; with `Arc<dyn Trait>` the bound value must
///   itself be an `Arc<dyn Trait>`
/// - `#[inject(name = "id")]` on an `Arc` field - resolved from identifier `id`
/// - `#[inject(default)]` - not a parameter, filled with `Default::default()`
/// - any other field - a builtin parameter, which the container refuses
///   with `UnresolvableParameter`
#[proc_macro_derive(Autowire, attributes(inject))]
pub fn derive_autowire(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(data) => &data.fields,
        _ => {
            return Err(syn::Error::new_spanned(
                input,
                "Autowire can only be derived for structs",
            ));
        }
    };

    let (parameters, body) = match fields {
        Fields::Named(named) => {
            let mut parameters = Vec::new();
            let mut inits = Vec::new();
            for field in &named.named {
                let Some(ident) = field.ident.as_ref() else {
                    continue;
                };
                let label = ident.to_string();
                let (param, init) = field_plan(&label, &field.ty, parse_inject(&field.attrs)?)?;
                parameters.extend(param);
                inits.push(quote! { #ident: #init });
            }
            (parameters, quote! { Self { #(#inits),* } })
        }
        Fields::Unit => (Vec::new(), quote! { Self }),
        Fields::Unnamed(_) => {
            return Err(syn::Error::new_spanned(
                input,
                "Autowire needs named fields to name constructor parameters",
            ));
        }
    };

    Ok(quote! {
        impl #impl_generics ::service_container::Autowire for #name #ty_generics #where_clause {
            fn parameters() -> ::std::vec::Vec<::service_container::Parameter> {
                ::std::vec![#(#parameters),*]
            }

            #[allow(unreachable_code, unused_variables)]
            fn construct(
                args: &mut ::service_container::Arguments,
            ) -> ::service_container::Result<Self> {
                ::std::result::Result::Ok(#body)
            }
        }
    })
}

/// Parsed `#[inject(...)]` options
#[derive(Default)]
struct Inject {
    default: bool,
    name: Option<LitStr>,
}

fn parse_inject(attrs: &[Attribute]) -> syn::Result<Inject> {
    let mut inject = Inject::default();
    for attr in attrs.iter().filter(|a| a.path().is_ident("inject")) {
        if attr.meta.require_path_only().is_ok() {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("default") {
                inject.default = true;
                Ok(())
            } else if meta.path.is_ident("name") {
                inject.name = Some(meta.value()?.parse()?);
                Ok(())
            } else {
                Err(meta.error("expected `default` or `name = \"...\"`"))
            }
        })?;
    }
    Ok(inject)
}

/// Parameter declaration (if any) and initializer for one field
fn field_plan(
    label: &str,
    ty: &Type,
    inject: Inject,
) -> syn::Result<(Option<TokenStream2>, TokenStream2)> {
    if inject.default {
        return Ok((None, quote! { ::std::default::Default::default() }));
    }

    let Some(inner) = arc_inner_type(ty) else {
        if let Some(id) = inject.name {
            return Err(syn::Error::new_spanned(
                id,
                "#[inject(name = ...)] requires a field of type Arc<T>",
            ));
        }
        let type_name = quote!(#ty).to_string();
        return Ok((
            Some(quote! { ::service_container::Parameter::builtin(#label, #type_name) }),
            quote! { match args.unresolvable(#label)? {} },
        ));
    };

    let param = match &inject.name {
        Some(id) => quote! { ::service_container::Parameter::class(#label, #id) },
        None => quote! { ::service_container::Parameter::of::<#inner>(#label) },
    };
    let init = if matches!(inner, Type::TraitObject(_)) {
        quote! { args.take_cloned::<#ty>()? }
    } else {
        quote! { args.take::<#inner>()? }
    };
    Ok((Some(param), init))
}

/// Extract T from Arc<T>
fn arc_inner_type(ty: &Type) -> Option<&Type> {
    let Type::Path(type_path) = ty else {
        return None;
    };
    let segment = type_path.path.segments.last()?;
    if segment.ident != "Arc" {
        return None;
    }
    match &segment.arguments {
        syn::PathArguments::AngleBracketed(args) => match args.args.first()? {
            syn::GenericArgument::Type(inner) => Some(inner),
            _ => None,
        },
        _ => None,
    }
}
