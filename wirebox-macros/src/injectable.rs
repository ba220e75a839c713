//! `#[derive(Injectable)]`.

use darling::ast::{Data, Style};
use darling::{FromDeriveInput, FromField};
use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{DeriveInput, GenericArgument, PathArguments, Type, parse_macro_input};

#[derive(FromField)]
#[darling(attributes(inject))]
struct InjectField {
    ident: Option<syn::Ident>,
    ty: Type,
    /// Named value key to fall back on.
    #[darling(default)]
    value: Option<String>,
}

#[derive(FromDeriveInput)]
#[darling(attributes(injectable), supports(struct_any))]
struct InjectableInput {
    ident: syn::Ident,
    generics: syn::Generics,
    data: Data<(), InjectField>,
    #[darling(multiple, rename = "capability")]
    capabilities: Vec<Type>,
}

/// Returns `T` for a field typed `Arc<T>` (any path ending in `Arc`).
fn arc_inner(ty: &Type) -> Option<&Type> {
    let Type::Path(path) = ty else {
        return None;
    };
    let segment = path.path.segments.last()?;
    if segment.ident != "Arc" {
        return None;
    }
    let PathArguments::AngleBracketed(arguments) = &segment.arguments else {
        return None;
    };
    match arguments.args.first() {
        Some(GenericArgument::Type(inner)) if arguments.args.len() == 1 => Some(inner),
        _ => None,
    }
}

/// One constructor parameter: its declaration and the expression reading it.
struct Slot {
    parameter: TokenStream2,
    argument: TokenStream2,
}

fn field_slot(field: &InjectField, args: &syn::Ident) -> Result<Slot, syn::Error> {
    let ty = &field.ty;

    match (arc_inner(ty), field.value.as_deref()) {
        (Some(inner), None) => Ok(Slot {
            parameter: quote! { ::wirebox::Parameter::of::<#inner>() },
            argument: quote! { #args.instance::<#inner>()? },
        }),
        (Some(inner), Some(key)) => Ok(Slot {
            parameter: quote! { ::wirebox::Parameter::named::<#inner>(#key) },
            argument: quote! { #args.instance::<#inner>()? },
        }),
        (None, Some(key)) => Ok(Slot {
            parameter: quote! { ::wirebox::Parameter::named::<#ty>(#key) },
            argument: quote! { #args.value::<#ty>()? },
        }),
        (None, None) => Err(syn::Error::new_spanned(
            ty,
            "Injectable fields must be `Arc<T>` or carry #[inject(value = \"key\")]",
        )),
    }
}

pub fn derive_injectable(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let parsed = match InjectableInput::from_derive_input(&input) {
        Ok(parsed) => parsed,
        Err(err) => return err.write_errors().into(),
    };

    match expand(parsed) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand(input: InjectableInput) -> Result<TokenStream2, syn::Error> {
    let name = &input.ident;

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "Injectable cannot be derived for generic types; implement it by hand",
        ));
    }

    let Data::Struct(fields) = input.data else {
        return Err(syn::Error::new_spanned(name, "Injectable can only be derived for structs"));
    };

    let args = if fields.is_empty() {
        format_ident!("_args")
    } else {
        format_ident!("args")
    };

    let mut errors: Vec<syn::Error> = Vec::new();
    let mut parameters = Vec::new();
    let mut arguments = Vec::new();
    for field in &fields.fields {
        match field_slot(field, &args) {
            Ok(slot) => {
                parameters.push(slot.parameter);
                arguments.push((field.ident.clone(), slot.argument));
            }
            Err(err) => errors.push(err),
        }
    }

    if let Some(mut first) = errors.pop() {
        for err in errors {
            first.combine(err);
        }
        return Err(first);
    }

    let construct = match fields.style {
        Style::Unit => quote! { Self },
        Style::Tuple => {
            let values = arguments.iter().map(|(_, value)| value);
            quote! { Self( #(#values),* ) }
        }
        Style::Struct => {
            let values = arguments.iter().map(|(ident, value)| quote! { #ident: #value });
            quote! { Self { #(#values),* } }
        }
    };

    let capabilities = input.capabilities.iter().map(|capability| {
        quote! {
            .capability(|it: ::std::sync::Arc<Self>| -> ::std::sync::Arc<#capability> { it })
        }
    });

    let factory_result = quote! { ::core::result::Result<Self, ::wirebox::BoxError> };

    Ok(quote! {
        impl ::wirebox::Injectable for #name {
            fn definition() -> ::wirebox::Definition {
                ::wirebox::Definition::of::<Self>()
                    .constructor(
                        [#(#parameters),*],
                        |#args: &mut ::wirebox::Arguments<'_>| -> #factory_result {
                            ::core::result::Result::Ok(#construct)
                        },
                    )
                    #(#capabilities)*
                    .build()
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(src: &str) -> Type {
        syn::parse_str(src).unwrap()
    }

    #[test]
    fn arc_inner_plain() {
        let ty = field("Arc<Database>");
        let inner = arc_inner(&ty).unwrap();
        assert_eq!(quote!(#inner).to_string(), "Database");
    }

    #[test]
    fn arc_inner_qualified_trait_object() {
        let ty = field("std::sync::Arc<dyn Repository>");
        let inner = arc_inner(&ty).unwrap();
        assert_eq!(quote!(#inner).to_string(), "dyn Repository");
    }

    #[test]
    fn arc_inner_rejects_other_types() {
        assert!(arc_inner(&field("String")).is_none());
        assert!(arc_inner(&field("Box<Database>")).is_none());
        assert!(arc_inner(&field("Arc")).is_none());
    }

    #[test]
    fn expands_named_struct() {
        let input: DeriveInput = syn::parse_quote! {
            #[injectable(capability = "dyn Notifier")]
            struct SmsClient {
                #[inject(value = "smsUrl")]
                url: String,
                transport: Arc<dyn Transport>,
            }
        };

        let parsed = InjectableInput::from_derive_input(&input).unwrap();
        let out = expand(parsed).unwrap().to_string();

        assert!(out.contains("impl :: wirebox :: Injectable for SmsClient"));
        assert!(out.contains("Parameter :: named :: < String > (\"smsUrl\")"));
        assert!(out.contains("Parameter :: of :: < dyn Transport > ()"));
        assert!(out.contains("Arc < dyn Notifier >"));
    }

    #[test]
    fn repeated_capability_attributes_accumulate() {
        let input: DeriveInput = syn::parse_quote! {
            #[injectable(capability = "dyn Reader")]
            #[injectable(capability = "dyn Writer")]
            struct Storage;
        };

        let parsed = InjectableInput::from_derive_input(&input).unwrap();
        assert_eq!(parsed.capabilities.len(), 2);

        let out = expand(parsed).unwrap().to_string();
        assert_eq!(out.matches(". capability (").count(), 2);
        assert!(out.contains("Arc < dyn Reader >"));
        assert!(out.contains("Arc < dyn Writer >"));
    }

    #[test]
    fn unit_struct_has_no_parameters() {
        let input: DeriveInput = syn::parse_quote! {
            struct RepositoryStubImpl;
        };

        let parsed = InjectableInput::from_derive_input(&input).unwrap();
        let out = expand(parsed).unwrap().to_string();

        assert!(out.contains("[]"));
        assert!(out.contains("_args"));
    }

    #[test]
    fn plain_field_without_key_is_rejected() {
        let input: DeriveInput = syn::parse_quote! {
            struct Broken {
                url: String,
            }
        };

        let parsed = InjectableInput::from_derive_input(&input).unwrap();
        let err = expand(parsed).err().unwrap();
        assert!(err.to_string().contains("Arc<T>"));
    }

    #[test]
    fn generic_struct_is_rejected() {
        let input: DeriveInput = syn::parse_quote! {
            struct Holder<T> {
                inner: Arc<T>,
            }
        };

        let parsed = InjectableInput::from_derive_input(&input).unwrap();
        assert!(expand(parsed).is_err());
    }

    #[test]
    fn enums_are_rejected() {
        let input: DeriveInput = syn::parse_quote! {
            enum Choice { A, B }
        };

        assert!(InjectableInput::from_derive_input(&input).is_err());
    }
}
