use proc_macro::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Expr, Fields, Meta, parse_macro_input, spanned::Spanned};

/// Variant attribute: #[weight(<const i32 expr>)]
#[proc_macro_derive(WeightedEnum, attributes(weight))]
pub fn derive_weighted_enum(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let enum_ident = &input.ident;

    let Data::Enum(data_enum) = &input.data else {
        return Err(syn::Error::new(
            input.ident.span(),
            "WeightedEnum can only be derived for enums",
        ));
    };

    let mut entries = Vec::new();
    for variant in &data_enum.variants {
        if !matches!(variant.fields, Fields::Unit) {
            return Err(syn::Error::new(
                variant.span(),
                "WeightedEnum only supports fieldless variants",
            ));
        }

        let weight = variant_weight(variant)?.ok_or_else(|| {
            syn::Error::new(variant.span(), "missing #[weight(...)] on variant")
        })?;

        let ident = &variant.ident;
        // typed const: floats, wider types and out-of-range literals fail to compile
        entries.push(quote! {
            (Self::#ident, {
                const WEIGHT: i32 = #weight;
                WEIGHT
            })
        });
    }

    Ok(quote! {
        impl ::weightedbag::WeightedEnum for #enum_ident {
            const ENTRIES: &'static [(Self, i32)] = &[
                #(#entries),*
            ];
        }

        impl #enum_ident {
            /// Build a `WeightedSampler<#enum_ident>` from the annotated weights.
            pub fn sampler() -> ::core::result::Result<
                ::weightedbag::WeightedSampler<Self>,
                ::weightedbag::WeightError,
            >
            where
                Self: Copy,
            {
                <Self as ::weightedbag::WeightedEnum>::sampler()
            }
        }
    })
}

/// Find and parse `#[weight(...)]`; a second one on the same variant is an error.
fn variant_weight(variant: &syn::Variant) -> syn::Result<Option<Expr>> {
    let mut found = None;
    for attr in &variant.attrs {
        if !attr.path().is_ident("weight") {
            continue;
        }
        let Meta::List(list) = &attr.meta else {
            return Err(syn::Error::new(attr.meta.span(), "use #[weight(<expr>)]"));
        };
        let expr = syn::parse2::<Expr>(list.tokens.clone())
            .map_err(|e| syn::Error::new(list.span(), format!("invalid weight expr: {e}")))?;
        if found.replace(expr).is_some() {
            return Err(syn::Error::new(attr.span(), "duplicate #[weight(...)]"));
        }
    }
    Ok(found)
}
