use super::derived_trait_names;
use proc_macro2::{Span, TokenStream};
use quote::quote;
use syn::parse::Parser;
use syn::punctuated::Punctuated;
use syn::{Attribute, Expr, ItemFn, ItemStruct, Lit, LitStr, Meta, MetaNameValue, Token};

/// Expands the `#[api_model]` attribute macro.
///
/// Adds the missing `Debug`/`Serialize`/`Deserialize` derives, a feature-gated `ToSchema`,
/// and the workspace serde policy (`camelCase`, `deny_unknown_fields`) unless overridden.
pub fn expand_api_model(args: TokenStream, input: ItemStruct) -> TokenStream {
    match try_expand_api_model(args, input) {
        Ok(tokens) => tokens,
        Err(err) => err.to_compile_error(),
    }
}

/// Expands the `#[api_handler]` attribute macro.
///
/// The handler body is kept as is; `utoipa::path` metadata is only attached when the
/// consuming crate builds with its `server` feature.
pub fn expand_api_handler(args: TokenStream, input: ItemFn) -> TokenStream {
    let ItemFn { attrs, vis, sig, block } = input;

    quote! {
        #(#attrs)*
        #[allow(clippy::unused_async)]
        #[cfg_attr(feature = "server", ::utoipa::path(#args))]
        #vis #sig #block
    }
}

#[derive(Default)]
struct ApiModelArgs {
    rename_all: Option<LitStr>,
    deny_unknown_fields: Option<bool>,
}

fn try_expand_api_model(args: TokenStream, input: ItemStruct) -> syn::Result<TokenStream> {
    let args = parse_api_model_args(args)?;
    let derives = derived_trait_names(&input.attrs);
    let (existing_rename, existing_deny) = existing_serde_policy(&input.attrs)?;

    let mut missing = Vec::new();
    if !derives.contains("Debug") {
        missing.push(quote! { Debug });
    }
    if !derives.contains("Serialize") {
        missing.push(quote! { ::serde::Serialize });
    }
    if !derives.contains("Deserialize") {
        missing.push(quote! { ::serde::Deserialize });
    }
    let derive_attr = if missing.is_empty() { quote! {} } else { quote! { #[derive(#(#missing),*)] } };

    let schema_attr = if derives.contains("ToSchema") {
        quote! {}
    } else {
        quote! { #[cfg_attr(feature = "server", derive(::utoipa::ToSchema))] }
    };

    let wanted_rename = args.rename_all.unwrap_or_else(|| LitStr::new("camelCase", Span::call_site()));
    let rename_attr = match existing_rename {
        Some(existing) if existing.value() != wanted_rename.value() => {
            return Err(syn::Error::new_spanned(
                existing,
                "Conflicting serde rename_all; remove it or set api_model(rename_all = \"...\") to match",
            ));
        },
        Some(_) => quote! {},
        None => quote! { #[serde(rename_all = #wanted_rename)] },
    };

    let deny = args.deny_unknown_fields.unwrap_or(true);
    let deny_attr = match (existing_deny, deny) {
        (true, false) => {
            return Err(syn::Error::new_spanned(
                &input.ident,
                "deny_unknown_fields is already set via serde; remove it before disabling",
            ));
        },
        (false, true) => quote! { #[serde(deny_unknown_fields)] },
        _ => quote! {},
    };

    Ok(quote! {
        #derive_attr
        #schema_attr
        #rename_attr
        #deny_attr
        #input
    })
}

fn parse_api_model_args(args: TokenStream) -> syn::Result<ApiModelArgs> {
    let metas = Punctuated::<Meta, Token![,]>::parse_terminated.parse2(args)?;
    let mut parsed = ApiModelArgs::default();

    for meta in metas {
        let nv = match meta {
            Meta::NameValue(nv) => nv,
            other => {
                return Err(syn::Error::new_spanned(
                    other,
                    "Expected name-value arguments like `rename_all = \"...\"`",
                ));
            },
        };

        if nv.path.is_ident("rename_all") {
            let Lit::Str(value) = literal(&nv, "rename_all must be a string literal")? else {
                return Err(syn::Error::new_spanned(&nv.value, "rename_all must be a string literal"));
            };
            set_once(&mut parsed.rename_all, &nv, value)?;
        } else if nv.path.is_ident("deny_unknown_fields") {
            let Lit::Bool(value) = literal(&nv, "deny_unknown_fields must be a boolean literal")?
            else {
                return Err(syn::Error::new_spanned(
                    &nv.value,
                    "deny_unknown_fields must be a boolean literal",
                ));
            };
            set_once(&mut parsed.deny_unknown_fields, &nv, value.value)?;
        } else {
            return Err(syn::Error::new_spanned(
                nv.path,
                "Unsupported argument; expected rename_all or deny_unknown_fields",
            ));
        }
    }

    Ok(parsed)
}

fn literal(nv: &MetaNameValue, message: &str) -> syn::Result<Lit> {
    match &nv.value {
        Expr::Lit(expr) => Ok(expr.lit.clone()),
        other => Err(syn::Error::new_spanned(other, message)),
    }
}

fn set_once<T>(slot: &mut Option<T>, token: &MetaNameValue, value: T) -> syn::Result<()> {
    if slot.is_some() {
        return Err(syn::Error::new_spanned(token, "Duplicate argument"));
    }
    *slot = Some(value);
    Ok(())
}

/// Reads `rename_all` and `deny_unknown_fields` from serde attributes already on the struct.
fn existing_serde_policy(attrs: &[Attribute]) -> syn::Result<(Option<LitStr>, bool)> {
    let mut rename_all = None;
    let mut deny_unknown_fields = false;

    for attr in attrs.iter().filter(|attr| attr.path().is_ident("serde")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename_all") {
                rename_all = Some(meta.value()?.parse::<LitStr>()?);
            } else if meta.path.is_ident("deny_unknown_fields") {
                deny_unknown_fields = true;
            } else if meta.input.peek(Token![=]) {
                // Skip values of serde options this macro does not care about.
                let _: Expr = meta.value()?.parse()?;
            }
            Ok(())
        })?;
    }

    Ok((rename_all, deny_unknown_fields))
}
