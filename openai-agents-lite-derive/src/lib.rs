//! `#[function_tool]`: register a plain function as an agent tool.
//!
//! The attribute leaves the function untouched and emits a sibling
//! `<name>_tool()` returning a cached `ToolHandle`. Parameter names, types
//! and doc comments are read from the signature at compile time; the
//! parameter schema is derived from them once, on first use.
//!
//! ```ignore
//! /// Add two integers.
//! #[function_tool(default(b = 1))]
//! fn add(a: i64, b: i64) -> i64 {
//!     a + b
//! }
//!
//! let agent = Agent::new("Calc", "You add numbers.").with_tool(add_tool());
//! assert_eq!(add(2, 3), 5);
//! ```

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::ext::IdentExt;
use syn::spanned::Spanned;
use syn::{
    parse_macro_input, Expr, ExprLit, FnArg, Ident, ItemFn, Lit, LitStr, Meta, Pat, ReturnType,
    Type, TypeReference,
};

#[derive(Default)]
struct ToolAttrs {
    name: Option<LitStr>,
    description: Option<LitStr>,
    defaults: Vec<(Ident, Expr)>,
}

struct Param {
    ident: Ident,
    name: String,
    /// Type the argument is decoded into.
    decode_ty: Type,
    pass: Pass,
    hint: String,
}

/// How a decoded argument is handed to the function.
enum Pass {
    Owned,
    /// `&decoded`
    Borrowed,
    /// `decoded.as_deref()`, for `Option<&str>` and `Option<&[T]>`
    OptionDeref,
    /// `decoded.as_ref()`, for any other `Option<&T>`
    OptionRef,
}

/// Register a free function as a tool.
///
/// Accepted arguments:
/// - `name = "..."` overrides the advertised name (defaults to the function name)
/// - `description = "..."` overrides the doc comment
/// - `default(param = expr, ...)` gives parameters defaults, making them optional
#[proc_macro_attribute]
pub fn function_tool(attr: TokenStream, item: TokenStream) -> TokenStream {
    let mut attrs = ToolAttrs::default();
    let parser = syn::meta::parser(|meta| {
        if meta.path.is_ident("name") {
            attrs.name = Some(meta.value()?.parse()?);
            Ok(())
        } else if meta.path.is_ident("description") {
            attrs.description = Some(meta.value()?.parse()?);
            Ok(())
        } else if meta.path.is_ident("default") {
            meta.parse_nested_meta(|inner| {
                let ident = inner
                    .path
                    .get_ident()
                    .cloned()
                    .ok_or_else(|| inner.error("expected a parameter name"))?;
                let value: Expr = inner.value()?.parse()?;
                attrs.defaults.push((ident, value));
                Ok(())
            })
        } else {
            Err(meta.error(
                "unsupported function_tool argument; \
                 expected `name`, `description` or `default(...)`",
            ))
        }
    });
    parse_macro_input!(attr with parser);

    let func = parse_macro_input!(item as ItemFn);
    match expand(attrs, func) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand(attrs: ToolAttrs, func: ItemFn) -> syn::Result<TokenStream2> {
    let sig = &func.sig;
    if !sig.generics.params.is_empty() || sig.generics.where_clause.is_some() {
        return Err(syn::Error::new(
            sig.generics.span(),
            "function_tool does not support generic functions",
        ));
    }
    if let Some(variadic) = &sig.variadic {
        return Err(syn::Error::new(
            variadic.span(),
            "function_tool cannot describe variadic parameters",
        ));
    }

    let params = sig
        .inputs
        .iter()
        .map(param_from_arg)
        .collect::<syn::Result<Vec<_>>>()?;

    for (ident, _) in &attrs.defaults {
        if !params.iter().any(|p| p.name == ident.unraw().to_string()) {
            return Err(syn::Error::new(
                ident.span(),
                format!("`{}` is not a parameter of `{}`", ident, sig.ident),
            ));
        }
    }

    let fn_ident = &sig.ident;
    let vis = &func.vis;
    let tool_fn = format_ident!("{}_tool", fn_ident.unraw());
    let fn_name = fn_ident.unraw().to_string();
    let doc = doc_string(&func);

    let decls = params.iter().map(|p| {
        let name = &p.name;
        let hint = &p.hint;
        let default = attrs
            .defaults
            .iter()
            .find(|(ident, _)| ident.unraw().to_string() == p.name)
            .map(|(_, value)| {
                let json = quote! { ::openai_agents_lite::__private::serde_json::json! };
                quote! { .with_default(#json(#value)) }
            });
        quote! {
            ::openai_agents_lite::ParamDecl::new(
                #name,
                ::openai_agents_lite::TypeHint::from_rust(#hint),
            ) #default
        }
    });

    let decodes = params.iter().map(|p| {
        let ident = &p.ident;
        let name = &p.name;
        let ty = &p.decode_ty;
        quote! {
            let #ident: #ty = match __tool_args.take(#name) {
                ::core::result::Result::Ok(value) => value,
                ::core::result::Result::Err(err) => return ::core::result::Result::Err(err),
            };
        }
    });

    let call_args = params.iter().map(|p| {
        let ident = &p.ident;
        match p.pass {
            Pass::Owned => quote! { #ident },
            Pass::Borrowed => quote! { &#ident },
            Pass::OptionDeref => quote! { #ident.as_deref() },
            Pass::OptionRef => quote! { #ident.as_ref() },
        }
    });

    let is_async = sig.asyncness.is_some();
    let call = if is_async {
        quote! { #fn_ident(#(#call_args),*).await }
    } else {
        quote! { #fn_ident(#(#call_args),*) }
    };

    let into_output = quote! { ::openai_agents_lite::IntoToolOutput::into_tool_output };
    let failed = quote! { ::openai_agents_lite::ToolError::failed };
    let finish = if returns_result(&sig.output) {
        quote! {
            match #call {
                ::core::result::Result::Ok(value) => {
                    ::core::result::Result::Ok(#into_output(value))
                }
                ::core::result::Result::Err(err) => ::core::result::Result::Err(#failed(err)),
            }
        }
    } else {
        quote! { ::core::result::Result::Ok(#into_output(#call)) }
    };

    let body = quote! {
        #(#decodes)*
        #finish
    };

    let args_ty = quote! { ::openai_agents_lite::ToolArguments };
    let constructor = if is_async {
        quote! {
            ::openai_agents_lite::ToolFn::new_async(#fn_name, |mut __tool_args: #args_ty| {
                async move {
                    let output: ::core::result::Result<
                        ::openai_agents_lite::ToolOutput,
                        ::openai_agents_lite::ToolError,
                    > = { #body };
                    output
                }
            })
        }
    } else {
        quote! {
            ::openai_agents_lite::ToolFn::new(#fn_name, |mut __tool_args: #args_ty| {
                #body
            })
        }
    };

    let mut overrides = quote! { ::openai_agents_lite::ToolOverrides::default() };
    if let Some(name) = &attrs.name {
        overrides = quote! { #overrides.name(#name) };
    }
    if let Some(description) = &attrs.description {
        overrides = quote! { #overrides.description(#description) };
    }

    let tool_doc = format!("Tool handle for [`{}`], registered on first use.", fn_name);

    Ok(quote! {
        #func

        #[doc = #tool_doc]
        #vis fn #tool_fn() -> ::openai_agents_lite::ToolHandle {
            static HANDLE: ::std::sync::OnceLock<::openai_agents_lite::ToolHandle> =
                ::std::sync::OnceLock::new();
            HANDLE
                .get_or_init(|| {
                    let decls: ::std::vec::Vec<::openai_agents_lite::ParamDecl> =
                        ::std::vec![#(#decls),*];
                    #[allow(unused_mut)]
                    let callable = #constructor.doc(#doc).params(decls);
                    // Signatures registration would refuse are rejected at compile time
                    ::openai_agents_lite::register_tool(&callable, #overrides)
                        .unwrap_or_else(|err| {
                            panic!("failed to register tool `{}`: {}", #fn_name, err)
                        })
                })
                .clone()
        }
    })
}

fn param_from_arg(arg: &FnArg) -> syn::Result<Param> {
    let typed = match arg {
        FnArg::Receiver(receiver) => {
            return Err(syn::Error::new(
                receiver.span(),
                "function_tool only supports free functions; \
                 `self` cannot be supplied by the model",
            ))
        }
        FnArg::Typed(typed) => typed,
    };

    let ident = match typed.pat.as_ref() {
        Pat::Ident(pat) if pat.by_ref.is_none() && pat.subpat.is_none() => pat.ident.clone(),
        other => {
            return Err(syn::Error::new(
                other.span(),
                "function_tool parameters must be plain identifiers",
            ))
        }
    };

    let ty = typed.ty.as_ref();
    let hint = quote!(#ty).to_string();
    let (decode_ty, pass) = if let Type::Reference(reference) = ty {
        reject_nested_reference(&reference.elem)?;
        (owned_type(&reference.elem), Pass::Borrowed)
    } else if let Some(reference) = optional_reference(ty) {
        reject_nested_reference(&reference.elem)?;
        let inner = owned_type(&reference.elem);
        let pass = if is_unsized(&reference.elem) {
            Pass::OptionDeref
        } else {
            Pass::OptionRef
        };
        (syn::parse_quote!(::core::option::Option<#inner>), pass)
    } else {
        reject_nested_reference(ty)?;
        (ty.clone(), Pass::Owned)
    };

    Ok(Param {
        name: ident.unraw().to_string(),
        ident,
        decode_ty,
        pass,
        hint,
    })
}

/// The `&T` in `Option<&T>`.
fn optional_reference(ty: &Type) -> Option<&TypeReference> {
    let Type::Path(path) = ty else {
        return None;
    };
    let segment = path.path.segments.last()?;
    if path.qself.is_some() || segment.ident != "Option" {
        return None;
    }
    let syn::PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    match args.args.first() {
        Some(syn::GenericArgument::Type(Type::Reference(reference))) if args.args.len() == 1 => {
            Some(reference)
        }
        _ => None,
    }
}

/// Arguments are decoded into owned values, so a borrow anywhere below the
/// top level (or below `Option`) has nothing to point at.
fn reject_nested_reference(ty: &Type) -> syn::Result<()> {
    match find_reference(ty) {
        Some(reference) => Err(syn::Error::new(
            reference.span(),
            "function_tool cannot decode borrowed data inside another type; \
             use an owned type such as `String` or `Vec<T>` here",
        )),
        None => Ok(()),
    }
}

fn find_reference(ty: &Type) -> Option<&TypeReference> {
    match ty {
        Type::Reference(reference) => Some(reference),
        Type::Path(path) => path.path.segments.iter().find_map(|segment| {
            let syn::PathArguments::AngleBracketed(args) = &segment.arguments else {
                return None;
            };
            args.args.iter().find_map(|arg| match arg {
                syn::GenericArgument::Type(inner) => find_reference(inner),
                _ => None,
            })
        }),
        Type::Slice(slice) => find_reference(&slice.elem),
        Type::Array(array) => find_reference(&array.elem),
        Type::Tuple(tuple) => tuple.elems.iter().find_map(find_reference),
        Type::Paren(paren) => find_reference(&paren.elem),
        Type::Group(group) => find_reference(&group.elem),
        _ => None,
    }
}

fn is_unsized(elem: &Type) -> bool {
    match elem {
        Type::Path(path) => path.qself.is_none() && path.path.is_ident("str"),
        Type::Slice(_) => true,
        _ => false,
    }
}

/// `str` decodes as `String`, `[T]` as `Vec<T>`, anything else as itself.
fn owned_type(elem: &Type) -> Type {
    match elem {
        Type::Path(path) if path.qself.is_none() && path.path.is_ident("str") => {
            syn::parse_quote!(::std::string::String)
        }
        Type::Slice(slice) => {
            let item = &slice.elem;
            syn::parse_quote!(::std::vec::Vec<#item>)
        }
        other => other.clone(),
    }
}

fn returns_result(output: &ReturnType) -> bool {
    match output {
        ReturnType::Type(_, ty) => match ty.as_ref() {
            Type::Path(path) => path
                .path
                .segments
                .last()
                .map(|segment| segment.ident == "Result")
                .unwrap_or(false),
            _ => false,
        },
        ReturnType::Default => false,
    }
}

fn doc_string(func: &ItemFn) -> String {
    let lines: Vec<String> = func
        .attrs
        .iter()
        .filter(|attr| attr.path().is_ident("doc"))
        .filter_map(|attr| match &attr.meta {
            Meta::NameValue(nv) => match &nv.value {
                Expr::Lit(ExprLit {
                    lit: Lit::Str(text),
                    ..
                }) => {
                    let line = text.value();
                    Some(line.strip_prefix(' ').map(str::to_string).unwrap_or(line))
                }
                _ => None,
            },
            _ => None,
        })
        .collect();
    lines.join("\n")
}
