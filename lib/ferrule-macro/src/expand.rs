//! `#[ferrule]` expansion: syntax to declarations, analysis, then codegen.

use ferrule_core::{
    Diagnostic, InterfaceDeclaration, MethodDeclaration, ParamMarker, ParameterDeclaration,
    analyze_interface,
};
use proc_macro2::{Span, TokenStream};
use quote::{format_ident, quote};
use syn::visit_mut::VisitMut;
use syn::{FnArg, Ident, ItemTrait, Pat, ReturnType, Signature, TraitItem, TraitItemFn, parse_quote};

use crate::attrs::{is_method_attr, is_param_attr, parse_method_marker, parse_param_marker};
use crate::codegen::{
    generate_client_struct, generate_method_body, generate_registration, generate_warning,
};
use crate::types::{self, BindElided};

/// Arguments of `#[ferrule(...)]`.
struct FerruleArgs {
    register: bool,
}

impl Default for FerruleArgs {
    fn default() -> Self {
        Self { register: true }
    }
}

fn parse_ferrule_args(attr: TokenStream) -> syn::Result<FerruleArgs> {
    let mut args = FerruleArgs::default();

    let parser = syn::meta::parser(|meta| {
        if meta.path.is_ident("register") {
            let value: syn::LitBool = meta.value()?.parse()?;
            args.register = value.value;
            Ok(())
        } else {
            Err(meta.error("unsupported ferrule attribute, expected `register = <bool>`"))
        }
    });
    syn::parse::Parser::parse2(parser, attr)?;

    Ok(args)
}

/// A parameter of an endpoint method.
pub struct EndpointParam {
    pub ident: Ident,
    pub ty: syn::Type,
    pub markers: Vec<ParamMarker>,
}

/// A trait method with its declaration pieces extracted.
pub struct EndpointMethod {
    pub item: TraitItemFn,
    pub params: Vec<EndpointParam>,
    pub return_type: syn::Type,
    pub ok_type: syn::Type,
    pub declaration: MethodDeclaration,
}

/// Collects compile errors so they are all reported together.
#[derive(Default)]
struct Errors(Option<syn::Error>);

impl Errors {
    fn push(&mut self, error: syn::Error) {
        match &mut self.0 {
            Some(existing) => existing.combine(error),
            None => self.0 = Some(error),
        }
    }

    fn spanned(&mut self, tokens: impl quote::ToTokens, message: impl std::fmt::Display) {
        self.push(syn::Error::new_spanned(tokens, message));
    }

    fn into_tokens(self) -> TokenStream {
        self.0.map(|error| error.to_compile_error()).unwrap_or_default()
    }

    fn is_empty(&self) -> bool {
        self.0.is_none()
    }
}

/// Expand `#[ferrule]` on an item.
pub fn expand_ferrule_trait(attr: TokenStream, item: TokenStream) -> syn::Result<TokenStream> {
    let args = parse_ferrule_args(attr)?;
    let item: syn::Item = syn::parse2(item)?;

    let trait_def = match item {
        syn::Item::Trait(trait_def) => trait_def,
        other => return Ok(not_an_interface(&other, item_name(&other))),
    };

    let trait_name = &trait_def.ident;
    let is_contract = trait_def
        .items
        .iter()
        .all(|item| matches!(item, TraitItem::Fn(method) if method.default.is_none()));
    if !is_contract {
        return Ok(not_an_interface(&trait_def, trait_name.to_string()));
    }

    let mut errors = Errors::default();
    if !trait_def.generics.params.is_empty() {
        errors.spanned(&trait_def.generics, "generic traits are not supported");
    }

    let methods = extract_methods(&trait_def, &mut errors)?;
    let declaration = InterfaceDeclaration {
        name: trait_name.to_string(),
        is_contract,
        methods: methods.iter().map(|m| m.declaration.clone()).collect(),
    };
    let schema = analyze_interface(&declaration)
        .map_err(|diagnostic| syn::Error::new_spanned(trait_name, diagnostic.to_string()))?;

    let mut warnings = Vec::new();
    for diagnostic in &schema.diagnostics {
        let span = diagnostic_span(diagnostic, &methods, trait_name);
        if diagnostic.is_fatal() {
            errors.push(syn::Error::new(span, diagnostic.to_string()));
        } else {
            warnings.push(generate_warning(span, &diagnostic.to_string()));
        }
    }

    if !errors.is_empty() {
        let clean_trait = generate_fallback_trait(&trait_def, &methods);
        let errors = errors.into_tokens();
        return Ok(quote! {
            #clean_trait
            #errors
            #(#warnings)*
        });
    }

    let client_name = format_ident!("{}Client", trait_name);
    let vis = &trait_def.vis;
    let clean_trait = generate_dyn_trait(&trait_def, &methods);
    let client_struct = generate_client_struct(vis, trait_name, &client_name);

    let impl_methods = methods.iter().filter_map(|method| {
        let schema = schema
            .methods
            .iter()
            .find(|schema| schema.name == method.declaration.name)?;
        let sig = rewrite_signature(&method.item.sig);
        let body = generate_method_body(method, schema);
        Some(quote!(#sig { #body }))
    });

    let registration = args
        .register
        .then(|| generate_registration(trait_name, &client_name));

    Ok(quote! {
        #clean_trait
        #client_struct

        impl #trait_name for #client_name {
            #(#impl_methods)*
        }

        #registration
        #(#warnings)*
    })
}

/// Original item plus the "not an interface" error.
fn not_an_interface(item: &impl quote::ToTokens, name: String) -> TokenStream {
    let declaration = InterfaceDeclaration {
        name,
        is_contract: false,
        methods: Vec::new(),
    };
    let message = analyze_interface(&declaration)
        .err()
        .map(|diagnostic| diagnostic.to_string())
        .unwrap_or_default();
    let error = syn::Error::new_spanned(item, message).to_compile_error();
    quote! {
        #item
        #error
    }
}

fn item_name(item: &syn::Item) -> String {
    let ident = match item {
        syn::Item::Struct(item) => Some(&item.ident),
        syn::Item::Enum(item) => Some(&item.ident),
        syn::Item::Union(item) => Some(&item.ident),
        syn::Item::Fn(item) => Some(&item.sig.ident),
        syn::Item::Mod(item) => Some(&item.ident),
        syn::Item::Type(item) => Some(&item.ident),
        syn::Item::TraitAlias(item) => Some(&item.ident),
        _ => None,
    };
    ident.map_or_else(|| "item".to_string(), ToString::to_string)
}

fn diagnostic_span(
    diagnostic: &Diagnostic,
    methods: &[EndpointMethod],
    trait_name: &Ident,
) -> Span {
    methods
        .iter()
        .find(|method| method.declaration.name == diagnostic.target)
        .map_or_else(|| trait_name.span(), |method| method.item.sig.ident.span())
}

fn extract_methods(trait_def: &ItemTrait, errors: &mut Errors) -> syn::Result<Vec<EndpointMethod>> {
    let mut methods = Vec::new();
    for item in &trait_def.items {
        if let TraitItem::Fn(method) = item {
            methods.push(extract_method(method, errors)?);
        }
    }
    Ok(methods)
}

fn extract_method(method: &TraitItemFn, errors: &mut Errors) -> syn::Result<EndpointMethod> {
    let sig = &method.sig;

    let mut markers = Vec::new();
    for attr in &method.attrs {
        if let Some(marker) = parse_method_marker(attr)? {
            markers.push(marker);
        }
    }

    for param in &sig.generics.params {
        if !matches!(param, syn::GenericParam::Lifetime(_)) {
            errors.spanned(param, "endpoint methods cannot have type or const parameters");
        }
    }

    match sig.inputs.first() {
        Some(FnArg::Receiver(receiver))
            if receiver.colon_token.is_none()
                && receiver.mutability.is_none()
                && matches!(receiver.reference, Some((_, None))) => {}
        Some(FnArg::Receiver(receiver)) => {
            errors.spanned(receiver, "endpoint methods take `&self`");
        }
        _ => errors.spanned(&sig.ident, "endpoint methods take `&self`"),
    }

    let mut params = Vec::new();
    for input in &sig.inputs {
        let FnArg::Typed(typed) = input else {
            continue;
        };
        let ident = match typed.pat.as_ref() {
            Pat::Ident(pat) if pat.subpat.is_none() => pat.ident.clone(),
            other => {
                errors.spanned(other, "endpoint parameters must be plain identifiers");
                format_ident!("__ferrule_arg{}", params.len())
            }
        };
        if types::is_impl_trait(&typed.ty) {
            errors.spanned(&typed.ty, "`impl Trait` parameters are not supported");
        }
        let mut param_markers = Vec::new();
        for attr in &typed.attrs {
            if let Some(marker) = parse_param_marker(attr)? {
                param_markers.push(marker);
            }
        }
        params.push(EndpointParam {
            ident,
            ty: (*typed.ty).clone(),
            markers: param_markers,
        });
    }

    let (return_type, ok_type) = match &sig.output {
        ReturnType::Default => (parse_quote!(()), parse_quote!(())),
        ReturnType::Type(_, ty) => {
            let ok_type = types::result_ok_type(ty).cloned().unwrap_or_else(|| {
                errors.spanned(ty, "endpoint methods must return `Result<T>`");
                parse_quote!(())
            });
            ((**ty).clone(), ok_type)
        }
    };

    let declaration = MethodDeclaration {
        name: sig.ident.to_string(),
        markers,
        parameters: params
            .iter()
            .map(|param| ParameterDeclaration::new(param.ident.to_string(), param.markers.clone()))
            .collect(),
        has_return_type: !matches!(sig.output, ReturnType::Default),
        is_async: sig.asyncness.is_some(),
    };

    Ok(EndpointMethod {
        item: method.clone(),
        params,
        return_type,
        ok_type,
        declaration,
    })
}

/// Method attributes that survive expansion.
fn kept_attrs(attrs: &[syn::Attribute]) -> impl Iterator<Item = &syn::Attribute> {
    attrs.iter().filter(|attr| !is_method_attr(attr))
}

fn strip_param_attrs(sig: &Signature) -> Signature {
    let mut sig = sig.clone();
    for input in &mut sig.inputs {
        if let FnArg::Typed(typed) = input {
            typed.attrs.retain(|attr| !is_param_attr(attr));
        }
    }
    sig
}

/// `async fn m(&self, ..) -> R` to `fn m<'ferrule>(&'ferrule self, ..) -> BoxFuture<'ferrule, R>`.
fn rewrite_signature(sig: &Signature) -> Signature {
    let mut sig = strip_param_attrs(sig);
    let lifetime = types::lifetime();

    sig.asyncness = None;
    let declared: Vec<_> = sig.generics.lifetimes().map(|param| param.lifetime.clone()).collect();
    sig.generics.params.insert(0, parse_quote!(#lifetime));
    if !declared.is_empty() {
        let where_clause = sig.generics.make_where_clause();
        for declared in declared {
            where_clause.predicates.push(parse_quote!(#declared: #lifetime));
        }
    }

    for input in &mut sig.inputs {
        match input {
            FnArg::Receiver(receiver) => {
                receiver.reference = Some((Default::default(), Some(lifetime.clone())));
                receiver.ty = parse_quote!(&#lifetime Self);
            }
            FnArg::Typed(typed) => BindElided.visit_type_mut(&mut typed.ty),
        }
    }

    let output: syn::Type = match &sig.output {
        ReturnType::Default => parse_quote!(()),
        ReturnType::Type(_, ty) => (**ty).clone(),
    };
    sig.output = parse_quote!(-> ::ferrule::BoxFuture<#lifetime, #output>);
    sig
}

/// The dyn-compatible trait generated for a valid declaration.
fn generate_dyn_trait(trait_def: &ItemTrait, methods: &[EndpointMethod]) -> TokenStream {
    let ItemTrait {
        attrs,
        vis,
        unsafety,
        ident,
        supertraits,
        ..
    } = trait_def;
    let supertraits = supertraits.iter();

    let methods = methods.iter().map(|method| {
        let attrs = kept_attrs(&method.item.attrs);
        let sig = rewrite_signature(&method.item.sig);
        quote! {
            #(#attrs)*
            #sig;
        }
    });

    quote! {
        #(#attrs)*
        #vis #unsafety trait #ident:
            #(#supertraits +)* ::core::marker::Send + ::core::marker::Sync
        {
            #(#methods)*
        }
    }
}

/// The declared trait with markers stripped, emitted next to compile errors.
fn generate_fallback_trait(trait_def: &ItemTrait, methods: &[EndpointMethod]) -> TokenStream {
    let mut trait_def = trait_def.clone();
    trait_def.items = methods
        .iter()
        .map(|method| {
            let mut item = method.item.clone();
            item.attrs.retain(|attr| !is_method_attr(attr));
            item.sig = strip_param_attrs(&item.sig);
            TraitItem::Fn(item)
        })
        .collect();

    quote! {
        #[allow(async_fn_in_trait)]
        #trait_def
    }
}
