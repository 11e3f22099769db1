//! Token generation for clients, method bodies and registrations.

use ferrule_core::{Encoding, EndpointDeclaration, MethodSchema, Role, Verb};
use proc_macro2::{Span, TokenStream};
use quote::{format_ident, quote, quote_spanned};
use syn::{Ident, Visibility};

use crate::expand::EndpointMethod;
use crate::types;

/// Client struct wrapping a `Ferrule`.
pub fn generate_client_struct(
    vis: &Visibility,
    trait_name: &Ident,
    client_name: &Ident,
) -> TokenStream {
    let doc = format!("Generated HTTP client implementing [`{trait_name}`].");

    quote! {
        #[doc = #doc]
        #[derive(Clone, Debug)]
        #vis struct #client_name {
            ferrule: ::ferrule::Ferrule,
        }

        impl #client_name {
            /// Create a client sending every call through `ferrule`.
            #[must_use]
            #vis fn new(ferrule: ::ferrule::Ferrule) -> Self {
                Self { ferrule }
            }

            /// Configuration this client was created with.
            #[must_use]
            #vis fn ferrule(&self) -> &::ferrule::Ferrule {
                &self.ferrule
            }
        }
    }
}

/// `EndpointDeclaration` literal for a resolved endpoint.
pub fn generate_endpoint(endpoint: &EndpointDeclaration) -> TokenStream {
    let verb = match &endpoint.verb {
        Verb::Get => quote!(::ferrule::Verb::Get),
        Verb::Post => quote!(::ferrule::Verb::Post),
        Verb::Put => quote!(::ferrule::Verb::Put),
        Verb::Delete => quote!(::ferrule::Verb::Delete),
        Verb::Patch => quote!(::ferrule::Verb::Patch),
        Verb::Head => quote!(::ferrule::Verb::Head),
        Verb::Options => quote!(::ferrule::Verb::Options),
        Verb::Custom(name) => {
            let name = name.as_ref();
            quote!(::ferrule::Verb::Custom(::std::borrow::Cow::Borrowed(#name)))
        }
    };
    let encoding = match endpoint.encoding {
        Encoding::None => quote!(::ferrule::Encoding::None),
        Encoding::FormUrlEncoded => quote!(::ferrule::Encoding::FormUrlEncoded),
        Encoding::Multipart => quote!(::ferrule::Encoding::Multipart),
        Encoding::FormAndMultipart => quote!(::ferrule::Encoding::FormAndMultipart),
    };
    let path = endpoint.path_template.as_ref();
    let body_permitted = endpoint.body_permitted;
    let streaming = endpoint.streaming;
    let headers = endpoint.static_headers.iter().map(|(key, value)| {
        let (key, value) = (key.as_ref(), value.as_ref());
        quote!((::std::borrow::Cow::Borrowed(#key), ::std::borrow::Cow::Borrowed(#value)))
    });

    quote! {
        ::ferrule::EndpointDeclaration {
            verb: #verb,
            path_template: ::std::borrow::Cow::Borrowed(#path),
            body_permitted: #body_permitted,
            encoding: #encoding,
            streaming: #streaming,
            static_headers: ::std::vec![#(#headers),*],
        }
    }
}

/// Plan-building statement for one role of one parameter.
fn generate_role(role: &Role, ident: &Ident, ty: &syn::Type) -> TokenStream {
    let optional = types::is_option(ty);
    let single = |method: TokenStream, name: Option<&str>| {
        let name = name.map(|name| quote!(#name,));
        if optional {
            quote! {
                if let ::core::option::Option::Some(__value) = &#ident {
                    __plan.#method(#name __value);
                }
            }
        } else {
            quote!(__plan.#method(#name &#ident);)
        }
    };
    let map = |method: TokenStream, skip_none: bool| {
        let insert = if skip_none && types::map_values_are_optional(ty) {
            quote! {
                if let ::core::option::Option::Some(__value) = __value {
                    __plan.#method(&__key.to_string(), __value);
                }
            }
        } else {
            quote!(__plan.#method(&__key.to_string(), __value);)
        };
        let each = quote! {
            for (__key, __value) in __map.iter() {
                #insert
            }
        };
        if optional {
            quote! {
                if let ::core::option::Option::Some(__map) = &#ident {
                    #each
                }
            }
        } else {
            quote! {{
                let __map = &#ident;
                #each
            }}
        }
    };

    match role {
        Role::Url => single(quote!(url), None),
        Role::Query(name) => single(quote!(query), Some(name)),
        Role::Field(name) => single(quote!(field), Some(name)),
        Role::Header(name) => single(quote!(header), Some(name)),
        Role::Path(name) if optional => quote! {
            match &#ident {
                ::core::option::Option::Some(__value) => {
                    __plan.path(#name, __value);
                }
                ::core::option::Option::None => {
                    __plan.path(#name, "null");
                }
            }
        },
        Role::Path(name) => quote!(__plan.path(#name, &#ident);),
        Role::Part(name) => quote!(__plan.part(#name, &#ident);),
        Role::QueryMap => map(quote!(query), true),
        Role::FieldMap => map(quote!(field), true),
        Role::PartMap => map(quote!(part), false),
        // Serialized last, see `generate_method_body`.
        Role::Body => TokenStream::new(),
    }
}

/// Body of one generated endpoint method.
pub fn generate_method_body(method: &EndpointMethod, schema: &MethodSchema) -> TokenStream {
    let mut statements = Vec::new();
    let mut untouched = Vec::new();
    let mut bound = vec![false; method.params.len()];

    for binding in &schema.bindings {
        let Some(param) = method.params.get(binding.index) else {
            continue;
        };
        for role in &binding.roles {
            if matches!(role, Role::Body) {
                continue;
            }
            statements.push(generate_role(role, &param.ident, &param.ty));
            if let Some(flag) = bound.get_mut(binding.index) {
                *flag = true;
            }
        }
    }

    let body = schema
        .body_parameter
        .filter(|_| schema.sends_body())
        .and_then(|index| method.params.get(index).map(|param| (index, param)))
        .map(|(index, param)| {
            if let Some(flag) = bound.get_mut(index) {
                *flag = true;
            }
            let ident = &param.ident;
            if types::is_option(&param.ty) {
                quote! {
                    if let ::core::option::Option::Some(__body) = &#ident {
                        __plan.body(__body)?;
                    }
                }
            } else {
                quote!(__plan.body(&#ident)?;)
            }
        });

    for (param, bound) in method.params.iter().zip(&bound) {
        if !bound {
            let ident = &param.ident;
            untouched.push(quote!(let _ = &#ident;));
        }
    }

    let endpoint = generate_endpoint(&schema.endpoint);
    let operation = schema.name.as_str();
    let ok_type = &method.ok_type;
    let return_type = &method.return_type;
    let decode = if schema.endpoint.streaming {
        quote!(::core::result::Result::Ok(::core::convert::Into::into(__reply.into_bytes()?)))
    } else {
        quote!(::core::result::Result::Ok(__reply.decode::<#ok_type>()?))
    };

    quote! {
        ::std::boxed::Box::pin(async move {
            let __ret: #return_type = {
                #(#untouched)*
                let __endpoint = #endpoint;
                #[allow(unused_mut)]
                let mut __plan = ::ferrule::CallPlanBuilder::new(&__endpoint);
                #(#statements)*
                #body
                let __plan = __plan.finish(#operation, ::ferrule::ResponseShape::of::<#ok_type>());
                let __reply = self.ferrule.dispatch(__plan).await?;
                #decode
            };
            __ret
        })
    }
}

/// Link-time registration of a `dyn Trait` factory.
pub fn generate_registration(trait_name: &Ident, client_name: &Ident) -> TokenStream {
    let factory = format_ident!("__ferrule_create_{}", trait_name);
    let name = trait_name.to_string();

    quote! {
        #[doc(hidden)]
        #[allow(non_snake_case)]
        fn #factory(
            ferrule: ::ferrule::Ferrule,
        ) -> ::std::boxed::Box<dyn ::std::any::Any + ::core::marker::Send> {
            let client: ::std::boxed::Box<dyn #trait_name> =
                ::std::boxed::Box::new(#client_name::new(ferrule));
            ::std::boxed::Box::new(client)
        }

        ::ferrule::inventory::submit! {
            ::ferrule::Registration {
                interface: ::ferrule::type_id_of::<dyn #trait_name>,
                name: ::core::concat!(::core::module_path!(), "::", #name),
                factory: #factory,
            }
        }
    }
}

/// A compiler warning carrying `message`, pointing at `span`.
pub fn generate_warning(span: Span, message: &str) -> TokenStream {
    quote_spanned! {span=>
        const _: () = {
            #[deprecated(note = #message)]
            #[allow(non_upper_case_globals)]
            const ferrule_warning: () = ();
            ferrule_warning
        };
    }
}

#[cfg(test)]
mod tests {
    use std::borrow::Cow;

    use insta::assert_snapshot;
    use syn::parse_quote;

    use super::*;

    #[test]
    fn endpoint_literal() {
        let endpoint = EndpointDeclaration {
            verb: Verb::Custom(Cow::Borrowed("PROPFIND")),
            path_template: Cow::Borrowed("/dav/{id}"),
            static_headers: vec![(Cow::Borrowed("Depth"), Cow::Borrowed("1"))],
            ..EndpointDeclaration::default()
        };
        assert_snapshot!(generate_endpoint(&endpoint).to_string(), @r#":: ferrule :: EndpointDeclaration { verb : :: ferrule :: Verb :: Custom (:: std :: borrow :: Cow :: Borrowed ("PROPFIND")) , path_template : :: std :: borrow :: Cow :: Borrowed ("/dav/{id}") , body_permitted : false , encoding : :: ferrule :: Encoding :: None , streaming : false , static_headers : :: std :: vec ! [(:: std :: borrow :: Cow :: Borrowed ("Depth") , :: std :: borrow :: Cow :: Borrowed ("1"))] , }"#);
    }

    #[test]
    fn optional_query_is_guarded() {
        let ident: Ident = parse_quote!(page);
        let ty: syn::Type = parse_quote!(Option<u32>);
        let tokens = generate_role(&Role::Query("page".into()), &ident, &ty);
        assert_snapshot!(tokens.to_string(), @r#"if let :: core :: option :: Option :: Some (__value) = & page { __plan . query ("page" , __value) ; }"#);
    }

    #[test]
    fn required_path_is_direct() {
        let ident: Ident = parse_quote!(id);
        let ty: syn::Type = parse_quote!(u64);
        let tokens = generate_role(&Role::Path("id".into()), &ident, &ty);
        assert_snapshot!(tokens.to_string(), @r#"__plan . path ("id" , & id) ;"#);
    }

    #[test]
    fn part_map_keeps_none_values() {
        let ident: Ident = parse_quote!(parts);
        let ty: syn::Type = parse_quote!(&BTreeMap<String, Option<String>>);
        let tokens = generate_role(&Role::PartMap, &ident, &ty).to_string();
        assert!(!tokens.contains("Some (__value) = __value"));
        assert!(tokens.contains("__plan . part (& __key . to_string () , __value)"));
    }

    #[test]
    fn query_map_skips_none_values() {
        let ident: Ident = parse_quote!(filters);
        let ty: syn::Type = parse_quote!(HashMap<String, Option<u32>>);
        let tokens = generate_role(&Role::QueryMap, &ident, &ty).to_string();
        assert!(tokens.contains("Some (__value) = __value"));
    }

    #[test]
    fn warning_uses_deprecation() {
        let tokens = generate_warning(Span::call_site(), "heads up").to_string();
        assert!(tokens.contains("deprecated (note = \"heads up\")"));
    }
}
