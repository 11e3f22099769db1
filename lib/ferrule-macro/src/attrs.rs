//! Attribute parsing: `syn` attributes to declaration markers.

use ferrule_core::{FORM_URL_ENCODED_ALIASES, MethodMarker, ParamMarker};
use syn::punctuated::Punctuated;
use syn::{LitBool, LitStr, Token};

/// Whether `attr` belongs to the method marker vocabulary.
pub(crate) fn is_method_attr(attr: &syn::Attribute) -> bool {
    attr.path()
        .get_ident()
        .is_some_and(|ident| ferrule_core::is_method_attribute(&ident.to_string()))
}

/// Whether `attr` belongs to the parameter marker vocabulary.
pub(crate) fn is_param_attr(attr: &syn::Attribute) -> bool {
    attr.path()
        .get_ident()
        .is_some_and(|ident| ferrule_core::is_param_attribute(&ident.to_string()))
}

/// Parse a method attribute; `None` for attributes outside the vocabulary.
pub(crate) fn parse_method_marker(attr: &syn::Attribute) -> syn::Result<Option<MethodMarker>> {
    let Some(ident) = attr.path().get_ident() else {
        return Ok(None);
    };
    let name = ident.to_string();

    let marker = match name.as_str() {
        "get" => MethodMarker::Get(parse_path_arg(attr)?),
        "post" => MethodMarker::Post(parse_path_arg(attr)?),
        "put" => MethodMarker::Put(parse_path_arg(attr)?),
        "delete" => MethodMarker::Delete(parse_path_arg(attr)?),
        "patch" => MethodMarker::Patch(parse_path_arg(attr)?),
        "head" => MethodMarker::Head(parse_path_arg(attr)?),
        "options" => MethodMarker::Options(parse_path_arg(attr)?),
        "http" => parse_http_attr(attr)?,
        "multipart" => {
            attr.meta.require_path_only()?;
            MethodMarker::Multipart
        }
        "streaming" => {
            attr.meta.require_path_only()?;
            MethodMarker::Streaming
        }
        "headers" => {
            let list = attr.meta.require_list()?;
            let entries = list.parse_args_with(Punctuated::<LitStr, Token![,]>::parse_terminated)?;
            MethodMarker::Headers(entries.iter().map(LitStr::value).collect())
        }
        other if FORM_URL_ENCODED_ALIASES.contains(&other) => {
            attr.meta.require_path_only()?;
            MethodMarker::FormUrlEncoded
        }
        _ => return Ok(None),
    };
    Ok(Some(marker))
}

/// `#[get]` or `#[get("/path")]`.
fn parse_path_arg(attr: &syn::Attribute) -> syn::Result<String> {
    match &attr.meta {
        syn::Meta::Path(_) => Ok(String::new()),
        syn::Meta::List(list) => Ok(syn::parse2::<LitStr>(list.tokens.clone())?.value()),
        syn::Meta::NameValue(_) => Err(syn::Error::new_spanned(
            attr,
            "expected a path string, e.g. `#[get(\"/users/{id}\")]`",
        )),
    }
}

/// `#[http("VERB /path")]` or `#[http(method = "VERB", path = "/path", has_body = true)]`.
fn parse_http_attr(attr: &syn::Attribute) -> syn::Result<MethodMarker> {
    let list = attr.meta.require_list()?;

    if let Ok(shorthand) = syn::parse2::<LitStr>(list.tokens.clone()) {
        let shorthand = shorthand.value();
        let (method, path) = shorthand.trim().split_once(' ').unwrap_or((shorthand.trim(), ""));
        return Ok(MethodMarker::Http {
            method: method.to_string(),
            path: path.trim().to_string(),
            has_body: false,
        });
    }

    let mut method = String::new();
    let mut path = String::new();
    let mut has_body = false;
    attr.parse_nested_meta(|meta| {
        if meta.path.is_ident("method") {
            method = meta.value()?.parse::<LitStr>()?.value();
        } else if meta.path.is_ident("path") {
            path = meta.value()?.parse::<LitStr>()?.value();
        } else if meta.path.is_ident("has_body") {
            has_body = if meta.input.peek(Token![=]) {
                meta.value()?.parse::<LitBool>()?.value
            } else {
                true
            };
        } else {
            return Err(meta.error("expected `method`, `path` or `has_body`"));
        }
        Ok(())
    })?;

    Ok(MethodMarker::Http {
        method,
        path,
        has_body,
    })
}

/// Parse a parameter attribute; `None` for attributes outside the vocabulary.
pub(crate) fn parse_param_marker(attr: &syn::Attribute) -> syn::Result<Option<ParamMarker>> {
    let Some(ident) = attr.path().get_ident() else {
        return Ok(None);
    };

    let marker = match ident.to_string().as_str() {
        "path" => ParamMarker::Path(parse_name_arg(attr)?),
        "query" => ParamMarker::Query(parse_name_arg(attr)?),
        "field" => ParamMarker::Field(parse_name_arg(attr)?),
        "part" => ParamMarker::Part(parse_name_arg(attr)?),
        "header" => ParamMarker::Header(parse_name_arg(attr)?),
        "query_map" => path_only(attr, ParamMarker::QueryMap)?,
        "field_map" => path_only(attr, ParamMarker::FieldMap)?,
        "part_map" => path_only(attr, ParamMarker::PartMap)?,
        "body" => path_only(attr, ParamMarker::Body)?,
        "url" => path_only(attr, ParamMarker::Url)?,
        _ => return Ok(None),
    };
    Ok(Some(marker))
}

fn path_only(attr: &syn::Attribute, marker: ParamMarker) -> syn::Result<ParamMarker> {
    attr.meta.require_path_only()?;
    Ok(marker)
}

/// `#[query]`, `#[query("name")]` or `#[query(name = "name")]`.
fn parse_name_arg(attr: &syn::Attribute) -> syn::Result<Option<String>> {
    match &attr.meta {
        syn::Meta::Path(_) => Ok(None),
        syn::Meta::List(list) => {
            if let Ok(name) = syn::parse2::<LitStr>(list.tokens.clone()) {
                return Ok(Some(name.value()));
            }
            let mut name = None;
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("name") {
                    name = Some(meta.value()?.parse::<LitStr>()?.value());
                    Ok(())
                } else {
                    Err(meta.error("expected a name string or `name = \"...\"`"))
                }
            })?;
            Ok(name)
        }
        syn::Meta::NameValue(_) => Err(syn::Error::new_spanned(
            attr,
            "expected `#[attr]` or `#[attr(\"name\")]`",
        )),
    }
}

#[cfg(test)]
mod tests {
    use syn::parse_quote;

    use super::*;

    fn method(attr: &syn::Attribute) -> Option<MethodMarker> {
        parse_method_marker(attr).expect("valid attribute")
    }

    fn param(attr: &syn::Attribute) -> Option<ParamMarker> {
        parse_param_marker(attr).expect("valid attribute")
    }

    #[test]
    fn verb_attributes() {
        assert_eq!(
            method(&parse_quote!(#[get("/users/{id}")])),
            Some(MethodMarker::Get("/users/{id}".into()))
        );
        assert_eq!(
            method(&parse_quote!(#[delete])),
            Some(MethodMarker::Delete(String::new()))
        );
        assert_eq!(method(&parse_quote!(#[doc = "x"])), None);
    }

    #[test]
    fn http_shorthand() {
        assert_eq!(
            method(&parse_quote!(#[http("PROPFIND /dav/{id}")])),
            Some(MethodMarker::Http {
                method: "PROPFIND".into(),
                path: "/dav/{id}".into(),
                has_body: false,
            })
        );
    }

    #[test]
    fn http_named_arguments() {
        assert_eq!(
            method(&parse_quote!(#[http(method = "POST", path = "/x", has_body = false)])),
            Some(MethodMarker::Http {
                method: "POST".into(),
                path: "/x".into(),
                has_body: false,
            })
        );
        assert_eq!(
            method(&parse_quote!(#[http(method = "REPORT", has_body)])),
            Some(MethodMarker::Http {
                method: "REPORT".into(),
                path: String::new(),
                has_body: true,
            })
        );
        assert!(parse_method_marker(&parse_quote!(#[http(verb = "GET")])).is_err());
    }

    #[test]
    fn encoding_aliases() {
        for attr in [
            parse_quote!(#[form_url_encoded]),
            parse_quote!(#[from_url_encoded]),
            parse_quote!(#[from_url_coded]),
        ] {
            assert_eq!(method(&attr), Some(MethodMarker::FormUrlEncoded));
        }
        assert_eq!(method(&parse_quote!(#[multipart])), Some(MethodMarker::Multipart));
        assert!(parse_method_marker(&parse_quote!(#[multipart("x")])).is_err());
    }

    #[test]
    fn headers_attribute() {
        assert_eq!(
            method(&parse_quote!(#[headers("Accept: application/json", "NoColonHere")])),
            Some(MethodMarker::Headers(vec![
                "Accept: application/json".into(),
                "NoColonHere".into()
            ]))
        );
    }

    #[test]
    fn param_attributes() {
        assert_eq!(param(&parse_quote!(#[path])), Some(ParamMarker::Path(None)));
        assert_eq!(
            param(&parse_quote!(#[query("page_size")])),
            Some(ParamMarker::Query(Some("page_size".into())))
        );
        assert_eq!(
            param(&parse_quote!(#[header(name = "Authorization")])),
            Some(ParamMarker::Header(Some("Authorization".into())))
        );
        assert_eq!(param(&parse_quote!(#[part_map])), Some(ParamMarker::PartMap));
        assert_eq!(param(&parse_quote!(#[url])), Some(ParamMarker::Url));
        assert_eq!(param(&parse_quote!(#[serde(skip)])), None);
        assert!(parse_param_marker(&parse_quote!(#[body("x")])).is_err());
    }

    #[test]
    fn vocabulary() {
        let attr: syn::Attribute = parse_quote!(#[from_url_coded]);
        assert!(is_method_attr(&attr));
        let attr: syn::Attribute = parse_quote!(#[field_map]);
        assert!(is_param_attr(&attr));
        let attr: syn::Attribute = parse_quote!(#[allow(unused)]);
        assert!(!is_method_attr(&attr) && !is_param_attr(&attr));
    }
}
