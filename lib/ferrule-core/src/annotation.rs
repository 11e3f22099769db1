//! The closed set of markers a declaration can carry.
//!
//! Markers are plain data: the macro turns attributes into these values, and
//! the resolver and binder only ever look at markers, never at syntax.

/// Attribute names accepted as the form-urlencoded marker.
///
/// The two misspelled forms are tolerated for compatibility with existing
/// declarations.
pub const FORM_URL_ENCODED_ALIASES: [&str; 3] =
    ["form_url_encoded", "from_url_encoded", "from_url_coded"];

/// Marker attached to an endpoint method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MethodMarker {
    /// `#[get("/path")]`
    Get(String),
    /// `#[post("/path")]`
    Post(String),
    /// `#[put("/path")]`
    Put(String),
    /// `#[delete("/path")]`
    Delete(String),
    /// `#[patch("/path")]`
    Patch(String),
    /// `#[head("/path")]`
    Head(String),
    /// `#[options("/path")]`
    Options(String),
    /// `#[http(method = "VERB", path = "/path", has_body = bool)]`
    Http {
        /// Verb name, any case.
        method: String,
        /// Path template.
        path: String,
        /// Whether the endpoint accepts a body.
        has_body: bool,
    },
    /// `#[form_url_encoded]` or one of its aliases.
    FormUrlEncoded,
    /// `#[multipart]`
    Multipart,
    /// `#[streaming]`: the reply is handed back as raw bytes.
    Streaming,
    /// `#[headers("Key: Value", ...)]`, entries kept verbatim.
    Headers(Vec<String>),
}

impl MethodMarker {
    /// Whether this marker selects a verb (specific or generic).
    #[must_use]
    pub const fn is_verb(&self) -> bool {
        matches!(
            self,
            Self::Get(_)
                | Self::Post(_)
                | Self::Put(_)
                | Self::Delete(_)
                | Self::Patch(_)
                | Self::Head(_)
                | Self::Options(_)
                | Self::Http { .. }
        )
    }
}

/// Marker attached to a method parameter.
///
/// Name-carrying markers hold `None` when the attribute has no argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamMarker {
    /// `#[path]` / `#[path("name")]`
    Path(Option<String>),
    /// `#[query]` / `#[query("name")]`
    Query(Option<String>),
    /// `#[query_map]`
    QueryMap,
    /// `#[field]` / `#[field("name")]`
    Field(Option<String>),
    /// `#[field_map]`
    FieldMap,
    /// `#[part]` / `#[part("name")]`
    Part(Option<String>),
    /// `#[part_map]`
    PartMap,
    /// `#[header]` / `#[header("Name")]`
    Header(Option<String>),
    /// `#[body]`
    Body,
    /// `#[url]`: replaces the whole request path.
    Url,
}

impl ParamMarker {
    /// Attribute name of the marker.
    #[must_use]
    pub const fn attribute_name(&self) -> &'static str {
        match self {
            Self::Path(_) => "path",
            Self::Query(_) => "query",
            Self::QueryMap => "query_map",
            Self::Field(_) => "field",
            Self::FieldMap => "field_map",
            Self::Part(_) => "part",
            Self::PartMap => "part_map",
            Self::Header(_) => "header",
            Self::Body => "body",
            Self::Url => "url",
        }
    }
}

/// Whether `name` is an attribute the declaration model understands on a method.
#[must_use]
pub fn is_method_attribute(name: &str) -> bool {
    matches!(
        name,
        "get"
            | "post"
            | "put"
            | "delete"
            | "patch"
            | "head"
            | "options"
            | "http"
            | "multipart"
            | "streaming"
            | "headers"
    ) || FORM_URL_ENCODED_ALIASES.contains(&name)
}

/// Whether `name` is an attribute the declaration model understands on a parameter.
#[must_use]
pub fn is_param_attribute(name: &str) -> bool {
    matches!(
        name,
        "path"
            | "query"
            | "query_map"
            | "field"
            | "field_map"
            | "part"
            | "part_map"
            | "header"
            | "body"
            | "url"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_attribute_names() {
        assert!(is_method_attribute("get"));
        assert!(is_method_attribute("http"));
        assert!(is_method_attribute("from_url_coded"));
        assert!(is_method_attribute("headers"));
        assert!(!is_method_attribute("query"));
        assert!(!is_method_attribute("doc"));
    }

    #[test]
    fn param_attribute_names() {
        for marker in [
            ParamMarker::Path(None),
            ParamMarker::QueryMap,
            ParamMarker::Part(Some("file".into())),
            ParamMarker::Url,
        ] {
            assert!(is_param_attribute(marker.attribute_name()));
        }
        assert!(!is_param_attribute("multipart"));
    }

    #[test]
    fn verb_markers() {
        assert!(MethodMarker::Get(String::new()).is_verb());
        assert!(
            MethodMarker::Http {
                method: "PROPFIND".into(),
                path: "/".into(),
                has_body: false
            }
            .is_verb()
        );
        assert!(!MethodMarker::Multipart.is_verb());
    }
}
