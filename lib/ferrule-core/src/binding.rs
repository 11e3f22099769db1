//! Parameter roles.

use derive_more::Display;

use crate::ParamMarker;

/// Contribution a parameter makes to the call plan.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display)]
pub enum Role {
    /// Replaces the whole request path.
    #[display("url")]
    Url,
    /// One query entry.
    #[display("query({_0})")]
    Query(String),
    /// Every entry of a map, as query entries.
    #[display("query_map")]
    QueryMap,
    /// One form field.
    #[display("field({_0})")]
    Field(String),
    /// Every entry of a map, as form fields.
    #[display("field_map")]
    FieldMap,
    /// Substitutes `{name}` in the path.
    #[display("path({_0})")]
    Path(String),
    /// One multipart part.
    #[display("part({_0})")]
    Part(String),
    /// Every entry of a map, as multipart parts.
    #[display("part_map")]
    PartMap,
    /// One header, replacing any earlier header of the same name.
    #[display("header({_0})")]
    Header(String),
    /// The request body.
    #[display("body")]
    Body,
}

impl Role {
    /// Whether the role reads the parameter as a key/value map.
    #[must_use]
    pub const fn is_map(&self) -> bool {
        matches!(self, Self::QueryMap | Self::FieldMap | Self::PartMap)
    }
}

/// A parameter as declared: identifier plus its markers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterDeclaration {
    /// Parameter identifier.
    pub name: String,
    /// Markers in attribute order.
    pub markers: Vec<ParamMarker>,
}

impl ParameterDeclaration {
    /// Create a declaration.
    #[must_use]
    pub fn new(name: impl Into<String>, markers: Vec<ParamMarker>) -> Self {
        Self {
            name: name.into(),
            markers,
        }
    }
}

/// Roles of one parameter, in the order their contributions apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterBinding {
    /// Parameter identifier.
    pub parameter: String,
    /// Position in the method signature, receiver excluded.
    pub index: usize,
    /// Roles in application order.
    pub roles: Vec<Role>,
}

impl ParameterBinding {
    /// Whether the parameter carries `role`.
    #[must_use]
    pub fn has(&self, role: &Role) -> bool {
        self.roles.contains(role)
    }

    /// Whether the parameter carries the body role.
    #[must_use]
    pub fn is_body(&self) -> bool {
        self.has(&Role::Body)
    }
}

/// Classify every parameter that has at least one recognized marker.
///
/// Each marker kind is looked up once per parameter, the first occurrence
/// winning. All kinds present contribute, in the order url, query,
/// query map, field, field map, path, part, part map, header, body.
#[must_use]
pub fn bind_parameters(params: &[ParameterDeclaration]) -> Vec<ParameterBinding> {
    params
        .iter()
        .enumerate()
        .filter_map(|(index, param)| {
            let roles = roles_of(param);
            (!roles.is_empty()).then(|| ParameterBinding {
                parameter: param.name.clone(),
                index,
                roles,
            })
        })
        .collect()
}

fn roles_of(param: &ParameterDeclaration) -> Vec<Role> {
    let markers = param.markers.as_slice();
    let fallback = param.name.as_str();
    let present = |marker: &ParamMarker| markers.contains(marker);

    let mut roles = Vec::new();
    if present(&ParamMarker::Url) {
        roles.push(Role::Url);
    }
    if let Some(name) = first_named(markers, fallback, |m| match m {
        ParamMarker::Query(n) => Some(n),
        _ => None,
    }) {
        roles.push(Role::Query(name));
    }
    if present(&ParamMarker::QueryMap) {
        roles.push(Role::QueryMap);
    }
    if let Some(name) = first_named(markers, fallback, |m| match m {
        ParamMarker::Field(n) => Some(n),
        _ => None,
    }) {
        roles.push(Role::Field(name));
    }
    if present(&ParamMarker::FieldMap) {
        roles.push(Role::FieldMap);
    }
    if let Some(name) = first_named(markers, fallback, |m| match m {
        ParamMarker::Path(n) => Some(n),
        _ => None,
    }) {
        roles.push(Role::Path(name));
    }
    if let Some(name) = first_named(markers, fallback, |m| match m {
        ParamMarker::Part(n) => Some(n),
        _ => None,
    }) {
        roles.push(Role::Part(name));
    }
    if present(&ParamMarker::PartMap) {
        roles.push(Role::PartMap);
    }
    if let Some(name) = first_named(markers, fallback, |m| match m {
        ParamMarker::Header(n) => Some(n),
        _ => None,
    }) {
        roles.push(Role::Header(name));
    }
    if present(&ParamMarker::Body) {
        roles.push(Role::Body);
    }
    roles
}

fn first_named(
    markers: &[ParamMarker],
    fallback: &str,
    pick: impl Fn(&ParamMarker) -> Option<&Option<String>>,
) -> Option<String> {
    let name = markers.iter().find_map(pick)?;
    Some(match name.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => fallback.to_string(),
    })
}
