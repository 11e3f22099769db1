//! Call plans: the request descriptor assembled for one invocation.
//!
//! Generated clients drive a [`CallPlanBuilder`] directly with typed
//! arguments. [`assemble`] drives the same builder from a [`MethodSchema`]
//! and dynamically typed [`Value`]s.
//!
//! ```
//! use ferrule_core::{CallPlanBuilder, EndpointDeclaration, ResponseShape};
//!
//! let endpoint = EndpointDeclaration {
//!     path_template: "/users/{id}".into(),
//!     ..EndpointDeclaration::default()
//! };
//! let mut plan = CallPlanBuilder::new(&endpoint);
//! plan.path("id", 42).query("expand", "teams");
//! let plan = plan.finish("get_user", ResponseShape::of::<()>());
//!
//! assert_eq!(plan.path, "/users/42");
//! assert_eq!(plan.query["expand"], "teams");
//! ```

use std::collections::BTreeMap;
use std::fmt::Display;

use crate::{
    Encoding, EndpointDeclaration, Error, MethodSchema, PartValue, ResponseShape, Result, Role,
    ToPartValue, Value, Verb,
};

/// Request descriptor for one invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct CallPlan {
    /// Method name of the operation.
    pub operation: String,
    /// HTTP verb.
    pub verb: Verb,
    /// Path template before substitution.
    pub path_template: String,
    /// Resolved path, or an absolute URL from a `#[url]` parameter.
    pub path: String,
    /// Headers: static ones first, then per-call overrides.
    pub headers: Vec<(String, String)>,
    /// Query entries; the last write of a key wins.
    pub query: BTreeMap<String, String>,
    /// Form fields, present only for form-urlencoded endpoints with fields.
    pub form_fields: Option<BTreeMap<String, String>>,
    /// Multipart parts, present only for multipart endpoints with parts.
    pub multipart_parts: Option<BTreeMap<String, PartValue>>,
    /// JSON body, present only when the endpoint sends one.
    pub body: Option<serde_json::Value>,
    /// Whether the reply is returned as raw bytes.
    pub streaming: bool,
    /// Expected reply shape.
    pub response_shape: ResponseShape,
}

impl CallPlan {
    /// First header value for `name`, compared exactly.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Accumulates parameter contributions on top of an endpoint.
#[derive(Debug)]
pub struct CallPlanBuilder<'e> {
    endpoint: &'e EndpointDeclaration,
    path: String,
    headers: Vec<(String, String)>,
    query: BTreeMap<String, String>,
    form_fields: BTreeMap<String, String>,
    parts: BTreeMap<String, PartValue>,
    body: Option<serde_json::Value>,
}

impl<'e> CallPlanBuilder<'e> {
    /// Seed a plan with the path template and the static headers.
    #[must_use]
    pub fn new(endpoint: &'e EndpointDeclaration) -> Self {
        Self {
            endpoint,
            path: endpoint.path_template.to_string(),
            headers: endpoint
                .static_headers
                .iter()
                .map(|(key, value)| (key.to_string(), value.to_string()))
                .collect(),
            query: BTreeMap::new(),
            form_fields: BTreeMap::new(),
            parts: BTreeMap::new(),
            body: None,
        }
    }

    /// Replace the whole path.
    pub fn url(&mut self, value: impl Display) -> &mut Self {
        self.path = value.to_string();
        self
    }

    /// Set a query entry.
    pub fn query(&mut self, name: &str, value: impl Display) -> &mut Self {
        self.query.insert(name.to_string(), value.to_string());
        self
    }

    /// Set a form field. Ignored unless the endpoint is form-urlencoded.
    pub fn field(&mut self, name: &str, value: impl Display) -> &mut Self {
        if self.endpoint.encoding.accepts_fields() {
            self.form_fields.insert(name.to_string(), value.to_string());
        }
        self
    }

    /// Replace every `{name}` in the current path.
    ///
    /// The value is inserted verbatim, without percent-encoding.
    pub fn path(&mut self, name: &str, value: impl Display) -> &mut Self {
        let placeholder = format!("{{{name}}}");
        self.path = self.path.replace(&placeholder, &value.to_string());
        self
    }

    /// Set a multipart part.
    pub fn part(&mut self, name: &str, value: impl ToPartValue) -> &mut Self {
        self.parts.insert(name.to_string(), value.to_part_value());
        self
    }

    /// Replace every header named exactly `name` with a single entry.
    pub fn header(&mut self, name: &str, value: impl Display) -> &mut Self {
        self.headers.retain(|(key, _)| key != name);
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    /// Set the JSON body.
    ///
    /// The value is serialized only when the endpoint permits a body and has
    /// no form or multipart encoding; otherwise this does nothing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::JsonSerialization`] if serialization fails.
    pub fn body<T: serde::Serialize + ?Sized>(&mut self, value: &T) -> Result<&mut Self> {
        if self.endpoint.body_permitted && self.endpoint.encoding == Encoding::None {
            self.body = Some(serde_json::to_value(value)?);
        }
        Ok(self)
    }

    /// Finish the plan.
    #[must_use]
    pub fn finish(self, operation: &str, response_shape: ResponseShape) -> CallPlan {
        let encoding = self.endpoint.encoding;
        let non_empty = |map: BTreeMap<String, String>| (!map.is_empty()).then_some(map);

        CallPlan {
            operation: operation.to_string(),
            verb: self.endpoint.verb.clone(),
            path_template: self.endpoint.path_template.to_string(),
            path: self.path,
            headers: self.headers,
            query: self.query,
            form_fields: if encoding.accepts_fields() {
                non_empty(self.form_fields)
            } else {
                None
            },
            multipart_parts: (encoding.accepts_parts() && !self.parts.is_empty())
                .then_some(self.parts),
            body: self.body,
            streaming: self.endpoint.streaming,
            response_shape,
        }
    }
}

/// Assemble a plan from a schema and positional arguments.
///
/// `args` holds one value per declared parameter, receiver excluded.
/// [`Value::Null`] plays the role of an absent optional value.
///
/// # Errors
///
/// Returns [`Error::InvalidRequest`] when the argument count does not match
/// or a map role receives something other than a map, and
/// [`Error::JsonSerialization`] if the body cannot be serialized.
pub fn assemble(
    schema: &MethodSchema,
    args: &[Value],
    response_shape: ResponseShape,
) -> Result<CallPlan> {
    if args.len() != schema.arity {
        return Err(Error::invalid_request(format!(
            "`{}` expects {} arguments, got {}",
            schema.name,
            schema.arity,
            args.len()
        )));
    }

    let mut plan = CallPlanBuilder::new(&schema.endpoint);
    for binding in &schema.bindings {
        let value = argument(schema, args, binding.index)?;
        for role in &binding.roles {
            if value.is_null() && !matches!(role, Role::Path(_) | Role::Part(_)) {
                continue;
            }
            match role {
                Role::Url => {
                    plan.url(value);
                }
                Role::Query(name) => {
                    plan.query(name, value);
                }
                Role::Field(name) => {
                    plan.field(name, value);
                }
                Role::Path(name) => {
                    plan.path(name, value);
                }
                Role::Part(name) => {
                    plan.part(name, value);
                }
                Role::Header(name) => {
                    plan.header(name, value);
                }
                Role::QueryMap | Role::FieldMap | Role::PartMap => {
                    let entries = value.entries().ok_or_else(|| {
                        Error::invalid_request(format!(
                            "`{}` parameter `{}` must be a map for {role}",
                            schema.name, binding.parameter
                        ))
                    })?;
                    for (key, entry) in &entries {
                        match role {
                            Role::PartMap => {
                                plan.part(key, entry);
                            }
                            _ if entry.is_null() => {}
                            Role::QueryMap => {
                                plan.query(key, entry);
                            }
                            _ => {
                                plan.field(key, entry);
                            }
                        }
                    }
                }
                Role::Body => {}
            }
        }
    }

    if let Some(index) = schema.body_parameter {
        plan.body(&argument(schema, args, index)?.to_json())?;
    }

    Ok(plan.finish(&schema.name, response_shape))
}

fn argument<'a>(schema: &MethodSchema, args: &'a [Value], index: usize) -> Result<&'a Value> {
    args.get(index).ok_or_else(|| {
        Error::invalid_request(format!("`{}` has no argument at {index}", schema.name))
    })
}
