//! Core of the ferrule declarative HTTP client.
//!
//! The pipeline, leaves first:
//! - [`MethodMarker`] / [`ParamMarker`] - the closed annotation model
//! - [`resolve_endpoint`] - verb, path template, encoding, static headers
//! - [`bind_parameters`] - parameter roles
//! - [`analyze_method`] / [`analyze_interface`] - validation into [`MethodSchema`]s
//! - [`CallPlanBuilder`] / [`assemble`] - per-call [`CallPlan`]s
//! - [`Ferrule`] - base URL + [`Transport`], dispatch and instance creation
//! - [`Registry`] - interface type to factory mapping

mod annotation;
mod binding;
mod body;
mod config;
mod diagnostic;
mod endpoint;
mod error;
mod multipart;
mod plan;
pub mod prelude;
mod registry;
mod schema;
#[cfg(test)]
mod testing;
mod transport;
mod value;
mod verb;

pub use annotation::{
    FORM_URL_ENCODED_ALIASES, MethodMarker, ParamMarker, is_method_attribute, is_param_attribute,
};
pub use binding::{ParameterBinding, ParameterDeclaration, Role, bind_parameters};
pub use body::{ContentType, from_json, from_json_value, to_form, to_json};
pub use config::{Ferrule, FerruleBuilder};
pub use diagnostic::{Diagnostic, DiagnosticKind, Severity};
pub use endpoint::{Encoding, EndpointDeclaration, parse_static_header, resolve_endpoint};
pub use error::{Error, Result};
pub use multipart::{Form, Part};
pub use plan::{CallPlan, CallPlanBuilder, assemble};
pub use registry::{Registration, Registry, type_id_of};
pub use schema::{
    InterfaceDeclaration, InterfaceSchema, MethodDeclaration, MethodSchema, analyze_interface,
    analyze_method,
};
pub use transport::{BoxFuture, Reply, ResponseShape, Transport, TransportCall};
pub use value::{PartValue, ToPartValue, Value};
pub use verb::Verb;

#[doc(hidden)]
pub use inventory;
