//! Declarative HTTP client for Rust.
//!
//! Annotate a trait with `#[ferrule]`, describe each endpoint with method and
//! parameter attributes, and get a client implementing it.
//!
//! # Example
//!
//! ```ignore
//! use ferrule::prelude::*;
//!
//! #[derive(Debug, Deserialize)]
//! pub struct User {
//!     id: u64,
//!     name: String,
//! }
//!
//! #[ferrule]
//! pub trait UserApi {
//!     #[get("/users/{id}")]
//!     async fn get_user(&self, #[path] id: u64) -> ferrule::Result<User>;
//!
//!     #[get("/users")]
//!     async fn search(&self, #[query("q")] name: &str, #[query] page: Option<u32>) -> ferrule::Result<Vec<User>>;
//! }
//!
//! let ferrule = Ferrule::new("https://api.example.com", HyperTransport::new());
//! let users: Box<dyn UserApi> = ferrule.create::<dyn UserApi>()?;
//! let user = users.get_user(42).await?;
//! ```
//!
//! Any [`Transport`] can carry the calls; [`HyperTransport`] is the default
//! one and [`LoggingTransport`] adds `tracing` output around another.

#[cfg(feature = "hyper-transport")]
mod client;
#[cfg(feature = "hyper-transport")]
mod config;
#[cfg(feature = "hyper-transport")]
mod connector;
mod logging;
pub mod prelude;

#[cfg(feature = "hyper-transport")]
pub use client::HyperTransport;
#[cfg(feature = "hyper-transport")]
pub use config::{TransportConfig, TransportConfigBuilder};
pub use logging::{LogLevel, LoggingTransport};

// Re-export core types
pub use ferrule_core::{
    BoxFuture, CallPlan, CallPlanBuilder, ContentType, Diagnostic, DiagnosticKind, Encoding,
    EndpointDeclaration, Error, Ferrule, FerruleBuilder, Form, MethodMarker, MethodSchema,
    ParamMarker, Part, PartValue, Registration, Registry, Reply, ResponseShape, Result, Role,
    Severity, ToPartValue, Transport, TransportCall, Value, Verb, analyze_method, assemble,
    from_json, to_form, to_json, type_id_of,
};

// Re-export crates for macro-generated code
#[doc(hidden)]
pub use ferrule_core::inventory;
pub use serde_json;

// Re-export the macro
pub use ferrule_macro::ferrule;
