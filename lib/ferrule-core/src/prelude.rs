//! Prelude module for convenient imports.
//!
//! ```ignore
//! use ferrule_core::prelude::*;
//! ```

pub use crate::{
    BoxFuture, CallPlan, CallPlanBuilder, Encoding, EndpointDeclaration, Error, Ferrule, Form,
    Part, PartValue, Registry, Reply, ResponseShape, Result, ToPartValue, Transport,
    TransportCall, Value, Verb,
};
