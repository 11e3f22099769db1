//! Prelude module for convenient imports.
//!
//! ```ignore
//! use ferrule::prelude::*;
//! ```

#[cfg(feature = "hyper-transport")]
pub use crate::HyperTransport;
pub use crate::{
    Error, Ferrule, Form, LoggingTransport, Part, Registry, Reply, Result, Transport,
    TransportCall, ferrule,
};
pub use serde::{Deserialize, Serialize};
