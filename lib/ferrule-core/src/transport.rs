//! The contract between generated clients and an HTTP transport.

use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use bytes::Bytes;

use crate::{PartValue, Result, Verb};

/// Boxed, sendable future returned by dyn-compatible async methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Description of the value a caller expects back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResponseShape {
    type_name: &'static str,
}

impl ResponseShape {
    /// Shape of `T`.
    #[must_use]
    pub fn of<T: ?Sized>() -> Self {
        Self {
            type_name: std::any::type_name::<T>(),
        }
    }

    /// Fully qualified type name.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Whether the expected value is `()`.
    #[must_use]
    pub fn is_unit(&self) -> bool {
        self.type_name == "()"
    }
}

/// One fully resolved HTTP call.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportCall {
    /// HTTP verb.
    pub verb: Verb,
    /// Absolute URL, without the query.
    pub url: String,
    /// Headers in order.
    pub headers: Vec<(String, String)>,
    /// Query entries.
    pub query: BTreeMap<String, String>,
    /// JSON body.
    pub body: Option<serde_json::Value>,
    /// Form fields, for form-urlencoded endpoints.
    pub form_fields: Option<BTreeMap<String, String>>,
    /// Multipart parts, for multipart endpoints.
    pub multipart_parts: Option<BTreeMap<String, PartValue>>,
    /// Whether the reply should be returned as raw bytes.
    pub streaming: bool,
    /// Expected reply shape.
    pub response_shape: ResponseShape,
    /// Method name of the calling operation.
    pub operation: String,
    /// Path template before substitution.
    pub path_template: String,
}

/// What a transport hands back.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// Raw reply bytes.
    Bytes(Bytes),
    /// Decoded JSON reply.
    Value(serde_json::Value),
}

impl Reply {
    /// Decode the reply as `T`.
    ///
    /// An empty byte reply decodes as JSON `null`, so `()` and `Option<T>`
    /// accept it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::JsonDeserialization`](crate::Error::JsonDeserialization)
    /// when the reply does not match `T`.
    pub fn decode<T: serde::de::DeserializeOwned>(self) -> Result<T> {
        match self {
            Self::Bytes(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => {
                crate::from_json_value(serde_json::Value::Null)
            }
            Self::Bytes(bytes) => crate::from_json(&bytes),
            Self::Value(value) => crate::from_json_value(value),
        }
    }

    /// Raw bytes of the reply; JSON values are re-serialized.
    ///
    /// # Errors
    ///
    /// Returns an error if a JSON value cannot be serialized.
    pub fn into_bytes(self) -> Result<Bytes> {
        match self {
            Self::Bytes(bytes) => Ok(bytes),
            Self::Value(value) => crate::to_json(&value),
        }
    }
}

/// Executes [`TransportCall`]s.
///
/// Implementations own connection management, timeouts, retries and TLS.
pub trait Transport: Send + Sync {
    /// Perform one call.
    fn request(&self, call: TransportCall) -> BoxFuture<'_, Result<Reply>>;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn request(&self, call: TransportCall) -> BoxFuture<'_, Result<Reply>> {
        (**self).request(call)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn request(&self, call: TransportCall) -> BoxFuture<'_, Result<Reply>> {
        (**self).request(call)
    }
}
