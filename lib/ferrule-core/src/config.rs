//! Client configuration shared by every generated implementation.

use std::fmt;
use std::sync::Arc;

use crate::{CallPlan, Error, Registry, Reply, Result, Transport, TransportCall};

/// Base URL plus transport, handed to every generated client.
///
/// Cloning is cheap; clones share the transport.
///
/// # Example
///
/// ```ignore
/// use ferrule::{Ferrule, HyperTransport};
///
/// let ferrule = Ferrule::new("https://api.example.com", HyperTransport::new());
/// let users: Box<dyn UserApi> = ferrule.create::<dyn UserApi>()?;
/// ```
#[derive(Clone)]
pub struct Ferrule {
    base_url: String,
    transport: Arc<dyn Transport>,
    registry: Option<Arc<Registry>>,
}

impl fmt::Debug for Ferrule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ferrule")
            .field("base_url", &self.base_url)
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

impl Ferrule {
    /// Create a configuration.
    #[must_use]
    pub fn new(base_url: impl Into<String>, transport: impl Transport + 'static) -> Self {
        Self {
            base_url: base_url.into(),
            transport: Arc::new(transport),
            registry: None,
        }
    }

    /// Create a configuration builder.
    #[must_use]
    pub fn builder() -> FerruleBuilder {
        FerruleBuilder::default()
    }

    /// Base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Shared transport.
    #[must_use]
    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    /// Caller-owned registry, if attached.
    #[must_use]
    pub fn registry(&self) -> Option<&Arc<Registry>> {
        self.registry.as_ref()
    }

    /// Same transport and registry, different base URL.
    #[must_use]
    pub fn with_base_url(&self, base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            transport: Arc::clone(&self.transport),
            registry: self.registry.clone(),
        }
    }

    /// Same configuration with a caller-owned registry attached.
    #[must_use]
    pub fn with_registry(&self, registry: Arc<Registry>) -> Self {
        Self {
            registry: Some(registry),
            ..self.clone()
        }
    }

    /// Absolute URL for `path`.
    ///
    /// `http://` and `https://` paths pass through; anything else is appended
    /// to the base URL with its trailing slashes removed.
    #[must_use]
    pub fn resolve_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        let base = self.base_url.trim_end_matches('/');
        if path.is_empty() || path.starts_with('/') {
            format!("{base}{path}")
        } else {
            format!("{base}/{path}")
        }
    }

    /// Send `plan` through the transport.
    ///
    /// # Errors
    ///
    /// Propagates transport errors unchanged.
    pub async fn dispatch(&self, plan: CallPlan) -> Result<Reply> {
        let call = TransportCall {
            url: self.resolve_url(&plan.path),
            verb: plan.verb,
            headers: plan.headers,
            query: plan.query,
            body: plan.body,
            form_fields: plan.form_fields,
            multipart_parts: plan.multipart_parts,
            streaming: plan.streaming,
            response_shape: plan.response_shape,
            operation: plan.operation,
            path_template: plan.path_template,
        };
        tracing::debug!(
            operation = %call.operation,
            verb = %call.verb,
            url = %call.url,
            "dispatching call"
        );
        self.transport.request(call).await
    }

    /// Build an implementation of `I`.
    ///
    /// The attached registry is consulted first, then [`Registry::global`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotRegistered`] when neither knows `I`.
    pub fn create<I: ?Sized + 'static>(&self) -> Result<Box<I>> {
        self.registry
            .as_ref()
            .and_then(|registry| registry.create::<I>(self))
            .or_else(|| Registry::global().create::<I>(self))
            .ok_or_else(|| Error::not_registered(std::any::type_name::<I>()))
    }
}

/// Builder for [`Ferrule`].
#[derive(Default)]
pub struct FerruleBuilder {
    base_url: Option<String>,
    transport: Option<Arc<dyn Transport>>,
    registry: Option<Arc<Registry>>,
}

impl fmt::Debug for FerruleBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FerruleBuilder")
            .field("base_url", &self.base_url)
            .field("has_transport", &self.transport.is_some())
            .finish_non_exhaustive()
    }
}

impl FerruleBuilder {
    /// Set the base URL.
    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Set the transport.
    #[must_use]
    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Set an already shared transport.
    #[must_use]
    pub fn shared_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Attach a caller-owned registry.
    #[must_use]
    pub fn registry(mut self, registry: Arc<Registry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Build the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRequest`] without a transport and
    /// [`Error::InvalidUrl`] when the base URL does not parse.
    pub fn build(self) -> Result<Ferrule> {
        let transport = self
            .transport
            .ok_or_else(|| Error::invalid_request("a transport is required"))?;
        let base_url = self.base_url.unwrap_or_default();
        if !base_url.is_empty() {
            url::Url::parse(&base_url)?;
        }
        Ok(Ferrule {
            base_url,
            transport,
            registry: self.registry,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::borrow::Cow;

    use assert2::{check, let_assert};

    use super::*;
    use crate::testing::{NullTransport, RecordingTransport};
    use crate::{CallPlanBuilder, EndpointDeclaration, ResponseShape, Verb};

    #[test]
    fn resolve_url_joins_base() {
        let ferrule = Ferrule::new("https://api.test/v1//", NullTransport);
        check!(ferrule.resolve_url("/users") == "https://api.test/v1/users");
        check!(ferrule.resolve_url("users") == "https://api.test/v1/users");
        check!(ferrule.resolve_url("") == "https://api.test/v1");
    }

    #[test]
    fn resolve_url_passes_absolute() {
        let ferrule = Ferrule::new("https://api.test", NullTransport);
        check!(ferrule.resolve_url("http://other.test/x") == "http://other.test/x");
        check!(ferrule.resolve_url("https://other.test/y") == "https://other.test/y");
    }

    #[test]
    fn with_base_url_shares_transport() {
        let ferrule = Ferrule::new("https://a.test", NullTransport);
        let other = ferrule.with_base_url("https://b.test");
        check!(other.base_url() == "https://b.test");
        check!(Arc::ptr_eq(ferrule.transport(), other.transport()));
    }

    #[test]
    fn builder_requires_transport() {
        let_assert!(
            Err(Error::InvalidRequest(_)) = Ferrule::builder().base_url("https://a.test").build()
        );
        let_assert!(
            Err(Error::InvalidUrl(_)) = Ferrule::builder()
                .base_url("not a url")
                .transport(NullTransport)
                .build()
        );
        let_assert!(Ok(ferrule) = Ferrule::builder().transport(NullTransport).build());
        check!(ferrule.base_url() == "");
    }

    #[test]
    fn create_unregistered_fails() {
        trait Missing {}
        let ferrule = Ferrule::new("https://a.test", NullTransport);
        let_assert!(Err(err) = ferrule.create::<dyn Missing>());
        check!(err.is_not_registered());
    }

    #[test]
    fn attached_registry_comes_first() {
        trait Named: Send {
            fn name(&self) -> &'static str;
        }
        struct Local;
        impl Named for Local {
            fn name(&self) -> &'static str {
                "local"
            }
        }

        let registry = Arc::new(Registry::new());
        registry.register::<dyn Named, _>(|_| Box::new(Local));
        let ferrule = Ferrule::new("https://a.test", NullTransport).with_registry(registry);
        let_assert!(Ok(named) = ferrule.create::<dyn Named>());
        check!(named.name() == "local");
    }

    #[tokio::test]
    async fn dispatch_resolves_url() {
        let transport = RecordingTransport::default();
        let ferrule = Ferrule::new("https://api.test/", transport.clone());
        let endpoint = EndpointDeclaration {
            verb: Verb::Delete,
            path_template: Cow::Borrowed("/users/{id}"),
            body_permitted: true,
            ..EndpointDeclaration::default()
        };
        let mut plan = CallPlanBuilder::new(&endpoint);
        plan.path("id", 7);

        let reply = ferrule
            .dispatch(plan.finish("delete_user", ResponseShape::of::<()>()))
            .await
            .expect("dispatch");
        check!(reply == Reply::Value(serde_json::Value::Null));

        let calls = transport.calls();
        let_assert!([call] = calls.as_slice());
        check!(call.url == "https://api.test/users/7");
        check!(call.verb == Verb::Delete);
        check!(call.operation == "delete_user");
        check!(call.path_template == "/users/{id}");
    }
}
