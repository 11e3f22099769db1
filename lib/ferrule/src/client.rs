//! Reference [`Transport`] built on hyper-util.

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper_rustls::HttpsConnector;
use hyper_util::{
    client::legacy::{Client, connect::HttpConnector},
    rt::TokioExecutor,
};

use ferrule_core::{
    BoxFuture, ContentType, Error, Form, Reply, Result, Transport, TransportCall, from_json,
    to_form, to_json,
};

use crate::config::TransportConfig;
use crate::connector::https_connector;

/// HTTP transport with connection pooling and rustls TLS.
///
/// # Example
///
/// ```ignore
/// use std::time::Duration;
/// use ferrule::{Ferrule, HyperTransport, TransportConfig};
///
/// let transport = HyperTransport::with_config(
///     TransportConfig::builder().timeout(Duration::from_secs(5)).build(),
/// );
/// let ferrule = Ferrule::new("https://api.example.com", transport);
/// ```
#[derive(Clone)]
pub struct HyperTransport {
    inner: Client<HttpsConnector<HttpConnector>, Full<Bytes>>,
    config: TransportConfig,
}

impl std::fmt::Debug for HyperTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HyperTransport")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Default for HyperTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl HyperTransport {
    /// Create a transport with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(TransportConfig::default())
    }

    /// Create a transport with a custom configuration.
    #[must_use]
    pub fn with_config(config: TransportConfig) -> Self {
        let inner = Client::builder(TokioExecutor::new())
            .pool_idle_timeout(config.pool_idle_timeout)
            .pool_max_idle_per_host(config.pool_idle_per_host)
            .build(https_connector(config.connect_timeout));

        Self { inner, config }
    }

    /// Transport configuration.
    #[must_use]
    pub const fn config(&self) -> &TransportConfig {
        &self.config
    }

    /// Encoded body and its content type.
    ///
    /// Multipart parts win over form fields, which win over the JSON body.
    fn encode_body(call: &TransportCall) -> Result<Option<(String, Bytes)>> {
        if let Some(parts) = &call.multipart_parts {
            return Ok(Some(Form::from_values(parts).into_body()));
        }
        if let Some(fields) = &call.form_fields {
            return Ok(Some((ContentType::FormUrlEncoded.to_string(), to_form(fields)?)));
        }
        if let Some(body) = &call.body {
            return Ok(Some((ContentType::Json.to_string(), to_json(body)?)));
        }
        Ok(None)
    }

    fn build_request(call: &TransportCall) -> Result<http::Request<Full<Bytes>>> {
        let mut url = url::Url::parse(&call.url)?;
        if !call.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&call.query);
        }

        let mut builder = http::Request::builder()
            .method(http::Method::try_from(&call.verb)?)
            .uri(url.as_str());

        let body = match Self::encode_body(call)? {
            Some((content_type, body)) => {
                let content_type_name = http::header::CONTENT_TYPE.as_str();
                let explicit = call
                    .headers
                    .iter()
                    .any(|(name, _)| name.eq_ignore_ascii_case(content_type_name));
                if !explicit {
                    builder = builder.header(http::header::CONTENT_TYPE, content_type);
                }
                Full::new(body)
            }
            None => Full::default(),
        };

        for (name, value) in &call.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        builder
            .body(body)
            .map_err(|e| Error::invalid_request(e.to_string()))
    }

    async fn execute(&self, call: TransportCall) -> Result<Reply> {
        let request = Self::build_request(&call)?;

        let exchange = async {
            let response = self
                .inner
                .request(request)
                .await
                .map_err(Self::map_hyper_error)?;
            let status = response.status();
            let body = response
                .into_body()
                .collect()
                .await
                .map_err(|e| Error::connection(e.to_string()))?
                .to_bytes();
            Ok::<_, Error>((status, body))
        };
        let (status, body) = tokio::time::timeout(self.config.timeout, exchange)
            .await
            .map_err(|_| Error::Timeout)??;

        if !status.is_success() {
            let message = status.canonical_reason().unwrap_or("unexpected status");
            return Err(Error::http_with_body(status.as_u16(), message, body));
        }

        if call.streaming {
            return Ok(Reply::Bytes(body));
        }
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Reply::Value(serde_json::Value::Null));
        }
        Ok(Reply::Value(from_json(&body)?))
    }

    #[allow(clippy::needless_pass_by_value)]
    fn map_hyper_error(err: hyper_util::client::legacy::Error) -> Error {
        let msg = err.to_string();

        if err.is_connect() {
            return Error::connection(msg);
        }

        if msg.contains("ssl") || msg.contains("tls") || msg.contains("certificate") {
            return Error::tls(msg);
        }

        Error::connection(msg)
    }
}

impl Transport for HyperTransport {
    fn request(&self, call: TransportCall) -> BoxFuture<'_, Result<Reply>> {
        Box::pin(self.execute(call))
    }
}
