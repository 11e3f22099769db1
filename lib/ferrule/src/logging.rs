//! Call logging around any [`Transport`].
//!
//! Calls are logged with the `tracing` crate.

use std::time::Instant;

use ferrule_core::{BoxFuture, Reply, Result, Transport, TransportCall};
use tracing::{Instrument, Level, debug, info, span, warn};

/// Log level for [`LoggingTransport`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogLevel {
    /// Log at debug level (headers and query included).
    Debug,
    /// Log at info level (summary only).
    #[default]
    Info,
}

/// Transport that logs every call before delegating to `inner`.
///
/// # Example
///
/// ```ignore
/// use ferrule::{Ferrule, HyperTransport, LoggingTransport};
///
/// let ferrule = Ferrule::new(
///     "https://api.example.com",
///     LoggingTransport::new(HyperTransport::new()),
/// );
/// ```
#[derive(Debug, Clone)]
pub struct LoggingTransport<T> {
    inner: T,
    level: LogLevel,
}

impl<T> LoggingTransport<T> {
    /// Log summaries at info level.
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            level: LogLevel::Info,
        }
    }

    /// Log call details at debug level.
    pub fn debug(inner: T) -> Self {
        Self {
            inner,
            level: LogLevel::Debug,
        }
    }

    /// Configured level.
    pub const fn level(&self) -> LogLevel {
        self.level
    }

    /// Wrapped transport.
    pub const fn inner(&self) -> &T {
        &self.inner
    }
}

impl<T: Transport> Transport for LoggingTransport<T> {
    fn request(&self, call: TransportCall) -> BoxFuture<'_, Result<Reply>> {
        let span = span!(
            Level::INFO,
            "http_call",
            operation = %call.operation,
            verb = %call.verb,
            url = %call.url,
        );
        let level = self.level;

        Box::pin(
            async move {
                let start = Instant::now();

                match level {
                    LogLevel::Debug => {
                        debug!(
                            path_template = %call.path_template,
                            headers = ?call.headers,
                            query = ?call.query,
                            "sending call"
                        );
                    }
                    LogLevel::Info => {
                        info!("sending call");
                    }
                }

                let result = self.inner.request(call).await;
                let elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

                match &result {
                    Ok(_) => info!(elapsed_ms, "call completed"),
                    Err(err) => match err.status() {
                        Some(status) => warn!(status, elapsed_ms, "call failed with HTTP error"),
                        None => warn!(error = %err, elapsed_ms, "call failed"),
                    },
                }

                result
            }
            .instrument(span),
        )
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::{Arc, Mutex};

    use assert2::{check, let_assert};
    use ferrule_core::{Error, ResponseShape, Verb};

    use super::*;

    #[derive(Default)]
    struct Failing {
        seen: Arc<Mutex<Vec<String>>>,
    }

    impl Transport for Failing {
        fn request(&self, call: TransportCall) -> BoxFuture<'_, Result<Reply>> {
            self.seen.lock().expect("lock").push(call.operation);
            Box::pin(async { Err(Error::http(503, "Service Unavailable")) })
        }
    }

    fn call() -> TransportCall {
        TransportCall {
            verb: Verb::Get,
            url: "https://api.test/health".into(),
            headers: Vec::new(),
            query: BTreeMap::new(),
            body: None,
            form_fields: None,
            multipart_parts: None,
            streaming: false,
            response_shape: ResponseShape::of::<()>(),
            operation: "health".into(),
            path_template: "/health".into(),
        }
    }

    #[test]
    fn levels() {
        check!(LoggingTransport::new(()).level() == LogLevel::Info);
        check!(LoggingTransport::debug(()).level() == LogLevel::Debug);
    }

    #[tokio::test]
    async fn delegates_and_keeps_errors() {
        let inner = Failing::default();
        let seen = Arc::clone(&inner.seen);
        let transport = LoggingTransport::debug(inner);

        let_assert!(Err(err) = transport.request(call()).await);
        check!(err.status() == Some(503));
        check!(*seen.lock().expect("lock") == ["health"]);
    }
}
