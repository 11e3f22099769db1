//! Tuning knobs of [`HyperTransport`](crate::HyperTransport).

use std::time::Duration;

/// How long a call may take and how connections are kept.
///
/// `timeout` bounds one whole exchange: connecting, sending, receiving the
/// head and reading the reply body. Hitting it yields
/// [`Error::Timeout`](crate::Error::Timeout). `connect_timeout` only bounds
/// establishing the TCP connection and surfaces as a connection error.
///
/// ```
/// use std::time::Duration;
/// use ferrule::TransportConfig;
///
/// let config = TransportConfig::builder()
///     .timeout(Duration::from_secs(5))
///     .build();
/// assert_eq!(config.connect_timeout, TransportConfig::default().connect_timeout);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportConfig {
    /// Upper bound of a call, reply body included.
    pub timeout: Duration,
    /// Upper bound of the TCP connect.
    pub connect_timeout: Duration,
    /// Idle connections kept per host.
    pub pool_idle_per_host: usize,
    /// How long an idle connection stays in the pool.
    pub pool_idle_timeout: Duration,
}

impl TransportConfig {
    const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
    const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
    const DEFAULT_POOL_IDLE_PER_HOST: usize = 32;
    const DEFAULT_POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(90);

    /// Start from the defaults.
    #[must_use]
    pub fn builder() -> TransportConfigBuilder {
        TransportConfigBuilder(Self::default())
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Self::DEFAULT_TIMEOUT,
            connect_timeout: Self::DEFAULT_CONNECT_TIMEOUT,
            pool_idle_per_host: Self::DEFAULT_POOL_IDLE_PER_HOST,
            pool_idle_timeout: Self::DEFAULT_POOL_IDLE_TIMEOUT,
        }
    }
}

/// Builder for [`TransportConfig`].
#[derive(Debug, Clone)]
pub struct TransportConfigBuilder(TransportConfig);

impl TransportConfigBuilder {
    /// Bound the whole call.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.0.timeout = timeout;
        self
    }

    /// Bound the TCP connect.
    #[must_use]
    pub const fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.0.connect_timeout = timeout;
        self
    }

    /// Idle connections kept per host; `0` disables pooling.
    #[must_use]
    pub const fn pool_idle_per_host(mut self, count: usize) -> Self {
        self.0.pool_idle_per_host = count;
        self
    }

    /// Evict idle connections after `timeout`.
    #[must_use]
    pub const fn pool_idle_timeout(mut self, timeout: Duration) -> Self {
        self.0.pool_idle_timeout = timeout;
        self
    }

    /// Finish.
    #[must_use]
    pub fn build(self) -> TransportConfig {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use assert2::check;

    use super::*;

    #[test]
    fn builder_without_setters_is_default() {
        check!(TransportConfig::builder().build() == TransportConfig::default());
    }

    #[test]
    fn setters_only_touch_their_field() {
        let config = TransportConfig::builder()
            .timeout(Duration::from_millis(250))
            .pool_idle_per_host(0)
            .build();

        check!(config.timeout == Duration::from_millis(250));
        check!(config.pool_idle_per_host == 0);
        check!(config.connect_timeout == Duration::from_secs(10));
        check!(config.pool_idle_timeout == Duration::from_secs(90));
    }
}
