//! Client configuration

use crate::{
    constants::{
        CALL_TIMEOUT_SECS, DEFAULT_CACHE_TTL_SECS, DEFAULT_MAX_RETRIES, ENV_PREFIX,
        INITIAL_BACKOFF_MS, MAX_BACKOFF_MS, REQUEST_TIMEOUT_SECS, USER_AGENT,
    },
    error::ClientError,
    provider::Provider,
    retry::RetryPolicy,
    types::Credentials,
};
use std::time::Duration;

/// Settings fixed at client construction
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub provider: Provider,
    pub credentials: Option<Credentials>,
    /// Lifetime of cached responses; `None` or zero disables the cache
    pub cache_ttl: Option<Duration>,
    /// Additional attempts after the first one
    pub max_retries: u32,
    pub retry_base_delay: Duration,
    pub retry_max_delay: Duration,
    /// Timeout of a single HTTP round trip
    pub request_timeout: Duration,
    /// Upper bound for a whole call, retries included
    pub call_timeout: Duration,
    /// Replaces the provider's base URL, e.g. a testnet or a local mock
    pub base_url: Option<String>,
    pub user_agent: String,
}

impl ClientConfig {
    pub fn new(provider: Provider) -> Self {
        Self {
            provider,
            credentials: None,
            cache_ttl: Some(Duration::from_secs(DEFAULT_CACHE_TTL_SECS)),
            max_retries: DEFAULT_MAX_RETRIES,
            retry_base_delay: Duration::from_millis(INITIAL_BACKOFF_MS),
            retry_max_delay: Duration::from_millis(MAX_BACKOFF_MS),
            request_timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
            call_timeout: Duration::from_secs(CALL_TIMEOUT_SECS),
            base_url: None,
            user_agent: USER_AGENT.to_string(),
        }
    }

    /// Reads `CRYPTOWRAPPER_*` variables on top of the defaults
    ///
    /// Recognised: `API_KEY`, `API_SECRET`, `CACHE_TTL_SECS`, `MAX_RETRIES`,
    /// `BASE_URL`. Unset variables keep their defaults.
    pub fn from_env(provider: Provider) -> Result<Self, ClientError> {
        Self::from_lookup(provider, |name| std::env::var(name).ok())
    }

    fn from_lookup<F>(provider: Provider, lookup: F) -> Result<Self, ClientError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |suffix: &str| {
            lookup(&format!("{}_{}", ENV_PREFIX, suffix)).filter(|v| !v.trim().is_empty())
        };
        let mut config = Self::new(provider);

        if let Some(key) = var("API_KEY") {
            config.credentials = Some(Credentials {
                api_key: key,
                api_secret: var("API_SECRET"),
            });
        }
        if let Some(ttl) = var("CACHE_TTL_SECS") {
            config.cache_ttl = Some(Duration::from_secs(parse_number("CACHE_TTL_SECS", &ttl)?));
        }
        if let Some(retries) = var("MAX_RETRIES") {
            config.max_retries = parse_number("MAX_RETRIES", &retries)?;
        }
        if let Some(url) = var("BASE_URL") {
            config.base_url = Some(url);
        }

        Ok(config)
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn with_cache_ttl(mut self, ttl: Option<Duration>) -> Self {
        self.cache_ttl = ttl;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_retry_delays(mut self, base: Duration, max: Duration) -> Self {
        self.retry_base_delay = base;
        self.retry_max_delay = max;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Points the client at the provider's sandbox
    pub fn with_testnet(self) -> Result<Self, ClientError> {
        let url = self.provider.testnet_url().ok_or_else(|| {
            ClientError::config(format!("{} has no testnet", self.provider))
        })?;
        Ok(self.with_base_url(url))
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_retries, self.retry_base_delay, self.retry_max_delay)
    }
}

fn parse_number<T: std::str::FromStr>(name: &str, value: &str) -> Result<T, ClientError> {
    value.trim().parse().map_err(|_| {
        ClientError::config(format!(
            "{}_{} must be a non-negative integer, got `{}`",
            ENV_PREFIX, name, value
        ))
    })
}
