//! Provider facade: resolves operation names and checks calls before they run

use crate::{
    cache::{Clock, ResponseCache, SystemClock},
    config::ClientConfig,
    endpoint::EndpointDescriptor,
    error::ClientError,
    executor::{CacheUse, CallContext, RequestExecutor},
    provider::ApiProvider,
    signer::Signer,
    transport::{HttpTransport, Transport},
    types::{ApiResponse, Arguments},
};
use std::collections::HashMap;
use std::sync::Arc;

/// Operation table of one provider bound to one configuration
pub struct ProviderFacade {
    operations: HashMap<&'static str, &'static EndpointDescriptor>,
    executor: RequestExecutor,
    cache_ttl: Option<std::time::Duration>,
}

impl ProviderFacade {
    /// Builds a facade over the HTTP transport
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let transport = HttpTransport::new(config.request_timeout, &config.user_agent)
            .map_err(|e| ClientError::config(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        let api = config.provider.api();
        Self::with_api(config, api, transport)
    }

    /// Builds a facade over any provider implementation
    pub fn with_api(
        config: ClientConfig,
        api: Arc<dyn ApiProvider>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        let operations: HashMap<_, _> = api.endpoints().iter().map(|e| (e.name, e)).collect();

        tracing::debug!(
            provider = api.provider_name(),
            operations = operations.len(),
            cache_ttl_secs = config.cache_ttl.map(|t| t.as_secs()),
            max_retries = config.max_retries,
            authenticated = config.credentials.is_some(),
            "Provider client initialized"
        );

        let cache = ResponseCache::new(config.cache_ttl, Arc::new(SystemClock));
        let executor = RequestExecutor::new(
            api,
            transport,
            cache,
            config.retry_policy(),
            config.call_timeout,
        )
        .with_credentials(config.credentials)
        .with_base_url(config.base_url);

        Self {
            operations,
            executor,
            cache_ttl: config.cache_ttl,
        }
    }

    /// Replaces the cache clock; cached entries are dropped
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.executor = self
            .executor
            .with_cache(ResponseCache::new(self.cache_ttl, clock));
        self
    }

    pub fn with_signer(mut self, signer: Arc<dyn Signer>) -> Self {
        self.executor = self.executor.with_signer(signer);
        self
    }

    pub fn provider_name(&self) -> &'static str {
        self.executor.api().provider_name()
    }

    /// Names of every operation, sorted
    pub fn operations(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.operations.keys().copied().collect();
        names.sort_unstable();
        names
    }

    pub fn descriptor(&self, name: &str) -> Option<&'static EndpointDescriptor> {
        self.operations.get(name).copied()
    }

    /// Resolves and checks a call without touching the network
    ///
    /// Unknown names are reported first, then argument problems, then
    /// missing credentials.
    pub fn prepare(&self, name: &str, args: Arguments) -> Result<CallContext, ClientError> {
        let endpoint = self
            .descriptor(name)
            .ok_or_else(|| ClientError::unknown_operation(self.provider_name(), name))?;

        endpoint.validate(&args)?;

        if endpoint.auth_required {
            let secret_needed = self.executor.signer().requires_secret(endpoint);
            match self.executor.credentials() {
                Some(credentials) if !secret_needed || credentials.secret().is_some() => {}
                _ => return Err(ClientError::missing_credentials(endpoint.name)),
            }
        }

        Ok(CallContext { endpoint, args })
    }

    /// Prepares and executes a call
    pub async fn execute(
        &self,
        name: &str,
        args: Arguments,
        cache_use: CacheUse,
    ) -> Result<ApiResponse, ClientError> {
        let call = self.prepare(name, args)?;
        self.executor.execute(&call, cache_use).await
    }

    pub fn cache(&self) -> &ResponseCache {
        self.executor.cache()
    }
}
