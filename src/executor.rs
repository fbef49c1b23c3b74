//! Request executor: cache lookup, request building, signing and retries

use crate::{
    cache::ResponseCache,
    endpoint::{query_text, EndpointDescriptor, ParamLocation},
    error::{ClientError, FailureKind},
    provider::ApiProvider,
    request::{RequestSpec, TransportResponse},
    retry::{is_non_retryable_status, AttemptError, RetryPolicy},
    signer::Signer,
    transport::Transport,
    types::{ApiResponse, Arguments, Credentials},
};
use reqwest::Url;
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{timeout, Instant};

/// Whether an execution may read and fill the response cache
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheUse {
    Enabled,
    Bypass,
}

/// A validated call, ready to execute
#[derive(Debug, Clone)]
pub struct CallContext {
    pub endpoint: &'static EndpointDescriptor,
    pub args: Arguments,
}

/// Runs calls for one provider
pub struct RequestExecutor {
    api: Arc<dyn ApiProvider>,
    signer: Arc<dyn Signer>,
    transport: Arc<dyn Transport>,
    cache: ResponseCache,
    retry: RetryPolicy,
    call_timeout: Duration,
    base_url: Option<String>,
    credentials: Option<Credentials>,
}

impl RequestExecutor {
    pub fn new(
        api: Arc<dyn ApiProvider>,
        transport: Arc<dyn Transport>,
        cache: ResponseCache,
        retry: RetryPolicy,
        call_timeout: Duration,
    ) -> Self {
        Self {
            signer: api.signer(),
            api,
            transport,
            cache,
            retry,
            call_timeout,
            base_url: None,
            credentials: None,
        }
    }

    pub fn with_credentials(mut self, credentials: Option<Credentials>) -> Self {
        self.credentials = credentials;
        self
    }

    /// Overrides the provider's base URL for every endpoint
    pub fn with_base_url(mut self, base_url: Option<String>) -> Self {
        self.base_url = base_url;
        self
    }

    pub fn with_signer(mut self, signer: Arc<dyn Signer>) -> Self {
        self.signer = signer;
        self
    }

    pub fn with_cache(mut self, cache: ResponseCache) -> Self {
        self.cache = cache;
        self
    }

    pub fn api(&self) -> &Arc<dyn ApiProvider> {
        &self.api
    }

    pub fn signer(&self) -> &Arc<dyn Signer> {
        &self.signer
    }

    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    /// True when the signer runs for this endpoint
    pub fn signs(&self, endpoint: &EndpointDescriptor) -> bool {
        endpoint.auth_required
            || (self.credentials.is_some() && self.signer.signs_public_requests())
    }

    /// Executes a validated call
    pub async fn execute(
        &self,
        call: &CallContext,
        cache_use: CacheUse,
    ) -> Result<ApiResponse, ClientError> {
        let endpoint = call.endpoint;
        let provider = self.api.provider_name();
        let use_cache =
            cache_use == CacheUse::Enabled && endpoint.cacheable && self.cache.is_enabled();
        let fingerprint = endpoint.fingerprint(&call.args);

        if use_cache {
            if let Some(body) = self.cache.get(&fingerprint) {
                tracing::debug!(
                    provider = provider,
                    operation = endpoint.name,
                    fingerprint = %fingerprint,
                    "Cache hit"
                );
                return Ok(ApiResponse::new(body, true, None));
            }
            tracing::debug!(
                provider = provider,
                operation = endpoint.name,
                fingerprint = %fingerprint,
                "Cache miss"
            );
        }

        let request = self.build_request(endpoint, &call.args)?;
        let sign = self.signs(endpoint);
        let started = Instant::now();

        let attempts = self.retry.run(endpoint.name, |attempt| {
            let request = request.clone();
            async move { self.attempt(endpoint, request, sign, attempt).await }
        });
        let (response, body) = match timeout(self.call_timeout, attempts).await {
            Ok(result) => result?,
            Err(_) => {
                let elapsed = started.elapsed();
                tracing::warn!(
                    provider = provider,
                    operation = endpoint.name,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Call timed out"
                );
                return Err(ClientError::Timeout { elapsed });
            }
        };

        let body = self.api.shape_body(body);
        let rate_limit = self.api.rate_limit(&response, &body);
        if use_cache {
            self.cache.put(fingerprint, &body);
        }

        Ok(ApiResponse::new(body, false, rate_limit))
    }

    async fn attempt(
        &self,
        endpoint: &EndpointDescriptor,
        mut request: RequestSpec,
        sign: bool,
        attempt: u32,
    ) -> Result<(TransportResponse, Value), AttemptError> {
        if sign {
            let credentials = self
                .credentials
                .as_ref()
                .ok_or_else(|| AttemptError::Fatal(ClientError::missing_credentials(endpoint.name)))?;
            request = self
                .signer
                .sign(endpoint, request, credentials)
                .map_err(AttemptError::Fatal)?;
        }

        tracing::info!(
            provider = self.api.provider_name(),
            operation = endpoint.name,
            method = %request.method,
            url = %request.redacted_url(),
            attempt = attempt,
            "Sending request"
        );

        let response = self
            .transport
            .send(request)
            .await
            .map_err(|e| AttemptError::Retryable(FailureKind::from(e)))?;

        if !response.is_success() {
            if is_non_retryable_status(response.status) {
                return Err(AttemptError::Fatal(ClientError::NonRetryableResponse {
                    status: response.status,
                    body: response.body,
                }));
            }
            return Err(AttemptError::Retryable(FailureKind::Status(response.status)));
        }

        let body = parse_body(&response.body)
            .map_err(|e| AttemptError::Retryable(FailureKind::MalformedBody(e.to_string())))?;

        Ok((response, body))
    }

    /// Builds the unsigned request for a validated call
    pub fn build_request(
        &self,
        endpoint: &EndpointDescriptor,
        args: &Arguments,
    ) -> Result<RequestSpec, ClientError> {
        let base = self
            .base_url
            .as_deref()
            .unwrap_or_else(|| self.api.base_url(endpoint));
        let path = endpoint.render_path(args)?;
        let url = Url::parse(&format!("{}{}", base.trim_end_matches('/'), path))
            .map_err(|e| ClientError::config(format!("invalid URL for {}: {}", endpoint.name, e)))?;

        let mut request = RequestSpec::new(endpoint.method, url);
        for (name, value) in self.api.default_headers() {
            request.set_header(name, *value);
        }

        let mut body = Map::new();
        let mut raw_body = None;
        for (name, value) in args.iter() {
            if value.is_null() {
                continue;
            }
            match endpoint.location_of(name) {
                ParamLocation::Path => {}
                ParamLocation::Query => {
                    if let Some(text) = query_text(value) {
                        request.append_query(name, &text);
                    }
                }
                ParamLocation::Body => {
                    body.insert(name.clone(), value.clone());
                }
                ParamLocation::RawBody => {
                    raw_body = value.as_str().map(str::to_string);
                }
            }
        }

        if let Some(raw) = raw_body {
            request.set_header("Content-Type", "text/plain");
            request.body = Some(raw);
        } else if takes_json_body(endpoint) {
            request.set_header("Content-Type", "application/json");
            request.body = Some(Value::Object(body).to_string());
        }

        Ok(request)
    }
}

fn takes_json_body(endpoint: &EndpointDescriptor) -> bool {
    endpoint.extra_location == ParamLocation::Body
        || endpoint
            .parameters
            .iter()
            .any(|p| p.location == ParamLocation::Body)
}

/// Decodes a 2xx body; an empty body is `null`
fn parse_body(text: &str) -> Result<Value, serde_json::Error> {
    if text.trim().is_empty() {
        Ok(Value::Null)
    } else {
        serde_json::from_str(text)
    }
}
