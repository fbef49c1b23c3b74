//! Blocking and non-blocking clients over a [`ProviderFacade`]
//!
//! [`BlockingClient`] drives each call to completion on its own
//! current-thread runtime and uses the response cache. [`AsyncClient`] runs
//! calls on the caller's runtime and never reads or fills the cache, so
//! concurrent calls can't race on shared entries.

use crate::{
    config::ClientConfig,
    error::ClientError,
    executor::CacheUse,
    facade::ProviderFacade,
    types::{ApiResponse, Arguments},
};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::runtime::{Builder, Runtime};
use tokio::task::JoinHandle;

/// Client whose calls block the current thread
///
/// Must not be used from inside an async context; use [`AsyncClient`] there.
pub struct BlockingClient {
    runtime: Runtime,
    facade: ProviderFacade,
}

impl BlockingClient {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        Self::from_facade(ProviderFacade::new(config)?)
    }

    pub fn from_facade(facade: ProviderFacade) -> Result<Self, ClientError> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| ClientError::config(format!("failed to start runtime: {}", e)))?;

        Ok(Self { runtime, facade })
    }

    /// Invokes `name` and waits for its result
    pub fn invoke(&self, name: &str, args: Arguments) -> Result<ApiResponse, ClientError> {
        self.runtime
            .block_on(self.facade.execute(name, args, CacheUse::Enabled))
    }

    pub fn operations(&self) -> Vec<&'static str> {
        self.facade.operations()
    }

    pub fn facade(&self) -> &ProviderFacade {
        &self.facade
    }
}

/// Client for concurrent use from async code; cheap to clone
#[derive(Clone)]
pub struct AsyncClient {
    facade: Arc<ProviderFacade>,
}

impl AsyncClient {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        Ok(Self::from_facade(ProviderFacade::new(config)?))
    }

    pub fn from_facade(facade: ProviderFacade) -> Self {
        Self {
            facade: Arc::new(facade),
        }
    }

    /// Invokes `name`, resolving when the call completes
    pub async fn call(&self, name: &str, args: Arguments) -> Result<ApiResponse, ClientError> {
        self.facade.execute(name, args, CacheUse::Bypass).await
    }

    /// Starts `name` on the runtime and returns a handle to its result
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(&self, name: &str, args: Arguments) -> CallHandle {
        let facade = self.facade.clone();
        let name = name.to_string();
        let handle =
            tokio::spawn(async move { facade.execute(&name, args, CacheUse::Bypass).await });

        CallHandle { handle }
    }

    pub fn operations(&self) -> Vec<&'static str> {
        self.facade.operations()
    }
}

/// Pending result of [`AsyncClient::spawn`]
///
/// Cancelling stops waiting locally; a request already on the wire may still
/// reach the provider.
pub struct CallHandle {
    handle: JoinHandle<Result<ApiResponse, ClientError>>,
}

impl CallHandle {
    pub fn cancel(&self) {
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Future for CallHandle {
    type Output = Result<ApiResponse, ClientError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.handle).poll(cx) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(Ok(result)) => Poll::Ready(result),
            Poll::Ready(Err(e)) if e.is_cancelled() => Poll::Ready(Err(ClientError::Cancelled)),
            Poll::Ready(Err(e)) => std::panic::resume_unwind(e.into_panic()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureKind;
    use crate::provider::mock::MockProvider;
    use crate::provider::Provider;
    use crate::transport::mock::{MockReply, MockTransport};
    use futures::future::join_all;
    use std::time::Duration;

    fn facade(transport: &MockTransport, config: ClientConfig) -> ProviderFacade {
        ProviderFacade::with_api(config, Arc::new(MockProvider), Arc::new(transport.clone()))
    }

    fn config() -> ClientConfig {
        ClientConfig::new(Provider::Binance).with_cache_ttl(Some(Duration::from_secs(10)))
    }

    #[test]
    fn test_blocking_uses_cache() {
        let transport = MockTransport::always(MockReply::status(200, r#"{"serverTime":1}"#));
        let client = BlockingClient::from_facade(facade(&transport, config())).unwrap();

        let first = client.invoke("ping_GET", Arguments::new()).unwrap();
        let second = client.invoke("ping_GET", Arguments::new()).unwrap();

        assert!(!first.cached);
        assert!(second.cached);
        assert_eq!(first.body, second.body);
        assert_eq!(transport.call_count(), 1);
    }

    #[test]
    fn test_blocking_surfaces_errors() {
        let transport = MockTransport::always(MockReply::Timeout);
        let client = BlockingClient::from_facade(facade(&transport, config())).unwrap();

        let err = client.invoke("ping_GET", Arguments::new()).unwrap_err();
        assert!(matches!(
            err,
            ClientError::ExecutionFailed {
                attempts: 1,
                last: FailureKind::Timeout
            }
        ));
    }

    #[tokio::test]
    async fn test_async_bypasses_cache() {
        let transport = MockTransport::new();
        let client = AsyncClient::from_facade(facade(&transport, config()));

        let first = client.call("ping_GET", Arguments::new()).await.unwrap();
        let second = client.call("ping_GET", Arguments::new()).await.unwrap();

        assert!(!first.cached);
        assert!(!second.cached);
        assert_eq!(transport.call_count(), 2);
    }

    #[tokio::test]
    async fn test_spawned_calls_resolve_independently() {
        let transport = MockTransport::new();
        let client = AsyncClient::from_facade(facade(&transport, config()));

        let handles: Vec<CallHandle> = ["BTCUSDT", "ETHUSDT", "BNBUSDT"]
            .iter()
            .map(|symbol| {
                client.spawn(
                    "klines_GET",
                    Arguments::new().with("symbol", *symbol).with("interval", "1d"),
                )
            })
            .collect();

        let results = join_all(handles).await;
        assert!(results.iter().all(|r| r.is_ok()));
        assert_eq!(transport.call_count(), 3);
    }

    #[tokio::test]
    async fn test_spawn_reports_local_errors() {
        let transport = MockTransport::new();
        let client = AsyncClient::from_facade(facade(&transport, config()));

        let err = client
            .spawn("balance_GET", Arguments::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::MissingCredentials { .. }));
        assert_eq!(transport.call_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel() {
        let transport = MockTransport::always(MockReply::status(503, ""));
        let client = AsyncClient::from_facade(facade(
            &transport,
            config().with_max_retries(5),
        ));

        let handle = client.spawn("ping_GET", Arguments::new());
        tokio::task::yield_now().await;
        handle.cancel();

        assert!(matches!(handle.await, Err(ClientError::Cancelled)));
    }
}
