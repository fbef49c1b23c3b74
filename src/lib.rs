//! # cryptowrapper
//!
//! Uniform access to the raw REST endpoints of CoinMarketCap, CryptoCompare,
//! BitMEX, Binance, Binance DEX, Bitfinex and Deribit.
//!
//! Every provider is a static table of endpoint descriptors. Operations are
//! invoked by name with a map of arguments and return the provider's JSON
//! payload untouched, plus a `cached` flag and whatever rate-limit headers the
//! provider reported. Calls are signed per provider, retried with exponential
//! backoff on transient failures, and (in blocking mode) served from a
//! per-client TTL cache.
//!
//! ## Usage
//!
//! ```no_run
//! use cryptowrapper::{Arguments, BlockingClient, ClientConfig, Provider};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = BlockingClient::new(ClientConfig::new(Provider::Binance))?;
//!
//! let klines = client.invoke(
//!     "klines_GET",
//!     Arguments::new().with("symbol", "BTCUSDT").with("interval", "1h"),
//! )?;
//! println!("cached: {}, body: {}", klines.cached, klines.body);
//! # Ok(())
//! # }
//! ```
//!
//! In async code use [`AsyncClient`]; its calls bypass the cache:
//!
//! ```no_run
//! use cryptowrapper::{Arguments, AsyncClient, ClientConfig, Provider};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = AsyncClient::new(ClientConfig::new(Provider::Deribit))?;
//! let ticker = client
//!     .call("ticker_GET", Arguments::new().with("instrument_name", "BTC-PERPETUAL"))
//!     .await?;
//! println!("{}", ticker.annotated());
//! # Ok(())
//! # }
//! ```
//!
//! The library emits `tracing` events and installs no subscriber.

pub mod cache;
pub mod config;
pub mod constants;
pub mod endpoint;
pub mod error;
pub mod execution;
pub mod executor;
pub mod facade;
pub mod provider;
pub mod providers;
pub mod request;
pub mod retry;
pub mod signer;
pub mod transport;
pub mod types;

// Re-export commonly used types
pub use cache::{Clock, ManualClock, SystemClock};
pub use config::ClientConfig;
pub use endpoint::{EndpointDescriptor, ParamLocation, Parameter};
pub use error::{ClientError, FailureKind, TransportError};
pub use execution::{AsyncClient, BlockingClient, CallHandle};
pub use facade::ProviderFacade;
pub use provider::{ApiProvider, Provider};
pub use signer::Signer;
pub use transport::{HttpTransport, Transport};
pub use types::{ApiResponse, Arguments, Credentials, HttpMethod, RateLimit};
