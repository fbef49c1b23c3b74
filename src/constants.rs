//! Constants for the crypto API wrapper
//!
//! Defaults for every construction parameter live here, together with the
//! production base URL of each supported provider. Everything can be
//! overridden per client through [`ClientConfig`](crate::config::ClientConfig).

/// How long successful responses stay cached (in seconds)
pub const DEFAULT_CACHE_TTL_SECS: u64 = 120;

/// Number of additional attempts after a retryable failure
pub const DEFAULT_MAX_RETRIES: u32 = 0;

/// HTTP request timeout for a single attempt (in seconds)
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Upper bound for one logical call, all attempts included (in seconds)
pub const CALL_TIMEOUT_SECS: u64 = 60;

/// Initial backoff delay for retries (in milliseconds)
pub const INITIAL_BACKOFF_MS: u64 = 1000;

/// Maximum backoff delay for retries (in milliseconds)
pub const MAX_BACKOFF_MS: u64 = 30000;

/// Statuses answered once and never retried
pub const NON_RETRYABLE_STATUSES: &[u16] = &[400, 401, 403, 404, 429, 500];

/// Cache size above which expired entries are swept on insertion
pub const CACHE_SWEEP_THRESHOLD: usize = 1024;

/// User agent for HTTP requests
pub const USER_AGENT: &str = "cryptowrapper/0.1.0";

/// Prefix of the environment variables read by `ClientConfig::from_env`
pub const ENV_PREFIX: &str = "CRYPTOWRAPPER";

/// CoinMarketCap API base URL
pub const COINMARKETCAP_API_URL: &str = "https://pro-api.coinmarketcap.com/v1";

/// CryptoCompare API base URL
pub const CRYPTOCOMPARE_API_URL: &str = "https://min-api.cryptocompare.com";

/// BitMEX mainnet API base URL
pub const BITMEX_API_URL: &str = "https://www.bitmex.com/api/v1";

/// BitMEX testnet API base URL
pub const BITMEX_TESTNET_API_URL: &str = "https://testnet.bitmex.com/api/v1";

/// Binance API base URL
pub const BINANCE_API_URL: &str = "https://api.binance.com";

/// Binance DEX (Binance Chain) API base URL
pub const BINANCE_DEX_API_URL: &str = "https://testnet-dex.binance.org";

/// Bitfinex public API base URL
pub const BITFINEX_PUBLIC_API_URL: &str = "https://api-pub.bitfinex.com";

/// Bitfinex authenticated API base URL
pub const BITFINEX_AUTH_API_URL: &str = "https://api.bitfinex.com";

/// Deribit mainnet API base URL
pub const DERIBIT_API_URL: &str = "https://www.deribit.com/api/v2";

/// Deribit testnet API base URL
pub const DERIBIT_TESTNET_API_URL: &str = "https://test.deribit.com/api/v2";

/// Lifetime of a BitMEX signature (in seconds)
pub const BITMEX_SIGNATURE_EXPIRY_SECS: i64 = 5;
