//! Provider abstraction: descriptor tables, hosts, signing and rate limits

use crate::{
    constants::{BITMEX_TESTNET_API_URL, DERIBIT_TESTNET_API_URL},
    endpoint::EndpointDescriptor,
    error::ClientError,
    providers::{
        BinanceApi, BinanceDexApi, BitfinexApi, BitmexApi, CoinMarketCapApi, CryptoCompareApi,
        DeribitApi,
    },
    request::TransportResponse,
    signer::Signer,
    types::RateLimit,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Supported APIs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Provider {
    CoinMarketCap,
    CryptoCompare,
    BitMex,
    Binance,
    BinanceDex,
    Bitfinex,
    Deribit,
}

impl Provider {
    /// Get the provider identifier
    pub fn name(&self) -> &'static str {
        match self {
            Provider::CoinMarketCap => "CMC",
            Provider::CryptoCompare => "CryptoCompare",
            Provider::BitMex => "BitMEX",
            Provider::Binance => "Binance",
            Provider::BinanceDex => "BinanceDEX",
            Provider::Bitfinex => "Bitfinex",
            Provider::Deribit => "Deribit",
        }
    }

    /// Get all supported providers
    pub fn all() -> &'static [Provider] {
        &[
            Provider::CoinMarketCap,
            Provider::CryptoCompare,
            Provider::BitMex,
            Provider::Binance,
            Provider::BinanceDex,
            Provider::Bitfinex,
            Provider::Deribit,
        ]
    }

    /// Sandbox base URL, for providers that run one
    pub fn testnet_url(&self) -> Option<&'static str> {
        match self {
            Provider::BitMex => Some(BITMEX_TESTNET_API_URL),
            Provider::Deribit => Some(DERIBIT_TESTNET_API_URL),
            _ => None,
        }
    }

    /// Get the implementation behind this provider
    pub fn api(&self) -> Arc<dyn ApiProvider> {
        match self {
            Provider::CoinMarketCap => Arc::new(CoinMarketCapApi),
            Provider::CryptoCompare => Arc::new(CryptoCompareApi),
            Provider::BitMex => Arc::new(BitmexApi),
            Provider::Binance => Arc::new(BinanceApi),
            Provider::BinanceDex => Arc::new(BinanceDexApi),
            Provider::Bitfinex => Arc::new(BitfinexApi),
            Provider::Deribit => Arc::new(DeribitApi),
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Provider {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cmc" | "coinmarketcap" => Ok(Provider::CoinMarketCap),
            "cryptocompare" => Ok(Provider::CryptoCompare),
            "bitmex" => Ok(Provider::BitMex),
            "binance" => Ok(Provider::Binance),
            "binancedex" | "binance_dex" => Ok(Provider::BinanceDex),
            "bitfinex" => Ok(Provider::Bitfinex),
            "deribit" => Ok(Provider::Deribit),
            _ => Err(ClientError::UnsupportedProvider(s.to_string())),
        }
    }
}

/// Everything the core needs to know about one API
///
/// Implementations are stateless; the descriptor table is static data read
/// once when a client is built.
pub trait ApiProvider: Send + Sync {
    /// Returns the name of this provider
    fn provider_name(&self) -> &'static str;

    /// Static descriptor table
    fn endpoints(&self) -> &'static [EndpointDescriptor];

    /// Base URL the endpoint path is appended to
    fn base_url(&self, endpoint: &EndpointDescriptor) -> &'static str;

    /// Headers sent with every request
    fn default_headers(&self) -> &'static [(&'static str, &'static str)] {
        &[("Accept", "application/json")]
    }

    /// Signer invoked for authenticated operations
    fn signer(&self) -> Arc<dyn Signer>;

    /// Extracts rate-limit fields from a successful response
    fn rate_limit(&self, _response: &TransportResponse, _body: &Value) -> Option<RateLimit> {
        None
    }

    /// Reshapes the decoded payload before it is cached and returned
    fn shape_body(&self, body: Value) -> Value {
        body
    }
}

/// Copies the named response headers into a rate-limit map, renaming them
pub fn headers_to_rate_limit(
    response: &TransportResponse,
    fields: &[(&str, &str)],
) -> Option<RateLimit> {
    let map: RateLimit = fields
        .iter()
        .filter_map(|(header, field)| {
            response
                .header(header)
                .map(|v| (field.to_string(), Value::String(v.to_string())))
        })
        .collect();

    if map.is_empty() {
        None
    } else {
        Some(map)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_from_original_identifiers() {
        for provider in Provider::all() {
            assert_eq!(provider.name().parse::<Provider>().unwrap(), *provider);
        }
        assert_eq!("cmc".parse::<Provider>().unwrap(), Provider::CoinMarketCap);
        assert!(matches!(
            "Kraken".parse::<Provider>(),
            Err(ClientError::UnsupportedProvider(_))
        ));
    }

    #[test]
    fn test_testnet_urls() {
        assert_eq!(
            Provider::BitMex.testnet_url(),
            Some("https://testnet.bitmex.com/api/v1")
        );
        assert!(Provider::Deribit.testnet_url().is_some());
        assert!(Provider::Binance.testnet_url().is_none());
    }

    #[test]
    fn test_headers_to_rate_limit() {
        let response = TransportResponse::new(200, "[]")
            .with_header("x-ratelimit-limit", "60")
            .with_header("x-ratelimit-remaining", "59");
        let rate_limit = headers_to_rate_limit(
            &response,
            &[
                ("x-ratelimit-limit", "limit"),
                ("x-ratelimit-remaining", "remaining"),
                ("x-ratelimit-reset", "reset"),
            ],
        )
        .unwrap();
        assert_eq!(rate_limit.len(), 2);
        assert_eq!(rate_limit["limit"], Value::String("60".into()));

        assert!(headers_to_rate_limit(&TransportResponse::new(200, ""), &[("a", "b")]).is_none());
    }
}
