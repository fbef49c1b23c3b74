//! CoinMarketCap Pro API
//!
//! Every endpoint needs an API key, sent in the `X-CMC_PRO_API_KEY` header.
//! See <https://coinmarketcap.com/api/documentation/v1>.

use crate::{
    constants::COINMARKETCAP_API_URL,
    endpoint::{EndpointDescriptor as E, Parameter as P},
    provider::ApiProvider,
    signer::{ApiKeyHeader, Signer},
};
use std::sync::Arc;

const ENDPOINTS: &[E] = &[
    // Basic
    E::get("cryptocurrency_info_GET", "/cryptocurrency/info").private(),
    E::get("cryptocurrency_map_GET", "/cryptocurrency/map").private(),
    E::get(
        "cryptocurrency_listings_latest_GET",
        "/cryptocurrency/listings/latest",
    )
    .private()
    .params(&[
        P::optional_query("start").default_value("1"),
        P::optional_query("limit").default_value("100"),
        P::optional_query("convert").default_value("USD"),
    ]),
    E::get(
        "cryptocurrency_quotes_latest_GET",
        "/cryptocurrency/quotes/latest",
    )
    .private()
    .params(&[P::optional_query("convert").default_value("USD")]),
    E::get(
        "global_aggregate_metrics_latest_GET",
        "/global-metrics/quotes/latest",
    )
    .private()
    .params(&[P::optional_query("convert").default_value("USD")]),
    // Hobbyist
    E::get("tools_price_conversion_GET", "/tools/price-conversion")
        .private()
        .params(&[P::query("amount")]),
    // Startup
    E::get("exchange_info_GET", "/exchange/info").private(),
    E::get("exchange_map_GET", "/exchange/map").private(),
    E::get("cryptocurrency_OHLCV_latest_GET", "/cryptocurrency/ohlcv/latest").private(),
    // Standard
    E::get("exchange_listings_latest_GET", "/exchange/listings/latest").private(),
    E::get("exchange_quotes_latest_GET", "/exchange/quotes/latest").private(),
    E::get(
        "cryptocurrency_market_pairs_latest_GET",
        "/cryptocurrency/market-pairs/latest",
    )
    .private(),
    E::get(
        "cryptocurrency_OHLCV_historical_GET",
        "/cryptocurrency/ohlcv/historical",
    )
    .private(),
    E::get(
        "cryptocurrency_quotes_historical_GET",
        "/cryptocurrency/quotes/historical",
    )
    .private(),
    E::get(
        "exchange_market_pairs_latest_GET",
        "/exchange/market-pairs/latest",
    )
    .private(),
    E::get("exchange_quotes_historical_GET", "/exchange/quotes/historical").private(),
    E::get(
        "global_aggregate_metrics_historical_GET",
        "/global-metrics/quotes/historical",
    )
    .private(),
];

/// CoinMarketCap provider
pub struct CoinMarketCapApi;

impl ApiProvider for CoinMarketCapApi {
    fn provider_name(&self) -> &'static str {
        "CMC"
    }

    fn endpoints(&self) -> &'static [E] {
        ENDPOINTS
    }

    fn base_url(&self, _endpoint: &E) -> &'static str {
        COINMARKETCAP_API_URL
    }

    fn signer(&self) -> Arc<dyn Signer> {
        Arc::new(ApiKeyHeader::new("X-CMC_PRO_API_KEY", ""))
    }
}
