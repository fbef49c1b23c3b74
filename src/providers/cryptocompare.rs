//! CryptoCompare min-api
//!
//! Keys are optional. When configured they are attached to every call as
//! `authorization: Apikey <key>`, which raises the account's rate limits.

use crate::{
    constants::CRYPTOCOMPARE_API_URL,
    endpoint::{EndpointDescriptor as E, Parameter as P},
    provider::ApiProvider,
    signer::{ApiKeyHeader, Signer},
};
use std::sync::Arc;

const FSYM_TSYM: &[P] = &[P::query("fsym"), P::query("tsym")];
const FSYM_TSYMS: &[P] = &[P::query("fsym"), P::query("tsyms")];
const FSYMS_TSYMS: &[P] = &[P::query("fsyms"), P::query("tsyms")];
const TSYM: &[P] = &[P::query("tsym")];
const FSYM: &[P] = &[P::query("fsym")];

const ENDPOINTS: &[E] = &[
    // Price
    E::get("price_GET", "/data/price").params(FSYM_TSYMS),
    E::get("price_multi_GET", "/data/pricemulti").params(FSYMS_TSYMS),
    E::get("price_multi_full_GET", "/data/pricemultifull").params(FSYMS_TSYMS),
    E::get("generate_custom_average_GET", "/data/generateAvg").params(&[
        P::query("fsym"),
        P::query("tsym"),
        P::query("e"),
    ]),
    // Historical
    E::get("historical_daily_ohlcv_GET", "/data/histoday").params(FSYM_TSYM),
    E::get("historical_hourly_ohlcv_GET", "/data/histohour").params(FSYM_TSYM),
    E::get("historical_minute_ohlcv_GET", "/data/histominute").params(FSYM_TSYM),
    E::get("historical_daily_ohlcv_timestamp_GET", "/data/pricehistorical").params(FSYM_TSYMS),
    E::get("historical_daily_average_price_GET", "/data/dayAvg").params(FSYM_TSYM),
    E::get("historical_daily_exchange_volume_GET", "/data/exchange/histoday").params(TSYM),
    E::get("historical_hourly_exchange_volume_GET", "/data/exchange/histohour").params(TSYM),
    // Toplists
    E::get("toplist_24h_volume_full_GET", "/data/top/totalvolfull").params(TSYM),
    E::get("toplist_market_cap_full_GET", "/data/top/mktcapfull").params(TSYM),
    E::get("toplist_exchanges_volume_pair_GET", "/data/top/exchanges").params(FSYM_TSYM),
    E::get("toplist_exchanges_full_pair_GET", "/data/top/exchanges/full").params(FSYM_TSYM),
    E::get("toplist_pair_volume_GET", "/data/top/volumes").params(TSYM),
    E::get("toplist_trading_pairs_GET", "/data/top/pairs").params(FSYM),
    // Social data
    E::get("social_stats_latest_GET", "/data/social/coin/latest"),
    E::get("social_stats_historical_daily_GET", "/data/social/coin/histo/day"),
    E::get("social_stats_historical_hourly_GET", "/data/social/coin/histo/hour"),
    // News
    E::get("news_latest_articles_GET", "/data/v2/news/")
        .params(&[P::optional_query("lang").default_value("EN")]),
    E::get("news_feed_list_GET", "/data/news/feeds"),
    E::get("news_article_categories_GET", "/data/news/categories"),
    E::get("news_feeds_and_categories_GET", "/data/news/feedsandcategories"),
    // Orderbook
    E::get("orderbook_exchanges_list_GET", "/data/ob/l2/exchanges"),
    E::get("orderbook_l2_snapshot_GET", "/data/ob/l2/snapshot"),
    // General info; rate-limit reports are live counters
    E::get("rate_limit_GET", "/stats/rate/limit").uncached(),
    E::get("rate_limit_hour_GET", "/stats/rate/hour/limit").uncached(),
    E::get("list_exchanges_and_trading_pairs_GET", "/data/v2/all/exchanges"),
    E::get("instrument_constituent_exchanges_GET", "/data/all/includedexchanges"),
    E::get("list_coins_GET", "/data/all/coinlist"),
    E::get("info_exchanges_GET", "/data/exchanges/general"),
    E::get("info_wallets_GET", "/data/wallets/general"),
    E::get("info_crypto_cards_GET", "/data/cards/general"),
    E::get("info_mining_contracts_GET", "/data/mining/contracts/general"),
    E::get("info_mining_equipment_GET", "/data/mining/equipment/general"),
    E::get("info_mining_pools_GET", "/data/mining/pools/general"),
    E::get("list_pair_remapping_events_GET", "/data/pair/re-mapping"),
    // Streaming
    E::get("toplist_24h_volume_subscriptions_GET", "/data/top/totalvol").params(TSYM),
    E::get("toplist_market_cap_subscriptions_GET", "/data/top/mktcap").params(TSYM),
    E::get("subs_by_pair_GET", "/data/subs").params(FSYM),
    E::get("subs_watchlist_GET", "/data/subsWatchlist").params(&[
        P::query("fsyms"),
        P::query("tsym"),
    ]),
    E::get("info_coins_GET", "/data/coin/generalinfo").params(&[
        P::query("fsyms"),
        P::query("tsym"),
    ]),
];

/// CryptoCompare provider
pub struct CryptoCompareApi;

impl ApiProvider for CryptoCompareApi {
    fn provider_name(&self) -> &'static str {
        "CryptoCompare"
    }

    fn endpoints(&self) -> &'static [E] {
        ENDPOINTS
    }

    fn base_url(&self, _endpoint: &E) -> &'static str {
        CRYPTOCOMPARE_API_URL
    }

    fn signer(&self) -> Arc<dyn Signer> {
        Arc::new(ApiKeyHeader::new("authorization", "Apikey "))
    }
}
