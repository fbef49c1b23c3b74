//! Binance Chain (DEX) HTTP API, public only

use crate::{
    constants::BINANCE_DEX_API_URL,
    endpoint::{EndpointDescriptor as E, Parameter as P},
    provider::ApiProvider,
    signer::{NoAuth, Signer},
};
use std::sync::Arc;

const ADDRESS: &[P] = &[P::path("address")];
const HASH: &[P] = &[P::path("hash")];

const ENDPOINTS: &[E] = &[
    E::get("account_GET", "/api/v1/account/{address}").params(ADDRESS),
    E::get("account_sequence_GET", "/api/v1/account/{address}/sequence")
        .params(ADDRESS)
        .uncached(),
    // Signed transaction bytes, hex encoded
    E::post("broadcast_POST", "/api/v1/broadcast").params(&[
        P::raw_body("body"),
        P::optional_query("sync"),
    ]),
    E::get("fees_GET", "/api/v1/fees"),
    E::get("klines_GET", "/api/v1/klines").params(&[
        P::query("symbol"),
        P::query("interval"),
        P::optional_query("limit").default_value("300"),
    ]),
    E::get("markets_GET", "/api/v1/markets").params(&[
        P::optional_query("limit").default_value("500"),
    ]),
    E::get("node_info_GET", "/api/v1/node-info"),
    E::get("orderbook_GET", "/api/v1/depth").params(&[
        P::query("symbol"),
        P::optional_query("limit").default_value("100"),
    ]),
    E::get("orders_closed_GET", "/api/v1/orders/closed").params(&[P::query("address")]),
    E::get("orders_id_GET", "/api/v1/orders/{order_id}").params(&[P::path("order_id")]),
    E::get("orders_open_GET", "/api/v1/orders/open").params(&[P::query("address")]),
    E::get("peers_GET", "/api/v1/peers"),
    E::get("ticker_24h_GET", "/api/v1/ticker/24hr"),
    E::get("time_GET", "/api/v1/time").uncached(),
    E::get("tokens_GET", "/api/v1/tokens"),
    E::get("trades_GET", "/api/v1/trades"),
    E::get("transaction_GET", "/api/v1/tx/{hash}").params(HASH),
    E::get("transaction_json_GET", "/api/v1/tx-json/{hash}").params(HASH),
    E::get("transactions_GET", "/api/v1/transactions").params(&[P::query("address")]),
    E::get("validators_GET", "/api/v1/validators"),
];

/// Binance DEX provider
pub struct BinanceDexApi;

impl ApiProvider for BinanceDexApi {
    fn provider_name(&self) -> &'static str {
        "BinanceDEX"
    }

    fn endpoints(&self) -> &'static [E] {
        ENDPOINTS
    }

    fn base_url(&self, _endpoint: &E) -> &'static str {
        BINANCE_DEX_API_URL
    }

    fn signer(&self) -> Arc<dyn Signer> {
        Arc::new(NoAuth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Arguments;

    #[test]
    fn test_account_paths() {
        let args = Arguments::new().with("address", "tbnb1abc");
        let account = ENDPOINTS.iter().find(|e| e.name == "account_GET").unwrap();
        let sequence = ENDPOINTS
            .iter()
            .find(|e| e.name == "account_sequence_GET")
            .unwrap();
        assert_eq!(account.render_path(&args).unwrap(), "/api/v1/account/tbnb1abc");
        assert_eq!(
            sequence.render_path(&args).unwrap(),
            "/api/v1/account/tbnb1abc/sequence"
        );
    }
}
