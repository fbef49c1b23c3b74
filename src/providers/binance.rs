//! Binance spot REST API
//!
//! Private calls carry the key in `X-MBX-APIKEY`. Endpoints under `/api/v3`
//! and `/wapi/v3` (except the public price tickers and system status) are also
//! signed: a `timestamp` is added when the caller gave none and the HMAC-SHA256
//! of the query string is appended as `signature`.

use crate::{
    constants::BINANCE_API_URL,
    endpoint::{EndpointDescriptor as E, Parameter as P},
    error::ClientError,
    provider::ApiProvider,
    request::{RequestSpec, TransportResponse},
    signer::{hmac_sha256_hex, require_secret, Signer},
    types::{Credentials, RateLimit},
};
use serde_json::Value;
use std::sync::Arc;

const SYMBOL: &[P] = &[P::query("symbol")];

const ENDPOINTS: &[E] = &[
    // Public (/api/v1)
    E::get("exchange_information_GET", "/api/v1/exchangeInfo"),
    E::get("klines_GET", "/api/v1/klines").params(&[
        P::query("symbol"),
        P::query("interval"),
        P::optional_query("limit").default_value("500"),
    ]),
    E::get("orderbook_GET", "/api/v1/depth").params(&[
        P::query("symbol"),
        P::optional_query("limit").default_value("100"),
    ]),
    E::get("ping_GET", "/api/v1/ping"),
    E::get("time_GET", "/api/v1/time").uncached(),
    E::get("trades_GET", "/api/v1/trades").params(&[
        P::query("symbol"),
        P::optional_query("limit").default_value("500"),
    ]),
    E::get("trades_aggregate_GET", "/api/v1/aggTrades").params(&[
        P::query("symbol"),
        P::optional_query("limit").default_value("500"),
    ]),
    E::get("ticker_24h_GET", "/api/v1/ticker/24hr"),
    // Public (/api/v3)
    E::get("price_GET", "/api/v3/avgPrice").params(SYMBOL),
    E::get("ticker_book_GET", "/api/v3/ticker/bookTicker"),
    E::get("ticker_price_GET", "/api/v3/ticker/price"),
    // Public (/wapi/v3)
    E::get("system_status_GET", "/wapi/v3/systemStatus.html"),
    // Private, key only (/api/v1)
    E::get("trades_history_GET", "/api/v1/historicalTrades")
        .private()
        .params(&[
            P::query("symbol"),
            P::optional_query("limit").default_value("500"),
        ]),
    E::delete("user_data_stream_DELETE", "/api/v1/userDataStream")
        .private()
        .params(&[P::query("listenKey")]),
    E::post("user_data_stream_POST", "/api/v1/userDataStream").private(),
    E::put("user_data_stream_PUT", "/api/v1/userDataStream")
        .private()
        .params(&[P::query("listenKey")]),
    // Private, signed (/api/v3)
    E::get("account_GET", "/api/v3/account").private().uncached(),
    E::get("account_trades_GET", "/api/v3/myTrades").private().params(SYMBOL),
    E::get("order_GET", "/api/v3/order").private().params(SYMBOL),
    E::post("order_POST", "/api/v3/order").private().params(&[
        P::query("symbol"),
        P::query("side"),
        P::query("type"),
    ]),
    E::delete("order_cancel_DELETE", "/api/v3/order").private().params(SYMBOL),
    E::post("order_test_POST", "/api/v3/order/test").private().params(&[
        P::query("symbol"),
        P::query("side"),
        P::query("type"),
    ]),
    E::get("orders_all_GET", "/api/v3/allOrders").private().params(SYMBOL),
    E::get("orders_open_GET", "/api/v3/openOrders").private().uncached(),
    // Private, signed (/wapi/v3)
    E::get("sub_account_list_GET", "/wapi/v3/sub-account/list.html").private(),
    E::post("sub_account_transfer_POST", "/wapi/v3/sub-account/transfer.html")
        .private()
        .params(&[
            P::query("fromEmail"),
            P::query("toEmail"),
            P::query("asset"),
            P::query("amount"),
        ]),
    E::get(
        "sub_account_transfer_history_GET",
        "/wapi/v3/sub-account/transfer/history.html",
    )
    .private()
    .params(&[P::query("email")]),
    E::get(
        "user_account_API_trading_status_GET",
        "/wapi/v3/apiTradingStatus.html",
    )
    .private(),
    E::get("user_account_status_GET", "/wapi/v3/accountStatus.html").private(),
    E::get("user_asset_detail_GET", "/wapi/v3/assetDetail.html").private(),
    E::get("user_dustlog_GET", "/wapi/v3/userAssetDribbletLog.html").private(),
    E::get("user_trade_fee_GET", "/wapi/v3/tradeFee.html").private(),
    E::get("user_wallet_deposit_address_GET", "/wapi/v3/depositAddress.html")
        .private()
        .params(&[P::query("asset")]),
    E::get("user_wallet_deposit_history_GET", "/wapi/v3/depositHistory.html").private(),
    E::post("user_wallet_withdraw_POST", "/wapi/v3/withdraw.html")
        .private()
        .params(&[P::query("asset"), P::query("address"), P::query("amount")]),
    E::get(
        "user_wallet_withdrawal_history_GET",
        "/wapi/v3/withdrawHistory.html",
    )
    .private(),
];

const SIGNED_PREFIXES: &[&str] = &["/api/v3/", "/wapi/v3/"];
const UNSIGNED_PATHS: &[&str] = &[
    "/api/v3/avgPrice",
    "/api/v3/ticker/bookTicker",
    "/api/v3/ticker/price",
    "/wapi/v3/systemStatus.html",
];

const RATE_LIMIT_PREFIXES: &[&str] = &["x-mbx-used-weight", "x-mbx-order-count"];

/// True when the endpoint needs a `signature` query parameter
pub fn is_signed(endpoint: &E) -> bool {
    SIGNED_PREFIXES.iter().any(|p| endpoint.path.starts_with(p))
        && !UNSIGNED_PATHS.contains(&endpoint.path)
}

/// `X-MBX-APIKEY` header plus query signing for v3 endpoints
pub struct BinanceSigner;

impl BinanceSigner {
    /// Signs with an explicit `timestamp` (unix milliseconds)
    pub fn sign_at(
        &self,
        endpoint: &E,
        mut request: RequestSpec,
        credentials: &Credentials,
        timestamp_ms: i64,
    ) -> Result<RequestSpec, ClientError> {
        request.set_header("X-MBX-APIKEY", credentials.api_key.clone());

        if is_signed(endpoint) {
            let secret = require_secret(endpoint, credentials)?;
            if !request.has_query_param("timestamp") {
                request.append_query("timestamp", &timestamp_ms.to_string());
            }
            let signature = hmac_sha256_hex(secret, request.query())?;
            request.append_query("signature", &signature);
        }
        Ok(request)
    }
}

impl Signer for BinanceSigner {
    fn sign(
        &self,
        endpoint: &E,
        request: RequestSpec,
        credentials: &Credentials,
    ) -> Result<RequestSpec, ClientError> {
        let timestamp_ms = chrono::Utc::now().timestamp_millis();
        self.sign_at(endpoint, request, credentials, timestamp_ms)
    }

    fn requires_secret(&self, endpoint: &E) -> bool {
        is_signed(endpoint)
    }
}

/// Binance provider
pub struct BinanceApi;

impl ApiProvider for BinanceApi {
    fn provider_name(&self) -> &'static str {
        "Binance"
    }

    fn endpoints(&self) -> &'static [E] {
        ENDPOINTS
    }

    fn base_url(&self, _endpoint: &E) -> &'static str {
        BINANCE_API_URL
    }

    fn signer(&self) -> Arc<dyn Signer> {
        Arc::new(BinanceSigner)
    }

    /// Used-weight and order-count headers, keyed by their header names
    fn rate_limit(&self, response: &TransportResponse, _body: &Value) -> Option<RateLimit> {
        let map: RateLimit = response
            .headers
            .iter()
            .filter(|(name, _)| RATE_LIMIT_PREFIXES.iter().any(|p| name.starts_with(p)))
            .map(|(name, value)| (name.clone(), Value::String(value.clone())))
            .collect();

        if map.is_empty() {
            None
        } else {
            Some(map)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::HttpMethod;
    use reqwest::Url;

    fn endpoint(name: &str) -> &'static E {
        ENDPOINTS.iter().find(|e| e.name == name).unwrap()
    }

    fn request(path: &str) -> RequestSpec {
        RequestSpec::new(
            HttpMethod::GET,
            Url::parse(&format!("https://api.binance.com{}", path)).unwrap(),
        )
    }

    #[test]
    fn test_signed_endpoint_classification() {
        assert!(is_signed(endpoint("account_GET")));
        assert!(is_signed(endpoint("user_wallet_withdraw_POST")));
        assert!(!is_signed(endpoint("price_GET")));
        assert!(!is_signed(endpoint("system_status_GET")));
        assert!(!is_signed(endpoint("trades_history_GET")));
    }

    #[test]
    fn test_signature_is_hmac_of_query() {
        let mut req = request("/api/v3/order");
        req.append_query("symbol", "LTCBTC");

        let signed = BinanceSigner
            .sign_at(
                endpoint("order_GET"),
                req,
                &Credentials::new("key", "secret"),
                1_499_827_319_559,
            )
            .unwrap();

        let expected =
            hmac_sha256_hex("secret", "symbol=LTCBTC&timestamp=1499827319559").unwrap();
        assert_eq!(signed.header("X-MBX-APIKEY"), Some("key"));
        assert_eq!(
            signed.query(),
            format!("symbol=LTCBTC&timestamp=1499827319559&signature={}", expected)
        );
    }

    #[test]
    fn test_caller_timestamp_is_kept() {
        let mut req = request("/api/v3/account");
        req.append_query("timestamp", "42");

        let signed = BinanceSigner
            .sign_at(endpoint("account_GET"), req, &Credentials::new("k", "s"), 99)
            .unwrap();
        assert!(signed.query().starts_with("timestamp=42&signature="));
    }

    #[test]
    fn test_key_only_endpoint_needs_no_secret() {
        let e = endpoint("trades_history_GET");
        assert!(!BinanceSigner.requires_secret(e));

        let signed = BinanceSigner
            .sign_at(e, request("/api/v1/historicalTrades"), &Credentials::key("k"), 1)
            .unwrap();
        assert_eq!(signed.header("X-MBX-APIKEY"), Some("k"));
        assert!(!signed.has_query_param("signature"));
    }

    #[test]
    fn test_rate_limit_keeps_header_names() {
        let response = TransportResponse::new(200, "{}")
            .with_header("X-MBX-USED-WEIGHT-1M", "12")
            .with_header("x-mbx-order-count-10s", "1")
            .with_header("content-type", "application/json");
        let rate_limit = BinanceApi.rate_limit(&response, &Value::Null).unwrap();
        assert_eq!(rate_limit.len(), 2);
        assert_eq!(rate_limit["x-mbx-used-weight-1m"], "12");
        assert_eq!(rate_limit["x-mbx-order-count-10s"], "1");
    }
}
