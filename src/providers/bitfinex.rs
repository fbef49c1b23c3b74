//! Bitfinex v2 REST API
//!
//! Public calls go to `api-pub.bitfinex.com`, authenticated ones to
//! `api.bitfinex.com`. Authenticated calls are POSTs with a JSON body, signed
//! with HMAC-SHA384 of `/api + path?query + nonce + body`. Bitfinex answers
//! most calls with bare arrays; payloads are wrapped as `{"response": ...}`.

use crate::{
    constants::{BITFINEX_AUTH_API_URL, BITFINEX_PUBLIC_API_URL},
    endpoint::{EndpointDescriptor as E, ParamLocation, Parameter as P},
    error::ClientError,
    provider::ApiProvider,
    request::RequestSpec,
    signer::{hmac_sha384_hex, require_secret, Signer},
    types::Credentials,
};
use serde_json::{json, Value};
use std::sync::Arc;

/// Authenticated read served over POST
const fn read(endpoint: E) -> E {
    endpoint
        .private()
        .read_only()
        .extra_in(ParamLocation::Body)
}

/// Authenticated state change
const fn write(endpoint: E) -> E {
    endpoint.private().extra_in(ParamLocation::Body)
}

const SYMBOL: &[P] = &[P::path("symbol")];
const OPTIONAL_SYMBOL: &[P] = &[P::optional_path("symbol")];
const OPTIONAL_CURRENCY: &[P] = &[P::optional_path("currency")];

const ENDPOINTS: &[E] = &[
    // Public
    E::get("platform_status_GET", "/v2/platform/status").uncached(),
    E::get("tickers_GET", "/v2/tickers").params(&[P::query("symbols")]),
    E::get("ticker_GET", "/v2/ticker/{symbol}").params(SYMBOL),
    E::get("trades_GET", "/v2/trades/{symbol}/hist").params(SYMBOL),
    E::get("orderbook_GET", "/v2/book/{symbol}/{precision}")
        .params(&[P::path("symbol"), P::path("precision")]),
    E::get("stats_GET", "/v2/stats1/{key}:{size}:{symbol}/{section}").params(&[
        P::path("key"),
        P::path("size"),
        P::path("symbol"),
        P::path("section"),
    ]),
    E::get("candles_GET", "/v2/candles/trade:{timeframe}:{symbol}/{section}").params(&[
        P::path("timeframe"),
        P::path("symbol"),
        P::path("section"),
    ]),
    // Calculations
    E::post("foreign_exchange_rate_POST", "/v2/calc/fx")
        .read_only()
        .extra_in(ParamLocation::Body)
        .params(&[P::body("ccy1"), P::body("ccy2")]),
    E::post("market_average_price_POST", "/v2/calc/trade/avg")
        .read_only()
        .params(&[P::query("symbol"), P::query("amount")]),
    // Authenticated
    write(E::post("alert_delete_POST", "/v2/auth/w/alert/price:{symbol}:{price}/del"))
        .params(&[P::path("symbol"), P::path("price")]),
    read(E::post("alert_list_POST", "/v2/auth/r/alerts"))
        .params(&[P::optional_query("type").default_value("price")]),
    write(E::post("alert_set_POST", "/v2/auth/w/alert/set")).params(&[
        P::body("type"),
        P::body("symbol"),
        P::body("price"),
    ]),
    read(E::post(
        "calculate_available_balance_POST",
        "/v2/auth/calc/order/avail",
    ))
    .params(&[P::body("symbol"), P::body("type")]),
    read(E::post("funding_credits_POST", "/v2/auth/r/funding/credits/{symbol}")).params(SYMBOL),
    read(E::post(
        "funding_credits_history_POST",
        "/v2/auth/r/funding/credits{/symbol}/hist",
    ))
    .params(OPTIONAL_SYMBOL),
    read(E::post("funding_info_POST", "/v2/auth/r/info/funding/{symbol}")).params(SYMBOL),
    read(E::post("funding_loans_POST", "/v2/auth/r/funding/loans/{symbol}")).params(SYMBOL),
    read(E::post(
        "funding_loans_history_POST",
        "/v2/auth/r/funding/loans{/symbol}/hist",
    ))
    .params(OPTIONAL_SYMBOL),
    read(E::post("funding_offers_POST", "/v2/auth/r/funding/offers/{symbol}")).params(SYMBOL),
    read(E::post(
        "funding_offers_history_POST",
        "/v2/auth/r/funding/offers{/symbol}/hist",
    ))
    .params(OPTIONAL_SYMBOL),
    read(E::post("funding_trades_POST", "/v2/auth/r/funding/trades{/symbol}/hist"))
        .params(OPTIONAL_SYMBOL),
    read(E::post("ledgers_POST", "/v2/auth/r/ledgers{/currency}/hist")).params(OPTIONAL_CURRENCY),
    read(E::post("margin_info_POST", "/v2/auth/r/info/margin/{key}")).params(&[P::path("key")]),
    read(E::post("order_trades_POST", "/v2/auth/r/order/{symbol}:{order_id}/trades"))
        .params(&[P::path("symbol"), P::path("order_id")]),
    read(E::post("orders_POST", "/v2/auth/r/orders{/symbol}")).params(OPTIONAL_SYMBOL),
    read(E::post("orders_history_POST", "/v2/auth/r/orders{/symbol}/hist"))
        .params(OPTIONAL_SYMBOL),
    read(E::post("performance_POST", "/v2/auth/r/stats/perf::1D/hist")),
    read(E::post("positions_POST", "/v2/auth/r/positions")),
    read(E::post("positions_audit_POST", "/v2/auth/r/positions/audit"))
        .params(&[P::optional_body("id")]),
    read(E::post("positions_history_POST", "/v2/auth/r/positions/hist")),
    read(E::post("trades_POST", "/v2/auth/r/trades{/symbol}/hist")).params(OPTIONAL_SYMBOL),
    read(E::post("user_info_POST", "/v2/auth/r/info/user")),
    write(E::post("user_settings_delete_POST", "/v2/auth/w/settings/del"))
        .params(&[P::body("settings")]),
    read(E::post("user_settings_read_POST", "/v2/auth/r/settings")).params(&[P::body("keys")]),
    write(E::post("user_settings_write_POST", "/v2/auth/w/settings/set"))
        .params(&[P::body("settings")]),
    read(E::post("wallet_movements_POST", "/v2/auth/r/movements{/currency}/hist"))
        .params(OPTIONAL_CURRENCY),
    read(E::post("wallets_POST", "/v2/auth/r/wallets")),
    read(E::post("wallets_history_POST", "/v2/auth/r/wallets/hist"))
        .params(&[P::optional_body("end")]),
];

/// `bfx-nonce` / `bfx-signature` request signing
pub struct BitfinexSigner;

impl BitfinexSigner {
    /// Signs with an explicit nonce (unix microseconds)
    pub fn sign_at(
        &self,
        endpoint: &E,
        mut request: RequestSpec,
        credentials: &Credentials,
        nonce: i64,
    ) -> Result<RequestSpec, ClientError> {
        let secret = require_secret(endpoint, credentials)?;
        let message = format!(
            "/api{}{}{}",
            request.path_and_query(),
            nonce,
            request.body_text()
        );
        let signature = hmac_sha384_hex(secret, &message)?;

        request.set_header("bfx-apikey", credentials.api_key.clone());
        request.set_header("bfx-nonce", nonce.to_string());
        request.set_header("bfx-signature", signature);
        Ok(request)
    }
}

impl Signer for BitfinexSigner {
    fn sign(
        &self,
        endpoint: &E,
        request: RequestSpec,
        credentials: &Credentials,
    ) -> Result<RequestSpec, ClientError> {
        let nonce = chrono::Utc::now().timestamp_micros();
        self.sign_at(endpoint, request, credentials, nonce)
    }
}

/// Bitfinex provider
pub struct BitfinexApi;

impl ApiProvider for BitfinexApi {
    fn provider_name(&self) -> &'static str {
        "Bitfinex"
    }

    fn endpoints(&self) -> &'static [E] {
        ENDPOINTS
    }

    fn base_url(&self, endpoint: &E) -> &'static str {
        if endpoint.auth_required {
            BITFINEX_AUTH_API_URL
        } else {
            BITFINEX_PUBLIC_API_URL
        }
    }

    fn signer(&self) -> Arc<dyn Signer> {
        Arc::new(BitfinexSigner)
    }

    fn shape_body(&self, body: Value) -> Value {
        json!({ "response": body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Arguments, HttpMethod};
    use reqwest::Url;

    fn endpoint(name: &str) -> &'static E {
        ENDPOINTS.iter().find(|e| e.name == name).unwrap()
    }

    #[test]
    fn test_host_routing() {
        assert_eq!(
            BitfinexApi.base_url(endpoint("ticker_GET")),
            "https://api-pub.bitfinex.com"
        );
        assert_eq!(
            BitfinexApi.base_url(endpoint("wallets_POST")),
            "https://api.bitfinex.com"
        );
    }

    #[test]
    fn test_composite_paths() {
        let stats = endpoint("stats_GET");
        let args = Arguments::new()
            .with("key", "pos.size")
            .with("size", "1m")
            .with("symbol", "tBTCUSD")
            .with("section", "hist");
        assert_eq!(
            stats.render_path(&args).unwrap(),
            "/v2/stats1/pos.size:1m:tBTCUSD/hist"
        );

        let ledgers = endpoint("ledgers_POST");
        assert_eq!(
            ledgers.render_path(&Arguments::new()).unwrap(),
            "/v2/auth/r/ledgers/hist"
        );
        assert_eq!(
            ledgers
                .render_path(&Arguments::new().with("currency", "BTC"))
                .unwrap(),
            "/v2/auth/r/ledgers/BTC/hist"
        );
    }

    #[test]
    fn test_signature() {
        let mut request = RequestSpec::new(
            HttpMethod::POST,
            Url::parse("https://api.bitfinex.com/v2/auth/r/wallets").unwrap(),
        );
        request.body = Some("{}".to_string());

        let signed = BitfinexSigner
            .sign_at(
                endpoint("wallets_POST"),
                request,
                &Credentials::new("key", "secret"),
                1_600_000_000_000_000,
            )
            .unwrap();

        let expected =
            hmac_sha384_hex("secret", "/api/v2/auth/r/wallets1600000000000000{}").unwrap();
        assert_eq!(signed.header("bfx-apikey"), Some("key"));
        assert_eq!(signed.header("bfx-nonce"), Some("1600000000000000"));
        assert_eq!(signed.header("bfx-signature"), Some(expected.as_str()));
    }

    #[test]
    fn test_reads_are_cacheable_writes_are_not() {
        assert!(endpoint("wallets_POST").cacheable);
        assert!(endpoint("foreign_exchange_rate_POST").cacheable);
        assert!(!endpoint("alert_set_POST").cacheable);
        assert!(!endpoint("user_settings_write_POST").cacheable);
    }

    #[test]
    fn test_body_wrapped() {
        let shaped = BitfinexApi.shape_body(json!([["tBTCUSD", 1.0]]));
        assert_eq!(shaped, json!({ "response": [["tBTCUSD", 1.0]] }));
    }
}
