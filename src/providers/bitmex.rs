//! BitMEX REST API
//!
//! Private calls carry `api-key`, `api-expires` and an HMAC-SHA256
//! `api-signature` of `VERB + path?query + expires + body`. Every response
//! reports the account's request allowance in `x-ratelimit-*` headers.

use crate::{
    constants::{BITMEX_API_URL, BITMEX_SIGNATURE_EXPIRY_SECS},
    endpoint::{EndpointDescriptor as E, ParamLocation, Parameter as P},
    error::ClientError,
    provider::{headers_to_rate_limit, ApiProvider},
    request::{RequestSpec, TransportResponse},
    signer::{hmac_sha256_hex, require_secret, Signer},
    types::{Credentials, RateLimit},
};
use serde_json::Value;
use std::sync::Arc;

/// Private endpoint that takes its arguments as a JSON body
const fn write(endpoint: E) -> E {
    endpoint.private().extra_in(ParamLocation::Body)
}

const ENDPOINTS: &[E] = &[
    // Public
    E::get("announcement_GET", "/announcement"),
    E::get("announcement_urgent_GET", "/announcement/urgent"),
    E::get("chat_GET", "/chat"),
    E::get("chat_channels_GET", "/chat/channels"),
    E::get("chat_connected_GET", "/chat/connected"),
    E::get("funding_GET", "/funding"),
    E::get("instrument_GET", "/instrument"),
    E::get("instrument_active_GET", "/instrument/active"),
    E::get("instrument_active_and_indices_GET", "/instrument/activeAndIndices"),
    E::get("instrument_active_intervals_GET", "/instrument/activeIntervals"),
    E::get("instrument_composite_index_GET", "/instrument/compositeIndex"),
    E::get("instrument_indices_GET", "/instrument/indices"),
    E::get("insurance_GET", "/insurance"),
    E::get("leaderboard_GET", "/leaderboard"),
    E::get("liquidation_GET", "/liquidation"),
    E::get("orderbook_l2_GET", "/orderBook/L2").params(&[
        P::query("symbol"),
        P::optional_query("depth").default_value("25"),
    ]),
    E::get("quote_GET", "/quote"),
    E::get("quote_bucketed_GET", "/quote/bucketed"),
    E::get("schema_GET", "/schema"),
    E::get("schema_websocket_help_GET", "/schema/websocketHelp"),
    E::get("settlement_GET", "/settlement"),
    E::get("stats_GET", "/stats"),
    E::get("stats_history_GET", "/stats/history"),
    E::get("stats_history_USD_GET", "/stats/historyUSD"),
    E::get("trade_GET", "/trade"),
    E::get("trade_bucketed_GET", "/trade/bucketed").params(&[
        P::optional_query("binSize").default_value("1m"),
        P::optional_query("partial").default_value("false"),
        P::optional_query("count").default_value("100"),
        P::optional_query("reverse").default_value("false"),
    ]),
    // Private
    E::get("api_key_GET", "/apiKey").private(),
    write(E::post("api_key_POST", "/apiKey")),
    write(E::delete("api_key_DELETE", "/apiKey")),
    write(E::post("api_key_disable_POST", "/apiKey/disable")),
    write(E::post("api_key_enable_POST", "/apiKey/enable")),
    write(E::post("chat_POST", "/chat")).params(&[P::body("message")]),
    E::get("execution_GET", "/execution").private(),
    E::get("execution_trade_history_GET", "/execution/tradeHistory").private(),
    E::get("leaderboard_name_GET", "/leaderboard/name").private(),
    E::get("order_GET", "/order").private(),
    write(E::put("order_PUT", "/order")),
    write(E::post("order_POST", "/order")).params(&[P::body("symbol")]),
    write(E::delete("order_DELETE", "/order")),
    write(E::delete("order_all_DELETE", "/order/all")),
    write(E::put("order_bulk_PUT", "/order/bulk")),
    write(E::post("order_bulk_POST", "/order/bulk")),
    write(E::post("order_cancel_all_after_POST", "/order/cancelAllAfter"))
        .params(&[P::body("timeout")]),
    E::get("position_GET", "/position").private(),
    write(E::post("position_isolate_POST", "/position/isolate")).params(&[P::body("symbol")]),
    write(E::post("position_leverage_POST", "/position/leverage"))
        .params(&[P::body("symbol"), P::body("leverage")]),
    write(E::post("position_risk_limit_POST", "/position/riskLimit"))
        .params(&[P::body("symbol"), P::body("riskLimit")]),
    write(E::post("position_transfer_margin_POST", "/position/transferMargin"))
        .params(&[P::body("symbol"), P::body("amount")]),
    E::get("user_GET", "/user").private(),
    write(E::put("user_PUT", "/user")),
    E::get("user_affiliate_status_GET", "/user/affiliateStatus").private(),
    write(E::post("user_wallet_cancel_withdrawal_POST", "/user/cancelWithdrawal"))
        .params(&[P::body("token")]),
    E::get("user_check_referral_code_GET", "/user/checkReferralCode").private(),
    E::get("user_commission_GET", "/user/commission").private(),
    write(E::post("user_communication_token_POST", "/user/communicationToken")),
    write(E::post("user_confirm_email_POST", "/user/confirmEmail")).params(&[P::body("token")]),
    write(E::post("user_confirm_enable_TFA_POST", "/user/confirmEnableTFA"))
        .params(&[P::body("token")]),
    write(E::post("user_wallet_confirm_withdrawal_POST", "/user/confirmWithdrawal"))
        .params(&[P::body("token")]),
    E::get("user_deposit_address_GET", "/user/depositAddress").private(),
    write(E::post("user_disable_TFA_POST", "/user/disableTFA")).params(&[P::body("token")]),
    E::get("user_execution_history_GET", "/user/executionHistory").private(),
    write(E::post("user_logout_POST", "/user/logout")),
    write(E::post("user_logout_all_POST", "/user/logoutAll")),
    E::get("user_margin_GET", "/user/margin").private(),
    E::get("user_wallet_min_withdrawal_fee_GET", "/user/minWithdrawalFee").private(),
    write(E::post("user_preferences_POST", "/user/preferences")).params(&[P::body("prefs")]),
    write(E::post("user_request_enable_TFA_POST", "/user/requestEnableTFA")),
    write(E::post("user_wallet_request_withdrawal_POST", "/user/requestWithdrawal"))
        .params(&[P::body("currency"), P::body("amount"), P::body("address")]),
    E::get("user_wallet_GET", "/user/wallet").private(),
    E::get("user_wallet_history_GET", "/user/walletHistory").private(),
    E::get("user_wallet_summary_GET", "/user/walletSummary").private(),
    E::get("user_event_GET", "/userEvent").private(),
];

const RATE_LIMIT_HEADERS: &[(&str, &str)] = &[
    ("x-ratelimit-limit", "limit"),
    ("x-ratelimit-remaining", "remaining"),
    ("x-ratelimit-reset", "reset"),
];

/// `api-expires` / `api-signature` request signing
pub struct BitmexSigner;

impl BitmexSigner {
    /// Signs with an explicit expiry (unix seconds)
    pub fn sign_at(
        &self,
        endpoint: &E,
        mut request: RequestSpec,
        credentials: &Credentials,
        expires: i64,
    ) -> Result<RequestSpec, ClientError> {
        let secret = require_secret(endpoint, credentials)?;
        let message = format!(
            "{}{}{}{}",
            request.method,
            request.path_and_query(),
            expires,
            request.body_text()
        );
        let signature = hmac_sha256_hex(secret, &message)?;

        request.set_header("api-key", credentials.api_key.clone());
        request.set_header("api-expires", expires.to_string());
        request.set_header("api-signature", signature);
        Ok(request)
    }
}

impl Signer for BitmexSigner {
    fn sign(
        &self,
        endpoint: &E,
        request: RequestSpec,
        credentials: &Credentials,
    ) -> Result<RequestSpec, ClientError> {
        let expires = chrono::Utc::now().timestamp() + BITMEX_SIGNATURE_EXPIRY_SECS;
        self.sign_at(endpoint, request, credentials, expires)
    }
}

/// BitMEX provider; point `base_url` at the testnet constant for sandbox use
pub struct BitmexApi;

impl ApiProvider for BitmexApi {
    fn provider_name(&self) -> &'static str {
        "BitMEX"
    }

    fn endpoints(&self) -> &'static [E] {
        ENDPOINTS
    }

    fn base_url(&self, _endpoint: &E) -> &'static str {
        BITMEX_API_URL
    }

    fn signer(&self) -> Arc<dyn Signer> {
        Arc::new(BitmexSigner)
    }

    fn rate_limit(&self, response: &TransportResponse, _body: &Value) -> Option<RateLimit> {
        headers_to_rate_limit(response, RATE_LIMIT_HEADERS)
    }
}
