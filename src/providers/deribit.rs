//! Deribit v2 JSON-RPC over HTTP
//!
//! Every operation is a GET. `/private/*` methods are signed with the
//! `deri-hmac-sha256` Authorization scheme.

use crate::{
    constants::DERIBIT_API_URL,
    endpoint::{EndpointDescriptor as E, Parameter as P},
    error::ClientError,
    provider::ApiProvider,
    request::RequestSpec,
    signer::{hmac_sha256_hex, require_secret, Signer},
    types::Credentials,
};
use std::sync::Arc;
use uuid::Uuid;

/// Private method that changes account state
const fn action(endpoint: E) -> E {
    endpoint.private().uncached()
}

const CURRENCY: &[P] = &[P::query("currency")];
const INSTRUMENT: &[P] = &[P::query("instrument_name")];
const SUBACCOUNT: &[P] = &[P::query("sid")];
const ORDER: &[P] = &[P::query("instrument_name"), P::query("amount")];

const ENDPOINTS: &[E] = &[
    // Authentication
    E::get("auth_GET", "/public/auth").uncached(),
    // Supporting
    E::get("get_time_GET", "/public/get_time").uncached(),
    E::get("test_GET", "/public/test"),
    // Account management
    E::get("get_announcements_GET", "/public/get_announcements"),
    action(E::get("change_subaccount_name_GET", "/private/change_subaccount_name"))
        .params(&[P::query("sid"), P::query("name")]),
    action(E::get("create_subaccount_GET", "/private/create_subaccount")),
    action(E::get(
        "disable_tfa_for_subaccount_GET",
        "/private/disable_tfa_for_subaccount",
    ))
    .params(SUBACCOUNT),
    E::get("get_account_summary_GET", "/private/get_account_summary")
        .private()
        .params(CURRENCY),
    E::get("get_email_language_GET", "/private/get_email_language").private(),
    E::get("get_new_announcements_GET", "/private/get_new_announcements").private(),
    E::get("get_position_GET", "/private/get_position")
        .private()
        .params(INSTRUMENT),
    E::get("get_positions_GET", "/private/get_positions")
        .private()
        .params(CURRENCY),
    E::get("get_subaccounts_GET", "/private/get_subaccounts").private(),
    action(E::get(
        "set_announcement_as_read_GET",
        "/private/set_announcement_as_read",
    ))
    .params(&[P::query("announcement_id")]),
    action(E::get(
        "set_email_for_subaccount_GET",
        "/private/set_email_for_subaccount",
    ))
    .params(&[P::query("sid"), P::query("email")]),
    action(E::get("set_email_language_GET", "/private/set_email_language"))
        .params(&[P::query("language")]),
    action(E::get(
        "set_password_for_subaccount_GET",
        "/private/set_password_for_subaccount",
    ))
    .params(&[P::query("sid"), P::query("password")]),
    action(E::get(
        "toggle_notifications_from_subaccount_GET",
        "/private/toggle_notifications_from_subaccount",
    ))
    .params(&[P::query("sid"), P::query("state")]),
    action(E::get(
        "toggle_subaccount_login_GET",
        "/private/toggle_subaccount_login",
    ))
    .params(&[P::query("sid"), P::query("state")]),
    // Trading
    action(E::get("order_buy_GET", "/private/buy")).params(ORDER),
    action(E::get("order_sell_GET", "/private/sell")).params(ORDER),
    action(E::get("order_edit_GET", "/private/edit"))
        .params(&[P::query("order_id"), P::query("amount"), P::query("price")]),
    action(E::get("order_cancel_GET", "/private/cancel")).params(&[P::query("order_id")]),
    action(E::get("order_cancel_all_GET", "/private/cancel_all")),
    action(E::get(
        "order_cancel_all_by_currency_GET",
        "/private/cancel_all_by_currency",
    ))
    .params(CURRENCY),
    action(E::get(
        "order_cancel_all_by_instrument_GET",
        "/private/cancel_all_by_instrument",
    ))
    .params(INSTRUMENT),
    action(E::get("close_position_GET", "/private/close_position"))
        .params(&[P::query("instrument_name"), P::query("type")]),
    E::get("get_margins_GET", "/private/get_margins").private().params(ORDER),
    E::get(
        "get_open_orders_by_currency_GET",
        "/private/get_open_orders_by_currency",
    )
    .private()
    .uncached()
    .params(CURRENCY),
    E::get(
        "get_open_orders_by_instrument_GET",
        "/private/get_open_orders_by_instrument",
    )
    .private()
    .uncached()
    .params(INSTRUMENT),
    E::get(
        "get_order_history_by_currency_GET",
        "/private/get_order_history_by_currency",
    )
    .private()
    .params(CURRENCY),
    E::get(
        "get_order_history_by_instrument_GET",
        "/private/get_order_history_by_instrument",
    )
    .private()
    .params(INSTRUMENT),
    E::get("get_order_margin_by_ids_GET", "/private/get_order_margin_by_ids")
        .private()
        .params(&[P::query("ids")]),
    E::get("get_order_state_GET", "/private/get_order_state")
        .private()
        .uncached()
        .params(&[P::query("order_id")]),
    E::get(
        "get_user_trades_by_currency_GET",
        "/private/get_user_trades_by_currency",
    )
    .private()
    .params(CURRENCY),
    E::get(
        "get_user_trades_by_currency_and_time_GET",
        "/private/get_user_trades_by_currency_and_time",
    )
    .private()
    .params(&[
        P::query("currency"),
        P::query("start_timestamp"),
        P::query("end_timestamp"),
    ]),
    E::get(
        "get_user_trades_by_instrument_GET",
        "/private/get_user_trades_by_instrument",
    )
    .private()
    .params(INSTRUMENT),
    E::get(
        "get_user_trades_by_instrument_and_time_GET",
        "/private/get_user_trades_by_instrument_and_time",
    )
    .private()
    .params(&[
        P::query("instrument_name"),
        P::query("start_timestamp"),
        P::query("end_timestamp"),
    ]),
    E::get("get_user_trades_by_order_GET", "/private/get_user_trades_by_order")
        .private()
        .params(&[P::query("order_id")]),
    E::get(
        "get_settlement_history_by_instrument_GET",
        "/private/get_settlement_history_by_instrument",
    )
    .private()
    .params(INSTRUMENT),
    E::get(
        "get_settlement_history_by_currency_GET",
        "/private/get_settlement_history_by_currency",
    )
    .private()
    .params(CURRENCY),
    // Market data
    E::get(
        "get_book_summary_by_currency_GET",
        "/public/get_book_summary_by_currency",
    )
    .params(CURRENCY),
    E::get(
        "get_book_summary_by_instrument_GET",
        "/public/get_book_summary_by_instrument",
    )
    .params(INSTRUMENT),
    E::get("get_contract_size_GET", "/public/get_contract_size").params(INSTRUMENT),
    E::get("get_currencies_GET", "/public/get_currencies"),
    E::get("get_funding_chart_data_GET", "/public/get_funding_chart_data").params(INSTRUMENT),
    E::get(
        "get_historical_volatility_GET",
        "/public/get_historical_volatility",
    )
    .params(CURRENCY),
    E::get("get_index_GET", "/public/get_index").params(CURRENCY),
    E::get("get_instruments_GET", "/public/get_instruments").params(&[
        P::query("currency"),
        P::optional_query("expired").default_value("false"),
    ]),
    E::get(
        "get_last_settlements_by_currency_GET",
        "/public/get_last_settlements_by_currency",
    )
    .params(CURRENCY),
    E::get(
        "get_last_settlements_by_instrument_GET",
        "/public/get_last_settlements_by_instrument",
    )
    .params(INSTRUMENT),
    E::get(
        "get_last_trades_by_currency_GET",
        "/public/get_last_trades_by_currency",
    )
    .params(CURRENCY),
    E::get(
        "get_last_trades_by_currency_and_time_GET",
        "/public/get_last_trades_by_currency_and_time",
    )
    .params(&[
        P::query("currency"),
        P::query("start_timestamp"),
        P::query("end_timestamp"),
    ]),
    E::get(
        "get_last_trades_by_instrument_GET",
        "/public/get_last_trades_by_instrument",
    )
    .params(INSTRUMENT),
    E::get(
        "get_last_trades_by_instrument_and_time_GET",
        "/public/get_last_trades_by_instrument_and_time",
    )
    .params(&[
        P::query("instrument_name"),
        P::query("start_timestamp"),
        P::query("end_timestamp"),
    ]),
    E::get("get_order_book_GET", "/public/get_order_book").params(&[
        P::query("instrument_name"),
        P::optional_query("depth"),
    ]),
    E::get("get_trade_volumes_GET", "/public/get_trade_volumes"),
    E::get("ticker_GET", "/public/ticker").params(INSTRUMENT),
    // Wallet
    action(E::get(
        "wallet_cancel_transfer_by_id_GET",
        "/private/cancel_transfer_by_id",
    ))
    .params(&[P::query("currency"), P::query("id")]),
    action(E::get("wallet_cancel_withdrawal_GET", "/private/cancel_withdrawal"))
        .params(&[P::query("currency"), P::query("id")]),
    action(E::get(
        "wallet_create_deposit_address_GET",
        "/private/create_deposit_address",
    ))
    .params(CURRENCY),
    E::get(
        "wallet_get_current_deposit_address_GET",
        "/private/get_current_deposit_address",
    )
    .private()
    .params(CURRENCY),
    E::get("wallet_get_deposits_GET", "/private/get_deposits")
        .private()
        .params(CURRENCY),
    E::get("wallet_get_transfers_GET", "/private/get_transfers")
        .private()
        .params(CURRENCY),
    E::get("wallet_get_withdrawals_GET", "/private/get_withdrawals")
        .private()
        .params(CURRENCY),
    action(E::get("wallet_withdraw_GET", "/private/withdraw")).params(&[
        P::query("currency"),
        P::query("address"),
        P::query("amount"),
    ]),
];

/// `deri-hmac-sha256` Authorization header
pub struct DeribitSigner;

impl DeribitSigner {
    /// Signs with an explicit millisecond timestamp and nonce
    pub fn sign_at(
        &self,
        endpoint: &E,
        mut request: RequestSpec,
        credentials: &Credentials,
        timestamp_ms: i64,
        nonce: &str,
    ) -> Result<RequestSpec, ClientError> {
        let secret = require_secret(endpoint, credentials)?;
        let message = format!(
            "{}\n{}\n{}\n{}\n{}\n",
            timestamp_ms,
            nonce,
            request.method,
            request.path_and_query(),
            request.body_text()
        );
        let signature = hmac_sha256_hex(secret, &message)?;

        request.set_header(
            "Authorization",
            format!(
                "deri-hmac-sha256 id={},ts={},nonce={},sig={}",
                credentials.api_key, timestamp_ms, nonce, signature
            ),
        );
        Ok(request)
    }
}

impl Signer for DeribitSigner {
    fn sign(
        &self,
        endpoint: &E,
        request: RequestSpec,
        credentials: &Credentials,
    ) -> Result<RequestSpec, ClientError> {
        let timestamp_ms = chrono::Utc::now().timestamp_millis();
        let nonce = Uuid::new_v4().simple().to_string();
        self.sign_at(endpoint, request, credentials, timestamp_ms, &nonce)
    }
}

/// Deribit provider; point `base_url` at the testnet constant for sandbox use
pub struct DeribitApi;

impl ApiProvider for DeribitApi {
    fn provider_name(&self) -> &'static str {
        "Deribit"
    }

    fn endpoints(&self) -> &'static [E] {
        ENDPOINTS
    }

    fn base_url(&self, _endpoint: &E) -> &'static str {
        DERIBIT_API_URL
    }

    fn signer(&self) -> Arc<dyn Signer> {
        Arc::new(DeribitSigner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::HttpMethod;
    use reqwest::Url;

    #[test]
    fn test_private_prefix_matches_auth_flag() {
        for e in ENDPOINTS {
            assert_eq!(e.path.starts_with("/private/"), e.auth_required, "{}", e.name);
        }
    }

    #[test]
    fn test_authorization_header() {
        let endpoint = ENDPOINTS
            .iter()
            .find(|e| e.name == "get_account_summary_GET")
            .unwrap();
        let mut request = RequestSpec::new(
            HttpMethod::GET,
            Url::parse("https://www.deribit.com/api/v2/private/get_account_summary").unwrap(),
        );
        request.append_query("currency", "BTC");

        let signed = DeribitSigner
            .sign_at(
                endpoint,
                request,
                &Credentials::new("client", "secret"),
                1_600_000_000_000,
                "abcd",
            )
            .unwrap();

        let sig = hmac_sha256_hex(
            "secret",
            "1600000000000\nabcd\nGET\n/api/v2/private/get_account_summary?currency=BTC\n\n",
        )
        .unwrap();
        assert_eq!(
            signed.header("Authorization").unwrap(),
            format!(
                "deri-hmac-sha256 id=client,ts=1600000000000,nonce=abcd,sig={}",
                sig
            )
        );
    }
}
