use std::time::Duration;

use cryptowrapper::signer::hmac_sha256_hex;
use cryptowrapper::{
    Arguments, AsyncClient, BlockingClient, ClientConfig, ClientError, Credentials, FailureKind,
    Provider,
};
use serde_json::json;
use wiremock::matchers::{body_json, header, header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config(provider: Provider, server: &MockServer) -> ClientConfig {
    ClientConfig::new(provider)
        .with_base_url(server.uri())
        .with_retry_delays(Duration::from_millis(10), Duration::from_millis(50))
}

#[test]
fn blocking_client_caches_within_ttl() {
    // The mock server needs a runtime of its own; the client brings one too.
    let rt = tokio::runtime::Runtime::new().expect("runtime");
    let server = rt.block_on(MockServer::start());
    rt.block_on(
        Mock::given(method("GET"))
            .and(path("/api/v1/klines"))
            .and(query_param("symbol", "BTCUSDT"))
            .and(query_param("interval", "1h"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([[1, "0.1"]])))
            .expect(1)
            .mount(&server),
    );

    let client = BlockingClient::new(config(Provider::Binance, &server)).expect("client");
    let args = Arguments::new()
        .with("symbol", "BTCUSDT")
        .with("interval", "1h");

    let first = client.invoke("klines_GET", args.clone()).expect("first");
    let second = client.invoke("klines_GET", args).expect("second");

    assert!(!first.cached);
    assert!(second.cached);
    assert_eq!(first.body, second.body);
    // Array items that are not objects carry no flag.
    assert_eq!(second.annotated(), json!([[1, "0.1"]]));

    rt.block_on(server.verify());
}

#[tokio::test]
async fn async_client_never_caches() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/public/test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": {"version": "1"}})))
        .expect(2)
        .mount(&server)
        .await;

    let client = AsyncClient::new(config(Provider::Deribit, &server)).expect("client");
    let first = client.call("test_GET", Arguments::new()).await.expect("first");
    let second = client.call("test_GET", Arguments::new()).await.expect("second");

    assert!(!first.cached);
    assert!(!second.cached);
    assert_eq!(second.annotated()["cached"], json!(false));
}

#[tokio::test]
async fn bitmex_order_is_signed_and_reports_rate_limit() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/order"))
        .and(header("api-key", "key"))
        .and(header_exists("api-expires"))
        .and(header_exists("api-signature"))
        .and(body_json(json!({"symbol": "XBTUSD", "orderQty": 1})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"orderID": "abc"}))
                .insert_header("x-ratelimit-limit", "60")
                .insert_header("x-ratelimit-remaining", "59")
                .insert_header("x-ratelimit-reset", "1600000000"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = AsyncClient::new(
        config(Provider::BitMex, &server).with_credentials(Credentials::new("key", "secret")),
    )
    .expect("client");

    let response = client
        .call(
            "order_POST",
            Arguments::new().with("symbol", "XBTUSD").with("orderQty", 1),
        )
        .await
        .expect("order");

    assert_eq!(
        response.annotated(),
        json!({
            "orderID": "abc",
            "cached": false,
            "ratelimit": {"limit": "60", "remaining": "59", "reset": "1600000000"}
        })
    );
}

#[tokio::test]
async fn binance_signed_call_carries_timestamp_and_signature() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/account"))
        .and(header("X-MBX-APIKEY", "key"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"balances": []}))
                .insert_header("x-mbx-used-weight-1m", "10"),
        )
        .mount(&server)
        .await;

    let client = AsyncClient::new(
        config(Provider::Binance, &server).with_credentials(Credentials::new("key", "secret")),
    )
    .expect("client");

    let response = client
        .call("account_GET", Arguments::new().with("recvWindow", 5000))
        .await
        .expect("account");
    assert_eq!(
        response.rate_limit.expect("rate limit")["x-mbx-used-weight-1m"],
        json!("10")
    );

    let requests = server.received_requests().await.expect("recording");
    assert_eq!(requests.len(), 1);
    let query = requests[0].url.query().expect("query");
    let (unsigned, signature) = query.rsplit_once("&signature=").expect("signature");
    assert!(unsigned.starts_with("recvWindow=5000&timestamp="));
    assert_eq!(signature, hmac_sha256_hex("secret", unsigned).expect("hmac"));
}

#[tokio::test]
async fn bitfinex_private_payload_is_wrapped() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v2/auth/r/wallets"))
        .and(header("bfx-apikey", "key"))
        .and(header_exists("bfx-nonce"))
        .and(header_exists("bfx-signature"))
        .and(body_json(json!({})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([["exchange", "USD", 10.5]])),
        )
        .mount(&server)
        .await;

    let client = AsyncClient::new(
        config(Provider::Bitfinex, &server).with_credentials(Credentials::new("key", "secret")),
    )
    .expect("client");

    let response = client
        .call("wallets_POST", Arguments::new())
        .await
        .expect("wallets");
    assert_eq!(
        response.annotated(),
        json!({"response": [["exchange", "USD", 10.5]], "cached": false})
    );
}

#[tokio::test]
async fn non_retryable_status_is_attempted_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/ping"))
        .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
        .expect(1)
        .mount(&server)
        .await;

    let client = AsyncClient::new(config(Provider::Binance, &server).with_max_retries(3))
        .expect("client");
    let err = client
        .call("ping_GET", Arguments::new())
        .await
        .expect_err("429");

    match err {
        ClientError::NonRetryableResponse { status, body } => {
            assert_eq!(status, 429);
            assert_eq!(body, "slow down");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn server_errors_are_retried_until_success() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/platform/status"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v2/platform/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([1])))
        .expect(1)
        .mount(&server)
        .await;

    let client = AsyncClient::new(config(Provider::Bitfinex, &server).with_max_retries(2))
        .expect("client");
    let response = client
        .call("platform_status_GET", Arguments::new())
        .await
        .expect("status");
    assert_eq!(response.body, json!({"response": [1]}));
}

#[tokio::test]
async fn slow_responses_exhaust_retries() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/time"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"serverTime": 1}))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let client = AsyncClient::new(
        config(Provider::BinanceDex, &server)
            .with_request_timeout(Duration::from_millis(200))
            .with_max_retries(1),
    )
    .expect("client");
    let err = client
        .call("time_GET", Arguments::new())
        .await
        .expect_err("timeout");

    assert!(matches!(
        err,
        ClientError::ExecutionFailed {
            attempts: 2,
            last: FailureKind::Timeout
        }
    ));
}

#[tokio::test]
async fn call_timeout_bounds_all_attempts() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/time"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;

    let client = AsyncClient::new(
        config(Provider::BinanceDex, &server).with_call_timeout(Duration::from_millis(300)),
    )
    .expect("client");
    let err = client
        .call("time_GET", Arguments::new())
        .await
        .expect_err("timeout");

    assert!(matches!(err, ClientError::Timeout { .. }));
}
