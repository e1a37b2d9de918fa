mod common;

use chrono::{TimeZone, Utc};
use common::{LATEST_BAR, ONE_BAR_PAGE, provider_for};
use market_data_provider::{
    models::{
        asset::AssetClass,
        request_params::{BarsRequestParams, LatestBarParams, ProviderParams},
        timeframe::TimeFrame,
    },
    providers::{
        DataProvider, ProviderError, ProviderInitError,
        alpaca_rest::{Adjustment, AlpacaBarsParams, AlpacaProvider, Feed},
    },
};
use serial_test::serial;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{header, method, path, query_param, query_param_is_missing},
};

fn bars_params(symbol: &str) -> BarsRequestParams {
    BarsRequestParams {
        symbols: vec![symbol.to_string()],
        timeframe: TimeFrame::day(),
        start: Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap(),
        end: None,
        asset_class: AssetClass::UsEquity,
        provider_specific: ProviderParams::None,
    }
}

fn latest_params(symbol: &str) -> LatestBarParams {
    LatestBarParams {
        symbol: symbol.to_string(),
        asset_class: AssetClass::UsEquity,
        provider_specific: ProviderParams::None,
    }
}

#[tokio::test]
async fn fetch_bars_sends_credentials_and_decodes_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/stocks/bars"))
        .and(header("APCA-API-KEY-ID", "key"))
        .and(header("APCA-API-SECRET-KEY", "secret"))
        .and(query_param("symbols", "A"))
        .and(query_param("timeframe", "1Day"))
        .and(query_param("start", "2000-01-01T00:00:00Z"))
        .respond_with(ResponseTemplate::new(200).set_body_string(ONE_BAR_PAGE))
        .expect(1)
        .mount(&server)
        .await;

    let series = provider_for(&server)
        .fetch_bars(bars_params("A"))
        .await
        .expect("fetch_bars");

    assert_eq!(series.len(), 1);
    assert_eq!(series[0].symbol, "A");
    assert_eq!(series[0].timeframe, TimeFrame::day());

    let bar = &series[0].bars[0];
    assert_eq!(bar.timestamp, Utc.with_ymd_and_hms(2021, 10, 15, 16, 0, 0).unwrap());
    assert_eq!(bar.open, 3378.14);
    assert_eq!(bar.high, 3380.815);
    assert_eq!(bar.low, 3376.3001);
    assert_eq!(bar.close, 3379.72);
    assert_eq!(bar.volume, 211689.0);
    assert_eq!(bar.trade_count, Some(5435));
}

#[tokio::test]
async fn fetch_bars_follows_page_tokens_in_order() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/stocks/bars"))
        .and(query_param_is_missing("page_token"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{"bars":{"A":[{"t":"2024-01-02T05:00:00Z","o":1,"h":2,"l":0.5,"c":1.5,"v":10}]},"next_page_token":"p2"}"#,
        ))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v2/stocks/bars"))
        .and(query_param("page_token", "p2"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{"bars":{"A":[{"t":"2024-01-03T05:00:00Z","o":1.5,"h":3,"l":1,"c":2.5,"v":20}]},"next_page_token":null}"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    let series = provider_for(&server)
        .fetch_bars(bars_params("A"))
        .await
        .expect("fetch_bars");

    let bars = &series[0].bars;
    assert_eq!(bars.len(), 2);
    assert!(bars[0].timestamp < bars[1].timestamp);
    assert_eq!(bars[1].volume, 20.0);
}

#[tokio::test]
async fn fetch_bars_stops_on_repeated_page_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/stocks/bars"))
        .and(query_param_is_missing("page_token"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{"bars":{"A":[{"t":"2024-01-02T05:00:00Z","o":1,"h":2,"l":0.5,"c":1.5,"v":10}]},"next_page_token":"p2"}"#,
        ))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v2/stocks/bars"))
        .and(query_param("page_token", "p2"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{"bars":{"A":[]},"next_page_token":"p2"}"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    let err = provider_for(&server)
        .fetch_bars(bars_params("A"))
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::RepeatedPageToken { ref token, .. } if token == "p2"));
}

#[tokio::test]
async fn fetch_bars_forwards_alpaca_options() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/stocks/bars"))
        .and(query_param("adjustment", "split"))
        .and(query_param("feed", "iex"))
        .and(query_param("currency", "USD"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(r#"{"bars":{},"next_page_token":null}"#),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut params = bars_params("A");
    params.provider_specific = ProviderParams::Alpaca(AlpacaBarsParams {
        adjustment: Some(Adjustment::Split),
        feed: Some(Feed::Iex),
        currency: Some("USD".to_string()),
        ..Default::default()
    });

    let series = provider_for(&server).fetch_bars(params).await.expect("fetch_bars");
    assert!(series.is_empty());
}

#[tokio::test]
async fn fetch_bars_fails_on_empty_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let err = provider_for(&server)
        .fetch_bars(bars_params("A"))
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::Reqwest { .. }), "got {err:?}");
}

#[tokio::test]
async fn fetch_bars_surfaces_api_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403).set_body_string(r#"{"message":"forbidden"}"#))
        .mount(&server)
        .await;

    let err = provider_for(&server)
        .fetch_bars(bars_params("A"))
        .await
        .unwrap_err();
    match err {
        ProviderError::Api { status, message, .. } => {
            assert_eq!(status, 403);
            assert!(message.contains("forbidden"));
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn fetch_bars_rejects_invalid_timeframe_without_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(ONE_BAR_PAGE))
        .expect(0)
        .mount(&server)
        .await;

    let mut params = bars_params("A");
    params.timeframe = TimeFrame::minutes(75);

    let err = provider_for(&server).fetch_bars(params).await.unwrap_err();
    assert!(matches!(err, ProviderError::Validation { .. }));
}

#[tokio::test]
async fn fetch_latest_bar_uses_latest_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/stocks/bars/latest"))
        .and(query_param("symbols", "A"))
        .respond_with(ResponseTemplate::new(200).set_body_string(LATEST_BAR))
        .expect(1)
        .mount(&server)
        .await;

    let bar = provider_for(&server)
        .fetch_latest_bar(latest_params("A"))
        .await
        .expect("latest bar");
    assert_eq!(bar.timestamp, Utc.with_ymd_and_hms(2021, 10, 15, 16, 0, 0).unwrap());
}

#[tokio::test]
async fn fetch_latest_bar_missing_symbol() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/stocks/bars/latest"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"bars":{}}"#))
        .mount(&server)
        .await;

    let err = provider_for(&server)
        .fetch_latest_bar(latest_params("ZZZZ"))
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::SymbolNotFound { ref symbol, .. } if symbol == "ZZZZ"));
}

#[tokio::test]
async fn fetch_latest_bar_matches_symbol_case_insensitively() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/stocks/bars/latest"))
        .and(query_param("symbols", "aapl"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(LATEST_BAR.replace("\"A\"", "\"AAPL\"")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let bar = provider_for(&server)
        .fetch_latest_bar(latest_params("aapl"))
        .await
        .expect("latest bar");
    assert_eq!(bar.close, 3379.72);
}

#[tokio::test]
async fn fetch_latest_bar_fails_on_empty_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    assert!(
        provider_for(&server)
            .fetch_latest_bar(latest_params("A"))
            .await
            .is_err()
    );
}

#[test]
#[serial]
fn new_requires_environment_credentials() {
    // SAFETY: serialized with other env-mutating tests.
    unsafe {
        std::env::remove_var("APCA_API_KEY_ID");
        std::env::remove_var("APCA_API_SECRET_KEY");
    }

    let err = AlpacaProvider::new().err().expect("missing credentials must fail");
    assert!(matches!(err, ProviderInitError::MissingEnvVar { .. }));
    assert!(err.to_string().contains("APCA_API_KEY_ID"));
}

#[test]
#[serial]
fn new_reads_environment_credentials() {
    // SAFETY: serialized with other env-mutating tests.
    unsafe {
        std::env::set_var("APCA_API_KEY_ID", "key");
        std::env::set_var("APCA_API_SECRET_KEY", "secret");
    }

    let provider = AlpacaProvider::new().expect("provider from env");
    assert_eq!(provider.base_url(), "https://data.alpaca.markets");

    unsafe {
        std::env::remove_var("APCA_API_KEY_ID");
        std::env::remove_var("APCA_API_SECRET_KEY");
    }
}

#[tokio::test]
#[serial]
#[ignore]
async fn test_alpaca_provider_fetch_bars_live() {
    // This test requires APCA_API_KEY_ID and APCA_API_SECRET_KEY to be set in the environment.
    if std::env::var("APCA_API_KEY_ID").is_err() || std::env::var("APCA_API_SECRET_KEY").is_err() {
        println!("Skipping test_alpaca_provider_fetch_bars_live: API keys not set.");
        return;
    }

    let provider = AlpacaProvider::new().expect("Failed to create AlpacaProvider");

    let mut params = bars_params("AAPL");
    params.start = Utc::now() - chrono::Duration::days(10);
    params.provider_specific = ProviderParams::Alpaca(AlpacaBarsParams {
        feed: Some(Feed::Iex),
        ..Default::default()
    });

    let series = provider.fetch_bars(params).await.expect("fetch_bars");
    let aapl = &series[0];
    assert_eq!(aapl.symbol, "AAPL");
    assert!(aapl.bars.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
}
