#![allow(dead_code)]

use std::{collections::HashMap, sync::Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use market_data_provider::{
    models::{
        bar::{Bar, BarSeries},
        request_params::{BarsRequestParams, LatestBarParams},
    },
    providers::{ApiSnafu, DataProvider, ProviderError, SymbolNotFoundSnafu},
};

pub const ONE_BAR_PAGE: &str = r#"{"bars":{"A":[{"t":"2021-10-15T16:00:00Z","o":3378.14,"h":3380.815,"l":3376.3001,"c":3379.72,"v":211689,"n":5435,"vw":3379.041755}]},"next_page_token":null}"#;

pub const LATEST_BAR: &str = r#"{"bars":{"A":{"t":"2021-10-15T16:00:00Z","o":3378.14,"h":3380.815,"l":3376.3001,"c":3379.72,"v":211689,"n":5435,"vw":3379.041755}}}"#;

/// Requests seen by [`FakeProvider`], in arrival order.
#[derive(Debug, Clone)]
pub enum Call {
    Bars(BarsRequestParams),
    Latest(LatestBarParams),
}

/// In-memory provider. Filters stored bars by the requested window the way
/// a real bars endpoint does and remembers every request.
#[derive(Default)]
pub struct FakeProvider {
    bars: HashMap<String, Vec<Bar>>,
    fail: bool,
    calls: Mutex<Vec<Call>>,
}

impl FakeProvider {
    pub fn with_bars(symbol: &str, bars: Vec<Bar>) -> Self {
        let mut provider = Self::default();
        provider.bars.insert(symbol.to_string(), bars);
        provider
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl DataProvider for FakeProvider {
    async fn fetch_bars(&self, params: BarsRequestParams) -> Result<Vec<BarSeries>, ProviderError> {
        self.record(Call::Bars(params.clone()));
        if self.fail {
            return ApiSnafu {
                status: 500u16,
                message: "boom",
            }
            .fail();
        }

        Ok(params
            .symbols
            .iter()
            .filter_map(|symbol| {
                let bars = self.bars.get(symbol)?;
                let window = bars
                    .iter()
                    .filter(|b| b.timestamp >= params.start)
                    .filter(|b| params.end.is_none_or(|end| b.timestamp < end))
                    .cloned()
                    .collect();
                Some(BarSeries {
                    symbol: symbol.clone(),
                    timeframe: params.timeframe,
                    bars: window,
                })
            })
            .collect())
    }

    async fn fetch_latest_bar(&self, params: LatestBarParams) -> Result<Bar, ProviderError> {
        self.record(Call::Latest(params.clone()));
        if self.fail {
            return ApiSnafu {
                status: 500u16,
                message: "boom",
            }
            .fail();
        }

        self.bars
            .get(&params.symbol)
            .and_then(|bars| bars.last().cloned())
            .ok_or_else(|| {
                SymbolNotFoundSnafu {
                    symbol: params.symbol.clone(),
                }
                .build()
            })
    }
}

pub fn bar_at(timestamp: DateTime<Utc>, close: f64) -> Bar {
    Bar {
        timestamp,
        open: close - 0.5,
        high: close + 1.0,
        low: close - 1.0,
        close,
        volume: 1_000.0,
        trade_count: None,
        vwap: None,
    }
}

/// `count` consecutive daily bars starting 2020-01-01.
pub fn daily_bars(count: usize) -> Vec<Bar> {
    let first = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
    (0..count)
        .map(|i| bar_at(first + Duration::days(i as i64), 100.0 + i as f64))
        .collect()
}
