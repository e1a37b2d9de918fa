use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use snafu::ensure;

use crate::{
    models::{
        asset::AssetClass,
        request_params::{BarsRequestParams, LatestBarParams},
        timeframe::{TimeFrame, TimeFrameUnit},
    },
    providers::{ProviderError, ValidationSnafu},
};

/// Specifies the corporate action adjustment for stock data.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Adjustment {
    #[default]
    Raw,
    Split,
    Dividend,
    All,
}

impl Adjustment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Adjustment::Raw => "raw",
            Adjustment::Split => "split",
            Adjustment::Dividend => "dividend",
            Adjustment::All => "all",
        }
    }
}

/// Specifies the source feed for stock data.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Feed {
    #[default]
    Sip,
    Iex,
    Otc,
}

impl Feed {
    pub fn as_str(&self) -> &'static str {
        match self {
            Feed::Sip => "sip",
            Feed::Iex => "iex",
            Feed::Otc => "otc",
        }
    }
}

/// Specifies the sort order for the bars.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Sort {
    #[default]
    Asc,
    Desc,
}

impl Sort {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sort::Asc => "asc",
            Sort::Desc => "desc",
        }
    }
}

/// Alpaca-specific parameters for a bars request.
///
/// Unset fields are left out of the query so Alpaca's own defaults apply.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Default)]
pub struct AlpacaBarsParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adjustment: Option<Adjustment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feed: Option<Feed>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    /// Page size. Pagination is still exhausted, this only changes the number of round trips.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<Sort>,
}

/// Rejects timeframes the bars endpoint does not accept.
pub fn validate_timeframe(timeframe: &TimeFrame) -> Result<(), ProviderError> {
    timeframe.validate().map_err(|e| {
        ValidationSnafu {
            message: e.to_string(),
        }
        .build()
    })
}

/// Alpaca's stock endpoints only serve US equities.
pub fn validate_asset_class(asset_class: AssetClass) -> Result<(), ProviderError> {
    ensure!(
        asset_class == AssetClass::UsEquity,
        ValidationSnafu {
            message: format!("Alpaca stock bars do not support asset class {asset_class:?}"),
        }
    );
    Ok(())
}

/// Renders a timeframe the way Alpaca expects it (`5Min`, `1Hour`, `1Day`, `1Week`, `3Month`).
pub fn format_timeframe(timeframe: &TimeFrame) -> String {
    let unit = match timeframe.unit {
        TimeFrameUnit::Minute => "Min",
        TimeFrameUnit::Hour => "Hour",
        TimeFrameUnit::Day => "Day",
        TimeFrameUnit::Week => "Week",
        TimeFrameUnit::Month => "Month",
    };
    format!("{}{unit}", timeframe.amount)
}

fn format_time(t: &DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Builds the query string for one page of `/v2/stocks/bars`, without the page token.
pub fn construct_params(params: &BarsRequestParams) -> Vec<(String, String)> {
    let mut query = vec![
        ("symbols".to_string(), params.symbols.join(",")),
        ("timeframe".to_string(), format_timeframe(&params.timeframe)),
        ("start".to_string(), format_time(&params.start)),
    ];
    if let Some(end) = &params.end {
        query.push(("end".to_string(), format_time(end)));
    }

    if let Some(alpaca) = params.provider_specific.alpaca() {
        if let Some(adjustment) = alpaca.adjustment {
            query.push(("adjustment".to_string(), adjustment.as_str().to_string()));
        }
        if let Some(feed) = alpaca.feed {
            query.push(("feed".to_string(), feed.as_str().to_string()));
        }
        if let Some(currency) = &alpaca.currency {
            query.push(("currency".to_string(), currency.clone()));
        }
        if let Some(limit) = alpaca.limit {
            query.push(("limit".to_string(), limit.to_string()));
        }
        if let Some(sort) = alpaca.sort {
            query.push(("sort".to_string(), sort.as_str().to_string()));
        }
    }

    query
}

/// Builds the query string for `/v2/stocks/bars/latest`.
///
/// Only feed and currency apply to the latest bar; the rest of the Alpaca options are ignored.
pub fn construct_latest_params(params: &LatestBarParams) -> Vec<(String, String)> {
    let mut query = vec![("symbols".to_string(), params.symbol.clone())];

    if let Some(alpaca) = params.provider_specific.alpaca() {
        if let Some(feed) = alpaca.feed {
            query.push(("feed".to_string(), feed.as_str().to_string()));
        }
        if let Some(currency) = &alpaca.currency {
            query.push(("currency".to_string(), currency.clone()));
        }
    }

    query
}
