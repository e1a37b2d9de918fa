//! Default request parameters shared by every fetch a repository makes.

use chrono::{DateTime, Utc};
use market_data_provider::{
    models::{
        asset::AssetClass,
        request_params::{BarsRequestParams, LatestBarParams, ProviderParams},
        timeframe::TimeFrame,
    },
    providers::alpaca_rest::AlpacaBarsParams,
};
use serde::{Deserialize, Serialize};

use crate::repository::default_history_start;

/// Request defaults a repository applies to every provider call.
///
/// Repositories clone the template per call and only override `start`, so
/// changing it affects later calls and never one already in flight.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BarsRequestTemplate {
    /// Bar granularity, one day unless changed.
    pub timeframe: TimeFrame,
    /// Start of the window. Replaced by the date given to each fetch.
    pub start: DateTime<Utc>,
    /// Exclusive end of the window. `None` fetches up to the latest bar.
    pub end: Option<DateTime<Utc>>,
    /// Asset class the symbols belong to.
    pub asset_class: AssetClass,
    /// Provider-specific knobs such as price adjustment, feed, or currency.
    pub provider_specific: ProviderParams,
}

impl Default for BarsRequestTemplate {
    fn default() -> Self {
        Self {
            timeframe: TimeFrame::day(),
            start: default_history_start(),
            end: None,
            asset_class: AssetClass::UsEquity,
            provider_specific: ProviderParams::None,
        }
    }
}

impl BarsRequestTemplate {
    /// Bars request for a single symbol using this template's values.
    pub fn bars_request(&self, symbol: &str) -> BarsRequestParams {
        BarsRequestParams {
            symbols: vec![symbol.to_string()],
            timeframe: self.timeframe,
            start: self.start,
            end: self.end,
            asset_class: self.asset_class,
            provider_specific: self.provider_specific.clone(),
        }
    }

    /// Latest-bar request for a single symbol. Window and timeframe do not apply.
    pub fn latest_bar_request(&self, symbol: &str) -> LatestBarParams {
        LatestBarParams {
            symbol: symbol.to_string(),
            asset_class: self.asset_class,
            provider_specific: self.provider_specific.clone(),
        }
    }

    /// Alpaca options of the template, created empty on first use.
    pub fn alpaca_mut(&mut self) -> &mut AlpacaBarsParams {
        self.provider_specific.alpaca_mut()
    }
}
