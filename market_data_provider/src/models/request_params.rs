use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{models::{asset::AssetClass, timeframe::TimeFrame}, providers::alpaca_rest::AlpacaBarsParams};

/// Universal parameters for requesting time-series bar data from any market data provider.
///
/// This struct is designed to be vendor-agnostic and supports multiple asset classes
/// (e.g., stocks, futures, crypto). It is the standard input for all
/// [`DataProvider`](crate::providers::DataProvider) implementations.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BarsRequestParams {
    /// List of symbols to request (e.g., `["AAPL"]`, `["ESU24"]`, `["BTC-USD"]`).
    pub symbols: Vec<String>,

    /// The time interval for each bar (e.g., 1 minute, 1 day).
    ///
    /// **Validation of allowed values is performed by each data provider implementation,
    /// according to their own API rules.**
    pub timeframe: TimeFrame,

    /// Start of the requested time range (inclusive, UTC).
    ///
    /// Providers should return bars starting at or after this timestamp.
    pub start: DateTime<Utc>,

    /// End of the requested time range (exclusive, UTC).
    ///
    /// `None` leaves the end open, i.e. up to the most recent bar the provider has.
    #[serde(default)]
    pub end: Option<DateTime<Utc>>,

    /// The asset class for the requested symbols (e.g., `UsEquity`, `Futures`).
    ///
    /// This helps providers route the request to the correct API or endpoint.
    #[serde(default)]
    pub asset_class: AssetClass,

    /// Optional, provider-specific parameters.
    #[serde(default)]
    pub provider_specific: ProviderParams,
}

/// Parameters for asking a provider for the single most recent bar of a symbol.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LatestBarParams {
    pub symbol: String,

    #[serde(default)]
    pub asset_class: AssetClass,

    /// Provider-specific options. Only the ones meaningful for a latest-bar
    /// query (e.g. Alpaca's feed and currency) are honoured.
    #[serde(default)]
    pub provider_specific: ProviderParams,
}

/// An enum to hold provider-specific request parameters.
///
/// This allows callers to specify detailed, per-request options for a
/// particular provider without cluttering the universal `BarsRequestParams`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum ProviderParams {
    #[default]
    None,
    Alpaca(AlpacaBarsParams),
}

impl ProviderParams {
    /// Returns the Alpaca options, if any were set.
    pub fn alpaca(&self) -> Option<&AlpacaBarsParams> {
        match self {
            ProviderParams::Alpaca(p) => Some(p),
            ProviderParams::None => None,
        }
    }

    /// Returns the Alpaca options, switching `None` to an empty Alpaca set first.
    pub fn alpaca_mut(&mut self) -> &mut AlpacaBarsParams {
        if let ProviderParams::None = self {
            *self = ProviderParams::Alpaca(AlpacaBarsParams::default());
        }
        match self {
            ProviderParams::Alpaca(p) => p,
            ProviderParams::None => unreachable!("switched to Alpaca above"),
        }
    }
}
