//! Alpaca Markets historical stock data over the v2 REST API.
//!
//! Two endpoints are used: the paginated multi-symbol bars endpoint
//! (`/v2/stocks/bars`) and the latest-bar endpoint (`/v2/stocks/bars/latest`).

pub mod params;
pub mod provider;
pub mod response;

pub use params::{Adjustment, AlpacaBarsParams, Feed, Sort};
pub use provider::AlpacaProvider;
