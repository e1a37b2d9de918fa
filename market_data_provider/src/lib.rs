//! Provider-side plumbing for historical market data.
//!
//! [`models`] holds the vendor-agnostic request and bar types, [`providers`]
//! the [`DataProvider`](providers::DataProvider) trait and its Alpaca REST
//! implementation.

pub mod models;
pub mod providers;
