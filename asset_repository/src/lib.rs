//! Uniform repository access to an asset's historical price snapshots.
//!
//! A [`Repository`](repository::Repository) hands out [`SnapshotStream`](snapshot::SnapshotStream)s
//! of provider-agnostic [`Snapshot`](snapshot::Snapshot)s. [`BarsRepository`](bars::BarsRepository)
//! implements it on top of any [`DataProvider`](market_data_provider::providers::DataProvider),
//! Alpaca Markets by default.
//!
//! ```no_run
//! use asset_repository::{bars::AlpacaBarsRepository, repository::Repository};
//! use market_data_provider::providers::alpaca_rest::Adjustment;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let mut repository = AlpacaBarsRepository::from_env()?;
//! repository.bars_request_template.alpaca_mut().adjustment = Some(Adjustment::Raw);
//!
//! for snapshot in repository.get("AAPL").await? {
//!     println!("{} {}", snapshot.date, snapshot.close);
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod bars;
pub mod config;
pub mod repository;
pub mod snapshot;
pub mod template;
