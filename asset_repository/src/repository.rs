//! The repository contract every price-history backend implements.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use market_data_provider::providers::ProviderError;
use snafu::Snafu;

use crate::snapshot::SnapshotStream;

/// Start date [`Repository::get`] asks for: 2000-01-01T00:00:00Z.
///
/// Stands in for "all available history"; providers with older or newer data
/// decide for themselves what an earlier or later start means.
pub fn default_history_start() -> DateTime<Utc> {
    DateTime::from_timestamp(946_684_800, 0).unwrap_or_default()
}

/// Errors returned by [`Repository`] operations.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum RepositoryError {
    /// The backend cannot perform this operation at all. Permanent; do not retry.
    #[snafu(display("{operation} is not supported by this repository"))]
    Unsupported {
        /// Name of the rejected operation.
        operation: &'static str,
    },

    /// The underlying provider call failed. The original error is kept as the source.
    #[snafu(display("Provider error: {source}"), context(false))]
    Provider {
        /// What the provider reported.
        #[snafu(backtrace)]
        source: ProviderError,
    },
}

impl RepositoryError {
    /// True for the permanent "backend cannot do this" signal.
    pub fn is_unsupported(&self) -> bool {
        matches!(self, RepositoryError::Unsupported { .. })
    }
}

/// Uniform access to historical snapshots of named assets.
///
/// Every method performs at most one request against its backend and fails
/// before returning a stream, never while it is consumed.
#[async_trait]
pub trait Repository: Send + Sync {
    /// Names of all assets in the repository.
    async fn assets(&self) -> Result<Vec<String>, RepositoryError>;

    /// Full available history of `name`, i.e. everything since [`default_history_start`].
    async fn get(&self, name: &str) -> Result<SnapshotStream, RepositoryError> {
        self.get_since(name, default_history_start()).await
    }

    /// Snapshots of `name` dated at or after `date`, oldest first.
    async fn get_since(
        &self,
        name: &str,
        date: DateTime<Utc>,
    ) -> Result<SnapshotStream, RepositoryError>;

    /// Date of the most recent snapshot of `name`, without fetching the history.
    async fn last_date(&self, name: &str) -> Result<DateTime<Utc>, RepositoryError>;

    /// Adds `snapshots` to the history of `name`.
    async fn append(&self, name: &str, snapshots: SnapshotStream) -> Result<(), RepositoryError>;
}
