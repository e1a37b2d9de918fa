//! [`Repository`] backed by a bar-fetching [`DataProvider`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use market_data_provider::providers::{
    DataProvider, ProviderInitError, alpaca_rest::AlpacaProvider,
};
use secrecy::SecretString;
use tracing::{debug, warn};

use crate::{
    repository::{Repository, RepositoryError, UnsupportedSnafu},
    snapshot::SnapshotStream,
    template::BarsRequestTemplate,
};

/// Read-only repository over a provider's historical bars endpoint.
///
/// Each `get_since` is one provider call: the provider collects every page,
/// and the bars are turned into snapshots lazily as the stream is read.
/// Listing assets and appending are not possible against a remote bars API
/// and fail with [`RepositoryError::Unsupported`].
pub struct BarsRepository<P = AlpacaProvider> {
    provider: P,

    /// Defaults for every bars request. Mutate between calls to change them.
    pub bars_request_template: BarsRequestTemplate,
}

/// Repository reading from Alpaca Markets. Needs an API key from <https://alpaca.markets>.
pub type AlpacaBarsRepository = BarsRepository<AlpacaProvider>;

impl BarsRepository<AlpacaProvider> {
    /// Alpaca repository using the given API key and secret.
    pub fn new(
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
    ) -> Result<Self, ProviderInitError> {
        let provider = AlpacaProvider::with_credentials(
            SecretString::from(api_key.into()),
            SecretString::from(api_secret.into()),
        )?;
        Ok(Self::with_provider(provider))
    }

    /// Alpaca repository with credentials from `APCA_API_KEY_ID` / `APCA_API_SECRET_KEY`.
    pub fn from_env() -> Result<Self, ProviderInitError> {
        Ok(Self::with_provider(AlpacaProvider::new()?))
    }
}

impl<P> BarsRepository<P>
where
    P: DataProvider + Send + Sync,
{
    /// Repository over an already built provider, with the default template.
    pub fn with_provider(provider: P) -> Self {
        Self {
            provider,
            bars_request_template: BarsRequestTemplate::default(),
        }
    }

    /// The provider requests go to.
    pub fn provider(&self) -> &P {
        &self.provider
    }
}

#[async_trait]
impl<P> Repository for BarsRepository<P>
where
    P: DataProvider + Send + Sync,
{
    async fn assets(&self) -> Result<Vec<String>, RepositoryError> {
        warn!("listing assets is not supported by the bars repository");
        UnsupportedSnafu { operation: "assets" }.fail()
    }

    async fn get_since(
        &self,
        name: &str,
        date: DateTime<Utc>,
    ) -> Result<SnapshotStream, RepositoryError> {
        let mut request = self.bars_request_template.clone();
        request.start = date;

        debug!(asset = name, since = %date, timeframe = %request.timeframe, "fetching bars");
        let series = self.provider.fetch_bars(request.bars_request(name)).await?;

        let bars = series
            .into_iter()
            .find(|s| s.symbol.eq_ignore_ascii_case(name))
            .map(|s| s.bars)
            .unwrap_or_default();
        debug!(asset = name, bars = bars.len(), "converting bars to snapshots");

        Ok(SnapshotStream::from_bars(bars))
    }

    async fn last_date(&self, name: &str) -> Result<DateTime<Utc>, RepositoryError> {
        debug!(asset = name, "fetching latest bar");
        let bar = self
            .provider
            .fetch_latest_bar(self.bars_request_template.latest_bar_request(name))
            .await?;

        Ok(bar.timestamp)
    }

    async fn append(&self, name: &str, _snapshots: SnapshotStream) -> Result<(), RepositoryError> {
        warn!(asset = name, "appending is not supported by the bars repository");
        UnsupportedSnafu { operation: "append" }.fail()
    }
}
