use async_trait::async_trait;
use indexmap::IndexMap;
use reqwest::{Client, header};
use secrecy::{ExposeSecret, SecretString};
use shared_utils::env::get_env_var;
use snafu::{OptionExt, ResultExt, ensure};
use tracing::debug;

use crate::{
    models::{
        bar::{Bar, BarSeries},
        request_params::{BarsRequestParams, LatestBarParams},
    },
    providers::{
        ApiSnafu, ClientBuildSnafu, DataProvider, InvalidApiKeySnafu, MissingEnvVarSnafu,
        ProviderError, ProviderInitError, RepeatedPageTokenSnafu, ReqwestSnafu,
        SymbolNotFoundSnafu,
        alpaca_rest::{
            params::{
                construct_latest_params, construct_params, validate_asset_class,
                validate_timeframe,
            },
            response::{AlpacaBar, AlpacaLatestResponse, AlpacaResponse},
        },
    },
};

/// Production market data host.
pub const DEFAULT_BASE_URL: &str = "https://data.alpaca.markets";

const BARS_PATH: &str = "/v2/stocks/bars";
const LATEST_BARS_PATH: &str = "/v2/stocks/bars/latest";

pub struct AlpacaProvider {
    client: Client,
    base_url: String,
    _api_key: SecretString,
    _secret_key: SecretString,
}

impl AlpacaProvider {
    /// Creates a new Alpaca provider.
    ///
    /// Reads API keys from the `APCA_API_KEY_ID` and `APCA_API_SECRET_KEY`
    /// environment variables.
    pub fn new() -> Result<Self, ProviderInitError> {
        let api_key = SecretString::from(get_env_var("APCA_API_KEY_ID").context(MissingEnvVarSnafu)?);
        let secret_key =
            SecretString::from(get_env_var("APCA_API_SECRET_KEY").context(MissingEnvVarSnafu)?);

        Self::with_credentials(api_key, secret_key)
    }

    /// Creates a provider from explicit credentials, talking to [`DEFAULT_BASE_URL`].
    pub fn with_credentials(
        api_key: SecretString,
        secret_key: SecretString,
    ) -> Result<Self, ProviderInitError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            "APCA-API-KEY-ID",
            header::HeaderValue::from_str(api_key.expose_secret()).context(InvalidApiKeySnafu)?,
        );
        let mut secret = header::HeaderValue::from_str(secret_key.expose_secret())
            .context(InvalidApiKeySnafu)?;
        secret.set_sensitive(true);
        headers.insert("APCA-API-SECRET-KEY", secret);

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .context(ClientBuildSnafu)?;

        Ok(Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
            _api_key: api_key,
            _secret_key: secret_key,
        })
    }

    /// Points the provider at another host (sandbox, proxy, or a local test server).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> Result<T, ProviderError> {
        let url = format!("{}{path}", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .context(ReqwestSnafu)?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown API error".to_string());
            return ApiSnafu {
                status: status.as_u16(),
                message,
            }
            .fail();
        }

        response.json::<T>().await.context(ReqwestSnafu)
    }
}

#[async_trait]
impl DataProvider for AlpacaProvider {
    async fn fetch_bars(&self, params: BarsRequestParams) -> Result<Vec<BarSeries>, ProviderError> {
        validate_timeframe(&params.timeframe)?;
        validate_asset_class(params.asset_class)?;

        let mut all_bars: IndexMap<String, Vec<AlpacaBar>> = IndexMap::new();
        let mut next_page_token: Option<String> = None;
        let mut page = 0usize;

        loop {
            let mut query_params = construct_params(&params);
            if let Some(token) = &next_page_token {
                query_params.push(("page_token".to_string(), token.clone()));
            }

            page += 1;
            debug!(symbols = ?params.symbols, page, "requesting alpaca bars page");
            let alpaca_response: AlpacaResponse = self.get_json(BARS_PATH, &query_params).await?;

            // Merge the bars from the current page into our collection.
            for (symbol, bars) in alpaca_response.bars {
                all_bars.entry(symbol).or_default().extend(bars);
            }

            match alpaca_response.next_page_token {
                Some(token) => {
                    ensure!(
                        next_page_token.as_deref() != Some(token.as_str()),
                        RepeatedPageTokenSnafu { token }
                    );
                    next_page_token = Some(token);
                }
                None => break,
            }
        }

        let result: Vec<BarSeries> = all_bars
            .into_iter()
            .map(|(symbol, alpaca_bars)| BarSeries {
                symbol,
                timeframe: params.timeframe,
                bars: alpaca_bars.into_iter().map(Bar::from).collect(),
            })
            .collect();

        debug!(
            pages = page,
            bars = result.iter().map(|s| s.bars.len()).sum::<usize>(),
            "fetched alpaca bars"
        );

        Ok(result)
    }

    async fn fetch_latest_bar(&self, params: LatestBarParams) -> Result<Bar, ProviderError> {
        validate_asset_class(params.asset_class)?;

        debug!(symbol = %params.symbol, "requesting alpaca latest bar");
        let query_params = construct_latest_params(&params);
        let latest: AlpacaLatestResponse = self.get_json(LATEST_BARS_PATH, &query_params).await?;

        // Alpaca echoes symbols upper-cased; match them the way fetch_bars callers do.
        latest
            .bars
            .into_iter()
            .find(|(symbol, _)| symbol.eq_ignore_ascii_case(&params.symbol))
            .map(|(_, bar)| Bar::from(bar))
            .context(SymbolNotFoundSnafu {
                symbol: params.symbol,
            })
    }
}
