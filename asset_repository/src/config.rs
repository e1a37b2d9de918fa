//! TOML configuration for repository defaults.
//!
//! Credentials never live here; they come from the environment. A config file
//! only carries request defaults and the asset list a runner should work on:
//!
//! ```toml
//! base_url   = "https://data.alpaca.markets"
//! timeframe  = "1D"
//! adjustment = "raw"
//! feed       = "iex"
//! currency   = "USD"
//! limit      = 10000
//! assets     = ["AAPL", "MSFT"]
//! ```
//!
//! Entrypoints: [`load_config_str`] and [`load_config_path`].

use anyhow::{Context, anyhow};
use market_data_provider::{
    models::timeframe::TimeFrame,
    providers::alpaca_rest::{Adjustment, Feed},
};
use serde::{Deserialize, Serialize};

use crate::template::BarsRequestTemplate;

/// Request defaults and asset list read from a config file. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RepositoryConfig {
    /// Market data host, e.g. a sandbox or proxy.
    pub base_url: Option<String>,
    /// Bar granularity in short form (`"5m"`, `"1h"`, `"1D"`, `"1W"`, `"3M"`).
    pub timeframe: Option<String>,
    /// Corporate action adjustment of prices.
    pub adjustment: Option<Adjustment>,
    /// Source feed.
    pub feed: Option<Feed>,
    /// Currency prices are reported in.
    pub currency: Option<String>,
    /// Page size used while paginating.
    pub limit: Option<u32>,
    /// Assets to work on when the repository cannot list them itself.
    #[serde(default)]
    pub assets: Vec<String>,
}

impl RepositoryConfig {
    /// Parsed timeframe, if one is configured.
    pub fn timeframe(&self) -> anyhow::Result<Option<TimeFrame>> {
        self.timeframe
            .as_deref()
            .map(|s| {
                let tf: TimeFrame = s.parse().map_err(|e| anyhow!("timeframe {s:?}: {e}"))?;
                tf.validate().map_err(|e| anyhow!("timeframe {s:?}: {e}"))?;
                Ok(tf)
            })
            .transpose()
    }

    /// Writes the configured defaults into `template`, leaving unset fields alone.
    pub fn apply_to(&self, template: &mut BarsRequestTemplate) -> anyhow::Result<()> {
        if let Some(tf) = self.timeframe()? {
            template.timeframe = tf;
        }

        let has_alpaca_options = self.adjustment.is_some()
            || self.feed.is_some()
            || self.currency.is_some()
            || self.limit.is_some();
        if has_alpaca_options {
            let alpaca = template.alpaca_mut();
            if let Some(adjustment) = self.adjustment {
                alpaca.adjustment = Some(adjustment);
            }
            if let Some(feed) = self.feed {
                alpaca.feed = Some(feed);
            }
            if let Some(currency) = &self.currency {
                alpaca.currency = Some(currency.clone());
            }
            if let Some(limit) = self.limit {
                alpaca.limit = Some(limit);
            }
        }

        Ok(())
    }
}

/// Parse a config from TOML text and check its timeframe.
pub fn load_config_str(toml_str: &str) -> anyhow::Result<RepositoryConfig> {
    let cfg: RepositoryConfig = toml::from_str(toml_str).context("failed to parse config TOML")?;
    cfg.timeframe()?;
    Ok(cfg)
}

/// Read a config file from disk and parse it.
///
/// See [`load_config_str`].
pub fn load_config_path(path: impl AsRef<std::path::Path>) -> anyhow::Result<RepositoryConfig> {
    let text = std::fs::read_to_string(path.as_ref())
        .with_context(|| format!("read config file {}", path.as_ref().display()))?;
    load_config_str(&text)
}
