use serde::{Deserialize, Serialize};

/// Asset class a symbol belongs to. Providers use it to route requests.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetClass {
    #[default]
    UsEquity,
    Futures,
}
