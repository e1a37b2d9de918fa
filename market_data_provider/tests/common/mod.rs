#![allow(dead_code)]

use market_data_provider::providers::alpaca_rest::AlpacaProvider;
use secrecy::SecretString;
use wiremock::MockServer;

pub const ONE_BAR_PAGE: &str = r#"{"bars":{"A":[{"t":"2021-10-15T16:00:00Z","o":3378.14,"h":3380.815,"l":3376.3001,"c":3379.72,"v":211689,"n":5435,"vw":3379.041755}]},"next_page_token":null}"#;

pub const LATEST_BAR: &str = r#"{"bars":{"A":{"t":"2021-10-15T16:00:00Z","o":3378.14,"h":3380.815,"l":3376.3001,"c":3379.72,"v":211689,"n":5435,"vw":3379.041755}}}"#;

/// Provider with fixed test credentials talking to the given mock server.
pub fn provider_for(server: &MockServer) -> AlpacaProvider {
    AlpacaProvider::with_credentials(SecretString::from("key"), SecretString::from("secret"))
        .expect("provider")
        .with_base_url(server.uri())
}
