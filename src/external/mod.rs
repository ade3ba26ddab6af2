use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

use crate::{
    models::{error::FetchError, CoinDetail, CoinSummary},
    Config,
};

const API_KEY_HEADER: &str = "x-cg-demo-api-key";
const USER_AGENT: &str = concat!("tokonocap-backend/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Where coin listings and market data come from.
#[async_trait]
pub trait CoinSource: Send + Sync {
    /// Every supported coin as `{id, symbol, name}`.
    async fn fetch_coin_list(&self) -> Result<Vec<CoinSummary>, FetchError>;

    /// Market detail for a single coin.
    async fn fetch_coin_detail(&self, id: &str) -> Result<CoinDetail, FetchError>;
}

/// CoinGecko-compatible HTTP client.
pub struct External {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl External {
    pub fn new(base_url: &str, api_key: Option<String>) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(External {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, FetchError> {
        Self::new(&config.coingecko_api_url, config.coingecko_api_key.clone())
    }

    fn get(&self, path: &str) -> RequestBuilder {
        let request = self.client.get(format!("{}{}", self.base_url, path));
        match &self.api_key {
            Some(key) => request.header(API_KEY_HEADER, key),
            None => request,
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, FetchError> {
        let response = request.send().await?.error_for_status()?;
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait]
impl CoinSource for External {
    async fn fetch_coin_list(&self) -> Result<Vec<CoinSummary>, FetchError> {
        debug!("fetching coin list");
        self.get_json(self.get("/coins/list")).await
    }

    async fn fetch_coin_detail(&self, id: &str) -> Result<CoinDetail, FetchError> {
        debug!(coin_id = id, "fetching coin detail");
        let request = self.get(&format!("/coins/{id}")).query(&[
            ("localization", "false"),
            ("tickers", "false"),
            ("community_data", "false"),
            ("developer_data", "false"),
        ]);
        self.get_json(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_coin_detail_payload() {
        let payload = r#"{
            "id": "bitcoin",
            "symbol": "btc",
            "name": "Bitcoin",
            "hashing_algorithm": "SHA-256",
            "image": {
                "thumb": "https://example.com/thumb.png",
                "small": "https://example.com/small.png",
                "large": "https://example.com/large.png"
            },
            "market_data": {
                "current_price": { "usd": 67000.5, "eur": 61000.0 },
                "market_cap": { "usd": 1320000000000.0 },
                "fully_diluted_valuation": { "usd": 1407000000000.0 },
                "circulating_supply": 19700000.0,
                "max_supply": 21000000.0,
                "total_supply": 21000000.0
            }
        }"#;

        let detail: CoinDetail = serde_json::from_str(payload).unwrap();
        assert_eq!(detail.id, "bitcoin");
        assert_eq!(detail.image.large.as_deref(), Some("https://example.com/large.png"));
        assert_eq!(detail.market_data.current_price.usd, Some(67000.5));
        assert_eq!(detail.market_data.fully_diluted_usd(), Some(1407000000000.0));
        assert_eq!(detail.market_data.max_supply, Some(21000000.0));
    }

    #[test]
    fn tolerates_missing_and_null_market_figures() {
        let payload = r#"{
            "id": "obscure",
            "symbol": "obs",
            "name": "Obscure",
            "image": {},
            "market_data": {
                "current_price": {},
                "market_cap": { "usd": null },
                "fully_diluted_valuation": {},
                "circulating_supply": null,
                "max_supply": null
            }
        }"#;

        let detail: CoinDetail = serde_json::from_str(payload).unwrap();
        assert_eq!(detail.market_data.current_price.usd, None);
        assert_eq!(detail.market_data.market_cap.usd, None);
        assert_eq!(detail.market_data.fully_diluted_usd(), None);
        assert_eq!(detail.market_data.circulating_supply, None);
    }

    #[test]
    fn parses_the_coin_list() {
        let payload = r#"[
            {"id": "bitcoin", "symbol": "btc", "name": "Bitcoin"},
            {"id": "ethereum", "symbol": "eth", "name": "Ethereum", "platforms": {}}
        ]"#;
        let coins: Vec<CoinSummary> = serde_json::from_str(payload).unwrap();
        assert_eq!(coins.len(), 2);
        assert_eq!(coins[1].symbol, "eth");
    }

    #[test]
    fn trims_trailing_slash_from_base_url() {
        let external = External::new("https://api.example.com/v3/", None).unwrap();
        assert_eq!(external.base_url, "https://api.example.com/v3");
    }
}
