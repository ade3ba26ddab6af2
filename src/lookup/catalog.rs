use std::sync::Arc;

use tracing::{error, info};

use crate::{external::CoinSource, models::CoinSummary};

use super::filter_coins;

/// The full coin list, fetched once at startup and read-only afterwards.
#[derive(Debug, Clone)]
pub struct Catalog {
    coins: Arc<[CoinSummary]>,
    load_error: Option<String>,
}

impl Catalog {
    pub fn new(coins: Vec<CoinSummary>) -> Self {
        Self {
            coins: coins.into(),
            load_error: None,
        }
    }

    /// Fetches the coin list. A failed fetch leaves the catalog empty and
    /// records the failure instead of aborting startup.
    pub async fn load(source: &dyn CoinSource) -> Self {
        match source.fetch_coin_list().await {
            Ok(coins) => {
                info!(count = coins.len(), "coin catalog loaded");
                Self::new(coins)
            }
            Err(e) => {
                error!("Error fetching full coin list: {}", e);
                Self {
                    coins: Arc::from(Vec::new()),
                    load_error: Some("Error fetching full coin list".to_string()),
                }
            }
        }
    }

    pub fn len(&self) -> usize {
        self.coins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coins.is_empty()
    }

    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    pub fn search(&self, term: &str) -> Vec<CoinSummary> {
        filter_coins(&self.coins, term)
    }

    pub fn get(&self, id: &str) -> Option<&CoinSummary> {
        self.coins.iter().find(|coin| coin.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeSource;

    #[tokio::test]
    async fn loads_the_coin_list() {
        let catalog = Catalog::load(&FakeSource::default()).await;
        assert_eq!(catalog.len(), 3);
        assert!(catalog.load_error().is_none());
        assert_eq!(catalog.get("ethereum").map(|c| c.symbol.as_str()), Some("eth"));
        assert!(catalog.get("dogecoin").is_none());
    }

    #[tokio::test]
    async fn failed_load_degrades_to_an_empty_catalog() {
        let catalog = Catalog::load(&FakeSource::failing()).await;
        assert!(catalog.is_empty());
        assert_eq!(catalog.load_error(), Some("Error fetching full coin list"));
        assert!(catalog.search("bit").is_empty());
    }
}
