use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Catalog entry as returned by `/coins/list`.
#[derive(Debug, Default, Deserialize, Serialize, Clone, PartialEq, ToSchema)]
pub struct CoinSummary {
    #[schema(example = "bitcoin")]
    pub id: String,
    #[schema(example = "btc")]
    pub symbol: String,
    #[schema(example = "Bitcoin")]
    pub name: String,
}

#[derive(Debug, Default, Deserialize, Serialize, Clone, PartialEq, ToSchema)]
pub struct CoinImage {
    #[serde(default)]
    pub thumb: Option<String>,
    #[serde(default)]
    pub small: Option<String>,
    #[serde(default)]
    pub large: Option<String>,
}

/// A per-currency quote. Only the USD figure is used.
#[derive(Debug, Default, Deserialize, Serialize, Clone, PartialEq, ToSchema)]
pub struct UsdQuote {
    #[serde(default)]
    pub usd: Option<f64>,
}

#[derive(Debug, Default, Deserialize, Serialize, Clone, PartialEq, ToSchema)]
pub struct MarketData {
    #[serde(default)]
    pub current_price: UsdQuote,
    #[serde(default)]
    pub market_cap: UsdQuote,
    #[serde(default)]
    pub fully_diluted_valuation: Option<UsdQuote>,
    #[serde(default)]
    pub circulating_supply: Option<f64>,
    #[serde(default)]
    pub max_supply: Option<f64>,
}

impl MarketData {
    pub fn fully_diluted_usd(&self) -> Option<f64> {
        self.fully_diluted_valuation.as_ref().and_then(|fdv| fdv.usd)
    }
}

/// Market detail for one coin as returned by `/coins/{id}`.
#[derive(Debug, Default, Deserialize, Serialize, Clone, PartialEq, ToSchema)]
pub struct CoinDetail {
    pub id: String,
    pub symbol: String,
    pub name: String,
    #[serde(default)]
    pub image: CoinImage,
    #[serde(default)]
    pub market_data: MarketData,
}
