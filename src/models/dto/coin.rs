use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    lookup::DerivedFigures,
    models::{CoinDetail, CoinSummary},
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct SearchQuery {
    #[serde(default)]
    pub search: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct DeriveQuery {
    pub multiplier: Option<String>,
    pub target_price: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SearchInput {
    pub term: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SelectInput {
    pub coin_id: String,
}

/// Raw text typed into a numeric field.
#[derive(Debug, Deserialize, ToSchema)]
pub struct FigureInput {
    pub value: String,
}

/// Snapshot of a lookup session.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SessionView {
    pub id: u64,
    pub search_term: String,
    pub results: Vec<CoinSummary>,
    pub selected: Option<CoinSummary>,
    pub detail: Option<CoinDetail>,
    pub multiplier: String,
    pub target_price: String,
    pub derived: DerivedFigures,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
