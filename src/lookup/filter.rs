use crate::models::CoinSummary;

/// Upper bound on the number of search results handed back to a caller.
pub const MAX_RESULTS: usize = 50;

/// Case-insensitive substring search on name or symbol, in catalog order.
///
/// An empty term matches nothing so that an idle search box never renders
/// the whole catalog.
pub fn filter_coins(catalog: &[CoinSummary], term: &str) -> Vec<CoinSummary> {
    if term.is_empty() {
        return Vec::new();
    }
    let needle = term.to_lowercase();

    catalog
        .iter()
        .filter(|coin| matches(coin, &needle))
        .take(MAX_RESULTS)
        .cloned()
        .collect()
}

fn matches(coin: &CoinSummary, needle: &str) -> bool {
    coin.name.to_lowercase().contains(needle) || coin.symbol.to_lowercase().contains(needle)
}
