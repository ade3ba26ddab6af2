use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::MarketData;

/// Hypothetical figures computed from live market data and user input.
#[derive(Debug, Default, Deserialize, Serialize, Clone, Copy, PartialEq, ToSchema)]
pub struct DerivedFigures {
    pub calculated_price: Option<f64>,
    pub calculated_market_cap: Option<f64>,
}

/// Parses a user-typed number. Blank, non-numeric and non-finite input is `None`.
pub fn parse_operand(input: &str) -> Option<f64> {
    input
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// Zero and missing figures are both treated as absent.
fn present(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v != 0.0 && v.is_finite())
}

/// Scales the current price by `multiplier` and prices the supply at the new level.
///
/// Circulating supply is preferred, max supply is the fallback.
pub fn by_multiplier(market: &MarketData, multiplier: f64) -> DerivedFigures {
    let Some(current_price) = market.current_price.usd else {
        return DerivedFigures::default();
    };
    let new_price = current_price * multiplier;
    let supply = present(market.circulating_supply).or_else(|| present(market.max_supply));

    DerivedFigures {
        calculated_price: Some(new_price),
        calculated_market_cap: supply.map(|supply| new_price * supply),
    }
}

/// Market cap the coin would have if it traded at `target_price`.
///
/// Falls back to max supply only when the coin reports a fully diluted valuation.
pub fn market_cap_at_price(market: &MarketData, target_price: f64) -> Option<f64> {
    if let Some(circulating) = present(market.circulating_supply) {
        return Some(target_price * circulating);
    }
    match (present(market.fully_diluted_usd()), present(market.max_supply)) {
        (Some(_), Some(max_supply)) => Some(target_price * max_supply),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UsdQuote;

    fn market(
        price: Option<f64>,
        circulating: Option<f64>,
        max: Option<f64>,
        fdv: Option<f64>,
    ) -> MarketData {
        MarketData {
            current_price: UsdQuote { usd: price },
            market_cap: UsdQuote::default(),
            fully_diluted_valuation: fdv.map(|usd| UsdQuote { usd: Some(usd) }),
            circulating_supply: circulating,
            max_supply: max,
        }
    }

    #[test]
    fn parses_operands() {
        assert_eq!(parse_operand("2"), Some(2.0));
        assert_eq!(parse_operand(" 1.5 "), Some(1.5));
        assert_eq!(parse_operand(""), None);
        assert_eq!(parse_operand("abc"), None);
        assert_eq!(parse_operand("inf"), None);
        assert_eq!(parse_operand("NaN"), None);
    }

    #[test]
    fn multiplier_scales_price() {
        let figures = by_multiplier(&market(Some(100.0), None, None, None), 2.0);
        assert_eq!(figures.calculated_price, Some(200.0));
        assert_eq!(figures.calculated_market_cap, None);
    }

    #[test]
    fn multiplier_uses_circulating_supply() {
        let figures = by_multiplier(&market(Some(100.0), Some(1000.0), Some(5000.0), None), 2.0);
        assert_eq!(figures.calculated_market_cap, Some(200_000.0));
    }

    #[test]
    fn multiplier_falls_back_to_max_supply() {
        let absent = by_multiplier(&market(Some(100.0), None, Some(5000.0), None), 2.0);
        assert_eq!(absent.calculated_market_cap, Some(1_000_000.0));

        let zero = by_multiplier(&market(Some(100.0), Some(0.0), Some(5000.0), None), 2.0);
        assert_eq!(zero.calculated_market_cap, Some(1_000_000.0));
    }

    #[test]
    fn multiplier_without_price_yields_nothing() {
        let figures = by_multiplier(&market(None, Some(1000.0), None, None), 2.0);
        assert_eq!(figures, DerivedFigures::default());
    }

    #[test]
    fn target_price_uses_circulating_supply() {
        let m = market(Some(1.0), Some(1000.0), Some(2000.0), Some(9.0));
        assert_eq!(market_cap_at_price(&m, 50.0), Some(50_000.0));
    }

    #[test]
    fn target_price_falls_back_to_max_supply_with_fdv() {
        let m = market(Some(1.0), None, Some(2000.0), Some(123.0));
        assert_eq!(market_cap_at_price(&m, 50.0), Some(100_000.0));
    }

    #[test]
    fn target_price_without_supply_or_fdv_yields_nothing() {
        assert_eq!(market_cap_at_price(&market(Some(1.0), None, None, None), 50.0), None);
        // max supply alone is not enough without a fully diluted valuation
        assert_eq!(
            market_cap_at_price(&market(Some(1.0), None, Some(2000.0), None), 50.0),
            None
        );
    }
}
