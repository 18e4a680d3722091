//! Melt value, premium and margin calculations.
//!
//! Every function here is total: missing or invalid input yields `None`,
//! which the presentation layer renders as "N/A".

use crate::core::records::Coin;
use crate::core::spot::SpotPriceSnapshot;

/// Derived numbers for a single coin. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ValuationResult {
    pub melt_value: Option<f64>,
    pub premium_paid_percent: Option<f64>,
    pub profit_margin_percent: Option<f64>,
}

/// Value of the metal contained in `coin` at the snapshot's spot price.
pub fn calculate_melt_value(coin: &Coin, snapshot: &SpotPriceSnapshot) -> Option<f64> {
    let price_per_oz = snapshot
        .price_for(&coin.metal_type)
        .filter(|p| p.is_finite() && *p > 0.0)?;

    if !(coin.weight.is_finite() && coin.weight > 0.0) {
        return None;
    }
    if !(coin.purity > 0.0 && coin.purity <= 1.0) {
        return None;
    }

    let weight_in_oz = coin.weight_unit.to_troy_ounces(coin.weight);
    Some(price_per_oz * weight_in_oz * coin.purity)
}

/// Percentage paid above (or below, when negative) melt value.
pub fn calculate_premium_paid_percent(
    purchase_price: Option<f64>,
    melt_value: Option<f64>,
) -> Option<f64> {
    let melt = melt_value.filter(|m| *m > 0.0)?;
    let purchase = purchase_price.filter(|p| *p >= 0.0)?;
    Some(((purchase - melt) / melt) * 100.0)
}

/// Percentage a resale at `resale_market_value` would make over melt value.
///
/// A resale value of zero is valid and yields a margin of -100%.
pub fn calculate_profit_margin_percent(
    resale_market_value: Option<f64>,
    melt_value: Option<f64>,
) -> Option<f64> {
    let melt = melt_value.filter(|m| *m > 0.0)?;
    let resale = resale_market_value.filter(|r| *r >= 0.0)?;
    Some(((resale - melt) / melt) * 100.0)
}

pub fn value_coin(coin: &Coin, snapshot: &SpotPriceSnapshot) -> ValuationResult {
    let melt_value = calculate_melt_value(coin, snapshot);
    ValuationResult {
        melt_value,
        premium_paid_percent: calculate_premium_paid_percent(Some(coin.purchase_price), melt_value),
        profit_margin_percent: calculate_profit_margin_percent(
            coin.resale_market_value,
            melt_value,
        ),
    }
}
