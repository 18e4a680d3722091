//! Provides aggregate calculations over a user's coin inventory.
use crate::core::records::Coin;
use crate::core::spot::SpotPriceSnapshot;
use crate::core::valuation::{ValuationResult, value_coin};
use std::fmt::Display;
use tracing::debug;

/// Whether reselling a coin at its market value beats its melt value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profitability {
    Profitable,
    Loss,
    Neutral,
}

impl Profitability {
    pub fn classify(melt_value: Option<f64>, resale_market_value: Option<f64>) -> Self {
        match (melt_value.filter(|m| *m > 0.0), resale_market_value) {
            (Some(melt), Some(resale)) if resale > melt => Profitability::Profitable,
            (Some(melt), Some(resale)) if resale < melt => Profitability::Loss,
            _ => Profitability::Neutral,
        }
    }
}

impl Display for Profitability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Profitability::Profitable => write!(f, "Profitable"),
            Profitability::Loss => write!(f, "Loss"),
            Profitability::Neutral => write!(f, "Neutral"),
        }
    }
}

/// Represents the calculated values of a single coin.
#[derive(Debug, Clone)]
pub struct CoinValue {
    pub coin: Coin,
    pub valuation: ValuationResult,
    pub profitability: Profitability,
}

/// Represents a summary of a user's inventory.
///
/// Totals are `None` when no spot prices were available at all.
#[derive(Debug)]
pub struct InventoryValue {
    pub coins: Vec<CoinValue>,
    pub total_melt_value: Option<f64>,
    pub weighted_premium_paid_percent: Option<f64>,
    pub total_potential_profit: Option<f64>,
}

/// Values every coin and aggregates the dashboard totals.
///
/// Only coins with a positive melt value take part in the totals. The
/// premium is weighted by melt value: `(Σ purchase - Σ melt) / Σ melt`.
pub fn calculate_inventory_value(
    coins: &[Coin],
    snapshot: Option<&SpotPriceSnapshot>,
) -> InventoryValue {
    let Some(snapshot) = snapshot else {
        debug!("No spot prices available, inventory totals are unknown");
        return InventoryValue {
            coins: coins
                .iter()
                .map(|coin| CoinValue {
                    coin: coin.clone(),
                    valuation: ValuationResult::default(),
                    profitability: Profitability::Neutral,
                })
                .collect(),
            total_melt_value: None,
            weighted_premium_paid_percent: None,
            total_potential_profit: None,
        };
    };

    let mut total_melt = 0.0;
    let mut total_purchase = 0.0;
    let mut total_profit = 0.0;
    let mut priced_coins = 0;

    let values: Vec<CoinValue> = coins
        .iter()
        .map(|coin| {
            let valuation = value_coin(coin, snapshot);
            if let Some(melt) = valuation.melt_value.filter(|m| *m > 0.0) {
                total_melt += melt;
                total_purchase += coin.purchase_price;
                priced_coins += 1;
                if let Some(resale) = coin.resale_market_value {
                    total_profit += resale - melt;
                }
            } else {
                debug!("Melt value could not be determined for {}", coin.name);
            }
            CoinValue {
                coin: coin.clone(),
                valuation,
                profitability: Profitability::classify(
                    valuation.melt_value,
                    coin.resale_market_value,
                ),
            }
        })
        .collect();

    let weighted_premium = if priced_coins > 0 && total_melt > 0.0 {
        Some(((total_purchase - total_melt) / total_melt) * 100.0)
    } else {
        None
    };

    InventoryValue {
        coins: values,
        total_melt_value: Some(total_melt),
        weighted_premium_paid_percent: weighted_premium,
        total_potential_profit: Some(total_profit),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::metal::{Metal, WeightUnit};
    use crate::core::records::fixtures::coin;
    use chrono::Utc;

    fn snapshot() -> SpotPriceSnapshot {
        let now = Utc::now();
        SpotPriceSnapshot {
            gold: Some(2000.0),
            silver: Some(25.0),
            platinum: None,
            source: "test".to_string(),
            timestamp: now,
            fetched_at: now,
        }
    }

    fn coins() -> Vec<Coin> {
        let mut gold = coin(Metal::Gold, 1.0, WeightUnit::TroyOunce, 1.0);
        gold.purchase_price = 2100.0;
        gold.resale_market_value = Some(2050.0);

        let mut silver = coin(Metal::Silver, 31.1035, WeightUnit::Gram, 1.0);
        silver.purchase_price = 20.0;
        silver.resale_market_value = Some(22.0);

        let mut platinum = coin(Metal::Platinum, 1.0, WeightUnit::TroyOunce, 0.9995);
        platinum.purchase_price = 1000.0;
        platinum.resale_market_value = Some(1100.0);

        vec![gold, silver, platinum]
    }

    #[test]
    fn test_totals_skip_unpriced_coins() {
        let snap = snapshot();
        let inventory = calculate_inventory_value(&coins(), Some(&snap));

        assert_eq!(inventory.coins.len(), 3);
        assert!((inventory.total_melt_value.unwrap() - 2025.0).abs() < 1e-9);

        // (2120 - 2025) / 2025
        let expected_premium = (95.0 / 2025.0) * 100.0;
        assert!((inventory.weighted_premium_paid_percent.unwrap() - expected_premium).abs() < 1e-9);

        // (2050 - 2000) + (22 - 25)
        assert!((inventory.total_potential_profit.unwrap() - 47.0).abs() < 1e-9);
    }

    #[test]
    fn test_profitability_per_coin() {
        let snap = snapshot();
        let inventory = calculate_inventory_value(&coins(), Some(&snap));

        let statuses: Vec<Profitability> =
            inventory.coins.iter().map(|c| c.profitability).collect();
        assert_eq!(
            statuses,
            vec![
                Profitability::Profitable,
                Profitability::Loss,
                Profitability::Neutral
            ]
        );
        assert!(inventory.coins[2].valuation.melt_value.is_none());
    }

    #[test]
    fn test_no_snapshot_means_unknown_totals() {
        let inventory = calculate_inventory_value(&coins(), None);
        assert_eq!(inventory.coins.len(), 3);
        assert!(inventory.total_melt_value.is_none());
        assert!(inventory.weighted_premium_paid_percent.is_none());
        assert!(inventory.total_potential_profit.is_none());
        assert!(
            inventory
                .coins
                .iter()
                .all(|c| c.valuation == ValuationResult::default())
        );
    }

    #[test]
    fn test_empty_inventory_has_no_premium() {
        let snap = snapshot();
        let inventory = calculate_inventory_value(&[], Some(&snap));
        assert_eq!(inventory.total_melt_value, Some(0.0));
        assert_eq!(inventory.weighted_premium_paid_percent, None);
        assert_eq!(inventory.total_potential_profit, Some(0.0));
    }

    #[test]
    fn test_classify_equal_values_is_neutral() {
        assert_eq!(
            Profitability::classify(Some(100.0), Some(100.0)),
            Profitability::Neutral
        );
        assert_eq!(Profitability::classify(None, Some(100.0)), Profitability::Neutral);
        assert_eq!(Profitability::classify(Some(100.0), None), Profitability::Neutral);
    }
}
