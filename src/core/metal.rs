//! Metal and weight unit types shared by records, snapshots and valuation.

use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Grams in one troy ounce.
pub const GRAMS_PER_TROY_OUNCE: f64 = 31.1035;

/// The metal a coin is struck in.
///
/// Records arrive from an external store, so a value outside the three
/// supported metals is kept as `Other` instead of failing the whole load.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Metal {
    Gold,
    Silver,
    Platinum,
    Other(String),
}

impl Metal {
    /// Supported metals, in display order.
    pub const SUPPORTED: [Metal; 3] = [Metal::Gold, Metal::Silver, Metal::Platinum];

    /// Quote symbol against USD, e.g. `XAUUSD`.
    pub fn symbol(&self) -> Option<&'static str> {
        match self {
            Metal::Gold => Some("XAUUSD"),
            Metal::Silver => Some("XAGUSD"),
            Metal::Platinum => Some("XPTUSD"),
            Metal::Other(_) => None,
        }
    }
}

impl From<String> for Metal {
    fn from(value: String) -> Self {
        match value.trim().to_lowercase().as_str() {
            "gold" | "xau" => Metal::Gold,
            "silver" | "xag" => Metal::Silver,
            "platinum" | "xpt" => Metal::Platinum,
            _ => Metal::Other(value),
        }
    }
}

impl From<Metal> for String {
    fn from(value: Metal) -> Self {
        value.to_string()
    }
}

impl Display for Metal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Metal::Gold => write!(f, "Gold"),
            Metal::Silver => write!(f, "Silver"),
            Metal::Platinum => write!(f, "Platinum"),
            Metal::Other(name) => write!(f, "{name}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeightUnit {
    #[serde(rename = "g", alias = "gram", alias = "grams")]
    Gram,
    #[serde(rename = "oz", alias = "ozt", alias = "troy-ounce")]
    TroyOunce,
}

impl WeightUnit {
    pub fn to_troy_ounces(self, weight: f64) -> f64 {
        match self {
            WeightUnit::Gram => weight / GRAMS_PER_TROY_OUNCE,
            WeightUnit::TroyOunce => weight,
        }
    }
}

impl Display for WeightUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WeightUnit::Gram => write!(f, "g"),
            WeightUnit::TroyOunce => write!(f, "oz"),
        }
    }
}
