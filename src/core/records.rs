//! Coin and arbitrage records as delivered by the record store.
//!
//! The core never queries storage itself. Records are pulled through a
//! [`RecordSource`] and handed to valuation as plain data.

use crate::core::metal::{Metal, WeightUnit};
use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// A coin owned by a single user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coin {
    #[serde(default)]
    pub id: Option<String>,
    pub user_id: String,
    pub name: String,
    pub metal_type: Metal,
    #[serde(default)]
    pub year: Option<i32>,
    pub weight: f64,
    pub weight_unit: WeightUnit,
    pub purity: f64,
    pub purchase_price: f64,
    #[serde(default)]
    pub purchase_date: Option<NaiveDate>,
    #[serde(default)]
    pub resale_market_value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResaleLink {
    pub platform: String,
    pub url: String,
}

/// A publicly listed coin curated by an admin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArbitrageCoin {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    pub metal_type: Metal,
    pub description: String,
    #[serde(default)]
    pub resale_links: Vec<ResaleLink>,
    #[serde(default)]
    pub image_url: Option<String>,
    /// Internal notes, visible to admins only.
    #[serde(default)]
    pub notes: Option<String>,
    pub published_at: DateTime<Utc>,
}

/// Identity resolved by the external identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserContext {
    pub id: String,
    #[serde(default)]
    pub admin: bool,
}

/// A problem found by advisory validation. Never fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    pub field: &'static str,
    pub message: String,
}

impl ValidationIssue {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl Coin {
    pub fn validate(&self) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        if self.name.trim().is_empty() {
            issues.push(ValidationIssue::new("name", "Coin name is required."));
        }
        if let Metal::Other(name) = &self.metal_type {
            issues.push(ValidationIssue::new(
                "metal_type",
                format!("Unsupported metal type: {name}."),
            ));
        }
        if !(self.weight > 0.0) {
            issues.push(ValidationIssue::new(
                "weight",
                "Weight must be greater than 0.",
            ));
        }
        if !(self.purity > 0.0 && self.purity <= 1.0) {
            issues.push(ValidationIssue::new(
                "purity",
                "Purity must be between 0 and 1 (e.g., 0.999).",
            ));
        }
        if !(self.purchase_price >= 0.0) {
            issues.push(ValidationIssue::new(
                "purchase_price",
                "Purchase price cannot be negative.",
            ));
        }
        if let Some(resale) = self.resale_market_value
            && !(resale >= 0.0)
        {
            issues.push(ValidationIssue::new(
                "resale_market_value",
                "Resale market value cannot be negative.",
            ));
        }
        issues
    }
}

impl ArbitrageCoin {
    pub fn validate(&self) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        if self.name.trim().is_empty() {
            issues.push(ValidationIssue::new("name", "Name is required."));
        }
        if self.description.trim().is_empty() {
            issues.push(ValidationIssue::new(
                "description",
                "Description is required.",
            ));
        }
        if self
            .resale_links
            .iter()
            .any(|link| link.platform.trim().is_empty() || link.url.trim().is_empty())
        {
            issues.push(ValidationIssue::new(
                "resale_links",
                "Every resale link needs a platform and a URL.",
            ));
        }
        issues
    }
}

/// Pull-based access to the externally stored records.
pub trait RecordSource: Send + Sync {
    /// Coins owned by `user_id`.
    fn coins_for(&self, user_id: &str) -> Result<Vec<Coin>>;

    /// The global arbitrage list, newest first.
    fn arbitrage_coins(&self) -> Result<Vec<ArbitrageCoin>>;
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn coin(metal_type: Metal, weight: f64, weight_unit: WeightUnit, purity: f64) -> Coin {
        Coin {
            id: None,
            user_id: "alice".to_string(),
            name: format!("{metal_type} test coin"),
            metal_type,
            year: Some(2024),
            weight,
            weight_unit,
            purity,
            purchase_price: 0.0,
            purchase_date: None,
            resale_market_value: None,
        }
    }
}
