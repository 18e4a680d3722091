//! Spot price abstractions and core types

use crate::core::metal::Metal;
use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// How long a fetched snapshot is served without going back upstream.
pub const SNAPSHOT_TTL: TimeDelta = TimeDelta::hours(8);

/// Per troy ounce prices as quoted by an upstream source.
#[derive(Debug, Clone, PartialEq)]
pub struct SpotQuote {
    pub gold: Option<f64>,
    pub silver: Option<f64>,
    pub platinum: Option<f64>,
    pub source: String,
    /// When the upstream generated the quotes, truncated to whole seconds.
    pub timestamp: DateTime<Utc>,
}

/// A quote together with the time this process retrieved it.
///
/// Serializes to the `{XAUUSD, XAGUSD, XPTUSD, source, timestamp, lastFetched}`
/// shape with epoch second timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpotPriceSnapshot {
    #[serde(rename = "XAUUSD")]
    pub gold: Option<f64>,
    #[serde(rename = "XAGUSD")]
    pub silver: Option<f64>,
    #[serde(rename = "XPTUSD")]
    pub platinum: Option<f64>,
    pub source: String,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "lastFetched", with = "chrono::serde::ts_seconds")]
    pub fetched_at: DateTime<Utc>,
}

impl SpotPriceSnapshot {
    pub fn from_quote(quote: SpotQuote, fetched_at: DateTime<Utc>) -> Self {
        Self {
            gold: quote.gold,
            silver: quote.silver,
            platinum: quote.platinum,
            source: quote.source,
            timestamp: quote.timestamp,
            fetched_at,
        }
    }

    /// Price per troy ounce for `metal`, if quoted.
    pub fn price_for(&self, metal: &Metal) -> Option<f64> {
        match metal {
            Metal::Gold => self.gold,
            Metal::Silver => self.silver,
            Metal::Platinum => self.platinum,
            Metal::Other(_) => None,
        }
    }

    pub fn is_fresh(&self, now: DateTime<Utc>, ttl: TimeDelta) -> bool {
        now - self.fetched_at < ttl
    }
}

/// Body returned to callers when a fetch fails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[derive(Debug, Error)]
pub enum SpotPriceError {
    #[error("API key for spot prices is not configured. Please set {0}.")]
    MissingCredential(String),
    #[error("Failed to fetch spot prices from provider. Status: {status}. {body}")]
    Rejected { status: u16, body: String },
    #[error("Failed to retrieve valid spot price data from provider.")]
    InvalidPayload { details: String },
    #[error("Spot price request timed out after {0:?}.")]
    Timeout(Duration),
    #[error("An unexpected error occurred while fetching spot prices.")]
    Unexpected { details: String },
}

impl SpotPriceError {
    /// HTTP-style status for the failure. Upstream rejections pass through.
    pub fn status_code(&self) -> u16 {
        match self {
            SpotPriceError::Rejected { status, .. } => *status,
            SpotPriceError::Timeout(_) => 504,
            SpotPriceError::MissingCredential(_)
            | SpotPriceError::InvalidPayload { .. }
            | SpotPriceError::Unexpected { .. } => 500,
        }
    }

    pub fn details(&self) -> Option<&str> {
        match self {
            SpotPriceError::InvalidPayload { details } | SpotPriceError::Unexpected { details } => {
                Some(details)
            }
            _ => None,
        }
    }

    pub fn payload(&self) -> ErrorPayload {
        ErrorPayload {
            error: self.to_string(),
            details: self.details().map(str::to_string),
        }
    }
}

/// An upstream quote API. Implementations make exactly one request per call.
#[async_trait]
pub trait SpotPriceSource: Send + Sync {
    async fn fetch_quote(&self) -> Result<SpotQuote, SpotPriceError>;
}

/// Serves spot price snapshots to the rest of the application.
#[async_trait]
pub trait SpotPriceProvider: Send + Sync {
    /// Returns the cached snapshot while it is fresh, otherwise fetches a new one.
    async fn get_spot_prices(&self) -> Result<SpotPriceSnapshot, SpotPriceError>;

    /// Always goes upstream, regardless of freshness.
    async fn refresh_spot_prices(&self) -> Result<SpotPriceSnapshot, SpotPriceError>;

    /// The last successfully fetched snapshot, fresh or not.
    async fn last_known(&self) -> Option<SpotPriceSnapshot>;
}

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn snapshot() -> SpotPriceSnapshot {
        SpotPriceSnapshot {
            gold: Some(2000.0),
            silver: Some(25.0),
            platinum: None,
            source: "Metals.dev".to_string(),
            timestamp: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
            fetched_at: Utc.timestamp_opt(1_700_000_100, 0).unwrap(),
        }
    }

    #[test]
    fn test_snapshot_serializes_to_external_contract() {
        let json = serde_json::to_value(snapshot()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "XAUUSD": 2000.0,
                "XAGUSD": 25.0,
                "XPTUSD": null,
                "source": "Metals.dev",
                "timestamp": 1_700_000_000,
                "lastFetched": 1_700_000_100
            })
        );
    }

    #[test]
    fn test_freshness_window() {
        let snap = snapshot();
        let fetched = snap.fetched_at;
        assert!(snap.is_fresh(fetched, SNAPSHOT_TTL));
        assert!(snap.is_fresh(fetched + TimeDelta::hours(8) - TimeDelta::seconds(1), SNAPSHOT_TTL));
        assert!(!snap.is_fresh(fetched + TimeDelta::hours(8), SNAPSHOT_TTL));
    }

    #[test]
    fn test_price_for_metal() {
        let snap = snapshot();
        assert_eq!(snap.price_for(&Metal::Gold), Some(2000.0));
        assert_eq!(snap.price_for(&Metal::Platinum), None);
        assert_eq!(snap.price_for(&Metal::Other("Copper".to_string())), None);
    }

    #[test]
    fn test_error_status_codes_and_payloads() {
        let rejected = SpotPriceError::Rejected {
            status: 429,
            body: "rate limited".to_string(),
        };
        assert_eq!(rejected.status_code(), 429);
        assert_eq!(
            rejected.payload().error,
            "Failed to fetch spot prices from provider. Status: 429. rate limited"
        );
        assert!(rejected.payload().details.is_none());

        let missing = SpotPriceError::MissingCredential("METALS_DEV_API_KEY".to_string());
        assert_eq!(missing.status_code(), 500);

        let unexpected = SpotPriceError::Unexpected {
            details: "connection reset".to_string(),
        };
        let payload = serde_json::to_value(unexpected.payload()).unwrap();
        assert_eq!(
            payload,
            serde_json::json!({
                "error": "An unexpected error occurred while fetching spot prices.",
                "details": "connection reset"
            })
        );
        assert_eq!(SpotPriceError::Timeout(Duration::from_secs(5)).status_code(), 504);
    }
}
