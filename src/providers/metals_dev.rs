use crate::core::config::MetalsDevProviderConfig;
use crate::core::spot::{SpotPriceError, SpotPriceSource, SpotQuote};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, error, instrument, warn};

const SOURCE_NAME: &str = "Metals.dev";

#[derive(Debug, Deserialize)]
struct MetalsDevResponse {
    #[serde(default)]
    status: Option<String>,
    metals: Option<MetalsDevPrices>,
    timestamp: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MetalsDevPrices {
    gold: Option<f64>,
    silver: Option<f64>,
    platinum: Option<f64>,
}

/// Quotes gold, silver and platinum in USD per troy ounce from metals.dev.
pub struct MetalsDevProvider {
    base_url: String,
    api_key: Option<String>,
    api_key_env: String,
    timeout: Duration,
}

impl MetalsDevProvider {
    pub fn new(base_url: &str, api_key: Option<String>, timeout: Duration) -> Self {
        MetalsDevProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            api_key_env: crate::core::config::DEFAULT_API_KEY_ENV.to_string(),
            timeout,
        }
    }

    pub fn from_config(config: &MetalsDevProviderConfig) -> Self {
        MetalsDevProvider {
            api_key_env: config.api_key_env.clone(),
            ..Self::new(&config.base_url, config.resolve_api_key(), config.timeout())
        }
    }

    fn request_error(&self, e: reqwest::Error) -> SpotPriceError {
        if e.is_timeout() {
            error!("Spot price request timed out after {:?}", self.timeout);
            return SpotPriceError::Timeout(self.timeout);
        }
        // The request URL carries the API key
        let e = e.without_url();
        error!(error = %e, "Spot price request failed");
        SpotPriceError::Unexpected {
            details: e.to_string(),
        }
    }
}

fn non_negative(metal: &str, price: Option<f64>) -> Option<f64> {
    match price {
        Some(p) if p >= 0.0 => Some(p),
        Some(p) => {
            warn!("Ignoring negative {} price from upstream: {}", metal, p);
            None
        }
        None => None,
    }
}

fn parse_quote(text: &str) -> Result<SpotQuote, SpotPriceError> {
    let data: MetalsDevResponse = serde_json::from_str(text).map_err(|e| {
        error!(error = ?e, response = %text, "Failed to parse spot price response");
        SpotPriceError::InvalidPayload {
            details: format!("{e}: {text}"),
        }
    })?;

    let metals = match (data.status.as_deref(), data.metals) {
        (Some("success"), Some(metals)) => metals,
        _ => {
            error!(response = %text, "Spot price response indicates failure or missing metals data");
            return Err(SpotPriceError::InvalidPayload {
                details: text.to_string(),
            });
        }
    };

    let timestamp = data
        .timestamp
        .as_deref()
        .and_then(|ts| DateTime::parse_from_rfc3339(ts).ok())
        .and_then(|ts| DateTime::<Utc>::from_timestamp(ts.timestamp(), 0))
        .ok_or_else(|| {
            error!(response = %text, "Spot price response has no valid timestamp");
            SpotPriceError::InvalidPayload {
                details: format!("Invalid or missing timestamp: {:?}", data.timestamp),
            }
        })?;

    Ok(SpotQuote {
        gold: non_negative("gold", metals.gold),
        silver: non_negative("silver", metals.silver),
        platinum: non_negative("platinum", metals.platinum),
        source: SOURCE_NAME.to_string(),
        timestamp,
    })
}

#[async_trait]
impl SpotPriceSource for MetalsDevProvider {
    #[instrument(name = "MetalsDevFetch", skip(self))]
    async fn fetch_quote(&self) -> Result<SpotQuote, SpotPriceError> {
        let Some(api_key) = self.api_key.as_deref() else {
            error!("{} environment variable is not set", self.api_key_env);
            return Err(SpotPriceError::MissingCredential(self.api_key_env.clone()));
        };

        let endpoint = format!("{}/v1/latest", self.base_url);
        let url = reqwest::Url::parse_with_params(
            &endpoint,
            &[("api_key", api_key), ("currency", "USD"), ("unit", "toz")],
        )
        .map_err(|e| {
            error!(error = %e, "Invalid spot price endpoint {}", endpoint);
            SpotPriceError::Unexpected {
                details: format!("Invalid endpoint {endpoint}: {e}"),
            }
        })?;
        debug!("Requesting spot prices from {}", endpoint);

        let client = reqwest::Client::builder()
            .user_agent("coinstack/0.1")
            .timeout(self.timeout)
            .build()
            .map_err(|e| self.request_error(e))?;
        let response = client
            .get(url)
            .send()
            .await
            .map_err(|e| self.request_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(
                "Error fetching spot prices from {}: {} {}",
                SOURCE_NAME, status, body
            );
            return Err(SpotPriceError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let text = response.text().await.map_err(|e| self.request_error(e))?;
        let quote = parse_quote(&text)?;
        debug!(quote = ?quote, "Received spot prices");
        Ok(quote)
    }
}
