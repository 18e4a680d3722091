use crate::core::records::{ArbitrageCoin, Coin, RecordSource, UserContext};
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};
use tracing::debug;

pub const DEFAULT_API_KEY_ENV: &str = "METALS_DEV_API_KEY";

fn default_api_key_env() -> String {
    DEFAULT_API_KEY_ENV.to_string()
}

fn default_timeout_secs() -> u64 {
    5
}

fn default_ttl_hours() -> i64 {
    8
}

fn default_persist() -> bool {
    true
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct MetalsDevProviderConfig {
    pub base_url: String,
    /// Inline credential. Takes precedence over `api_key_env`.
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for MetalsDevProviderConfig {
    fn default() -> Self {
        MetalsDevProviderConfig {
            base_url: "https://api.metals.dev".to_string(),
            api_key: None,
            api_key_env: default_api_key_env(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl MetalsDevProviderConfig {
    /// Resolves the credential from the config, then from the environment.
    pub fn resolve_api_key(&self) -> Option<String> {
        let present = |key: &String| !key.trim().is_empty();
        self.api_key
            .clone()
            .filter(present)
            .or_else(|| std::env::var(&self.api_key_env).ok().filter(present))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub metals_dev: MetalsDevProviderConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CacheConfig {
    #[serde(default = "default_ttl_hours")]
    pub ttl_hours: i64,
    /// Keep the spot price snapshot on disk between runs.
    #[serde(default = "default_persist")]
    pub persist: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            ttl_hours: default_ttl_hours(),
            persist: default_persist(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    pub user: UserContext,
    #[serde(default)]
    pub coins: Vec<Coin>,
    #[serde(default)]
    pub arbitrage: Vec<ArbitrageCoin>,
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    pub data_path: Option<String>,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("io", "coinstack", "coinstack")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn default_data_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.data_path {
            return Ok(PathBuf::from(custom_path));
        }
        let proj_dirs = ProjectDirs::from("io", "coinstack", "coinstack")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }
}

/// The configuration file doubles as the record store for the CLI.
impl RecordSource for AppConfig {
    fn coins_for(&self, user_id: &str) -> Result<Vec<Coin>> {
        Ok(self
            .coins
            .iter()
            .filter(|coin| coin.user_id == user_id)
            .cloned()
            .collect())
    }

    fn arbitrage_coins(&self) -> Result<Vec<ArbitrageCoin>> {
        let mut listings = self.arbitrage.clone();
        listings.sort_by(|a, b| b.published_at.cmp(&a.published_at));
        Ok(listings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::metal::{Metal, WeightUnit};

    const CONFIG_YAML: &str = r#"
user:
  id: "alice"
  admin: true
coins:
  - user_id: "alice"
    name: "American Gold Eagle"
    metal_type: Gold
    year: 2023
    weight: 1.0
    weight_unit: oz
    purity: 0.9167
    purchase_price: 2150.0
    purchase_date: 2024-01-15
    resale_market_value: 2200.0
  - user_id: "bob"
    name: "Britannia"
    metal_type: silver
    weight: 31.1035
    weight_unit: g
    purity: 0.999
    purchase_price: 32.0
arbitrage:
  - name: "1921 Morgan Dollar"
    metal_type: Silver
    description: "Circulated, common date"
    resale_links:
      - platform: "eBay"
        url: "https://www.ebay.com/itm/1"
    published_at: 2024-03-01T10:00:00Z
  - name: "Krugerrand"
    metal_type: Gold
    description: "Bullion"
    notes: "Check dealer buyback"
    published_at: 2024-05-01T10:00:00Z
"#;

    #[test]
    fn test_config_deserialization() {
        let config: AppConfig = serde_yaml::from_str(CONFIG_YAML).expect("Failed to deserialize");

        assert_eq!(config.user.id, "alice");
        assert!(config.user.admin);
        assert_eq!(config.coins.len(), 2);

        let eagle = &config.coins[0];
        assert_eq!(eagle.metal_type, Metal::Gold);
        assert_eq!(eagle.weight_unit, WeightUnit::TroyOunce);
        assert_eq!(eagle.year, Some(2023));
        assert_eq!(eagle.resale_market_value, Some(2200.0));
        assert_eq!(
            eagle.purchase_date.map(|d| d.to_string()),
            Some("2024-01-15".to_string())
        );

        let britannia = &config.coins[1];
        assert_eq!(britannia.metal_type, Metal::Silver);
        assert_eq!(britannia.weight_unit, WeightUnit::Gram);
        assert!(britannia.resale_market_value.is_none());

        assert_eq!(config.arbitrage.len(), 2);
        assert_eq!(config.arbitrage[0].resale_links.len(), 1);
        assert!(config.arbitrage[1].resale_links.is_empty());

        // Defaults when no providers/cache sections are present
        assert_eq!(config.providers.metals_dev.base_url, "https://api.metals.dev");
        assert_eq!(config.providers.metals_dev.api_key_env, DEFAULT_API_KEY_ENV);
        assert_eq!(config.providers.metals_dev.timeout(), Duration::from_secs(5));
        assert_eq!(config.cache.ttl_hours, 8);
        assert!(config.cache.persist);
    }

    #[test]
    fn test_provider_overrides() {
        let yaml_str = r#"
user:
  id: "bob"
providers:
  metals_dev:
    base_url: "http://example.com/metals"
    api_key: "inline-key"
    timeout_secs: 2
cache:
  ttl_hours: 1
  persist: false
data_path: "/tmp/coinstack"
"#;
        let config: AppConfig = serde_yaml::from_str(yaml_str).unwrap();
        assert!(!config.user.admin);
        assert!(config.coins.is_empty());
        assert_eq!(
            config.providers.metals_dev.base_url,
            "http://example.com/metals"
        );
        assert_eq!(
            config.providers.metals_dev.resolve_api_key().as_deref(),
            Some("inline-key")
        );
        assert_eq!(config.providers.metals_dev.timeout(), Duration::from_secs(2));
        assert_eq!(config.cache.ttl_hours, 1);
        assert!(!config.cache.persist);
        assert_eq!(
            config.default_data_path().unwrap(),
            PathBuf::from("/tmp/coinstack")
        );
    }

    #[test]
    fn test_missing_credential_resolves_to_none() {
        let provider = MetalsDevProviderConfig {
            api_key_env: "COINSTACK_TEST_KEY_THAT_IS_NEVER_SET".to_string(),
            ..Default::default()
        };
        assert!(provider.resolve_api_key().is_none());

        let blank = MetalsDevProviderConfig {
            api_key: Some("  ".to_string()),
            api_key_env: "COINSTACK_TEST_KEY_THAT_IS_NEVER_SET".to_string(),
            ..Default::default()
        };
        assert!(blank.resolve_api_key().is_none());
    }

    #[test]
    fn test_blank_inline_key_falls_back_to_environment() {
        // PATH is set in any environment the tests run in
        let expected = std::env::var("PATH").ok();
        assert!(expected.is_some());

        let provider = MetalsDevProviderConfig {
            api_key: Some(String::new()),
            api_key_env: "PATH".to_string(),
            ..Default::default()
        };
        assert_eq!(provider.resolve_api_key(), expected);

        let inline = MetalsDevProviderConfig {
            api_key: Some("inline-key".to_string()),
            api_key_env: "PATH".to_string(),
            ..Default::default()
        };
        assert_eq!(inline.resolve_api_key().as_deref(), Some("inline-key"));
    }

    #[test]
    fn test_record_source_filters_by_owner_and_sorts_listings() {
        let config: AppConfig = serde_yaml::from_str(CONFIG_YAML).unwrap();

        let alice = config.coins_for("alice").unwrap();
        assert_eq!(alice.len(), 1);
        assert_eq!(alice[0].name, "American Gold Eagle");
        assert!(config.coins_for("carol").unwrap().is_empty());

        let listings = config.arbitrage_coins().unwrap();
        assert_eq!(listings[0].name, "Krugerrand");
        assert_eq!(listings[1].name, "1921 Morgan Dollar");
    }
}
