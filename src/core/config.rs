use crate::core::error::PlanError;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct YahooProviderConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct ProvidersConfig {
    pub yahoo: Option<YahooProviderConfig>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct NotifyConfig {
    /// Discord webhook to deliver plan summaries to. When absent the summary
    /// is printed to the console instead.
    pub discord_webhook_url: Option<String>,
}

fn default_symbol() -> String {
    "USDKRW=X".to_string()
}

fn default_regular_amount() -> u64 {
    500_000
}

fn default_extra_unit() -> u64 {
    100_000
}

fn default_multipliers() -> Vec<f64> {
    vec![0.5, 1.0, 1.5]
}

fn default_lookback() -> String {
    "6mo".to_string()
}

fn default_utc_offset_hours() -> i32 {
    9 // KST; the pair's home market decides what "today" means
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    /// Currency pair in Yahoo Finance notation, e.g. "USDKRW=X".
    #[serde(default = "default_symbol")]
    pub symbol: String,

    /// Fixed contribution on the regular contribution day, in quote currency.
    #[serde(default = "default_regular_amount")]
    pub regular_amount: u64,

    /// Amount added per satisfied threshold tier.
    #[serde(default = "default_extra_unit")]
    pub extra_unit: u64,

    /// Sigma multipliers for the threshold tiers, ascending.
    #[serde(default = "default_multipliers")]
    pub multipliers: Vec<f64>,

    /// Yahoo chart range for the volatility lookback window.
    #[serde(default = "default_lookback")]
    pub lookback: String,

    /// Offset applied to UTC when deciding the evaluation date.
    #[serde(default = "default_utc_offset_hours")]
    pub utc_offset_hours: i32,

    #[serde(default)]
    pub providers: ProvidersConfig,

    #[serde(default)]
    pub notify: NotifyConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            symbol: default_symbol(),
            regular_amount: default_regular_amount(),
            extra_unit: default_extra_unit(),
            multipliers: default_multipliers(),
            lookback: default_lookback(),
            utc_offset_hours: default_utc_offset_hours(),
            providers: ProvidersConfig::default(),
            notify: NotifyConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("dev", "fxdca", "fxdca")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        config.validate()?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    /// Rejects configurations the planning core cannot work with.
    pub fn validate(&self) -> Result<(), PlanError> {
        let invalid = |msg: &str| Err(PlanError::InvalidInput(msg.to_string()));
        if self.symbol.is_empty() {
            return invalid("symbol must not be empty");
        }
        if self.regular_amount == 0 {
            return invalid("regular_amount must be a positive integer");
        }
        if self.extra_unit == 0 {
            return invalid("extra_unit must be a positive integer");
        }
        if self.multipliers.is_empty() {
            return invalid("multipliers must not be empty");
        }
        if self.multipliers.iter().any(|k| *k <= 0.0) {
            return invalid("multipliers must all be positive");
        }
        if self.multipliers.windows(2).any(|w| w[1] <= w[0]) {
            return invalid("multipliers must be strictly ascending");
        }
        Ok(())
    }

    /// Webhook from the environment takes precedence over the config file,
    /// matching the original deployment where it lives in a dotenv secret.
    pub fn webhook_url(&self) -> Option<String> {
        std::env::var("DISCORD_WEBHOOK_URL")
            .ok()
            .filter(|url| !url.is_empty())
            .or_else(|| self.notify.discord_webhook_url.clone())
    }

    pub fn yahoo_base_url(&self) -> &str {
        self.providers
            .yahoo
            .as_ref()
            .map_or("https://query1.finance.yahoo.com", |p| &p.base_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_deserialization_with_defaults() {
        let config: AppConfig = serde_yaml::from_str("{}").expect("Failed to deserialize");
        assert_eq!(config.symbol, "USDKRW=X");
        assert_eq!(config.regular_amount, 500_000);
        assert_eq!(config.extra_unit, 100_000);
        assert_eq!(config.multipliers, vec![0.5, 1.0, 1.5]);
        assert_eq!(config.lookback, "6mo");
        assert_eq!(config.utc_offset_hours, 9);
        assert!(config.providers.yahoo.is_none());
        assert!(config.notify.discord_webhook_url.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_deserialization_full() {
        let yaml_str = r#"
symbol: "USDJPY=X"
regular_amount: 330000
extra_unit: 167000
multipliers: [0.5, 1.0, 1.5]
lookback: "1y"
utc_offset_hours: 0
providers:
  yahoo:
    base_url: "http://example.com/yahoo"
notify:
  discord_webhook_url: "http://example.com/webhook"
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert_eq!(config.symbol, "USDJPY=X");
        assert_eq!(config.regular_amount, 330_000);
        assert_eq!(config.extra_unit, 167_000);
        assert_eq!(config.lookback, "1y");
        assert_eq!(config.utc_offset_hours, 0);
        assert_eq!(config.yahoo_base_url(), "http://example.com/yahoo");
        assert_eq!(
            config.notify.discord_webhook_url.as_deref(),
            Some("http://example.com/webhook")
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_amounts() {
        let mut config = AppConfig::default();
        config.regular_amount = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.extra_unit = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_multipliers() {
        let mut config = AppConfig::default();
        config.multipliers = vec![];
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.multipliers = vec![0.5, -1.0];
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.multipliers = vec![1.0, 0.5];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_yahoo_base_url_default() {
        let config = AppConfig::default();
        assert_eq!(config.yahoo_base_url(), "https://query1.finance.yahoo.com");
    }
}
