//! # Configuration Module
//!
//! Planner settings, feature flags and provider recovery settings, with
//! loaders for the environment (`KONDATE_*` variables, optionally from a
//! `.env` file) and for JSON files.
//!
//! ## Usage
//!
//! ```rust
//! use kondate::config::PlannerConfig;
//!
//! let config = PlannerConfig::default();
//! assert_eq!(config.servings, 2);
//! assert!(config.validate().is_ok());
//! ```

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::cost::PriceRegion;
use crate::normalizer::DEFAULT_CHILD_FACTOR;
use crate::nutrition::NutritionProfile;

pub const MIN_SERVINGS: u32 = 1;
pub const MAX_SERVINGS: u32 = 8;
pub const MIN_DAYS: u32 = 1;
pub const MAX_DAYS: u32 = 7;
pub const MIN_BUDGET_YEN: i64 = 1000;
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

/// Recovery configuration for provider calls
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecoveryConfig {
    /// Maximum number of retry attempts
    pub max_retries: u32,
    /// Base delay between retries in milliseconds
    pub base_retry_delay_ms: u64,
    /// Maximum delay between retries in milliseconds
    pub max_retry_delay_ms: u64,
    /// Timeout for one provider call in seconds
    pub operation_timeout_secs: u64,
    /// Circuit breaker failure threshold
    pub circuit_breaker_threshold: u32,
    /// Circuit breaker reset timeout in seconds
    pub circuit_breaker_reset_secs: u64,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_retry_delay_ms: 1000,  // 1 second
            max_retry_delay_ms: 10000,  // 10 seconds
            operation_timeout_secs: 30, // 30 seconds
            circuit_breaker_threshold: 5,
            circuit_breaker_reset_secs: 60, // 1 minute
        }
    }
}

/// Deployment mode; development relaxes sampling and retries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppMode {
    #[default]
    Beta,
    Dev,
    Prod,
}

impl AppMode {
    /// Parse `APP_MODE`-style values; anything unrecognized is beta
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "dev" | "development" => AppMode::Dev,
            "prod" | "production" => AppMode::Prod,
            _ => AppMode::Beta,
        }
    }
}

/// What to do when no candidate passes the quality gate after all retries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExhaustionPolicy {
    /// Keep the first raw candidate and attach a disclaimer
    #[default]
    BestEffort,
    /// Report a quality-bar failure
    Fail,
}

/// Behavior switches of the planning pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureFlags {
    pub enable_quality_filter: bool,
    pub max_quality_retry: u32,
    pub keep_at_least_one: bool,
    pub week_replan_attempts: u32,
    pub temperature: f32,
    pub trust_augmentation: bool,
    pub exhaustion_policy: ExhaustionPolicy,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self::for_mode(AppMode::Beta)
    }
}

impl FeatureFlags {
    pub fn for_mode(mode: AppMode) -> Self {
        let dev = mode == AppMode::Dev;
        Self {
            enable_quality_filter: true,
            max_quality_retry: if dev { 3 } else { 2 },
            keep_at_least_one: true,
            week_replan_attempts: 2,
            temperature: if dev { 0.6 } else { 0.4 },
            trust_augmentation: true,
            exhaustion_policy: ExhaustionPolicy::BestEffort,
        }
    }
}

/// Settings of one planning run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    pub servings: u32,
    pub budget_yen: i64,
    pub num_days: u32,
    pub profile: NutritionProfile,
    pub region: PriceRegion,
    pub child_mode: bool,
    pub child_factor: f64,
    pub prefer_cheap: bool,
    pub theme: String,
    pub genre: String,
    pub max_minutes: u32,
    /// Fridge ingredients offered to the provider
    pub ingredients: Vec<String>,
    pub want_keyword: String,
    pub avoid_keywords: Vec<String>,
    pub features: FeatureFlags,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            servings: 2,
            budget_yen: 8000,
            num_days: 7,
            profile: NutritionProfile::Standard,
            region: PriceRegion::Standard,
            child_mode: false,
            child_factor: DEFAULT_CHILD_FACTOR,
            prefer_cheap: false,
            theme: String::new(),
            genre: String::new(),
            max_minutes: 30,
            ingredients: Vec::new(),
            want_keyword: String::new(),
            avoid_keywords: Vec::new(),
            features: FeatureFlags::default(),
        }
    }
}

/// Split a comma list (ASCII or Japanese commas), dropping blanks
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split([',', '、', '，'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_var<T: std::str::FromStr>(key: &str, value: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse::<T>()
        .map_err(|e| anyhow::anyhow!("{}", e))
        .with_context(|| format!("Invalid value for {}: '{}'", key, value))
}

fn parse_flag(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => bail!("Invalid boolean for {}: '{}'", key, other),
    }
}

impl PlannerConfig {
    /// Reject values outside the accepted ranges
    pub fn validate(&self) -> Result<()> {
        if !(MIN_SERVINGS..=MAX_SERVINGS).contains(&self.servings) {
            bail!(
                "servings must be between {} and {}, got {}",
                MIN_SERVINGS,
                MAX_SERVINGS,
                self.servings
            );
        }
        if !(MIN_DAYS..=MAX_DAYS).contains(&self.num_days) {
            bail!(
                "num_days must be between {} and {}, got {}",
                MIN_DAYS,
                MAX_DAYS,
                self.num_days
            );
        }
        if self.budget_yen < MIN_BUDGET_YEN {
            bail!(
                "budget_yen must be at least {}, got {}",
                MIN_BUDGET_YEN,
                self.budget_yen
            );
        }
        if !(self.child_factor > 0.0 && self.child_factor <= 1.0) {
            bail!("child_factor must be in (0, 1], got {}", self.child_factor);
        }
        Ok(())
    }

    /// Build a configuration from a variable lookup, starting from defaults.
    ///
    /// `APP_MODE` selects the feature-flag defaults; `KONDATE_*` variables
    /// override individual fields.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mode = lookup("APP_MODE")
            .map(|m| AppMode::from_label(&m))
            .unwrap_or_default();
        let mut config = PlannerConfig {
            features: FeatureFlags::for_mode(mode),
            ..Default::default()
        };

        if let Some(v) = lookup("KONDATE_SERVINGS") {
            config.servings = parse_var("KONDATE_SERVINGS", &v)?;
        }
        if let Some(v) = lookup("KONDATE_BUDGET_YEN") {
            config.budget_yen = parse_var("KONDATE_BUDGET_YEN", &v)?;
        }
        if let Some(v) = lookup("KONDATE_DAYS") {
            config.num_days = parse_var("KONDATE_DAYS", &v)?;
        }
        if let Some(v) = lookup("KONDATE_PROFILE") {
            config.profile = parse_var("KONDATE_PROFILE", &v)?;
        }
        if let Some(v) = lookup("KONDATE_REGION") {
            config.region = parse_var("KONDATE_REGION", &v)?;
        }
        if let Some(v) = lookup("KONDATE_CHILD_MODE") {
            config.child_mode = parse_flag("KONDATE_CHILD_MODE", &v)?;
        }
        if let Some(v) = lookup("KONDATE_PREFER_CHEAP") {
            config.prefer_cheap = parse_flag("KONDATE_PREFER_CHEAP", &v)?;
        }
        if let Some(v) = lookup("KONDATE_TRUST") {
            config.features.trust_augmentation = parse_flag("KONDATE_TRUST", &v)?;
        }
        if let Some(v) = lookup("KONDATE_MAX_MINUTES") {
            config.max_minutes = parse_var("KONDATE_MAX_MINUTES", &v)?;
        }
        if let Some(v) = lookup("KONDATE_THEME") {
            config.theme = v;
        }
        if let Some(v) = lookup("KONDATE_GENRE") {
            config.genre = v;
        }
        if let Some(v) = lookup("KONDATE_INGREDIENTS") {
            config.ingredients = split_list(&v);
        }
        if let Some(v) = lookup("KONDATE_WANT") {
            config.want_keyword = v.trim().to_string();
        }
        if let Some(v) = lookup("KONDATE_AVOID") {
            config.avoid_keywords = split_list(&v);
        }

        config.validate()?;
        Ok(config)
    }

    /// Load from the process environment after reading `.env` if present
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from a JSON file; missing fields take their defaults
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: PlannerConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }
}

/// Connection settings of the chat-completions provider
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderSettings {
    pub api_key: Option<String>,
    pub api_base: String,
    pub model: String,
    pub temperature: f32,
    pub recovery: RecoveryConfig,
}

impl ProviderSettings {
    pub fn from_lookup<F>(lookup: F, features: &FeatureFlags) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            api_key: lookup("OPENAI_API_KEY").filter(|k| !k.trim().is_empty()),
            api_base: lookup("KONDATE_API_BASE").unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            model: lookup("KONDATE_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            temperature: features.temperature,
            recovery: RecoveryConfig::default(),
        }
    }

    pub fn from_env(features: &FeatureFlags) -> Self {
        Self::from_lookup(|key| std::env::var(key).ok(), features)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_recovery_defaults_reasonable() {
        let recovery = RecoveryConfig::default();
        assert!(recovery.max_retries <= 10);
        assert!(recovery.base_retry_delay_ms <= recovery.max_retry_delay_ms);
        assert!(recovery.operation_timeout_secs > 0);
    }

    #[test]
    fn test_dev_mode_flags() {
        let flags = FeatureFlags::for_mode(AppMode::Dev);
        assert_eq!(flags.max_quality_retry, 3);
        assert_eq!(flags.temperature, 0.6);
        assert_eq!(FeatureFlags::default().max_quality_retry, 2);
        assert_eq!(AppMode::from_label("Production"), AppMode::Prod);
        assert_eq!(AppMode::from_label("whatever"), AppMode::Beta);
    }

    #[test]
    fn test_from_lookup_overrides() {
        let config = PlannerConfig::from_lookup(lookup_from(&[
            ("KONDATE_SERVINGS", "4"),
            ("KONDATE_BUDGET_YEN", "6000"),
            ("KONDATE_PROFILE", "減塩"),
            ("KONDATE_REGION", "高め"),
            ("KONDATE_CHILD_MODE", "true"),
            ("KONDATE_AVOID", "カレー、揚げ物, "),
        ]))
        .unwrap();

        assert_eq!(config.servings, 4);
        assert_eq!(config.budget_yen, 6000);
        assert_eq!(config.profile, NutritionProfile::LowSodium);
        assert_eq!(config.region, PriceRegion::High);
        assert!(config.child_mode);
        assert_eq!(config.avoid_keywords, vec!["カレー", "揚げ物"]);
    }

    #[test]
    fn test_validation_rejects_out_of_range() {
        assert!(PlannerConfig::from_lookup(lookup_from(&[("KONDATE_SERVINGS", "9")])).is_err());
        assert!(PlannerConfig::from_lookup(lookup_from(&[("KONDATE_DAYS", "0")])).is_err());
        assert!(PlannerConfig::from_lookup(lookup_from(&[("KONDATE_BUDGET_YEN", "999")])).is_err());
        assert!(PlannerConfig::from_lookup(lookup_from(&[("KONDATE_CHILD_MODE", "maybe")])).is_err());
    }

    #[test]
    fn test_provider_settings() {
        let settings = ProviderSettings::from_lookup(
            lookup_from(&[("OPENAI_API_KEY", "  ")]),
            &FeatureFlags::default(),
        );
        assert!(settings.api_key.is_none());
        assert_eq!(settings.model, DEFAULT_MODEL);
    }
}
